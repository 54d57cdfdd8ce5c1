use tlvwire_frame::{CodecConfig, Payload, PayloadReader, PayloadWriter};

use crate::cmd::{parse_duration, resolve_payloads, SendArgs};
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::net;
use crate::output::{print_payload, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let payloads = resolve_payloads(&args.payload)?;

    let stream = net::connect(&args.addr, timeout)?;
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| args.addr.clone());

    let config = CodecConfig {
        read_timeout: Some(timeout),
        write_timeout: Some(timeout),
        ..CodecConfig::default()
    };
    let reader_stream = stream
        .try_clone()
        .map_err(|err| io_error("connect failed", err))?;
    let mut writer = PayloadWriter::with_config_tcp(stream, config.clone())
        .map_err(|err| frame_error("connect failed", err))?;

    for payload in &payloads {
        let n = writer
            .write_payload(payload)
            .map_err(|err| frame_error("send failed", err))?;
        tracing::debug!(kind = %payload.payload_type(), bytes = n, "sent payload");
    }

    if args.wait {
        let mut reader = PayloadReader::with_config_tcp(reader_stream, config)
            .map_err(|err| frame_error("receive failed", err))?;
        wait_for_responses(&mut reader, payloads.len(), |payload| {
            print_payload(&payload, &peer, format)
        })
        .map_err(|err| frame_error("receive failed", err))?;
    }

    Ok(SUCCESS)
}

/// Read one response per payload sent. The server closing early is an error.
fn wait_for_responses<R: std::io::Read>(
    reader: &mut PayloadReader<R>,
    expected: usize,
    mut handle: impl FnMut(Payload),
) -> tlvwire_frame::Result<()> {
    for _ in 0..expected {
        handle(reader.read_payload()?);
    }
    Ok(())
}
