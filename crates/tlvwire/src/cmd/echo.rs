use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tlvwire_frame::{FrameError, PayloadReader, PayloadWriter};

use crate::cmd::listen::{codec_config, install_ctrlc_handler};
use crate::cmd::EchoArgs;
use crate::exit::{io_error, CliResult, SUCCESS};
use crate::net;
use crate::output::OutputFormat;

enum RecvErrorDisposition {
    /// Stream ended or failed; move on to the next connection.
    Break,
    /// Peer sent a malformed frame; the stream cannot be resynchronized.
    Drop(FrameError),
}

pub fn run(args: EchoArgs, _format: OutputFormat) -> CliResult<i32> {
    let listener = net::bind(&args.addr)?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let config = codec_config(args.max_payload);

    while running.load(Ordering::SeqCst) {
        let (stream, peer) = net::accept(&listener)?;
        let writer_stream = stream
            .try_clone()
            .map_err(|err| io_error("accept failed", err))?;
        let mut reader = PayloadReader::with_config(stream, config.clone());
        let mut writer = PayloadWriter::with_config(writer_stream, config.clone());

        while running.load(Ordering::SeqCst) {
            let payload = match reader.next_payload() {
                Ok(Some(payload)) => payload,
                Ok(None) => break,
                Err(err) => match classify_recv_error(err) {
                    RecvErrorDisposition::Break => break,
                    RecvErrorDisposition::Drop(err) => {
                        tracing::warn!(%peer, error = %err, "dropping connection after malformed frame");
                        break;
                    }
                },
            };

            tracing::info!(
                %peer,
                kind = %payload.payload_type(),
                size = payload.len(),
                "echoing payload"
            );

            if let Err(err) = writer.write_payload(&payload) {
                tracing::warn!(%peer, error = %err, "echo send failed");
                break;
            }
        }
    }

    Ok(SUCCESS)
}

fn classify_recv_error(err: FrameError) -> RecvErrorDisposition {
    if err.is_protocol_violation() {
        return RecvErrorDisposition::Drop(err);
    }
    tracing::debug!(error = %err, "connection ended");
    RecvErrorDisposition::Break
}
