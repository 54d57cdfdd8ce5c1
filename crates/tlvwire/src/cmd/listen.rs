use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tlvwire_frame::{CodecConfig, FrameError, PayloadReader};

use crate::cmd::ListenArgs;
use crate::exit::{frame_error, CliError, CliResult, SUCCESS};
use crate::net;
use crate::output::{print_payload, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let listener = net::bind(&args.addr)?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let config = codec_config(args.max_payload);
    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let (stream, peer) = net::accept(&listener)?;
        let source = peer.to_string();
        let mut reader = PayloadReader::with_config(stream, config.clone());

        while running.load(Ordering::SeqCst) {
            let payload = match reader.next_payload() {
                Ok(Some(payload)) => payload,
                Ok(None) => {
                    tracing::debug!(peer = %source, "connection closed");
                    break;
                }
                Err(err) => match recv_failure(err) {
                    Some(fatal) => return Err(fatal),
                    None => {
                        tracing::warn!(peer = %source, "connection ended mid-stream");
                        break;
                    }
                },
            };

            if let Some(kind) = args.kind {
                if !kind.matches(&payload) {
                    continue;
                }
            }

            print_payload(&payload, &source, format);
            printed = printed.saturating_add(1);

            if let Some(count) = args.count {
                if printed >= count {
                    return Ok(SUCCESS);
                }
            }
        }
    }

    Ok(SUCCESS)
}

/// Malformed input ends the command; a transport failure only ends the
/// current connection.
fn recv_failure(err: FrameError) -> Option<CliError> {
    if err.is_protocol_violation() {
        return Some(frame_error("receive failed", err));
    }
    tracing::debug!(error = %err, "receive failed");
    None
}

pub(crate) fn codec_config(max_payload: Option<usize>) -> CodecConfig {
    let mut config = CodecConfig::default();
    if let Some(max) = max_payload {
        config.max_payload_size = max;
    }
    config
}

pub(crate) fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_config_overrides_bound() {
        assert_eq!(
            codec_config(None).max_payload_size,
            tlvwire_frame::MAX_PAYLOAD_SIZE
        );
        assert_eq!(codec_config(Some(64)).max_payload_size, 64);
    }

    #[test]
    fn transport_failure_ends_only_the_connection() {
        for kind in [
            std::io::ErrorKind::UnexpectedEof,
            std::io::ErrorKind::ConnectionReset,
        ] {
            assert!(recv_failure(FrameError::Io(std::io::Error::from(kind))).is_none());
        }
    }

    #[test]
    fn protocol_violation_is_data_invalid() {
        let err = recv_failure(FrameError::UnknownPayloadType(7)).expect("fatal");
        assert_eq!(err.code, crate::exit::DATA_INVALID);
    }
}
