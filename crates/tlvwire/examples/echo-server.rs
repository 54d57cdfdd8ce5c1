//! Minimal echo server — accepts one peer and echoes payloads back.
//!
//! Run with:
//!   cargo run --example echo-server
//!
//! In another terminal:
//!   cargo run --features cli -- send 127.0.0.1:50000 \
//!     --kind text --data "Don't panic." --wait

use std::net::TcpListener;

use tlvwire::frame::{PayloadReader, PayloadWriter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:50000")?;
    eprintln!("Listening on {}", listener.local_addr()?);

    // Accept one peer and echo payloads until disconnect.
    let (stream, peer) = listener.accept()?;
    eprintln!("Peer connected: {peer}");

    let mut writer = PayloadWriter::new(stream.try_clone()?);
    for payload in PayloadReader::new(stream) {
        match payload {
            Ok(payload) => {
                eprintln!(
                    "Received {} payload of {} bytes",
                    payload.payload_type(),
                    payload.len()
                );
                writer.write_payload(&payload)?;
            }
            Err(e) => {
                eprintln!("Peer sent a bad frame: {e}");
                break;
            }
        }
    }

    eprintln!("Peer disconnected");
    Ok(())
}
