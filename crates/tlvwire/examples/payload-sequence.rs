//! Writes three payloads back-to-back over one TCP connection and decodes
//! them on the other side.
//!
//! Run with:
//!   cargo run --example payload-sequence

use std::net::{TcpListener, TcpStream};
use std::thread;

use tlvwire::frame::{decode, encode, Binary, Payload, TextString};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let payloads = vec![
        Payload::from(Binary::from("Clear is better than clever.")),
        Payload::from(TextString::from("Errors are values.")),
        Payload::from(Binary::from("Don't panic.")),
    ];

    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    let outgoing = payloads.clone();
    let server = thread::spawn(move || -> Result<(), tlvwire::FrameError> {
        let (mut conn, _) = listener.accept()?;
        for p in &outgoing {
            encode(p, &mut conn)?;
        }
        Ok(())
    });

    let mut conn = TcpStream::connect(addr)?;
    for expected in &payloads {
        let actual = decode(&mut conn)?;
        assert_eq!(&actual, expected);
        println!("[{}] {:?}", actual.payload_type(), actual.to_string());
    }

    server.join().map_err(|_| "server thread panicked")??;
    Ok(())
}
