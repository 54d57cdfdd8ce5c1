//! TCP plumbing for the CLI commands.

use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::exit::{io_error, CliError, CliResult, FAILURE, USAGE};

/// Bind and listen on `addr`.
pub fn bind(addr: &str) -> CliResult<TcpListener> {
    let listener = TcpListener::bind(addr).map_err(|err| io_error("bind failed", err))?;
    let local = listener
        .local_addr()
        .map_err(|err| io_error("bind failed", err))?;
    info!(%local, "listening on tcp");
    Ok(listener)
}

/// Accept one connection (blocking).
pub fn accept(listener: &TcpListener) -> CliResult<(TcpStream, SocketAddr)> {
    let (stream, peer) = listener
        .accept()
        .map_err(|err| io_error("accept failed", err))?;
    debug!(%peer, "accepted connection");
    Ok((stream, peer))
}

/// Dial `addr`, trying each resolved address with `timeout`.
pub fn connect(addr: &str, timeout: Duration) -> CliResult<TcpStream> {
    let addrs: Vec<SocketAddr> = addr
        .to_socket_addrs()
        .map_err(|err| CliError::new(USAGE, format!("invalid address {addr}: {err}")))?
        .collect();

    let mut last_err = None;
    for candidate in addrs {
        match TcpStream::connect_timeout(&candidate, timeout) {
            Ok(stream) => {
                debug!(peer = %candidate, "connected");
                return Ok(stream);
            }
            Err(err) => {
                debug!(peer = %candidate, error = %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }

    match last_err {
        Some(err) => Err(io_error("connect failed", err)),
        None => Err(CliError::new(
            FAILURE,
            format!("connect failed: {addr} resolved to no addresses"),
        )),
    }
}
