//! Ephemeral port allocation for driver services.

use std::io;
use std::net::{Ipv4Addr, TcpListener};

/// Ask the OS for a TCP port that is free right now.
///
/// Binds a listener to `0.0.0.0:0`, reads back the assigned port and closes
/// the socket again. This is a best-effort reservation, not a lock: another
/// process may take the port between this call and the driver binding it.
/// Each call uses its own socket, so concurrent calls are safe.
pub fn find_free_port() -> io::Result<u16> {
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    let port = listener.local_addr()?.port();
    Ok(port)
}
