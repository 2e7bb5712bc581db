//! Local IP discovery.

use std::net::UdpSocket;

/// The machine's local IP address, or `"unknown"` if it cannot be
/// determined.
///
/// Connecting a UDP socket to a public address picks the outbound
/// interface without sending any traffic; the directory entry this feeds
/// is informational, so failure is not an error.
#[must_use]
pub fn local_ip() -> String {
    try_local_ip().unwrap_or_else(|| "unknown".to_string())
}

fn try_local_ip() -> Option<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    Some(socket.local_addr().ok()?.ip().to_string())
}
