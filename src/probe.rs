//! Debug port liveness checks

use crate::config::PROBE_TIMEOUT;
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use tracing::trace;

/// Checks whether something accepts TCP connections on a local port.
pub trait PortProbe {
    fn is_port_open(&self, port: u16) -> bool;
}

/// Single connect attempt to `127.0.0.1` with a fixed short timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpPortProbe;

impl PortProbe for TcpPortProbe {
    fn is_port_open(&self, port: u16) -> bool {
        is_port_open(port)
    }
}

pub fn is_port_open(port: u16) -> bool {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    match TcpStream::connect_timeout(&addr, PROBE_TIMEOUT) {
        Ok(_) => true,
        Err(err) => {
            trace!("port {} closed: {}", port, err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn closed_then_open_after_listener_binds() {
        // grab a free port, release it, then check it reads as closed
        let port = {
            let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("bind");
            listener.local_addr().expect("addr").port()
        };
        assert!(!is_port_open(port));

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port)).expect("rebind");
        assert!(TcpPortProbe.is_port_open(port));
        drop(listener);
    }
}
