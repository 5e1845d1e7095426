use log::info;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

/// The datagram capability a magic packet is sent through.
pub trait DatagramTransport {
    fn send_to(&mut self, payload: &[u8], addr: SocketAddr) -> io::Result<usize>;
    fn close(&mut self) -> io::Result<()>;
}

pub struct UdpTransport {
    socket: Option<UdpSocket>,
}

impl UdpTransport {
    /// Binds an ephemeral port on all interfaces with broadcast enabled.
    pub fn bind() -> io::Result<UdpTransport> {
        Self::bind_to(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))
    }

    pub fn bind_to(local: SocketAddr) -> io::Result<UdpTransport> {
        let socket = UdpSocket::bind(local)?;
        socket.set_broadcast(true)?;
        Ok(UdpTransport {
            socket: Some(socket),
        })
    }
}

impl DatagramTransport for UdpTransport {
    fn send_to(&mut self, payload: &[u8], addr: SocketAddr) -> io::Result<usize> {
        match &self.socket {
            Some(socket) => socket.send_to(payload, addr),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "udp transport already closed",
            )),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        // Dropping the socket closes it.
        self.socket.take();
        Ok(())
    }
}

/// Logs what would be sent instead of touching the network.
pub struct LogOnlyTransport;

impl DatagramTransport for LogOnlyTransport {
    fn send_to(&mut self, payload: &[u8], addr: SocketAddr) -> io::Result<usize> {
        info!("faking send of {} bytes to {}: {:02x?}", payload.len(), addr, payload);
        Ok(payload.len())
    }
    fn close(&mut self) -> io::Result<()> {
        info!("faking close");
        Ok(())
    }
}
