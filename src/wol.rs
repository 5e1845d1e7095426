use crate::error::Error;
use crate::mac::MacAddress;
use crate::transport::{DatagramTransport, UdpTransport};
use log::{debug, warn};
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

pub const DEFAULT_BROADCAST_IP: &str = "255.255.255.255";
pub const DEFAULT_PORT: u16 = 9;
pub const MAGIC_PACKET_LEN: usize = 102;

const SYNCHRONIZATION_SCHEME: [u8; 6] = [0xff; 6];

/// Six 0xff bytes followed by the target MAC repeated 16 times.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MagicPacket([u8; MAGIC_PACKET_LEN]);

impl MagicPacket {
    pub fn new(mac_address: &MacAddress) -> MagicPacket {
        let octets = mac_address.octets();
        let mut data = [0u8; MAGIC_PACKET_LEN];
        data[..SYNCHRONIZATION_SCHEME.len()].copy_from_slice(&SYNCHRONIZATION_SCHEME);
        for chunk in data[SYNCHRONIZATION_SCHEME.len()..].chunks_exact_mut(octets.len()) {
            chunk.copy_from_slice(&octets);
        }
        debug!("built magic packet for {}", mac_address);
        MagicPacket(data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Where and to whom a magic packet goes. Build one with [`WakeOnLan::builder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WakeOnLan {
    mac_address: MacAddress,
    broadcast_ip_address: String,
    port: u16,
}

impl WakeOnLan {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn mac_address(&self) -> &MacAddress {
        &self.mac_address
    }

    pub fn broadcast_ip_address(&self) -> &str {
        &self.broadcast_ip_address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn magic_packet(&self) -> MagicPacket {
        MagicPacket::new(&self.mac_address)
    }

    fn destination(&self) -> io::Result<SocketAddr> {
        (self.broadcast_ip_address.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no address for {}", self.broadcast_ip_address),
                )
            })
    }

    /// Sends the magic packet once through `transport`, then closes it.
    ///
    /// The transport is closed whether or not the send succeeded. Success only
    /// means the datagram was handed to the local network stack.
    pub fn send<T: DatagramTransport>(&self, mut transport: T) -> Result<(), Error> {
        let packet = self.magic_packet();
        let sent = self.destination().and_then(|addr| {
            debug!("sending magic packet for {} to {}", self.mac_address, addr);
            transport.send_to(packet.as_bytes(), addr)
        });
        let closed = transport.close();
        let sent = sent.and_then(|n| {
            if n == MAGIC_PACKET_LEN {
                Ok(n)
            } else {
                Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("sent {} of {} bytes", n, MAGIC_PACKET_LEN),
                ))
            }
        });
        match (sent, closed) {
            (Ok(_), Ok(())) => Ok(()),
            (Err(err), Ok(())) => Err(err.into()),
            (Err(err), Err(close_err)) => {
                warn!("closing transport after failed send: {}", close_err);
                Err(err.into())
            }
            (Ok(_), Err(close_err)) => Err(close_err.into()),
        }
    }
}

/// Collects settings for a [`WakeOnLan`]. Only the MAC address is required.
#[derive(Clone, Debug)]
pub struct Builder {
    mac_address: Option<MacAddress>,
    broadcast_ip_address: String,
    port: u16,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            mac_address: None,
            broadcast_ip_address: DEFAULT_BROADCAST_IP.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Builder {
    /// Validates and sets the target address. Fails straight away on a bad MAC.
    pub fn mac_address(self, mac_address: &str) -> Result<Self, Error> {
        Ok(self.mac_address_value(MacAddress::parse(mac_address)?))
    }
    pub fn mac_address_value(mut self, mac_address: MacAddress) -> Self {
        self.mac_address = Some(mac_address);
        self
    }
    pub fn broadcast_ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.broadcast_ip_address = ip_address.into();
        self
    }
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
    pub fn build(self) -> Result<WakeOnLan, Error> {
        let mac_address = self
            .mac_address
            .ok_or(Error::MissingRequiredField("mac_address"))?;
        Ok(WakeOnLan {
            mac_address,
            broadcast_ip_address: self.broadcast_ip_address,
            port: self.port,
        })
    }
}

/// Broadcasts a magic packet for `mac_address` to 255.255.255.255:9.
pub fn wake(mac_address: &str) -> Result<(), Error> {
    let wol = WakeOnLan::builder().mac_address(mac_address)?.build()?;
    wol.send(UdpTransport::bind()?)
}

#[cfg(test)]
mod tests {
    use crate::wol::*;
    use std::cell::RefCell;
    use std::net::{Ipv4Addr, UdpSocket};
    use std::rc::Rc;
    use std::time::Duration;

    const VALID_MAC: &str = "AB:12:32:dF:2A:3B";
    const VALID_OCTETS: [u8; 6] = [0xab, 0x12, 0x32, 0xdf, 0x2a, 0x3b];

    #[derive(Debug, PartialEq)]
    enum Call {
        SendTo(Vec<u8>, SocketAddr),
        Close,
    }

    #[derive(Default)]
    struct RecordingTransport {
        calls: Rc<RefCell<Vec<Call>>>,
        fail_send: bool,
        fail_close: bool,
        short_send: bool,
    }

    impl DatagramTransport for RecordingTransport {
        fn send_to(&mut self, payload: &[u8], addr: SocketAddr) -> io::Result<usize> {
            self.calls
                .borrow_mut()
                .push(Call::SendTo(payload.to_vec(), addr));
            if self.fail_send {
                return Err(io::Error::new(io::ErrorKind::Other, "network unreachable"));
            }
            if self.short_send {
                return Ok(payload.len() / 2);
            }
            Ok(payload.len())
        }
        fn close(&mut self) -> io::Result<()> {
            self.calls.borrow_mut().push(Call::Close);
            if self.fail_close {
                return Err(io::Error::new(io::ErrorKind::Other, "close failed"));
            }
            Ok(())
        }
    }

    fn expected_payload(octets: [u8; 6]) -> Vec<u8> {
        let mut data = vec![0xff; 6];
        for _ in 0..16 {
            data.extend(&octets);
        }
        data
    }

    #[test]
    fn test_magic_packet() {
        let mac = MacAddress::parse(VALID_MAC).unwrap();
        let packet = MagicPacket::new(&mac);
        assert_eq!(packet.as_bytes().len(), MAGIC_PACKET_LEN);
        assert_eq!(packet.as_bytes(), &expected_payload(VALID_OCTETS)[..]);
    }

    #[test]
    fn test_defaults() {
        let calls = Rc::new(RefCell::new(vec![]));
        let wol = WakeOnLan::builder()
            .mac_address(VALID_MAC)
            .unwrap()
            .build()
            .unwrap();
        wol.send(RecordingTransport {
            calls: calls.clone(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            *calls.borrow(),
            vec![
                Call::SendTo(
                    expected_payload(VALID_OCTETS),
                    SocketAddr::from((Ipv4Addr::BROADCAST, 9))
                ),
                Call::Close,
            ]
        );
    }

    #[test]
    fn test_overrides() {
        let calls = Rc::new(RefCell::new(vec![]));
        let wol = WakeOnLan::builder()
            .mac_address(VALID_MAC)
            .unwrap()
            .broadcast_ip_address("192.168.0.2")
            .port(99)
            .build()
            .unwrap();
        assert_eq!(wol.broadcast_ip_address(), "192.168.0.2");
        assert_eq!(wol.port(), 99);
        wol.send(RecordingTransport {
            calls: calls.clone(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            *calls.borrow(),
            vec![
                Call::SendTo(
                    expected_payload(VALID_OCTETS),
                    SocketAddr::from((Ipv4Addr::new(192, 168, 0, 2), 99))
                ),
                Call::Close,
            ]
        );
    }

    #[test]
    fn test_missing_mac() {
        let err = WakeOnLan::builder()
            .broadcast_ip_address("192.168.0.2")
            .port(99)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredField("mac_address")));
    }

    #[test]
    fn test_invalid_mac_fails_when_set() {
        for mac in ["AB:12:32:dF:2A", "AB:12:32:dF:2A:3B:A1", "AH:12:32:dF:2A:3B"] {
            let err = WakeOnLan::builder().mac_address(mac).unwrap_err();
            assert!(matches!(err, Error::InvalidMacAddress(ref input) if input == mac));
        }
    }

    #[test]
    fn test_send_failure_still_closes() {
        let calls = Rc::new(RefCell::new(vec![]));
        let wol = WakeOnLan::builder()
            .mac_address(VALID_MAC)
            .unwrap()
            .build()
            .unwrap();
        let err = wol
            .send(RecordingTransport {
                calls: calls.clone(),
                fail_send: true,
                fail_close: true,
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, Error::Transport(ref e) if e.to_string() == "network unreachable"));
        assert_eq!(calls.borrow().len(), 2);
        assert_eq!(calls.borrow()[1], Call::Close);
    }

    #[test]
    fn test_short_send_is_transport_error() {
        let calls = Rc::new(RefCell::new(vec![]));
        let wol = WakeOnLan::builder()
            .mac_address(VALID_MAC)
            .unwrap()
            .build()
            .unwrap();
        let err = wol
            .send(RecordingTransport {
                calls: calls.clone(),
                short_send: true,
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, Error::Transport(ref e) if e.kind() == io::ErrorKind::WriteZero));
        assert_eq!(calls.borrow().last(), Some(&Call::Close));
    }

    #[test]
    fn test_close_failure_reported() {
        let wol = WakeOnLan::builder()
            .mac_address(VALID_MAC)
            .unwrap()
            .build()
            .unwrap();
        let err = wol
            .send(RecordingTransport {
                fail_close: true,
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn test_unresolvable_address_still_closes() {
        let calls = Rc::new(RefCell::new(vec![]));
        let wol = WakeOnLan::builder()
            .mac_address(VALID_MAC)
            .unwrap()
            .broadcast_ip_address("not an address")
            .build()
            .unwrap();
        let err = wol
            .send(RecordingTransport {
                calls: calls.clone(),
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(*calls.borrow(), vec![Call::Close]);
    }

    #[test]
    fn test_udp_loopback() {
        let receiver = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let port = receiver.local_addr().unwrap().port();

        let wol = WakeOnLan::builder()
            .mac_address(VALID_MAC)
            .unwrap()
            .broadcast_ip_address("127.0.0.1")
            .port(port)
            .build()
            .unwrap();
        let transport = UdpTransport::bind_to(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).unwrap();
        wol.send(transport).unwrap();

        let mut buf = [0u8; 256];
        let len = receiver.recv(&mut buf).unwrap();
        assert_eq!(&buf[..len], &expected_payload(VALID_OCTETS)[..]);
    }
}
