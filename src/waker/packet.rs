use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::str::FromStr;

use mac_address::{MacAddress, MacParseError};
use pnet::datalink;

#[cfg(not(feature = "log"))]
use crate::debug;
#[cfg(feature = "log")]
use log::debug;

/// 6 bytes of sync stream, then the target address 16 times.
pub const MAGIC_PACKET_LEN: usize = 6 + 16 * 6;

#[derive(Debug)]
pub enum WakeError {
    InvalidMac(String, MacParseError),
    NoSuchInterface(String),
    NoIpv4Address(String),
    IOError(std::io::Error),
    ShortWrite(usize),
}

impl From<std::io::Error> for WakeError {
    fn from(value: std::io::Error) -> Self {
        WakeError::IOError(value)
    }
}

impl Display for WakeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WakeError::InvalidMac(m, e) => write!(f, "invalid mac address `{}`: {}", m, e),
            WakeError::NoSuchInterface(i) => write!(f, "no such interface: {}", i),
            WakeError::NoIpv4Address(i) => write!(f, "interface {} has no ipv4 address", i),
            WakeError::IOError(e) => write!(f, "{}", e),
            WakeError::ShortWrite(n) => write!(f, "magic packet truncated: {} of {} bytes sent", n, MAGIC_PACKET_LEN),
        }
    }
}

impl Error for WakeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WakeError::InvalidMac(_, e) => Some(e),
            WakeError::IOError(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicPacket {
    mac: MacAddress,
    payload: [u8; MAGIC_PACKET_LEN],
}

impl MagicPacket {
    /// Accepts `:` or `-` delimited hex octets.
    pub fn new(mac: &str) -> Result<MagicPacket, WakeError> {
        let addr = MacAddress::from_str(mac.trim())
            .map_err(|e| WakeError::InvalidMac(mac.to_owned(), e))?;
        let mut payload = [0xffu8; MAGIC_PACKET_LEN];
        for chunk in payload[6..].chunks_exact_mut(6) {
            chunk.copy_from_slice(&addr.bytes());
        }
        Ok(MagicPacket { mac: addr, payload })
    }

    pub fn mac(&self) -> MacAddress {
        self.mac
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }
}

/// Puts a magic packet for `mac` on the wire towards `destination` (`ip:port`).
pub trait PacketSender {
    fn send(&self, mac: &str, destination: &str, iface: Option<&str>) -> Result<(), WakeError>;
}

/// Sends over a broadcast enabled UDP socket. With an interface the socket is
/// bound to that interface's first IPv4 address.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpSender;

impl PacketSender for UdpSender {
    fn send(&self, mac: &str, destination: &str, iface: Option<&str>) -> Result<(), WakeError> {
        let packet = MagicPacket::new(mac)?;
        let local = match iface {
            Some(name) => SocketAddr::new(interface_ipv4(name)?, 0),
            None => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        };
        debug!("binding udp socket to {}", local);
        let socket = UdpSocket::bind(local)?;
        socket.set_broadcast(true)?;
        debug!("sending magic packet for {} to {}", packet.mac(), destination);
        let sent = socket.send_to(packet.as_bytes(), destination)?;
        if sent != MAGIC_PACKET_LEN {
            return Err(WakeError::ShortWrite(sent));
        }
        Ok(())
    }
}

pub fn interface_ipv4(name: &str) -> Result<IpAddr, WakeError> {
    let iface = datalink::interfaces()
        .into_iter()
        .find(|i| i.name == name)
        .ok_or_else(|| WakeError::NoSuchInterface(name.to_owned()))?;
    iface.ips
        .iter()
        .find(|ip| ip.is_ipv4())
        .map(|ip| ip.ip())
        .ok_or_else(|| WakeError::NoIpv4Address(name.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        let p = MagicPacket::new("01:23:45:67:89:ab").unwrap();
        let bytes = p.as_bytes();
        assert_eq!(bytes.len(), 102);
        assert!(bytes[..6].iter().all(|b| *b == 0xff));
        for rep in bytes[6..].chunks(6) {
            assert_eq!(rep, &[0x01, 0x23, 0x45, 0x67, 0x89, 0xab]);
        }
    }

    #[test]
    fn hyphen_delimited() {
        let a = MagicPacket::new("01-23-45-67-89-AB").unwrap();
        let b = MagicPacket::new("01:23:45:67:89:ab").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_mac() {
        assert!(matches!(MagicPacket::new("kwae"), Err(WakeError::InvalidMac(..))));
        assert!(matches!(MagicPacket::new("01:23:45:67:89"), Err(WakeError::InvalidMac(..))));
        assert!(matches!(UdpSender.send("zz:zz:zz:zz:zz:zz", "127.0.0.1:9", None), Err(WakeError::InvalidMac(..))));
    }

    #[test]
    fn unknown_interface() {
        assert!(matches!(
            interface_ipv4("wol-no-such-if0"),
            Err(WakeError::NoSuchInterface(..))
        ));
    }

    #[test]
    fn send_to_loopback() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let dest = receiver.local_addr().unwrap().to_string();
        UdpSender.send("00:11:22:33:44:55", &dest, None).unwrap();
        let mut buf = [0u8; 256];
        let (n, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(n, MAGIC_PACKET_LEN);
        assert_eq!(&buf[6..12], &[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    }
}
