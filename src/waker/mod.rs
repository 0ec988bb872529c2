mod packet;

pub use packet::{interface_ipv4, MagicPacket, PacketSender, UdpSender, WakeError, MAGIC_PACKET_LEN};

use crate::alias::{AliasStore, StoreError};

#[cfg(not(feature = "log"))]
use crate::debug;
#[cfg(feature = "log")]
use log::debug;

pub const DEFAULT_BROADCAST: &str = "255.255.255.255";
pub const DEFAULT_PORT: u16 = 9;

/// Command line side of a wake request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeOptions {
    /// Overrides whatever interface a stored alias carries.
    pub interface: Option<String>,
    pub broadcast: String,
    pub port: u16,
}

impl Default for WakeOptions {
    fn default() -> Self {
        Self {
            interface: None,
            broadcast: DEFAULT_BROADCAST.to_owned(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub mac: String,
    pub destination: String,
    pub iface: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WakeResolver {
    options: WakeOptions,
}

impl WakeResolver {
    pub fn new(options: WakeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &WakeOptions {
        &self.options
    }

    pub fn destination(&self) -> String {
        format!("{}:{}", self.options.broadcast, self.options.port)
    }

    /// `target` is either an alias name or a literal mac. Targets that match no
    /// alias are passed through untouched, the sender is the one rejecting
    /// malformed addresses.
    pub fn resolve(&self, target: &str, store: &AliasStore) -> Result<ResolvedTarget, StoreError> {
        let (mac, mut iface) = match store.get(target) {
            Ok(alias) => {
                debug!("{} is an alias for {}", target, alias.mac);
                (alias.mac, alias.iface)
            }
            Err(e) if e.is_not_found() => {
                debug!("{} is not an alias, using it as mac address", target);
                (target.to_owned(), None)
            }
            Err(e) => return Err(e),
        };

        if let Some(i) = self.options.interface.as_ref().filter(|i| !i.is_empty()) {
            debug!("interface {} given on the command line", i);
            iface = Some(i.clone());
        }

        Ok(ResolvedTarget {
            mac,
            destination: self.destination(),
            iface,
        })
    }
}
