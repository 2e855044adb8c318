//! Interface address enumeration

use std::net::IpAddr;

use tracing::debug;

use crate::error::InventoryError;

/// One address assigned to an interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    /// Interface name
    pub name: String,
    pub ip: IpAddr,
    pub netmask: IpAddr,
    pub broadcast: Option<IpAddr>,
}

impl InterfaceAddress {
    pub fn new(name: impl Into<String>, ip: IpAddr, netmask: IpAddr) -> Self {
        Self {
            name: name.into(),
            ip,
            netmask,
            broadcast: None,
        }
    }

    #[must_use]
    pub fn with_broadcast(mut self, broadcast: IpAddr) -> Self {
        self.broadcast = Some(broadcast);
        self
    }
}

/// Source of the host's interface address list
pub trait AddressSource: Send + Sync {
    /// All addresses, one entry per (interface, address) pair
    ///
    /// # Errors
    /// Returns `InventoryError::AddressEnumeration` if the list cannot be read.
    fn addresses(&self) -> Result<Vec<InterfaceAddress>, InventoryError>;
}

/// Address list from the operating system (`getifaddrs`)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAddressSource;

impl AddressSource for SystemAddressSource {
    fn addresses(&self) -> Result<Vec<InterfaceAddress>, InventoryError> {
        let interfaces = if_addrs::get_if_addrs()
            .map_err(|e| InventoryError::AddressEnumeration(e.to_string()))?;

        debug!(count = interfaces.len(), "enumerated interface addresses");

        Ok(interfaces
            .into_iter()
            .map(|iface| match iface.addr {
                if_addrs::IfAddr::V4(v4) => InterfaceAddress {
                    name: iface.name,
                    ip: IpAddr::V4(v4.ip),
                    netmask: IpAddr::V4(v4.netmask),
                    broadcast: v4.broadcast.map(IpAddr::V4),
                },
                if_addrs::IfAddr::V6(v6) => InterfaceAddress {
                    name: iface.name,
                    ip: IpAddr::V6(v6.ip),
                    netmask: IpAddr::V6(v6.netmask),
                    broadcast: v6.broadcast.map(IpAddr::V6),
                },
            })
            .collect())
    }
}

/// Group addresses by interface name, keeping first-seen order
///
/// Each entry carries the interface's first IPv4 address, if any.
#[must_use]
pub fn unique_interfaces(addresses: &[InterfaceAddress]) -> Vec<(&str, Option<&InterfaceAddress>)> {
    let mut out: Vec<(&str, Option<&InterfaceAddress>)> = Vec::new();

    for addr in addresses {
        let ipv4 = addr.ip.is_ipv4().then_some(addr);
        match out.iter_mut().find(|(name, _)| *name == addr.name) {
            Some((_, first_v4)) => {
                if first_v4.is_none() {
                    *first_v4 = ipv4;
                }
            }
            None => out.push((addr.name.as_str(), ipv4)),
        }
    }

    out
}
