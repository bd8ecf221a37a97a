use std::net::{IpAddr, Ipv4Addr};

use nix::ifaddrs::{getifaddrs, InterfaceAddress};
use nix::net::if_::InterfaceFlags;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("network stack unavailable: {0}")]
    Unavailable(#[from] nix::Error),
    #[error("no hardware address found on any network interface")]
    NoHardwareAddress,
    #[error("could not start provisioning: {0}")]
    Provisioning(String),
}

/// The single IP link the device runs on
pub trait NetworkLink {
    fn mac_address(&self) -> Result<[u8; 6], NetworkError>;
    fn is_connected(&self) -> bool;
    fn local_ip(&self) -> Option<IpAddr>;
    /// Short name of the link type, reported in the adoption document
    fn mode(&self) -> &str;
    /// Kick off whatever the platform does to obtain a link (portal, DHCP...).
    fn start_provisioning(&mut self) -> Result<(), NetworkError> {
        Ok(())
    }
}

// Uses the `getifaddrs` call to retrieve a list of network interfaces on the
// host device. The primary interface is picked from a priority list; if none
// of them is present the first interface with a non-zero MAC is used.
pub struct HostNetwork;

fn mac_is_non_zero(mac: &[u8; 6]) -> bool {
    mac.iter().any(|&x| x != 0)
}

fn get_interface_priority(interface_name: &str) -> Option<usize> {
    const IFN_PRIORITY: &[&str] = &["eth0", "en0", "eth1", "en1", "wlan0", "wlan1"];

    IFN_PRIORITY.iter().position(|&x| x == interface_name)
}

fn link_mac(interface: &InterfaceAddress) -> Option<[u8; 6]> {
    interface
        .address
        .as_ref()
        .and_then(|addr| addr.as_link_addr())
        .and_then(|link| link.addr())
        .filter(mac_is_non_zero)
}

fn is_usable(interface: &InterfaceAddress) -> bool {
    interface
        .flags
        .contains(InterfaceFlags::IFF_UP | InterfaceFlags::IFF_RUNNING)
        && !interface.flags.contains(InterfaceFlags::IFF_LOOPBACK)
}

fn ipv4_of(interface: &InterfaceAddress) -> Option<Ipv4Addr> {
    interface
        .address
        .as_ref()
        .and_then(|addr| addr.as_sockaddr_in())
        .map(|sin| sin.ip())
        .filter(|ip| !ip.is_unspecified())
}

fn get_primary_mac() -> Result<Option<[u8; 6]>, NetworkError> {
    let mut best_prio = usize::MAX;
    let mut best_mac: Option<[u8; 6]> = None;

    for interface in getifaddrs()? {
        let Some(mac) = link_mac(&interface) else {
            continue;
        };
        if best_mac.is_none() {
            best_mac = Some(mac);
            log::debug!("Fallback MAC: {}", hex::encode(mac));
        }
        if let Some(prio) = get_interface_priority(&interface.interface_name) {
            if prio < best_prio {
                best_mac = Some(mac);
                best_prio = prio;
                log::debug!("Found MAC {} with priority {}", hex::encode(mac), prio);
            }
        }
    }
    Ok(best_mac)
}

impl NetworkLink for HostNetwork {
    fn mac_address(&self) -> Result<[u8; 6], NetworkError> {
        get_primary_mac()?.ok_or(NetworkError::NoHardwareAddress)
    }

    fn is_connected(&self) -> bool {
        self.local_ip().is_some()
    }

    fn local_ip(&self) -> Option<IpAddr> {
        let interfaces = match getifaddrs() {
            Ok(ifiter) => ifiter,
            Err(e) => {
                log::warn!("Could not list network interfaces: {e}");
                return None;
            }
        };
        let mut best: Option<(usize, Ipv4Addr)> = None;
        for interface in interfaces.filter(is_usable) {
            if let Some(ip) = ipv4_of(&interface) {
                let prio = get_interface_priority(&interface.interface_name).unwrap_or(usize::MAX);
                if best.map_or(true, |(p, _)| prio < p) {
                    best = Some((prio, ip));
                }
            }
        }
        best.map(|(_, ip)| IpAddr::V4(ip))
    }

    fn mode(&self) -> &str {
        "host"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_priorities() {
        assert_eq!(get_interface_priority("eth0"), Some(0));
        assert_eq!(get_interface_priority("wlan0"), Some(4));
        assert_eq!(get_interface_priority("en3"), None);
    }

    #[test]
    fn non_zero_mac() {
        assert!(mac_is_non_zero(&[1, 2, 3, 4, 5, 6]));
        assert!(!mac_is_non_zero(&[0, 0, 0, 0, 0, 0]));
    }

    #[test]
    fn host_link_ip_is_never_loopback() {
        if let Some(ip) = HostNetwork.local_ip() {
            assert!(!ip.is_loopback());
            assert!(HostNetwork.is_connected());
        }
    }
}
