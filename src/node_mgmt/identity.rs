use std::fmt;

use crate::interfaces::network::{NetworkError, NetworkLink};

/// Hardware address of the device, captured once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    mac: [u8; 6],
}

impl Identity {
    pub fn new(mac: [u8; 6]) -> Self {
        Identity { mac }
    }

    /// Reads the hardware address from the network stack.
    ///
    /// There is no fallback: every identifier the device uses derives from
    /// this address, so a failure here is fatal for startup.
    pub fn resolve(link: &dyn NetworkLink) -> Result<Self, NetworkError> {
        let mac = link.mac_address()?;
        Ok(Identity { mac })
    }

    /// Default client id: lowercase hex of the last three bytes
    pub fn default_client_id(&self) -> String {
        hex::encode(&self.mac[3..])
    }
}

/// Colon-separated uppercase form, e.g. `A4:CF:12:0B:3D:7E`
impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.mac.iter().map(|b| hex::encode_upper([*b])).collect();
        f.write_str(&parts.join(":"))
    }
}

#[cfg(test)]
mod tests {
    use std::net::IpAddr;

    use super::*;

    struct NoStack;

    impl NetworkLink for NoStack {
        fn mac_address(&self) -> Result<[u8; 6], NetworkError> {
            Err(NetworkError::NoHardwareAddress)
        }
        fn is_connected(&self) -> bool {
            false
        }
        fn local_ip(&self) -> Option<IpAddr> {
            None
        }
        fn mode(&self) -> &str {
            "none"
        }
    }

    const MAC: [u8; 6] = [0xa4, 0xcf, 0x12, 0x0b, 0x3d, 0x7e];

    #[test]
    fn display_form() {
        assert_eq!(Identity::new(MAC).to_string(), "A4:CF:12:0B:3D:7E");
        assert_eq!(Identity::new([0; 6]).to_string(), "00:00:00:00:00:00");
    }

    #[test]
    fn client_id_uses_last_three_bytes() {
        assert_eq!(Identity::new(MAC).default_client_id(), "0b3d7e");
        assert_eq!(Identity::new([1, 2, 3, 0, 0, 5]).default_client_id(), "000005");
    }

    #[test]
    fn unavailable_stack_is_propagated() {
        assert!(matches!(
            Identity::resolve(&NoStack),
            Err(NetworkError::NoHardwareAddress)
        ));
    }
}
