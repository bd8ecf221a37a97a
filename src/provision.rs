use std::thread;
use std::time::{Duration, Instant};

use crate::interfaces::network::NetworkLink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionState {
    Idle,
    Provisioning,
    Connected,
    Failed,
}

impl ProvisionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProvisionState::Connected | ProvisionState::Failed)
    }
}

/// Brings the link up once at startup. Without a timeout it waits as long as
/// the platform takes.
#[derive(Debug)]
pub struct Provisioner {
    state: ProvisionState,
    timeout: Option<Duration>,
    started: Option<Instant>,
}

impl Provisioner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Provisioner {
            state: ProvisionState::Idle,
            timeout,
            started: None,
        }
    }

    pub fn state(&self) -> ProvisionState {
        self.state
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    fn timed_out(&self) -> bool {
        match (self.timeout, self.started) {
            (Some(timeout), Some(started)) => started.elapsed() >= timeout,
            _ => false,
        }
    }

    pub fn step(&mut self, link: &mut dyn NetworkLink) -> ProvisionState {
        self.state = match self.state {
            ProvisionState::Idle if link.is_connected() => ProvisionState::Connected,
            ProvisionState::Idle => {
                self.started = Some(Instant::now());
                match link.start_provisioning() {
                    Ok(()) => ProvisionState::Provisioning,
                    Err(e) => {
                        log::warn!("[core] {e}");
                        ProvisionState::Failed
                    }
                }
            }
            ProvisionState::Provisioning if link.is_connected() => ProvisionState::Connected,
            ProvisionState::Provisioning if self.timed_out() => {
                log::warn!("[core] network provisioning timed out");
                ProvisionState::Failed
            }
            state => state,
        };
        self.state
    }

    /// Steps until the link is up or provisioning gave up
    pub fn run(&mut self, link: &mut dyn NetworkLink, poll_interval: Duration) -> ProvisionState {
        loop {
            let state = self.step(link);
            if state.is_terminal() {
                return state;
            }
            thread::sleep(poll_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::IpAddr;

    use super::*;
    use crate::interfaces::network::NetworkError;

    struct SlowLink {
        checks_until_up: Option<usize>,
        portal_fails: bool,
    }

    impl NetworkLink for SlowLink {
        fn mac_address(&self) -> Result<[u8; 6], NetworkError> {
            Ok([0, 1, 2, 3, 4, 5])
        }
        fn is_connected(&self) -> bool {
            self.checks_until_up == Some(0)
        }
        fn local_ip(&self) -> Option<IpAddr> {
            None
        }
        fn mode(&self) -> &str {
            "test"
        }
        fn start_provisioning(&mut self) -> Result<(), NetworkError> {
            if self.portal_fails {
                return Err(NetworkError::Provisioning("no radio".into()));
            }
            if let Some(n) = self.checks_until_up.as_mut() {
                *n = n.saturating_sub(1);
            }
            Ok(())
        }
    }

    #[test]
    fn already_connected_skips_provisioning() {
        let mut link = SlowLink {
            checks_until_up: Some(0),
            portal_fails: false,
        };
        let mut p = Provisioner::new(None);
        assert_eq!(p.step(&mut link), ProvisionState::Connected);
    }

    #[test]
    fn provisioning_then_connected() {
        let mut link = SlowLink {
            checks_until_up: Some(1),
            portal_fails: false,
        };
        let mut p = Provisioner::new(None);
        assert_eq!(p.step(&mut link), ProvisionState::Provisioning);
        assert_eq!(p.step(&mut link), ProvisionState::Connected);
        assert_eq!(p.step(&mut link), ProvisionState::Connected);
    }

    #[test]
    fn failure_is_terminal() {
        let mut link = SlowLink {
            checks_until_up: None,
            portal_fails: true,
        };
        let mut p = Provisioner::new(None);
        assert_eq!(p.run(&mut link, Duration::ZERO), ProvisionState::Failed);
    }

    #[test]
    fn timeout_gives_up() {
        let mut link = SlowLink {
            checks_until_up: None,
            portal_fails: false,
        };
        let mut p = Provisioner::new(Some(Duration::from_millis(30)));
        assert_eq!(
            p.run(&mut link, Duration::from_millis(5)),
            ProvisionState::Failed
        );
    }
}
