// In-memory stand-ins for the platform services, with shared handles so a
// test can poke at them after handing them to the controller.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::net::IpAddr;
use std::rc::Rc;

use fieldnode::api::{ApiError, ApiResponse, Incoming, RawRequest, RequestListener, Responder};
use fieldnode::interfaces::network::{NetworkError, NetworkLink};
use fieldnode::interfaces::system::{RuntimeInfo, SystemControl, SystemCounters};
use fieldnode::node_mgmt::FirmwareInfo;
use fieldnode::session::{
    ConnectOptions, DisconnectReason, InboundMessage, Transport, TransportError, TransportEvent,
};
use fieldnode::Platform;
use kvstore::KVDb;

pub const MAC: [u8; 6] = [0xa4, 0xcf, 0x12, 0x0b, 0x3d, 0x7e];
pub const CLIENT_ID: &str = "0b3d7e";

#[derive(Clone)]
pub struct Link(pub Rc<RefCell<LinkState>>);

pub struct LinkState {
    pub mac: Option<[u8; 6]>,
    pub up: bool,
    pub ip: Option<IpAddr>,
    pub status_checks: usize,
}

impl Default for Link {
    fn default() -> Self {
        Link(Rc::new(RefCell::new(LinkState {
            mac: Some(MAC),
            up: true,
            ip: "192.168.1.20".parse().ok(),
            status_checks: 0,
        })))
    }
}

impl Link {
    pub fn set_up(&self, up: bool) {
        self.0.borrow_mut().up = up;
    }
}

impl NetworkLink for Link {
    fn mac_address(&self) -> Result<[u8; 6], NetworkError> {
        self.0.borrow().mac.ok_or(NetworkError::NoHardwareAddress)
    }
    fn is_connected(&self) -> bool {
        let mut state = self.0.borrow_mut();
        state.status_checks += 1;
        state.up
    }
    fn local_ip(&self) -> Option<IpAddr> {
        self.0.borrow().ip
    }
    fn mode(&self) -> &str {
        "ethernet"
    }
}

#[derive(Default)]
pub struct Wire {
    pub connects: Vec<ConnectOptions>,
    pub connect_results: VecDeque<Result<(), DisconnectReason>>,
    pub subscriptions: Vec<String>,
    pub published: Vec<(String, String, bool)>,
    pub inbound: VecDeque<TransportEvent>,
}

#[derive(Clone, Default)]
pub struct Broker(pub Rc<RefCell<Wire>>);

impl Broker {
    pub fn deliver(&self, topic: &str, payload: &[u8]) {
        self.0
            .borrow_mut()
            .inbound
            .push_back(TransportEvent::Message(InboundMessage {
                topic: topic.to_string(),
                payload: payload.to_vec(),
            }));
    }

    pub fn published_to(&self, topic: &str) -> Vec<String> {
        self.0
            .borrow()
            .published
            .iter()
            .filter(|(t, _, _)| t == topic)
            .map(|(_, payload, _)| payload.clone())
            .collect()
    }
}

impl Transport for Broker {
    fn connect(&mut self, options: &ConnectOptions) -> Result<(), DisconnectReason> {
        let mut wire = self.0.borrow_mut();
        wire.connects.push(options.clone());
        wire.connect_results.pop_front().unwrap_or(Ok(()))
    }
    fn disconnect(&mut self) {}
    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.0.borrow_mut().subscriptions.push(topic.to_string());
        Ok(())
    }
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), TransportError> {
        self.0.borrow_mut().published.push((
            topic.to_string(),
            String::from_utf8_lossy(payload).to_string(),
            retain,
        ));
        Ok(())
    }
    fn poll(&mut self) -> Option<TransportEvent> {
        self.0.borrow_mut().inbound.pop_front()
    }
}

#[derive(Clone, Default)]
pub struct Requests {
    pub pending: Rc<RefCell<VecDeque<RawRequest>>>,
    pub answers: Rc<RefCell<Vec<ApiResponse>>>,
}

impl Requests {
    pub fn get(&self, url: &str) {
        self.pending.borrow_mut().push_back(RawRequest {
            method: "GET".into(),
            url: url.into(),
            body: Vec::new(),
        });
    }
}

struct Capture(Rc<RefCell<Vec<ApiResponse>>>);

impl Responder for Capture {
    fn respond(self: Box<Self>, response: ApiResponse) -> Result<(), ApiError> {
        self.0.borrow_mut().push(response);
        Ok(())
    }
}

impl RequestListener for Requests {
    fn accept(&mut self) -> Result<Option<Incoming>, ApiError> {
        Ok(self.pending.borrow_mut().pop_front().map(|request| Incoming {
            request,
            responder: Box::new(Capture(self.answers.clone())),
        }))
    }
}

pub struct FixedRuntime;

impl RuntimeInfo for FixedRuntime {
    fn counters(&self) -> SystemCounters {
        SystemCounters {
            memory_total_bytes: 4096,
            memory_used_bytes: 1024,
            memory_free_bytes: 3072,
            memory_available_bytes: 3072,
            uptime_seconds: 42,
            store_used_bytes: 0,
        }
    }
}

#[derive(Clone, Default)]
pub struct Restarts(pub Rc<RefCell<usize>>);

impl SystemControl for Restarts {
    fn restart(&mut self) {
        *self.0.borrow_mut() += 1;
    }
}

pub struct Handles {
    pub link: Link,
    pub broker: Broker,
    pub requests: Requests,
    pub restarts: Restarts,
}

pub fn platform(store: Option<KVDb>) -> (Platform, Handles) {
    let handles = Handles {
        link: Link::default(),
        broker: Broker::default(),
        requests: Requests::default(),
        restarts: Restarts::default(),
    };
    let platform = Platform {
        link: Box::new(handles.link.clone()),
        transport: Box::new(handles.broker.clone()),
        listener: Box::new(handles.requests.clone()),
        runtime: Box::new(FixedRuntime),
        system: Box::new(handles.restarts.clone()),
        store,
    };
    (platform, handles)
}

pub fn firmware() -> FirmwareInfo {
    FirmwareInfo {
        name: "Test Dimmer".into(),
        short_name: "dimmer".into(),
        maker: "Acme".into(),
        version: "0.1.0".into(),
        github_url: None,
    }
}
