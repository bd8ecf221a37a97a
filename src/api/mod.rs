//! Minimal management request surface
//!
//! Serves the built-in adoption route and whatever GET/POST handlers the
//! firmware registers, one request per maintenance cycle. When it starts it
//! also applies the persisted session settings, which must therefore happen
//! after the identity defaults are in place and before the first connect.

use std::io;

use kvstore::KVDb;
use serde_json::{json, Value};
use thiserror::Error;

use crate::constants::{keys, topics};
use crate::session::{MqttSettings, PersistedSettings};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("could not bind management listener: {0}")]
    Bind(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            _ => None,
        }
    }
}

/// A request as read off the wire, before routing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    pub method: String,
    pub url: String,
    pub body: Vec<u8>,
}

/// A routed request handed to a firmware handler
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// Parsed JSON body; `Null` for GET and empty POST bodies
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        ApiResponse { status: 200, body }
    }

    pub fn error(status: u16, message: &str) -> Self {
        ApiResponse {
            status,
            body: json!({ "error": message }),
        }
    }
}

pub type RouteHandler = Box<dyn FnMut(&ApiRequest) -> ApiResponse>;

pub trait Responder {
    fn respond(self: Box<Self>, response: ApiResponse) -> Result<(), ApiError>;
}

pub struct Incoming {
    pub request: RawRequest,
    pub responder: Box<dyn Responder>,
}

/// Source of management requests. `accept` must not block.
pub trait RequestListener {
    fn accept(&mut self) -> Result<Option<Incoming>, ApiError>;
}

struct Route {
    method: Method,
    path: String,
    handler: RouteHandler,
}

pub struct ManagementSurface {
    listener: Box<dyn RequestListener>,
    store: Option<KVDb>,
    routes: Vec<Route>,
    started: bool,
}

fn route_path(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

impl ManagementSurface {
    pub fn new(listener: Box<dyn RequestListener>, store: Option<KVDb>) -> Self {
        ManagementSurface {
            listener,
            store,
            routes: Vec::new(),
            started: false,
        }
    }

    /// Registers a handler; a later registration for the same method and
    /// path replaces the earlier one.
    pub fn register(&mut self, method: Method, path: &str, handler: RouteHandler) {
        let path = route_path(path).to_string();
        self.routes.retain(|r| !(r.method == method && r.path == path));
        self.routes.push(Route {
            method,
            path,
            handler,
        });
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Starts serving and applies persisted session settings on top of the
    /// current ones.
    pub fn begin(&mut self, settings: &mut MqttSettings) {
        match &self.store {
            Some(store) => match store.get::<PersistedSettings>(keys::MQTT) {
                Ok(Some(persisted)) => {
                    log::info!("[core] applying persisted mqtt settings");
                    settings.apply(&persisted);
                }
                Ok(None) => log::debug!("[core] no persisted mqtt settings"),
                Err(e) => log::warn!("[core] could not read persisted mqtt settings: {e}"),
            },
            None => log::debug!("[core] no settings store available"),
        }
        self.started = true;
    }

    /// Accepts and answers at most one request. Returns whether one was served.
    pub fn serve_one<F>(&mut self, adopt: F) -> Result<bool, ApiError>
    where
        F: FnOnce() -> Value,
    {
        if !self.started {
            return Ok(false);
        }
        let Some(incoming) = self.listener.accept()? else {
            return Ok(false);
        };

        let response = self.route(&incoming.request, adopt);
        log::debug!(
            "[core] {} {} -> {}",
            incoming.request.method,
            incoming.request.url,
            response.status
        );
        incoming.responder.respond(response)?;
        Ok(true)
    }

    fn route<F>(&mut self, raw: &RawRequest, adopt: F) -> ApiResponse
    where
        F: FnOnce() -> Value,
    {
        let path = route_path(&raw.url);
        let Some(method) = Method::parse(&raw.method) else {
            return ApiResponse::error(404, "not found");
        };

        if method == Method::Get && path == topics::ADOPT_ROUTE {
            return ApiResponse::ok(adopt());
        }

        let Some(route) = self
            .routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path)
        else {
            return ApiResponse::error(404, "not found");
        };

        let body = match method {
            Method::Get => Value::Null,
            Method::Post if raw.body.iter().all(u8::is_ascii_whitespace) => Value::Null,
            Method::Post => match serde_json::from_slice(&raw.body) {
                Ok(body) => body,
                Err(_) => return ApiResponse::error(400, "invalid json body"),
            },
        };

        let request = ApiRequest {
            method,
            path: path.to_string(),
            body,
        };
        (route.handler)(&request)
    }
}
