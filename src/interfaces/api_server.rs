use std::net::{SocketAddr, ToSocketAddrs};

use tiny_http::{Header, Request, Response, Server};

use crate::api::{ApiError, ApiResponse, Incoming, RawRequest, RequestListener, Responder};

/// Non-blocking HTTP listener for the management surface
pub struct HttpListener {
    server: Server,
}

impl HttpListener {
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self, ApiError> {
        let server = Server::http(addr).map_err(|e| ApiError::Bind(e.to_string()))?;
        Ok(HttpListener { server })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }
}

struct HttpResponder(Request);

impl Responder for HttpResponder {
    fn respond(self: Box<Self>, response: ApiResponse) -> Result<(), ApiError> {
        let mut reply =
            Response::from_string(response.body.to_string()).with_status_code(response.status);
        if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
            reply = reply.with_header(header);
        }
        self.0.respond(reply)?;
        Ok(())
    }
}

impl RequestListener for HttpListener {
    fn accept(&mut self) -> Result<Option<Incoming>, ApiError> {
        let Some(mut request) = self.server.try_recv()? else {
            return Ok(None);
        };

        let mut body = Vec::new();
        request.as_reader().read_to_end(&mut body)?;

        Ok(Some(Incoming {
            request: RawRequest {
                method: request.method().to_string(),
                url: request.url().to_string(),
                body,
            },
            responder: Box::new(HttpResponder(request)),
        }))
    }
}
