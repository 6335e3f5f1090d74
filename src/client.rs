//! HTTP client abstraction with a pluggable transport.
//!
//! The client carries no real network code. Every call goes through a
//! [`Transport`], and tests swap that transport for a stubbing one via
//! [`MockRegistry::apply_to`](crate::registry::MockRegistry::apply_to).

use crate::config::ClientSettings;
use base64::Engine;
use std::collections::HashMap;
use std::rc::Rc;

/// An outbound HTTP request as seen by a [`Transport`].
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method, uppercase
    pub method: String,
    /// Request path, no query string
    pub path: String,
    /// Raw query string, without the leading `?`
    pub query_string: Option<String>,
    /// Request headers (single-valued)
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Create a request for `method` and `target`, where `target` may carry a
    /// query string (`/users?page=1`).
    pub fn new(method: &str, target: &str) -> Self {
        let (path, query_string) = match target.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (target.to_string(), None),
        };
        Self {
            method: method.to_uppercase(),
            path,
            query_string,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Set a header, replacing any existing value.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response produced by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase
    pub reason: String,
    /// Response body
    pub body: Vec<u8>,
}

impl Response {
    /// Build a 200 OK response with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            reason: "OK".to_string(),
            body: body.into(),
        }
    }

    /// Response body as UTF-8 text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// True when the body is empty ("no content").
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Errors surfaced by a client call.
///
/// The two variants are deliberately distinct kinds: `Status` is a (possibly
/// simulated) HTTP error from the remote, `Unreachable` is a connectivity
/// failure that never produced a status at all.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ClientError {
    /// The server answered with an error status.
    #[error("server returned {status} {reason}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Reason phrase
        reason: String,
    },

    /// No transport could reach the target at all.
    #[error("cannot reach {method} {path}: no route")]
    Unreachable {
        /// HTTP method of the failed call
        method: String,
        /// Request path of the failed call
        path: String,
    },
}

impl ClientError {
    /// Status code of an HTTP-status failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Unreachable { .. } => None,
        }
    }

    /// True for the connectivity-style failure kind.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ClientError::Unreachable { .. })
    }
}

/// The interception point: everything a [`Client`] sends goes through here.
pub trait Transport {
    /// Handle one outbound request, returning a response or failing the call.
    fn send(&self, request: &Request) -> Result<Response, ClientError>;
}

/// Transport of a freshly constructed client. Fails every call, since the
/// crate ships no real network transport.
struct UnboundTransport;

impl Transport for UnboundTransport {
    fn send(&self, request: &Request) -> Result<Response, ClientError> {
        Err(ClientError::Unreachable {
            method: request.method.clone(),
            path: request.path.clone(),
        })
    }
}

/// A blocking HTTP client handle.
///
/// Owns its settings and a swappable transport. Not `Send`/`Sync`: one client
/// per test, driven from a single thread.
pub struct Client {
    settings: ClientSettings,
    transport: Rc<dyn Transport>,
}

impl Client {
    /// Create a client from resolved settings. Until a transport is installed
    /// every call fails as unreachable.
    pub fn from_settings(settings: ClientSettings) -> Self {
        Self {
            settings,
            transport: Rc::new(UnboundTransport),
        }
    }

    /// The settings this client was built from.
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Replace the transport wholesale. The previous transport is dropped;
    /// other clients bound to it are unaffected.
    pub fn set_transport(&mut self, transport: Rc<dyn Transport>) {
        self.transport = transport;
    }

    /// Send a request through the current transport, attaching basic-auth
    /// credentials from the settings when present.
    pub fn execute(&self, mut request: Request) -> Result<Response, ClientError> {
        if let (Some(user), Some(password)) = (&self.settings.username, &self.settings.password) {
            let token = base64::engine::general_purpose::STANDARD
                .encode(format!("{}:{}", user, password));
            request
                .headers
                .entry("Authorization".to_string())
                .or_insert_with(|| format!("Basic {}", token));
        }
        self.transport.send(&request)
    }

    /// GET `target` (path with optional query string).
    pub fn get(&self, target: &str) -> Result<Response, ClientError> {
        self.execute(Request::new("GET", target))
    }

    /// POST `body` to `target`.
    pub fn post(&self, target: &str, body: &str) -> Result<Response, ClientError> {
        self.execute(Request::new("POST", target).with_body(body.as_bytes().to_vec()))
    }

    /// PUT `body` to `target`.
    pub fn put(&self, target: &str, body: &str) -> Result<Response, ClientError> {
        self.execute(Request::new("PUT", target).with_body(body.as_bytes().to_vec()))
    }

    /// DELETE `target`.
    pub fn delete(&self, target: &str) -> Result<Response, ClientError> {
        self.execute(Request::new("DELETE", target))
    }
}

/// Extract `(user, password)` from a basic-auth `Authorization` header, if the
/// request carries a well-formed one.
pub(crate) fn basic_credentials(request: &Request) -> Option<(String, String)> {
    let value = request.header("authorization")?;
    let token = value.strip_prefix("Basic ").or_else(|| value.strip_prefix("basic "))?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(token.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}
