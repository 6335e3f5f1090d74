//! Wirestub
//!
//! In-process HTTP client stubbing for tests. Wirestub replaces the transport
//! of a client under test with an intercepting one that answers each outbound
//! call from an ordered list of stub rules, without touching the network.
//!
//! # Features
//!
//! - **Request Matching**: Match by method, exact path, and literal query params
//! - **Canned Responses**: Return fixed bodies, including empty "no content"
//! - **Failure Simulation**: Stub HTTP error statuses per route
//! - **Auth Simulation**: Reject missing or wrong basic-auth credentials
//! - **Side Effects**: Observe matches through per-rule callbacks
//! - **Fixture Resolution**: Resolve named client settings from YAML
//!
//! # Example
//!
//! ```
//! use wirestub::{Client, ClientSettings, MockRegistry, xq};
//!
//! let mut client = Client::from_settings(ClientSettings::default());
//!
//! MockRegistry::new()
//!     .on("GET /users?page=1", xq("[{'name':'alice'}]").as_str())
//!     .error_on("GET /admin", 403, "Forbidden")
//!     .apply_to(&mut client);
//!
//! let response = client.get("/users?page=1").unwrap();
//! assert_eq!(response.text(), r#"[{"name":"alice"}]"#);
//!
//! // Anything not stubbed fails loudly, as a connectivity error.
//! assert!(client.get("/forgotten").unwrap_err().is_unreachable());
//! ```

pub mod client;
pub mod config;
pub mod json;
pub mod matcher;
pub mod registry;

pub use client::{Client, ClientError, Request, Response, Transport};
pub use config::{ClientSettings, ConfigError, ConfigStore};
pub use json::xq;
pub use matcher::{PatternError, RoutePattern};
pub use registry::MockRegistry;
