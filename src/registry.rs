//! Mock responder registry.
//!
//! Holds an ordered list of stub rules plus an optional basic-auth policy,
//! and installs itself as a [`Transport`] on a client under test. Each
//! intercepted call is answered by the first matching rule, by a simulated
//! auth failure, or by the unrouted failure when nothing is stubbed.

use crate::client::{basic_credentials, Client, ClientError, Request, Response, Transport};
use crate::matcher::RoutePattern;
use std::rc::Rc;
use tracing::{debug, warn};

/// Side effect invoked when a success rule fires. Test-observation hook only;
/// mutate through `Rc<Cell<_>>` or similar.
pub type SideEffect = Rc<dyn Fn()>;

/// What a matched rule does to the intercepted call.
#[derive(Clone)]
enum Outcome {
    /// Answer with 200 and this body (empty string = no content).
    Body(String),
    /// Fail as if the remote returned this status, with no body.
    Error { status: u16, reason: String },
}

/// One registered (pattern, outcome) pair.
#[derive(Clone)]
struct Rule {
    pattern: RoutePattern,
    outcome: Outcome,
    on_match: Option<SideEffect>,
}

/// Basic-auth policy checked before any rule matching.
///
/// Both halves are optional and set independently; with neither half set the
/// policy is inert.
#[derive(Clone, Default)]
struct AuthPolicy {
    /// Status/reason for a request carrying no credentials
    no_auth: Option<(u16, String)>,
    /// Expected credentials and the status/reason for a mismatch
    bad_auth: Option<BadAuth>,
}

#[derive(Clone)]
struct BadAuth {
    user: String,
    password: String,
    status: u16,
    reason: String,
}

impl AuthPolicy {
    fn is_enforced(&self) -> bool {
        self.no_auth.is_some() || self.bad_auth.is_some()
    }

    /// Evaluate the policy against one request. `Ok(())` means rule matching
    /// may proceed.
    fn check(&self, request: &Request) -> Result<(), ClientError> {
        if !self.is_enforced() {
            return Ok(());
        }

        match basic_credentials(request) {
            None => {
                // Missing credentials: prefer the no-auth status, but a
                // configured expectation still fails the call on its own.
                let (status, reason) = match (&self.no_auth, &self.bad_auth) {
                    (Some((status, reason)), _) => (*status, reason.clone()),
                    (None, Some(expected)) => (expected.status, expected.reason.clone()),
                    (None, None) => return Ok(()),
                };
                Err(ClientError::Status { status, reason })
            }
            Some((user, password)) => match &self.bad_auth {
                Some(expected) if user != expected.user || password != expected.password => {
                    Err(ClientError::Status {
                        status: expected.status,
                        reason: expected.reason.clone(),
                    })
                }
                _ => Ok(()),
            },
        }
    }
}

/// Ordered registry of stub rules for one test.
///
/// Built with the chaining methods, then bound to one or more clients with
/// [`apply_to`](MockRegistry::apply_to). Rules are matched in registration
/// order, first match wins; duplicates are legal and simply unreachable after
/// the first.
///
/// # Example
///
/// ```
/// use wirestub::{Client, ClientSettings, MockRegistry, xq};
///
/// let mut client = Client::from_settings(ClientSettings::default());
/// MockRegistry::new()
///     .on("GET /users", xq("[{'name':'alice'}]").as_str())
///     .error_on("GET /teapot", 418, "I'm a teapot")
///     .apply_to(&mut client);
///
/// assert_eq!(client.get("/users").unwrap().text(), r#"[{"name":"alice"}]"#);
/// assert!(client.get("/teapot").is_err());
/// ```
#[derive(Clone, Default)]
pub struct MockRegistry {
    rules: Vec<Rule>,
    auth: AuthPolicy,
}

impl MockRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a success rule: a request matching `route` is answered with
    /// `body` (empty string for a no-content response).
    ///
    /// `route` is of the form `"METHOD /path[?query]"`; query parameters, if
    /// given, are literal values the request must carry.
    ///
    /// # Panics
    ///
    /// Panics on a malformed route pattern. A bad pattern is a broken test,
    /// not a runtime condition.
    pub fn on(self, route: &str, body: &str) -> Self {
        self.push_rule(route, Outcome::Body(body.to_string()), None)
    }

    /// Like [`on`](MockRegistry::on), additionally invoking `on_match` each
    /// time the rule fires (once per matching call).
    pub fn on_with(self, route: &str, body: &str, on_match: impl Fn() + 'static) -> Self {
        self.push_rule(
            route,
            Outcome::Body(body.to_string()),
            Some(Rc::new(on_match) as SideEffect),
        )
    }

    /// Register an error rule: a request matching `route` fails as if the
    /// remote returned `status` with `reason`, and no body.
    pub fn error_on(self, route: &str, status: u16, reason: &str) -> Self {
        self.push_rule(
            route,
            Outcome::Error {
                status,
                reason: reason.to_string(),
            },
            None,
        )
    }

    /// Any call lacking basic-auth credentials fails with `status`/`reason`
    /// before rule matching is consulted.
    pub fn error_on_no_auth(mut self, status: u16, reason: &str) -> Self {
        self.auth.no_auth = Some((status, reason.to_string()));
        self
    }

    /// Any call whose basic-auth credentials are not exactly
    /// `(user, password)` fails with `status`/`reason` before rule matching
    /// is consulted.
    pub fn error_on_bad_auth(
        mut self,
        user: &str,
        password: &str,
        status: u16,
        reason: &str,
    ) -> Self {
        self.auth.bad_auth = Some(BadAuth {
            user: user.to_string(),
            password: password.to_string(),
            status,
            reason: reason.to_string(),
        });
        self
    }

    /// Install this registry as `client`'s transport.
    ///
    /// Each call fully replaces the target client's transport; applying the
    /// same registry to several clients binds each independently.
    pub fn apply_to(&self, client: &mut Client) {
        client.set_transport(Rc::new(MockTransport {
            rules: self.rules.clone(),
            auth: self.auth.clone(),
        }));
    }

    fn push_rule(mut self, route: &str, outcome: Outcome, on_match: Option<SideEffect>) -> Self {
        let pattern = match RoutePattern::parse(route) {
            Ok(p) => p,
            Err(e) => panic!("{}", e),
        };
        self.rules.push(Rule {
            pattern,
            outcome,
            on_match,
        });
        self
    }
}

/// The transport installed by [`MockRegistry::apply_to`]. Immutable snapshot
/// of the registry at bind time.
struct MockTransport {
    rules: Vec<Rule>,
    auth: AuthPolicy,
}

impl Transport for MockTransport {
    fn send(&self, request: &Request) -> Result<Response, ClientError> {
        // Auth policy runs before any rule is consulted.
        self.auth.check(request)?;

        let query = request.query_string.as_deref();
        for rule in &self.rules {
            if !rule.pattern.matches(&request.method, &request.path, query) {
                continue;
            }

            match &rule.outcome {
                Outcome::Error { status, reason } => {
                    debug!(
                        method = %request.method,
                        path = %request.path,
                        status,
                        "request matched error stub"
                    );
                    return Err(ClientError::Status {
                        status: *status,
                        reason: reason.clone(),
                    });
                }
                Outcome::Body(body) => {
                    debug!(
                        method = %request.method,
                        path = %request.path,
                        "request matched stub"
                    );
                    if let Some(on_match) = &rule.on_match {
                        on_match();
                    }
                    return Ok(Response::ok(body.clone()));
                }
            }
        }

        warn!(
            method = %request.method,
            path = %request.path,
            "no stub matched request"
        );
        Err(ClientError::Unreachable {
            method: request.method.clone(),
            path: request.path.clone(),
        })
    }
}
