//! Scripted portal for driving the login workflow in tests
//!
//! Each expected request is answered in order with a canned reply. A request
//! that does not match the next expectation panics so a test never passes on
//! an accidental error path.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use url::Url;

use super::{HttpSession, PortalResponse, SessionFactory};
use crate::error::{Error, Result};

pub(crate) enum Reply {
    Response {
        status: StatusCode,
        body: Vec<u8>,
        set_cookies: usize,
    },
    /// Headers arrive, then the connection drops while the body is read.
    BrokenBody {
        status: StatusCode,
        reason: &'static str,
    },
    Transport(&'static str),
}

impl Reply {
    pub(crate) fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::status(StatusCode::OK, body)
    }

    pub(crate) fn status(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Reply::Response {
            status,
            body: body.into(),
            set_cookies: 0,
        }
    }

    /// The reply stores `n` session cookies in the jar.
    pub(crate) fn with_cookies(mut self, n: usize) -> Self {
        if let Reply::Response { set_cookies, .. } = &mut self {
            *set_cookies = n;
        }
        self
    }
}

/// A request the scripted portal received.
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub method: &'static str,
    pub url: Url,
    pub body: Option<serde_json::Value>,
}

impl Call {
    /// `"GET /api/dw"` style summary, query included.
    pub(crate) fn line(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{} {}?{}", self.method, self.url.path(), query),
            None => format!("{} {}", self.method, self.url.path()),
        }
    }
}

#[derive(Default)]
struct State {
    script: VecDeque<(&'static str, &'static str, Reply)>,
    calls: Vec<Call>,
    opened: usize,
}

#[derive(Clone, Default)]
pub(crate) struct ScriptedPortal {
    state: Arc<Mutex<State>>,
}

impl ScriptedPortal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn expect(self, method: &'static str, path: &'static str, reply: Reply) -> Self {
        self.state
            .lock()
            .unwrap()
            .script
            .push_back((method, path, reply));
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        self.calls().iter().map(Call::line).collect()
    }

    pub(crate) fn sessions_opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    pub(crate) fn remaining(&self) -> usize {
        self.state.lock().unwrap().script.len()
    }
}

impl SessionFactory for ScriptedPortal {
    type Session = ScriptedSession;

    fn open(&self) -> Result<ScriptedSession> {
        self.state.lock().unwrap().opened += 1;
        Ok(ScriptedSession {
            state: Arc::clone(&self.state),
            cookies: Mutex::new(0),
        })
    }
}

pub(crate) struct ScriptedSession {
    state: Arc<Mutex<State>>,
    cookies: Mutex<usize>,
}

impl ScriptedSession {
    fn answer(
        &self,
        method: &'static str,
        url: &Url,
        body: Option<serde_json::Value>,
    ) -> Result<ScriptedResponse> {
        let reply = {
            let mut state = self.state.lock().unwrap();
            let call = Call {
                method,
                url: url.clone(),
                body,
            };
            let (want_method, want_path, reply) = state
                .script
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected request {}", call.line()));
            assert_eq!(
                (want_method, want_path),
                (method, url.path()),
                "request out of script order"
            );
            state.calls.push(call);
            reply
        };

        match reply {
            Reply::Response {
                status,
                body,
                set_cookies,
            } => {
                *self.cookies.lock().unwrap() += set_cookies;
                Ok(ScriptedResponse {
                    status,
                    body: Ok(body),
                })
            }
            Reply::BrokenBody { status, reason } => Ok(ScriptedResponse {
                status,
                body: Err(Error::transport(url.as_str(), reason)),
            }),
            Reply::Transport(reason) => Err(Error::transport(url.as_str(), reason)),
        }
    }
}

impl HttpSession for ScriptedSession {
    type Response = ScriptedResponse;

    async fn post_json(&self, url: &Url, body: &serde_json::Value) -> Result<ScriptedResponse> {
        self.answer("POST", url, Some(body.clone()))
    }

    async fn get(&self, url: &Url) -> Result<ScriptedResponse> {
        self.answer("GET", url, None)
    }

    fn cookie_count(&self, _url: &Url) -> usize {
        *self.cookies.lock().unwrap()
    }
}

pub(crate) struct ScriptedResponse {
    status: StatusCode,
    body: Result<Vec<u8>>,
}

impl PortalResponse for ScriptedResponse {
    fn status(&self) -> StatusCode {
        self.status
    }

    async fn bytes(self) -> Result<Vec<u8>> {
        self.body
    }

    async fn text(self) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.body?).into_owned())
    }
}
