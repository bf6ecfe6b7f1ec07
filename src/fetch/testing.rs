//! In-crate stub transport for unit tests

use super::{HttpRequest, HttpResponse, Transport, TransportError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A canned reply for one request
#[derive(Debug, Clone)]
pub enum StubReply {
    Ok { status: u16, body: String },
    Timeout,
}

impl StubReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::Ok {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Ok {
            status,
            body: body.into(),
        }
    }
}

/// Replies from per-URL queues; the last reply for a URL repeats once its queue drains
#[derive(Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<String, VecDeque<StubReply>>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: &str, replies: Vec<StubReply>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), replies.into_iter().collect());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            let queue = routes.get_mut(&request.url);
            match queue {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(StubReply::Ok { status, body }) => Ok(HttpResponse { status, body }),
            Some(StubReply::Timeout) => Err(TransportError::Timeout {
                url: request.url.clone(),
            }),
            None => Err(TransportError::Connect {
                url: request.url.clone(),
                message: "no stub route".to_string(),
            }),
        }
    }
}
