//! Scripted fetcher for engine tests

use super::Fetcher;
use crate::error::{WardenError, WardenResult};
use crate::request::{Request, Response};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Clone)]
enum Route {
    Respond {
        response: Response,
        delay: Duration,
    },
    Fail,
    Reject(String),
}

/// Fetcher whose answers, latency and connectivity are set by the test
pub(crate) struct MockFetcher {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<HashMap<String, usize>>,
    last: Mutex<HashMap<String, Request>>,
    online: AtomicBool,
}

impl MockFetcher {
    pub(crate) fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            last: Mutex::new(HashMap::new()),
            online: AtomicBool::new(true),
        }
    }

    /// Answer `url` immediately
    pub(crate) fn respond(&self, url: &str, status: u16, content_type: &str, body: &str) {
        self.respond_after(url, Duration::ZERO, status, content_type, body);
    }

    /// Answer `url` after `delay`
    pub(crate) fn respond_after(
        &self,
        url: &str,
        delay: Duration,
        status: u16,
        content_type: &str,
        body: &str,
    ) {
        let response = Response::new(status)
            .with_header("content-type", content_type)
            .with_body(body);
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Respond { response, delay });
    }

    /// Make `url` fail at the transport level
    pub(crate) fn fail(&self, url: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Fail);
    }

    /// Make `url` fail before reaching the transport, with a non-network error
    pub(crate) fn reject(&self, url: &str, reason: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Reject(reason.to_string()));
    }

    /// Toggle connectivity for every route
    pub(crate) fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of fetches attempted for `url`
    pub(crate) fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    /// The most recent request sent to `url`
    pub(crate) fn last_request(&self, url: &str) -> Option<Request> {
        self.last.lock().unwrap().get(url).cloned()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &Request) -> WardenResult<Response> {
        let url = request.url.to_string();
        *self.calls.lock().unwrap().entry(url.clone()).or_default() += 1;
        self.last.lock().unwrap().insert(url.clone(), request.clone());

        if !self.online.load(Ordering::SeqCst) {
            return Err(WardenError::network(url, "offline"));
        }

        let route = self.routes.lock().unwrap().get(&url).cloned();
        match route {
            Some(Route::Respond { response, delay }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(response)
            }
            Some(Route::Fail) => Err(WardenError::network(url, "connection reset")),
            Some(Route::Reject(reason)) => Err(WardenError::User(reason)),
            None => Ok(Response::new(404).with_body("not found")),
        }
    }

    fn fetcher_name(&self) -> &'static str {
        "mock"
    }
}
