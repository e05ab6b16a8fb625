use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use serde_json::Value;

use crate::{
    error::{RegistryError, Result},
    http_client::{Fetch, FetchResponse},
    repository::Repository,
};

enum Route {
    Respond(FetchResponse),
    Unreachable,
    Panic,
}

/// In-memory [`Fetch`] implementation with canned responses.
///
/// URLs without a route answer 404.
#[derive(Default)]
pub struct StaticFetcher {
    routes: HashMap<String, Route>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(self, url: &str, body: Value) -> Self {
        self.respond(url, 200, body.to_string())
    }

    pub fn status(self, url: &str, status: u16) -> Self {
        self.respond(url, status, Vec::new())
    }

    pub fn respond(mut self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(
            url.to_string(),
            Route::Respond(FetchResponse::new(status, body)),
        );
        self
    }

    pub fn unreachable(mut self, url: &str) -> Self {
        self.routes.insert(url.to_string(), Route::Unreachable);
        self
    }

    pub fn panics(mut self, url: &str) -> Self {
        self.routes.insert(url.to_string(), Route::Panic);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| *u == url)
            .count()
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Fetch for StaticFetcher {
    fn get(&self, url: &str) -> Result<FetchResponse> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.routes.get(url) {
            Some(Route::Respond(response)) => Ok(response.clone()),
            Some(Route::Unreachable) => {
                Err(RegistryError::transport(url, ureq::Error::ConnectionFailed))
            }
            Some(Route::Panic) => panic!("scripted panic for {url}"),
            None => Ok(FetchResponse::new(404, Vec::new())),
        }
    }
}

pub fn repo(name: &str, url: &str, fetcher: &Arc<StaticFetcher>) -> Repository {
    Repository::new(name, url, fetcher.clone())
}
