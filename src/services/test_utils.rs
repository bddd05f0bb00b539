//! Shared test utilities for the `services` module.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use super::transport::{QueryParams, Transport, VcsFuture};
use super::VcsError;

/// Canned transport keyed by request path.
///
/// `get` answers with the registered document, `get_paginated` with the
/// registered pages (a single document counts as one page). Unregistered
/// paths answer [`VcsError::NotFound`]. Every request is recorded as
/// `path?key=value&...` so tests can assert on lookups.
#[derive(Default)]
pub(crate) struct MockTransport {
    responses: HashMap<String, Result<Vec<Value>, VcsError>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a single document for `path`.
    pub(crate) fn with_response(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(path.to_string(), Ok(vec![body]));
        self
    }

    /// Registers a paginated listing for `path`.
    pub(crate) fn with_pages(mut self, path: &str, pages: Vec<Value>) -> Self {
        self.responses.insert(path.to_string(), Ok(pages));
        self
    }

    /// Registers an error for `path`.
    pub(crate) fn with_error(mut self, path: &str, error: VcsError) -> Self {
        self.responses.insert(path.to_string(), Err(error));
        self
    }

    /// Handle to the recorded requests.
    pub(crate) fn requests(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.requests)
    }

    fn answer(&self, path: &str, params: QueryParams<'_>) -> Result<Vec<Value>, VcsError> {
        let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        let recorded = if query.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{}", query.join("&"))
        };
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(recorded);

        self.responses
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(VcsError::NotFound(path.to_string())))
    }
}

impl Transport for MockTransport {
    fn get<'a>(&'a self, path: &'a str, params: QueryParams<'a>) -> VcsFuture<'a, Value> {
        Box::pin(async move {
            let mut pages = self.answer(path, params)?;
            Ok(if pages.is_empty() {
                Value::Null
            } else {
                pages.swap_remove(0)
            })
        })
    }

    fn get_paginated<'a>(
        &'a self,
        path: &'a str,
        params: QueryParams<'a>,
    ) -> VcsFuture<'a, Vec<Value>> {
        Box::pin(async move { self.answer(path, params) })
    }
}

/// Number of recorded requests for exactly `path`, whatever the query.
pub(crate) fn count_requests(requests: &Arc<Mutex<Vec<String>>>, path: &str) -> usize {
    requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .filter(|r| r.split('?').next() == Some(path))
        .count()
}
