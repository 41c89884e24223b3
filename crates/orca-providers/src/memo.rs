//! Per-run resolution memo
//!
//! Each provider name owns one cell whose provider is written at most once.
//! One attempt runs at a time per name. Tasks that queued behind an attempt
//! reuse its outcome: the provider on success, a copy of the error on
//! failure. A failed attempt stores no provider, so a later, separate request
//! for the same name runs a fresh attempt.

use crate::provider::Provider;
use crate::{Error, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

#[derive(Debug)]
struct Failure {
    attempt: u64,
    error: Error,
}

#[derive(Debug, Default)]
struct Cell {
    resolved: OnceLock<Arc<Provider>>,
    /// Finished attempts, successful or not
    completed: AtomicU64,
    /// Held for the duration of an attempt
    attempt: tokio::sync::Mutex<Option<Failure>>,
}

#[derive(Debug, Default)]
pub struct ResolutionMemo {
    cells: Mutex<HashMap<String, Arc<Cell>>>,
}

impl ResolutionMemo {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, name: &str) -> Arc<Cell> {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.entry(name.to_string()).or_default().clone()
    }

    /// The resolved provider named `name`, if any.
    pub fn get(&self, name: &str) -> Option<Arc<Provider>> {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.get(name).and_then(|cell| cell.resolved.get().cloned())
    }

    /// Return the memoized provider for `name`, running `resolve` to produce
    /// it if no resolution has succeeded yet.
    ///
    /// A caller that waited on an attempt which then failed gets that
    /// failure back instead of running `resolve` itself.
    pub async fn get_or_resolve<F, Fut>(&self, name: &str, resolve: F) -> Result<Arc<Provider>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Provider>>,
    {
        let cell = self.cell(name);
        if let Some(provider) = cell.resolved.get() {
            tracing::debug!(provider = %name, "Using memoized provider");
            return Ok(provider.clone());
        }

        let seen = cell.completed.load(Ordering::SeqCst);
        let mut last_failure = cell.attempt.lock().await;

        if let Some(provider) = cell.resolved.get() {
            tracing::debug!(provider = %name, "Using memoized provider");
            return Ok(provider.clone());
        }
        if let Some(failure) = last_failure.as_ref().filter(|f| f.attempt > seen) {
            tracing::debug!(provider = %name, "Reusing failed resolution attempt");
            return Err(failure.error.shared(name));
        }

        let result = resolve().await;
        let attempt = cell.completed.fetch_add(1, Ordering::SeqCst) + 1;

        match result {
            Ok(provider) => {
                *last_failure = None;
                Ok(cell.resolved.get_or_init(|| Arc::new(provider)).clone())
            }
            Err(err) => {
                *last_failure = Some(Failure {
                    attempt,
                    error: err.shared(name),
                });
                Err(err)
            }
        }
    }

    /// Number of resolved providers.
    pub fn len(&self) -> usize {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.values().filter(|cell| cell.resolved.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of resolved providers, sorted.
    pub fn names(&self) -> Vec<String> {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = cells
            .iter()
            .filter(|(_, cell)| cell.resolved.get().is_some())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}
