//! Eager initialization run while finalizing a container.
//!
//! Every eager entry is requested at once and all of them are allowed to
//! settle; one failing build never stops the others. The outcome of each is
//! collected into an [`EagerReport`].

use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::DiError;
use crate::provider::Container;

/// Eager build result for a single entry.
#[derive(Debug, Clone)]
pub struct EagerResult {
    /// The entry that was built
    pub name: String,
    /// Whether the build succeeded
    pub success: bool,
    /// The failure, if the build failed
    pub error: Option<DiError>,
    /// Time taken until the build settled
    pub duration: Duration,
}

impl EagerResult {
    pub fn success(name: String, duration: Duration) -> Self {
        Self { name, success: true, error: None, duration }
    }

    pub fn failure(name: String, error: DiError, duration: Duration) -> Self {
        Self { name, success: false, error: Some(error), duration }
    }
}

/// Outcome of eager initialization.
#[derive(Debug, Clone, Default)]
pub struct EagerReport {
    /// Individual entry results, in name order
    pub results: Vec<EagerResult>,
    /// Total time until every eager build settled
    pub total_duration: Duration,
}

impl EagerReport {
    /// Returns true if every eager build succeeded.
    pub fn all_built(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    pub fn built_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }

    pub fn failures(&self) -> Vec<&EagerResult> {
        self.results.iter().filter(|r| !r.success).collect()
    }

    /// Moves the failures out as `(name, error)` pairs.
    pub(crate) fn into_failures(self) -> Vec<(String, DiError)> {
        self.results
            .into_iter()
            .filter_map(|r| r.error.map(|e| (r.name, e)))
            .collect()
    }
}

/// Builds every eager entry of `container` and waits for all of them to settle.
pub(crate) async fn initialize_eager(container: &Container) -> EagerReport {
    let started = Instant::now();
    let names = container.eager_names();
    debug!(count = names.len(), "initializing eager entries");

    let builds = names.into_iter().map(|name| {
        let resolution = container.get(&name);
        async move {
            let begun = Instant::now();
            match resolution.await {
                Ok(_) => EagerResult::success(name, begun.elapsed()),
                Err(error) => {
                    warn!(entry = %name, %error, "eager build failed");
                    EagerResult::failure(name, error, begun.elapsed())
                }
            }
        }
    });
    let results = join_all(builds).await;

    EagerReport {
        results,
        total_duration: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, error: Option<DiError>) -> EagerResult {
        match error {
            None => EagerResult::success(name.to_string(), Duration::ZERO),
            Some(e) => EagerResult::failure(name.to_string(), e, Duration::ZERO),
        }
    }

    #[test]
    fn report_counts_successes_and_failures() {
        let report = EagerReport {
            results: vec![
                result("a", None),
                result("b", Some(DiError::NotFound("x".into()))),
                result("c", None),
            ],
            total_duration: Duration::ZERO,
        };

        assert!(!report.all_built());
        assert_eq!(report.built_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.failures()[0].name, "b");

        let failures = report.into_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "b");
    }

    #[test]
    fn empty_report_is_all_built() {
        assert!(EagerReport::default().all_built());
    }
}
