//! Fetch orchestration across sources.
//!
//! Every source runs as its own task with its own [`PageSession`]. All tasks
//! share a single deadline; whatever has not settled by then is reported as
//! [`FetchOutcome::TimedOut`]. A failing or panicking task becomes
//! [`FetchOutcome::Failed`] for its source and never affects its siblings.
//!
//! Outcomes are always returned in source order, one per source.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use medprice_core::{AppConfig, ExecutionMode, FetchOutcome, PriceWindow, SearchTerm, SourceSpec};
use tokio::task::JoinSet;
use tokio::time::{timeout, timeout_at, Instant};

use crate::extract::extract_with_tier;
use crate::fetch::{PageFetcher, PageSession};

/// Extra time granted after the deadline for sessions to be released.
const DEFAULT_CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Margin past `deadline + close_grace` before unfinished tasks are aborted.
/// Every task has released its session by then unless `close` itself hung.
const ABORT_SLACK: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Upper bound on the whole comparison.
    pub timeout: Duration,
    pub mode: ExecutionMode,
    /// Pause between sources in sequential mode, unless a source overrides it.
    pub pacing_delay: Duration,
    pub price_window: PriceWindow,
    /// How long a session may take to close once its fetch has settled.
    pub close_grace: Duration,
}

impl OrchestratorSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout: config.compare_timeout(),
            mode: config.execution_mode,
            pacing_delay: config.inter_request_delay(),
            price_window: config.price_window,
            close_grace: DEFAULT_CLOSE_GRACE,
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            mode: ExecutionMode::Concurrent,
            pacing_delay: Duration::from_millis(2_000),
            price_window: PriceWindow::default(),
            close_grace: DEFAULT_CLOSE_GRACE,
        }
    }
}

pub struct Orchestrator<F> {
    fetcher: Arc<F>,
    settings: OrchestratorSettings,
}

impl<F: PageFetcher> Orchestrator<F> {
    #[must_use]
    pub fn new(fetcher: F, settings: OrchestratorSettings) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            settings,
        }
    }

    /// Fetches and extracts every source for `term`.
    ///
    /// Returns exactly one outcome per entry of `sources`, in the same order,
    /// within the configured timeout plus the session close grace.
    pub async fn compare(&self, term: &SearchTerm, sources: &[SourceSpec]) -> Vec<FetchOutcome> {
        if sources.is_empty() {
            return Vec::new();
        }

        let started = Instant::now();
        let deadline = started + self.settings.timeout;
        tracing::info!(
            term = %term,
            sources = sources.len(),
            mode = %self.settings.mode,
            timeout_ms = self.settings.timeout.as_millis(),
            "starting price comparison"
        );

        let outcomes = match self.settings.mode {
            ExecutionMode::Concurrent => self.run_concurrent(term, sources, deadline).await,
            ExecutionMode::Sequential => self.run_sequential(term, sources, deadline).await,
        };

        let found = outcomes
            .iter()
            .filter(|o| matches!(o, FetchOutcome::Found(_)))
            .count();
        tracing::info!(
            term = %term,
            found,
            total = outcomes.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "price comparison finished"
        );
        outcomes
    }

    fn task(&self, term: &SearchTerm, spec: &SourceSpec, deadline: Instant) -> SourceTask<F> {
        SourceTask {
            fetcher: Arc::clone(&self.fetcher),
            spec: spec.clone(),
            term: term.clone(),
            window: self.settings.price_window,
            deadline,
            close_grace: self.settings.close_grace,
        }
    }

    async fn run_concurrent(
        &self,
        term: &SearchTerm,
        sources: &[SourceSpec],
        deadline: Instant,
    ) -> Vec<FetchOutcome> {
        let mut tasks = JoinSet::new();
        let mut index_by_task = HashMap::with_capacity(sources.len());
        for (index, spec) in sources.iter().enumerate() {
            let handle = tasks.spawn(self.task(term, spec, deadline).run());
            index_by_task.insert(handle.id(), index);
        }

        let mut settled: Vec<Option<FetchOutcome>> = sources.iter().map(|_| None).collect();
        let hard_stop = deadline + self.settings.close_grace + ABORT_SLACK;

        loop {
            match timeout_at(hard_stop, tasks.join_next_with_id()).await {
                Ok(None) => break,
                Ok(Some(Ok((id, outcome)))) => {
                    if let Some(&index) = index_by_task.get(&id) {
                        settled[index] = Some(outcome);
                    }
                }
                Ok(Some(Err(join_err))) => {
                    if let Some(&index) = index_by_task.get(&join_err.id()) {
                        let source = &sources[index].id;
                        tracing::warn!(source = %source, error = %join_err, "source task aborted");
                        settled[index] = Some(FetchOutcome::failed(
                            source.clone(),
                            &format!("task failed: {join_err}"),
                        ));
                    }
                }
                Err(_) => {
                    tracing::warn!(
                        pending = tasks.len(),
                        "tasks still running past the close grace; aborting"
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }

        settled
            .into_iter()
            .zip(sources)
            .map(|(outcome, spec)| {
                outcome.unwrap_or_else(|| FetchOutcome::TimedOut {
                    source: spec.id.clone(),
                })
            })
            .collect()
    }

    async fn run_sequential(
        &self,
        term: &SearchTerm,
        sources: &[SourceSpec],
        deadline: Instant,
    ) -> Vec<FetchOutcome> {
        let hard_stop = deadline + self.settings.close_grace + ABORT_SLACK;
        let mut outcomes = Vec::with_capacity(sources.len());

        for (index, spec) in sources.iter().enumerate() {
            if Instant::now() >= deadline {
                tracing::debug!(source = %spec.id, "deadline passed before source started");
                outcomes.push(FetchOutcome::TimedOut {
                    source: spec.id.clone(),
                });
                continue;
            }

            let handle = tokio::spawn(self.task(term, spec, deadline).run());
            let abort = handle.abort_handle();
            let outcome = match timeout_at(hard_stop, handle).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(join_err)) => {
                    tracing::warn!(source = %spec.id, error = %join_err, "source task aborted");
                    FetchOutcome::failed(spec.id.clone(), &format!("task failed: {join_err}"))
                }
                Err(_) => {
                    abort.abort();
                    FetchOutcome::TimedOut {
                        source: spec.id.clone(),
                    }
                }
            };
            outcomes.push(outcome);

            if index + 1 < sources.len() {
                let pause = spec
                    .pacing_delay_ms
                    .map_or(self.settings.pacing_delay, Duration::from_millis);
                tokio::time::sleep_until((Instant::now() + pause).min(deadline)).await;
            }
        }

        outcomes
    }
}

/// Everything one source task owns.
struct SourceTask<F> {
    fetcher: Arc<F>,
    spec: SourceSpec,
    term: SearchTerm,
    window: PriceWindow,
    deadline: Instant,
    close_grace: Duration,
}

impl<F: PageFetcher> SourceTask<F> {
    async fn run(self) -> FetchOutcome {
        let source = self.spec.id.clone();
        let url = self.spec.query_url(&self.term);
        tracing::debug!(source = %source, url = %url, "fetching source");

        let mut session = match timeout_at(self.deadline, self.fetcher.open()).await {
            Ok(Ok(session)) => session,
            Ok(Err(err)) => {
                tracing::warn!(source = %source, error = %err, "failed to open session");
                return FetchOutcome::failed(source, &err.to_string());
            }
            Err(_) => {
                tracing::warn!(source = %source, "timed out opening session");
                return FetchOutcome::TimedOut { source };
            }
        };

        let fetch = AssertUnwindSafe(session.fetch(&url, &self.spec.render)).catch_unwind();
        let fetched = timeout_at(self.deadline, fetch).await;

        // Released on every path, panics included, outside the fetch deadline.
        if timeout(self.close_grace, session.close()).await.is_err() {
            tracing::warn!(source = %source, "session close exceeded grace period");
        }

        match fetched {
            Err(_) => {
                tracing::warn!(source = %source, "source timed out");
                FetchOutcome::TimedOut { source }
            }
            Ok(Err(payload)) => {
                let reason = panic_message(payload.as_ref());
                tracing::warn!(source = %source, reason = %reason, "source fetch panicked");
                FetchOutcome::failed(source, &format!("fetch panicked: {reason}"))
            }
            Ok(Ok(Err(err))) => {
                tracing::warn!(source = %source, error = %err, "source fetch failed");
                FetchOutcome::failed(source, &err.to_string())
            }
            Ok(Ok(Ok(page))) => match extract_with_tier(&page, &self.term, &self.spec, &self.window) {
                Some((result, tier)) => {
                    tracing::debug!(source = %source, %tier, price = %result.price(), "price found");
                    FetchOutcome::Found(result)
                }
                None => {
                    tracing::debug!(source = %source, "no price extracted");
                    FetchOutcome::NotFound { source }
                }
            },
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_owned()
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
