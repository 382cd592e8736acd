//! Polling of deferred uploads.
//!
//! When the server answers with a processing URL, the poller fetches it until the
//! reported percentage reaches 100 or a response comes back without a URL. Individual failed polls
//! are logged and skipped; only cancellation, misrouting and the optional bounds
//! in [`PollSettings`] end the loop early.

use std::time::Instant;

use nip96_core::{PartialEvent, PollSettings, ProcessingStatus};
use reqwest::header::USER_AGENT;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::error::{Nip96Error, Nip96Result};
use crate::transport::{HttpTransport, RoutingPolicy};

/// Receives upload progress in `[0, 1]`.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, fraction: f32);
}

impl<F> ProgressReporter for F
where
    F: Fn(f32) + Send + Sync,
{
    fn report(&self, fraction: f32) {
        self(fraction)
    }
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _fraction: f32) {}
}

/// Forwards progress, never letting the reported value go backwards.
struct MonotonicProgress<'a> {
    inner: &'a dyn ProgressReporter,
    last: f32,
}

impl MonotonicProgress<'_> {
    fn report(&mut self, fraction: f32) {
        self.last = self.last.max(fraction.clamp(0.0, 1.0));
        self.inner.report(self.last);
    }
}

pub struct ProcessingPoller<'a> {
    transport: &'a HttpTransport,
    user_agent: &'a str,
    settings: &'a PollSettings,
}

impl<'a> ProcessingPoller<'a> {
    pub fn new(
        transport: &'a HttpTransport,
        user_agent: &'a str,
        settings: &'a PollSettings,
    ) -> Self {
        Self {
            transport,
            user_agent,
            settings,
        }
    }

    /// Poll from `initial` until the upload is final and return its payload.
    pub async fn wait_for_completion(
        &self,
        initial: ProcessingStatus,
        routing: &dyn RoutingPolicy,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Nip96Result<PartialEvent> {
        let started = Instant::now();
        let mut progress = MonotonicProgress {
            inner: progress,
            last: 0.0,
        };
        let mut current = initial;
        let mut attempts: u32 = 0;

        while let Some(url) = next_poll(&current) {
            progress.report(current.progress_fraction());

            if cancel.is_cancelled() {
                return Err(Nip96Error::Cancelled);
            }
            self.check_bounds(attempts, started)?;
            attempts += 1;

            match self.fetch(&url, routing, cancel).await {
                Ok(Some(next)) => {
                    tracing::debug!(
                        attempt = attempts,
                        status = ?next.status,
                        percentage = ?next.percentage,
                        "Processing status received"
                    );
                    current = next;
                }
                Ok(None) => {}
                Err(Nip96Error::Transport(e)) => {
                    tracing::warn!(
                        attempt = attempts,
                        processing_url = %url,
                        error = %e,
                        "Processing poll failed, retrying"
                    );
                }
                Err(e) => return Err(e),
            }

            if !current.is_processing() {
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Nip96Error::Cancelled),
                _ = sleep(self.settings.interval) => {}
            }
        }

        progress.report(current.progress_fraction());
        tracing::info!(attempts, elapsed = ?started.elapsed(), "Processing finished");

        let message = current.message().map(str::to_string);
        current
            .final_payload
            .ok_or(Nip96Error::ProcessingIncomplete { message })
    }

    fn check_bounds(&self, attempts: u32, started: Instant) -> Nip96Result<()> {
        let elapsed = started.elapsed();
        let attempts_exhausted = self.settings.max_attempts.is_some_and(|max| attempts >= max);
        let wait_exhausted = self.settings.max_wait.is_some_and(|max| elapsed >= max);

        if attempts_exhausted || wait_exhausted {
            return Err(Nip96Error::ProcessingTimeout { attempts, elapsed });
        }
        Ok(())
    }

    /// `Ok(None)` for a non-2xx or unreadable response.
    async fn fetch(
        &self,
        url: &str,
        routing: &dyn RoutingPolicy,
        cancel: &CancellationToken,
    ) -> Nip96Result<Option<ProcessingStatus>> {
        let client = self.transport.client_for(url, routing)?;
        let request = client.get(url).header(USER_AGENT, self.user_agent);
        let reply = self.transport.send(request, cancel).await?;

        if !reply.status.is_success() {
            tracing::warn!(
                processing_url = %url,
                status = %reply.status,
                "Processing poll returned an error status"
            );
            return Ok(None);
        }

        match serde_json::from_str(&reply.body) {
            Ok(status) => Ok(Some(status)),
            Err(e) => {
                tracing::warn!(processing_url = %url, error = %e, "Unreadable processing status");
                Ok(None)
            }
        }
    }
}

/// URL to poll next, taken from the latest status only.
fn next_poll(current: &ProcessingStatus) -> Option<String> {
    if current.is_processing() {
        current.processing_url().map(str::to_string)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn status(kind: &str, url: Option<&str>, pct: Option<f64>) -> ProcessingStatus {
        ProcessingStatus {
            status: Some(kind.to_string()),
            processing_url: url.map(str::to_string),
            percentage: pct,
            ..Default::default()
        }
    }

    #[test]
    fn stops_at_full_percentage() {
        let done = status("processing", Some("https://x/p"), Some(100.0));
        assert_eq!(next_poll(&done), None);

        let running = status("processing", Some("https://x/p"), Some(20.0));
        assert_eq!(next_poll(&running), Some("https://x/p".to_string()));
    }

    #[test]
    fn missing_percentage_stops_polling() {
        let unknown = status("processing", Some("https://x/p"), None);
        assert_eq!(next_poll(&unknown), None);
    }

    #[test]
    fn blank_url_stops_polling_whatever_the_status() {
        for kind in ["processing", "success", "error"] {
            assert_eq!(next_poll(&status(kind, None, Some(50.0))), None);
            assert_eq!(next_poll(&status(kind, Some("  "), Some(50.0))), None);
        }
    }

    #[test]
    fn follows_a_moved_url() {
        let moved = status("processing", Some("https://y/p2"), Some(50.0));
        assert_eq!(next_poll(&moved), Some("https://y/p2".to_string()));
    }

    #[test]
    fn progress_never_goes_backwards() {
        let seen = Mutex::new(Vec::new());
        let sink = |f: f32| seen.lock().unwrap().push(f);
        let mut progress = MonotonicProgress {
            inner: &sink,
            last: 0.0,
        };
        for value in [0.2, 0.5, 0.3, 1.4, -1.0] {
            progress.report(value);
        }
        assert_eq!(*seen.lock().unwrap(), vec![0.2, 0.5, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn bounds_are_optional() {
        let transport = HttpTransport::new(reqwest::Client::new());
        let unbounded = PollSettings::default();
        let poller = ProcessingPoller::new(&transport, "test", &unbounded);
        assert!(poller.check_bounds(10_000, Instant::now()).is_ok());

        let bounded = PollSettings {
            max_attempts: Some(3),
            ..Default::default()
        };
        let poller = ProcessingPoller::new(&transport, "test", &bounded);
        assert!(poller.check_bounds(2, Instant::now()).is_ok());
        assert!(matches!(
            poller.check_bounds(3, Instant::now()),
            Err(Nip96Error::ProcessingTimeout { attempts: 3, .. })
        ));
    }
}
