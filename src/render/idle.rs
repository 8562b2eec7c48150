//! Network quiescence tracking
//!
//! A page counts as loaded once its main document response has arrived and no
//! more than `max_inflight` requests have been outstanding for an
//! uninterrupted `window`. With the defaults (2 requests, 500ms) this matches
//! the usual "network almost idle" heuristic.

use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Tracks in-flight requests and when the page last became quiet
#[derive(Debug)]
pub struct IdleTracker {
    inflight: HashSet<String>,
    max_inflight: usize,
    window: Duration,
    quiet_since: Option<Instant>,
    document_seen: bool,
}

impl IdleTracker {
    /// Creates a tracker that starts out quiet at `now`
    pub fn new(max_inflight: usize, window: Duration, now: Instant) -> Self {
        Self {
            inflight: HashSet::new(),
            max_inflight,
            window,
            quiet_since: Some(now),
            document_seen: false,
        }
    }

    /// Records a request leaving the browser
    ///
    /// Redirect hops reuse the request id, so starting an id that is already
    /// in flight changes nothing.
    pub fn request_started(&mut self, request_id: &str, now: Instant) {
        self.inflight.insert(request_id.to_string());
        self.refresh(now);
    }

    /// Records a request finishing, failing, or being aborted
    pub fn request_finished(&mut self, request_id: &str, now: Instant) {
        self.inflight.remove(request_id);
        self.refresh(now);
    }

    /// Records the main document response; the page is never idle before it
    pub fn document_received(&mut self) {
        self.document_seen = true;
    }

    /// Number of requests currently outstanding
    pub fn inflight(&self) -> usize {
        self.inflight.len()
    }

    /// Returns true once the document is in and the quiet period has lasted
    /// a full window
    pub fn is_idle(&self, now: Instant) -> bool {
        self.time_until_idle(now) == Some(Duration::ZERO)
    }

    /// Time left until the page is idle, if the document is in and the
    /// network is currently quiet
    pub fn time_until_idle(&self, now: Instant) -> Option<Duration> {
        if !self.document_seen {
            return None;
        }
        self.quiet_since
            .map(|since| self.window.saturating_sub(now.saturating_duration_since(since)))
    }

    fn refresh(&mut self, now: Instant) {
        if self.inflight.len() > self.max_inflight {
            self.quiet_since = None;
        } else if self.quiet_since.is_none() {
            self.quiet_since = Some(now);
        }
    }
}
