// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Change notifications: the `finance` server-sent-event stream, plus a plain
//! interval poller for data that has no stream.

use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::finance::{Freshness, OverviewView};
use crate::models::FinanceOverview;

pub const FINANCE_EVENT: &str = "finance";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEvent {
    pub event: String,
    pub data: String,
    pub id: Option<String>,
}

/// Incremental `text/event-stream` decoder.
pub struct EventReader<R> {
    inner: BufReader<R>,
    line: String,
    stop: Option<StopHandle>,
}

impl<R: Read> EventReader<R> {
    pub fn new(inner: R) -> Self {
        EventReader {
            inner: BufReader::new(inner),
            line: String::new(),
            stop: None,
        }
    }

    /// Checks `stop` after every line, so keepalive comments end a stopped read.
    pub fn with_stop(mut self, stop: StopHandle) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Blocks until a complete event arrives. `Ok(None)` at end of stream or once
    /// stopped; a trailing event without its blank line is dropped.
    pub fn next_event(&mut self) -> io::Result<Option<ServerEvent>> {
        let mut event: Option<String> = None;
        let mut data: Vec<String> = Vec::new();
        let mut id: Option<String> = None;
        loop {
            self.line.clear();
            if self.inner.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            if self.stop.as_ref().is_some_and(StopHandle::is_stopped) {
                return Ok(None);
            }
            let line = self.line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                if event.is_none() && data.is_empty() {
                    continue;
                }
                return Ok(Some(ServerEvent {
                    event: event.unwrap_or_else(|| "message".to_string()),
                    data: data.join("\n"),
                    id,
                }));
            }
            if line.starts_with(':') {
                continue;
            }
            let (field, value) = match line.split_once(':') {
                Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
                None => (line, ""),
            };
            match field {
                "event" => event = Some(value.to_string()),
                "data" => data.push(value.to_string()),
                "id" => id = Some(value.to_string()),
                _ => {}
            }
        }
    }
}

/// Exponential reconnect delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(30),
            max_attempts: None,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial
            .checked_mul(1u32 << shift)
            .unwrap_or(self.max)
            .min(self.max)
    }

    pub fn exhausted(&self, attempt: u32) -> bool {
        self.max_attempts.is_some_and(|m| attempt > m)
    }
}

/// Shared cancellation flag; clone it into whatever needs to stop the loop.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sleeps for `dur` in short slices. Returns false if stopped meanwhile.
    pub fn sleep(&self, dur: Duration) -> bool {
        let deadline = Instant::now() + dur;
        while !self.is_stopped() {
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(Duration::from_millis(100)));
        }
        false
    }
}

/// Keeps a [`FinanceOverview`] current by re-fetching it on every `finance` event.
pub struct FinanceWatcher {
    backoff: Backoff,
    stop: StopHandle,
    view: OverviewView,
}

impl FinanceWatcher {
    pub fn new(backoff: Backoff, stop: StopHandle) -> Self {
        FinanceWatcher {
            backoff,
            stop,
            view: OverviewView::new(),
        }
    }

    pub fn with_view(mut self, view: OverviewView) -> Self {
        self.view = view;
        self
    }

    pub fn view(&self) -> &OverviewView {
        &self.view
    }

    fn refresh<F, U>(&mut self, fetch: &mut F, on_update: &mut U) -> ApiResult<()>
    where
        F: FnMut() -> ApiResult<FinanceOverview>,
        U: FnMut(&FinanceOverview, &Freshness),
    {
        let (overview, freshness) = self.view.apply(fetch())?;
        if let Freshness::Stale(why) = &freshness {
            warn!(error = %why, "overview refresh failed; keeping last good state");
        }
        on_update(overview, &freshness);
        Ok(())
    }

    /// Loads once, subscribes, and refreshes on each event until stopped.
    ///
    /// A dropped or refused stream is retried with backoff, and the overview is
    /// re-fetched after every reconnect since events may have been missed. Fails
    /// when the initial load fails with nothing cached, or when retries run out.
    ///
    /// Stopping is noticed on the next line the server sends (events or keepalive
    /// comments) or when the stream drops. A silent open stream keeps `run` blocked.
    pub fn run<R, C, F, U>(&mut self, mut connect: C, mut fetch: F, mut on_update: U) -> ApiResult<()>
    where
        R: Read,
        C: FnMut() -> ApiResult<R>,
        F: FnMut() -> ApiResult<FinanceOverview>,
        U: FnMut(&FinanceOverview, &Freshness),
    {
        self.refresh(&mut fetch, &mut on_update)?;
        let mut attempt: u32 = 0;
        let mut reconnecting = false;
        while !self.stop.is_stopped() {
            let failure = match connect() {
                Ok(stream) => {
                    info!("subscribed to finance events");
                    if reconnecting {
                        self.refresh(&mut fetch, &mut on_update)?;
                    }
                    let reader = EventReader::new(stream).with_stop(self.stop.clone());
                    match self.pump(reader, &mut fetch, &mut on_update, &mut attempt) {
                        Ok(()) if self.stop.is_stopped() => return Ok(()),
                        Ok(()) => ApiError::StreamClosed,
                        Err(e) => e,
                    }
                }
                Err(e) => e,
            };
            attempt += 1;
            if self.backoff.exhausted(attempt) {
                return Err(failure);
            }
            let delay = self.backoff.delay(attempt);
            warn!(error = %failure, attempt, delay_ms = delay.as_millis() as u64, "finance stream lost; reconnecting");
            reconnecting = true;
            if !self.stop.sleep(delay) {
                break;
            }
        }
        Ok(())
    }

    /// Reads events until the stream ends or the watcher is stopped.
    fn pump<R, F, U>(
        &mut self,
        mut reader: EventReader<R>,
        fetch: &mut F,
        on_update: &mut U,
        attempt: &mut u32,
    ) -> ApiResult<()>
    where
        R: Read,
        F: FnMut() -> ApiResult<FinanceOverview>,
        U: FnMut(&FinanceOverview, &Freshness),
    {
        loop {
            if self.stop.is_stopped() {
                return Ok(());
            }
            let ev = match reader.next_event() {
                Ok(Some(ev)) => ev,
                Ok(None) => return Ok(()),
                Err(e) => {
                    debug!(error = %e, "event stream read failed");
                    return Err(ApiError::StreamClosed);
                }
            };
            *attempt = 0;
            if ev.event != FINANCE_EVENT {
                debug!(event = %ev.event, "ignoring event");
                continue;
            }
            info!("finance changed; re-fetching overview");
            self.refresh(fetch, on_update)?;
        }
    }
}

/// Fixed-interval polling with explicit cancellation, for data without a push channel.
pub struct Poller {
    interval: Duration,
    stop: StopHandle,
}

impl Poller {
    pub fn new(interval: Duration, stop: StopHandle) -> Self {
        Poller { interval, stop }
    }

    /// Calls `tick` immediately and then once per interval until stopped.
    /// Returns how many ticks ran.
    pub fn run<F: FnMut()>(&self, mut tick: F) -> u64 {
        let mut ticks = 0;
        while !self.stop.is_stopped() {
            tick();
            ticks += 1;
            if !self.stop.sleep(self.interval) {
                break;
            }
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reader_joins_multiline_data_and_skips_comments() {
        let raw = ": keepalive\nevent: finance\ndata: a\ndata: b\nid: 7\n\nevent: finance\ndata: partial";
        let mut r = EventReader::new(Cursor::new(raw));
        let ev = r.next_event().unwrap().unwrap();
        assert_eq!(ev.event, "finance");
        assert_eq!(ev.data, "a\nb");
        assert_eq!(ev.id.as_deref(), Some("7"));
        assert_eq!(r.next_event().unwrap(), None);
    }

    #[test]
    fn reader_defaults_event_name_to_message() {
        let mut r = EventReader::new(Cursor::new("data: hi\r\n\r\n"));
        let ev = r.next_event().unwrap().unwrap();
        assert_eq!(ev.event, "message");
        assert_eq!(ev.data, "hi");
    }

    #[test]
    fn stopped_reader_returns_on_keepalive_without_reading_on() {
        let stop = StopHandle::new();
        stop.stop();
        let mut r = EventReader::new(Cursor::new(": ping\nevent: finance\ndata: x\n\n"))
            .with_stop(stop);
        assert_eq!(r.next_event().unwrap(), None);
        assert_eq!(r.inner.buffer(), b"event: finance\ndata: x\n\n");
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let b = Backoff {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(350),
            max_attempts: Some(3),
        };
        assert_eq!(b.delay(1), Duration::from_millis(100));
        assert_eq!(b.delay(2), Duration::from_millis(200));
        assert_eq!(b.delay(3), Duration::from_millis(350));
        assert!(!b.exhausted(3));
        assert!(b.exhausted(4));
    }

    #[test]
    fn poller_stops_when_asked() {
        let stop = StopHandle::new();
        let poller = Poller::new(Duration::ZERO, stop.clone());
        let mut seen = 0;
        let ticks = poller.run(|| {
            seen += 1;
            if seen == 3 {
                stop.stop();
            }
        });
        assert_eq!(ticks, 3);
    }
}
