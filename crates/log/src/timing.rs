//! Named performance traces
//!
//! A trace is started by name and stopped by the same name. Starting a name
//! that is already running replaces the earlier start (last write wins;
//! traces do not nest). A trace that is never stopped stays in the registry
//! for the lifetime of its logger, see [`crate::LabLogger::active_traces`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::entry::CallSite;
use crate::logger::LabLogger;

/// A running trace
#[derive(Debug, Clone)]
pub struct PerformanceCounter {
    /// Trace name
    pub name: String,
    /// Wall-clock start
    pub start_time: DateTime<Local>,
    /// Context given at start
    pub context: Context,
    started: Instant,
}

/// Outcome of a stopped trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    /// Trace name
    pub operation: String,
    /// Elapsed wall time in milliseconds
    pub elapsed_milliseconds: u64,
    /// Elapsed time in 100 ns ticks
    pub elapsed_ticks: u64,
    /// When the trace started
    pub start_time: DateTime<Local>,
    /// When the trace stopped
    pub end_time: DateTime<Local>,
}

impl TraceResult {
    /// Elapsed time as a [`Duration`]
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_ticks.saturating_mul(100))
    }
}

/// Registry of running traces
#[derive(Debug, Default)]
pub(crate) struct TraceRegistry {
    counters: Mutex<HashMap<String, PerformanceCounter>>,
}

impl TraceRegistry {
    pub(crate) fn start(&self, name: &str, context: Context) {
        let counter = PerformanceCounter {
            name: name.to_string(),
            start_time: Local::now(),
            context,
            started: Instant::now(),
        };
        self.counters.lock().insert(name.to_string(), counter);
    }

    /// Remove `name` and measure it; `None` when it is not running
    pub(crate) fn stop(&self, name: &str) -> Option<(PerformanceCounter, TraceResult)> {
        let counter = self.counters.lock().remove(name)?;
        let elapsed = counter.started.elapsed();
        let result = TraceResult {
            operation: counter.name.clone(),
            elapsed_milliseconds: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            elapsed_ticks: u64::try_from(elapsed.as_nanos() / 100).unwrap_or(u64::MAX),
            start_time: counter.start_time,
            end_time: Local::now(),
        };
        Some((counter, result))
    }

    pub(crate) fn len(&self) -> usize {
        self.counters.lock().len()
    }
}

/// RAII guard that stops its trace on drop
///
/// Created by [`LabLogger::trace_scope`].
#[must_use = "the trace stops when the guard is dropped"]
#[derive(Debug)]
pub struct TraceGuard {
    logger: LabLogger,
    name: Option<String>,
    site: CallSite,
}

impl TraceGuard {
    pub(crate) fn new(logger: LabLogger, name: String, site: CallSite) -> Self {
        Self {
            logger,
            name: Some(name),
            site,
        }
    }

    /// Stop now and return the result
    pub fn finish(mut self) -> Option<TraceResult> {
        let name = self.name.take()?;
        self.logger.stop_trace_at(&name, None, self.site)
    }
}

impl Drop for TraceGuard {
    fn drop(&mut self) {
        if let Some(name) = self.name.take() {
            self.logger.stop_trace_at(&name, None, self.site);
        }
    }
}
