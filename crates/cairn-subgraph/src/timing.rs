//! Elapsed-time measurement and reporting for subgraph runs.

use std::time::{Duration, Instant};

/// Accumulating stopwatch.
///
/// Each `start`/`stop` pair records one lap; the total is the sum of all laps
/// plus the running one, if any.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    started: Option<Instant>,
    laps: Vec<Duration>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a lap. Has no effect if already running.
    pub fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    /// Stop the running lap and return its duration, or `None` if the
    /// stopwatch was not running.
    pub fn stop(&mut self) -> Option<Duration> {
        let lap = self.started.take()?.elapsed();
        self.laps.push(lap);
        Some(lap)
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Number of completed laps.
    pub fn lap_count(&self) -> usize {
        self.laps.len()
    }

    pub fn laps(&self) -> &[Duration] {
        &self.laps
    }

    pub fn total_duration(&self) -> Duration {
        let running = self.started.map(|s| s.elapsed()).unwrap_or_default();
        self.laps.iter().sum::<Duration>() + running
    }

    /// Mean completed lap, `None` before the first lap completes.
    pub fn average_duration(&self) -> Option<Duration> {
        let count = u32::try_from(self.laps.len()).ok().filter(|&n| n > 0)?;
        Some(self.laps.iter().sum::<Duration>() / count)
    }

    pub fn reset(&mut self) {
        self.started = None;
        self.laps.clear();
    }
}

/// Format a total duration and the average per node.
///
/// The average is reported in whole milliseconds, or in microseconds when it
/// is below one millisecond. A node count of zero is treated as one.
pub fn total_and_average(total: Duration, nodes: u64) -> String {
    let nodes = u128::from(nodes.max(1));
    let mut average = total.as_millis() / nodes;
    let mut units = "millisecond(s)";
    if average < 1 {
        average = total.as_micros() / nodes;
        units = "microsecond(s)";
    }
    format!("total = {total:?}; avg = {average} {units}")
}
