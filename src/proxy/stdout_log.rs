//! Bounded history of raw subprocess stdout lines.
//!
//! Kept for debugging frames that never reach a waiter (undecodable output,
//! notifications, late responses).

use std::collections::VecDeque;

/// Ring buffer of the most recent raw stdout lines.
#[derive(Debug)]
pub(crate) struct StdoutLog {
    lines: std::sync::Mutex<VecDeque<String>>,
    capacity: usize,
}

impl StdoutLog {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            lines: std::sync::Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append a line, evicting the oldest once capacity is reached.
    pub(crate) fn push(&self, line: &str) {
        if self.capacity == 0 {
            return;
        }
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        while lines.len() >= self.capacity {
            lines.pop_front();
        }
        lines.push_back(line.to_string());
    }

    /// The last `n` lines, oldest first.
    pub(crate) fn recent(&self, n: usize) -> Vec<String> {
        let lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        let skip = lines.len().saturating_sub(n);
        lines.iter().skip(skip).cloned().collect()
    }
}
