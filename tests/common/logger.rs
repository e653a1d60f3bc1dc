//! Minimal structured test logger.
//!
//! Prints phase markers and elapsed time to stderr so failing async tests
//! are easy to localize in CI output.
#![allow(dead_code)]

use std::time::Instant;

pub struct TestLogger {
    name: &'static str,
    started: Instant,
}

impl TestLogger {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        eprintln!("[{name}] start");
        Self {
            name,
            started: Instant::now(),
        }
    }

    pub fn phase(&self, phase: &str) {
        eprintln!(
            "[{}] phase={phase} elapsed_ms={}",
            self.name,
            self.started.elapsed().as_millis()
        );
    }

    pub fn info(&self, message: &str) {
        eprintln!("[{}] {message}", self.name);
    }

    pub fn finish_ok(&self) {
        eprintln!(
            "[{}] ok elapsed_ms={}",
            self.name,
            self.started.elapsed().as_millis()
        );
    }
}
