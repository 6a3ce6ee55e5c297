//! Running registered parser tests and collecting their outcomes.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::diagnostics::HarnessError;
use crate::generator::{TestBody, TestRegistry};

/// In-process registry that runs its tests sequentially.
#[derive(Default)]
pub struct TestSuite {
    tests: Vec<(String, TestBody)>,
}

impl TestRegistry for TestSuite {
    fn register(&mut self, name: String, body: TestBody) {
        self.tests.push((name, body));
    }
}

impl TestSuite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tests.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Run every test in registration order. A panicking body counts as a
    /// failure and does not stop the run.
    pub fn run(self) -> SuiteReport {
        let mut report = SuiteReport::default();
        for (name, body) in self.tests {
            let outcome = panic::catch_unwind(AssertUnwindSafe(body));
            match outcome {
                Ok(Ok(())) => {
                    tracing::info!(test = %name, "ok");
                    report.passed.push(name);
                }
                Ok(Err(err)) => {
                    tracing::warn!(test = %name, error = %err, "FAILED");
                    report.failures.push(TestFailure {
                        name,
                        cause: FailureCause::Error(err),
                    });
                }
                Err(payload) => {
                    let msg = panic_message(payload.as_ref());
                    tracing::warn!(test = %name, panic = %msg, "FAILED");
                    report.failures.push(TestFailure {
                        name,
                        cause: FailureCause::Panic(msg),
                    });
                }
            }
        }
        tracing::info!(
            passed = report.passed.len(),
            failed = report.failures.len(),
            "suite finished"
        );
        report
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[derive(Debug)]
pub enum FailureCause {
    Error(HarnessError),
    Panic(String),
}

#[derive(Debug)]
pub struct TestFailure {
    pub name: String,
    pub cause: FailureCause,
}

impl fmt::Display for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            FailureCause::Error(err) => write!(f, "{}: {err}", self.name),
            FailureCause::Panic(msg) => write!(f, "{}: panicked: {msg}", self.name),
        }
    }
}

#[derive(Debug, Default)]
pub struct SuiteReport {
    pub passed: Vec<String>,
    pub failures: Vec<TestFailure>,
}

impl SuiteReport {
    pub fn total(&self) -> usize {
        self.passed.len() + self.failures.len()
    }

    pub fn failure(&self, name: &str) -> Option<&TestFailure> {
        self.failures.iter().find(|f| f.name == name)
    }

    /// Panic with every failure listed if any test failed.
    pub fn assert_all_passed(&self) {
        if self.failures.is_empty() {
            return;
        }
        let listing: Vec<String> = self.failures.iter().map(|f| format!("  {f}")).collect();
        panic!(
            "{} of {} parser tests failed:\n{}",
            self.failures.len(),
            self.total(),
            listing.join("\n")
        );
    }
}
