use std::fmt;
use std::time::Duration;

use crate::result::{PhaseStatus, SpecResult};

/// Tallies for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub scenarios: usize,
    pub steps: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    /// Specs that did not pass, in run order.
    pub problem_specs: Vec<String>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: &SpecResult) {
        self.scenarios += 1;
        self.steps += result.steps();
        self.duration += result.duration();
        for record in result.timeline() {
            match record.status {
                PhaseStatus::Passed => self.passed += 1,
                PhaseStatus::Failed(_) => self.failed += 1,
                PhaseStatus::Errored(_) => self.errors += 1,
                PhaseStatus::Skipped => self.skipped += 1,
            }
        }
        if !result.passed() {
            self.problem_specs.push(result.spec_name().to_string());
        }
    }

    /// True when no step failed or errored.
    pub fn is_ok(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }

    /// Counts line without the timing suffix.
    pub fn counts(&self) -> String {
        let skipped = if self.skipped > 0 {
            format!(", {} skipped", self.skipped)
        } else {
            String::new()
        };
        if self.is_ok() {
            format!("ok ({} steps, {} scenarios{skipped}", self.steps, self.scenarios)
        } else {
            format!(
                "{} passed, {} failed, {} errors ({} steps, {} scenarios{skipped}",
                self.passed, self.failed, self.errors, self.steps, self.scenarios
            )
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {:.4} seconds)", self.counts(), self.duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_summary() {
        let summary = RunSummary {
            scenarios: 2,
            steps: 7,
            passed: 7,
            ..RunSummary::default()
        };
        assert_eq!(summary.to_string(), "ok (7 steps, 2 scenarios in 0.0000 seconds)");
    }

    #[test]
    fn test_problem_summary() {
        let summary = RunSummary {
            scenarios: 3,
            steps: 9,
            passed: 6,
            failed: 2,
            errors: 1,
            skipped: 1,
            duration: Duration::from_millis(1500),
            ..RunSummary::default()
        };
        assert!(!summary.is_ok());
        assert_eq!(
            summary.to_string(),
            "6 passed, 2 failed, 1 errors (9 steps, 3 scenarios, 1 skipped in 1.5000 seconds)"
        );
    }
}
