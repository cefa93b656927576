//! Runs every spec a [`Loader`] provides, reporting to one [`Reporter`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::config::RunConfig;
use crate::executor::SpecExecutor;
use crate::loader::Loader;
use crate::outcome::Interrupted;
use crate::reporter::{Reporter, RunSummary};

/// Shared flag that asks a running suite to stop.
///
/// Clones share the same flag, so one can be handed to a signal handler or another thread while the
/// runner polls it before every spec and every phase.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SpecRunner {
    config: RunConfig,
    interrupt: InterruptFlag,
}

impl SpecRunner {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            interrupt: InterruptFlag::new(),
        }
    }

    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// A handle to this runner's interrupt flag.
    pub fn interrupt_flag(&self) -> InterruptFlag {
        self.interrupt.clone()
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the specs in loader order.
    ///
    /// Specs not matching the name filter are not executed and not reported. With `stop_on_fail`
    /// the run ends after the first spec that did not pass.
    pub fn run(&self, loader: &mut dyn Loader, reporter: &mut dyn Reporter) -> Result<RunSummary, Interrupted> {
        let started = Instant::now();
        let mut summary = RunSummary::new();
        reporter.on_run_start();

        for definition in loader.load_specs() {
            if !self.config.matches(definition.name()) {
                tracing::debug!(spec = definition.name(), "filtered out");
                continue;
            }
            if self.interrupt.is_raised() {
                tracing::info!("interrupt requested; stopping run");
                return Err(Interrupted);
            }

            let result = SpecExecutor::new(&mut *reporter)
                .with_backtraces(self.config.backtraces)
                .with_interrupt(self.interrupt.clone())
                .execute(&definition)?;
            summary.add(&result);

            if self.config.stop_on_fail && !result.passed() {
                tracing::debug!(spec = result.spec_name(), "stopping after first problem");
                break;
            }
        }

        summary.duration = started.elapsed();
        reporter.on_run_complete(&summary);
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::definition::SpecBuilder;
    use crate::loader::Suite;
    use crate::reporter::RecordingReporter;
    use crate::should::the;

    fn suite() -> Suite {
        Suite::new()
            .with_definition(
                SpecBuilder::<i32>::new("failing arithmetic")
                    .then("two plus two is five", |_, _| the(2 + 2).should().equal(5))
                    .build(),
            )
            .with_definition(
                SpecBuilder::<i32>::new("passing arithmetic")
                    .then("two plus two is four", |_, _| the(2 + 2).should().equal(4))
                    .build(),
            )
    }

    #[test]
    fn test_runs_everything_by_default() {
        let mut reporter = RecordingReporter::new();
        let summary = SpecRunner::new(RunConfig::default())
            .run(&mut suite(), &mut reporter)
            .unwrap();
        assert_eq!(summary.scenarios, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.problem_specs, vec!["failing arithmetic".to_string()]);
        assert_eq!(reporter.summary, Some(summary));
    }

    #[test]
    fn test_filter() {
        let mut reporter = RecordingReporter::new();
        let config = RunConfig::default().with_filter("passing");
        let summary = SpecRunner::new(config).run(&mut suite(), &mut reporter).unwrap();
        assert_eq!(summary.scenarios, 1);
        assert!(summary.is_ok());
    }

    #[test]
    fn test_stop_on_fail() {
        let mut reporter = RecordingReporter::new();
        let config = RunConfig::default().with_stop_on_fail(true);
        let summary = SpecRunner::new(config).run(&mut suite(), &mut reporter).unwrap();
        assert_eq!(summary.scenarios, 1);
        assert_eq!(reporter.completed.len(), 1);
    }

    #[test]
    fn test_interrupt_aborts_run() {
        let runner = SpecRunner::new(RunConfig::default());
        runner.interrupt_flag().raise();
        let mut reporter = RecordingReporter::new();
        assert_eq!(runner.run(&mut suite(), &mut reporter), Err(Interrupted));
        assert!(reporter.summary.is_none());
    }
}
