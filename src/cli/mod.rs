//! CLI front-end for spec binaries
//!
//! A spec binary registers its specs in a [`Suite`] and hands it to [`run`]:
//!
//! ```rust,no_run
//! use phasespec::{SpecBuilder, Suite};
//!
//! fn main() {
//!     let suite = Suite::new().with_definition(
//!         SpecBuilder::<u32>::new("zero").then("is zero", |n, _| assert_eq!(*n, 0)).build(),
//!     );
//!     phasespec::cli::run(suite);
//! }
//! ```
//!
//! ## Flags
//!
//! - `--reporter <dot|story|json>` - Console output format (default: story)
//! - `-v` - Verbose story output
//! - `-k <EXPR>` - Only run specs whose name contains EXPR
//! - `-x` - Stop after the first spec with a problem
//! - `--backtrace` - Attach filtered backtraces to panics
//! - `--show-output` - Print what problem specs wrote to their output
//! - `--list` - Print spec names and exit
//!
//! ## Design
//!
//! `execute` returns `CliResult<ExitCode>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::process;

use clap::Parser;

use crate::config::{ReporterKind, RunConfig};
use crate::loader::Suite;
use crate::reporter;
use crate::runner::SpecRunner;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    /// Conventional exit status after SIGINT.
    pub const INTERRUPTED: ExitCode = ExitCode(130);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run phase-structured behaviour specs
#[derive(Parser, Debug)]
#[command(version = VERSION)]
#[command(about = "Run phase-structured behaviour specs", long_about = None)]
pub struct Cli {
    /// Console output format
    #[arg(long, value_enum, default_value_t = ReporterKind::Story)]
    pub reporter: ReporterKind,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Filter specs by name substring
    #[arg(short = 'k', value_name = "EXPR")]
    pub filter: Option<String>,

    /// Stop on first problem spec
    #[arg(short = 'x', long = "exitfirst")]
    pub stop_on_fail: bool,

    /// Attach filtered backtraces to panic details
    #[arg(long)]
    pub backtrace: bool,

    /// Print captured output of problem specs
    #[arg(long = "show-output")]
    pub show_output: bool,

    /// List spec names without running them
    #[arg(long)]
    pub list: bool,
}

impl Cli {
    /// Translate parsed flags into a run configuration.
    pub fn config(&self) -> RunConfig {
        let mut config = RunConfig::new()
            .with_reporter(self.reporter)
            .with_verbose(self.verbose)
            .with_stop_on_fail(self.stop_on_fail)
            .with_backtraces(self.backtrace)
            .with_show_output(self.show_output);
        if let Some(filter) = &self.filter {
            config = config.with_filter(filter.clone());
        }
        config
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point for spec binaries.
///
/// This is the only place where `process::exit` is called.
pub fn run(suite: Suite) {
    // Initialize structured logging with env-based filter, defaulting to warn
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    let cli = Cli::parse();
    let color = io::stdout().is_terminal() && cli.reporter != ReporterKind::Json;

    match execute(cli, suite, io::stdout(), color) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute a parsed command line against `suite`, writing reports to `out`.
pub fn execute<W: Write + 'static>(cli: Cli, mut suite: Suite, mut out: W, color: bool) -> CliResult<ExitCode> {
    let config = cli.config().with_color(color);

    if cli.list {
        for name in suite.names().into_iter().filter(|name| config.matches(name)) {
            writeln!(out, "{name}").map_err(|e| CliError::failure(format!("Error writing spec list: {e}")))?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    if suite.is_empty() {
        return Err(CliError::failure("No specs registered"));
    }

    let mut reporter = reporter::for_config(&config, out);
    let runner = SpecRunner::new(config);
    match runner.run(&mut suite, reporter.as_mut()) {
        Ok(summary) if summary.scenarios == 0 => Err(CliError::failure("No specs matched the filter")),
        Ok(summary) if summary.is_ok() => Ok(ExitCode::SUCCESS),
        Ok(_) => Ok(ExitCode::FAILURE),
        Err(interrupted) => Err(CliError::new(interrupted.to_string(), ExitCode::INTERRUPTED)),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::definition::SpecBuilder;
    use crate::should::the;

    /// Writer whose contents stay readable after the reporter took ownership.
    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    fn suite() -> Suite {
        Suite::new()
            .with_definition(SpecBuilder::<u8>::new("addition").then("adds", |_, _| the(1 + 1).should().equal(2)).build())
            .with_definition(SpecBuilder::<u8>::new("subtraction").then("subtracts", |_, _| the(1 - 1).should().equal(1)).build())
    }

    #[test]
    fn test_cli_parse_flags() {
        let cli = Cli::try_parse_from(["specs", "-v", "-x", "-k", "game", "--reporter", "dot", "--backtrace"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.stop_on_fail);
        assert!(cli.backtrace);
        assert_eq!(cli.reporter, ReporterKind::Dot);
        let config = cli.config();
        assert_eq!(config.filter.as_deref(), Some("game"));
        assert!(config.backtraces);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["specs"]).unwrap();
        assert_eq!(cli.reporter, ReporterKind::Story);
        assert!(!cli.list);
        assert_eq!(cli.config(), RunConfig::default());
    }

    #[test]
    fn test_list_prints_names() {
        let cli = Cli::try_parse_from(["specs", "--list", "-k", "sub"]).unwrap();
        let out = SharedBuffer::default();
        let code = execute(cli, suite(), out.clone(), false).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(out.text(), "subtraction\n");
    }

    #[test]
    fn test_failures_exit_with_failure() {
        let cli = Cli::try_parse_from(["specs", "--reporter", "dot"]).unwrap();
        let out = SharedBuffer::default();
        let code = execute(cli, suite(), out.clone(), false).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
        assert!(out.text().starts_with(".X\n"));
    }

    #[test]
    fn test_filter_matching_nothing_is_an_error() {
        let cli = Cli::try_parse_from(["specs", "-k", "nothing"]).unwrap();
        let err = execute(cli, suite(), SharedBuffer::default(), false).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
    }
}
