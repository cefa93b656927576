//! Run configuration for spec binaries

/// Run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Console reporter to use
    pub reporter: ReporterKind,
    /// Print every duration and the captured output of every spec
    pub verbose: bool,
    /// Only run specs whose name contains this text
    pub filter: Option<String>,
    /// Stop after the first spec that does not pass
    pub stop_on_fail: bool,
    /// Attach filtered backtraces to panic details
    pub backtraces: bool,
    /// Print the captured output of problem specs
    pub show_output: bool,
    /// Colorize console output
    pub color: bool,
}

/// Console reporter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReporterKind {
    Dot,
    Story,
    Json,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            reporter: ReporterKind::Story,
            verbose: false,
            filter: None,
            stop_on_fail: false,
            backtraces: false,
            show_output: false,
            color: false,
        }
    }
}

impl RunConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reporter(mut self, reporter: ReporterKind) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the name filter (case-sensitive substring match)
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_stop_on_fail(mut self, stop_on_fail: bool) -> Self {
        self.stop_on_fail = stop_on_fail;
        self
    }

    pub fn with_backtraces(mut self, backtraces: bool) -> Self {
        self.backtraces = backtraces;
        self
    }

    pub fn with_show_output(mut self, show_output: bool) -> Self {
        self.show_output = show_output;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Whether a spec with this name passes the filter
    pub fn matches(&self, spec_name: &str) -> bool {
        self.filter.as_deref().is_none_or(|filter| spec_name.contains(filter))
    }
}
