//! Output and panic capture around phase invocations.
//!
//! Phases write narrative text to an injected [`Output`] instead of stdout, so nothing global has to be
//! redirected while a body runs. Panics are caught by the invocation boundary; a process-wide panic hook
//! (installed once) records the panic location for the thread that currently holds a [`PanicCapture`]
//! and stays silent, so that expected failures do not spam stderr. Threads without a capture keep the
//! previously installed hook's behaviour.

use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, PanicHookInfo};
use std::sync::Once;

/// Text sink handed to every phase body.
///
/// ```rust
/// use std::fmt::Write;
/// let mut out = phasespec::Output::new();
/// out.say("rolled 20 gutter balls");
/// writeln!(out, "score: {}", 0).ok();
/// assert_eq!(out.as_str(), "rolled 20 gutter balls\nscore: 0\n");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Output {
    buffer: String,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line.
    pub fn say(&mut self, line: impl fmt::Display) {
        use fmt::Write as _;
        // Writing into a String cannot fail.
        let _ = writeln!(self.buffer, "{line}");
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl fmt::Write for Output {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buffer.push_str(s);
        Ok(())
    }
}

/// Where a captured panic happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PanicSite {
    pub(crate) location: Option<String>,
    pub(crate) frames: Vec<String>,
}

impl PanicSite {
    /// Flatten into display-ready trace lines.
    pub(crate) fn into_trace(self) -> Vec<String> {
        self.location.map(|l| format!("at {l}")).into_iter().chain(self.frames).collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct CaptureMode {
    backtraces: bool,
}

thread_local! {
    static ACTIVE: Cell<Option<CaptureMode>> = const { Cell::new(None) };
    static LAST_SITE: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

/// Scope guard: while alive, panics on this thread are recorded instead of printed.
///
/// Guards nest; dropping one restores whatever mode was active before it.
pub struct PanicCapture {
    previous: Option<CaptureMode>,
}

impl PanicCapture {
    pub fn acquire(backtraces: bool) -> Self {
        INSTALL_HOOK.call_once(install_hook);
        let previous = ACTIVE.with(|active| active.replace(Some(CaptureMode { backtraces })));
        LAST_SITE.with(|site| site.borrow_mut().take());
        Self { previous }
    }

    /// The site of the most recent panic captured by this guard, if any.
    pub(crate) fn take_site(&self) -> Option<PanicSite> {
        LAST_SITE.with(|site| site.borrow_mut().take())
    }
}

impl Drop for PanicCapture {
    fn drop(&mut self) {
        ACTIVE.with(|active| active.set(self.previous));
    }
}

fn install_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let mode = ACTIVE.try_with(Cell::get).ok().flatten();
        match mode {
            Some(mode) => record(info, mode),
            None => previous(info),
        }
    }));
}

fn record(info: &PanicHookInfo<'_>, mode: CaptureMode) {
    let location = info
        .location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
    let frames = if mode.backtraces {
        user_frames(&Backtrace::force_capture().to_string())
    } else {
        Vec::new()
    };
    let _ = LAST_SITE.try_with(|site| *site.borrow_mut() = Some(PanicSite { location, frames }));
}

/// Symbol prefixes that belong to the runtime or to this crate's own machinery.
const INTERNAL_PREFIXES: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "test::",
    "phasespec::outcome::",
    "phasespec::capture::",
    "phasespec::executor::",
    "phasespec::collector::",
    "phasespec::runner::",
    "phasespec::definition::",
    "<std::",
    "<core::",
    "<alloc::",
    "rust_begin_unwind",
    "rust_panic",
    "__rust",
    "__libc",
    "_start",
    "start_thread",
    "clone",
];

fn is_internal(symbol: &str) -> bool {
    INTERNAL_PREFIXES.iter().any(|p| symbol.starts_with(p)) || symbol.contains(" as core::ops::function::Fn")
}

/// Keep only the frames of a rendered [`Backtrace`] that belong to user code.
///
/// A rendered frame is a `N: symbol` line optionally followed by an indented `at file:line:col` line.
pub(crate) fn user_frames(rendered: &str) -> Vec<String> {
    let mut frames = Vec::new();
    let mut keeping = false;
    for line in rendered.lines() {
        let trimmed = line.trim_start();
        if let Some(location) = trimmed.strip_prefix("at ") {
            if keeping {
                frames.push(format!("    at {location}"));
            }
            continue;
        }
        let symbol = match trimmed.split_once(": ") {
            Some((index, symbol)) if index.chars().all(|c| c.is_ascii_digit()) => symbol,
            _ => continue,
        };
        keeping = !is_internal(symbol);
        if keeping {
            frames.push(symbol.to_string());
        }
    }
    frames
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fmt::Write as _;

    #[test]
    fn test_output_collects_lines() {
        let mut out = Output::new();
        assert!(out.is_empty());
        out.say("first");
        write!(out, "second").unwrap();
        assert_eq!(out.into_string(), "first\nsecond");
    }

    #[test]
    fn test_capture_records_site_silently() {
        let capture = PanicCapture::acquire(false);
        let caught = panic::catch_unwind(|| panic!("boom"));
        assert!(caught.is_err());
        let site = capture.take_site().unwrap();
        assert!(site.location.unwrap().contains("capture.rs"));
        assert!(site.frames.is_empty());
    }

    #[test]
    fn test_nested_capture_restores_previous_mode() {
        let outer = PanicCapture::acquire(true);
        {
            let _inner = PanicCapture::acquire(false);
            assert!(matches!(ACTIVE.with(Cell::get), Some(CaptureMode { backtraces: false })));
        }
        assert!(matches!(ACTIVE.with(Cell::get), Some(CaptureMode { backtraces: true })));
        drop(outer);
        assert!(ACTIVE.with(Cell::get).is_none());
    }

    #[test]
    fn test_user_frames_elides_runtime() {
        let rendered = "   0: std::backtrace::Backtrace::force_capture
             at /rustc/abc/library/std/src/backtrace.rs:312:13
   1: phasespec::capture::record
             at ./src/capture.rs:120:9
   2: bowling::GutterGame::then_score_is_zero
             at ./demos/bowling_game.rs:40:9
   3: core::ops::function::FnOnce::call_once
   4: <F as core::ops::function::FnOnce<()>>::call_once
   5: phasespec::outcome::guarded
             at ./src/outcome.rs:250:17";
        assert_eq!(
            user_frames(rendered),
            vec![
                "bowling::GutterGame::then_score_is_zero".to_string(),
                "    at ./demos/bowling_game.rs:40:9".to_string(),
            ]
        );
    }

    #[test]
    fn test_site_into_trace() {
        let site = PanicSite {
            location: Some("src/lib.rs:1:1".to_string()),
            frames: vec!["user::frame".to_string()],
        };
        assert_eq!(site.into_trace(), vec!["at src/lib.rs:1:1", "user::frame"]);
    }
}
