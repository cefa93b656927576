//! Machine-readable reporter: one JSON object per line.

use std::io::Write;

use phasespec_core::PhaseKind;
use serde_json::{Value, json};

use super::{Reporter, RunSummary, Stage};
use crate::outcome::OutcomeDetail;
use crate::result::{SpecResult, SpecStatus};

pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, value: Value) {
        if let Err(err) = writeln!(self.out, "{value}").and_then(|()| self.out.flush()) {
            tracing::warn!(%err, "json reporter could not write event");
        }
    }
}

fn detail_json(detail: &OutcomeDetail) -> Value {
    json!({
        "kind": detail.kind,
        "message": detail.message,
        "trace": detail.trace,
    })
}

fn status_str(status: SpecStatus) -> &'static str {
    match status {
        SpecStatus::Completed => "completed",
        SpecStatus::Broken => "broken",
        SpecStatus::Unimplemented => "unimplemented",
        SpecStatus::Skipped => "skipped",
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn on_spec_start(&mut self, spec: &str) {
        self.emit(json!({ "event": "spec_start", "spec": spec }));
    }

    fn success(&mut self, spec: &str, kind: PhaseKind, description: &str) {
        self.emit(json!({
            "event": "success",
            "spec": spec,
            "phase": kind.as_str(),
            "description": description,
        }));
    }

    fn assertion_failure(&mut self, spec: &str, description: &str, detail: &OutcomeDetail) {
        self.emit(json!({
            "event": "assertion_failure",
            "spec": spec,
            "phase": PhaseKind::Assert.as_str(),
            "description": description,
            "detail": detail_json(detail),
        }));
    }

    fn error(&mut self, spec: &str, stage: Stage, description: &str, detail: &OutcomeDetail) {
        self.emit(json!({
            "event": "error",
            "spec": spec,
            "phase": stage.to_string(),
            "description": description,
            "detail": detail_json(detail),
        }));
    }

    fn skipped(&mut self, spec: &str, stage: Stage, description: &str) {
        self.emit(json!({
            "event": "skipped",
            "spec": spec,
            "phase": stage.to_string(),
            "description": description,
        }));
    }

    fn on_spec_complete(&mut self, result: &SpecResult) {
        self.emit(json!({
            "event": "spec_complete",
            "spec": result.spec_name(),
            "status": status_str(result.status()),
            "passed": result.passed(),
            "duration_secs": result.duration().as_secs_f64(),
        }));
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        self.emit(json!({
            "event": "run_complete",
            "ok": summary.is_ok(),
            "scenarios": summary.scenarios,
            "steps": summary.steps,
            "passed": summary.passed,
            "failed": summary.failed,
            "errors": summary.errors,
            "skipped": summary.skipped,
            "duration_secs": summary.duration.as_secs_f64(),
        }));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_one_object_per_line() {
        let mut reporter = JsonReporter::new(Vec::new());
        reporter.success("calc", PhaseKind::Setup, "a calculator");
        reporter.error(
            "calc",
            Stage::Meta,
            "collect steps",
            &OutcomeDetail::new("SpecDefinitionError", "no assertions"),
        );
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["phase"], "given");
        assert_eq!(lines[1]["phase"], "spec");
        assert_eq!(lines[1]["detail"]["kind"], "SpecDefinitionError");
    }
}
