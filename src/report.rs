//! Rendering of suite results as coloured text or JSON.

use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::executor::{CaseResult, CaseStatus};
use crate::suite::{SuiteResult, Summary};

// ============================================================================
// TEXT
// ============================================================================

fn write_label<W: WriteColor>(out: &mut W, label: &str, color: Color) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{label}")?;
    out.reset()
}

fn write_case<W: WriteColor>(out: &mut W, case: &CaseResult) -> io::Result<()> {
    match &case.status {
        CaseStatus::Passed => {
            write_label(out, "PASS", Color::Green)?;
            writeln!(out, ": {} ({})", case.name, iterations(case))
        }
        CaseStatus::Failed => {
            write_label(out, "FAIL", Color::Red)?;
            writeln!(
                out,
                ": {} ({}, {} failed)",
                case.name,
                iterations(case),
                case.failures.len()
            )?;
            for failure in &case.failures {
                writeln!(
                    out,
                    "    iteration {}: {}",
                    failure.iteration, failure.message
                )?;
                writeln!(out, "      arguments: {}", failure.arguments)?;
            }
            Ok(())
        }
        CaseStatus::Skipped { reason } => {
            write_label(out, "SKIP", Color::Yellow)?;
            writeln!(out, ": {} ({reason})", case.name)
        }
    }
}

fn iterations(case: &CaseResult) -> String {
    let noun = if case.iterations_run == 1 {
        "iteration"
    } else {
        "iterations"
    };
    if case.fuzzing {
        format!("{} {noun}, fuzzed", case.iterations_run)
    } else {
        format!("{} {noun}", case.iterations_run)
    }
}

fn write_summary<W: WriteColor>(out: &mut W, summary: &Summary, seed: u64) -> io::Result<()> {
    write!(out, "\nTest summary for `{}`: ", summary.suite)?;
    write_label(out, "passed", Color::Green)?;
    write!(out, " {}, ", summary.passed)?;
    write_label(out, "failed", Color::Red)?;
    write!(out, " {}, ", summary.failed)?;
    write_label(out, "skipped", Color::Yellow)?;
    writeln!(
        out,
        " {} ({} iterations, seed {seed})",
        summary.skipped, summary.iterations
    )
}

/// Writes every case line, its failing iterations, and the summary.
pub fn write_report<W: WriteColor>(out: &mut W, results: &SuiteResult) -> io::Result<()> {
    for case in results.cases() {
        write_case(out, case)?;
    }
    write_summary(out, &results.summary(), results.seed)
}

pub fn print_report(results: &SuiteResult, use_colors: bool) -> io::Result<()> {
    let choice = if use_colors {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_report(&mut stdout, results)?;
    stdout.flush()
}

// ============================================================================
// JSON
// ============================================================================

fn suite_json(results: &SuiteResult) -> serde_json::Value {
    serde_json::json!({
        "suite": results.suite,
        "seed": results.seed,
        "summary": results.summary(),
        "cases": results.cases(),
    })
}

/// Renders one JSON object per suite, as an array.
pub fn render_json(results: &[SuiteResult]) -> serde_json::Result<String> {
    let suites: Vec<_> = results.iter().map(suite_json).collect();
    serde_json::to_string_pretty(&suites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::IterationFailure;
    use crate::invoke::Arguments;
    use crate::value::Value;
    use termcolor::NoColor;

    fn sample() -> SuiteResult {
        let mut results = SuiteResult::new();
        results.reset("demo", 7);
        results.record(CaseResult {
            name: "freezing".into(),
            function: Some("celsius_to_fahrenheit".into()),
            fuzzing: false,
            planned: 1,
            iterations_run: 1,
            passed_iterations: 1,
            failures: vec![],
            status: CaseStatus::Passed,
        });
        let mut arguments = Arguments::new();
        arguments.push("b", Value::Int(0));
        results.record(CaseResult {
            name: "division".into(),
            function: Some("divide".into()),
            fuzzing: true,
            planned: 3,
            iterations_run: 3,
            passed_iterations: 2,
            failures: vec![IterationFailure {
                iteration: 2,
                arguments,
                message: "Unexpected exception ZeroDivisionError".into(),
            }],
            status: CaseStatus::Failed,
        });
        results.record(CaseResult::skipped("off", "disabled"));
        results
    }

    fn render(results: &SuiteResult) -> String {
        let mut out = NoColor::new(Vec::new());
        write_report(&mut out, results).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn text_report_lists_every_case_and_failure() {
        let text = render(&sample());
        assert!(text.contains("PASS: freezing (1 iteration)"));
        assert!(text.contains("FAIL: division (3 iterations, fuzzed, 1 failed)"));
        assert!(text.contains("iteration 2: Unexpected exception ZeroDivisionError"));
        assert!(text.contains("arguments: {b: 0}"));
        assert!(text.contains("SKIP: off (disabled)"));
        assert!(text.contains("passed 1, failed 1, skipped 1 (4 iterations, seed 7)"));
    }

    #[test]
    fn json_report_carries_summary_and_status() {
        let rendered = render_json(&[sample()]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        let suite = &json[0];
        assert_eq!(suite["suite"], "demo");
        assert_eq!(suite["seed"], 7);
        assert_eq!(suite["summary"]["failed"], 1);
        assert_eq!(suite["cases"][1]["status"], "failed");
        assert_eq!(suite["cases"][1]["failures"][0]["arguments"]["b"], 0);
        assert_eq!(suite["cases"][2]["reason"], "disabled");
    }
}
