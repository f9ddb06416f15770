// Reporting and output for twinprobe
// Grid tables for the terminal, CSV and Markdown export of probe outcomes

use crate::locators::identifier_params;
use crate::models::{LocatorSet, Outcome, ProbeOutcome};
use crate::pipeline::{AnalysisReport, ProbeRun};
use chrono::Local;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Render rows as a grid table: `+---+` rules between rows, `+===+` under the header.
pub fn render_grid(headers: &[&str], rows: &[Vec<String>]) -> String {
    let columns = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().take(columns).enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let rule = |fill: char| -> String {
        let mut line = String::from("+");
        for w in &widths {
            line.extend(std::iter::repeat(fill).take(w + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };
    let line = |cells: Vec<&str>| -> String {
        let mut out = String::from("|");
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).copied().unwrap_or("");
            let pad = w - cell.chars().count();
            out.push(' ');
            out.push_str(cell);
            out.extend(std::iter::repeat(' ').take(pad + 1));
            out.push('|');
        }
        out.push('\n');
        out
    };

    let mut table = rule('-');
    table.push_str(&line(headers.to_vec()));
    table.push_str(&rule('='));
    for row in rows {
        table.push_str(&line(row.iter().map(|c| c.as_str()).collect()));
        table.push_str(&rule('-'));
    }
    table
}

/// Two sets next to each other, shorter column padded with blanks.
pub fn render_side_by_side(header_a: &str, a: &LocatorSet, header_b: &str, b: &LocatorSet) -> String {
    let left = a.to_strings();
    let right = b.to_strings();
    let rows: Vec<Vec<String>> = (0..left.len().max(right.len()))
        .map(|i| {
            vec![
                left.get(i).cloned().unwrap_or_default(),
                right.get(i).cloned().unwrap_or_default(),
            ]
        })
        .collect();
    render_grid(&[header_a, header_b], &rows)
}

pub fn render_probe_run(run: &ProbeRun) -> String {
    let mut out = format!(
        "\nAttempting to access {}'s paths using {}'s credentials:\n",
        run.owner, run.prober
    );
    if let Some(err) = &run.login_error {
        out.push_str(&format!("Login as {} failed, probe run aborted: {}\n", run.prober, err));
        return out;
    }
    if run.outcomes.is_empty() {
        out.push_str("No unique paths to probe.\n");
        return out;
    }

    let rows: Vec<Vec<String>> = run
        .outcomes
        .iter()
        .map(|o| {
            vec![
                o.locator.to_string(),
                o.outcome.headline().to_string(),
                o.reason.clone(),
            ]
        })
        .collect();
    out.push_str(&render_grid(&["Path", "Result", "Details"], &rows));
    out.push_str(&format!(
        "{} bypass(es), {} denied, {} error(s)\n",
        run.count(Outcome::Success),
        run.count(Outcome::Denied),
        run.count(Outcome::Error)
    ));
    out
}

/// Full human-readable report.
pub fn render_report(report: &AnalysisReport) -> String {
    let a = &report.identity_a;
    let b = &report.identity_b;
    let mut out = String::new();

    out.push_str(&format!("\nLinks Available in {} and {} Pages:\n", a.label, b.label));
    out.push_str(&render_side_by_side(
        &format!("{} Paths", a.label),
        a.scoped.locators(),
        &format!("{} Paths", b.label),
        b.scoped.locators(),
    ));

    out.push_str("\nCommon Links:\n");
    let shared: Vec<Vec<String>> = report.diff.shared.iter().map(|l| vec![l.to_string()]).collect();
    out.push_str(&render_grid(&["Path"], &shared));

    out.push_str(&format!(
        "\n(Possible IDOR) Links with IDs in {} and {} Pages:\n",
        a.label, b.label
    ));
    out.push_str(&render_side_by_side(&a.label, &a.identifiers, &b.label, &b.identifiers));

    let flagged: Vec<Vec<String>> = a
        .identifiers
        .union(&b.identifiers)
        .iter()
        .map(|l| {
            let params: Vec<String> = identifier_params(l)
                .iter()
                .map(|p| format!("{}={} ({:?})", p.name, p.value, p.kind))
                .collect();
            vec![l.to_string(), params.join(", ")]
        })
        .collect();
    if !flagged.is_empty() {
        out.push_str(&render_grid(&["Path", "Parameters"], &flagged));
    }

    out.push_str(&render_probe_run(&report.run_a_as_b));
    out.push_str(&render_probe_run(&report.run_b_as_a));

    out.push_str(&format!(
        "\nTotal authorization bypasses: {}\n",
        report.total_bypasses()
    ));
    out
}

/// Escape CSV field to prevent formula injection attacks
/// Cells starting with =, +, -, @, or tab are prefixed with single quote
fn escape_csv_field(field: &str) -> String {
    let needs_escaping = matches!(field.chars().next(), Some('=' | '+' | '-' | '@' | '\t'));

    if needs_escaping {
        format!("\"'{}\"", field.replace('"', "\"\""))
    } else if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn report_filename(extension: &str) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    format!("twinprobe_report_{}.{}", timestamp, extension)
}

pub fn export_csv(outcomes: &[ProbeOutcome]) -> Result<String, std::io::Error> {
    export_csv_in(Path::new("."), outcomes)
}

/// Write the CSV report into `dir`, returning the file name.
pub fn export_csv_in(dir: &Path, outcomes: &[ProbeOutcome]) -> Result<String, std::io::Error> {
    let filename = report_filename("csv");
    let mut file = File::create(dir.join(&filename))?;

    writeln!(file, "Prober,URL,Outcome,ObservedURL,Reason")?;
    for o in outcomes {
        let observed = o.observed_url.as_ref().map(|u| u.to_string()).unwrap_or_default();
        writeln!(
            file,
            "{},{},{},{},{}",
            escape_csv_field(&o.prober),
            escape_csv_field(o.locator.as_str()),
            o.outcome,
            escape_csv_field(&observed),
            escape_csv_field(&o.reason)
        )?;
    }

    Ok(filename)
}

pub fn export_markdown(outcomes: &[ProbeOutcome]) -> Result<String, std::io::Error> {
    export_markdown_in(Path::new("."), outcomes)
}

pub fn export_markdown_in(dir: &Path, outcomes: &[ProbeOutcome]) -> Result<String, std::io::Error> {
    let filename = report_filename("md");
    let mut file = File::create(dir.join(&filename))?;

    writeln!(file, "# twinprobe Report\n")?;
    for o in outcomes {
        writeln!(
            file,
            "- **{}** {} as `{}`: {}",
            o.outcome, o.locator, o.prober, o.reason
        )?;
    }

    Ok(filename)
}
