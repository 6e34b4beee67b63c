use std::collections::HashMap;
use std::fmt::Write;

use chrono::{Duration, NaiveDate};

use crate::error::{ClaimError, ClaimResult};
use crate::models::{ConditionSummary, LogEntry, StatementDocument};

pub const TITLE: &str = "STATEMENT IN SUPPORT OF CLAIM";
pub const UNSPECIFIED_CONDITION: &str = "Unspecified condition";
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

const NAME_PLACEHOLDER: &str = "[Your Name]";
const MAX_EXCERPTS: usize = 6;
const WORK_IMPACT_SUFFIX: &str = " (affected work/function)";
const BASIS: &str = "I am submitting this statement to describe the frequency, severity, and \
functional impact of my symptoms during the period listed above. The information below is based \
on a daily symptom log I kept to accurately document my condition(s).";
const CERTIFICATION: &str =
    "I certify that the statements above are true and correct to the best of my knowledge and belief.";

/// The last `days` days ending on `today`, inclusive of both ends.
pub fn default_window(today: NaiveDate, days: i64) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(days.max(0)), today)
}

/// Per-condition statistics, in the order each condition first appears.
pub fn summarize_by_condition(entries: &[LogEntry]) -> Vec<ConditionSummary> {
    let mut order: Vec<(String, Vec<&LogEntry>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let key = match entry.condition.trim() {
            "" => UNSPECIFIED_CONDITION.to_string(),
            name => name.to_string(),
        };
        match index.get(&key) {
            Some(&slot) => order[slot].1.push(entry),
            None => {
                index.insert(key.clone(), order.len());
                order.push((key, vec![entry]));
            }
        }
    }

    order
        .into_iter()
        .map(|(condition, group)| summarize_group(condition, &group))
        .collect()
}

fn summarize_group(condition: String, group: &[&LogEntry]) -> ConditionSummary {
    let total: i64 = group.iter().map(|e| i64::from(e.severity)).sum();
    let max_severity = group.iter().map(|e| e.severity).max().unwrap_or(0);
    let work_impact_days = group.iter().filter(|e| e.affected_work).count();

    let note_excerpts = group
        .iter()
        .filter_map(|entry| entry.note_text().map(|note| excerpt(entry, note)))
        .take(MAX_EXCERPTS)
        .collect();

    ConditionSummary {
        condition,
        count: group.len(),
        average_severity: round_half_up_tenths(total, group.len() as i64),
        max_severity,
        work_impact_days,
        note_excerpts,
    }
}

fn excerpt(entry: &LogEntry, note: &str) -> String {
    let suffix = if entry.affected_work {
        WORK_IMPACT_SUFFIX
    } else {
        ""
    };
    format!(
        "{}: severity {}/10{}. {}",
        entry.logged_date, entry.severity, suffix, note
    )
}

/// Mean of `total / count` rounded to one decimal, halves rounding up.
fn round_half_up_tenths(total: i64, count: i64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let tenths = (total * 20 + count) / (count * 2);
    tenths as f64 / 10.0
}

/// Whole numbers print without a decimal, everything else with one.
pub fn format_severity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Groups `entries` into a statement; `None` when there is nothing to report.
pub fn build_document(
    entries: &[LogEntry],
    subject_name: &str,
    request_label: Option<&str>,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> ClaimResult<Option<StatementDocument>> {
    if window_start > window_end {
        return Err(ClaimError::InvalidWindow {
            start: window_start.to_string(),
            end: window_end.to_string(),
        });
    }
    if entries.is_empty() {
        return Ok(None);
    }

    Ok(Some(StatementDocument {
        subject_name: subject_name.trim().to_string(),
        request_label: request_label
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string),
        window_start,
        window_end,
        conditions: summarize_by_condition(entries),
    }))
}

/// Renders the statement text. Line prefixes `Name:`, `Claim type` and
/// `Condition:` are what the document exporters key their headings on.
pub fn render(document: &StatementDocument) -> String {
    let mut output = String::new();
    let name = if document.subject_name.is_empty() {
        NAME_PLACEHOLDER
    } else {
        document.subject_name.as_str()
    };

    let _ = writeln!(output, "{TITLE}");
    let _ = writeln!(output);
    let _ = writeln!(output, "Name: {name}");
    if let Some(label) = &document.request_label {
        let _ = writeln!(output, "Claim type / request: {label}");
    }
    let _ = writeln!(
        output,
        "Date range covered: {} through {}",
        document.window_start, document.window_end
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "{BASIS}");
    let _ = writeln!(output);

    for summary in &document.conditions {
        let _ = writeln!(output, "Condition: {}", summary.condition);
        let _ = writeln!(output, "- Number of logged days: {}", summary.count);
        let _ = writeln!(
            output,
            "- Average severity (1–10): {}",
            format_severity(summary.average_severity)
        );
        let _ = writeln!(output, "- Highest severity (1–10): {}", summary.max_severity);
        let _ = writeln!(
            output,
            "- Days affecting work/function: {}",
            summary.work_impact_days
        );
        let _ = writeln!(output);

        if !summary.note_excerpts.is_empty() {
            let _ = writeln!(output, "Examples from my log:");
            for line in &summary.note_excerpts {
                let _ = writeln!(output, "- {line}");
            }
            let _ = writeln!(output);
        }
    }

    let _ = writeln!(output, "{CERTIFICATION}");
    let _ = writeln!(output);
    let _ = writeln!(output, "Signature: ____________________________");
    let _ = write!(output, "Date: _________________________________");

    output
}

/// Full statement text for `entries`, or an empty string when there are none.
pub fn aggregate(
    entries: &[LogEntry],
    subject_name: &str,
    request_label: Option<&str>,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> ClaimResult<String> {
    let document = build_document(
        entries,
        subject_name,
        request_label,
        window_start,
        window_end,
    )?;
    Ok(document.as_ref().map(render).unwrap_or_default())
}
