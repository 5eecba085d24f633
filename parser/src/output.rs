//! @ai:module:intent Format scan results for terminals and machines
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, TodoRecord, format_report, format_annotation, to_json
//! @ai:module:depends_on annotation, scan
//! @ai:module:stateless true

use crate::annotation::{Annotation, Attribute, Todo};
use crate::scan::ScanReport;
use colored::Colorize;
use serde::Serialize;
use serde_json::{Map, Value};

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
    /// One compact JSON object per line
    JsonLines,
}

/// @ai:intent Flat JSON shape of one todo
/// @ai:invariant attributes keeps the last value for a repeated key, at the key's first position
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TodoRecord {
    pub location: String,
    pub line: String,
    pub description: String,
    pub attributes: Map<String, Value>,
}

impl From<&Todo> for TodoRecord {
    fn from(todo: &Todo) -> Self {
        Self {
            location: todo.location.to_string(),
            line: todo.line.clone(),
            description: todo.description.clone(),
            attributes: attribute_map(&todo.attributes),
        }
    }
}

fn attribute_map(attributes: &[Attribute]) -> Map<String, Value> {
    attributes
        .iter()
        .map(|a| (a.key.clone(), Value::String(a.value.clone())))
        .collect()
}

/// @ai:intent Format a whole scan report as a string
/// @ai:effects pure
pub fn format_report(report: &ScanReport, format: OutputFormat) -> String {
    let records = || report.todos().map(TodoRecord::from);
    match format {
        OutputFormat::Json => to_json(&records().collect::<Vec<_>>(), false),
        OutputFormat::JsonPretty => to_json(&records().collect::<Vec<_>>(), true),
        OutputFormat::JsonLines => records()
            .map(|r| to_json(&r, false) + "\n")
            .collect(),
        OutputFormat::Text => format_report_text(report),
    }
}

/// @ai:intent Format scan results as human-readable text
/// @ai:effects pure
fn format_report_text(report: &ScanReport) -> String {
    let mut output = String::new();

    for todo in report.todos() {
        output.push_str(&format!(
            "{} {}",
            format!("{}:", todo.location).dimmed(),
            todo.description
        ));
        for attr in &todo.attributes {
            output.push_str(&format!(" {}", attr.to_string().cyan()));
        }
        output.push('\n');
    }

    for failure in &report.failures {
        output.push_str(&format!(
            "{} {} - {}\n",
            "WARN".yellow().bold(),
            failure.path.display().to_string().dimmed(),
            failure.message
        ));
    }

    if !report.files.is_empty() || !report.failures.is_empty() {
        output.push('\n');
    }
    let total = report.total();
    output.push_str(&format!(
        "Found {} in {}\n",
        if total == 0 {
            "no todos".green().bold().to_string()
        } else {
            plural(total, "todo").yellow().bold().to_string()
        },
        plural(report.files_scanned, "file")
    ));

    output
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// @ai:intent Format a single parsed annotation, e.g. for the `line` command
/// @ai:effects pure
pub fn format_annotation(annotation: &Annotation, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => annotation.to_string(),
        OutputFormat::Json | OutputFormat::JsonLines => to_json(annotation, false),
        OutputFormat::JsonPretty => to_json(annotation, true),
    }
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value).unwrap_or_default()
    } else {
        serde_json::to_string(value).unwrap_or_default()
    }
}
