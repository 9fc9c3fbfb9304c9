use std::{fmt, path::Path};

use owo_colors::OwoColorize;

/// A located problem in a particular source file, ready to be shown to a
/// human. Used both for fatal scan errors and for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem<'i> {
    pub severity: Severity,
    pub problem: String,
    pub filename: &'i Path,
    pub source: &'i str,
    pub offset: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl<'i> Problem<'i> {
    // Verbose detailed explanation
    pub fn full_details(&self) -> String {
        let offset = self
            .offset
            .min(
                self.source
                    .len(),
            );
        let i = calculate_line_number(self.source, offset);
        let j = calculate_column_number(self.source, offset);

        let code = self
            .source
            .lines()
            .nth(i)
            .unwrap_or("?");

        let line = i + 1;
        let column = j + 1;

        let width = line
            .to_string()
            .len();
        let width = 3.max(width);

        let label = match self.severity {
            Severity::Error => "error"
                .bright_red()
                .to_string(),
            Severity::Warning => "warning"
                .yellow()
                .to_string(),
        };

        format!(
            r#"
{}: {}
{}:{}:{}

{:width$} {}
{:width$} {} {}
{:width$} {} {:>column$}
            "#,
            label,
            self.problem
                .bold(),
            self.filename
                .to_string_lossy(),
            line,
            column,
            ' ',
            '|'.bright_blue(),
            line.bright_blue(),
            '|'.bright_blue(),
            code,
            ' ',
            '|'.bright_blue(),
            '^'.bright_red(),
        )
        .trim_ascii()
        .to_string()
    }
}

// Concise version for log output
impl<'i> fmt::Display for Problem<'i> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let offset = self
            .offset
            .min(
                self.source
                    .len(),
            );
        let i = calculate_line_number(self.source, offset);
        let j = calculate_column_number(self.source, offset);

        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };

        write!(
            f,
            "{}: {}:{}:{} {}",
            label,
            self.filename
                .to_string_lossy(),
            i + 1,
            j + 1,
            self.problem
        )
    }
}

// This returns a zero-origin result so that it can subsequently be used for
// splitting; for display to humans you'll have to add 1.
pub fn calculate_line_number(content: &str, offset: usize) -> usize {
    content[..offset]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
}

// Calculate the column number, also zero-origin for consistency.
pub fn calculate_column_number(content: &str, offset: usize) -> usize {
    let before = &content[..offset];
    match before.rfind('\n') {
        Some(start) => offset - start - 1,
        None => offset,
    }
}
