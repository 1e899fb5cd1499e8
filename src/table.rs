//! Aligned plain-text rendering for report tables.
//!
//! Numeric cells are right-aligned so price columns line up; everything else
//! is left-aligned. Columns are separated by two spaces and the header is
//! underlined with dashes.

use std::borrow::Cow;
use std::fmt::Write as _;

/// Anything that can be shown as a header row plus body rows.
pub trait Tabular {
    fn headers(&self) -> Vec<String>;
    fn rows(&self) -> Vec<Vec<String>>;
}

/// One row of a report table. Header names match the serde field names.
pub trait TableRow {
    fn headers() -> Vec<String>;
    fn cells(&self) -> Vec<String>;
}

impl<T: TableRow> Tabular for [T] {
    fn headers(&self) -> Vec<String> {
        T::headers()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.iter().map(TableRow::cells).collect()
    }
}

pub fn render<T: Tabular + ?Sized>(value: &T) -> String {
    render_table(&value.headers(), &value.rows())
}

pub fn print_table<T: Tabular + ?Sized>(value: &T) {
    print!("{}", render(value));
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| h.chars().count().max(3))
        .collect::<Vec<_>>();
    let mut numeric = vec![!rows.is_empty(); headers.len()];

    for row in rows {
        for (idx, value) in row.iter().enumerate().take(headers.len()) {
            widths[idx] = widths[idx].max(sanitize(value).chars().count());
            numeric[idx] &= value.is_empty() || value.parse::<f64>().is_ok();
        }
    }

    let mut output = String::new();
    let left = vec![false; headers.len()];
    let _ = writeln!(output, "{}", format_row(headers, &widths, &left));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths, &left));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, &numeric));
    }
    output
}

fn format_row(values: &[String], widths: &[usize], right_align: &[bool]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .zip(right_align)
        .map(|((value, width), right)| {
            let width = *width;
            let cell = sanitize(value);
            if *right {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn sanitize(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

/// Formats an average for display with two decimals.
pub fn format_price(value: f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn numeric_columns_are_right_aligned() {
        let rendered = render_table(
            &strings(&["model", "price"]),
            &[strings(&["ford f150", "9500"]), strings(&["kia soul", "12000"])],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines,
            vec![
                "model      price",
                "---------  -----",
                "ford f150   9500",
                "kia soul   12000",
            ]
        );
    }

    #[test]
    fn control_characters_become_spaces() {
        let rendered = render_table(&strings(&["note"]), &[strings(&["a\nb\tc"])]);
        assert_eq!(rendered.lines().nth(2), Some("a b c"));
    }

    #[test]
    fn empty_body_renders_header_only() {
        let rendered = render_table(&strings(&["id"]), &[]);
        assert_eq!(rendered.lines().collect::<Vec<_>>(), vec!["id", "---"]);
    }
}
