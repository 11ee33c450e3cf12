//! CSV rendering of query results
//!
//! The output is deliberately naive: values are joined with `,` and lines end
//! with `\n`, with no quoting or escaping. A text value containing a comma,
//! quote, or line break therefore produces a row that a strict CSV reader
//! will split differently. Consumers of these strings are language-model
//! planners that read the text directly, so the format is kept as-is.

use std::fmt::Write;

use crate::engine::ResultSet;

/// Returned instead of a header-only document when a query yields no rows
pub const NO_DATA: &str = "No data available";

/// Render a result set as CSV text.
///
/// Empty result sets render as [`NO_DATA`]. Otherwise the first line is the
/// column names in driver order, followed by one line per row.
#[must_use]
pub fn render_csv(result: &ResultSet) -> String {
    if result.is_empty() {
        return NO_DATA.to_string();
    }

    let mut csv = String::new();
    csv.push_str(&result.columns.join(","));
    csv.push('\n');

    for row in &result.rows {
        for (idx, value) in row.iter().enumerate() {
            if idx > 0 {
                csv.push(',');
            }
            // Writing into a String cannot fail
            let _ = write!(csv, "{value}");
        }
        csv.push('\n');
    }

    csv
}
