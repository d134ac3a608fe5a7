//! Small string helpers shared by the export code.

use std::borrow::Cow;

/// Quote a CSV field when it contains a delimiter, quote or line break.
pub fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Join already-stringified fields into one CSV line (no trailing newline).
pub fn csv_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|field| csv_field(field.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

/// Escape text for inclusion in HTML element content or a quoted attribute.
pub fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 16);
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

/// Round to two decimal places, the precision used for scores and money.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `name-YYYY-MM-DD.ext`, used for download file names
pub fn dated_filename(name: &str, date: chrono::NaiveDate, extension: &str) -> String {
    format!("{}-{}.{}", name, date.format("%Y-%m-%d"), extension)
}
