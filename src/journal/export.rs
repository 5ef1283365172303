//! CSV rendering of the turn journal (RFC 4180 quoting, CRLF line ends).

use super::TurnRecord;
use std::borrow::Cow;
use std::io::{self, Write};

pub const CSV_HEADER: [&str; 15] = [
    "session_id",
    "turn_index",
    "timestamp",
    "language",
    "user_text",
    "agent_text",
    "emotion",
    "risk_level",
    "risk_flag",
    "safety_category",
    "joy_mode",
    "include_support",
    "trend",
    "insight_json",
    "safety_json",
];

/// Quote a field when it contains a delimiter, quote or line break.
pub fn csv_escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

fn write_row<W: Write>(writer: &mut W, fields: &[&str]) -> io::Result<()> {
    for (index, field) in fields.iter().enumerate() {
        if index > 0 {
            writer.write_all(b",")?;
        }
        writer.write_all(csv_escape(field).as_bytes())?;
    }
    writer.write_all(b"\r\n")
}

pub fn write_csv<W: Write>(records: &[TurnRecord], writer: &mut W) -> io::Result<()> {
    write_row(writer, &CSV_HEADER)?;
    for record in records {
        let turn_index = record.turn_index.to_string();
        let timestamp = record.timestamp.to_rfc3339();
        write_row(
            writer,
            &[
                record.session_id.as_str(),
                turn_index.as_str(),
                timestamp.as_str(),
                record.language.as_str(),
                record.user_text.as_str(),
                record.agent_text.as_str(),
                record.emotion.as_str(),
                record.risk_level.as_str(),
                flag(record.risk_flag),
                record.safety_category.as_str(),
                flag(record.joy_mode),
                flag(record.include_support),
                record.trend.as_str(),
                record.insight_json.as_str(),
                record.safety_json.as_str(),
            ],
        )?;
    }
    writer.flush()
}

pub fn to_csv_string(records: &[TurnRecord]) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_csv(records, &mut buffer);
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::sample_record;

    #[test]
    fn plain_fields_are_not_quoted() {
        assert_eq!(csv_escape("hello"), "hello");
    }

    #[test]
    fn special_fields_are_quoted() {
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(csv_escape(r#"say "hi""#), r#""say ""hi""""#);
    }

    #[test]
    fn empty_export_is_header_only() {
        let csv = to_csv_string(&[]);
        assert_eq!(csv, format!("{}\r\n", CSV_HEADER.join(",")));
    }

    #[test]
    fn rows_follow_header_with_flags_as_digits() {
        let mut record = sample_record("s1", 3);
        record.user_text = "em ổn, cảm ơn".into();
        record.insight_json = r#"{"emotion":"joy"}"#.into();
        record.joy_mode = true;
        let csv = to_csv_string(&[record]);
        let lines: Vec<&str> = csv.split("\r\n").collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("s1,3,"));
        assert!(lines[1].contains(",\"em ổn, cảm ơn\","));
        assert!(lines[1].contains(r#""{""emotion"":""joy""}""#));
        assert!(lines[1].contains(",neutral,low,0,none,1,0,unknown,"));
        assert_eq!(lines[2], "");
    }
}
