use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};

/// One sample of one channel: a microsecond timestamp, a value rounded to
/// four decimal places, and the channel it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub time: i64,
    pub value: f64,
    pub channel: String,
}

impl Record {
    pub fn new(time: i64, value: f64, channel: impl Into<String>) -> Self {
        Self {
            time,
            value: round4(value),
            channel: channel.into(),
        }
    }
}

pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Parses one raw CSV line into a `Record`. A blank line (after trimming the
/// line ending) yields `None` rather than an error.
pub fn parse(line: &str) -> CodecResult<Option<Record>> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() {
        return Ok(None);
    }
    let mut parts = trimmed.splitn(3, ',');
    let (time_s, value_s, channel) = match (parts.next(), parts.next(), parts.next()) {
        (Some(t), Some(v), Some(c)) => (t, v, c),
        _ => return Err(CodecError::BadRecord(trimmed.to_string())),
    };
    let time: i64 = time_s
        .parse()
        .map_err(|_| CodecError::BadRecord(trimmed.to_string()))?;
    let value: f64 = value_s
        .parse()
        .map_err(|_| CodecError::BadRecord(trimmed.to_string()))?;
    Ok(Some(Record::new(time, value, channel.to_string())))
}

/// Encodes records as `time,value,channel` lines joined by `\n`, with no
/// trailing newline. Returns `None` for an empty slice.
pub fn encode(records: &[Record]) -> Option<String> {
    if records.is_empty() {
        return None;
    }
    let lines: Vec<String> = records
        .iter()
        .map(|r| format!("{},{},{}", r.time, format_value(r.value), r.channel))
        .collect();
    Some(lines.join("\n"))
}

fn format_value(value: f64) -> String {
    let rounded = round4(value);
    if rounded == rounded.trunc() {
        format!("{:.1}", rounded)
    } else {
        let s = format!("{:.4}", rounded);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_line() {
        let r = parse("1000,3.14159,power").unwrap().unwrap();
        assert_eq!(r.time, 1000);
        assert_eq!(r.value, 3.1416);
        assert_eq!(r.channel, "power");
    }

    #[test]
    fn blank_line_is_none() {
        assert!(parse("").unwrap().is_none());
        assert!(parse("\n").unwrap().is_none());
        assert!(parse("\r\n").unwrap().is_none());
    }

    #[test]
    fn malformed_line_is_error() {
        assert!(parse("only,two").is_err());
        assert!(parse("notanumber,1.0,ch").is_err());
    }

    #[test]
    fn round_trip_preserves_rounded_values() {
        let records = vec![
            Record::new(1, 1.0, "a"),
            Record::new(2, 2.5, "a"),
            Record::new(3, 0.00001, "b"),
        ];
        let encoded = encode(&records).unwrap();
        let decoded: Vec<Record> = encoded
            .split('\n')
            .map(|line| parse(line).unwrap().unwrap())
            .collect();
        assert_eq!(decoded, records);
    }

    #[test]
    fn empty_slice_encodes_to_none() {
        assert!(encode(&[]).is_none());
    }
}
