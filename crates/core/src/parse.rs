//! Text parsing for typed values.
//!
//! Grammar per type:
//!
//! - integers: optional `+`/`-`, then decimal digits; surrounding ASCII
//!   whitespace is ignored. Well-formed text that does not fit the width is
//!   a `Range` error, anything else a `Parse` error.
//! - `DOUBLE`: anything Rust's `f64` parser accepts, including `inf`/`NaN`.
//! - `STRING`: taken verbatim.
//! - `TIMESTAMP`: `<secs>[.<fraction>]` with up to six fraction digits, an
//!   RFC 3339 instant, or `YYYY-MM-DD HH:MM:SS[.fraction]` read as UTC.
//! - arrays: comma separated elements of the element type; empty text is the
//!   empty array.

use crate::error::{Error, Result};
use crate::timestamp::Timestamp;
use crate::types::{DataType, ElementType};
use crate::value::{ArrayValue, Value};
use chrono::{DateTime, NaiveDateTime};

/// Parses `raw` as a value of type `dt`.
pub fn parse_value(dt: DataType, raw: &str) -> Result<Value> {
    match dt {
        DataType::Int16 => parse_signed(dt, raw, i64::from(i16::MIN), i64::from(i16::MAX))
            .map(|v| Value::Int16(v as i16)),
        DataType::Int32 => parse_signed(dt, raw, i64::from(i32::MIN), i64::from(i32::MAX))
            .map(|v| Value::Int32(v as i32)),
        DataType::Int64 => parse_signed(dt, raw, i64::MIN, i64::MAX).map(Value::Int64),
        DataType::UInt16 => {
            parse_unsigned(dt, raw, u64::from(u16::MAX)).map(|v| Value::UInt16(v as u16))
        }
        DataType::UInt32 => {
            parse_unsigned(dt, raw, u64::from(u32::MAX)).map(|v| Value::UInt32(v as u32))
        }
        DataType::UInt64 => parse_unsigned(dt, raw, u64::MAX).map(Value::UInt64),
        DataType::Float64 => raw
            .trim()
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| Error::parse(dt, raw, e.to_string())),
        DataType::String => Ok(Value::String(raw.to_string())),
        DataType::Timestamp => parse_timestamp(raw).map(Value::Timestamp),
        DataType::Array(element) => parse_array(element, raw).map(Value::Array),
    }
}

/// Splits `raw` into sign and digits, rejecting anything else.
fn split_integer<'a>(dt: DataType, raw: &'a str) -> Result<(bool, &'a str)> {
    let text = raw.trim();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() {
        return Err(Error::parse(dt, raw, "expected digits"));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::parse(dt, raw, "invalid digit"));
    }
    Ok((negative, digits))
}

fn parse_magnitude(dt: DataType, raw: &str, digits: &str) -> Result<u128> {
    let digits = digits.trim_start_matches('0');
    // u128 holds any 38 digit number; longer text is out of every width.
    if digits.len() > 38 {
        return Err(Error::range(dt, raw));
    }
    if digits.is_empty() {
        return Ok(0);
    }
    digits.parse::<u128>().map_err(|_| Error::range(dt, raw))
}

fn parse_signed(dt: DataType, raw: &str, min: i64, max: i64) -> Result<i64> {
    let (negative, digits) = split_integer(dt, raw)?;
    let magnitude = parse_magnitude(dt, raw, digits)?;
    let value = if negative {
        -(magnitude as i128)
    } else {
        magnitude as i128
    };
    if value < i128::from(min) || value > i128::from(max) {
        return Err(Error::range(dt, raw));
    }
    Ok(value as i64)
}

fn parse_unsigned(dt: DataType, raw: &str, max: u64) -> Result<u64> {
    let (negative, digits) = split_integer(dt, raw)?;
    let magnitude = parse_magnitude(dt, raw, digits)?;
    if (negative && magnitude != 0) || magnitude > u128::from(max) {
        return Err(Error::range(dt, raw));
    }
    Ok(magnitude as u64)
}

fn parse_timestamp(raw: &str) -> Result<Timestamp> {
    let dt = DataType::Timestamp;
    let text = raw.trim();
    if text.is_empty() {
        return Err(Error::parse(dt, raw, "empty timestamp"));
    }

    if text.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        let (secs_text, frac_text) = text.split_once('.').unwrap_or((text, ""));
        if secs_text.is_empty() || frac_text.contains('.') {
            return Err(Error::parse(dt, raw, "expected <secs>.<fraction>"));
        }
        if frac_text.len() > 6 {
            return Err(Error::parse(dt, raw, "more than six fraction digits"));
        }
        let secs = parse_unsigned(DataType::UInt64, secs_text, u64::MAX)
            .map_err(|_| Error::range(dt, raw))?;
        let mut usecs: u32 = 0;
        for (i, b) in frac_text.bytes().enumerate() {
            usecs += u32::from(b - b'0') * 10u32.pow(5 - i as u32);
        }
        return Ok(Timestamp::new(secs, usecs));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Timestamp::from_datetime(&parsed).ok_or_else(|| Error::range(dt, raw));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Timestamp::from_datetime(&naive.and_utc()).ok_or_else(|| Error::range(dt, raw));
    }
    Err(Error::parse(dt, raw, "unrecognized timestamp format"))
}

fn parse_array(element: ElementType, raw: &str) -> Result<ArrayValue> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(ArrayValue::empty(element));
    }
    let item_type = element.data_type();
    let items = text
        .split(',')
        .map(|item| match parse_value(item_type, item) {
            Ok(v) => Ok(v),
            // Report failures against the array type, keeping the kind.
            Err(Error::Range { .. }) => Err(Error::range(DataType::Array(element), raw)),
            Err(e) => Err(Error::parse(DataType::Array(element), raw, e.to_string())),
        })
        .collect::<Result<Vec<_>>>()?;
    ArrayValue::new(element, items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integers() {
        assert_eq!(parse_value(DataType::Int16, "-32768").unwrap(), Value::Int16(i16::MIN));
        assert_eq!(parse_value(DataType::UInt16, "65535").unwrap(), Value::UInt16(u16::MAX));
        assert_eq!(parse_value(DataType::Int32, " +17 ").unwrap(), Value::Int32(17));
        assert_eq!(
            parse_value(DataType::UInt64, "18446744073709551615").unwrap(),
            Value::UInt64(u64::MAX)
        );
        assert_eq!(parse_value(DataType::UInt32, "-0").unwrap(), Value::UInt32(0));
        assert_eq!(parse_value(DataType::Int64, "000042").unwrap(), Value::Int64(42));
    }

    #[test]
    fn test_integer_range_errors() {
        assert!(matches!(parse_value(DataType::Int16, "32768"), Err(Error::Range { .. })));
        assert!(matches!(parse_value(DataType::UInt16, "-1"), Err(Error::Range { .. })));
        assert!(matches!(
            parse_value(DataType::UInt64, "18446744073709551616"),
            Err(Error::Range { .. })
        ));
        assert!(matches!(
            parse_value(DataType::Int64, "99999999999999999999999999999999999999999"),
            Err(Error::Range { .. })
        ));
    }

    #[test]
    fn test_integer_parse_errors() {
        for bad in ["", "-", "12a", "1.5", "0x10", "--1"] {
            assert!(
                matches!(parse_value(DataType::Int32, bad), Err(Error::Parse { .. })),
                "{:?} should be a parse error",
                bad
            );
        }
    }

    #[test]
    fn test_parse_double() {
        assert_eq!(parse_value(DataType::Float64, "1.25").unwrap(), Value::Float64(1.25));
        assert_eq!(parse_value(DataType::Float64, "-3").unwrap(), Value::Float64(-3.0));
        assert!(parse_value(DataType::Float64, "one").is_err());
    }

    #[test]
    fn test_parse_string_is_verbatim() {
        assert_eq!(parse_value(DataType::String, " a b ").unwrap(), Value::from(" a b "));
        assert_eq!(parse_value(DataType::String, "").unwrap(), Value::from(""));
    }

    #[test]
    fn test_parse_timestamp_forms() {
        assert_eq!(
            parse_value(DataType::Timestamp, "1430000000.5").unwrap(),
            Value::Timestamp(Timestamp::new(1430000000, 500_000))
        );
        assert_eq!(
            parse_value(DataType::Timestamp, "12").unwrap(),
            Value::Timestamp(Timestamp::new(12, 0))
        );
        assert_eq!(
            parse_value(DataType::Timestamp, "1970-01-01T00:01:00.000002Z").unwrap(),
            Value::Timestamp(Timestamp::new(60, 2))
        );
        assert_eq!(
            parse_value(DataType::Timestamp, "1970-01-02 00:00:00").unwrap(),
            Value::Timestamp(Timestamp::new(86_400, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_errors() {
        assert!(matches!(parse_value(DataType::Timestamp, ""), Err(Error::Parse { .. })));
        assert!(matches!(parse_value(DataType::Timestamp, "1.2.3"), Err(Error::Parse { .. })));
        assert!(matches!(parse_value(DataType::Timestamp, ".5"), Err(Error::Parse { .. })));
        assert!(matches!(
            parse_value(DataType::Timestamp, "1.1234567"),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(
            parse_value(DataType::Timestamp, "1969-12-31T23:59:59Z"),
            Err(Error::Range { .. })
        ));
        assert!(matches!(
            parse_value(DataType::Timestamp, "yesterday"),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_arrays() {
        let v = parse_value(DataType::Array(ElementType::UInt16), "1, 2,3").unwrap();
        let arr = v.as_array().unwrap();
        assert_eq!(arr.items(), &[Value::UInt16(1), Value::UInt16(2), Value::UInt16(3)]);

        let empty = parse_value(DataType::Array(ElementType::Int64), "").unwrap();
        assert!(empty.as_array().unwrap().is_empty());

        assert!(matches!(
            parse_value(DataType::Array(ElementType::UInt16), "1,70000"),
            Err(Error::Range { .. })
        ));
        assert!(matches!(
            parse_value(DataType::Array(ElementType::UInt16), "1,,2"),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_round_trip_rendering() {
        let cases = [
            (DataType::Int16, "-7"),
            (DataType::UInt64, "123456789012"),
            (DataType::Float64, "0.1"),
            (DataType::String, "name with spaces"),
            (DataType::Timestamp, "1.000001"),
            (DataType::Array(ElementType::Int32), "-1,0,1"),
        ];
        for (dt, text) in cases {
            let v = parse_value(dt, text).unwrap();
            assert_eq!(v.to_text(), text);
            assert_eq!(parse_value(dt, &v.to_text()).unwrap(), v);
        }
    }
}
