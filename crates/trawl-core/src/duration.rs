//! Duration literals: `"300ms"`, `"1.5s"`, `"2h45m"`, `"-1ms"`.
//!
//! The extraction prompt asks the model to copy durations verbatim, so the
//! literals follow the compact `<number><unit>` notation users actually type.
//! A literal is an optional sign followed by one or more decimal groups, each
//! with a unit. The bare literal `"0"` is the only unit-less form accepted.

use chrono::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MIN: u128 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MIN;

/// Fraction digits beyond nanosecond precision are discarded.
const MAX_FRACTION_DIGITS: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("empty duration literal")]
    Empty,
    #[error("invalid duration {0:?}")]
    Invalid(String),
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),
    #[error("unknown unit {unit:?} in duration {literal:?}")]
    UnknownUnit { unit: String, literal: String },
    #[error("duration {0:?} is out of range")]
    Overflow(String),
}

/// Parse a signed duration literal at nanosecond precision.
pub fn parse_duration(literal: &str) -> Result<Duration, DurationError> {
    if literal.is_empty() {
        return Err(DurationError::Empty);
    }

    let (negative, mut rest) = match literal.as_bytes()[0] {
        b'-' => (true, &literal[1..]),
        b'+' => (false, &literal[1..]),
        _ => (false, literal),
    };

    if rest == "0" {
        return Ok(Duration::zero());
    }
    if rest.is_empty() {
        return Err(DurationError::Invalid(literal.to_string()));
    }

    let overflow = || DurationError::Overflow(literal.to_string());
    let mut total: u128 = 0;

    while !rest.is_empty() {
        let (int_part, after_int) = split_digits(rest);
        let (frac_part, after_num) = match after_int.strip_prefix('.') {
            Some(tail) => split_digits(tail),
            None => ("", after_int),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(DurationError::Invalid(literal.to_string()));
        }

        let unit_end = after_num
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after_num.len());
        let (unit, tail) = after_num.split_at(unit_end);
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(literal.to_string()));
        }
        let scale = unit_scale(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            literal: literal.to_string(),
        })?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| overflow())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(overflow)?;

        if !frac_part.is_empty() {
            let digits = &frac_part[..frac_part.len().min(MAX_FRACTION_DIGITS)];
            let frac: u128 = digits.parse().map_err(|_| overflow())?;
            let denom = 10u128.pow(digits.len() as u32);
            nanos = nanos
                .checked_add(frac * scale / denom)
                .ok_or_else(overflow)?;
        }

        total = total.checked_add(nanos).ok_or_else(overflow)?;
        if total > i64::MAX as u128 + u128::from(negative) {
            return Err(overflow());
        }
        rest = tail;
    }

    let signed = if negative {
        -(total as i128)
    } else {
        total as i128
    };
    let nanos = i64::try_from(signed).map_err(|_| overflow())?;
    Ok(Duration::nanoseconds(nanos))
}

/// Render a duration in the same compact notation [`parse_duration`] reads,
/// e.g. `1.5s`, `150ms`, `2h45m0s`.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.num_nanoseconds().map(i128::from).unwrap_or_else(|| {
        // Only reachable for spans of roughly 292 years or more.
        i128::from(d.num_microseconds().unwrap_or(i64::MAX)) * 1_000
    });
    if nanos == 0 {
        return "0s".to_string();
    }

    let sign = if nanos < 0 { "-" } else { "" };
    let n = nanos.unsigned_abs();

    let body = if n < NANOS_PER_MICRO {
        format!("{n}ns")
    } else if n < NANOS_PER_MILLI {
        format!("{}µs", fixed_point(n, NANOS_PER_MICRO))
    } else if n < NANOS_PER_SEC {
        format!("{}ms", fixed_point(n, NANOS_PER_MILLI))
    } else {
        let hours = n / NANOS_PER_HOUR;
        let minutes = (n / NANOS_PER_MIN) % 60;
        let seconds = fixed_point(n % NANOS_PER_MIN, NANOS_PER_SEC);
        let mut out = String::new();
        if hours > 0 {
            out.push_str(&format!("{hours}h"));
        }
        if hours > 0 || minutes > 0 {
            out.push_str(&format!("{minutes}m"));
        }
        out.push_str(&format!("{seconds}s"));
        out
    };

    format!("{sign}{body}")
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn unit_scale(unit: &str) -> Option<u128> {
    Some(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => NANOS_PER_MICRO,
        "ms" => NANOS_PER_MILLI,
        "s" => NANOS_PER_SEC,
        "m" => NANOS_PER_MIN,
        "h" => NANOS_PER_HOUR,
        _ => return None,
    })
}

/// `value / unit` with the remainder as trimmed decimal digits.
fn fixed_point(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let frac = value % unit;
    if frac == 0 {
        return whole.to_string();
    }
    let width = unit.to_string().len() - 1;
    let digits = format!("{frac:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
