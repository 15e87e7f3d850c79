//! Duration strings such as `10ms`, `42s` or `1h30m`

use std::time::Duration;

use super::{DecodeHook, Hooked};
use crate::decode::{Decoder, Target};
use crate::error::DecodeError;
use crate::value::Value;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Converts string nodes into [`Duration`] targets
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationHook;

impl DecodeHook for DurationHook {
    fn apply(
        &self,
        target: &Target,
        value: Value,
        de: &Decoder<'_>,
    ) -> Result<Hooked, DecodeError> {
        if !target.is::<Duration>() {
            return Ok(Hooked::Value(value));
        }
        let Value::String(input) = value else {
            return Ok(Hooked::Value(value));
        };
        match parse_duration(&input) {
            Ok(duration) => Ok(Hooked::Built(Box::new(duration))),
            Err(err) => Err(DecodeError::Parse {
                path: de.path().clone(),
                input,
                target: target.name(),
                source: err.into(),
            }),
        }
    }
}

/// Invalid duration string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,

    #[error("negative durations are not supported")]
    Negative,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("missing unit after '{0}'")]
    MissingUnit(String),

    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("duration overflows")]
    Overflow,
}

/// Parse a sequence of decimal numbers with unit suffixes
///
/// Units: `ns`, `us` (`µs`), `ms`, `s`, `m`, `h`. Fractions are allowed
/// (`1.5h`), as is a bare `0`.
///
/// # Errors
/// Returns error for empty, negative, unit-less or overflowing input
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let trimmed = input.trim();
    let mut rest = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if rest.starts_with('-') {
        return Err(DurationError::Negative);
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(DurationError::Empty);
    }

    let mut nanos: u128 = 0;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_end];
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        rest = &rest[unit_end..];

        if unit.is_empty() {
            return Err(DurationError::MissingUnit(number.to_string()));
        }
        let scale = unit_scale(unit)?;
        nanos = nanos
            .checked_add(scaled(number, scale)?)
            .ok_or(DurationError::Overflow)?;
    }

    let secs = u64::try_from(nanos / NANOS_PER_SEC).map_err(|_| DurationError::Overflow)?;
    // remainder is below one second
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    Ok(Duration::new(secs, subsec))
}

fn unit_scale(unit: &str) -> Result<u128, DurationError> {
    Ok(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        "h" => 3_600 * NANOS_PER_SEC,
        other => return Err(DurationError::UnknownUnit(other.to_string())),
    })
}

/// `number` (decimal, optional fraction) times `scale` nanoseconds
fn scaled(number: &str, scale: u128) -> Result<u128, DurationError> {
    let invalid = || DurationError::InvalidNumber(number.to_string());
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if fraction.contains('.') {
        return Err(invalid());
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let mut total = whole.checked_mul(scale).ok_or(DurationError::Overflow)?;

    // digits past nanosecond precision of the largest unit cannot matter
    let fraction = &fraction[..fraction.len().min(18)];
    if !fraction.is_empty() {
        let digits: u128 = fraction.parse().map_err(|_| invalid())?;
        let divisor = 10u128.pow(fraction.len() as u32);
        total = total
            .checked_add(digits * scale / divisor)
            .ok_or(DurationError::Overflow)?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::DecoderConfig;
    use proptest::prelude::*;

    #[test]
    fn simple_units() {
        assert_eq!(parse_duration("42s"), Ok(Duration::from_secs(42)));
        assert_eq!(parse_duration("10ms"), Ok(Duration::from_millis(10)));
        assert_eq!(parse_duration("100us"), Ok(Duration::from_micros(100)));
        assert_eq!(parse_duration("7µs"), Ok(Duration::from_micros(7)));
        assert_eq!(parse_duration("3ns"), Ok(Duration::from_nanos(3)));
        assert_eq!(parse_duration("2h"), Ok(Duration::from_secs(7_200)));
    }

    #[test]
    fn compound_and_fractional() {
        assert_eq!(parse_duration("1h30m"), Ok(Duration::from_secs(5_400)));
        assert_eq!(parse_duration("1.5s"), Ok(Duration::from_millis(1_500)));
        assert_eq!(parse_duration(".5m"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("+1m1s"), Ok(Duration::from_secs(61)));
        assert_eq!(parse_duration("0"), Ok(Duration::ZERO));
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(parse_duration(""), Err(DurationError::Empty));
        assert_eq!(parse_duration("-1s"), Err(DurationError::Negative));
        assert_eq!(
            parse_duration("42"),
            Err(DurationError::MissingUnit("42".to_string()))
        );
        assert_eq!(
            parse_duration("5d"),
            Err(DurationError::UnknownUnit("d".to_string()))
        );
        assert_eq!(
            parse_duration("1..2s"),
            Err(DurationError::InvalidNumber("1..2".to_string()))
        );
        assert_eq!(
            parse_duration("s"),
            Err(DurationError::InvalidNumber(String::new()))
        );
    }

    #[test]
    fn hook_ignores_other_targets() {
        let registry = Registry::new();
        let config = DecoderConfig::new();
        let de = Decoder::new(&registry, &config);
        let out = DurationHook
            .apply(&Target::of::<String>(), Value::from("42s"), &de)
            .unwrap();
        assert!(matches!(out, Hooked::Value(Value::String(_))));
    }

    #[test]
    fn hook_reports_path_on_failure() {
        let registry = Registry::new();
        let config = DecoderConfig::new();
        let de = Decoder::new(&registry, &config).at("freq");
        let err = DurationHook
            .apply(&Target::of::<Duration>(), Value::from("soon"), &de)
            .unwrap_err();
        assert_eq!(err.path().to_string(), "freq");
        assert!(matches!(err, DecodeError::Parse { .. }));
    }

    proptest! {
        #[test]
        fn prop_millis_round_trip(ms in 0u64..10_000_000) {
            prop_assert_eq!(parse_duration(&format!("{ms}ms")), Ok(Duration::from_millis(ms)));
        }

        #[test]
        fn prop_units_add_up(h in 0u64..100, m in 0u64..60, s in 0u64..60) {
            let parsed = parse_duration(&format!("{h}h{m}m{s}s")).unwrap();
            prop_assert_eq!(parsed, Duration::from_secs(h * 3_600 + m * 60 + s));
        }
    }
}
