use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::ByteSize;

/// Conversion from a raw configuration string (typically an environment variable) into a typed value.
///
/// Unparsable user input never aborts; the default is kept and a warning is logged so a typo in the
/// environment doesn't take the whole download down.
pub trait ParsableConfigValue: std::fmt::Debug + Sized {
    fn parse_user_value(value: &str) -> Option<Self>;

    /// Resolve the final value for `variable_name` given the raw value found (if any) and the default.
    fn parse(variable_name: &str, value: Option<String>, default: Self) -> Self {
        let Some(raw) = value else {
            debug!("Config: {variable_name} = {default:?} (default)");
            return default;
        };

        match Self::parse_user_value(&raw) {
            Some(v) => {
                info!("Config: {variable_name} = {v:?} (user set)");
                v
            },
            None => {
                warn!("Config value {raw:?} for {variable_name} could not be parsed; using default {default:?}.");
                default
            },
        }
    }
}

/// Marker for types whose `FromStr` implementation is the right user-facing parser.
pub trait FromStrParseable: FromStr + std::fmt::Debug {}

impl<T: FromStrParseable> ParsableConfigValue for T {
    fn parse_user_value(value: &str) -> Option<Self> {
        value.trim().parse::<T>().ok()
    }
}

impl FromStrParseable for usize {}
impl FromStrParseable for u32 {}
impl FromStrParseable for u64 {}
impl FromStrParseable for i64 {}
impl FromStrParseable for f64 {}
impl FromStrParseable for String {}
impl FromStrParseable for ByteSize {}

/// Accepts the usual spellings: 1/true/yes/y/on and 0/false/no/n/off.
pub fn parse_bool_value(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

impl ParsableConfigValue for bool {
    fn parse_user_value(value: &str) -> Option<Self> {
        parse_bool_value(value)
    }
}

/// `None` stays the default until a value is given; an empty string is treated as "set to empty"
/// for string options so callers can distinguish "unset" from "explicitly blank".
impl<T: ParsableConfigValue> ParsableConfigValue for Option<T> {
    fn parse_user_value(value: &str) -> Option<Self> {
        T::parse_user_value(value).map(Some)
    }
}

/// Durations accept suffixed values such as `30s`, `2m` or `500ms`; see `duration_str`.
impl ParsableConfigValue for Duration {
    fn parse_user_value(value: &str) -> Option<Self> {
        duration_str::parse(value.trim()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_spellings() {
        for v in ["1", "true", "YES", " on "] {
            assert_eq!(bool::parse_user_value(v), Some(true), "{v}");
        }
        for v in ["0", "False", "no", "off"] {
            assert_eq!(bool::parse_user_value(v), Some(false), "{v}");
        }
        assert_eq!(bool::parse_user_value("maybe"), None);
    }

    #[test]
    fn test_parse_falls_back_to_default() {
        assert_eq!(u64::parse("X", Some("not a number".to_owned()), 7), 7);
        assert_eq!(u64::parse("X", None, 7), 7);
        assert_eq!(u64::parse("X", Some(" 42 ".to_owned()), 7), 42);
    }

    #[test]
    fn test_option_and_duration() {
        assert_eq!(Option::<String>::parse("X", Some("abc".to_owned()), None), Some("abc".to_owned()));
        assert_eq!(Option::<u64>::parse("X", None, None), None);
        assert_eq!(Duration::parse("X", Some("30s".to_owned()), Duration::ZERO), Duration::from_secs(30));
    }

    #[test]
    fn test_byte_size_value() {
        let v = ByteSize::parse("X", Some("64kb".to_owned()), ByteSize::new(1));
        assert_eq!(v.as_u64(), 64 * 1024);
    }
}
