use std::{env, path::PathBuf};

/// Parses a duration string into a number of milliseconds.
///
/// The string is a sequence of `<digits><unit>` pairs where the unit is one
/// of `s`, `m`, `h` or `d`, e.g. `30s`, `1m30s` or `1d12h`.
///
/// Returns `None` if the input is malformed or overflows.
///
/// # Examples
///
/// ```
/// use dash_config::utils::parse_duration;
///
/// assert_eq!(parse_duration("1m30s"), Some(90_000));
/// assert_eq!(parse_duration("soon"), None);
/// ```
pub fn parse_duration(input: &str) -> Option<u128> {
    let mut total: u128 = 0;
    let mut chars = input.chars().peekable();

    while chars.peek().is_some() {
        let mut digits = String::new();
        while let Some(c) = chars.peek() {
            if c.is_ascii_digit() {
                digits.push(chars.next()?);
            } else {
                break;
            }
        }

        if digits.is_empty() {
            return None;
        }

        let number: u128 = digits.parse().ok()?;
        let unit = match chars.next()? {
            's' => 1000,
            'm' => 60 * 1000,
            'h' => 60 * 60 * 1000,
            'd' => 24 * 60 * 60 * 1000,
            _ => return None,
        };

        total = total.checked_add(number.checked_mul(unit)?)?;
    }

    Some(total)
}

pub fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// `$XDG_CONFIG_HOME`, falling back to `~/.config`.
pub fn xdg_config_home() -> PathBuf {
    env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"))
}
