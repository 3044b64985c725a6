//! Conversions from scalar text to native values.
//!
//! These accept every spelling the core schema allows for an explicitly tagged scalar. The
//! implicit resolution regexes in [`crate::schema`] are stricter: they decide *whether* a plain
//! scalar is an int or float, and these functions then compute the value.

/// `null`, `Null`, `NULL`, `~` or the empty string.
pub(crate) fn is_null(s: &str) -> bool {
    matches!(s, "" | "~" | "null" | "Null" | "NULL")
}

pub(crate) fn parse_bool(s: &str) -> Result<bool, String> {
    match s {
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" => Ok(false),
        _ => Err(format!("invalid bool: `{s}`")),
    }
}

fn parse_digits_u128(digits: &str, radix: u32) -> Option<u128> {
    let mut val: u128 = 0;
    let mut saw = false;
    for c in digits.chars() {
        let d = c.to_digit(radix)?;
        val = val.checked_mul(radix as u128)?;
        val = val.checked_add(d as u128)?;
        saw = true;
    }
    if saw { Some(val) } else { None }
}

/// Parse an integer with optional sign and `0x`/`0o`/`0b` prefix. The value must fit in `i64`.
pub(crate) fn parse_int(s: &str) -> Result<i64, String> {
    let invalid = || format!("invalid int: `{s}`");
    let (neg, rest) = match s.strip_prefix('+') {
        Some(r) => (false, r),
        None => match s.strip_prefix('-') {
            Some(r) => (true, r),
            None => (false, s),
        },
    };

    let (radix, digits) = if let Some(r) = rest.strip_prefix("0x") {
        (16u32, r)
    } else if let Some(r) = rest.strip_prefix("0o") {
        (8u32, r)
    } else if let Some(r) = rest.strip_prefix("0b") {
        (2u32, r)
    } else {
        (10u32, rest)
    };

    let mag = parse_digits_u128(digits, radix).ok_or_else(invalid)?;
    let mag: i128 = mag.try_into().map_err(|_| invalid())?;
    let val = if neg { -mag } else { mag };
    i64::try_from(val).map_err(|_| format!("integer `{s}` does not fit in 64 bits"))
}

/// Parse a float, including the `.inf`, `-.inf` and `.nan` spellings.
pub(crate) fn parse_float(s: &str) -> Result<f64, String> {
    match s {
        ".nan" | ".NaN" | ".NAN" => Ok(f64::NAN),
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => Ok(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Ok(f64::NEG_INFINITY),
        _ => {
            let body = s.strip_prefix(['+', '-']).unwrap_or(s);
            // Rust also accepts "inf", "nan" and "infinity"; YAML does not.
            if body.is_empty() || !body.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
                return Err(format!("invalid float: `{s}`"));
            }
            s.parse::<f64>().map_err(|_| format!("invalid float: `{s}`"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ints_with_prefixes_and_signs() {
        assert_eq!(parse_int("42"), Ok(42));
        assert_eq!(parse_int("+7"), Ok(7));
        assert_eq!(parse_int("-0x1F"), Ok(-31));
        assert_eq!(parse_int("0o17"), Ok(15));
        assert_eq!(parse_int("0b101"), Ok(5));
        assert_eq!(parse_int("-9223372036854775808"), Ok(i64::MIN));
        assert!(parse_int("9223372036854775808").is_err());
        assert!(parse_int("1_000").is_err());
        assert!(parse_int("0x").is_err());
    }

    #[test]
    fn floats_and_specials() {
        assert_eq!(parse_float("1.5"), Ok(1.5));
        assert_eq!(parse_float("-.5e1"), Ok(-5.0));
        assert_eq!(parse_float("-.inf"), Ok(f64::NEG_INFINITY));
        assert!(parse_float(".NaN").unwrap().is_nan());
        assert!(parse_float("inf").is_err());
        assert!(parse_float("abc").is_err());
    }

    #[test]
    fn null_and_bool_spellings() {
        assert!(is_null("~"));
        assert!(is_null(""));
        assert!(!is_null("nil"));
        assert_eq!(parse_bool("TRUE"), Ok(true));
        assert!(parse_bool("yes").is_err());
    }
}
