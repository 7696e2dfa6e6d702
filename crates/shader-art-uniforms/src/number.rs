//! Lenient numeric parsing for attribute values.
//!
//! Attribute values are hand-written, so these accept the longest numeric
//! prefix after leading whitespace (`"123."` → 123, `"1.5px"` → 1.5,
//! `"16.9"` as an integer → 16) and return `None` only when no number starts
//! the string. Non-finite results are rejected.

/// Parses a floating-point prefix.
pub fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let b = s.as_bytes();
    let mut end = sign_len(b);
    let int_digits = digits_len(&b[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if b.get(end) == Some(&b'.') {
        frac_digits = digits_len(&b[end + 1..]);
        end += 1 + frac_digits;
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }
    if matches!(b.get(end), Some(b'e' | b'E')) {
        let exp_start = end + 1;
        let exp_sign = sign_len(&b[exp_start..]);
        let exp_digits = digits_len(&b[exp_start + exp_sign..]);
        if exp_digits > 0 {
            end = exp_start + exp_sign + exp_digits;
        }
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a base-10 integer prefix.
pub fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let b = s.as_bytes();
    let sign = sign_len(b);
    let digits = digits_len(&b[sign..]);
    if digits == 0 {
        return None;
    }
    s[..sign + digits].parse::<i64>().ok()
}

fn sign_len(b: &[u8]) -> usize {
    usize::from(matches!(b.first(), Some(b'+' | b'-')))
}

fn digits_len(b: &[u8]) -> usize {
    b.iter().take_while(|c| c.is_ascii_digit()).count()
}
