//! Plate notation codec.
//!
//! Barbell loads are written as `{plates}p{extra}`. One plate unit is a 45 lb
//! plate on each side (90 lb), so `2p35` is 2 * 90 + 35 = 215 lb.

use once_cell::sync::Lazy;
use regex::Regex;

/// Pounds represented by one plate unit (45 lb on each side)
pub const PLATE_UNIT_LBS: f64 = 90.0;

static PLATE_NOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)p([0-9]+)$").expect("hardcoded pattern"));

/// Decode plate notation (or a plain number) into total pounds
///
/// `"2p35"` is 215, `"0p45"` is 45, `"185"` is 185 and `"135 lb"` is 135.
/// Anything else falls back to the leading number of the input, or 0 when it
/// does not start with a digit.
pub fn decode(input: &str) -> f64 {
    let input = input.trim();

    if let Some(caps) = PLATE_NOTATION.captures(input) {
        let plates = caps[1].parse::<f64>().unwrap_or(0.0);
        let extra = caps[2].parse::<f64>().unwrap_or(0.0);
        return plates * PLATE_UNIT_LBS + extra;
    }

    match leading_number(input) {
        Some(w) if w.is_finite() && w >= 0.0 => w,
        _ => 0.0,
    }
}

/// Encode a weight in pounds as plate notation
///
/// Weights under one plate unit and fractional weights are written as plain
/// numbers. Zero, negative and non-finite weights encode to the empty string.
pub fn encode(weight: f64) -> String {
    if !weight.is_finite() || weight <= 0.0 {
        return String::new();
    }

    let plates = (weight / PLATE_UNIT_LBS).floor();
    let extra = weight % PLATE_UNIT_LBS;

    if plates > 0.0 && weight.fract() == 0.0 {
        format!("{}p{}", plates, extra)
    } else {
        format!("{}", weight)
    }
}

/// Decode the weight token of a log set line (`135`, `2p35`, `2p`, `135.5`)
///
/// More lenient than [`decode`]: digits after `p` are optional and trailing
/// junk after a number is ignored.
pub fn decode_log_token(token: &str) -> f64 {
    match token.split_once('p') {
        Some((plates, extra)) => {
            let plates = leading_int(plates).unwrap_or(0.0);
            let extra = leading_int(extra).unwrap_or(0.0);
            plates * PLATE_UNIT_LBS + extra
        }
        None => leading_number(token).unwrap_or(0.0),
    }
}

/// Parse the longest numeric prefix (`12`, `12.5`, `12.`) of a string
///
/// Returns `None` when the string does not start with a digit.
pub fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let int_len = s.bytes().take_while(u8::is_ascii_digit).count();
    if int_len == 0 {
        return None;
    }

    let mut end = int_len;
    let rest = &s.as_bytes()[int_len..];
    if rest.first() == Some(&b'.') {
        end += 1 + rest[1..].iter().take_while(|b| b.is_ascii_digit()).count();
    }

    s[..end].trim_end_matches('.').parse().ok()
}

fn leading_int(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    s[..len].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plate_notation() {
        assert_eq!(decode("2p35"), 215.0);
        assert_eq!(decode("0p45"), 45.0);
        assert_eq!(decode("1p0"), 90.0);
    }

    #[test]
    fn test_decode_plain_and_invalid() {
        assert_eq!(decode("185"), 185.0);
        assert_eq!(decode("102.5"), 102.5);
        assert_eq!(decode("abc"), 0.0);
        assert_eq!(decode(""), 0.0);
        assert_eq!(decode("-20"), 0.0);
        assert_eq!(decode("135 lb"), 135.0);
        assert_eq!(decode("2p35x5"), 2.0);
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode(215.0), "2p35");
        assert_eq!(encode(180.0), "2p0");
        assert_eq!(encode(45.0), "45");
        assert_eq!(encode(0.0), "");
        assert_eq!(encode(-10.0), "");
        assert_eq!(encode(f64::NAN), "");
    }

    #[test]
    fn test_fractional_weights_stay_plain() {
        assert_eq!(encode(102.5), "102.5");
        assert_eq!(encode(22.5), "22.5");
        assert_eq!(encode(182.25), "182.25");

        for w in [2.5, 47.5, 102.5, 137.5, 182.25, 317.5] {
            assert_eq!(decode(&encode(w)), w, "round trip failed for {}", w);
        }
    }

    #[test]
    fn test_integer_round_trip() {
        for w in 0..=1000u32 {
            let w = f64::from(w);
            assert_eq!(decode(&encode(w)), w, "round trip failed for {}", w);
        }
    }

    #[test]
    fn test_decode_log_token() {
        assert_eq!(decode_log_token("135"), 135.0);
        assert_eq!(decode_log_token("2p35"), 215.0);
        assert_eq!(decode_log_token("2p"), 180.0);
        assert_eq!(decode_log_token("135.5"), 135.5);
        assert_eq!(decode_log_token("135."), 135.0);
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("4 (grinder)"), Some(4.0));
        assert_eq!(leading_number(" 7.5kg"), Some(7.5));
        assert_eq!(leading_number("failed"), None);
        assert_eq!(leading_number(""), None);
    }
}
