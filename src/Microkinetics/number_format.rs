//! Numeric cells and their text form in the deck.
//!
//! Existing decks carry spreadsheet values in their plain text form: integer cells print as
//! `1`, float cells as `1.0`, very small or very large floats as `1e-12` / `1e+16`, and rate
//! constants as `6.21e+12`.
//! `Numeric` keeps the integer/float nature of a cell so the rendering stays byte-compatible.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Integer or floating point value of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    pub fn as_f64(&self) -> f64 {
        match self {
            Numeric::Int(i) => *i as f64,
            Numeric::Float(x) => *x,
        }
    }

    /// Reads a JSON cell. Numeric strings are accepted, anything else is not a number.
    pub fn from_value(value: &Value) -> Option<Numeric> {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Numeric::Int(i)),
                None => n.as_f64().map(Numeric::Float),
            },
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<f64> for Numeric {
    fn from(x: f64) -> Self {
        Numeric::Float(x)
    }
}

impl From<i64> for Numeric {
    fn from(i: i64) -> Self {
        Numeric::Int(i)
    }
}

impl FromStr for Numeric {
    type Err = std::num::ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<i64>() {
            Ok(i) => Ok(Numeric::Int(i)),
            Err(_) => s.parse::<f64>().map(Numeric::Float),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() keeps width/alignment flags working for `{:<10}`
        match self {
            Numeric::Int(i) => f.pad(&i.to_string()),
            Numeric::Float(x) => f.pad(&float_repr(*x)),
        }
    }
}

/// Splits the shortest round-trip representation of `|x|` into its significant digits and
/// the decimal exponent of the first digit.
fn shortest_digits(x: f64) -> (String, i32) {
    let sci = format!("{:e}", x.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    (digits, exponent.parse().unwrap_or(0))
}

fn exponent_suffix(exp: i32) -> String {
    let sign = if exp < 0 { '-' } else { '+' };
    format!("e{}{:02}", sign, exp.abs())
}

/// Shortest round-trip text of a float: positional with at least one fractional digit when
/// the decimal exponent lies in `-4..16`, otherwise scientific with a signed two-digit exponent.
pub fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }
    let sign = if x < 0.0 { "-" } else { "" };
    let (digits, exp) = shortest_digits(x);
    let body = if (-4..16).contains(&exp) {
        if exp >= 0 {
            let int_len = exp as usize + 1;
            if digits.len() <= int_len {
                format!("{}{}.0", digits, "0".repeat(int_len - digits.len()))
            } else {
                format!("{}.{}", &digits[..int_len], &digits[int_len..])
            }
        } else {
            format!("0.{}{}", "0".repeat((-exp - 1) as usize), digits)
        }
    } else {
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}{}", first, exponent_suffix(exp))
        } else {
            format!("{}.{}{}", first, rest, exponent_suffix(exp))
        }
    };
    format!("{}{}", sign, body)
}

/// Scientific notation with a fixed number of mantissa decimals, e.g. `6.21e+12`.
pub fn float_sci(x: f64, precision: usize) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let sci = format!("{:.*e}", precision, x);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exponent.parse().unwrap_or(0);
    format!("{}{}", mantissa, exponent_suffix(exp))
}
