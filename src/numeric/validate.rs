use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::CalculatorConfig;
use crate::util::CalcError;

/// Significant digits carried by intermediate arithmetic.
/// `rust_decimal` works at a fixed 28 digits, which is `max(28, precision + 6)`
/// for every precision the config accepts.
pub const WORKING_PRECISION: u32 = 28;

/// Raw operand as it arrives from a caller
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Int(i64),
    Float(f64),
    Text(String),
    Decimal(Decimal),
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Int(v)
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::Int(i64::from(v))
    }
}

impl From<u32> for Operand {
    fn from(v: u32) -> Self {
        Operand::Int(i64::from(v))
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Float(v)
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::Text(v.to_string())
    }
}

impl From<String> for Operand {
    fn from(v: String) -> Self {
        Operand::Text(v)
    }
}

impl From<Decimal> for Operand {
    fn from(v: Decimal) -> Self {
        Operand::Decimal(v)
    }
}

/// Parse plain (`-12.5`) or scientific (`1e12`) decimal text
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if text.contains(|c: char| c == 'e' || c == 'E') {
        Decimal::from_scientific(text).ok()
    } else {
        Decimal::from_str(text).ok()
    }
}

pub fn to_decimal(value: &Operand, name: &str) -> Result<Decimal, CalcError> {
    match value {
        Operand::Int(i) => Ok(Decimal::from(*i)),
        Operand::Float(f) => {
            if !f.is_finite() {
                return Err(CalcError::Validation(format!(
                    "Non-finite input for {}: {}",
                    name, f
                )));
            }
            // shortest round-trip text, so 0.1 stays 0.1
            parse_decimal(&f.to_string()).ok_or_else(|| {
                CalcError::Validation(format!("Input out of range for {}: {}", name, f))
            })
        }
        Operand::Text(s) => parse_decimal(s).ok_or_else(|| {
            CalcError::Validation(format!("Non-numeric input for {}: {:?}", name, s))
        }),
        Operand::Decimal(d) => Ok(*d),
    }
}

pub fn check_range(value: Decimal, cfg: &CalculatorConfig, name: &str) -> Result<(), CalcError> {
    if value.abs() > cfg.max_input_value {
        return Err(CalcError::Validation(format!(
            "Input out of range for {}: {} (>|{}|)",
            name, value, cfg.max_input_value
        )));
    }
    Ok(())
}

/// Convert and range-check both operands. Nothing is executed on failure.
pub fn validate_two_numbers(
    a: &Operand,
    b: &Operand,
    cfg: &CalculatorConfig,
) -> Result<(Decimal, Decimal), CalcError> {
    let da = to_decimal(a, "a")?;
    let db = to_decimal(b, "b")?;
    check_range(da, cfg, "a")?;
    check_range(db, cfg, "b")?;
    Ok((da, db))
}

/// Round half away from zero to `precision` fractional digits.
/// This is the only place a result loses precision.
///
/// Fails when the integer part leaves too few of the 28 mantissa digits to
/// carry `precision` fractional digits; `rescale` would otherwise quietly
/// settle for a smaller scale.
pub fn round_output(value: Decimal, precision: u32) -> Result<Decimal, CalcError> {
    let mut rounded = value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(precision);
    if rounded.scale() != precision {
        return Err(CalcError::Operation(
            "result out of range at configured precision".to_string(),
        ));
    }
    Ok(rounded)
}
