use std::str::FromStr;

use rust_decimal::Decimal;

use super::operations::*;
use super::validate::*;

use crate::config::CalculatorConfig;
use crate::util::CalcError;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn run(name: &str, a: &str, b: &str) -> Result<Decimal, CalcError> {
    let cfg = CalculatorConfig::default();
    let op = OperationRegistry::default().get(name)?;
    op(d(a), d(b), &cfg)
}

// === Registry ===

#[test]
fn test_registry_has_builtins() {
    let registry = OperationRegistry::default();
    assert_eq!(
        registry.names(),
        vec![
            "abs_diff", "add", "divide", "int_divide", "modulus", "multiply", "percent", "power",
            "root", "subtract",
        ]
    );
}

#[test]
fn test_registry_unknown() {
    let registry = OperationRegistry::default();
    assert_eq!(
        registry.get("frobnicate").err(),
        Some(CalcError::UnknownOperation("frobnicate".to_string()))
    );
}

#[test]
fn test_registry_register() {
    fn max(a: Decimal, b: Decimal, _cfg: &CalculatorConfig) -> Result<Decimal, CalcError> {
        Ok(a.max(b))
    }

    let mut registry = OperationRegistry::default();
    assert!(registry.get("max").is_err());
    assert!(registry.register("max", max).is_none());
    assert!(registry.register("max", max).is_some());

    let op = registry.get("max").unwrap();
    assert_eq!(op(d("3"), d("7"), &CalculatorConfig::default()).unwrap(), d("7"));
}

// === Arithmetic ===

#[test]
fn test_add_subtract_multiply() {
    assert_eq!(run("add", "2", "3").unwrap(), d("5"));
    assert_eq!(run("add", "-2", "3").unwrap(), d("1"));
    assert_eq!(run("subtract", "2", "3").unwrap(), d("-1"));
    assert_eq!(run("subtract", "3", "-2").unwrap(), d("5"));
    assert_eq!(run("multiply", "2", "3").unwrap(), d("6"));
    assert_eq!(run("multiply", "-2", "3").unwrap(), d("-6"));
}

#[test]
fn test_decimal_exactness() {
    // no binary float drift
    assert_eq!(run("add", "0.1", "0.2").unwrap(), d("0.3"));
}

#[test]
fn test_divide() {
    assert_eq!(run("divide", "6", "3").unwrap(), d("2"));
    assert_eq!(run("divide", "-6", "3").unwrap(), d("-2"));
    assert!(matches!(run("divide", "1", "0"), Err(CalcError::Operation(_))));
}

#[test]
fn test_power() {
    assert_eq!(run("power", "2", "3").unwrap(), d("8"));
    assert_eq!(run("power", "-2", "3").unwrap(), d("-8"));
    assert_eq!(run("power", "2", "-2").unwrap(), d("0.25"));
    assert_eq!(run("power", "9", "0.5").unwrap().round_dp(3), d("3"));
}

#[test]
fn test_power_failures() {
    assert!(matches!(run("power", "-8", "0.5"), Err(CalcError::Operation(_))));
    assert!(matches!(run("power", "0", "-1"), Err(CalcError::Operation(_))));
    assert!(matches!(run("power", "1000000", "1000"), Err(CalcError::Operation(_))));
}

#[test]
fn test_root() {
    assert_eq!(run("root", "9", "2").unwrap().round_dp(10), d("3"));
    assert_eq!(run("root", "-8", "3").unwrap().round_dp(10), d("-2"));
    assert_eq!(run("root", "27", "3").unwrap().round_dp(10), d("3"));
    assert_eq!(run("root", "2", "2").unwrap().round_dp(10), d("1.4142135624"));
    assert_eq!(run("root", "8", "-3").unwrap().round_dp(10), d("0.5"));
    assert_eq!(run("root", "0", "5").unwrap(), d("0"));
    assert_eq!(
        run("root", "0.0000000000000000000000000001", "-3").unwrap().round_dp(8),
        d("2154434690.03188372")
    );
    assert_eq!(run("root", "-0.001", "-3").unwrap().round_dp(10), d("-10"));
}

#[test]
fn test_root_failures() {
    assert!(matches!(run("root", "9", "0"), Err(CalcError::Operation(_))));
    assert!(matches!(run("root", "-9", "2"), Err(CalcError::Operation(_))));
    assert!(matches!(run("root", "9", "2.5"), Err(CalcError::Validation(_))));
    assert!(matches!(run("root", "0", "-2"), Err(CalcError::Operation(_))));
}

#[test]
fn test_modulus() {
    assert_eq!(run("modulus", "7", "3").unwrap(), d("1"));
    assert_eq!(run("modulus", "-7", "3").unwrap(), d("-1"));
    assert!(matches!(run("modulus", "7", "0"), Err(CalcError::Operation(_))));
}

#[test]
fn test_int_divide_truncates() {
    assert_eq!(run("int_divide", "7", "3").unwrap(), d("2"));
    assert_eq!(run("int_divide", "-7", "3").unwrap(), d("-2"));
    assert!(matches!(run("int_divide", "7", "0"), Err(CalcError::Operation(_))));
}

#[test]
fn test_percent() {
    assert_eq!(run("percent", "25", "100").unwrap(), d("25"));
    assert_eq!(run("percent", "1", "2").unwrap(), d("50"));
    assert!(matches!(run("percent", "1", "0"), Err(CalcError::Operation(_))));
}

#[test]
fn test_abs_diff() {
    assert_eq!(run("abs_diff", "5", "3").unwrap(), d("2"));
    assert_eq!(run("abs_diff", "3", "5").unwrap(), d("2"));
}

// === Validation ===

#[test]
fn test_operand_conversions() {
    assert_eq!(to_decimal(&Operand::from(7), "a").unwrap(), d("7"));
    assert_eq!(to_decimal(&Operand::from(0.1), "a").unwrap(), d("0.1"));
    assert_eq!(to_decimal(&Operand::from(" 2.50 "), "a").unwrap().to_string(), "2.50");
    assert_eq!(to_decimal(&Operand::from("1e3"), "a").unwrap(), d("1000"));
    assert_eq!(to_decimal(&Operand::from(d("4.2")), "a").unwrap(), d("4.2"));
}

#[test]
fn test_operand_rejects_garbage() {
    assert!(matches!(to_decimal(&Operand::from("abc"), "a"), Err(CalcError::Validation(_))));
    assert!(matches!(to_decimal(&Operand::from(""), "a"), Err(CalcError::Validation(_))));
    assert!(matches!(to_decimal(&Operand::from("NaN"), "a"), Err(CalcError::Validation(_))));
    assert!(matches!(to_decimal(&Operand::from(f64::NAN), "a"), Err(CalcError::Validation(_))));
    assert!(matches!(
        to_decimal(&Operand::from(f64::INFINITY), "b"),
        Err(CalcError::Validation(_))
    ));
}

#[test]
fn test_range_check() {
    let cfg = CalculatorConfig {
        max_input_value: d("100"),
        ..CalculatorConfig::default()
    };
    assert!(validate_two_numbers(&Operand::from("100"), &Operand::from("-100"), &cfg).is_ok());

    let err = validate_two_numbers(&Operand::from("1"), &Operand::from("-100.5"), &cfg).unwrap_err();
    assert!(matches!(err, CalcError::Validation(ref msg) if msg.contains("for b")));
}

#[test]
fn test_round_output_fixed_scale() {
    assert_eq!(round_output(d("5"), 8).unwrap().to_string(), "5.00000000");
    assert_eq!(round_output(d("0.125"), 2).unwrap().to_string(), "0.13");
    assert_eq!(round_output(d("-0.125"), 2).unwrap().to_string(), "-0.13");
    assert_eq!(round_output(d("2.5"), 0).unwrap().to_string(), "3");
    assert_eq!(round_output(d("1.23456"), 3).unwrap().to_string(), "1.235");
}

#[test]
fn test_round_output_mantissa_limit() {
    // 20 integer digits + 8 fractional fills the 28-digit mantissa
    assert_eq!(
        round_output(d("12345678901234567890"), 8).unwrap().to_string(),
        "12345678901234567890.00000000"
    );
    // 25 integer digits + 8 does not fit
    assert_eq!(
        round_output(d("1000000000000000000000000"), 8),
        Err(CalcError::Operation(
            "result out of range at configured precision".to_string()
        ))
    );
    assert!(round_output(d("-1000000000000000000000000"), 8).is_err());
    assert_eq!(
        round_output(d("1000000000000000000000000"), 0).unwrap().to_string(),
        "1000000000000000000000000"
    );
}
