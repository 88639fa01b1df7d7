use std::collections::HashMap;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};

use crate::config::CalculatorConfig;
use crate::util::CalcError;

/// A pure binary operation over decimals
pub type OperationFn = fn(Decimal, Decimal, &CalculatorConfig) -> Result<Decimal, CalcError>;

const NEWTON_STEPS: usize = 16;

fn out_of_range(name: &str) -> CalcError {
    CalcError::Operation(format!("{} result out of range", name))
}

pub fn add(a: Decimal, b: Decimal, _cfg: &CalculatorConfig) -> Result<Decimal, CalcError> {
    a.checked_add(b).ok_or_else(|| out_of_range("add"))
}

pub fn subtract(a: Decimal, b: Decimal, _cfg: &CalculatorConfig) -> Result<Decimal, CalcError> {
    a.checked_sub(b).ok_or_else(|| out_of_range("subtract"))
}

pub fn multiply(a: Decimal, b: Decimal, _cfg: &CalculatorConfig) -> Result<Decimal, CalcError> {
    a.checked_mul(b).ok_or_else(|| out_of_range("multiply"))
}

pub fn divide(a: Decimal, b: Decimal, _cfg: &CalculatorConfig) -> Result<Decimal, CalcError> {
    if b.is_zero() {
        return Err(CalcError::Operation("Division by zero".to_string()));
    }
    a.checked_div(b).ok_or_else(|| out_of_range("divide"))
}

pub fn power(a: Decimal, b: Decimal, _cfg: &CalculatorConfig) -> Result<Decimal, CalcError> {
    let failed = |why: &str| CalcError::Operation(format!("Power failed: {}", why));

    if b.fract().is_zero() {
        let exp = b
            .to_i64()
            .ok_or_else(|| failed("exponent too large"))?;
        if a.is_zero() && exp < 0 {
            return Err(failed("zero cannot be raised to a negative power"));
        }
        let magnitude = a
            .checked_powu(exp.unsigned_abs())
            .ok_or_else(|| out_of_range("power"))?;
        if exp < 0 {
            return Decimal::ONE
                .checked_div(magnitude)
                .ok_or_else(|| out_of_range("power"));
        }
        return Ok(magnitude);
    }

    if a.is_zero() {
        if b.is_sign_positive() {
            return Ok(Decimal::ZERO);
        }
        return Err(failed("zero cannot be raised to a negative power"));
    }
    if a.is_sign_negative() {
        return Err(failed("fractional power of a negative base"));
    }
    a.checked_powd(b).ok_or_else(|| out_of_range("power"))
}

/// Positive `degree`-th root of a non-negative value.
/// Starts from a float estimate and polishes it with Newton steps.
fn nth_root(x: Decimal, degree: u32) -> Option<Decimal> {
    if x.is_zero() || degree == 1 {
        return Some(x);
    }
    let n = Decimal::from(degree);
    let estimate = x.to_f64()?.powf(1.0 / f64::from(degree));
    let mut guess = Decimal::from_f64(estimate)?;

    for _ in 0..NEWTON_STEPS {
        let step = guess
            .checked_powu(u64::from(degree - 1))
            .filter(|p| !p.is_zero())
            .and_then(|p| x.checked_div(p))
            .and_then(|q| (n - Decimal::ONE).checked_mul(guess)?.checked_add(q))
            .and_then(|s| s.checked_div(n));
        match step {
            Some(next) if next != guess => guess = next,
            _ => break,
        }
    }
    Some(guess)
}

pub fn root(a: Decimal, b: Decimal, _cfg: &CalculatorConfig) -> Result<Decimal, CalcError> {
    if b.is_zero() {
        return Err(CalcError::Operation("Root with zero degree is undefined".to_string()));
    }
    if !b.fract().is_zero() {
        return Err(CalcError::Validation("Root degree must be an integer".to_string()));
    }
    let n = b
        .trunc()
        .to_i64()
        .ok_or_else(|| CalcError::Operation("Root degree out of range".to_string()))?;

    let negative = a.is_sign_negative() && !a.is_zero();
    if negative && n % 2 == 0 {
        return Err(CalcError::Operation(
            "Even root of a negative number is invalid".to_string(),
        ));
    }

    let degree = u32::try_from(n.unsigned_abs())
        .map_err(|_| CalcError::Operation("Root degree out of range".to_string()))?;
    let radicand = if n < 0 {
        if a.is_zero() {
            return Err(CalcError::Operation(
                "Root of zero with a negative degree is undefined".to_string(),
            ));
        }
        // root of 1/|a|, not 1/root(|a|)
        Decimal::ONE
            .checked_div(a.abs())
            .ok_or_else(|| out_of_range("root"))?
    } else {
        a.abs()
    };
    let magnitude = nth_root(radicand, degree).ok_or_else(|| out_of_range("root"))?;

    Ok(if negative { -magnitude } else { magnitude })
}

pub fn modulus(a: Decimal, b: Decimal, _cfg: &CalculatorConfig) -> Result<Decimal, CalcError> {
    if b.is_zero() {
        return Err(CalcError::Operation("Modulus by zero".to_string()));
    }
    // remainder keeps the sign of the dividend
    a.checked_rem(b).ok_or_else(|| out_of_range("modulus"))
}

pub fn int_divide(a: Decimal, b: Decimal, _cfg: &CalculatorConfig) -> Result<Decimal, CalcError> {
    if b.is_zero() {
        return Err(CalcError::Operation("Integer division by zero".to_string()));
    }
    a.checked_div(b)
        .map(|q| q.trunc())
        .ok_or_else(|| out_of_range("int_divide"))
}

pub fn percent(a: Decimal, b: Decimal, _cfg: &CalculatorConfig) -> Result<Decimal, CalcError> {
    if b.is_zero() {
        return Err(CalcError::Operation(
            "Percentage with zero denominator".to_string(),
        ));
    }
    a.checked_div(b)
        .and_then(|q| q.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| out_of_range("percent"))
}

pub fn abs_diff(a: Decimal, b: Decimal, _cfg: &CalculatorConfig) -> Result<Decimal, CalcError> {
    a.checked_sub(b)
        .map(|d| d.abs())
        .ok_or_else(|| out_of_range("abs_diff"))
}

/// Name to operation lookup, the calculator's extension point
pub struct OperationRegistry {
    operations: HashMap<String, OperationFn>,
}

impl OperationRegistry {
    /// Add or replace an operation, returning the one it displaced
    #[allow(dead_code)]
    pub fn register(&mut self, name: &str, op: OperationFn) -> Option<OperationFn> {
        self.operations.insert(name.to_string(), op)
    }

    pub fn get(&self, name: &str) -> Result<OperationFn, CalcError> {
        self.operations
            .get(name)
            .copied()
            .ok_or_else(|| CalcError::UnknownOperation(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self {
            operations: HashMap::from([
                ("add".to_string(), add as OperationFn),
                ("subtract".to_string(), subtract as OperationFn),
                ("multiply".to_string(), multiply as OperationFn),
                ("divide".to_string(), divide as OperationFn),
                ("power".to_string(), power as OperationFn),
                ("root".to_string(), root as OperationFn),
                ("modulus".to_string(), modulus as OperationFn),
                ("int_divide".to_string(), int_divide as OperationFn),
                ("percent".to_string(), percent as OperationFn),
                ("abs_diff".to_string(), abs_diff as OperationFn),
            ]),
        }
    }
}
