use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::util::now_iso;

/// One executed operation. Created when the operation succeeds and never
/// changed afterwards.
///
/// Field order matches the persisted column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calculation {
    pub timestamp: String,
    pub operation: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub a: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub b: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub result: Decimal,
}

impl Calculation {
    /// Record stamped with the current UTC second
    pub fn new(operation: &str, a: Decimal, b: Decimal, result: Decimal) -> Self {
        Self::at(now_iso(), operation, a, b, result)
    }

    pub fn at(timestamp: String, operation: &str, a: Decimal, b: Decimal, result: Decimal) -> Self {
        Self {
            timestamp,
            operation: operation.to_string(),
            a,
            b,
            result,
        }
    }

    /// `add(2,3) -> 5.00 @ 2024-01-01T00:00:00Z`
    pub fn summary(&self) -> String {
        format!(
            "{}({},{}) -> {} @ {}",
            self.operation, self.a, self.b, self.result, self.timestamp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_calculation() {
        let calc = Calculation::new("add", Decimal::from(1), Decimal::from(2), Decimal::from(3));
        assert_eq!(calc.operation, "add");
        assert_eq!(calc.a, Decimal::from(1));
        assert_eq!(calc.result, Decimal::from(3));
        assert!(calc.timestamp.ends_with('Z'));
    }

    #[test]
    fn test_summary() {
        let calc = Calculation::at(
            "2024-05-01T10:00:00Z".to_string(),
            "divide",
            Decimal::from(6),
            Decimal::from(3),
            Decimal::new(200, 2),
        );
        assert_eq!(calc.summary(), "divide(6,3) -> 2.00 @ 2024-05-01T10:00:00Z");
    }
}
