//! Arithmetic operations
//!
//! The math itself is trivial; the enum exists so the HTTP layer rejects
//! unknown operation kinds at deserialization time rather than at dispatch.

pub mod stats;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Supported operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    Exponent,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
            Operation::Modulus => "modulus",
            Operation::Exponent => "exponent",
        }
    }

    /// Parse a stored operation string back into the enum.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "add" => Some(Operation::Add),
            "subtract" => Some(Operation::Subtract),
            "multiply" => Some(Operation::Multiply),
            "divide" => Some(Operation::Divide),
            "modulus" => Some(Operation::Modulus),
            "exponent" => Some(Operation::Exponent),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arithmetic errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalcError {
    #[error("Cannot divide by zero")]
    DivisionByZero,
    #[error("Cannot perform modulus by zero")]
    ModulusByZero,
}

/// Execute an operation on two operands.
pub fn evaluate(a: f64, b: f64, operation: Operation) -> Result<f64, CalcError> {
    match operation {
        Operation::Add => Ok(a + b),
        Operation::Subtract => Ok(a - b),
        Operation::Multiply => Ok(a * b),
        Operation::Divide => {
            if b == 0.0 {
                Err(CalcError::DivisionByZero)
            } else {
                Ok(a / b)
            }
        }
        Operation::Modulus => {
            if b == 0.0 {
                Err(CalcError::ModulusByZero)
            } else {
                Ok(a % b)
            }
        }
        Operation::Exponent => Ok(a.powf(b)),
    }
}
