//! Value-level constraint checks shared across schema declarations.
//!
//! All checks match the [`Validator`](crate::schema::Validator) signature so
//! they can be attached directly to a field with
//! [`Field::with_validator`](crate::schema::Field::with_validator). They run
//! on type-correct values only; a value of an unexpected shape passes
//! unchecked rather than panicking.

use serde_json::Value;
use snafu::ensure;

use crate::resolve::{ConstraintViolationSnafu, FieldPath, Result};

/// Rejects integers below zero, e.g. a pod's termination grace period.
pub fn non_negative(value: &Value, path: &FieldPath) -> Result<()> {
    if let Some(n) = value.as_i64() {
        ensure!(
            n >= 0,
            ConstraintViolationSnafu {
                path: path.clone(),
                reason: format!("must be a non-negative integer, got {n}"),
            }
        );
    }
    Ok(())
}

/// Rejects integers at or below zero, e.g. a pod's active deadline.
pub fn positive(value: &Value, path: &FieldPath) -> Result<()> {
    if let Some(n) = value.as_i64() {
        ensure!(
            n > 0,
            ConstraintViolationSnafu {
                path: path.clone(),
                reason: format!("must be a positive integer, got {n}"),
            }
        );
    }
    Ok(())
}
