//! Declarative configuration schemas.
//!
//! A [`Schema`] describes the acceptable shape of a nested configuration
//! block: for every field its type, presence rule, default, cardinality
//! bound and optional constraint check. Schemas are built once from plain
//! constructor functions, composed out of reusable fragments, and then used
//! by [`resolve`] to validate and normalize raw configuration values before
//! they are handed to whatever applies them.
//!
//! The engine is deliberately free of any domain knowledge; concrete field
//! inventories (such as a Kubernetes pod specification) live in dedicated
//! declaration crates on top of it.
//!
//! Schemas are immutable after construction, and [`resolve`] keeps no state
//! between calls, so resolving independent documents concurrently against
//! the same schema is safe by construction.

pub mod resolve;
pub mod schema;
pub mod validation;

pub use resolve::{Error, FieldPath, Resolved, resolve};
pub use schema::{ExclusiveGroup, Field, FieldKind, Presence, Schema, Validator};
