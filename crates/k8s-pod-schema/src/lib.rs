//! Configuration schema declarations for the Kubernetes Pod specification.
//!
//! This crate is pure description: a set of constructor functions, each
//! returning a freshly allocated [`Schema`](config_schema::Schema) for one
//! block of the pod specification. The surrounding workflow tool composes
//! them into its resource schemas and runs
//! [`resolve`](config_schema::resolve) on user input before handing the
//! normalized result to the API client that applies it.

pub mod pod_spec;
pub mod volume;

pub use pod_spec::{
    container_fields, local_object_reference_fields, pod_spec_fields, se_linux_options_fields,
    security_context_fields,
};
pub use volume::{common_volume_sources, volume_schema};
