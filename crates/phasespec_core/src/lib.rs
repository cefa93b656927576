//! Provide the canonical phase vocabulary and naming helpers shared by the `phasespec` runner and its macros.
//!
//! This crate is intentionally small and dependency-free so that both the runtime crate and the
//! `phasespec_derive` proc-macro crate can agree on the same spellings.
//!
//! ## Notes
//!
//! - This is a “vocabulary core” crate: **no IO**, no global state, no runner types.
//! - Current scope: the phase taxonomy registry ([`phases`]), shared registry metadata ([`registry`]) and
//!   description helpers ([`naming`]).

pub mod naming;
pub mod phases;
pub mod registry;

pub use naming::{describe_identifier, describe_type_name};
pub use phases::{Cardinality, PhaseKind};
