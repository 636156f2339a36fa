//! Read-only structural tree: [`structure::Structure`] owns [`model::Model`]s, which own
//! [`chain::Chain`]s of [`residue::Residue`]s and their [`atom::Atom`]s.
//!
//! Trees are produced by [`builder::StructureBuilder`], typically driven by a
//! [`crate::core::io::traits::StructureParser`]. Chains refer to their model by id only.
//! Per-chain memo tables (neighbor sets, accessibility) are filled on first use and never
//! invalidated.

pub mod annotation;
pub mod atom;
pub mod builder;
pub mod chain;
pub mod model;
pub mod residue;
pub mod structure;
