//! # Workflows Module
//!
//! Top-level entry points of StructMap.
//!
//! - **Mapping** ([`map`]) - Aggregates per-reference data over the 3D neighborhood of
//!   every residue of a chain, or of every chain of a structure.
//! - **Tajima's D** ([`tajima`]) - Evaluates the statistic over a whole alignment, over
//!   sliding windows, or over the protein-coding columns only.
//!
//! Each workflow validates its inputs, reports progress through a
//! [`crate::engine::progress::ProgressReporter`], and returns engine errors unchanged.

pub mod map;
pub mod tajima;
