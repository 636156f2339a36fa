//! # StructMap
//!
//! Maps per-residue data onto protein 3D structures by aggregating it over spatial
//! neighborhoods, and computes Tajima's D over sliding windows of nucleotide alignments.
//!
//! ## Architecture
//!
//! The library follows a three-layer layout.
//!
//! - **[`core`]: The Foundation.** Read-only structural models (`Structure`, `Chain`),
//!   alignment data, the genetic code, and the traits through which parsers, aligners and
//!   annotation tools are plugged in.
//!
//! - **[`engine`]: The Logic Core.** Numbering resolution between structure, sequence and
//!   reference; radius-based neighbor sets cached per chain; the aggregation methods; and
//!   the incremental sliding-window statistic engine.
//!
//! - **[`workflows`]: The Public API.** Entry points that map a chain or a whole structure,
//!   and that evaluate Tajima's D over an alignment, reporting progress along the way.

pub mod core;
pub mod engine;
pub mod workflows;
