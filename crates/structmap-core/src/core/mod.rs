//! # Core Module
//!
//! Data models and collaborator boundaries for StructMap.
//!
//! - **Structural tree** ([`models`]) - structures, models, chains, residues and atoms,
//!   built once and read-only afterwards, with per-chain memo tables.
//! - **Sequences** ([`sequence`]) - multi-sequence alignments, the genetic code, and the
//!   [`sequence::aligner::SequenceAligner`] collaborator.
//! - **I/O** ([`io`]) - parser, reader and annotation traits plus thin file adapters.
//! - **Utilities** ([`utils`]) - residue identifier tables and distance helpers.

pub mod io;
pub mod models;
pub mod sequence;
pub mod utils;
