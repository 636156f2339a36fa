//! Collaborator interfaces and thin file helpers.
//!
//! The parsing of coordinate files, the computation of structural annotation and the
//! reading of alignments are reached only through the traits in [`traits`]. The remaining
//! modules are small adapters: FASTA via `bio`, DSSP via an external executable, CSV/TOML
//! input tables, and CSV/PDB output writers.

pub mod data;
pub mod dssp;
pub mod fasta;
pub mod traits;
pub mod writers;
