//! # Engine Module
//!
//! The mapping machinery: numbering correspondences, 3D neighborhoods, aggregation and
//! the sliding-window diversity statistic.
//!
//! ## Overview
//!
//! Mapping a chain runs in three stages. The [`numbering`] resolver relates structural
//! residue numbers to a reference (a protein sequence or the codons of a genomic one).
//! The [`spatial`] index collects, for every residue, the residues within a radius. The
//! [`dispatch`] stage hands each neighborhood, expressed in reference coordinates, to an
//! [`aggregation`] reducer and collects the results into a [`datamap::DataMap`].
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Validated mapping and window parameters
//! - **Numbering** ([`numbering`]) - Sequence, structure and reference correspondences
//! - **Neighborhoods** ([`spatial`]) - Radius queries memoized on the chain
//! - **Aggregation** ([`aggregation`]) - Built-in methods and the reducer registry
//! - **Statistic** ([`statistic`]) - Tajima's D over alignment columns and windows
//! - **Results** ([`datamap`]) - Per-residue values tagged with chain and parameters
//! - **Progress Monitoring** ([`progress`]) - Callback-based event reporting
//! - **Error Handling** ([`error`]) - Engine error type
//!
//! All computations are pure functions of their inputs and the chain's compute-once
//! caches, so independent chains may be mapped concurrently.

pub mod aggregation;
pub mod config;
pub mod datamap;
pub mod dispatch;
pub mod error;
pub mod numbering;
pub mod progress;
pub mod spatial;
pub mod statistic;
