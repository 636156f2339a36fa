pub mod aligner;
pub mod alignment;
pub mod codon;
