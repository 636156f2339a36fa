use super::error::EngineError;
use super::numbering::Codon;
use super::statistic::SlidingStatisticEngine;
use crate::core::sequence::alignment::SequenceAlignment;
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Built-in aggregation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationMethod {
    /// Mean of per-reference values.
    Default,
    /// Sum of variant allele counts.
    Snps,
    /// Variant allele count per reference-mapped residue.
    SnpFrequency,
    /// Mean of a per-amino-acid scale.
    AminoAcidScale,
    /// Tajima's D over the codon columns of the window.
    TajimasD,
}

impl AggregationMethod {
    pub const ALL: [AggregationMethod; 5] = [
        Self::Default,
        Self::Snps,
        Self::SnpFrequency,
        Self::AminoAcidScale,
        Self::TajimasD,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Snps => "snps",
            Self::SnpFrequency => "snp_frequency",
            Self::AminoAcidScale => "aa_scale",
            Self::TajimasD => "tajimasd",
        }
    }

    /// Whether residues are mapped to genomic codons rather than reference indices.
    pub fn uses_genome_reference(&self) -> bool {
        matches!(self, Self::TajimasD)
    }

    fn expected_data(&self) -> &'static str {
        match self {
            Self::Default => "values",
            Self::Snps | Self::SnpFrequency => "variants",
            Self::AminoAcidScale => "scale",
            Self::TajimasD => "alignment",
        }
    }

    /// Fails unless `data` is the kind this method reduces.
    pub fn check_data(&self, data: &MappingData) -> Result<(), EngineError> {
        if data.kind() == self.expected_data() {
            Ok(())
        } else {
            Err(EngineError::InvalidInput {
                argument: "data",
                reason: format!(
                    "method '{}' expects {} data, got {}",
                    self.name(),
                    self.expected_data(),
                    data.kind()
                ),
            })
        }
    }

    /// Reducer for this method, bound to `data` where the method keeps per-run state.
    pub fn reducer<'d>(&self, data: &'d MappingData) -> Result<Box<dyn Reducer + 'd>, EngineError> {
        self.check_data(data)?;
        Ok(match (self, data) {
            (Self::Default, _) => Box::new(MeanValue),
            (Self::Snps, _) => Box::new(VariantCount { per_residue: false }),
            (Self::SnpFrequency, _) => Box::new(VariantCount { per_residue: true }),
            (Self::AminoAcidScale, _) => Box::new(ScaleMean),
            (Self::TajimasD, MappingData::Alignment(alignment)) => {
                Box::new(CodonWindowStatistic::new(alignment))
            }
            (Self::TajimasD, _) => {
                return Err(EngineError::InvalidInput {
                    argument: "data",
                    reason: "method 'tajimasd' expects alignment data".to_string(),
                });
            }
        })
    }
}

impl FromStr for AggregationMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.name() == name)
            .ok_or_else(|| EngineError::UnknownMethod(s.trim().to_string()))
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-residue input to a mapping run.
#[derive(Debug, Clone)]
pub enum MappingData {
    /// Reference index → value.
    Values(BTreeMap<usize, f64>),
    /// Reference index → variant allele count.
    Variants(BTreeMap<usize, u32>),
    /// One-letter amino-acid code → scale value.
    Scale(HashMap<char, f64>),
    /// Nucleotide alignment whose first row may serve as the genomic reference.
    Alignment(SequenceAlignment),
}

impl MappingData {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Values(_) => "values",
            Self::Variants(_) => "variants",
            Self::Scale(_) => "scale",
            Self::Alignment(_) => "alignment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencePosition {
    Index(usize),
    Codon(Codon),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowMember {
    pub residue: isize,
    pub code: char,
    /// `None` when the residue has no counterpart in the reference.
    pub reference: Option<ReferencePosition>,
}

/// The residues within the radius of `center`, the center included when it qualifies.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    pub center: isize,
    pub members: &'a [WindowMember],
}

impl<'a> Window<'a> {
    pub fn reference_indices(&self) -> impl Iterator<Item = usize> + 'a {
        self.members.iter().filter_map(|m| match m.reference {
            Some(ReferencePosition::Index(i)) => Some(i),
            _ => None,
        })
    }

    pub fn codons(&self) -> impl Iterator<Item = Codon> + 'a {
        self.members.iter().filter_map(|m| match m.reference {
            Some(ReferencePosition::Codon(c)) => Some(c),
            _ => None,
        })
    }
}

/// Reduces the data of a window's members to one value; `None` is the missing value.
pub trait Reducer: Send + Sync {
    fn reduce(&self, window: &Window<'_>, data: &MappingData) -> Result<Option<f64>, EngineError>;
}

impl<F> Reducer for F
where
    F: Fn(&Window<'_>, &MappingData) -> Result<Option<f64>, EngineError> + Send + Sync,
{
    fn reduce(&self, window: &Window<'_>, data: &MappingData) -> Result<Option<f64>, EngineError> {
        self(window, data)
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

fn wrong_kind(expected: &'static str, data: &MappingData) -> EngineError {
    EngineError::InvalidInput {
        argument: "data",
        reason: format!("expected {} data, got {}", expected, data.kind()),
    }
}

/// Missing when no member has a value.
struct MeanValue;

impl Reducer for MeanValue {
    fn reduce(&self, window: &Window<'_>, data: &MappingData) -> Result<Option<f64>, EngineError> {
        let MappingData::Values(values) = data else {
            return Err(wrong_kind("values", data));
        };
        Ok(mean(
            window
                .reference_indices()
                .filter_map(|i| values.get(&i).copied()),
        ))
    }
}

/// Missing when no member maps to the reference; unlisted positions count zero.
struct VariantCount {
    per_residue: bool,
}

impl Reducer for VariantCount {
    fn reduce(&self, window: &Window<'_>, data: &MappingData) -> Result<Option<f64>, EngineError> {
        let MappingData::Variants(counts) = data else {
            return Err(wrong_kind("variants", data));
        };
        let (total, mapped) = window
            .reference_indices()
            .fold((0u64, 0usize), |(total, mapped), i| {
                (total + u64::from(counts.get(&i).copied().unwrap_or(0)), mapped + 1)
            });
        if mapped == 0 {
            return Ok(None);
        }
        Ok(Some(if self.per_residue {
            total as f64 / mapped as f64
        } else {
            total as f64
        }))
    }
}

/// Uses the structure's residue identity, so members need not map to the reference.
struct ScaleMean;

impl Reducer for ScaleMean {
    fn reduce(&self, window: &Window<'_>, data: &MappingData) -> Result<Option<f64>, EngineError> {
        let MappingData::Scale(scale) = data else {
            return Err(wrong_kind("scale", data));
        };
        Ok(mean(
            window
                .members
                .iter()
                .filter_map(|m| scale.get(&m.code).copied()),
        ))
    }
}

/// Tajima's D over the alignment columns of the window's codons. Bound to one alignment,
/// whose column summaries are shared by every window of the run.
pub struct CodonWindowStatistic<'a> {
    engine: SlidingStatisticEngine<'a>,
}

impl<'a> CodonWindowStatistic<'a> {
    pub fn new(alignment: &'a SequenceAlignment) -> Self {
        Self {
            engine: SlidingStatisticEngine::new(alignment),
        }
    }

    pub fn columns_evaluated(&self) -> usize {
        self.engine.columns_evaluated()
    }
}

impl Reducer for CodonWindowStatistic<'_> {
    fn reduce(&self, window: &Window<'_>, _data: &MappingData) -> Result<Option<f64>, EngineError> {
        let columns: Vec<usize> = window
            .codons()
            .flatten()
            .filter_map(|position| position.checked_sub(1))
            .sorted_unstable()
            .dedup()
            .collect();
        if columns.is_empty() {
            return Ok(None);
        }
        Ok(self.engine.statistic_over(columns))
    }
}

/// A resolved aggregation: a built-in method or a reducer registered by name.
#[derive(Clone)]
pub enum Aggregator {
    Builtin(AggregationMethod),
    Custom {
        name: String,
        reducer: Arc<dyn Reducer>,
    },
}

impl Aggregator {
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(method) => method.name(),
            Self::Custom { name, .. } => name,
        }
    }

    pub fn uses_genome_reference(&self) -> bool {
        matches!(self, Self::Builtin(m) if m.uses_genome_reference())
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(method) => f.debug_tuple("Builtin").field(method).finish(),
            Self::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
        }
    }
}

/// Name → aggregation lookup. Built-in names always resolve to the built-in methods;
/// custom reducers use the protein reference path.
///
/// | name            | data       |
/// |-----------------|------------|
/// | `default`       | values     |
/// | `snps`          | variants   |
/// | `snp_frequency` | variants   |
/// | `aa_scale`      | scale      |
/// | `tajimasd`      | alignment  |
/// | registered      | any        |
#[derive(Clone, Default)]
pub struct MethodRegistry {
    custom: BTreeMap<String, Arc<dyn Reducer>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<R>(&mut self, name: &str, reducer: R) -> Result<(), EngineError>
    where
        R: Reducer + 'static,
    {
        let name = name.trim();
        if name.is_empty() || name.parse::<AggregationMethod>().is_ok() {
            return Err(EngineError::InvalidInput {
                argument: "name",
                reason: format!("'{}' is empty or shadows a built-in method", name),
            });
        }
        self.custom.insert(name.to_string(), Arc::new(reducer));
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<Aggregator, EngineError> {
        if let Ok(method) = name.parse::<AggregationMethod>() {
            return Ok(Aggregator::Builtin(method));
        }
        self.custom
            .get(name.trim())
            .map(|reducer| Aggregator::Custom {
                name: name.trim().to_string(),
                reducer: Arc::clone(reducer),
            })
            .ok_or_else(|| EngineError::UnknownMethod(name.trim().to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        AggregationMethod::ALL
            .iter()
            .map(|method| -> &str { method.name() })
            .chain(self.custom.keys().map(String::as_str))
            .collect()
    }
}
