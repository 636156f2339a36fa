use super::annotation::{SecondaryStructure, SharedAnnotation};
use super::atom::AtomSelector;
use super::residue::Residue;
use crate::core::utils::identifiers;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Residue number → numbers of the residues within the query radius.
pub type NeighborMap = BTreeMap<isize, BTreeSet<isize>>;

type NeighborSlot = Arc<OnceLock<Arc<NeighborMap>>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NeighborKey {
    radius_bits: u64,
    selector: AtomSelector,
}

impl NeighborKey {
    pub fn new(radius: f64, selector: &AtomSelector) -> Self {
        // -0.0 and 0.0 share a key.
        Self {
            radius_bits: (radius + 0.0).to_bits(),
            selector: selector.clone(),
        }
    }

    pub fn radius(&self) -> f64 {
        f64::from_bits(self.radius_bits)
    }

    pub fn selector(&self) -> &AtomSelector {
        &self.selector
    }
}

#[derive(Debug)]
pub struct Chain {
    id: String,
    model_id: usize,
    residues: Vec<Residue>,
    residue_index: HashMap<isize, usize>,
    sequence: String,
    annotation: SharedAnnotation,
    neighbor_cache: RwLock<HashMap<NeighborKey, NeighborSlot>>,
    accessibility_cache: OnceLock<BTreeMap<isize, Option<f64>>>,
}

impl Chain {
    pub(crate) fn new(
        id: String,
        model_id: usize,
        residues: Vec<Residue>,
        sequence: String,
        annotation: SharedAnnotation,
    ) -> Self {
        let mut residue_index = HashMap::with_capacity(residues.len());
        for (i, residue) in residues.iter().enumerate() {
            residue_index.entry(residue.number).or_insert(i);
        }
        Self {
            id,
            model_id,
            residues,
            residue_index,
            sequence,
            annotation,
            neighbor_cache: RwLock::new(HashMap::new()),
            accessibility_cache: OnceLock::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model_id(&self) -> usize {
        self.model_id
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn polymer_residues(&self) -> impl Iterator<Item = &Residue> {
        self.residues.iter().filter(|r| r.is_polymer())
    }

    pub fn residue(&self, number: isize) -> Option<&Residue> {
        self.residue_index
            .get(&number)
            .and_then(|&i| self.residues.get(i))
    }

    /// The chain's amino-acid sequence, from header records when the source had them.
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn residue_to_atom_map(&self) -> BTreeMap<isize, Vec<usize>> {
        self.polymer_residues()
            .map(|r| (r.number, r.atoms().iter().map(|a| a.serial).collect()))
            .collect()
    }

    /// Empty until the owning model has been annotated.
    pub fn secondary_structure(&self) -> BTreeMap<isize, SecondaryStructure> {
        self.annotation
            .get()
            .map(|table| {
                table
                    .for_chain(&self.id)
                    .map(|(number, a)| (number, a.secondary_structure))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Empty until the owning model has been annotated; computed once afterwards.
    pub fn relative_solvent_accessibility(&self) -> BTreeMap<isize, Option<f64>> {
        let Some(table) = self.annotation.get() else {
            return BTreeMap::new();
        };
        self.accessibility_cache
            .get_or_init(|| {
                self.polymer_residues()
                    .map(|r| {
                        let value = table
                            .get(&self.id, r.number)
                            .and_then(|a| a.relative_accessibility);
                        (r.number, value)
                    })
                    .collect()
            })
            .clone()
    }

    pub fn amino_acid(&self, number: isize) -> char {
        self.residue(number)
            .map(|r| r.code)
            .unwrap_or(identifiers::UNKNOWN_RESIDUE_CODE)
    }

    /// Returns the cached neighbor map for `key`, running `compute` only on a miss.
    ///
    /// Concurrent callers with the same key wait on a single computation.
    pub fn neighbors_or_compute<F>(&self, key: NeighborKey, compute: F) -> Arc<NeighborMap>
    where
        F: FnOnce() -> NeighborMap,
    {
        let cached = self
            .neighbor_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        let slot = match cached {
            Some(slot) => slot,
            None => Arc::clone(
                self.neighbor_cache
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry(key)
                    .or_default(),
            ),
        };
        Arc::clone(slot.get_or_init(|| Arc::new(compute())))
    }

    pub fn cached_neighbor_maps(&self) -> usize {
        self.neighbor_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::annotation::{AnnotationTable, ResidueAnnotation};
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn residue(number: isize, name: &str) -> Residue {
        let mut residue = Residue::new(number, None, name);
        residue.atoms.push(Atom::new(
            number as usize * 10,
            "CA",
            Point3::new(number as f64, 0.0, 0.0),
        ));
        residue
    }

    fn chain_with(annotation: SharedAnnotation) -> Chain {
        Chain::new(
            "A".to_string(),
            0,
            vec![residue(1, "ALA"), residue(2, "GLY"), residue(3, "SER")],
            "AGS".to_string(),
            annotation,
        )
    }

    #[test]
    fn residues_are_looked_up_by_structural_number() {
        let chain = chain_with(SharedAnnotation::default());
        assert_eq!(chain.residue(2).unwrap().code, 'G');
        assert!(chain.residue(4).is_none());
        assert_eq!(chain.amino_acid(3), 'S');
        assert_eq!(chain.amino_acid(9), 'X');
    }

    #[test]
    fn residue_to_atom_map_lists_serials() {
        let chain = chain_with(SharedAnnotation::default());
        let map = chain.residue_to_atom_map();
        assert_eq!(map[&1], vec![10]);
        assert_eq!(map[&3], vec![30]);
    }

    #[test]
    fn annotation_lookups_are_empty_before_annotation() {
        let chain = chain_with(SharedAnnotation::default());
        assert!(chain.secondary_structure().is_empty());
        assert!(chain.relative_solvent_accessibility().is_empty());
    }

    #[test]
    fn annotation_is_visible_through_the_shared_table() {
        let shared = SharedAnnotation::default();
        let chain = chain_with(Arc::clone(&shared));

        let mut table = AnnotationTable::new();
        table.insert(
            "A",
            2,
            ResidueAnnotation {
                secondary_structure: SecondaryStructure::Strand,
                relative_accessibility: Some(0.25),
            },
        );
        shared.set(table).unwrap();

        assert_eq!(
            chain.secondary_structure().get(&2),
            Some(&SecondaryStructure::Strand)
        );
        let rsa = chain.relative_solvent_accessibility();
        assert_eq!(rsa[&2], Some(0.25));
        assert_eq!(rsa[&1], None);
    }

    #[test]
    fn neighbor_cache_computes_once_per_key() {
        let chain = chain_with(SharedAnnotation::default());
        let key = NeighborKey::new(5.0, &AtomSelector::All);
        let mut calls = 0;

        let first = chain.neighbors_or_compute(key.clone(), || {
            calls += 1;
            NeighborMap::new()
        });
        let second = chain.neighbors_or_compute(key, || {
            calls += 1;
            NeighborMap::new()
        });

        assert_eq!(calls, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(chain.cached_neighbor_maps(), 1);
    }

    #[test]
    fn concurrent_misses_share_one_computation() {
        let chain = chain_with(SharedAnnotation::default());
        let key = NeighborKey::new(8.0, &AtomSelector::All);
        let calls = AtomicUsize::new(0);
        let barrier = Barrier::new(4);

        let maps: Vec<Arc<NeighborMap>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        chain.neighbors_or_compute(key.clone(), || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(20));
                            NeighborMap::from([(1, BTreeSet::from([2]))])
                        })
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(maps.iter().all(|m| Arc::ptr_eq(m, &maps[0])));
        assert_eq!(chain.cached_neighbor_maps(), 1);
    }

    #[test]
    fn neighbor_keys_distinguish_radius_and_selector() {
        let all = AtomSelector::All;
        assert_eq!(NeighborKey::new(0.0, &all), NeighborKey::new(-0.0, &all));
        assert_ne!(NeighborKey::new(1.0, &all), NeighborKey::new(2.0, &all));
        assert_ne!(
            NeighborKey::new(1.0, &all),
            NeighborKey::new(1.0, &AtomSelector::named("CA"))
        );
        assert_eq!(NeighborKey::new(15.0, &all).radius(), 15.0);
    }
}
