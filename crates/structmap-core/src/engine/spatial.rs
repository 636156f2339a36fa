use crate::core::models::atom::AtomSelector;
use crate::core::models::chain::{Chain, NeighborKey, NeighborMap};
use crate::core::utils::geometry;
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point3;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Residue neighborhoods within a radius, memoized on the chain per (radius, selector).
pub struct SpatialIndex;

impl SpatialIndex {
    /// Neighbor sets for every polymer residue of `chain` that has a representative atom.
    ///
    /// Distances are compared inclusively. With [`AtomSelector::All`] the distance between
    /// two residues is the closest pair of their polymer atoms; with a named atom it is
    /// the distance between those atoms, using the alpha carbon for residues lacking it.
    /// The relation is symmetric because both directions compare the same squared distance.
    pub fn neighbors(chain: &Chain, radius: f64, selector: &AtomSelector) -> Arc<NeighborMap> {
        chain.neighbors_or_compute(NeighborKey::new(radius, selector), || {
            debug!(
                "Computing neighbors for chain {} (radius {}, selector {}).",
                chain.id(),
                radius,
                selector
            );
            compute_neighbors(chain, radius, selector)
        })
    }
}

fn representatives(chain: &Chain, selector: &AtomSelector) -> Vec<(isize, Vec<Point3<f64>>)> {
    chain
        .polymer_residues()
        .filter_map(|residue| {
            let points: Vec<Point3<f64>> = match selector {
                AtomSelector::All => residue.polymer_atoms().map(|a| a.position).collect(),
                AtomSelector::Named(name) => residue
                    .named_or_alpha_carbon(name)
                    .map(|a| vec![a.position])
                    .unwrap_or_default(),
            };
            if points.is_empty() {
                trace!(
                    "Residue {} of chain {} has no atom for selector {}.",
                    residue.number,
                    chain.id(),
                    selector
                );
                return None;
            }
            Some((residue.number, points))
        })
        .collect()
}

/// Slack added to the squared radius of tree queries; candidates are confirmed exactly.
const QUERY_SLACK: f64 = 1e-6;

/// Uncached neighbor computation; see [`SpatialIndex::neighbors`].
///
/// Representative atoms go into one k-d tree, each tagged with its residue. A residue's
/// candidates are the owners of the atoms found around its own atoms.
pub fn compute_neighbors(chain: &Chain, radius: f64, selector: &AtomSelector) -> NeighborMap {
    let residues = representatives(chain, selector);
    if radius < 0.0 || residues.is_empty() {
        return residues
            .into_iter()
            .map(|(number, _)| (number, BTreeSet::new()))
            .collect();
    }

    let mut positions: Vec<[f64; 3]> = Vec::new();
    let mut owners: Vec<usize> = Vec::new();
    for (index, (_, points)) in residues.iter().enumerate() {
        for p in points {
            positions.push([p.x, p.y, p.z]);
            owners.push(index);
        }
    }
    let kdtree: KdTree<f64, 3> = (&positions).into();
    let radius_squared = radius * radius;

    let row = |(number, points): &(isize, Vec<Point3<f64>>)| {
        let candidates: BTreeSet<usize> = points
            .iter()
            .flat_map(|p| {
                kdtree.within_unsorted::<SquaredEuclidean>(
                    &[p.x, p.y, p.z],
                    radius_squared + QUERY_SLACK,
                )
            })
            .filter_map(|neighbour| owners.get(neighbour.item as usize).copied())
            .collect();
        let members: BTreeSet<isize> = candidates
            .into_iter()
            .filter_map(|index| residues.get(index))
            .filter(|(_, other)| geometry::any_within(points, other, radius_squared))
            .map(|(other_number, _)| *other_number)
            .collect();
        (*number, members)
    };

    #[cfg(feature = "parallel")]
    let rows: Vec<(isize, BTreeSet<isize>)> = residues.par_iter().map(row).collect();
    #[cfg(not(feature = "parallel"))]
    let rows: Vec<(isize, BTreeSet<isize>)> = residues.iter().map(row).collect();

    let mut neighbors = NeighborMap::new();
    for (number, members) in rows {
        neighbors.entry(number).or_default().extend(members);
    }
    neighbors
}
