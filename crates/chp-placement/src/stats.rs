//! Load balance and remapping measurements over an object population.

use chp_types::ObjectId;

use crate::error::PlacementError;
use crate::instance::PlacementInstance;

/// Per-server assignment counts and their spread.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadStats {
    /// `counts[s]` is the number of assignments to server `s`.
    pub counts: Vec<u64>,
    /// Mean assignments per server.
    pub mean: f64,
    /// Population standard deviation of `counts`.
    pub std_dev: f64,
    /// Fewest assignments to any server.
    pub min: u64,
    /// Most assignments to any server.
    pub max: u64,
}

impl LoadStats {
    /// Count primary assignments.
    pub fn primary(
        instance: &PlacementInstance,
        object_ids: &[ObjectId],
    ) -> Result<Self, PlacementError> {
        Self::replicas(instance, object_ids, 1)
    }

    /// Count every replica assignment at the given replication factor.
    pub fn replicas(
        instance: &PlacementInstance,
        object_ids: &[ObjectId],
        replication: usize,
    ) -> Result<Self, PlacementError> {
        let mut counts = vec![0u64; instance.num_servers() as usize];
        for &object_id in object_ids {
            for &server in &instance.find_placement(object_id, replication)? {
                counts[server as usize] += 1;
            }
        }
        Ok(Self::from_counts(counts))
    }

    /// Summarize raw counts.
    pub fn from_counts(counts: Vec<u64>) -> Self {
        if counts.is_empty() {
            return Self {
                counts,
                mean: 0.0,
                std_dev: 0.0,
                min: 0,
                max: 0,
            };
        }

        let n = counts.len() as f64;
        let mean = counts.iter().sum::<u64>() as f64 / n;
        let variance = counts
            .iter()
            .map(|&c| {
                let d = c as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        let min = counts.iter().copied().min().unwrap_or(0);
        let max = counts.iter().copied().max().unwrap_or(0);

        Self {
            counts,
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        }
    }

    /// `std_dev / mean`, or 0 when nothing was assigned.
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            self.std_dev / self.mean
        }
    }

    /// Total assignments counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Fraction of `object_ids` whose primary server differs between two instances.
pub fn remap_fraction(
    old: &PlacementInstance,
    new: &PlacementInstance,
    object_ids: &[ObjectId],
) -> Result<f64, PlacementError> {
    if object_ids.is_empty() {
        return Ok(0.0);
    }

    let mut moved = 0usize;
    for &object_id in object_ids {
        let before = old.find_placement(object_id, 1)?;
        let after = new.find_placement(object_id, 1)?;
        if before.primary() != after.primary() {
            moved += 1;
        }
    }
    Ok(moved as f64 / object_ids.len() as f64)
}
