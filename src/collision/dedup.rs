//! Merging of near-duplicate collision records.

use log::{debug, trace};

use super::contact::Collision;
use crate::{
    config::CollisionConfig,
    error::{CollisionError, Result},
    utils::profiling::DetectionMetrics,
};

/// Inserts `candidate` into `list` unless a better similar record exists,
/// evicting every similar record the candidate beats. Returns whether the
/// candidate was inserted.
///
/// Joint records are always inserted and are never evicted.
///
/// Similar records compare as follows: the later detection wins (beyond
/// `config.time_tolerance`); at the same time the smaller distance wins,
/// meaning the deeper of two penetrations or the closer of two contacts,
/// with ties going to the existing record.
///
/// The whole list is scanned even after the candidate has lost, because
/// similarity is not transitive. A candidate similar to two records that
/// are not similar to each other must evict both when it wins, and a
/// candidate that loses to one record may still beat (and evict) another.
/// Stopping at the first similar record would make the result depend on
/// list order.
pub fn add_collision(
    list: &mut Vec<Collision>,
    candidate: Collision,
    config: &CollisionConfig,
    metrics: &mut DetectionMetrics,
) -> Result<bool> {
    if candidate.is_joint() {
        list.push(candidate);
        metrics.joints_added += 1;
        return Ok(true);
    }
    if !candidate.distance.is_finite() {
        return Err(CollisionError::NonFiniteDistance {
            primary: candidate.primary_body,
            normal: candidate.normal_body,
            distance: candidate.distance,
        });
    }

    let mut rejected = false;
    let mut evict = vec![false; list.len()];
    for (index, existing) in list.iter().enumerate() {
        if existing.is_joint() || !candidate.similar_to(existing, config) {
            continue;
        }
        if existing.detected_time > candidate.detected_time + config.time_tolerance {
            rejected = true;
        } else if candidate.detected_time > existing.detected_time + config.time_tolerance {
            evict[index] = true;
        } else if candidate.distance < existing.distance {
            evict[index] = true;
        } else {
            rejected = true;
        }
    }

    let removed = evict.iter().filter(|&&e| e).count();
    if removed > 0 {
        let mut flags = evict.into_iter();
        list.retain(|_| !flags.next().unwrap_or(false));
        metrics.dedup_removed += removed;
        debug!(
            "collision {} -> {} at distance {:.6} evicted {removed} similar record(s)",
            candidate.primary_body, candidate.normal_body, candidate.distance
        );
    }

    if rejected {
        metrics.dedup_rejected += 1;
        trace!(
            "collision {} -> {} at distance {:.6} rejected by a similar record",
            candidate.primary_body,
            candidate.normal_body,
            candidate.distance
        );
        return Ok(false);
    }
    list.push(candidate);
    Ok(true)
}
