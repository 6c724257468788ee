use std::time::{Duration, Instant};

use log::debug;

/// Counters collected while detecting collisions.
///
/// The counters are advisory only: nothing in the detection pipeline
/// reads them back. They live in an explicit value that the caller owns,
/// passes down by `&mut`, and resets between reporting intervals.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DetectionMetrics {
    pub broad_phase_time: Duration,
    pub narrow_phase_time: Duration,

    pub pairs_considered: usize,
    pub pairs_rejected: usize,
    pub vertices_tested: usize,
    pub vertices_skipped_non_collide: usize,
    pub vertices_rejected_proximity: usize,
    pub edges_rejected_proximity: usize,
    pub edge_intersection_tests: usize,
    pub square_roots: usize,
    pub collisions_found: usize,
    pub contacts_found: usize,
    pub joints_added: usize,
    pub dedup_rejected: usize,
    pub dedup_removed: usize,
    pub undetected_penetrations: usize,
}

impl DetectionMetrics {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn merge(&mut self, other: &Self) {
        self.broad_phase_time += other.broad_phase_time;
        self.narrow_phase_time += other.narrow_phase_time;
        self.pairs_considered += other.pairs_considered;
        self.pairs_rejected += other.pairs_rejected;
        self.vertices_tested += other.vertices_tested;
        self.vertices_skipped_non_collide += other.vertices_skipped_non_collide;
        self.vertices_rejected_proximity += other.vertices_rejected_proximity;
        self.edges_rejected_proximity += other.edges_rejected_proximity;
        self.edge_intersection_tests += other.edge_intersection_tests;
        self.square_roots += other.square_roots;
        self.collisions_found += other.collisions_found;
        self.contacts_found += other.contacts_found;
        self.joints_added += other.joints_added;
        self.dedup_rejected += other.dedup_rejected;
        self.dedup_removed += other.dedup_removed;
        self.undetected_penetrations += other.undetected_penetrations;
    }

    /// Fraction of considered body pairs that the broad phase threw away.
    pub fn pair_rejection_ratio(&self) -> f64 {
        if self.pairs_considered == 0 {
            return 0.0;
        }
        self.pairs_rejected as f64 / self.pairs_considered as f64
    }

    pub fn report(&self) {
        debug!(
            "collision metrics: pairs {} ({} rejected, {:.1}%), vertices {} ({} skipped, {} far), \
             edges far {}, intersection tests {}, sqrt {}",
            self.pairs_considered,
            self.pairs_rejected,
            self.pair_rejection_ratio() * 100.0,
            self.vertices_tested,
            self.vertices_skipped_non_collide,
            self.vertices_rejected_proximity,
            self.edges_rejected_proximity,
            self.edge_intersection_tests,
            self.square_roots,
        );
        debug!(
            "collision metrics: collisions {}, contacts {}, joints {}, dedup rejected {}, \
             dedup removed {}, undetected penetrations {}",
            self.collisions_found,
            self.contacts_found,
            self.joints_added,
            self.dedup_rejected,
            self.dedup_removed,
            self.undetected_penetrations,
        );
        debug!(
            "collision timing: broad {:.3} ms, narrow {:.3} ms",
            self.broad_phase_time.as_secs_f64() * 1000.0,
            self.narrow_phase_time.as_secs_f64() * 1000.0,
        );
    }
}

/// Adds the elapsed time of a scope to a duration counter when dropped.
pub struct ScopedTimer<'a> {
    start: Instant,
    output: &'a mut Duration,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(output: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            output,
        }
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        *self.output += self.start.elapsed();
    }
}
