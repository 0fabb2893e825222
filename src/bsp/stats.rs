use std::fmt;
use std::time::Duration;

/// Counters collected for one superstep.
///
/// Partitions fill their own instance and the engine folds them with
/// [`SuperstepStats::merge`], which is commutative and associative, so the
/// reduction order chosen by the thread pool does not matter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuperstepStats {
    pub superstep: u64,
    /// Vertices whose computation ran in this superstep.
    pub computed: u64,
    /// Halted vertices woken up by incoming mail.
    pub reactivated: u64,
    /// Computations that returned a value different from the previous one.
    pub value_changes: u64,
    pub messages_sent: u64,
    pub halt_votes: u64,
    /// Vertices still active after the barrier.
    pub active_after: u64,
}

impl SuperstepStats {
    pub fn merge(self, other: SuperstepStats) -> SuperstepStats {
        SuperstepStats {
            superstep: self.superstep.max(other.superstep),
            computed: self.computed + other.computed,
            reactivated: self.reactivated + other.reactivated,
            value_changes: self.value_changes + other.value_changes,
            messages_sent: self.messages_sent + other.messages_sent,
            halt_votes: self.halt_votes + other.halt_votes,
            active_after: self.active_after + other.active_after,
        }
    }
}

impl fmt::Display for SuperstepStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,
               "superstep {}: computed {} (reactivated {}), changed {}, sent {} messages, {} halt votes, {} active",
               self.superstep, self.computed, self.reactivated,
               self.value_changes, self.messages_sent, self.halt_votes, self.active_after
        )
    }
}

/// Summary of a finished job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub supersteps: u64,
    pub duration: Duration,
    pub total_messages: u64,
    pub total_computations: u64,
}

impl JobReport {
    pub fn from_stats(stats: &[SuperstepStats], duration: Duration) -> Self {
        let total = stats
            .iter()
            .copied()
            .fold(SuperstepStats::default(), SuperstepStats::merge);
        Self {
            supersteps: stats.len() as u64,
            duration,
            total_messages: total.messages_sent,
            total_computations: total.computed,
        }
    }

    /// Messages per second over the whole job, `0.0` for an instantaneous job.
    pub fn message_throughput(&self) -> f64 {
        let seconds = self.duration.as_secs_f64();
        if seconds > 0.0 {
            self.total_messages as f64 / seconds
        } else {
            0.0
        }
    }
}

impl fmt::Display for JobReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,
               "{} supersteps in {:?} ({} us), {} computations, {} messages ({:.0} msg/s)",
               self.supersteps, self.duration, self.duration.as_micros(),
               self.total_computations, self.total_messages, self.message_throughput()
        )
    }
}
