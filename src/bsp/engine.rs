use std::ops::Range;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info, warn};

use crate::bsp::message::MessageStore;
use crate::bsp::stats::{JobReport, SuperstepStats};
use crate::bsp::vertex::VertexRecord;
use crate::bsp::{Outbound, VertexProgram, VertexView};
use crate::config::BspConfig;
use crate::error::LpError;
use crate::types::CSRGraph;

/// Number of partitions handed to the pool per worker thread, so that a slow
/// partition does not leave the other workers idle at the barrier.
const PARTITIONS_PER_THREAD: usize = 4;

/// Final state of a job that reached its fixed point.
#[derive(Debug, Clone)]
pub struct BspResult<V> {
    /// `(vertex_id, value)` for every vertex, sorted by vertex id.
    pub values: Vec<(u64, V)>,
    /// Number of executed supersteps, superstep 0 included.
    pub supersteps: u64,
    pub stats: Vec<SuperstepStats>,
    pub duration: Duration,
}

impl<V: Copy> BspResult<V> {
    /// Final value of `vertex_id`, if the vertex exists.
    pub fn value_of(&self, vertex_id: u64) -> Option<V> {
        self.values
            .binary_search_by_key(&vertex_id, |&(id, _)| id)
            .ok()
            .map(|position| self.values[position].1)
    }

    pub fn report(&self) -> JobReport {
        JobReport::from_stats(&self.stats, self.duration)
    }
}

/// Runs a [`VertexProgram`] over a [`CSRGraph`] in barrier-synchronized supersteps.
///
/// The engine owns every piece of scheduling: the vertex arena, the inboxes,
/// message delivery at the barrier, reactivation of halted vertices that
/// received mail, and the global halt vote. Vertex programs only ever see
/// their own vertex and their own messages.
pub struct BspEngine<'g, P> {
    graph: &'g CSRGraph,
    program: P,
    config: BspConfig,
}

impl<'g, P> BspEngine<'g, P>
where
    P: VertexProgram,
{
    /// Assembles a job.
    ///
    /// # Errors
    /// [`LpError::InvalidConfig`] if `config` does not validate.
    pub fn new(graph: &'g CSRGraph, program: P, config: BspConfig) -> Result<Self, LpError> {
        config.validate()?;
        Ok(Self {
            graph,
            program,
            config,
        })
    }

    /// Runs the job to its fixed point on a dedicated thread pool.
    ///
    /// # Errors
    ///
    /// * [`LpError::ThreadPool`] if the worker pool cannot be created.
    /// * [`LpError::SuperstepLimit`] if the job is still running after
    ///   `max_supersteps`. No values are returned in that case.
    pub fn run(&self) -> Result<BspResult<P::Value>, LpError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.thread_num)
            .build()?;
        pool.install(|| self.run_supersteps())
    }

    fn run_supersteps(&self) -> Result<BspResult<P::Value>, LpError> {
        let start = Instant::now();
        let slot_count = self.graph.vertex_count as usize;
        let partitions = self
            .graph
            .partitions(self.config.thread_num * PARTITIONS_PER_THREAD);

        info!(
            program = self.program.name(),
            vertices = self.graph.vertex_count,
            edges = self.graph.edge_count,
            threads = self.config.thread_num,
            partitions = partitions.len(),
            "starting BSP job"
        );

        let mut records = (0..slot_count)
            .map(|slot| {
                let vertex_id = self.graph.vertex_id(slot);
                VertexRecord::new(vertex_id, self.program.initial_value(vertex_id))
            })
            .collect::<Vec<_>>();
        let mut inboxes = (0..slot_count).map(|_| Vec::new()).collect::<Vec<_>>();
        let mut message_store = MessageStore::<P::Message>::new();
        let mut history = Vec::<SuperstepStats>::new();

        let pb = self.progress_bar();
        let mut superstep = 0u64;
        loop {
            // Compute phase: partitions run independently, each only touching
            // its own records and inboxes.
            let store = &message_store;
            let mut stats = split_partitions(&mut records, &partitions)
                .into_par_iter()
                .zip(split_partitions(&mut inboxes, &partitions).into_par_iter())
                .zip(partitions.par_iter())
                .map(|((records, inboxes), range)| {
                    self.compute_partition(range, records, inboxes, superstep, store)
                })
                .reduce(SuperstepStats::default, SuperstepStats::merge);
            stats.superstep = superstep;

            // Barrier: messages of this superstep become the inboxes of the next one.
            let delivered = message_store.deliver(&mut inboxes);
            debug!(%stats, delivered, "superstep finished");
            pb.set_message(format!(
                "superstep {} | active {} | in flight {}",
                superstep, stats.active_after, delivered
            ));
            pb.tick();
            history.push(stats);
            superstep += 1;

            if stats.active_after == 0 && delivered == 0 {
                break;
            }
            if let Some(limit) = self.config.max_supersteps {
                if superstep >= limit {
                    pb.abandon_with_message(format!("aborted after {} supersteps", limit));
                    warn!(limit, active = stats.active_after, in_flight = delivered, "superstep bound reached, aborting job");
                    return Err(LpError::SuperstepLimit { limit });
                }
            }
        }

        let mut values = records
            .iter()
            .map(|record| (record.id(), record.value()))
            .collect::<Vec<_>>();
        values.par_sort_unstable_by_key(|&(vertex_id, _)| vertex_id);

        let result = BspResult {
            values,
            supersteps: superstep,
            stats: history,
            duration: start.elapsed(),
        };
        pb.finish_with_message(format!("fixed point after {} supersteps", superstep));
        info!(program = self.program.name(), report = %result.report(), "BSP job finished");
        Ok(result)
    }

    /// Runs one superstep over a single partition.
    ///
    /// `records` and `inboxes` are the slices of the arena covering `range`.
    fn compute_partition(
        &self,
        range: &Range<usize>,
        records: &mut [VertexRecord<P::Value>],
        inboxes: &mut [Vec<P::Message>],
        superstep: u64,
        store: &MessageStore<P::Message>,
    ) -> SuperstepStats {
        let mut stats = SuperstepStats::default();
        for (slot, (record, inbox)) in range.clone().zip(records.iter_mut().zip(inboxes.iter_mut())) {
            if !inbox.is_empty() && !record.is_active() {
                record.reactivate();
                stats.reactivated += 1;
            }
            if record.is_active() {
                let view = VertexView {
                    id: record.id(),
                    value: record.value(),
                    neighbors: self.graph.neighbors(slot),
                };
                let transition = self.program.compute(view, std::mem::take(inbox), superstep);
                stats.computed += 1;

                if transition.value != record.value {
                    stats.value_changes += 1;
                    record.value = transition.value;
                }
                if let Outbound::AllNeighbors(message) = transition.outbound {
                    stats.messages_sent += store.broadcast(self.graph.neighbor_slots(slot), message);
                }
                if transition.vote_to_halt {
                    record.halt();
                    stats.halt_votes += 1;
                }
            }
            if record.is_active() {
                stats.active_after += 1;
            }
        }
        stats
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {prefix} {msg}")
        {
            pb.set_style(style);
        }
        pb.set_prefix(self.program.name().to_string());
        pb
    }
}

/// Splits `items` into consecutive mutable slices matching `partitions`.
///
/// `partitions` must be contiguous, start at 0 and cover `items` exactly, which
/// is what [`CSRGraph::partitions`] produces.
fn split_partitions<'a, T>(mut items: &'a mut [T], partitions: &[Range<usize>]) -> Vec<&'a mut [T]> {
    let mut slices = Vec::with_capacity(partitions.len());
    for range in partitions {
        let (head, tail) = std::mem::take(&mut items).split_at_mut(range.len());
        slices.push(head);
        items = tail;
    }
    slices
}
