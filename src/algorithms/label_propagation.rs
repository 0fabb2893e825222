use std::collections::BTreeMap;
use std::sync::Arc;

use crate::bsp::{BspEngine, BspResult, Transition, VertexProgram, VertexView};
use crate::config::BspConfig;
use crate::error::LpError;
use crate::types::{CSRGraph, Label};

/// Label propagation community detection as a vertex program.
///
/// Every vertex starts with its own id as label. In superstep 0 it announces
/// the label to its neighbors. From then on it adopts the label chosen by
/// [`next_label`] from the labels it received, re-announces it when it
/// changed, and votes to halt when it did not.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelPropagation;

impl VertexProgram for LabelPropagation {
    type Value = Label;
    type Message = Label;

    fn name(&self) -> &str {
        "label-propagation"
    }

    fn initial_value(&self, vertex_id: u64) -> Label {
        vertex_id
    }

    fn compute(
        &self,
        vertex: VertexView<'_, Label>,
        mut messages: Vec<Label>,
        superstep: u64,
    ) -> Transition<Label, Label> {
        if superstep == 0 {
            return Transition::broadcast(vertex.value, vertex.id);
        }
        let new_label = next_label(vertex.value, &mut messages);
        if new_label != vertex.value {
            Transition::broadcast(new_label, new_label)
        } else {
            Transition::halt(vertex.value)
        }
    }
}

/// Chooses the label a vertex holding `current` adopts after receiving `messages`.
///
/// * no message: `current`
/// * one message: the smaller of `current` and the message
/// * more: [`select_label`]
///
/// `messages` may be reordered.
pub fn next_label(current: Label, messages: &mut [Label]) -> Label {
    match messages.len() {
        0 => current,
        1 => current.min(messages[0]),
        _ => select_label(current, messages),
    }
}

/// Most frequent label of `messages`, smallest label first among equally
/// frequent ones.
///
/// When every received label occurs exactly once there is no majority, and the
/// smaller of `current` and the smallest received label wins. Always taking the
/// smaller candidate keeps two neighbors from swapping labels forever.
///
/// `messages` is sorted in place.
pub fn select_label(current: Label, messages: &mut [Label]) -> Label {
    messages.sort_unstable();
    let Some(&smallest) = messages.first() else {
        return current;
    };

    let (mut max_count, mut max_value) = (1usize, smallest);
    let (mut current_count, mut current_value) = (1usize, smallest);
    for &label in &messages[1..] {
        if label == current_value {
            current_count += 1;
            // Strictly greater: the first (smallest) label to reach a count keeps it.
            if current_count > max_count {
                max_count = current_count;
                max_value = current_value;
            }
        } else {
            current_count = 1;
            current_value = label;
        }
    }

    if max_count == 1 {
        current.min(smallest)
    } else {
        max_value
    }
}

/// Trait for community detection over a vertex/edge store.
///
/// # Type Parameters
///
/// * `T` - The type used for vertex identifiers and for the community count.
pub trait CommunityDetection<T> {
    /// Number of distinct communities at the fixed point.
    fn count_communities(&self, config: BspConfig) -> Result<T, LpError>;

    /// Vertices grouped by community. Communities are ordered by label and
    /// vertices inside a community by id.
    fn communities(&self, config: BspConfig) -> Result<Vec<Vec<T>>, LpError>;
}

/// Controller running label propagation on a shared store.
pub struct LabelPropagationController {
    storage_engine: Arc<CSRGraph>,
}

impl LabelPropagationController {
    pub fn new(storage_engine: Arc<CSRGraph>) -> Self {
        Self { storage_engine }
    }

    /// Runs the job and returns the final `(vertex_id, label)` pairs.
    pub fn run(&self, config: BspConfig) -> Result<BspResult<Label>, LpError> {
        BspEngine::new(&self.storage_engine, LabelPropagation, config)?.run()
    }
}

/// Groups `(vertex_id, label)` pairs by label.
pub fn group_by_label(values: &[(u64, Label)]) -> BTreeMap<Label, Vec<u64>> {
    let mut groups = BTreeMap::<Label, Vec<u64>>::new();
    for &(vertex_id, label) in values {
        groups.entry(label).or_default().push(vertex_id);
    }
    for members in groups.values_mut() {
        members.sort_unstable();
    }
    groups
}

impl CommunityDetection<u64> for LabelPropagationController {
    fn count_communities(&self, config: BspConfig) -> Result<u64, LpError> {
        let result = self.run(config)?;
        Ok(group_by_label(&result.values).len() as u64)
    }

    fn communities(&self, config: BspConfig) -> Result<Vec<Vec<u64>>, LpError> {
        let result = self.run(config)?;
        Ok(group_by_label(&result.values).into_values().collect())
    }
}

#[cfg(test)]
mod test_label_propagation {
    use std::collections::HashSet;
    use std::sync::Arc;

    use crate::algorithms::label_propagation::{
        next_label, select_label, CommunityDetection, LabelPropagation, LabelPropagationController,
    };
    use crate::bsp::{BspEngine, Outbound, Transition, VertexProgram, VertexView};
    use crate::config::BspConfig;
    use crate::error::LpError;
    use crate::generator::PlantedPartition;
    use crate::types::CSRGraph;

    fn view(id: u64, value: u64) -> VertexView<'static, u64> {
        VertexView { id, value, neighbors: &[] }
    }

    fn config(thread_num: usize) -> BspConfig {
        BspConfig {
            thread_num,
            ..BspConfig::default()
        }
    }

    #[test]
    fn test_majority_prefers_smallest_tied_label() {
        assert_eq!(select_label(5, &mut [3, 3, 7, 7, 2]), 3);
        assert_eq!(select_label(5, &mut [7, 7, 3, 3, 2]), 3);
    }

    #[test]
    fn test_no_majority_falls_back_to_minimum() {
        assert_eq!(select_label(5, &mut [9, 4]), 4);
        assert_eq!(select_label(2, &mut [9, 4]), 2);
        assert_eq!(select_label(5, &mut [8, 6, 7]), 5);
    }

    #[test]
    fn test_two_message_inputs() {
        // Fully tied pairs take the fallback, equal pairs are a majority of two.
        assert_eq!(select_label(1, &mut [4, 9]), 1);
        assert_eq!(select_label(10, &mut [9, 4]), 4);
        assert_eq!(select_label(5, &mut [4, 4]), 4);
        // A majority wins even over a smaller current label.
        assert_eq!(select_label(2, &mut [6, 6]), 6);
    }

    #[test]
    fn test_majority_run_at_end_of_sequence() {
        assert_eq!(select_label(0, &mut [1, 2, 3, 9, 9, 9]), 9);
        assert_eq!(select_label(0, &mut [4, 4, 8, 8, 8]), 8);
    }

    #[test]
    fn test_select_label_sorts_input() {
        let mut messages = [7, 1, 7, 3];
        assert_eq!(select_label(9, &mut messages), 7);
        assert_eq!(messages, [1, 3, 7, 7]);
    }

    #[test]
    fn test_next_label_by_message_count() {
        assert_eq!(next_label(5, &mut []), 5);
        assert_eq!(next_label(5, &mut [8]), 5);
        assert_eq!(next_label(5, &mut [2]), 2);
        assert_eq!(next_label(5, &mut [3, 3, 7, 7, 2]), 3);
    }

    #[test]
    fn test_superstep_zero_broadcasts_id() {
        let transition = LabelPropagation.compute(view(4, 4), vec![], 0);
        assert_eq!(transition, Transition::broadcast(4, 4));
        assert!(!transition.vote_to_halt);
    }

    #[test]
    fn test_empty_inbox_halts_unchanged() {
        let transition = LabelPropagation.compute(view(4, 2), vec![], 3);
        assert_eq!(transition.value, 2);
        assert_eq!(transition.outbound, Outbound::Silent);
        assert!(transition.vote_to_halt);
    }

    #[test]
    fn test_change_broadcasts_new_label() {
        let transition = LabelPropagation.compute(view(2, 2), vec![1], 1);
        assert_eq!(transition, Transition::broadcast(1, 1));
    }

    #[test]
    fn test_transition_idempotent_at_fixed_point() {
        let messages = vec![3, 3, 7, 2];
        let first = LabelPropagation.compute(view(9, 9), messages.clone(), 1);
        assert_eq!(first.value, 3);

        let settled = LabelPropagation.compute(view(9, first.value), messages.clone(), 2);
        assert_eq!(settled, Transition::halt(3));
        let again = LabelPropagation.compute(view(9, settled.value), messages, 3);
        assert_eq!(again, settled);
    }

    #[test]
    fn test_two_vertex_convergence() {
        let graph = CSRGraph::from_undirected_edges(&[1, 2], &[(1, 2)]).unwrap();
        let result = BspEngine::new(&graph, LabelPropagation, config(2)).unwrap().run().unwrap();

        assert_eq!(result.values, vec![(1, 1), (2, 1)]);
        assert_eq!(result.supersteps, 3);

        // Superstep 1: vertex 1 keeps its label and halts, vertex 2 switches to 1.
        assert_eq!(result.stats[1].value_changes, 1);
        assert_eq!(result.stats[1].halt_votes, 1);
        assert_eq!(result.stats[1].messages_sent, 1);
        // Superstep 2: vertex 1 is woken up by the message of vertex 2.
        assert_eq!(result.stats[2].reactivated, 1);
        assert_eq!(result.stats[2].computed, 2);
        assert_eq!(result.stats[2].value_changes, 0);
        assert_eq!(result.stats[2].active_after, 0);
    }

    #[test]
    fn test_bridged_triangles() {
        let graph = CSRGraph::from_undirected_edges(
            &[1, 2, 3, 4, 5, 6],
            &[(1, 2), (1, 3), (2, 3), (3, 4), (4, 5), (4, 6), (5, 6)],
        ).unwrap();
        let controller = LabelPropagationController::new(Arc::new(graph));

        let result = controller.run(config(3)).unwrap();
        assert_eq!(result.values, vec![(1, 1), (2, 1), (3, 1), (4, 3), (5, 3), (6, 3)]);
        assert_eq!(result.supersteps, 5);

        assert_eq!(controller.communities(config(1)).unwrap(), vec![vec![1, 2, 3], vec![4, 5, 6]]);
        assert_eq!(controller.count_communities(config(4)).unwrap(), 2);
    }

    #[test]
    fn test_isolated_vertex_keeps_own_label() {
        let graph = CSRGraph::from_edges(&[7, 8], &[]).unwrap();
        let result = BspEngine::new(&graph, LabelPropagation, config(1)).unwrap().run().unwrap();
        assert_eq!(result.values, vec![(7, 7), (8, 8)]);
        assert_eq!(result.supersteps, 2);
    }

    #[test]
    fn test_planted_cliques_recovered() {
        let generator = PlantedPartition::new(4, 6, 1.0, 0.0, 11);
        let graph = generator.build().unwrap();
        let controller = LabelPropagationController::new(Arc::new(graph));

        let communities = controller.communities(config(4)).unwrap();
        assert_eq!(communities.len(), 4);
        for members in &communities {
            let planted = generator.community_of(members[0]);
            assert_eq!(members.len(), 6);
            assert!(members.iter().all(|&v| generator.community_of(v) == planted));
        }
    }

    #[test]
    fn test_labels_closed_over_vertex_ids() {
        // Cliques of 5 plus the bridged triangles, shifted to ids 100..106.
        let mut edges = PlantedPartition::new(3, 5, 1.0, 0.0, 3).generate().unwrap().1;
        edges.extend([(100, 101), (100, 102), (101, 102), (102, 103), (103, 104), (103, 105), (104, 105)]);
        let mut vertices = (0..15u64).collect::<Vec<_>>();
        vertices.extend(100..106u64);
        let graph = CSRGraph::from_undirected_edges(&vertices, &edges).unwrap();

        let vertex_ids = vertices.iter().copied().collect::<HashSet<_>>();
        let single = BspEngine::new(&graph, LabelPropagation, config(1)).unwrap().run().unwrap();
        let parallel = BspEngine::new(&graph, LabelPropagation, config(8)).unwrap().run().unwrap();

        assert!(single.values.iter().all(|(_, label)| vertex_ids.contains(label)));
        // Message order differs between runs, the labeling does not.
        assert_eq!(single.values, parallel.values);
        assert_eq!(single.stats.last().map(|s| s.active_after), Some(0));
    }

    #[test]
    fn test_default_generated_graph_converges() {
        let generator = PlantedPartition::default();
        let controller = LabelPropagationController::new(Arc::new(generator.build().unwrap()));

        let result = controller.run(BspConfig::default()).unwrap();
        assert_eq!(result.values.len() as u64, generator.vertex_count());
        assert_eq!(result.stats.last().map(|s| s.active_after), Some(0));
    }

    #[test]
    fn test_oscillating_graph_hits_superstep_limit() {
        // Sparse blocks with cross edges: labels keep flipping between neighbors.
        let graph = PlantedPartition::new(5, 20, 0.3, 0.02, 0).build().unwrap();
        let controller = LabelPropagationController::new(Arc::new(graph));

        let result = controller.run(BspConfig {
            max_supersteps: Some(200),
            ..config(4)
        });
        assert!(matches!(result, Err(LpError::SuperstepLimit { limit: 200 })));
    }
}
