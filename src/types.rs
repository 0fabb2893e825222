use std::collections::BTreeMap;
use std::ops::Range;

use rustc_hash::FxHashMap;

use crate::error::LpError;
use crate::types::graph_query::GraphQuery;

pub mod graph_serialize;
pub mod graph_query;

/// Community label carried by a vertex. Labels are drawn from the vertex id space.
pub type Label = u64;

/// A CSR (Compressed Sparse Row) vertex/edge store over arbitrary `u64` vertex ids.
///
/// Vertices are kept in slots `0..vertex_count`. The BSP engine addresses its
/// vertex arena by slot, so every neighbor id is resolved to its slot once,
/// when the store is built, and never again during a job.
///
/// The store is immutable after construction.
#[derive(Debug, Clone)]
pub struct CSRGraph {
    /// Total number of vertices in the graph
    pub vertex_count: u64,

    /// Total number of directed edges after per-vertex deduplication
    pub edge_count: u64,

    /// `(vertex_id, offset)` per slot; the neighbors of slot `i` live in
    /// `neighbor_list[vertex_list[i].1..vertex_list[i + 1].1]`
    vertex_list: Vec<(u64, u64)>,

    /// Flattened, per-vertex sorted adjacency lists (vertex ids)
    neighbor_list: Vec<u64>,

    /// Same layout as `neighbor_list`, holding slots instead of ids
    neighbor_slots: Vec<usize>,

    /// Maps vertex ids to their slot
    vertex_index: FxHashMap<u64, usize>,
}

impl CSRGraph {
    /// Builds a directed store from a vertex list and an edge list.
    ///
    /// Vertices keep the order in which they are given. Neighbor lists are sets:
    /// they are sorted and repeated edges between the same pair collapse into one.
    ///
    /// # Errors
    ///
    /// * [`LpError::DuplicateVertex`] if a vertex id is listed twice.
    /// * [`LpError::UnknownVertex`] if an edge endpoint is not in `vertices`.
    pub fn from_edges(vertices: &[u64], edges: &[(u64, u64)]) -> Result<Self, LpError> {
        // Step 1. Assign slots.
        let mut vertex_index =
            FxHashMap::<u64, usize>::with_capacity_and_hasher(vertices.len(), Default::default());
        for (slot, &vertex_id) in vertices.iter().enumerate() {
            if vertex_index.insert(vertex_id, slot).is_some() {
                return Err(LpError::DuplicateVertex { vertex_id });
            }
        }

        // Step 2. Bucket edges by source slot.
        let mut adjacency = vec![Vec::<(u64, usize)>::new(); vertices.len()];
        for &(src, dst) in edges {
            let src_slot = *vertex_index
                .get(&src)
                .ok_or(LpError::UnknownVertex { vertex_id: src })?;
            let dst_slot = *vertex_index
                .get(&dst)
                .ok_or(LpError::UnknownVertex { vertex_id: dst })?;
            adjacency[src_slot].push((dst, dst_slot));
        }

        // Step 3. Flatten into CSR.
        let mut vertex_list = Vec::with_capacity(vertices.len());
        let mut neighbor_list = Vec::with_capacity(edges.len());
        let mut neighbor_slots = Vec::with_capacity(edges.len());
        for (slot, neighbors) in adjacency.iter_mut().enumerate() {
            neighbors.sort_unstable();
            neighbors.dedup();
            vertex_list.push((vertices[slot], neighbor_list.len() as u64));
            for &(neighbor_id, neighbor_slot) in neighbors.iter() {
                neighbor_list.push(neighbor_id);
                neighbor_slots.push(neighbor_slot);
            }
        }

        Ok(Self {
            vertex_count: vertices.len() as u64,
            edge_count: neighbor_list.len() as u64,
            vertex_list,
            neighbor_list,
            neighbor_slots,
            vertex_index,
        })
    }

    /// Builds a store where every edge is present in both directions.
    pub fn from_undirected_edges(vertices: &[u64], edges: &[(u64, u64)]) -> Result<Self, LpError> {
        let symmetric = edges
            .iter()
            .flat_map(|&(a, b)| [(a, b), (b, a)])
            .collect::<Vec<_>>();
        Self::from_edges(vertices, &symmetric)
    }

    /// Returns the slot of `vertex_id`, if the vertex exists.
    pub fn slot_of(&self, vertex_id: &u64) -> Option<usize> {
        self.vertex_index.get(vertex_id).copied()
    }

    /// Returns the id of the vertex stored at `slot`.
    ///
    /// # Panics
    /// If `slot` is out of range.
    pub fn vertex_id(&self, slot: usize) -> u64 {
        self.vertex_list[slot].0
    }

    fn neighbor_range(&self, slot: usize) -> Range<usize> {
        let start = self.vertex_list[slot].1 as usize;
        let end = match self.vertex_list.get(slot + 1) {
            Some(&(_, next_offset)) => next_offset as usize,
            None => self.neighbor_list.len(),
        };
        start..end
    }

    /// Outgoing neighbor ids of the vertex at `slot`.
    pub fn neighbors(&self, slot: usize) -> &[u64] {
        &self.neighbor_list[self.neighbor_range(slot)]
    }

    /// Outgoing neighbor slots of the vertex at `slot`.
    pub fn neighbor_slots(&self, slot: usize) -> &[usize] {
        &self.neighbor_slots[self.neighbor_range(slot)]
    }

    /// Out-degree of the vertex at `slot`.
    pub fn out_degree(&self, slot: usize) -> usize {
        self.neighbor_range(slot).len()
    }

    /// Splits the slot range into at most `count` contiguous, non-empty partitions
    /// of near-equal size. Every slot belongs to exactly one partition.
    pub fn partitions(&self, count: usize) -> Vec<Range<usize>> {
        let total = self.vertex_list.len();
        if total == 0 {
            return vec![];
        }
        let count = count.clamp(1, total);
        let base = total / count;
        let remainder = total % count;

        let mut partitions = Vec::with_capacity(count);
        let mut start = 0;
        for partition_id in 0..count {
            let len = base + usize::from(partition_id < remainder);
            partitions.push(start..start + len);
            start += len;
        }
        partitions
    }
}

impl GraphQuery<u64, u64> for CSRGraph {
    fn read_neighbor(&self, vertex_id: &u64) -> Vec<u64> {
        match self.slot_of(vertex_id) {
            None => vec![],
            Some(slot) => self.neighbors(slot).to_vec(),
        }
    }

    fn has_vertex(&self, vertex_id: &u64) -> bool {
        self.vertex_index.contains_key(vertex_id)
    }

    fn has_edge(&self, src_id: &u64, dst_id: &u64) -> bool {
        // Neighbor lists are sorted at build time.
        match self.slot_of(src_id) {
            None => false,
            Some(slot) => self.neighbors(slot).binary_search(dst_id).is_ok(),
        }
    }

    fn vertex_list(&self) -> Vec<u64> {
        self.vertex_list.iter().map(|&(vertex_id, _)| vertex_id).collect()
    }

    fn all(&self) -> BTreeMap<u64, (u64, Vec<u64>)> {
        let mut graph_map = BTreeMap::<u64, (u64, Vec<u64>)>::new();
        for slot in 0..self.vertex_list.len() {
            let vertex_id = self.vertex_id(slot);
            graph_map.insert(vertex_id, (vertex_id, self.neighbors(slot).to_vec()));
        }
        graph_map
    }
}

#[cfg(test)]
pub mod test_type {
    use crate::error::LpError;
    use crate::types::graph_query::GraphQuery;
    use crate::types::CSRGraph;

    /// Directed graph used across the tests below:
    ///
    /// 10 -> 20, 10 -> 30, 20 -> 30, 30 -> 10, 40 isolated.
    fn sample_graph() -> CSRGraph {
        CSRGraph::from_edges(
            &[10, 20, 30, 40],
            &[(10, 30), (10, 20), (20, 30), (30, 10)],
        ).unwrap()
    }

    #[test]
    fn test_read_neighbor() {
        let graph = sample_graph();
        assert_eq!(graph.read_neighbor(&10), vec![20, 30]);
        assert_eq!(graph.read_neighbor(&20), vec![30]);
        assert_eq!(graph.read_neighbor(&30), vec![10]);
        assert!(graph.read_neighbor(&40).is_empty());
        assert!(graph.read_neighbor(&99).is_empty());
    }

    #[test]
    fn test_neighbor_slots_match_ids() {
        let graph = sample_graph();
        for slot in 0..graph.vertex_count as usize {
            let resolved = graph
                .neighbor_slots(slot)
                .iter()
                .map(|&neighbor_slot| graph.vertex_id(neighbor_slot))
                .collect::<Vec<_>>();
            assert_eq!(resolved, graph.neighbors(slot));
        }
    }

    #[test]
    fn test_out_degree() {
        let graph = sample_graph();
        let degree = |id: u64| graph.out_degree(graph.slot_of(&id).unwrap());
        assert_eq!(degree(10), 2);
        assert_eq!(degree(20), 1);
        assert_eq!(degree(30), 1);
        assert_eq!(degree(40), 0);
    }

    #[test]
    fn test_vertex_and_edge_exist() {
        let graph = sample_graph();
        assert!(graph.has_vertex(&40));
        assert!(!graph.has_vertex(&41));
        assert!(graph.has_edge(&10, &30));
        assert!(!graph.has_edge(&30, &20));
        assert!(!graph.has_edge(&99, &10));
        assert_eq!(graph.vertex_list(), vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let graph = CSRGraph::from_edges(&[1, 2], &[(1, 2), (1, 2), (2, 1)]).unwrap();
        assert_eq!(graph.edge_count, 2);
        assert_eq!(graph.read_neighbor(&1), vec![2]);
    }

    #[test]
    fn test_undirected() {
        let graph = CSRGraph::from_undirected_edges(&[1, 2, 3], &[(1, 2), (2, 3)]).unwrap();
        assert_eq!(graph.edge_count, 4);
        assert_eq!(graph.read_neighbor(&2), vec![1, 3]);
        assert!(graph.has_edge(&3, &2));
    }

    #[test]
    fn test_unknown_vertex() {
        let result = CSRGraph::from_edges(&[1, 2], &[(1, 3)]);
        assert!(matches!(result, Err(LpError::UnknownVertex { vertex_id: 3 })));
    }

    #[test]
    fn test_duplicate_vertex() {
        let result = CSRGraph::from_edges(&[1, 2, 1], &[]);
        assert!(matches!(result, Err(LpError::DuplicateVertex { vertex_id: 1 })));
    }

    #[test]
    fn test_all() {
        let all = sample_graph().all();
        assert_eq!(all.len(), 4);
        assert_eq!(all[&10], (10, vec![20, 30]));
        assert_eq!(all[&40], (40, vec![]));
    }

    #[test]
    fn test_partitions_cover_all_slots() {
        let vertices = (0..10u64).collect::<Vec<_>>();
        let graph = CSRGraph::from_edges(&vertices, &[]).unwrap();

        let partitions = graph.partitions(3);
        assert_eq!(partitions, vec![0..4, 4..7, 7..10]);

        // More partitions than vertices degenerates to one slot each.
        assert_eq!(graph.partitions(32).len(), 10);
        assert_eq!(graph.partitions(0), vec![0..10]);

        let empty = CSRGraph::from_edges(&[], &[]).unwrap();
        assert!(empty.partitions(4).is_empty());
    }
}
