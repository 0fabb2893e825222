use std::collections::BTreeMap;

use crate::types::graph_serialize::VertexId;

/// Read-only queries over a vertex/edge store.
///
/// # Type Parameters
///
/// * `T` - The vertex identifier type.
/// * `V` - The type returned for vertices and neighbors.
pub trait GraphQuery<T, V>
where
    T: VertexId
{
    /// Returns the outgoing neighbors of `vertex_id`, or an empty vector when
    /// the vertex is not part of the store.
    fn read_neighbor(&self, vertex_id: &T) -> Vec<V>;

    /// Checks if `vertex_id` is part of the store.
    fn has_vertex(&self, vertex_id: &T) -> bool;

    /// Checks if the directed edge `src_id -> dst_id` exists.
    fn has_edge(&self, src_id: &T, dst_id: &T) -> bool;

    /// Returns every vertex of the store.
    fn vertex_list(&self) -> Vec<V>;

    /// Maps every vertex to a tuple of itself and its outgoing neighbors.
    fn all(&self) -> BTreeMap<T, (V, Vec<V>)>;
}
