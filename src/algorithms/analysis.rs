use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::algorithms::label_propagation::group_by_label;
use crate::types::{CSRGraph, Label};

/// Property key of the graph density.
pub const PROPERTY_KEY_DENSITY: &str = "density";

/// Property key of the summed in- and out-degrees.
pub const PROPERTY_KEY_SUM_DEGREES: &str = "sum_degrees";

/// Property key of the average degree.
pub const PROPERTY_KEY_AVERAGE_DEGREE: &str = "average_degree";

/// Property key of the average incoming degree.
pub const PROPERTY_KEY_AVERAGE_INCOMING_DEGREE: &str = "average_incoming_degree";

/// Property key of the average outgoing degree.
pub const PROPERTY_KEY_AVERAGE_OUTGOING_DEGREE: &str = "average_outgoing_degree";

/// Degree statistics of a directed vertex/edge store.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStatistics {
    pub vertex_count: u64,
    pub edge_count: u64,
    /// `|E| / (|V| * (|V| - 1))`, `0.0` with fewer than two vertices.
    pub density: f64,
    /// Sum of in- and out-degrees over all vertices, i.e. `2 * |E|`.
    pub sum_degrees: u64,
    pub average_degree: f64,
    pub average_incoming_degree: f64,
    pub average_outgoing_degree: f64,
    pub max_incoming_degree: u64,
    pub max_outgoing_degree: u64,
}

impl GraphStatistics {
    pub fn of(graph: &CSRGraph) -> Self {
        let vertex_count = graph.vertex_count;
        let edge_count = graph.edge_count;

        let mut in_degrees = FxHashMap::<u64, u64>::default();
        let mut max_outgoing_degree = 0u64;
        for slot in 0..vertex_count as usize {
            max_outgoing_degree = max_outgoing_degree.max(graph.out_degree(slot) as u64);
            for &neighbor in graph.neighbors(slot) {
                *in_degrees.entry(neighbor).or_default() += 1;
            }
        }
        let max_incoming_degree = in_degrees.values().copied().max().unwrap_or(0);

        let per_vertex = |total: u64| {
            if vertex_count == 0 {
                0.0
            } else {
                total as f64 / vertex_count as f64
            }
        };
        let density = if vertex_count < 2 {
            0.0
        } else {
            edge_count as f64 / (vertex_count as f64 * (vertex_count - 1) as f64)
        };

        Self {
            vertex_count,
            edge_count,
            density,
            sum_degrees: 2 * edge_count,
            average_degree: per_vertex(2 * edge_count),
            average_incoming_degree: per_vertex(edge_count),
            average_outgoing_degree: per_vertex(edge_count),
            max_incoming_degree,
            max_outgoing_degree,
        }
    }

    /// The statistics as named properties.
    pub fn to_properties(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            (PROPERTY_KEY_DENSITY, self.density),
            (PROPERTY_KEY_SUM_DEGREES, self.sum_degrees as f64),
            (PROPERTY_KEY_AVERAGE_DEGREE, self.average_degree),
            (PROPERTY_KEY_AVERAGE_INCOMING_DEGREE, self.average_incoming_degree),
            (PROPERTY_KEY_AVERAGE_OUTGOING_DEGREE, self.average_outgoing_degree),
        ])
    }
}

/// Shape of a labeling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunitySummary {
    pub community_count: u64,
    /// `(label, size)` of the largest community, smallest label on ties.
    pub largest: Option<(Label, u64)>,
    pub singleton_count: u64,
}

impl CommunitySummary {
    pub fn of(values: &[(u64, Label)]) -> Self {
        let groups = group_by_label(values);
        let mut largest: Option<(Label, u64)> = None;
        let mut singleton_count = 0u64;
        for (&label, members) in &groups {
            let size = members.len() as u64;
            if size == 1 {
                singleton_count += 1;
            }
            if largest.map_or(true, |(_, best)| size > best) {
                largest = Some((label, size));
            }
        }
        Self {
            community_count: groups.len() as u64,
            largest,
            singleton_count,
        }
    }
}
