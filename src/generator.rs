use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::LpError;
use crate::types::CSRGraph;

/// Defaults of the generated demo graph. Label propagation is not guaranteed
/// to reach a fixed point on every graph; these parameters produce dense,
/// well separated blocks on which it does.
pub const DEFAULT_COMMUNITIES: usize = 8;
pub const DEFAULT_COMMUNITY_SIZE: usize = 64;
pub const DEFAULT_P_IN: f64 = 0.5;
pub const DEFAULT_P_OUT: f64 = 0.001;
pub const DEFAULT_SEED: u64 = 42;

/// Seeded planted-partition random graph.
///
/// Vertices `0..communities * community_size` are split into consecutive blocks
/// of `community_size`. Every unordered pair inside a block is connected with
/// probability `p_in`, every pair across blocks with probability `p_out`.
/// The same parameters and seed always produce the same graph.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantedPartition {
    pub communities: usize,
    pub community_size: usize,
    pub p_in: f64,
    pub p_out: f64,
    pub seed: u64,
}

impl Default for PlantedPartition {
    fn default() -> Self {
        Self::new(DEFAULT_COMMUNITIES, DEFAULT_COMMUNITY_SIZE, DEFAULT_P_IN, DEFAULT_P_OUT, DEFAULT_SEED)
    }
}

impl PlantedPartition {
    pub fn new(communities: usize, community_size: usize, p_in: f64, p_out: f64, seed: u64) -> Self {
        Self {
            communities,
            community_size,
            p_in,
            p_out,
            seed,
        }
    }

    pub fn vertex_count(&self) -> u64 {
        (self.communities * self.community_size) as u64
    }

    /// Planted block of `vertex_id`.
    pub fn community_of(&self, vertex_id: u64) -> u64 {
        vertex_id / self.community_size.max(1) as u64
    }

    /// Checks the parameters before anything is generated.
    pub fn validate(&self) -> Result<(), LpError> {
        if self.communities == 0 || self.community_size == 0 {
            return Err(LpError::invalid_config("communities and community_size must be at least 1"));
        }
        for (name, p) in [("p_in", self.p_in), ("p_out", self.p_out)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(LpError::invalid_config(format!("{} must be within [0, 1], got {}", name, p)));
            }
        }
        Ok(())
    }

    /// Returns the vertex list and the undirected edge list, each edge once with `src < dst`.
    pub fn generate(&self) -> Result<(Vec<u64>, Vec<(u64, u64)>), LpError> {
        self.validate()?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let vertex_count = self.vertex_count();

        let vertices = (0..vertex_count).collect::<Vec<_>>();
        let mut edges = Vec::new();
        for src in 0..vertex_count {
            for dst in src + 1..vertex_count {
                let p = if self.community_of(src) == self.community_of(dst) {
                    self.p_in
                } else {
                    self.p_out
                };
                if rng.gen_bool(p) {
                    edges.push((src, dst));
                }
            }
        }
        Ok((vertices, edges))
    }

    /// Generates the graph into an undirected store.
    pub fn build(&self) -> Result<CSRGraph, LpError> {
        let (vertices, edges) = self.generate()?;
        CSRGraph::from_undirected_edges(&vertices, &edges)
    }
}

#[cfg(test)]
mod test_generator {
    use crate::error::LpError;
    use crate::generator::PlantedPartition;
    use crate::types::graph_query::GraphQuery;

    #[test]
    fn test_same_seed_same_graph() {
        let a = PlantedPartition::new(3, 10, 0.4, 0.05, 42).generate().unwrap();
        let b = PlantedPartition::new(3, 10, 0.4, 0.05, 42).generate().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_extreme_probabilities() {
        let generator = PlantedPartition::new(2, 4, 1.0, 0.0, 1);
        let graph = generator.build().unwrap();

        // Two K4: 2 * 4 * 3 directed edges.
        assert_eq!(graph.vertex_count, 8);
        assert_eq!(graph.edge_count, 24);
        assert!(graph.has_edge(&0, &3));
        assert!(graph.has_edge(&3, &0));
        assert!(!graph.has_edge(&3, &4));
        assert_eq!(generator.community_of(5), 1);
    }

    #[test]
    fn test_invalid_parameters() {
        let result = PlantedPartition::new(0, 4, 0.5, 0.1, 1).generate();
        assert!(matches!(result, Err(LpError::InvalidConfig { .. })));

        let result = PlantedPartition::new(2, 4, 1.5, 0.1, 1).build();
        assert!(matches!(result, Err(LpError::InvalidConfig { .. })));
    }
}
