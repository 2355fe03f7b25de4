use serde::{Deserialize, Serialize};

/// Residual capacities at or below this value count as absent.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Traversal order of the augmenting-path search.
///
/// `Bfs` finds shortest augmenting paths (Edmonds-Karp), `Dfs` is cheaper per search but may
/// need more augmentations. Both yield the same flow value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathSearch {
    #[default]
    Bfs,
    Dfs,
}

/// Order in which push-relabel picks the next active node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    #[default]
    Fifo,
    Lifo,
}

/// Configuration shared by both max-flow solvers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Tolerance below which a residual capacity is treated as zero.
    pub epsilon: f64,
    /// Ceiling on discharges (push-relabel) or augmentations (augmenting path).
    /// `None` derives one from the network size, see [`SolverConfig::step_limit`].
    pub max_steps: Option<u64>,
    /// Traversal used to find augmenting paths.
    pub path_search: PathSearch,
    /// Active node selection for push-relabel.
    pub selection: Selection,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            max_steps: None,
            path_search: PathSearch::default(),
            selection: Selection::default(),
        }
    }
}

impl SolverConfig {
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_path_search(mut self, path_search: PathSearch) -> Self {
        self.path_search = path_search;
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Step ceiling for a network with `node_count` nodes and `edge_count` edges.
    ///
    /// Without an explicit `max_steps` this is the textbook push-relabel operation bound
    /// `4n²m + 2nm + 2n²` over the `m = 2 * edge_count` residual arcs, which also covers every
    /// Edmonds-Karp run. It saturates at `u64::MAX` but is always finite.
    pub fn step_limit(&self, node_count: usize, edge_count: usize) -> u64 {
        self.max_steps.unwrap_or_else(|| {
            let n = node_count as u64;
            let m = (edge_count as u64).saturating_mul(2);
            let n_squared = n.saturating_mul(n);
            n_squared
                .saturating_mul(m)
                .saturating_mul(4)
                .saturating_add(n.saturating_mul(m).saturating_mul(2))
                .saturating_add(n_squared.saturating_mul(2))
                .max(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{PathSearch, Selection, SolverConfig, DEFAULT_EPSILON};

    #[test]
    fn default_config() {
        let config = SolverConfig::default();
        assert!((config.epsilon - DEFAULT_EPSILON).abs() < f64::EPSILON);
        assert_eq!(None, config.max_steps);
        assert_eq!(PathSearch::Bfs, config.path_search);
        assert_eq!(Selection::Fifo, config.selection);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: SolverConfig =
            serde_json::from_str(r#"{ "path_search": "dfs", "max_steps": 100 }"#).unwrap();
        assert_eq!(PathSearch::Dfs, config.path_search);
        assert_eq!(Some(100), config.max_steps);
        assert_eq!(Selection::Fifo, config.selection);
        assert!((config.epsilon - DEFAULT_EPSILON).abs() < f64::EPSILON);
    }

    #[test]
    fn builder_setters() {
        let config = SolverConfig::default()
            .with_epsilon(1e-6)
            .with_max_steps(10)
            .with_selection(Selection::Lifo);
        assert!((config.epsilon - 1e-6).abs() < f64::EPSILON);
        assert_eq!(Some(10), config.max_steps);
        assert_eq!(Selection::Lifo, config.selection);
    }

    #[test]
    fn step_limit_is_finite_by_default() {
        let config = SolverConfig::default();
        // n = 6, m = 18: 4 * 36 * 18 + 2 * 6 * 18 + 2 * 36
        assert_eq!(2880, config.step_limit(6, 9));
        assert_eq!(1, config.step_limit(0, 0));
        assert_eq!(u64::MAX, config.step_limit(usize::MAX, usize::MAX));
        assert_eq!(7, config.with_max_steps(7).step_limit(6, 9));
    }
}
