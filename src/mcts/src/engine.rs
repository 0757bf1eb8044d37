use crate::{
    config::MctsConfig,
    fallback,
    oracle::{Oracle, OracleContractError},
    start, success,
    tree::{NodeId, SearchTree, TreeFull},
    working,
};
use fxhash::FxHashMap;
use itertools::Itertools;
use log::{debug, info, trace};
use pocket_core::{ACTION_COUNT, Action, CubeState};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Oracle broke its contract: {0}")]
    OracleContract(#[from] OracleContractError),
    #[error(
        "Search budget exhausted after {iterations} iterations in {:.3}s",
        .elapsed.as_secs_f64()
    )]
    Timeout { iterations: u64, elapsed: Duration },
    #[error("Search cancelled after {iterations} iterations")]
    Cancelled { iterations: u64 },
    #[error("Search tree reached its limit of {0} nodes")]
    TreeFull(usize),
    #[error("Invalid search configuration: {msg}")]
    InvalidConfig { msg: &'static str },
}

/// Counters accumulated over the lifetime of a search.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchStats {
    pub iterations: u64,
    pub oracle_calls: u64,
    pub evaluated_states: u64,
    pub elapsed: Duration,
}

/// A root-to-leaf descent, each edge carrying one virtual loss until it is
/// backed up or released.
#[derive(Debug)]
struct SelectedPath {
    edges: Vec<(NodeId, Action)>,
    leaf: NodeId,
}

/// Monte-Carlo tree search from a fixed root toward any solved state.
///
/// The tree persists across calls, so a search that ran out of budget can be
/// resumed by calling [`Mcts::solve`] again.
pub struct Mcts<O: Oracle> {
    config: MctsConfig,
    oracle: O,
    root: CubeState,
    tree: SearchTree,
    rng: fastrand::Rng,
    stats: SearchStats,
    cancelled: Arc<AtomicBool>,
}

impl<O: Oracle> Mcts<O> {
    /// # Errors
    ///
    /// `SearchError::InvalidConfig` if `config` does not validate.
    pub fn new(root: CubeState, oracle: O, config: MctsConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Ok(Self {
            tree: SearchTree::new().with_max_nodes(config.max_nodes),
            config,
            oracle,
            root,
            rng,
            stats: SearchStats::default(),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn root(&self) -> &CubeState {
        &self.root
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Replace the configuration, typically to extend the budget before
    /// resuming. The tree and its statistics are kept.
    ///
    /// # Errors
    ///
    /// `SearchError::InvalidConfig` if `config` does not validate.
    pub fn set_config(&mut self, config: MctsConfig) -> Result<(), SearchError> {
        config.validate()?;
        self.tree = std::mem::take(&mut self.tree).with_max_nodes(config.max_nodes);
        self.config = config;
        Ok(())
    }

    /// A flag that, once set, makes [`Mcts::solve`] stop before its next
    /// iteration. Clear it again to resume.
    pub fn cancellation_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Run iterations until one reaches a solved state.
    ///
    /// # Errors
    ///
    /// Budget exhaustion, cancellation, a full tree, or a malformed oracle
    /// response. The tree is left consistent in every case, so the search may
    /// be resumed. See `SearchError`.
    pub fn solve(&mut self) -> Result<Vec<Action>, SearchError> {
        info!(start!("Searching for a solution from {}"), self.root);
        let start = Instant::now();
        let result = self.run(start);
        self.stats.elapsed += start.elapsed();
        match &result {
            Ok(path) => info!(
                success!("Found a solution of length {} in {:.3}s ({} nodes, {} oracle calls)"),
                path.len(),
                start.elapsed().as_secs_f64(),
                self.tree.len(),
                self.stats.oracle_calls,
            ),
            Err(err) => info!("Search stopped: {err}"),
        }
        result
    }

    fn run(&mut self, start: Instant) -> Result<Vec<Action>, SearchError> {
        if self.root.is_solved() {
            return Ok(vec![]);
        }
        let mut iterations = 0;
        loop {
            if self.cancelled.load(Ordering::Relaxed) {
                return Err(SearchError::Cancelled { iterations });
            }
            let elapsed = start.elapsed();
            if self
                .config
                .max_iterations
                .is_some_and(|max| iterations >= max)
                || self.config.time_limit().is_some_and(|limit| elapsed >= limit)
            {
                return Err(SearchError::Timeout {
                    iterations,
                    elapsed,
                });
            }

            let found = self.search()?;
            iterations += 1;
            if iterations % 1000 == 0 {
                debug!(
                    working!("Ran {} iterations, {} nodes, {} expanded, {:.3}s"),
                    iterations,
                    self.tree.len(),
                    self.tree.expanded_count(),
                    start.elapsed().as_secs_f64()
                );
            }
            if let Some(path) = found {
                return Ok(path);
            }
        }
    }

    /// Run a single iteration: select `leaves_per_iteration` paths, expand
    /// their leaves with one oracle call, then back every path up. Returns the
    /// solution if an expanded leaf has a solved child.
    ///
    /// # Errors
    ///
    /// `SearchError::TreeFull` or `SearchError::OracleContract`. Either way the
    /// tree is left as it was and the iteration is not counted.
    pub fn search(&mut self) -> Result<Option<Vec<Action>>, SearchError> {
        if self.root.is_solved() {
            return Ok(Some(vec![]));
        }

        let mut paths = Vec::with_capacity(self.config.leaves_per_iteration);
        for _ in 0..self.config.leaves_per_iteration {
            match self.select() {
                Ok(path) => paths.push(path),
                Err(TreeFull(limit)) => {
                    paths.iter().for_each(|path| self.release(path));
                    return Err(SearchError::TreeFull(limit));
                }
            }
        }

        // Paths that met at the same leaf share its evaluation
        let mut rows = FxHashMap::default();
        let mut leaves = vec![];
        let path_rows = paths
            .iter()
            .map(|path| {
                *rows.entry(path.leaf).or_insert_with(|| {
                    leaves.push(path.leaf);
                    leaves.len() - 1
                })
            })
            .collect_vec();

        let batch = leaves
            .iter()
            .map(|&id| self.tree.node(id).state().encode())
            .collect_vec();
        let output = self.oracle.evaluate(&batch);
        self.stats.oracle_calls += 1;
        self.stats.evaluated_states += batch.len() as u64;
        if let Err(err) = output.validate(batch.len(), self.config.policy_tolerance) {
            paths.iter().for_each(|path| self.release(path));
            return Err(err.into());
        }

        let winners = leaves
            .iter()
            .enumerate()
            .map(|(row, &id)| {
                let (children, solved) = self.tree.node(id).state().explore();
                let priors = output.policy_row(row);
                self.tree.record_edges(id, children);
                self.tree.set_priors(id, priors);
                // Several children can be solved up to a whole-cube rotation
                Action::ALL
                    .into_iter()
                    .filter(|action| solved[action.index()])
                    .fold(None, |best: Option<Action>, action| match best {
                        Some(best) if priors[best.index()] >= priors[action.index()] => {
                            Some(best)
                        }
                        _ => Some(action),
                    })
            })
            .collect_vec();

        let mut solution = None;
        for (path, row) in paths.iter().zip(path_rows) {
            if solution.is_none()
                && let Some(winner) = winners[row]
            {
                solution = Some(
                    path.edges
                        .iter()
                        .map(|&(_, action)| action)
                        .chain([winner])
                        .collect_vec(),
                );
            }
            self.backup(path, output.values[row]);
        }
        self.stats.iterations += 1;
        Ok(solution)
    }

    /// The shortest solution through edges the search has already expanded,
    /// found without consulting the oracle.
    pub fn shortest_known_solution(&self) -> Option<Vec<Action>> {
        fallback::shortest_path(&self.tree, &self.root, self.config.fallback_batch_size)
    }

    fn select(&mut self) -> Result<SelectedPath, TreeFull> {
        let mut edges = vec![];
        let mut id = self.tree.get_or_create(&self.root)?;
        while let Some(children) = self.tree.node(id).children().copied() {
            let action = self.choose_action(id);
            self.tree
                .add_virtual_loss(id, action, self.config.virtual_loss);
            edges.push((id, action));
            let child = &children[action.index()];
            trace!("Selected {action} toward {child}");
            match self.tree.get_or_create(child) {
                Ok(child_id) => id = child_id,
                Err(full) => {
                    self.release(&SelectedPath { edges, leaf: id });
                    return Err(full);
                }
            }
        }
        Ok(SelectedPath { edges, leaf: id })
    }

    // Visit counts stay far below 2^24, where the conversion becomes lossy
    #[allow(clippy::cast_precision_loss)]
    fn choose_action(&mut self, id: NodeId) -> Action {
        let node = self.tree.node(id);
        let sqrt_total = (node.total_visits() as f32).sqrt();
        if sqrt_total < self.config.epsilon {
            return Action::ALL[self.rng.usize(..ACTION_COUNT)];
        }

        let mut best = Action::ALL[0];
        let mut best_score = f32::NEG_INFINITY;
        for action in Action::ALL {
            let i = action.index();
            let exploration = self.config.exploration_constant * sqrt_total
                / (1.0 + node.visit_count()[i] as f32)
                * node.prior_probability()[i];
            let exploitation = node.max_action_value()[i] - node.virtual_loss()[i];
            let score = exploration + exploitation;
            if score > best_score {
                best = action;
                best_score = score;
            }
        }
        best
    }

    fn backup(&mut self, path: &SelectedPath, value: f32) {
        for &(id, action) in path.edges.iter().rev() {
            self.tree
                .backup_edge(id, action, value, self.config.virtual_loss);
        }
    }

    fn release(&mut self, path: &SelectedPath) {
        for &(id, action) in &path.edges {
            self.tree
                .add_virtual_loss(id, action, -self.config.virtual_loss);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{OracleOutput, UniformOracle};
    use pocket_core::Encoding;

    #[test]
    fn invalid_config_is_rejected() {
        let config = MctsConfig::default().with_leaves_per_iteration(0);
        assert!(matches!(
            Mcts::new(CubeState::SOLVED, UniformOracle, config),
            Err(SearchError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn ties_go_to_the_lowest_index() {
        let root = CubeState::SOLVED.apply(Action::U).apply(Action::R);
        let mut mcts = Mcts::new(root, UniformOracle, MctsConfig::default().with_seed(3)).unwrap();
        mcts.search().unwrap();
        // Give the root a visit so selection stops being random
        let id = mcts.tree.id(&root).unwrap();
        mcts.tree.backup_edge(id, Action::D, 0.0, 0.0);
        assert_eq!(mcts.choose_action(id), Action::R);
    }

    #[test]
    fn priors_steer_selection() {
        let root = CubeState::SOLVED.apply(Action::F).apply(Action::U);
        let oracle = |batch: &[Encoding]| {
            let mut policy = vec![0.0; ACTION_COUNT];
            policy[Action::BPrime.index()] = 1.0;
            OracleOutput {
                policies: vec![policy; batch.len()],
                values: vec![0.0; batch.len()],
            }
        };
        let mut mcts = Mcts::new(root, oracle, MctsConfig::default().with_seed(5)).unwrap();
        mcts.search().unwrap();
        let id = mcts.tree.id(&root).unwrap();
        mcts.tree.backup_edge(id, Action::L, 0.0, 0.0);
        assert_eq!(mcts.choose_action(id), Action::BPrime);
    }

    #[test]
    fn failed_selection_releases_virtual_loss() {
        let root = CubeState::SOLVED.apply(Action::R).apply(Action::U);
        let config = MctsConfig::default().with_seed(1).with_max_nodes(1);
        let mut mcts = Mcts::new(root, UniformOracle, config).unwrap();
        assert_eq!(mcts.search().unwrap(), None);
        assert!(matches!(mcts.search(), Err(SearchError::TreeFull(1))));

        let node = mcts.tree.get(&root).unwrap();
        assert_eq!(node.virtual_loss(), &[0.0; ACTION_COUNT]);
        assert_eq!(node.total_visits(), 0);
        assert_eq!(mcts.stats().iterations, 1);
    }

    #[test]
    fn unbounded_time_limit_searches() {
        let root = CubeState::SOLVED.apply(Action::U).apply(Action::R);
        let config = MctsConfig::default()
            .with_seed(2)
            .with_time_limit(Duration::MAX);
        let mut mcts = Mcts::new(root, UniformOracle, config).unwrap();
        let path = mcts.solve().unwrap();
        assert!(root.apply_all(&path).is_solved());

        let config = MctsConfig {
            time_limit_secs: Some(1e30),
            ..MctsConfig::default().with_seed(2)
        };
        let mut mcts = Mcts::new(root, UniformOracle, config).unwrap();
        assert!(mcts.solve().is_ok());
    }
}
