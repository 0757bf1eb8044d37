//! Monte-Carlo tree search over pocket cube states, guided by a value/policy
//! oracle, with a breadth-first fallback over the explored tree.

pub mod config;
pub mod engine;
pub mod fallback;
pub mod oracle;
pub mod tree;

pub use config::MctsConfig;
pub use engine::{Mcts, SearchError, SearchStats};
pub use fallback::shortest_path;
pub use oracle::{Oracle, OracleContractError, OracleOutput, UniformOracle};
pub use tree::{NodeId, SearchNode, SearchTree};

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}
