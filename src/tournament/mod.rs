//! Round-robin tournaments between strategy-computing agents.
//!
//! A [`GameMaster`] runs every [`Parameters`] setting of a
//! [`TournamentConfig`]: it generates games, collects strategies from each
//! [`Player`] through timed units ([`PlayerDriver`]), scores every pair of
//! agents and summarizes the results in a [`TournamentReport`].
//!
//! ## Modules
//!
//! - [`config`]: settings and scheduler configuration
//! - [`player`]: the agent contract and strategy archive
//! - [`agents`]: built-in agents
//! - [`driver`]: timed execution of agent operations
//! - [`master`]: the scheduler
//! - [`stats`]: summary statistics over the payoff matrix
//! - [`report`]: results and their export

pub mod agents;
pub mod config;
pub mod driver;
pub mod master;
pub mod player;
pub mod report;
pub mod stats;

pub use config::{ConfigError, GameType, Parameters, TournamentConfig};
pub use driver::{AgentHandle, DriverError, DriverState, PlayerDriver, UnitOutcome};
pub use master::{GameMaster, TournamentError};
pub use player::{Player, Role, StrategyArchive};
pub use report::{SettingReport, TournamentReport};
