//! The agent contract and per-agent strategy archive.

use std::fmt;

use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::games::{MatrixGame, MixedStrategy};
use crate::tournament::config::Parameters;

/// Seat an agent occupies in a two-player game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Player 1, choosing rows.
    Row,
    /// Player 2, choosing columns.
    Column,
}

impl Role {
    /// Both roles, row first.
    pub const ALL: [Role; 2] = [Role::Row, Role::Column];

    /// 0-based player index used by the solvers.
    pub fn index(self) -> usize {
        match self {
            Role::Row => 0,
            Role::Column => 1,
        }
    }

    /// The other seat.
    pub fn opponent(self) -> Role {
        match self {
            Role::Row => Role::Column,
            Role::Column => Role::Row,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Row => f.write_str("row"),
            Role::Column => f.write_str("column"),
        }
    }
}

/// A strategy-computing agent.
///
/// Agents are driven by the tournament through timed units, each on its own
/// thread, hence the `Send` bound. An agent is never driven concurrently with
/// itself. The game passed to [`solve`](Player::solve) is the agent's own copy
/// and may differ from the game used for scoring (payoffs may be perturbed).
pub trait Player: Send {
    /// Display name, unique within a roster.
    fn name(&self) -> &str;

    /// Called once per setting before any game is solved.
    fn initialize(&mut self, _params: &Parameters) {}

    /// Compute a strategy for `role` in `game`.
    ///
    /// # Arguments
    /// * `game` - The agent's copy of the game
    /// * `role` - Seat to solve for
    /// * `rng` - Randomness for this unit of work only
    fn solve(&mut self, game: &MatrixGame, role: Role, rng: &mut StdRng) -> MixedStrategy;

    /// Record the outcome of one round of repeated play.
    ///
    /// # Arguments
    /// * `game_index` - Index of the game within the setting's batch
    /// * `opponent` - The strategy the opponent played this round
    /// * `payoffs` - Expected payoffs of the round, row player first
    fn observe(&mut self, _game_index: usize, _opponent: &MixedStrategy, _payoffs: &[f64]) {}

    /// Forget repeated-play history before a new pairing.
    fn reset_history(&mut self) {}

    /// Wait for this agent without a time ceiling.
    fn is_override(&self) -> bool {
        false
    }
}

/// Strategies an agent produced, keyed by game index and role.
///
/// Each cell holds its own copy; storing never aliases the caller's strategy.
/// Every [`clear`](StrategyArchive::clear) starts a new epoch, so a writer that
/// captured an older epoch cannot fill a cell of the next setting.
#[derive(Debug, Clone, Default)]
pub struct StrategyArchive {
    strategies: FxHashMap<(usize, Role), MixedStrategy>,
    epoch: u64,
}

impl StrategyArchive {
    /// Empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a copy of `strategy`, replacing any earlier value for the cell.
    pub fn store(&mut self, game_index: usize, role: Role, strategy: &MixedStrategy) {
        self.strategies.insert((game_index, role), strategy.clone());
    }

    /// Store a copy of `strategy` only if the archive is still in `epoch`.
    ///
    /// # Returns
    /// `false` when the archive was cleared since `epoch` was read.
    pub fn store_in_epoch(
        &mut self,
        epoch: u64,
        game_index: usize,
        role: Role,
        strategy: &MixedStrategy,
    ) -> bool {
        if epoch != self.epoch {
            return false;
        }
        self.store(game_index, role, strategy);
        true
    }

    /// Current epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Strategy recorded for a cell, if any.
    pub fn get(&self, game_index: usize, role: Role) -> Option<&MixedStrategy> {
        self.strategies.get(&(game_index, role))
    }

    /// Number of filled cells.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// True when nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Drop every cell and start a new epoch.
    pub fn clear(&mut self) {
        self.strategies.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }
}
