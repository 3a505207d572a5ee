//! Per-profile payoff record.

use serde::{Deserialize, Serialize};

/// Sentinel marking a payoff that was never set.
pub const UNSET_PAYOFF: f64 = f64::NEG_INFINITY;

/// Fixed-size vector of per-player payoffs for one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payoffs {
    values: Vec<f64>,
}

impl Payoffs {
    /// A record for `num_players` players with every value unset.
    pub fn new(num_players: usize) -> Self {
        Self {
            values: vec![UNSET_PAYOFF; num_players],
        }
    }

    /// A record holding the given values.
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }

    /// Payoff of a single player (0-based).
    pub fn get(&self, player: usize) -> f64 {
        self.values[player]
    }

    /// All payoffs.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Set a single player's payoff. Out-of-range players are ignored.
    pub fn set(&mut self, player: usize, value: f64) {
        if let Some(slot) = self.values.get_mut(player) {
            *slot = value;
        }
    }

    /// Replace all payoffs. A vector of a different length replaces the record.
    pub fn set_all(&mut self, values: &[f64]) {
        if values.len() == self.values.len() {
            self.values.copy_from_slice(values);
        } else {
            self.values = values.to_vec();
        }
    }

    /// True if every player's payoff has been set.
    pub fn is_set(&self) -> bool {
        self.values.iter().all(|&v| v != UNSET_PAYOFF)
    }
}
