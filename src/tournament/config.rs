//! Configuration for game generation and tournament runs.
//!
//! [`Parameters`] describes one tournament setting (how games are generated and
//! perturbed). [`TournamentConfig`] bundles the settings with the scheduler's
//! knobs and is passed by value into [`GameMaster`](crate::tournament::GameMaster);
//! nothing here is global or mutated after construction.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Family of randomly generated games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameType {
    /// Column payoff is the negation of the row payoff.
    ZeroSum,
    /// Both payoffs drawn independently.
    GeneralSum,
    /// Higher-numbered actions trade expected value for variance.
    Risk,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameType::ZeroSum => "ZERO_SUM",
            GameType::GeneralSum => "GENERAL_SUM",
            GameType::Risk => "RISK",
        };
        f.write_str(name)
    }
}

/// Generation and play parameters for one tournament setting.
///
/// Agents receive their own clone in [`Player::initialize`](crate::tournament::Player::initialize).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Payoff scale of generated games.
    pub max_payoff: u32,
    /// Actions per player.
    pub num_actions: usize,
    /// Number of profiles whose payoffs are perturbed.
    pub outcome_uncertainty: usize,
    /// Maximum amount subtracted from a perturbed payoff.
    pub payoff_uncertainty: u32,
    /// Rounds per pairing; 0 means one-shot play.
    pub repeat: usize,
    /// Game family.
    pub game_type: GameType,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            max_payoff: 100,
            num_actions: 10,
            outcome_uncertainty: 0,
            payoff_uncertainty: 0,
            repeat: 0,
            game_type: GameType::GeneralSum,
        }
    }
}

impl Parameters {
    /// One-shot general-sum setting with the given scale and uncertainty.
    ///
    /// # Arguments
    /// * `max_payoff` - Payoff scale
    /// * `num_actions` - Actions per player
    /// * `outcome_uncertainty` - Profiles to perturb
    /// * `payoff_uncertainty` - Perturbation magnitude
    pub fn new(
        max_payoff: u32,
        num_actions: usize,
        outcome_uncertainty: usize,
        payoff_uncertainty: u32,
    ) -> Self {
        Self {
            max_payoff,
            num_actions,
            outcome_uncertainty,
            payoff_uncertainty,
            ..Default::default()
        }
    }

    /// Builder method: set the number of repeated rounds.
    pub fn with_repeat(mut self, repeat: usize) -> Self {
        self.repeat = repeat;
        self
    }

    /// Builder method: set the game family.
    pub fn with_game_type(mut self, game_type: GameType) -> Self {
        self.game_type = game_type;
        self
    }

    /// True when agents play several rounds per pairing.
    pub fn is_repeated(&self) -> bool {
        self.repeat > 0
    }

    /// Deterministic human-readable summary of every field.
    pub fn description(&self) -> String {
        format!(
            "{} max={} actions={} outcomes={} payoff={} repeat={}",
            self.game_type,
            self.max_payoff,
            self.num_actions,
            self.outcome_uncertainty,
            self.payoff_uncertainty,
            self.repeat
        )
    }
}

/// Scheduler configuration for a full tournament.
///
/// # Example
/// ```
/// use nfg_arena::tournament::TournamentConfig;
///
/// let config = TournamentConfig::quick().with_num_games(5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Games generated per setting.
    pub num_games: usize,

    /// Ceiling on the wait for one timed agent operation, in milliseconds.
    ///
    /// Agents reporting `is_override` are waited on without a ceiling.
    pub time_limit_ms: u64,

    /// Polling step of the bounded wait, in milliseconds.
    pub poll_interval_ms: u64,

    /// Solve the column role on an independently perturbed second copy of each game.
    pub asymmetric: bool,

    /// Base seed for per-unit agent randomness and game generation.
    pub seed: u64,

    /// Probe every agent's strategies against their nemesis after scoring.
    pub compute_nemesis: bool,

    /// Agents whose matrix column is reported as "payoff vs" for every agent.
    ///
    /// Names absent from the roster are skipped.
    #[serde(default = "default_reference_agents")]
    pub reference_agents: Vec<String>,

    /// Settings run in order.
    pub settings: Vec<Parameters>,
}

fn default_reference_agents() -> Vec<String> {
    vec!["UniformRandom".to_string(), "EpsNE".to_string()]
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            num_games: 300,
            time_limit_ms: 1000,
            poll_interval_ms: 10,
            asymmetric: true,
            seed: 0,
            compute_nemesis: true,
            reference_agents: default_reference_agents(),
            settings: Self::uncertainty_sweep(100, 3),
        }
    }
}

impl TournamentConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Small configuration for development and tests: few games, one setting.
    pub fn quick() -> Self {
        Self {
            num_games: 20,
            time_limit_ms: 500,
            settings: vec![Parameters::new(100, 3, 0, 0)],
            ..Default::default()
        }
    }

    /// General-sum settings with all profiles perturbed by increasing magnitudes.
    ///
    /// Produces six settings: no uncertainty, then magnitudes 5 through 25.
    pub fn uncertainty_sweep(max_payoff: u32, num_actions: usize) -> Vec<Parameters> {
        let mut settings = vec![Parameters::new(max_payoff, num_actions, 0, 0)];
        for magnitude in [5, 10, 15, 20, 25] {
            settings.push(Parameters::new(max_payoff, num_actions, 1000, magnitude));
        }
        settings
    }

    /// Builder method: set the number of games per setting.
    pub fn with_num_games(mut self, num_games: usize) -> Self {
        self.num_games = num_games;
        self
    }

    /// Builder method: set the timed-unit ceiling.
    pub fn with_time_limit_ms(mut self, time_limit_ms: u64) -> Self {
        self.time_limit_ms = time_limit_ms;
        self
    }

    /// Builder method: set the polling step.
    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Builder method: enable or disable asymmetric role copies.
    pub fn with_asymmetric(mut self, asymmetric: bool) -> Self {
        self.asymmetric = asymmetric;
        self
    }

    /// Builder method: set the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method: enable or disable nemesis probes.
    pub fn with_nemesis(mut self, enable: bool) -> Self {
        self.compute_nemesis = enable;
        self
    }

    /// Builder method: replace the reference agents.
    pub fn with_reference_agents(mut self, names: Vec<String>) -> Self {
        self.reference_agents = names;
        self
    }

    /// Builder method: replace the settings.
    pub fn with_settings(mut self, settings: Vec<Parameters>) -> Self {
        self.settings = settings;
        self
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_games == 0 {
            return Err(ConfigError::NoGames);
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.poll_interval_ms > self.time_limit_ms {
            return Err(ConfigError::PollExceedsLimit {
                poll: self.poll_interval_ms,
                limit: self.time_limit_ms,
            });
        }
        if self.settings.is_empty() {
            return Err(ConfigError::NoSettings);
        }
        for (index, setting) in self.settings.iter().enumerate() {
            if setting.num_actions == 0 {
                return Err(ConfigError::InvalidSetting {
                    index,
                    reason: "num_actions must be at least 1",
                });
            }
            if setting.max_payoff == 0 {
                return Err(ConfigError::InvalidSetting {
                    index,
                    reason: "max_payoff must be positive",
                });
            }
        }
        Ok(())
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Errors that can occur when loading or validating tournament configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `num_games` is zero.
    #[error("num_games must be positive")]
    NoGames,
    /// `poll_interval_ms` is zero.
    #[error("poll_interval_ms must be positive")]
    ZeroPollInterval,
    /// The polling step is longer than the ceiling.
    #[error("poll interval {poll}ms exceeds time limit {limit}ms")]
    PollExceedsLimit {
        /// Configured polling step.
        poll: u64,
        /// Configured ceiling.
        limit: u64,
    },
    /// No settings to run.
    #[error("at least one setting is required")]
    NoSettings,
    /// A setting failed validation.
    #[error("setting {index}: {reason}")]
    InvalidSetting {
        /// Position of the setting.
        index: usize,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// Reading the configuration file failed.
    #[error("config I/O: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration is not valid JSON for this schema.
    #[error("config JSON: {0}")]
    Json(#[from] serde_json::Error),
}
