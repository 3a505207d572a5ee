//! # NFG Arena
//!
//! Strategy algebra for finite normal-form games and a round-robin tournament
//! engine that pits strategy-computing agents against each other.
//!
//! ## Features
//!
//! - **Games**: dense n-player payoff storage, profile enumeration and
//!   random two-player game generation with payoff obfuscation
//! - **Strategies**: mixed strategies and joint outcome distributions
//! - **Solvers**: best and quantal responses, security strategies and the
//!   regret-based robust/adversary heuristics
//! - **Tournaments**: timed agent execution, pairwise scoring and summary
//!   statistics with text and JSON reports
//!
//! ## Quick Start
//!
//! ```
//! use nfg_arena::games::generator::prisoners_dilemma;
//! use nfg_arena::games::MixedStrategy;
//! use nfg_arena::solver::compute_best_response;
//!
//! let game = prisoners_dilemma();
//! let defect = MixedStrategy::pure(2, 2);
//! let response = compute_best_response(&game, 0, &defect);
//! assert_eq!(response.pure_action(), Some(2));
//! ```
//!
//! ## Modules
//!
//! - [`games`]: game representation, strategies and generation
//! - [`solver`]: pure solver functions
//! - [`tournament`]: agents, scheduling and reporting
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         GameMaster                              │
//! │  - Game batches          - Pairwise scoring                     │
//! │  - Obfuscated copies     - Statistics and reports               │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ timed units (PlayerDriver)
//!                               ▼
//!         ┌─────────────────────┼─────────────────────┐
//!         │                     │                     │
//!         ▼                     ▼                     ▼
//!    ┌─────────┐         ┌───────────┐         ┌───────────┐
//!    │ MaxMin  │         │  Robust   │         │    CH     │
//!    │ Punish  │         │ Adversary │         │   EpsNE   │
//!    └─────────┘         └───────────┘         └───────────┘
//!                               │
//!                               │ solver functions
//!                               ▼
//!                     games::{Game, MixedStrategy}
//! ```

#![warn(missing_docs)]

/// Game representation module.
///
/// Contains the game contract, dense matrix games, strategies, joint
/// distributions and the random game generator.
pub mod games;

/// Solver functions over two-player games.
pub mod solver;

/// Tournament engine module.
pub mod tournament;

// Re-export commonly used types at crate root for convenience
pub use games::{Game, MatrixGame, MixedStrategy, OutcomeDistribution};
pub use solver::ExpectedPayoffs;
pub use tournament::{GameMaster, Parameters, Player, Role, TournamentConfig};
