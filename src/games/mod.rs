//! Finite normal-form games and the strategy algebra built on them.
//!
//! ## Conventions
//!
//! - Players are indexed from 0 (row player = 0, column player = 1).
//! - Actions are indexed from 1; action 0 is reserved and never valid.
//! - A profile is one action per player, in player order.
//!
//! ## Modules
//!
//! - [`tensor`]: dense storage keyed by 1-based index tuples
//! - [`iterator`]: enumeration of every profile of a game shape
//! - [`payoffs`]: per-profile payoff record
//! - [`game`]: the [`Game`] trait and the dense [`MatrixGame`]
//! - [`strategy`]: [`MixedStrategy`] with corrective normalization
//! - [`distribution`]: joint [`OutcomeDistribution`] over profiles
//! - [`generator`]: random game batches, obfuscation and fixture games

pub mod distribution;
pub mod game;
pub mod generator;
pub mod iterator;
pub mod payoffs;
pub mod strategy;
pub mod tensor;

pub use distribution::OutcomeDistribution;
pub use game::{Game, MatrixGame};
pub use generator::{obfuscate, obfuscate_all, GameGenerator, RandomGameGenerator};
pub use iterator::OutcomeIterator;
pub use payoffs::Payoffs;
pub use strategy::MixedStrategy;
pub use tensor::GenericTensor;
