//! Timed execution of agent operations.
//!
//! Every agent operation (setup, solve, recording a round) runs as one unit on
//! its own named thread. The scheduler then waits in `poll_interval` steps up
//! to `time_limit`; a unit that is still running after that is detached, not
//! killed. A detached solve may still archive its strategy later. The archive
//! cell belongs to that unit's `(game, role)` key alone, so the late write only
//! delays a value, it never corrupts another one; a write that arrives after
//! the archive moved on to a new setting is dropped. While a detached unit
//! still runs, later units of the same agent are skipped and reported as
//! timed out, so at most one detached thread exists per agent.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::games::{MatrixGame, MixedStrategy};
use crate::tournament::config::{Parameters, TournamentConfig};
use crate::tournament::player::{Player, Role, StrategyArchive};

/// Lifecycle state of a [`PlayerDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Agent setup has not run yet.
    Init,
    /// Ready to solve the next game or round.
    Solve,
    /// A strategy was produced; the round's result can be recorded.
    Result,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverState::Init => f.write_str("init"),
            DriverState::Solve => f.write_str("solve"),
            DriverState::Result => f.write_str("result"),
        }
    }
}

/// How a timed unit ended, from the scheduler's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Finished inside the ceiling.
    Completed,
    /// Still running when the ceiling elapsed; detached.
    TimedOut,
    /// The agent panicked.
    Failed,
}

/// Errors raised by the driver itself (never by the agent).
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The OS refused to start a worker thread.
    #[error("failed to spawn unit for agent {agent}: {source}")]
    Spawn {
        /// Agent whose unit could not start.
        agent: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Shared handle to one roster entry: the agent and its strategy archive.
///
/// Cloning is cheap and shares both.
#[derive(Clone)]
pub struct AgentHandle {
    name: Arc<str>,
    player: Arc<Mutex<Box<dyn Player>>>,
    archive: Arc<Mutex<StrategyArchive>>,
    busy: Arc<AtomicBool>,
    override_mode: bool,
}

impl AgentHandle {
    /// Wrap an agent with an empty archive.
    pub fn new(player: Box<dyn Player>) -> Self {
        let name: Arc<str> = Arc::from(player.name());
        let override_mode = player.is_override();
        Self {
            name,
            player: Arc::new(Mutex::new(player)),
            archive: Arc::new(Mutex::new(StrategyArchive::new())),
            busy: Arc::new(AtomicBool::new(false)),
            override_mode,
        }
    }

    /// Agent name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the agent is waited on without a ceiling.
    pub fn is_override(&self) -> bool {
        self.override_mode
    }

    /// True while a unit of this agent is running, detached or not.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Lock the archive. A poisoned lock is recovered: cells are written whole.
    pub fn archive(&self) -> MutexGuard<'_, StrategyArchive> {
        self.archive.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Archived strategy for a cell, if any.
    pub fn strategy(&self, game_index: usize, role: Role) -> Option<MixedStrategy> {
        self.archive().get(game_index, role).cloned()
    }
}

impl fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentHandle")
            .field("name", &self.name)
            .field("override_mode", &self.override_mode)
            .finish()
    }
}

fn lock_player(player: &Mutex<Box<dyn Player>>) -> MutexGuard<'_, Box<dyn Player>> {
    player.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Timing knobs of the bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitTiming {
    /// Ceiling on the wait.
    pub time_limit: Duration,
    /// Polling step.
    pub poll_interval: Duration,
}

impl UnitTiming {
    /// Timing taken from a tournament configuration.
    pub fn from_config(config: &TournamentConfig) -> Self {
        Self {
            time_limit: Duration::from_millis(config.time_limit_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }
}

/// Result of a solve unit.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    /// How the unit ended.
    pub outcome: UnitOutcome,
    /// The strategy, when the unit completed in time.
    pub strategy: Option<MixedStrategy>,
}

/// Drives one agent through INIT, SOLVE and RESULT.
///
/// Transitions: `initialize` moves INIT to SOLVE, `solve` moves SOLVE to
/// RESULT and `record_result` moves RESULT back to SOLVE. Timeouts and
/// failures still advance the state, so the tournament keeps going.
#[derive(Debug)]
pub struct PlayerDriver {
    agent: AgentHandle,
    state: DriverState,
    timing: UnitTiming,
}

impl PlayerDriver {
    /// New driver in the INIT state.
    pub fn new(agent: AgentHandle, timing: UnitTiming) -> Self {
        Self {
            agent,
            state: DriverState::Init,
            timing,
        }
    }

    /// Current state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// The driven agent.
    pub fn agent(&self) -> &AgentHandle {
        &self.agent
    }

    /// Run the agent's setup for a new setting.
    pub fn initialize(&mut self, params: &Parameters) -> Result<UnitOutcome, DriverError> {
        let player = Arc::clone(&self.agent.player);
        let params = params.clone();
        let (outcome, _) = self.run_unit(DriverState::Init, move || {
            lock_player(&player).initialize(&params);
        })?;
        self.state = DriverState::Solve;
        Ok(outcome)
    }

    /// Solve one game for one role and archive the strategy.
    ///
    /// # Arguments
    /// * `game_index` - Index of the game in the setting's batch
    /// * `game` - The agent's own copy
    /// * `role` - Seat to solve for
    /// * `seed` - Seed of the unit's random source
    pub fn solve(
        &mut self,
        game_index: usize,
        game: MatrixGame,
        role: Role,
        seed: u64,
    ) -> Result<SolveOutcome, DriverError> {
        if self.state == DriverState::Init {
            log::debug!(
                "{}: solve requested in state {}",
                self.agent.name(),
                self.state
            );
        }
        let player = Arc::clone(&self.agent.player);
        let archive = Arc::clone(&self.agent.archive);
        let epoch = self.agent.archive().epoch();
        let name = self.agent.name().to_string();
        let (outcome, strategy) = self.run_unit(DriverState::Solve, move || {
            let mut rng = StdRng::seed_from_u64(seed);
            let strategy = lock_player(&player).solve(&game, role, &mut rng);
            let stored = archive
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .store_in_epoch(epoch, game_index, role, &strategy);
            if !stored {
                log::debug!(
                    "{}: dropped strategy for game {} of a finished setting",
                    name,
                    game_index
                );
            }
            strategy
        })?;
        self.state = DriverState::Result;
        Ok(SolveOutcome { outcome, strategy })
    }

    /// Fold the opponent's realized strategy and the round's payoffs into the agent.
    pub fn record_result(
        &mut self,
        game_index: usize,
        opponent: &MixedStrategy,
        payoffs: &[f64],
    ) -> Result<UnitOutcome, DriverError> {
        let player = Arc::clone(&self.agent.player);
        let opponent = opponent.clone();
        let payoffs = payoffs.to_vec();
        let (outcome, _) = self.run_unit(DriverState::Result, move || {
            lock_player(&player).observe(game_index, &opponent, &payoffs);
        })?;
        self.state = DriverState::Solve;
        Ok(outcome)
    }

    /// Clear repeated-play history before a new pairing.
    pub fn reset_history(&mut self) -> Result<UnitOutcome, DriverError> {
        let player = Arc::clone(&self.agent.player);
        let (outcome, _) = self.run_unit(DriverState::Solve, move || {
            lock_player(&player).reset_history();
        })?;
        self.state = DriverState::Solve;
        Ok(outcome)
    }

    /// Start `work` on a named thread and wait for it with the bounded poll.
    fn run_unit<T, F>(
        &self,
        state: DriverState,
        work: F,
    ) -> Result<(UnitOutcome, Option<T>), DriverError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let name = self.agent.name().to_string();
        if self.agent.busy.swap(true, Ordering::AcqRel) {
            log::warn!(
                "agent {} is still running a detached unit; skipping {}",
                name,
                state
            );
            return Ok((UnitOutcome::TimedOut, None));
        }

        let (tx, rx) = mpsc::channel();
        let unit_name = name.clone();
        let busy = Arc::clone(&self.agent.busy);
        let spawned = thread::Builder::new()
            .name(format!("{}-{}", name, state))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(work));
                if result.is_err() {
                    log::error!("agent {} panicked during {}", unit_name, state);
                }
                busy.store(false, Ordering::Release);
                // The scheduler may have stopped listening.
                let _ = tx.send(result.ok());
            });
        let handle = match spawned {
            Ok(handle) => handle,
            Err(source) => {
                self.agent.busy.store(false, Ordering::Release);
                return Err(DriverError::Spawn {
                    agent: name,
                    source,
                });
            }
        };

        if self.agent.is_override() {
            let received = rx.recv().ok().flatten();
            let _ = handle.join();
            return Ok(match received {
                Some(value) => (UnitOutcome::Completed, Some(value)),
                None => (UnitOutcome::Failed, None),
            });
        }

        let start = Instant::now();
        loop {
            match rx.recv_timeout(self.timing.poll_interval) {
                Ok(Some(value)) => return Ok((UnitOutcome::Completed, Some(value))),
                Ok(None) | Err(RecvTimeoutError::Disconnected) => {
                    return Ok((UnitOutcome::Failed, None))
                }
                Err(RecvTimeoutError::Timeout) => {
                    if start.elapsed() >= self.timing.time_limit {
                        log::warn!(
                            "agent {} timed out after {:?} during {}",
                            name,
                            self.timing.time_limit,
                            state
                        );
                        return Ok((UnitOutcome::TimedOut, None));
                    }
                }
            }
        }
    }
}

/// SplitMix64 finalizer.
fn split_mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed of one unit's random source.
///
/// Mixes the base seed with the unit's coordinates (setting, agent, game,
/// role, round) so the seed depends only on what the unit computes, never on
/// thread timing.
pub fn unit_seed(base: u64, coordinates: &[u64]) -> u64 {
    coordinates
        .iter()
        .fold(split_mix(base), |acc, &c| split_mix(acc ^ c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::generator::prisoners_dilemma;
    use crate::games::Game;

    fn timing(limit_ms: u64) -> UnitTiming {
        UnitTiming {
            time_limit: Duration::from_millis(limit_ms),
            poll_interval: Duration::from_millis(5),
        }
    }

    struct FirstAction;

    impl Player for FirstAction {
        fn name(&self) -> &str {
            "First"
        }

        fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
            MixedStrategy::pure(game.actions_of(role.index()), 1)
        }
    }

    struct Sleepy(u64);

    impl Player for Sleepy {
        fn name(&self) -> &str {
            "Sleepy"
        }

        fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
            thread::sleep(Duration::from_millis(self.0));
            MixedStrategy::uniform(game.actions_of(role.index()))
        }
    }

    struct Crashy;

    impl Player for Crashy {
        fn name(&self) -> &str {
            "Crashy"
        }

        fn solve(&mut self, _game: &MatrixGame, _role: Role, _rng: &mut StdRng) -> MixedStrategy {
            panic!("agent bug");
        }
    }

    struct Patient;

    impl Player for Patient {
        fn name(&self) -> &str {
            "Patient"
        }

        fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
            thread::sleep(Duration::from_millis(60));
            MixedStrategy::pure(game.actions_of(role.index()), 2)
        }

        fn is_override(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_state_machine() {
        let handle = AgentHandle::new(Box::new(FirstAction));
        let mut driver = PlayerDriver::new(handle.clone(), timing(1000));
        assert_eq!(driver.state(), DriverState::Init);

        let out = driver.initialize(&Parameters::default()).unwrap();
        assert_eq!(out, UnitOutcome::Completed);
        assert_eq!(driver.state(), DriverState::Solve);

        let solved = driver.solve(4, prisoners_dilemma(), Role::Column, 7).unwrap();
        assert_eq!(solved.outcome, UnitOutcome::Completed);
        assert_eq!(solved.strategy, Some(MixedStrategy::pure(2, 1)));
        assert_eq!(driver.state(), DriverState::Result);
        assert_eq!(handle.strategy(4, Role::Column), Some(MixedStrategy::pure(2, 1)));

        let out = driver
            .record_result(4, &MixedStrategy::uniform(2), &[1.0, 2.0])
            .unwrap();
        assert_eq!(out, UnitOutcome::Completed);
        assert_eq!(driver.state(), DriverState::Solve);
    }

    #[test]
    fn test_timeout_detaches_and_late_write_lands() {
        let handle = AgentHandle::new(Box::new(Sleepy(150)));
        let mut driver = PlayerDriver::new(handle.clone(), timing(20));
        let solved = driver.solve(0, prisoners_dilemma(), Role::Row, 1).unwrap();
        assert_eq!(solved.outcome, UnitOutcome::TimedOut);
        assert!(solved.strategy.is_none());
        assert_eq!(driver.state(), DriverState::Result);

        thread::sleep(Duration::from_millis(400));
        assert_eq!(handle.strategy(0, Role::Row), Some(MixedStrategy::uniform(2)));
    }

    #[test]
    fn test_late_write_after_clear_is_dropped() {
        let handle = AgentHandle::new(Box::new(Sleepy(150)));
        let mut driver = PlayerDriver::new(handle.clone(), timing(20));
        let solved = driver.solve(0, prisoners_dilemma(), Role::Row, 1).unwrap();
        assert_eq!(solved.outcome, UnitOutcome::TimedOut);

        handle.archive().clear();
        thread::sleep(Duration::from_millis(400));
        assert!(handle.strategy(0, Role::Row).is_none());
    }

    struct SlowStart {
        calls: usize,
    }

    impl Player for SlowStart {
        fn name(&self) -> &str {
            "SlowStart"
        }

        fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
            self.calls += 1;
            if self.calls == 1 {
                thread::sleep(Duration::from_millis(200));
            }
            MixedStrategy::pure(game.actions_of(role.index()), 1)
        }
    }

    #[test]
    fn test_units_skipped_while_detached_unit_runs() {
        let handle = AgentHandle::new(Box::new(SlowStart { calls: 0 }));
        let mut driver = PlayerDriver::new(handle.clone(), timing(20));

        let first = driver.solve(0, prisoners_dilemma(), Role::Row, 1).unwrap();
        assert_eq!(first.outcome, UnitOutcome::TimedOut);
        assert!(handle.is_busy());

        let skipped = driver.solve(1, prisoners_dilemma(), Role::Row, 1).unwrap();
        assert_eq!(skipped.outcome, UnitOutcome::TimedOut);
        assert!(skipped.strategy.is_none());

        thread::sleep(Duration::from_millis(500));
        assert!(!handle.is_busy());
        let later = driver.solve(2, prisoners_dilemma(), Role::Row, 1).unwrap();
        assert_eq!(later.outcome, UnitOutcome::Completed);

        assert!(handle.strategy(0, Role::Row).is_some());
        assert!(handle.strategy(1, Role::Row).is_none());
        assert!(handle.strategy(2, Role::Row).is_some());
    }

    #[test]
    fn test_panic_is_contained() {
        let handle = AgentHandle::new(Box::new(Crashy));
        let mut driver = PlayerDriver::new(handle.clone(), timing(1000));
        let solved = driver.solve(0, prisoners_dilemma(), Role::Row, 1).unwrap();
        assert_eq!(solved.outcome, UnitOutcome::Failed);
        assert!(handle.strategy(0, Role::Row).is_none());

        // The poisoned agent lock is recovered on the next unit.
        let again = driver.solve(1, prisoners_dilemma(), Role::Row, 1).unwrap();
        assert_eq!(again.outcome, UnitOutcome::Failed);
    }

    #[test]
    fn test_override_waits_past_ceiling() {
        let handle = AgentHandle::new(Box::new(Patient));
        assert!(handle.is_override());
        let mut driver = PlayerDriver::new(handle, timing(10));
        let solved = driver.solve(0, prisoners_dilemma(), Role::Row, 1).unwrap();
        assert_eq!(solved.outcome, UnitOutcome::Completed);
        assert_eq!(solved.strategy, Some(MixedStrategy::pure(2, 2)));
    }

    #[test]
    fn test_unit_seed_depends_on_coordinates() {
        let a = unit_seed(0, &[0, 1, 2, 0, 0]);
        assert_eq!(a, unit_seed(0, &[0, 1, 2, 0, 0]));
        assert_ne!(a, unit_seed(0, &[0, 1, 2, 1, 0]));
        assert_ne!(a, unit_seed(1, &[0, 1, 2, 0, 0]));
    }
}
