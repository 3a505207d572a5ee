//! The tournament scheduler.
//!
//! For every setting the master generates a batch of games, hands each role
//! its own (possibly perturbed) copy, collects every agent's strategies
//! through timed units and scores all agent pairs on the unperturbed games.
//! One-shot scoring and the nemesis probes both read a single snapshot of the
//! strategy archives, so a cell is either scored and probed or neither.
//!
//! # Example
//! ```
//! use nfg_arena::tournament::agents::{SolidRock, UniformRandom};
//! use nfg_arena::tournament::{GameMaster, Player, TournamentConfig};
//!
//! let config = TournamentConfig::quick().with_num_games(3);
//! let roster: Vec<Box<dyn Player>> = vec![Box::new(UniformRandom), Box::new(SolidRock)];
//! let report = GameMaster::new(config, roster).unwrap().run().unwrap();
//! assert_eq!(report.settings[0].matrix.len(), 2);
//! ```

use std::collections::HashSet;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::games::{
    generator::mirror_id, obfuscate, obfuscate_all, Game, GameGenerator, MatrixGame,
    MixedStrategy, RandomGameGenerator,
};
use crate::solver::{compute_nemesis, expected_payoffs, ExpectedPayoffs};
use crate::tournament::config::{ConfigError, Parameters, TournamentConfig};
use crate::tournament::driver::{unit_seed, AgentHandle, DriverError, PlayerDriver, UnitTiming};
use crate::tournament::player::{Player, Role};
use crate::tournament::report::{SettingReport, TournamentReport, UnitCounts};
use crate::tournament::stats::NemesisStats;

/// Errors that stop a tournament.
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// No agents were supplied.
    #[error("the roster is empty")]
    EmptyRoster,
    /// Two agents share a name.
    #[error("agent name {0} appears more than once")]
    DuplicateAgent(String),
    /// A timed unit could not be started.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// The games of one setting, one copy per use.
#[derive(Debug, Clone)]
pub struct GameBatch {
    /// Unperturbed games used for scoring.
    pub truth: Vec<MatrixGame>,
    /// Copies handed to the row role.
    pub row: Vec<MatrixGame>,
    /// Copies handed to the column role.
    pub column: Vec<MatrixGame>,
}

impl GameBatch {
    /// Build the per-role copies of a batch.
    ///
    /// The row copy is obfuscated under each game's own identifier. With
    /// `asymmetric` set, the column copy is re-identified with
    /// [`mirror_id`] before obfuscation so it is perturbed independently;
    /// otherwise both roles share the row copy.
    pub fn prepare(truth: Vec<MatrixGame>, params: &Parameters, asymmetric: bool) -> Self {
        let mut row = truth.clone();
        obfuscate_all(&mut row, params);
        let column = if asymmetric {
            let mut column = truth.clone();
            for game in column.iter_mut() {
                let description = format!("{}2", game.description());
                game.set_id(mirror_id(game.id()));
                game.set_description(description);
                obfuscate(game, params);
            }
            column
        } else {
            row.clone()
        };
        Self { truth, row, column }
    }

    /// Number of games.
    pub fn len(&self) -> usize {
        self.truth.len()
    }

    /// True when the batch holds no game.
    pub fn is_empty(&self) -> bool {
        self.truth.is_empty()
    }

    /// The copy a role sees for game `index`.
    pub fn for_role(&self, index: usize, role: Role) -> &MatrixGame {
        match role {
            Role::Row => &self.row[index],
            Role::Column => &self.column[index],
        }
    }
}

/// Archived strategies by agent, game and role (`table[agent][game][role]`).
type StrategyTable = Vec<Vec<[Option<MixedStrategy>; 2]>>;

/// One scored match: the row agent's and column agent's expected payoffs.
#[derive(Debug, Clone, PartialEq)]
struct MatchResult {
    row_agent: usize,
    column_agent: usize,
    payoffs: [f64; 2],
    valid: bool,
}

/// Score two (possibly missing) strategies on the true game.
///
/// A missing strategy counts as invalid; invalid sides carry the `-1337`
/// sentinel into the matrix, as the legacy scoring did.
fn play_match(
    truth: &MatrixGame,
    row_agent: usize,
    column_agent: usize,
    row: Option<&MixedStrategy>,
    column: Option<&MixedStrategy>,
) -> MatchResult {
    let result = match (row, column) {
        (Some(r), Some(c)) => expected_payoffs(r, c, truth),
        (r, c) => ExpectedPayoffs::Invalid {
            row: r.map_or(true, |s| !s.is_valid()),
            column: c.map_or(true, |s| !s.is_valid()),
        },
    };
    let legacy = result.to_legacy();
    MatchResult {
        row_agent,
        column_agent,
        payoffs: [legacy[0], legacy[1]],
        valid: result.is_valid(),
    }
}

/// Add one match into the matrix and the win counter. Ties split the win.
fn update_results(matrix: &mut [Vec<f64>], wins: &mut [f64], result: &MatchResult) {
    let (r, c) = (result.row_agent, result.column_agent);
    let [row_payoff, column_payoff] = result.payoffs;
    matrix[r][c] += row_payoff;
    matrix[c][r] += column_payoff;
    if row_payoff == column_payoff {
        wins[r] += 0.5;
        wins[c] += 0.5;
    } else if row_payoff > column_payoff {
        wins[r] += 1.0;
    } else {
        wins[c] += 1.0;
    }
}

/// Payoff of every archived strategy against its nemesis on the true game.
///
/// Missing and invalid strategies contribute no sample.
fn nemesis_probes(batch: &GameBatch, strategies: &StrategyTable) -> Vec<NemesisStats> {
    strategies
        .par_iter()
        .map(|table| {
            let mut samples = Vec::with_capacity(2 * batch.len());
            for (cell, truth) in table.iter().zip(&batch.truth) {
                for role in Role::ALL {
                    let Some(strategy) = &cell[role.index()] else {
                        continue;
                    };
                    let player = role.index();
                    let nemesis = compute_nemesis(truth, player, strategy);
                    let result = match role {
                        Role::Row => expected_payoffs(strategy, &nemesis, truth),
                        Role::Column => expected_payoffs(&nemesis, strategy, truth),
                    };
                    if let Some(values) = result.valid() {
                        samples.push(values[player]);
                    }
                }
            }
            NemesisStats::from_samples(&samples)
        })
        .collect()
}

/// Two distinct mutable elements of a slice.
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

/// Round-robin tournament over a roster of agents.
pub struct GameMaster {
    config: TournamentConfig,
    agents: Vec<AgentHandle>,
    generator: Box<dyn GameGenerator>,
    show_progress: bool,
}

impl GameMaster {
    /// Create a master over a validated configuration and a roster.
    ///
    /// # Errors
    /// Fails if the configuration is invalid, the roster is empty or two
    /// agents share a name.
    pub fn new(
        config: TournamentConfig,
        roster: Vec<Box<dyn Player>>,
    ) -> Result<Self, TournamentError> {
        config.validate()?;
        if roster.is_empty() {
            return Err(TournamentError::EmptyRoster);
        }
        let mut seen = HashSet::new();
        for player in &roster {
            if !seen.insert(player.name().to_string()) {
                return Err(TournamentError::DuplicateAgent(player.name().to_string()));
            }
        }
        Ok(Self {
            config,
            agents: roster.into_iter().map(AgentHandle::new).collect(),
            generator: Box::new(RandomGameGenerator::new()),
            show_progress: false,
        })
    }

    /// Builder method: replace the game generator.
    pub fn with_generator(mut self, generator: Box<dyn GameGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Builder method: draw a progress bar per setting.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// The configuration.
    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    /// Roster handles, in roster order.
    pub fn agents(&self) -> &[AgentHandle] {
        &self.agents
    }

    /// Run every setting in order.
    pub fn run(&self) -> Result<TournamentReport, TournamentError> {
        let mut reports = Vec::with_capacity(self.config.settings.len());
        for (index, params) in self.config.settings.iter().enumerate() {
            if let Some(report) = self.run_setting(index, params)? {
                reports.push(report);
            }
        }
        Ok(TournamentReport::new(reports))
    }

    /// Run one setting.
    ///
    /// Returns `None` when the generator produced no games.
    pub fn run_setting(
        &self,
        setting_index: usize,
        params: &Parameters,
    ) -> Result<Option<SettingReport>, TournamentError> {
        log::info!("Setting {}: {}", setting_index, params.description());

        let seed = self.config.seed.wrapping_add((setting_index as u64) << 32);
        let games = self.generator.generate(self.config.num_games, params, seed);
        if games.is_empty() {
            log::warn!("could not create games for {}", params.description());
            return Ok(None);
        }
        if games.len() != self.config.num_games {
            log::warn!(
                "generator returned {} games, expected {}",
                games.len(),
                self.config.num_games
            );
        }
        let batch = GameBatch::prepare(games, params, self.config.asymmetric);

        let timing = UnitTiming::from_config(&self.config);
        let mut drivers: Vec<PlayerDriver> = self
            .agents
            .iter()
            .map(|agent| {
                agent.archive().clear();
                PlayerDriver::new(agent.clone(), timing)
            })
            .collect();

        let mut counts = UnitCounts::default();
        for driver in drivers.iter_mut() {
            counts.record(driver.initialize(params)?);
        }

        let n = self.agents.len();
        let mut matrix = vec![vec![0.0; n]; n];
        let mut wins = vec![0.0; n];

        let (results, strategies) = if params.is_repeated() {
            let results =
                self.play_repeated(&mut drivers, &batch, setting_index, params.repeat, &mut counts)?;
            (results, self.snapshot_archives(batch.len()))
        } else {
            self.play_one_shot(&mut drivers, &batch, setting_index, &mut counts)?
        };
        for result in &results {
            if !result.valid {
                counts.invalid_matches += 1;
            }
            update_results(&mut matrix, &mut wins, result);
        }
        if counts.invalid_matches > 0 {
            log::warn!(
                "{} matches scored with a missing or invalid strategy",
                counts.invalid_matches
            );
        }

        let divisor = (2 * batch.len() * params.repeat.max(1)) as f64;
        for (i, row) in matrix.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value /= divisor;
                // Self-pairs are scored from both seats in both seatings.
                if i == j && !params.is_repeated() {
                    *value /= 2.0;
                }
            }
        }

        let names = self.agents.iter().map(|a| a.name().to_string()).collect();
        let mut report = SettingReport::from_matrix(params, batch.len(), names, matrix, wins);
        for reference in &self.config.reference_agents {
            if !report.add_reference(reference) {
                log::debug!("reference agent {} is not in the roster", reference);
            }
        }
        if self.config.compute_nemesis {
            report.nemesis = Some(nemesis_probes(&batch, &strategies));
        }
        report.counts = counts;
        Ok(Some(report))
    }

    /// Copy every agent's archive into a table.
    fn snapshot_archives(&self, num_games: usize) -> StrategyTable {
        self.agents
            .iter()
            .map(|agent| {
                let archive = agent.archive();
                (0..num_games)
                    .map(|g| {
                        [
                            archive.get(g, Role::Row).cloned(),
                            archive.get(g, Role::Column).cloned(),
                        ]
                    })
                    .collect()
            })
            .collect()
    }

    /// Solve every game in both roles for every agent, then score all pairs
    /// from a snapshot of the archives.
    fn play_one_shot(
        &self,
        drivers: &mut [PlayerDriver],
        batch: &GameBatch,
        setting_index: usize,
        counts: &mut UnitCounts,
    ) -> Result<(Vec<MatchResult>, StrategyTable), TournamentError> {
        let bar = self.progress_bar((drivers.len() * batch.len()) as u64, "solving");
        let base_seed = self.config.seed;

        // Agents run side by side; each agent's own units stay sequential.
        let solved: Vec<UnitCounts> = drivers
            .par_iter_mut()
            .enumerate()
            .map(|(agent_index, driver)| -> Result<_, DriverError> {
                let mut agent_counts = UnitCounts::default();
                for game_index in 0..batch.len() {
                    for role in Role::ALL {
                        let seed = unit_seed(
                            base_seed,
                            &[
                                setting_index as u64,
                                agent_index as u64,
                                game_index as u64,
                                role.index() as u64,
                                0,
                            ],
                        );
                        let game = batch.for_role(game_index, role).clone();
                        let outcome = driver.solve(game_index, game, role, seed)?;
                        agent_counts.record(outcome.outcome);
                    }
                    bar.inc(1);
                }
                Ok(agent_counts)
            })
            .collect::<Result<Vec<_>, DriverError>>()?;
        bar.finish_and_clear();

        for agent_counts in solved {
            counts.merge(agent_counts);
        }
        let strategies = self.snapshot_archives(batch.len());

        let n = drivers.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i..n).map(move |j| (i, j)))
            .collect();
        let results: Vec<Vec<MatchResult>> = pairs
            .par_iter()
            .map(|&(i, j)| {
                let mut out = Vec::with_capacity(2 * batch.len());
                for (g, truth) in batch.truth.iter().enumerate() {
                    out.push(play_match(
                        truth,
                        i,
                        j,
                        strategies[i][g][0].as_ref(),
                        strategies[j][g][1].as_ref(),
                    ));
                    out.push(play_match(
                        truth,
                        j,
                        i,
                        strategies[j][g][0].as_ref(),
                        strategies[i][g][1].as_ref(),
                    ));
                }
                out
            })
            .collect();
        Ok((results.into_iter().flatten().collect(), strategies))
    }

    /// Play every ordered seating of distinct agents for `repeat` rounds per game.
    fn play_repeated(
        &self,
        drivers: &mut [PlayerDriver],
        batch: &GameBatch,
        setting_index: usize,
        repeat: usize,
        counts: &mut UnitCounts,
    ) -> Result<Vec<MatchResult>, TournamentError> {
        let n = drivers.len();
        let bar = self.progress_bar((n * n.saturating_sub(1) * batch.len()) as u64, "playing");
        let mut results = Vec::new();
        for p1 in 0..n {
            for p2 in (p1 + 1)..n {
                for game_index in 0..batch.len() {
                    for (row_agent, column_agent) in [(p1, p2), (p2, p1)] {
                        self.play_pairing(
                            drivers,
                            batch,
                            setting_index,
                            game_index,
                            (row_agent, column_agent),
                            repeat,
                            counts,
                            &mut results,
                        )?;
                        bar.inc(1);
                    }
                }
            }
        }
        bar.finish_and_clear();
        Ok(results)
    }

    #[allow(clippy::too_many_arguments)]
    fn play_pairing(
        &self,
        drivers: &mut [PlayerDriver],
        batch: &GameBatch,
        setting_index: usize,
        game_index: usize,
        (row_agent, column_agent): (usize, usize),
        repeat: usize,
        counts: &mut UnitCounts,
        results: &mut Vec<MatchResult>,
    ) -> Result<(), TournamentError> {
        let truth = &batch.truth[game_index];
        let (row_driver, column_driver) = pair_mut(drivers, row_agent, column_agent);
        counts.record(row_driver.reset_history()?);
        counts.record(column_driver.reset_history()?);

        for round in 0..repeat {
            let coordinates = |agent: usize, role: Role, opponent: usize| {
                unit_seed(
                    self.config.seed,
                    &[
                        setting_index as u64,
                        agent as u64,
                        game_index as u64,
                        role.index() as u64,
                        round as u64 + 1,
                        opponent as u64,
                    ],
                )
            };
            let row_solved = row_driver.solve(
                game_index,
                batch.row[game_index].clone(),
                Role::Row,
                coordinates(row_agent, Role::Row, column_agent),
            )?;
            counts.record(row_solved.outcome);
            let column_solved = column_driver.solve(
                game_index,
                batch.column[game_index].clone(),
                Role::Column,
                coordinates(column_agent, Role::Column, row_agent),
            )?;
            counts.record(column_solved.outcome);

            let result = play_match(
                truth,
                row_agent,
                column_agent,
                row_solved.strategy.as_ref(),
                column_solved.strategy.as_ref(),
            );
            if let Some(column_strategy) = &column_solved.strategy {
                counts.record(row_driver.record_result(
                    game_index,
                    column_strategy,
                    &result.payoffs,
                )?);
            }
            if let Some(row_strategy) = &row_solved.strategy {
                counts.record(column_driver.record_result(
                    game_index,
                    row_strategy,
                    &result.payoffs,
                )?);
            }
            results.push(result);
        }
        Ok(())
    }

    fn progress_bar(&self, len: u64, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message(message);
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::generator::prisoners_dilemma;
    use crate::tournament::agents::{FictitiousPlay, MaxMin, RandomMixed, SolidRock, UniformRandom};
    use crate::tournament::config::GameType;
    use rand::rngs::StdRng;

    fn config(num_games: usize) -> TournamentConfig {
        TournamentConfig::quick()
            .with_num_games(num_games)
            .with_poll_interval_ms(1)
    }

    struct FixedGames(Vec<MatrixGame>);

    impl GameGenerator for FixedGames {
        fn generate(&self, count: usize, _params: &Parameters, _seed: u64) -> Vec<MatrixGame> {
            self.0.iter().take(count).cloned().collect()
        }
    }

    #[test]
    fn test_rejects_bad_rosters() {
        let empty: Vec<Box<dyn Player>> = Vec::new();
        assert!(matches!(
            GameMaster::new(config(2), empty),
            Err(TournamentError::EmptyRoster)
        ));
        let twins: Vec<Box<dyn Player>> = vec![Box::new(MaxMin), Box::new(MaxMin)];
        assert!(matches!(
            GameMaster::new(config(2), twins),
            Err(TournamentError::DuplicateAgent(name)) if name == "MaxMin"
        ));
        let roster: Vec<Box<dyn Player>> = vec![Box::new(MaxMin)];
        assert!(matches!(
            GameMaster::new(config(0), roster),
            Err(TournamentError::Config(ConfigError::NoGames))
        ));
    }

    #[test]
    fn test_one_shot_prisoners_dilemma() {
        let roster: Vec<Box<dyn Player>> = vec![Box::new(SolidRock), Box::new(MaxMin)];
        let master = GameMaster::new(config(1), roster)
            .unwrap()
            .with_generator(Box::new(FixedGames(vec![prisoners_dilemma()])));
        let report = master.run().unwrap();
        let setting = &report.settings[0];

        // SolidRock cooperates, MaxMin defects.
        assert_eq!(setting.matrix[0][0], -1.0);
        assert_eq!(setting.matrix[1][1], -3.0);
        assert_eq!(setting.matrix[0][1], -4.0);
        assert_eq!(setting.matrix[1][0], 0.0);
        // Each self-pair seating is a tie credited twice; MaxMin wins both cross seatings.
        assert_eq!(setting.wins, vec![2.0, 4.0]);
        assert_eq!(setting.counts, UnitCounts::default());

        let nemesis = setting.nemesis.as_ref().unwrap();
        assert_eq!(nemesis[0].mean, -4.0);
        assert_eq!(nemesis[1].mean, -3.0);
    }

    #[test]
    fn test_asymmetric_batch_perturbs_roles_independently() {
        let params = Parameters::new(100, 3, 1000, 10);
        let truth = RandomGameGenerator::new().generate(2, &params, 0);
        let batch = GameBatch::prepare(truth.clone(), &params, true);
        assert_eq!(batch.truth, truth);
        assert_ne!(batch.row[0], truth[0]);
        assert_eq!(batch.column[1].id(), mirror_id(1));
        assert_ne!(batch.row[1].payoffs(&[1, 1]), batch.column[1].payoffs(&[1, 1]));

        let shared = GameBatch::prepare(truth, &params, false);
        assert_eq!(shared.row, shared.column);
    }

    #[test]
    fn test_runs_are_reproducible() {
        let make = || {
            let roster: Vec<Box<dyn Player>> =
                vec![Box::new(RandomMixed), Box::new(UniformRandom)];
            GameMaster::new(config(4).with_seed(9), roster)
                .unwrap()
                .run()
                .unwrap()
        };
        let a = make();
        let b = make();
        assert_eq!(a.settings[0].matrix, b.settings[0].matrix);
        assert_eq!(a.settings[0].wins, b.settings[0].wins);
    }

    #[test]
    fn test_repeated_play() {
        let setting = Parameters::new(100, 3, 0, 0)
            .with_repeat(3)
            .with_game_type(GameType::ZeroSum);
        let roster: Vec<Box<dyn Player>> =
            vec![Box::new(FictitiousPlay::new()), Box::new(SolidRock)];
        let master = GameMaster::new(config(2).with_settings(vec![setting]), roster).unwrap();
        let report = master.run().unwrap();
        let s = &report.settings[0];

        assert_eq!(s.matrix[0][0], 0.0);
        assert_eq!(s.matrix[1][1], 0.0);
        // Zero-sum: what one side wins the other loses.
        assert!((s.matrix[0][1] + s.matrix[1][0]).abs() < 1e-9);
        // 2 games, 2 seatings, 3 rounds.
        assert_eq!(s.wins.iter().sum::<f64>(), 12.0);
    }

    /// Returns probabilities summing to more than one.
    struct Overweight;

    impl Player for Overweight {
        fn name(&self) -> &str {
            "Overweight"
        }

        fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
            MixedStrategy::filled(game.actions_of(role.index()), 0.9)
        }
    }

    struct Sleepy(u64);

    impl Player for Sleepy {
        fn name(&self) -> &str {
            "Sleepy"
        }

        fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
            std::thread::sleep(std::time::Duration::from_millis(self.0));
            MixedStrategy::uniform(game.actions_of(role.index()))
        }
    }

    #[test]
    fn test_invalid_strategy_scores_sentinel() {
        let roster: Vec<Box<dyn Player>> = vec![Box::new(Overweight), Box::new(SolidRock)];
        let master = GameMaster::new(config(1), roster)
            .unwrap()
            .with_generator(Box::new(FixedGames(vec![prisoners_dilemma()])));
        let setting = master.run().unwrap().settings.remove(0);

        assert_eq!(setting.matrix[0][0], -1337.0);
        assert_eq!(setting.matrix[0][1], -1337.0);
        assert_eq!(setting.matrix[1][0], 0.0);
        assert_eq!(setting.matrix[1][1], -1.0);
        // Two self-pair matches and two cross matches involve the bad agent.
        assert_eq!(setting.counts.invalid_matches, 4);
        assert_eq!(setting.counts.timed_out, 0);
        assert_eq!(setting.wins, vec![2.0, 4.0]);
        assert_eq!(setting.nemesis.as_ref().unwrap()[0].probes, 0);
    }

    #[test]
    fn test_timed_out_agent_is_missing_everywhere() {
        let roster: Vec<Box<dyn Player>> = vec![Box::new(Sleepy(500)), Box::new(SolidRock)];
        let master = GameMaster::new(
            config(2).with_time_limit_ms(20).with_asymmetric(false),
            roster,
        )
        .unwrap()
        .with_generator(Box::new(FixedGames(vec![
            prisoners_dilemma(),
            prisoners_dilemma().with_id(1),
        ])));
        let setting = master.run().unwrap().settings.remove(0);

        // The first unit times out; the other three are skipped while it runs.
        assert_eq!(setting.counts.timed_out, 4);
        assert_eq!(setting.counts.invalid_matches, 8);
        assert_eq!(setting.matrix[0][1], -1337.0);
        assert_eq!(setting.matrix[1][0], 0.0);
        assert_eq!(setting.matrix[1][1], -1.0);

        let nemesis = setting.nemesis.as_ref().unwrap();
        assert_eq!(nemesis[0].probes, 0);
        assert_eq!(nemesis[1].probes, 4);
    }

    #[test]
    fn test_reference_payoffs_follow_matrix_columns() {
        let roster: Vec<Box<dyn Player>> = vec![Box::new(UniformRandom), Box::new(MaxMin)];
        let master = GameMaster::new(
            config(1).with_reference_agents(vec!["UniformRandom".to_string(), "Absent".to_string()]),
            roster,
        )
        .unwrap()
        .with_generator(Box::new(FixedGames(vec![prisoners_dilemma()])));
        let setting = master.run().unwrap().settings.remove(0);

        assert_eq!(setting.payoff_vs.len(), 1);
        let vs_uniform = &setting.payoff_vs[0];
        assert_eq!(vs_uniform.reference, "UniformRandom");
        assert_eq!(vs_uniform.payoffs, vec![setting.matrix[0][0], setting.matrix[1][0]]);
        // Defecting against a uniform opponent in the prisoner's dilemma.
        assert_eq!(vs_uniform.payoffs[1], -1.5);
    }

    #[test]
    fn test_pair_mut() {
        let mut v = vec![1, 2, 3];
        let (a, b) = pair_mut(&mut v, 2, 0);
        std::mem::swap(a, b);
        assert_eq!(v, vec![3, 2, 1]);
    }
}
