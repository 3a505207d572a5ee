//! Built-in agents.
//!
//! Each agent is an independent [`Player`] implementation; variants that build
//! on another strategy compose the solver functions (or another agent's
//! public helper) instead of inheriting from it.

use rand::rngs::StdRng;

use crate::games::{Game, MatrixGame, MixedStrategy};
use crate::solver::{
    action_payoffs, compute_adversary_response, compute_best_response, compute_max_min,
    compute_min_max, compute_nemesis, compute_quantal_best_response, compute_robust_response,
    interpolate, logit,
};
use crate::tournament::player::{Player, Role};

/// Upper bound on how many times [`EpsNE`] doubles its tolerance.
pub const MAX_EPS_DOUBLINGS: usize = 64;

/// Plays every action with equal probability.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformRandom;

impl Player for UniformRandom {
    fn name(&self) -> &str {
        "UniformRandom"
    }

    fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
        MixedStrategy::uniform(game.actions_of(role.index()))
    }
}

/// Always plays its first action.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolidRock;

impl Player for SolidRock {
    fn name(&self) -> &str {
        "SolidRock"
    }

    fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
        MixedStrategy::pure(game.actions_of(role.index()), 1)
    }
}

/// Plays a fresh random mixture in every game.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomMixed;

impl Player for RandomMixed {
    fn name(&self) -> &str {
        "RandomMixed"
    }

    fn solve(&mut self, game: &MatrixGame, role: Role, rng: &mut StdRng) -> MixedStrategy {
        let mut strategy = MixedStrategy::uniform(game.actions_of(role.index()));
        strategy.set_random(rng);
        strategy
    }
}

/// Security strategy: best guaranteed floor.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxMin;

impl Player for MaxMin {
    fn name(&self) -> &str {
        "MaxMin"
    }

    fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
        compute_max_min(game, role.index())
    }
}

/// Minimizes the opponent's best attainable payoff.
#[derive(Debug, Clone, Copy, Default)]
pub struct Punish;

impl Player for Punish {
    fn name(&self) -> &str {
        "Punish"
    }

    fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
        compute_min_max(game, role.index())
    }
}

/// Best response to an opponent modeled as regret-averse at rationality `lambda`.
#[derive(Debug, Clone)]
pub struct Robust {
    lambda: f64,
    name: String,
}

impl Robust {
    /// Robust responder at a fixed `lambda`.
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda,
            name: format!("Rob:{:?}", lambda),
        }
    }
}

impl Player for Robust {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
        compute_robust_response(game, role.index(), self.lambda)
    }
}

/// Best response to the expected adversary at rationality `lambda`.
#[derive(Debug, Clone)]
pub struct Adversary {
    lambda: f64,
    name: String,
}

impl Adversary {
    /// Adversary responder at a fixed `lambda`.
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda,
            name: format!("Adv:{:?}", lambda),
        }
    }
}

impl Player for Adversary {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
        compute_adversary_response(game, role.index(), self.lambda)
    }
}

/// Quantal response to a uniformly random opponent.
#[derive(Debug, Clone)]
pub struct Quantal {
    lambda: f64,
    name: String,
}

impl Quantal {
    /// Quantal responder at a fixed `lambda`.
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda,
            name: format!("Quantal:{:?}", lambda),
        }
    }
}

impl Default for Quantal {
    fn default() -> Self {
        Self::new(11.0)
    }
}

impl Player for Quantal {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
        let player = role.index();
        let opponent = MixedStrategy::uniform(game.actions_of(role.opponent().index()));
        compute_quantal_best_response(game, player, &opponent, self.lambda)
    }
}

/// Cognitive hierarchy: level-k reasoning over a Poisson(τ) population.
///
/// Level 0 plays uniformly. Level `k` responds to the mixture of levels
/// `0..k` weighted by the Poisson probabilities renormalized over those
/// levels. Responses are best responses, or quantal responses at `lambda`
/// when `quantal` is set; in quantal mode the final answer is a quantal
/// response to the opponent's top level.
#[derive(Debug, Clone)]
pub struct CognitiveHierarchy {
    level: usize,
    tau: f64,
    lambda: f64,
    quantal: bool,
    name: String,
}

impl Default for CognitiveHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl CognitiveHierarchy {
    /// Best-response hierarchy: level 12, τ = 1.5.
    pub fn new() -> Self {
        Self {
            level: 12,
            tau: 1.5,
            lambda: 10.0,
            quantal: false,
            name: "CH".to_string(),
        }
    }

    /// Quantal level-k preset: level 12, τ = 1.5, λ = 10.
    pub fn quantal_level_k() -> Self {
        Self {
            quantal: true,
            name: "QLK".to_string(),
            ..Self::new()
        }
    }

    /// Builder method: set the top reasoning level.
    pub fn with_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    /// Builder method: set the Poisson mean.
    pub fn with_tau(mut self, tau: f64) -> Self {
        self.tau = tau;
        self
    }

    /// Builder method: set the quantal rationality.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Builder method: switch between best and quantal responses.
    pub fn with_quantal(mut self, quantal: bool) -> Self {
        self.quantal = quantal;
        self
    }

    /// Builder method: rename the agent.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Poisson(τ) probabilities of levels `0..level`.
    fn poisson_weights(&self) -> Vec<f64> {
        let mut weights = Vec::with_capacity(self.level);
        let mut w = (-self.tau).exp();
        for i in 0..self.level {
            if i > 0 {
                w *= self.tau / i as f64;
            }
            weights.push(w);
        }
        weights
    }

    fn respond(&self, game: &MatrixGame, player: usize, opponent: &MixedStrategy) -> MixedStrategy {
        if self.quantal {
            compute_quantal_best_response(game, player, opponent, self.lambda)
        } else {
            compute_best_response(game, player, opponent)
        }
    }

    /// Compute the hierarchy for `player` in `game`.
    pub fn solve_hierarchy(&self, game: &MatrixGame, player: usize) -> MixedStrategy {
        let opp = 1 - player;
        let actions = [game.actions_of(0), game.actions_of(1)];
        if self.level == 0 {
            return MixedStrategy::uniform(actions[player]);
        }
        let poisson = self.poisson_weights();

        // levels[k][p]: level-k strategy of player p
        let mut levels: Vec<[MixedStrategy; 2]> = Vec::with_capacity(self.level + 1);
        levels.push([
            MixedStrategy::uniform(actions[0]),
            MixedStrategy::uniform(actions[1]),
        ]);

        for k in 1..=self.level {
            let total: f64 = poisson[..k].iter().sum();
            let mut beliefs = [
                MixedStrategy::filled(actions[0], 0.0),
                MixedStrategy::filled(actions[1], 0.0),
            ];
            for (p, belief) in beliefs.iter_mut().enumerate() {
                for (i, level) in levels.iter().enumerate().take(k) {
                    let weight = poisson[i] / total;
                    for a in 1..=actions[p] {
                        belief.set_prob(a, belief.prob(a) + weight * level[p].prob(a));
                    }
                }
                if !belief.is_valid() {
                    belief.normalize();
                }
            }
            let mut next = levels[k - 1].clone();
            next[player] = self.respond(game, player, &beliefs[opp]);
            next[opp] = self.respond(game, opp, &beliefs[player]);
            levels.push(next);
        }

        let top = &levels[self.level];
        if self.quantal {
            compute_quantal_best_response(game, player, &top[opp], self.lambda)
        } else {
            top[player].clone()
        }
    }
}

impl Player for CognitiveHierarchy {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
        self.solve_hierarchy(game, role.index())
    }
}

/// Picks a pure Nash equilibrium, relaxing to ε-equilibria when none exists.
///
/// Among several candidate equilibria it takes the one paying itself the most
/// (first found on ties). Tolerance starts at 0.1 and doubles until a
/// candidate appears.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpsNE;

impl EpsNE {
    /// Equilibrium strategy for `player` in `game`.
    pub fn solve_equilibrium(game: &MatrixGame, player: usize) -> MixedStrategy {
        let rows = game.actions_of(0);
        let cols = game.actions_of(1);
        let own_actions = game.actions_of(player);

        // Best row payoff per column and best column payoff per row.
        let col_best: Vec<f64> = (1..=cols)
            .map(|c| {
                (1..=rows)
                    .map(|r| game.payoff(&[r, c], 0))
                    .fold(f64::NEG_INFINITY, f64::max)
            })
            .collect();
        let row_best: Vec<f64> = (1..=rows)
            .map(|r| {
                (1..=cols)
                    .map(|c| game.payoff(&[r, c], 1))
                    .fold(f64::NEG_INFINITY, f64::max)
            })
            .collect();

        let mut eps = 0.0;
        for pass in 0..=MAX_EPS_DOUBLINGS {
            let mut candidates = Vec::new();
            for r in 1..=rows {
                for c in 1..=cols {
                    let p = game.payoffs(&[r, c]);
                    let row_ok = p[0] >= col_best[c - 1] || (col_best[c - 1] - p[0]).abs() < eps;
                    let col_ok = p[1] >= row_best[r - 1] || (row_best[r - 1] - p[1]).abs() < eps;
                    if row_ok && col_ok {
                        candidates.push([r, c]);
                    }
                }
            }
            if let Some(first) = candidates.first() {
                let mut chosen = *first;
                let mut best = game.payoff(&chosen, player);
                for candidate in &candidates[1..] {
                    let value = game.payoff(candidate, player);
                    if best < value {
                        best = value;
                        chosen = *candidate;
                    }
                }
                if pass > 0 {
                    log::debug!("EpsNE settled for eps = {}", eps);
                }
                return MixedStrategy::pure(own_actions, chosen[player]);
            }
            eps = if pass == 0 { 0.1 } else { eps * 2.0 };
        }
        log::warn!("EpsNE found no candidate equilibrium; playing uniformly");
        MixedStrategy::uniform(own_actions)
    }
}

impl Player for EpsNE {
    fn name(&self) -> &str {
        "EpsNE"
    }

    fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
        Self::solve_equilibrium(game, role.index())
    }
}

/// Even blend of uniform play and [`EpsNE`], normalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalfHalf;

impl Player for HalfHalf {
    fn name(&self) -> &str {
        "HalfHalf"
    }

    fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
        let player = role.index();
        let uniform = MixedStrategy::uniform(game.actions_of(player));
        let equilibrium = EpsNE::solve_equilibrium(game, player);
        let mut result = MixedStrategy::blend(&uniform, &equilibrium, 0.5);
        result.normalize();
        result
    }
}

/// Interpolates a robust response with the best response to its own nemesis.
///
/// `alpha = 1` is the pure robust response; `alpha = 0` fully hedges against
/// the opponent that punishes it.
#[derive(Debug, Clone)]
pub struct Alpha {
    lambda: f64,
    alpha: f64,
    name: String,
}

impl Alpha {
    /// Alpha agent at rationality `lambda` and weight `alpha`.
    pub fn new(lambda: f64, alpha: f64) -> Self {
        Self {
            lambda,
            alpha,
            name: format!("Alph:{:?}:{:?}", lambda, alpha),
        }
    }
}

impl Player for Alpha {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
        let player = role.index();
        let robust = compute_robust_response(game, player, self.lambda);
        let nemesis = compute_nemesis(game, player, &robust);
        let counter = compute_best_response(game, player, &nemesis);
        interpolate(&robust, &counter, self.alpha)
    }
}

/// Quantal response to the opponent's best reply against a softened value blend.
///
/// Each action is valued against a uniform opponent. The value `v` is blended
/// with the action's shortfall from the player's best payoff in the game,
/// `alpha * v + (1 - alpha) * (best - v)`, and the blend goes through
/// [`logit`] at `lambda`. The agent then assumes the opponent best-responds to
/// that mixture and answers with a quantal response at `lambda`.
#[derive(Debug, Clone)]
pub struct Resilient {
    lambda: f64,
    alpha: f64,
    name: String,
}

impl Resilient {
    /// Resilient agent at rationality `lambda` and value weight `alpha`.
    ///
    /// A negative `lambda` is clamped to 0 with a warning.
    pub fn new(lambda: f64, alpha: f64) -> Self {
        let name = format!("Res:{:?}:{:?}", lambda, alpha);
        let lambda = if lambda < 0.0 {
            log::warn!("{}: lambda should be non-negative; using 0", name);
            0.0
        } else {
            lambda
        };
        Self {
            lambda,
            alpha,
            name,
        }
    }

    /// Blended action values for `player`.
    pub fn blended_values(&self, game: &MatrixGame, player: usize) -> Vec<f64> {
        let uniform = MixedStrategy::uniform(game.actions_of(1 - player));
        let (best, _) = game.extreme_payoffs_for(player);
        action_payoffs(game, player, &uniform)
            .into_iter()
            .map(|v| self.alpha * v + (1.0 - self.alpha) * (best - v))
            .collect()
    }
}

impl Player for Resilient {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
        let player = role.index();
        let softened = logit(&self.blended_values(game, player), self.lambda);
        let reply = compute_best_response(game, 1 - player, &softened);
        compute_quantal_best_response(game, player, &reply, self.lambda)
    }
}

/// Fictitious play for repeated games.
///
/// Best-responds to the average of the opponent strategies observed since the
/// last history reset; plays uniformly until something has been observed.
#[derive(Debug, Clone, Default)]
pub struct FictitiousPlay {
    totals: Vec<f64>,
    rounds: usize,
}

impl FictitiousPlay {
    /// Agent with empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Average observed opponent strategy, if any.
    pub fn belief(&self) -> Option<MixedStrategy> {
        if self.rounds == 0 {
            return None;
        }
        let n = self.rounds as f64;
        let avg: Vec<f64> = self.totals.iter().map(|t| t / n).collect();
        Some(MixedStrategy::from_probs(&avg))
    }
}

impl Player for FictitiousPlay {
    fn name(&self) -> &str {
        "FictitiousPlay"
    }

    fn solve(&mut self, game: &MatrixGame, role: Role, _rng: &mut StdRng) -> MixedStrategy {
        let player = role.index();
        let opponent_actions = game.actions_of(role.opponent().index());
        match self.belief() {
            Some(belief) if belief.num_actions() == opponent_actions => {
                compute_best_response(game, player, &belief)
            }
            _ => MixedStrategy::uniform(game.actions_of(player)),
        }
    }

    fn observe(&mut self, _game_index: usize, opponent: &MixedStrategy, _payoffs: &[f64]) {
        if self.rounds == 0 || self.totals.len() != opponent.num_actions() {
            self.totals = vec![0.0; opponent.num_actions()];
            self.rounds = 0;
        }
        for (total, p) in self.totals.iter_mut().zip(opponent.probs()) {
            *total += p;
        }
        self.rounds += 1;
    }

    fn reset_history(&mut self) {
        self.totals.clear();
        self.rounds = 0;
    }
}

/// The default roster: the reference agents plus the robust and adversary sweeps.
pub fn default_roster() -> Vec<Box<dyn Player>> {
    vec![
        Box::new(UniformRandom),
        Box::new(EpsNE),
        Box::new(MaxMin),
        Box::new(Punish),
        Box::new(Robust::new(0.0)),
        Box::new(Robust::new(0.1)),
        Box::new(Robust::new(0.2)),
        Box::new(Adversary::new(0.1)),
        Box::new(Adversary::new(0.2)),
    ]
}

/// Build an agent from its roster name.
///
/// Recognizes the fixed names (`UniformRandom`, `SolidRock`, `RandomMixed`,
/// `MaxMin`, `Punish`, `Quantal`, `CH`, `QLK`, `EpsNE`, `HalfHalf`,
/// `FictitiousPlay`) and the parametrized forms `Quantal:λ`, `Rob:λ`, `Adv:λ`,
/// `Alph:λ:α` and `Res:λ:α`.
pub fn agent_from_name(name: &str) -> Option<Box<dyn Player>> {
    let mut parts = name.split(':');
    let kind = parts.next()?;
    let args: Vec<f64> = parts.map(str::parse).collect::<Result<_, _>>().ok()?;
    let agent: Box<dyn Player> = match (kind, args.as_slice()) {
        ("UniformRandom", []) => Box::new(UniformRandom),
        ("SolidRock", []) => Box::new(SolidRock),
        ("RandomMixed", []) => Box::new(RandomMixed),
        ("MaxMin", []) => Box::new(MaxMin),
        ("Punish", []) => Box::new(Punish),
        ("Quantal", []) => Box::new(Quantal::default()),
        ("Quantal", [lambda]) => Box::new(Quantal::new(*lambda)),
        ("CH", []) => Box::new(CognitiveHierarchy::new()),
        ("QLK", []) => Box::new(CognitiveHierarchy::quantal_level_k()),
        ("EpsNE", []) => Box::new(EpsNE),
        ("HalfHalf", []) => Box::new(HalfHalf),
        ("FictitiousPlay", []) => Box::new(FictitiousPlay::new()),
        ("Rob", [lambda]) => Box::new(Robust::new(*lambda)),
        ("Adv", [lambda]) => Box::new(Adversary::new(*lambda)),
        ("Alph", [lambda, alpha]) => Box::new(Alpha::new(*lambda, *alpha)),
        ("Res", [lambda, alpha]) => Box::new(Resilient::new(*lambda, *alpha)),
        _ => return None,
    };
    Some(agent)
}
