//! End-to-end scenarios across games, solvers and the tournament engine.

use nfg_arena::games::generator::{matching_pennies, obfuscate, prisoners_dilemma};
use nfg_arena::games::{Game, GameGenerator, MixedStrategy, RandomGameGenerator};
use nfg_arena::solver::{compute_best_response, compute_quantal_best_response, INVALID_PAYOFF};
use nfg_arena::tournament::agents::{SolidRock, UniformRandom};
use nfg_arena::tournament::{GameMaster, Parameters, Player, TournamentConfig};

#[test]
fn test_pennies_quantal_lambda_zero() {
    let game = matching_pennies();
    for opponent in [
        MixedStrategy::pure(2, 1),
        MixedStrategy::from_probs(&[0.8, 0.2]),
        MixedStrategy::uniform(2),
    ] {
        for player in 0..2 {
            let q = compute_quantal_best_response(&game, player, &opponent, 0.0);
            assert_eq!(q.to_string(), "{0.5, 0.5}");
        }
    }
}

#[test]
fn test_prisoners_dilemma_defects_against_defection() {
    let game = prisoners_dilemma();
    assert_eq!(game.payoffs(&[1, 2]), &[-4.0, 0.0]);
    assert_eq!(game.payoffs(&[2, 2]), &[-3.0, -3.0]);

    let defect = MixedStrategy::pure(2, 2);
    for player in 0..2 {
        let response = compute_best_response(&game, player, &defect);
        assert_eq!(response, MixedStrategy::pure(2, 2));
    }
}

#[test]
fn test_uniform_versus_first_action_tournament() {
    let config = TournamentConfig::quick()
        .with_num_games(10)
        .with_poll_interval_ms(1)
        .with_settings(vec![Parameters::new(100, 3, 0, 0)]);
    let roster: Vec<Box<dyn Player>> = vec![Box::new(UniformRandom), Box::new(SolidRock)];
    let report = GameMaster::new(config, roster).unwrap().run().unwrap();

    assert_eq!(report.settings.len(), 1);
    let setting = &report.settings[0];
    assert_eq!(setting.agents, vec!["UniformRandom", "SolidRock"]);
    assert_eq!(setting.matrix.len(), 2);
    for row in &setting.matrix {
        assert_eq!(row.len(), 2);
        for &value in row {
            assert!(value.is_finite());
            assert_ne!(value, INVALID_PAYOFF);
            // General-sum payoffs are non-negative and almost surely not all zero.
            assert!(value > 0.0);
        }
    }
    assert_eq!(setting.counts.invalid_matches, 0);
    // Three pairs, ten games, two seatings; every match awards one win in total.
    assert_eq!(setting.wins.iter().sum::<f64>(), 60.0);
}

#[test]
fn test_obfuscation_is_idempotent_per_identifier() {
    let params = Parameters::new(100, 4, 6, 20);
    let generator = RandomGameGenerator::new();
    let mut first = generator.generate(3, &params, 5).remove(2);
    let mut second = generator.generate(3, &params, 5).remove(2);
    assert_eq!(first, second);

    obfuscate(&mut first, &params);
    obfuscate(&mut second, &params);
    assert_eq!(first, second);

    let truth = generator.generate(3, &params, 5).remove(2);
    let mut changed = 0;
    let mut itr = truth.profiles();
    while let Some(profile) = itr.next_profile() {
        let before = truth.payoffs(profile);
        let after = first.payoffs(profile);
        if before != after {
            changed += 1;
            for (b, a) in before.iter().zip(after) {
                assert!(a <= b && b - a <= 20.0);
            }
        }
    }
    assert_eq!(changed, 6);
}
