//! Tournament runner binary.
//!
//! Runs a round-robin tournament between the built-in agents and prints the
//! payoff matrix and summary of every setting. Optionally exports the full
//! report as JSON.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use nfg_arena::tournament::agents::{agent_from_name, default_roster};
use nfg_arena::tournament::config::GameType;
use nfg_arena::tournament::{GameMaster, Parameters, Player, TournamentConfig};

#[derive(Parser)]
#[command(name = "tournament")]
#[command(about = "Round-robin tournament of normal-form game agents")]
struct Cli {
    /// JSON tournament configuration (defaults to the uncertainty sweep)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Use the small development preset instead of the defaults
    #[arg(long)]
    quick: bool,
    /// Games per setting (overrides config)
    #[arg(short = 'n', long)]
    games: Option<usize>,
    /// Actions per player; replaces the settings with a sweep at this size
    #[arg(short, long)]
    actions: Option<usize>,
    /// Game family of the generated sweep
    #[arg(long, value_parser = parse_game_type)]
    game_type: Option<GameType>,
    /// Rounds per pairing for the generated sweep (0 = one-shot)
    #[arg(long)]
    repeat: Option<usize>,
    /// Base seed (overrides config)
    #[arg(long)]
    seed: Option<u64>,
    /// Per-unit time limit in milliseconds (overrides config)
    #[arg(long)]
    time_limit_ms: Option<u64>,
    /// Agents by name, e.g. `MaxMin,Rob:0.1,Alph:0.5:0.5` (defaults to the standard roster)
    #[arg(long, value_delimiter = ',')]
    agents: Vec<String>,
    /// Skip the nemesis probes
    #[arg(long)]
    no_nemesis: bool,
    /// Write the full report as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn parse_game_type(s: &str) -> Result<GameType, String> {
    match s.to_ascii_uppercase().replace('-', "_").as_str() {
        "ZERO_SUM" => Ok(GameType::ZeroSum),
        "GENERAL_SUM" => Ok(GameType::GeneralSum),
        "RISK" => Ok(GameType::Risk),
        other => Err(format!("unknown game type {}", other)),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = build_config(&cli)?;
    config.validate().context("invalid tournament configuration")?;

    if cli.print_config {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    let roster = build_roster(&cli.agents)?;
    println!("=== Normal-Form Game Tournament ===");
    println!(
        "Agents: {}",
        roster.iter().map(|p| p.name()).collect::<Vec<_>>().join(", ")
    );
    println!(
        "Games per setting: {}, settings: {}\n",
        config.num_games,
        config.settings.len()
    );

    let start = Instant::now();
    let master = GameMaster::new(config, roster)?.with_progress(true);
    let report = master.run()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report.write_text(&mut out)?;
    writeln!(out, "Total time: {:.2}s", start.elapsed().as_secs_f64())?;

    if let Some(path) = &cli.output {
        report
            .save_json(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("\nReport exported to: {}", path.display());
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<TournamentConfig> {
    let mut config = match &cli.config {
        Some(path) => TournamentConfig::from_json_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None if cli.quick => TournamentConfig::quick(),
        None => TournamentConfig::default(),
    };

    if let Some(games) = cli.games {
        config = config.with_num_games(games);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(limit) = cli.time_limit_ms {
        config = config.with_time_limit_ms(limit);
    }
    if cli.no_nemesis {
        config = config.with_nemesis(false);
    }

    if cli.actions.is_some() || cli.game_type.is_some() || cli.repeat.is_some() {
        let actions = cli
            .actions
            .or_else(|| config.settings.first().map(|s| s.num_actions))
            .unwrap_or(3);
        let max_payoff = config.settings.first().map_or(100, |s| s.max_payoff);
        let game_type = cli.game_type.unwrap_or(GameType::GeneralSum);
        let repeat = cli.repeat.unwrap_or(0);
        let settings: Vec<Parameters> = TournamentConfig::uncertainty_sweep(max_payoff, actions)
            .into_iter()
            .map(|p| p.with_game_type(game_type).with_repeat(repeat))
            .collect();
        config = config.with_settings(settings);
    }
    Ok(config)
}

fn build_roster(names: &[String]) -> Result<Vec<Box<dyn Player>>> {
    if names.is_empty() {
        return Ok(default_roster());
    }
    let mut roster = Vec::with_capacity(names.len());
    for name in names {
        match agent_from_name(name.trim()) {
            Some(agent) => roster.push(agent),
            None => bail!("unknown agent {}", name),
        }
    }
    Ok(roster)
}
