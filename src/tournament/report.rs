//! Tournament results and their export.
//!
//! Text output is tab-delimited with the agent name first. JSON export
//! carries the full report, including the raw payoff matrices. Non-finite
//! statistics (the stability of a lone agent) are exported as the strings
//! `"inf"`, `"-inf"` or `"NaN"` so the report loads back unchanged.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::tournament::config::Parameters;
use crate::tournament::driver::UnitOutcome;
use crate::tournament::stats::{self, NemesisStats};

/// Counts of units that did not complete normally during a setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCounts {
    /// Units detached after the time limit.
    pub timed_out: usize,
    /// Units whose agent panicked.
    pub failed: usize,
    /// Matches where a strategy was missing or invalid.
    pub invalid_matches: usize,
}

impl UnitCounts {
    /// Count one unit outcome.
    pub fn record(&mut self, outcome: UnitOutcome) {
        match outcome {
            UnitOutcome::Completed => {}
            UnitOutcome::TimedOut => self.timed_out += 1,
            UnitOutcome::Failed => self.failed += 1,
        }
    }

    /// Add another tally into this one.
    pub fn merge(&mut self, other: UnitCounts) {
        self.timed_out += other.timed_out;
        self.failed += other.failed;
        self.invalid_matches += other.invalid_matches;
    }
}

/// Every agent's average payoff against one reference agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePayoffs {
    /// Name of the reference agent.
    pub reference: String,
    /// One entry per agent, in roster order.
    pub payoffs: Vec<f64>,
}

/// Results of one tournament setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingReport {
    /// Setting description, as rendered by [`Parameters::description`].
    pub description: String,
    /// The setting itself.
    pub parameters: Parameters,
    /// Games played.
    pub num_games: usize,
    /// Agent names in roster order.
    pub agents: Vec<String>,
    /// Normalized payoff matrix; `matrix[i][j]` is agent `i` against agent `j`.
    pub matrix: Vec<Vec<f64>>,
    /// Matches won; a tie gives each side half.
    pub wins: Vec<f64>,
    /// Row means of the matrix.
    #[serde(with = "float_vec")]
    pub average: Vec<f64>,
    /// Incentive of other agents to face each agent.
    #[serde(with = "float_vec")]
    pub stability: Vec<f64>,
    /// Row minimums of the matrix.
    #[serde(with = "float_vec")]
    pub minimums: Vec<f64>,
    /// Mean shortfall of each row against its best entry.
    #[serde(with = "float_vec")]
    pub regrets: Vec<f64>,
    /// Column means of the matrix.
    #[serde(with = "float_vec")]
    pub reverse: Vec<f64>,
    /// Payoffs against the reference agents, in the order they were added.
    #[serde(default)]
    pub payoff_vs: Vec<ReferencePayoffs>,
    /// Nemesis probes, when enabled.
    pub nemesis: Option<Vec<NemesisStats>>,
    /// Unit and match anomalies.
    pub counts: UnitCounts,
}

impl SettingReport {
    /// Derive every statistic from a normalized matrix.
    pub fn from_matrix(
        parameters: &Parameters,
        num_games: usize,
        agents: Vec<String>,
        matrix: Vec<Vec<f64>>,
        wins: Vec<f64>,
    ) -> Self {
        Self {
            description: parameters.description(),
            parameters: parameters.clone(),
            num_games,
            average: stats::average_payoffs(&matrix),
            stability: stats::stabilities(&matrix),
            minimums: stats::minimums(&matrix),
            regrets: stats::regrets(&matrix),
            reverse: stats::reverse_payoffs(&matrix),
            payoff_vs: Vec::new(),
            agents,
            matrix,
            wins,
            nemesis: None,
            counts: UnitCounts::default(),
        }
    }

    /// Index of an agent by name.
    pub fn agent_index(&self, name: &str) -> Option<usize> {
        self.agents.iter().position(|a| a == name)
    }

    /// Record every agent's payoff against the agent called `reference`.
    ///
    /// The values are the reference agent's matrix column: each agent's
    /// average over both seatings of every game.
    ///
    /// # Returns
    /// `false` when no agent has that name; nothing is recorded then.
    pub fn add_reference(&mut self, reference: &str) -> bool {
        let Some(column) = self.agent_index(reference) else {
            return false;
        };
        let payoffs = self.matrix.iter().map(|row| row[column]).collect();
        self.payoff_vs.push(ReferencePayoffs {
            reference: reference.to_string(),
            payoffs,
        });
        true
    }

    /// Write the payoff matrix: a header row of agent names, then one row per agent.
    pub fn write_matrix<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "agent")?;
        for name in &self.agents {
            write!(out, "\t{}", name)?;
        }
        writeln!(out)?;
        for (name, row) in self.agents.iter().zip(&self.matrix) {
            write!(out, "{}", name)?;
            for value in row {
                write!(out, "\t{}", value)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Write the summary blocks, one `name<TAB>value` line per agent.
    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.description)?;
        self.write_block(out, "Total Wins", &self.wins)?;
        self.write_block(out, "Overall Average Expected Utility", &self.average)?;
        self.write_block(out, "Tournament Stabilities", &self.stability)?;
        self.write_block(out, "Minimum Per Player", &self.minimums)?;
        self.write_block(out, "Tournament Regret", &self.regrets)?;
        self.write_block(out, "Expected Reverse Utility", &self.reverse)?;
        for reference in &self.payoff_vs {
            let title = format!("Payoff vs {}", reference.reference);
            self.write_block(out, &title, &reference.payoffs)?;
        }
        if let Some(nemesis) = &self.nemesis {
            writeln!(out)?;
            writeln!(out, "Nemesis Payoffs")?;
            writeln!(out, "agent\tmean\tmin\tmax")?;
            for (name, n) in self.agents.iter().zip(nemesis) {
                writeln!(out, "{}\t{}\t{}\t{}", name, n.mean, n.min, n.max)?;
            }
        }
        Ok(())
    }

    fn write_block<W: Write>(&self, out: &mut W, title: &str, values: &[f64]) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", title)?;
        for (name, value) in self.agents.iter().zip(values) {
            writeln!(out, "{}\t{}", name, value)?;
        }
        Ok(())
    }
}

/// Results of a full tournament, one entry per setting in run order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TournamentReport {
    /// Seconds since the Unix epoch when the run finished.
    pub timestamp: String,
    /// Per-setting results.
    pub settings: Vec<SettingReport>,
}

impl TournamentReport {
    /// Report over the given settings, stamped now.
    pub fn new(settings: Vec<SettingReport>) -> Self {
        Self {
            timestamp: unix_timestamp(),
            settings,
        }
    }

    /// Write every setting's matrix and summary.
    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for setting in &self.settings {
            setting.write_matrix(out)?;
            writeln!(out)?;
            setting.write_summary(out)?;
            writeln!(out)?;
        }
        Ok(())
    }

    /// Save to JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())
    }
}

/// Serde adapter for statistic vectors that may hold infinities.
mod float_vec {
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Float {
        Finite(f64),
        Special(String),
    }

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        values
            .iter()
            .map(|&v| {
                if v.is_finite() {
                    Float::Finite(v)
                } else {
                    Float::Special(v.to_string())
                }
            })
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<Float>::deserialize(deserializer)?
            .into_iter()
            .map(|value| match value {
                Float::Finite(v) => Ok(v),
                Float::Special(text) => text.parse().map_err(de::Error::custom),
            })
            .collect()
    }
}

fn unix_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> SettingReport {
        SettingReport::from_matrix(
            &Parameters::new(100, 3, 0, 0),
            10,
            vec!["A".to_string(), "B".to_string()],
            vec![vec![1.0, 4.0], vec![3.0, 2.0]],
            vec![12.5, 7.5],
        )
    }

    #[test]
    fn test_from_matrix_derives_stats() {
        let r = report();
        assert_eq!(r.average, vec![2.5, 2.5]);
        assert_eq!(r.minimums, vec![1.0, 2.0]);
        assert_eq!(r.agent_index("B"), Some(1));
        assert!(r.nemesis.is_none());
    }

    #[test]
    fn test_write_matrix() {
        let mut out = Vec::new();
        report().write_matrix(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "agent\tA\tB\nA\t1\t4\nB\t3\t2\n");
    }

    #[test]
    fn test_write_summary_blocks() {
        let mut r = report();
        r.nemesis = Some(vec![NemesisStats::default(), NemesisStats::default()]);
        let mut out = Vec::new();
        r.write_summary(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("GENERAL_SUM max=100 actions=3 outcomes=0 payoff=0 repeat=0\n"));
        assert!(text.contains("\nTotal Wins\nA\t12.5\nB\t7.5\n"));
        assert!(text.contains("\nTournament Stabilities\nA\t2\nB\t2\n"));
        assert!(text.contains("Nemesis Payoffs\nagent\tmean\tmin\tmax\nA\t0\t0\t0\n"));
    }

    #[test]
    fn test_unit_counts() {
        let mut counts = UnitCounts::default();
        counts.record(UnitOutcome::Completed);
        counts.record(UnitOutcome::TimedOut);
        counts.record(UnitOutcome::Failed);
        counts.merge(UnitCounts {
            timed_out: 1,
            failed: 0,
            invalid_matches: 2,
        });
        assert_eq!(counts.timed_out, 2);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.invalid_matches, 2);
    }

    #[test]
    fn test_reference_payoffs() {
        let mut r = report();
        assert!(r.add_reference("B"));
        assert!(!r.add_reference("Nobody"));
        assert_eq!(r.payoff_vs.len(), 1);
        assert_eq!(r.payoff_vs[0].payoffs, vec![4.0, 2.0]);

        let mut out = Vec::new();
        r.write_summary(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\nPayoff vs B\nA\t4\nB\t2\n"));
    }

    #[test]
    fn test_lone_agent_report_survives_json() {
        let lone = SettingReport::from_matrix(
            &Parameters::new(100, 3, 0, 0),
            4,
            vec!["A".to_string()],
            vec![vec![2.0]],
            vec![8.0],
        );
        assert_eq!(lone.stability, vec![f64::NEG_INFINITY]);

        let full = TournamentReport::new(vec![lone]);
        let json = serde_json::to_string(&full).unwrap();
        assert!(json.contains("\"-inf\""));
        let back: TournamentReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.settings[0].stability, vec![f64::NEG_INFINITY]);
        assert_eq!(back.settings[0].average, vec![2.0]);
    }

    #[test]
    fn test_json_export() {
        let full = TournamentReport::new(vec![report()]);
        let json = serde_json::to_string(&full).unwrap();
        let back: TournamentReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.settings[0].matrix, full.settings[0].matrix);
    }
}
