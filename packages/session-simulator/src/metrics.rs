//! Per-game records and the aggregate printed at the end of a run.

use nightfall_backend::domain::{Faction, GameResult, Role};
use serde::Serialize;

use crate::simulator::GameOutcome;

/// One JSONL line per simulated game.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub game_id: u32,
    pub seed: u64,
    pub timestamp: String,
    pub provider: String,
    pub result: GameResult,
    pub rounds: u32,
    pub human_seat: u8,
    pub human_role: Option<Role>,
    pub human_survived: bool,
    pub commands_sent: u32,
    pub survivors: Vec<u8>,
    pub duration_ms: f64,
}

pub fn build_game_record(game_id: u32, seed: u64, provider: &str, outcome: &GameOutcome) -> GameRecord {
    let timestamp = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    GameRecord {
        game_id,
        seed,
        timestamp,
        provider: provider.to_string(),
        result: outcome.result,
        rounds: outcome.rounds,
        human_seat: outcome.human_seat,
        human_role: outcome.human_role(),
        human_survived: outcome
            .seats
            .iter()
            .any(|s| s.id == outcome.human_seat && s.survived),
        commands_sent: outcome.commands_sent,
        survivors: outcome
            .seats
            .iter()
            .filter(|s| s.survived)
            .map(|s| s.id)
            .collect(),
        duration_ms: outcome.duration.as_secs_f64() * 1000.0,
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Summary {
    pub games: u32,
    pub good_wins: u32,
    pub hostile_wins: u32,
    pub total_rounds: u64,
    pub human_wins: u32,
    pub human_survived: u32,
}

impl Summary {
    pub fn record(&mut self, record: &GameRecord) {
        self.games += 1;
        self.total_rounds += u64::from(record.rounds);
        match record.result {
            GameResult::GoodWin => self.good_wins += 1,
            GameResult::HostileWin => self.hostile_wins += 1,
            GameResult::Ongoing => {}
        }
        let human_faction = record.human_role.map(Role::faction);
        let human_won = matches!(
            (record.result, human_faction),
            (GameResult::GoodWin, Some(Faction::Good)) | (GameResult::HostileWin, Some(Faction::Hostile))
        );
        if human_won {
            self.human_wins += 1;
        }
        if record.human_survived {
            self.human_survived += 1;
        }
    }

    pub fn average_rounds(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_rounds as f64 / f64::from(self.games)
    }

    fn pct(&self, n: u32) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        f64::from(n) / f64::from(self.games) * 100.0
    }

    pub fn print(&self, errors: u32, elapsed: std::time::Duration, total: u32) {
        println!("\n=== Simulation Summary ===");
        println!("Games completed: {}/{}", self.games, total);
        if errors > 0 {
            println!("Errors: {errors}");
        }
        println!("Total time: {elapsed:?}");
        if self.games == 0 {
            return;
        }
        println!("Average time per game: {:?}", elapsed / self.games);

        println!("\n=== Results ===");
        println!(
            "Good wins: {} ({:.1}%)",
            self.good_wins,
            self.pct(self.good_wins)
        );
        println!(
            "Hostile wins: {} ({:.1}%)",
            self.hostile_wins,
            self.pct(self.hostile_wins)
        );
        println!("Average rounds: {:.2}", self.average_rounds());
        println!(
            "Autopilot seat: won {} ({:.1}%), survived {} ({:.1}%)",
            self.human_wins,
            self.pct(self.human_wins),
            self.human_survived,
            self.pct(self.human_survived)
        );
    }
}
