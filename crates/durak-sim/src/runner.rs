use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use durak_bot::policy::{HeuristicPolicy, Policy, PolicyContext};
use durak_core::game::session::{GameSession, PlayError};
use durak_core::model::player::PlayerPosition;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{AgentKind, ResolvedOutputs, SimConfig};

/// Primary entry point for running batches of games.
pub struct SimRunner {
    config: SimConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub losses: [u32; 4],
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("exactly four agents are required, found {found}")]
    SeatCount { found: usize },
    #[error("game {game_index} exceeded the bout cap of {cap}")]
    BoutCapExceeded { game_index: usize, cap: u32 },
    #[error("game {game_index} rejected a move: {source}")]
    Play {
        game_index: usize,
        source: PlayError,
    },
}

impl SimRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: SimConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        if config.agents.len() != 4 {
            return Err(RunnerError::SeatCount {
                found: config.agents.len(),
            });
        }
        Ok(Self { config, outputs })
    }

    /// Play every configured game, streaming one JSONL row per game.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut losses = [0u32; 4];
        let mut bouts_total = 0u64;
        let mut rows_written = 0usize;

        for game_index in 0..self.config.games.count {
            let seed = rng.next_u64();
            let record = self.play_game(game_index, seed)?;

            if let Some(loser) = record.loser {
                losses[loser.index()] += 1;
            }
            bouts_total += u64::from(record.bouts);

            let row = GameLogRow {
                run_id: self.config.run_id.clone(),
                game_index,
                seed,
                trump: record.trump.clone(),
                loser: record.loser.map(|seat| seat.to_string()),
                loser_agent: record
                    .loser
                    .map(|seat| self.config.agents[seat.index()].name.clone()),
                bouts: record.bouts,
                reveals: record.reveals,
            };
            serde_json::to_writer(&mut writer, &row)?;
            writer.write_all(b"\n")?;
            rows_written += 1;

            event!(
                target: "durak_sim::game",
                Level::INFO,
                game_index = game_index as u64,
                seed,
                bouts = record.bouts,
                reveals = record.reveals,
                "game finished"
            );
        }
        writer.flush()?;

        self.write_summary(&losses, bouts_total)?;

        Ok(RunSummary {
            games_played: self.config.games.count,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            losses,
        })
    }

    fn play_game(&self, game_index: usize, seed: u64) -> Result<GameRecord, RunnerError> {
        let mut session = GameSession::with_seed(seed);
        let mut policies = self.build_policies();
        let cap = self.config.games.bout_cap;
        let mut reveals = 0u32;

        while !session.has_ended() {
            if session.bouts_completed() >= cap {
                return Err(RunnerError::BoutCapExceeded { game_index, cap });
            }
            loop {
                let attacker = session.attacker();
                let choice = {
                    let ctx = policy_context(&session, attacker);
                    policies[attacker.index()].choose_attack(&ctx)
                };
                let resolved = session
                    .submit_attack(choice)
                    .map_err(|source| RunnerError::Play { game_index, source })?;
                if resolved.is_some() {
                    break;
                }
                reveals += 1;

                let defender = session.defender();
                let attack = session
                    .bout()
                    .pending_attack()
                    .expect("attack just landed on the table");
                let answer = {
                    let ctx = policy_context(&session, defender);
                    policies[defender.index()].choose_defense(&ctx, attack)
                };
                let covered = answer.is_some();
                let resolved = session
                    .submit_defense(answer)
                    .map_err(|source| RunnerError::Play { game_index, source })?;
                if resolved.is_some() {
                    break;
                }
                if covered {
                    reveals += 1;
                }
            }
        }

        let record = GameRecord {
            loser: session.loser(),
            bouts: session.bouts_completed(),
            reveals,
            trump: session.trump().to_string(),
        };
        session.finish();
        Ok(record)
    }

    fn build_policies(&self) -> [Box<dyn Policy>; 4] {
        std::array::from_fn(|index| {
            // Validated at construction: exactly one agent per seat.
            match self.config.agents[index].kind {
                AgentKind::Epistemic => Box::new(HeuristicPolicy::epistemic()) as Box<dyn Policy>,
                AgentKind::Reckless => Box::new(HeuristicPolicy::reckless()) as Box<dyn Policy>,
            }
        })
    }

    fn write_summary(&self, losses: &[u32; 4], bouts_total: u64) -> Result<(), RunnerError> {
        let games = self.config.games.count;
        let mut output = String::new();
        output.push_str("# Simulation Summary\n\n");
        output.push_str(&format!("- Run: `{}`\n", self.config.run_id));
        output.push_str(&format!("- Games: {games}\n"));
        output.push_str(&format!(
            "- Seed: {}\n",
            self.config.games.seed.unwrap_or(0)
        ));
        if games > 0 {
            output.push_str(&format!(
                "- Avg bouts per game: {:.1}\n",
                bouts_total as f64 / games as f64
            ));
        }

        output.push_str("\n## Losses by Seat\n");
        for seat in PlayerPosition::LOOP {
            let agent = &self.config.agents[seat.index()];
            output.push_str(&format!(
                "- {seat} ({}): {}\n",
                agent.name,
                losses[seat.index()]
            ));
        }

        fs::write(&self.outputs.summary_md, output)?;
        Ok(())
    }
}

fn policy_context<'a>(session: &'a GameSession, seat: PlayerPosition) -> PolicyContext<'a> {
    PolicyContext {
        seat,
        hand: session.hand(seat),
        bout: session.bout(),
        attacker: session.attacker(),
        defender: session.defender(),
        knowledge: session.knowledge(),
        trump: session.trump(),
        defender_cards: session.hand(session.defender()).len(),
        stock_size: session.stock_size(),
        discard_size: session.discard_size(),
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct GameLogRow {
    run_id: String,
    game_index: usize,
    seed: u64,
    trump: String,
    loser: Option<String>,
    loser_agent: Option<String>,
    bouts: u32,
    reveals: u32,
}

struct GameRecord {
    loser: Option<PlayerPosition>,
    bouts: u32,
    reveals: u32,
    trump: String,
}
