//! Tournament CLI
//!
//! Operates on a tournament export file: register a tournament from a
//! definition JSON, confirm results, manage overrides and tie resolutions,
//! and inspect standings and bracket state.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use ob_core::engine::score::display_pair;
use ob_core::save::{read_export, write_export, TournamentExport};
use ob_core::{
    Engine, LogSink, ManualOrdering, MemoryStore, Phase, RecomputeReport, Source, TournamentId,
    TournamentState,
};

#[derive(Parser)]
#[command(name = "ob_cli")]
#[command(about = "Tournament progression engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a tournament from a definition JSON and write its export
    Init {
        /// Tournament definition JSON (TournamentState)
        #[arg(long)]
        definition: PathBuf,

        /// Output export file
        #[arg(long)]
        out: PathBuf,
    },

    /// Record a confirmed result
    Confirm {
        /// Tournament export file
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        match_code: String,

        /// Slot 1 per-period scores, e.g. "1,2" or "1,1,0,0,4"
        #[arg(long)]
        slot1: String,

        /// Slot 2 per-period scores
        #[arg(long)]
        slot2: String,
    },

    /// Set a slot override (sources as JSON source objects)
    OverrideSlot {
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        match_code: String,

        /// Replacement source for slot 1, e.g. '{"kind":"block_position","block":"C","position":2}'
        #[arg(long)]
        slot1_source: Option<String>,

        /// Replacement source for slot 2
        #[arg(long)]
        slot2_source: Option<String>,

        #[arg(long)]
        reason: String,
    },

    /// Remove a match's override
    ClearOverride {
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        match_code: String,
    },

    /// Resolve a tied group with an explicit order (team ids, best first)
    ResolveTie {
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        block: String,

        #[arg(long)]
        position: u32,

        #[arg(long, value_delimiter = ',')]
        order: Vec<Uuid>,
    },

    /// Print a block's standings table
    Standings {
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        block: String,
    },

    /// Print the final-phase bracket
    Bracket {
        #[arg(long)]
        file: PathBuf,
    },

    /// Propose a deterministic lottery ordering for a tied group
    Draw {
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        block: String,

        #[arg(long)]
        position: u32,

        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

type CliEngine = Engine<MemoryStore, LogSink>;

fn load_engine(path: &Path) -> Result<(CliEngine, TournamentId)> {
    let export = read_export(path)
        .with_context(|| format!("failed to read export {}", path.display()))?;
    let id = export.state.tournament.id;
    let store = MemoryStore::new();
    store.insert(export.state);
    Ok((Engine::new(store, LogSink), id))
}

fn persist(engine: &CliEngine, id: &TournamentId, path: &Path) -> Result<()> {
    let state = engine.store().get(id).context("tournament vanished from store")?;
    write_export(path, &TournamentExport::new(state))
        .with_context(|| format!("failed to write export {}", path.display()))?;
    Ok(())
}

fn print_report(report: &RecomputeReport) {
    for block in &report.recomputed_blocks {
        println!("recomputed standings for block {}", block);
    }
    for write in &report.slot_writes {
        match write.team {
            Some(team) => println!("resolved {} {:?} -> {}", write.match_code, write.slot, team),
            None => println!("unresolved {} {:?}", write.match_code, write.slot),
        }
    }
    for code in &report.cleared_results {
        println!("cleared stale result of {}", code);
    }
    for escalation in &report.tie_escalations {
        println!(
            "TIE needs resolution: block {} position {} ({} teams)",
            escalation.block,
            escalation.position,
            escalation.teams.len()
        );
    }
    for advisory in &report.advisories {
        println!(
            "UNRESOLVED dependency: {} {:?} waiting on {} ({})",
            advisory.match_code,
            advisory.slot,
            advisory.source.describe(),
            advisory.reason
        );
    }
}

fn team_label(state: &TournamentState, id: &Uuid) -> String {
    state
        .team(id)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn print_standings(state: &TournamentState, block: &str) -> Result<()> {
    let block = state.block(block).context("unknown block")?;
    let snapshot = block.standings.as_ref().context("block has no standings yet")?;

    println!("{:<4} {:<20} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>5} {:>5}",
        "Pos", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts");
    for row in &snapshot.rows {
        println!(
            "{:<4} {:<20} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>5} {:>5}",
            row.position,
            team_label(state, &row.team),
            row.played,
            row.wins,
            row.draws,
            row.losses,
            row.goals_for,
            row.goals_against,
            row.goal_difference,
            row.points,
        );
    }
    for group in &snapshot.tie_groups {
        if group.is_unresolved() {
            println!("  tie at position {} pending manual resolution", group.position);
        }
    }
    Ok(())
}

fn print_bracket(state: &TournamentState) {
    for m in &state.matches {
        let is_final = state
            .block(&m.block)
            .map(|b| b.phase == Phase::Final)
            .unwrap_or(false);
        if !is_final {
            continue;
        }

        let side = |team: &Option<Uuid>, source: &Option<Source>| match team {
            Some(id) => team_label(state, id),
            None => source
                .as_ref()
                .map(|s| format!("<{}>", s.describe()))
                .unwrap_or_else(|| "<open>".to_string()),
        };
        let score = match &m.result {
            Some(result) => {
                let (s1, s2) = display_pair(result);
                format!("  {} : {}", s1, s2)
            }
            None => String::new(),
        };
        println!(
            "{:<6} {} vs {}{}",
            m.code,
            side(&m.slot1.team, &m.slot1.source),
            side(&m.slot2.team, &m.slot2.source),
            score
        );
    }
}

fn parse_source(raw: &Option<String>) -> Result<Option<Source>> {
    match raw {
        None => Ok(None),
        Some(json) => {
            let source: Source =
                serde_json::from_str(json).context("invalid source JSON")?;
            Ok(Some(source))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { definition, out } => {
            let raw = std::fs::read_to_string(&definition)
                .with_context(|| format!("failed to read {}", definition.display()))?;
            let state: TournamentState =
                serde_json::from_str(&raw).context("invalid tournament definition")?;
            let id = state.tournament.id;

            let engine: CliEngine = Engine::new(MemoryStore::new(), LogSink);
            let report = engine.register(state)?;
            print_report(&report);
            persist(&engine, &id, &out)?;
            println!("registered tournament {} -> {}", id, out.display());
        }

        Commands::Confirm { file, match_code, slot1, slot2 } => {
            let (engine, id) = load_engine(&file)?;
            let report = engine.confirm_result(&id, &match_code, &slot1, &slot2)?;
            print_report(&report);
            persist(&engine, &id, &file)?;
        }

        Commands::OverrideSlot { file, match_code, slot1_source, slot2_source, reason } => {
            let (engine, id) = load_engine(&file)?;
            let ov = ob_core::SlotOverride {
                match_code,
                slot1: parse_source(&slot1_source)?,
                slot2: parse_source(&slot2_source)?,
                reason,
            };
            let report = engine.set_override(&id, ov)?;
            print_report(&report);
            persist(&engine, &id, &file)?;
        }

        Commands::ClearOverride { file, match_code } => {
            let (engine, id) = load_engine(&file)?;
            let report = engine.clear_override(&id, &match_code)?;
            print_report(&report);
            persist(&engine, &id, &file)?;
        }

        Commands::ResolveTie { file, block, position, order } => {
            let (engine, id) = load_engine(&file)?;
            let ordering = ManualOrdering { block, position, order };
            let report = engine.resolve_tie(&id, ordering)?;
            print_report(&report);
            persist(&engine, &id, &file)?;
        }

        Commands::Standings { file, block } => {
            let (engine, id) = load_engine(&file)?;
            // compute on demand if the block has none yet
            engine.standings(&id, &block)?;
            let state = engine.store().get(&id).context("tournament vanished from store")?;
            print_standings(&state, &block)?;
            persist(&engine, &id, &file)?;
        }

        Commands::Bracket { file } => {
            let (engine, id) = load_engine(&file)?;
            let state = engine.store().get(&id).context("tournament vanished from store")?;
            print_bracket(&state);
        }

        Commands::Draw { file, block, position, seed } => {
            let (engine, id) = load_engine(&file)?;
            let ordering = engine.propose_lottery(&id, &block, position, seed)?;
            let state = engine.store().get(&id).context("tournament vanished from store")?;
            println!("proposed order for block {} position {} (seed {}):", ordering.block, ordering.position, seed);
            for (rank, team) in ordering.order.iter().enumerate() {
                println!("  {}. {}", rank + 1, team_label(&state, team));
            }
            println!("apply with: resolve-tie --block {} --position {} --order {}",
                ordering.block,
                ordering.position,
                ordering
                    .order
                    .iter()
                    .map(Uuid::to_string)
                    .collect::<Vec<_>>()
                    .join(","));
        }
    }

    Ok(())
}
