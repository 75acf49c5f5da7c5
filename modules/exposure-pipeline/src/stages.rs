//! File-to-file stage runners. Each reads its inputs from the paths in
//! [`Config`], runs one pure builder, and writes exactly one table (the topic
//! filter writes one per topic).

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use exposure_common::Config;
use exposure_tables::{follows, matrix, messages, raw, roster, users};
use tracing::{info, warn};

use crate::prep::{identity, repair, topics};
use crate::{activity_matrix, authors_roster, exposed_roster, resolve_follow_graph, RosterBuild};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageStats {
    pub stage: &'static str,
    pub rows_in: usize,
    pub rows_out: usize,
    pub dropped: usize,
    pub output: PathBuf,
}

impl fmt::Display for StageStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} in, {} out, {} dropped -> {}",
            self.stage,
            self.rows_in,
            self.rows_out,
            self.dropped,
            self.output.display()
        )
    }
}

fn reading(path: &Path) -> String {
    format!("Failed to read {}", path.display())
}

fn writing(path: &Path) -> String {
    format!("Failed to write {}", path.display())
}

// --- Preparation ---

/// Stitch and type-check the raw message dump into the cleaned message log.
pub fn repair_messages(config: &Config) -> Result<StageStats> {
    let input = &config.paths.raw_messages;
    let output = &config.paths.messages;

    let text = std::fs::read_to_string(input).with_context(|| reading(input))?;
    let stitched = repair::stitch_rows(&exposure_tables::io::table_name(input), &text);
    if stitched.tail_discarded {
        warn!(path = %input.display(), "Dump ends inside an unfinished record, discarding it");
    }

    let cleaned = repair::clean_messages(&stitched.table).with_context(|| reading(input))?;
    raw::write_table(output, &cleaned.table).with_context(|| writing(output))?;

    info!(
        rows = cleaned.table.len(),
        lines_joined = stitched.lines_joined,
        dropped = cleaned.dropped,
        "Repaired message log"
    );
    Ok(StageStats {
        stage: "repair_messages",
        rows_in: stitched.table.len(),
        rows_out: cleaned.table.len(),
        dropped: cleaned.dropped,
        output: output.clone(),
    })
}

/// Attach RePEc ids to the user table from the economists directory.
pub fn merge_directory(config: &Config) -> Result<StageStats> {
    let p = &config.paths;
    let users = raw::read_table(&p.raw_users).with_context(|| reading(&p.raw_users))?;
    let directory = raw::read_table(&p.economists).with_context(|| reading(&p.economists))?;

    let merged = identity::merge_directory(&users, &directory)?;
    raw::write_table(&p.users, &merged.table).with_context(|| writing(&p.users))?;

    info!(users = users.len(), matched = merged.matched, "Merged economists directory");
    Ok(StageStats {
        stage: "merge_directory",
        rows_in: users.len(),
        rows_out: merged.table.len(),
        dropped: 0,
        output: p.users.clone(),
    })
}

/// Fill missing RePEc ids in the message log from the user table, in place.
pub fn backfill_messages(config: &Config) -> Result<StageStats> {
    let p = &config.paths;
    let log = raw::read_table(&p.messages).with_context(|| reading(&p.messages))?;
    let users = raw::read_table(&p.users).with_context(|| reading(&p.users))?;

    let backfill = identity::backfill_repec_ids(&log, &users).context("Backfilling RePEc ids")?;
    raw::write_table(&p.messages, &backfill.table).with_context(|| writing(&p.messages))?;

    info!(messages = log.len(), filled = backfill.filled, "Backfilled RePEc ids");
    Ok(StageStats {
        stage: "backfill_messages",
        rows_in: log.len(),
        rows_out: backfill.table.len(),
        dropped: 0,
        output: p.messages.clone(),
    })
}

/// Write one message log per configured topic.
pub fn filter_topics(config: &Config) -> Result<Vec<StageStats>> {
    let p = &config.paths;
    let log = raw::read_table(&p.messages).with_context(|| reading(&p.messages))?;
    let users = raw::read_table(&p.users).with_context(|| reading(&p.users))?;

    let resolved = topics::resolve_and_sort(&log, &users, config.filter.since)
        .with_context(|| reading(&p.messages))?;
    info!(
        kept = resolved.table.len(),
        unresolved = resolved.unresolved,
        before_cutoff = resolved.before_cutoff,
        since = %config.filter.since,
        "Resolved message authors"
    );

    let mut stats = Vec::with_capacity(config.filter.topics.len());
    for topic in &config.filter.topics {
        let selected = topics::select_topic(&resolved.table, topic)?;
        raw::write_table(&topic.output, &selected).with_context(|| writing(&topic.output))?;

        info!(topic = topic.name.as_str(), messages = selected.len(), "Wrote topic log");
        stats.push(StageStats {
            stage: "filter_topics",
            rows_in: log.len(),
            rows_out: selected.len(),
            dropped: resolved.unresolved + resolved.before_cutoff,
            output: topic.output.clone(),
        });
    }
    Ok(stats)
}

// --- Panel ---

/// Stage 1: follow edges restricted to users with RePEc ids.
pub fn follow_graph_stage(config: &Config) -> Result<StageStats> {
    let p = &config.paths;
    let user_table = users::read_users(&p.users).with_context(|| reading(&p.users))?;
    let raw_edges = follows::read_raw_follows(&p.raw_follows).with_context(|| reading(&p.raw_follows))?;

    let graph = resolve_follow_graph(&user_table, &raw_edges).context("Resolving follow graph")?;
    follows::write_follows(&p.follows, &graph.edges).with_context(|| writing(&p.follows))?;

    info!(edges = graph.edges.len(), dropped = graph.dropped, "Resolved follow graph");
    Ok(StageStats {
        stage: "follow_graph",
        rows_in: raw_edges.len(),
        rows_out: graph.edges.len(),
        dropped: graph.dropped,
        output: p.follows.clone(),
    })
}

fn bucket_activity_log(config: &Config) -> Result<(usize, RosterBuild)> {
    let path = &config.paths.activity_log;
    let log = messages::read_messages(path).with_context(|| reading(path))?;
    let build = authors_roster(&log, &config.week_clock());

    if build.before_epoch > 0 {
        warn!(
            messages = build.before_epoch,
            epoch = %config.weeks.epoch,
            "Messages before the epoch have no week, skipping them"
        );
    }
    Ok((log.len(), build))
}

/// Stage 2: distinct authors per week.
pub fn authors_roster_stage(config: &Config) -> Result<StageStats> {
    let (messages_in, build) = bucket_activity_log(config)?;
    let out = &config.paths.authors_roster;
    roster::write_roster(out, &build.roster).with_context(|| writing(out))?;

    info!(
        weeks = build.roster.max_week(),
        last_week_starts = %config.week_clock().week_start(build.roster.max_week().max(1)),
        memberships = build.roster.memberships(),
        unidentified = build.unidentified,
        "Built authors roster"
    );
    Ok(StageStats {
        stage: "authors_roster",
        rows_in: messages_in,
        rows_out: build.roster.len(),
        dropped: build.before_epoch + build.unidentified,
        output: out.clone(),
    })
}

/// Stage 4: authors plus their direct followers, per week.
pub fn exposed_roster_stage(config: &Config) -> Result<StageStats> {
    let (messages_in, build) = bucket_activity_log(config)?;
    let edges_path = &config.paths.follows;
    let edges = follows::read_follows(edges_path).with_context(|| reading(edges_path))?;

    let exposed = exposed_roster(&build.roster, &edges);
    let out = &config.paths.exposed_roster;
    roster::write_roster(out, &exposed).with_context(|| writing(out))?;

    info!(
        weeks = exposed.max_week(),
        authored = build.roster.memberships(),
        exposed = exposed.memberships(),
        "Built exposed roster"
    );
    Ok(StageStats {
        stage: "exposed_roster",
        rows_in: messages_in,
        rows_out: exposed.len(),
        dropped: build.before_epoch + build.unidentified,
        output: out.clone(),
    })
}

fn matrix_stage(
    config: &Config,
    stage: &'static str,
    roster_path: &Path,
    out: &Path,
) -> Result<StageStats> {
    let weekly = roster::read_roster(roster_path).with_context(|| reading(roster_path))?;
    let user_table = users::read_users(&config.paths.users).with_context(|| reading(&config.paths.users))?;

    let m = activity_matrix(&weekly, &user_table);
    matrix::write_matrix(out, &m).with_context(|| writing(out))?;

    info!(
        stage,
        users = m.rows.len(),
        weeks = m.weeks,
        active_cells = m.active_cells(),
        "Built activity matrix"
    );
    Ok(StageStats {
        stage,
        rows_in: user_table.len(),
        rows_out: m.rows.len(),
        dropped: 0,
        output: out.to_path_buf(),
    })
}

/// Stage 3: user x week matrix of authorship.
pub fn mentions_stage(config: &Config) -> Result<StageStats> {
    let p = &config.paths;
    matrix_stage(config, "mentions", &p.authors_roster, &p.mentions)
}

/// Stage 5: user x week matrix of exposure.
pub fn interacted_stage(config: &Config) -> Result<StageStats> {
    let p = &config.paths;
    matrix_stage(config, "interacted", &p.exposed_roster, &p.interacted)
}
