use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::foundation::core::Placement;
use crate::foundation::error::{PlaceError, PlaceResult};
use crate::ingest::canonical::{CanonicalPaths, write_anomalies, write_placements, write_users};
use crate::ingest::context::RunContext;
use crate::ingest::epoch::{Epoch, ParseOutcome, RecordParser};
use crate::ingest::reader::FileReader;
use crate::ingest::users::UserDictionary;

/// Options controlling an ingestion run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IngestOpts {
    /// Worker threads used for reading and parsing source files.
    pub threads: usize,
}

impl Default for IngestOpts {
    fn default() -> Self {
        // Reading is mostly I/O and gzip bound; a quarter of the cores avoids oversubscription.
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        Self {
            threads: (cores / 4).max(1),
        }
    }
}

/// Counters describing one ingestion run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Distinct users in the dictionary.
    pub users: usize,
    /// Placements written (0 when the placements phase was skipped).
    pub placements: u64,
    /// Anomalous lines diverted to the anomalies artifact.
    pub anomalies: u64,
    /// Legacy records dropped silently.
    pub dropped: u64,
    /// The users artifact already existed and was loaded instead of rebuilt.
    pub users_resumed: bool,
    /// The placements artifact already existed and the parse pass was skipped.
    pub placements_resumed: bool,
}

/// Two-pass normalization of raw source files into canonical artifacts.
///
/// Pass 1 builds the user dictionary, pass 2 re-reads the sources and parses full placements.
/// Each completed artifact doubles as a checkpoint: a rerun skips any phase whose output exists.
#[derive(Clone, Debug)]
pub struct Ingest {
    parser: RecordParser,
    reader: FileReader,
    paths: CanonicalPaths,
}

impl Ingest {
    /// Prepare an ingestion of `sources` into `out_dir`.
    pub fn new<P: Into<PathBuf>>(
        epoch: Epoch,
        sources: impl IntoIterator<Item = P>,
        out_dir: &Path,
        opts: &IngestOpts,
    ) -> PlaceResult<Self> {
        let reader = FileReader::new(sources, opts.threads)?;
        if reader.files().is_empty() {
            return Err(PlaceError::validation("no source files given"));
        }
        std::fs::create_dir_all(out_dir).map_err(|e| PlaceError::io(out_dir, e))?;
        Ok(Self {
            parser: RecordParser::new(epoch),
            reader,
            paths: CanonicalPaths::in_dir(out_dir),
        })
    }

    /// Artifact locations of this run.
    pub fn paths(&self) -> &CanonicalPaths {
        &self.paths
    }

    /// Run both passes, skipping any phase whose artifact is already complete.
    #[tracing::instrument(skip(self), fields(epoch = %self.parser.epoch(), files = self.reader.files().len()))]
    pub fn run(&self) -> PlaceResult<IngestStats> {
        let mut stats = IngestStats::default();

        let users = if self.paths.users.exists() {
            tracing::info!(path = %self.paths.users.display(), "loading existing users artifact");
            stats.users_resumed = true;
            UserDictionary::read_from(&self.paths.users)?
        } else {
            tracing::info!("collecting user ids");
            let users = UserDictionary::collect(&self.reader, &self.parser)?;
            write_users(&self.paths.users, &users)?;
            users
        };
        stats.users = users.len();

        if self.paths.placements.exists() {
            tracing::info!(
                path = %self.paths.placements.display(),
                "placements artifact present, skipping parse pass"
            );
            stats.placements_resumed = true;
            return Ok(stats);
        }

        tracing::info!("parsing placements");
        let ctx = RunContext::new(users);
        let placements = self.parse_sorted(&ctx)?;
        stats.dropped = ctx.dropped();

        let anomalies = ctx.into_anomalies();
        stats.anomalies = anomalies.len() as u64;
        stats.placements = placements.len() as u64;

        // Placements last: its presence marks the whole pass as done.
        write_anomalies(&self.paths.anomalies, &anomalies)?;
        write_placements(&self.paths.placements, &placements)?;

        tracing::info!(
            placements = stats.placements,
            anomalies = stats.anomalies,
            dropped = stats.dropped,
            "canonical log written"
        );
        Ok(stats)
    }

    fn parse_sorted(&self, ctx: &RunContext) -> PlaceResult<Vec<Placement>> {
        let per_file = self.reader.fold_lines(Vec::new, |acc: &mut Vec<Placement>, line| {
            if let ParseOutcome::Placement(p) = self.parser.parse(line, ctx)? {
                acc.push(p);
            }
            Ok(())
        })?;

        let mut placements: Vec<Placement> = per_file.into_iter().flatten().collect();
        // Stable: equal timestamps keep per-file line order, files in caller order.
        placements.par_sort_by_key(|p| p.timestamp);
        Ok(placements)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ingest/pipeline.rs"]
mod tests;
