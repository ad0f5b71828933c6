use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::foundation::core::RawUserId;
use crate::foundation::error::{PlaceError, PlaceResult};
use crate::ingest::epoch::RecordParser;
use crate::ingest::reader::FileReader;

/// Frozen bijection between distinct user ids and dense indices `0..len`.
///
/// Index order equals sorted `RawUserId` order, so the dictionary is stored as a sorted,
/// deduplicated vector and lookups are binary searches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserDictionary {
    ids: Vec<RawUserId>,
}

impl UserDictionary {
    /// Deduplicate and sort `ids`, then assign indices in sorted order.
    pub fn build(ids: impl IntoIterator<Item = RawUserId>) -> PlaceResult<Self> {
        let mut ids: Vec<RawUserId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self::from_sorted(ids)
    }

    fn from_sorted(ids: Vec<RawUserId>) -> PlaceResult<Self> {
        if u32::try_from(ids.len()).is_err() {
            return Err(PlaceError::validation(format!(
                "{} distinct users exceed the u32 index space",
                ids.len()
            )));
        }
        Ok(Self { ids })
    }

    /// Phase 1: scan every source line for its user field and build the dictionary.
    #[tracing::instrument(skip_all, fields(files = reader.files().len()))]
    pub fn collect(reader: &FileReader, parser: &RecordParser) -> PlaceResult<Self> {
        let per_file = reader.fold_lines(HashSet::<RawUserId>::new, |seen, line| {
            seen.insert(parser.user_id(line)?);
            Ok(())
        })?;

        let mut merged = HashSet::new();
        for set in per_file {
            if merged.is_empty() {
                merged = set;
            } else {
                merged.extend(set);
            }
        }
        let dict = Self::build(merged)?;
        tracing::info!(users = dict.len(), "user dictionary built");
        Ok(dict)
    }

    /// Load a previously written users artifact (one base64 id per line, in index order).
    pub fn read_from(path: &Path) -> PlaceResult<Self> {
        let file = File::open(path).map_err(|e| PlaceError::io(path, e))?;
        let mut ids = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| PlaceError::io(path, e))?;
            if line.is_empty() {
                continue;
            }
            let id = RawUserId::from_base64(&line)?;
            if ids.last().is_some_and(|prev| *prev >= id) {
                return Err(PlaceError::format(format!(
                    "users file '{}' is not strictly sorted at line {}",
                    path.display(),
                    ids.len() + 1
                )));
            }
            ids.push(id);
        }
        Self::from_sorted(ids)
    }

    /// Number of distinct users.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Return `true` when no users were seen.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Dense index of `id`, if present.
    pub fn index_of(&self, id: &RawUserId) -> Option<u32> {
        self.ids.binary_search(id).ok().map(|i| i as u32)
    }

    /// Identifier stored at `index`.
    pub fn id_at(&self, index: u32) -> Option<&RawUserId> {
        self.ids.get(index as usize)
    }

    /// All identifiers in index order.
    pub fn ids(&self) -> &[RawUserId] {
        &self.ids
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ingest/users.rs"]
mod tests;
