use std::ffi::OsString;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::foundation::core::Placement;
use crate::foundation::error::{PlaceError, PlaceResult};
use crate::ingest::users::UserDictionary;

/// Locations of the three canonical artifacts of one dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalPaths {
    /// Base64 user ids, line number = dictionary index.
    pub users: PathBuf,
    /// Sorted `timestamp,user,x,y,color` lines.
    pub placements: PathBuf,
    /// Verbatim anomalous source lines.
    pub anomalies: PathBuf,
}

impl CanonicalPaths {
    /// Default artifact names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            users: dir.join("users.txt"),
            placements: dir.join("placements.txt"),
            anomalies: dir.join("mods.txt"),
        }
    }
}

/// Write the dictionary keys, one base64 id per line, in index order.
pub fn write_users(path: &Path, users: &UserDictionary) -> PlaceResult<()> {
    write_lines(path, users.ids().iter().map(|id| id.to_base64()))
}

/// Write placements in the given (already sorted) order.
pub fn write_placements(path: &Path, placements: &[Placement]) -> PlaceResult<()> {
    write_lines(path, placements)
}

/// Write anomalous lines verbatim.
pub fn write_anomalies(path: &Path, lines: &[String]) -> PlaceResult<()> {
    write_lines(path, lines)
}

/// Write one item per newline-terminated line, all-or-nothing.
///
/// Content goes to `<path>.tmp` first and is renamed over `path` only after a successful flush
/// and sync, so `path` existing always means the artifact is complete.
pub fn write_lines<I>(path: &Path, lines: I) -> PlaceResult<()>
where
    I: IntoIterator,
    I::Item: Display,
{
    write_atomic(path, |w| {
        for line in lines {
            writeln!(w, "{line}")?;
        }
        Ok(())
    })
}

fn write_atomic<F>(path: &Path, body: F) -> PlaceResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let tmp = tmp_path(path);
    let written: io::Result<()> = (|| {
        let mut w = BufWriter::new(File::create(&tmp)?);
        body(&mut w)?;
        let file = w.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(PlaceError::io(&tmp, e));
    }
    fs::rename(&tmp, path).map_err(|e| PlaceError::io(path, e))?;
    tracing::debug!(path = %path.display(), "artifact written");
    Ok(())
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Streaming reader over a canonical placements file.
pub struct PlacementReader {
    path: PathBuf,
    lines: io::Lines<BufReader<File>>,
}

impl Iterator for PlacementReader {
    type Item = PlaceResult<Placement>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(PlaceError::io(&self.path, e))),
            };
            if line.is_empty() {
                continue;
            }
            return Some(line.parse::<Placement>());
        }
    }
}

/// Open a canonical placements file for linear replay.
pub fn read_placements(path: &Path) -> PlaceResult<PlacementReader> {
    let file = File::open(path).map_err(|e| PlaceError::io(path, e))?;
    Ok(PlacementReader {
        path: path.to_path_buf(),
        lines: BufReader::with_capacity(1 << 20, file).lines(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/ingest/canonical.rs"]
mod tests;
