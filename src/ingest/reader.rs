use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use rayon::prelude::*;

use crate::foundation::error::{PlaceError, PlaceResult};

const READ_BUFFER_BYTES: usize = 1 << 20;
const COMPRESSED_SUFFIXES: [&str; 2] = [".gz", ".gzip"];

/// Reads a fixed set of source files in parallel on a bounded pool.
///
/// The first line of every file is a header and is never handed to callers. Line order is
/// preserved within a file; results are returned per file, in the order the paths were given.
#[derive(Clone, Debug)]
pub struct FileReader {
    files: Vec<PathBuf>,
    threads: usize,
}

impl FileReader {
    /// Create a reader over `files` using at most `threads` worker threads.
    pub fn new<P: Into<PathBuf>>(
        files: impl IntoIterator<Item = P>,
        threads: usize,
    ) -> PlaceResult<Self> {
        if threads == 0 {
            return Err(PlaceError::validation("reader threads must be >= 1"));
        }
        Ok(Self {
            files: files.into_iter().map(Into::into).collect(),
            threads,
        })
    }

    /// Source files in caller order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Fold every data line of each file into a fresh per-file accumulator.
    ///
    /// Files are processed concurrently; the first error (I/O or returned by `fold`) aborts the
    /// whole call.
    pub fn fold_lines<A, I, F>(&self, init: I, fold: F) -> PlaceResult<Vec<A>>
    where
        A: Send,
        I: Fn() -> A + Sync,
        F: Fn(&mut A, &str) -> PlaceResult<()> + Sync,
    {
        let pool = build_thread_pool(self.threads)?;
        pool.install(|| {
            self.files
                .par_iter()
                .map(|path| {
                    let mut acc = init();
                    let lines = for_each_line(path, |line| fold(&mut acc, line))?;
                    tracing::debug!(path = %path.display(), lines, "finished source file");
                    Ok(acc)
                })
                .collect::<PlaceResult<Vec<A>>>()
        })
    }

    /// Collect all data lines of all files into one merged sequence.
    ///
    /// Files are concatenated in caller order.
    pub fn read_lines(&self) -> PlaceResult<Vec<String>> {
        let per_file = self.fold_lines(Vec::new, |acc: &mut Vec<String>, line| {
            acc.push(line.to_owned());
            Ok(())
        })?;
        Ok(per_file.into_iter().flatten().collect())
    }
}

/// Return `true` when `path` names a gzip-compressed source.
pub fn is_compressed(path: &Path) -> bool {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    COMPRESSED_SUFFIXES.iter().any(|s| name.ends_with(s))
}

fn open_source(path: &Path) -> PlaceResult<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| PlaceError::io(path, e))?;
    if is_compressed(path) {
        Ok(Box::new(BufReader::with_capacity(
            READ_BUFFER_BYTES,
            MultiGzDecoder::new(file),
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER_BYTES, file)))
    }
}

fn for_each_line(
    path: &Path,
    mut f: impl FnMut(&str) -> PlaceResult<()>,
) -> PlaceResult<u64> {
    tracing::debug!(path = %path.display(), "reading source file");
    let mut reader = open_source(path)?;
    let mut buf = String::new();
    let mut header = true;
    let mut count = 0u64;
    loop {
        buf.clear();
        let n = reader
            .read_line(&mut buf)
            .map_err(|e| PlaceError::io(path, e))?;
        if n == 0 {
            break;
        }
        if header {
            header = false;
            continue;
        }
        let line = buf.trim_end_matches(['\n', '\r']);
        if line.is_empty() {
            continue;
        }
        f(line)?;
        count += 1;
    }
    Ok(count)
}

fn build_thread_pool(threads: usize) -> PlaceResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("place-reader-{i}"))
        .build()
        .map_err(|e| PlaceError::validation(format!("failed to build reader thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/ingest/reader.rs"]
mod tests;
