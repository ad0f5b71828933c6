use crate::foundation::error::PlaceResult;
use crate::foundation::palette::Rgb8;

/// Owned copy of the raster at a cutoff, detached from the renderer's live buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// 1-based canvas epoch the snapshot was taken in.
    pub epoch: usize,
    /// Cutoff timestamp (ms since Unix epoch) the snapshot is tagged with.
    pub cutoff_ms: i64,
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// Row-major palette indices.
    pub pixels: Vec<u8>,
    /// Colors valid in this epoch, in index order.
    pub palette: &'static [Rgb8],
}

/// Outcome of draining a sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeReport {
    /// Snapshots persisted successfully.
    pub written: u64,
    /// Snapshots whose job failed (logged, not fatal).
    pub failed: u64,
    /// Snapshots still in flight when the finish wait timed out.
    pub pending: u64,
}

/// Consumer of renderer snapshots.
///
/// Ordering contract: `push_snapshot` is called in non-decreasing `(epoch, cutoff_ms)` order and
/// `finish` is called exactly once, after the last snapshot.
pub trait SnapshotSink {
    /// Accept one snapshot. Implementations may process it asynchronously.
    fn push_snapshot(&mut self, snapshot: Snapshot) -> PlaceResult<()>;
    /// Wait for outstanding work and report what happened to every snapshot.
    fn finish(&mut self) -> PlaceResult<EncodeReport>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    pub(crate) snapshots: Vec<Snapshot>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the captured snapshots in push order.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }
}

impl SnapshotSink for InMemorySink {
    fn push_snapshot(&mut self, snapshot: Snapshot) -> PlaceResult<()> {
        self.snapshots.push(snapshot);
        Ok(())
    }

    fn finish(&mut self) -> PlaceResult<EncodeReport> {
        Ok(EncodeReport {
            written: self.snapshots.len() as u64,
            ..EncodeReport::default()
        })
    }
}

impl<S: SnapshotSink + ?Sized> SnapshotSink for &mut S {
    fn push_snapshot(&mut self, snapshot: Snapshot) -> PlaceResult<()> {
        (**self).push_snapshot(snapshot)
    }

    fn finish(&mut self) -> PlaceResult<EncodeReport> {
        (**self).finish()
    }
}
