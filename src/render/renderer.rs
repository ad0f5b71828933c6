use std::path::Path;

use crate::encode::pool::EncoderPool;
use crate::foundation::core::Placement;
use crate::foundation::error::{PlaceError, PlaceResult};
use crate::foundation::palette::Palette;
use crate::ingest::canonical::read_placements;
use crate::ingest::epoch::Epoch;
use crate::render::ladder::{CanvasEpoch, CanvasLadder};
use crate::render::raster::Raster;
use crate::render::sink::{EncodeReport, Snapshot, SnapshotSink};

/// Options controlling frame replay and snapshot encoding.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderOpts {
    /// Duration between consecutive cutoffs.
    pub frame_interval_ms: u64,
    /// Encoder worker threads.
    pub encoder_threads: usize,
    /// Encode jobs that may wait in the queue before submission backs off.
    pub queue_capacity: usize,
    /// Sleep between submission attempts while the queue is full.
    pub retry_delay_ms: u64,
    /// Upper bound on the final wait for outstanding encode jobs.
    pub finish_timeout_ms: u64,
    /// Emit one snapshot per crossed interval, including intervals without placements.
    /// When `false` the cutoff advances at most once per placement.
    pub fill_idle_intervals: bool,
}

impl Default for RenderOpts {
    fn default() -> Self {
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        let encoder_threads = (cores / 2).max(1);
        Self {
            frame_interval_ms: 300_000,
            encoder_threads,
            queue_capacity: encoder_threads * 2,
            retry_delay_ms: 100,
            finish_timeout_ms: 60_000,
            fill_idle_intervals: true,
        }
    }
}

impl RenderOpts {
    pub fn validate(&self) -> PlaceResult<()> {
        if self.frame_interval_ms == 0 {
            return Err(PlaceError::validation("frame interval must be > 0"));
        }
        if i64::try_from(self.frame_interval_ms).is_err() {
            return Err(PlaceError::validation("frame interval is out of range"));
        }
        if self.encoder_threads == 0 {
            return Err(PlaceError::validation("encoder threads must be >= 1"));
        }
        if self.queue_capacity == 0 {
            return Err(PlaceError::validation("queue capacity must be >= 1"));
        }
        Ok(())
    }
}

/// Summary of one replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Placements painted.
    pub placements: u64,
    /// Snapshots handed to the sink.
    pub snapshots: u64,
    /// Canvas epoch in effect at the end (1-based).
    pub final_epoch: usize,
    /// What the sink reported when drained.
    pub encode: EncodeReport,
}

/// Replays a timestamp-sorted placement stream onto a growing raster.
///
/// Before painting a placement the renderer first flushes every cutoff the placement's timestamp
/// has passed (one snapshot each), then climbs the canvas ladder until the placement fits. The
/// raster is only ever touched from the thread driving the renderer; snapshots are owned copies.
pub struct FrameRenderer<S: SnapshotSink> {
    ladder: CanvasLadder,
    palette: Palette,
    interval_ms: i64,
    fill_idle_intervals: bool,
    sink: S,
    epoch: usize,
    raster: Raster,
    cutoff_ms: Option<i64>,
    last_ts: Option<i64>,
    stats: RenderStats,
}

impl<S: SnapshotSink> FrameRenderer<S> {
    pub fn new(
        ladder: CanvasLadder,
        palette: Palette,
        opts: &RenderOpts,
        sink: S,
    ) -> PlaceResult<Self> {
        opts.validate()?;
        if usize::from(ladder.max_palette()) > palette.len() {
            return Err(PlaceError::validation(format!(
                "canvas ladder needs {} colors but the palette has {}",
                ladder.max_palette(),
                palette.len()
            )));
        }
        let Some(first) = ladder.get(1).copied() else {
            return Err(PlaceError::validation("canvas ladder is empty"));
        };
        let interval_ms = i64::try_from(opts.frame_interval_ms)
            .map_err(|_| PlaceError::validation("frame interval is out of range"))?;
        Ok(Self {
            ladder,
            palette,
            interval_ms,
            fill_idle_intervals: opts.fill_idle_intervals,
            sink,
            epoch: 1,
            raster: Raster::new(first.width, first.height),
            cutoff_ms: None,
            last_ts: None,
            stats: RenderStats::default(),
        })
    }

    /// Current 1-based canvas epoch.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Live raster (read-only).
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// The next cutoff, once the first placement has been seen.
    pub fn cutoff_ms(&self) -> Option<i64> {
        self.cutoff_ms
    }

    /// Process one placement.
    pub fn push(&mut self, p: &Placement) -> PlaceResult<()> {
        if let Some(prev) = self.last_ts
            && p.timestamp < prev
        {
            return Err(PlaceError::validation(format!(
                "placement at {} precedes previous timestamp {prev}; input must be sorted",
                p.timestamp
            )));
        }
        self.advance_cutoff(p.timestamp)?;
        self.advance_epoch(p)?;

        self.raster.paint(p.x, p.y, p.color);
        self.last_ts = Some(p.timestamp);
        self.stats.placements += 1;
        Ok(())
    }

    /// Drive the renderer over a whole stream, then finish.
    pub fn replay<I>(mut self, placements: I) -> PlaceResult<RenderStats>
    where
        I: IntoIterator<Item = PlaceResult<Placement>>,
    {
        for p in placements {
            self.push(&p?)?;
        }
        self.finish()
    }

    /// Emit the final partial interval and drain the sink.
    #[tracing::instrument(skip(self), fields(placements = self.stats.placements))]
    pub fn finish(mut self) -> PlaceResult<RenderStats> {
        if let Some(cutoff) = self.cutoff_ms
            && self.stats.placements > 0
        {
            self.snapshot(cutoff)?;
        }
        let report = self.sink.finish()?;
        self.stats.encode = report;
        self.stats.final_epoch = self.epoch;
        tracing::info!(
            snapshots = self.stats.snapshots,
            written = report.written,
            failed = report.failed,
            pending = report.pending,
            "replay finished"
        );
        Ok(self.stats)
    }

    fn advance_cutoff(&mut self, ts: i64) -> PlaceResult<()> {
        let overflow = || PlaceError::validation(format!("cutoff after {ts} overflows i64"));
        let Some(mut cutoff) = self.cutoff_ms else {
            let first = ts
                .div_euclid(self.interval_ms)
                .checked_mul(self.interval_ms)
                .and_then(|start| start.checked_add(self.interval_ms))
                .ok_or_else(overflow)?;
            self.cutoff_ms = Some(first);
            return Ok(());
        };
        while ts > cutoff {
            self.snapshot(cutoff)?;
            cutoff = cutoff.checked_add(self.interval_ms).ok_or_else(overflow)?;
            if !self.fill_idle_intervals {
                break;
            }
        }
        self.cutoff_ms = Some(cutoff);
        Ok(())
    }

    fn advance_epoch(&mut self, p: &Placement) -> PlaceResult<()> {
        while !self.current().fits(p.x, p.y, p.color) {
            let Some(next) = self.ladder.get(self.epoch + 1).copied() else {
                return Err(PlaceError::validation(format!(
                    "placement ({},{}) color {} at {} exceeds the last canvas epoch {:?}",
                    p.x,
                    p.y,
                    p.color,
                    p.timestamp,
                    self.current()
                )));
            };
            self.epoch += 1;
            self.raster.grow_to(next.width, next.height);
            tracing::info!(
                epoch = self.epoch,
                width = next.width,
                height = next.height,
                palette = next.palette_size,
                ts = p.timestamp,
                "canvas epoch advanced"
            );
        }
        Ok(())
    }

    fn current(&self) -> CanvasEpoch {
        // `epoch` only ever indexes an existing step.
        self.ladder.steps()[self.epoch - 1]
    }

    fn snapshot(&mut self, cutoff_ms: i64) -> PlaceResult<()> {
        let step = self.current();
        let snapshot = Snapshot {
            epoch: self.epoch,
            cutoff_ms,
            width: self.raster.width(),
            height: self.raster.height(),
            pixels: self.raster.pixels().to_vec(),
            palette: self.palette.prefix(usize::from(step.palette_size)),
        };
        tracing::debug!(epoch = self.epoch, cutoff_ms, "snapshot");
        self.sink.push_snapshot(snapshot)?;
        self.stats.snapshots += 1;
        Ok(())
    }
}

/// Replay a canonical placements file into PNG frames under `frames_dir`, using the built-in
/// canvas ladder and palette of `epoch`.
#[tracing::instrument(skip_all, fields(epoch = %epoch, placements = %placements.display(), frames = %frames_dir.display()))]
pub fn render_canonical_log(
    epoch: Epoch,
    placements: &Path,
    frames_dir: &Path,
    opts: &RenderOpts,
) -> PlaceResult<RenderStats> {
    let pool = EncoderPool::new(frames_dir, opts)?;
    let renderer = FrameRenderer::new(CanvasLadder::for_epoch(epoch), epoch.palette(), opts, pool)?;
    renderer.replay(read_placements(placements)?)
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
