//! Placereplay turns raw pixel-placement event logs into a canonical, sorted log and replays that
//! log into timelapse frames.
//!
//! - Normalize source files with [`Ingest`] (user dictionary, placements, anomalies)
//! - Replay the canonical log with a [`FrameRenderer`] into any [`SnapshotSink`]
//! - Persist frames as indexed PNGs through the background [`EncoderPool`]
#![forbid(unsafe_code)]

mod config;
mod encode;
mod foundation;
mod ingest;
mod render;

pub use crate::config::Config;
pub use crate::foundation::core::{Placement, RawUserId, parse_utc_millis, sortable_utc_stamp};
pub use crate::foundation::error::{PlaceError, PlaceResult};
pub use crate::foundation::palette::{Palette, Rgb8};

pub use crate::ingest::canonical::{
    CanonicalPaths, PlacementReader, read_placements, write_anomalies, write_lines,
    write_placements, write_users,
};
pub use crate::ingest::context::RunContext;
pub use crate::ingest::epoch::{Epoch, ParseOutcome, RecordParser};
pub use crate::ingest::pipeline::{Ingest, IngestOpts, IngestStats};
pub use crate::ingest::reader::{FileReader, is_compressed};
pub use crate::ingest::users::UserDictionary;

pub use crate::render::ladder::{CanvasEpoch, CanvasLadder};
pub use crate::render::raster::Raster;
pub use crate::render::renderer::{FrameRenderer, RenderOpts, RenderStats, render_canonical_log};
pub use crate::render::sink::{EncodeReport, InMemorySink, Snapshot, SnapshotSink};

pub use crate::encode::png::{frame_file_name, write_indexed_png};
pub use crate::encode::pool::EncoderPool;
