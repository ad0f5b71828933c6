use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{PlaceError, PlaceResult};
use crate::ingest::pipeline::IngestOpts;
use crate::render::renderer::RenderOpts;

/// Run configuration for both phases. Every field is optional in the JSON form.
///
/// ```json
/// { "ingest": { "threads": 4 }, "render": { "frame_interval_ms": 60000 } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub ingest: IngestOpts,
    pub render: RenderOpts,
}

impl Config {
    /// Load and validate a JSON config file.
    pub fn from_path(path: &Path) -> PlaceResult<Self> {
        let file = File::open(path).map_err(|e| PlaceError::io(path, e))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            PlaceError::validation(format!("invalid config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> PlaceResult<()> {
        if self.ingest.threads == 0 {
            return Err(PlaceError::validation("ingest threads must be >= 1"));
        }
        self.render.validate()
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
