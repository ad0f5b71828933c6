use crate::foundation::error::{PlaceError, PlaceResult};
use crate::ingest::epoch::Epoch;

/// Canvas dimensions and palette size in effect for one stretch of a replay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasEpoch {
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// Number of valid color indices.
    pub palette_size: u16,
}

impl CanvasEpoch {
    /// Step with the given canvas size and palette size.
    pub const fn new(width: u32, height: u32, palette_size: u16) -> Self {
        Self {
            width,
            height,
            palette_size,
        }
    }

    /// Whether a placement at `(x, y)` with `color` fits this canvas.
    pub fn fits(&self, x: u32, y: u32, color: u8) -> bool {
        x < self.width && y < self.height && u16::from(color) < self.palette_size
    }

    fn contains(&self, prev: &CanvasEpoch) -> bool {
        self.width >= prev.width
            && self.height >= prev.height
            && self.palette_size >= prev.palette_size
    }
}

/// Ordered, monotonically non-decreasing sequence of canvas epochs.
///
/// Index 0 of the ladder is reported as epoch 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanvasLadder {
    steps: Vec<CanvasEpoch>,
}

const LADDER_2017: [CanvasEpoch; 1] = [CanvasEpoch::new(1000, 1000, 16)];
const LADDER_2022: [CanvasEpoch; 3] = [
    CanvasEpoch::new(1000, 1000, 16),
    CanvasEpoch::new(2000, 1000, 24),
    CanvasEpoch::new(2000, 2000, 32),
];
const LADDER_2023: [CanvasEpoch; 1] = [CanvasEpoch::new(3000, 2000, 32)];

impl CanvasLadder {
    /// Build a ladder from explicit steps.
    pub fn new(steps: Vec<CanvasEpoch>) -> PlaceResult<Self> {
        let Some(first) = steps.first() else {
            return Err(PlaceError::validation("canvas ladder must have at least one step"));
        };
        if first.width == 0 || first.height == 0 || first.palette_size == 0 {
            return Err(PlaceError::validation(
                "canvas dimensions and palette size must be non-zero",
            ));
        }
        if first.palette_size > 256 {
            return Err(PlaceError::validation("palette size must be <= 256"));
        }
        for pair in steps.windows(2) {
            if !pair[1].contains(&pair[0]) {
                return Err(PlaceError::validation(format!(
                    "canvas ladder must not shrink: {:?} -> {:?}",
                    pair[0], pair[1]
                )));
            }
            if pair[1].palette_size > 256 {
                return Err(PlaceError::validation("palette size must be <= 256"));
            }
        }
        Ok(Self { steps })
    }

    /// The built-in ladder for a dataset epoch.
    pub fn for_epoch(epoch: Epoch) -> Self {
        let steps = match epoch {
            Epoch::Y2017 => LADDER_2017.to_vec(),
            Epoch::Y2022 => LADDER_2022.to_vec(),
            Epoch::Y2023 => LADDER_2023.to_vec(),
        };
        Self { steps }
    }

    /// Steps in replay order.
    pub fn steps(&self) -> &[CanvasEpoch] {
        &self.steps
    }

    /// Number of epochs.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the ladder has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step for 1-based epoch number `n`.
    pub fn get(&self, n: usize) -> Option<&CanvasEpoch> {
        n.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    /// The largest palette any step uses.
    pub fn max_palette(&self) -> u16 {
        self.steps.last().map_or(0, |s| s.palette_size)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/ladder.rs"]
mod tests;
