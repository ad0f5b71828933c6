use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use crate::foundation::core::sortable_utc_stamp;
use crate::foundation::error::{PlaceError, PlaceResult};
use crate::ingest::canonical::tmp_path;
use crate::render::sink::Snapshot;

/// File name for a frame: epoch first, then a sortable UTC stamp of the cutoff, so a plain
/// lexicographic listing is chronological.
pub fn frame_file_name(epoch: usize, cutoff_ms: i64) -> PlaceResult<String> {
    Ok(format!("place_{epoch:02}_{}.png", sortable_utc_stamp(cutoff_ms)?))
}

/// Encode a snapshot as an 8-bit indexed PNG at `path`.
///
/// The image is written to a sibling temporary file and renamed into place once complete.
pub fn write_indexed_png(path: &Path, snapshot: &Snapshot) -> PlaceResult<()> {
    let expected = snapshot.width as usize * snapshot.height as usize;
    if snapshot.pixels.len() != expected {
        return Err(PlaceError::encode(format!(
            "snapshot has {} pixels, expected {}x{}",
            snapshot.pixels.len(),
            snapshot.width,
            snapshot.height
        )));
    }
    if snapshot.palette.is_empty() || snapshot.palette.len() > 256 {
        return Err(PlaceError::encode(format!(
            "palette of {} colors cannot be stored in an indexed png",
            snapshot.palette.len()
        )));
    }

    let tmp = tmp_path(path);
    if let Err(e) = encode_to(&tmp, snapshot) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path).map_err(|e| PlaceError::io(path, e))
}

fn encode_to(path: &Path, snapshot: &Snapshot) -> PlaceResult<()> {
    let file = File::create(path).map_err(|e| PlaceError::io(path, e))?;
    let w = BufWriter::new(file);

    let palette: Vec<u8> = snapshot
        .palette
        .iter()
        .flat_map(|c| [c.r, c.g, c.b])
        .collect();

    let mut encoder = png::Encoder::new(w, snapshot.width, snapshot.height);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(palette);
    encoder.set_compression(png::Compression::Fast);

    let encode_err = |e: png::EncodingError| {
        PlaceError::encode(format!("png encode '{}': {e}", path.display()))
    };
    let mut writer = encoder.write_header().map_err(encode_err)?;
    writer.write_image_data(&snapshot.pixels).map_err(encode_err)?;
    writer.finish().map_err(encode_err)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
