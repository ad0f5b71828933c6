use super::*;
use crate::foundation::palette::Rgb8;
use crate::ingest::epoch::Epoch;
use std::path::PathBuf;

fn out_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_png").join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn snapshot(width: u32, height: u32, pixels: Vec<u8>) -> Snapshot {
    Snapshot {
        epoch: 1,
        cutoff_ms: 1_648_771_500_000,
        width,
        height,
        pixels,
        palette: Epoch::Y2022.palette().prefix(16),
    }
}

#[test]
fn file_names_sort_by_epoch_then_time() {
    let a = frame_file_name(1, 1_648_771_500_000).unwrap();
    let b = frame_file_name(1, 1_648_771_800_000).unwrap();
    let c = frame_file_name(2, 1_648_771_200_000).unwrap();
    assert_eq!(a, "place_01_20220401T000500.000Z.png");
    assert!(a < b && b < c);
}

#[test]
fn indexed_png_decodes_to_palette_colors() {
    let dir = out_dir("decode");
    let path = dir.join("frame.png");
    let snap = snapshot(3, 2, vec![0, 1, 15, 15, 1, 0]);
    write_indexed_png(&path, &snap).unwrap();
    assert!(!tmp_path(&path).exists());

    let img = image::open(&path).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (3, 2));
    let rgb = |c: Rgb8| image::Rgb([c.r, c.g, c.b]);
    assert_eq!(*img.get_pixel(0, 0), rgb(snap.palette[0]));
    assert_eq!(*img.get_pixel(1, 0), rgb(snap.palette[1]));
    assert_eq!(*img.get_pixel(2, 0), rgb(snap.palette[15]));
    assert_eq!(*img.get_pixel(0, 1), rgb(snap.palette[15]));
}

#[test]
fn mismatched_pixel_count_is_an_encode_error() {
    let dir = out_dir("mismatch");
    let path = dir.join("frame.png");
    let res = write_indexed_png(&path, &snapshot(3, 2, vec![0; 5]));
    assert!(matches!(res, Err(PlaceError::Encode(_))));
    assert!(!path.exists());
}

#[test]
fn unwritable_destination_is_an_io_error() {
    let dir = out_dir("missing");
    let path = dir.join("no-such-dir").join("frame.png");
    let res = write_indexed_png(&path, &snapshot(1, 1, vec![0]));
    assert!(matches!(res, Err(PlaceError::Io { .. })));
}
