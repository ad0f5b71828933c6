use super::*;
use std::io::Write;

fn fixture_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_reader").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_plain(path: &Path, body: &str) {
    std::fs::write(path, body).unwrap();
}

fn write_gzip(path: &Path, body: &str) {
    let f = File::create(path).unwrap();
    let mut enc = flate2::write::GzEncoder::new(f, flate2::Compression::fast());
    enc.write_all(body.as_bytes()).unwrap();
    enc.finish().unwrap();
}

#[test]
fn header_is_skipped_and_order_kept_per_file() {
    let dir = fixture_dir("header");
    let a = dir.join("a.csv");
    let b = dir.join("b.csv.gzip");
    write_plain(&a, "timestamp,user\na1\na2\r\n\na3\n");
    write_gzip(&b, "timestamp,user\nb1\nb2");

    let reader = FileReader::new([a, b], 2).unwrap();
    let lines = reader.read_lines().unwrap();
    assert_eq!(lines, vec!["a1", "a2", "a3", "b1", "b2"]);
}

#[test]
fn fold_returns_one_accumulator_per_file_in_caller_order() {
    let dir = fixture_dir("fold");
    let mut paths = Vec::new();
    for i in 0..5 {
        let p = dir.join(format!("part{i}.csv"));
        let mut body = String::from("header\n");
        for j in 0..=i {
            body.push_str(&format!("{i}-{j}\n"));
        }
        write_plain(&p, &body);
        paths.push(p);
    }

    let reader = FileReader::new(paths, 3).unwrap();
    let counts = reader
        .fold_lines(|| 0usize, |n, _| {
            *n += 1;
            Ok(())
        })
        .unwrap();
    assert_eq!(counts, vec![1, 2, 3, 4, 5]);
}

#[test]
fn missing_file_is_fatal() {
    let dir = fixture_dir("missing");
    let ok = dir.join("ok.csv");
    write_plain(&ok, "h\nline\n");
    let reader = FileReader::new([ok, dir.join("nope.csv")], 2).unwrap();
    let err = reader.read_lines().unwrap_err();
    assert!(matches!(err, PlaceError::Io { .. }));
    assert!(err.to_string().contains("nope.csv"));
}

#[test]
fn fold_error_aborts_the_run() {
    let dir = fixture_dir("abort");
    let p = dir.join("x.csv");
    write_plain(&p, "h\ngood\nbad\n");
    let reader = FileReader::new([p], 1).unwrap();
    let res = reader.fold_lines(
        || (),
        |_, line| {
            if line == "bad" {
                Err(PlaceError::format("bad line"))
            } else {
                Ok(())
            }
        },
    );
    assert!(matches!(res, Err(PlaceError::Format(_))));
}

#[test]
fn compressed_suffixes_are_recognized() {
    assert!(is_compressed(Path::new("2022_place_canvas_history-000000000000.csv.gzip")));
    assert!(is_compressed(Path::new("x.csv.gz")));
    assert!(!is_compressed(Path::new("x.csv")));
}

#[test]
fn zero_threads_is_rejected() {
    let empty: [PathBuf; 0] = [];
    assert!(FileReader::new(empty, 0).is_err());
}
