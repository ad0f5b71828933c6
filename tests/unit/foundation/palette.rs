use super::*;

#[test]
fn hex_lookup_matches_table_position() {
    let p = Palette::new(&COLORS_2022);
    assert_eq!(p.index_of_hex("#FFFFFF").unwrap(), 0);
    assert_eq!(p.index_of_hex("#FF4500").unwrap(), 15);
    assert_eq!(p.index_of_hex("#6D001A").unwrap(), 31);
    assert_eq!(p.index_of_hex("#ff4500").unwrap(), 15);
}

#[test]
fn same_color_maps_differently_per_epoch() {
    let y2022 = Palette::new(&COLORS_2022);
    let y2023 = Palette::new(&COLORS_2023);
    assert_eq!(y2022.index_of_hex("#FF4500").unwrap(), 15);
    assert_eq!(y2023.index_of_hex("#FF4500").unwrap(), 0);
}

#[test]
fn unknown_or_malformed_keys_are_format_errors() {
    let p = Palette::new(&COLORS_2022);
    for key in ["#123456", "FFFFFF", "#FFF", "#GGGGGG", ""] {
        assert!(
            matches!(p.index_of_hex(key), Err(PlaceError::Format(_))),
            "{key}"
        );
    }
}

#[test]
fn prefix_clamps_to_table_size() {
    let p = Palette::new(&COLORS_2017);
    assert_eq!(p.prefix(8).len(), 8);
    assert_eq!(p.prefix(64).len(), 16);
}
