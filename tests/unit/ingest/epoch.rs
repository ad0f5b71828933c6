use super::*;

fn users() -> (UserDictionary, String, String) {
    let a = RawUserId::new(b"user-a".to_vec());
    let b = RawUserId::new(b"user-b".to_vec());
    let (a64, b64) = (a.to_base64(), b.to_base64());
    (UserDictionary::build([a, b]).unwrap(), a64, b64)
}

fn placement(outcome: ParseOutcome) -> Placement {
    match outcome {
        ParseOutcome::Placement(p) => p,
        other => panic!("expected placement, got {other:?}"),
    }
}

#[test]
fn epoch_tags_parse_and_display() {
    for tag in ["2017", "2022", "2023"] {
        assert_eq!(tag.parse::<Epoch>().unwrap().to_string(), tag);
    }
    assert!("2021".parse::<Epoch>().is_err());
}

#[test]
fn y2022_resolves_hex_colors_and_quoted_coordinates() {
    let (dict, a, b) = users();
    let parser = RecordParser::new(Epoch::Y2022);

    let p1 = placement(
        parser
            .parse_with(&format!("2022-04-01 00:00:00.000,{a},#FF4500,\"1,2\""), &dict)
            .unwrap(),
    );
    let p2 = placement(
        parser
            .parse_with(&format!("2022-04-01 00:00:05.500 UTC,{b},#FFFFFF,\"3,4\""), &dict)
            .unwrap(),
    );

    assert_eq!(
        p1,
        Placement {
            timestamp: 1_648_771_200_000,
            user: 0,
            x: 1,
            y: 2,
            color: 15,
        }
    );
    assert_eq!(p2.timestamp, 1_648_771_205_500);
    assert_eq!((p2.user, p2.x, p2.y, p2.color), (1, 3, 4, 0));
}

#[test]
fn y2022_rectangle_line_is_an_anomaly() {
    let (dict, a, _) = users();
    let parser = RecordParser::new(Epoch::Y2022);
    let line = format!("2022-04-04 00:53:51.577 UTC,{a},#000000,\"0,0,1,1\"");
    assert_eq!(
        parser.parse_with(&line, &dict).unwrap(),
        ParseOutcome::Anomaly
    );
    let three = format!("2022-04-04 00:53:51.577 UTC,{a},#000000,\"1,2,3\"");
    assert_eq!(
        parser.parse_with(&three, &dict).unwrap(),
        ParseOutcome::Anomaly
    );
}

#[test]
fn anomalies_are_recorded_in_the_context() {
    let (dict, a, _) = users();
    let ctx = RunContext::new(dict);
    let parser = RecordParser::new(Epoch::Y2022);
    let line = format!("2022-04-04 00:53:51.577 UTC,{a},#000000,\"1,2,3\"");
    assert_eq!(parser.parse(&line, &ctx).unwrap(), ParseOutcome::Anomaly);
    assert_eq!(ctx.into_anomalies(), vec![line]);
}

#[test]
fn unknown_color_is_fatal() {
    let (dict, a, _) = users();
    let parser = RecordParser::new(Epoch::Y2022);
    let line = format!("2022-04-01 00:00:00.000,{a},#123456,\"1,2\"");
    assert!(matches!(
        parser.parse_with(&line, &dict),
        Err(PlaceError::Format(_))
    ));
}

#[test]
fn unknown_user_is_fatal() {
    let (dict, _, _) = users();
    let parser = RecordParser::new(Epoch::Y2022);
    let stranger = RawUserId::new(b"stranger".to_vec()).to_base64();
    let line = format!("2022-04-01 00:00:00.000,{stranger},#FFFFFF,\"1,2\"");
    assert!(parser.parse_with(&line, &dict).is_err());
}

#[test]
fn y2023_shifts_centered_coordinates() {
    let (dict, a, _) = users();
    let parser = RecordParser::new(Epoch::Y2023);
    let p = placement(
        parser
            .parse_with(&format!("2023-07-20 13:00:26.088 UTC,{a},\"-1500,-1000\",#FF4500"), &dict)
            .unwrap(),
    );
    assert_eq!((p.x, p.y, p.color), (0, 0, 0));

    let q = placement(
        parser
            .parse_with(&format!("2023-07-20 13:00:26.1 UTC,{a},\"12,-3\",#FFFFFF"), &dict)
            .unwrap(),
    );
    assert_eq!((q.x, q.y, q.color), (1512, 997, 7));
    assert_eq!(q.timestamp % 1000, 100);
}

#[test]
fn y2023_circle_is_an_anomaly() {
    let (dict, a, _) = users();
    let parser = RecordParser::new(Epoch::Y2023);
    let line = format!("2023-07-20 13:00:26.088 UTC,{a},\"{{X: 1, Y: 2, R: 3}}\",#000000");
    assert_eq!(
        parser.parse_with(&line, &dict).unwrap(),
        ParseOutcome::Anomaly
    );
}

#[test]
fn y2017_drops_truncated_and_out_of_range_rows() {
    let (dict, a, _) = users();
    let parser = RecordParser::new(Epoch::Y2017);

    let ok = placement(
        parser
            .parse_with(&format!("2017-03-31 00:03:40.964 UTC,{a},999,0,15"), &dict)
            .unwrap(),
    );
    assert_eq!((ok.x, ok.y, ok.color), (999, 0, 15));

    for line in [
        format!("2017-03-31 00:03:40.964 UTC,{a},,5,3"),
        format!("2017-03-31 00:03:40.964 UTC,{a},5,,3"),
        format!("2017-03-31 00:03:40.964 UTC,{a},1000,5,3"),
        format!("2017-03-31 00:03:40.964 UTC,{a},5,1000,3"),
    ] {
        assert_eq!(
            parser.parse_with(&line, &dict).unwrap(),
            ParseOutcome::Dropped,
            "{line}"
        );
    }
}

#[test]
fn y2017_rejects_color_outside_palette() {
    let (dict, a, _) = users();
    let parser = RecordParser::new(Epoch::Y2017);
    let line = format!("2017-03-31 00:03:40.964 UTC,{a},1,1,16");
    assert!(parser.parse_with(&line, &dict).is_err());
}

#[test]
fn dropped_rows_are_counted() {
    let (dict, a, _) = users();
    let ctx = RunContext::new(dict);
    let parser = RecordParser::new(Epoch::Y2017);
    let line = format!("2017-03-31 00:03:40.964 UTC,{a},,5,3");
    assert_eq!(parser.parse(&line, &ctx).unwrap(), ParseOutcome::Dropped);
    assert_eq!(ctx.dropped(), 1);
    assert_eq!(ctx.anomaly_count(), 0);
}

#[test]
fn too_few_fields_is_a_format_error() {
    let (dict, a, _) = users();
    let parser = RecordParser::new(Epoch::Y2022);
    let line = format!("2022-04-01 00:00:00.000,{a},#FFFFFF");
    assert!(matches!(
        parser.parse_with(&line, &dict),
        Err(PlaceError::Format(_))
    ));
}

#[test]
fn user_field_is_extracted_for_every_epoch() {
    let (_, a, _) = users();
    let line = format!("2022-04-01 00:00:00.000,{a},#FFFFFF,\"1,2\"");
    for epoch in [Epoch::Y2017, Epoch::Y2022, Epoch::Y2023] {
        let id = RecordParser::new(epoch).user_id(&line).unwrap();
        assert_eq!(id.as_bytes(), b"user-a");
    }
}
