use super::*;
use std::path::PathBuf;

fn id(bytes: &[u8]) -> RawUserId {
    RawUserId::new(bytes.to_vec())
}

#[test]
fn indices_are_a_permutation_in_sorted_order() {
    let raw = vec![id(&[9]), id(&[0xff, 0]), id(&[1, 2]), id(&[9]), id(&[1]), id(&[0x80])];
    let dict = UserDictionary::build(raw.clone()).unwrap();
    assert_eq!(dict.len(), 5);

    let mut seen: Vec<u32> = raw.iter().map(|r| dict.index_of(r).unwrap()).collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen, (0..5).collect::<Vec<u32>>());

    for w in dict.ids().windows(2) {
        assert!(w[0] < w[1]);
    }
    assert_eq!(dict.index_of(&id(&[1])), Some(0));
    assert_eq!(dict.index_of(&id(&[0xff, 0])), Some(4));
    assert_eq!(dict.id_at(2), Some(&id(&[9])));
    assert_eq!(dict.index_of(&id(&[7])), None);
}

#[test]
fn empty_dictionary_is_valid() {
    let dict = UserDictionary::build(Vec::new()).unwrap();
    assert!(dict.is_empty());
    assert_eq!(dict.id_at(0), None);
}

#[test]
fn read_from_restores_indices() {
    let dir = PathBuf::from("target").join("unit_users");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("users.txt");
    let dict = UserDictionary::build(vec![id(b"bob"), id(b"alice"), id(b"carol")]).unwrap();
    let body: String = dict
        .ids()
        .iter()
        .map(|u| format!("{}\n", u.to_base64()))
        .collect();
    std::fs::write(&path, body).unwrap();

    let loaded = UserDictionary::read_from(&path).unwrap();
    assert_eq!(loaded, dict);
    assert_eq!(loaded.index_of(&id(b"alice")), Some(0));
}

#[test]
fn read_from_rejects_unsorted_file() {
    let dir = PathBuf::from("target").join("unit_users");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("unsorted.txt");
    std::fs::write(
        &path,
        format!("{}\n{}\n", id(b"b").to_base64(), id(b"a").to_base64()),
    )
    .unwrap();
    assert!(matches!(
        UserDictionary::read_from(&path),
        Err(PlaceError::Format(_))
    ));
}
