use super::*;

#[test]
fn built_in_ladders_match_dataset_palettes() {
    for epoch in [Epoch::Y2017, Epoch::Y2022, Epoch::Y2023] {
        let ladder = CanvasLadder::for_epoch(epoch);
        assert_eq!(usize::from(ladder.max_palette()), epoch.palette().len());
        assert!(CanvasLadder::new(ladder.steps().to_vec()).is_ok());
    }
}

#[test]
fn epoch_numbers_are_one_based() {
    let ladder = CanvasLadder::for_epoch(Epoch::Y2022);
    assert_eq!(ladder.len(), 3);
    assert!(ladder.get(0).is_none());
    assert_eq!(ladder.get(1), Some(&CanvasEpoch::new(1000, 1000, 16)));
    assert_eq!(ladder.get(3), Some(&CanvasEpoch::new(2000, 2000, 32)));
    assert!(ladder.get(4).is_none());
}

#[test]
fn fits_checks_bounds_and_palette() {
    let e = CanvasEpoch::new(10, 5, 16);
    assert!(e.fits(9, 4, 15));
    assert!(!e.fits(10, 0, 0));
    assert!(!e.fits(0, 5, 0));
    assert!(!e.fits(0, 0, 16));
}

#[test]
fn invalid_ladders_are_rejected() {
    assert!(CanvasLadder::new(Vec::new()).is_err());
    assert!(CanvasLadder::new(vec![CanvasEpoch::new(0, 1, 1)]).is_err());
    assert!(CanvasLadder::new(vec![CanvasEpoch::new(1, 1, 300)]).is_err());
    assert!(
        CanvasLadder::new(vec![
            CanvasEpoch::new(10, 10, 16),
            CanvasEpoch::new(5, 20, 16),
        ])
        .is_err()
    );
}
