use super::*;
use crate::api::LedgerRecord;

#[test]
fn test_game_kind_serde() {
    for kind in GameKind::ALL {
        let encoded = serde_json::to_string(&kind).unwrap();
        let decoded: GameKind = serde_json::from_str(&encoded).unwrap();
        assert_eq!(kind, decoded);
    }
    assert_eq!(
        serde_json::to_string(&GameKind::MinesReveal).unwrap(),
        "\"mines_reveal\""
    );
}

#[test]
fn test_outcome_payout_and_delta() {
    // Two safe reveals compound to 1.44x
    let outcome = GameOutcome::new(GameKind::MinesReveal, 100, 1.2 * 1.2);
    assert_eq!(outcome.payout, 144);
    assert_eq!(outcome.delta, 44);
    assert!(outcome.is_win());

    let outcome = GameOutcome::new(GameKind::PlinkoDrop, 100, 0.2);
    assert_eq!(outcome.payout, 20);
    assert_eq!(outcome.delta, -80);
    assert!(!outcome.is_win());
}

#[test]
fn test_outcome_loss() {
    let outcome = GameOutcome::loss(GameKind::SportsWager, 250);
    assert_eq!(outcome.multiplier, 0.0);
    assert_eq!(outcome.payout, 0);
    assert_eq!(outcome.delta, -250);
}

#[test]
fn test_outcome_rejects_negative_multiplier() {
    let outcome = GameOutcome::new(GameKind::PlinkoDrop, 100, -3.0);
    assert_eq!(outcome.multiplier, 0.0);
    assert_eq!(outcome.payout, 0);

    let outcome = GameOutcome::new(GameKind::PlinkoDrop, 100, f64::NAN);
    assert_eq!(outcome.multiplier, 0.0);
}

#[test]
fn test_default_ledger() {
    let snapshot = LedgerSnapshot::default();
    assert_eq!(snapshot.virtual_balance, INITIAL_BALANCE);
    assert_eq!(snapshot.total_lost, 0);

    let record = LedgerRecord::new("user-1", snapshot);
    assert_eq!(record.snapshot(), snapshot);
}

#[test]
fn test_default_fixtures() {
    let fixtures = default_fixtures();
    assert_eq!(fixtures.len(), 3);
    for fixture in &fixtures {
        assert!(fixture.odds(Side::Home) >= 1.0);
        assert!(fixture.odds(Side::Away) >= 1.0);
    }
    assert_eq!(fixtures[1].team(Side::Home), "Lakers");
    assert_eq!(fixtures[1].odds(Side::Home), 2.10);
}

#[test]
fn test_plinko_table_is_symmetric() {
    let len = PLINKO_MULTIPLIERS.len();
    for i in 0..len / 2 {
        assert_eq!(PLINKO_MULTIPLIERS[i], PLINKO_MULTIPLIERS[len - 1 - i]);
    }
    assert_eq!(MINES_TOTAL_CELLS, 25);
}
