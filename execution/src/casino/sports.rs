//! Sports parlay odds and settlement.
//!
//! Picks are kept per fixture; the combined odds are the product of every
//! picked side. Wagers on this board always settle as a loss.

use super::ValidationError;
use houseedge_types::casino::{Fixture, GameKind, GameOutcome, Side};
use std::collections::BTreeMap;

/// The sides currently backed, keyed by fixture id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    picks: BTreeMap<String, Side>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back `side` of `fixture_id`, or drop the pick if `side` was already backed.
    ///
    /// Backing the other side of a picked fixture replaces the pick.
    pub fn toggle(&mut self, fixture_id: &str, side: Side) {
        if self.picks.get(fixture_id) == Some(&side) {
            self.picks.remove(fixture_id);
        } else {
            self.picks.insert(fixture_id.to_string(), side);
        }
    }

    pub fn side(&self, fixture_id: &str) -> Option<Side> {
        self.picks.get(fixture_id).copied()
    }

    pub fn clear(&mut self) {
        self.picks.clear();
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Side)> {
        self.picks.iter().map(|(id, side)| (id.as_str(), *side))
    }

    /// Product of the picked odds (1.0 with nothing picked).
    pub fn total_odds(&self, fixtures: &[Fixture]) -> Result<f64, ValidationError> {
        self.iter().try_fold(1.0, |acc, (id, side)| -> Result<f64, ValidationError> {
            let fixture = fixtures
                .iter()
                .find(|f| f.id == id)
                .ok_or_else(|| ValidationError::UnknownFixture(id.to_string()))?;
            Ok(acc * fixture.odds(side))
        })
    }

    /// What `amount` would return if every pick won.
    pub fn potential_win(&self, fixtures: &[Fixture], amount: u64) -> Result<f64, ValidationError> {
        Ok(amount as f64 * self.total_odds(fixtures)?)
    }
}

/// Settle a sports wager.
///
/// The house never pays out on this board, whatever was picked.
pub fn settle(amount: u64) -> GameOutcome {
    GameOutcome::loss(GameKind::SportsWager, amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use houseedge_types::casino::default_fixtures;

    #[test]
    fn test_total_odds_is_product() {
        let fixtures = default_fixtures();
        let mut selection = Selection::new();
        assert_eq!(selection.total_odds(&fixtures), Ok(1.0));

        selection.toggle("1", Side::Home);
        selection.toggle("2", Side::Away);
        selection.toggle("3", Side::Home);
        let odds = selection.total_odds(&fixtures).unwrap();
        assert!((odds - 1.95 * 1.75 * 1.90).abs() < 1e-9);

        let win = selection.potential_win(&fixtures, 100).unwrap();
        assert!((win - 100.0 * odds).abs() < 1e-9);
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut selection = Selection::new();
        selection.toggle("1", Side::Home);
        let before = selection.clone();

        selection.toggle("2", Side::Away);
        selection.toggle("2", Side::Away);
        assert_eq!(selection, before);

        selection.toggle("1", Side::Home);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_other_side_replaces_pick() {
        let mut selection = Selection::new();
        selection.toggle("1", Side::Home);
        selection.toggle("1", Side::Away);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.side("1"), Some(Side::Away));
    }

    #[test]
    fn test_unknown_fixture() {
        let mut selection = Selection::new();
        selection.toggle("missing", Side::Home);
        assert_eq!(
            selection.total_odds(&default_fixtures()),
            Err(ValidationError::UnknownFixture("missing".to_string()))
        );
    }

    #[test]
    fn test_settle_always_loses() {
        let outcome = settle(500);
        assert_eq!(outcome.kind, GameKind::SportsWager);
        assert_eq!(outcome.payout, 0);
        assert_eq!(outcome.delta, -500);
    }
}
