use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Football,
    Basketball,
    Baseball,
}

/// Which team of a fixture a pick backs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

/// A match offered on the sports board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: String,
    pub sport: Sport,
    pub home: String,
    pub away: String,
    pub home_odds: f64,
    pub away_odds: f64,
}

impl Fixture {
    pub fn new(
        id: &str,
        sport: Sport,
        home: (&str, f64),
        away: (&str, f64),
    ) -> Self {
        Self {
            id: id.to_string(),
            sport,
            home: home.0.to_string(),
            away: away.0.to_string(),
            home_odds: home.1,
            away_odds: away.1,
        }
    }

    /// Decimal odds paid for backing `side`.
    pub fn odds(&self, side: Side) -> f64 {
        match side {
            Side::Home => self.home_odds,
            Side::Away => self.away_odds,
        }
    }

    pub fn team(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

/// Fixtures shown when no board is configured.
pub fn default_fixtures() -> Vec<Fixture> {
    vec![
        Fixture::new("1", Sport::Football, ("Eagles", 1.95), ("Chiefs", 1.85)),
        Fixture::new("2", Sport::Basketball, ("Lakers", 2.10), ("Celtics", 1.75)),
        Fixture::new("3", Sport::Baseball, ("Yankees", 1.90), ("Red Sox", 1.90)),
    ]
}
