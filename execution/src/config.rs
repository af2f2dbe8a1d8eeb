use crate::casino::{mines, plinko};
use houseedge_types::casino::{
    default_fixtures, Fixture, LedgerSnapshot, BET_STEP, DEFAULT_BET, DEFAULT_MINES,
    INITIAL_BALANCE, MINES_SAFE_FACTOR, MINES_TOTAL_CELLS, MIN_BET, PLINKO_BOARD_WIDTH,
    PLINKO_MAX_JITTER, PLINKO_MULTIPLIERS, PLINKO_ROWS, SETTLE_DELAY_MS, SPORTS_SETTLE_DELAY_MS,
    STEP_DELAY_MS,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path, str::FromStr, time::Duration};
use thiserror::Error;
use tracing::Level;

/// Table configuration, usually read from YAML.
///
/// Every field falls back to the built-in table when omitted.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_initial_balance")]
    pub initial_balance: u64,
    #[serde(default = "default_min_bet")]
    pub min_bet: u64,
    #[serde(default = "default_bet_step")]
    pub bet_step: u64,
    #[serde(default = "default_bet")]
    pub default_bet: u64,

    #[serde(default)]
    pub plinko: PlinkoConfig,
    #[serde(default)]
    pub mines: MinesConfig,
    #[serde(default)]
    pub sports: SportsConfig,
    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Fixed RNG seed; drawn from entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PlinkoConfig {
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_board_width")]
    pub board_width: f64,
    #[serde(default = "default_max_jitter")]
    pub max_jitter: f64,
    #[serde(default = "default_multipliers")]
    pub multipliers: Vec<f64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MinesConfig {
    #[serde(default = "default_cells")]
    pub cells: usize,
    #[serde(default = "default_mines")]
    pub mines: usize,
    #[serde(default = "default_factor")]
    pub factor: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SportsConfig {
    #[serde(default = "default_fixtures")]
    pub fixtures: Vec<Fixture>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TimingConfig {
    #[serde(default = "default_step_ms")]
    pub step_ms: u64,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_sports_ms")]
    pub sports_ms: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("{field} must be a positive number (got {value})")]
    InvalidPositive { field: &'static str, value: f64 },
    #[error("plinko multiplier {index} must be finite and >= 0 (got {value})")]
    InvalidMultiplier { index: usize, value: f64 },
    #[error("mine count must be in 1..{cells} (got {mines})")]
    InvalidMineCount { mines: usize, cells: usize },
    #[error("mines factor must be >= 1 (got {0})")]
    InvalidFactor(f64),
    #[error("fixture {fixture} has odds below 1 ({odds})")]
    InvalidOdds { fixture: String, odds: f64 },
    #[error("duplicate fixture id: {0}")]
    DuplicateFixture(String),
    #[error("default_bet ({default_bet}) must be >= min_bet ({min_bet})")]
    DefaultBelowMinimum { default_bet: u64, min_bet: u64 },
}

/// Delays used to pace a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    pub step: Duration,
    pub settle: Duration,
    pub sports: Duration,
}

impl Timing {
    /// No delays at all.
    pub fn instant() -> Self {
        Self {
            step: Duration::ZERO,
            settle: Duration::ZERO,
            sports: Duration::ZERO,
        }
    }
}

pub struct ValidatedConfig {
    pub initial_balance: u64,
    pub min_bet: u64,
    pub bet_step: u64,
    pub default_bet: u64,

    pub plinko: plinko::Board,
    pub mines: mines::Rules,
    pub fixtures: Vec<Fixture>,
    pub timing: Timing,

    pub log_level: Level,
    pub seed: Option<u64>,
}

impl ValidatedConfig {
    /// Funds a fresh ledger starts with.
    pub fn starting_funds(&self) -> LedgerSnapshot {
        LedgerSnapshot::new(self.initial_balance, 0)
    }
}

fn default_initial_balance() -> u64 {
    INITIAL_BALANCE
}

fn default_min_bet() -> u64 {
    MIN_BET
}

fn default_bet_step() -> u64 {
    BET_STEP
}

fn default_bet() -> u64 {
    DEFAULT_BET
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rows() -> usize {
    PLINKO_ROWS
}

fn default_board_width() -> f64 {
    PLINKO_BOARD_WIDTH
}

fn default_max_jitter() -> f64 {
    PLINKO_MAX_JITTER
}

fn default_multipliers() -> Vec<f64> {
    PLINKO_MULTIPLIERS.to_vec()
}

fn default_cells() -> usize {
    MINES_TOTAL_CELLS
}

fn default_mines() -> usize {
    DEFAULT_MINES
}

fn default_factor() -> f64 {
    MINES_SAFE_FACTOR
}

fn default_step_ms() -> u64 {
    STEP_DELAY_MS
}

fn default_settle_ms() -> u64 {
    SETTLE_DELAY_MS
}

fn default_sports_ms() -> u64 {
    SPORTS_SETTLE_DELAY_MS
}

impl Default for PlinkoConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            board_width: default_board_width(),
            max_jitter: default_max_jitter(),
            multipliers: default_multipliers(),
        }
    }
}

impl Default for MinesConfig {
    fn default() -> Self {
        Self {
            cells: default_cells(),
            mines: default_mines(),
            factor: default_factor(),
        }
    }
}

impl Default for SportsConfig {
    fn default() -> Self {
        Self {
            fixtures: default_fixtures(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            step_ms: default_step_ms(),
            settle_ms: default_settle_ms(),
            sports_ms: default_sports_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
            min_bet: default_min_bet(),
            bet_step: default_bet_step(),
            default_bet: default_bet(),
            plinko: PlinkoConfig::default(),
            mines: MinesConfig::default(),
            sports: SportsConfig::default(),
            timing: TimingConfig::default(),
            log_level: default_log_level(),
            seed: None,
        }
    }
}

fn non_zero(field: &'static str, value: u64) -> Result<u64, ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidNonZero { field, value });
    }
    Ok(value)
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let min_bet = non_zero("min_bet", self.min_bet)?;
        let bet_step = non_zero("bet_step", self.bet_step)?;
        if self.default_bet < min_bet {
            return Err(ConfigError::DefaultBelowMinimum {
                default_bet: self.default_bet,
                min_bet,
            });
        }

        let plinko = self.plinko.validate()?;
        let mines = self.mines.validate()?;
        let fixtures = self.sports.validate()?;

        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;

        Ok(ValidatedConfig {
            initial_balance: self.initial_balance,
            min_bet,
            bet_step,
            default_bet: self.default_bet,
            plinko,
            mines,
            fixtures,
            timing: Timing {
                step: Duration::from_millis(self.timing.step_ms),
                settle: Duration::from_millis(self.timing.settle_ms),
                sports: Duration::from_millis(self.timing.sports_ms),
            },
            log_level,
            seed: self.seed,
        })
    }
}

impl PlinkoConfig {
    fn validate(self) -> Result<plinko::Board, ConfigError> {
        non_zero("plinko.rows", self.rows as u64)?;
        if !(self.board_width.is_finite() && self.board_width > 0.0) {
            return Err(ConfigError::InvalidPositive {
                field: "plinko.board_width",
                value: self.board_width,
            });
        }
        if !(self.max_jitter.is_finite() && self.max_jitter >= 0.0) {
            return Err(ConfigError::InvalidPositive {
                field: "plinko.max_jitter",
                value: self.max_jitter,
            });
        }
        non_zero("plinko.multipliers", self.multipliers.len() as u64)?;
        if let Some((index, &value)) = self
            .multipliers
            .iter()
            .enumerate()
            .find(|(_, m)| !(m.is_finite() && **m >= 0.0))
        {
            return Err(ConfigError::InvalidMultiplier { index, value });
        }

        Ok(plinko::Board {
            rows: self.rows,
            width: self.board_width,
            max_jitter: self.max_jitter,
            multipliers: self.multipliers,
        })
    }
}

impl MinesConfig {
    fn validate(self) -> Result<mines::Rules, ConfigError> {
        if self.mines == 0 || self.mines >= self.cells {
            return Err(ConfigError::InvalidMineCount {
                mines: self.mines,
                cells: self.cells,
            });
        }
        if !(self.factor.is_finite() && self.factor >= 1.0) {
            return Err(ConfigError::InvalidFactor(self.factor));
        }
        Ok(mines::Rules {
            cells: self.cells,
            mines: self.mines,
            factor: self.factor,
        })
    }
}

impl SportsConfig {
    fn validate(self) -> Result<Vec<Fixture>, ConfigError> {
        let mut seen = HashSet::new();
        for fixture in &self.fixtures {
            if !seen.insert(fixture.id.as_str()) {
                return Err(ConfigError::DuplicateFixture(fixture.id.clone()));
            }
            for odds in [fixture.home_odds, fixture.away_odds] {
                if !(odds.is_finite() && odds >= 1.0) {
                    return Err(ConfigError::InvalidOdds {
                        fixture: fixture.id.clone(),
                        odds,
                    });
                }
            }
        }
        Ok(self.fixtures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap().validate().unwrap();
        assert_eq!(config.initial_balance, 10_000);
        assert_eq!(config.default_bet, 100);
        assert_eq!(config.bet_step, 100);
        assert_eq!(config.plinko, plinko::Board::default());
        assert_eq!(config.mines, mines::Rules::default());
        assert_eq!(config.fixtures, default_fixtures());
        assert_eq!(config.timing.step, Duration::from_millis(200));
        assert_eq!(config.timing.settle, Duration::from_millis(1_500));
        assert_eq!(config.timing.sports, Duration::from_millis(1_000));
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.seed, None);
        assert_eq!(config.starting_funds(), LedgerSnapshot::default());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
initial_balance: 500
min_bet: 10
seed: 42
log_level: debug
mines:
  mines: 5
timing:
  step_ms: 0
sports:
  fixtures:
    - id: "a"
      sport: basketball
      home: "Bulls"
      away: "Knicks"
      home_odds: 1.5
      away_odds: 2.5
"#;
        let config = Config::from_yaml(yaml).unwrap().validate().unwrap();
        assert_eq!(config.starting_funds(), LedgerSnapshot::new(500, 0));
        assert_eq!(config.min_bet, 10);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.mines.mines, 5);
        assert_eq!(config.mines.cells, 25);
        assert_eq!(config.timing.step, Duration::ZERO);
        assert_eq!(config.timing.settle, Duration::from_millis(1_500));
        assert_eq!(config.fixtures.len(), 1);
        assert_eq!(config.fixtures[0].home, "Bulls");
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = Config::default();
        config.min_bet = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNonZero { field: "min_bet", .. })
        ));

        let mut config = Config::default();
        config.mines.mines = 25;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMineCount { mines: 25, cells: 25 })
        ));

        let mut config = Config::default();
        config.mines.factor = 0.9;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidFactor(_))));

        let mut config = Config::default();
        config.plinko.multipliers = vec![1.0, -0.5];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMultiplier { index: 1, .. })
        ));

        let mut config = Config::default();
        config.plinko.multipliers.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.plinko.board_width = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPositive { field: "plinko.board_width", .. })
        ));

        let mut config = Config::default();
        config.log_level = "loud".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel { .. })
        ));

        let mut config = Config::default();
        config.default_bet = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DefaultBelowMinimum { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_fixtures() {
        let mut config = Config::default();
        config.sports.fixtures[2].away_odds = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOdds { odds, .. }) if odds == 0.5
        ));

        let mut config = Config::default();
        let copy = config.sports.fixtures[0].clone();
        config.sports.fixtures.push(copy);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateFixture(id)) if id == "1"
        ));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            Config::from_yaml("min_bet: [1, 2"),
            Err(ConfigError::Parse(_))
        ));
    }
}
