use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;

use thiserror::Error;

/// Platform rake applied to every decided pot, in basis points (10%)
pub const DEFAULT_FEE_BPS: u32 = 1_000;

/// Upper bound for the rake, a fee may never exceed the pot
pub const MAX_FEE_BPS: u32 = 10_000;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_EVENT_CAPACITY: usize = 100;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("TABLESTAKES_FEE_BPS must be at most {MAX_FEE_BPS}, got {0}")]
    FeeOutOfRange(u32),
}

/// Number of seats each game type needs before a room can form
#[derive(Debug, Clone, PartialEq)]
pub struct GameCatalog {
    required_players: HashMap<String, usize>,
}

impl GameCatalog {
    pub fn empty() -> Self {
        Self {
            required_players: HashMap::new(),
        }
    }

    /// Registers (or replaces) a game type. Zero-seat games are ignored.
    pub fn insert(&mut self, game_id: &str, required_players: usize) {
        if required_players == 0 {
            return;
        }
        self.required_players
            .insert(game_id.to_string(), required_players);
    }

    pub fn required_players(&self, game_id: &str) -> Option<usize> {
        self.required_players.get(game_id).copied()
    }

    pub fn game_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.required_players.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for GameCatalog {
    fn default() -> Self {
        let mut catalog = Self::empty();
        catalog.insert("snake", 4);
        catalog.insert("ludo", 4);
        catalog.insert("crazy-dice", 2);
        catalog.insert("murlan", 4);
        catalog.insert("texas-holdem", 6);
        catalog
    }
}

/// Runtime configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub fee_bps: u32,
    pub event_capacity: usize,
    pub games: GameCatalog,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: None,
            fee_bps: DEFAULT_FEE_BPS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            games: GameCatalog::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source so tests never touch the process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = parse_var(
            &lookup,
            "TABLESTAKES_BIND_ADDR",
            DEFAULT_BIND_ADDR.parse().ok(),
        )?;
        let fee_bps: u32 = parse_var(&lookup, "TABLESTAKES_FEE_BPS", Some(DEFAULT_FEE_BPS))?;
        if fee_bps > MAX_FEE_BPS {
            return Err(ConfigError::FeeOutOfRange(fee_bps));
        }
        let event_capacity: usize = parse_var(
            &lookup,
            "TABLESTAKES_EVENT_CAPACITY",
            Some(DEFAULT_EVENT_CAPACITY),
        )?;
        if event_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: "TABLESTAKES_EVENT_CAPACITY",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            bind_addr,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            fee_bps,
            event_capacity,
            games: GameCatalog::default(),
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: Option<T>) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        None => default.ok_or(ConfigError::InvalidValue {
            name,
            value: String::new(),
        }),
    }
}
