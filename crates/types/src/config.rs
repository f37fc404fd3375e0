//! Session configuration
//!
//! A session is configured once at setup. Values can come from code, from JSON
//! (camelCase keys) or from the environment:
//!
//! - `MATCH3_ROWS`, `MATCH3_COLUMNS`: grid size
//! - `MATCH3_TILE_SIZE`: cell size in view units
//! - `MATCH3_MODE`: `test`, `easy`, `normal` or `hard`
//! - `MATCH3_FREE_MOVES`: `1`/`true` accepts every swap
//! - `MATCH3_SEED`: RNG seed
//! - `MATCH3_SPECIAL_SPAWNS`: `1`/`true` turns long matches into special pieces

use serde::{Deserialize, Serialize};

use crate::{
    GameMode, Position, TypeCode, DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_SEED, DEFAULT_TILE_SIZE, MAX_DIMENSION,
    MIN_DIMENSION,
};

/// Configuration problems detected while building or validating a config
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be within {min}..={max}, got {value}")]
    DimensionOutOfRange {
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },

    #[error("tile size must be a positive finite number, got {0}")]
    InvalidTileSize(f32),

    #[error("unknown game mode: {0}")]
    UnknownMode(String),

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("cell {position} holds type {code}, which is not in the {mode} catalog")]
    InvalidTypeCode {
        position: Position,
        code: TypeCode,
        mode: GameMode,
    },
}

/// Play session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Match3Config {
    pub rows: usize,
    pub columns: usize,
    pub tile_size: f32,
    pub mode: GameMode,
    /// Accept every swap regardless of whether it creates a match
    pub free_moves: bool,
    pub seed: u32,
    /// Replace long or crossing matches with a special piece
    pub special_spawns: bool,
}

impl Default for Match3Config {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            tile_size: DEFAULT_TILE_SIZE,
            mode: GameMode::Normal,
            free_moves: false,
            seed: DEFAULT_SEED,
            special_spawns: false,
        }
    }
}

impl Match3Config {
    /// Create from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create from an arbitrary variable source.
    ///
    /// Unset or blank variables keep their default; set but unparsable ones
    /// are reported.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &'static str| {
            lookup(var)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(|s| (var, s))
        };

        let mut config = Self::default();

        if let Some((var, s)) = get("MATCH3_ROWS") {
            config.rows = s.parse().map_err(|_| ConfigError::InvalidEnv { var, value: s })?;
        }
        if let Some((var, s)) = get("MATCH3_COLUMNS") {
            config.columns = s.parse().map_err(|_| ConfigError::InvalidEnv { var, value: s })?;
        }
        if let Some((var, s)) = get("MATCH3_TILE_SIZE") {
            config.tile_size = s.parse().map_err(|_| ConfigError::InvalidEnv { var, value: s })?;
        }
        if let Some((_, s)) = get("MATCH3_MODE") {
            config.mode = s.parse()?;
        }
        if let Some((var, s)) = get("MATCH3_FREE_MOVES") {
            config.free_moves = parse_flag(var, s)?;
        }
        if let Some((var, s)) = get("MATCH3_SEED") {
            config.seed = s.parse().map_err(|_| ConfigError::InvalidEnv { var, value: s })?;
        }
        if let Some((var, s)) = get("MATCH3_SPECIAL_SPAWNS") {
            config.special_spawns = parse_flag(var, s)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check dimensions and tile size
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("rows", self.rows), ("columns", self.columns)] {
            if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) {
                return Err(ConfigError::DimensionOutOfRange {
                    field,
                    value,
                    min: MIN_DIMENSION,
                    max: MAX_DIMENSION,
                });
            }
        }
        if !self.tile_size.is_finite() || self.tile_size <= 0.0 {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        Ok(())
    }
}

fn parse_flag(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_are_nine_by_seven() {
        let config = Match3Config::default();
        assert_eq!(config.rows, 9);
        assert_eq!(config.columns, 7);
        assert_eq!(config.tile_size, 50.0);
        assert_eq!(config.mode, GameMode::Normal);
        assert!(!config.free_moves);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn lookup_overrides_defaults() {
        let config = Match3Config::from_lookup(lookup(&[
            ("MATCH3_ROWS", "6"),
            ("MATCH3_COLUMNS", " 8 "),
            ("MATCH3_MODE", "Hard"),
            ("MATCH3_FREE_MOVES", "true"),
            ("MATCH3_SEED", "99"),
        ]))
        .unwrap();

        assert_eq!(config.rows, 6);
        assert_eq!(config.columns, 8);
        assert_eq!(config.mode, GameMode::Hard);
        assert!(config.free_moves);
        assert_eq!(config.seed, 99);
        assert!(!config.special_spawns);
    }

    #[test]
    fn blank_values_keep_defaults() {
        let config = Match3Config::from_lookup(lookup(&[("MATCH3_ROWS", "  ")])).unwrap();
        assert_eq!(config.rows, DEFAULT_ROWS);
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = Match3Config::from_lookup(lookup(&[("MATCH3_ROWS", "many")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnv {
                var: "MATCH3_ROWS",
                value: "many".to_string()
            }
        );

        let err = Match3Config::from_lookup(lookup(&[("MATCH3_FREE_MOVES", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "MATCH3_FREE_MOVES", .. }));

        let err = Match3Config::from_lookup(lookup(&[("MATCH3_MODE", "insane")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownMode("insane".to_string()));
    }

    #[test]
    fn validate_rejects_bad_dimensions_and_tile_size() {
        let config = Match3Config {
            rows: 2,
            ..Match3Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DimensionOutOfRange { field: "rows", value: 2, .. })
        ));

        let config = Match3Config {
            columns: MAX_DIMENSION + 1,
            ..Match3Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DimensionOutOfRange { field: "columns", .. })
        ));

        let config = Match3Config {
            tile_size: 0.0,
            ..Match3Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTileSize(0.0)));
    }

    #[test]
    fn config_json_uses_camel_case_and_defaults() {
        let config: Match3Config =
            serde_json::from_str(r#"{"rows":5,"freeMoves":true,"mode":"easy"}"#).unwrap();
        assert_eq!(config.rows, 5);
        assert_eq!(config.columns, DEFAULT_COLUMNS);
        assert!(config.free_moves);
        assert_eq!(config.mode, GameMode::Easy);

        let v = serde_json::to_value(&Match3Config::default()).unwrap();
        assert_eq!(v["tileSize"], 50.0);
        assert_eq!(v["specialSpawns"], false);
    }
}
