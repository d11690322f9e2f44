use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::{InputAction, InputSnapshot, InputSource, Tilemap, TilemapError, Vec2};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::tile_id::TileId;

const DEFAULT_TILE_SIZE: f32 = 32.0;

#[derive(Debug, Error)]
pub(crate) enum LevelError {
    #[error("invalid level name '{0}'")]
    InvalidName(String),
    #[error("failed to read level file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse level json at {json_path}: {source}")]
    Parse {
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("validation failed at {json_path}: {message}")]
    Invalid { json_path: String, message: String },
    #[error("level tilemap: {0}")]
    Tilemap(#[from] TilemapError),
}

impl LevelError {
    fn invalid(json_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            json_path: json_path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Facing {
    #[default]
    Left,
    Right,
}

impl Facing {
    pub(crate) fn x(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub(crate) enum SpawnDef {
    Player {
        position: Vec2,
    },
    Mushroom {
        position: Vec2,
        #[serde(default)]
        facing: Facing,
    },
}

impl SpawnDef {
    pub(crate) fn position(&self) -> Vec2 {
        match self {
            SpawnDef::Player { position } | SpawnDef::Mushroom { position, .. } => *position,
        }
    }
}

/// Actions held for ticks in `from_tick..to_tick`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScriptedSpan {
    pub(crate) from_tick: u64,
    pub(crate) to_tick: u64,
    pub(crate) actions: Vec<InputAction>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LevelDef {
    pub(crate) name: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    #[serde(default = "default_tile_size")]
    pub(crate) tile_size: f32,
    #[serde(default)]
    pub(crate) origin: Vec2,
    pub(crate) tiles: Vec<u16>,
    pub(crate) spawns: Vec<SpawnDef>,
    #[serde(default)]
    pub(crate) demo_input: Vec<ScriptedSpan>,
}

fn default_tile_size() -> f32 {
    DEFAULT_TILE_SIZE
}

impl LevelDef {
    pub(crate) fn build_tilemap(&self) -> Result<Tilemap, TilemapError> {
        Tilemap::new(
            self.width,
            self.height,
            self.origin,
            Vec2::new(self.tile_size, self.tile_size),
            self.tiles.clone(),
        )
    }

    fn validate(&self) -> Result<(), LevelError> {
        if self.width == 0 || self.height == 0 {
            return Err(LevelError::invalid(
                "width",
                format!("map must not be empty, got {}x{}", self.width, self.height),
            ));
        }
        if !self.origin.is_finite() {
            return Err(LevelError::invalid("origin", "must be finite"));
        }
        let tilemap = self.build_tilemap()?;

        if let Some(index) = self
            .tiles
            .iter()
            .position(|id| *id > TileId::INVISIBLE_BARRIER.0)
        {
            return Err(LevelError::invalid(
                format!("tiles[{index}]"),
                format!("unknown tile id {}", self.tiles[index]),
            ));
        }

        let player_count = self
            .spawns
            .iter()
            .filter(|spawn| matches!(spawn, SpawnDef::Player { .. }))
            .count();
        if player_count != 1 {
            return Err(LevelError::invalid(
                "spawns",
                format!("expected exactly 1 player spawn, got {player_count}"),
            ));
        }

        for (index, spawn) in self.spawns.iter().enumerate() {
            let position = spawn.position();
            if !position.is_finite() || !tilemap.is_within_world_bounds(position) {
                return Err(LevelError::invalid(
                    format!("spawns[{index}].position"),
                    format!("({}, {}) is outside the map", position.x, position.y),
                ));
            }
        }

        for (index, span) in self.demo_input.iter().enumerate() {
            if span.from_tick >= span.to_tick {
                return Err(LevelError::invalid(
                    format!("demo_input[{index}]"),
                    format!(
                        "from_tick {} must be before to_tick {}",
                        span.from_tick, span.to_tick
                    ),
                ));
            }
        }

        Ok(())
    }
}

pub(crate) fn parse_level(raw: &str) -> Result<LevelDef, LevelError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let level = match serde_path_to_error::deserialize::<_, LevelDef>(&mut deserializer) {
        Ok(level) => level,
        Err(error) => {
            let path = error.path().to_string();
            let json_path = if path.is_empty() || path == "." {
                "$".to_string()
            } else {
                path
            };
            return Err(LevelError::Parse {
                json_path,
                source: error.into_inner(),
            });
        }
    };
    level.validate()?;
    Ok(level)
}

pub(crate) fn level_path(levels_dir: &Path, name: &str) -> Result<PathBuf, LevelError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if !valid {
        return Err(LevelError::InvalidName(name.to_string()));
    }
    Ok(levels_dir.join(format!("{name}.json")))
}

pub(crate) fn load_level(levels_dir: &Path, name: &str) -> Result<LevelDef, LevelError> {
    let path = level_path(levels_dir, name)?;
    let raw = fs::read_to_string(&path).map_err(|source| LevelError::Read {
        path: path.clone(),
        source,
    })?;
    let level = parse_level(&raw)?;
    info!(
        level = %level.name,
        path = %path.display(),
        width = level.width,
        height = level.height,
        spawns = level.spawns.len(),
        "level_loaded"
    );
    Ok(level)
}

/// Replays a level's demo input spans. Ticks outside every span are idle.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedInput {
    spans: Vec<ScriptedSpan>,
}

impl ScriptedInput {
    pub(crate) fn new(spans: Vec<ScriptedSpan>) -> Self {
        Self { spans }
    }
}

impl InputSource for ScriptedInput {
    fn snapshot_for_tick(&mut self, tick: u64) -> InputSnapshot {
        self.spans
            .iter()
            .filter(|span| span.from_tick <= tick && tick < span.to_tick)
            .flat_map(|span| span.actions.iter().copied())
            .fold(InputSnapshot::empty(), |snapshot, action| {
                snapshot.with_action_down(action, true)
            })
    }
}
