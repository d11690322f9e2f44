use std::env;

use engine::{resolve_app_paths, LoopConfig, LoopPacing, ResourceManager, StartupError};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay::{load_level, LevelError, LevelScene, ScriptedInput};

const LEVEL_ENV_VAR: &str = "PLATFORMER_LEVEL";
const MAX_TICKS_ENV_VAR: &str = "PLATFORMER_MAX_TICKS";
const REALTIME_ENV_VAR: &str = "PLATFORMER_REALTIME";
const DEFAULT_LEVEL: &str = "meadow";

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to load level '{name}': {source}")]
    Level {
        name: String,
        #[source]
        source: LevelError,
    },
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: LevelScene,
    pub(crate) input: ScriptedInput,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    info!("=== Platformer Startup ===");
    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        assets = %paths.assets_dir.display(),
        "paths_resolved"
    );

    let level_name = read_env(LEVEL_ENV_VAR).unwrap_or_else(|| DEFAULT_LEVEL.to_string());
    let level = load_level(&paths.levels_dir, &level_name).map_err(|source| {
        BootstrapError::Level {
            name: level_name.clone(),
            source,
        }
    })?;
    let input = ScriptedInput::new(level.demo_input.clone());
    let resources = ResourceManager::new(paths.assets_dir);
    let scene = LevelScene::new(level, resources).map_err(|source| BootstrapError::Level {
        name: level_name,
        source,
    })?;

    let config = LoopConfig {
        max_ticks: parse_max_ticks(read_env(MAX_TICKS_ENV_VAR).as_deref()),
        pacing: parse_pacing(read_env(REALTIME_ENV_VAR).as_deref()),
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        scene,
        input,
    })
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn read_env(var: &'static str) -> Option<String> {
    match env::var(var) {
        Ok(value) => Some(value.trim().to_string()).filter(|value| !value.is_empty()),
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(env_var = var, error = %err, "unable to read env var; using default");
            None
        }
    }
}

/// `None` and `0` both mean "run until quit".
fn parse_max_ticks(raw: Option<&str>) -> Option<u64> {
    let raw = raw?;
    match raw.parse::<u64>() {
        Ok(0) => None,
        Ok(ticks) => Some(ticks),
        Err(_) => {
            warn!(
                env_var = MAX_TICKS_ENV_VAR,
                value = raw,
                "invalid tick limit; running without one"
            );
            None
        }
    }
}

fn parse_pacing(raw: Option<&str>) -> LoopPacing {
    let Some(raw) = raw else {
        return LoopPacing::Realtime;
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => LoopPacing::Realtime,
        "0" | "false" | "no" | "off" => LoopPacing::Unpaced,
        _ => {
            warn!(
                env_var = REALTIME_ENV_VAR,
                value = raw,
                "invalid realtime flag; falling back to realtime pacing"
            );
            LoopPacing::Realtime
        }
    }
}
