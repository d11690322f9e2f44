use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
mod asset_keys;

pub use app::{
    run_app, DrawList, DrawTarget, Entity, EntityId, IdleInput, InputAction, InputSnapshot,
    InputSource, IntRect, LoopConfig, LoopPacing, LoopSummary, Rect, RectangleCollider,
    ResourceError, ResourceManager, Scene, SceneCommand, SceneWorld, Sound, SoundBuffer,
    SoundBufferHandle, SpawnDesc, Sprite, SpriteSheetAnimation, State, StateId, StateMachine,
    StateMachineError, StopReason, Texture, TextureHandle, Tilemap, TilemapError, Transform,
    Transition, Vec2,
};
pub use asset_keys::AssetKeyError;

pub const ROOT_ENV_VAR: &str = "PLATFORMER_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub levels_dir: PathBuf,
}

impl AppPaths {
    pub fn from_root(root: PathBuf) -> Self {
        let assets_dir = root.join("assets");
        let levels_dir = assets_dir.join("levels");
        Self {
            root,
            assets_dir,
            levels_dir,
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("could not read {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("could not locate the running executable: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("executable {0} has no containing directory")]
    ExeHasNoParent(PathBuf),
    #[error("{var} points at {path}, which has no Cargo.toml alongside assets/levels")]
    InvalidEnvRoot { var: &'static str, path: PathBuf },
    #[error(
        "no platformer checkout found in {start_dir} or any parent directory; \
set {var} to the directory holding Cargo.toml and assets/levels"
    )]
    RootNotFound { start_dir: PathBuf, var: &'static str },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = match env::var(ROOT_ENV_VAR) {
        Ok(value) => root_from_env(PathBuf::from(value))?,
        Err(env::VarError::NotPresent) => root_above_executable()?,
        Err(source) => {
            return Err(StartupError::EnvVar {
                var: ROOT_ENV_VAR,
                source,
            })
        }
    };
    Ok(AppPaths::from_root(root))
}

fn root_from_env(raw: PathBuf) -> Result<PathBuf, StartupError> {
    let root = canonical_or_raw(&raw);
    if is_project_root(&root) {
        Ok(root)
    } else {
        Err(StartupError::InvalidEnvRoot {
            var: ROOT_ENV_VAR,
            path: root,
        })
    }
}

fn root_above_executable() -> Result<PathBuf, StartupError> {
    let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
    let Some(exe_dir) = exe.parent() else {
        return Err(StartupError::ExeHasNoParent(exe.clone()));
    };
    exe_dir
        .ancestors()
        .find(|candidate| is_project_root(candidate))
        .map(canonical_or_raw)
        .ok_or_else(|| StartupError::RootNotFound {
            start_dir: canonical_or_raw(exe_dir),
            var: ROOT_ENV_VAR,
        })
}

/// A checkout is recognised by its workspace manifest and level directory.
fn is_project_root(path: &Path) -> bool {
    path.join("Cargo.toml").is_file() && path.join("assets").join("levels").is_dir()
}

fn canonical_or_raw(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
