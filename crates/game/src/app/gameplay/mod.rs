mod actor;
mod kinematics;
mod level;
mod mushroom;
mod player;
mod scene_impl;
mod tile_id;

pub(crate) use level::{load_level, LevelError, ScriptedInput};
pub(crate) use scene_impl::LevelScene;
