mod animation;
mod audio;
mod input;
mod loop_runner;
mod physics;
mod rendering;
mod resources;
mod scene;
mod state_machine;
mod tilemap;

pub use animation::{IntRect, Sprite, SpriteSheetAnimation};
pub use audio::Sound;
pub use input::{IdleInput, InputAction, InputSnapshot, InputSource};
pub use loop_runner::{run_app, LoopConfig, LoopPacing, LoopSummary, StopReason};
pub use physics::{Rect, RectangleCollider};
pub use rendering::{DrawCommand, DrawList, DrawTarget};
pub use resources::{
    ResourceError, ResourceManager, SoundBuffer, SoundBufferHandle, Texture, TextureHandle,
};
pub use scene::{Entity, EntityId, Scene, SceneCommand, SceneWorld, SpawnDesc, Transform, Vec2};
pub use state_machine::{State, StateId, StateMachine, StateMachineError, Transition};
pub use tilemap::{Tilemap, TilemapError};
