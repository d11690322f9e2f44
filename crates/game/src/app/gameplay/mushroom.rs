use std::sync::Arc;

use engine::{
    DrawTarget, EntityId, RectangleCollider, ResourceManager, SceneWorld, Sound, SpawnDesc,
    Sprite, SpriteSheetAnimation, State, StateId, StateMachine, StateMachineError, Tilemap,
    Transform, Transition, Vec2,
};
use tracing::{debug, info, trace};

use super::actor::Actor;
use super::kinematics::{resolve_tile_move, MoveOutcome, GRAVITY_PER_TICK};

pub(crate) const MUSHROOM_NAME: &str = "mushroom";
pub(crate) const RUN_TEXTURE_KEY: &str = "mushroom/run";
pub(crate) const HIT_TEXTURE_KEY: &str = "mushroom/hit";
pub(crate) const HIT_SOUND_KEY: &str = "mushroom/hit_2";

const MOVEMENT_SPEED: f32 = 2.0;
const ANIMATION_TICKS_PER_FRAME: u32 = 4;
const FRAME_SIZE_PX: u32 = 32;
const SPRITE_SCALE: f32 = 2.0;
const SPRITE_ORIGIN: Vec2 = Vec2::new(16.0, 16.0);
const COLLIDER_SIZE: Vec2 = Vec2::new(32.0, 32.0);
const COLLIDER_OFFSET: Vec2 = Vec2::new(0.0, 16.0);

const RUN_STATE: StateId = "run";
const HIT_STATE: StateId = "hit";

pub(crate) fn mushroom_collider() -> RectangleCollider {
    RectangleCollider::new(COLLIDER_SIZE).with_local_position(COLLIDER_OFFSET)
}

pub(crate) fn mushroom_spawn_desc(position: Vec2) -> SpawnDesc {
    SpawnDesc {
        debug_name: MUSHROOM_NAME,
        transform: Transform::at(position),
        collider: Some(mushroom_collider()),
    }
}

/// Shared between the mushroom and its animation states.
#[derive(Debug, Clone)]
pub(crate) struct MushroomContext {
    pub(crate) is_dead: bool,
    pub(crate) death_animation_finished: bool,
    pub(crate) sprite: Sprite,
    pub(crate) hit_sound: Sound,
}

struct RunState {
    animation: SpriteSheetAnimation,
}

impl State<MushroomContext> for RunState {
    fn id(&self) -> StateId {
        RUN_STATE
    }

    fn on_enter(&mut self, context: &mut MushroomContext) {
        self.animation.start();
        self.animation.apply_to(&mut context.sprite);
    }

    fn update(&mut self, context: &mut MushroomContext) {
        self.animation.update();
        self.animation.apply_to(&mut context.sprite);
    }
}

struct HitState {
    animation: SpriteSheetAnimation,
}

impl State<MushroomContext> for HitState {
    fn id(&self) -> StateId {
        HIT_STATE
    }

    fn on_enter(&mut self, context: &mut MushroomContext) {
        self.animation.start();
        self.animation.apply_to(&mut context.sprite);
        context.hit_sound.play();
    }

    fn update(&mut self, context: &mut MushroomContext) {
        self.animation.update();
        self.animation.apply_to(&mut context.sprite);
        if self.animation.is_finished() {
            context.death_animation_finished = true;
        }
    }
}

/// Patrolling enemy. Walks until it meets a wall or another live mushroom,
/// then turns around. Dies when stomped or when it leaves the map, plays its
/// hit animation once and then asks the world to remove it.
pub(crate) struct Mushroom {
    machine: StateMachine<MushroomContext>,
    tilemap: Arc<Tilemap>,
    velocity: Vec2,
    direction: Vec2,
    is_on_ground: bool,
    removal_requested: bool,
}

impl Mushroom {
    pub(crate) fn new(
        resources: &mut ResourceManager,
        tilemap: Arc<Tilemap>,
        facing_x: f32,
    ) -> Result<Self, StateMachineError> {
        let run_texture = resources.load_texture_or_placeholder(RUN_TEXTURE_KEY);
        let hit_texture = resources.load_texture_or_placeholder(HIT_TEXTURE_KEY);
        let hit_sound = resources.load_sound_buffer_or_silent(HIT_SOUND_KEY);

        let mut sprite = Sprite::new(Arc::clone(&run_texture));
        sprite.origin = SPRITE_ORIGIN;
        sprite.scale = Vec2::new(SPRITE_SCALE, SPRITE_SCALE);
        let context = MushroomContext {
            is_dead: false,
            death_animation_finished: false,
            sprite,
            hit_sound: Sound::new(hit_sound),
        };

        let run = RunState {
            animation: SpriteSheetAnimation::new(
                run_texture,
                FRAME_SIZE_PX,
                FRAME_SIZE_PX,
                ANIMATION_TICKS_PER_FRAME,
            ),
        };
        let hit = HitState {
            animation: SpriteSheetAnimation::new(
                hit_texture,
                FRAME_SIZE_PX,
                FRAME_SIZE_PX,
                ANIMATION_TICKS_PER_FRAME,
            ),
        };

        let mut machine = StateMachine::new(context, Box::new(run));
        machine.add_state(Box::new(hit))?;
        machine.add_transition(Transition {
            from: RUN_STATE,
            to: HIT_STATE,
            condition: |context| context.is_dead,
        })?;

        Ok(Self {
            machine,
            tilemap,
            velocity: Vec2::ZERO,
            direction: Vec2::new(if facing_x > 0.0 { 1.0 } else { -1.0 }, 0.0),
            is_on_ground: false,
            removal_requested: false,
        })
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.machine.context().is_dead
    }

    pub(crate) fn take_damage(&mut self) {
        self.machine.context_mut().is_dead = true;
    }

    #[cfg(test)]
    pub(crate) fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[cfg(test)]
    pub(crate) fn direction(&self) -> Vec2 {
        self.direction
    }

    #[cfg(test)]
    pub(crate) fn is_on_ground(&self) -> bool {
        self.is_on_ground
    }

    pub(crate) fn state_id(&self) -> StateId {
        self.machine.current_state_id()
    }

    #[cfg(test)]
    pub(crate) fn removal_requested(&self) -> bool {
        self.removal_requested
    }

    #[cfg(test)]
    pub(crate) fn hit_sound_play_count(&self) -> u32 {
        self.machine.context().hit_sound.play_count()
    }

    /// One simulation tick. `id` is this mushroom's slot in `world`; its body
    /// is expected to be detached for the duration of the call.
    pub(crate) fn update(&mut self, id: EntityId, world: &mut SceneWorld<Actor>) {
        let was_running = self.state_id() == RUN_STATE;
        self.machine.update();
        if was_running && self.state_id() == HIT_STATE {
            info!(entity_id = id.0, "mushroom_died");
        }

        if self.machine.context().death_animation_finished && !self.removal_requested {
            self.removal_requested = true;
            world.despawn(id);
            debug!(entity_id = id.0, "mushroom_despawn_requested");
        }

        if self.is_dead() {
            return;
        }

        let Some(entity) = world.find_entity(id) else {
            return;
        };
        let Some(collider) = entity.collider else {
            return;
        };
        let old_pos = collider.global_position(&entity.transform);
        self.velocity = Vec2::new(
            self.direction.x * MOVEMENT_SPEED,
            self.velocity.y + GRAVITY_PER_TICK,
        );

        let step = match resolve_tile_move(
            old_pos,
            self.velocity,
            collider.half_size(),
            &self.tilemap,
        ) {
            MoveOutcome::Moved(step) => step,
            MoveOutcome::LeftWorld => {
                self.take_damage();
                info!(
                    entity_id = id.0,
                    x = old_pos.x,
                    y = old_pos.y,
                    "mushroom_left_world"
                );
                return;
            }
        };

        self.velocity = step.velocity;
        self.is_on_ground = step.is_on_ground;
        if step.hit_left_wall {
            self.direction.x = 1.0;
        }
        if step.hit_right_wall {
            self.direction.x = -1.0;
        }
        if let Some(entity) = world.find_entity_mut(id) {
            entity.transform.position = collider.parent_position_for(step.position);
        }
        trace!(
            entity_id = id.0,
            x = step.position.x,
            y = step.position.y,
            on_ground = self.is_on_ground,
            "mushroom_moved"
        );

        self.resolve_contacts(id, world);
    }

    fn resolve_contacts(&mut self, id: EntityId, world: &mut SceneWorld<Actor>) {
        for other in world.overlapping(id) {
            match world.body_mut(other) {
                Some(Actor::Player(player)) => {
                    if player.velocity().y <= 0.0 {
                        player.take_damage();
                        debug!(entity_id = id.0, player_id = other.0, "mushroom_hit_player");
                    }
                }
                Some(Actor::Mushroom(mushroom)) => {
                    if !mushroom.is_dead() {
                        self.direction.x = -self.direction.x;
                    }
                }
                None => {}
            }
        }
    }

    /// Mirrors the sprite to face `direction` and draws it at `transform`.
    pub(crate) fn draw(&self, transform: &Transform, target: &mut dyn DrawTarget) {
        let mut sprite = self.machine.context().sprite.clone();
        sprite.scale = Vec2::new(-self.direction.x * SPRITE_SCALE, SPRITE_SCALE);
        target.draw_sprite(&sprite, transform);
    }
}
