use std::sync::Arc;

use engine::{
    DrawTarget, EntityId, InputAction, InputSnapshot, RectangleCollider, ResourceManager,
    SceneWorld, SpawnDesc, Sprite, SpriteSheetAnimation, Tilemap, Transform, Vec2,
};
use tracing::{debug, info};

use super::actor::Actor;
use super::kinematics::{resolve_tile_move, MoveOutcome, GRAVITY_PER_TICK};

pub(crate) const PLAYER_NAME: &str = "player";
pub(crate) const IDLE_TEXTURE_KEY: &str = "player/idle";

const MOVEMENT_SPEED: f32 = 4.0;
const JUMP_VELOCITY: f32 = -14.0;
const STOMP_BOUNCE_VELOCITY: f32 = -8.0;
const ANIMATION_TICKS_PER_FRAME: u32 = 4;
const FRAME_SIZE_PX: u32 = 32;
const SPRITE_SCALE: f32 = 2.0;
const SPRITE_ORIGIN: Vec2 = Vec2::new(16.0, 16.0);
const COLLIDER_SIZE: Vec2 = Vec2::new(28.0, 32.0);

pub(crate) fn player_spawn_desc(position: Vec2) -> SpawnDesc {
    SpawnDesc {
        debug_name: PLAYER_NAME,
        transform: Transform::at(position),
        collider: Some(RectangleCollider::new(COLLIDER_SIZE)),
    }
}

/// Input-driven body sharing the mushroom's tile mover. Landing on a live
/// mushroom while falling kills it and bounces the player back up.
pub(crate) struct Player {
    tilemap: Arc<Tilemap>,
    animation: SpriteSheetAnimation,
    sprite: Sprite,
    velocity: Vec2,
    facing_x: f32,
    is_on_ground: bool,
    is_dead: bool,
    hits_taken: u32,
    stomps: u32,
}

impl Player {
    pub(crate) fn new(resources: &mut ResourceManager, tilemap: Arc<Tilemap>) -> Self {
        let texture = resources.load_texture_or_placeholder(IDLE_TEXTURE_KEY);
        let mut sprite = Sprite::new(Arc::clone(&texture));
        sprite.origin = SPRITE_ORIGIN;
        let mut animation = SpriteSheetAnimation::new(
            texture,
            FRAME_SIZE_PX,
            FRAME_SIZE_PX,
            ANIMATION_TICKS_PER_FRAME,
        );
        animation.start();
        animation.apply_to(&mut sprite);
        Self {
            tilemap,
            animation,
            sprite,
            velocity: Vec2::ZERO,
            facing_x: 1.0,
            is_on_ground: false,
            is_dead: false,
            hits_taken: 0,
            stomps: 0,
        }
    }

    pub(crate) fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub(crate) fn is_on_ground(&self) -> bool {
        self.is_on_ground
    }

    pub(crate) fn hits_taken(&self) -> u32 {
        self.hits_taken
    }

    pub(crate) fn stomps(&self) -> u32 {
        self.stomps
    }

    pub(crate) fn take_damage(&mut self) {
        self.hits_taken = self.hits_taken.saturating_add(1);
        self.is_dead = true;
    }

    #[cfg(test)]
    pub(crate) fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub(crate) fn update(
        &mut self,
        id: EntityId,
        input: &InputSnapshot,
        world: &mut SceneWorld<Actor>,
    ) {
        if self.is_dead {
            return;
        }
        self.animation.update();
        self.animation.apply_to(&mut self.sprite);

        let Some(entity) = world.find_entity(id) else {
            return;
        };
        let Some(collider) = entity.collider else {
            return;
        };
        let old_pos = collider.global_position(&entity.transform);

        let axis = input.horizontal_axis();
        if axis != 0.0 {
            self.facing_x = axis;
        }
        let mut velocity = Vec2::new(axis * MOVEMENT_SPEED, self.velocity.y + GRAVITY_PER_TICK);
        if self.is_on_ground && input.is_down(InputAction::Jump) {
            velocity.y = JUMP_VELOCITY;
            debug!(entity_id = id.0, "player_jump");
        }

        let step = match resolve_tile_move(old_pos, velocity, collider.half_size(), &self.tilemap)
        {
            MoveOutcome::Moved(step) => step,
            MoveOutcome::LeftWorld => {
                self.take_damage();
                info!(entity_id = id.0, "player_left_world");
                return;
            }
        };
        if step.hit_ceiling {
            debug!(entity_id = id.0, "player_hit_ceiling");
        }
        self.velocity = step.velocity;
        self.is_on_ground = step.is_on_ground;
        if let Some(entity) = world.find_entity_mut(id) {
            entity.transform.position = collider.parent_position_for(step.position);
        }

        // grounded players only walk into mushrooms
        if self.velocity.y > 0.0 {
            self.stomp_overlapping(id, world);
        }
    }

    fn stomp_overlapping(&mut self, id: EntityId, world: &mut SceneWorld<Actor>) {
        let mut stomped = false;
        for other in world.overlapping(id) {
            if let Some(Actor::Mushroom(mushroom)) = world.body_mut(other) {
                if !mushroom.is_dead() {
                    mushroom.take_damage();
                    stomped = true;
                    info!(entity_id = id.0, mushroom_id = other.0, "player_stomped_mushroom");
                }
            }
        }
        if stomped {
            self.stomps = self.stomps.saturating_add(1);
            self.velocity.y = STOMP_BOUNCE_VELOCITY;
            self.is_on_ground = false;
        }
    }

    pub(crate) fn draw(&self, transform: &Transform, target: &mut dyn DrawTarget) {
        let mut sprite = self.sprite.clone();
        sprite.scale = Vec2::new(self.facing_x * SPRITE_SCALE, SPRITE_SCALE);
        target.draw_sprite(&sprite, transform);
    }
}

#[cfg(test)]
mod tests {
    use engine::Texture;

    use super::*;
    use crate::app::gameplay::mushroom::{mushroom_spawn_desc, Mushroom};
    use crate::app::gameplay::tile_id::TileId;

    fn flat_world() -> (SceneWorld<Actor>, Arc<Tilemap>, ResourceManager) {
        let width = 10;
        let height = 6;
        let tiles = (0..width * height)
            .map(|index| {
                if index / width == height - 1 {
                    TileId::DIRT_TOP.0
                } else {
                    TileId::EMPTY.0
                }
            })
            .collect();
        let tilemap = Arc::new(
            Tilemap::new(width, height, Vec2::ZERO, Vec2::new(32.0, 32.0), tiles)
                .expect("tilemap"),
        );
        let mut world = SceneWorld::default();
        world.set_tilemap(Arc::clone(&tilemap));
        let mut resources = ResourceManager::in_memory();
        resources.insert_texture(Texture::solid(IDLE_TEXTURE_KEY, 64, 32, [0; 4]));
        (world, tilemap, resources)
    }

    fn tick(world: &mut SceneWorld<Actor>, id: EntityId, input: &InputSnapshot) {
        let Some(Actor::Player(mut player)) = world.detach_body(id) else {
            panic!("expected a player body");
        };
        player.update(id, input, world);
        world.restore_body(id, Actor::Player(player));
    }

    fn player(world: &SceneWorld<Actor>, id: EntityId) -> &Player {
        match world.body(id) {
            Some(Actor::Player(player)) => player,
            _ => panic!("expected a player body"),
        }
    }

    #[test]
    fn walks_and_lands_on_floor() {
        let (mut world, tilemap, mut resources) = flat_world();
        let id = world.spawn(
            player_spawn_desc(Vec2::new(100.0, 100.0)),
            Actor::Player(Player::new(&mut resources, tilemap)),
        );
        world.apply_pending();

        let right = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
        for _ in 0..20 {
            tick(&mut world, id, &right);
        }

        let position = world.find_entity(id).expect("player").transform.position;
        assert_eq!(position, Vec2::new(180.0, 160.0 - 16.0));
        assert!(player(&world, id).is_on_ground());
    }

    #[test]
    fn jump_only_from_the_ground() {
        let (mut world, tilemap, mut resources) = flat_world();
        let id = world.spawn(
            player_spawn_desc(Vec2::new(100.0, 144.0)),
            Actor::Player(Player::new(&mut resources, tilemap)),
        );
        world.apply_pending();

        let jump = InputSnapshot::empty().with_action_down(InputAction::Jump, true);
        tick(&mut world, id, &InputSnapshot::empty());
        assert!(player(&world, id).is_on_ground());

        tick(&mut world, id, &jump);
        assert_eq!(player(&world, id).velocity().y, JUMP_VELOCITY);
        tick(&mut world, id, &jump);
        assert_eq!(player(&world, id).velocity().y, JUMP_VELOCITY + 1.0);
    }

    #[test]
    fn falling_onto_live_mushroom_stomps_and_bounces() {
        let (mut world, tilemap, mut resources) = flat_world();
        let mushroom_id = world.spawn(
            mushroom_spawn_desc(Vec2::new(100.0, 128.0)),
            Actor::Mushroom(
                Mushroom::new(&mut resources, Arc::clone(&tilemap), 1.0).expect("mushroom"),
            ),
        );
        // player bottom edge sits just inside the mushroom's top edge once it moves
        let player_id = world.spawn(
            player_spawn_desc(Vec2::new(100.0, 110.0)),
            Actor::Player(Player::new(&mut resources, tilemap)),
        );
        world.apply_pending();
        if let Some(Actor::Player(body)) = world.body_mut(player_id) {
            body.set_velocity(Vec2::new(0.0, 3.0));
        }

        tick(&mut world, player_id, &InputSnapshot::empty());

        let body = player(&world, player_id);
        assert_eq!(body.velocity().y, STOMP_BOUNCE_VELOCITY);
        assert_eq!(body.stomps(), 1);
        assert!(!body.is_dead());
        match world.body(mushroom_id) {
            Some(Actor::Mushroom(mushroom)) => assert!(mushroom.is_dead()),
            _ => panic!("expected a mushroom body"),
        }
    }

    #[test]
    fn take_damage_counts_every_hit_and_stays_dead() {
        let (_, tilemap, mut resources) = flat_world();
        let mut player = Player::new(&mut resources, tilemap);
        player.take_damage();
        player.take_damage();
        assert!(player.is_dead());
        assert_eq!(player.hits_taken(), 2);
    }
}
