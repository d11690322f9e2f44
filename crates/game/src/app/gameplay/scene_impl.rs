use std::sync::Arc;

use engine::{
    DrawTarget, EntityId, InputSnapshot, ResourceManager, Scene, SceneCommand, SceneWorld,
    Tilemap,
};
use tracing::{error, info};

use super::actor::Actor;
use super::level::{LevelDef, LevelError, SpawnDef};
use super::mushroom::{mushroom_spawn_desc, Mushroom};
use super::player::{player_spawn_desc, Player};

/// Ticks between the player dying and the level being reloaded.
pub(crate) const RESTART_DELAY_TICKS: u32 = 90;

/// Plays one level: spawns its actors, steps them in spawn order and reloads
/// the level a short while after the player dies.
pub(crate) struct LevelScene {
    level: LevelDef,
    tilemap: Arc<Tilemap>,
    resources: ResourceManager,
    player_id: Option<EntityId>,
    ticks_since_player_death: Option<u32>,
    attempts: u32,
}

impl LevelScene {
    pub(crate) fn new(level: LevelDef, resources: ResourceManager) -> Result<Self, LevelError> {
        let tilemap = Arc::new(level.build_tilemap()?);
        Ok(Self {
            level,
            tilemap,
            resources,
            player_id: None,
            ticks_since_player_death: None,
            attempts: 0,
        })
    }

    pub(crate) fn player_id(&self) -> Option<EntityId> {
        self.player_id
    }

    fn player<'w>(&self, world: &'w SceneWorld<Actor>) -> Option<&'w Player> {
        match self.player_id().and_then(|id| world.body(id)) {
            Some(Actor::Player(player)) => Some(player),
            _ => None,
        }
    }

    fn live_mushroom_count(world: &SceneWorld<Actor>) -> usize {
        world
            .entities()
            .iter()
            .filter(|entity| matches!(entity.body(), Some(Actor::Mushroom(m)) if !m.is_dead()))
            .count()
    }

    fn step_actors(&mut self, input: &InputSnapshot, world: &mut SceneWorld<Actor>) {
        for id in world.entity_ids() {
            let Some(mut actor) = world.detach_body(id) else {
                continue;
            };
            actor.update(id, input, world);
            if !world.restore_body(id, actor) {
                error!(entity_id = id.0, "actor_restore_failed");
            }
        }
    }
}

impl Scene<Actor> for LevelScene {
    fn load(&mut self, world: &mut SceneWorld<Actor>) {
        self.attempts = self.attempts.saturating_add(1);
        self.player_id = None;
        self.ticks_since_player_death = None;
        world.set_tilemap(Arc::clone(&self.tilemap));

        let mut spawned = 0usize;
        for spawn in &self.level.spawns {
            match *spawn {
                SpawnDef::Player { position } => {
                    let player = Player::new(&mut self.resources, Arc::clone(&self.tilemap));
                    let id = world.spawn(player_spawn_desc(position), Actor::Player(player));
                    self.player_id = Some(id);
                    spawned += 1;
                }
                SpawnDef::Mushroom { position, facing } => {
                    let tilemap = Arc::clone(&self.tilemap);
                    match Mushroom::new(&mut self.resources, tilemap, facing.x()) {
                        Ok(mushroom) => {
                            world.spawn(mushroom_spawn_desc(position), Actor::Mushroom(mushroom));
                            spawned += 1;
                        }
                        Err(error) => {
                            error!(error = %error, "mushroom_spawn_failed");
                        }
                    }
                }
            }
        }

        info!(
            level = %self.level.name,
            attempt = self.attempts,
            spawned,
            "level_spawned"
        );
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld<Actor>,
    ) -> SceneCommand {
        self.step_actors(input, world);

        let player_dead = self.player(world).map_or(true, Player::is_dead);
        if !player_dead {
            return SceneCommand::None;
        }

        let waited = match self.ticks_since_player_death {
            Some(ticks) => ticks.saturating_add(1),
            None => {
                let hits = self.player(world).map_or(0, Player::hits_taken);
                info!(level = %self.level.name, hits, "player_died");
                0
            }
        };
        self.ticks_since_player_death = Some(waited);
        if waited < RESTART_DELAY_TICKS {
            return SceneCommand::None;
        }

        info!(
            level = %self.level.name,
            attempt = self.attempts,
            "level_restart"
        );
        SceneCommand::Restart
    }

    fn render(&mut self, world: &SceneWorld<Actor>, target: &mut dyn DrawTarget) {
        for entity in world.entities() {
            if let Some(actor) = entity.body() {
                actor.draw(&entity.transform, target);
            }
        }
    }

    fn unload(&mut self, world: &mut SceneWorld<Actor>) {
        let survivors = Self::live_mushroom_count(world);
        let stomps = self.player(world).map_or(0, Player::stomps);
        info!(
            level = %self.level.name,
            attempt = self.attempts,
            mushrooms_alive = survivors,
            stomps,
            "level_unloaded"
        );
        self.player_id = None;
        self.ticks_since_player_death = None;
        world.clear_tilemap();
    }

    fn debug_title(&self, world: &SceneWorld<Actor>) -> Option<String> {
        let kinds = world
            .entities()
            .iter()
            .filter_map(|entity| entity.body().map(Actor::kind_name))
            .collect::<Vec<_>>();
        let grounded = self.player(world).is_some_and(Player::is_on_ground);
        Some(format!(
            "{} | attempt {} | actors [{}] | mushrooms alive {} | player grounded {}",
            self.level.name,
            self.attempts,
            kinds.join(", "),
            Self::live_mushroom_count(world),
            grounded
        ))
    }
}
