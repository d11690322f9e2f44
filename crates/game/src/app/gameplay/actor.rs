use engine::{DrawTarget, EntityId, InputSnapshot, SceneWorld, Transform};

use super::mushroom::Mushroom;
use super::player::Player;

/// Every gameplay body the level scene can hold.
pub(crate) enum Actor {
    Player(Player),
    Mushroom(Mushroom),
}

impl Actor {
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Actor::Player(_) => "player",
            Actor::Mushroom(_) => "mushroom",
        }
    }

    /// Must be called with this actor detached from slot `id`.
    pub(crate) fn update(
        &mut self,
        id: EntityId,
        input: &InputSnapshot,
        world: &mut SceneWorld<Actor>,
    ) {
        match self {
            Actor::Player(player) => player.update(id, input, world),
            Actor::Mushroom(mushroom) => mushroom.update(id, world),
        }
    }

    pub(crate) fn draw(&self, transform: &Transform, target: &mut dyn DrawTarget) {
        match self {
            Actor::Player(player) => player.draw(transform, target),
            Actor::Mushroom(mushroom) => mushroom.draw(transform, target),
        }
    }
}
