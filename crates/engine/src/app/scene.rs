use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::input::InputSnapshot;
use super::physics::{Rect, RectangleCollider};
use super::rendering::DrawTarget;
use super::tilemap::Tilemap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Restart,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub position: Vec2,
}

impl Transform {
    pub fn at(position: Vec2) -> Self {
        Self { position }
    }
}

/// A scene slot. `body` holds the gameplay state of the entity and is empty
/// while that state is detached for its own update.
#[derive(Debug, Clone)]
pub struct Entity<T> {
    pub id: EntityId,
    pub debug_name: &'static str,
    pub transform: Transform,
    pub collider: Option<RectangleCollider>,
    body: Option<T>,
    applied_spawn_order: u64,
}

impl<T> Entity<T> {
    pub fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> Option<&mut T> {
        self.body.as_mut()
    }

    pub fn applied_spawn_order(&self) -> u64 {
        self.applied_spawn_order
    }

    pub fn collider_bounds(&self) -> Option<Rect> {
        self.collider
            .map(|collider| collider.global_bounds(&self.transform))
    }
}

#[derive(Debug, Default)]
struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpawnDesc {
    pub debug_name: &'static str,
    pub transform: Transform,
    pub collider: Option<RectangleCollider>,
}

#[derive(Debug)]
pub struct SceneWorld<T> {
    allocator: EntityIdAllocator,
    entities: Vec<Entity<T>>,
    pending_spawns: Vec<Entity<T>>,
    pending_despawns: Vec<EntityId>,
    next_applied_spawn_order: u64,
    tilemap: Option<Arc<Tilemap>>,
}

impl<T> Default for SceneWorld<T> {
    fn default() -> Self {
        Self {
            allocator: EntityIdAllocator::default(),
            entities: Vec::new(),
            pending_spawns: Vec::new(),
            pending_despawns: Vec::new(),
            next_applied_spawn_order: 0,
            tilemap: None,
        }
    }
}

impl<T> SceneWorld<T> {
    pub fn spawn(&mut self, desc: SpawnDesc, body: T) -> EntityId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(Entity {
            id,
            debug_name: desc.debug_name,
            transform: desc.transform,
            collider: desc.collider,
            body: Some(body),
            applied_spawn_order: 0,
        });
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        let exists_now = self.entities.iter().any(|entity| entity.id == id);
        let pending_spawn = self.pending_spawns.iter().any(|entity| entity.id == id);
        if !exists_now && !pending_spawn {
            return false;
        }
        self.pending_despawns.push(id);
        true
    }

    pub fn is_despawn_pending(&self, id: EntityId) -> bool {
        self.pending_despawns.contains(&id)
    }

    pub fn apply_pending(&mut self) {
        if !self.pending_despawns.is_empty() {
            self.pending_despawns.sort_unstable();
            self.pending_despawns.dedup();
            let pending = &self.pending_despawns;
            self.entities
                .retain(|entity| pending.binary_search(&entity.id).is_err());
            self.pending_spawns
                .retain(|entity| pending.binary_search(&entity.id).is_err());
            self.pending_despawns.clear();
        }

        if !self.pending_spawns.is_empty() {
            for mut entity in self.pending_spawns.drain(..) {
                entity.applied_spawn_order = self.next_applied_spawn_order;
                self.next_applied_spawn_order = self.next_applied_spawn_order.saturating_add(1);
                self.entities.push(entity);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending_spawns.clear();
        self.pending_despawns.clear();
        self.next_applied_spawn_order = 0;
    }

    pub fn set_tilemap(&mut self, tilemap: Arc<Tilemap>) {
        self.tilemap = Some(tilemap);
    }

    pub fn clear_tilemap(&mut self) {
        self.tilemap = None;
    }

    pub fn tilemap(&self) -> Option<&Arc<Tilemap>> {
        self.tilemap.as_ref()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[Entity<T>] {
        &self.entities
    }

    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|entity| entity.id).collect()
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity<T>> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity<T>> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn body(&self, id: EntityId) -> Option<&T> {
        self.find_entity(id).and_then(Entity::body)
    }

    pub fn body_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.find_entity_mut(id).and_then(Entity::body_mut)
    }

    /// Takes the body out of its slot so it can be updated against the rest
    /// of the world. Must be paired with [`SceneWorld::restore_body`].
    pub fn detach_body(&mut self, id: EntityId) -> Option<T> {
        self.find_entity_mut(id).and_then(|entity| entity.body.take())
    }

    pub fn restore_body(&mut self, id: EntityId, body: T) -> bool {
        match self.find_entity_mut(id) {
            Some(entity) if entity.body.is_none() => {
                entity.body = Some(body);
                true
            }
            _ => false,
        }
    }

    /// Entities whose collider strictly intersects the collider of `id`,
    /// in applied spawn order. `id` itself is never reported.
    pub fn overlapping(&self, id: EntityId) -> Vec<EntityId> {
        let Some(probe) = self.find_entity(id).and_then(Entity::collider_bounds) else {
            return Vec::new();
        };
        self.entities
            .iter()
            .filter(|entity| entity.id != id)
            .filter(|entity| {
                entity
                    .collider_bounds()
                    .is_some_and(|bounds| bounds.intersects(&probe))
            })
            .map(|entity| entity.id)
            .collect()
    }
}

pub trait Scene<T> {
    fn load(&mut self, world: &mut SceneWorld<T>);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld<T>,
    ) -> SceneCommand;
    fn render(&mut self, world: &SceneWorld<T>, target: &mut dyn DrawTarget);
    fn unload(&mut self, world: &mut SceneWorld<T>);
    fn debug_title(&self, _world: &SceneWorld<T>) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(name: &'static str, position: Vec2) -> SpawnDesc {
        SpawnDesc {
            debug_name: name,
            transform: Transform::at(position),
            collider: Some(RectangleCollider::new(Vec2::new(10.0, 10.0))),
        }
    }

    #[test]
    fn allocator_never_reuses_ids() {
        let mut allocator = EntityIdAllocator::default();
        let first = allocator.allocate();
        let second = allocator.allocate();
        let third = allocator.allocate();

        assert_eq!(first.0, 0);
        assert_eq!(second.0, 1);
        assert_eq!(third.0, 2);
    }

    #[test]
    fn spawn_is_deferred_until_apply_pending() {
        let mut world = SceneWorld::<u32>::default();
        let id = world.spawn(boxed("a", Vec2::ZERO), 7);
        assert_eq!(world.entity_count(), 0);

        world.apply_pending();
        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.body(id), Some(&7));
    }

    #[test]
    fn despawn_is_deferred_and_duplicates_are_idempotent() {
        let mut world = SceneWorld::<u32>::default();
        let doomed = world.spawn(boxed("doomed", Vec2::ZERO), 1);
        let survivor = world.spawn(boxed("survivor", Vec2::new(3.0, 1.0)), 2);
        world.apply_pending();

        assert!(world.despawn(doomed));
        assert!(world.despawn(doomed));
        assert!(world.is_despawn_pending(doomed));
        assert!(world.find_entity(doomed).is_some());

        world.apply_pending();
        assert_eq!(world.entity_count(), 1);
        assert!(world.find_entity(doomed).is_none());
        assert!(world.find_entity(survivor).is_some());
        assert!(!world.despawn(doomed));
    }

    #[test]
    fn despawn_of_pending_spawn_never_materializes() {
        let mut world = SceneWorld::<u32>::default();
        let id = world.spawn(boxed("ghost", Vec2::ZERO), 1);
        assert!(world.despawn(id));
        world.apply_pending();
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn detached_body_is_restored_into_same_slot() {
        let mut world = SceneWorld::<u32>::default();
        let id = world.spawn(boxed("a", Vec2::ZERO), 5);
        world.apply_pending();

        let body = world.detach_body(id).expect("body");
        assert!(world.body(id).is_none());
        assert!(world.detach_body(id).is_none());
        assert!(world.restore_body(id, body + 1));
        assert!(!world.restore_body(id, 0));
        assert_eq!(world.body(id), Some(&6));
    }

    #[test]
    fn overlapping_excludes_probe_and_touching_edges() {
        let mut world = SceneWorld::<u32>::default();
        let probe = world.spawn(boxed("probe", Vec2::ZERO), 0);
        let overlapping = world.spawn(boxed("overlapping", Vec2::new(5.0, 5.0)), 1);
        let touching = world.spawn(boxed("touching", Vec2::new(10.0, 0.0)), 2);
        let far = world.spawn(boxed("far", Vec2::new(100.0, 0.0)), 3);
        let ghost = world.spawn(
            SpawnDesc {
                debug_name: "no_collider",
                transform: Transform::default(),
                collider: None,
            },
            4,
        );
        world.apply_pending();

        let hits = world.overlapping(probe);
        assert_eq!(hits, vec![overlapping]);
        assert!(!hits.contains(&touching));
        assert!(!hits.contains(&far));
        assert!(!hits.contains(&ghost));
        assert!(world.overlapping(ghost).is_empty());
    }

    #[test]
    fn clear_resets_spawn_order_but_keeps_tilemap() {
        let mut world = SceneWorld::<u32>::default();
        let tilemap =
            Tilemap::new(1, 1, Vec2::ZERO, Vec2::new(16.0, 16.0), vec![0]).expect("tilemap");
        world.set_tilemap(Arc::new(tilemap));
        world.spawn(boxed("a", Vec2::ZERO), 1);
        world.apply_pending();

        world.clear();
        assert_eq!(world.entity_count(), 0);
        assert!(world.tilemap().is_some());

        let id = world.spawn(boxed("b", Vec2::ZERO), 2);
        world.apply_pending();
        assert_eq!(
            world.find_entity(id).expect("entity").applied_spawn_order(),
            0
        );

        world.clear_tilemap();
        assert!(world.tilemap().is_none());
    }

    #[test]
    fn vec2_arithmetic() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(0.5, -1.0);
        assert_eq!(a + b, Vec2::new(1.5, 1.0));
        assert_eq!(a - b, Vec2::new(0.5, 3.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert_eq!(-a, Vec2::new(-1.0, -2.0));
        assert!(!Vec2::new(f32::NAN, 0.0).is_finite());
    }
}
