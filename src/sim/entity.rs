//! World entities and the lifecycle store that owns them

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::EMPTY_FRONTIER_Z;

/// Packed 0xRRGGBB color, looked up by the renderer
pub type Rgb = u32;

/// Named colors used by spawns and effects
pub mod palette {
    use super::Rgb;

    pub const RED: Rgb = 0xff1744;
    pub const BLUE: Rgb = 0x2979ff;
    pub const GREEN: Rgb = 0x00e676;
    pub const YELLOW: Rgb = 0xffea00;
    pub const PURPLE: Rgb = 0xd500f9;
    pub const PINK: Rgb = 0xf472b6;
    pub const CYAN: Rgb = 0x00ffff;
    pub const WHITE: Rgb = 0xffffff;
    pub const ENEMY: Rgb = 0x00ff00;
    pub const PROJECTILE: Rgb = 0xff0000;
    pub const ENEMY_FIRE_FLASH: Rgb = 0xff00ff;
    pub const IMPACT: Rgb = 0xff4400;

    /// Random obstacle colors
    pub const OBSTACLE: [Rgb; 5] = [RED, BLUE, GREEN, YELLOW, PURPLE];
    /// Bonus letter colors, indexed by letter position (B O N U S)
    pub const LETTERS: [Rgb; 5] = [BLUE, RED, YELLOW, GREEN, PINK];
}

/// Stable entity identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Kind plus the data only that kind needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle { color: Rgb },
    Gem { color: Rgb, points: u64 },
    /// `index` is the position in the bonus word (0..5)
    Letter { index: u8 },
    ShopPortal,
    Enemy { has_fired: bool },
    Projectile,
}

impl EntityKind {
    /// Kinds that cost a life on contact
    pub fn is_damaging(&self) -> bool {
        matches!(
            self,
            EntityKind::Obstacle { .. } | EntityKind::Enemy { .. } | EntityKind::Projectile
        )
    }

    /// Color used for bursts and rendering
    pub fn color(&self) -> Rgb {
        match *self {
            EntityKind::Obstacle { color } | EntityKind::Gem { color, .. } => color,
            EntityKind::Letter { index } => palette::LETTERS
                .get(index as usize)
                .copied()
                .unwrap_or(palette::WHITE),
            EntityKind::ShopPortal => palette::YELLOW,
            EntityKind::Enemy { .. } => palette::ENEMY,
            EntityKind::Projectile => palette::PROJECTILE,
        }
    }

    /// Glyph shown for a letter entity
    pub fn letter_glyph(&self) -> Option<char> {
        match *self {
            EntityKind::Letter { index } => crate::consts::BONUS_WORD.get(index as usize).copied(),
            _ => None,
        }
    }
}

/// A spawned world object
///
/// `pos.z` is forward distance; negative is ahead of the player, which
/// sits at z = 0. Entities travel toward +z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec3,
    pub active: bool,
}

/// Ordered collection of live entities
///
/// The spawn engine appends, the resolver moves and prunes. Renderers only
/// read through [`EntityStore::iter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStore {
    entities: Vec<Entity>,
    next_id: u64,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append an active entity and return its id
    pub fn spawn(&mut self, kind: EntityKind, pos: Vec3) -> EntityId {
        let id = self.next_entity_id();
        self.entities.push(Entity {
            id,
            kind,
            pos,
            active: true,
        });
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Only active entities (what a renderer draws)
    pub fn visible(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.active)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Forward-most z among active non-projectile entities
    ///
    /// Projectiles fly toward the player and consumed entities are only
    /// waiting to be pruned; neither defines the spawn frontier.
    pub fn frontier_z(&self) -> f32 {
        self.entities
            .iter()
            .filter(|e| e.active && !matches!(e.kind, EntityKind::Projectile))
            .map(|e| e.pos.z)
            .reduce(f32::min)
            .unwrap_or(EMPTY_FRONTIER_Z)
    }

    /// Swap in the collection for the next tick
    pub(crate) fn replace(&mut self, entities: Vec<Entity>) {
        self.entities = entities;
    }

    /// Take the current collection for a rebuild pass
    pub(crate) fn take(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.entities)
    }

    pub fn retain(&mut self, keep: impl FnMut(&Entity) -> bool) {
        self.entities.retain(keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontier_defaults_when_empty() {
        let store = EntityStore::new();
        assert_eq!(store.frontier_z(), EMPTY_FRONTIER_Z);
    }

    #[test]
    fn test_frontier_ignores_projectiles() {
        let mut store = EntityStore::new();
        store.spawn(EntityKind::Obstacle { color: palette::RED }, Vec3::new(0.0, 0.4, -50.0));
        store.spawn(EntityKind::Projectile, Vec3::new(0.0, 1.0, -200.0));
        assert_eq!(store.frontier_z(), -50.0);
    }

    #[test]
    fn test_frontier_ignores_consumed() {
        let mut store = EntityStore::new();
        store.spawn(EntityKind::Obstacle { color: palette::RED }, Vec3::new(0.0, 0.4, -30.0));
        let gem = store.spawn(
            EntityKind::Gem {
                color: palette::CYAN,
                points: 50,
            },
            Vec3::new(0.0, 1.2, -90.0),
        );
        assert_eq!(store.frontier_z(), -90.0);

        let mut entities = store.take();
        for e in entities.iter_mut().filter(|e| e.id == gem) {
            e.active = false;
        }
        store.replace(entities);
        assert_eq!(store.frontier_z(), -30.0);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut store = EntityStore::new();
        let a = store.spawn(EntityKind::ShopPortal, Vec3::ZERO);
        let b = store.spawn(EntityKind::Projectile, Vec3::ZERO);
        assert_ne!(a, b);
        assert_eq!(store.get(b).map(|e| e.kind), Some(EntityKind::Projectile));
    }

    #[test]
    fn test_letter_kind_helpers() {
        let kind = EntityKind::Letter { index: 2 };
        assert_eq!(kind.letter_glyph(), Some('N'));
        assert_eq!(kind.color(), palette::YELLOW);
        assert!(!kind.is_damaging());
        assert!(EntityKind::Enemy { has_fired: false }.is_damaging());
    }
}
