//! Collision and interaction resolution
//!
//! Moves every entity toward the player, then turns overlaps into calls on
//! [`RunActions`]. Hit envelopes are fixed tuning constants rather than
//! physical shapes.

use glam::Vec3;

use super::actions::RunActions;
use super::entity::{Entity, EntityKind, EntityStore, palette};
use super::events::{GameEvent, SoundCue};
use crate::consts::*;

/// What happened during one resolve pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    pub hits: u32,
    pub pickups: u32,
    pub shots_fired: u32,
    pub portal_entered: bool,
    pub pruned: u32,
}

/// Vertical extent `(bottom, top)` a damaging kind occupies
fn damage_envelope(kind: &EntityKind) -> Option<(f32, f32)> {
    match kind {
        EntityKind::Obstacle { .. } => Some((0.0, OBSTACLE_TOP)),
        EntityKind::Enemy { .. } => Some((0.0, ENEMY_TOP)),
        EntityKind::Projectile => Some((PROJECTILE_BOTTOM, PROJECTILE_TOP)),
        _ => None,
    }
}

/// True when the player's body overlaps `[bottom, top)` vertically
fn body_overlaps(player_y: f32, (bottom, top): (f32, f32)) -> bool {
    player_y < top && player_y + PLAYER_HEIGHT > bottom
}

fn in_hit_window(entity: &Entity, player: Vec3) -> bool {
    (entity.pos.z - player.z).abs() < HIT_WINDOW_Z && (entity.pos.x - player.x).abs() < HIT_WINDOW_X
}

fn within_reach(entity: &Entity, player: Vec3) -> bool {
    (entity.pos.y - (player.y + COLLECT_Y_OFFSET)).abs() < COLLECT_Y_REACH
}

/// Advance and test every entity against the player
///
/// `travel` is this tick's scenery movement; projectiles additionally close
/// in at `PROJECTILE_SPEED`. Consumed entities go inactive and stay in the
/// store until they pass `REMOVE_DISTANCE`, except the portal, which is
/// removed on trigger. Projectiles fired this tick are appended after the
/// pass and are not tested until the next one.
pub fn resolve<A: RunActions>(
    store: &mut EntityStore,
    player: Vec3,
    travel: f32,
    dt: f32,
    run: &mut A,
) -> Contacts {
    let mut contacts = Contacts::default();
    let entities = store.take();
    let mut kept = Vec::with_capacity(entities.len());
    let mut shots = Vec::new();

    for mut entity in entities {
        entity.pos.z += match entity.kind {
            EntityKind::Projectile => travel + PROJECTILE_SPEED * dt,
            _ => travel,
        };

        if let EntityKind::Enemy { has_fired: false } = entity.kind
            && entity.active
            && entity.pos.z > ENEMY_FIRE_Z
        {
            entity.kind = EntityKind::Enemy { has_fired: true };
            shots.push(Vec3::new(entity.pos.x, PROJECTILE_Y, entity.pos.z + 2.0));
            run.emit(GameEvent::ParticleBurst {
                pos: entity.pos,
                color: palette::ENEMY_FIRE_FLASH,
            });
            run.emit(GameEvent::Sound(SoundCue::EnemyFire));
            contacts.shots_fired += 1;
        }

        if entity.active {
            if entity.kind == EntityKind::ShopPortal {
                if (entity.pos.z - player.z).abs() < PORTAL_TRIGGER_Z {
                    log::debug!("Shop portal reached");
                    run.open_shop();
                    run.emit(GameEvent::EntityConsumed { id: entity.id });
                    contacts.portal_entered = true;
                    continue;
                }
            } else if in_hit_window(&entity, player) {
                if let Some(envelope) = damage_envelope(&entity.kind) {
                    if body_overlaps(player.y, envelope) {
                        run.take_damage();
                        run.emit(GameEvent::Sound(SoundCue::Damage));
                        run.emit(GameEvent::ParticleBurst {
                            pos: entity.pos,
                            color: palette::IMPACT,
                        });
                        run.emit(GameEvent::EntityConsumed { id: entity.id });
                        entity.active = false;
                        contacts.hits += 1;
                    }
                } else if within_reach(&entity, player) && collect(&entity, run) {
                    run.emit(GameEvent::ParticleBurst {
                        pos: entity.pos,
                        color: entity.kind.color(),
                    });
                    run.emit(GameEvent::EntityConsumed { id: entity.id });
                    entity.active = false;
                    contacts.pickups += 1;
                }
            }
        }

        if entity.pos.z > REMOVE_DISTANCE {
            contacts.pruned += 1;
            continue;
        }
        kept.push(entity);
    }

    store.replace(kept);
    for pos in shots {
        store.spawn(EntityKind::Projectile, pos);
    }
    contacts
}

/// Hand a pickup to the run; false when it cannot be or was not collected
fn collect<A: RunActions>(entity: &Entity, run: &mut A) -> bool {
    match entity.kind {
        EntityKind::Gem { points, .. } => {
            run.collect_gem(points);
            run.emit(GameEvent::Sound(SoundCue::GemCollect));
            true
        }
        EntityKind::Letter { index } if (index as usize) < BONUS_WORD.len() => {
            if !run.collect_letter(index) {
                return false;
            }
            run.emit(GameEvent::Sound(SoundCue::LetterCollect));
            true
        }
        _ => false,
    }
}
