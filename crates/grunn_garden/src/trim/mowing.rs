//! Mowing: overlap sphere вокруг cut point ножниц.
//!
//! # Flow
//! 1. Shears use + `Mower` на инструменте → `MowIntent { center, radius }`
//! 2. `process_mow_intents` → `overlap_sphere` по grass mask
//! 3. Каждая `MowableGrass` режется один раз: particle, `RigidBody::Dynamic`,
//!    impulse от cut point (+ вверх), случайный torque, despawn через 3s

use bevy::prelude::*;
use bevy_rapier3d::prelude::{ExternalImpulse, GravityScale, RigidBody};
use rand::Rng;

use crate::components::EffectHandle;
use crate::config::{GardenConfig, MowConfig};
use crate::effects::{spawn_detached_effect, DespawnAfter};
use crate::layers::{require_registry, LayerRegistry, SemanticLayer};
use crate::logger::log;
use crate::resolver::{PhysicsQuery, SceneColliders};
use crate::DeterministicRng;

/// Mower на инструменте (ножницы)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Mower {
    pub radius: f32,
    /// Cut point в local space инструмента (кончик лезвий)
    pub cut_point: Vec3,
}

impl Mower {
    pub fn from_config(config: &MowConfig) -> Self {
        Self {
            radius: config.radius,
            cut_point: Vec3::ZERO,
        }
    }

    pub fn with_cut_point(mut self, cut_point: Vec3) -> Self {
        self.cut_point = cut_point;
        self
    }

    /// World-space cut point по текущей world pose инструмента
    pub fn world_cut_point(&self, tool_pose: &GlobalTransform) -> Vec3 {
        tool_pose.transform_point(self.cut_point)
    }
}

/// Трава, которую можно срезать целиком (разлетается)
#[derive(Component, Debug, Clone)]
pub struct MowableGrass {
    cut: bool,
    pub fly_force: f32,
    pub torque_force: f32,
    pub particle: Option<EffectHandle>,
}

impl Default for MowableGrass {
    fn default() -> Self {
        Self::from_config(&MowConfig::default())
    }
}

impl MowableGrass {
    pub fn from_config(config: &MowConfig) -> Self {
        Self {
            cut: false,
            fly_force: config.fly_force,
            torque_force: config.torque_force,
            particle: None,
        }
    }

    pub fn with_particle(mut self, handle: impl Into<EffectHandle>) -> Self {
        self.particle = Some(handle.into());
        self
    }

    pub fn is_cut(&self) -> bool {
        self.cut
    }

    /// Idempotent: true только при первом срезе
    pub fn mark_cut(&mut self) -> bool {
        if self.cut {
            return false;
        }
        self.cut = true;
        true
    }

    /// `spin` - случайный вектор в [0, 1]^3
    pub fn impulse(&self, direction: Vec3, spin: Vec3) -> ExternalImpulse {
        ExternalImpulse {
            impulse: direction * self.fly_force,
            torque_impulse: spin * self.torque_force,
        }
    }
}

/// Направление разлёта: от cut point наружу + немного вверх
pub fn blast_direction(grass_position: Vec3, cut_point: Vec3, upward_bias: f32) -> Vec3 {
    (grass_position - cut_point).normalize_or_zero() + Vec3::Y * upward_bias
}

// ============================================================================
// Events
// ============================================================================

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct MowIntent {
    pub actor: Entity,
    pub center: Vec3,
    pub radius: f32,
}

/// Трава срезана (entity despawn'ится через `debris_lifetime`)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrassMown {
    pub entity: Entity,
}

// ============================================================================
// Systems
// ============================================================================

/// Process mow intents
pub fn process_mow_intents(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GardenConfig>,
    registry: Option<Res<LayerRegistry>>,
    mut rng: ResMut<DeterministicRng>,
    mut intents: EventReader<MowIntent>,
    scene: SceneColliders,
    mut grass: Query<&mut MowableGrass>,
    mut mown_events: EventWriter<GrassMown>,
) {
    for intent in intents.read() {
        let Some(registry) = require_registry(registry.as_deref(), &config.layers, "Mow") else {
            continue;
        };

        let grass_mask = registry.mask(&[SemanticLayer::Trimmable]);
        let hits = scene.overlap_sphere(intent.center, intent.radius, grass_mask);

        let mut mown = 0;
        for entity in hits {
            let Ok(mut mowable) = grass.get_mut(entity) else {
                continue;
            };
            let Some(position) = scene.world_pose(entity).map(|pose| pose.translation()) else {
                continue;
            };
            if !mowable.mark_cut() {
                continue;
            }

            let direction = blast_direction(position, intent.center, config.mow.upward_bias);
            let spin = Vec3::new(rng.rng.gen(), rng.rng.gen(), rng.rng.gen());

            if let Some(handle) = &mowable.particle {
                spawn_detached_effect(&mut commands, &time, handle, position, config.particle_lifetime);
            }

            commands.entity(entity).insert((
                RigidBody::Dynamic,
                GravityScale(1.0),
                mowable.impulse(direction, spin),
                DespawnAfter::from_now(&time, config.mow.debris_lifetime),
            ));

            mown_events.write(GrassMown { entity });
            mown += 1;
        }

        if mown > 0 {
            log(&format!("🌾 Mowed {} grass blades around {:?}", mown, intent.center));
        }
    }
}
