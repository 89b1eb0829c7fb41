//! Trim lifecycle (трава)
//!
//! # Flow
//! 1. Dispatcher (shears) → `TrimIntent { actor, target }`
//! 2. `process_trim_intents` → `Trimmable::trim()`:
//!    - instant step → leaf particles на новой высоте
//!    - transition → `TransientAction::shrink` на траве (busy до завершения)
//! 3. `sync_trim_visuals` → `Transform.scale.y = trim_level` (Changed<Trimmable>)
//!
//! Mowing (overlap sphere вокруг cut point) и grass setup - в подмодулях.

use bevy::prelude::*;

use crate::components::{Appearance, TrimOutcome, Trimmable};
use crate::config::GardenConfig;
use crate::effects::spawn_detached_effect;
use crate::logger::{log, log_error};
use crate::resolver::{world_pose, NodePose};
use crate::transient::TransientAction;
use crate::GardenSet;

pub mod mowing;
pub mod setup;

// Re-exports
pub use mowing::*;
pub use setup::*;

// ============================================================================
// Events
// ============================================================================

/// Trim конкретной травы (от shears dispatcher'а)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimIntent {
    pub actor: Entity,
    pub target: Entity,
}

/// Trim реально изменил уровень (или запустил transition)
///
/// No-op outcomes (`Busy`, `AlreadyTrimmed`, `NoChange`) не публикуются.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct GrassTrimmed {
    pub entity: Entity,
    pub outcome: TrimOutcome,
}

// ============================================================================
// Systems
// ============================================================================

/// Process trim intents
pub fn process_trim_intents(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GardenConfig>,
    mut intents: EventReader<TrimIntent>,
    mut trimmables: Query<(&mut Trimmable, Option<&Appearance>)>,
    poses: Query<NodePose>,
    mut trimmed_events: EventWriter<GrassTrimmed>,
) {
    for intent in intents.read() {
        let Ok((mut trimmable, appearance)) = trimmables.get_mut(intent.target) else {
            log_error(&format!("TrimIntent target {:?} has no Trimmable", intent.target));
            continue;
        };

        let outcome = trimmable.trim();
        let new_level = match outcome {
            TrimOutcome::Trimmed { from_level, to_level } => {
                log(&format!(
                    "✂️ Trimmed {:?}: {:.2} → {:.2}",
                    intent.target, from_level, to_level
                ));
                to_level
            }
            TrimOutcome::Started(transition) => {
                commands
                    .entity(intent.target)
                    .insert(TransientAction::shrink(transition, appearance.map(|a| a.tint)));
                log(&format!(
                    "✂️ Trim transition started on {:?}: {:.2} → {:.2} ({:.2}s)",
                    intent.target, transition.from_level, transition.to_level, transition.duration
                ));
                transition.to_level
            }
            TrimOutcome::Busy | TrimOutcome::AlreadyTrimmed | TrimOutcome::NoChange => {
                log(&format!("⏸️ Trim ignored on {:?}: {:?}", intent.target, outcome));
                continue;
            }
        };

        // Particles без parent: не наследуют scale травы, позиция в world space
        let base = world_pose(&poses, intent.target).map(|pose| pose.translation());
        if let Some((handle, base)) = trimmable.leaf_particles.as_ref().zip(base) {
            spawn_detached_effect(&mut commands, &time, handle, base + Vec3::Y * new_level, config.particle_lifetime);
        }

        trimmed_events.write(GrassTrimmed {
            entity: intent.target,
            outcome,
        });
    }
}

/// Sync trim level → scale.y (низ травы стоит на pivot, укорачивается сверху)
pub fn sync_trim_visuals(mut grass: Query<(&Trimmable, &mut Transform), Changed<Trimmable>>) {
    for (trimmable, mut transform) in grass.iter_mut() {
        if transform.scale.y != trimmable.trim_level() {
            transform.scale.y = trimmable.trim_level();
        }
    }
}

/// Trim plugin (trim intents, mowing, grass setup)
pub struct TrimPlugin;

impl Plugin for TrimPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TrimIntent>()
            .add_event::<GrassTrimmed>()
            .add_event::<MowIntent>()
            .add_event::<GrassMown>()
            .add_event::<SetupGrass>()
            .add_systems(
                Update,
                (process_grass_setup, process_trim_intents, process_mow_intents)
                    .chain()
                    .in_set(GardenSet::Apply),
            )
            .add_systems(Update, sync_trim_visuals.in_set(GardenSet::Sync));
    }
}
