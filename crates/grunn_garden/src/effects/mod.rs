//! Audio/particle sinks (fire-and-forget)
//!
//! ECS ответственность:
//! - `ToolCue` события (pickup sound, use burst, blade open, loop start/stop)
//! - detached particle entities с `DespawnAfter`
//!
//! Host engine ответственность:
//! - проигрывание звука / particle system по cue
//! - визуал для `SpawnedEffect` (prefab по `EffectHandle`)

use bevy::prelude::*;

use crate::components::{EffectHandle, ToolKind};
use crate::logger::log;
use crate::GardenSet;

/// Что именно проиграть для инструмента
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    /// Звук подбора
    PickupSound,
    /// One-shot use: звук + particle burst (щелчок ножниц, комья земли)
    UseBurst,
    /// Лезвия ножниц раскрылись после щелчка
    BladeOpen,
    /// Continuous use начался (вода льётся)
    LoopStart,
    /// Continuous use закончился
    LoopStop,
}

/// Cue для host audio/particle sinks
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ToolCue {
    pub tool: Entity,
    pub kind: ToolKind,
    pub cue: CueKind,
}

/// Detached particle effect (без parent - не наследует scale травы)
#[derive(Component, Debug, Clone)]
#[require(Transform)]
pub struct SpawnedEffect {
    pub handle: EffectHandle,
}

/// Компонент: despawn entity после timeout
///
/// Система `despawn_after_timeout` проверяет время и удаляет entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct DespawnAfter {
    /// Время деспавна (в секундах от старта игры)
    pub despawn_time: f32,
}

impl DespawnAfter {
    pub fn from_now(time: &Time, lifetime: f32) -> Self {
        Self {
            despawn_time: time.elapsed_secs() + lifetime,
        }
    }
}

/// Spawn detached self-destructing effect at `position`
pub fn spawn_detached_effect(
    commands: &mut Commands,
    time: &Time,
    handle: &EffectHandle,
    position: Vec3,
    lifetime: f32,
) -> Entity {
    commands
        .spawn((
            SpawnedEffect {
                handle: handle.clone(),
            },
            Transform::from_translation(position),
            DespawnAfter::from_now(time, lifetime),
        ))
        .id()
}

/// Система: деспавн entities с истёкшим DespawnAfter timeout
pub fn despawn_after_timeout(mut commands: Commands, query: Query<(Entity, &DespawnAfter)>, time: Res<Time>) {
    let current_time = time.elapsed_secs();

    for (entity, despawn_after) in query.iter() {
        if current_time >= despawn_after.despawn_time {
            log(&format!("🧹 Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).despawn();
        }
    }
}

pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ToolCue>()
            .add_systems(Update, despawn_after_timeout.in_set(GardenSet::Cleanup));
    }
}
