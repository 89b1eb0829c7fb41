//! GRUNN Garden Core
//!
//! ECS-логика садовых инструментов на Bevy 0.16 (first-person gardening)
//!
//! HYBRID ARCHITECTURE:
//! - ECS = game state (inventory, use dispatcher, trim levels, transient actions)
//! - Host engine = rendering, audio, input, world transform sync
//!
//! # Frame flow (`GardenSet`, chained в `Update`)
//! 1. Input → intents (pickup / drop / switch / trigger)
//! 2. Intents → equip / drop / switch
//! 3. Dispatch → use по `ToolKind` (busy lock, swing, aim)
//! 4. Apply → trim / mow / grass setup
//! 5. Animate → transient actions, busy lock release
//! 6. Sync → held tool pose, trim scale, aim hint
//! 7. Cleanup → despawn по timeout

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod components;
pub mod config;
pub mod effects;
pub mod equipment;
pub mod error;
pub mod input;
pub mod layers;
pub mod logger;
pub mod resolver;
pub mod tool_use;
pub mod transient;
pub mod trim;

// Re-export базовых типов для удобства
pub use components::*;
pub use config::{GardenConfig, LayerConfig, MowConfig};
pub use effects::{CueKind, DespawnAfter, EffectsPlugin, SpawnedEffect, ToolCue};
pub use equipment::*;
pub use error::{GardenError, GardenResult};
pub use input::{PlayerInputEvent, PlayerInputPlugin};
pub use layers::{LayerMask, LayerRegistry, NodeLayer, SemanticLayer};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use resolver::{AimTarget, PhysicsQuery, RayHit, SceneColliders, SceneGraph, TargetClass};
pub use tool_use::{Dug, ToolTrigger, ToolUsePlugin, Watered};
pub use transient::{ActionCurve, InterruptPolicy, TransientAction, TransientActionFinished, TransientPlugin};
pub use trim::{GrassBlade, GrassMown, GrassTrimmed, MowIntent, MowableGrass, Mower, SetupGrass, TrimIntent, TrimPlugin};

/// Порядок подсистем внутри frame
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GardenSet {
    Input,
    Intents,
    Dispatch,
    Apply,
    Animate,
    Sync,
    Cleanup,
}

/// Главный plugin (объединяет все подсистемы)
///
/// `GardenConfig` берётся из world, если host вставил его ДО плагина,
/// иначе default. Слои резолвятся один раз здесь.
pub struct GardenPlugin;

impl Plugin for GardenPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GardenConfig>();

        // Layer names → indices (один раз; ошибка → layer-зависимые операции abort)
        let resolved = LayerRegistry::resolve(&app.world().resource::<GardenConfig>().layers);
        match resolved {
            Ok(registry) => {
                app.insert_resource(registry);
            }
            Err(err) => log_error(&format!("❌ Layer configuration error: {}", err)),
        }

        // Детерминистичный RNG (seed по умолчанию, если host не вставил свой)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz (host physics tick)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .configure_sets(
                Update,
                (
                    GardenSet::Input,
                    GardenSet::Intents,
                    GardenSet::Dispatch,
                    GardenSet::Apply,
                    GardenSet::Animate,
                    GardenSet::Sync,
                    GardenSet::Cleanup,
                )
                    .chain(),
            )
            // Подсистемы
            .add_plugins((
                EffectsPlugin,
                TransientPlugin,
                EquipmentPlugin,
                ToolUsePlugin,
                TrimPlugin,
                PlayerInputPlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
