//! Tool use - trigger input → действие equipped инструмента
//!
//! # Routing (по `ToolKind`)
//! - Shears (0): swing + trim травы под прицелом (+ mowing, если есть `Mower`)
//! - WateringCan (1): continuous наклон + loop cue + `Watered` (без busy lock)
//! - Shovel (2): swing + `Dug` и dirt burst при попадании в землю
//!
//! Нет инструмента → input игнорируется. Промах луча → без эффекта на цель.

use bevy::prelude::*;

use crate::transient::advance_transient_actions;
use crate::GardenSet;

pub mod dispatcher;

pub use dispatcher::*;

// ============================================================================
// Events
// ============================================================================

/// Trigger state актора за frame (input source → dispatcher)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolTrigger {
    pub actor: Entity,
    /// Trigger-down в этом frame (one-shot tools)
    pub pressed: bool,
    /// Trigger удерживается (continuous tools)
    pub held: bool,
}

impl ToolTrigger {
    pub fn down(actor: Entity) -> Self {
        Self {
            actor,
            pressed: true,
            held: true,
        }
    }

    pub fn held(actor: Entity) -> Self {
        Self {
            actor,
            pressed: false,
            held: true,
        }
    }

    pub fn released(actor: Entity) -> Self {
        Self {
            actor,
            pressed: false,
            held: false,
        }
    }
}

/// Watering can льёт на цель (каждый frame, пока trigger held)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct Watered {
    pub actor: Entity,
    pub target: Entity,
    pub point: Vec3,
}

/// Лопата попала в землю
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct Dug {
    pub actor: Entity,
    pub point: Vec3,
}

/// Tool use plugin (dispatcher + busy lock release)
pub struct ToolUsePlugin;

impl Plugin for ToolUsePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ToolTrigger>()
            .add_event::<Watered>()
            .add_event::<Dug>()
            .add_systems(Update, dispatch_tool_use.in_set(GardenSet::Dispatch))
            .add_systems(
                Update,
                release_busy_locks
                    .after(advance_transient_actions)
                    .in_set(GardenSet::Animate),
            );
    }
}
