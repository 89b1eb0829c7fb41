//! Equipment module - tool lifecycle
//!
//! # Architecture
//!
//! **Events → Systems flow:**
//! - Input emits intent events (pickup / drop / switch)
//! - Systems process intents (ToolInventory + physics components)
//! - `pin_held_tools` держит held инструмент у mount каждый frame
//!
//! **Tool pools:**
//! - World pool: `RigidBody::Dynamic`, коллайдеры on, layer Interactable
//! - Held pool: kinematic, `ColliderDisabled`, layer IgnoreRay, `HeldTool`
//! - Stowed: held pool, но скрыт (hotkey switch)

use bevy::prelude::*;

use crate::GardenSet;

pub mod events;
pub mod systems;

// Re-exports
pub use events::*;
pub use systems::*;

/// Equipment plugin (tool lifecycle)
pub struct EquipmentPlugin;

impl Plugin for EquipmentPlugin {
    fn build(&self, app: &mut App) {
        app
            // Events
            .add_event::<PickupIntent>()
            .add_event::<EquipToolIntent>()
            .add_event::<DropToolIntent>()
            .add_event::<SwitchToolIntent>()
            .add_event::<ToolEquipped>()
            .add_event::<ToolDropped>()
            // Intents (pickup → equip в том же frame)
            .add_systems(
                Update,
                (
                    forget_despawned_tools,
                    process_pickup,
                    process_equip_tool,
                    process_drop_tool,
                    process_switch_tool,
                )
                    .chain()
                    .in_set(GardenSet::Intents),
            )
            // Pose + hint (после анимаций текущего frame)
            .add_systems(
                Update,
                (pin_held_tools, update_aim_hint).chain().in_set(GardenSet::Sync),
            );
    }
}
