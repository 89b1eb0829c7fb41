//! Player input → tool intents
//!
//! Host engine генерирует `PlayerInputEvent` каждый frame (из своего Input API),
//! ECS systems переводят его в intents для player actor'а.

use bevy::prelude::*;

use crate::components::{Player, ToolInventory, ToolKind};
use crate::equipment::{DropToolIntent, PickupIntent, SwitchToolIntent};
use crate::logger::log;
use crate::tool_use::ToolTrigger;
use crate::GardenSet;

/// Player input event - генерируется host'ом каждый frame
///
/// # Fields
/// - `trigger_pressed`: LMB (just_pressed) - one-shot use
/// - `trigger_held`: LMB (pressed) - continuous use (полив)
/// - `interact`: E (just_pressed) - pickup, или drop если руки заняты
/// - `drop`: Q (just_pressed)
/// - `hotkey`: клавиши 1-3 → tool id 0-2
#[derive(Event, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInputEvent {
    pub trigger_pressed: bool,
    pub trigger_held: bool,
    pub interact: bool,
    pub drop: bool,
    pub hotkey: Option<u8>,
}

impl PlayerInputEvent {
    pub fn click() -> Self {
        Self {
            trigger_pressed: true,
            trigger_held: true,
            ..default()
        }
    }

    pub fn hold() -> Self {
        Self {
            trigger_held: true,
            ..default()
        }
    }

    pub fn interact() -> Self {
        Self {
            interact: true,
            ..default()
        }
    }

    pub fn drop_tool() -> Self {
        Self {
            drop: true,
            ..default()
        }
    }

    pub fn hotkey(id: u8) -> Self {
        Self {
            hotkey: Some(id),
            ..default()
        }
    }
}

/// Player input system
///
/// # Архитектура
/// - Читает: PlayerInputEvent
/// - Пишет: ToolTrigger (каждый event), PickupIntent / DropToolIntent / SwitchToolIntent
/// - Query: With<Player>
pub fn process_player_input(
    mut input_events: EventReader<PlayerInputEvent>,
    player_query: Query<(Entity, &ToolInventory), With<Player>>,
    mut triggers: EventWriter<ToolTrigger>,
    mut pickups: EventWriter<PickupIntent>,
    mut drops: EventWriter<DropToolIntent>,
    mut switches: EventWriter<SwitchToolIntent>,
) {
    // Guard: нет player entity
    let Ok((player, inventory)) = player_query.single() else {
        input_events.clear();
        return;
    };

    for input in input_events.read() {
        triggers.write(ToolTrigger {
            actor: player,
            pressed: input.trigger_pressed,
            held: input.trigger_held,
        });

        // E: drop если что-то в руках, иначе pickup
        if input.interact {
            if inventory.equipped().is_some() {
                drops.write(DropToolIntent { actor: player });
            } else {
                pickups.write(PickupIntent { actor: player });
            }
        }

        if input.drop {
            drops.write(DropToolIntent { actor: player });
        }

        if let Some(id) = input.hotkey {
            match ToolKind::from_id(id) {
                Some(kind) => {
                    switches.write(SwitchToolIntent { actor: player, kind });
                }
                None => log(&format!("⚠️ Hotkey {} has no tool", id.saturating_add(1))),
            }
        }
    }
}

pub struct PlayerInputPlugin;

impl Plugin for PlayerInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayerInputEvent>()
            .add_systems(Update, process_player_input.in_set(GardenSet::Input));
    }
}
