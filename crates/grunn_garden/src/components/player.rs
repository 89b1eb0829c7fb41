//! Player control marker + aim hint

use bevy::prelude::*;

use super::ToolKind;

/// Marker component для player-controlled entity
///
/// Input systems используют `With<Player>` filter: только player actor получает
/// tool intents из `PlayerInputEvent`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Что сейчас под прицелом (для подсказки "Pick up ...")
///
/// Пересчитывается каждый frame системой `update_aim_hint`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct AimHint {
    pub tool: Option<ToolKind>,
}

impl AimHint {
    pub fn text(&self) -> Option<String> {
        self.tool.map(|kind| format!("Pick up {}", kind.display_name()))
    }
}
