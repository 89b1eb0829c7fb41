//! Equipment events (tool pickup / drop / switch)
//!
//! # Architecture
//!
//! **Intents** (input → equipment systems):
//! - `PickupIntent` → ray от mount, interactable root, equip если это `Tool`
//! - `EquipToolIntent` → equip конкретного инструмента (world pool → hands)
//! - `DropToolIntent` → drop текущего инструмента (hands → world pool)
//! - `SwitchToolIntent` → hotkey 1-3 (stow / swap с stowed)
//!
//! **Notifications** (для host UI / audio):
//! - `ToolEquipped`, `ToolDropped`

use bevy::prelude::*;

use crate::components::ToolKind;

// ============================================================================
// Intents
// ============================================================================

/// Подобрать то, что под прицелом
///
/// # Flow
/// 1. Ray от mount актора (interaction distance, interactable mask)
/// 2. Hit → interactable root (compound объекты)
/// 3. Root с `Tool` → `EquipToolIntent`
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PickupIntent {
    pub actor: Entity,
}

/// Equip инструмента
///
/// # Flow
/// 1. Руки заняты / инструмент уже в held pool → no-op
/// 2. Rigidbody → kinematic, gravity off, velocity zero, colliders off
/// 3. `HeldTool` (hold pose), layer → IgnoreRay
/// 4. Pickup sound cue + `ToolEquipped`
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EquipToolIntent {
    pub actor: Entity,
    pub tool: Entity,
}

/// Drop текущего инструмента
///
/// # Flow
/// 1. Ничего в руках → no-op
/// 2. Rigidbody → dynamic, gravity on, colliders on
/// 3. `HeldTool` удаляется, layer → Interactable (pose остаётся последней pinned)
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DropToolIntent {
    pub actor: Entity,
}

/// Hotkey переключение (отклоняется, пока актор Busy)
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwitchToolIntent {
    pub actor: Entity,
    pub kind: ToolKind,
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToolEquipped {
    pub actor: Entity,
    pub tool: Entity,
    pub kind: ToolKind,
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToolDropped {
    pub actor: Entity,
    pub tool: Entity,
    pub kind: ToolKind,
}
