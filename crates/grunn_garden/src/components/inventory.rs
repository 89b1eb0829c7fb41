//! Tool inventory (per actor)
//!
//! # Архитектура
//!
//! **Equipped** - максимум ОДИН инструмент в руках:
//! - `begin_equip` при занятых руках → `EquipOutcome::Occupied` (no-op)
//! - инструмент, уже лежащий в held pool, повторно не экипируется
//!
//! **Stowed** - подобранные, но убранные инструменты (hotkeys 1-3):
//! - hotkey текущего инструмента → stow
//! - hotkey stowed инструмента → swap (текущий уходит в stowed)
//!
//! Компонент хранит только state machine. Физика/слои/pose меняются
//! системами equipment модуля.

use bevy::prelude::*;

use super::{AimHint, ToolKind, ToolUser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct EquippedTool {
    pub entity: Entity,
    pub kind: ToolKind,
}

/// Результат попытки equip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipOutcome {
    Equipped,
    /// Руки заняты - no-op
    Occupied,
    /// Этот инструмент уже в held pool
    AlreadyHeld,
}

/// План переключения по hotkey
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchPlan {
    /// Убрать текущий инструмент (руки пустые)
    Stow(EquippedTool),
    /// Достать stowed инструмент; текущий (если есть) уходит в stowed
    Swap {
        stow: Option<EquippedTool>,
        equip: EquippedTool,
    },
    /// Инструмент не подобран - переключаться не на что
    NotOwned,
}

#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(ToolUser, AimHint)]
pub struct ToolInventory {
    /// Mount point (камера / рука) - host-owned node
    pub mount: Option<Entity>,
    equipped: Option<EquippedTool>,
    stowed: Vec<EquippedTool>,
}

impl ToolInventory {
    pub fn with_mount(mount: Entity) -> Self {
        Self {
            mount: Some(mount),
            ..default()
        }
    }

    pub fn equipped(&self) -> Option<EquippedTool> {
        self.equipped
    }

    /// equippedToolId: None | 0..N-1
    pub fn equipped_tool_id(&self) -> Option<u8> {
        self.equipped.map(|tool| tool.kind.id())
    }

    pub fn stowed(&self) -> &[EquippedTool] {
        &self.stowed
    }

    pub fn holds(&self, entity: Entity) -> bool {
        self.equipped.is_some_and(|tool| tool.entity == entity)
            || self.stowed.iter().any(|tool| tool.entity == entity)
    }

    /// Equip state transition (world pool → hands)
    pub fn begin_equip(&mut self, tool: EquippedTool) -> EquipOutcome {
        if self.equipped.is_some() {
            return EquipOutcome::Occupied;
        }
        if self.holds(tool.entity) {
            return EquipOutcome::AlreadyHeld;
        }

        self.equipped = Some(tool);
        EquipOutcome::Equipped
    }

    /// Drop state transition (hands → world pool)
    pub fn take_equipped(&mut self) -> Option<EquippedTool> {
        self.equipped.take()
    }

    pub fn plan_switch(&self, kind: ToolKind) -> SwitchPlan {
        if let Some(current) = self.equipped {
            if current.kind == kind {
                return SwitchPlan::Stow(current);
            }
        }

        match self.stowed.iter().find(|tool| tool.kind == kind) {
            Some(&equip) => SwitchPlan::Swap {
                stow: self.equipped,
                equip,
            },
            None => SwitchPlan::NotOwned,
        }
    }

    /// Применить план (state only)
    pub fn apply_switch(&mut self, plan: SwitchPlan) {
        match plan {
            SwitchPlan::Stow(tool) => {
                self.equipped = None;
                self.stowed.push(tool);
            }
            SwitchPlan::Swap { stow, equip } => {
                self.stowed.retain(|tool| tool.entity != equip.entity);
                if let Some(stow) = stow {
                    self.stowed.push(stow);
                }
                self.equipped = Some(equip);
            }
            SwitchPlan::NotOwned => {}
        }
    }

    /// Убрать despawned инструмент из inventory
    pub fn forget(&mut self, entity: Entity) {
        if self.equipped.is_some_and(|tool| tool.entity == entity) {
            self.equipped = None;
        }
        self.stowed.retain(|tool| tool.entity != entity);
    }
}
