//! Use dispatcher state (busy lock)

use bevy::prelude::*;

use super::ToolKind;

/// Dispatcher states.
///
/// - `Idle` → `Busy`: trigger-down + one-shot action стартовал
/// - `Busy` → `Idle`: `TransientActionFinished` от scheduler'а
///
/// Trigger-down во время `Busy` отбрасывается (не ставится в очередь).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum UseState {
    #[default]
    Idle,
    Busy,
}

#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct ToolUser {
    pub state: UseState,
    /// Инструмент, которым выполняется текущий (или последний) use
    pub current_tool: Option<ToolKind>,
    /// Entity инструмента, держащего busy lock
    pub active_tool: Option<Entity>,
    /// Watering can, который сейчас льёт (loop cue запущен)
    pub pouring: Option<Entity>,
}

impl ToolUser {
    pub fn is_busy(&self) -> bool {
        self.state == UseState::Busy
    }

    /// Idle → Busy. Возвращает false, если lock уже занят.
    pub fn try_acquire(&mut self, tool: Entity, kind: ToolKind) -> bool {
        if self.is_busy() {
            return false;
        }
        self.state = UseState::Busy;
        self.current_tool = Some(kind);
        self.active_tool = Some(tool);
        true
    }

    /// Busy → Idle
    pub fn release(&mut self) {
        self.state = UseState::Idle;
        self.active_tool = None;
    }

    /// Снять lock, если его держит `tool` (инструмент исчез посреди swing)
    pub fn release_if_using(&mut self, tool: Entity) -> bool {
        if !self.is_busy() || self.active_tool != Some(tool) {
            return false;
        }
        self.release();
        true
    }

    /// Закончить полив `tool`. true, если он действительно лил.
    pub fn stop_pouring(&mut self, tool: Entity) -> bool {
        if self.pouring != Some(tool) {
            return false;
        }
        self.pouring = None;
        true
    }
}
