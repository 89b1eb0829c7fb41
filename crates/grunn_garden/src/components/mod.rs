//! ECS Components для garden entity
//!
//! Организация по доменам:
//! - trimmable: трава и её trim state (Trimmable, TrimPolicy)
//! - tool: инструменты (Tool, ToolKind, HeldTool)
//! - inventory: что у актора в руках (ToolInventory)
//! - tool_user: busy lock dispatcher'а (ToolUser)
//! - appearance: renderer binding (Appearance, EffectHandle)
//! - shape: формы для raycast/overlap (QueryShape)
//! - player: player control marker + aim hint

pub mod appearance;
pub mod inventory;
pub mod player;
pub mod shape;
pub mod tool;
pub mod tool_user;
pub mod trimmable;

// Re-exports для удобного импорта
pub use appearance::*;
pub use inventory::*;
pub use player::*;
pub use shape::*;
pub use tool::*;
pub use tool_user::*;
pub use trimmable::*;
