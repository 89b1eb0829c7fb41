//! Tool компоненты: какой это инструмент и кто его держит.

use bevy::prelude::*;

use super::{Appearance, EffectHandle};

/// Tool id (hotkeys 1-3)
///
/// - [1] Shears - one-shot cut (trim + mow)
/// - [2] WateringCan - continuous pour (без busy lock)
/// - [3] Shovel - one-shot dig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum ToolKind {
    Shears,
    WateringCan,
    Shovel,
}

impl ToolKind {
    pub const COUNT: u8 = 3;

    /// Convert kind → id (0-2)
    pub fn id(self) -> u8 {
        match self {
            ToolKind::Shears => 0,
            ToolKind::WateringCan => 1,
            ToolKind::Shovel => 2,
        }
    }

    /// Convert id → kind
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(ToolKind::Shears),
            1 => Some(ToolKind::WateringCan),
            2 => Some(ToolKind::Shovel),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ToolKind::Shears => "Shears",
            ToolKind::WateringCan => "Watering Can",
            ToolKind::Shovel => "Shovel",
        }
    }

    /// Continuous tools работают пока trigger held и не берут busy lock
    pub fn is_continuous(self) -> bool {
        matches!(self, ToolKind::WateringCan)
    }
}

/// Подбираемый инструмент (world pool ↔ held pool)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(Transform, Appearance)]
pub struct Tool {
    pub kind: ToolKind,
}

impl Tool {
    pub fn new(kind: ToolKind) -> Self {
        Self { kind }
    }
}

/// Лезвие ножниц (pivot под root инструмента). Вращается вокруг local Z:
/// левое на +angle, правое на -angle.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct ShearsBlade {
    /// +1.0 левое, -1.0 правое
    pub side: f32,
}

impl ShearsBlade {
    pub const LEFT: Self = Self { side: 1.0 };
    pub const RIGHT: Self = Self { side: -1.0 };

    pub fn rotation(&self, angle_degrees: f32) -> Quat {
        Quat::from_rotation_z(self.side * angle_degrees.to_radians())
    }
}

/// Particle burst в точке попадания (комья земли у лопаты)
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ImpactEffect(pub EffectHandle);

/// Held pool: инструмент в руках (или в "кармане", если stowed).
///
/// `pin_held_tools` - единственный writer `Transform` таких entity:
/// `world = mount * hold * action` (local `Transform` пересчитывается под parent,
/// если он есть). Остальные системы пишут только `action_*`.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HeldTool {
    pub holder: Entity,
    /// Hold pose относительно mount
    pub hold: Transform,
    /// Swing offset (transient action)
    pub action_offset: Vec3,
    /// Pour tilt (watering can)
    pub action_rotation: Quat,
    /// Stowed: в held pool, но не в руках (скрыт, не пинится)
    pub stowed: bool,
}

impl HeldTool {
    pub fn new(holder: Entity, hold: Transform) -> Self {
        Self {
            holder,
            hold,
            action_offset: Vec3::ZERO,
            action_rotation: Quat::IDENTITY,
            stowed: false,
        }
    }

    /// Local pose относительно mount (hold + action)
    pub fn local_pose(&self) -> Transform {
        Transform {
            translation: self.hold.translation + self.action_offset,
            rotation: self.hold.rotation * self.action_rotation,
            scale: self.hold.scale,
        }
    }

    pub fn reset_action(&mut self) {
        self.action_offset = Vec3::ZERO;
        self.action_rotation = Quat::IDENTITY;
    }
}
