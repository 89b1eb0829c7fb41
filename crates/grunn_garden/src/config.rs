//! Garden tuning (data-driven).
//!
//! Значения по умолчанию повторяют настройки сцены: hold offset камеры,
//! дистанции raycast, длительность swing, параметры mowing.
//!
//! `GardenConfig` вставляется через `init_resource`, поэтому host/тесты могут
//! вставить свой конфиг ДО `GardenPlugin`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::components::ToolKind;
use crate::transient::{InterruptPolicy, TransientAction};

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct GardenConfig {
    /// Pickup ray length (метры)
    pub interaction_distance: f32,
    /// Hint ray length ("Pick up ..." подсказка)
    pub hint_distance: f32,
    /// Use ray length (shears/shovel/watering aim)
    pub use_distance: f32,

    /// Hold pose относительно mount (камеры). Forward mount'а = -Z
    pub hold_offset: [f32; 3],
    pub hold_rotation_degrees: [f32; 3],

    /// Swing: каждая половина (туда / обратно) длится столько секунд
    pub swing_half_duration: f32,
    pub shears_swing_offset: [f32; 3],
    pub shovel_swing_offset: [f32; 3],

    /// Лезвия ножниц: угол раскрытия / смыкания (градусы вокруг local Z)
    pub blade_open_degrees: f32,
    pub blade_closed_degrees: f32,
    /// Щелчок: смыкание, пауза, раскрытие (секунды)
    pub blade_close_duration: f32,
    pub blade_pause_duration: f32,
    pub blade_recover_duration: f32,
    /// Повторный щелчок, пока лезвия ещё раскрываются
    pub blade_interrupt: InterruptPolicy,

    /// Watering can tilt (pitch) при поливе
    pub watering_tilt_degrees: f32,
    /// Slerp factor per second (rotation = slerp(rotation, target, dt * speed))
    pub watering_blend_speed: f32,

    /// Lifetime detached particle эффектов (листья при trim, земля при dig)
    pub particle_lifetime: f32,

    pub mow: MowConfig,
    pub layers: LayerConfig,
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            interaction_distance: 3.0,
            hint_distance: 3.5,
            use_distance: 3.0,
            hold_offset: [0.4, -0.4, -0.7],
            hold_rotation_degrees: [0.0, 0.0, 0.0],
            swing_half_duration: 0.1,
            shears_swing_offset: [0.0, 0.0, -0.1],
            shovel_swing_offset: [0.0, -0.2, -0.2],
            blade_open_degrees: 30.0,
            blade_closed_degrees: 0.0,
            blade_close_duration: 0.1,
            blade_pause_duration: 0.02,
            blade_recover_duration: 0.2,
            blade_interrupt: InterruptPolicy::RunToCompletion,
            watering_tilt_degrees: 40.0,
            watering_blend_speed: 5.0,
            particle_lifetime: 1.0,
            mow: MowConfig::default(),
            layers: LayerConfig::default(),
        }
    }
}

impl GardenConfig {
    /// Local hold pose относительно mount point
    pub fn hold_pose(&self) -> Transform {
        let [rx, ry, rz] = self.hold_rotation_degrees;
        Transform::from_translation(Vec3::from_array(self.hold_offset)).with_rotation(
            Quat::from_euler(EulerRot::XYZ, rx.to_radians(), ry.to_radians(), rz.to_radians()),
        )
    }

    /// Swing offset для one-shot tools. Watering can не свингует.
    pub fn swing_offset(&self, kind: ToolKind) -> Option<Vec3> {
        match kind {
            ToolKind::Shears => Some(Vec3::from_array(self.shears_swing_offset)),
            ToolKind::Shovel => Some(Vec3::from_array(self.shovel_swing_offset)),
            ToolKind::WateringCan => None,
        }
    }

    /// Щелчок лезвий: open → closed, пауза, closed → open
    pub fn blade_snap(&self) -> TransientAction {
        TransientAction::blade_snap(
            self.blade_open_degrees,
            self.blade_closed_degrees,
            [self.blade_close_duration, self.blade_pause_duration, self.blade_recover_duration],
        )
        .with_policy(self.blade_interrupt)
    }

    pub fn watering_tilt(&self) -> Quat {
        Quat::from_rotation_x(self.watering_tilt_degrees.to_radians())
    }
}

/// Mowing (overlap-sphere cut вокруг cut point ножниц)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MowConfig {
    pub radius: f32,
    pub fly_force: f32,
    pub torque_force: f32,
    /// Вертикальная добавка к направлению разлёта
    pub upward_bias: f32,
    pub debris_lifetime: f32,
}

impl Default for MowConfig {
    fn default() -> Self {
        Self {
            radius: 0.5,
            fly_force: 5.0,
            torque_force: 10.0,
            upward_bias: 0.5,
            debris_lifetime: 3.0,
        }
    }
}

/// Engine layer table + имена семантических слоёв.
///
/// Имена резолвятся ОДИН раз при build плагина (см. `LayerRegistry::resolve`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Engine layer name → index (0-31)
    pub engine_layers: BTreeMap<String, u8>,
    pub default_layer: String,
    pub tool_layer: String,
    pub trimmable_layer: String,
    pub ground_layer: String,
    pub ignore_ray_layer: String,
}

impl Default for LayerConfig {
    fn default() -> Self {
        let engine_layers = [
            ("Default", 0),
            ("Ignore Raycast", 2),
            ("Interactable", 6),
            ("Grass", 7),
            ("Ground", 8),
        ]
        .into_iter()
        .map(|(name, index)| (name.to_string(), index))
        .collect();

        Self {
            engine_layers,
            default_layer: "Default".into(),
            tool_layer: "Interactable".into(),
            trimmable_layer: "Grass".into(),
            ground_layer: "Ground".into(),
            ignore_ray_layer: "Ignore Raycast".into(),
        }
    }
}
