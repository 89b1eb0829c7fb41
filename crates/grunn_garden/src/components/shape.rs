//! Query shape: форма ноды для raycast / overlap запросов.
//!
//! Размеры в local space, масштабируются `Transform.scale` (подстриженная трава
//! становится ниже → её box тоже).

use bevy::prelude::*;

#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub enum QueryShape {
    Sphere { radius: f32 },
    /// Axis-aligned box, центр = translation + offset * scale
    Box { half_extents: Vec3, offset: Vec3 },
}

impl QueryShape {
    pub fn sphere(radius: f32) -> Self {
        QueryShape::Sphere { radius }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        QueryShape::Box {
            half_extents,
            offset: Vec3::ZERO,
        }
    }

    /// Box, стоящий на translation (низ на pivot): при scale.y < 1 укорачивается сверху
    pub fn grounded_cuboid(half_extents: Vec3) -> Self {
        QueryShape::Box {
            half_extents,
            offset: Vec3::new(0.0, half_extents.y, 0.0),
        }
    }
}
