//! Renderer binding: видимость + tint.
//!
//! Host engine синхронизирует визуал по `Changed<Appearance>`. Меши/материалы
//! в ECS не живут - только цвет и флаг видимости.

use bevy::prelude::*;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub visible: bool,
    pub tint: Color,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            visible: true,
            tint: Color::WHITE,
        }
    }
}

impl Appearance {
    pub fn tinted(tint: Color) -> Self {
        Self { visible: true, tint }
    }
}

/// Handle на particle prefab в host engine (например "res://fx/leaves.tscn")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub struct EffectHandle(pub String);

impl From<&str> for EffectHandle {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for EffectHandle {
    fn from(path: String) -> Self {
        Self(path)
    }
}
