//! Grass setup: превращает imported grass hierarchy в trimmable траву.
//!
//! `SetupGrass { root }` обходит всех `GrassBlade` потомков root (и сам root):
//! grass layer, box shape (если нет), stepped `Trimmable` (если нет).
//! Grass layer не сконфигурирован → configuration error, ничего не меняется.

use bevy::prelude::*;

use crate::components::{QueryShape, Trimmable};
use crate::config::GardenConfig;
use crate::layers::{require_registry, LayerRegistry, SemanticLayer};
use crate::logger::log_info;

/// Marker: нода с grass mesh (host ставит при импорте)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct GrassBlade;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupGrass {
    pub root: Entity,
}

/// Default box для blade без своей формы (1×1×1 cube, низ на pivot)
const DEFAULT_BLADE_HALF_EXTENTS: Vec3 = Vec3::splat(0.5);
const DEFAULT_MIN_LEVEL: f32 = 0.1;
const DEFAULT_TRIM_STEP: f32 = 0.1;

fn is_in_subtree(entity: Entity, root: Entity, parents: &Query<&ChildOf>) -> bool {
    let mut current = entity;
    loop {
        if current == root {
            return true;
        }
        let Ok(child_of) = parents.get(current) else {
            return false;
        };
        current = child_of.parent();
    }
}

/// Process grass setup requests
pub fn process_grass_setup(
    mut commands: Commands,
    config: Res<GardenConfig>,
    registry: Option<Res<LayerRegistry>>,
    mut events: EventReader<SetupGrass>,
    blades: Query<(Entity, &Transform, Has<QueryShape>, Has<Trimmable>), With<GrassBlade>>,
    parents: Query<&ChildOf>,
) {
    for event in events.read() {
        let Some(registry) = require_registry(registry.as_deref(), &config.layers, "Grass setup") else {
            continue;
        };
        let grass_layer = registry.node_layer(SemanticLayer::Trimmable);

        let mut count = 0;
        for (entity, transform, has_shape, has_trimmable) in blades.iter() {
            if !is_in_subtree(entity, event.root, &parents) {
                continue;
            }

            let mut blade = commands.entity(entity);
            blade.insert(grass_layer);
            if !has_shape {
                blade.insert(QueryShape::grounded_cuboid(DEFAULT_BLADE_HALF_EXTENTS));
            }
            if !has_trimmable {
                blade.insert(Trimmable::stepped(transform.scale.y, DEFAULT_MIN_LEVEL, DEFAULT_TRIM_STEP));
            }
            count += 1;
        }

        log_info(&format!("🌱 Grass setup under {:?}: {} blades configured", event.root, count));
    }
}
