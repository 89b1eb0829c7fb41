//! ECS-backed physics queries.
//!
//! Считает raycast/overlap по `QueryShape` в world space: local `Transform`
//! компонуется по цепочке `ChildOf` (`world_pose`). Ноды с `ColliderDisabled`
//! (held tools) в запросах не участвуют.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::ColliderDisabled;

use super::{world_pose, NodePose, PhysicsQuery, RayHit, SceneGraph};
use crate::components::QueryShape;
use crate::layers::{LayerMask, NodeLayer};

#[derive(SystemParam)]
pub struct SceneColliders<'w, 's> {
    shapes: Query<'w, 's, (Entity, &'static QueryShape, &'static NodeLayer), Without<ColliderDisabled>>,
    poses: Query<'w, 's, NodePose>,
    nodes: Query<'w, 's, (Option<&'static ChildOf>, Option<&'static NodeLayer>)>,
}

impl SceneColliders<'_, '_> {
    /// World pose любой ноды сцены
    pub fn world_pose(&self, entity: Entity) -> Option<GlobalTransform> {
        world_pose(&self.poses, entity)
    }

    /// Ноды с формой из `mask` + их world transform
    fn shapes_in(&self, mask: LayerMask) -> impl Iterator<Item = (Entity, Transform, &QueryShape)> + '_ {
        self.shapes
            .iter()
            .filter(move |(_, _, layer)| mask.contains(**layer))
            .filter_map(move |(entity, shape, _)| {
                let world = self.world_pose(entity)?;
                Some((entity, world.compute_transform(), shape))
            })
    }
}

impl PhysicsQuery for SceneColliders<'_, '_> {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        self.shapes_in(mask)
            .filter_map(|(entity, transform, shape)| {
                let distance = ray_shape_distance(origin, direction, &transform, shape)?;
                (distance <= max_distance).then(|| RayHit {
                    entity,
                    point: origin + direction * distance,
                    distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<Entity> {
        self.shapes_in(mask)
            .filter(|(_, transform, shape)| sphere_overlaps_shape(center, radius, transform, shape))
            .map(|(entity, ..)| entity)
            .collect()
    }
}

impl SceneGraph for SceneColliders<'_, '_> {
    fn parent(&self, entity: Entity) -> Option<Entity> {
        let (child_of, _) = self.nodes.get(entity).ok()?;
        child_of.map(|child_of| child_of.parent())
    }

    fn layer(&self, entity: Entity) -> Option<NodeLayer> {
        let (_, layer) = self.nodes.get(entity).ok()?;
        layer.copied()
    }
}

// ============================================================================
// Shape math
// ============================================================================

/// World-space AABB для box shape (rotation игнорируется)
fn box_bounds(transform: &Transform, half_extents: Vec3, offset: Vec3) -> (Vec3, Vec3) {
    let scale = transform.scale.abs();
    let center = transform.translation + offset * transform.scale;
    let half = half_extents * scale;
    (center - half, center + half)
}

fn sphere_radius(transform: &Transform, radius: f32) -> f32 {
    radius * transform.scale.abs().max_element()
}

pub(crate) fn ray_shape_distance(origin: Vec3, direction: Vec3, transform: &Transform, shape: &QueryShape) -> Option<f32> {
    match *shape {
        QueryShape::Sphere { radius } => {
            ray_sphere_hit_t(origin, direction, transform.translation, sphere_radius(transform, radius))
        }
        QueryShape::Box { half_extents, offset } => {
            let (min, max) = box_bounds(transform, half_extents, offset);
            ray_aabb_hit_t(origin, direction, min, max)
        }
    }
}

fn sphere_overlaps_shape(center: Vec3, radius: f32, transform: &Transform, shape: &QueryShape) -> bool {
    match *shape {
        QueryShape::Sphere { radius: shape_radius } => {
            let reach = radius + sphere_radius(transform, shape_radius);
            center.distance_squared(transform.translation) <= reach * reach
        }
        QueryShape::Box { half_extents, offset } => {
            let (min, max) = box_bounds(transform, half_extents, offset);
            let closest = center.clamp(min, max);
            center.distance_squared(closest) <= radius * radius
        }
    }
}

/// Ray–sphere intersection (direction normalized), ближайший t >= 0
fn ray_sphere_hit_t(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let to_origin = origin - center;
    let b = to_origin.dot(direction);
    let c = to_origin.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let near = -b - sqrt_d;
    let far = -b + sqrt_d;
    if far < 0.0 {
        return None;
    }
    Some(if near >= 0.0 { near } else { far })
}

// Slab-method ray–AABB intersection, returns Some(t) or None
fn ray_aabb_hit_t(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = Vec3::new(
        if direction.x != 0.0 { 1.0 / direction.x } else { f32::INFINITY },
        if direction.y != 0.0 { 1.0 / direction.y } else { f32::INFINITY },
        if direction.z != 0.0 { 1.0 / direction.z } else { f32::INFINITY },
    );

    let t1 = (min - origin) * inv;
    let t2 = (max - origin) * inv;
    let t_near = t1.min(t2);
    let t_far = t1.max(t2);

    // 0 * INFINITY = NaN когда origin лежит на грани параллельной оси; такие оси не ограничивают
    let tmin = [t_near.x, t_near.y, t_near.z]
        .into_iter()
        .filter(|t| !t.is_nan())
        .fold(f32::NEG_INFINITY, f32::max);
    let tmax = [t_far.x, t_far.y, t_far.z]
        .into_iter()
        .filter(|t| !t.is_nan())
        .fold(f32::INFINITY, f32::min);

    if tmin > tmax || tmax < 0.0 {
        return None;
    }
    Some(if tmin >= 0.0 { tmin } else { tmax })
}
