//! Raycast Target Resolver
//!
//! Чистые запросы (без мутаций): луч → ближайший hit → классификация.
//!
//! # Архитектура
//! - `PhysicsQuery` - контракт physics query service (raycast + overlap sphere)
//! - `SceneGraph` - parent chain + layer membership нод
//! - `SceneColliders` - дефолтная ECS реализация обоих trait'ов
//!
//! Host engine с настоящим physics backend может реализовать `PhysicsQuery`
//! сам; функции резолвера generic и от ECS не зависят.

use bevy::ecs::query::QueryFilter;
use bevy::prelude::*;

use crate::layers::{LayerMask, LayerRegistry, NodeLayer, SemanticLayer};

pub mod scene;


pub use scene::SceneColliders;

/// Результат raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub point: Vec3,
    pub distance: f32,
}

/// Physics query service (external collaborator contract)
pub trait PhysicsQuery {
    /// Ближайший hit в пределах `max_distance` среди слоёв `mask`
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask) -> Option<RayHit>;

    /// Все ноды из `mask`, пересекающие сферу
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<Entity>;
}

/// Spatial node hierarchy (parent chain + layer membership)
pub trait SceneGraph {
    fn parent(&self, entity: Entity) -> Option<Entity>;
    fn layer(&self, entity: Entity) -> Option<NodeLayer>;
}

/// Классифицированная цель под прицелом
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimTarget {
    pub hit: RayHit,
    pub class: TargetClass,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetClass {
    /// Trimmable на hit entity или на одном из предков
    Trimmable(Entity),
    /// Interactable root, на котором висит `Tool`
    Tool(Entity),
    Ground,
    Other,
}

/// Local pose ноды + её parent
pub type NodePose = (&'static Transform, Option<&'static ChildOf>);

/// World pose ноды: local `Transform` по цепочке `ChildOf` до root.
///
/// Считается на месте, без ожидания propagation в PostUpdate: видит
/// изменения, сделанные раньше в этом же frame. Parent без `Transform`
/// считается root'ом.
pub fn world_pose<F: QueryFilter>(poses: &Query<NodePose, F>, entity: Entity) -> Option<GlobalTransform> {
    let (transform, mut parent) = poses.get(entity).ok()?;
    let mut world = GlobalTransform::from(*transform);

    while let Some(child_of) = parent {
        let Ok((parent_transform, grandparent)) = poses.get(child_of.parent()) else {
            break;
        };
        world = GlobalTransform::from(*parent_transform) * world;
        parent = grandparent;
    }

    Some(world)
}

/// Луч прицела от mount point (камеры): world translation + forward (-Z)
pub fn aim_ray(mount: &GlobalTransform) -> (Vec3, Vec3) {
    (mount.translation(), mount.forward().as_vec3())
}

/// Resolve(origin, direction, maxDistance, layerFilter) → nearest hit | None
pub fn resolve<P: PhysicsQuery + ?Sized>(
    physics: &P,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
    mask: LayerMask,
) -> Option<RayHit> {
    if max_distance <= 0.0 {
        return None;
    }
    let direction = direction.try_normalize()?;
    physics.raycast(origin, direction, max_distance, mask)
}

/// Поднимается по parent chain, пока слой родителя входит в `mask`.
///
/// Compound объекты: луч попал в под-часть, подбирать нужно весь объект.
/// Останавливается на первом родителе вне маски или на корне сцены.
pub fn resolve_interactable_root<G: SceneGraph + ?Sized>(graph: &G, hit: Entity, mask: LayerMask) -> Entity {
    let mut root = hit;
    while let Some(parent) = graph.parent(root) {
        match graph.layer(parent) {
            Some(layer) if mask.contains(layer) => root = parent,
            _ => break,
        }
    }
    root
}

/// Первый entity в цепочке (сам `start`, затем родители), для которого `predicate` true
pub fn find_in_ancestors<G: SceneGraph + ?Sized>(
    graph: &G,
    start: Entity,
    predicate: impl Fn(Entity) -> bool,
) -> Option<Entity> {
    let mut current = Some(start);
    while let Some(entity) = current {
        if predicate(entity) {
            return Some(entity);
        }
        current = graph.parent(entity);
    }
    None
}

/// Классифицирует hit: trimmable → tool → ground → other
pub fn classify<G: SceneGraph + ?Sized>(
    graph: &G,
    registry: &LayerRegistry,
    hit: RayHit,
    is_tool: impl Fn(Entity) -> bool,
    is_trimmable: impl Fn(Entity) -> bool,
) -> AimTarget {
    if let Some(trimmable) = find_in_ancestors(graph, hit.entity, &is_trimmable) {
        return AimTarget {
            hit,
            class: TargetClass::Trimmable(trimmable),
        };
    }

    let tool_mask = registry.mask(&[SemanticLayer::Tool]);
    let root = resolve_interactable_root(graph, hit.entity, tool_mask);
    if is_tool(root) {
        return AimTarget {
            hit,
            class: TargetClass::Tool(root),
        };
    }

    let class = match graph.layer(hit.entity).and_then(|layer| registry.semantic_of(layer)) {
        Some(SemanticLayer::Ground) => TargetClass::Ground,
        _ => TargetClass::Other,
    };
    AimTarget { hit, class }
}
