//! Equipment system implementations
//!
//! # Systems
//!
//! **Tool lifecycle:**
//! - `process_pickup` - ray от mount → interactable root → equip intent
//! - `process_equip_tool` - world pool → hands (physics off, IgnoreRay)
//! - `process_drop_tool` - hands → world pool (physics on, Interactable)
//! - `process_switch_tool` - hotkeys 1-3 (stow / swap)
//! - `forget_despawned_tools` - despawned инструмент уходит из inventory
//!
//! **Pose:**
//! - `pin_held_tools` - ЕДИНСТВЕННЫЙ writer `Transform` held инструментов
//! - `update_aim_hint` - "Pick up ..." подсказка под прицелом

use bevy::prelude::*;
use bevy_rapier3d::prelude::{ColliderDisabled, GravityScale, RigidBody, Velocity};

use crate::{
    components::*,
    config::GardenConfig,
    effects::{CueKind, ToolCue},
    equipment::events::*,
    layers::{require_registry, LayerRegistry, SemanticLayer},
    log, log_error,
    resolver::{aim_ray, resolve, resolve_interactable_root, world_pose, NodePose, SceneColliders},
};

/// Watering can ушёл из рук (drop / stow / despawn) → loop cue стоп
fn stop_pouring(user: &mut ToolUser, tool: Entity, cues: &mut EventWriter<ToolCue>) {
    if user.stop_pouring(tool) {
        cues.write(ToolCue {
            tool,
            kind: ToolKind::WateringCan,
            cue: CueKind::LoopStop,
        });
    }
}

/// Root инструмента + все его под-ноды (compound модели)
pub(crate) fn tool_nodes(root: Entity, children: &Query<&Children>) -> Vec<Entity> {
    let mut nodes = vec![root];
    let mut index = 0;
    while index < nodes.len() {
        if let Ok(node_children) = children.get(nodes[index]) {
            nodes.extend_from_slice(node_children);
        }
        index += 1;
    }
    nodes
}

// ============================================================================
// Pickup
// ============================================================================

/// Process pickup intents (Interact с пустыми руками)
pub fn process_pickup(
    config: Res<GardenConfig>,
    registry: Option<Res<LayerRegistry>>,
    mut intents: EventReader<PickupIntent>,
    actors: Query<&ToolInventory>,
    scene: SceneColliders,
    tools: Query<(), With<Tool>>,
    mut equip_intents: EventWriter<EquipToolIntent>,
) {
    for intent in intents.read() {
        let Ok(inventory) = actors.get(intent.actor) else {
            log_error(&format!("Entity {:?} missing ToolInventory", intent.actor));
            continue;
        };

        if inventory.equipped().is_some() {
            log(&format!("⏸️ Pickup ignored: {:?} already holds a tool", intent.actor));
            continue;
        }

        // Нет mount (камеры) → нечем целиться
        let Some(mount_pose) = inventory.mount.and_then(|mount| scene.world_pose(mount)) else {
            continue;
        };

        let Some(registry) = require_registry(registry.as_deref(), &config.layers, "Pickup") else {
            continue;
        };

        let interactable = registry.mask(&[SemanticLayer::Tool]);
        let (origin, direction) = aim_ray(&mount_pose);
        let Some(hit) = resolve(&scene, origin, direction, config.interaction_distance, interactable) else {
            continue;
        };

        let root = resolve_interactable_root(&scene, hit.entity, interactable);
        if !tools.contains(root) {
            log(&format!("⏸️ Pickup: {:?} is interactable but not a tool", root));
            continue;
        }

        equip_intents.write(EquipToolIntent {
            actor: intent.actor,
            tool: root,
        });
    }
}

// ============================================================================
// Equip
// ============================================================================

/// Process equip intents
pub fn process_equip_tool(
    mut commands: Commands,
    config: Res<GardenConfig>,
    registry: Option<Res<LayerRegistry>>,
    mut intents: EventReader<EquipToolIntent>,
    mut actors: Query<&mut ToolInventory>,
    tools: Query<(&Tool, Has<HeldTool>)>,
    children: Query<&Children>,
    mut cues: EventWriter<ToolCue>,
    mut equipped_events: EventWriter<ToolEquipped>,
) {
    for intent in intents.read() {
        // Held pool общий: инструмент уже в чьём-то inventory (в том числе взятый
        // в этом же frame, до применения commands) повторно не экипируется
        let held_by_anyone = actors.iter().any(|inventory| inventory.holds(intent.tool));

        let Ok(mut inventory) = actors.get_mut(intent.actor) else {
            log_error(&format!("Entity {:?} missing ToolInventory", intent.actor));
            continue;
        };

        let Ok((tool, has_held)) = tools.get(intent.tool) else {
            log_error(&format!("Entity {:?} is not a Tool", intent.tool));
            continue;
        };

        let Some(registry) = require_registry(registry.as_deref(), &config.layers, "Equip") else {
            continue;
        };

        // 1. State transition (no-op если руки заняты или инструмент у кого-то в руках)
        let outcome = if has_held || held_by_anyone {
            EquipOutcome::AlreadyHeld
        } else {
            inventory.begin_equip(EquippedTool {
                entity: intent.tool,
                kind: tool.kind,
            })
        };
        if outcome != EquipOutcome::Equipped {
            log(&format!(
                "⏸️ Equip {} ignored for {:?}: {:?}",
                tool.kind.display_name(),
                intent.actor,
                outcome
            ));
            continue;
        }

        // 2. Physics off (kinematic, без гравитации и коллизий)
        commands.entity(intent.tool).insert((
            RigidBody::KinematicPositionBased,
            GravityScale(0.0),
            Velocity::zero(),
            HeldTool::new(intent.actor, config.hold_pose()),
        ));

        // 3. Held tool не перекрывает aim ray
        let ignore_ray = registry.node_layer(SemanticLayer::IgnoreRay);
        for node in tool_nodes(intent.tool, &children) {
            commands.entity(node).insert((ColliderDisabled, ignore_ray));
        }

        cues.write(ToolCue {
            tool: intent.tool,
            kind: tool.kind,
            cue: CueKind::PickupSound,
        });
        equipped_events.write(ToolEquipped {
            actor: intent.actor,
            tool: intent.tool,
            kind: tool.kind,
        });

        log(&format!("✅ Equipped {} (actor: {:?})", tool.kind.display_name(), intent.actor));
    }
}

// ============================================================================
// Drop
// ============================================================================

/// Process drop intents
pub fn process_drop_tool(
    mut commands: Commands,
    config: Res<GardenConfig>,
    registry: Option<Res<LayerRegistry>>,
    mut intents: EventReader<DropToolIntent>,
    mut actors: Query<(&mut ToolInventory, &mut ToolUser)>,
    tools: Query<(), With<Tool>>,
    children: Query<&Children>,
    mut cues: EventWriter<ToolCue>,
    mut dropped_events: EventWriter<ToolDropped>,
) {
    for intent in intents.read() {
        let Ok((mut inventory, mut user)) = actors.get_mut(intent.actor) else {
            log_error(&format!("Entity {:?} missing ToolInventory", intent.actor));
            continue;
        };

        if inventory.equipped().is_none() {
            log(&format!("⏸️ Drop ignored: {:?} holds nothing", intent.actor));
            continue;
        }

        let Some(registry) = require_registry(registry.as_deref(), &config.layers, "Drop") else {
            continue;
        };

        let Some(dropped) = inventory.take_equipped() else {
            continue;
        };
        stop_pouring(&mut user, dropped.entity, &mut cues);

        // Despawned инструмент: inventory уже очищен, физику трогать нечего
        if !tools.contains(dropped.entity) {
            continue;
        }

        // 1. Physics on; pose остаётся последней pinned
        commands
            .entity(dropped.entity)
            .insert((RigidBody::Dynamic, GravityScale(1.0)))
            .remove::<HeldTool>();

        // 2. Снова подбираемый
        let interactable = registry.node_layer(SemanticLayer::Tool);
        for node in tool_nodes(dropped.entity, &children) {
            commands.entity(node).insert(interactable).remove::<ColliderDisabled>();
        }

        dropped_events.write(ToolDropped {
            actor: intent.actor,
            tool: dropped.entity,
            kind: dropped.kind,
        });

        log(&format!("🗑️ Dropped {} (actor: {:?})", dropped.kind.display_name(), intent.actor));
    }
}

// ============================================================================
// Switch
// ============================================================================

/// Process hotkey switch intents
///
/// # Flow
/// 1. Busy → отклоняем (swing ещё идёт)
/// 2. `plan_switch` → stow текущего / swap со stowed
/// 3. Stowed инструмент скрыт и не пинится; достанный - visible, action сброшен
/// 4. Убранная watering can перестаёт лить (LoopStop сразу, без ожидания trigger)
pub fn process_switch_tool(
    mut intents: EventReader<SwitchToolIntent>,
    mut actors: Query<(&mut ToolInventory, &mut ToolUser)>,
    mut held_tools: Query<(&mut HeldTool, &mut Appearance)>,
    mut cues: EventWriter<ToolCue>,
) {
    for intent in intents.read() {
        let Ok((mut inventory, mut user)) = actors.get_mut(intent.actor) else {
            log_error(&format!("Entity {:?} missing ToolInventory", intent.actor));
            continue;
        };

        if user.is_busy() {
            log(&format!("⏸️ Switch to {} refused: {:?} is busy", intent.kind.display_name(), intent.actor));
            continue;
        }

        let plan = inventory.plan_switch(intent.kind);
        let (stow, equip) = match plan {
            SwitchPlan::Stow(tool) => (Some(tool), None),
            SwitchPlan::Swap { stow, equip } => (stow, Some(equip)),
            SwitchPlan::NotOwned => {
                log(&format!("⏸️ Switch: {} was never picked up", intent.kind.display_name()));
                continue;
            }
        };

        if let Some(tool) = stow {
            stop_pouring(&mut user, tool.entity, &mut cues);
            if let Ok((mut held, mut appearance)) = held_tools.get_mut(tool.entity) {
                held.stowed = true;
                held.reset_action();
                appearance.visible = false;
            }
        }

        if let Some(tool) = equip {
            if let Ok((mut held, mut appearance)) = held_tools.get_mut(tool.entity) {
                held.stowed = false;
                held.reset_action();
                appearance.visible = true;
            }
        }

        inventory.apply_switch(plan);

        match inventory.equipped() {
            Some(tool) => log(&format!("🔄 Switched to {}", tool.kind.display_name())),
            None => log(&format!("🔄 Stowed {}", intent.kind.display_name())),
        }
    }
}

/// Despawned инструменты уходят из всех inventory
///
/// Swing жил на despawned entity и `TransientActionFinished` уже не придёт:
/// busy lock, взятый этим инструментом, снимается здесь.
pub fn forget_despawned_tools(
    mut removed: RemovedComponents<Tool>,
    mut actors: Query<(Entity, &mut ToolInventory, &mut ToolUser)>,
    mut cues: EventWriter<ToolCue>,
) {
    for tool in removed.read() {
        for (actor, mut inventory, mut user) in actors.iter_mut() {
            if inventory.holds(tool) {
                inventory.forget(tool);
                log(&format!("🧹 Tool {:?} despawned, removed from inventory", tool));
            }

            if user.release_if_using(tool) {
                log(&format!("🔓 {:?} ready (tool {:?} despawned mid-use)", actor, tool));
            }
            stop_pouring(&mut user, tool, &mut cues);
        }
    }
}

// ============================================================================
// Pose
// ============================================================================

/// Pin held tools к mount: `world = mount * hold * action`
///
/// Stowed инструменты не пинятся. Нет mount → инструмент остаётся где был.
/// Mount может сидеть в иерархии (камера под player body): берётся его world pose.
pub fn pin_held_tools(
    poses: Query<NodePose, Without<HeldTool>>,
    inventories: Query<&ToolInventory>,
    mut held_tools: Query<(&HeldTool, &mut Transform, Option<&ChildOf>)>,
) {
    for (held, mut transform, parent) in held_tools.iter_mut() {
        if held.stowed {
            continue;
        }

        let Some(mount_pose) = inventories
            .get(held.holder)
            .ok()
            .and_then(|inventory| inventory.mount)
            .and_then(|mount| world_pose(&poses, mount))
        else {
            continue;
        };

        let target = mount_pose * GlobalTransform::from(held.local_pose());
        *transform = match parent.and_then(|parent| world_pose(&poses, parent.parent())) {
            Some(parent_pose) => target.reparented_to(&parent_pose),
            None => target.compute_transform(),
        };
    }
}

/// "Pick up <tool>" подсказка (hint distance, interactable mask)
pub fn update_aim_hint(
    config: Res<GardenConfig>,
    registry: Option<Res<LayerRegistry>>,
    scene: SceneColliders,
    tools: Query<&Tool>,
    mut actors: Query<(&ToolInventory, &mut AimHint), With<Player>>,
) {
    // Config error уже залогирован при build плагина
    let Some(registry) = registry else {
        return;
    };
    let interactable = registry.mask(&[SemanticLayer::Tool]);

    for (inventory, mut hint) in actors.iter_mut() {
        let tool = inventory
            .mount
            .and_then(|mount| scene.world_pose(mount))
            .and_then(|mount_pose| {
                let (origin, direction) = aim_ray(&mount_pose);
                resolve(&scene, origin, direction, config.hint_distance, interactable)
            })
            .map(|hit| resolve_interactable_root(&scene, hit.entity, interactable))
            .and_then(|root| tools.get(root).ok())
            .map(|tool| tool.kind);

        if hint.tool != tool {
            hint.tool = tool;
        }
    }
}
