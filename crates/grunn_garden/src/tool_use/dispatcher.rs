//! Use dispatcher: trigger → действие equipped инструмента.
//!
//! # State machine (per actor, `ToolUser`)
//! - `Idle` + trigger-down + one-shot tool → `Busy`, swing стартует
//! - `Busy` + trigger-down → отбрасывается (не в очередь)
//! - `Busy` → `Idle`: `TransientActionFinished` (см. `release_busy_locks`)
//!
//! Watering can (continuous) busy lock не берёт: пока trigger held -
//! наклон + loop cue + `Watered` каждый frame.
//!
//! Ножницы дополнительно щёлкают лезвиями (`ShearsBlade` под root): это
//! отдельный transient на каждом лезвии, busy lock он не держит.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::components::*;
use crate::config::GardenConfig;
use crate::effects::{spawn_detached_effect, CueKind, ToolCue};
use crate::equipment::systems::tool_nodes;
use crate::layers::{require_registry, LayerRegistry};
use crate::logger::{log, log_error};
use crate::resolver::{aim_ray, classify, resolve, AimTarget, SceneColliders, TargetClass};
use crate::tool_use::{Dug, ToolTrigger, Watered};
use crate::transient::{start_transient, InterruptPolicy, TransientAction, TransientActionFinished};
use crate::trim::{MowIntent, Mower, TrimIntent};

/// Aim query: луч → hit → классификация
#[derive(SystemParam)]
pub struct UseTargets<'w, 's> {
    scene: SceneColliders<'w, 's>,
    tools: Query<'w, 's, (), With<Tool>>,
    trimmables: Query<'w, 's, (), With<Trimmable>>,
}

impl UseTargets<'_, '_> {
    pub fn world_pose(&self, entity: Entity) -> Option<GlobalTransform> {
        self.scene.world_pose(entity)
    }

    pub fn aim(&self, registry: &LayerRegistry, mount: &GlobalTransform, max_distance: f32) -> Option<AimTarget> {
        let (origin, direction) = aim_ray(mount);
        let hit = resolve(&self.scene, origin, direction, max_distance, registry.aim_mask())?;
        Some(classify(
            &self.scene,
            registry,
            hit,
            |entity| self.tools.contains(entity),
            |entity| self.trimmables.contains(entity),
        ))
    }
}

/// Лезвия ножниц (ноды под held root, сами не `HeldTool`)
#[derive(SystemParam)]
pub struct BladeNodes<'w, 's> {
    children: Query<'w, 's, &'static Children>,
    blades: Query<'w, 's, Option<&'static mut TransientAction>, (With<ShearsBlade>, Without<HeldTool>)>,
}

impl BladeNodes<'_, '_> {
    /// Щелчок всех лезвий `tool` (policy уже идущего решает, перезапускать ли)
    fn snap(&mut self, commands: &mut Commands, tool: Entity, action: TransientAction) {
        for node in tool_nodes(tool, &self.children) {
            let Ok(mut running) = self.blades.get_mut(node) else {
                continue;
            };
            if !start_transient(commands, node, running.as_deref_mut(), action) {
                log(&format!("✂️ Blade {:?} still reopening", node));
            }
        }
    }
}

/// Output events dispatcher'а
#[derive(SystemParam)]
pub struct UseEvents<'w> {
    cues: EventWriter<'w, ToolCue>,
    trims: EventWriter<'w, TrimIntent>,
    mows: EventWriter<'w, MowIntent>,
    watered: EventWriter<'w, Watered>,
    dug: EventWriter<'w, Dug>,
}

/// Система: route trigger input по `ToolKind` equipped инструмента
pub fn dispatch_tool_use(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GardenConfig>,
    registry: Option<Res<LayerRegistry>>,
    mut triggers: EventReader<ToolTrigger>,
    mut actors: Query<(&ToolInventory, &mut ToolUser)>,
    mut held_tools: Query<(
        &mut HeldTool,
        Option<&Mower>,
        Option<&ImpactEffect>,
        Option<&mut TransientAction>,
    )>,
    mut blades: BladeNodes,
    targets: UseTargets,
    mut events: UseEvents,
) {
    for trigger in triggers.read() {
        let Ok((inventory, mut user)) = actors.get_mut(trigger.actor) else {
            log_error(&format!("Entity {:?} missing ToolInventory/ToolUser", trigger.actor));
            continue;
        };

        // Нет инструмента → input игнорируется
        // (LoopStop убранной/выброшенной лейки шлют drop/switch)
        let Some(equipped) = inventory.equipped() else {
            continue;
        };

        let Ok((mut held, mower, impact, mut running)) = held_tools.get_mut(equipped.entity) else {
            continue;
        };

        let mount_pose = inventory.mount.and_then(|mount| targets.world_pose(mount));

        // ====================================================================
        // Continuous: watering can
        // ====================================================================
        if equipped.kind.is_continuous() {
            let blend = (time.delta_secs() * config.watering_blend_speed).clamp(0.0, 1.0);

            if !trigger.held {
                held.action_rotation = held.action_rotation.slerp(Quat::IDENTITY, blend);
                if user.pouring.take().is_some() {
                    events.cues.write(ToolCue {
                        tool: equipped.entity,
                        kind: equipped.kind,
                        cue: CueKind::LoopStop,
                    });
                    log(&format!("💧 Watering stopped (actor: {:?})", trigger.actor));
                }
                continue;
            }

            held.action_rotation = held.action_rotation.slerp(config.watering_tilt(), blend);
            if user.pouring.is_none() {
                user.pouring = Some(equipped.entity);
                events.cues.write(ToolCue {
                    tool: equipped.entity,
                    kind: equipped.kind,
                    cue: CueKind::LoopStart,
                });
                log(&format!("💧 Watering started (actor: {:?})", trigger.actor));
            }

            // Config error уже залогирован при build плагина
            let target = registry
                .as_deref()
                .zip(mount_pose.as_ref())
                .and_then(|(registry, mount)| targets.aim(registry, mount, config.use_distance));
            if let Some(target) = target {
                events.watered.write(Watered {
                    actor: trigger.actor,
                    target: target.hit.entity,
                    point: target.hit.point,
                });
            }
            continue;
        }

        // ====================================================================
        // One-shot: shears / shovel
        // ====================================================================
        if !trigger.pressed {
            continue;
        }

        if user.is_busy() {
            log(&format!("⏸️ Trigger dropped: {:?} is busy", trigger.actor));
            continue;
        }

        let Some(mount_pose) = mount_pose else {
            continue;
        };

        let Some(registry) = require_registry(registry.as_deref(), &config.layers, "Tool use") else {
            continue;
        };

        let Some(offset) = config.swing_offset(equipped.kind) else {
            continue;
        };

        // 1. Busy lock + swing (lock снимется по TransientActionFinished)
        user.try_acquire(equipped.entity, equipped.kind);
        let swing = TransientAction::swing(offset, config.swing_half_duration, trigger.actor)
            .with_policy(InterruptPolicy::RunToCompletion);
        if !start_transient(&mut commands, equipped.entity, running.as_deref_mut(), swing) {
            log(&format!("⏸️ Swing already running on {:?}", equipped.entity));
        }

        events.cues.write(ToolCue {
            tool: equipped.entity,
            kind: equipped.kind,
            cue: CueKind::UseBurst,
        });

        // 2. Щелчок лезвий (BladeOpen cue при раскрытии)
        if equipped.kind == ToolKind::Shears {
            let snap = config.blade_snap().with_reopen_cue(ToolCue {
                tool: equipped.entity,
                kind: equipped.kind,
                cue: CueKind::BladeOpen,
            });
            blades.snap(&mut commands, equipped.entity, snap);
        }

        // 3. Mowing вокруг cut point (не зависит от aim hit)
        let tool_pose = targets.world_pose(equipped.entity);
        if let Some((mower, tool_pose)) = mower.zip(tool_pose) {
            events.mows.write(MowIntent {
                actor: trigger.actor,
                center: mower.world_cut_point(&tool_pose),
                radius: mower.radius,
            });
        }

        // 4. Target effect (missed ray → ничего)
        let Some(target) = targets.aim(registry, &mount_pose, config.use_distance) else {
            log(&format!("{} swing hit nothing", equipped.kind.display_name()));
            continue;
        };

        match (equipped.kind, target.class) {
            (ToolKind::Shears, TargetClass::Trimmable(grass)) => {
                events.trims.write(TrimIntent {
                    actor: trigger.actor,
                    target: grass,
                });
            }
            (ToolKind::Shovel, TargetClass::Ground) => {
                events.dug.write(Dug {
                    actor: trigger.actor,
                    point: target.hit.point,
                });
                if let Some(ImpactEffect(handle)) = impact {
                    spawn_detached_effect(&mut commands, &time, handle, target.hit.point, config.particle_lifetime);
                }
                log(&format!("⛏️ Dug at {:?}", target.hit.point));
            }
            (kind, class) => {
                log(&format!("{} hit {:?}: no effect", kind.display_name(), class));
            }
        }
    }
}

/// Система: Busy → Idle по завершению swing
pub fn release_busy_locks(mut finished: EventReader<TransientActionFinished>, mut users: Query<&mut ToolUser>) {
    for event in finished.read() {
        let Ok(mut user) = users.get_mut(event.actor) else {
            continue;
        };

        if user.is_busy() {
            user.release();
            log(&format!("🔓 {:?} ready (swing finished)", event.actor));
        }
    }
}
