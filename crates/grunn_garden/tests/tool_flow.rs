//! Tool flow integration tests
//!
//! Headless garden App: equip / drop / switch, use dispatcher (busy lock),
//! watering, aim hint, configuration errors.
//!
//! Камера (mount) в origin смотрит в -Z, трава и земля стоят перед ней.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::{ColliderDisabled, GravityScale, RigidBody};
use grunn_garden::*;

/// Helper: garden App с фиксированным dt = 1/60
fn create_garden_app(config: GardenConfig) -> App {
    let mut app = create_headless_app(42);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(1.0 / 60.0)))
        .insert_resource(config)
        .add_plugins(GardenPlugin);

    // Первый frame: delta = 0
    app.update();
    app
}

fn registry(app: &App) -> LayerRegistry {
    app.world().resource::<LayerRegistry>().clone()
}

/// Player + камера (mount point) в origin
fn spawn_player(app: &mut App) -> (Entity, Entity) {
    let camera = app.world_mut().spawn(Transform::default()).id();
    let player = app
        .world_mut()
        .spawn((Player, ToolInventory::with_mount(camera)))
        .id();
    (player, camera)
}

fn spawn_tool(app: &mut App, kind: ToolKind, position: Vec3) -> Entity {
    let layer = registry(app).node_layer(SemanticLayer::Tool);
    app.world_mut()
        .spawn((
            Tool::new(kind),
            Transform::from_translation(position),
            QueryShape::sphere(0.2),
            layer,
            RigidBody::Dynamic,
            GravityScale(1.0),
        ))
        .id()
}

/// Stepped трава 1.0 / 0.1 / 0.1 на 2m перед камерой
fn spawn_grass(app: &mut App) -> Entity {
    let layer = registry(app).node_layer(SemanticLayer::Trimmable);
    app.world_mut()
        .spawn((
            Trimmable::stepped(1.0, 0.1, 0.1),
            Transform::from_xyz(0.0, -0.5, -2.0),
            QueryShape::grounded_cuboid(Vec3::splat(0.5)),
            layer,
        ))
        .id()
}

fn equip(app: &mut App, actor: Entity, tool: Entity) {
    app.world_mut().send_event(EquipToolIntent { actor, tool });
    app.update();
}

fn send_input(app: &mut App, input: PlayerInputEvent) {
    app.world_mut().send_event(input);
    app.update();
}

fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn drain_events<E: Event>(app: &mut App) -> Vec<E> {
    app.world_mut().resource_mut::<Events<E>>().drain().collect()
}

fn trim_level(app: &App, grass: Entity) -> f32 {
    app.world().get::<Trimmable>(grass).map(|t| t.trim_level()).unwrap_or(f32::NAN)
}

fn inventory(app: &App, player: Entity) -> &ToolInventory {
    app.world().get::<ToolInventory>(player).unwrap()
}

fn tool_user(app: &App, player: Entity) -> &ToolUser {
    app.world().get::<ToolUser>(player).unwrap()
}

/// Актор без `Player` (второй участник общего held pool)
fn spawn_actor(app: &mut App) -> Entity {
    let mount = app.world_mut().spawn(Transform::from_xyz(3.0, 0.0, 0.0)).id();
    app.world_mut().spawn(ToolInventory::with_mount(mount)).id()
}

/// Ножницы с двумя лезвиями (раскрыты на 30°)
fn spawn_shears_with_blades(app: &mut App) -> (Entity, Entity, Entity) {
    let shears = spawn_tool(app, ToolKind::Shears, Vec3::new(1.0, 0.0, -1.0));
    let mut blade = |side: ShearsBlade| {
        app.world_mut()
            .spawn((side, Transform::from_rotation(side.rotation(30.0)), ChildOf(shears)))
            .id()
    };
    let left = blade(ShearsBlade::LEFT);
    let right = blade(ShearsBlade::RIGHT);
    (shears, left, right)
}

/// Угол вокруг local Z в градусах (со знаком)
fn blade_angle(app: &App, blade: Entity) -> f32 {
    let rotation = app.world().get::<Transform>(blade).unwrap().rotation;
    (2.0 * rotation.z.atan2(rotation.w)).to_degrees()
}

fn count_cues(cues: &[ToolCue], kind: CueKind) -> usize {
    cues.iter().filter(|cue| cue.cue == kind).count()
}

// ============================================================================
// Equip / Drop
// ============================================================================

/// Test: equip A, затем equip B → в руках остаётся A, B не тронут
#[test]
fn test_equip_while_occupied_keeps_first_tool() {
    let mut app = create_garden_app(GardenConfig::default());
    let (player, _) = spawn_player(&mut app);
    let shears = spawn_tool(&mut app, ToolKind::Shears, Vec3::new(-1.0, 0.0, -2.0));
    let shovel = spawn_tool(&mut app, ToolKind::Shovel, Vec3::new(1.0, 0.0, -2.0));

    // Оба intent'а в одном frame
    app.world_mut().send_event(EquipToolIntent { actor: player, tool: shears });
    app.world_mut().send_event(EquipToolIntent { actor: player, tool: shovel });
    app.update();

    let equipped = inventory(&app, player).equipped().unwrap();
    assert_eq!(equipped.entity, shears);
    assert_eq!(inventory(&app, player).equipped_tool_id(), Some(0));

    assert!(app.world().get::<HeldTool>(shovel).is_none());
    assert_eq!(app.world().get::<RigidBody>(shovel), Some(&RigidBody::Dynamic));
    assert!(app.world().get::<ColliderDisabled>(shovel).is_none());
}

/// Test: инструмент в руках одного актора второй экипировать не может
#[test]
fn test_tool_held_by_other_actor_is_not_equipped() {
    let mut app = create_garden_app(GardenConfig::default());
    let (alice, _) = spawn_player(&mut app);
    let bob = spawn_actor(&mut app);
    let shears = spawn_tool(&mut app, ToolKind::Shears, Vec3::new(0.0, 0.0, -2.0));

    equip(&mut app, alice, shears);
    drain_events::<ToolEquipped>(&mut app);

    equip(&mut app, bob, shears);
    assert_eq!(inventory(&app, bob).equipped(), None);
    assert!(!inventory(&app, bob).holds(shears));
    assert_eq!(inventory(&app, alice).equipped().map(|t| t.entity), Some(shears));
    assert_eq!(app.world().get::<HeldTool>(shears).map(|h| h.holder), Some(alice));
    assert!(drain_events::<ToolEquipped>(&mut app).is_empty());

    // Stowed инструмент тоже занят
    send_input(&mut app, PlayerInputEvent::hotkey(0));
    assert!(inventory(&app, alice).holds(shears));
    equip(&mut app, bob, shears);
    assert!(!inventory(&app, bob).holds(shears));
    assert_eq!(app.world().get::<HeldTool>(shears).map(|h| h.holder), Some(alice));
}

/// Test: два актора тянутся к одному инструменту в одном frame → берёт первый
#[test]
fn test_same_frame_equip_by_two_actors() {
    let mut app = create_garden_app(GardenConfig::default());
    let bob = spawn_actor(&mut app);
    let carol = spawn_actor(&mut app);
    let shovel = spawn_tool(&mut app, ToolKind::Shovel, Vec3::new(0.0, 0.0, -2.0));

    app.world_mut().send_event(EquipToolIntent { actor: bob, tool: shovel });
    app.world_mut().send_event(EquipToolIntent { actor: carol, tool: shovel });
    app.update();

    assert_eq!(inventory(&app, bob).equipped().map(|t| t.entity), Some(shovel));
    assert_eq!(inventory(&app, carol).equipped(), None);
    assert_eq!(app.world().get::<HeldTool>(shovel).map(|h| h.holder), Some(bob));

    let equipped = drain_events::<ToolEquipped>(&mut app);
    assert_eq!(equipped.len(), 1);
    assert_eq!(equipped[0].actor, bob);
}

/// Test: equip → drop → equip восстанавливает physics/layer состояние
#[test]
fn test_equip_drop_equip_restores_physics() {
    let mut app = create_garden_app(GardenConfig::default());
    let registry = registry(&app);
    let (player, _) = spawn_player(&mut app);
    let can = spawn_tool(&mut app, ToolKind::WateringCan, Vec3::new(0.0, 0.0, -2.0));

    equip(&mut app, player, can);
    {
        let world = app.world();
        assert_eq!(world.get::<RigidBody>(can), Some(&RigidBody::KinematicPositionBased));
        assert_eq!(world.get::<GravityScale>(can).map(|g| g.0), Some(0.0));
        assert!(world.get::<ColliderDisabled>(can).is_some());
        assert_eq!(world.get::<NodeLayer>(can), Some(&registry.node_layer(SemanticLayer::IgnoreRay)));
        assert_eq!(world.get::<HeldTool>(can).map(|h| h.holder), Some(player));
    }

    app.world_mut().send_event(DropToolIntent { actor: player });
    app.update();
    {
        let world = app.world();
        assert_eq!(inventory(&app, player).equipped(), None);
        assert_eq!(world.get::<RigidBody>(can), Some(&RigidBody::Dynamic));
        assert_eq!(world.get::<GravityScale>(can).map(|g| g.0), Some(1.0));
        assert!(world.get::<ColliderDisabled>(can).is_none());
        assert!(world.get::<HeldTool>(can).is_none());
        assert_eq!(world.get::<NodeLayer>(can), Some(&registry.node_layer(SemanticLayer::Tool)));
    }

    equip(&mut app, player, can);
    assert_eq!(inventory(&app, player).equipped().map(|t| t.entity), Some(can));
    assert!(app.world().get::<ColliderDisabled>(can).is_some());
}

/// Test: drop с пустыми руками - no-op
#[test]
fn test_drop_with_empty_hands_is_noop() {
    let mut app = create_garden_app(GardenConfig::default());
    let (player, _) = spawn_player(&mut app);

    app.world_mut().send_event(DropToolIntent { actor: player });
    app.update();

    assert_eq!(inventory(&app, player).equipped(), None);
    assert!(drain_events::<ToolDropped>(&mut app).is_empty());
}

/// Test: held tool pinned к mount (mount * hold pose)
#[test]
fn test_held_tool_follows_mount() {
    let mut app = create_garden_app(GardenConfig::default());
    let (player, camera) = spawn_player(&mut app);
    let shears = spawn_tool(&mut app, ToolKind::Shears, Vec3::new(0.0, 0.0, -2.0));

    equip(&mut app, player, shears);
    let pinned = app.world().get::<Transform>(shears).unwrap().translation;
    assert!((pinned - Vec3::new(0.4, -0.4, -0.7)).length() < 1e-4);

    // Камера сдвинулась → инструмент следом
    app.world_mut().get_mut::<Transform>(camera).unwrap().translation = Vec3::new(0.0, 1.6, 0.0);
    app.update();
    let pinned = app.world().get::<Transform>(shears).unwrap().translation;
    assert!((pinned - Vec3::new(0.4, 1.2, -0.7)).length() < 1e-4);
}

/// Test: инструмент под parent'ом (стойка) пинится в world space
#[test]
fn test_held_tool_under_parent_follows_mount() {
    let mut app = create_garden_app(GardenConfig::default());
    let (player, _) = spawn_player(&mut app);
    let rack = app.world_mut().spawn(Transform::from_xyz(5.0, 0.0, 0.0)).id();
    let shears = spawn_tool(&mut app, ToolKind::Shears, Vec3::ZERO);
    app.world_mut().entity_mut(shears).insert(ChildOf(rack));

    equip(&mut app, player, shears);

    // Local = world pin в системе стойки
    let local = app.world().get::<Transform>(shears).unwrap().translation;
    assert!((local - Vec3::new(-4.6, -0.4, -0.7)).length() < 1e-4);
}

/// Test: Interact подбирает interactable root compound инструмента
#[test]
fn test_pickup_resolves_interactable_root() {
    let mut app = create_garden_app(GardenConfig::default());
    let tool_layer = registry(&app).node_layer(SemanticLayer::Tool);
    let (player, _) = spawn_player(&mut app);

    // Root без формы, луч попадает в ручку (child)
    let shovel = app
        .world_mut()
        .spawn((
            Tool::new(ToolKind::Shovel),
            Transform::from_xyz(0.0, 0.0, -2.0),
            tool_layer,
            RigidBody::Dynamic,
        ))
        .id();
    // Local transform ручки: identity (world pose = pose root'а)
    let handle = app
        .world_mut()
        .spawn((
            Transform::default(),
            QueryShape::sphere(0.1),
            tool_layer,
            ChildOf(shovel),
        ))
        .id();

    send_input(&mut app, PlayerInputEvent::interact());

    assert_eq!(inventory(&app, player).equipped().map(|t| t.entity), Some(shovel));
    assert!(app.world().get::<ColliderDisabled>(handle).is_some());

    let cues = drain_events::<ToolCue>(&mut app);
    assert!(cues.iter().any(|cue| cue.cue == CueKind::PickupSound && cue.tool == shovel));

    // Повторный Interact → drop
    send_input(&mut app, PlayerInputEvent::interact());
    assert_eq!(inventory(&app, player).equipped(), None);
    assert!(app.world().get::<ColliderDisabled>(handle).is_none());
}

/// Test: pickup вне interaction distance ничего не делает
#[test]
fn test_pickup_out_of_range() {
    let mut app = create_garden_app(GardenConfig::default());
    let (player, _) = spawn_player(&mut app);
    spawn_tool(&mut app, ToolKind::Shears, Vec3::new(0.0, 0.0, -5.0));

    send_input(&mut app, PlayerInputEvent::interact());
    assert_eq!(inventory(&app, player).equipped(), None);
}

/// Test: despawned инструмент уходит из inventory (в том числе посреди swing)
#[test]
fn test_despawned_tool_is_forgotten() {
    let mut app = create_garden_app(GardenConfig::default());
    let (player, _) = spawn_player(&mut app);
    let grass = spawn_grass(&mut app);
    let shears = spawn_tool(&mut app, ToolKind::Shears, Vec3::new(1.0, 0.0, -1.0));

    equip(&mut app, player, shears);
    send_input(&mut app, PlayerInputEvent::click());
    assert!(tool_user(&app, player).is_busy());
    assert!((trim_level(&app, grass) - 0.9).abs() < 1e-5);

    app.world_mut().despawn(shears);
    app.update();

    assert_eq!(inventory(&app, player).equipped(), None);
    assert!(!tool_user(&app, player).is_busy());
    assert_eq!(tool_user(&app, player).active_tool, None);

    // Новые ножницы сразу режут
    let spare = spawn_tool(&mut app, ToolKind::Shears, Vec3::new(1.0, 0.0, -1.0));
    equip(&mut app, player, spare);
    send_input(&mut app, PlayerInputEvent::click());
    assert!(tool_user(&app, player).is_busy());
    assert!((trim_level(&app, grass) - 0.8).abs() < 1e-5);
}

// ============================================================================
// Switch
// ============================================================================

/// Test: hotkeys stow / swap между подобранными инструментами
#[test]
fn test_hotkey_switch_between_picked_tools() {
    let mut app = create_garden_app(GardenConfig::default());
    let (player, _) = spawn_player(&mut app);
    let shears = spawn_tool(&mut app, ToolKind::Shears, Vec3::new(-1.0, 0.0, -2.0));
    let shovel = spawn_tool(&mut app, ToolKind::Shovel, Vec3::new(1.0, 0.0, -2.0));

    equip(&mut app, player, shears);
    send_input(&mut app, PlayerInputEvent::hotkey(0));
    assert_eq!(inventory(&app, player).equipped(), None);
    assert_eq!(app.world().get::<Appearance>(shears).map(|a| a.visible), Some(false));

    equip(&mut app, player, shovel);
    send_input(&mut app, PlayerInputEvent::hotkey(0));
    assert_eq!(inventory(&app, player).equipped().map(|t| t.entity), Some(shears));
    assert_eq!(app.world().get::<Appearance>(shears).map(|a| a.visible), Some(true));
    assert_eq!(app.world().get::<Appearance>(shovel).map(|a| a.visible), Some(false));

    // Watering can не подобран
    send_input(&mut app, PlayerInputEvent::hotkey(1));
    assert_eq!(inventory(&app, player).equipped().map(|t| t.entity), Some(shears));
}

/// Test: switch отклоняется, пока идёт swing
#[test]
fn test_switch_refused_while_busy() {
    let mut app = create_garden_app(GardenConfig::default());
    let (player, _) = spawn_player(&mut app);
    let shears = spawn_tool(&mut app, ToolKind::Shears, Vec3::new(0.0, 0.0, -2.0));
    equip(&mut app, player, shears);

    send_input(&mut app, PlayerInputEvent::click());
    assert!(tool_user(&app, player).is_busy());

    send_input(&mut app, PlayerInputEvent::hotkey(0));
    assert_eq!(inventory(&app, player).equipped().map(|t| t.entity), Some(shears));

    run_frames(&mut app, 30);
    assert!(!tool_user(&app, player).is_busy());
    send_input(&mut app, PlayerInputEvent::hotkey(0));
    assert_eq!(inventory(&app, player).equipped(), None);
}

// ============================================================================
// Use dispatcher
// ============================================================================

/// Test: два trigger-down в одном busy window → ровно один trim
#[test]
fn test_trigger_during_busy_is_dropped() {
    let mut app = create_garden_app(GardenConfig::default());
    let (player, _) = spawn_player(&mut app);
    let grass = spawn_grass(&mut app);
    let shears = spawn_tool(&mut app, ToolKind::Shears, Vec3::new(1.0, 0.0, -1.0));
    equip(&mut app, player, shears);

    send_input(&mut app, PlayerInputEvent::click());
    send_input(&mut app, PlayerInputEvent::click());
    assert!((trim_level(&app, grass) - 0.9).abs() < 1e-5);
    assert_eq!(tool_user(&app, player).current_tool, Some(ToolKind::Shears));

    // Swing закончился (0.2s) → следующий клик снова режет
    run_frames(&mut app, 20);
    assert!(!tool_user(&app, player).is_busy());
    assert_eq!(app.world().get::<HeldTool>(shears).map(|h| h.action_offset), Some(Vec3::ZERO));

    send_input(&mut app, PlayerInputEvent::click());
    assert!((trim_level(&app, grass) - 0.8).abs() < 1e-5);

    // Scale травы следует за trim level
    let scale_y = app.world().get::<Transform>(grass).unwrap().scale.y;
    assert!((scale_y - 0.8).abs() < 1e-5);
}

/// Test: без инструмента use input ничего не меняет
#[test]
fn test_use_without_tool_is_ignored() {
    let mut app = create_garden_app(GardenConfig::default());
    let (player, _) = spawn_player(&mut app);
    let grass = spawn_grass(&mut app);

    send_input(&mut app, PlayerInputEvent::click());

    assert_eq!(trim_level(&app, grass), 1.0);
    assert!(!tool_user(&app, player).is_busy());
    assert!(drain_events::<ToolCue>(&mut app).is_empty());
    assert!(drain_events::<GrassTrimmed>(&mut app).is_empty());
}

/// Test: промах луча → swing есть, эффекта на цель нет
#[test]
fn test_missed_ray_has_no_target_effect() {
    let mut app = create_garden_app(GardenConfig::default());
    let (player, camera) = spawn_player(&mut app);
    let grass = spawn_grass(&mut app);
    let shears = spawn_tool(&mut app, ToolKind::Shears, Vec3::new(1.0, 0.0, -1.0));
    equip(&mut app, player, shears);

    // Смотрим в небо
    *app.world_mut().get_mut::<Transform>(camera).unwrap() =
        Transform::default().looking_to(Vec3::Y, Vec3::Z);

    send_input(&mut app, PlayerInputEvent::click());

    assert_eq!(trim_level(&app, grass), 1.0);
    assert!(drain_events::<GrassTrimmed>(&mut app).is_empty());
}

/// Test: лопата по земле → Dug + dirt burst в точке попадания
#[test]
fn test_shovel_digs_ground() {
    let mut app = create_garden_app(GardenConfig::default());
    let ground_layer = registry(&app).node_layer(SemanticLayer::Ground);
    let (player, _) = spawn_player(&mut app);
    let shovel = spawn_tool(&mut app, ToolKind::Shovel, Vec3::new(1.0, 0.0, -1.0));
    app.world_mut()
        .entity_mut(shovel)
        .insert(ImpactEffect(EffectHandle::from("fx/dirt")));

    app.world_mut().spawn((
        Transform::from_xyz(0.0, 0.0, -2.5),
        QueryShape::cuboid(Vec3::new(2.0, 2.0, 0.5)),
        ground_layer,
    ));

    equip(&mut app, player, shovel);
    send_input(&mut app, PlayerInputEvent::click());

    let dug = drain_events::<Dug>(&mut app);
    assert_eq!(dug.len(), 1);
    assert!((dug[0].point - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-4);

    let mut effects = app.world_mut().query::<&SpawnedEffect>();
    let handles: Vec<_> = effects.iter(app.world()).map(|e| e.handle.clone()).collect();
    assert_eq!(handles, vec![EffectHandle::from("fx/dirt")]);

    let cues = drain_events::<ToolCue>(&mut app);
    assert!(cues.iter().any(|cue| cue.cue == CueKind::UseBurst && cue.kind == ToolKind::Shovel));
}

/// Test: полив - никогда не busy, loop cue start/stop, Watered по цели
#[test]
fn test_watering_never_takes_busy_lock() {
    let mut app = create_garden_app(GardenConfig::default());
    let (player, _) = spawn_player(&mut app);
    let grass = spawn_grass(&mut app);
    let can = spawn_tool(&mut app, ToolKind::WateringCan, Vec3::new(1.0, 0.0, -1.0));
    equip(&mut app, player, can);

    let mut cues = Vec::new();
    let mut watered = Vec::new();
    for _ in 0..10 {
        send_input(&mut app, PlayerInputEvent::hold());
        assert!(!tool_user(&app, player).is_busy());
        cues.extend(drain_events::<ToolCue>(&mut app));
        watered.extend(drain_events::<Watered>(&mut app));
    }

    assert_eq!(tool_user(&app, player).pouring, Some(can));
    assert_eq!(cues.iter().filter(|c| c.cue == CueKind::LoopStart).count(), 1);
    assert_eq!(watered.len(), 10);
    assert!(watered.iter().all(|w| w.target == grass));

    let tilt = app.world().get::<HeldTool>(can).unwrap().action_rotation;
    assert!(tilt.angle_between(Quat::IDENTITY) > 0.1);

    // Отпустили → loop stop, наклон возвращается
    send_input(&mut app, PlayerInputEvent::default());
    let cues = drain_events::<ToolCue>(&mut app);
    assert!(cues.iter().any(|c| c.cue == CueKind::LoopStop));
    assert_eq!(tool_user(&app, player).pouring, None);

    for _ in 0..120 {
        send_input(&mut app, PlayerInputEvent::default());
    }
    let rest = app.world().get::<HeldTool>(can).unwrap().action_rotation;
    assert!(rest.angle_between(Quat::IDENTITY) < 0.01);

    // Трава не стрижётся поливом
    assert_eq!(trim_level(&app, grass), 1.0);
}

/// Test: выброшенная во время полива лейка сразу шлёт LoopStop
#[test]
fn test_dropping_pouring_can_stops_loop() {
    let mut app = create_garden_app(GardenConfig::default());
    let (player, _) = spawn_player(&mut app);
    let can = spawn_tool(&mut app, ToolKind::WateringCan, Vec3::new(1.0, 0.0, -1.0));
    equip(&mut app, player, can);

    send_input(&mut app, PlayerInputEvent::hold());
    send_input(&mut app, PlayerInputEvent::hold());
    assert_eq!(tool_user(&app, player).pouring, Some(can));
    drain_events::<ToolCue>(&mut app);

    // Без trigger input: cue приходит от самого drop
    app.world_mut().send_event(DropToolIntent { actor: player });
    app.update();

    let cues = drain_events::<ToolCue>(&mut app);
    assert_eq!(count_cues(&cues, CueKind::LoopStop), 1);
    assert!(cues.iter().any(|c| c.cue == CueKind::LoopStop && c.tool == can));
    assert_eq!(tool_user(&app, player).pouring, None);

    // Следующий trigger второй LoopStop не шлёт
    send_input(&mut app, PlayerInputEvent::default());
    assert_eq!(count_cues(&drain_events::<ToolCue>(&mut app), CueKind::LoopStop), 0);
}

/// Test: убранная hotkey'ем во время полива лейка сразу шлёт LoopStop
#[test]
fn test_stowing_pouring_can_stops_loop() {
    let mut app = create_garden_app(GardenConfig::default());
    let (player, _) = spawn_player(&mut app);
    let can = spawn_tool(&mut app, ToolKind::WateringCan, Vec3::new(1.0, 0.0, -1.0));
    equip(&mut app, player, can);

    send_input(&mut app, PlayerInputEvent::hold());
    assert_eq!(tool_user(&app, player).pouring, Some(can));
    drain_events::<ToolCue>(&mut app);

    app.world_mut().send_event(SwitchToolIntent {
        actor: player,
        kind: ToolKind::WateringCan,
    });
    app.update();

    assert_eq!(inventory(&app, player).equipped(), None);
    assert!(inventory(&app, player).holds(can));
    let cues = drain_events::<ToolCue>(&mut app);
    assert_eq!(count_cues(&cues, CueKind::LoopStop), 1);
    assert_eq!(tool_user(&app, player).pouring, None);
}

// ============================================================================
// Shears blades
// ============================================================================

/// Прогон щелчка: click, повторный click на 15-м frame, затем до конца.
/// Возвращает (угол после повторного click + 6 frames, все cues).
fn run_blade_snaps(config: GardenConfig) -> (App, Entity, Entity, f32, Vec<ToolCue>) {
    let mut app = create_garden_app(config);
    let (player, _) = spawn_player(&mut app);
    let (shears, left, right) = spawn_shears_with_blades(&mut app);
    equip(&mut app, player, shears);
    drain_events::<ToolCue>(&mut app);

    let mut cues = Vec::new();
    send_input(&mut app, PlayerInputEvent::click());
    run_frames(&mut app, 6);
    cues.extend(drain_events::<ToolCue>(&mut app));

    // Пауза: лезвия сомкнуты, звука раскрытия ещё нет
    assert!(blade_angle(&app, left).abs() < 1.0);
    assert!(blade_angle(&app, right).abs() < 1.0);
    assert_eq!(count_cues(&cues, CueKind::BladeOpen), 0);

    run_frames(&mut app, 8);
    cues.extend(drain_events::<ToolCue>(&mut app));

    // Раскрываются: один cue на инструмент, лезвия зеркальны
    assert_eq!(count_cues(&cues, CueKind::BladeOpen), 1);
    let opening = blade_angle(&app, left);
    assert!(opening > 0.0 && opening < 30.0);
    assert!((blade_angle(&app, right) + opening).abs() < 1e-3);
    assert!(!tool_user(&app, player).is_busy());

    send_input(&mut app, PlayerInputEvent::click());
    run_frames(&mut app, 6);
    let after_reclick = blade_angle(&app, left);
    cues.extend(drain_events::<ToolCue>(&mut app));

    run_frames(&mut app, 30);
    cues.extend(drain_events::<ToolCue>(&mut app));
    (app, left, right, after_reclick, cues)
}

/// Test: щелчок по умолчанию не прерывается повторным click
#[test]
fn test_blade_snap_runs_to_completion() {
    let (app, left, right, after_reclick, cues) = run_blade_snaps(GardenConfig::default());

    // Повторный click проигнорирован: первый щелчок дошёл до конца
    assert!((after_reclick - 30.0).abs() < 1e-3);
    assert_eq!(count_cues(&cues, CueKind::BladeOpen), 1);
    assert_eq!(count_cues(&cues, CueKind::UseBurst), 2);

    assert!((blade_angle(&app, left) - 30.0).abs() < 1e-3);
    assert!((blade_angle(&app, right) + 30.0).abs() < 1e-3);
    assert!(app.world().get::<TransientAction>(left).is_none());
}

/// Test: blade_interrupt = Restart → повторный click снова смыкает лезвия
#[test]
fn test_blade_snap_restarts_on_reclick() {
    let config = GardenConfig {
        blade_interrupt: InterruptPolicy::Restart,
        ..default()
    };
    let (app, left, right, after_reclick, cues) = run_blade_snaps(config);

    assert!(after_reclick.abs() < 1.0);
    assert_eq!(count_cues(&cues, CueKind::BladeOpen), 2);

    assert!((blade_angle(&app, left) - 30.0).abs() < 1e-3);
    assert!((blade_angle(&app, right) + 30.0).abs() < 1e-3);
    assert!(app.world().get::<TransientAction>(right).is_none());
}

// ============================================================================
// Aim hint / config
// ============================================================================

#[test]
fn test_aim_hint_names_tool_under_crosshair() {
    let mut app = create_garden_app(GardenConfig::default());
    let (player, camera) = spawn_player(&mut app);
    spawn_tool(&mut app, ToolKind::Shovel, Vec3::new(0.0, 0.0, -3.2));
    app.update();

    let hint = *app.world().get::<AimHint>(player).unwrap();
    assert_eq!(hint.tool, Some(ToolKind::Shovel));
    assert_eq!(hint.text().as_deref(), Some("Pick up Shovel"));

    *app.world_mut().get_mut::<Transform>(camera).unwrap() =
        Transform::default().looking_to(Vec3::X, Vec3::Y);
    app.update();
    assert_eq!(app.world().get::<AimHint>(player).unwrap().tool, None);
}

/// Test: слой не найден → config error, layer-зависимые операции abort
#[test]
fn test_missing_layer_aborts_equip() {
    let mut config = GardenConfig::default();
    config.layers.engine_layers.remove("Ignore Raycast");

    let mut app = create_garden_app(config);
    assert!(app.world().get_resource::<LayerRegistry>().is_none());

    let (player, _) = spawn_player(&mut app);
    let shears = app
        .world_mut()
        .spawn((Tool::new(ToolKind::Shears), Transform::default(), RigidBody::Dynamic))
        .id();

    equip(&mut app, player, shears);

    assert_eq!(inventory(&app, player).equipped(), None);
    assert!(app.world().get::<HeldTool>(shears).is_none());
    assert_eq!(app.world().get::<RigidBody>(shears), Some(&RigidBody::Dynamic));
}
