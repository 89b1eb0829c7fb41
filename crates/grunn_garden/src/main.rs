//! Headless демо GRUNN Garden
//!
//! Запускает Bevy App без рендера: подбор ножниц, стрижка травы,
//! переключение инструментов, drop. Камеру "двигает" скрипт (как host engine).

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::RigidBody;
use grunn_garden::*;

const FRAME: f32 = 1.0 / 60.0;

fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn send_input(app: &mut App, input: PlayerInputEvent) {
    app.world_mut().send_event(input);
    app.update();
}

/// Повернуть камеру на точку (host-side mouse look)
fn aim_at(app: &mut App, camera: Entity, target: Vec3) {
    if let Some(mut transform) = app.world_mut().get_mut::<Transform>(camera) {
        let eye = transform.translation;
        *transform = Transform::from_translation(eye).looking_at(target, Vec3::Y);
    }
}

fn blade_open_pose(blade: &ShearsBlade) -> Transform {
    Transform::from_rotation(blade.rotation(GardenConfig::default().blade_open_degrees))
}

fn spawn_tool(app: &mut App, registry: &LayerRegistry, kind: ToolKind, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Tool::new(kind),
            Transform::from_translation(position),
            QueryShape::sphere(0.2),
            registry.node_layer(SemanticLayer::Tool),
            RigidBody::Dynamic,
        ))
        .id()
}

fn main() {
    let seed = 42;
    println!("Starting GRUNN Garden headless demo (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(FRAME)))
        .add_plugins(GardenPlugin);

    let Some(registry) = app.world().get_resource::<LayerRegistry>().cloned() else {
        eprintln!("Layer configuration is invalid, demo aborted");
        return;
    };

    // Player + камера (mount point)
    let camera = app.world_mut().spawn(Transform::from_xyz(0.0, 1.6, -1.0)).id();
    let player = app
        .world_mut()
        .spawn((Player, ToolInventory::with_mount(camera)))
        .id();

    // Инструменты по бокам от травы
    let shears_position = Vec3::new(-1.2, 0.8, -2.0);
    let shovel_position = Vec3::new(1.2, 0.8, -2.0);
    let shears = spawn_tool(&mut app, &registry, ToolKind::Shears, shears_position);
    for blade in [ShearsBlade::LEFT, ShearsBlade::RIGHT] {
        app.world_mut().spawn((blade, blade_open_pose(&blade), ChildOf(shears)));
    }
    spawn_tool(&mut app, &registry, ToolKind::WateringCan, Vec3::new(1.8, 0.8, -2.0));
    spawn_tool(&mut app, &registry, ToolKind::Shovel, shovel_position);

    // Grass patch: imported hierarchy → SetupGrass
    let patch = app.world_mut().spawn(Transform::default()).id();
    let blades: Vec<Entity> = [-0.6, 0.0, 0.6]
        .into_iter()
        .map(|x| {
            app.world_mut()
                .spawn((GrassBlade, Transform::from_xyz(x, 0.0, -3.0), ChildOf(patch)))
                .id()
        })
        .collect();
    app.world_mut().send_event(SetupGrass { root: patch });
    run_frames(&mut app, 2);

    // 1. Pickup ножниц
    aim_at(&mut app, camera, shears_position);
    run_frames(&mut app, 1);
    if let Some(hint) = app.world().get::<AimHint>(player).and_then(|hint| hint.text()) {
        println!("Hint: {}", hint);
    }
    send_input(&mut app, PlayerInputEvent::interact());

    // 2. Стрижка центральной травинки (5 кликов, между ними swing успевает закончиться)
    aim_at(&mut app, camera, Vec3::new(0.0, 0.5, -3.0));
    for _ in 0..5 {
        send_input(&mut app, PlayerInputEvent::click());
        run_frames(&mut app, 15);
    }

    // 3. Убрать ножницы (hotkey 1), подобрать лопату, снова достать ножницы
    send_input(&mut app, PlayerInputEvent::hotkey(0));
    aim_at(&mut app, camera, shovel_position);
    run_frames(&mut app, 1);
    send_input(&mut app, PlayerInputEvent::interact());
    send_input(&mut app, PlayerInputEvent::hotkey(0));

    if let Some(inventory) = app.world().get::<ToolInventory>(player) {
        println!(
            "Equipped tool id: {:?}, stowed: {}",
            inventory.equipped_tool_id(),
            inventory.stowed().len()
        );
    }

    // 4. Drop ножниц
    send_input(&mut app, PlayerInputEvent::drop_tool());
    run_frames(&mut app, 1);
    let dropped = app.world().get::<HeldTool>(shears).is_none();
    println!("Shears dropped: {}", dropped);

    for (index, blade) in blades.iter().enumerate() {
        if let Some(trimmable) = app.world().get::<Trimmable>(*blade) {
            println!("Blade {}: trim level {:.2}", index, trimmable.trim_level());
        }
    }

    println!("Demo complete!");
}
