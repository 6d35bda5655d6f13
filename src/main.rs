//! Standalone viewer: imports a flower scene and lights its petals.

use std::f32::consts::FRAC_PI_2;
use std::path::PathBuf;

use bevy::prelude::*;
use bevy_petal_lights::{
    ImportPetalScene, LightsSpawned, PetalLightSettings, PetalLightsPlugin, UpAxis,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Import a glTF flower and spawn its petal lights")]
struct Args {
    /// glTF file, relative to the assets folder
    path: String,

    /// RON settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Scene index inside the glTF file
    #[arg(long, default_value_t = 0)]
    scene: usize,
}

/// Import to request once the app is running
#[derive(Resource)]
struct StartupImport(ImportPetalScene);

fn main() {
    let args = Args::parse();

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Petal Lights".to_string(),
            ..default()
        }),
        ..default()
    }));

    let settings = match &args.settings {
        Some(path) => PetalLightSettings::load(path).unwrap_or_else(|e| {
            warn!("Using default settings, could not load {:?}: {}", path, e);
            PetalLightSettings::default()
        }),
        None => PetalLightSettings::default(),
    };

    // Match the scene to the axis convention the lights are placed in
    let root_rotation = match settings.up_axis {
        UpAxis::ZUp => Quat::from_rotation_x(FRAC_PI_2),
        UpAxis::YUp => Quat::IDENTITY,
    };
    let import = ImportPetalScene {
        path: args.path,
        scene_index: args.scene,
        transform: Transform::from_rotation(root_rotation),
    };

    app.insert_resource(settings)
        .insert_resource(StartupImport(import))
        .add_plugins(PetalLightsPlugin)
        .add_systems(Startup, setup_viewer)
        .add_systems(Update, report_spawned_lights)
        .run();
}

fn setup_viewer(
    mut commands: Commands,
    settings: Res<PetalLightSettings>,
    import: Res<StartupImport>,
    mut imports: MessageWriter<ImportPetalScene>,
) {
    let up = match settings.up_axis {
        UpAxis::ZUp => Vec3::Z,
        UpAxis::YUp => Vec3::Y,
    };
    let eye = match settings.up_axis {
        UpAxis::ZUp => Vec3::new(0.0, -1.5, 1.0),
        UpAxis::YUp => Vec3::new(0.0, 1.0, 1.5),
    };
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(eye).looking_at(Vec3::ZERO, up),
    ));
    commands.spawn(AmbientLight {
        color: Color::WHITE,
        brightness: 50.0,
        affects_lightmapped_meshes: true,
    });

    imports.write(import.0.clone());
}

/// User-facing summary of each import
fn report_spawned_lights(mut events: MessageReader<LightsSpawned>) {
    for event in events.read() {
        info!(
            "Spawned {} lights from {} ({} skipped, {} failed)",
            event.report.spawned, event.path, event.report.skipped, event.report.failed
        );
    }
}
