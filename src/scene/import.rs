use bevy::asset::LoadState;
use bevy::ecs::message::Messages;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use bevy::scene::{InstanceId, SceneInstance, SceneRoot, SceneSpawner};
use std::collections::HashSet;
use std::path::Path;

use super::diff::NodeSnapshot;
use crate::lights::{LightBatchReport, spawn_lights_for_new_nodes};
use crate::settings::PetalLightSettings;

/// Event to import a glTF scene and light its petal nodes
#[derive(Message, Debug, Clone)]
pub struct ImportPetalScene {
    /// Path to the GLTF/GLB file (relative to assets folder)
    pub path: String,
    /// Which scene index to load
    pub scene_index: usize,
    /// Transform of the import root
    pub transform: Transform,
}

impl ImportPetalScene {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            scene_index: 0,
            transform: Transform::IDENTITY,
        }
    }
}

/// Sent once per import, after its lights have been created
#[derive(Message, Debug, Clone)]
pub struct LightsSpawned {
    /// Root entity of the imported scene
    pub root: Entity,
    pub path: String,
    pub report: LightBatchReport,
}

/// Root entity of an imported petal scene
#[derive(Component, Debug, Clone)]
pub struct PetalSceneRoot {
    pub path: String,
}

/// Import whose scene has not finished spawning yet
#[derive(Component)]
pub struct PendingLightImport {
    before: NodeSnapshot,
}

impl PendingLightImport {
    pub fn new(before: NodeSnapshot) -> Self {
        Self { before }
    }
}

pub struct PetalImportPlugin;

impl Plugin for PetalImportPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ImportPetalScene>()
            .add_message::<LightsSpawned>()
            .add_systems(Update, (handle_import_requests, finish_pending_imports).chain());
    }
}

fn handle_import_requests(mut commands: Commands, mut events: MessageReader<ImportPetalScene>) {
    for event in events.read() {
        commands.queue(BeginPetalImport(event.clone()));
    }
}

/// Command that snapshots the scene and starts loading with exclusive world access
struct BeginPetalImport(ImportPetalScene);

impl Command for BeginPetalImport {
    fn apply(self, world: &mut World) {
        let ImportPetalScene {
            path,
            scene_index,
            transform,
        } = self.0;

        let before = NodeSnapshot::capture(world);
        let scene_handle = world
            .resource::<AssetServer>()
            .load(GltfAssetLabel::Scene(scene_index).from_asset(path.clone()));

        world.spawn((
            Name::new(root_name(&path)),
            PetalSceneRoot { path: path.clone() },
            PendingLightImport::new(before),
            SceneRoot(scene_handle),
            transform,
            Visibility::default(),
        ));

        info!("Importing GLTF scene: {} (scene {})", path, scene_index);
    }
}

/// Display name of an import root: the file name without its extension.
fn root_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(path)
        .to_string()
}

/// `root` and every entity below it.
fn descendants(world: &World, root: Entity) -> HashSet<Entity> {
    let mut found = HashSet::new();
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        if !found.insert(entity) {
            continue;
        }
        if let Some(children) = world.get::<Children>(entity) {
            stack.extend(children.iter());
        }
    }
    found
}

/// Light the nodes an import introduced and report the result.
///
/// Only nodes under `root` count; nodes spawned meanwhile by other imports
/// are left to those imports. Does nothing if `root` has no pending import.
pub fn complete_import(world: &mut World, root: Entity) -> Option<LightBatchReport> {
    let pending = world.get_entity_mut(root).ok()?.take::<PendingLightImport>()?;
    let after = NodeSnapshot::capture(world);
    let in_scene = descendants(world, root);
    let new_nodes: HashSet<Entity> = pending
        .before
        .new_since(&after)
        .into_iter()
        .filter(|entity| in_scene.contains(entity))
        .collect();

    let settings = world
        .get_resource::<PetalLightSettings>()
        .cloned()
        .unwrap_or_default();
    let report = spawn_lights_for_new_nodes(world, &new_nodes, &settings);

    let path = world
        .get::<PetalSceneRoot>(root)
        .map(|scene| scene.path.clone())
        .unwrap_or_default();
    if let Some(mut messages) = world.get_resource_mut::<Messages<LightsSpawned>>() {
        messages.write(LightsSpawned {
            root,
            path,
            report: report.clone(),
        });
    }
    Some(report)
}

/// Load error of the scene, or of the file it is labelled from.
///
/// A file that fails to parse fails its own handle; the labelled scene handle
/// then never leaves the loading state.
fn load_failure(
    asset_server: &AssetServer,
    scene: AssetId<Scene>,
    path: Option<&str>,
) -> Option<String> {
    if let LoadState::Failed(err) = asset_server.load_state(scene) {
        return Some(err.to_string());
    }
    let file = asset_server.get_path_id(path?.to_string())?;
    match asset_server.load_state(file) {
        LoadState::Failed(err) => Some(err.to_string()),
        _ => None,
    }
}

/// Finish imports whose scene instance is ready; drop the ones that failed to load.
fn finish_pending_imports(world: &mut World) {
    let pending: Vec<(Entity, Option<InstanceId>, AssetId<Scene>, Option<String>)> = {
        let mut query = world.query_filtered::<
            (Entity, Option<&SceneInstance>, &SceneRoot, Option<&PetalSceneRoot>),
            With<PendingLightImport>,
        >();
        query
            .iter(world)
            .map(|(entity, instance, root, scene)| {
                (
                    entity,
                    instance.map(|i| **i),
                    root.0.id(),
                    scene.map(|scene| scene.path.clone()),
                )
            })
            .collect()
    };

    if pending.is_empty() {
        return;
    }

    let mut ready = Vec::new();
    let mut failed = Vec::new();
    {
        let spawner = world.resource::<SceneSpawner>();
        let asset_server = world.resource::<AssetServer>();
        for (entity, instance, scene, path) in pending {
            let is_ready = instance.is_some_and(|instance| spawner.instance_is_ready(instance));
            if is_ready {
                ready.push(entity);
            } else if let Some(err) = load_failure(asset_server, scene, path.as_deref()) {
                failed.push((entity, err));
            }
        }
    }

    for (entity, err) in failed {
        warn!("Failed to load GLTF scene for light import: {}", err);
        world.entity_mut(entity).remove::<PendingLightImport>();
    }

    for root in ready {
        complete_import(world, root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::{PetalLight, PetalLightSource};
    use bevy::gltf::GltfExtras;
    use bevy::scene::ScenePlugin;
    use std::time::Duration;

    fn world_with_messages() -> World {
        let mut world = World::new();
        world.init_resource::<Messages<LightsSpawned>>();
        world
    }

    #[test]
    fn completing_an_import_lights_only_new_nodes() {
        let mut world = world_with_messages();
        let extras = GltfExtras {
            value: r#"{"lights": [{"color": 16746496, "intensity": 2.0, "position": [1, 2, 3]}]}"#
                .to_string(),
        };
        // Present before the import: must not be lit
        world.spawn((Name::new("Petal_Layer_Node_9"), Transform::IDENTITY, extras.clone()));

        let before = NodeSnapshot::capture(&mut world);
        let root = world
            .spawn((
                Name::new("flower"),
                PetalSceneRoot {
                    path: "flower.gltf".to_string(),
                },
                PendingLightImport::new(before),
                Transform::IDENTITY,
            ))
            .id();
        let petal = world
            .spawn((
                Name::new("Petal_Layer_Node_0"),
                Transform::IDENTITY,
                extras,
                ChildOf(root),
            ))
            .id();
        world.spawn((Name::new("Petal_Layer_Node_1"), Transform::IDENTITY, ChildOf(root)));
        world.spawn((Name::new("Stem_Node"), Transform::IDENTITY, ChildOf(root)));

        let report = complete_import(&mut world, root).unwrap();
        assert_eq!(report.spawned, 1);
        assert_eq!(report.skipped, 1);

        let light = report.lights[0];
        assert_eq!(world.get::<ChildOf>(light).unwrap().parent(), petal);
        let record = world.get::<PetalLight>(light).unwrap();
        assert_eq!(record.location, Vec3::new(1.0, -3.0, 2.0));
        assert_eq!(record.intensity, 2.0);
        assert!(world.get::<PendingLightImport>(root).is_none());

        let messages = world.resource::<Messages<LightsSpawned>>();
        let mut cursor = messages.get_cursor();
        let sent: Vec<&LightsSpawned> = cursor.read(messages).collect();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].root, root);
        assert_eq!(sent[0].path, "flower.gltf");
        assert_eq!(sent[0].report.spawned, 1);
    }

    #[test]
    fn light_keeps_world_position_under_a_moved_root() {
        let mut world = world_with_messages();
        let before = NodeSnapshot::capture(&mut world);
        let root = world
            .spawn((
                Name::new("flower"),
                PendingLightImport::new(before),
                Transform::from_xyz(3.0, 0.0, 0.0),
            ))
            .id();
        let petal = world
            .spawn((
                Name::new("Petal_Layer_Node_0"),
                Transform::from_xyz(0.0, 1.0, 0.0),
                GltfExtras {
                    value: r#"{"lights": [{"position": [1, 2, 3]}]}"#.to_string(),
                },
                ChildOf(root),
            ))
            .id();

        let report = complete_import(&mut world, root).unwrap();
        let light = report.lights[0];
        let local = world.get::<Transform>(light).unwrap();
        let world_position = crate::lights::world_matrix(&world, petal)
            .transform_point3(local.translation);
        assert!(world_position.abs_diff_eq(Vec3::new(1.0, -3.0, 2.0), 1e-5));
    }

    #[test]
    fn second_completion_is_a_no_op() {
        let mut world = world_with_messages();
        let before = NodeSnapshot::capture(&mut world);
        let root = world.spawn(PendingLightImport::new(before)).id();
        assert!(complete_import(&mut world, root).is_some());
        assert!(complete_import(&mut world, root).is_none());
    }

    fn one_light() -> GltfExtras {
        GltfExtras {
            value: r#"{"lights": [{}]}"#.to_string(),
        }
    }

    fn pending_root(world: &mut World, name: &str) -> Entity {
        let before = NodeSnapshot::capture(world);
        world
            .spawn((
                Name::new(name.to_string()),
                PendingLightImport::new(before),
                Transform::IDENTITY,
            ))
            .id()
    }

    #[test]
    fn overlapping_imports_light_only_their_own_nodes() {
        let mut world = world_with_messages();
        let root_a = pending_root(&mut world, "flower_a");
        let root_b = pending_root(&mut world, "flower_b");

        // B's scene finishes spawning before A's
        let petal_b = world
            .spawn((
                Name::new("Petal_Layer_Node_0"),
                Transform::IDENTITY,
                one_light(),
                ChildOf(root_b),
            ))
            .id();
        let petal_a = world
            .spawn((
                Name::new("Petal_Layer_Node_0"),
                Transform::IDENTITY,
                one_light(),
                ChildOf(root_a),
            ))
            .id();

        let report_a = complete_import(&mut world, root_a).unwrap();
        assert_eq!(report_a.spawned, 1);
        assert_eq!(world.get::<PetalLight>(report_a.lights[0]).unwrap().source, petal_a);
        assert!(world.get::<PetalLightSource>(petal_b).is_none());

        let report_b = complete_import(&mut world, root_b).unwrap();
        assert_eq!(report_b.spawned, 1);
        assert_eq!(world.get::<PetalLight>(report_b.lights[0]).unwrap().source, petal_b);
    }

    #[test]
    fn mesh_primitives_are_not_skipped_nodes() {
        let mut world = world_with_messages();
        let root = pending_root(&mut world, "flower");
        let petal = world
            .spawn((
                Name::new("Petal_Layer_Node_0"),
                Transform::IDENTITY,
                one_light(),
                ChildOf(root),
            ))
            .id();
        world.spawn((
            Name::new("Petal_Layer_Mesh_0.Petal_Layer_Material_0"),
            Mesh3d(Handle::default()),
            ChildOf(petal),
        ));

        let report = complete_import(&mut world, root).unwrap();
        assert_eq!(report.spawned, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn root_is_named_after_the_file() {
        assert_eq!(root_name("models/flower.glb"), "flower");
        assert_eq!(root_name("Flower.GLB"), "Flower");
        assert_eq!(root_name("flower.gltf"), "flower");
        assert_eq!(root_name("flower"), "flower");
    }

    #[derive(Resource, Default)]
    struct Completed(Vec<LightsSpawned>);

    fn record_completed(
        mut events: MessageReader<LightsSpawned>,
        mut completed: ResMut<Completed>,
    ) {
        completed.0.extend(events.read().cloned());
    }

    fn driver_app() -> App {
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            AssetPlugin {
                watch_for_changes_override: Some(false),
                ..default()
            },
            ScenePlugin,
            crate::PetalLightsPlugin,
        ))
        .register_type::<Name>()
        .register_type::<GltfExtras>()
        .init_resource::<Completed>()
        .add_systems(PostUpdate, record_completed);
        app
    }

    fn pending_count(app: &mut App) -> usize {
        let world = app.world_mut();
        world
            .query_filtered::<(), With<PendingLightImport>>()
            .iter(world)
            .count()
    }

    fn light_count(app: &mut App) -> usize {
        let world = app.world_mut();
        world.query::<&PetalLight>().iter(world).count()
    }

    #[test]
    fn import_waits_for_the_scene_instance() {
        let mut app = driver_app();

        let mut scene_world = World::new();
        scene_world.spawn((Name::new("Petal_Layer_Node_0"), one_light()));
        let scene = app
            .world_mut()
            .resource_mut::<Assets<Scene>>()
            .add(Scene::new(scene_world));

        let before = NodeSnapshot::capture(app.world_mut());
        let root = app
            .world_mut()
            .spawn((
                Name::new("flower"),
                PetalSceneRoot {
                    path: "flower.gltf".to_string(),
                },
                PendingLightImport::new(before),
                SceneRoot(scene),
                Transform::IDENTITY,
                Visibility::default(),
            ))
            .id();

        // The instance spawns after the first check, so nothing is lit yet
        app.update();
        assert_eq!(pending_count(&mut app), 1);
        assert_eq!(light_count(&mut app), 0);
        assert!(app.world().resource::<Completed>().0.is_empty());

        for _ in 0..10 {
            app.update();
            if pending_count(&mut app) == 0 {
                break;
            }
        }
        assert_eq!(pending_count(&mut app), 0);
        assert_eq!(light_count(&mut app), 1);

        let completed = &app.world().resource::<Completed>().0;
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].root, root);
        assert_eq!(completed[0].path, "flower.gltf");
        assert_eq!(completed[0].report.spawned, 1);
    }

    #[test]
    fn failed_load_drops_the_import() {
        let mut app = driver_app();
        app.world_mut()
            .resource_mut::<Messages<ImportPetalScene>>()
            .write(ImportPetalScene::new("missing/flower.gltf"));

        app.update();
        assert_eq!(pending_count(&mut app), 1);

        for _ in 0..200 {
            app.update();
            if pending_count(&mut app) == 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(pending_count(&mut app), 0);

        let world = app.world_mut();
        let roots = world
            .query_filtered::<&Name, With<PetalSceneRoot>>()
            .iter(world)
            .map(|name| name.as_str().to_string())
            .collect::<Vec<_>>();
        assert_eq!(roots, vec!["flower"]);
        assert_eq!(light_count(&mut app), 0);
        assert!(app.world().resource::<Completed>().0.is_empty());
    }
}
