//! # Bevy Petal Lights
//!
//! Spawns Bevy lights from light descriptors embedded in glTF node extras.
//!
//! Flower scenes exported by FlowerEvolver carry, on every emissive petal
//! layer node, an extras entry like:
//!
//! ```json
//! { "lights": [{ "type": "PointLight", "color": 16746496, "intensity": 0.02,
//!                "radius": 1.5, "decay": 2.0, "position": [0.1, 0.3, -0.2] }] }
//! ```
//!
//! After the scene is spawned, every new node whose name starts with
//! `Petal_Layer` gets a light child built from that descriptor.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bevy_petal_lights::{ImportPetalScene, PetalLightsPlugin};
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(PetalLightsPlugin)
//!         .add_systems(Startup, |mut imports: MessageWriter<ImportPetalScene>| {
//!             imports.write(ImportPetalScene::new("flower.gltf"));
//!         })
//!         .run();
//! }
//! ```
//!
//! ## Without the import driver
//!
//! [`spawn_lights_for_new_nodes`] works on any set of entities, e.g. the
//! difference of two [`NodeSnapshot`]s taken around a scene spawn.

pub mod error;
pub mod lights;
pub mod scene;
pub mod settings;

use bevy::prelude::*;

pub use error::{DescriptorError, MaterializeError, SettingsError};
pub use lights::{
    LightBatchReport, LightDescriptor, LightKind, LightsPlugin, PetalLight, PetalLightSource,
    materialize, spawn_lights_for_new_nodes,
};
pub use scene::{
    ImportPetalScene, LightsSpawned, NodeSnapshot, PetalImportPlugin, PetalSceneRoot, detect_new,
};
pub use settings::{BatchOrder, DescriptorSelection, PetalLightSettings, UpAxis};

/// Main plugin that bundles light materialization and the import driver
pub struct PetalLightsPlugin;

impl Plugin for PetalLightsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PetalLightSettings>()
            .register_type::<PetalLightSettings>()
            .add_plugins(LightsPlugin)
            .add_plugins(PetalImportPlugin);
    }
}
