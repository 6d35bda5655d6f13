mod batch;
mod candidate;
mod color;
mod descriptor;
mod materialize;
mod placement;

pub use batch::*;
pub use candidate::*;
pub use color::*;
pub use descriptor::*;
pub use materialize::*;
pub use placement::*;

use bevy::prelude::*;

pub struct LightsPlugin;

impl Plugin for LightsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<PetalLight>()
            .register_type::<PetalLightSource>()
            .register_type::<LightKind>();
    }
}
