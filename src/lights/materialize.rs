use bevy::camera::visibility::RenderLayers;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::candidate::light_name;
use super::color::unpack_color;
use super::descriptor::LightDescriptor;
use super::placement::{local_location, parent_inverse, parented_transform};
use crate::error::MaterializeError;
use crate::settings::PetalLightSettings;

/// Light kinds the host can create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum LightKind {
    Point,
    Spot,
    Sun,
}

impl LightKind {
    /// Resolve a descriptor `type` token.
    ///
    /// Any token containing `POINT` (case-insensitive) is a point light; every
    /// other token is handed to the host uppercased and must name one of its
    /// kinds exactly.
    pub fn resolve(token: &str) -> Result<Self, MaterializeError> {
        let token = token.to_uppercase();
        if token.contains("POINT") {
            return Ok(Self::Point);
        }
        Self::from_host_token(&token)
    }

    /// Host light kind by its exact uppercase token.
    pub fn from_host_token(token: &str) -> Result<Self, MaterializeError> {
        match token {
            "POINT" => Ok(Self::Point),
            "SPOT" => Ok(Self::Spot),
            "SUN" => Ok(Self::Sun),
            other => Err(MaterializeError::UnsupportedLightType(other.to_string())),
        }
    }
}

/// Record of a light synthesized from a node's extras.
///
/// `location` is the light's own location; the entity's `Transform` is that
/// location pre-multiplied by `parent_inverse`.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PetalLight {
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
    pub radius: f32,
    pub location: Vec3,
    pub parent_inverse: Mat4,
    /// Node the light was decoded from
    pub source: Entity,
}

/// Marker for nodes that already own a materialized light
#[derive(Component, Default, Reflect)]
#[reflect(Component)]
pub struct PetalLightSource;

/// Create one light for `parent` from `descriptor`.
pub fn materialize(
    world: &mut World,
    parent: Entity,
    descriptor: &LightDescriptor,
    settings: &PetalLightSettings,
) -> Result<Entity, MaterializeError> {
    materialize_nth(world, parent, descriptor, settings, 0)
}

/// [`materialize`] for the `ordinal`-th descriptor of the node.
pub(crate) fn materialize_nth(
    world: &mut World,
    parent: Entity,
    descriptor: &LightDescriptor,
    settings: &PetalLightSettings,
    ordinal: usize,
) -> Result<Entity, MaterializeError> {
    let parent_name = world
        .get::<Name>(parent)
        .map(|name| name.as_str().to_string())
        .ok_or(MaterializeError::MissingNode(parent))?;
    let name = light_name(
        &parent_name,
        &settings.name_pattern,
        &settings.name_replacement,
        ordinal,
    );

    let kind = LightKind::resolve(&descriptor.kind)?;
    let color = unpack_color(descriptor.color);
    let intensity = descriptor.intensity;
    let radius = descriptor.radius;

    let location = local_location(descriptor.position, settings.up_axis);
    let parent_inverse = parent_inverse(world, parent)
        .ok_or_else(|| MaterializeError::SingularParentTransform(parent_name.clone()))?;
    let layers = world.get::<RenderLayers>(parent).cloned();

    let mut light = world.spawn((
        Name::new(name.clone()),
        parented_transform(parent_inverse, location),
        Visibility::default(),
        PetalLight {
            kind,
            color,
            intensity,
            radius,
            location,
            parent_inverse,
            source: parent,
        },
        ChildOf(parent),
    ));

    match kind {
        LightKind::Point => {
            light.insert(PointLight {
                color,
                intensity,
                radius,
                shadows_enabled: settings.shadows_enabled,
                ..default()
            });
        }
        LightKind::Spot => {
            light.insert(SpotLight {
                color,
                intensity,
                radius,
                shadows_enabled: settings.shadows_enabled,
                ..default()
            });
        }
        LightKind::Sun => {
            light.insert(DirectionalLight {
                color,
                illuminance: intensity,
                shadows_enabled: settings.shadows_enabled,
                ..default()
            });
        }
    }

    // Mirror every render layer the parent is in
    if let Some(layers) = layers {
        light.insert(layers);
    }

    let id = light.id();
    world.entity_mut(parent).insert(PetalLightSource);

    debug!("Created {:?} light '{}' under '{}' at {}", kind, name, parent_name, location);
    Ok(id)
}
