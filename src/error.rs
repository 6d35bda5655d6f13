use bevy::prelude::Entity;
use thiserror::Error;

/// Errors raised while decoding the `lights` entry of a node's glTF extras.
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("extras are not valid JSON: {0}")]
    InvalidExtras(#[source] serde_json::Error),

    #[error("light descriptor #{index} is malformed: {source}")]
    Malformed {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("lights list is empty")]
    EmptyList,
}

/// Errors raised by the host while materializing a single light.
#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("unsupported light type `{0}`")]
    UnsupportedLightType(String),

    #[error("node {0} does not exist or has no name")]
    MissingNode(Entity),

    #[error("parent `{0}` has a singular world matrix")]
    SingularParentTransform(String),
}

/// Errors raised while loading [`crate::PetalLightSettings`] from disk.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings file: {0}")]
    Parse(#[from] ron::error::SpannedError),
}
