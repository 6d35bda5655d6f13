use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SettingsError;

/// Name prefix that marks a node as light-bearing.
pub const DEFAULT_CANDIDATE_PREFIX: &str = "Petal_Layer";

/// Which entries of a node's `lights` list get materialized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum DescriptorSelection {
    /// Only the first descriptor (one light per node)
    #[default]
    First,
    /// Every descriptor in the list
    All,
}

/// Order in which candidate nodes are processed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum BatchOrder {
    /// Lexicographic by node name, so light creation order is reproducible
    #[default]
    ByName,
    /// Whatever order the detected-node set yields
    Unordered,
}

/// Up axis of the scene graph the lights are placed into.
///
/// Descriptor positions are always authored Y-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum UpAxis {
    /// Remap `(x, y, z)` to `(x, -z, y)`
    #[default]
    ZUp,
    /// Keep positions as authored
    YUp,
}

/// Configuration for light materialization.
///
/// Loaded from a RON file by the binary; libraries can insert it directly.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Resource)]
#[serde(default)]
pub struct PetalLightSettings {
    /// Only nodes whose name starts with this are inspected
    pub candidate_prefix: String,
    /// Substring of the node name replaced to derive the light name
    pub name_pattern: String,
    /// Replacement for `name_pattern`
    pub name_replacement: String,
    pub selection: DescriptorSelection,
    pub order: BatchOrder,
    pub up_axis: UpAxis,
    pub shadows_enabled: bool,
    /// Decode and resolve every candidate before spawning anything; a single
    /// failure then spawns no light at all.
    pub validate_before_spawn: bool,
}

impl Default for PetalLightSettings {
    fn default() -> Self {
        Self {
            candidate_prefix: DEFAULT_CANDIDATE_PREFIX.to_string(),
            name_pattern: "Node".to_string(),
            name_replacement: "Light".to_string(),
            selection: DescriptorSelection::First,
            order: BatchOrder::ByName,
            up_axis: UpAxis::ZUp,
            shadows_enabled: true,
            validate_before_spawn: false,
        }
    }
}

impl PetalLightSettings {
    /// Parse settings from RON text. Missing fields keep their defaults.
    pub fn from_ron(contents: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(contents)?)
    }

    /// Load settings from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    /// Serialize to pretty RON, the format [`Self::load`] reads back.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_petal_convention() {
        let settings = PetalLightSettings::default();
        assert_eq!(settings.candidate_prefix, "Petal_Layer");
        assert_eq!(settings.selection, DescriptorSelection::First);
        assert_eq!(settings.up_axis, UpAxis::ZUp);
        assert!(!settings.validate_before_spawn);
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let settings = PetalLightSettings::from_ron("(selection: All, order: Unordered)").unwrap();
        assert_eq!(settings.selection, DescriptorSelection::All);
        assert_eq!(settings.order, BatchOrder::Unordered);
        assert_eq!(settings.name_pattern, "Node");
        assert_eq!(settings.up_axis, UpAxis::ZUp);
    }

    #[test]
    fn pretty_ron_reloads() {
        let settings = PetalLightSettings {
            candidate_prefix: "Leaf_".to_string(),
            up_axis: UpAxis::YUp,
            validate_before_spawn: true,
            ..default()
        };
        let text = settings.to_ron().unwrap();
        assert_eq!(PetalLightSettings::from_ron(&text).unwrap(), settings);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = PetalLightSettings::from_ron("(selection: Some)").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = PetalLightSettings::load("does/not/exist.ron").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }
}
