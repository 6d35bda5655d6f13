use bevy::gltf::GltfExtras;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::DescriptorError;

/// Extras key holding the list of light descriptors.
pub const LIGHTS_KEY: &str = "lights";

/// A light as authored in a node's glTF extras.
///
/// Every field is optional in the source; missing keys fall back to the
/// defaults below. Fields present with the wrong JSON type are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightDescriptor {
    /// Light type token, e.g. `"PointLight"`
    #[serde(rename = "type")]
    pub kind: String,
    /// Packed `0xRRGGBB`
    #[serde(deserialize_with = "deserialize_packed_color")]
    pub color: i64,
    pub intensity: f32,
    /// Soft-shadow radius
    pub radius: f32,
    /// Decoded but not applied to the spawned light
    pub decay: f32,
    /// Local position, Y-up
    pub position: [f32; 3],
}

impl Default for LightDescriptor {
    fn default() -> Self {
        Self {
            kind: "PointLight".to_string(),
            color: 0,
            intensity: 1.0,
            radius: 0.1,
            decay: 2.0,
            position: [0.0, 0.0, 0.0],
        }
    }
}

/// Writers that only have doubles emit colors like `16746496.0`; accept those
/// as long as they are integral.
fn deserialize_packed_color<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Number::deserialize(deserializer)?;
    if let Some(int) = value.as_i64() {
        return Ok(int);
    }
    if let Some(int) = value.as_u64() {
        return Ok(int as i64);
    }
    match value.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < i64::MAX as f64 => Ok(float as i64),
        _ => Err(serde::de::Error::custom(format!(
            "color must be an integer, got {value}"
        ))),
    }
}

/// Parse the extras JSON and return the `lights` array, if there is one.
///
/// `Ok(None)` means the node carries no usable light data: the key is
/// missing, or its value is not a sequence.
fn lights_array(extras: &str) -> Result<Option<Vec<Value>>, DescriptorError> {
    let root: Value = serde_json::from_str(extras).map_err(DescriptorError::InvalidExtras)?;
    match root.get(LIGHTS_KEY) {
        Some(Value::Array(items)) => Ok(Some(items.clone())),
        _ => Ok(None),
    }
}

fn decode(index: usize, value: Value) -> Result<LightDescriptor, DescriptorError> {
    serde_json::from_value(value).map_err(|source| DescriptorError::Malformed { index, source })
}

/// Decode the first light descriptor of a node's extras.
///
/// Additional entries in the list are ignored.
pub fn extract(extras: &GltfExtras) -> Result<Option<LightDescriptor>, DescriptorError> {
    extract_str(&extras.value)
}

/// [`extract`] over raw extras JSON text.
pub fn extract_str(extras: &str) -> Result<Option<LightDescriptor>, DescriptorError> {
    let Some(items) = lights_array(extras)? else {
        return Ok(None);
    };
    let first = items.into_iter().next().ok_or(DescriptorError::EmptyList)?;
    decode(0, first).map(Some)
}

/// Decode every light descriptor of a node's extras, in list order.
pub fn extract_all(extras: &GltfExtras) -> Result<Option<Vec<LightDescriptor>>, DescriptorError> {
    extract_all_str(&extras.value)
}

/// [`extract_all`] over raw extras JSON text.
pub fn extract_all_str(extras: &str) -> Result<Option<Vec<LightDescriptor>>, DescriptorError> {
    let Some(items) = lights_array(extras)? else {
        return Ok(None);
    };
    if items.is_empty() {
        return Err(DescriptorError::EmptyList);
    }
    items
        .into_iter()
        .enumerate()
        .map(|(index, value)| decode(index, value))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}
