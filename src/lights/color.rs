use bevy::prelude::*;

/// Split a packed `0xRRGGBB` value into its three 8-bit channels.
///
/// Bits above the low 24 are discarded by the masks.
pub fn unpack_channels(color: i64) -> [u8; 3] {
    [
        ((color >> 16) & 0xFF) as u8,
        ((color >> 8) & 0xFF) as u8,
        (color & 0xFF) as u8,
    ]
}

/// Packed color to normalized RGB on the 1/255 grid. No gamma is applied.
pub fn unpack_rgb(color: i64) -> [f32; 3] {
    unpack_channels(color).map(|channel| channel as f32 / 255.0)
}

/// Inverse of [`unpack_rgb`] for values on the 1/255 grid.
pub fn pack_rgb(rgb: [f32; 3]) -> u32 {
    let [r, g, b] = rgb.map(|channel| (channel * 255.0).round().clamp(0.0, 255.0) as u32);
    (r << 16) | (g << 8) | b
}

/// Packed color as a Bevy color, channels taken as-is.
pub fn unpack_color(color: i64) -> Color {
    let [r, g, b] = unpack_rgb(color);
    Color::linear_rgb(r, g, b)
}
