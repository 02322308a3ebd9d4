//! Coercion of externally stored config values into engine-native values.

use glam::Vec3;

/// Parse a `#rrggbb` (or `rrggbb`) hex color string into an RGB vector
/// with components in [0, 1]. Returns `None` for malformed input.
pub fn color_from_hex(s: &str) -> Option<Vec3> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 {
        return None;
    }
    let n = u32::from_str_radix(hex, 16).ok()?;
    Some(color_from_packed(n))
}

/// Unpack a `0xRRGGBB` integer into an RGB vector with components in [0, 1].
pub fn color_from_packed(n: u32) -> Vec3 {
    Vec3::new(
        ((n >> 16) & 0xff) as f32 / 255.0,
        ((n >> 8) & 0xff) as f32 / 255.0,
        (n & 0xff) as f32 / 255.0,
    )
}

/// Convert an angle in degrees to radians.
pub fn degrees_to_radians(degrees: f32) -> f32 {
    degrees.to_radians()
}

/// Convert a stored direction angle (degrees) into a unit direction vector in
/// the XZ plane. 0° points along +Z, 90° along +X.
pub fn direction_from_degrees(degrees: f32) -> Vec3 {
    let r = degrees_to_radians(degrees);
    Vec3::new(r.sin(), 0.0, r.cos())
}

/// Clamp a value into an optional inclusive range.
pub fn clamp_to_range(value: f32, range: Option<(f32, f32)>) -> f32 {
    match range {
        Some((min, max)) => value.clamp(min, max),
        None => value,
    }
}
