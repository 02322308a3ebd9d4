//! Built-in effect library and the shared names contract.
//!
//! Every descriptor here writes its shader bodies against the namespaced
//! uniform names the assembler declares for it (`<id>_<name>`), plus the
//! shared globals owned by the reserved `defaults` descriptor.

use crate::descriptor::{EffectDescriptor, SourceFragment, UniformSchema, VaryingSchema};
use crate::registry::EffectRegistry;
use shaderweave_common::MAX_TRACKED_ACTORS;

pub use crate::descriptor::DEFAULTS_EFFECT;

/// Injection-point markers expected verbatim in the base templates.
pub mod points {
    pub const DECLARATIONS: &str = "//#inject declarations";
    pub const VERTEX_SETUP: &str = "//#inject vertex_setup";
    pub const VERTEX_DISPLACE: &str = "//#inject vertex_displace";
    pub const VERTEX_POST: &str = "//#inject vertex_post";
    pub const FRAGMENT_SETUP: &str = "//#inject fragment_setup";
    pub const FRAGMENT_COLOR: &str = "//#inject fragment_color";
    pub const FRAGMENT_POST: &str = "//#inject fragment_post";
}

/// Names of the shared uniforms fed by the runtime every frame. All of them
/// belong to the `defaults` descriptor and are therefore not namespaced.
pub mod shared {
    pub const TIME: &str = "time";
    pub const Y_POS: &str = "yPos";
    pub const OBJECT_SIZE: &str = "objectSize";
    pub const ACTOR_POSITIONS: &str = "actorPositions";
    pub const AUDIO_LEVEL: &str = "audioLevel";
}

/// The reserved `defaults` descriptor: shared clock/position uniforms, the
/// fixed-capacity actor and audio arrays, and the varyings every effect may
/// read. All fragments are unconditional (structural).
fn defaults() -> EffectDescriptor {
    let shared_decls = format!(
        "uniform vec3 {size};\nuniform vec4 {actors}[{cap}];\nuniform vec3 {audio};",
        size = shared::OBJECT_SIZE,
        actors = shared::ACTOR_POSITIONS,
        cap = MAX_TRACKED_ACTORS,
        audio = shared::AUDIO_LEVEL,
    );
    EffectDescriptor::new(DEFAULTS_EFFECT, "Shared Defaults")
        .uniform(shared::TIME, UniformSchema::float(0.0))
        .uniform(shared::Y_POS, UniformSchema::float(0.0))
        .varying("vWorldPosition", VaryingSchema::vec3(0.0, 0.0, 0.0))
        .varying("vUv", VaryingSchema::vec2(0.0, 0.0))
        .vertex(SourceFragment::append(points::DECLARATIONS, shared_decls.clone()).unconditional())
        .vertex(
            SourceFragment::append(
                points::VERTEX_SETUP,
                "vWorldPosition = (modelMatrix * vec4(position, 1.0)).xyz;\nvUv = uv;",
            )
            .unconditional(),
        )
        .fragment(SourceFragment::append(points::DECLARATIONS, shared_decls).unconditional())
}

fn wind() -> EffectDescriptor {
    EffectDescriptor::new("wind", "Wind Sway")
        .uniform("speed", UniformSchema::float(0.1).with_range(0.0, 10.0))
        .uniform("strength", UniformSchema::float(0.5).with_range(0.0, 2.0))
        .uniform("direction", UniformSchema::direction(0.0))
        .vertex(SourceFragment::append(
            points::VERTEX_DISPLACE,
            "float wind_sway = sin(time * wind_speed + position.x * 0.5) * wind_strength;\n\
             float wind_weight = max(position.y / max(objectSize.y, 0.001), 0.0);\n\
             transformed += wind_direction * wind_sway * wind_weight;",
        ))
}

fn bob() -> EffectDescriptor {
    EffectDescriptor::new("bob", "Idle Bob")
        .uniform("speed", UniformSchema::float(1.0).with_range(0.0, 10.0))
        .uniform("amount", UniformSchema::float(0.1).with_range(0.0, 5.0))
        .vertex(SourceFragment::append(
            points::VERTEX_DISPLACE,
            "transformed.y += sin(time * bob_speed + yPos) * bob_amount;",
        ))
}

fn ocean() -> EffectDescriptor {
    EffectDescriptor::new("ocean", "Ocean Displacement")
        .uniform("waveScale", UniformSchema::float(1.0).with_range(0.0, 10.0))
        .uniform("waveHeight", UniformSchema::float(0.25).with_range(0.0, 5.0))
        .uniform("speed", UniformSchema::float(1.0).with_range(0.0, 10.0))
        .vertex(SourceFragment::append(
            points::VERTEX_DISPLACE,
            "transformed.y += sin((position.x + time * ocean_speed) * ocean_waveScale)\n\
             \x20   * cos((position.z + time * ocean_speed) * ocean_waveScale) * ocean_waveHeight;",
        ))
}

fn fire() -> EffectDescriptor {
    EffectDescriptor::new("fire", "Procedural Fire")
        .uniform("intensity", UniformSchema::float(0.5).with_range(0.0, 5.0))
        .uniform("speed", UniformSchema::float(1.0).with_range(0.0, 10.0))
        .uniform("color", UniformSchema::color(0xff6622))
        .varying("flicker", VaryingSchema::float(0.0))
        .vertex(SourceFragment::append(
            points::VERTEX_POST,
            "fire_flicker = fract(sin(dot(vWorldPosition.xz, vec2(12.9898, 78.233))\n\
             \x20   + time * fire_speed) * 43758.5453);",
        ))
        .fragment(SourceFragment::append(
            points::FRAGMENT_COLOR,
            "float fire_falloff = 1.0 - clamp(vWorldPosition.y / max(objectSize.y, 0.001), 0.0, 1.0);\n\
             float fire_heat = fire_intensity * (0.6 + 0.4 * fire_flicker) * fire_falloff\n\
             \x20   * (1.0 + audioLevel.x * 0.5);\n\
             baseColor.rgb = mix(baseColor.rgb, fire_color, clamp(fire_heat, 0.0, 1.0));",
        ))
}

fn ice() -> EffectDescriptor {
    EffectDescriptor::new("ice", "Ice Sheen")
        .uniform("tint", UniformSchema::color(0x99ddff))
        .uniform("glint", UniformSchema::float(0.3).with_range(0.0, 1.0))
        .fragment(SourceFragment::append(
            points::FRAGMENT_COLOR,
            "float ice_sparkle = pow(fract(sin(dot(vUv, vec2(41.0, 289.0))) * 10000.0), 8.0) * ice_glint;\n\
             baseColor.rgb = mix(baseColor.rgb, ice_tint, 0.35) + vec3(ice_sparkle);",
        ))
}

fn lightning() -> EffectDescriptor {
    EffectDescriptor::new("lightning", "Lightning Flicker")
        .uniform("speed", UniformSchema::float(8.0).with_range(0.0, 20.0))
        .uniform("threshold", UniformSchema::float(0.85).with_range(0.0, 1.0))
        .uniform("color", UniformSchema::color(0xaaccff))
        .fragment(SourceFragment::append(
            points::FRAGMENT_COLOR,
            "float lightning_pulse = fract(sin(floor(time * lightning_speed) * 91.3458) * 47453.25);\n\
             if (lightning_pulse > lightning_threshold) {\n\
             \x20   baseColor.rgb += lightning_color * (lightning_pulse - lightning_threshold) * 4.0;\n\
             }",
        ))
}

fn grid() -> EffectDescriptor {
    EffectDescriptor::new("grid", "Grid Overlay")
        .uniform("scale", UniformSchema::float(8.0).with_range(1.0, 64.0))
        .uniform("lineWidth", UniformSchema::float(0.05).with_range(0.01, 0.5))
        .uniform("color", UniformSchema::color(0x00ff88))
        .fragment(SourceFragment::append(
            points::FRAGMENT_COLOR,
            "vec2 grid_cell = fract(vUv * grid_scale);\n\
             float grid_line = step(grid_cell.x, grid_lineWidth) + step(grid_cell.y, grid_lineWidth);\n\
             baseColor.rgb = mix(baseColor.rgb, grid_color, clamp(grid_line, 0.0, 1.0) * 0.8);",
        ))
}

fn gradient() -> EffectDescriptor {
    EffectDescriptor::new("gradient", "Height Gradient")
        .uniform("top", UniformSchema::color(0xffffff))
        .uniform("bottom", UniformSchema::color(0x222266))
        .fragment(SourceFragment::append(
            points::FRAGMENT_COLOR,
            "float gradient_t = clamp(vWorldPosition.y / max(objectSize.y, 0.001), 0.0, 1.0);\n\
             baseColor.rgb *= mix(gradient_bottom, gradient_top, gradient_t);",
        ))
}

fn fogofwar() -> EffectDescriptor {
    EffectDescriptor::new("fogofwar", "Fog of War Mask")
        .uniform("mask", UniformSchema::sampler())
        .uniform("density", UniformSchema::float(0.8).with_range(0.0, 1.0))
        .fragment(SourceFragment::append(
            points::FRAGMENT_POST,
            "float fogofwar_visible = texture2D(fogofwar_mask, vUv).r;\n\
             gl_FragColor.rgb *= mix(1.0 - fogofwar_density, 1.0, fogofwar_visible);",
        ))
}

/// Build and seal the registry containing the reserved defaults descriptor
/// and the built-in effect library.
pub fn standard_registry() -> EffectRegistry {
    let mut registry = EffectRegistry::new();
    let all = [
        defaults(),
        wind(),
        bob(),
        ocean(),
        fire(),
        ice(),
        lightning(),
        grid(),
        gradient(),
        fogofwar(),
    ];
    for descriptor in all {
        // Ids are distinct by construction; a clash here is a programming
        // error in this module.
        registry
            .register(descriptor)
            .unwrap_or_else(|e| panic!("built-in library: {e}"));
    }
    registry.seal();
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaderweave_common::UniformType;

    #[test]
    fn standard_registry_is_sealed_and_populated() {
        let reg = standard_registry();
        assert!(reg.is_sealed());
        assert!(reg.len() >= 10);
        assert!(reg.get(DEFAULTS_EFFECT).is_some());
        assert!(reg.get("wind").is_some());
        assert!(reg.get("fogofwar").is_some());
    }

    #[test]
    fn defaults_fragments_are_unconditional() {
        let reg = standard_registry();
        let d = reg.get(DEFAULTS_EFFECT).unwrap();
        assert!(
            d.vertex_fragments
                .iter()
                .chain(d.fragment_fragments.iter())
                .all(|f| f.unconditional)
        );
    }

    #[test]
    fn fogofwar_declares_a_sampler() {
        let reg = standard_registry();
        let d = reg.get("fogofwar").unwrap();
        assert_eq!(d.uniforms["mask"].ty, UniformType::Sampler2D);
    }

    #[test]
    fn wind_matches_documented_schema() {
        let reg = standard_registry();
        let speed = &reg.get("wind").unwrap().uniforms["speed"];
        assert_eq!(speed.range, Some((0.0, 10.0)));
    }
}
