use glam::{Vec3, Vec4};
use shaderweave_bind::UniformBlock;
use shaderweave_common::{MAX_TRACKED_ACTORS, UniformValue};
use shaderweave_registry::shared;

/// One tracked dynamic actor: world position plus a normalized size used to
/// scale effect magnitude around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedActor {
    pub position: Vec3,
    pub size: f32,
}

/// Transient per-frame inputs supplied by the render-loop driver. Rebuilt
/// every frame; passed by reference into `EffectComposer::update_all`.
#[derive(Debug, Clone, Default)]
pub struct DynamicFrameData {
    /// Monotonic clock in seconds.
    pub clock: f32,
    /// Dynamic actors; entries beyond `MAX_TRACKED_ACTORS` are dropped.
    pub actors: Vec<TrackedActor>,
    /// Audio envelope: bass, mid, treble in [0, 1].
    pub audio: Vec3,
}

impl DynamicFrameData {
    /// The actor array as it is reflected into uniform state: xyz position,
    /// w size, truncated at capacity and zero-padded to it.
    pub fn actor_uniform(&self) -> Vec<Vec4> {
        let mut out: Vec<Vec4> = self
            .actors
            .iter()
            .take(MAX_TRACKED_ACTORS)
            .map(|a| Vec4::new(a.position.x, a.position.y, a.position.z, a.size))
            .collect();
        out.resize(MAX_TRACKED_ACTORS, Vec4::ZERO);
        out
    }
}

/// GPU-uploadable layout of the shared per-frame uniforms. The host copies
/// this into its uniform buffer; field order matches the declarations the
/// assembler emits for the defaults descriptor.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedFrameUniforms {
    pub clock: f32,
    pub y_pos: f32,
    pub _pad: [f32; 2],
    pub actors: [[f32; 4]; MAX_TRACKED_ACTORS],
    /// xyz = audio envelope, w unused (vec3 std140 padding).
    pub audio: [f32; 4],
}

impl PackedFrameUniforms {
    /// Snapshot the shared uniforms out of a handle's uniform block. Missing
    /// entries pack as zero (a freshly bound handle before its first frame).
    pub fn from_block(block: &UniformBlock) -> Self {
        let float = |name: &str| match block.get(name) {
            Some(UniformValue::Float(f)) => *f,
            _ => 0.0,
        };
        let mut actors = [[0.0f32; 4]; MAX_TRACKED_ACTORS];
        if let Some(UniformValue::Vec4Array(list)) = block.get(shared::ACTOR_POSITIONS) {
            for (slot, v) in actors.iter_mut().zip(list.iter()) {
                *slot = v.to_array();
            }
        }
        let audio = match block.get(shared::AUDIO_LEVEL) {
            Some(UniformValue::Vec3(v)) => [v.x, v.y, v.z, 0.0],
            _ => [0.0; 4],
        };
        Self {
            clock: float(shared::TIME),
            y_pos: float(shared::Y_POS),
            _pad: [0.0; 2],
            actors,
            audio,
        }
    }
}
