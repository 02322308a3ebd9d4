use crate::frame::DynamicFrameData;
use crate::handle::ProgramHandle;
use glam::Vec3;
use shaderweave_assemble::{AssembledProgram, ProgramTemplate, assemble};
use shaderweave_bind::{
    ProgramCacheKey, TextureRequest, UniformSetKey, bind_uniforms, resolve_config,
};
use shaderweave_common::{HandleId, ObjectId, RequestId, TextureHandle, UniformValue};
use shaderweave_registry::{EffectInfo, EffectRegistry, shared};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// What the scene-graph collaborator hands over when attaching an object:
/// its id, current world position, and bounding-box-derived local size.
#[derive(Debug, Clone, Copy)]
pub struct ObjectBinding {
    pub object: ObjectId,
    pub position: Vec3,
    pub size: Vec3,
}

/// Scene-graph collaborator interface: world positions of attached objects,
/// queried once per frame per handle.
pub trait WorldPositions {
    fn position_of(&self, object: ObjectId) -> Option<Vec3>;
}

struct PendingTexture {
    handle: HandleId,
    uniform: String,
}

/// The composition facade: owns the sealed registry, the program cache, and
/// the active handle set, and runs the per-frame uniform refresh.
///
/// Single-threaded by design; the render-loop driver calls `update_all` once
/// per frame, and asynchronous texture completions are delivered through
/// `deliver_texture` on the same thread.
pub struct EffectComposer {
    registry: EffectRegistry,
    template: ProgramTemplate,
    /// Compiled-source cache, keyed by structural identity (enabled set).
    programs: HashMap<ProgramCacheKey, Arc<AssembledProgram>>,
    /// Active handles. BTreeMap so the per-frame pass has a stable order.
    handles: BTreeMap<HandleId, ProgramHandle>,
    /// Whole-handle sharing for fully identical configurations.
    shared_handles: HashMap<UniformSetKey, HandleId>,
    handle_keys: HashMap<HandleId, UniformSetKey>,
    pending_textures: HashMap<RequestId, PendingTexture>,
    outgoing_requests: Vec<TextureRequest>,
}

impl EffectComposer {
    /// Build a composer over a populated registry and base templates. Seals
    /// the registry if the caller has not already done so.
    pub fn new(mut registry: EffectRegistry, template: ProgramTemplate) -> Self {
        registry.seal();
        Self {
            registry,
            template,
            programs: HashMap::new(),
            handles: BTreeMap::new(),
            shared_handles: HashMap::new(),
            handle_keys: HashMap::new(),
            pending_textures: HashMap::new(),
            outgoing_requests: Vec::new(),
        }
    }

    /// Composer over the built-in effect library and standard templates.
    pub fn standard() -> Self {
        Self::new(
            shaderweave_registry::standard_registry(),
            ProgramTemplate::standard(),
        )
    }

    /// Attach an object with its persisted configuration (as the external
    /// store supplies it). Reuses an existing handle for a fully identical
    /// configuration, and an existing compiled program for an identical
    /// enabled-effect set; otherwise assembles and binds fresh state.
    pub fn attach(
        &mut self,
        binding: &ObjectBinding,
        stored: Option<&serde_json::Value>,
    ) -> HandleId {
        let config = resolve_config(&self.registry, stored);
        let structural = ProgramCacheKey::from_config(&config);
        let identity = UniformSetKey::from_config(&config);

        if let Some(&existing) = self.shared_handles.get(&identity) {
            if let Some(handle) = self.handles.get_mut(&existing) {
                handle.add_owner(binding.object);
                tracing::debug!(handle = ?existing, object = ?binding.object,
                    "sharing handle for identical configuration");
                return existing;
            }
        }

        let program = self
            .programs
            .entry(structural)
            .or_insert_with(|| {
                tracing::debug!(key = %structural, "assembling program");
                Arc::new(assemble(&self.registry, &self.template))
            })
            .clone();

        let (mut uniforms, requests) = bind_uniforms(&self.registry, &config);
        uniforms.set(shared::OBJECT_SIZE, UniformValue::Vec3(binding.size));
        uniforms.set(shared::Y_POS, UniformValue::Float(binding.position.y));

        let handle = ProgramHandle::new(structural, program, uniforms, binding.object);
        let id = handle.id;
        for request in requests {
            self.pending_textures.insert(
                request.request,
                PendingTexture {
                    handle: id,
                    uniform: request.uniform.clone(),
                },
            );
            self.outgoing_requests.push(request);
        }
        self.shared_handles.insert(identity, id);
        self.handle_keys.insert(id, identity);
        self.handles.insert(id, handle);
        id
    }

    /// Detach one owning object. When the last owner detaches the handle is
    /// destroyed and leaves the active set immediately; late texture
    /// resolutions for it become no-ops.
    pub fn detach(&mut self, handle: HandleId, object: ObjectId) {
        let Some(entry) = self.handles.get_mut(&handle) else {
            return;
        };
        if !entry.remove_owner(object) {
            return;
        }
        if let Some(mut destroyed) = self.handles.remove(&handle) {
            destroyed.destroy();
        }
        if let Some(key) = self.handle_keys.remove(&handle) {
            self.shared_handles.remove(&key);
        }
        tracing::debug!(handle = ?handle, "handle destroyed");
    }

    /// Per-frame update: refresh clock, per-object reference position, the
    /// tracked-actor array (truncated at capacity), and the audio envelope on
    /// every Active handle, all from one frame-data snapshot.
    pub fn update_all(&mut self, frame: &DynamicFrameData, positions: &impl WorldPositions) {
        let _span = tracing::trace_span!("update_all", handles = self.handles.len()).entered();
        if frame.actors.len() > shaderweave_common::MAX_TRACKED_ACTORS {
            tracing::trace!(
                supplied = frame.actors.len(),
                capacity = shaderweave_common::MAX_TRACKED_ACTORS,
                "dropping actors beyond capacity"
            );
        }
        let actor_uniform = frame.actor_uniform();
        for handle in self.handles.values_mut() {
            handle
                .uniforms
                .set(shared::TIME, UniformValue::Float(frame.clock));
            if let Some(owner) = handle.primary_owner() {
                if let Some(position) = positions.position_of(owner) {
                    handle
                        .uniforms
                        .set(shared::Y_POS, UniformValue::Float(position.y));
                }
            }
            handle.uniforms.set(
                shared::ACTOR_POSITIONS,
                UniformValue::Vec4Array(actor_uniform.clone()),
            );
            handle
                .uniforms
                .set(shared::AUDIO_LEVEL, UniformValue::Vec3(frame.audio));
        }
    }

    /// Texture-load completion entry point, called by the host from its
    /// asynchronous I/O machinery. Safe to call after the target handle was
    /// destroyed; a failed load (`None`) leaves the sampler unset.
    pub fn deliver_texture(&mut self, request: RequestId, texture: Option<TextureHandle>) {
        let Some(pending) = self.pending_textures.remove(&request) else {
            return;
        };
        let Some(handle) = self.handles.get_mut(&pending.handle) else {
            tracing::debug!(uniform = %pending.uniform,
                "texture resolved after handle destruction; dropping");
            return;
        };
        match texture {
            Some(tex) => {
                handle
                    .uniforms
                    .set(&pending.uniform, UniformValue::Texture(Some(tex)));
            }
            None => {
                tracing::warn!(uniform = %pending.uniform,
                    "texture load failed; effect stays inert");
            }
        }
    }

    /// Drain the texture requests queued since the last call; the asset
    /// loader collaborator takes ownership of loading them.
    pub fn take_texture_requests(&mut self) -> Vec<TextureRequest> {
        std::mem::take(&mut self.outgoing_requests)
    }

    /// Registry reflection for the configuration UI collaborator.
    pub fn effects(&self) -> Vec<EffectInfo> {
        self.registry.reflect()
    }

    pub fn handle(&self, id: HandleId) -> Option<&ProgramHandle> {
        self.handles.get(&id)
    }

    /// Number of Active handles.
    pub fn active_count(&self) -> usize {
        self.handles.len()
    }

    /// Number of distinct compiled programs in the cache.
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::TrackedActor;
    use serde_json::json;
    use shaderweave_common::MAX_TRACKED_ACTORS;

    struct FixedPositions(Vec3);

    impl WorldPositions for FixedPositions {
        fn position_of(&self, _object: ObjectId) -> Option<Vec3> {
            Some(self.0)
        }
    }

    fn binding() -> ObjectBinding {
        ObjectBinding {
            object: ObjectId::new(),
            position: Vec3::new(0.0, 2.0, 0.0),
            size: Vec3::ONE,
        }
    }

    fn frame(clock: f32) -> DynamicFrameData {
        DynamicFrameData {
            clock,
            actors: vec![TrackedActor {
                position: Vec3::new(1.0, 0.0, 1.0),
                size: 0.5,
            }],
            audio: Vec3::new(0.3, 0.2, 0.1),
        }
    }

    #[test]
    fn attach_binds_object_locals_and_config() {
        let mut composer = EffectComposer::standard();
        let handle = composer.attach(
            &binding(),
            Some(&json!({ "wind": { "enabled": true, "speed": 2.0 } })),
        );
        let h = composer.handle(handle).unwrap();
        assert_eq!(h.uniforms.get("wind_enabled"), Some(&UniformValue::Bool(true)));
        assert_eq!(h.uniforms.get("wind_speed"), Some(&UniformValue::Float(2.0)));
        assert_eq!(h.uniforms.get(shared::Y_POS), Some(&UniformValue::Float(2.0)));
        assert_eq!(
            h.uniforms.get(shared::OBJECT_SIZE),
            Some(&UniformValue::Vec3(Vec3::ONE))
        );
        assert!(h.diagnostics().is_empty());
    }

    #[test]
    fn identical_enabled_sets_share_one_compiled_program() {
        let mut composer = EffectComposer::standard();
        let a = composer.attach(
            &binding(),
            Some(&json!({ "wind": { "enabled": true, "speed": 1.0 } })),
        );
        let b = composer.attach(
            &binding(),
            Some(&json!({ "wind": { "enabled": true, "speed": 9.0 } })),
        );
        // Different overrides: distinct handles and uniform storage, but the
        // same compiled program object.
        assert_ne!(a, b);
        assert_eq!(composer.program_count(), 1);
        let pa = Arc::as_ptr(&composer.handle(a).unwrap().program);
        let pb = Arc::as_ptr(&composer.handle(b).unwrap().program);
        assert_eq!(pa, pb);
        // Mutating one handle's uniforms never affects the other.
        assert_ne!(
            composer.handle(a).unwrap().uniforms.get("wind_speed"),
            composer.handle(b).unwrap().uniforms.get("wind_speed")
        );
    }

    #[test]
    fn fully_identical_configs_share_one_handle() {
        let mut composer = EffectComposer::standard();
        let stored = json!({ "grid": { "enabled": true, "scale": 4.0 } });
        let a = composer.attach(&binding(), Some(&stored));
        let b = composer.attach(&binding(), Some(&stored));
        assert_eq!(a, b);
        assert_eq!(composer.handle(a).unwrap().ref_count(), 2);
        assert_eq!(composer.active_count(), 1);
    }

    #[test]
    fn disabled_effect_is_equivalent_to_omitted() {
        let mut composer = EffectComposer::standard();
        let with_disabled = composer.attach(
            &binding(),
            Some(&json!({
                "wind": { "enabled": true },
                "fire": { "enabled": false },
            })),
        );
        let omitted = composer.attach(
            &binding(),
            Some(&json!({ "wind": { "enabled": true } })),
        );
        let a = composer.handle(with_disabled).unwrap();
        let b = composer.handle(omitted).unwrap();
        // Same structural key, same source text, fire inert in both.
        assert_eq!(a.cache_key, b.cache_key);
        assert_eq!(a.program.vertex, b.program.vertex);
        assert_eq!(a.program.fragment, b.program.fragment);
        assert_eq!(a.uniforms.get("fire_enabled"), Some(&UniformValue::Bool(false)));
        assert_eq!(b.uniforms.get("fire_enabled"), Some(&UniformValue::Bool(false)));
    }

    #[test]
    fn varying_fire_overrides_while_disabled_changes_nothing_observable() {
        let mut composer = EffectComposer::standard();
        let a = composer.attach(
            &binding(),
            Some(&json!({ "fire": { "enabled": false, "intensity": 4.5 } })),
        );
        let b = composer.attach(&binding(), None);
        let ha = composer.handle(a).unwrap();
        let hb = composer.handle(b).unwrap();
        assert_eq!(ha.cache_key, hb.cache_key);
        assert_eq!(ha.program.fragment, hb.program.fragment);
        // The override is bound but gated off; every fire read in the source
        // sits inside the enable guard.
        assert_eq!(ha.uniforms.get("fire_enabled"), Some(&UniformValue::Bool(false)));
        assert!(ha.program.fragment.contains("if (fire_enabled) {"));
    }

    #[test]
    fn update_all_refreshes_shared_uniforms() {
        let mut composer = EffectComposer::standard();
        let handle = composer.attach(&binding(), None);
        composer.update_all(&frame(12.5), &FixedPositions(Vec3::new(0.0, 7.0, 0.0)));
        let h = composer.handle(handle).unwrap();
        assert_eq!(h.uniforms.get(shared::TIME), Some(&UniformValue::Float(12.5)));
        assert_eq!(h.uniforms.get(shared::Y_POS), Some(&UniformValue::Float(7.0)));
        assert_eq!(
            h.uniforms.get(shared::AUDIO_LEVEL),
            Some(&UniformValue::Vec3(Vec3::new(0.3, 0.2, 0.1)))
        );
    }

    #[test]
    fn actor_overflow_is_truncated_not_an_error() {
        let mut composer = EffectComposer::standard();
        let handle = composer.attach(&binding(), None);
        let mut data = frame(1.0);
        data.actors = (0..MAX_TRACKED_ACTORS + 10)
            .map(|i| TrackedActor {
                position: Vec3::new(i as f32, 0.0, 0.0),
                size: 1.0,
            })
            .collect();
        composer.update_all(&data, &FixedPositions(Vec3::ZERO));
        let h = composer.handle(handle).unwrap();
        let Some(UniformValue::Vec4Array(actors)) = h.uniforms.get(shared::ACTOR_POSITIONS)
        else {
            panic!("actor array not bound");
        };
        assert_eq!(actors.len(), MAX_TRACKED_ACTORS);
        assert_eq!(actors[MAX_TRACKED_ACTORS - 1].x, (MAX_TRACKED_ACTORS - 1) as f32);
    }

    #[test]
    fn texture_resolution_after_destruction_is_a_noop() {
        let mut composer = EffectComposer::standard();
        let object = ObjectId::new();
        let handle = composer.attach(
            &ObjectBinding {
                object,
                position: Vec3::ZERO,
                size: Vec3::ONE,
            },
            Some(&json!({ "fogofwar": { "enabled": true, "mask": "masks/fog.png" } })),
        );
        let requests = composer.take_texture_requests();
        assert_eq!(requests.len(), 1);

        composer.detach(handle, object);
        assert_eq!(composer.active_count(), 0);

        // Late arrival: must not mutate anything or panic.
        composer.deliver_texture(requests[0].request, Some(TextureHandle(7)));
        assert_eq!(composer.active_count(), 0);
    }

    #[test]
    fn texture_resolution_fills_the_pending_slot() {
        let mut composer = EffectComposer::standard();
        let handle = composer.attach(
            &binding(),
            Some(&json!({ "fogofwar": { "enabled": true, "mask": "masks/fog.png" } })),
        );
        let requests = composer.take_texture_requests();
        composer.deliver_texture(requests[0].request, Some(TextureHandle(42)));
        let h = composer.handle(handle).unwrap();
        assert_eq!(
            h.uniforms.get("fogofwar_mask"),
            Some(&UniformValue::Texture(Some(TextureHandle(42))))
        );
    }

    #[test]
    fn failed_texture_load_leaves_slot_unset() {
        let mut composer = EffectComposer::standard();
        let handle = composer.attach(
            &binding(),
            Some(&json!({ "fogofwar": { "enabled": true, "mask": "masks/missing.png" } })),
        );
        let requests = composer.take_texture_requests();
        composer.deliver_texture(requests[0].request, None);
        let h = composer.handle(handle).unwrap();
        assert_eq!(h.uniforms.get("fogofwar_mask"), Some(&UniformValue::Texture(None)));
    }

    #[test]
    fn detach_keeps_shared_handle_alive_until_last_owner() {
        let mut composer = EffectComposer::standard();
        let stored = json!({ "bob": { "enabled": true } });
        let first = ObjectId::new();
        let second = ObjectId::new();
        let handle = composer.attach(
            &ObjectBinding {
                object: first,
                position: Vec3::ZERO,
                size: Vec3::ONE,
            },
            Some(&stored),
        );
        let same = composer.attach(
            &ObjectBinding {
                object: second,
                position: Vec3::ZERO,
                size: Vec3::ONE,
            },
            Some(&stored),
        );
        assert_eq!(handle, same);

        composer.detach(handle, first);
        assert_eq!(composer.active_count(), 1);
        composer.detach(handle, second);
        assert_eq!(composer.active_count(), 0);
    }

    #[test]
    fn reflection_exposes_configurable_effects() {
        let composer = EffectComposer::standard();
        let infos = composer.effects();
        assert!(infos.iter().any(|e| e.id.as_str() == "wind"));
        assert!(infos.iter().all(|e| e.id.as_str() != "defaults"));
    }
}
