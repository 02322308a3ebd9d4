//! Runtime: live program handles, per-frame uniform refresh, and the
//! `EffectComposer` facade the scene-graph collaborator talks to.
//!
//! # Invariants
//! - The update loop is a single-threaded sequential pass; all Active handles
//!   in one frame see the same `DynamicFrameData` snapshot.
//! - A destroyed handle leaves the active set the same frame and is never
//!   updated again, even by late texture resolutions.
//! - Only the binder and the update loop mutate a handle's uniform map.

mod composer;
mod frame;
mod handle;

pub use composer::{EffectComposer, ObjectBinding, WorldPositions};
pub use frame::{DynamicFrameData, PackedFrameUniforms, TrackedActor};
pub use handle::ProgramHandle;

pub fn crate_info() -> &'static str {
    "shaderweave-runtime v0.1.0"
}
