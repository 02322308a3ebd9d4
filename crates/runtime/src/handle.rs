use shaderweave_assemble::{AssembledProgram, AssemblyIssue};
use shaderweave_bind::{ProgramCacheKey, UniformBlock};
use shaderweave_common::{HandleId, ObjectId};
use std::sync::Arc;

/// Live state bound to one or more mesh instances sharing an identical
/// configuration: the compiled-source reference, the resolved uniform value
/// map, owners, and a reference count.
///
/// Lifecycle: Active from creation until the last owner detaches, then
/// Destroyed. A destroyed handle never updates uniforms again.
#[derive(Debug, Clone)]
pub struct ProgramHandle {
    pub id: HandleId,
    pub cache_key: ProgramCacheKey,
    pub program: Arc<AssembledProgram>,
    pub uniforms: UniformBlock,
    owners: Vec<ObjectId>,
    is_destroyed: bool,
}

impl ProgramHandle {
    pub fn new(
        cache_key: ProgramCacheKey,
        program: Arc<AssembledProgram>,
        uniforms: UniformBlock,
        owner: ObjectId,
    ) -> Self {
        Self {
            id: HandleId::new(),
            cache_key,
            program,
            uniforms,
            owners: vec![owner],
            is_destroyed: false,
        }
    }

    /// Diagnostics collected while the handle's program was assembled.
    pub fn diagnostics(&self) -> &[AssemblyIssue] {
        &self.program.diagnostics
    }

    pub fn ref_count(&self) -> usize {
        self.owners.len()
    }

    pub fn is_destroyed(&self) -> bool {
        self.is_destroyed
    }

    /// The owner whose world position drives the per-object uniforms.
    pub fn primary_owner(&self) -> Option<ObjectId> {
        self.owners.first().copied()
    }

    pub fn add_owner(&mut self, owner: ObjectId) {
        self.owners.push(owner);
    }

    /// Remove one owner. Returns true when no owners remain (the caller is
    /// expected to destroy the handle at that point).
    pub fn remove_owner(&mut self, owner: ObjectId) -> bool {
        if let Some(i) = self.owners.iter().position(|o| *o == owner) {
            self.owners.remove(i);
        }
        self.owners.is_empty()
    }

    pub fn destroy(&mut self) {
        self.is_destroyed = true;
    }
}
