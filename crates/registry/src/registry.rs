use crate::descriptor::{EffectDescriptor, EffectInfo};
use crate::library::DEFAULTS_EFFECT;
use std::collections::HashMap;

/// Errors from registry population.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("effect id `{0}` is already registered")]
    DuplicateEffectId(String),
    #[error("registry is sealed; cannot register `{0}`")]
    Sealed(String),
    #[error("unknown effect id `{0}`")]
    UnknownEffect(String),
}

/// The process-wide table of effect descriptors.
///
/// Populated during startup, then sealed. Iteration order is insertion order,
/// which makes assembly deterministic (and therefore cache-key reuse sound).
#[derive(Debug, Default)]
pub struct EffectRegistry {
    effects: Vec<EffectDescriptor>,
    index: HashMap<String, usize>,
    sealed: bool,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor. Fails on a duplicate id or a sealed registry;
    /// the registry is left unchanged in either case.
    pub fn register(&mut self, descriptor: EffectDescriptor) -> Result<(), RegistryError> {
        let id = descriptor.id.as_str().to_owned();
        if self.sealed {
            return Err(RegistryError::Sealed(id));
        }
        if self.index.contains_key(&id) {
            return Err(RegistryError::DuplicateEffectId(id));
        }
        tracing::debug!(effect = %id, "registered effect");
        self.index.insert(id, self.effects.len());
        self.effects.push(descriptor);
        Ok(())
    }

    /// End the population phase. After this the registry is read-only and can
    /// be read concurrently without synchronization.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Look up a descriptor by id.
    pub fn get(&self, id: &str) -> Option<&EffectDescriptor> {
        self.index.get(id).map(|&i| &self.effects[i])
    }

    /// Look up a descriptor by id, erroring on absence.
    pub fn require(&self, id: &str) -> Result<&EffectDescriptor, RegistryError> {
        self.get(id)
            .ok_or_else(|| RegistryError::UnknownEffect(id.to_owned()))
    }

    /// All descriptors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &EffectDescriptor> {
        self.effects.iter()
    }

    /// User-configurable descriptors in insertion order (the reserved
    /// defaults descriptor is structural, not configurable).
    pub fn iter_configurable(&self) -> impl Iterator<Item = &EffectDescriptor> {
        self.effects
            .iter()
            .filter(|d| d.id.as_str() != DEFAULTS_EFFECT)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Read-only reflection for the configuration UI collaborator: ids,
    /// titles, and per-uniform schemas of every configurable effect.
    pub fn reflect(&self) -> Vec<EffectInfo> {
        self.iter_configurable()
            .map(EffectInfo::from_descriptor)
            .collect()
    }
}
