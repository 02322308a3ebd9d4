use crate::template::ProgramTemplate;
use shaderweave_registry::{
    DEFAULTS_EFFECT, EffectRegistry, SpliceMode, enabled_uniform, points,
};
use std::collections::HashSet;

/// Shader stage being assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// A recoverable per-fragment condition found during assembly. The offending
/// fragment is skipped; assembly continues for everything else.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyIssue {
    #[error("effect `{effect}`: injection point `{marker}` not found in {stage} source")]
    UnresolvedInjectionPoint {
        effect: String,
        marker: String,
        stage: Stage,
    },
    #[error("effect `{effect}`: injection point `{marker}` in {stage} source was already replaced")]
    DoubleReplace {
        effect: String,
        marker: String,
        stage: Stage,
    },
}

/// Final assembled source for both stages, plus any diagnostics collected
/// along the way. Diagnostics never block assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledProgram {
    pub vertex: String,
    pub fragment: String,
    pub diagnostics: Vec<AssemblyIssue>,
}

/// Assemble final vertex and fragment source from the sealed registry and the
/// base templates. Deterministic: same inputs yield byte-identical output.
pub fn assemble(registry: &EffectRegistry, template: &ProgramTemplate) -> AssembledProgram {
    let mut diagnostics = Vec::new();
    let vertex = assemble_stage(registry, &template.vertex, Stage::Vertex, &mut diagnostics);
    let fragment = assemble_stage(
        registry,
        &template.fragment,
        Stage::Fragment,
        &mut diagnostics,
    );
    AssembledProgram {
        vertex,
        fragment,
        diagnostics,
    }
}

fn assemble_stage(
    registry: &EffectRegistry,
    base: &str,
    stage: Stage,
    diagnostics: &mut Vec<AssemblyIssue>,
) -> String {
    let mut source = base.to_owned();
    let mut replaced: HashSet<String> = HashSet::new();

    for effect in registry.iter() {
        let fragments = match stage {
            Stage::Vertex => &effect.vertex_fragments,
            Stage::Fragment => &effect.fragment_fragments,
        };
        for fragment in fragments {
            let marker = &fragment.injection_point;
            if fragment.mode == SpliceMode::Replace && replaced.contains(marker) {
                let issue = AssemblyIssue::DoubleReplace {
                    effect: effect.id.as_str().to_owned(),
                    marker: marker.clone(),
                    stage,
                };
                tracing::warn!(%issue, "skipping fragment");
                diagnostics.push(issue);
                continue;
            }
            let Some(pos) = source.find(marker.as_str()) else {
                let issue = AssemblyIssue::UnresolvedInjectionPoint {
                    effect: effect.id.as_str().to_owned(),
                    marker: marker.clone(),
                    stage,
                };
                tracing::warn!(%issue, "skipping fragment");
                diagnostics.push(issue);
                continue;
            };

            let body = if fragment.unconditional {
                fragment.body.clone()
            } else {
                format!(
                    "if ({}) {{\n{}\n}}",
                    enabled_uniform(effect.id.as_str()),
                    fragment.body
                )
            };
            match fragment.mode {
                SpliceMode::Append => {
                    source.insert_str(pos + marker.len(), &format!("\n{body}"));
                }
                SpliceMode::Prepend => {
                    source.insert_str(pos, &format!("{body}\n"));
                }
                SpliceMode::Replace => {
                    source.replace_range(pos..pos + marker.len(), &body);
                    replaced.insert(marker.clone());
                }
            }
        }
    }

    // Varying defaults run before any effect write: inserted right after the
    // setup marker, which puts them ahead of everything spliced above.
    if stage == Stage::Vertex {
        let inits = varying_initializers(registry);
        if !inits.is_empty() {
            if let Some(pos) = source.find(points::VERTEX_SETUP) {
                source.insert_str(pos + points::VERTEX_SETUP.len(), &format!("\n{inits}"));
            }
        }
    }

    let mut out = stage_declarations(registry, stage);
    out.push('\n');
    out.push_str(&source);
    out
}

/// Uniform and varying declarations for one stage, in registry order. Every
/// effect except defaults also gets its enable-guard uniform.
fn stage_declarations(registry: &EffectRegistry, _stage: Stage) -> String {
    let mut out = String::new();
    for effect in registry.iter() {
        if effect.id.as_str() != DEFAULTS_EFFECT {
            out.push_str(&format!(
                "uniform bool {};\n",
                enabled_uniform(effect.id.as_str())
            ));
        }
        for (name, schema) in &effect.uniforms {
            out.push_str(&format!(
                "uniform {} {};\n",
                schema.ty.glsl_name(),
                effect.qualified(name)
            ));
        }
        for (name, schema) in &effect.varyings {
            out.push_str(&format!(
                "varying {} {};\n",
                schema.ty.glsl_name(),
                effect.qualified(name)
            ));
        }
    }
    out
}

fn varying_initializers(registry: &EffectRegistry) -> String {
    let mut out = String::new();
    for effect in registry.iter() {
        for (name, schema) in &effect.varyings {
            out.push_str(&format!(
                "{} = {};\n",
                effect.qualified(name),
                schema.glsl_default()
            ));
        }
    }
    out
}
