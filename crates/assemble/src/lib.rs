//! Shader Assembler: builds final vertex/fragment source text from the base
//! templates and every registered effect's fragments.
//!
//! # Invariants
//! - Assembly is deterministic: same registry + template yields byte-identical
//!   output (this is what makes structural cache-key reuse sound).
//! - Assembly never fails hard; broken fragments are skipped and reported as
//!   diagnostics so the rest of the scene still renders.

mod assembler;
pub mod template;

pub use assembler::{AssembledProgram, AssemblyIssue, Stage, assemble};
pub use template::ProgramTemplate;

pub fn crate_info() -> &'static str {
    "shaderweave-assemble v0.1.0"
}
