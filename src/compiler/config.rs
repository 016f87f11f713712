//! Build options, set from the command line and overridden by file directives.

use std::path::PathBuf;

use tracing::debug;

use crate::lexer::tokens::{Directive, DirectiveKind};

#[derive(Debug, Clone, PartialEq)]
pub struct CompilerOptions {
    /// Directory receiving IR listings and sidecars.
    pub out_build: PathBuf,
    /// Name of the executable a backend would link.
    pub out_exec: Option<String>,
    /// Analyse every file again even when its sidecar is up to date.
    pub force_recompile: bool,
    /// Read and write sidecars at all.
    pub use_cache: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            out_build: PathBuf::from("out_build"),
            out_exec: None,
            force_recompile: false,
            use_cache: true,
        }
    }
}

impl CompilerOptions {
    /// Applies `#out_build` and `#out_exec`; other directives are left to the caller.
    pub fn apply_directive(&mut self, directive: &Directive) {
        match directive.kind {
            DirectiveKind::OutBuild => {
                debug!(value = directive.value.as_str(), "out_build overridden");
                self.out_build = PathBuf::from(&directive.value);
            }
            DirectiveKind::OutExec => {
                debug!(value = directive.value.as_str(), "out_exec overridden");
                self.out_exec = Some(directive.value.clone());
            }
            DirectiveKind::Include => {}
        }
    }

    /// Where the IR listing of the module `name` goes.
    pub fn listing_path(&self, name: &str) -> PathBuf {
        self.out_build.join(format!("{}.ir", name))
    }

    /// Where the sidecar of the module `name` goes.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.out_build.join(format!("{}.ir.o", name))
    }
}
