//! Compilation driver.
//!
//! This module ties the passes together and manages a build:
//!
//! - The per-file analysis pipeline and the multi-file [`compiler::Compiler`]
//! - Build options and the directives that override them
//! - The textual IR listing of an analysed module
//! - The sidecar that lets a file be imported without analysing it again

pub mod artifact;
pub mod compiler;
pub mod config;
pub mod listing;

#[cfg(test)]
mod tests;
