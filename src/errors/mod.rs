//! Error types and error handling for the compiler.
//!
//! This module defines the single diagnostic type raised by every pass:
//!
//! - Error structures with source position information
//! - Specific error variants grouped by compilation phase
//! - Error formatting and display functionality
//! - Helpful error messages and suggestions
//!
//! Every pass stops at its first error, so a translation unit yields at most
//! one diagnostic.

pub mod errors;

#[cfg(test)]
mod tests;
