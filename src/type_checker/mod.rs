//! Type checking and inference.
//!
//! Types are sets of primitives that only ever shrink. Checking runs in two
//! passes over every function body:
//!
//! - [`type_checker`] runs each expression as a stack machine over types,
//!   resolving overloads and narrowing literals and variables as far as the
//!   expression itself allows
//! - [`completer`] forces whatever is still ambiguous into the type its
//!   context expects, or the default of its set, and binds the remaining
//!   deferred operator calls
//!
//! [`state`] holds the scope tree and variables shared with the resolver,
//! [`std`] the built-in operator and cast functions.

pub mod completer;
pub mod overload;
pub mod state;
pub mod std;
pub mod type_checker;

#[cfg(test)]
mod tests;
