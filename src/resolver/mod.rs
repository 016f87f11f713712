//! Name and overload resolution.
//!
//! Builds the [`Declarations`](crate::ast::module::Declarations) of a file,
//! loads the files it imports through a [`ModuleLoader`](resolver::ModuleLoader)
//! and binds every variable reference and call in its function bodies.

pub mod resolver;
pub mod static_eval;

#[cfg(test)]
mod tests;
