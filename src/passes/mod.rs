//! Syntax tree rewrites and control-flow checks run before name resolution.
//!
//! - [`circuiter`] lowers `&&`/`||` with side effects into conditionals
//! - [`drops`] hoists `if` expressions into statements
//! - [`return_checker`] rejects unreachable code and adds implicit returns
//! - [`loop_checker`] validates `break`/`continue` depths once scopes exist

pub mod circuiter;
pub mod drops;
pub mod loop_checker;
pub mod return_checker;
