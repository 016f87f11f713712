/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - types: The lattice type representation, struct definitions and constant values
/// - expressions: Flattened postfix expressions and their tokens
/// - statements: Blocks and statement kinds
/// - items: Top-level items as parsed (functions, imports, globals, structs, submodules)
/// - module: Resolved declarations and the analysed module handed to code generation
pub mod expressions;
pub mod items;
pub mod module;
pub mod statements;
pub mod types;
