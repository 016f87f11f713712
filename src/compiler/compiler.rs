//! Multi-file compilation driver.
//!
//! The [`Compiler`] owns every source file of a build. The root file and the
//! files it pulls in through `#include` are registered first, then analysed in
//! order; a file imported by another one is analysed on demand, before the
//! importer continues. Every file passes through the same pipeline:
//!
//! 1. lexing and parsing
//! 2. short-circuit lowering and if-drops
//! 3. return checking and implicit returns
//! 4. name resolution
//! 5. loop checking
//! 6. type checking and completion
//! 7. a final check that the module is ready for code generation
//!
//! Each analysed file leaves an IR listing and a sidecar in the build
//! directory. A file whose sidecar is newer than its source is not analysed
//! again; its public interface is read back from the sidecar instead.

use std::{
    fs,
    path::{Path, PathBuf},
    rc::Rc,
    time::SystemTime,
};

use tracing::{debug, info, info_span, warn};

use crate::{
    ast::module::{Declarations, Module},
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::tokenize,
        tokens::{DirectiveKind, Lexed},
    },
    parser::parser::parse,
    passes::{
        circuiter::shorten, drops::create_drops, loop_checker::check_loops,
        return_checker::check_returns,
    },
    resolver::resolver::{resolve, ModuleLoader},
    type_checker::{
        completer::{complete, verify},
        std::Std,
        type_checker::type_check,
    },
    Position,
};

use super::{artifact::Artifact, config::CompilerOptions, listing};

/// Runs the whole analysis pipeline over one file's source.
///
/// # Arguments
///
/// * `source` - The file contents
/// * `file` - The file name used in diagnostics
/// * `name` - The module name, prefix of every mangled name
/// * `std` - The built-in operators
/// * `loader` - Where imports of other modules are looked up
pub fn analyse(
    source: String,
    file: &str,
    name: &str,
    std: &Std,
    loader: &mut dyn ModuleLoader,
) -> Result<Module, Error> {
    let lexed = tokenize(source, Some(file.to_string()))?;
    analyse_lexed(lexed, name, std, loader)
}

/// Runs the pipeline from parsing onwards over an already lexed file.
pub fn analyse_lexed(
    lexed: Lexed,
    name: &str,
    std: &Std,
    loader: &mut dyn ModuleLoader,
) -> Result<Module, Error> {
    let mut ast = parse(lexed, name)?;

    shorten(&mut ast);
    create_drops(&mut ast)?;
    check_returns(&mut ast)?;

    let mut module = resolve(ast, std, loader)?;

    check_loops(&module.ast, &mut module.state)?;
    type_check(&mut module, std)?;
    complete(&mut module, std)?;
    verify(&module)?;

    Ok(module)
}

fn file_position(path: &Path) -> Position {
    Position::new(0, 0, Rc::new(path.display().to_string()))
}

fn io_error(path: &Path, error: std::io::Error) -> Error {
    Error::new(
        ErrorImpl::FileReadError {
            path: path.display().to_string(),
            message: error.to_string(),
        },
        file_position(path),
    )
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Module name of the file at `path`: its stem, which must be an identifier.
pub fn module_name(path: &Path) -> Result<String, Error> {
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();

    if !is_identifier(&name) {
        return Err(Error::new(
            ErrorImpl::InvalidModuleName { name },
            file_position(path),
        ));
    }

    Ok(name)
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Ready,
    InProgress,
    Finished,
}

#[derive(Debug)]
pub struct File {
    pub name: String,
    pub path: PathBuf,
    pub state: FileState,
    /// File names from `#include` directives, relative to this file.
    pub includes: Vec<String>,
    /// The analysed module, `None` until analysed or when read from a sidecar.
    pub module: Option<Module>,
    /// What importers of this file see.
    pub exports: Option<Rc<Declarations>>,
    pub from_cache: bool,
    lexed: Option<Lexed>,
}

#[derive(Debug)]
pub struct Compiler {
    pub options: CompilerOptions,
    std: Rc<Std>,
    files: Vec<File>,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Compiler {
            options,
            std: Rc::new(Std::new()),
            files: vec![],
        }
    }

    pub fn files(&self) -> &[File] {
        &self.files
    }

    pub fn file(&self, name: &str) -> Option<&File> {
        self.files.iter().find(|file| file.name == name)
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.files.iter().position(|file| file.name == name)
    }

    fn sidecar_is_fresh(&self, path: &Path, name: &str) -> bool {
        if !self.options.use_cache || self.options.force_recompile {
            return false;
        }

        match (modified(path), modified(&self.options.artifact_path(name))) {
            (Some(source), Some(artifact)) => source <= artifact,
            _ => false,
        }
    }

    /// Registers the file at `path` and, recursively, the files it includes.
    pub fn add_file(&mut self, path: &Path) -> Result<(), Error> {
        let name = module_name(path)?;
        if self.find(&name).is_some() {
            return Ok(());
        }

        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        if self.sidecar_is_fresh(path, &name) {
            match self.load_sidecar(path, &name) {
                Ok(includes) => {
                    for include in includes {
                        self.add_file(&dir.join(include))?;
                    }
                    return Ok(());
                }
                Err(error) => warn!(file = name.as_str(), %error, "ignoring unreadable sidecar"),
            }
        }

        let source = fs::read_to_string(path).map_err(|error| io_error(path, error))?;
        let lexed = tokenize(source, Some(path.display().to_string()))?;

        let mut includes = vec![];
        for directive in &lexed.directives {
            match directive.kind {
                DirectiveKind::Include => includes.push(directive.value.clone()),
                _ => self.options.apply_directive(directive),
            }
        }

        debug!(file = name.as_str(), includes = includes.len(), "file registered");
        self.files.push(File {
            name,
            path: path.to_path_buf(),
            state: FileState::Ready,
            includes: includes.clone(),
            module: None,
            exports: None,
            from_cache: false,
            lexed: Some(lexed),
        });

        for include in includes {
            self.add_file(&dir.join(include))?;
        }

        Ok(())
    }

    /// Reads the sidecar of `name`, registering the file as finished. Returns its includes.
    fn load_sidecar(&mut self, path: &Path, name: &str) -> Result<Vec<String>, Error> {
        let artifact_path = self.options.artifact_path(name);
        let bytes = fs::read(&artifact_path).map_err(|error| io_error(&artifact_path, error))?;

        let artifact = Artifact::from_bytes(&bytes)
            .and_then(|artifact| Ok((artifact.to_declarations(name)?, artifact)))
            .map_err(|error| Error::new(error, file_position(&artifact_path)));
        let (decls, artifact) = artifact?;

        let listing_path = self.options.listing_path(name);
        fs::write(&listing_path, &artifact.ir).map_err(|error| io_error(&listing_path, error))?;

        info!(file = name, "loaded from sidecar");
        self.files.push(File {
            name: name.to_string(),
            path: path.to_path_buf(),
            state: FileState::Finished,
            includes: artifact.includes.clone(),
            module: None,
            exports: Some(Rc::new(decls)),
            from_cache: true,
            lexed: None,
        });

        Ok(artifact.includes)
    }

    /// Analyses every registered file that is not analysed yet.
    pub fn compile_all(&mut self) -> Result<(), Error> {
        for index in 0..self.files.len() {
            self.compile_file(index)?;
        }

        Ok(())
    }

    fn compile_file(&mut self, index: usize) -> Result<(), Error> {
        if self.files[index].state != FileState::Ready {
            return Ok(());
        }

        let name = self.files[index].name.clone();
        let _span = info_span!("pipeline.file", file = name.as_str()).entered();

        self.files[index].state = FileState::InProgress;
        let Some(lexed) = self.files[index].lexed.take() else {
            self.files[index].state = FileState::Finished;
            return Ok(());
        };

        let std = Rc::clone(&self.std);
        let module = analyse_lexed(lexed, &name, &std, self)?;

        self.write_outputs(&self.files[index], &module)?;

        let file = &mut self.files[index];
        file.exports = Some(Rc::clone(&module.decls));
        file.module = Some(module);
        file.state = FileState::Finished;

        info!(file = name.as_str(), "analysed");
        Ok(())
    }

    fn write_outputs(&self, file: &File, module: &Module) -> Result<(), Error> {
        let out_build = &self.options.out_build;
        fs::create_dir_all(out_build).map_err(|error| io_error(out_build, error))?;

        let listing = listing::render(module);
        let listing_path = self.options.listing_path(&file.name);
        fs::write(&listing_path, &listing).map_err(|error| io_error(&listing_path, error))?;

        if self.options.use_cache {
            let artifact = Artifact::from_module(module, listing.into_bytes(), file.includes.clone());
            let artifact_path = self.options.artifact_path(&file.name);
            fs::write(&artifact_path, artifact.to_bytes())
                .map_err(|error| io_error(&artifact_path, error))?;
        }

        Ok(())
    }
}

impl ModuleLoader for Compiler {
    fn import(&mut self, name: &str, position: &Position) -> Result<Rc<Declarations>, Error> {
        let unknown = || {
            Error::new(
                ErrorImpl::UnknownModule {
                    module: name.to_string(),
                },
                position.clone(),
            )
        };

        let index = self.find(name).ok_or_else(unknown)?;

        match self.files[index].state {
            FileState::InProgress => {
                return Err(Error::new(
                    ErrorImpl::CircularDependency {
                        module: name.to_string(),
                    },
                    position.clone(),
                ))
            }
            FileState::Ready => self.compile_file(index)?,
            FileState::Finished => {}
        }

        self.files[index].exports.clone().ok_or_else(unknown)
    }
}

/// Compiles the file at `path` together with everything it includes.
pub fn compile(path: &Path, options: CompilerOptions) -> Result<Compiler, Error> {
    let mut compiler = Compiler::new(options);

    compiler.add_file(path)?;
    compiler.compile_all()?;

    Ok(compiler)
}
