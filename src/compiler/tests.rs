//! Unit tests for the driver: sidecars, listings and build options.

use std::path::{Path, PathBuf};

use super::{
    artifact::Artifact,
    compiler::{analyse, module_name},
    config::CompilerOptions,
    listing::render,
};
use crate::{
    ast::{
        module::Module,
        types::{Prim, Value},
    },
    errors::errors::ErrorImpl,
    lexer::lexer::tokenize,
    resolver::resolver::NoImports,
    type_checker::std::Std,
};

const GEOMETRY: &str = "pub fn area(w: I32, h: I32): I32 { w * h }
pub const unit := 1
global counter: U8 = 3
fn hidden() { }
pub fn scale(p: I32, [by: I32 = 2]): I32 { p * by }
pub module shapes {
    pub fn unit_side(): F64 { 1.0 }
}
";

fn geometry() -> Module {
    analyse(
        GEOMETRY.to_string(),
        "geometry.eb",
        "geometry",
        &Std::new(),
        &mut NoImports,
    )
    .unwrap()
}

#[test]
fn test_artifact_records_public_interface() {
    let module = geometry();
    let artifact = Artifact::from_module(&module, b"ir".to_vec(), vec!["util.eb".to_string()]);

    let functions: Vec<&str> = artifact
        .functions
        .iter()
        .map(|function| function.mangled.as_str())
        .collect();
    assert_eq!(
        functions,
        vec!["geometry.area.2.0", "geometry.shapes.unit_side.0.0"]
    );
    assert_eq!(artifact.functions[0].params, vec![Prim::I32, Prim::I32]);
    assert_eq!(artifact.functions[1].ret, Prim::F64);

    assert_eq!(artifact.globals.len(), 1);
    assert!(artifact.globals[0].is_const);
    assert_eq!(artifact.globals[0].mangled, "geometry.unit");
    assert_eq!(artifact.globals[0].value, Value::Int(1));
}

#[test]
fn test_artifact_bytes_survive_reading() {
    let module = geometry();
    let artifact = Artifact::from_module(&module, render(&module).into_bytes(), vec![]);
    let bytes = artifact.to_bytes();

    assert_eq!(&bytes[..3], b"eb$");
    assert_eq!(
        u64::from_le_bytes(bytes[3..11].try_into().unwrap()) as usize,
        artifact.ir.len()
    );
    assert_eq!(Artifact::from_bytes(&bytes).unwrap(), artifact);
}

#[test]
fn test_artifact_rebuilds_declarations() {
    let module = geometry();
    let artifact = Artifact::from_module(&module, vec![], vec![]);
    let decls = artifact.to_declarations("geometry").unwrap();

    let area = &decls.overloads("area", 2)[0];
    assert_eq!(area.mangled, "geometry.area.2.0");
    assert!(area.is_pub);

    let shapes = decls.submodule(&["shapes".to_string()]).unwrap();
    assert_eq!(shapes.path, "geometry.shapes");
    assert_eq!(shapes.overloads("unit_side", 0).len(), 1);

    let unit = &decls.globals["unit"];
    assert!(unit.is_const);
    assert_eq!(unit.ty.prim(), Some(Prim::I32));

    assert!(matches!(
        artifact.to_declarations("other"),
        Err(ErrorImpl::ArtifactError { .. })
    ));
}

#[test]
fn test_artifact_rejects_bad_input() {
    assert!(matches!(
        Artifact::from_bytes(b"elf"),
        Err(ErrorImpl::ArtifactError { .. })
    ));

    let bytes = Artifact::from_module(&geometry(), b"listing".to_vec(), vec![]).to_bytes();
    assert!(matches!(
        Artifact::from_bytes(&bytes[..bytes.len() - 3]),
        Err(ErrorImpl::ArtifactError { .. })
    ));

    let mut trailing = bytes.clone();
    trailing.push(0);
    assert!(Artifact::from_bytes(&trailing).is_err());
}

#[test]
fn test_listing_shows_mangled_names_and_types() {
    let listing = render(&geometry());

    assert!(listing.starts_with("; module geometry\n"));
    assert!(listing.contains("fn geometry.area.2.0(w: I32, h: I32): I32 {"));
    assert!(listing.contains("std.*.2.2:I32"));
    assert!(listing.contains("const geometry.unit: I32 = Int(1)"));
    assert!(listing.contains("global geometry.counter: U8 = Int(3)"));
    assert!(listing.contains("fn geometry.shapes.unit_side.0.0(): F64 {"));
    assert!(!listing.contains('?'));
}

#[test]
fn test_module_names() {
    assert_eq!(module_name(Path::new("src/geometry.eb")).unwrap(), "geometry");
    assert_eq!(module_name(Path::new("_util.eb")).unwrap(), "_util");

    for bad in ["1st.eb", "my-file.eb", ".eb"] {
        let error = module_name(Path::new(bad)).unwrap_err();
        assert!(matches!(error.get_impl(), ErrorImpl::InvalidModuleName { .. }));
    }
}

#[test]
fn test_directives_override_options() {
    let lexed = tokenize(
        "#out_build build_dir\n#out_exec app\n#include other.eb\nfn main() { }".to_string(),
        Some("main.eb".to_string()),
    )
    .unwrap();

    let mut options = CompilerOptions::default();
    for directive in &lexed.directives {
        options.apply_directive(directive);
    }

    assert_eq!(options.out_build, PathBuf::from("build_dir"));
    assert_eq!(options.out_exec.as_deref(), Some("app"));
    assert_eq!(options.listing_path("main"), PathBuf::from("build_dir/main.ir"));
    assert_eq!(options.artifact_path("main"), PathBuf::from("build_dir/main.ir.o"));
}
