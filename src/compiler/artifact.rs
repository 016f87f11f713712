//! The build sidecar written next to every analysed file.
//!
//! Layout, all integers little-endian and names NUL-terminated:
//!
//! ```text
//! "eb$"
//! [ir length: 8] {ir bytes}
//! [include count: 4] {file name}
//! [function count: 4] {mangled name, return tag, [param count: 1], {param tag}}
//! [global count: 4] {[const: 1], mangled name, type tag, [value: 8]}
//! ```
//!
//! Only public items whose types are all primitive are recorded, which is
//! enough for another file to import them without analysing the source again.

use std::rc::Rc;

use crate::{
    ast::{
        module::{Declarations, FnForm, FnSig, GlobalDecl, Module, ParamSig},
        types::{Prim, Type, Value},
    },
    errors::errors::ErrorImpl,
    Span,
};

pub const MAGIC: &[u8; 3] = b"eb$";

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactFunction {
    pub mangled: String,
    pub ret: Prim,
    pub params: Vec<Prim>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactGlobal {
    pub is_const: bool,
    pub mangled: String,
    pub ty: Prim,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Artifact {
    pub ir: Vec<u8>,
    pub includes: Vec<String>,
    pub functions: Vec<ArtifactFunction>,
    pub globals: Vec<ArtifactGlobal>,
}

fn invalid(message: &str) -> ErrorImpl {
    ErrorImpl::ArtifactError {
        message: message.to_string(),
    }
}

fn collect_globals(decls: &Declarations, out: &mut Vec<ArtifactGlobal>) {
    let mut globals: Vec<&Rc<GlobalDecl>> = decls.globals.values().collect();
    globals.sort_by(|a, b| a.mangled.cmp(&b.mangled));

    for global in globals {
        if let (true, Some(ty)) = (global.is_pub, global.ty.prim()) {
            out.push(ArtifactGlobal {
                is_const: global.is_const,
                mangled: global.mangled.clone(),
                ty,
                value: global.value.clone(),
            });
        }
    }

    let mut names: Vec<&String> = decls.submodules.keys().collect();
    names.sort();
    for name in names {
        collect_globals(&decls.submodules[name], out);
    }
}

/// Declarations below `decls` at `path`, created on the way.
fn submodule_entry<'d>(decls: &'d mut Declarations, path: &[String]) -> &'d mut Declarations {
    let mut decls = decls;
    for part in path {
        let nested = format!("{}.{}", decls.path, part);
        decls = decls
            .submodules
            .entry(part.clone())
            .or_insert_with(|| Declarations::new(nested));
    }
    decls
}

/// Splits `root.a.b.name.<suffix>` into the submodule path and item name.
fn split_mangled(mangled: &str, root: &str, suffix: usize) -> Result<(Vec<String>, String), ErrorImpl> {
    let rest = mangled
        .strip_prefix(root)
        .and_then(|rest| rest.strip_prefix('.'))
        .ok_or_else(|| invalid(&format!("`{}` does not belong to `{}`", mangled, root)))?;

    let mut parts: Vec<String> = rest.split('.').map(|part| part.to_string()).collect();
    if parts.len() <= suffix {
        return Err(invalid(&format!("malformed name `{}`", mangled)));
    }
    parts.truncate(parts.len() - suffix);

    let name = parts.pop().ok_or_else(|| invalid(&format!("malformed name `{}`", mangled)))?;
    Ok((parts, name))
}

impl Artifact {
    /// Records the public interface of `module`.
    pub fn from_module(module: &Module, ir: Vec<u8>, includes: Vec<String>) -> Self {
        let functions = module
            .decls
            .all_functions()
            .into_iter()
            .filter(|sig| sig.is_pub && sig.form == FnForm::User && sig.named.is_empty())
            .filter_map(|sig| {
                let params: Option<Vec<Prim>> =
                    sig.params.iter().map(|param| param.ty.prim()).collect();
                Some(ArtifactFunction {
                    mangled: sig.mangled.clone(),
                    ret: sig.ret.prim()?,
                    params: params?,
                })
            })
            .collect();

        let mut globals = vec![];
        collect_globals(&module.decls, &mut globals);

        Artifact {
            ir,
            includes,
            functions,
            globals,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = MAGIC.to_vec();

        out.extend_from_slice(&(self.ir.len() as u64).to_le_bytes());
        out.extend_from_slice(&self.ir);

        out.extend_from_slice(&(self.includes.len() as u32).to_le_bytes());
        for include in &self.includes {
            write_name(&mut out, include);
        }

        out.extend_from_slice(&(self.functions.len() as u32).to_le_bytes());
        for function in &self.functions {
            write_name(&mut out, &function.mangled);
            out.push(function.ret.tag());
            out.push(function.params.len() as u8);
            out.extend(function.params.iter().map(|param| param.tag()));
        }

        out.extend_from_slice(&(self.globals.len() as u32).to_le_bytes());
        for global in &self.globals {
            out.push(global.is_const as u8);
            write_name(&mut out, &global.mangled);
            out.push(global.ty.tag());
            out.extend_from_slice(&global.value.to_bits().to_le_bytes());
        }

        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ErrorImpl> {
        let mut reader = Reader { bytes, offset: 0 };

        if reader.take(3)? != MAGIC {
            return Err(invalid("missing `eb$` header"));
        }

        let ir_len = usize::try_from(reader.u64()?).map_err(|_| invalid("IR too large"))?;
        let ir = reader.take(ir_len)?.to_vec();

        let mut includes = vec![];
        for _ in 0..reader.u32()? {
            includes.push(reader.name()?);
        }

        let mut functions = vec![];
        for _ in 0..reader.u32()? {
            let mangled = reader.name()?;
            let ret = reader.prim()?;
            let count = reader.u8()?;
            let params = (0..count)
                .map(|_| reader.prim())
                .collect::<Result<Vec<_>, _>>()?;

            functions.push(ArtifactFunction {
                mangled,
                ret,
                params,
            });
        }

        let mut globals = vec![];
        for _ in 0..reader.u32()? {
            let is_const = reader.u8()? != 0;
            let mangled = reader.name()?;
            let ty = reader.prim()?;
            let value = Value::from_bits(reader.u64()?, ty);

            globals.push(ArtifactGlobal {
                is_const,
                mangled,
                ty,
                value,
            });
        }

        if reader.offset != bytes.len() {
            return Err(invalid("trailing bytes"));
        }

        Ok(Artifact {
            ir,
            includes,
            functions,
            globals,
        })
    }

    /// Rebuilds the importable declarations of the module `root`.
    pub fn to_declarations(&self, root: &str) -> Result<Declarations, ErrorImpl> {
        let mut decls = Declarations::new(root.to_string());

        for function in &self.functions {
            let (path, name) = split_mangled(&function.mangled, root, 2)?;
            let target = submodule_entry(&mut decls, &path);

            let sig = FnSig {
                name,
                mangled: function.mangled.clone(),
                params: function
                    .params
                    .iter()
                    .enumerate()
                    .map(|(i, prim)| ParamSig {
                        name: format!("arg{}", i),
                        ty: Type::from(*prim),
                    })
                    .collect(),
                named: vec![],
                ret: Type::from(function.ret),
                form: FnForm::User,
                is_pub: true,
                module: target.path.clone(),
                span: Span::null(),
            };
            target.add_function(Rc::new(sig))?;
        }

        for global in &self.globals {
            let (path, name) = split_mangled(&global.mangled, root, 0)?;
            let target = submodule_entry(&mut decls, &path);

            let decl = GlobalDecl {
                name,
                mangled: global.mangled.clone(),
                ty: Type::from(global.ty),
                value: global.value.clone(),
                is_const: global.is_const,
                is_pub: true,
                module: target.path.clone(),
            };
            target.add_global(Rc::new(decl))?;
        }

        Ok(decls)
    }
}

fn write_name(out: &mut Vec<u8>, name: &str) {
    out.extend_from_slice(name.as_bytes());
    out.push(0);
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, count: usize) -> Result<&'a [u8], ErrorImpl> {
        let end = self
            .offset
            .checked_add(count)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| invalid("unexpected end of file"))?;

        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, ErrorImpl> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, ErrorImpl> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn u64(&mut self) -> Result<u64, ErrorImpl> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    fn name(&mut self) -> Result<String, ErrorImpl> {
        let rest = &self.bytes[self.offset..];
        let len = rest
            .iter()
            .position(|byte| *byte == 0)
            .ok_or_else(|| invalid("unterminated name"))?;

        let name = String::from_utf8(rest[..len].to_vec()).map_err(|_| invalid("name is not UTF-8"))?;
        self.offset += len + 1;
        Ok(name)
    }

    fn prim(&mut self) -> Result<Prim, ErrorImpl> {
        let tag = self.u8()?;
        Prim::from_tag(tag).ok_or_else(|| invalid(&format!("unknown type tag `{}`", tag as char)))
    }
}
