//! The declaration emitter.
//!
//! Walks a package once and writes the whole C file in a fixed section
//! order:
//! 1. Include guard, banner, base runtime header, status declarations
//! 2. Public structs, constructor/destructor and function prototypes
//! 3. `// C HEADER ENDS HERE.`, base runtime implementation, status helpers
//! 4. Private structs and prototypes
//! 5. Constructor/destructor bodies, then function bodies
//!
//! Bodies are written public first, then private, each in declaration
//! order. Given the same package the output is byte-identical.

use puffs_types::ast::*;
use puffs_types::{Id, IdMap};
use tracing::{debug, trace};

use crate::buffer::Buffer;
use crate::error::{CodegenError, CodegenResult, NestingKind};
use crate::jump::JumpTargets;
use crate::options::GenOptions;
use crate::scan::{BodyIndex, LoopInfo};
use crate::status::{
    self, ERROR_BAD_ARGUMENT, ERROR_BAD_RECEIVER, ERROR_CONSTRUCTOR_NOT_CALLED, STATUS_OK,
};
use crate::types::{self, LOCAL_PREFIX, PARAM_PREFIX};
use crate::{layout, runtime, stmt};

// ══════════════════════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════════════════════

/// Generate the C file for `pkg` with default options.
pub fn generate(pkg: &Package) -> CodegenResult<String> {
    generate_with_options(pkg, &GenOptions::default())
}

/// Generate the C file for `pkg`.
///
/// Returns the complete, unformatted C text, or the first
/// [`CodegenError`] encountered. Nothing is returned on error.
#[tracing::instrument(skip_all, fields(package = %pkg.name, files = pkg.files.len()))]
pub fn generate_with_options(pkg: &Package, options: &GenOptions) -> CodegenResult<String> {
    let mut generator = Generator::new(pkg, options)?;
    generator.generate()?;
    debug!(bytes = generator.out.len(), "generated C");
    Ok(generator.out.into_string())
}

/// Package names are spliced into C identifiers and the include guard.
fn check_package_name(name: &str) -> CodegenResult<()> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CodegenError::InvalidPackageName {
            name: name.to_string(),
        })
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Generator
// ══════════════════════════════════════════════════════════════════════════════

/// State for one generation run: the package and the output text.
///
/// Per-function state lives in [`FuncContext`], created fresh for every
/// function body.
pub(crate) struct Generator<'a> {
    pub(crate) pkg: &'a Package,
    pub(crate) options: GenOptions,
    pub(crate) out: Buffer,
}

impl<'a> Generator<'a> {
    fn new(pkg: &'a Package, options: &GenOptions) -> CodegenResult<Self> {
        check_package_name(&pkg.name)?;
        Ok(Self {
            pkg,
            options: *options,
            out: Buffer::new(),
        })
    }

    /// The package name, as spliced into every C identifier.
    pub(crate) fn pkg_name(&self) -> &'a str {
        &self.pkg.name
    }

    pub(crate) fn name(&self, id: Id) -> CodegenResult<&'a str> {
        let ids: &'a IdMap = &self.pkg.ids;
        ids.get(id).ok_or(CodegenError::UnknownIdentifier { id: id.0 })
    }

    fn structs(&self, public: bool) -> impl Iterator<Item = &'a StructDecl> {
        let pkg: &'a Package = self.pkg;
        pkg.decls().filter_map(move |d| match d {
            TopLevelDecl::Struct(s) if s.public == public => Some(s),
            _ => None,
        })
    }

    fn funcs(&self, public: bool) -> impl Iterator<Item = &'a FuncDecl> {
        let pkg: &'a Package = self.pkg;
        pkg.decls().filter_map(move |d| match d {
            TopLevelDecl::Func(f) if f.public == public => Some(f),
            _ => None,
        })
    }

    fn generate(&mut self) -> CodegenResult<()> {
        let pkg = self.pkg_name();
        let guard = format!("PUFFS_{}_H", pkg.to_ascii_uppercase());

        // ── Header ───────────────────────────────────────────────────────
        printf!(self.out, "#ifndef {guard}\n#define {guard}\n\n");
        self.out.writes("// Code generated by puffs-gen-c. DO NOT EDIT.\n\n");
        runtime::write_base_header(&mut self.out, self.options.version);
        self.out.writes("#ifdef __cplusplus\nextern \"C\" {\n#endif\n\n");

        debug!("writing status codes");
        status::write_status_decls(&mut self.out, pkg);

        debug!("writing public declarations");
        self.out.writes("// ---------------- Public Structs\n\n");
        for s in self.structs(true) {
            self.write_struct(s)?;
        }
        self.out
            .writes("// ---------------- Public Constructor and Destructor Prototypes\n\n");
        for s in self.structs(true) {
            self.write_ctor_prototypes(s)?;
        }
        self.out.writes("// ---------------- Public Function Prototypes\n\n");
        for f in self.funcs(true) {
            self.write_func_prototype(f)?;
        }

        self.out.writes("#ifdef __cplusplus\n}  // extern \"C\"\n#endif\n\n");
        printf!(self.out, "#endif  // {guard}\n\n");
        self.out.writes("// C HEADER ENDS HERE.\n\n");

        // ── Implementation ───────────────────────────────────────────────
        runtime::write_base_impl(&mut self.out);
        status::write_status_impls(&mut self.out, pkg);

        debug!("writing private declarations");
        self.out.writes("// ---------------- Private Structs\n\n");
        for s in self.structs(false) {
            self.write_struct(s)?;
        }
        self.out
            .writes("// ---------------- Private Constructor and Destructor Prototypes\n\n");
        for s in self.structs(false) {
            self.write_ctor_prototypes(s)?;
        }
        self.out.writes("// ---------------- Private Function Prototypes\n\n");
        for f in self.funcs(false) {
            self.write_func_prototype(f)?;
        }

        debug!("writing constructor and destructor bodies");
        self.out
            .writes("// ---------------- Constructor and Destructor Implementations\n\n");
        layout::write_magic_defines(&mut self.out);
        for public in [true, false] {
            for s in self.structs(public) {
                self.write_ctor_impls(s)?;
            }
        }

        debug!("writing function bodies");
        self.out.writes("// ---------------- Function Implementations\n\n");
        for public in [true, false] {
            for f in self.funcs(public) {
                self.write_func_impl(f)?;
            }
        }
        Ok(())
    }

    // ── Functions ────────────────────────────────────────────────────────

    /// `recv.name` or `name`, for diagnostics.
    fn func_display(&self, f: &FuncDecl) -> CodegenResult<String> {
        let name = self.name(f.name)?;
        Ok(match f.receiver {
            Some(r) => format!("{}.{name}", self.name(r)?),
            None => name.to_string(),
        })
    }

    fn write_func_signature(&mut self, f: &FuncDecl) -> CodegenResult<()> {
        let pkg = self.pkg_name();
        let name = self.name(f.name)?;
        let func_name = self.func_display(f)?;

        if f.suspendible {
            printf!(self.out, "puffs_{pkg}_status ");
        } else {
            self.out.writes("void ");
        }

        let mut comma = false;
        match f.receiver {
            Some(r) => {
                let recv = self.name(r)?;
                if !f.suspendible {
                    return Err(CodegenError::IllegalReceiver {
                        receiver: recv.to_string(),
                        func: name.to_string(),
                    });
                }
                printf!(self.out, "puffs_{pkg}_{recv}_{name}(puffs_{pkg}_{recv} *self");
                comma = true;
            }
            None => printf!(self.out, "puffs_{pkg}_{name}("),
        }

        let ids: &'a IdMap = &self.pkg.ids;
        for param in &f.params {
            if comma {
                self.out.writes(", ");
            }
            comma = true;
            types::write_field(&mut self.out, ids, param, PARAM_PREFIX, &|| {
                format!("function {func_name}")
            })?;
        }
        if !comma {
            self.out.writes("void");
        }
        self.out.writeb(')');
        Ok(())
    }

    fn write_func_prototype(&mut self, f: &FuncDecl) -> CodegenResult<()> {
        self.write_func_signature(f)?;
        self.out.writes(";\n\n");
        Ok(())
    }

    fn write_func_impl(&mut self, f: &'a FuncDecl) -> CodegenResult<()> {
        let pkg = self.pkg_name();
        let func_name = self.func_display(f)?;
        trace!(func = %func_name, public = f.public, suspendible = f.suspendible, "writing function body");

        self.write_func_signature(f)?;
        self.out.writes(" {\n");

        let ids: &'a IdMap = &self.pkg.ids;
        let mut ctx = FuncContext::new(ids, func_name, &f.params, &f.body)?;
        let has_receiver = f.receiver.is_some();
        let mut uses_cleanup = false;

        // ── Prologue ─────────────────────────────────────────────────────
        if f.public && has_receiver {
            printf!(
                self.out,
                "if (!self) {{\nreturn puffs_{pkg}_{ERROR_BAD_RECEIVER};\n}}\n"
            );
        }
        if f.suspendible {
            if has_receiver {
                printf!(
                    self.out,
                    "puffs_{pkg}_status status = self->status;\nif (status & 1) {{\nreturn status;\n}}\n"
                );
                if f.public {
                    printf!(
                        self.out,
                        "if (self->magic != PUFFS_MAGIC) {{\nstatus = puffs_{pkg}_{ERROR_CONSTRUCTOR_NOT_CALLED};\ngoto cleanup0;\n}}\n"
                    );
                    uses_cleanup = true;
                }
            } else {
                printf!(self.out, "puffs_{pkg}_status status = puffs_{pkg}_{STATUS_OK};\n");
            }
        }
        if f.public {
            let pointers = f
                .params
                .iter()
                .filter(|p| p.xtype.is_ptr())
                .map(|p| self.name(p.name))
                .collect::<CodegenResult<Vec<_>>>()?;
            if !pointers.is_empty() {
                self.out.writes("if (");
                for (i, name) in pointers.iter().enumerate() {
                    if i > 0 {
                        self.out.writes(" || ");
                    }
                    printf!(self.out, "!{PARAM_PREFIX}{name}");
                }
                if f.suspendible {
                    printf!(
                        self.out,
                        ") {{\nstatus = puffs_{pkg}_{ERROR_BAD_ARGUMENT};\ngoto cleanup0;\n}}\n"
                    );
                    uses_cleanup = true;
                } else {
                    self.out.writes(") {\nreturn;\n}\n");
                }
            }
        }
        self.out.writeb('\n');

        // ── Locals ───────────────────────────────────────────────────────
        // One C declaration per name; sibling bodies may reuse a name.
        let mut declared: Vec<(Id, &str)> = Vec::new();
        for v in &ctx.index.vars {
            let ty = types::local_type(ids, &v.xtype, &|| format!("function {}", ctx.func))?;
            let name = ctx.name(v.name)?;
            let prev = declared.iter().find(|(id, _)| *id == v.name).map(|(_, t)| *t);
            match prev {
                Some(prev) if prev == ty => continue,
                Some(_) => {
                    return Err(ctx.unsupported(
                        format!("redeclaration of variable {name:?} with a different type"),
                        v.span,
                    ));
                }
                None => declared.push((v.name, ty)),
            }
            printf!(self.out, "{ty} {LOCAL_PREFIX}{name};\n");
        }
        if !declared.is_empty() {
            self.out.writeb('\n');
        }

        // ── Body ─────────────────────────────────────────────────────────
        stmt::write_stmts(&f.body, &mut ctx, &mut self.out, 0)?;

        // ── Epilogue ─────────────────────────────────────────────────────
        if uses_cleanup {
            self.out.writes("\ncleanup0:\n");
            if has_receiver {
                self.out.writes("self->status = status;\n");
            }
        }
        if f.suspendible {
            self.out.writes("return status;\n");
        }
        self.out.writes("}\n\n");
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Function Context
// ══════════════════════════════════════════════════════════════════════════════

/// Per-function translation state: the body scan, the jump target table,
/// and cursors into the scan's pre-order lists.
pub struct FuncContext<'a> {
    pub ids: &'a IdMap,
    /// The function's printable name, for diagnostics.
    pub func: String,
    pub index: BodyIndex<'a>,
    pub targets: JumpTargets,
    params: Vec<Id>,
    next_loop: usize,
    next_jump: usize,
}

impl<'a> FuncContext<'a> {
    pub fn new(
        ids: &'a IdMap,
        func: String,
        params: &[Field],
        body: &'a [Stmt],
    ) -> CodegenResult<Self> {
        let index = BodyIndex::build(body, ids, &func)?;
        let targets = JumpTargets::new(index.loops.len());
        Ok(Self {
            ids,
            func,
            index,
            targets,
            params: params.iter().map(|p| p.name).collect(),
            next_loop: 0,
            next_jump: 0,
        })
    }

    pub fn name(&self, id: Id) -> CodegenResult<&'a str> {
        self.ids
            .get(id)
            .ok_or(CodegenError::UnknownIdentifier { id: id.0 })
    }

    pub fn is_param(&self, id: Id) -> bool {
        self.params.contains(&id)
    }

    /// The next loop in pre-order, with its index.
    pub fn next_loop(&mut self) -> CodegenResult<(usize, LoopInfo)> {
        let index = self.next_loop;
        let info = self.index.loops.get(index).copied().ok_or_else(|| {
            CodegenError::Internal(format!("loop {index} was not scanned in {}", self.func))
        })?;
        self.next_loop += 1;
        Ok((index, info))
    }

    /// The loop index the next jump statement targets.
    pub fn next_jump(&mut self) -> CodegenResult<usize> {
        let n = self.next_jump;
        let target = self.index.jumps.get(n).copied().ok_or_else(|| {
            CodegenError::Internal(format!("jump {n} was not scanned in {}", self.func))
        })?;
        self.next_jump += 1;
        Ok(target)
    }

    /// The jump target of loop `index`, allocated on first use.
    pub fn jump_target(&mut self, index: usize) -> CodegenResult<u32> {
        self.targets
            .get(index)
            .ok_or_else(|| CodegenError::TooManyJumpTargets {
                func: self.func.clone(),
            })
    }

    pub fn nesting_error(&self, kind: NestingKind) -> CodegenError {
        CodegenError::NestingTooDeep {
            kind,
            func: self.func.clone(),
        }
    }

    pub fn unsupported(&self, construct: impl Into<String>, span: puffs_types::Span) -> CodegenError {
        CodegenError::Unsupported {
            construct: construct.into(),
            context: format!("function {}", self.func),
            span,
        }
    }
}
