//! Programmatic package construction.
//!
//! Front ends that build a [`Package`] in memory, and the generator's own
//! tests, use [`PackageBuilder`] so identifier interning and literal folding
//! stay consistent with what the type checker would have produced.

use crate::ast::*;
use crate::{Id, IdMap};

/// Accumulates files of declarations against one identifier table.
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    name: String,
    ids: IdMap,
    files: Vec<File>,
}

impl PackageBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ids: IdMap::new(),
            files: Vec::new(),
        }
    }

    /// Intern a name.
    pub fn id(&mut self, name: &str) -> Id {
        self.ids.intern(name)
    }

    /// A bare named type such as `u32`.
    pub fn ty(&mut self, name: &str) -> TypeExpr {
        TypeExpr::Named(self.id(name))
    }

    pub fn field(&mut self, name: &str, xtype: TypeExpr) -> Field {
        Field::new(self.id(name), xtype)
    }

    /// A bare identifier expression.
    pub fn ident(&mut self, name: &str) -> Expr {
        Expr::ident(self.id(name))
    }

    /// The implicit receiver, `this`.
    pub fn this(&mut self) -> Expr {
        self.ident(THIS)
    }

    /// `this.field`
    pub fn this_field(&mut self, field: &str) -> Expr {
        let this = self.this();
        Expr::dot(this, self.id(field))
    }

    /// A folded integer literal.
    pub fn int(&mut self, value: i128) -> Expr {
        let token = self.id(&value.to_string());
        Expr::new(ExprKind::Literal(token)).with_const(value)
    }

    /// Add a file holding `decls`, after any previously added files.
    pub fn file(&mut self, filename: &str, decls: Vec<TopLevelDecl>) -> &mut Self {
        self.files.push(File::new(filename, decls));
        self
    }

    pub fn finish(self) -> Package {
        Package {
            name: self.name,
            ids: self.ids,
            files: self.files,
        }
    }
}
