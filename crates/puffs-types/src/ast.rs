//! AST node types for type-checked Puffs packages.
//!
//! The front end hands the backend a fully resolved tree: every name is an
//! [`Id`] into the package's [`IdMap`], every constant subexpression is
//! already folded into [`Expr::const_value`], and every `break`/`continue`
//! names (or implies) the loop it leaves. Recursive nodes are boxed. Source
//! order is preserved everywhere: declaration and field order are ABI.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Id, IdMap, PackageError, Span};

/// The source-language spelling of the implicit receiver.
pub const THIS: &str = "this";

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete package: everything one generation run sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub ids: IdMap,
    pub files: Vec<File>,
}

impl Package {
    pub fn new(name: impl Into<String>, ids: IdMap) -> Self {
        Self {
            name: name.into(),
            ids,
            files: Vec::new(),
        }
    }

    /// Append the files of another document of the same package.
    ///
    /// Both documents must agree on the package name and on the identifier
    /// table, otherwise handles would resolve to different names.
    pub fn extend(&mut self, other: Package) -> Result<(), PackageError> {
        if other.name != self.name {
            return Err(PackageError::PackageMismatch {
                expected: self.name.clone(),
                found: other.name,
            });
        }
        if other.ids != self.ids {
            return Err(PackageError::IdTableMismatch {
                package: self.name.clone(),
            });
        }
        self.files.extend(other.files);
        Ok(())
    }

    /// All top-level declarations in file order, then declaration order.
    pub fn decls(&self) -> impl Iterator<Item = &TopLevelDecl> {
        self.files.iter().flat_map(|f| f.decls.iter())
    }
}

/// One source file's ordered top-level declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub filename: String,
    pub decls: Vec<TopLevelDecl>,
}

impl File {
    pub fn new(filename: impl Into<String>, decls: Vec<TopLevelDecl>) -> Self {
        Self {
            filename: filename.into(),
            decls,
        }
    }
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopLevelDecl {
    Struct(StructDecl),
    Func(FuncDecl),
}

// ══════════════════════════════════════════════════════════════════════════════
// Structs & Functions
// ══════════════════════════════════════════════════════════════════════════════

/// `pub struct name? (fields...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDecl {
    pub name: Id,
    #[serde(default)]
    pub public: bool,
    /// Suspendible structs carry a status code and a magic sentinel.
    #[serde(default)]
    pub suspendible: bool,
    pub fields: Vec<Field>,
    #[serde(default)]
    pub span: Span,
}

impl StructDecl {
    pub fn new(name: Id) -> Self {
        Self {
            name,
            public: false,
            suspendible: false,
            fields: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn suspendible(mut self) -> Self {
        self.suspendible = true;
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }
}

/// A struct field or a function parameter: `name type [= default]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: Id,
    pub xtype: TypeExpr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Expr>,
    #[serde(default)]
    pub span: Span,
}

impl Field {
    pub fn new(name: Id, xtype: TypeExpr) -> Self {
        Self {
            name,
            xtype,
            default: None,
            span: Span::default(),
        }
    }

    pub fn with_default(mut self, default: Expr) -> Self {
        self.default = Some(default);
        self
    }
}

/// `pub func receiver.name?(params...) { body }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: Id,
    /// The struct this function is a method of, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Id>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub suspendible: bool,
    pub params: Vec<Field>,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub span: Span,
}

impl FuncDecl {
    pub fn new(name: Id) -> Self {
        Self {
            name,
            receiver: None,
            public: false,
            suspendible: false,
            params: Vec::new(),
            body: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn receiver(mut self, receiver: Id) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn suspendible(mut self) -> Self {
        self.suspendible = true;
        self
    }

    pub fn param(mut self, param: Field) -> Self {
        self.params.push(param);
        self
    }

    pub fn body(mut self, body: Vec<Stmt>) -> Self {
        self.body = body;
        self
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Type Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// A type descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeExpr {
    /// A bare type name: `u32`, `buf1`, or a user struct.
    Named(Id),
    /// `pkg.name`
    Qualified { package: Id, name: Id },
    /// `ptr T`
    Ptr(Box<TypeExpr>),
    /// `[length] T`
    Array { length: Box<Expr>, inner: Box<TypeExpr> },
    /// `[] T`
    Slice(Box<TypeExpr>),
    /// `[][] T`
    Table(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn ptr(inner: TypeExpr) -> Self {
        TypeExpr::Ptr(Box::new(inner))
    }

    pub fn array(length: Expr, inner: TypeExpr) -> Self {
        TypeExpr::Array {
            length: Box::new(length),
            inner: Box::new(inner),
        }
    }

    /// Whether the outermost constructor is `ptr`.
    pub fn is_ptr(&self) -> bool {
        matches!(self, TypeExpr::Ptr(_))
    }

    /// Render in source-language form, e.g. `ptr [4] u8`.
    pub fn display<'a>(&'a self, ids: &'a IdMap) -> TypeDisplay<'a> {
        TypeDisplay { ty: self, ids }
    }
}

/// [`fmt::Display`] adapter returned by [`TypeExpr::display`].
pub struct TypeDisplay<'a> {
    ty: &'a TypeExpr,
    ids: &'a IdMap,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |id: Id| self.ids.get(id).unwrap_or("?");
        match self.ty {
            TypeExpr::Named(id) => write!(f, "{}", name(*id)),
            TypeExpr::Qualified { package, name: n } => {
                write!(f, "{}.{}", name(*package), name(*n))
            }
            TypeExpr::Ptr(inner) => write!(f, "ptr {}", inner.display(self.ids)),
            TypeExpr::Array { length, inner } => {
                match length.const_value {
                    Some(v) => write!(f, "[{v}] ")?,
                    None => write!(f, "[?] ")?,
                }
                write!(f, "{}", inner.display(self.ids))
            }
            TypeExpr::Slice(inner) => write!(f, "[] {}", inner.display(self.ids)),
            TypeExpr::Table(inner) => write!(f, "[][] {}", inner.display(self.ids)),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// A statement in a function body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    /// `assert cond`: checked at compile time only.
    Assert(AssertStmt),
    /// `lhs op= rhs`
    Assign(AssignStmt),
    /// `var name type [= value]`
    Var(VarStmt),
    /// `while.label? cond { body }`
    While(WhileStmt),
    /// `break.label?` / `continue.label?`
    Jump(JumpStmt),
    /// `if cond { ... } else { ... }`
    If(IfStmt),
    /// `return [value]`
    Return(ReturnStmt),
}

impl Stmt {
    pub fn assert(condition: Expr) -> Self {
        Stmt::Assert(AssertStmt {
            condition,
            span: Span::default(),
        })
    }

    pub fn assign(lhs: Expr, op: AssignOp, rhs: Expr) -> Self {
        Stmt::Assign(AssignStmt {
            lhs,
            op,
            rhs,
            span: Span::default(),
        })
    }

    pub fn var(name: Id, xtype: TypeExpr, value: Option<Expr>) -> Self {
        Stmt::Var(VarStmt {
            name,
            xtype,
            value,
            span: Span::default(),
        })
    }

    pub fn while_loop(condition: Expr, body: Vec<Stmt>) -> Self {
        Stmt::While(WhileStmt {
            label: None,
            condition,
            body,
            span: Span::default(),
        })
    }

    pub fn labeled_while(label: Id, condition: Expr, body: Vec<Stmt>) -> Self {
        Stmt::While(WhileStmt {
            label: Some(label),
            condition,
            body,
            span: Span::default(),
        })
    }

    pub fn jump(kind: JumpKind) -> Self {
        Stmt::Jump(JumpStmt {
            kind,
            label: None,
            span: Span::default(),
        })
    }

    pub fn labeled_jump(kind: JumpKind, label: Id) -> Self {
        Stmt::Jump(JumpStmt {
            kind,
            label: Some(label),
            span: Span::default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertStmt {
    pub condition: Expr,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignStmt {
    pub lhs: Expr,
    pub op: AssignOp,
    pub rhs: Expr,
    #[serde(default)]
    pub span: Span,
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignOp {
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    ShiftLEq,
    ShiftREq,
    AmpEq,
    /// `&^=`: AND-NOT compound assignment.
    AmpHatEq,
    PipeEq,
    HatEq,
}

impl AssignOp {
    /// Returns the operator symbol for error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Eq => "=",
            AssignOp::PlusEq => "+=",
            AssignOp::MinusEq => "-=",
            AssignOp::StarEq => "*=",
            AssignOp::SlashEq => "/=",
            AssignOp::ShiftLEq => "<<=",
            AssignOp::ShiftREq => ">>=",
            AssignOp::AmpEq => "&=",
            AssignOp::AmpHatEq => "&^=",
            AssignOp::PipeEq => "|=",
            AssignOp::HatEq => "^=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarStmt {
    pub name: Id,
    pub xtype: TypeExpr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Expr>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Id>,
    pub condition: Expr,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpStmt {
    pub kind: JumpKind,
    /// Targets the innermost enclosing loop with this label, or the
    /// innermost enclosing loop when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Id>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpKind {
    Break,
    Continue,
}

impl JumpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JumpKind::Break => "break",
            JumpKind::Continue => "continue",
        }
    }
}

impl fmt::Display for JumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_body: Vec<Stmt>,
    #[serde(default)]
    pub else_body: Vec<Stmt>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Expr>,
    #[serde(default)]
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    /// The front end's constant-folded value, if the whole subtree folded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<i128>,
    #[serde(default)]
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            const_value: None,
            span: Span::default(),
        }
    }

    pub fn with_const(mut self, value: i128) -> Self {
        self.const_value = Some(value);
        self
    }

    pub fn ident(name: Id) -> Self {
        Self::new(ExprKind::Ident(name))
    }

    pub fn dot(lhs: Expr, field: Id) -> Self {
        Self::new(ExprKind::Dot {
            lhs: Box::new(lhs),
            field,
        })
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Self::new(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Self::new(ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn associative(op: AssociativeOp, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Associative { op, args })
    }
}

/// The kind of expression, classified the way the operator table does:
/// primaries, then unary, binary and associative operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    // ── Primaries ──
    /// A numeric literal token, e.g. `0x10`.
    Literal(Id),
    /// A bare identifier; `this` is the implicit receiver.
    Ident(Id),
    /// `lhs.field`
    Dot { lhs: Box<Expr>, field: Id },
    /// `callee(args...)`
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// `lhs[index]`
    Index { lhs: Box<Expr>, index: Box<Expr> },
    /// `lhs[low:high]`
    Slice {
        lhs: Box<Expr>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        low: Option<Box<Expr>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        high: Option<Box<Expr>>,
    },

    // ── Operators ──
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// A flattened n-ary chain such as `a + b + c`.
    Associative { op: AssociativeOp, args: Vec<Expr> },
}

impl ExprKind {
    /// A short name for the form, used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            ExprKind::Literal(_) => "literal",
            ExprKind::Ident(_) => "identifier",
            ExprKind::Dot { .. } => "field access",
            ExprKind::Call { .. } => "call",
            ExprKind::Index { .. } => "index",
            ExprKind::Slice { .. } => "slice",
            ExprKind::Unary { .. } => "unary operator",
            ExprKind::Binary { .. } => "binary operator",
            ExprKind::Associative { .. } => "associative operator",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "not",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Plus,
    Minus,
    Star,
    Slash,
    ShiftL,
    ShiftR,
    Amp,
    /// `&^`: AND-NOT.
    AmpHat,
    Pipe,
    Hat,
    NotEq,
    LessThan,
    LessEq,
    EqEq,
    GreaterEq,
    GreaterThan,
    And,
    Or,
    /// `x as T`: a type conversion, not an arithmetic operator.
    As,
}

impl BinaryOp {
    /// Returns the operator symbol for error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Star => "*",
            BinaryOp::Slash => "/",
            BinaryOp::ShiftL => "<<",
            BinaryOp::ShiftR => ">>",
            BinaryOp::Amp => "&",
            BinaryOp::AmpHat => "&^",
            BinaryOp::Pipe => "|",
            BinaryOp::Hat => "^",
            BinaryOp::NotEq => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::EqEq => "==",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::As => "as",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociativeOp {
    Plus,
    Star,
    Amp,
    Pipe,
    Hat,
    And,
    Or,
}

impl AssociativeOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssociativeOp::Plus => "+",
            AssociativeOp::Star => "*",
            AssociativeOp::Amp => "&",
            AssociativeOp::Pipe => "|",
            AssociativeOp::Hat => "^",
            AssociativeOp::And => "and",
            AssociativeOp::Or => "or",
        }
    }
}
