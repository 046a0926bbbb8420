//! Puffs → C type mapping and operator spellings.
//!
//! A field type is peeled layer by layer: `ptr` layers become `*` markers
//! before the declared name, `[N]` layers become bracketed lengths after
//! it, and the innermost named type picks the C base type.
//!
//! ```text
//! x u32            → uint32_t f_x
//! x ptr u8         → uint8_t *f_x
//! x [4] ptr u8     → uint8_t *f_x[4]
//! x ptr [4] u8     → uint8_t (*f_x)[4]
//! ```

use puffs_types::ast::{AssignOp, BinaryOp, Field, TypeExpr};
use puffs_types::{Id, IdMap};

use crate::buffer::Buffer;
use crate::error::{CodegenError, CodegenResult};

/// Maximum `ptr` layers in one type.
pub const MAX_POINTER_DEPTH: usize = 16;

/// Name prefix for struct fields in C.
pub const FIELD_PREFIX: &str = "f_";
/// Name prefix for function parameters in C.
pub const PARAM_PREFIX: &str = "a_";
/// Name prefix for local variables in C.
pub const LOCAL_PREFIX: &str = "v_";

/// Emitted for `&^` and `&^=`, which have no C spelling. The marker makes
/// the downstream C compiler reject the output instead of silently
/// miscompiling it.
pub const NO_SUCH_AMP_HAT: &str = " no_such_amp_hat_C_operator ";

// ── Base types ───────────────────────────────────────────────────────────────

/// Built-in Puffs type names and their C spellings.
const C_TYPE_NAMES: &[(&str, &str)] = &[
    ("i8", "int8_t"),
    ("i16", "int16_t"),
    ("i32", "int32_t"),
    ("i64", "int64_t"),
    ("u8", "uint8_t"),
    ("u16", "uint16_t"),
    ("u32", "uint32_t"),
    ("u64", "uint64_t"),
    ("usize", "size_t"),
    ("bool", "bool"),
    ("buf1", "puffs_base_buf1"),
    ("buf2", "puffs_base_buf2"),
];

/// The C spelling of a built-in Puffs type name.
pub fn c_type_name(name: &str) -> Option<&'static str> {
    C_TYPE_NAMES
        .iter()
        .find(|(puffs, _)| *puffs == name)
        .map(|(_, c)| *c)
}

fn unsupported(ty: &TypeExpr, ids: &IdMap, context: &dyn Fn() -> String) -> CodegenError {
    CodegenError::UnsupportedType {
        ty: ty.display(ids).to_string(),
        context: context(),
    }
}

fn named_c_type(
    id: Id,
    whole: &TypeExpr,
    ids: &IdMap,
    context: &dyn Fn() -> String,
) -> CodegenResult<&'static str> {
    ids.get(id)
        .and_then(c_type_name)
        .ok_or_else(|| unsupported(whole, ids, context))
}

// ── Declarators ──────────────────────────────────────────────────────────────

/// Write `field` as a C declaration such as `uint8_t *f_dst[4]`.
///
/// `context` describes the owner (e.g. `struct foo`) and is only rendered
/// when an error is reported.
pub fn write_field(
    out: &mut Buffer,
    ids: &IdMap,
    field: &Field,
    prefix: &str,
    context: &dyn Fn() -> String,
) -> CodegenResult<()> {
    let name = ids
        .get(field.name)
        .ok_or(CodegenError::UnknownIdentifier { id: field.name.0 })?;
    let mut declarator = format!("{prefix}{name}");
    let mut pointers = 0;
    let mut ty = &field.xtype;
    let base = loop {
        match ty {
            TypeExpr::Ptr(inner) => {
                pointers += 1;
                if pointers > MAX_POINTER_DEPTH {
                    return Err(CodegenError::TooManyPointers {
                        ty: field.xtype.display(ids).to_string(),
                        context: context(),
                    });
                }
                declarator.insert(0, '*');
                ty = inner;
            }
            TypeExpr::Array { length, inner } => {
                let Some(n) = length.const_value else {
                    return Err(CodegenError::NonConstant {
                        what: "array length",
                        context: context(),
                        span: length.span,
                    });
                };
                if declarator.starts_with('*') {
                    declarator = format!("({declarator})");
                }
                declarator.push_str(&format!("[{n}]"));
                ty = inner;
            }
            TypeExpr::Named(id) => break named_c_type(*id, &field.xtype, ids, context)?,
            TypeExpr::Qualified { .. } | TypeExpr::Slice(_) | TypeExpr::Table(_) => {
                return Err(unsupported(&field.xtype, ids, context));
            }
        }
    };
    printf!(out, "{base} {declarator}");
    Ok(())
}

/// The C type of a local variable. Locals are restricted to bare built-in
/// types.
pub fn local_type(
    ids: &IdMap,
    ty: &TypeExpr,
    context: &dyn Fn() -> String,
) -> CodegenResult<&'static str> {
    match ty {
        TypeExpr::Named(id) => named_c_type(*id, ty, ids, context),
        _ => Err(unsupported(ty, ids, context)),
    }
}

// ── Operators ────────────────────────────────────────────────────────────────

/// The C spelling of an assignment operator, with surrounding spaces.
pub fn assign_op(op: AssignOp) -> &'static str {
    match op {
        AssignOp::Eq => " = ",
        AssignOp::PlusEq => " += ",
        AssignOp::MinusEq => " -= ",
        AssignOp::StarEq => " *= ",
        AssignOp::SlashEq => " /= ",
        AssignOp::ShiftLEq => " <<= ",
        AssignOp::ShiftREq => " >>= ",
        AssignOp::AmpEq => " &= ",
        AssignOp::AmpHatEq => NO_SUCH_AMP_HAT,
        AssignOp::PipeEq => " |= ",
        AssignOp::HatEq => " ^= ",
    }
}

/// The C spelling of a binary operator, with surrounding spaces.
///
/// `as` is a conversion rather than an operator and has no spelling.
pub fn binary_op(op: BinaryOp) -> Option<&'static str> {
    Some(match op {
        BinaryOp::Plus => " + ",
        BinaryOp::Minus => " - ",
        BinaryOp::Star => " * ",
        BinaryOp::Slash => " / ",
        BinaryOp::ShiftL => " << ",
        BinaryOp::ShiftR => " >> ",
        BinaryOp::Amp => " & ",
        BinaryOp::AmpHat => NO_SUCH_AMP_HAT,
        BinaryOp::Pipe => " | ",
        BinaryOp::Hat => " ^ ",
        BinaryOp::NotEq => " != ",
        BinaryOp::LessThan => " < ",
        BinaryOp::LessEq => " <= ",
        BinaryOp::EqEq => " == ",
        BinaryOp::GreaterEq => " >= ",
        BinaryOp::GreaterThan => " > ",
        BinaryOp::And => " && ",
        BinaryOp::Or => " || ",
        BinaryOp::As => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use puffs_types::ast::{Expr, ExprKind};

    fn render(ids: &mut IdMap, xtype: TypeExpr) -> CodegenResult<String> {
        let name = ids.intern("x");
        let mut out = Buffer::new();
        write_field(&mut out, ids, &Field::new(name, xtype), FIELD_PREFIX, &|| {
            "struct test".to_string()
        })?;
        Ok(out.into_string())
    }

    fn named(ids: &mut IdMap, name: &str) -> TypeExpr {
        TypeExpr::Named(ids.intern(name))
    }

    fn len(n: i128) -> Expr {
        Expr::new(ExprKind::Literal(Id::NONE)).with_const(n)
    }

    #[test]
    fn every_builtin_has_a_c_name() {
        for (puffs, c) in C_TYPE_NAMES {
            assert_eq!(c_type_name(puffs), Some(*c));
        }
        assert_eq!(c_type_name("u128"), None);
    }

    #[test]
    fn scalar_and_pointer_fields() {
        let mut ids = IdMap::new();
        let u32_ = named(&mut ids, "u32");
        assert_eq!(render(&mut ids, u32_).unwrap(), "uint32_t f_x");
        let p = TypeExpr::ptr(TypeExpr::ptr(named(&mut ids, "u8")));
        assert_eq!(render(&mut ids, p).unwrap(), "uint8_t **f_x");
        let b = named(&mut ids, "buf1");
        assert_eq!(render(&mut ids, b).unwrap(), "puffs_base_buf1 f_x");
    }

    #[test]
    fn array_fields() {
        let mut ids = IdMap::new();
        let arr = TypeExpr::array(len(4), TypeExpr::array(len(2), named(&mut ids, "u16")));
        assert_eq!(render(&mut ids, arr).unwrap(), "uint16_t f_x[4][2]");
        let arr_of_ptr = TypeExpr::array(len(4), TypeExpr::ptr(named(&mut ids, "u8")));
        assert_eq!(render(&mut ids, arr_of_ptr).unwrap(), "uint8_t *f_x[4]");
        let ptr_to_arr = TypeExpr::ptr(TypeExpr::array(len(4), named(&mut ids, "u8")));
        assert_eq!(render(&mut ids, ptr_to_arr).unwrap(), "uint8_t (*f_x)[4]");
    }

    #[test]
    fn pointer_depth_is_capped() {
        let mut ids = IdMap::new();
        let mut ok = named(&mut ids, "u8");
        for _ in 0..MAX_POINTER_DEPTH {
            ok = TypeExpr::ptr(ok);
        }
        let rendered = render(&mut ids, ok.clone()).unwrap();
        assert_eq!(rendered.matches('*').count(), MAX_POINTER_DEPTH);

        let err = render(&mut ids, TypeExpr::ptr(ok)).unwrap_err();
        assert!(matches!(err, CodegenError::TooManyPointers { .. }), "{err}");
    }

    #[test]
    fn unsupported_types_are_named_in_the_error() {
        let mut ids = IdMap::new();
        let slice = TypeExpr::Slice(Box::new(named(&mut ids, "u8")));
        let err = render(&mut ids, slice).unwrap_err();
        assert_eq!(
            err,
            CodegenError::UnsupportedType {
                ty: "[] u8".into(),
                context: "struct test".into(),
            }
        );
        let user = named(&mut ids, "decoder");
        assert!(matches!(
            render(&mut ids, user),
            Err(CodegenError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn array_length_must_be_constant() {
        let mut ids = IdMap::new();
        let n = ids.intern("n");
        let arr = TypeExpr::array(Expr::ident(n), named(&mut ids, "u8"));
        let err = render(&mut ids, arr).unwrap_err();
        assert!(matches!(err, CodegenError::NonConstant { what: "array length", .. }));
    }

    #[test]
    fn locals_must_be_bare_builtins() {
        let mut ids = IdMap::new();
        let ctx = || "function f".to_string();
        let u64_ = named(&mut ids, "u64");
        assert_eq!(local_type(&ids, &u64_, &ctx).unwrap(), "uint64_t");
        assert!(local_type(&ids, &TypeExpr::ptr(u64_), &ctx).is_err());
    }

    #[test]
    fn amp_hat_has_no_c_spelling() {
        assert_eq!(assign_op(AssignOp::AmpHatEq), NO_SUCH_AMP_HAT);
        assert_eq!(binary_op(BinaryOp::AmpHat), Some(NO_SUCH_AMP_HAT));
        assert_eq!(binary_op(BinaryOp::As), None);
        assert_eq!(binary_op(BinaryOp::And), Some(" && "));
    }
}
