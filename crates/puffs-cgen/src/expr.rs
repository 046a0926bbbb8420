//! Expression codegen.
//!
//! Every binary operation is wrapped in parentheses, so no precedence
//! table is needed. Subtrees the front end already folded to a constant
//! are printed as that constant without further recursion.

use puffs_types::ast::{Expr, ExprKind, THIS};

use crate::buffer::Buffer;
use crate::compiler::FuncContext;
use crate::error::{CodegenResult, NestingKind};
use crate::jump::MAX_EXPR_DEPTH;
use crate::types::{binary_op, FIELD_PREFIX, LOCAL_PREFIX, PARAM_PREFIX};

/// Write a statement-level expression.
pub fn write_expr(e: &Expr, ctx: &FuncContext, out: &mut Buffer) -> CodegenResult<()> {
    write_expr_at(e, ctx, out, 0)
}

fn write_expr_at(e: &Expr, ctx: &FuncContext, out: &mut Buffer, depth: u32) -> CodegenResult<()> {
    let depth = depth + 1;
    if depth > MAX_EXPR_DEPTH {
        return Err(ctx.nesting_error(NestingKind::Expression));
    }

    if let Some(value) = e.const_value {
        printf!(out, "{value}");
        return Ok(());
    }

    match &e.kind {
        ExprKind::Literal(token) => {
            let text = ctx.name(*token)?;
            if !is_c_integer_literal(text) {
                return Err(ctx.unsupported(format!("literal {text:?}"), e.span));
            }
            out.writes(text);
        }
        ExprKind::Ident(id) => {
            let name = ctx.name(*id)?;
            if name == THIS {
                out.writes("self");
            } else if ctx.is_param(*id) {
                printf!(out, "{PARAM_PREFIX}{name}");
            } else {
                printf!(out, "{LOCAL_PREFIX}{name}");
            }
        }
        ExprKind::Dot { lhs, field } => {
            write_expr_at(lhs, ctx, out, depth)?;
            printf!(out, "->{FIELD_PREFIX}{}", ctx.name(*field)?);
        }
        ExprKind::Binary { op, lhs, rhs } => {
            let Some(symbol) = binary_op(*op) else {
                return Err(ctx.unsupported(format!("{:?} conversion", op.as_str()), e.span));
            };
            out.writeb('(');
            write_expr_at(lhs, ctx, out, depth)?;
            out.writes(symbol);
            write_expr_at(rhs, ctx, out, depth)?;
            out.writeb(')');
        }
        ExprKind::Call { .. }
        | ExprKind::Index { .. }
        | ExprKind::Slice { .. }
        | ExprKind::Unary { .. }
        | ExprKind::Associative { .. } => {
            return Err(ctx.unsupported(e.kind.describe(), e.span));
        }
    }
    Ok(())
}

/// Decimal or `0x` hex digits, which C spells the same way.
fn is_c_integer_literal(text: &str) -> bool {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()),
    }
}
