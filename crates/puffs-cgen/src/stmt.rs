//! Statement codegen.

use puffs_types::ast::Stmt;

use crate::buffer::Buffer;
use crate::compiler::FuncContext;
use crate::error::{CodegenResult, NestingKind};
use crate::expr::write_expr;
use crate::jump::MAX_BODY_DEPTH;
use crate::types::{assign_op, LOCAL_PREFIX};

/// Write a sequence of statements one level deeper than `depth`.
///
/// Function bodies start at depth 0, so their statements sit at depth 1.
pub fn write_stmts(
    stmts: &[Stmt],
    ctx: &mut FuncContext,
    out: &mut Buffer,
    depth: u32,
) -> CodegenResult<()> {
    let depth = depth + 1;
    if depth > MAX_BODY_DEPTH {
        return Err(ctx.nesting_error(NestingKind::Body));
    }
    for stmt in stmts {
        write_stmt(stmt, ctx, out, depth)?;
    }
    Ok(())
}

/// Write a single statement.
pub fn write_stmt(
    stmt: &Stmt,
    ctx: &mut FuncContext,
    out: &mut Buffer,
    depth: u32,
) -> CodegenResult<()> {
    match stmt {
        // Checked by the front end; nothing to emit.
        Stmt::Assert(_) => {}

        Stmt::Assign(a) => {
            write_expr(&a.lhs, ctx, out)?;
            out.writes(assign_op(a.op));
            write_expr(&a.rhs, ctx, out)?;
            out.writes(";\n");
        }

        // Storage was declared in the prologue.
        Stmt::Var(v) => {
            printf!(out, "{LOCAL_PREFIX}{} = ", ctx.name(v.name)?);
            match &v.value {
                Some(value) => write_expr(value, ctx, out)?,
                None => out.writeb('0'),
            }
            out.writes(";\n");
        }

        Stmt::While(w) => {
            let (index, info) = ctx.next_loop()?;
            if info.has_continue {
                let id = ctx.jump_target(index)?;
                printf!(out, "label_{id}_continue:;\n");
            }
            out.writes("while (");
            write_expr(&w.condition, ctx, out)?;
            out.writes(") {\n");
            write_stmts(&w.body, ctx, out, depth)?;
            out.writes("}\n");
            if info.has_break {
                let id = ctx.jump_target(index)?;
                printf!(out, "label_{id}_break:;\n");
            }
        }

        Stmt::Jump(j) => {
            let index = ctx.next_jump()?;
            let id = ctx.jump_target(index)?;
            printf!(out, "goto label_{id}_{};\n", j.kind);
        }

        Stmt::If(s) => return Err(ctx.unsupported("if statement", s.span)),
        Stmt::Return(s) => return Err(ctx.unsupported("return statement", s.span)),
    }
    Ok(())
}
