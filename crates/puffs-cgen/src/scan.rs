//! Pre-order walk over a function body.
//!
//! Before any C is written for a function, one pass over its body numbers
//! every `while` loop in pre-order, resolves every `break`/`continue` to
//! the loop it leaves, and collects the `var` statements whose C
//! declarations must be hoisted to the top of the function. The statement
//! translator later visits the body in the same order and consumes these
//! results through cursors, so the two walks never disagree.

use puffs_types::ast::{JumpKind, Stmt, VarStmt};
use puffs_types::{Id, IdMap};

use crate::error::{CodegenError, CodegenResult, NestingKind};
use crate::jump::MAX_BODY_DEPTH;

/// What the translator needs to know about one loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopInfo {
    pub label: Option<Id>,
    /// Some jump targets this loop's `break` label.
    pub has_break: bool,
    /// Some jump targets this loop's `continue` label.
    pub has_continue: bool,
}

/// Result of scanning one function body.
#[derive(Debug, Default)]
pub struct BodyIndex<'a> {
    /// Loops in pre-order; the position is the loop's index.
    pub loops: Vec<LoopInfo>,
    /// For every jump statement in pre-order, the index of its target loop.
    pub jumps: Vec<usize>,
    /// Variable declarations in pre-order.
    pub vars: Vec<&'a VarStmt>,
}

impl<'a> BodyIndex<'a> {
    /// Scan `body`. `func` names the function in error messages.
    pub fn build(body: &'a [Stmt], ids: &IdMap, func: &str) -> CodegenResult<Self> {
        let mut scanner = Scanner {
            ids,
            func,
            index: BodyIndex::default(),
            enclosing: Vec::new(),
        };
        scanner.walk(body, 0)?;
        Ok(scanner.index)
    }
}

struct Scanner<'a, 's> {
    ids: &'s IdMap,
    func: &'s str,
    index: BodyIndex<'a>,
    /// Indices of the loops enclosing the current statement, outermost first.
    enclosing: Vec<usize>,
}

impl<'a> Scanner<'a, '_> {
    fn walk(&mut self, stmts: &'a [Stmt], depth: u32) -> CodegenResult<()> {
        let depth = depth + 1;
        if depth > MAX_BODY_DEPTH {
            return Err(CodegenError::NestingTooDeep {
                kind: NestingKind::Body,
                func: self.func.to_string(),
            });
        }
        for stmt in stmts {
            match stmt {
                Stmt::Var(v) => self.index.vars.push(v),
                Stmt::While(w) => {
                    let id = self.index.loops.len();
                    self.index.loops.push(LoopInfo {
                        label: w.label,
                        has_break: false,
                        has_continue: false,
                    });
                    self.enclosing.push(id);
                    let result = self.walk(&w.body, depth);
                    self.enclosing.pop();
                    result?;
                }
                Stmt::Jump(j) => {
                    let target = self.resolve(j.label).ok_or_else(|| {
                        CodegenError::UnresolvedJump {
                            kind: j.kind,
                            label: j.label.and_then(|l| self.ids.get(l)).map(str::to_string),
                            func: self.func.to_string(),
                            span: j.span,
                        }
                    })?;
                    let info = &mut self.index.loops[target];
                    match j.kind {
                        JumpKind::Break => info.has_break = true,
                        JumpKind::Continue => info.has_continue = true,
                    }
                    self.index.jumps.push(target);
                }
                Stmt::If(s) => {
                    self.walk(&s.then_body, depth)?;
                    self.walk(&s.else_body, depth)?;
                }
                Stmt::Assert(_) | Stmt::Assign(_) | Stmt::Return(_) => {}
            }
        }
        Ok(())
    }

    /// The innermost enclosing loop, or the innermost one carrying `label`.
    fn resolve(&self, label: Option<Id>) -> Option<usize> {
        let mut candidates = self.enclosing.iter().rev().copied();
        match label {
            None => candidates.next(),
            Some(label) => candidates.find(|&id| self.index.loops[id].label == Some(label)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use puffs_types::ast::{Expr, ExprKind, TypeExpr};

    fn cond() -> Expr {
        Expr::new(ExprKind::Literal(Id::NONE)).with_const(1)
    }

    #[test]
    fn loops_are_numbered_in_pre_order() {
        let mut ids = IdMap::new();
        let outer = ids.intern("outer");
        let body = vec![
            Stmt::labeled_while(
                outer,
                cond(),
                vec![
                    Stmt::while_loop(cond(), vec![Stmt::labeled_jump(JumpKind::Continue, outer)]),
                    Stmt::jump(JumpKind::Break),
                ],
            ),
            Stmt::while_loop(cond(), Vec::new()),
        ];
        let index = BodyIndex::build(&body, &ids, "f").unwrap();
        assert_eq!(index.loops.len(), 3);
        assert_eq!(index.loops[0].label, Some(outer));
        assert!(index.loops[0].has_break && index.loops[0].has_continue);
        assert!(!index.loops[1].has_break && !index.loops[1].has_continue);
        assert_eq!(index.jumps, [0, 0]);
    }

    #[test]
    fn unlabeled_jump_targets_innermost_loop() {
        let ids = IdMap::new();
        let body = vec![Stmt::while_loop(
            cond(),
            vec![Stmt::while_loop(cond(), vec![Stmt::jump(JumpKind::Break)])],
        )];
        let index = BodyIndex::build(&body, &ids, "f").unwrap();
        assert_eq!(index.jumps, [1]);
        assert!(index.loops[1].has_break);
        assert!(!index.loops[0].has_break);
    }

    #[test]
    fn jump_outside_loop_is_an_error() {
        let mut ids = IdMap::new();
        let missing = ids.intern("missing");
        let err = BodyIndex::build(&[Stmt::jump(JumpKind::Break)], &ids, "f").unwrap_err();
        assert!(matches!(err, CodegenError::UnresolvedJump { label: None, .. }));

        let body = vec![Stmt::while_loop(
            cond(),
            vec![Stmt::labeled_jump(JumpKind::Continue, missing)],
        )];
        let err = BodyIndex::build(&body, &ids, "f").unwrap_err();
        assert!(err.to_string().contains("\"missing\""), "{err}");
    }

    #[test]
    fn vars_are_collected_from_nested_bodies() {
        let mut ids = IdMap::new();
        let (a, b, u32_) = (ids.intern("a"), ids.intern("b"), ids.intern("u32"));
        let body = vec![
            Stmt::var(a, TypeExpr::Named(u32_), None),
            Stmt::while_loop(cond(), vec![Stmt::var(b, TypeExpr::Named(u32_), None)]),
        ];
        let index = BodyIndex::build(&body, &ids, "f").unwrap();
        let names: Vec<_> = index.vars.iter().map(|v| v.name).collect();
        assert_eq!(names, [a, b]);
    }

    #[test]
    fn nesting_is_capped() {
        let ids = IdMap::new();
        let mut body = Vec::new();
        for _ in 0..MAX_BODY_DEPTH {
            body = vec![Stmt::while_loop(cond(), body)];
        }
        // MAX_BODY_DEPTH loops put the innermost body at depth MAX + 1.
        let err = BodyIndex::build(&body, &ids, "f").unwrap_err();
        assert!(matches!(err, CodegenError::NestingTooDeep { kind: NestingKind::Body, .. }));
        let ok = vec![Stmt::while_loop(cond(), Vec::new())];
        assert!(BodyIndex::build(&ok, &ids, "f").is_ok());
    }
}
