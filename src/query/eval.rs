//! Expression evaluation
//!
//! Evaluation starts with the root element as context node, at position 1
//! of a context of size 1. Absolute paths start from the document node.

use crate::query::axes::{matches_node_test, navigate, NodeRef, QueryDocument};
use crate::query::functions::{self, CallContext};
use crate::query::parser::{BinaryOp, Expr, LocationPath, Step};
use crate::query::value::Value;

/// Evaluation context
#[derive(Debug, Clone, Copy)]
struct Context {
    node: NodeRef,
    position: usize,
    size: usize,
}

pub struct Evaluator<'d, 'a> {
    doc: &'d QueryDocument<'a>,
}

impl<'d, 'a> Evaluator<'d, 'a> {
    pub fn new(doc: &'d QueryDocument<'a>) -> Self {
        Self { doc }
    }

    /// Evaluate with the root element as context node
    pub fn evaluate(&self, expr: &Expr) -> Result<Value, String> {
        let ctx = Context {
            node: self.doc.root_element(),
            position: 1,
            size: 1,
        };
        self.eval(expr, ctx)
    }

    fn eval(&self, expr: &Expr, ctx: Context) -> Result<Value, String> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Literal(s) => Ok(Value::String(s.clone())),
            Expr::Path(path) => Ok(Value::NodeSet(self.eval_path(path, ctx)?)),
            Expr::Filter {
                primary,
                predicates,
                steps,
            } => {
                let Value::NodeSet(nodes) = self.eval(primary, ctx)? else {
                    return Err("predicates and steps require a node-set".to_string());
                };
                let mut nodes = self.apply_predicates(nodes, predicates)?;
                for step in steps {
                    nodes = self.eval_step(&nodes, step)?;
                }
                Ok(Value::NodeSet(nodes))
            }
            Expr::Union(left, right) => {
                let (Value::NodeSet(mut nodes), Value::NodeSet(other)) =
                    (self.eval(left, ctx)?, self.eval(right, ctx)?)
                else {
                    return Err("union operands must be node-sets".to_string());
                };
                nodes.extend(other);
                Ok(Value::NodeSet(document_order(nodes)))
            }
            Expr::Negate(inner) => Ok(Value::Number(-self.eval(inner, ctx)?.to_number(self.doc))),
            Expr::Binary(left, op, right) => self.eval_binary(left, *op, right, ctx),
            Expr::Function(name, args) => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                let call_ctx = CallContext {
                    doc: self.doc,
                    node: ctx.node,
                    position: ctx.position,
                    size: ctx.size,
                };
                functions::call(name, args, &call_ctx)
            }
        }
    }

    fn eval_path(&self, path: &LocationPath, ctx: Context) -> Result<Vec<NodeRef>, String> {
        let start = if path.absolute {
            NodeRef::DOCUMENT
        } else {
            ctx.node
        };
        let mut nodes = vec![start];
        for step in &path.steps {
            nodes = self.eval_step(&nodes, step)?;
        }
        Ok(nodes)
    }

    fn eval_step(&self, input: &[NodeRef], step: &Step) -> Result<Vec<NodeRef>, String> {
        let mut out = Vec::new();
        for &node in input {
            let candidates: Vec<NodeRef> = navigate(self.doc, node, step.axis)
                .into_iter()
                .filter(|&n| matches_node_test(self.doc, n, step.axis, &step.test))
                .collect();
            out.extend(self.apply_predicates(candidates, &step.predicates)?);
        }
        Ok(document_order(out))
    }

    /// Filter `nodes` through each predicate in turn; a numeric predicate
    /// selects by position.
    fn apply_predicates(
        &self,
        mut nodes: Vec<NodeRef>,
        predicates: &[Expr],
    ) -> Result<Vec<NodeRef>, String> {
        for predicate in predicates {
            let size = nodes.len();
            let mut kept = Vec::with_capacity(size);
            for (index, &node) in nodes.iter().enumerate() {
                let ctx = Context {
                    node,
                    position: index + 1,
                    size,
                };
                let keep = match self.eval(predicate, ctx)? {
                    Value::Number(n) => n == (index + 1) as f64,
                    other => other.to_boolean(),
                };
                if keep {
                    kept.push(node);
                }
            }
            nodes = kept;
        }
        Ok(nodes)
    }

    fn eval_binary(
        &self,
        left: &Expr,
        op: BinaryOp,
        right: &Expr,
        ctx: Context,
    ) -> Result<Value, String> {
        match op {
            BinaryOp::Or => {
                if self.eval(left, ctx)?.to_boolean() {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(self.eval(right, ctx)?.to_boolean()))
            }
            BinaryOp::And => {
                if !self.eval(left, ctx)?.to_boolean() {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(self.eval(right, ctx)?.to_boolean()))
            }
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq => {
                let left = self.eval(left, ctx)?;
                let right = self.eval(right, ctx)?;
                Ok(Value::Boolean(self.compare(op, &left, &right)))
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                let a = self.eval(left, ctx)?.to_number(self.doc);
                let b = self.eval(right, ctx)?.to_number(self.doc);
                let result = match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    _ => a % b,
                };
                Ok(Value::Number(result))
            }
        }
    }

    /// Comparison with node-set existential semantics: a node-set operand
    /// compares true when any of its nodes does.
    fn compare(&self, op: BinaryOp, left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::NodeSet(_), Value::Boolean(b)) => {
                compare_atomic(self.doc, op, &Value::Boolean(left.to_boolean()), &Value::Boolean(*b))
            }
            (Value::Boolean(b), Value::NodeSet(_)) => {
                compare_atomic(self.doc, op, &Value::Boolean(*b), &Value::Boolean(right.to_boolean()))
            }
            (Value::NodeSet(lhs), Value::NodeSet(rhs)) => {
                let rhs: Vec<Value> = rhs.iter().map(|&n| self.node_string(n)).collect();
                lhs.iter().any(|&l| {
                    let l = self.node_string(l);
                    rhs.iter().any(|r| compare_atomic(self.doc, op, &l, r))
                })
            }
            (Value::NodeSet(lhs), other) => lhs
                .iter()
                .any(|&l| compare_atomic(self.doc, op, &self.node_string(l), other)),
            (other, Value::NodeSet(rhs)) => rhs
                .iter()
                .any(|&r| compare_atomic(self.doc, op, other, &self.node_string(r))),
            _ => compare_atomic(self.doc, op, left, right),
        }
    }

    fn node_string(&self, node: NodeRef) -> Value {
        Value::String(self.doc.string_value(node))
    }
}

/// Compare two non-node-set values.
///
/// Equality compares as booleans if either side is boolean, else as numbers
/// if either side is a number, else as strings. Ordering always compares
/// numbers.
fn compare_atomic(doc: &QueryDocument<'_>, op: BinaryOp, left: &Value, right: &Value) -> bool {
    match op {
        BinaryOp::Eq | BinaryOp::NotEq => {
            let equal = match (left, right) {
                (Value::Boolean(_), _) | (_, Value::Boolean(_)) => {
                    left.to_boolean() == right.to_boolean()
                }
                (Value::Number(_), _) | (_, Value::Number(_)) => {
                    left.to_number(doc) == right.to_number(doc)
                }
                _ => left.to_string_value(doc) == right.to_string_value(doc),
            };
            if op == BinaryOp::Eq {
                equal
            } else {
                !equal
            }
        }
        _ => {
            let a = left.to_number(doc);
            let b = right.to_number(doc);
            match op {
                BinaryOp::Lt => a < b,
                BinaryOp::LtEq => a <= b,
                BinaryOp::Gt => a > b,
                _ => a >= b,
            }
        }
    }
}

fn document_order(mut nodes: Vec<NodeRef>) -> Vec<NodeRef> {
    nodes.sort_unstable();
    nodes.dedup();
    nodes
}
