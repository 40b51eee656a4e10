//! Core function library
//!
//! Node-set: `position`, `last`, `count`, `name`, `local-name`.
//! String: `string`, `concat`, `contains`, `starts-with`, `string-length`,
//! `normalize-space`.
//! Boolean: `boolean`, `not`, `true`, `false`.
//! Number: `number`, `sum`, `floor`, `ceiling`, `round`.

use crate::query::axes::{NodeRef, QueryDocument};
use crate::query::value::{parse_number, Value};

/// Accepted argument count `(min, max)` of a known function; `None` max is
/// variadic. Unknown names yield `None`.
pub fn arity(name: &str) -> Option<(usize, Option<usize>)> {
    let bounds = match name {
        "position" | "last" | "true" | "false" => (0, Some(0)),
        "count" | "sum" | "boolean" | "not" | "floor" | "ceiling" | "round" => (1, Some(1)),
        "string" | "string-length" | "normalize-space" | "number" | "name" | "local-name" => {
            (0, Some(1))
        }
        "contains" | "starts-with" => (2, Some(2)),
        "concat" => (2, None),
        _ => return None,
    };
    Some(bounds)
}

/// Where a function is evaluated
pub struct CallContext<'d, 'a> {
    pub doc: &'d QueryDocument<'a>,
    pub node: NodeRef,
    pub position: usize,
    pub size: usize,
}

/// Evaluate a call with already evaluated arguments
pub fn call(name: &str, args: Vec<Value>, ctx: &CallContext<'_, '_>) -> Result<Value, String> {
    let (min, max) = arity(name).ok_or_else(|| format!("unknown function '{}'", name))?;
    if args.len() < min || max.is_some_and(|max| args.len() > max) {
        return Err(format!("wrong number of arguments to {}()", name));
    }

    let doc = ctx.doc;
    match name {
        "position" => Ok(Value::Number(ctx.position as f64)),
        "last" => Ok(Value::Number(ctx.size as f64)),
        "count" => {
            let nodes = node_set_arg(name, &args[0])?;
            Ok(Value::Number(nodes.len() as f64))
        }
        "name" => Ok(Value::String(
            name_target(name, &args, ctx)?.map_or("", |n| doc.name(n)).to_string(),
        )),
        "local-name" => Ok(Value::String(
            name_target(name, &args, ctx)?
                .map_or("", |n| doc.local_name(n))
                .to_string(),
        )),

        "string" => Ok(Value::String(string_arg(&args, ctx))),
        "concat" => Ok(Value::String(
            args.iter().map(|a| a.to_string_value(doc)).collect(),
        )),
        "contains" => {
            let haystack = args[0].to_string_value(doc);
            let needle = args[1].to_string_value(doc);
            Ok(Value::Boolean(haystack.contains(&needle)))
        }
        "starts-with" => {
            let text = args[0].to_string_value(doc);
            let prefix = args[1].to_string_value(doc);
            Ok(Value::Boolean(text.starts_with(&prefix)))
        }
        "string-length" => Ok(Value::Number(string_arg(&args, ctx).chars().count() as f64)),
        "normalize-space" => Ok(Value::String(
            string_arg(&args, ctx)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
        )),

        "boolean" => Ok(Value::Boolean(args[0].to_boolean())),
        "not" => Ok(Value::Boolean(!args[0].to_boolean())),
        "true" => Ok(Value::Boolean(true)),
        "false" => Ok(Value::Boolean(false)),

        "number" => Ok(Value::Number(match args.first() {
            Some(arg) => arg.to_number(doc),
            None => parse_number(&doc.string_value(ctx.node)),
        })),
        "sum" => {
            let nodes = node_set_arg(name, &args[0])?;
            Ok(Value::Number(
                nodes
                    .iter()
                    .map(|&n| parse_number(&doc.string_value(n)))
                    .sum(),
            ))
        }
        "floor" => Ok(Value::Number(args[0].to_number(doc).floor())),
        "ceiling" => Ok(Value::Number(args[0].to_number(doc).ceil())),
        "round" => Ok(Value::Number(round_half_up(args[0].to_number(doc)))),

        _ => Err(format!("unknown function '{}'", name)),
    }
}

fn node_set_arg<'v>(name: &str, arg: &'v Value) -> Result<&'v [NodeRef], String> {
    match arg {
        Value::NodeSet(nodes) => Ok(nodes),
        _ => Err(format!("{}() argument must be a node-set", name)),
    }
}

/// Node named by the optional node-set argument, defaulting to the context
fn name_target(
    name: &str,
    args: &[Value],
    ctx: &CallContext<'_, '_>,
) -> Result<Option<NodeRef>, String> {
    match args.first() {
        None => Ok(Some(ctx.node)),
        Some(arg) => Ok(node_set_arg(name, arg)?.first().copied()),
    }
}

fn string_arg(args: &[Value], ctx: &CallContext<'_, '_>) -> String {
    match args.first() {
        Some(arg) => arg.to_string_value(ctx.doc),
        None => ctx.doc.string_value(ctx.node),
    }
}

/// Round to the nearest integer, halves toward positive infinity
fn round_half_up(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        n
    } else {
        (n + 0.5).floor()
    }
}
