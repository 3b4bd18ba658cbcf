use std::ops::ControlFlow;

use crate::{
    ast::{CallArgument, Node},
    error::{RuntimeError, RuntimeErrorKind},
    interpreter::{
        environment::Environment,
        evaluator::{
            core::EvalResult,
            function::core::{Argument, call_function},
        },
        token::SourcePos,
        value::core::Value,
    },
};

/// Evaluates call arguments left to right.
///
/// A `...value` argument expands in place: list and set elements become
/// positional arguments, map entries with string keys become named
/// arguments and the remaining entries positional ones.
pub fn eval_arguments(args: &[CallArgument], env: &Environment) -> EvalResult<ControlFlow<Value, Vec<Argument>>> {
    let mut arguments = Vec::with_capacity(args.len());
    for arg in args {
        match (&arg.name, &arg.value) {
            (None, Node::Spread { value, pos }) => {
                let spread = eval_flow!(value, env);
                spread_arguments(&mut arguments, spread, pos)?;
            },
            (name, value) => {
                arguments.push(Argument { name:  name.clone(),
                                          value: eval_flow!(value, env), });
            },
        }
    }
    Ok(ControlFlow::Continue(arguments))
}

fn spread_arguments(arguments: &mut Vec<Argument>, spread: Value, pos: &SourcePos) -> EvalResult<()> {
    match spread {
        Value::Null => {},
        Value::List(list) => arguments.extend(list.borrow().iter().cloned().map(Argument::positional)),
        Value::Set(set) => arguments.extend(set.borrow().iter().cloned().map(Argument::positional)),
        Value::Map(map) => {
            for (key, value) in map.borrow().iter() {
                arguments.push(match key {
                                   Value::String(name) => Argument::named(name, value.clone()),
                                   _ => Argument::positional(value.clone()),
                               });
            }
        },
        other => {
            return Err(RuntimeError::type_error(format!("Cannot spread {} into arguments",
                                                        other.type_name()),
                                                pos));
        },
    }
    Ok(())
}

/// Evaluates `function(args)`.
///
/// The function expression is resolved through the environment like any
/// other, which is what lets scripts rebind operator functions such as
/// `add`.
pub fn eval_call(function: &Node,
                 args: &[CallArgument],
                 env: &Environment,
                 pos: &SourcePos)
                 -> EvalResult<Value> {
    let func = eval_value!(function, env).as_func(pos)?;
    let arguments = unwrap_flow!(eval_arguments(args, env));
    call_function(&func, arguments, env, pos)
}

/// Evaluates `target->member(args)`.
///
/// - A plain object with a function field `member` calls it with the object
///   prepended to the arguments.
/// - A module object calls its function `member` without a receiver, and
///   reports a missing member.
/// - Any other receiver, or a plain object without that field, calls the
///   function `member` from the environment with the receiver prepended.
pub fn eval_invoke(target: &Node,
                   member: &str,
                   args: &[CallArgument],
                   env: &Environment,
                   pos: &SourcePos)
                   -> EvalResult<Value> {
    let receiver = eval_value!(target, env);
    let mut arguments = unwrap_flow!(eval_arguments(args, env));

    if let Value::Object(object) = &receiver {
        let field = object.fields.borrow().get(member).cloned();
        match (field, object.module.is_some()) {
            (Some(Value::Func(func)), true) => return call_function(&func, arguments, env, pos),
            (Some(Value::Func(func)), false) => {
                arguments.insert(0, Argument::positional(receiver.clone()));
                return call_function(&func, arguments, env, pos);
            },
            (Some(other), _) => {
                return Err(RuntimeError::new(RuntimeErrorKind::NotAFunction { found: other.type_name()
                                                                                          .to_string(), },
                                             pos.clone()));
            },
            (None, true) => {
                return Err(RuntimeError::new(RuntimeErrorKind::UnknownField { name: member.to_string() },
                                             pos.clone()));
            },
            (None, false) => {},
        }
    }

    let func = env.lookup(member, pos)?.as_func(pos)?;
    arguments.insert(0, Argument::positional(receiver));
    call_function(&func, arguments, env, pos)
}
