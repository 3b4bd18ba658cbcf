use std::rc::Rc;

use crate::{
    error::{RuntimeError, RuntimeErrorKind},
    interpreter::{
        environment::Environment,
        evaluator::{
            core::{EvalResult, run_program},
            function::core::Args,
        },
        parser::core::parse_source,
        token::SourcePos,
        value::{
            core::Value,
            stream::{InputStream, OutputStream},
        },
    },
};

/// Filename reported for code handed to `parse` or `eval` as text.
const EVAL_FILENAME: &str = "<eval>";

fn io_error(e: &std::io::Error, pos: &SourcePos) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::Io { details: e.to_string() }, pos.clone())
}

/// `parse(source)`: the AST of `source`, as a node value.
///
/// Syntax errors propagate to the host. `catch` does not intercept them.
pub fn parse(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    let source = args.get_string("source")?;
    Ok(Value::Node(Rc::new(parse_source(&source, EVAL_FILENAME)?)))
}

/// `eval(node)` evaluates a node value, or source text, in the caller's
/// environment.
pub fn eval(args: &Args, env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    match args.get("node")? {
        Value::Node(node) => run_program(&node, env),
        other => {
            let node = parse_source(&other.to_string(), EVAL_FILENAME)?;
            run_program(&node, env)
        },
    }
}

fn output_stream(args: &Args, env: &Environment, pos: &SourcePos) -> EvalResult<Rc<OutputStream>> {
    let target = match args.get_or_null("out") {
        Some(out) => out,
        None => env.lookup("stdout", pos)?,
    };
    match target {
        Value::Output(out) => Ok(out),
        other => Err(RuntimeError::type_error(format!("Cannot write to {}", other.type_name()), pos)),
    }
}

fn input_stream(args: &Args, env: &Environment, pos: &SourcePos) -> EvalResult<Rc<InputStream>> {
    let source = match args.get_or_null("input") {
        Some(input) => input,
        None => env.lookup("stdin", pos)?,
    };
    match source {
        Value::Input(input) => Ok(input),
        other => Err(RuntimeError::type_error(format!("Cannot read from {}", other.type_name()), pos)),
    }
}

/// `print(obj, out = stdout)` writes the value without a newline.
pub fn print(args: &Args, env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let obj = args.get("obj")?;
    output_stream(args, env, pos)?.write(&obj.to_string())
                                  .map_err(|e| io_error(&e, pos))?;
    Ok(Value::Null)
}

/// `println(obj = "", out = stdout)` writes the value and a newline.
pub fn println(args: &Args, env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let text = args.get_opt("obj").map(|v| v.to_string()).unwrap_or_default();
    output_stream(args, env, pos)?.write(&format!("{text}\n"))
                                  .map_err(|e| io_error(&e, pos))?;
    Ok(Value::Null)
}

/// `read_line(input = stdin)`: the next line without its terminator, or
/// `NULL` at the end of input.
pub fn read_line(args: &Args, env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let line = input_stream(args, env, pos)?.read_line()
                                            .map_err(|e| io_error(&e, pos))?;
    Ok(line.map_or(Value::Null, Value::String))
}
