use std::rc::Rc;

use crate::interpreter::{
    environment::Environment,
    evaluator::{
        core::EvalResult,
        function::{
            collections, conversion,
            core::{Args, Callable},
            io, operators, predicates,
        },
    },
    token::SourcePos,
    value::{
        core::Value,
        stream::{InputStream, OutputStream},
    },
};

/// Signature of native built-ins.
///
/// A built-in receives its bound arguments, the caller's environment and the
/// call site.
pub type BuiltinFn = fn(&Args, &Environment, &SourcePos) -> EvalResult<Value>;

/// A built-in function implemented in Rust.
#[derive(Clone, Copy)]
pub struct NativeFunc {
    name:   &'static str,
    params: &'static [&'static str],
    func:   BuiltinFn,
}

impl Callable for NativeFunc {
    fn name(&self) -> &str {
        self.name
    }

    fn param_names(&self) -> Vec<String> {
        self.params.iter().map(ToString::to_string).collect()
    }

    fn execute(&self, args: Args, env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
        (self.func)(&args, env, pos)
    }
}

/// Defines built-in functions by generating a lookup table.
///
/// Each entry provides:
/// - a string name,
/// - the parameter names, a rest parameter last with its `...` suffix,
/// - a function pointer implementing the built-in.
macro_rules! builtin_functions {
    (
        $(
            $name:literal ( $($param:literal),* ) => $func:expr
        ),* $(,)?
    ) => {
        static BUILTIN_TABLE: &[NativeFunc] = &[
            $(
                NativeFunc { name: $name, params: &[$($param),*], func: $func },
            )*
        ];
    };
}

builtin_functions! {
    "add"               ("a", "b")                    => operators::add,
    "sub"               ("a", "b")                    => operators::sub,
    "mul"               ("a", "b")                    => operators::mul,
    "div"               ("a", "b")                    => operators::div,
    "mod"               ("a", "b")                    => operators::modulo,
    "equals"            ("a", "b")                    => operators::equals,
    "not_equals"        ("a", "b")                    => operators::not_equals,
    "less"              ("a", "b")                    => operators::less,
    "less_equals"       ("a", "b")                    => operators::less_equals,
    "greater"           ("a", "b")                    => operators::greater,
    "greater_equals"    ("a", "b")                    => operators::greater_equals,
    "compare"           ("a", "b")                    => operators::compare,
    "is_empty"          ("obj")                       => predicates::is_empty,
    "is_zero"           ("obj")                       => predicates::is_zero,
    "is_negative"       ("obj")                       => predicates::is_negative,
    "is_numerical"      ("obj")                       => predicates::is_numerical,
    "is_alphanumerical" ("obj")                       => predicates::is_alphanumerical,
    "is_date"           ("obj")                       => predicates::is_date,
    "is_date_hour"      ("obj")                       => predicates::is_date_hour,
    "is_time"           ("obj")                       => predicates::is_time,
    "starts_with"       ("str", "part")               => predicates::starts_with,
    "ends_with"         ("str", "part")               => predicates::ends_with,
    "contains"          ("obj", "part")               => predicates::contains,
    "matches"           ("str", "pattern")            => predicates::matches,
    "length"            ("obj")                       => collections::length,
    "range"             ("a", "b", "step")            => collections::range,
    "sum"               ("list")                      => collections::sum,
    "list"              ("obj")                       => collections::list,
    "set"               ("obj")                       => collections::set,
    "map"               ("obj")                       => collections::map,
    "keys"              ("obj")                       => collections::keys,
    "values"            ("obj")                       => collections::values,
    "append"            ("obj", "element")            => collections::append,
    "string"            ("obj")                       => conversion::string,
    "int"               ("obj")                       => conversion::int,
    "decimal"           ("obj")                       => conversion::decimal,
    "boolean"           ("obj")                       => conversion::boolean,
    "type"              ("obj")                       => conversion::type_of,
    "identity"          ("obj")                       => conversion::identity,
    "date"              ("obj")                       => conversion::date,
    "pattern"           ("obj")                       => conversion::pattern,
    "assert"            ("condition", "message")      => conversion::assert,
    "parse"             ("source")                    => io::parse,
    "eval"              ("node")                      => io::eval,
    "print"             ("obj", "out")                => io::print,
    "println"           ("obj", "out")                => io::println,
    "read_line"         ("input")                     => io::read_line,
}

/// Populates `env` with every built-in function and constant.
///
/// `DIV_0_VALUE` stays unbound, so division by zero raises
/// until a script or host defines it.
pub fn install(env: &Environment) {
    for func in BUILTIN_TABLE {
        env.define(func.name, Value::Func(Rc::new(*func)));
    }

    env.define("NULL", Value::Null);
    env.define("MAXINT", Value::Int(i64::MAX));
    env.define("MININT", Value::Int(i64::MIN));
    env.define("MAXDECIMAL", Value::Decimal(f64::MAX));
    env.define("MINDECIMAL", Value::Decimal(f64::MIN));
    env.define("PS", Value::String(std::path::MAIN_SEPARATOR.to_string()));
    env.define("LS", Value::from(if cfg!(windows) { "\r\n" } else { "\n" }));
    env.define("OS_NAME", Value::from(std::env::consts::OS));
    env.define("OS_ARCH", Value::from(std::env::consts::ARCH));
    env.define("stdin", Value::Input(Rc::new(InputStream::stdin())));
    env.define("stdout", Value::Output(Rc::new(OutputStream::stdout())));
    env.define("stderr", Value::Output(Rc::new(OutputStream::stderr())));
}
