use std::{collections::HashMap, rc::Rc};

use tracing::trace;

use crate::{
    ast::REST_MARKER,
    error::{RuntimeError, RuntimeErrorKind},
    interpreter::{
        environment::Environment, evaluator::core::EvalResult, token::SourcePos,
        value::core::Value,
    },
    util::stack::ensure_sufficient_stack,
};

/// A value that can be called: a native built-in or a user lambda.
pub trait Callable {
    /// The name shown in stack traces and when the function is printed.
    fn name(&self) -> &str;

    /// The declared parameter names in order. A rest parameter carries the
    /// [`REST_MARKER`] suffix and is always last.
    fn param_names(&self) -> Vec<String>;

    /// Runs the function with already bound arguments.
    ///
    /// `env` is the caller's environment and `pos` the call site.
    ///
    /// # Errors
    /// Any runtime error raised by the function.
    fn execute(&self, args: Args, env: &Environment, pos: &SourcePos) -> EvalResult<Value>;
}

/// An evaluated call argument, before binding to parameters.
#[derive(Debug, Clone)]
pub struct Argument {
    /// The parameter name of a named argument.
    pub name:  Option<String>,
    /// The argument value.
    pub value: Value,
}

impl Argument {
    /// A positional argument.
    #[must_use]
    pub const fn positional(value: Value) -> Self {
        Self { name: None, value }
    }

    /// A named argument.
    #[must_use]
    pub fn named(name: &str, value: Value) -> Self {
        Self { name: Some(name.to_string()),
               value }
    }
}

/// Arguments bound to parameter names.
///
/// Parameters that received no argument stay unbound: lambdas fill them from
/// their default expressions, native functions treat them as optional or
/// report them through [`Args::get`].
#[derive(Debug)]
pub struct Args {
    function: String,
    values:   HashMap<String, Value>,
    pos:      SourcePos,
}

impl Args {
    /// Binds evaluated arguments to `params`.
    ///
    /// Positional arguments bind in order, then named arguments bind by
    /// name. Whatever is left over goes into the rest parameter, if any.
    ///
    /// # Errors
    /// - `TooManyArguments` for surplus positional arguments without a rest
    ///   parameter.
    /// - `UnknownArgument` for a named argument matching no parameter without
    ///   a rest parameter.
    ///
    /// # Example
    /// ```
    /// use ckl::interpreter::{
    ///     evaluator::function::core::{Argument, Args},
    ///     token::SourcePos,
    ///     value::core::Value,
    /// };
    ///
    /// let params = vec!["a".to_string(), "rest...".to_string()];
    /// let args = Args::bind("f",
    ///                       &params,
    ///                       vec![Argument::positional(Value::Int(1)),
    ///                            Argument::positional(Value::Int(2)),
    ///                            Argument::named("x", Value::Int(3))],
    ///                       &SourcePos::native()).unwrap();
    ///
    /// assert_eq!(args.get("a").unwrap(), Value::Int(1));
    /// assert_eq!(args.get("rest").unwrap(), Value::from(vec![Value::Int(2), Value::Int(3)]));
    /// ```
    pub fn bind(function: &str,
                params: &[String],
                arguments: Vec<Argument>,
                pos: &SourcePos)
                -> EvalResult<Self> {
        let (fixed, rest) = match params.split_last() {
            Some((last, fixed)) if last.ends_with(REST_MARKER) => {
                (fixed, Some(last.trim_end_matches(REST_MARKER)))
            },
            _ => (params, None),
        };

        let mut values = HashMap::new();
        let mut rest_values = Vec::new();
        let (positional, named): (Vec<_>, Vec<_>) =
            arguments.into_iter().partition(|arg| arg.name.is_none());

        for (i, arg) in positional.into_iter().enumerate() {
            if let Some(param) = fixed.get(i) {
                values.insert(param.clone(), arg.value);
            } else if rest.is_some() {
                rest_values.push(arg.value);
            } else {
                return Err(RuntimeError::new(RuntimeErrorKind::TooManyArguments { function: function.to_string() },
                                             pos.clone()));
            }
        }

        for arg in named {
            let name = arg.name.unwrap_or_default();
            if fixed.contains(&name) {
                values.insert(name, arg.value);
            } else if rest.is_some() {
                rest_values.push(arg.value);
            } else {
                return Err(RuntimeError::new(RuntimeErrorKind::UnknownArgument { function: function.to_string(),
                                                                                 name },
                                             pos.clone()));
            }
        }

        if let Some(rest) = rest {
            values.insert(rest.to_string(), Value::from(rest_values));
        }

        Ok(Self { function: function.to_string(),
                  values,
                  pos: pos.clone() })
    }

    /// Returns the value bound to `name`, or `None`.
    #[must_use]
    pub fn get_opt(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    /// Removes and returns the value bound to `name`.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// Returns the value bound to `name`.
    ///
    /// # Errors
    /// `MissingArgument` if nothing bound it.
    pub fn get(&self, name: &str) -> EvalResult<Value> {
        self.get_opt(name).ok_or_else(|| {
                              RuntimeError::new(RuntimeErrorKind::MissingArgument { function: self.function.clone(),
                                                                                    param:    name.to_string(), },
                                                self.pos.clone())
                          })
    }

    /// Returns the value bound to `name`, treating `NULL` like a missing
    /// argument.
    #[must_use]
    pub fn get_or_null(&self, name: &str) -> Option<Value> {
        self.get_opt(name).filter(|v| !v.is_null())
    }

    /// Returns the argument as an integer.
    ///
    /// # Errors
    /// `MissingArgument` or `TypeError`.
    pub fn get_int(&self, name: &str) -> EvalResult<i64> {
        self.get(name)?.as_int(&self.pos)
    }

    /// Returns the argument rendered as a string.
    ///
    /// # Errors
    /// `MissingArgument`.
    pub fn get_string(&self, name: &str) -> EvalResult<String> {
        Ok(self.get(name)?.to_string())
    }
}

/// Calls `func`, binding `arguments` to its parameters.
///
/// Guards the call depth and appends a stack frame to any error unwinding
/// through the call.
///
/// # Errors
/// Binding errors, `StackOverflow`, or whatever the function raises.
pub fn call_function(func: &Rc<dyn Callable>,
                     arguments: Vec<Argument>,
                     env: &Environment,
                     pos: &SourcePos)
                     -> EvalResult<Value> {
    let runtime = env.runtime();
    let _guard = runtime.enter_call(pos)?;
    trace!(function = func.name(), %pos, "call");

    ensure_sufficient_stack(|| {
        let args = Args::bind(func.name(), &func.param_names(), arguments, pos)?;
        func.execute(args, env, pos)
    }).map_err(|e| e.with_frame(func.name(), pos))
}

/// Calls `func` with positional arguments only.
///
/// # Errors
/// See [`call_function`].
pub fn call_positional(func: &Rc<dyn Callable>,
                       values: Vec<Value>,
                       env: &Environment,
                       pos: &SourcePos)
                       -> EvalResult<Value> {
    call_function(func,
                  values.into_iter().map(Argument::positional).collect(),
                  env,
                  pos)
}
