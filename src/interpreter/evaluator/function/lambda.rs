use std::rc::Rc;

use crate::{
    ast::{Node, Parameter, REST_MARKER},
    error::{RuntimeError, RuntimeErrorKind},
    interpreter::{
        environment::Environment,
        evaluator::{
            core::EvalResult,
            function::core::{Args, Callable},
        },
        token::SourcePos,
        value::core::Value,
    },
};

/// Name of lambdas that were never bound by `def`.
pub const ANONYMOUS: &str = "lambda";

/// A user-defined function closing over its defining environment.
pub struct Lambda {
    pub name:   String,
    pub params: Rc<[Parameter]>,
    pub body:   Rc<Node>,
    /// The environment active where the lambda was evaluated.
    pub env:    Environment,
}

impl Callable for Lambda {
    fn name(&self) -> &str {
        &self.name
    }

    fn param_names(&self) -> Vec<String> {
        self.params
            .iter()
            .map(|p| if p.rest { format!("{}{REST_MARKER}", p.name) } else { p.name.clone() })
            .collect()
    }

    /// Evaluates the body in a fresh child of the captured environment.
    ///
    /// Unbound parameters take their default, evaluated in the new
    /// environment so it can see earlier parameters. A `return` ends the call
    /// with its value; a `break` or `continue` reaching the call boundary is
    /// an error.
    fn execute(&self, mut args: Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
        let call_env = self.env.child();

        for param in self.params.iter() {
            let value = match (args.take(&param.name), &param.default) {
                (Some(value), _) => value,
                (None, Some(default)) => default.evaluate(&call_env)?,
                (None, None) if param.rest => Value::from(Vec::new()),
                (None, None) => {
                    return Err(RuntimeError::new(RuntimeErrorKind::MissingArgument { function: self.name.clone(),
                                                                                     param:    param.name
                                                                                                    .clone(), },
                                                 pos.clone()));
                },
            };
            call_env.define(&param.name, value);
        }

        match self.body.evaluate(&call_env)? {
            Value::Return(value) => Ok(*value),
            Value::Break => Err(escape("break", self.body.pos())),
            Value::Continue => Err(escape("continue", self.body.pos())),
            value => Ok(value),
        }
    }
}

fn escape(sentinel: &'static str, pos: &SourcePos) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::ControlFlowEscape { sentinel }, pos.clone())
}
