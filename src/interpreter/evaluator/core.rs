use std::rc::Rc;

use crate::{
    ast::{LogicalOp, Node},
    error::{RuntimeError, RuntimeErrorKind},
    interpreter::{
        environment::Environment,
        evaluator::{
            access, block, call, collection,
            function::lambda::{ANONYMOUS, Lambda},
            loops, require,
        },
        value::core::Value,
    },
    util::stack::ensure_sufficient_stack,
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

impl Node {
    /// Evaluates the node in `env`.
    ///
    /// Statements that end a loop or a call early yield the `Break`,
    /// `Continue` and `Return` sentinels instead of a regular value. Every
    /// construct that sequences evaluation checks for them and passes them
    /// outward until a loop, a function call or [`run_program`] consumes
    /// them.
    ///
    /// # Parameters
    /// - `env`: The environment names are resolved in.
    ///
    /// # Returns
    /// The value of the node, or a control sentinel.
    ///
    /// # Example
    /// ```
    /// use std::rc::Rc;
    ///
    /// use ckl::interpreter::{
    ///     environment::Environment, evaluator::function::builtin::install,
    ///     module::MemorySourceProvider, parser::core::parse_source, value::core::Value,
    /// };
    ///
    /// let env = Environment::new_root(Rc::new(MemorySourceProvider::default()));
    /// install(&env);
    ///
    /// let node = parse_source("1 + 2 * 3", "<doc>").unwrap();
    /// assert_eq!(node.evaluate(&env).unwrap(), Value::Int(7));
    /// ```
    pub fn evaluate(&self, env: &Environment) -> EvalResult<Value> {
        ensure_sufficient_stack(|| self.dispatch(env))
    }

    fn dispatch(&self, env: &Environment) -> EvalResult<Value> {
        match self {
            Self::Literal { value, pos } => Value::from_literal(value, pos),
            Self::Identifier { name, pos } => env.lookup(name, pos),
            Self::Def { name, value, .. } => {
                let value = eval_value!(value, env);
                env.define(name, value.clone());
                Ok(value)
            },
            Self::DefDestructure { names, value, pos } => {
                let value = eval_value!(value, env);
                let items = value.iterate(pos)?;
                for (i, name) in names.iter().enumerate() {
                    env.define(name, items.get(i).cloned().unwrap_or(Value::Null));
                }
                Ok(value)
            },
            Self::Assign { name, value, .. } => {
                let value = eval_value!(value, env);
                if !env.assign(name, value.clone()) {
                    env.define(name, value.clone());
                }
                Ok(value)
            },
            Self::Deref { target, index, pos } => access::eval_deref(target, index, env, pos),
            Self::DerefAssign { target,
                                index,
                                value,
                                pos, } => access::eval_deref_assign(target, index, value, env, pos),
            Self::Invoke { target,
                           member,
                           args,
                           pos, } => call::eval_invoke(target, member, args, env, pos),
            Self::Call { function, args, pos } => call::eval_call(function, args, env, pos),
            Self::Lambda { name, params, body, .. } => {
                Ok(Value::Func(Rc::new(Lambda { name:   name.clone()
                                                            .unwrap_or_else(|| ANONYMOUS.to_string()),
                                                params: Rc::clone(params),
                                                body:   Rc::clone(body),
                                                env:    env.clone(), })))
            },
            Self::Block { body,
                          catches,
                          finally,
                          .. } => block::eval_block(body, catches, finally, env),
            Self::If { branches, otherwise, .. } => {
                for (condition, branch) in branches {
                    if eval_value!(condition, env).is_truthy() {
                        return branch.evaluate(env);
                    }
                }
                otherwise.as_ref().map_or(Ok(Value::Null), |otherwise| otherwise.evaluate(env))
            },
            Self::For { target,
                        iterable,
                        body,
                        pos, } => loops::eval_for(target, iterable, body, env, pos),
            Self::While { condition, body, .. } => loops::eval_while(condition, body, env),
            Self::Logical { op, left, right, .. } => {
                let left = eval_value!(left, env).is_truthy();
                let result = match op {
                    LogicalOp::And => left && eval_value!(right, env).is_truthy(),
                    LogicalOp::Or => left || eval_value!(right, env).is_truthy(),
                    LogicalOp::Xor => left != eval_value!(right, env).is_truthy(),
                };
                Ok(Value::Boolean(result))
            },
            Self::Not { operand, .. } => Ok(Value::Boolean(!eval_value!(operand, env).is_truthy())),
            Self::List { elements, pos } => collection::eval_list(elements, env, pos),
            Self::Set { elements, pos } => collection::eval_set(elements, env, pos),
            Self::Map { entries, pos } => collection::eval_map(entries, env, pos),
            Self::Object { entries, pos } => collection::eval_object(entries, env, pos),
            Self::Comprehension { kind,
                                  element,
                                  value,
                                  generators,
                                  condition,
                                  pos, } => collection::eval_comprehension(*kind,
                                                                            element,
                                                                            value.as_deref(),
                                                                            generators,
                                                                            condition.as_deref(),
                                                                            env,
                                                                            pos),
            Self::Spread { pos, .. } => {
                Err(RuntimeError::type_error("Spread is only allowed in calls and collection literals",
                                             pos))
            },
            Self::Require { spec, form, pos } => require::eval_require(spec, form, env, pos),
            Self::Break { .. } => Ok(Value::Break),
            Self::Continue { .. } => Ok(Value::Continue),
            Self::Return { value, .. } => {
                let value = match value {
                    Some(value) => eval_value!(value, env),
                    None => Value::Null,
                };
                Ok(Value::Return(Box::new(value)))
            },
            Self::Error { value, pos } => match eval_value!(value, env) {
                Value::Error(payload) => Err(RuntimeError::thrown(*payload, pos)),
                payload => Err(RuntimeError::thrown(payload, pos)),
            },
        }
    }
}

/// Evaluates a whole program, a module body or an `eval`ed fragment.
///
/// A top-level `return` ends the program with its value. A `break` or
/// `continue` outside any loop is an error.
///
/// # Errors
/// Whatever the program raises, or `ControlFlowEscape`.
pub fn run_program(node: &Node, env: &Environment) -> EvalResult<Value> {
    match node.evaluate(env)? {
        Value::Return(value) => Ok(*value),
        Value::Break => Err(escape("break", node)),
        Value::Continue => Err(escape("continue", node)),
        value => Ok(value),
    }
}

fn escape(sentinel: &'static str, node: &Node) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::ControlFlowEscape { sentinel }, node.pos().clone())
}
