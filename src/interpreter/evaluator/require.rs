use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    ast::{Node, RequireForm},
    error::{RuntimeError, RuntimeErrorKind},
    interpreter::{
        environment::Environment,
        evaluator::core::{EvalResult, run_program},
        module::module_identifier,
        parser::core::parse_source,
        token::SourcePos,
        value::core::Value,
    },
};

/// Bindings starting with this prefix stay private to their module.
const PRIVATE_PREFIX: char = '_';

/// Evaluates `require spec [as name | unqualified | import …]`.
///
/// Loads the module on first use and exposes its bindings as the form
/// requests. Yields the module object.
pub fn eval_require(spec: &Node, form: &RequireForm, env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let spec = eval_value!(spec, env).to_string();
    let identifier = module_identifier(&spec);
    let module_env = load_module(&spec, &identifier, env, pos)?;
    let module = module_object(&identifier, &module_env);

    match form {
        RequireForm::Bind(name) => env.define(name.as_deref().unwrap_or(&identifier), module.clone()),
        RequireForm::Unqualified => {
            for (name, value) in module_env.local_bindings() {
                if !name.starts_with(PRIVATE_PREFIX) {
                    env.define(&name, value);
                }
            }
        },
        RequireForm::Import(symbols) => {
            for (symbol, alias) in symbols {
                let value = module_env.get_local(symbol).ok_or_else(|| {
                                                            RuntimeError::new(RuntimeErrorKind::UndefinedSymbol { name: symbol.clone() },
                                                                              pos.clone())
                                                        })?;
                env.define(alias.as_ref().unwrap_or(symbol), value);
            }
        },
    }
    Ok(module)
}

/// Returns the environment of module `identifier`, evaluating its source on
/// the first request.
///
/// The module body runs in a fresh child of the root environment, never in
/// the requiring scope. Its environment is cached for the lifetime of the
/// interpreter.
///
/// # Errors
/// - `CircularRequire` when the module is already being loaded.
/// - `ModuleNotFound` when the source provider fails.
/// - Syntax or runtime errors of the module body.
pub fn load_module(spec: &str, identifier: &str, env: &Environment, pos: &SourcePos) -> EvalResult<Environment> {
    let runtime = env.runtime();
    let _guard = runtime.enter_module(identifier, pos)?;

    if let Some(cached) = runtime.cached_module(identifier) {
        debug!(module = identifier, "module cache hit");
        return Ok(cached);
    }

    let source = runtime.provider().load(identifier, spec).map_err(|e| {
                                                                RuntimeError::new(RuntimeErrorKind::ModuleNotFound { module:  spec.to_string(),
                                                                                                                     details: e.to_string(), },
                                                                                  pos.clone())
                                                            })?;
    debug!(module = identifier, filename = %source.filename, "loading module");

    let program = parse_source(&source.text, &source.filename)?;
    let module_env = env.root().child();
    run_program(&program, &module_env).map_err(|e| e.with_frame(format!("require {identifier}"), pos))?;

    runtime.cache_module(identifier, module_env.clone());
    Ok(module_env)
}

/// Wraps the public bindings of a module environment in a module object.
///
/// Module objects the module itself required are left out, so requiring a
/// module does not re-export its dependencies.
fn module_object(identifier: &str, module_env: &Environment) -> Value {
    let fields = module_env.local_bindings()
                           .into_iter()
                           .filter(|(name, value)| {
                               !name.starts_with(PRIVATE_PREFIX)
                               && !matches!(value, Value::Object(o) if o.module.is_some())
                           })
                           .collect::<BTreeMap<_, _>>();
    Value::module(identifier, fields)
}
