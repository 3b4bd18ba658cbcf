use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use tracing::trace;

use crate::{
    error::{RuntimeError, RuntimeErrorKind},
    interpreter::{
        evaluator::core::EvalResult, module::SourceProvider, token::SourcePos, value::core::Value,
    },
};

/// Default limit for nested function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 2_000;

/// State shared by every environment of one interpreter instance.
pub struct Runtime {
    /// Loaded module environments, keyed by module identifier.
    modules:        RefCell<HashMap<String, Environment>>,
    /// Identifiers of the modules currently being loaded, outermost first.
    loading:        RefCell<Vec<String>>,
    /// Resolves module specifications to source text.
    provider:       Rc<dyn SourceProvider>,
    /// Number of active function calls.
    depth:          Cell<usize>,
    /// Limit for [`Self::depth`].
    max_call_depth: usize,
}

/// Decrements the call depth when a call frame ends, on every exit path.
pub struct CallGuard {
    runtime: Rc<Runtime>,
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.runtime.depth.set(self.runtime.depth.get().saturating_sub(1));
    }
}

/// Pops the module-load stack when a module finishes loading, on every exit
/// path.
pub struct LoadGuard {
    runtime: Rc<Runtime>,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        self.runtime.loading.borrow_mut().pop();
    }
}

impl Runtime {
    /// Enters a function call.
    ///
    /// # Errors
    /// `StackOverflow` if the call depth limit is reached.
    pub fn enter_call(self: &Rc<Self>, pos: &SourcePos) -> EvalResult<CallGuard> {
        let depth = self.depth.get();
        if depth >= self.max_call_depth {
            return Err(RuntimeError::new(RuntimeErrorKind::StackOverflow { depth: self.max_call_depth },
                                         pos.clone()));
        }
        self.depth.set(depth + 1);
        Ok(CallGuard { runtime: Rc::clone(self) })
    }

    /// Pushes `identifier` onto the module-load stack.
    ///
    /// # Errors
    /// `CircularRequire` if the module is already being loaded.
    pub fn enter_module(self: &Rc<Self>, identifier: &str, pos: &SourcePos) -> EvalResult<LoadGuard> {
        let mut loading = self.loading.borrow_mut();
        if loading.iter().any(|m| m == identifier) {
            return Err(RuntimeError::new(RuntimeErrorKind::CircularRequire { module: identifier.to_string(),
                                                                             chain:  loading.clone(), },
                                         pos.clone()));
        }
        loading.push(identifier.to_string());
        Ok(LoadGuard { runtime: Rc::clone(self) })
    }

    /// Returns the cached environment of a loaded module.
    #[must_use]
    pub fn cached_module(&self, identifier: &str) -> Option<Environment> {
        self.modules.borrow().get(identifier).cloned()
    }

    /// Caches a loaded module for the lifetime of the runtime.
    pub fn cache_module(&self, identifier: &str, env: Environment) {
        self.modules.borrow_mut().insert(identifier.to_string(), env);
    }

    /// The source provider modules are loaded through.
    #[must_use]
    pub fn provider(&self) -> Rc<dyn SourceProvider> {
        Rc::clone(&self.provider)
    }
}

struct Scope {
    bindings: RefCell<HashMap<String, Value>>,
    parent:   Option<Environment>,
    runtime:  Rc<Runtime>,
}

/// A lexical scope: name bindings plus a link to the enclosing scope.
///
/// Cloning an environment shares it. Closures hold a clone of the
/// environment they were defined in, which keeps it alive as long as the
/// closure is reachable. Exactly one environment per interpreter, the root,
/// has no parent.
///
/// # Example
/// ```
/// use std::rc::Rc;
///
/// use ckl::interpreter::{
///     environment::Environment, module::MemorySourceProvider, value::core::Value,
/// };
///
/// let root = Environment::new_root(Rc::new(MemorySourceProvider::default()));
/// root.define("x", Value::Int(1));
///
/// let child = root.child();
/// assert_eq!(child.get("x"), Some(Value::Int(1)));
///
/// assert!(child.assign("x", Value::Int(2)));
/// assert_eq!(root.get("x"), Some(Value::Int(2)));
/// ```
#[derive(Clone)]
pub struct Environment(Rc<Scope>);

impl Environment {
    /// Creates a root environment with a fresh module cache.
    #[must_use]
    pub fn new_root(provider: Rc<dyn SourceProvider>) -> Self {
        Self::with_call_depth(provider, DEFAULT_MAX_CALL_DEPTH)
    }

    /// Creates a root environment with a custom call depth limit.
    #[must_use]
    pub fn with_call_depth(provider: Rc<dyn SourceProvider>, max_call_depth: usize) -> Self {
        let runtime = Runtime { modules: RefCell::new(HashMap::new()),
                                loading: RefCell::new(Vec::new()),
                                provider,
                                depth: Cell::new(0),
                                max_call_depth };
        Self(Rc::new(Scope { bindings: RefCell::new(HashMap::new()),
                             parent:   None,
                             runtime:  Rc::new(runtime), }))
    }

    /// Creates an empty scope enclosed by this one.
    #[must_use]
    pub fn child(&self) -> Self {
        Self(Rc::new(Scope { bindings: RefCell::new(HashMap::new()),
                             parent:   Some(self.clone()),
                             runtime:  Rc::clone(&self.0.runtime), }))
    }

    /// Binds `name` in this scope, shadowing any outer binding.
    pub fn define(&self, name: &str, value: Value) {
        self.0.bindings.borrow_mut().insert(name.to_string(), value);
    }

    /// Looks `name` up through the scope chain.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut scope = Some(self);
        while let Some(env) = scope {
            if let Some(value) = env.0.bindings.borrow().get(name) {
                return Some(value.clone());
            }
            scope = env.0.parent.as_ref();
        }
        None
    }

    /// Looks `name` up in this scope only.
    #[must_use]
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.0.bindings.borrow().get(name).cloned()
    }

    /// Looks `name` up, failing if it is unbound.
    ///
    /// # Errors
    /// `UndefinedSymbol` if no scope in the chain binds `name`.
    pub fn lookup(&self, name: &str, pos: &SourcePos) -> EvalResult<Value> {
        self.get(name).ok_or_else(|| {
                          RuntimeError::new(RuntimeErrorKind::UndefinedSymbol { name: name.to_string() },
                                            pos.clone())
                      })
    }

    /// Rebinds `name` in the nearest scope that binds it.
    ///
    /// Returns `false`, leaving every scope untouched, if `name` is unbound.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        let mut scope = Some(self);
        while let Some(env) = scope {
            if let Some(slot) = env.0.bindings.borrow_mut().get_mut(name) {
                *slot = value;
                return true;
            }
            scope = env.0.parent.as_ref();
        }
        trace!(name, "assignment to unbound name");
        false
    }

    /// The bindings of this scope, sorted by name.
    #[must_use]
    pub fn local_bindings(&self) -> Vec<(String, Value)> {
        let mut bindings = self.0
                               .bindings
                               .borrow()
                               .iter()
                               .map(|(k, v)| (k.clone(), v.clone()))
                               .collect::<Vec<_>>();
        bindings.sort_by(|a, b| a.0.cmp(&b.0));
        bindings
    }

    /// The root of the scope chain.
    #[must_use]
    pub fn root(&self) -> Self {
        let mut env = self.clone();
        while let Some(parent) = env.0.parent.clone() {
            env = parent;
        }
        env
    }

    /// The interpreter state shared by the whole scope chain.
    #[must_use]
    pub fn runtime(&self) -> Rc<Runtime> {
        Rc::clone(&self.0.runtime)
    }
}
