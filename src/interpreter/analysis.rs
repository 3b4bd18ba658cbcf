use std::collections::{BTreeSet, HashSet};

use crate::{
    ast::{
        CallArgument, Generators, LiteralValue, LoopTarget, MapEntry, Node, ObjectEntry, RequireForm,
    },
    interpreter::{evaluator::block::ERROR_BINDING, module::module_identifier},
    util::stack::ensure_sufficient_stack,
};

/// Collects the free identifiers of `node`: the names it reads without
/// binding them first.
///
/// Scoping follows evaluation. Lambdas, loop bodies, comprehensions and
/// `catch` handlers open a scope, blocks do not. Assigning a name that is not
/// bound in scope counts as a reference, because assignment rebinds an
/// outer definition when one exists. `require … unqualified` binds names
/// that are only known at run time, so they are not tracked.
///
/// # Parameters
/// - `node`: The root of the analysed tree.
///
/// # Returns
/// The free names in sorted order.
///
/// # Example
/// ```
/// use ckl::interpreter::{analysis::free_variables, parser::core::parse_source};
///
/// let node = parse_source("fn(x) x + y", "{input}").unwrap();
/// let free: Vec<String> = free_variables(&node).into_iter().collect();
/// assert_eq!(free, ["add", "y"]);
/// ```
#[must_use]
pub fn free_variables(node: &Node) -> BTreeSet<String> {
    let mut analysis = FreeVariables { scopes: vec![HashSet::new()],
                                       free:   BTreeSet::new(), };
    analysis.visit(node);
    analysis.free
}

struct FreeVariables {
    scopes: Vec<HashSet<String>>,
    free:   BTreeSet<String>,
}

impl FreeVariables {
    fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }

    fn bind(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }

    fn reference(&mut self, name: &str) {
        if !self.is_bound(name) {
            self.free.insert(name.to_string());
        }
    }

    /// Runs `f` in a fresh scope holding `names`.
    fn scoped<'n>(&mut self, names: impl IntoIterator<Item = &'n str>, f: impl FnOnce(&mut Self)) {
        self.scopes.push(names.into_iter().map(str::to_string).collect());
        f(self);
        self.scopes.pop();
    }

    fn visit_all<'n>(&mut self, nodes: impl IntoIterator<Item = &'n Node>) {
        for node in nodes {
            self.visit(node);
        }
    }

    fn visit_args(&mut self, args: &[CallArgument]) {
        self.visit_all(args.iter().map(|arg| &arg.value));
    }

    fn visit(&mut self, node: &Node) {
        ensure_sufficient_stack(|| self.dispatch(node));
    }

    fn dispatch(&mut self, node: &Node) {
        match node {
            Node::Literal { .. } | Node::Break { .. } | Node::Continue { .. } => {},
            Node::Identifier { name, .. } => self.reference(name),
            Node::Def { name, value, .. } => {
                // A named function sees itself when it is called.
                if matches!(value.as_ref(), Node::Lambda { .. }) {
                    self.bind(name);
                    self.visit(value);
                } else {
                    self.visit(value);
                    self.bind(name);
                }
            },
            Node::DefDestructure { names, value, .. } => {
                self.visit(value);
                for name in names {
                    self.bind(name);
                }
            },
            Node::Assign { name, value, .. } => {
                self.visit(value);
                self.reference(name);
            },
            Node::Deref { target, index, .. } => self.visit_all([target.as_ref(), index.as_ref()]),
            Node::DerefAssign { target, index, value, .. } => {
                self.visit_all([target.as_ref(), index.as_ref(), value.as_ref()]);
            },
            Node::Invoke { target, args, .. } => {
                self.visit(target);
                self.visit_args(args);
            },
            Node::Call { function, args, .. } => {
                self.visit(function);
                self.visit_args(args);
            },
            Node::Lambda { params, body, .. } => {
                self.scoped(params.iter().map(|p| p.name.as_str()), |this| {
                        this.visit_all(params.iter().filter_map(|p| p.default.as_ref()));
                        this.visit(body);
                    });
            },
            Node::Block { body, catches, finally, .. } => {
                self.visit_all(body);
                for clause in catches {
                    if let Some(matcher) = &clause.matcher {
                        self.visit(matcher);
                    }
                    self.scoped([ERROR_BINDING], |this| this.visit(&clause.handler));
                }
                self.visit_all(finally);
            },
            Node::If { branches, otherwise, .. } => {
                for (condition, branch) in branches {
                    self.visit_all([condition, branch]);
                }
                if let Some(otherwise) = otherwise {
                    self.visit(otherwise);
                }
            },
            Node::For { target, iterable, body, .. } => {
                self.visit(iterable);
                let names: Vec<&str> = match target {
                    LoopTarget::Name(name) => vec![name.as_str()],
                    LoopTarget::Destructure(names) => names.iter().map(String::as_str).collect(),
                };
                self.scoped(names, |this| this.visit(body));
            },
            Node::While { condition, body, .. } => {
                self.visit(condition);
                self.scoped([], |this| this.visit(body));
            },
            Node::Logical { left, right, .. } => self.visit_all([left.as_ref(), right.as_ref()]),
            Node::List { elements, .. } | Node::Set { elements, .. } => self.visit_all(elements),
            Node::Map { entries, .. } => {
                for entry in entries {
                    match entry {
                        MapEntry::Pair(key, value) => self.visit_all([key, value]),
                        MapEntry::Spread(map) => self.visit(map),
                    }
                }
            },
            Node::Object { entries, .. } => {
                for entry in entries {
                    match entry {
                        ObjectEntry::Field(_, value) | ObjectEntry::Spread(value) => self.visit(value),
                    }
                }
            },
            Node::Comprehension { element,
                                  value,
                                  generators,
                                  condition,
                                  .. } => {
                let vars = match generators.as_ref() {
                    Generators::Single(g) => {
                        self.visit(&g.iterable);
                        vec![g.var.as_str()]
                    },
                    Generators::Product(a, b) | Generators::Parallel(a, b) => {
                        self.visit_all([&a.iterable, &b.iterable]);
                        vec![a.var.as_str(), b.var.as_str()]
                    },
                };
                self.scoped(vars, |this| {
                        this.visit_all(condition.as_deref());
                        this.visit(element);
                        this.visit_all(value.as_deref());
                    });
            },
            Node::Spread { value, .. } | Node::Not { operand: value, .. } => self.visit(value),
            Node::Require { spec, form, .. } => {
                self.visit(spec);
                match form {
                    RequireForm::Bind(Some(alias)) => self.bind(alias),
                    RequireForm::Bind(None) => {
                        if let Node::Literal { value: LiteralValue::String(spec), .. } = spec.as_ref() {
                            self.bind(&module_identifier(spec));
                        }
                    },
                    RequireForm::Unqualified => {},
                    RequireForm::Import(symbols) => {
                        for (symbol, alias) in symbols {
                            self.bind(alias.as_ref().unwrap_or(symbol));
                        }
                    },
                }
            },
            Node::Return { value, .. } => self.visit_all(value.as_deref()),
            Node::Error { value, .. } => self.visit(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::parser::core::parse_source;

    fn free(source: &str) -> Vec<String> {
        free_variables(&parse_source(source, "<test>").unwrap()).into_iter()
                                                                 .collect()
    }

    #[test]
    fn test_parameters_are_bound() {
        assert_eq!(free("fn(a, b = c) a"), ["c"]);
    }

    #[test]
    fn test_definitions_bind_for_later_statements() {
        assert_eq!(free("def x = y; x"), ["y"]);
    }

    #[test]
    fn test_named_functions_see_themselves() {
        assert_eq!(free("def f(n) f(n)"), Vec::<String>::new());
    }

    #[test]
    fn test_loop_variables_are_scoped() {
        assert_eq!(free("for i in xs println(i); i"), ["i", "println", "xs"]);
    }

    #[test]
    fn test_comprehension_variables_are_bound() {
        assert_eq!(free("[x for x in xs also for y in ys if y]"), ["xs", "ys"]);
    }

    #[test]
    fn test_catch_handler_binds_error() {
        assert_eq!(free("do error 'x' catch all _err end"), Vec::<String>::new());
    }

    #[test]
    fn test_require_binds_module_name() {
        assert_eq!(free("require 'lib/util'; util->f(1)"), Vec::<String>::new());
    }
}
