use std::{
    collections::{BTreeMap, BTreeSet},
    ops::ControlFlow,
};

use crate::{
    ast::{ComprehensionKind, Generators, MapEntry, Node, ObjectEntry},
    error::RuntimeError,
    interpreter::{
        environment::Environment, evaluator::core::EvalResult, token::SourcePos,
        value::core::Value,
    },
};

/// Evaluates literal elements, expanding `...value` spreads in place.
fn eval_elements(elements: &[Node],
                 env: &Environment,
                 pos: &SourcePos)
                 -> EvalResult<ControlFlow<Value, Vec<Value>>> {
    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        if let Node::Spread { value, .. } = element {
            values.extend(eval_flow!(value, env).iterate(pos)?);
        } else {
            values.push(eval_flow!(element, env));
        }
    }
    Ok(ControlFlow::Continue(values))
}

/// `[a, b, ...rest]`
pub fn eval_list(elements: &[Node], env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    Ok(Value::from(unwrap_flow!(eval_elements(elements, env, pos))))
}

/// `<<a, b, ...rest>>`, dropping duplicates.
pub fn eval_set(elements: &[Node], env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let values = unwrap_flow!(eval_elements(elements, env, pos));
    Ok(Value::from(values.into_iter().collect::<BTreeSet<_>>()))
}

/// `<<<k => v, ...other>>>`. Later entries replace earlier ones with the
/// same key.
pub fn eval_map(entries: &[MapEntry], env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let mut map = BTreeMap::new();
    for entry in entries {
        match entry {
            MapEntry::Pair(key, value) => {
                let key = eval_value!(key, env);
                map.insert(key, eval_value!(value, env));
            },
            MapEntry::Spread(other) => match eval_value!(other, env) {
                Value::Null => {},
                Value::Map(other) => map.extend(other.borrow().iter().map(|(k, v)| (k.clone(), v.clone()))),
                Value::Object(object) => {
                    map.extend(object.fields
                                     .borrow()
                                     .iter()
                                     .map(|(k, v)| (Value::from(k.as_str()), v.clone())));
                },
                other => {
                    return Err(RuntimeError::type_error(format!("Cannot spread {} into a map",
                                                                other.type_name()),
                                                        pos));
                },
            },
        }
    }
    Ok(Value::from(map))
}

/// `<* name = value, ...other *>`
pub fn eval_object(entries: &[ObjectEntry], env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let mut fields = BTreeMap::new();
    for entry in entries {
        match entry {
            ObjectEntry::Field(name, value) => {
                fields.insert(name.clone(), eval_value!(value, env));
            },
            ObjectEntry::Spread(other) => match eval_value!(other, env) {
                Value::Null => {},
                Value::Object(object) => {
                    fields.extend(object.fields.borrow().iter().map(|(k, v)| (k.clone(), v.clone())));
                },
                Value::Map(map) => {
                    fields.extend(map.borrow().iter().map(|(k, v)| (k.to_string(), v.clone())));
                },
                other => {
                    return Err(RuntimeError::type_error(format!("Cannot spread {} into an object",
                                                                other.type_name()),
                                                        pos));
                },
            },
        }
    }
    Ok(Value::object(fields))
}

/// One combination of generator variables.
type Binding<'a> = Vec<(&'a str, Value)>;

/// Expands the generators into the variable bindings of every iteration.
///
/// Both iterables of a product or parallel pair are evaluated once, in the
/// enclosing environment.
fn bindings<'a>(generators: &'a Generators,
                env: &Environment,
                pos: &SourcePos)
                -> EvalResult<ControlFlow<Value, Vec<Binding<'a>>>> {
    let combined = match generators {
        Generators::Single(g) => {
            let items = eval_flow!(g.iterable, env).iterate(pos)?;
            items.into_iter().map(|x| vec![(g.var.as_str(), x)]).collect()
        },
        Generators::Product(a, b) => {
            let xs = eval_flow!(a.iterable, env).iterate(pos)?;
            let ys = eval_flow!(b.iterable, env).iterate(pos)?;
            xs.iter()
              .flat_map(|x| {
                  ys.iter()
                    .map(|y| vec![(a.var.as_str(), x.clone()), (b.var.as_str(), y.clone())])
              })
              .collect()
        },
        Generators::Parallel(a, b) => {
            let xs = eval_flow!(a.iterable, env).iterate(pos)?;
            let ys = eval_flow!(b.iterable, env).iterate(pos)?;
            if xs.len() != ys.len() {
                return Err(RuntimeError::type_error(format!("Parallel generators differ in length: {} and {}",
                                                            xs.len(),
                                                            ys.len()),
                                                    pos));
            }
            xs.into_iter()
              .zip(ys)
              .map(|(x, y)| vec![(a.var.as_str(), x), (b.var.as_str(), y)])
              .collect()
        },
    };
    Ok(ControlFlow::Continue(combined))
}

/// Evaluates a list, set or map comprehension.
///
/// Every iteration binds its generator variables in a fresh child of `env`,
/// then evaluates the optional condition and the element (and, for maps,
/// the value) there.
pub fn eval_comprehension(kind: ComprehensionKind,
                          element: &Node,
                          value: Option<&Node>,
                          generators: &Generators,
                          condition: Option<&Node>,
                          env: &Environment,
                          pos: &SourcePos)
                          -> EvalResult<Value> {
    let mut produced = Vec::new();

    for binding in unwrap_flow!(bindings(generators, env, pos)) {
        let scope = env.child();
        for (name, item) in binding {
            scope.define(name, item);
        }
        if let Some(condition) = condition
           && !eval_value!(condition, &scope).is_truthy()
        {
            continue;
        }
        let key = eval_value!(element, &scope);
        let mapped = match value {
            Some(value) => eval_value!(value, &scope),
            None => Value::Null,
        };
        produced.push((key, mapped));
    }

    Ok(match kind {
           ComprehensionKind::List => Value::from(produced.into_iter().map(|(k, _)| k).collect::<Vec<_>>()),
           ComprehensionKind::Set => {
               Value::from(produced.into_iter().map(|(k, _)| k).collect::<BTreeSet<_>>())
           },
           ComprehensionKind::Map => Value::from(produced.into_iter().collect::<BTreeMap<_, _>>()),
       })
}
