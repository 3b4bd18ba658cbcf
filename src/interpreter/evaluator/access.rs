use crate::{
    ast::Node,
    error::{RuntimeError, RuntimeErrorKind},
    interpreter::{
        environment::Environment, evaluator::core::EvalResult, token::SourcePos,
        value::core::Value,
    },
    util::num::resolve_index,
};

/// Field of an error value that holds its payload.
const ERROR_PAYLOAD_FIELD: &str = "value";

/// Evaluates `target[index]`.
pub fn eval_deref(target: &Node, index: &Node, env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let container = eval_value!(target, env);
    let key = eval_value!(index, env);
    index_value(&container, &key, pos)
}

/// Looks `key` up in `container`.
///
/// Lists and strings take integer indices, negative ones counting from the
/// end. A missing map key yields `NULL`, a missing object field is an
/// error. Indexing `NULL` yields `NULL`.
///
/// # Errors
/// - `IndexOutOfBounds` for list and string indices.
/// - `UnknownField` for objects.
/// - `TypeError` for values that cannot be indexed.
///
/// # Example
/// ```
/// use ckl::interpreter::{
///     evaluator::access::index_value, token::SourcePos, value::core::Value,
/// };
///
/// let list = Value::from(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
/// let pos = SourcePos::native();
///
/// assert_eq!(index_value(&list, &Value::Int(-1), &pos).unwrap(), Value::Int(3));
/// assert!(index_value(&list, &Value::Int(3), &pos).is_err());
/// ```
pub fn index_value(container: &Value, key: &Value, pos: &SourcePos) -> EvalResult<Value> {
    match container {
        Value::Null => Ok(Value::Null),
        Value::List(list) => {
            let list = list.borrow();
            let i = resolve_index(key.as_int(pos)?, list.len(), pos)?;
            Ok(list[i].clone())
        },
        Value::String(s) => {
            let chars = s.chars().collect::<Vec<_>>();
            let i = resolve_index(key.as_int(pos)?, chars.len(), pos)?;
            Ok(Value::String(chars[i].to_string()))
        },
        Value::Map(map) => Ok(map.borrow().get(key).cloned().unwrap_or(Value::Null)),
        Value::Object(object) => {
            let name = key.to_string();
            object.fields
                  .borrow()
                  .get(&name)
                  .cloned()
                  .ok_or_else(|| RuntimeError::new(RuntimeErrorKind::UnknownField { name }, pos.clone()))
        },
        Value::Error(payload) if key.to_string() == ERROR_PAYLOAD_FIELD => Ok((**payload).clone()),
        other => Err(RuntimeError::type_error(format!("Cannot index {}", other.type_name()), pos)),
    }
}

/// Evaluates `target[index] = value` and yields the stored value.
///
/// Lists replace an existing element, maps and objects insert or replace.
pub fn eval_deref_assign(target: &Node,
                         index: &Node,
                         value: &Node,
                         env: &Environment,
                         pos: &SourcePos)
                         -> EvalResult<Value> {
    let container = eval_value!(target, env);
    let key = eval_value!(index, env);
    let value = eval_value!(value, env);

    match &container {
        Value::List(list) => {
            let i = resolve_index(key.as_int(pos)?, list.borrow().len(), pos)?;
            list.borrow_mut()[i] = value.clone();
        },
        Value::Map(map) => {
            // Ordering may render the map itself, so it must not be borrowed mutably while inserting.
            let mut updated = map.borrow().clone();
            updated.insert(key, value.clone());
            *map.borrow_mut() = updated;
        },
        Value::Object(object) => {
            let name = key.to_string();
            object.fields.borrow_mut().insert(name, value.clone());
        },
        other => {
            return Err(RuntimeError::type_error(format!("Cannot assign into {}", other.type_name()),
                                                pos));
        },
    }
    Ok(value)
}
