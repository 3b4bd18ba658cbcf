use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    fmt,
    rc::Rc,
};

use chrono::NaiveDateTime;
use regex::Regex;

use crate::{
    ast::{LiteralValue, Node},
    error::{RuntimeError, RuntimeErrorKind},
    interpreter::{
        evaluator::{core::EvalResult, function::core::Callable},
        token::SourcePos,
        value::stream::{InputStream, OutputStream},
    },
    util::{
        date::format_date,
        num::{f64_to_i64_checked, i64_to_f64_lossy},
    },
};

/// A compiled pattern together with the text it was written as.
#[derive(Debug)]
pub struct PatternValue {
    /// The pattern as written between the `//` delimiters.
    pub source: String,
    /// The compiled expression.
    pub regex:  Regex,
}

impl PatternValue {
    /// Compiles a pattern.
    ///
    /// # Errors
    /// `InvalidPattern` if `source` is not a valid regular expression.
    pub fn compile(source: &str, pos: &SourcePos) -> EvalResult<Self> {
        Regex::new(source).map(|regex| Self { source: source.to_string(),
                                              regex })
                          .map_err(|e| {
                              RuntimeError::new(RuntimeErrorKind::InvalidPattern { pattern: source.to_string(),
                                                                                    details: e.to_string(), },
                                                pos.clone())
                          })
    }
}

/// A record of named fields.
///
/// Module objects carry the identifier of the module whose bindings they
/// expose. Member invocation treats them differently from plain objects.
#[derive(Debug, Default)]
pub struct ObjectValue {
    /// The fields, ordered by name.
    pub fields: RefCell<BTreeMap<String, Value>>,
    /// The module identifier, for module objects.
    pub module: Option<String>,
}

/// Represents a runtime value in the interpreter.
///
/// Scalars are plain owned data. Lists, sets, maps, objects and streams are
/// shared by reference: cloning a `Value` aliases the same container, which
/// is what in-place mutation built-ins such as `append` rely on.
#[derive(Clone)]
pub enum Value {
    /// The absent value, written `NULL`.
    Null,
    /// `TRUE` or `FALSE`.
    Boolean(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit float.
    Decimal(f64),
    /// An immutable string.
    String(String),
    /// A regular expression.
    Pattern(Rc<PatternValue>),
    /// A date with second precision.
    Date(NaiveDateTime),
    /// An ordered sequence that allows duplicates.
    List(Rc<RefCell<Vec<Self>>>),
    /// Unique values kept in the total order.
    Set(Rc<RefCell<BTreeSet<Self>>>),
    /// Unique keys kept in the total order.
    Map(Rc<RefCell<BTreeMap<Self, Self>>>),
    /// A record with named fields, or a module's public bindings.
    Object(Rc<ObjectValue>),
    /// A native built-in or a user lambda.
    Func(Rc<dyn Callable>),
    /// A readable stream.
    Input(Rc<InputStream>),
    /// A writable stream.
    Output(Rc<OutputStream>),
    /// An error value wrapping the payload passed to `error`.
    Error(Box<Self>),
    /// A quoted AST fragment.
    Node(Rc<Node>),
    /// Control sentinel produced by `break`.
    Break,
    /// Control sentinel produced by `continue`.
    Continue,
    /// Control sentinel produced by `return`, carrying the returned value.
    Return(Box<Self>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::Date(v)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::List(Rc::new(RefCell::new(v)))
    }
}

impl From<BTreeSet<Self>> for Value {
    fn from(v: BTreeSet<Self>) -> Self {
        Self::Set(Rc::new(RefCell::new(v)))
    }
}

impl From<BTreeMap<Self, Self>> for Value {
    fn from(v: BTreeMap<Self, Self>) -> Self {
        Self::Map(Rc::new(RefCell::new(v)))
    }
}

impl From<Option<Self>> for Value {
    fn from(v: Option<Self>) -> Self {
        v.unwrap_or(Self::Null)
    }
}

impl Value {
    /// Creates a value from a parsed literal.
    ///
    /// # Errors
    /// `InvalidPattern` for pattern literals that do not compile.
    pub fn from_literal(literal: &LiteralValue, pos: &SourcePos) -> EvalResult<Self> {
        Ok(match literal {
               LiteralValue::Boolean(b) => Self::Boolean(*b),
               LiteralValue::Int(n) => Self::Int(*n),
               LiteralValue::Decimal(d) => Self::Decimal(*d),
               LiteralValue::String(s) => Self::String(s.clone()),
               LiteralValue::Pattern(p) => Self::Pattern(Rc::new(PatternValue::compile(p, pos)?)),
           })
    }

    /// Creates a plain object from its fields.
    #[must_use]
    pub fn object(fields: BTreeMap<String, Self>) -> Self {
        Self::Object(Rc::new(ObjectValue { fields: RefCell::new(fields),
                                           module: None, }))
    }

    /// Creates a module object exposing `fields`.
    #[must_use]
    pub fn module(identifier: &str, fields: BTreeMap<String, Self>) -> Self {
        Self::Object(Rc::new(ObjectValue { fields: RefCell::new(fields),
                                           module: Some(identifier.to_string()), }))
    }

    /// Returns the language-level type name, as reported by `type`.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Int(_) => "int",
            Self::Decimal(_) => "decimal",
            Self::String(_) => "string",
            Self::Pattern(_) => "pattern",
            Self::Date(_) => "date",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
            Self::Func(_) => "func",
            Self::Input(_) => "input",
            Self::Output(_) => "output",
            Self::Error(_) => "error",
            Self::Node(_) => "node",
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Return(_) => "return",
        }
    }

    /// Returns `true` for `Break`, `Continue` and `Return`.
    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        matches!(self, Self::Break | Self::Continue | Self::Return(_))
    }

    /// Returns `true` for `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for values that count as true in conditions.
    ///
    /// `NULL`, `FALSE`, numeric zero, empty strings and empty collections are
    /// falsy. Everything else is truthy.
    ///
    /// # Example
    /// ```
    /// use ckl::interpreter::value::core::Value;
    ///
    /// assert!(Value::Int(3).is_truthy());
    /// assert!(!Value::Decimal(0.0).is_truthy());
    /// assert!(!Value::from("").is_truthy());
    /// assert!(!Value::from(Vec::new()).is_truthy());
    /// ```
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Decimal(d) => *d != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::List(l) => !l.borrow().is_empty(),
            Self::Set(s) => !s.borrow().is_empty(),
            Self::Map(m) => !m.borrow().is_empty(),
            _ => true,
        }
    }

    /// Converts the value to an `i64`.
    ///
    /// Accepts `Int` and integral `Decimal` values.
    ///
    /// # Errors
    /// `TypeError` for every other value.
    pub fn as_int(&self, pos: &SourcePos) -> EvalResult<i64> {
        match self {
            Self::Int(n) => Ok(*n),
            Self::Decimal(d) => f64_to_i64_checked(*d, pos),
            other => Err(RuntimeError::type_error(format!("Expected int but got {}",
                                                          other.type_name()),
                                                  pos)),
        }
    }

    /// Converts the value to an `f64`, promoting integers.
    ///
    /// # Errors
    /// `TypeError` for non-numeric values.
    pub fn as_decimal(&self, pos: &SourcePos) -> EvalResult<f64> {
        match self {
            Self::Int(n) => Ok(i64_to_f64_lossy(*n)),
            Self::Decimal(d) => Ok(*d),
            other => Err(RuntimeError::type_error(format!("Expected number but got {}",
                                                          other.type_name()),
                                                  pos)),
        }
    }

    /// Returns the function, or a `NotAFunction` error.
    ///
    /// # Errors
    /// `NotAFunction` for every value but `Func`.
    pub fn as_func(&self, pos: &SourcePos) -> EvalResult<Rc<dyn Callable>> {
        match self {
            Self::Func(f) => Ok(Rc::clone(f)),
            other => Err(RuntimeError::new(RuntimeErrorKind::NotAFunction { found: other.type_name()
                                                                                       .to_string(), },
                                           pos.clone())),
        }
    }

    /// Returns the elements a `for` loop or comprehension visits.
    ///
    /// The elements are snapshotted, so the loop body may mutate the
    /// container without disturbing the iteration.
    ///
    /// # Errors
    /// `TypeError` for values that cannot be iterated, `Io` for unreadable
    /// input streams.
    ///
    /// # Example
    /// ```
    /// use ckl::interpreter::{token::SourcePos, value::core::Value};
    ///
    /// let chars = Value::from("ab").iterate(&SourcePos::native()).unwrap();
    /// assert_eq!(chars, vec![Value::from("a"), Value::from("b")]);
    /// ```
    pub fn iterate(&self, pos: &SourcePos) -> EvalResult<Vec<Self>> {
        match self {
            Self::Null => Ok(Vec::new()),
            Self::List(l) => Ok(l.borrow().clone()),
            Self::Set(s) => Ok(s.borrow().iter().cloned().collect()),
            Self::Map(m) => Ok(m.borrow()
                                .iter()
                                .map(|(k, v)| Self::from(vec![k.clone(), v.clone()]))
                                .collect()),
            Self::String(s) => Ok(s.chars().map(|c| Self::String(c.to_string())).collect()),
            Self::Object(o) => Ok(o.fields.borrow().keys().map(|k| Self::from(k.as_str())).collect()),
            Self::Input(input) => {
                let lines = input.read_all_lines().map_err(|e| {
                                                      RuntimeError::new(RuntimeErrorKind::Io { details: e.to_string() },
                                                                        pos.clone())
                                                  })?;
                Ok(lines.into_iter().map(Self::String).collect())
            },
            other => Err(RuntimeError::type_error(format!("Cannot iterate over {}",
                                                          other.type_name()),
                                                  pos)),
        }
    }

    /// Renders the value as it appears nested inside a collection.
    ///
    /// Differs from [`fmt::Display`] only for strings, which are quoted.
    ///
    /// # Example
    /// ```
    /// use ckl::interpreter::value::core::Value;
    ///
    /// let list = Value::from(vec![Value::from("a"), Value::Decimal(2.0)]);
    /// assert_eq!(list.to_string(), "['a', 2.0]");
    /// assert_eq!(Value::from("a").repr(), "'a'");
    /// assert_eq!(Value::from("a").to_string(), "a");
    /// ```
    #[must_use]
    pub fn repr(&self) -> String {
        match self {
            Self::String(s) => quote_string(s),
            other => other.to_string(),
        }
    }
}

/// Quotes a string with single quotes, escaping as the lexer expects.
#[must_use]
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Formats a decimal so it always shows a fractional part.
#[must_use]
pub fn format_decimal(d: f64) -> String {
    let text = format!("{d}");
    if d.is_finite() && !text.contains('.') && !text.contains('e') {
        format!("{text}.0")
    } else {
        text
    }
}

fn join<'a>(f: &mut fmt::Formatter<'_>, values: impl Iterator<Item=&'a Value>) -> fmt::Result {
    for (i, v) in values.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", v.repr())?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(true) => write!(f, "TRUE"),
            Self::Boolean(false) => write!(f, "FALSE"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Decimal(d) => write!(f, "{}", format_decimal(*d)),
            Self::String(s) => write!(f, "{s}"),
            Self::Pattern(p) => write!(f, "//{}//", p.source),
            Self::Date(d) => write!(f, "{}", format_date(d)),
            Self::List(l) => {
                write!(f, "[")?;
                join(f, l.borrow().iter())?;
                write!(f, "]")
            },
            Self::Set(s) => {
                write!(f, "<<")?;
                join(f, s.borrow().iter())?;
                write!(f, ">>")
            },
            Self::Map(m) => {
                write!(f, "<<<")?;
                for (i, (k, v)) in m.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", k.repr(), v.repr())?;
                }
                write!(f, ">>>")
            },
            Self::Object(o) => {
                if let Some(module) = &o.module {
                    return write!(f, "<#module {module}>");
                }
                write!(f, "<*")?;
                for (i, (k, v)) in o.fields.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}={}", v.repr())?;
                }
                write!(f, "*>")
            },
            Self::Func(func) => write!(f, "<#{}>", func.name()),
            Self::Input(_) => write!(f, "<#input>"),
            Self::Output(_) => write!(f, "<#output>"),
            Self::Error(payload) => write!(f, "<#error {}>", payload.repr()),
            Self::Node(node) => write!(f, "{node}"),
            Self::Break => write!(f, "<#break>"),
            Self::Continue => write!(f, "<#continue>"),
            Self::Return(v) => write!(f, "<#return {}>", v.repr()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name(), self.repr())
    }
}
