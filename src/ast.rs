use std::{fmt, rc::Rc};

use crate::interpreter::{
    token::SourcePos,
    value::core::{format_decimal, quote_string},
};

/// Represents a literal value in the language.
///
/// Only scalars have literal tokens. Collection literals are nodes of their
/// own because their elements are expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// `TRUE` or `FALSE`.
    Boolean(bool),
    /// A 64-bit signed integer literal.
    Int(i64),
    /// A 64-bit floating-point literal.
    Decimal(f64),
    /// A string literal with escapes already decoded.
    String(String),
    /// A pattern literal, holding the regular expression source.
    Pattern(String),
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(true) => write!(f, "TRUE"),
            Self::Boolean(false) => write!(f, "FALSE"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Decimal(d) => write!(f, "{}", format_decimal(*d)),
            Self::String(s) => write!(f, "{}", quote_string(s)),
            Self::Pattern(p) => write!(f, "//{p}//"),
        }
    }
}

/// Marker suffix of a rest parameter, as in `fn(first, others...)`.
pub const REST_MARKER: &str = "...";

/// A declared function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// The parameter name, without the rest marker.
    pub name:    String,
    /// Expression evaluated in the call environment when no argument binds
    /// the parameter.
    pub default: Option<Node>,
    /// Collects all unconsumed arguments into a list.
    pub rest:    bool,
}

/// One argument of a call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallArgument {
    /// The parameter name for `name = value` arguments.
    pub name:  Option<String>,
    /// The argument expression. A [`Node::Spread`] expands into several
    /// arguments.
    pub value: Node,
}

impl CallArgument {
    /// A positional argument.
    #[must_use]
    pub const fn positional(value: Node) -> Self {
        Self { name: None, value }
    }
}

/// A `catch` clause of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    /// The matcher expression, or `None` for `catch all`.
    pub matcher: Option<Node>,
    /// The statement run when the matcher accepts the error payload.
    pub handler: Node,
}

/// What a `for` loop binds on each iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopTarget {
    /// `for x in …`
    Name(String),
    /// `for [a, b] in …`, binding each name from the element list.
    Destructure(Vec<String>),
}

/// The boolean combinators. They short-circuit, except `xor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Xor,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
            Self::Xor => write!(f, "xor"),
        }
    }
}

/// An entry of a map literal.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEntry {
    /// `key => value`
    Pair(Node, Node),
    /// `...map`
    Spread(Node),
}

/// An entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectEntry {
    /// `name = value`
    Field(String, Node),
    /// `...object`
    Spread(Node),
}

/// The collection a comprehension builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComprehensionKind {
    List,
    Set,
    Map,
}

/// `for var in iterable` inside a comprehension.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    /// The bound name.
    pub var:      String,
    /// The iterated expression.
    pub iterable: Node,
}

/// The generator shapes of a comprehension.
#[derive(Debug, Clone, PartialEq)]
pub enum Generators {
    /// `for x in a`
    Single(Generator),
    /// `for x in a for y in b`, every combination.
    Product(Generator, Generator),
    /// `for x in a also for y in b`, paired by index.
    Parallel(Generator, Generator),
}

/// How a `require` exposes the module's bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequireForm {
    /// Bind the module object, under the given name or the module
    /// identifier.
    Bind(Option<String>),
    /// Copy all public bindings into the requiring environment.
    Unqualified,
    /// Copy the listed symbols, optionally renamed.
    Import(Vec<(String, Option<String>)>),
}

/// An abstract syntax tree node.
///
/// Nodes are built once by the parser and never modified. Binary operators
/// have no node of their own: the parser turns them into [`Node::Call`]s of
/// functions like `add` or `less`, so scripts can rebind those names.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A scalar literal.
    Literal { value: LiteralValue, pos: SourcePos },
    /// A variable reference.
    Identifier { name: String, pos: SourcePos },
    /// `def name = value`
    Def {
        name:  String,
        value: Box<Self>,
        pos:   SourcePos,
    },
    /// `def [a, b] = value`
    DefDestructure {
        names: Vec<String>,
        value: Box<Self>,
        pos:   SourcePos,
    },
    /// `name = value`, rebinding the nearest definition.
    Assign {
        name:  String,
        value: Box<Self>,
        pos:   SourcePos,
    },
    /// `target[index]` or `target->name`.
    Deref {
        target: Box<Self>,
        index:  Box<Self>,
        pos:    SourcePos,
    },
    /// `target[index] = value`
    DerefAssign {
        target: Box<Self>,
        index:  Box<Self>,
        value:  Box<Self>,
        pos:    SourcePos,
    },
    /// `target->member(args)`
    Invoke {
        target: Box<Self>,
        member: String,
        args:   Vec<CallArgument>,
        pos:    SourcePos,
    },
    /// `function(args)`
    Call {
        function: Box<Self>,
        args:     Vec<CallArgument>,
        pos:      SourcePos,
    },
    /// `fn(params) body`
    Lambda {
        name:   Option<String>,
        params: Rc<[Parameter]>,
        body:   Rc<Self>,
        pos:    SourcePos,
    },
    /// `do … catch … finally … end`, or a parenthesised statement sequence.
    Block {
        body:    Vec<Self>,
        catches: Vec<CatchClause>,
        finally: Vec<Self>,
        pos:     SourcePos,
    },
    /// `if c then s (elif c then s)* [else s]`
    If {
        branches:  Vec<(Self, Self)>,
        otherwise: Option<Box<Self>>,
        pos:       SourcePos,
    },
    /// `for target in iterable body`
    For {
        target:   LoopTarget,
        iterable: Box<Self>,
        body:     Box<Self>,
        pos:      SourcePos,
    },
    /// `while condition body`
    While {
        condition: Box<Self>,
        body:      Box<Self>,
        pos:       SourcePos,
    },
    /// `left and right`, `left or right`, `left xor right`
    Logical {
        op:    LogicalOp,
        left:  Box<Self>,
        right: Box<Self>,
        pos:   SourcePos,
    },
    /// `not operand`
    Not { operand: Box<Self>, pos: SourcePos },
    /// `[a, b, ...rest]`
    List { elements: Vec<Self>, pos: SourcePos },
    /// `<<a, b>>`
    Set { elements: Vec<Self>, pos: SourcePos },
    /// `<<<k => v>>>`
    Map { entries: Vec<MapEntry>, pos: SourcePos },
    /// `<*name = value*>`
    Object {
        entries: Vec<ObjectEntry>,
        pos:     SourcePos,
    },
    /// `[element for x in xs if cond]` and the set and map forms.
    Comprehension {
        kind:       ComprehensionKind,
        element:    Box<Self>,
        /// The value expression of map comprehensions.
        value:      Option<Box<Self>>,
        generators: Box<Generators>,
        condition:  Option<Box<Self>>,
        pos:        SourcePos,
    },
    /// `...value` inside a call or collection literal.
    Spread { value: Box<Self>, pos: SourcePos },
    /// `require spec [as name | unqualified | import …]`
    Require {
        spec: Box<Self>,
        form: RequireForm,
        pos:  SourcePos,
    },
    Break { pos: SourcePos },
    Continue { pos: SourcePos },
    /// `return [value]`
    Return {
        value: Option<Box<Self>>,
        pos:   SourcePos,
    },
    /// `error value`
    Error { value: Box<Self>, pos: SourcePos },
}

impl Node {
    /// Returns the position the node was parsed at.
    #[must_use]
    pub const fn pos(&self) -> &SourcePos {
        match self {
            Self::Literal { pos, .. }
            | Self::Identifier { pos, .. }
            | Self::Def { pos, .. }
            | Self::DefDestructure { pos, .. }
            | Self::Assign { pos, .. }
            | Self::Deref { pos, .. }
            | Self::DerefAssign { pos, .. }
            | Self::Invoke { pos, .. }
            | Self::Call { pos, .. }
            | Self::Lambda { pos, .. }
            | Self::Block { pos, .. }
            | Self::If { pos, .. }
            | Self::For { pos, .. }
            | Self::While { pos, .. }
            | Self::Logical { pos, .. }
            | Self::Not { pos, .. }
            | Self::List { pos, .. }
            | Self::Set { pos, .. }
            | Self::Map { pos, .. }
            | Self::Object { pos, .. }
            | Self::Comprehension { pos, .. }
            | Self::Spread { pos, .. }
            | Self::Require { pos, .. }
            | Self::Break { pos }
            | Self::Continue { pos }
            | Self::Return { pos, .. }
            | Self::Error { pos, .. } => pos,
        }
    }

    /// Creates a call of the function bound to `name`.
    #[must_use]
    pub fn call_named(name: &str, args: Vec<Self>, pos: &SourcePos) -> Self {
        Self::Call { function: Box::new(Self::Identifier { name: name.to_string(),
                                                           pos:  pos.clone(), }),
                     args:     args.into_iter().map(CallArgument::positional).collect(),
                     pos:      pos.clone(), }
    }

    /// Forms whose printed text ends at a delimiter of their own, so other
    /// syntax may follow them without being absorbed.
    const fn is_closed(&self) -> bool {
        matches!(self,
                 Self::Literal { .. }
                 | Self::Identifier { .. }
                 | Self::Deref { .. }
                 | Self::Invoke { .. }
                 | Self::Call { .. }
                 | Self::Block { .. }
                 | Self::Logical { .. }
                 | Self::List { .. }
                 | Self::Set { .. }
                 | Self::Map { .. }
                 | Self::Object { .. }
                 | Self::Comprehension { .. }
                 | Self::Break { .. }
                 | Self::Continue { .. })
    }

    /// Forms that only parse in statement position.
    const fn is_statement_only(&self) -> bool {
        matches!(self,
                 Self::Def { .. }
                 | Self::DefDestructure { .. }
                 | Self::Assign { .. }
                 | Self::DerefAssign { .. }
                 | Self::Require { .. }
                 | Self::Return { .. }
                 | Self::Break { .. }
                 | Self::Continue { .. }
                 | Self::Error { .. })
    }
}

/// Prints a node so nothing that follows can extend it.
struct Operand<'a>(&'a Node);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_closed() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

/// Prints a node where an expression is expected.
struct Expression<'a>(&'a Node);

impl fmt::Display for Expression<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_statement_only() {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Prints a loop or branch body wrapped in `do … end` unless it is closed.
struct Body<'a>(&'a Node);

impl fmt::Display for Body<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_closed() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "do {} end", self.0)
        }
    }
}

/// Prints a `catch` handler.
///
/// A handler follows its matcher directly, so one opening with `(` or `[`
/// would read as a call or index of the matcher. Anything but a block,
/// literal or identifier is wrapped in `do … end`.
struct Handler<'a>(&'a Node);

impl fmt::Display for Handler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Node::Block { .. } | Node::Literal { .. } | Node::Identifier { .. } => write!(f, "{}", self.0),
            _ => write!(f, "do {} end", self.0),
        }
    }
}

fn write_list<T>(f: &mut fmt::Formatter<'_>,
                 items: &[T],
                 mut write_item: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result)
                 -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_item(f, item)?;
    }
    Ok(())
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[CallArgument]) -> fmt::Result {
    write!(f, "(")?;
    write_list(f, args, |f, arg| match &arg.name {
        Some(name) => write!(f, "{name} = {}", Expression(&arg.value)),
        None => write!(f, "{}", Expression(&arg.value)),
    })?;
    write!(f, ")")
}

fn write_statements(f: &mut fmt::Formatter<'_>, statements: &[Node]) -> fmt::Result {
    for (i, statement) in statements.iter().enumerate() {
        if i > 0 {
            write!(f, "; ")?;
        }
        write!(f, "{statement}")?;
    }
    Ok(())
}

fn write_generator(f: &mut fmt::Formatter<'_>, generator: &Generator) -> fmt::Result {
    write!(f, "for {} in {}", generator.var, Operand(&generator.iterable))
}

impl fmt::Display for Node {
    /// Prints canonical source text that parses back to an equal tree,
    /// positions aside.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal { value, .. } => write!(f, "{value}"),
            Self::Identifier { name, .. } => write!(f, "{name}"),
            Self::Def { name, value, .. } => write!(f, "def {name} = {}", Expression(value)),
            Self::DefDestructure { names, value, .. } => {
                write!(f, "def [{}] = {}", names.join(", "), Expression(value))
            },
            Self::Assign { name, value, .. } => write!(f, "{name} = {}", Expression(value)),
            Self::Deref { target, index, .. } => {
                write!(f, "{}[{}]", Operand(target), Expression(index))
            },
            Self::DerefAssign { target, index, value, .. } => {
                write!(f, "{}[{}] = {}", Operand(target), Expression(index), Expression(value))
            },
            Self::Invoke { target, member, args, .. } => {
                write!(f, "{}->{member}", Operand(target))?;
                write_args(f, args)
            },
            Self::Call { function, args, .. } => {
                write!(f, "{}", Operand(function))?;
                write_args(f, args)
            },
            Self::Lambda { params, body, .. } => {
                write!(f, "fn(")?;
                write_list(f, params, |f, p| {
                    write!(f, "{}", p.name)?;
                    if p.rest {
                        write!(f, "{REST_MARKER}")?;
                    }
                    if let Some(default) = &p.default {
                        write!(f, " = {}", Expression(default))?;
                    }
                    Ok(())
                })?;
                write!(f, ") {body}")
            },
            Self::Block { body, catches, finally, .. } => {
                write!(f, "do ")?;
                write_statements(f, body)?;
                for clause in catches {
                    match &clause.matcher {
                        Some(matcher) => write!(f, " catch {} ", Operand(matcher))?,
                        None => write!(f, " catch all ")?,
                    }
                    write!(f, "{}", Handler(&clause.handler))?;
                }
                if !finally.is_empty() {
                    write!(f, " finally ")?;
                    write_statements(f, finally)?;
                }
                write!(f, " end")
            },
            Self::If { branches, otherwise, .. } => {
                for (i, (condition, branch)) in branches.iter().enumerate() {
                    let keyword = if i == 0 { "if" } else { " elif" };
                    let is_last = i + 1 == branches.len() && otherwise.is_none();
                    write!(f, "{keyword} {} then ", Expression(condition))?;
                    if is_last {
                        write!(f, "{branch}")?;
                    } else {
                        write!(f, "{}", Body(branch))?;
                    }
                }
                if let Some(otherwise) = otherwise {
                    write!(f, " else {otherwise}")?;
                }
                Ok(())
            },
            Self::For { target, iterable, body, .. } => {
                match target {
                    LoopTarget::Name(name) => write!(f, "for {name}")?,
                    LoopTarget::Destructure(names) => write!(f, "for [{}]", names.join(", "))?,
                }
                write!(f, " in {} do {body} end", Operand(iterable))
            },
            Self::While { condition, body, .. } => {
                write!(f, "while {} do {body} end", Operand(condition))
            },
            Self::Logical { op, left, right, .. } => {
                write!(f, "({} {op} {})", Operand(left), Operand(right))
            },
            Self::Not { operand, .. } => write!(f, "not {}", Operand(operand)),
            Self::List { elements, .. } => {
                write!(f, "[")?;
                write_list(f, elements, |f, e| write!(f, "{}", Expression(e)))?;
                write!(f, "]")
            },
            Self::Set { elements, .. } => {
                write!(f, "<< ")?;
                write_list(f, elements, |f, e| write!(f, "{}", Expression(e)))?;
                write!(f, " >>")
            },
            Self::Map { entries, .. } => {
                write!(f, "<<< ")?;
                write_list(f, entries, |f, entry| match entry {
                    MapEntry::Pair(k, v) => write!(f, "{} => {}", Operand(k), Expression(v)),
                    MapEntry::Spread(m) => write!(f, "...{}", Operand(m)),
                })?;
                write!(f, " >>>")
            },
            Self::Object { entries, .. } => {
                write!(f, "<* ")?;
                write_list(f, entries, |f, entry| match entry {
                    ObjectEntry::Field(name, v) => write!(f, "{name} = {}", Expression(v)),
                    ObjectEntry::Spread(o) => write!(f, "...{}", Operand(o)),
                })?;
                write!(f, " *>")
            },
            Self::Comprehension { kind,
                                  element,
                                  value,
                                  generators,
                                  condition,
                                  .. } => {
                let (open, close) = match kind {
                    ComprehensionKind::List => ("[", "]"),
                    ComprehensionKind::Set => ("<< ", " >>"),
                    ComprehensionKind::Map => ("<<< ", " >>>"),
                };
                write!(f, "{open}{}", Operand(element))?;
                if let Some(value) = value {
                    write!(f, " => {}", Operand(value))?;
                }
                write!(f, " ")?;
                match generators.as_ref() {
                    Generators::Single(g) => write_generator(f, g)?,
                    Generators::Product(a, b) => {
                        write_generator(f, a)?;
                        write!(f, " ")?;
                        write_generator(f, b)?;
                    },
                    Generators::Parallel(a, b) => {
                        write_generator(f, a)?;
                        write!(f, " also ")?;
                        write_generator(f, b)?;
                    },
                }
                if let Some(condition) = condition {
                    write!(f, " if {}", Operand(condition))?;
                }
                write!(f, "{close}")
            },
            Self::Spread { value, .. } => write!(f, "...{}", Operand(value)),
            Self::Require { spec, form, .. } => {
                write!(f, "require {}", Operand(spec))?;
                match form {
                    RequireForm::Bind(None) => Ok(()),
                    RequireForm::Bind(Some(name)) => write!(f, " as {name}"),
                    RequireForm::Unqualified => write!(f, " unqualified"),
                    RequireForm::Import(symbols) => {
                        write!(f, " import [")?;
                        write_list(f, symbols, |f, (symbol, alias)| match alias {
                            Some(alias) => write!(f, "{symbol} as {alias}"),
                            None => write!(f, "{symbol}"),
                        })?;
                        write!(f, "]")
                    },
                }
            },
            Self::Break { .. } => write!(f, "break"),
            Self::Continue { .. } => write!(f, "continue"),
            Self::Return { value: None, .. } => write!(f, "return"),
            Self::Return { value: Some(value), .. } => write!(f, "return {}", Expression(value)),
            Self::Error { value, .. } => write!(f, "error {}", Expression(value)),
        }
    }
}
