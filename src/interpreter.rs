/// Token types and source positions.
///
/// Defines the `Token` produced by the lexer and the `SourcePos` that every
/// token, node and error carries.
pub mod token;
/// The lexer module tokenizes source code for further parsing.
///
/// The lexer reads the raw source text and produces a stream of tokens, each
/// corresponding to a meaningful language element such as a number, string,
/// pattern, identifier, keyword or interpunction. It is written as an
/// explicit state machine over the characters of the input.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with kind, text and
///   source location.
/// - Decodes string escapes and recognizes the longest interpunction.
/// - Reports lexical errors for unterminated or malformed literals.
pub mod lexer;
/// The parser module builds the abstract syntax tree (AST) from tokens.
///
/// The parser processes the token stream produced by the lexer and constructs
/// an AST that represents the syntactic structure of the program. Operators
/// are desugared into calls of named functions along the way.
///
/// # Responsibilities
/// - Converts tokens into structured AST nodes.
/// - Validates the grammar, reporting errors with location info.
/// - Desugars operators, predicates and compound assignments.
pub mod parser;
/// The evaluator module executes AST nodes and computes results.
///
/// The evaluator walks the AST, evaluates expressions and statements,
/// manages variable state through environments, calls functions and
/// propagates control sentinels and runtime errors.
///
/// # Responsibilities
/// - Evaluates AST nodes and hosts the built-in function catalogue.
/// - Handles variables, closures, loops, blocks and modules.
/// - Reports runtime errors with a stack trace of call frames.
pub mod evaluator;
/// The value module defines the runtime data types for evaluation.
///
/// This module declares all the value types used during interpretation, such
/// as integers, decimals, strings, dates, patterns, the shared mutable
/// collections, functions and streams. It also provides the total ordering
/// and the arithmetic with numeric promotion.
pub mod value;
/// Lexically nested variable scopes and the per-interpreter runtime state.
pub mod environment;
/// Module source providers and module identifiers.
pub mod module;
/// Static analyses over a parsed AST.
pub mod analysis;
