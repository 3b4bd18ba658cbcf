use ckl::{
    ast::Node,
    error::SyntaxError,
    interpreter::{lexer::tokenize, parser::core::parse_source, token::TokenKind},
};
use pretty_assertions::assert_eq;

fn parse(source: &str) -> Node {
    parse_source(source, "{input}").unwrap_or_else(|e| panic!("Parsing {source:?} failed: {e}"))
}

fn printed(source: &str) -> String {
    parse(source).to_string()
}

fn syntax_error(source: &str) -> SyntaxError {
    match parse_source(source, "{input}") {
        Err(e) => e,
        Ok(node) => panic!("Parsing {source:?} succeeded with {node}"),
    }
}

#[test]
fn arithmetic_desugars_into_calls() {
    assert_eq!(printed("1 + 2 * 3 - 4"), "sub(add(1, mul(2, 3)), 4)");
    assert_eq!(printed("(1 + 2) % 3"), "mod(add(1, 2), 3)");
    assert_eq!(printed("-x"), "sub(0, x)");
    assert_eq!(printed("+x"), "x");
    assert_eq!(printed("a - -1"), "sub(a, -1)");
}

#[test]
fn relational_chains_become_conjunctions() {
    assert_eq!(printed("1 < 2 <= 3"), "(less(1, 2) and less_equals(2, 3))");
    assert_eq!(printed("a is b"), "equals(a, b)");
    assert_eq!(printed("a is not b"), "not_equals(a, b)");
    assert_eq!(printed("a <> b"), "not_equals(a, b)");
    assert!(matches!(parse("1 < 2 <= 3"), Node::Logical { .. }));
}

#[test]
fn logical_precedence() {
    assert_eq!(printed("a or b and c"), "(a or (b and c))");
    assert_eq!(printed("a xor b or c"), "((a xor b) or c)");
    assert_eq!(printed("not a and b"), "((not a) and b)");
    assert_eq!(printed("not not a"), "not (not a)");
}

#[test]
fn predicates_desugar_into_calls() {
    assert_eq!(printed("x is empty"), "is_empty(x)");
    assert_eq!(printed("x is not zero"), "not is_zero(x)");
    assert_eq!(printed("d is date with hour"), "is_date_hour(d)");
    assert_eq!(printed("x is date(1)"), "equals(x, date(1))");
    assert_eq!(printed("s starts with 'a'"), "starts_with(s, 'a')");
    assert_eq!(printed("s not ends with 'a'"), "not ends_with(s, 'a')");
    assert_eq!(printed("xs contains 1"), "contains(xs, 1)");
    assert_eq!(printed("s matches //[a-z]//"), "matches(s, //[a-z]//)");
    assert_eq!(printed("x in xs"), "contains(xs, x)");
    assert_eq!(printed("x not in xs"), "not contains(xs, x)");
}

#[test]
fn postfix_forms() {
    assert_eq!(printed("o->name"), "o['name']");
    assert_eq!(printed("o->greet(1)"), "o->greet(1)");
    assert_eq!(printed("x !> f(1)"), "f(x, 1)");
    assert_eq!(printed("x !> f"), "f(x)");
    assert_eq!(printed("f(1)(2)[0]"), "f(1)(2)[0]");
    assert_eq!(printed("f(a, b = 2, ...rest)"), "f(a, b = 2, ...rest)");
}

#[test]
fn assignments() {
    assert_eq!(printed("x += 1"), "x = add(x, 1)");
    assert_eq!(printed("xs[0] *= 2"), "xs[0] = mul(xs[0], 2)");
    assert_eq!(printed("o->a = 1"), "o['a'] = 1");
    assert!(matches!(parse("x = 1"), Node::Assign { .. }));
    assert!(matches!(syntax_error("1 = 2"), SyntaxError::InvalidAssignmentTarget { .. }));
    assert!(matches!(syntax_error("f() += 2"), SyntaxError::InvalidAssignmentTarget { .. }));
}

#[test]
fn definitions() {
    assert_eq!(printed("def f(a, b = 1, rest...) a"), "def f = fn(a, b = 1, rest...) a");
    assert_eq!(printed("def [a, b] = pair"), "def [a, b] = pair");
    let Node::Def { value, .. } = parse("def g = fn(x) x") else {
        panic!("expected a definition");
    };
    assert!(matches!(*value, Node::Lambda { name: Some(ref name), .. } if name == "g"));
}

#[test]
fn misplaced_rest_parameter_is_error() {
    let SyntaxError::MisplacedRestParameter { name, pos } = syntax_error("fn(a..., b) a") else {
        panic!("expected a misplaced rest parameter");
    };
    assert_eq!(name, "a");
    assert_eq!(pos.column, 4);
}

#[test]
fn single_statement_blocks_collapse() {
    assert!(matches!(parse("do 1 end"), Node::Literal { .. }));
    assert!(matches!(parse("(x)"), Node::Identifier { .. }));
    assert!(matches!(parse("do 1; 2 end"), Node::Block { .. }));
    assert!(matches!(parse("do 1 catch all 2 end"), Node::Block { .. }));
}

#[test]
fn block_clauses() {
    assert_eq!(printed("do a; b catch 'x' c catch all d finally e end"),
               "do a; b catch 'x' c catch all d finally e end");
    assert_eq!(printed("do a catch fn(e) e > 1 b end"), "do a catch (fn(e) greater(e, 1)) b end");
}

#[test]
fn control_structures() {
    assert_eq!(printed("if a then b elif c then d else e"), "if a then b elif c then d else e");
    assert_eq!(printed("for x in xs f(x)"), "for x in xs do f(x) end");
    assert_eq!(printed("for [k, v] in m f(k)"), "for [k, v] in m do f(k) end");
    assert_eq!(printed("while x < 3 x += 1"), "while less(x, 3) do x = add(x, 1) end");
    assert_eq!(printed("return"), "return");
    assert_eq!(printed("do return end"), "return");
}

#[test]
fn collections() {
    assert_eq!(printed("[1, ...xs]"), "[1, ...xs]");
    assert_eq!(printed("<<1, 2>>"), "<< 1, 2 >>");
    assert_eq!(printed("<<<'a' => 1, ...m>>>"), "<<< 'a' => 1, ...m >>>");
    assert_eq!(printed("<* a = 1, ...o *>"), "<* a = 1, ...o *>");
    assert_eq!(printed("[]"), "[]");
    assert_eq!(printed("<<<>>>"), "<<<  >>>");
}

#[test]
fn comprehensions() {
    assert_eq!(printed("[x for x in xs]"), "[x for x in xs]");
    assert_eq!(printed("<<x for x in a for y in b if y>>"), "<< x for x in a for y in b if y >>");
    assert_eq!(printed("<<<k => v for k in a also for v in b>>>"),
               "<<< k => v for k in a also for v in b >>>");
}

#[test]
fn require_forms() {
    assert_eq!(printed("require 'lib/util'"), "require 'lib/util'");
    assert_eq!(printed("require 'util' as u"), "require 'util' as u");
    assert_eq!(printed("require 'util' unqualified"), "require 'util' unqualified");
    assert_eq!(printed("require 'util' import a, b as c"), "require 'util' import [a, b as c]");
    assert_eq!(printed("require 'util' import [a, b as c]"), "require 'util' import [a, b as c]");
    assert_eq!(printed("require 'util' import [a]; x"), "do require 'util' import [a]; x end");
    assert!(matches!(syntax_error("require 'util' import [a, b"), SyntaxError::UnexpectedEndOfInput { .. }));
}

#[test]
fn catch_handlers_stay_apart_from_their_matcher() {
    assert_eq!(printed("do error 1 catch 1 do [2] end end"), "do error 1 catch 1 do [2] end end");
    assert_eq!(printed("do error 1 catch 1 do (a and b) end end"),
               "do error 1 catch 1 do (a and b) end end");
    assert_eq!(printed("do a catch 'x' f(1) end"), "do a catch 'x' do f(1) end end");
}

#[test]
fn unexpected_tokens_are_errors() {
    assert!(matches!(syntax_error("def = 1"), SyntaxError::UnexpectedToken { .. }));
    assert!(matches!(syntax_error("(1 + 2"), SyntaxError::UnexpectedEndOfInput { .. }));
    assert!(matches!(syntax_error("do 1"), SyntaxError::UnexpectedEndOfInput { .. }));
    assert!(matches!(syntax_error("[1, 2"), SyntaxError::UnexpectedEndOfInput { .. }));
    assert!(matches!(syntax_error("if a b"), SyntaxError::UnexpectedToken { .. }));
    assert!(matches!(syntax_error(")"), SyntaxError::UnexpectedToken { .. }));
}

#[test]
fn error_positions_point_at_the_token() {
    let SyntaxError::UnexpectedToken { token, pos, .. } = syntax_error("def x = 1\ndef ]") else {
        panic!("expected an unexpected token");
    };
    assert_eq!(token, "]");
    assert_eq!((pos.line, pos.column), (2, 5));
}

const PROGRAMS: &[&str] = &[
    "def make = fn(n) fn(x) x + n; def add5 = make(5); add5(3)",
    "for i in range(10) do if i == 5 then return i end",
    "def r = do error 'x' catch 'y' 1 catch all do log(_err); 2 end finally cleanup() end",
    "def grade(n) if n > 90 then 'A' elif n > 80 then do x = 1; 'B' end else 'C'",
    "[x * x for x in xs if x is not negative and not (x in skip)]",
    "<<<k => length(v) for k in keys(m) also for v in values(m)>>>",
    "def o = <* name = 'it\\'s', greet = fn(self, g = 'hi', rest...) g + self->name *>; o->greet()",
    "require 'lib/strings' import upper as up; up('x') !> println",
    "while not done do step(); if ready then break else continue end",
    "def [a, b] = [1]; xs[a] += -2.5; -(a - b)",
    "do error 1 catch 1 do [2] end end",
    "do error 1 catch 1 do (a and b) end end",
    "require 'm' import [a, b as c]; c(a)",
];

#[test]
fn canonical_print_parses_back_to_the_same_tree() {
    for source in PROGRAMS {
        let first = printed(source);
        let second = printed(&first);
        assert_eq!(first, second, "reprint of {source:?} is not stable");
    }
}

#[test]
fn canonical_print_retokenizes_equivalently() {
    let stream = |source: &str| -> Vec<(TokenKind, String)> {
        tokenize(source, "{input}").unwrap()
                                   .into_iter()
                                   .map(|t| (t.kind, t.value))
                                   .collect()
    };
    for source in PROGRAMS {
        let first = printed(source);
        let second = printed(&first);
        assert_eq!(stream(&first), stream(&second));
    }
}
