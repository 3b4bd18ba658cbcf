use std::rc::Rc;

use ckl::{
    Interpreter,
    error::{Error, RuntimeErrorKind},
    interpreter::{module::MemorySourceProvider, value::core::Value},
};

const STRINGS: &str = "def shout(s) s + '!'\ndef _helper = 1\ndef greeting = 'hi'";

fn interpreter(modules: &[(&str, &str)]) -> Interpreter {
    let provider = modules.iter()
                          .fold(MemorySourceProvider::default(), |p, (name, text)| p.with_module(name, text));
    Interpreter::with_source_provider(Rc::new(provider))
}

fn assert_success(modules: &[(&str, &str)], src: &str) {
    if let Err(e) = interpreter(modules).eval(src, "main.ckl") {
        panic!("Script failed: {e}");
    }
}

fn runtime_error(modules: &[(&str, &str)], src: &str) -> RuntimeErrorKind {
    match interpreter(modules).eval(src, "main.ckl") {
        Err(Error::Runtime(e)) => e.kind,
        Err(Error::Syntax(e)) => panic!("Expected a runtime error, got {e}"),
        Ok(v) => panic!("Expected a runtime error, got {v}"),
    }
}

#[test]
fn require_binds_the_module_identifier() {
    assert_success(&[("strings", STRINGS)],
                   "require 'lib/strings.ckl'\nassert(strings->shout('hi') == 'hi!')");
    assert_success(&[("strings", STRINGS)], "require 'strings'\nassert(strings->greeting == 'hi')");
}

#[test]
fn require_as_renames_the_binding() {
    assert_success(&[("strings", STRINGS)], "require 'strings' as s\nassert(s->shout('a') == 'a!')");
    assert!(matches!(runtime_error(&[("strings", STRINGS)], "require 'strings' as s\nstrings"),
                     RuntimeErrorKind::UndefinedSymbol { .. }));
}

#[test]
fn private_bindings_stay_in_the_module() {
    assert!(matches!(runtime_error(&[("strings", STRINGS)], "require 'strings' as s\ns->_helper()"),
                     RuntimeErrorKind::UnknownField { .. }));
    assert!(matches!(runtime_error(&[("strings", STRINGS)], "require 'strings' unqualified\n_helper"),
                     RuntimeErrorKind::UndefinedSymbol { .. }));
}

#[test]
fn unqualified_require_defines_every_public_name() {
    assert_success(&[("strings", STRINGS)],
                   "require 'strings' unqualified\nassert(shout(greeting) == 'hi!')");
}

#[test]
fn import_defines_the_listed_names() {
    assert_success(&[("strings", STRINGS)],
                   "require 'strings' import shout as yell, greeting\nassert(yell(greeting) == 'hi!')");
    assert_success(&[("strings", STRINGS)],
                   "require 'strings' import [shout as yell, greeting]\nassert(yell(greeting) == 'hi!')");
    assert!(matches!(runtime_error(&[("strings", STRINGS)], "require 'strings' import shout\ngreeting"),
                     RuntimeErrorKind::UndefinedSymbol { .. }));
    assert!(matches!(runtime_error(&[("strings", STRINGS)], "require 'strings' import whisper"),
                     RuntimeErrorKind::UndefinedSymbol { ref name } if name == "whisper"));
}

#[test]
fn modules_are_evaluated_once() {
    let counter = "def count = 0\ndef bump() count += 1";
    assert_success(&[("counter", counter)],
                   "require 'counter' as a\na->bump()\nrequire 'counter' as b\nb->bump()\nassert(a->bump() == 3)");
}

#[test]
fn module_cache_outlives_a_single_run() {
    let interpreter = interpreter(&[("counter", "def count = 0\ndef bump() count += 1")]);
    interpreter.eval("require 'counter'\ncounter->bump()", "first.ckl").unwrap();
    let value = interpreter.eval("require 'counter' as again\nagain->bump()", "second.ckl")
                           .unwrap();
    assert!(matches!(value, Value::Int(2)));
}

#[test]
fn modules_do_not_see_the_requiring_scope() {
    assert!(matches!(runtime_error(&[("peek", "def peek() secret")],
                                   "def secret = 1\nrequire 'peek'\npeek->peek()"),
                     RuntimeErrorKind::UndefinedSymbol { ref name } if name == "secret"));
}

#[test]
fn modules_can_require_other_modules() {
    let loud = "require 'strings'\ndef loud(s) strings->shout(strings->shout(s))";
    assert_success(&[("strings", STRINGS), ("loud", loud)],
                   "require 'loud'\nassert(loud->loud('x') == 'x!!')");
}

#[test]
fn module_objects_do_not_reexport_dependencies() {
    let loud = "require 'strings'\ndef loud(s) strings->shout(s)";
    assert!(matches!(runtime_error(&[("strings", STRINGS), ("loud", loud)], "require 'loud'\nloud->strings"),
                     RuntimeErrorKind::UnknownField { .. }));
}

#[test]
fn circular_requires_are_errors() {
    let kind = runtime_error(&[("a", "require 'b'"), ("b", "require 'a'")], "require 'a'");
    let RuntimeErrorKind::CircularRequire { module, chain } = kind else {
        panic!("expected a circular require");
    };
    assert_eq!(module, "a");
    assert_eq!(chain, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn self_require_is_circular() {
    assert!(matches!(runtime_error(&[("me", "require 'me'")], "require 'me'"),
                     RuntimeErrorKind::CircularRequire { .. }));
}

#[test]
fn missing_module_is_error() {
    assert!(matches!(runtime_error(&[], "require 'nowhere'"),
                     RuntimeErrorKind::ModuleNotFound { ref module, .. } if module == "nowhere"));
}

#[test]
fn missing_module_can_be_caught() {
    assert_success(&[], "def ok = do require 'nowhere' catch all TRUE end\nassert(ok)");
}

#[test]
fn syntax_error_in_module_is_reported() {
    assert!(matches!(runtime_error(&[("broken", "def = 1")], "require 'broken'"),
                     RuntimeErrorKind::Syntax(_)));
}

#[test]
fn failed_module_is_not_cached() {
    let interpreter = interpreter(&[("flaky", "def x = 1\nerror 'boom'")]);
    assert!(interpreter.eval("require 'flaky'", "main.ckl").is_err());
    assert!(interpreter.eval("require 'flaky'", "main.ckl").is_err());
}

#[test]
fn error_inside_module_names_the_require_frame() {
    let Err(Error::Runtime(e)) = interpreter(&[("boom", "def x = 1\nerror 'boom'")]).eval("require 'boom'",
                                                                                      "main.ckl")
    else {
        panic!("expected a runtime error");
    };
    assert!(e.stacktrace.iter().any(|frame| frame.description == "require boom"));
}
