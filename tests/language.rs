use std::{fs, path::PathBuf, rc::Rc};

use ckl::{
    Interpreter,
    error::{Error, RuntimeErrorKind},
    get_result,
    interpreter::{
        module::FileSourceProvider,
        value::{
            core::Value,
            stream::{InputStream, OutputStream},
        },
    },
};
use walkdir::WalkDir;

#[test]
fn demo_scripts_work() {
    let mut count = 0;

    for entry in
        WalkDir::new("demos").into_iter()
                             .filter_map(Result::ok)
                             .filter(|e| e.path().extension().is_some_and(|ext| ext == "ckl"))
    {
        let path = entry.path();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        count += 1;
        let provider = FileSourceProvider::new(vec![PathBuf::from("demos/lib")]);
        let interpreter = Interpreter::with_source_provider(Rc::new(provider));
        interpreter.environment()
                   .define("stdout", Value::Output(Rc::new(OutputStream::buffer())));
        if let Err(e) = interpreter.eval(&content, &path.to_string_lossy()) {
            panic!("Demo {path:?} failed:\n{e}");
        }
    }

    assert!(count > 0, "No demo scripts found in demos");
}

fn assert_success(src: &str) {
    if let Err(e) = get_result(src, false) {
        panic!("Script failed: {e}");
    }
}

fn assert_failure(src: &str) {
    if get_result(src, false).is_ok() {
        panic!("Script succeeded but was expected to fail")
    }
}

fn runtime_error(src: &str) -> RuntimeErrorKind {
    match get_result(src, false) {
        Err(Error::Runtime(e)) => e.kind,
        Err(Error::Syntax(e)) => panic!("Expected a runtime error, got {e}"),
        Ok(v) => panic!("Expected a runtime error, got {v}"),
    }
}

fn eval(src: &str) -> Value {
    get_result(src, false).unwrap_or_else(|e| panic!("Script failed: {e}"))
}

#[test]
fn definitions_and_basic_arithmetic() {
    assert_success("def x = 1 + 2\nassert(x == 3)");
    assert_success("def x = 7 * 9\nassert(x == 63)");
    assert_success("def x = 8 - 5\nassert(x == 3)");
    assert_success("def x = 10 / 2\nassert(x == 5)");
    assert_success("def x = 10 % 4\nassert(x == 2)");
    assert_success("assert(2 + 3 * 4 == 14); assert((2 + 3) * 4 == 20)");
}

#[test]
fn compound_assignments() {
    assert_success("def x = 5; x += 2; assert(x == 7)");
    assert_success("def x = 5; x -= 2; assert(x == 3)");
    assert_success("def x = 5; x *= 2; assert(x == 10)");
    assert_success("def x = 9; x /= 3; assert(x == 3)");
    assert_success("def xs = [1, 2]; xs[0] += 10; assert(xs == [11, 2])");
}

#[test]
fn numeric_promotion() {
    assert_eq!(eval("type(1 + 1)"), Value::from("int"));
    assert_eq!(eval("type(1 + 1.0)"), Value::from("decimal"));
    assert_success("assert(sum([1, 2.5, 3]) == 6.5)");
    assert_success("assert(type(sum([1, 2, 3])) == 'int')");
    assert_eq!(eval("string(4 / 2.0)"), Value::from("2.0"));
}

#[test]
fn integer_overflow_is_error() {
    assert!(matches!(runtime_error("MAXINT + 1"), RuntimeErrorKind::Overflow));
}

#[test]
fn repetition_is_bounded() {
    assert_eq!(eval("'ab' * 3"), Value::from("ababab"));
    assert_success("assert([1, 2] * 2 == [1, 2, 1, 2]); assert('x' * -1 == '')");
    assert!(matches!(runtime_error("'ab' * 4611686018427387904"), RuntimeErrorKind::Overflow));
    assert!(matches!(runtime_error("[1, 2] * 4611686018427387904"), RuntimeErrorKind::Overflow));
}

#[test]
fn division_by_zero_is_error() {
    assert!(matches!(runtime_error("1 / 0"), RuntimeErrorKind::DivisionByZero));
    assert!(matches!(runtime_error("1 % 0"), RuntimeErrorKind::DivisionByZero));
}

#[test]
fn division_by_zero_fallback_value() {
    assert_success("def DIV_0_VALUE = -1; assert(1 / 0 == -1)");
    assert_failure("def DIV_0_VALUE = NULL; 1 / 0");
}

#[test]
fn strings_concatenate() {
    assert_eq!(eval("'a' + 1 + 'b'"), Value::from("a1b"));
    assert_eq!(eval("\"tab\\tand\\x41\""), Value::from("tab\tandA"));
}

#[test]
fn closures_capture_their_environment() {
    assert_success("def make = fn(n) fn(x) x + n; def add5 = make(5); assert(add5(3) == 8)");
    assert_success("def k = 1; def f = fn() k; k = 2; assert(f() == 2)");
    assert_success(
        "def counter() do def n = 0; fn() do n += 1; n end end
         def c = counter(); c(); c()
         assert(c() == 3)
         def d = counter()
         assert(d() == 1)",
    );
}

#[test]
fn user_defined_function_and_calls() {
    assert_success("def fact(n) if n <= 1 then 1 else n * fact(n - 1); assert(fact(10) == 3628800)");
    assert_success("def f(a, b = 10) a + b; assert(f(1) == 11); assert(f(b = 1, a = 2) == 3)");
    assert_success("def h(a, b = a * 2) b; assert(h(3) == 6)");
    assert_success("def g(first, rest...) length(rest); assert(g(1, 2, 3) == 2); assert(g(1) == 0)");
    assert_success("def f(a, b) a - b; assert(f(...[5, 2]) == 3)");
    assert_success("def f(a, b) a - b; assert(f(...<<<'b' => 1, 'a' => 4>>>) == 3)");
    assert_success("def f(a, b) a - b; assert(f(...<<<1 => 10, 'b' => 4>>>) == 6)");
}

#[test]
fn wrong_function_arity_is_error() {
    assert!(matches!(runtime_error("def f(a) a; f(1, 2)"),
                     RuntimeErrorKind::TooManyArguments { .. }));
    assert!(matches!(runtime_error("def f(a, b) a; f(1)"),
                     RuntimeErrorKind::MissingArgument { .. }));
    assert!(matches!(runtime_error("def f(a) a; f(c = 1)"),
                     RuntimeErrorKind::UnknownArgument { .. }));
}

#[test]
fn calling_a_non_function_is_error() {
    assert!(matches!(runtime_error("def x = 1; x(2)"), RuntimeErrorKind::NotAFunction { .. }));
}

#[test]
fn unknown_variable_is_error() {
    assert!(matches!(runtime_error("def y = x + 1"), RuntimeErrorKind::UndefinedSymbol { .. }));
}

#[test]
fn builtins_can_be_rebound() {
    assert_success("def add(a, b) a * b; assert(2 + 3 == 6)");
    assert_success("assert(1 + 2 == 3)");
}

#[test]
fn logical_and_comparisons() {
    assert_success("assert(1 < 2 <= 3)");
    assert_success("assert(not (3 < 2 < 5))");
    assert_success("assert(1 <> 2); assert(1 != 2); assert(1 is not 2); assert(2 is 2)");
    assert_success("assert(TRUE and not FALSE); assert(FALSE or TRUE)");
    assert_success("assert(TRUE xor FALSE); assert(not (TRUE xor TRUE))");
    assert_success("assert(1 == 1.0); assert('a' < 'b')");
}

#[test]
fn logical_operators_short_circuit() {
    assert_success("def hits = []; def touch() do append(hits, 1); TRUE end
                    FALSE and touch(); TRUE or touch()
                    assert(length(hits) == 0)
                    TRUE xor touch()
                    assert(length(hits) == 1)");
}

#[test]
fn truthiness() {
    assert_success("assert(not 0); assert(not 0.0); assert(not ''); assert(not []); assert(not NULL)");
    assert_success("assert([0]); assert('0'); assert(-1); assert(<* a = 1 *>)");
}

#[test]
fn if_elif_else() {
    assert_success(
        "def grade(n) if n > 90 then 'A' elif n > 80 then 'B' else 'C'
         assert(grade(95) == 'A'); assert(grade(85) == 'B'); assert(grade(10) == 'C')",
    );
    assert_eq!(eval("if FALSE then 1"), Value::Null);
}

#[test]
fn blocks_do_not_open_scopes() {
    assert_success("do def y = 5; def z = 6 end; assert(y + z == 11)");
    assert_success("(def w = 1; w += 1); assert(w == 2)");
}

#[test]
fn loops() {
    assert_success("def total = 0; for x in [1, 2, 3] total += x; assert(total == 6)");
    assert_success("def i = 0; while i < 5 i += 1; assert(i == 5)");
    assert_success("assert((for x in [1, 2, 3] x * 10) == 30)");
    assert_success("assert((for x in range(10) if x == 3 then break) == TRUE)");
    assert_success("assert((for x in [] x) == NULL)");
    assert_success(
        "def seen = []
         for x in range(6) do if x % 2 == 0 then continue; append(seen, x) end
         assert(seen == [1, 3, 5])",
    );
    assert_success("def ks = []; for [k, v] in <<<'a' => 1, 'b' => 2>>> append(ks, k + v); assert(ks == ['a1', 'b2'])");
}

#[test]
fn loop_variables_are_scoped() {
    assert_failure("for x in [1] def inner = x; inner");
    assert_failure("for x in [1] 0; x");
}

#[test]
fn return_stops_iteration() {
    assert_eq!(eval("for i in range(10) do if i == 5 then return i end"), Value::Int(5));
    assert_success(
        "def find(xs, wanted) do for x in xs if x == wanted then return 'found'; 'missing' end
         assert(find([1, 2], 2) == 'found'); assert(find([1, 2], 3) == 'missing')",
    );
}

#[test]
fn break_outside_loop_is_error() {
    assert!(matches!(runtime_error("break"), RuntimeErrorKind::ControlFlowEscape { .. }));
    assert!(matches!(runtime_error("def f() continue; f()"),
                     RuntimeErrorKind::ControlFlowEscape { .. }));
}

#[test]
fn destructuring_definitions() {
    assert_success("def [a, b] = [1]; assert(a == 1); assert(b == NULL)");
    assert_success("def [a, b] = [1, 2, 3]; assert(a + b == 3)");
}

#[test]
fn lists_and_indexing() {
    assert_success("def xs = [10, 20, 30]; assert(xs[0] == 10); assert(xs[-1] == 30)");
    assert_success("def xs = [1, 2]; xs[1] = 5; assert(xs == [1, 5])");
    assert_success("assert('hello'[-1] == 'o'); assert('hello'[1] == 'e')");
    assert!(matches!(runtime_error("[1][5]"), RuntimeErrorKind::IndexOutOfBounds { .. }));
    assert_success("def xs = [1, 2]; def ys = xs; append(ys, 3); assert(length(xs) == 3)");
    assert_success("assert([1, ...[2, 3], 4] == [1, 2, 3, 4])");
    assert_success("assert([1, 2] + 3 == [1, 2, 3]); assert([1, 2, 3] - 2 == [1, 3])");
}

#[test]
fn sets_and_maps_are_ordered() {
    assert_success("assert(list(<<3, 1, 2, 1>>) == [1, 2, 3])");
    assert_success(
        "def m = <<<'b' => 1, 'a' => 2, 'b' => 3>>>
         assert(length(m) == 2); assert(m['b'] == 3); assert(keys(m) == ['a', 'b'])",
    );
    assert_success("assert(<<<'a' => 1>>>['missing'] == NULL)");
    assert_success("assert(length(<<1, '1'>>) == 2)");
    assert_success("def m = <<<>>>; m['k'] = 'v'; assert(m->k == 'v')");
}

#[test]
fn containers_can_hold_themselves() {
    assert_success("def s = <<1>>; append(s, s); assert(length(s) == 2)");
    assert_success("def m = <<<1 => 2>>>; m[m] = 3; assert(length(m) == 2)");
    assert_success("def o = <* a = 1 *>; o[o] = 2; assert(length(o) == 2)");
}

#[test]
fn objects() {
    assert_success("def o = <* a = 1, b = 2 *>; assert(o->a + o['b'] == 3)");
    assert_success("def o = <* a = 1 *>; o->a = 5; assert(o->a == 5)");
    assert_success("def base = <* a = 1, b = 2 *>; def o = <* ...base, b = 3 *>; assert(o->a + o->b == 4)");
    assert!(matches!(runtime_error("<* a = 1 *>->b"), RuntimeErrorKind::UnknownField { .. }));
}

#[test]
fn member_invocation() {
    assert_success(
        "def o = <* name = 'x', greet = fn(self, greeting) greeting + ' ' + self->name *>
         assert(o->greet('hi') == 'hi x')",
    );
    assert_success("assert([3, 1, 2]->length() == 3)");
    assert_success("assert([1, 2, 3] !> sum == 6); assert('abc' !> length == 3)");
    assert_success("def join(a, b, sep) a + sep + b; assert('x' !> join('y', '-') == 'x-y')");
}

#[test]
fn comprehensions() {
    assert_success("assert([x * 2 for x in range(4)] == [0, 2, 4, 6])");
    assert_success("assert([x for x in range(10) if x % 3 == 0] == [0, 3, 6, 9])");
    assert_success(
        "assert([[x, y] for x in [1, 2] for y in ['a', 'b']] == [[1, 'a'], [1, 'b'], [2, 'a'], [2, 'b']])",
    );
    assert_success("assert([x + y for x in [1, 2] also for y in [10, 20]] == [11, 22])");
    assert_success("assert(<<x % 3 for x in range(1, 10)>> == <<0, 1, 2>>)");
    assert_success("def m = <<<x => x * x for x in range(4)>>>; assert(m[3] == 9); assert(length(m) == 4)");
}

#[test]
fn parallel_generators_must_match_in_length() {
    assert!(matches!(runtime_error("[x for x in [1, 2] also for y in [1]]"),
                     RuntimeErrorKind::TypeError { .. }));
}

#[test]
fn predicates() {
    assert_success("assert('' is empty); assert([1] is not empty)");
    assert_success("assert(0 is zero); assert(-1 is negative); assert(1 is not negative)");
    assert_success("assert('12.5' is numerical); assert('ab12' is alphanumerical)");
    assert_success("assert('hello' starts with 'he'); assert('hello' not ends with 'x')");
    assert_success("assert([1, 2] contains 2); assert(2 in [1, 2]); assert(3 not in [1, 2])");
    assert_success("assert('abc123' matches //[0-9]+//); assert('abc' not matches //^[0-9]+$//)");
    assert_success("assert('20240131' is date); assert('2024013115' is date with hour)");
    assert_success("assert('1230' is time); assert('2460' is not time)");
}

#[test]
fn dates() {
    assert_success("def d = date('20240228'); assert(type(d) == 'date'); assert(string(d + 2) == '20240301000000')");
    assert_success("assert(date('20240301') - date('20240228') == 2)");
    assert_success("assert(date('20240101') < date('20240102'))");
}

#[test]
fn catch_and_finally() {
    assert_success(
        "def log = []
         def r = do error 'x' catch all do append(log, 'catch'); 'handled' end finally append(log, 'finally') end
         assert(r == 'handled'); assert(log == ['catch', 'finally'])",
    );
    assert_success(
        "def log = []
         def r = do do error 'x' catch 'y' 1 finally append(log, 'f') end catch all 2 end
         assert(r == 2); assert(log == ['f'])",
    );
    assert_success("assert(do error 7 catch fn(e) e > 5 'big' catch all 'small' end == 'big')");
    assert_success("assert(do error 'boom' catch 'boom' 'matched' end == 'matched')");
    assert_success("assert(do 1 / 0 catch all _err->value end is not empty)");
    assert_success("assert(do error <* code = 42 *> catch all _err->value->code end == 42)");
}

#[test]
fn finally_runs_once_on_every_path() {
    assert_success(
        "def count = 0
         def f() do return 1 finally count += 1 end
         assert(f() == 1); assert(count == 1)",
    );
    assert_success(
        "def count = 0
         for x in [1, 2] do break finally count += 1 end
         assert(count == 1)",
    );
    assert_success(
        "def count = 0
         do do error 'x' finally count += 1 end catch all NULL end
         assert(count == 1)",
    );
}

#[test]
fn errors_can_be_rethrown() {
    assert_success("assert(do do error 'inner' catch all error _err end catch 'inner' 'outer' end == 'outer')");
}

#[test]
fn uncaught_error_carries_payload() {
    match runtime_error("error <<<'code' => 1>>>") {
        RuntimeErrorKind::Thrown { payload } => assert_eq!(payload.to_string(), "<<<'code' => 1>>>"),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn assert_reports_message() {
    match runtime_error("assert(FALSE, 'custom')") {
        RuntimeErrorKind::Thrown { payload } => assert_eq!(payload, Value::from("custom")),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn syntax_errors_are_not_caught() {
    assert_failure("do eval('1 +') catch all 0 end");
}

#[test]
fn runaway_recursion_is_error() {
    assert_failure("def f(n) f(n + 1); f(0)");
}

#[test]
fn stack_trace_names_frames() {
    let Err(Error::Runtime(e)) = get_result("def inner() error 'x'\ndef outer() inner()\nouter()", false)
    else {
        panic!("expected a runtime error");
    };
    let frames: Vec<&str> = e.stacktrace.iter().map(|f| f.description.as_str()).collect();
    assert_eq!(frames, ["inner", "outer"]);
    assert_eq!(e.stacktrace[1].pos.line, 3);
    let rendered = e.render_stacktrace();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("    at inner ("));
    assert!(lines[1].starts_with("    at outer ("));
    assert!(rendered.ends_with(")\n"));
}

#[test]
fn quoted_nodes() {
    assert_success("def node = parse('1 + 2'); assert(eval(node) == 3); assert(string(node) == 'add(1, 2)')");
    assert_success("def x = 4; assert(eval('x * x') == 16)");
    assert_success("assert(type(parse('x')) == 'node')");
}

#[test]
fn conversions() {
    assert_success("assert(int('42') == 42); assert(int(3.9) == 3); assert(int('2.5') == 2)");
    assert_success("assert(decimal(1) == 1.0); assert(type(decimal('1.5')) == 'decimal')");
    assert_success("assert(boolean(1)); assert(not boolean(''))");
    assert_success("assert(string([1, 'a']) == \"[1, 'a']\")");
    assert_failure("int('abc')");
}

#[test]
fn println_writes_to_the_bound_stdout() {
    let interpreter = Interpreter::new();
    let out = Rc::new(OutputStream::buffer());
    interpreter.environment().define("stdout", Value::Output(Rc::clone(&out)));

    interpreter.eval("println('hi'); print(1); print(2); println(); println([1, 'a'])", "<test>")
               .unwrap();

    assert_eq!(out.contents().as_deref(), Some("hi\n12\n[1, 'a']\n"));
}

#[test]
fn read_line_reads_the_bound_stdin() {
    let interpreter = Interpreter::new();
    interpreter.environment()
               .define("stdin", Value::Input(Rc::new(InputStream::from_text("a\nb\n"))));

    let value = interpreter.eval("[read_line(), read_line(), read_line()]", "<test>")
                           .unwrap();

    assert_eq!(value.to_string(), "['a', 'b', NULL]");
}

#[test]
fn interpreter_keeps_globals_between_runs() {
    let interpreter = Interpreter::new();
    interpreter.eval("def total = 1", "<first>").unwrap();
    interpreter.eval("total += 41", "<second>").unwrap();
    assert_eq!(interpreter.eval("total", "<third>").unwrap(), Value::Int(42));
}
