use sigil::env::Environment;
use sigil::value::Value;
use sigil::{eval, parse};

fn eval_source(input: &str) -> Value {
    let (mut program, errors) = parse(input);
    assert!(errors.is_empty(), "parse errors in {input:?}: {errors:?}");
    let env = Environment::new();
    eval::eval_program(&mut program, &env)
}

fn assert_integer(input: &str, expected: i64) {
    assert_eq!(eval_source(input), Value::Integer(expected), "input {input:?}");
}

fn assert_display(input: &str, expected: &str) {
    assert_eq!(eval_source(input).to_string(), expected, "input {input:?}");
}

fn assert_error(input: &str, message: &str) {
    match eval_source(input) {
        Value::Error(actual) => assert_eq!(actual, message, "input {input:?}"),
        other => panic!("expected error for {input:?}, got {other}"),
    }
}

#[test]
fn self_evaluating_atoms() {
    assert_integer("5", 5);
    assert_integer("10", 10);
    assert_display("nil", "nil");
    assert_display("t", "T");
}

#[test]
fn prefix_atoms() {
    assert_integer("+5", 5);
    assert_integer("-5", -5);
    assert_error("+nil", "unknown operator: + NIL");
    assert_error("-t", "unknown operator: - TRUE");
}

#[test]
fn arithmetic() {
    assert_integer("(+ 5 5)", 10);
    assert_integer("(+ -5 5)", 0);
    assert_integer("(+)", 0);
    assert_integer("(- 5 5)", 0);
    assert_integer("(- 2)", -2);
    assert_integer("(- 10 1 2)", 7);
    assert_integer("(* 5 5)", 25);
    assert_integer("(*)", 1);
    assert_integer("(/ 10 2)", 5);
    assert_integer("(/ 7 2)", 3);
    assert_integer("(/ 5)", 0);
    assert_integer("(/ 1)", 1);
    assert_integer("(+ (- 1 2) 3)", 2);
}

#[test]
fn arithmetic_errors() {
    assert_error("(-)", "wrong number of arguments. got=0, want=1");
    assert_error("(/)", "wrong number of arguments. got=0, want=1");
    assert_error("(/ 1 0)", "division by zero");
    assert_error("(/ 0)", "division by zero");
    assert_error("(+ 1 t)", "argument to `+` must be INTEGER, got TRUE");
}

#[test]
fn dotted_call_syntax() {
    assert_integer("(+ . (1 . (2 . nil)))", 3);
}

#[test]
fn comparisons() {
    assert_display("(= 1 1)", "T");
    assert_display("(= 1 1 1)", "T");
    assert_display("(= 1 2)", "nil");
    assert_display("(= 1)", "T");
    assert_display("(/= 1 2 3)", "T");
    assert_display("(/= 1 2 1)", "nil");
    assert_display("(< 1 2 3)", "T");
    assert_display("(< 1 3 2)", "nil");
    assert_display("(<= 1 1 2)", "T");
    assert_display("(> 3 2 1)", "T");
    assert_display("(>= 3 3 1)", "T");
    assert_error("(=)", "wrong number of arguments. got=0, want=1");
    assert_error("(< 1 nil)", "argument to `<` must be INTEGER, got NIL");
}

#[test]
fn conditionals() {
    assert_integer("(if (= 1 1) 10 20)", 10);
    assert_integer("(if nil 10 20)", 20);
    assert_display("(if nil 10)", "nil");
    assert_integer("(if t 10)", 10);
    // Zero is truthy; only nil is false.
    assert_integer("(if 0 1 2)", 1);
    assert_integer("(if (lambda (x) x) 1 2)", 1);
}

#[test]
fn setq_binds_and_returns_the_symbol() {
    assert_integer("(setq x 10) (setq y 20) (+ x y)", 30);
    assert_display("(setq x 10)", "x");
    // Bindings are case-insensitive.
    assert_integer("(setq X 5) x", 5);
    // The symbol object applies as the value it wraps.
    assert_integer("((setq f (lambda (x) (* x 2))) 21)", 42);
}

#[test]
fn lambdas_and_closures() {
    assert_integer("((lambda () 5))", 5);
    assert_integer("((lambda (x) x) 5)", 5);
    assert_integer("((lambda (x y) (+ x y)) 5 5)", 10);
    assert_integer("(+ ((lambda () 1)) ((lambda (x y) (+ x y)) 1 2))", 4);
    assert_integer(
        "(setq makeAdder (lambda (n) (lambda (x) (+ x n))))
         (setq addFive (makeAdder 5))
         (addFive 37)",
        42,
    );
    // Captured frames see later mutations of outer bindings.
    assert_integer(
        "(setq n 1)
         (setq get (lambda () n))
         (setq n 2)
         (get)",
        2,
    );
    assert_display("(lambda (x y) (+ x y))", "(lambda (x y) (+ x y))");
}

#[test]
fn call_errors() {
    assert_error("(f 1)", "symbol not found: f");
    assert_error("(1 2 3)", "not a function: INTEGER");
    assert_error("((lambda (x) x) 1 2)", "function expects 1 arguments, but got 2");
    assert_error("((lambda (x) x))", "function expects 1 arguments, but got 0");
    assert_error("(+ . (1 . 2))", "arguments must be a list, got 2");
    assert_error("unbound", "symbol not found: unbound");
}

#[test]
fn errors_abort_the_rest_of_the_program() {
    assert_error("(setq x (/ 1 0)) (setq y 1) y", "division by zero");
    assert_error("(+ 1 (f)) 99", "symbol not found: f");
}

#[test]
fn quote_returns_the_expression_unevaluated() {
    assert_display("'5", "5");
    assert_display("'-5", "-5");
    assert_display("'x", "x");
    assert_display("'(+ 1 2)", "(+ 1 2)");
    assert_display("'(+ . (1 . (2 . nil)))", "(+ 1 2)");
    assert_display("(quote 5)", "5");
    assert_display("(quote (+ 1 2))", "(+ 1 2)");
    assert_display("''x", "(quote x)");
}

#[test]
fn backquote_substitutes_unquoted_expressions() {
    assert_display("`5", "5");
    assert_display("`(+ 1 2)", "(+ 1 2)");
    assert_display("`(+ 1 ,(+ 1 1))", "(+ 1 2)");
    assert_display("`(1 ,(- 10 5) (2 ,(* 2 2)))", "(1 5 (2 4))");
    assert_display("(setq x 3) `(a ,x)", "(a 3)");
    assert_display("`(a ,'(b c))", "(a (b c))");
}

#[test]
fn backquote_projection_is_strict() {
    assert_error(
        "(setq f (lambda (x) x)) `(a ,f)",
        "cannot splice FUNCTION into syntax",
    );
    assert_error("`(a ,nil)", "cannot splice NIL into syntax");
    assert_error(",x", "unquote is only meaningful inside backquote");
}

#[test]
fn backquote_inside_a_closure_is_reusable() {
    assert_display(
        "(setq pairify (lambda (x) `(pair ,x)))
         (pairify 1)
         (pairify 2)",
        "(pair 2)",
    );
}

#[test]
fn apply_builtin() {
    assert_integer("(setq f (lambda (x) (+ x x))) (apply f '(3))", 6);
    assert_integer("(apply + '(1 2 3))", 6);
    assert_integer("(apply (lambda () 7) nil)", 7);
    assert_integer("(apply * '())", 1);
    assert_error("(apply 1 '(2))", "not a function: INTEGER");
    assert_error(
        "(apply + 1)",
        "second argument to `apply` must be a quoted list, got INTEGER",
    );
}

#[test]
fn builtins_can_be_shadowed() {
    assert_error("(setq + 1) (+ 1 2)", "not a function: INTEGER");
}

#[test]
fn bare_special_form_is_an_error() {
    assert_error("lambda", "unknown expression type: lambda");
}

#[test]
fn setq_rejects_non_symbol_names() {
    assert_error("(setq lambda 5)", "lambda is not a symbol");
    assert_error("(setq 1 5)", "1 is not a symbol");
}
