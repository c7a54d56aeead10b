use sigil::env::Environment;
use sigil::error::ExpandError;
use sigil::value::Value;
use sigil::{eval, parse, preprocess};

fn parse_ok(input: &str) -> sigil::Program {
    let (program, errors) = parse(input);
    assert!(errors.is_empty(), "parse errors in {input:?}: {errors:?}");
    program
}

fn eval_source(input: &str) -> Value {
    let mut program = parse_ok(input);
    let env = Environment::new();
    eval::eval_program(&mut program, &env)
}

#[test]
fn define_macros_extracts_and_removes_definitions() {
    let mut program = parse_ok("(defmacro myMacro (x y) '(+ x y)) 1");
    let env = Environment::new();

    preprocess::define_macros(&mut program, &env);

    assert_eq!(program.expressions.len(), 1);
    assert_eq!(program.expressions[0].borrow().to_string(), "1");

    let bound = env.borrow().get("myMacro").expect("macro not in environment");
    let Value::Macro(definition) = bound else {
        panic!("expected a macro, got {bound}");
    };
    assert_eq!(definition.params, vec!["x", "y"]);
    assert_eq!(definition.body.borrow().to_string(), "(quote (+ x y))");
}

#[test]
fn macro_lookup_is_case_insensitive() {
    let mut program = parse_ok("(DEFMACRO m () '1)");
    let env = Environment::new();
    preprocess::define_macros(&mut program, &env);
    assert!(program.expressions.is_empty());
    assert!(matches!(env.borrow().get("M"), Some(Value::Macro(_))));
}

#[test]
fn expands_macro_without_arguments() {
    let mut program = parse_ok("(defmacro hoge () '1) (hoge)");
    let env = Environment::new();

    preprocess::define_macros(&mut program, &env);
    preprocess::expand_macros(&mut program, &env).unwrap();

    assert_eq!(program.to_string(), "1");
}

#[test]
fn expands_macro_with_arguments() {
    let mut program = parse_ok("(defmacro hoge (x y) `(- ,y ,x)) (hoge (+ 2 2) (- 10 5))");
    let env = Environment::new();

    preprocess::define_macros(&mut program, &env);
    preprocess::expand_macros(&mut program, &env).unwrap();

    assert_eq!(program.to_string(), "(- (- 10 5) (+ 2 2))");
}

#[test]
fn expanded_program_evaluates() {
    assert_eq!(
        eval_source("(defmacro hoge (x y) `(- ,y ,x)) (hoge (+ 2 2) (- 10 5))"),
        Value::Integer(1)
    );
}

#[test]
fn unless_style_macro() {
    assert_eq!(
        eval_source("(defmacro unless (c body) `(if ,c nil ,body)) (unless nil 7)"),
        Value::Integer(7)
    );
    assert_eq!(
        eval_source("(defmacro unless (c body) `(if ,c nil ,body)) (unless t 7)"),
        Value::Nil
    );
}

#[test]
fn arguments_are_not_evaluated_before_expansion() {
    // (boom) would be a runtime error; the macro drops it unevaluated.
    assert_eq!(
        eval_source("(defmacro firstOf (a b) `(quote ,'a)) (setq a 1) (firstOf a (boom))"),
        Value::Quote(sigil::Node::Symbol("a".to_string()).into())
    );
}

#[test]
fn expansion_is_immune_to_later_rebinding() {
    let mut program = parse_ok("(defmacro m () '41) (m)");
    let env = Environment::new();
    preprocess::define_macros(&mut program, &env);
    preprocess::expand_macros(&mut program, &env).unwrap();
    assert_eq!(program.to_string(), "41");

    // The call site is already rewritten; clobbering the binding afterwards
    // changes nothing.
    env.borrow_mut().set("m", Value::Integer(0));
    assert_eq!(eval::eval_program(&mut program, &env), Value::Integer(41));
}

#[test]
fn nested_macro_calls_expand() {
    assert_eq!(
        eval_source("(defmacro inc (x) `(+ 1 ,x)) (* 2 (inc 20))"),
        Value::Integer(42)
    );
}

#[test]
fn macro_must_return_a_quote() {
    let mut program = parse_ok("(defmacro bad () 1) (bad)");
    let env = Environment::new();
    preprocess::define_macros(&mut program, &env);
    assert_eq!(
        preprocess::expand_macros(&mut program, &env),
        Err(ExpandError::NotQuote)
    );
    assert_eq!(
        eval_source("(defmacro bad () 1) (bad)"),
        Value::Error("macros must return AST nodes".to_string())
    );
}

#[test]
fn macro_arity_is_checked_at_expansion() {
    let mut program = parse_ok("(defmacro m (x) `(+ 1 ,x)) (m 1 2)");
    let env = Environment::new();
    preprocess::define_macros(&mut program, &env);
    assert_eq!(
        preprocess::expand_macros(&mut program, &env),
        Err(ExpandError::Arity {
            name: "m".to_string(),
            expected: 1,
            found: 2,
        })
    );
}

#[test]
fn failing_macro_body_aborts_expansion() {
    let mut program = parse_ok("(defmacro m () `(+ 1 ,(boom))) (m)");
    let env = Environment::new();
    preprocess::define_macros(&mut program, &env);
    assert_eq!(
        preprocess::expand_macros(&mut program, &env),
        Err(ExpandError::Failed("symbol not found: boom".to_string()))
    );
}

#[test]
fn malformed_defmacro_is_dropped() {
    let mut program = parse_ok("(defmacro) 1");
    let env = Environment::new();
    preprocess::define_macros(&mut program, &env);
    assert_eq!(program.expressions.len(), 1);
    assert!(env.borrow().get("defmacro").is_none());
}

#[test]
fn macro_definitions_below_top_level_are_not_scanned() {
    let mut program = parse_ok("(if t (defmacro m () '1) nil)");
    let env = Environment::new();
    preprocess::define_macros(&mut program, &env);
    assert_eq!(program.expressions.len(), 1);
    assert!(env.borrow().get("m").is_none());
}
