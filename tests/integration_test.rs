// Integration tests for the stax interpreter

use stax::interpreter::engine::Interpreter;
use stax::interpreter::errors::RuntimeError;
use stax::parser::Parser;

/// Parse and run a program, returning its output.
fn run(source: &str) -> String {
    let program = Parser::new(source)
        .expect("Parser creation failed")
        .parse_program()
        .expect("Parsing failed");
    let mut interpreter = Interpreter::new(program, Vec::new());
    interpreter.run().expect("Execution failed");
    String::from_utf8(interpreter.into_output()).expect("Output was not UTF-8")
}

/// Parse and run a program that is expected to fail at runtime.
fn run_err(source: &str) -> RuntimeError {
    let program = Parser::new(source)
        .expect("Parser creation failed")
        .parse_program()
        .expect("Parsing failed");
    let mut interpreter = Interpreter::new(program, Vec::new());
    interpreter.run().expect_err("Execution unexpectedly succeeded")
}

#[test]
fn test_arithmetic_words() {
    assert_eq!(run("fn main { 2 3 + putu }"), "5");
    assert_eq!(run("fn main { 9 3 - putu }"), "6");
    assert_eq!(run("fn main { 6 7 * putu }"), "42");
}

#[test]
fn test_comparison_words_push_zero_or_one() {
    assert_eq!(run("fn main { 1 2 < putu 2 1 < putu }"), "10");
    assert_eq!(run("fn main { 2 1 > putu 1 2 > putu }"), "10");
    assert_eq!(run("fn main { 3 3 = putu 3 4 = putu }"), "10");
}

#[test]
fn test_stack_shuffles() {
    assert_eq!(run("fn main { 1 2 dup putu putu putu }"), "221");
    assert_eq!(run("fn main { 1 2 swap putu putu }"), "12");
    assert_eq!(run("fn main { 1 2 over putu putu putu }"), "121");
    assert_eq!(run("fn main { 1 2 3 rot putu putu putu }"), "132");
    assert_eq!(run("fn main { 1 2 drop putu }"), "1");
}

#[test]
fn test_alloc_store_load_free() {
    // Reserve three bytes, write "Hi", print it through puts (which
    // reports three bytes scanned - two characters plus the sentinel),
    // then release the span with that count.
    let source = r#"
        fn main {
            3 alloc
            let a {
                a 72 ->
                a 1 + 105 ->
                a puts putu
                a 3 free
            }
        }
    "#;
    assert_eq!(run(source), "Hi3");
}

#[test]
fn test_load_reads_back_stored_byte() {
    assert_eq!(run("fn main { 1 alloc let a { a 200 -> a <- putu } }"), "200");
}

#[test]
fn test_string_literal_is_sentinel_terminated() {
    // puts consumes the literal's bytes plus the sentinel.
    assert_eq!(run("fn main { \"stax\" puts putu }"), "stax5");
    assert_eq!(run("fn main { \"\" puts putu }"), "1");
}

#[test]
fn test_string_storage_is_reusable_after_free() {
    // Same-length literals round-trip through the same span.
    let source = r#"
        fn main {
            "one" dup puts free
            "two" dup puts free
        }
    "#;
    assert_eq!(run(source), "onetwo");
}

#[test]
fn test_if_else_branches() {
    assert_eq!(run("fn main { 1 if { 8 putu } else { 9 putu } }"), "8");
    assert_eq!(run("fn main { 0 if { 8 putu } else { 9 putu } }"), "9");
    assert_eq!(run("fn main { 0 if { 8 putu } }"), "");
}

#[test]
fn test_while_loop() {
    assert_eq!(
        run("fn main { 5 while { dup 0 > } { dup putu 1 - } drop }"),
        "54321"
    );
    // A condition that is false up front never runs the body.
    assert_eq!(run("fn main { 0 while { dup 0 > } { 7 putu } drop }"), "");
}

#[test]
fn test_loop_with_break_and_continue() {
    let source = r#"
        fn main {
            0
            loop {
                1 +
                dup 5 = if { break }
                dup 2 = if { continue }
                dup putu
            }
            drop
        }
    "#;
    assert_eq!(run(source), "134");
}

#[test]
fn test_let_binds_from_the_top_of_stack() {
    // The first name takes the top word.
    assert_eq!(run("fn main { 7 4 let a b { a putu b putu } }"), "47");
    // Bindings are values, not references: reading twice is fine.
    assert_eq!(run("fn main { 3 let x { x x + putu } }"), "6");
}

#[test]
fn test_nested_lets_shadow_outer_bindings() {
    let source = r#"
        fn main {
            1 let x {
                x putu
                2 let x {
                    x putu
                }
                x putu
            }
        }
    "#;
    assert_eq!(run(source), "121");
}

#[test]
fn test_function_calls_share_the_stack() {
    let source = r#"
        fn double { dup + }
        fn main { 5 double double putu }
    "#;
    assert_eq!(run(source), "20");
}

#[test]
fn test_break_propagates_through_a_call() {
    // A function may break its caller's loop.
    let source = r#"
        fn stop { break }
        fn main {
            0
            loop {
                1 +
                dup putu
                dup 3 = if { stop }
            }
            drop
        }
    "#;
    assert_eq!(run(source), "123");
}

#[test]
fn test_dump_word_writes_machine_state() {
    let output = run("fn main { 1 2 ??? drop drop }");
    assert!(output.contains("values"), "dump output was: {output}");
}

// === ERROR REPORTING ===

#[test]
fn test_unknown_word_is_a_parse_error() {
    let err = Parser::new("fn main { frobnicate }")
        .unwrap()
        .parse_program()
        .unwrap_err();
    assert!(err.message.contains("unknown word 'frobnicate'"), "{err}");
    assert_eq!(err.location.line, 1);
}

#[test]
fn test_unterminated_string_is_a_parse_error() {
    let err = Parser::new("fn main { \"oops }").unwrap_err();
    assert!(err.message.contains("unterminated string"), "{err}");
}

#[test]
fn test_missing_main_is_a_runtime_error() {
    let program = Parser::new("fn helper { 1 putu }")
        .unwrap()
        .parse_program()
        .unwrap();
    let mut interpreter = Interpreter::new(program, Vec::new());
    assert!(matches!(
        interpreter.run(),
        Err(RuntimeError::NoMainFunction)
    ));
}

#[test]
fn test_stack_underflow_is_reported_with_the_word() {
    match run_err("fn main { + }") {
        RuntimeError::StackUnderflow { word, .. } => assert_eq!(word, "+"),
        other => panic!("expected stack underflow, got {other:?}"),
    }
}

#[test]
fn test_double_free_is_reported() {
    match run_err("fn main { \"x\" dup 2 free 2 free }") {
        RuntimeError::InvalidFree { message } => {
            assert!(message.contains("double free"), "{message}");
        }
        other => panic!("expected invalid free, got {other:?}"),
    }
}

#[test]
fn test_out_of_memory_is_reported() {
    match run_err("fn main { 100000 alloc drop }") {
        RuntimeError::OutOfMemory { message } => {
            assert!(message.contains("out of memory"), "{message}");
        }
        other => panic!("expected out of memory, got {other:?}"),
    }
}

#[test]
fn test_load_of_unreserved_address_is_reported() {
    match run_err("fn main { 40000 <- putu }") {
        RuntimeError::InvalidAddress { word, .. } => assert_eq!(word, "<-"),
        other => panic!("expected invalid address, got {other:?}"),
    }
}

#[test]
fn test_putc_of_invalid_scalar_is_reported() {
    match run_err("fn main { 55296 putc }") {
        RuntimeError::InvalidCharCode { value } => assert_eq!(value, 55296),
        other => panic!("expected invalid char code, got {other:?}"),
    }
}

#[test]
fn test_scan_without_a_sentinel_is_cut_off() {
    // Fill a span with nonzero bytes past the scan limit; puts reports
    // the missing terminator instead of scanning forever.
    let source = r#"
        fn main {
            20000 alloc
            let a {
                0
                while { dup 20000 < } {
                    dup a + 1 ->
                    1 +
                }
                drop
                a puts putu
            }
        }
    "#;
    match run_err(source) {
        RuntimeError::UnterminatedString { address, .. } => assert_eq!(address, 0),
        other => panic!("expected unterminated string, got {other:?}"),
    }
}

#[test]
fn test_call_depth_limit_cuts_off_deep_chains() {
    // Recursion is unexpressible (calls resolve against earlier
    // definitions only), so build a deep chain of wrappers instead.
    let mut source = String::from("fn f0 { 1 putu }\n");
    for i in 1..=300 {
        source.push_str(&format!("fn f{} {{ f{} }}\n", i, i - 1));
    }
    source.push_str("fn main { f300 }");
    match run_err(&source) {
        RuntimeError::CallDepthExceeded { .. } => {}
        other => panic!("expected call depth error, got {other:?}"),
    }
}
