// Tests for the bounded Fibonacci emitter demo

use proptest::prelude::*;
use stax::interpreter::engine::Interpreter;
use stax::parser::Parser;
use stax::FIB_DEMO;

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

/// The demo's emitter, with the seeds left to the caller. The top seed is
/// printed first.
const EMIT_FN: &str = r#"
fn emit {
    loop {
        dup putu
        ", " dup puts free
        dup 100 < if {
            over + swap
        } else {
            break
        }
    }
    drop drop
}
"#;

fn sequence_program(seed_a: usize, seed_b: usize) -> String {
    format!("{EMIT_FN}\nfn main {{ {seed_a} {seed_b} emit 10 putc }}")
}

/// Host-side model of the emitter: print `b`, stop once the printed value
/// has reached the bound, otherwise step the pair `(a, b)` to `(a+b, a)`.
fn expected_sequence(seed_a: usize, seed_b: usize) -> String {
    let (mut a, mut b) = (seed_a, seed_b);
    let mut out = String::new();
    loop {
        out.push_str(&b.to_string());
        out.push_str(", ");
        if b >= 100 {
            break;
        }
        let sum = a.wrapping_add(b);
        b = a;
        a = sum;
    }
    out.push('\n');
    out
}

#[test]
fn demo_output_is_exact() {
    assert_eq!(run(FIB_DEMO), "1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144, \n");
}

#[test]
fn demo_and_parameterized_emitter_agree_on_the_default_seeds() {
    assert_eq!(run(FIB_DEMO), run(&sequence_program(1, 1)));
}

#[test]
fn seed_already_at_the_bound_prints_only_itself() {
    // The loop body never executes: the first printed value meets the
    // bound and emission stops right after its delimiter.
    assert_eq!(run(&sequence_program(5, 200)), "200, \n");
    assert_eq!(run(&sequence_program(200, 200)), "200, \n");
}

#[test]
fn value_equal_to_the_bound_is_printed_before_stopping() {
    // The bound is inclusive on the printed side: 100 itself appears.
    assert_eq!(run(&sequence_program(0, 100)), "100, \n");
}

#[test]
fn repeated_emission_in_one_program_is_identical() {
    // No state survives a call: the second run is byte-for-byte the first.
    let source = format!("{EMIT_FN}\nfn main {{ 1 1 emit 10 putc 1 1 emit 10 putc }}");
    let output = run(&source);
    let half = output.len() / 2;
    assert_eq!(output[..half], output[half..]);
}

#[test]
fn demo_leaves_no_machine_state_behind() {
    let program = Parser::new(FIB_DEMO)
        .unwrap()
        .parse_program()
        .unwrap();
    let mut interpreter = Interpreter::new(program, Vec::new());
    interpreter.run().unwrap();
    // Every delimiter allocation was freed and both seeds dropped.
    assert!(interpreter.stack().is_empty());
    assert_eq!(interpreter.memory().high_water(), 3); // one ", " span, reused
}

proptest! {
    #[test]
    fn emitter_matches_the_host_model(
        seed_a in 0usize..500,
        seed_b in 0usize..500,
    ) {
        prop_assume!(seed_a > 0 || seed_b > 0);
        prop_assert_eq!(
            run(&sequence_program(seed_a, seed_b)),
            expected_sequence(seed_a, seed_b)
        );
    }

    #[test]
    fn emitter_is_idempotent(seed_a in 0usize..300, seed_b in 0usize..300) {
        prop_assume!(seed_a > 0 || seed_b > 0);
        let source = sequence_program(seed_a, seed_b);
        prop_assert_eq!(run(&source), run(&source));
    }

    #[test]
    fn printed_values_are_non_decreasing_for_ordered_seeds(
        seed_a in 1usize..300,
        seed_b in 0usize..300,
    ) {
        // Ordered pairs: the first-printed seed is the smaller one.
        prop_assume!(seed_a >= seed_b);
        let output = run(&sequence_program(seed_a, seed_b));
        let values: Vec<usize> = output
            .trim_end()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse().unwrap())
            .collect();
        prop_assert!(!values.is_empty());
        for pair in values.windows(2) {
            prop_assert!(pair[0] <= pair[1], "sequence decreased: {:?}", values);
        }
    }

    #[test]
    fn emission_always_ends_at_or_past_the_bound(
        seed_a in 0usize..300,
        seed_b in 0usize..300,
    ) {
        prop_assume!(seed_a > 0 || seed_b > 0);
        let output = run(&sequence_program(seed_a, seed_b));
        prop_assert!(output.ends_with(", \n"));
        let last: usize = output
            .trim_end()
            .trim_end_matches(',')
            .rsplit(", ")
            .next()
            .unwrap()
            .parse()
            .unwrap();
        prop_assert!(last >= 100, "stopped early at {last}: {output}");
    }

    #[test]
    fn string_printer_reports_length_plus_sentinel(
        text in "[a-zA-Z0-9 ]{0,40}",
    ) {
        // puts emits exactly the literal's bytes and counts the sentinel.
        let output = run(&format!("fn main {{ \"{text}\" puts 32 putc putu }}"));
        let expected = format!("{text} {}", text.len() + 1);
        prop_assert_eq!(output, expected);
    }
}
