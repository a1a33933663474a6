use std::sync::Arc;

use crate::base::mem::HasMemory;
use crate::cpu::execute::{Cpu, RunOutcome};
use crate::mem::block::Word;
use crate::mem::store::BlockStore;
use crate::mem::ucm::Ucm;
use crate::programs::{self, SampleProgram};
use crate::sim::log::Logger;

fn run(sample: &SampleProgram, max_steps: u64) -> (RunOutcome, BlockStore) {
    let mut store = BlockStore::new(sample.min_words);
    let mut cpu = Cpu::new(&Arc::new(Logger::silent()), false);
    let outcome = {
        let mut ucm = Ucm::with_reference_config(&mut store);
        cpu.run(&mut ucm, &sample.program, max_steps).unwrap()
    };
    (outcome, store)
}

fn output(sample: &SampleProgram, store: &BlockStore, label: &str) -> Vec<Word> {
    sample
        .output(label)
        .unwrap()
        .map(|addr| store.read_word(addr).unwrap())
        .collect()
}

fn run_to_halt(sample: &SampleProgram) -> BlockStore {
    let (outcome, store) = run(sample, 1_000_000);
    assert!(matches!(outcome, RunOutcome::Halted { .. }), "{}: {:?}", sample.name, outcome);
    store
}

#[test]
fn mult_multiplies() {
    for (a, b) in [(7, 6), (10, 10), (-3, 4), (5, 0)] {
        let sample = programs::mult(a, b);
        let store = run_to_halt(&sample);
        assert_eq!(output(&sample, &store, "product"), vec![a * b], "{} * {}", a, b);
    }
}

#[test]
fn fibonacci_sequence() {
    for (n, expected) in [(0, 0), (1, 1), (2, 1), (10, 55), (20, 6765)] {
        let sample = programs::fibonacci(n);
        let store = run_to_halt(&sample);
        assert_eq!(output(&sample, &store, "fib"), vec![expected], "F({})", n);
    }
}

#[test]
fn factorial_values() {
    for (n, expected) in [(0, 1), (1, 1), (5, 120), (10, 3_628_800)] {
        let sample = programs::factorial(n);
        let store = run_to_halt(&sample);
        assert_eq!(output(&sample, &store, "factorial"), vec![expected], "{}!", n);
    }
}

#[test]
fn div_quotient_and_remainder() {
    let sample = programs::div(17, 5);
    let store = run_to_halt(&sample);
    assert_eq!(output(&sample, &store, "quotient"), vec![3]);
    assert_eq!(output(&sample, &store, "remainder"), vec![2]);
    assert_eq!(output(&sample, &store, "native_quotient"), vec![3]);
}

#[test]
fn div_by_zero_never_halts() {
    let sample = programs::div(4, 0);
    let (outcome, _) = run(&sample, 500);
    assert_eq!(outcome, RunOutcome::TimedOut { steps: 500 });
}

#[test]
fn sum_matrix_adds_elementwise() {
    let sample = programs::sum_matrix(3, 42);
    let store = run_to_halt(&sample);
    let a = output(&sample, &store, "a");
    let b = output(&sample, &store, "b");
    let c = output(&sample, &store, "c");
    assert_eq!(c.len(), 9);
    assert!(a.iter().chain(&b).all(|&x| (0..100).contains(&x)));
    let expected: Vec<Word> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
    assert_eq!(c, expected);
}

#[test]
fn mat_mul_multiplies() {
    let size = 3;
    let sample = programs::mat_mul(size, 9);
    let store = run_to_halt(&sample);
    let a = output(&sample, &store, "a");
    let b = output(&sample, &store, "b");
    let c = output(&sample, &store, "c");
    for row in 0..size {
        for col in 0..size {
            let expected: Word = (0..size).map(|k| a[row * size + k] * b[k * size + col]).sum();
            assert_eq!(c[row * size + col], expected, "c[{}][{}]", row, col);
        }
    }
}

#[test]
fn same_seed_same_program() {
    assert_eq!(programs::sum_matrix(2, 5).program, programs::sum_matrix(2, 5).program);
    assert_eq!(programs::mat_mul(2, 5).program, programs::mat_mul(2, 5).program);
}

#[test]
fn by_name_checks_arguments() {
    let sample = programs::by_name("factorial", &[4], 0, 64).unwrap();
    assert_eq!(sample.name, "factorial");

    assert!(programs::by_name("mult", &[3], 0, 64).is_err());
    assert!(programs::by_name("sum_matrix", &[0], 0, 64).is_err());
    let err = programs::by_name("quicksort", &[], 0, 64).unwrap_err();
    assert!(err.to_string().contains("unknown program 'quicksort'"));

    for name in programs::NAMES {
        assert!(programs::by_name(name, &[2, 1], 1, 64).is_ok(), "{}", name);
    }
}

#[test]
fn oversized_matrix_is_rejected_before_generation() {
    let err = programs::by_name("mat_mul", &[1000], 0, 100).unwrap_err();
    assert!(err.to_string().contains("needs 3000001 words"), "{}", err);
    let err = programs::by_name("mat_mul", &[100_000], 0, usize::MAX).unwrap_err();
    assert!(err.to_string().contains("overflows the address space"), "{}", err);

    let err = programs::by_name("sum_matrix", &[5], 0, 74).unwrap_err();
    assert!(err.to_string().contains("needs 75 words"), "{}", err);
    assert!(programs::by_name("sum_matrix", &[5], 0, 75).is_ok());

    let err = programs::by_name("sum_matrix", &[Word::MAX], 0, usize::MAX).unwrap_err();
    assert!(err.to_string().contains("overflows the address space"), "{}", err);
}

#[test]
fn programs_end_with_halt() {
    for name in programs::NAMES {
        let sample = programs::by_name(name, &[3, 2], 1, 64).unwrap();
        let last = sample.program.insts().last().unwrap();
        assert!(last.opcode == crate::cpu::isa::Opcode::Halt, "{}", name);
        for (label, range) in &sample.outputs {
            assert!(range.end <= sample.min_words, "{} output {} past min_words", name, label);
        }
    }
}
