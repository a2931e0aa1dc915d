//! CLI integration tests using assert_cmd.
//!
//! Exercise the binary end to end: output streams, exit codes, bound
//! validation, and the worker-count flag forms.

use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)]
fn primespan() -> Command {
    Command::cargo_bin("primespan").unwrap()
}

// --- Print mode ---

#[test]
fn prints_primes_up_to_thirty() {
    primespan()
        .args(["30", "-p", "-q"])
        .assert()
        .success()
        .stdout("2\n3\n5\n7\n11\n13\n17\n19\n23\n29\n");
}

#[test]
fn prints_single_prime_interval() {
    primespan()
        .args(["97", "97", "-p", "-q"])
        .assert()
        .success()
        .stdout("97\n");
}

#[test]
fn empty_interval_prints_nothing_and_exits_one() {
    primespan()
        .args(["24", "28", "-p", "-q"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn print_mode_emits_no_summary_on_stdout() {
    primespan()
        .args(["10", "-p"])
        .assert()
        .success()
        .stdout("2\n3\n5\n7\n")
        .stderr(predicate::str::contains("Seconds:"));
}

// --- Count mode ---

#[test]
fn count_summary_goes_to_stderr() {
    primespan()
        .arg("100")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("Primes found: 25")
                .and(predicate::str::contains("Seconds:")),
        );
}

#[test]
fn count_accepts_a_floor() {
    primespan()
        .args(["90", "110"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Primes found: 5"));
}

#[test]
fn quiet_suppresses_summary() {
    primespan()
        .args(["100", "-q"])
        .assert()
        .success()
        .stderr(
            predicate::str::contains("Primes found")
                .not()
                .and(predicate::str::contains("Seconds").not()),
        );
}

// --- Sum mode ---

#[test]
fn sum_goes_to_stdout_with_stderr_summary() {
    primespan()
        .args(["2000000", "-s"])
        .assert()
        .success()
        .stdout("142913828922\n")
        .stderr(predicate::str::contains("Sum of primes: 142913828922"));
}

#[test]
fn sum_rejects_limits_past_the_64_bit_bound() {
    primespan()
        .args(["29505444491", "-s"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("sum"));
}

#[test]
fn sum_and_print_conflict() {
    primespan().args(["100", "-s", "-p"]).assert().code(2);
}

// --- Bound parsing and validation ---

#[test]
fn scientific_notation_bounds() {
    primespan()
        .arg("1e+3")
        .assert()
        .success()
        .stderr(predicate::str::contains("Primes found: 168"));
    primespan()
        .args(["1.1e3", "-q"])
        .assert()
        .success();
}

#[test]
fn rejects_garbage_bounds() {
    primespan().arg("abc").assert().code(2);
    primespan().args(["1.5e0"]).assert().code(2);
}

#[test]
fn rejects_inverted_interval() {
    primespan()
        .args(["10", "5"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid interval"));
}

#[test]
fn rejects_zero_floor() {
    primespan().args(["0", "10"]).assert().code(2);
}

#[test]
fn rejects_limit_past_supported_domain() {
    primespan().arg("18446744073709551610").assert().code(2);
}

#[test]
fn rejects_missing_bounds() {
    primespan().assert().code(2);
}

// --- Worker flag forms ---

#[test]
fn maxworkers_accepts_integer_percent_and_auto() {
    for value in ["2", "50%", "auto"] {
        primespan()
            .args(["--maxworkers", value, "1000", "-q"])
            .assert()
            .success();
    }
}

#[test]
fn threads_alias_works() {
    primespan()
        .args(["--threads", "2", "1000", "-q"])
        .assert()
        .success();
}

#[test]
fn rejects_bad_worker_count() {
    primespan()
        .args(["--maxworkers", "fast", "1000"])
        .assert()
        .code(2);
}

// --- Worker-count invariance at the process level ---

#[test]
fn print_stream_matches_across_worker_counts() {
    let one = primespan()
        .args(["--maxworkers", "1", "100000", "-p", "-q"])
        .output()
        .unwrap();
    let four = primespan()
        .args(["--maxworkers", "4", "100000", "-p", "-q"])
        .output()
        .unwrap();
    assert!(one.status.success() && four.status.success());
    assert_eq!(one.stdout, four.stdout);
}
