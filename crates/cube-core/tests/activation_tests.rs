// Audio activation gate: shared in-flight attempts and retry after failure.

use cube_core::{ActivationError, AudioGate};
use futures_util::future::{join, FutureExt};
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn concurrent_callers_share_one_attempt() {
    let calls = Rc::new(Cell::new(0u32));
    let counter = calls.clone();
    let mut gate = AudioGate::new(move || {
        counter.set(counter.get() + 1);
        async { Ok(()) }.boxed_local()
    });

    let a = gate.ensure_started();
    let b = gate.ensure_started();
    let (ra, rb) = pollster::block_on(join(a, b));
    assert_eq!(ra, Ok(()));
    assert_eq!(rb, Ok(()));
    assert_eq!(calls.get(), 1);
    assert!(gate.is_started());

    // Later callers reuse the finished attempt.
    assert_eq!(pollster::block_on(gate.ensure_started()), Ok(()));
    assert_eq!(gate.attempts(), 1);
}

#[test]
fn failed_start_is_retried_by_the_next_caller() {
    let calls = Rc::new(Cell::new(0u32));
    let counter = calls.clone();
    let mut gate = AudioGate::new(move || {
        let n = counter.get() + 1;
        counter.set(n);
        async move {
            if n == 1 {
                Err(ActivationError::Refused("no user gesture".into()))
            } else {
                Ok(())
            }
        }
        .boxed_local()
    });

    let first = pollster::block_on(gate.ensure_started());
    assert!(matches!(first, Err(ActivationError::Refused(_))));
    assert!(!gate.is_started());

    let second = pollster::block_on(gate.ensure_started());
    assert_eq!(second, Ok(()));
    assert_eq!(calls.get(), 2);
    assert_eq!(gate.attempts(), 2);
    assert!(gate.is_started());
}

#[test]
fn unpolled_attempt_is_still_shared() {
    let mut gate = AudioGate::new(|| async { Ok(()) }.boxed_local());
    let first = gate.ensure_started();
    let _second = gate.ensure_started();
    assert_eq!(gate.attempts(), 1);
    assert!(!gate.is_started());
    assert_eq!(pollster::block_on(first), Ok(()));
    assert!(gate.is_started());
}
