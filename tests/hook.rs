//! Tests for the interaction with previously installed panic hooks. This is
//! its own binary so that the counting hook is installed before any guarded
//! call is made.

use std::panic;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use try_or::Guard;
use try_or::SourceLocation;

static REPORTED: AtomicUsize = AtomicUsize::new(0);

#[test]
fn previous_hook_is_chained() {
    panic::set_hook(Box::new(|_| {
        REPORTED.fetch_add(1, Ordering::SeqCst);
    }));

    // Intercepted panics are kept from the previous hook by default.
    let value = try_or::or(|| -> Result<i32, ()> { panic!("quiet") }, 1);
    assert_eq!(value, 1);
    let error = try_or::catch(|| -> i32 { panic!("quiet") });
    assert!(error.is_err());
    assert_eq!(REPORTED.load(Ordering::SeqCst), 0);

    // Guards that are not quiet forward them.
    let value = Guard::new()
        .quiet(false)
        .or(|| -> Result<i32, ()> { panic!("loud") }, 2);
    assert_eq!(value, 2);
    assert_eq!(REPORTED.load(Ordering::SeqCst), 1);

    // Panics outside any guarded region are always forwarded.
    let outside = panic::catch_unwind(|| -> i32 { panic!("unguarded") });
    assert!(outside.is_err());
    assert_eq!(REPORTED.load(Ordering::SeqCst), 2);

    // The panic site is attributed whether or not the guard is quiet.
    for guard in [Guard::new(), Guard::new().quiet(false)] {
        let line = line!() + 1;
        let error = guard.caller_skip(1).catch(|| -> i32 { panic!("site") });
        assert_eq!(error.unwrap_err().location().map(SourceLocation::line), Some(line));
    }
    assert_eq!(REPORTED.load(Ordering::SeqCst), 3);
}
