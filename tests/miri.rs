//! Tests specifically for miri

#![cfg(miri)]

use std::error::Error;

use try_or::CallbackPanic;
use try_or::Guard;

static GUARD: Guard = Guard::new();

#[test]
fn panic_round_trip() {
    let result: Result<String, Box<dyn Error + Send + Sync>> =
        GUARD.with_error(|| panic!("boom {}", 1));
    let error = result.unwrap_err();
    assert!(try_or::is_callback_panic(&*error));
    assert!(error.to_string().starts_with("callback panic: boom 1"));
}

#[test]
fn payload_survives() {
    let error: CallbackPanic = GUARD
        .catch(|| -> u8 { panic!("{}", String::from("owned")) })
        .unwrap_err();
    let payload = error.into_payload();
    assert_eq!(payload.downcast_ref::<String>().map(String::as_str), Some("owned"));
}

#[test]
fn nested_regions() {
    let value = GUARD.or(
        || {
            let inner = GUARD.or(|| -> Result<Vec<u8>, ()> { panic!("inner") }, vec![1]);
            Ok::<_, ()>(inner)
        },
        vec![2],
    );
    assert_eq!(value, [1u8]);
}
