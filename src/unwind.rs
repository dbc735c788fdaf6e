//! Unwinding recovery utilities taken from rayon.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::string::ToString;
use core::any::Any;
use core::mem;
use core::panic::AssertUnwindSafe;
use std::panic::catch_unwind;
use std::panic::resume_unwind;
use std::thread::Result;

/// Executes `f` and captures any panic, translating that panic into a
/// `Err` result. The callback is consumed by the call and nothing it closed
/// over is observed by this crate afterwards, hence `f` can be treated as
/// exception safe.
#[inline(always)]
pub fn halt_unwinding<F, R>(func: F) -> Result<R>
where
    F: FnOnce() -> R,
{
    catch_unwind(AssertUnwindSafe(func))
}

/// Drops a panic payload without letting a panic from its destructor escape.
/// If the destructor panics, the payload of that second panic is leaked.
#[cold]
pub fn drop_payload(payload: Box<dyn Any + Send>) {
    if let Err(nested) = halt_unwinding(move || drop(payload)) {
        mem::forget(nested);
    }
}

#[cold]
pub fn resume_unwinding(payload: Box<dyn Any + Send>) -> ! {
    resume_unwind(payload)
}

/// Renders a panic payload the same way the default panic hook does: string
/// payloads verbatim, anything else as an opaque box.
pub fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}
