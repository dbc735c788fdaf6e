//! Run callbacks under a panic guard.
//!
//! This crate converts panics raised inside a callback into ordinary values.
//! There are two ways to call it:
//!
//! - **Propagating**: [`with_error`] and its siblings return the callback's own
//!   `Result`. Errors the callback returns pass through untouched, and a panic
//!   comes back as an error converted from [`CallbackPanic`].
//! - **Falling back**: [`or`] and its siblings return plain values. If the
//!   callback panics or returns an error, the fallback you supplied is returned
//!   instead.
//!
//! ```
//! use std::error::Error;
//!
//! // A callback with a value and an error.
//! let result: Result<i32, Box<dyn Error + Send + Sync>> = try_or::with_error1(|| {
//!     // Your callback logic here.
//!     Ok(42)
//! });
//! assert_eq!(result.unwrap(), 42);
//!
//! // A callback that panics.
//! let result: Result<i32, Box<dyn Error + Send + Sync>> = try_or::with_error1(|| {
//!     panic!("boom");
//! });
//! let error = result.unwrap_err();
//! assert!(try_or::is_callback_panic(&*error));
//! assert!(error.to_string().starts_with("callback panic: boom"));
//!
//! // A callback with a fallback.
//! let value = try_or::or(|| -> Result<i32, ()> { panic!("panic") }, -1);
//! assert_eq!(value, -1);
//! ```
//!
//! The callbacks producing two or three values take tuples: see
//! [`with_error2`], [`with_error3`], [`or2`] and [`or3`].
//!
//! # Locations
//!
//! A [`CallbackPanic`] records a [`SourceLocation`], by default the call site of
//! the guarded call. Which frame is recorded is configurable per [`Guard`], or
//! for the whole process through [`set_caller_skip`].
//!
//! Panic sites are attributed by a panic hook this crate installs the first time
//! a guarded call is made. Panics inside a guarded call are not reported on
//! stderr; every other panic is forwarded to the hook that was installed
//! before. A guard built with [`quiet(false)`](Guard::quiet) forwards its
//! panics too. Replacing the panic hook afterwards disables panic site
//! attribution, but not the interception itself.

#![no_std]

// -----------------------------------------------------------------------------
// Boilerplate for building without the standard library

extern crate alloc;
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod guard;
mod region;
mod unwind;

#[cfg(doctest)]
mod compile_fail;

// -----------------------------------------------------------------------------
// Top-level exports

pub use error::CallbackPanic;
pub use error::SourceLocation;
pub use error::is_callback_panic;
pub use guard::DEFAULT_CALLER_SKIP;
pub use guard::Guard;
pub use guard::caller_skip;
pub use guard::catch;
pub use guard::or;
pub use guard::or_default;
pub use guard::or_else;
pub use guard::or2;
pub use guard::or3;
pub use guard::set_caller_skip;
pub use guard::with_error;
pub use guard::with_error1;
pub use guard::with_error2;
pub use guard::with_error3;
