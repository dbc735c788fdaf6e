//! This module contains the guarded invoker: the [`Guard`] configuration type
//! and the free functions that run a callback under a default guard.

use core::panic::Location;
use core::sync::atomic::AtomicUsize;
use core::sync::atomic::Ordering;

use tracing::debug;

use crate::error::CallbackPanic;
use crate::region;
use crate::unwind;

// -----------------------------------------------------------------------------
// Process-wide configuration

/// The caller-skip used when neither [`Guard::caller_skip`] nor
/// [`set_caller_skip`] says otherwise. Two frames up from the interception
/// point is the call site that entered the guarded region.
///
/// Code ported from Go's `try` package, whose default of 2 names the function
/// that panicked, gets the same attribution here with a skip of 1.
pub const DEFAULT_CALLER_SKIP: usize = 2;

static CALLER_SKIP: AtomicUsize = AtomicUsize::new(DEFAULT_CALLER_SKIP);

/// Sets the process-wide caller-skip, read by every [`Guard`] that has no skip
/// of its own at the moment it intercepts a panic.
///
/// Changing this while other threads are inside guarded calls is allowed, but
/// the locations those calls capture then depend on timing.
pub fn set_caller_skip(skip: usize) {
    CALLER_SKIP.store(skip, Ordering::Relaxed);
}

/// Returns the process-wide caller-skip.
pub fn caller_skip() -> usize {
    CALLER_SKIP.load(Ordering::Relaxed)
}

// -----------------------------------------------------------------------------
// Guard

/// Runs callbacks inside a guarded region, where panics are intercepted and
/// turned into values.
///
/// A `Guard` is plain configuration; it is `Copy` and can be const
/// constructed. The free functions in this crate ([`with_error`], [`or`], and
/// the rest) use [`Guard::new`].
///
/// ```
/// use try_or::Guard;
///
/// // Report the panic site instead of the call site.
/// static GUARD: Guard = Guard::new().caller_skip(1);
///
/// let value = GUARD.or(|| "x".parse::<i32>(), -1);
/// assert_eq!(value, -1);
///
/// let error = GUARD.catch(|| -> i32 { panic!("boom") }).unwrap_err();
/// assert_eq!(error.message(), "boom");
/// ```
///
/// # Callbacks and unwind safety
///
/// The callback is consumed by the call and treated as unwind safe. If it
/// panics while holding a `&mut` to caller state, that state may be left half
/// updated; the guard does not try to detect this.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Guard {
    caller_skip: Option<usize>,
    quiet: bool,
}

impl Default for Guard {
    fn default() -> Guard {
        Guard::new()
    }
}

impl Guard {
    /// Creates a quiet guard that reads the process-wide caller-skip.
    pub const fn new() -> Guard {
        Guard {
            caller_skip: None,
            quiet: true,
        }
    }

    /// Sets how many frames to walk up from the interception point when
    /// attributing a panic to a source location:
    ///
    /// - `0`: the interception point inside this crate.
    /// - `1`: the site of the panic itself.
    /// - `2`: the call site of the guarded call (the default).
    /// - `3` and up: call sites of enclosing guarded calls on the same thread.
    ///
    /// Past the last of these no location is recorded. Wrapper functions
    /// marked `#[track_caller]` do not count as frames.
    ///
    /// Go's `try` package counts runtime frames instead, and its default of 2
    /// lands on the function that panicked. A skip of `1` here gives that
    /// same location; the default of `2` names the guarded call instead.
    ///
    /// Skips `0` and `1` only report a location if the hook saw the panic
    /// that was intercepted. A payload re-raised with `resume_unwind` does
    /// not run the hook, so for those no location is recorded.
    pub const fn caller_skip(mut self, skip: usize) -> Guard {
        self.caller_skip = Some(skip);
        self
    }

    /// Whether panics raised inside this guard's region are kept from the
    /// previously installed panic hook. Guards are quiet unless this is set to
    /// `false`, in which case the usual "thread panicked" report is printed
    /// for every intercepted panic.
    ///
    /// The hook cannot tell which `catch_unwind` will stop a panic, so a
    /// quiet region also silences panics the callback catches itself.
    pub const fn quiet(mut self, quiet: bool) -> Guard {
        self.quiet = quiet;
        self
    }

    /// Runs `f` in a guarded region. A panic is returned as [`CallbackPanic`].
    #[track_caller]
    pub fn catch<F, T>(&self, f: F) -> Result<T, CallbackPanic>
    where
        F: FnOnce() -> T,
    {
        let region = region::enter(Location::caller(), self.quiet);
        match unwind::halt_unwinding(f) {
            Ok(value) => Ok(value),
            Err(payload) => {
                let message = unwind::payload_message(&*payload);
                let skip = self.caller_skip.unwrap_or_else(caller_skip);
                let location = region.locate(skip, &message);
                drop(region);

                let panic = CallbackPanic::new(message, payload, location);
                debug!(
                    panic = panic.message(),
                    location = ?panic.location(),
                    "intercepted callback panic"
                );
                Err(panic)
            }
        }
    }

    /// Runs `callback` in a guarded region and returns its result. Errors the
    /// callback returns pass through untouched; a panic is converted into
    /// `E` from a [`CallbackPanic`].
    ///
    /// The panic payload travels inside the returned error, so a payload
    /// whose destructor panics will do so wherever the caller drops it.
    #[track_caller]
    pub fn with_error<F, T, E>(&self, callback: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<CallbackPanic>,
    {
        match self.catch(callback) {
            Ok(result) => result,
            Err(panic) => Err(E::from(panic)),
        }
    }

    /// Runs `callback` in a guarded region, returning `fallback` if it panics
    /// or returns an error. The panic payload is dropped here, and a panic
    /// from its destructor is contained as well.
    #[track_caller]
    pub fn or<F, T, E>(&self, callback: F, fallback: T) -> T
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.or_else(callback, move || fallback)
    }

    /// Like [`Guard::or`], but only computes the fallback when it is needed.
    /// The fallback runs outside the guarded region.
    #[track_caller]
    pub fn or_else<F, T, E, D>(&self, callback: F, fallback: D) -> T
    where
        F: FnOnce() -> Result<T, E>,
        D: FnOnce() -> T,
    {
        match self.catch(callback) {
            Ok(Ok(value)) => value,
            Ok(Err(_)) => {
                debug!("callback returned an error, using fallback");
                fallback()
            }
            Err(panic) => {
                debug!("callback panicked, using fallback");
                unwind::drop_payload(panic.into_payload());
                fallback()
            }
        }
    }

    /// Like [`Guard::or`], with `T::default()` as the fallback.
    #[track_caller]
    pub fn or_default<F, T, E>(&self, callback: F) -> T
    where
        F: FnOnce() -> Result<T, E>,
        T: Default,
    {
        self.or_else(callback, T::default)
    }
}

// -----------------------------------------------------------------------------
// Propagating api

/// Runs `f`, returning any panic as a [`CallbackPanic`].
///
/// See also: [`Guard::catch`].
#[track_caller]
pub fn catch<F, T>(f: F) -> Result<T, CallbackPanic>
where
    F: FnOnce() -> T,
{
    Guard::new().catch(f)
}

/// Runs a callback that produces no value.
///
/// If the callback panics, the panic is returned as an error converted from
/// [`CallbackPanic`]. If the callback returns an error, that error is returned.
/// Otherwise this returns `Ok(())`.
///
/// ```
/// use std::error::Error;
///
/// let result: Result<(), Box<dyn Error + Send + Sync>> = try_or::with_error(|| {
///     let _: u8 = "300".parse()?;
///     Ok(())
/// });
/// assert!(!try_or::is_callback_panic(&*result.unwrap_err()));
/// ```
#[track_caller]
pub fn with_error<F, E>(callback: F) -> Result<(), E>
where
    F: FnOnce() -> Result<(), E>,
    E: From<CallbackPanic>,
{
    Guard::new().with_error(callback)
}

/// Runs a callback that produces one value.
///
/// If the callback panics, the panic is returned as an error converted from
/// [`CallbackPanic`]. If the callback returns an error, that error is returned.
/// Otherwise this returns the value.
///
/// ```
/// use try_or::CallbackPanic;
///
/// let result = try_or::with_error1(|| Ok::<_, CallbackPanic>(42));
/// assert_eq!(result.unwrap(), 42);
///
/// let result: Result<i32, CallbackPanic> = try_or::with_error1(|| panic!("boom"));
/// assert!(result.unwrap_err().to_string().starts_with("callback panic: boom"));
/// ```
#[track_caller]
pub fn with_error1<F, A, E>(callback: F) -> Result<A, E>
where
    F: FnOnce() -> Result<A, E>,
    E: From<CallbackPanic>,
{
    Guard::new().with_error(callback)
}

/// Runs a callback that produces two values. Behaves like [`with_error1`].
#[track_caller]
pub fn with_error2<F, A, B, E>(callback: F) -> Result<(A, B), E>
where
    F: FnOnce() -> Result<(A, B), E>,
    E: From<CallbackPanic>,
{
    Guard::new().with_error(callback)
}

/// Runs a callback that produces three values. Behaves like [`with_error1`].
#[track_caller]
pub fn with_error3<F, A, B, C, E>(callback: F) -> Result<(A, B, C), E>
where
    F: FnOnce() -> Result<(A, B, C), E>,
    E: From<CallbackPanic>,
{
    Guard::new().with_error(callback)
}

// -----------------------------------------------------------------------------
// Fallback api

/// Runs a callback that produces one value, returning `fallback` if the
/// callback panics or returns an error.
///
/// ```
/// let result = try_or::or(|| Ok::<_, ()>(42), -1);
/// assert_eq!(result, 42);
///
/// let result = try_or::or(|| -> Result<i32, ()> { panic!("panic") }, -1);
/// assert_eq!(result, -1);
/// ```
#[track_caller]
pub fn or<F, A, E>(callback: F, fallback: A) -> A
where
    F: FnOnce() -> Result<A, E>,
{
    Guard::new().or(callback, fallback)
}

/// Runs a callback that produces two values, returning the fallbacks if the
/// callback panics or returns an error.
#[track_caller]
pub fn or2<F, A, B, E>(callback: F, fallback_a: A, fallback_b: B) -> (A, B)
where
    F: FnOnce() -> Result<(A, B), E>,
{
    Guard::new().or(callback, (fallback_a, fallback_b))
}

/// Runs a callback that produces three values, returning the fallbacks if the
/// callback panics or returns an error.
#[track_caller]
pub fn or3<F, A, B, C, E>(callback: F, fallback_a: A, fallback_b: B, fallback_c: C) -> (A, B, C)
where
    F: FnOnce() -> Result<(A, B, C), E>,
{
    Guard::new().or(callback, (fallback_a, fallback_b, fallback_c))
}

/// Runs a callback, computing a fallback if it panics or returns an error.
///
/// See also: [`Guard::or_else`].
#[track_caller]
pub fn or_else<F, T, E, D>(callback: F, fallback: D) -> T
where
    F: FnOnce() -> Result<T, E>,
    D: FnOnce() -> T,
{
    Guard::new().or_else(callback, fallback)
}

/// Runs a callback, returning `T::default()` if it panics or returns an error.
///
/// See also: [`Guard::or_default`].
#[track_caller]
pub fn or_default<F, T, E>(callback: F) -> T
where
    F: FnOnce() -> Result<T, E>,
    T: Default,
{
    Guard::new().or_default(callback)
}
