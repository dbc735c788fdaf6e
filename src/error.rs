//! The error produced when a guarded callback panics.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::string::ToString;
use core::any::Any;
use core::error::Error;
use core::fmt;
use core::panic::Location;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::unwind;

// -----------------------------------------------------------------------------
// Source locations

/// A file and line attributed to an intercepted panic.
///
/// Which frame this points at is controlled by the caller-skip setting; see
/// [`Guard::caller_skip`](crate::Guard::caller_skip).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    file: String,
    line: u32,
    column: u32,
}

impl SourceLocation {
    /// The path of the source file, as reported by the compiler.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The 1-based line number.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The 1-based column number.
    pub fn column(&self) -> u32 {
        self.column
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        SourceLocation {
            file: location.file().to_string(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Renders the optional location suffix of a [`CallbackPanic`] message.
struct Suffix<'a>(Option<&'a SourceLocation>);

impl fmt::Display for Suffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(location) => write!(f, ", file:{} line: {}", location.file, location.line),
            None => Ok(()),
        }
    }
}

// -----------------------------------------------------------------------------
// Callback panic

/// The error returned in place of a panic that escaped a guarded callback.
///
/// The type itself is the marker: an error "is a callback panic" exactly when
/// it, or something in its [`source`](Error::source) chain, is a
/// `CallbackPanic`. Use [`is_callback_panic`] to check, not the message text.
///
/// The original panic payload is kept, and can be recovered with
/// [`into_payload`](CallbackPanic::into_payload) or re-raised with
/// [`resume`](CallbackPanic::resume).
#[derive(thiserror::Error)]
#[error("callback panic: {message}{}", Suffix(.location.as_ref()))]
pub struct CallbackPanic {
    message: String,
    location: Option<SourceLocation>,
    // Payloads are only `Send`; the mutex makes the error `Sync` so it can be
    // boxed into `dyn Error + Send + Sync`.
    payload: Mutex<Box<dyn Any + Send>>,
}

impl CallbackPanic {
    pub(crate) fn new(
        message: String,
        payload: Box<dyn Any + Send>,
        location: Option<SourceLocation>,
    ) -> Self {
        CallbackPanic {
            message,
            location,
            payload: Mutex::new(payload),
        }
    }

    /// The textual form of the panic payload. String payloads are returned
    /// verbatim; other payload types render as `Box<dyn Any>`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the panic was attributed to, if a location could be captured.
    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    /// Takes back the original panic payload.
    pub fn into_payload(self) -> Box<dyn Any + Send> {
        self.payload
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-raises the original panic, payload and all.
    ///
    /// The panic hook is not run a second time.
    pub fn resume(self) -> ! {
        unwind::resume_unwinding(self.into_payload())
    }
}

impl fmt::Debug for CallbackPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackPanic")
            .field("message", &self.message)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Returns true if `error` is a [`CallbackPanic`], or wraps one anywhere in its
/// source chain.
///
/// ```
/// use std::error::Error;
///
/// let result: Result<(), Box<dyn Error + Send + Sync>> =
///     try_or::with_error(|| panic!("boom"));
///
/// let error = result.unwrap_err();
/// assert!(try_or::is_callback_panic(&*error));
/// ```
pub fn is_callback_panic(error: &(dyn Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(error) = current {
        if error.is::<CallbackPanic>() {
            return true;
        }
        current = error.source();
    }
    false
}
