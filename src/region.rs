//! Guarded regions and the frame ladder used to attribute a panic to a source
//! location.
//!
//! Every guarded call pushes a [`Region`] onto a thread-local stack before the
//! callback runs, and pops it once the callback has returned or unwound. A
//! panic hook, installed once and chained in front of whatever hook was set
//! before it, writes the panic site into the innermost region of the panicking
//! thread.
//!
//! Walking up from the point where the panic is intercepted, the frames that
//! can be attributed are, in order:
//!
//! 0. The interception point itself (the hook, inside this crate).
//! 1. The panic site.
//! 2. The call site that entered the innermost guarded region.
//! 3. The call sites of the enclosing guarded regions, innermost first.
//!
//! The caller-skip setting is an index into this ladder.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::marker::PhantomData;
use core::panic::Location;
use std::panic;
use std::panic::PanicHookInfo;
use std::sync::Once;
use std::thread;
use std::thread_local;

use tracing::trace;

use crate::error::SourceLocation;
use crate::unwind;

// -----------------------------------------------------------------------------
// Region stack

struct Region {
    /// Where the guarded call was made.
    call_site: &'static Location<'static>,
    /// Where the hook observed the panic, if it ran.
    intercepted_at: Option<SourceLocation>,
    /// Where the panic was raised, if the hook ran.
    panic_site: Option<SourceLocation>,
    /// The payload text of the panic the hook saw last.
    panic_message: Option<String>,
    /// Whether panics in this region skip the previously installed hook.
    quiet: bool,
}

thread_local! {
    static REGIONS: RefCell<Vec<Region>> = const { RefCell::new(Vec::new()) };
}

/// Keeps a region on the current thread's stack. Dropping it leaves the region.
pub struct RegionGuard {
    depth: usize,
    // Regions live in thread-local storage.
    _not_send: PhantomData<*const ()>,
}

/// Enters a guarded region on the current thread.
pub fn enter(call_site: &'static Location<'static>, quiet: bool) -> RegionGuard {
    install_hook();

    let depth = REGIONS.with_borrow_mut(|regions| {
        regions.push(Region {
            call_site,
            intercepted_at: None,
            panic_site: None,
            panic_message: None,
            quiet,
        });
        regions.len()
    });

    trace!(depth, "entered guarded region");

    RegionGuard {
        depth,
        _not_send: PhantomData,
    }
}

impl RegionGuard {
    /// Returns the location `skip` frames up the ladder from the interception
    /// point, or `None` if the ladder is shorter than that.
    ///
    /// `message` is the text of the intercepted payload. The frames recorded by
    /// the hook are only used if they were recorded for a panic with that
    /// text; a callback may have caught a panic of its own and then unwound
    /// with `resume_unwind`, which does not run the hook. The hook's record is
    /// consumed either way.
    pub fn locate(&self, skip: usize, message: &str) -> Option<SourceLocation> {
        REGIONS.with_borrow_mut(|regions| {
            let (current, enclosing) = regions.get_mut(..self.depth)?.split_last_mut()?;
            let intercepted_at = current.intercepted_at.take();
            let panic_site = current.panic_site.take();
            let recorded = current.panic_message.take();
            let matches = recorded.as_deref() == Some(message);
            match skip {
                0 => intercepted_at.filter(|_| matches),
                1 => panic_site.filter(|_| matches),
                2 => Some(SourceLocation::from(current.call_site)),
                n => enclosing
                    .iter()
                    .rev()
                    .nth(n - 3)
                    .map(|region| SourceLocation::from(region.call_site)),
            }
        })
    }
}

impl Drop for RegionGuard {
    fn drop(&mut self) {
        // The stack may already be gone if the thread is tearing down.
        let _ = REGIONS.try_with(|regions| {
            if let Ok(mut regions) = regions.try_borrow_mut() {
                regions.truncate(self.depth - 1);
            }
        });
        trace!(depth = self.depth, "left guarded region");
    }
}

// -----------------------------------------------------------------------------
// Panic hook

static INSTALL_HOOK: Once = Once::new();

fn install_hook() {
    // `set_hook` itself panics when called during a panic. The next region
    // entered outside of unwinding installs the hook instead.
    if thread::panicking() {
        return;
    }

    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !record_panic(info) {
                previous(info);
            }
        }));
        trace!("installed guarded region panic hook");
    });
}

/// Records the panic into the innermost region of the current thread. Returns
/// true if the panic should not be reported any further.
fn record_panic(info: &PanicHookInfo<'_>) -> bool {
    let intercepted_at = SourceLocation::from(Location::caller());
    REGIONS
        .try_with(|regions| {
            let Ok(mut regions) = regions.try_borrow_mut() else {
                return false;
            };
            match regions.last_mut() {
                Some(region) => {
                    region.intercepted_at = Some(intercepted_at);
                    region.panic_site = info.location().map(SourceLocation::from);
                    region.panic_message = Some(unwind::payload_message(info.payload()));
                    region.quiet
                }
                None => false,
            }
        })
        .unwrap_or(false)
}
