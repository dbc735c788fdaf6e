//! Contains a set of compile failure doctests.

// -----------------------------------------------------------------------------
// Ensures a propagating call needs an error type that can hold a panic.

/** ```compile_fail,E0277

use std::io;

let result = try_or::with_error1(|| Err::<i32, io::Error>(io::Error::other("nope"))); //~ ERROR

``` */
mod error_without_panic_conversion {}

/** ```compile_fail,E0277

let result: Result<(), String> = try_or::with_error(|| Ok(())); //~ ERROR

``` */
mod string_error {}

// -----------------------------------------------------------------------------
// Ensures fallbacks have the same shape as the callback's outputs.

/** ```compile_fail,E0308

let value = try_or::or(|| Ok::<i32, ()>(1), "fallback"); //~ ERROR

``` */
mod mismatched_fallback {}

/** ```compile_fail,E0308

let (a, b) = try_or::or2(|| Ok::<(i32, i32), ()>((1, 2)), 1, "two"); //~ ERROR

``` */
mod mismatched_second_fallback {}

/** ```compile_fail,E0308

let value = try_or::or(|| Ok::<(i32, i32), ()>((1, 2)), 3); //~ ERROR

``` */
mod tuple_with_single_fallback {}

// -----------------------------------------------------------------------------
// Ensures callbacks are only run once.

/** ```compile_fail,E0382

let name = String::from("guarded");
let callback = move || Ok::<String, ()>(name);

let a = try_or::or(callback, String::new());
let b = try_or::or(callback, String::new()); //~ ERROR

``` */
mod callback_moved {}
