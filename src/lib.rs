//! Hayloft: the identity and access core of a small multi-tenant review board.
//! Credential storage, username registration, opaque bearer-token sessions and
//! the problem taxonomy every operation reports failure through. The HTTP layer
//! is an external collaborator and calls in through these modules.

pub mod identity;
pub mod problem;
pub mod reviews;

// Test-only printing helper: expands to eprintln! during tests and debug builds
// and is absent otherwise. Usage: tprintln!("debug: {}", value);
#[cfg(any(test, debug_assertions))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ( eprintln!($($arg)*) );
}

// In non-test builds, provide a no-op tprintln! so calls compile without effect.
#[cfg(not(any(test, debug_assertions)))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ({
        // Preserve formatting checks in release without producing code
        if false { let _ = format!($($arg)*); }
    });
}
