//! Profiling hooks via Tracy.
//!
//! Rebuild hot paths (mesh fills, table growth, duplication) are wrapped in
//! scopes so frame captures show where geometry time goes. Enable with the
//! `profiling` Cargo feature:
//!
//! ```toml
//! [dependencies]
//! redlilium-geometry = { version = "0.1", features = ["profiling"] }
//! ```
//!
//! Without the feature every macro expands to nothing.

#[cfg(feature = "profiling")]
pub use tracy_client::{self, Client, plot as tracy_plot, span};

/// Create a profiling span for the current scope.
///
/// ```ignore
/// fn fill(&self) {
///     profile_scope!("fill_positions");
///     // ...
/// }
/// ```
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_span = $crate::profiling::span!($name);
    };
}

/// Create a profiling span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope {
    ($name:expr) => {};
}

/// Create a profiling span named after the enclosing function.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_function {
    () => {
        let _profile_span = $crate::profiling::span!();
    };
}

/// Create a function span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_function {
    () => {};
}

/// Plot a value over time, e.g. the cached quad count.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        $crate::profiling::tracy_plot!($name, $value as f64)
    };
}

/// Plot a value (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        let _ = $value;
    };
}

pub use profile_function;
pub use profile_plot;
pub use profile_scope;
