//! Maps domain crate errors to roam_core::AppError for consistent user-facing messages.
//! Each source crate has its own module to keep mappings small and readable.

use roam_core::AppError;

mod landmarks;
mod places;
mod weather;

/// Conversion of a domain error into the application error hierarchy.
pub trait IntoAppError {
    fn into_app_error(self) -> AppError;
}
