pub mod auth_service;
pub mod cart_service;
pub mod order_service;
pub mod restaurant_service;
pub mod review_service;

use crate::error::AppResult;

/// Degrades a failed read to an empty value, logging the failure.
pub fn or_empty<T: Default>(result: AppResult<T>, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, what, "read failed; showing empty result");
            T::default()
        }
    }
}
