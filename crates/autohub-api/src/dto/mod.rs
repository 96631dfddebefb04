//! Data transfer objects for API requests and responses.

pub mod request;
pub mod response;

use validator::Validate;

use autohub_core::error::AppError;

use crate::error::ApiError;

/// Run the request's validation rules, turning failures into a 400.
pub fn validated<T: Validate>(request: T) -> Result<T, ApiError> {
    match request.validate() {
        Ok(()) => Ok(request),
        Err(errors) => {
            let details = serde_json::to_value(&errors).unwrap_or(serde_json::Value::Null);
            Err(ApiError::from(AppError::validation("Request validation failed")).with_details(details))
        }
    }
}
