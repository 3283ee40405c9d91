use serde::Serialize;

/// Standardized API response wrapper for all outgoing JSON responses.
///
/// Every endpoint answers with the same structure:
/// ```json
/// {
///   "success": true,
///   "data": { ... },
///   "message": "Some message"
/// }
/// ```
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Constructs a success response with the given data and message.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    /// Constructs an error response with a message and default `data`.
    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }

    /// Constructs an error response that still carries a payload, for
    /// rejections where the caller needs numbers (e.g. distance and radius
    /// on an out-of-range check-in).
    pub fn error_with_data(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data,
            message: message.into(),
        }
    }
}
