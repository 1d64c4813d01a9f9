use serde::{Deserialize, Serialize};

/// Pagination block attached to list responses.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Meta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

/// Uniform response wrapper: `{success, message, data}` plus `meta` for lists.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self { success: true, message: message.into(), meta: None, data: Some(data) }
    }

    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), meta: None, data: None }
    }

    pub fn paginated(message: impl Into<String>, data: T, meta: Meta) -> Self {
        Self { success: true, message: message.into(), meta: Some(meta), data: Some(data) }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), meta: None, data: None }
    }
}
