use serde::Serialize;

use crate::models::pagination::PaginationMeta;

// Success envelope: { success: true, data, message? }
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

// Body of delete responses: `data` is an empty object
pub type EmptyData = serde_json::Map<String, serde_json::Value>;

impl ApiResponse<EmptyData> {
    pub fn empty() -> Self {
        Self::success(EmptyData::new())
    }
}

// Paginated list envelope
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, pagination: PaginationMeta) -> Self {
        Self {
            success: true,
            data,
            pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelopes() {
        let json = serde_json::to_value(ApiResponse::success(1)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": 1}));

        let json = serde_json::to_value(ApiResponse::empty()).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": {}}));

        let json = serde_json::to_value(ApiResponse::success_with_message("x", "Saved")).unwrap();
        assert_eq!(json["message"], "Saved");
    }
}
