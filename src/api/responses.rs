//! Shared API response types
//!
//! Every endpoint answers with the same envelope: `success`, optional
//! `data`, optional `message`, optional `pagination`.

use serde::Serialize;

use crate::services::MAX_PAGE_SIZE;

/// Uniform response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    pub fn ok_paginated(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: Some(pagination),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
        }
    }
}

/// Pagination metadata attached to list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl Pagination {
    /// `total_pages` is the ceiling of items over limit; an empty set has
    /// zero pages. The limit is clamped to the window the listing actually
    /// serves, so the metadata always describes the response.
    pub fn new(page: i64, limit: i64, total_items: i64) -> Self {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        Self {
            page: page.max(1),
            limit,
            total_items,
            total_pages: (total_items + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_is_ceiling() {
        assert_eq!(Pagination::new(1, 20, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 20, 1).total_pages, 1);
        assert_eq!(Pagination::new(1, 20, 20).total_pages, 1);
        assert_eq!(Pagination::new(1, 20, 21).total_pages, 2);
        assert_eq!(Pagination::new(3, 2, 5).total_pages, 3);
    }

    #[test]
    fn test_over_cap_limit_reports_served_window() {
        let pagination = Pagination::new(1, 200, 120);
        assert_eq!(pagination.limit, MAX_PAGE_SIZE);
        assert_eq!(pagination.total_pages, 2);
    }

    #[test]
    fn test_envelope_omits_empty_fields() {
        let json = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("message").is_none());
        assert!(json.get("pagination").is_none());

        let json = serde_json::to_value(ApiResponse::<()>::message("done")).unwrap();
        assert_eq!(json["message"], "done");
        assert!(json.get("data").is_none());
    }
}
