/// Request extractors whose rejections use the API error body
///
/// Axum's own `Json`, `Path` and `Query` reject with plain-text responses.
/// These wrappers extract the same way and convert the rejection into
/// [`ApiError`], so every failure a client sees is `{error, message, details?}`.
///
/// # Example
///
/// ```
/// use recipe_api::extract::{AppJson, AppPath};
///
/// #[derive(serde::Deserialize)]
/// struct Rename {
///     name: String,
/// }
///
/// async fn rename(AppPath(id): AppPath<i64>, AppJson(req): AppJson<Rename>) -> String {
///     format!("{} -> {}", id, req.name)
/// }
/// ```

use crate::error::ApiError;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// URL path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

/// Query string parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::IntoResponse,
    };
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Rename {
        name: String,
    }

    #[derive(Debug, Deserialize)]
    struct Flags {
        assigned_only: Option<String>,
    }

    fn json_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("PATCH")
            .uri("/v1/tags/1")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_passes_through() {
        let AppJson(req) = AppJson::<Rename>::from_request(json_request(r#"{"name":"Vegan"}"#), &())
            .await
            .unwrap();
        assert_eq!(req.name, "Vegan");
    }

    #[tokio::test]
    async fn test_json_wrong_shape_is_validation_error() {
        let err = AppJson::<Rename>::from_request(json_request(r#"{"name":5}"#), &())
            .await
            .unwrap_err();

        match err {
            ApiError::ValidationError(details) => assert_eq!(details[0].field, "body"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_json_syntax_error_is_bad_request() {
        let err = AppJson::<Rename>::from_request(json_request("{"), &())
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_query_key_is_bad_request() {
        let (mut parts, _) = Request::builder()
            .uri("/v1/tags?assigned_only=1&assigned_only=1")
            .body(())
            .unwrap()
            .into_parts();

        let err = AppQuery::<Flags>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let (mut parts, _) = Request::builder()
            .uri("/v1/tags?assigned_only=1")
            .body(())
            .unwrap()
            .into_parts();
        let AppQuery(flags) = AppQuery::<Flags>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(flags.assigned_only.as_deref(), Some("1"));
    }
}
