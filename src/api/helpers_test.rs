#[cfg(test)]
mod tests {
    use crate::api::helpers::*;
    use crate::errors::ApiError;
    use poem::http::StatusCode;
    use poem::{IntoResponse, Request};
    use serde_json::Value;
    use std::collections::HashMap;

    #[test]
    fn test_extract_ip_from_x_forwarded_for() {
        let req = Request::builder()
            .header("X-Forwarded-For", "192.168.1.1, 10.0.0.1")
            .finish();

        let ip = extract_ip_address(&req);
        assert_eq!(ip, Some("192.168.1.1".to_string()));
    }

    #[test]
    fn test_extract_ip_from_x_real_ip() {
        let req = Request::builder()
            .header("X-Real-IP", "192.168.1.2")
            .finish();

        let ip = extract_ip_address(&req);
        assert_eq!(ip, Some("192.168.1.2".to_string()));
    }

    #[test]
    fn test_extract_ip_fallback_to_remote_addr() {
        // When no headers are present, remote_addr returns None in test
        let req = Request::builder().finish();

        let ip = extract_ip_address(&req);
        assert_eq!(ip, None);
    }

    #[test]
    fn test_query_params() {
        let req = Request::builder().uri_str("/core/products?pageNum=2&name=a%20b").finish();

        let query = query_params(&req);
        assert_eq!(query.get("pageNum").map(String::as_str), Some("2"));
        assert_eq!(query.get("name").map(String::as_str), Some("a b"));
    }

    #[test]
    fn test_page_param_defaults_and_clamps() {
        let mut query = HashMap::new();
        assert_eq!(page_param(&query, "pageNum", 1).unwrap(), 1);

        query.insert("pageSize".to_string(), "0".to_string());
        assert_eq!(page_param(&query, "pageSize", 10).unwrap(), 1);

        query.insert("pageSize".to_string(), "25".to_string());
        assert_eq!(page_param(&query, "pageSize", 10).unwrap(), 25);

        query.insert("pageSize".to_string(), "many".to_string());
        assert_eq!(page_param(&query, "pageSize", 10).unwrap_err().status_code(), 400);
    }

    #[tokio::test]
    async fn test_envelope_error_wraps_plain_errors() {
        let err = poem::Error::from_string("failed to parse body", StatusCode::BAD_REQUEST);

        let resp = envelope_error(err).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&resp.into_body().into_string().await.unwrap()).unwrap();
        assert_eq!(body["status"], 400);
        assert_eq!(body["code"], 400);
        assert_eq!(body["msg"], "failed to parse body");
        assert_eq!(body["data"], Value::Null);
    }

    #[tokio::test]
    async fn test_envelope_error_keeps_json_responses() {
        let err = poem::Error::from_response(ApiError::conflict("already rolled back").into_response());

        let resp = envelope_error(err).await;

        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = serde_json::from_str(&resp.into_body().into_string().await.unwrap()).unwrap();
        assert_eq!(body["code"], 409);
        assert_eq!(body["msg"], "already rolled back");
    }
}
