// Test assertions for HTTP responses

use courier_http_client::Response;

/// Assert that a response has a specific status code
pub fn assert_status(response: &Response, expected: u16) {
    let actual = response.code();
    assert_eq!(
        actual, expected,
        "Expected status {}, got {}",
        expected, actual
    );
}

/// Assert that a response has a specific header
pub fn assert_header(response: &Response, key: &str, expected: &str) {
    let actual = response.header(key);
    assert_eq!(
        actual,
        Some(expected),
        "Expected header '{}' to be '{}', got {:?}",
        key,
        expected,
        actual
    );
}

/// Assert that a response body contains a string
pub fn assert_body_contains(response: &Response, expected: &str) {
    let body = response.text().unwrap_or_default();
    assert!(
        body.contains(expected),
        "Expected body to contain '{}', but it didn't. Body: {}",
        expected,
        body
    );
}

/// Assert that a response body contains JSON matching expected value
pub fn assert_json<T>(response: &Response, expected: &T)
where
    T: serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    let actual: T = response
        .json()
        .expect("Failed to deserialize response body");
    assert_eq!(actual, *expected, "JSON bodies do not match");
}

/// Assert the status codes of the redirect history, oldest first
pub fn assert_history(response: &Response, expected: &[u16]) {
    let actual: Vec<u16> = response.history().iter().map(|r| r.code()).collect();
    assert_eq!(
        actual, expected,
        "Expected redirect history {:?}, got {:?}",
        expected, actual
    );
}

/// Assert that the final response came from `path`
pub fn assert_final_path(response: &Response, expected: &str) {
    let actual = response.url().path();
    assert_eq!(
        actual, expected,
        "Expected final path '{}', got '{}'",
        expected, actual
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_http_client::{HeaderMap, StatusCode, Url};

    fn response(status: StatusCode, body: &'static str) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        Response::new(
            status,
            headers,
            body,
            Url::parse("http://stub.local/final").unwrap(),
        )
    }

    #[test]
    fn test_passing_assertions() {
        let hop = response(StatusCode::FOUND, "");
        let final_response =
            response(StatusCode::OK, r#"{"id":7}"#).with_history(vec![hop]);

        assert_status(&final_response, 200);
        assert_header(&final_response, "Content-Type", "application/json");
        assert_body_contains(&final_response, "\"id\"");
        assert_json(&final_response, &serde_json::json!({"id": 7}));
        assert_history(&final_response, &[302]);
        assert_final_path(&final_response, "/final");
    }

    #[test]
    #[should_panic(expected = "Expected redirect history")]
    fn test_history_mismatch_panics() {
        assert_history(&response(StatusCode::OK, ""), &[301]);
    }
}
