use super::*;

use mockito::Matcher;

use crate::model::QueryValue;

const VECTOR_BODY: &str = r#"{"status":"success","data":{"resultType":"vector","result":[{"metric":{"instance":"a:9090"},"value":[1700000000,"1"]}]}}"#;

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

#[tokio::test]
async fn query_posts_form_with_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/query")
        .match_header("authorization", "Bearer ya29.token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "up".into()),
            Matcher::UrlEncoded("time".into(), "1700000000".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(VECTOR_BODY)
        .create_async()
        .await;

    let token = SecretString::new("ya29.token".to_string());
    let client = PromClient::new(&server.url(), Some(&token)).unwrap();
    let result = client.query("up", at(1_700_000_000)).await.unwrap();

    mock.assert_async().await;
    assert!(matches!(result.value, QueryValue::Vector(ref samples) if samples.len() == 1));
    assert!(result.warnings.is_empty());
}

#[tokio::test]
async fn query_without_token_sends_no_authorization_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/query")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(VECTOR_BODY)
        .create_async()
        .await;

    let client = PromClient::new(&server.url(), None).unwrap();
    client.query("up", at(1_700_000_000)).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn endpoint_path_prefix_is_kept() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/projects/p/location/global/prometheus/api/v1/query")
        .with_status(200)
        .with_body(VECTOR_BODY)
        .create_async()
        .await;

    let endpoint = format!("{}/v1/projects/p/location/global/prometheus/", server.url());
    let client = PromClient::new(&endpoint, None).unwrap();
    client.query("up", at(1_700_000_000)).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn falls_back_to_get_when_post_is_not_allowed() {
    let mut server = mockito::Server::new_async().await;
    let post = server
        .mock("POST", "/api/v1/query")
        .with_status(405)
        .create_async()
        .await;
    let get = server
        .mock("GET", "/api/v1/query")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "up".into()),
            Matcher::UrlEncoded("time".into(), "1700000000".into()),
        ]))
        .with_status(200)
        .with_body(VECTOR_BODY)
        .create_async()
        .await;

    let client = PromClient::new(&server.url(), None).unwrap();
    client.query("up", at(1_700_000_000)).await.unwrap();
    post.assert_async().await;
    get.assert_async().await;
}

#[tokio::test]
async fn bearer_token_is_sent_on_get_fallback_too() {
    let mut server = mockito::Server::new_async().await;
    let post = server
        .mock("POST", "/api/v1/query")
        .match_header("authorization", "Bearer ya29.token")
        .with_status(501)
        .create_async()
        .await;
    let get = server
        .mock("GET", "/api/v1/query")
        .match_header("authorization", "Bearer ya29.token")
        .match_query(Matcher::UrlEncoded("query".into(), "up".into()))
        .with_status(200)
        .with_body(VECTOR_BODY)
        .create_async()
        .await;

    let token = SecretString::new("ya29.token".to_string());
    let client = PromClient::new(&server.url(), Some(&token)).unwrap();
    client.query("up", at(1_700_000_000)).await.unwrap();
    post.assert_async().await;
    get.assert_async().await;
}

#[tokio::test]
async fn warnings_and_infos_are_returned() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v1/query")
        .with_status(200)
        .with_body(
            r#"{"status":"success","data":{"resultType":"vector","result":[]},"warnings":["w1"],"infos":["i1"]}"#,
        )
        .create_async()
        .await;

    let client = PromClient::new(&server.url(), None).unwrap();
    let result = client.query("up", at(1_700_000_000)).await.unwrap();
    assert_eq!(result.warnings, vec!["w1".to_string()]);
    assert_eq!(result.infos, vec!["i1".to_string()]);
}

#[tokio::test]
async fn structured_api_error_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v1/query")
        .with_status(400)
        .with_body(r#"{"status":"error","errorType":"bad_data","error":"1:4: parse error: unexpected end of input"}"#)
        .create_async()
        .await;

    let client = PromClient::new(&server.url(), None).unwrap();
    let err = client.query("up{", at(1_700_000_000)).await.unwrap_err();
    match err {
        PromError::QueryProtocolError {
            error_type,
            message,
            ..
        } => {
            assert_eq!(error_type, ErrorType::BadData);
            assert_eq!(message, "1:4: parse error: unexpected end of input");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_carries_body_as_detail() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v1/query")
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let client = PromClient::new(&server.url(), None).unwrap();
    let err = client.query("up", at(1_700_000_000)).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Query error: server_error: msg='server error: 503', detail='upstream unavailable'"
    );
    assert!(!err.is_transport());
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = PromClient::new(&format!("http://{addr}"), None).unwrap();
    let err = client.query("up", at(1_700_000_000)).await.unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err:?}");
    assert!(
        err.to_string().to_lowercase().contains("connection refused"),
        "cause missing from: {err}"
    );
}

#[test]
fn malformed_endpoint_fails_client_construction() {
    for endpoint in ["http://", "not a url", "ftp://prom:9090"] {
        let err = PromClient::new(endpoint, None).unwrap_err();
        assert!(
            matches!(err, PromError::ClientConstructionError(_)),
            "{endpoint}: {err:?}"
        );
    }
}

#[test]
fn token_with_newline_fails_client_construction() {
    let token = SecretString::new("bad\ntoken".to_string());
    let err = PromClient::new("http://localhost:9090", Some(&token)).unwrap_err();
    assert!(matches!(err, PromError::ClientConstructionError(_)));
}

#[test]
fn decode_rejects_success_body_on_api_error_status() {
    let err = decode_response(StatusCode::UNPROCESSABLE_ENTITY, VECTOR_BODY).unwrap_err();
    assert!(err
        .to_string()
        .contains("bad_response: msg='inconsistent body for response code'"));
}

#[test]
fn error_envelope_on_bad_request_has_empty_detail() {
    let err = decode_response(
        StatusCode::BAD_REQUEST,
        r#"{"status":"error","errorType":"bad_data","error":"parse error"}"#,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Query error: bad_data: msg='parse error', detail=''"
    );
}

#[test]
fn undecodable_body_on_bad_request_is_a_bad_response() {
    let err = decode_response(StatusCode::BAD_REQUEST, "<html>oops</html>").unwrap_err();
    match err {
        PromError::QueryProtocolError {
            error_type, detail, ..
        } => {
            assert_eq!(error_type, ErrorType::BadResponse);
            assert_eq!(detail, "");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn decode_rejects_garbage_body() {
    let err = decode_response(StatusCode::OK, "<html>").unwrap_err();
    assert!(matches!(
        err,
        PromError::QueryProtocolError {
            error_type: ErrorType::BadResponse,
            ..
        }
    ));
}

#[test]
fn time_is_formatted_as_unix_seconds() {
    assert_eq!(format_time(at(1_700_000_000)), "1700000000");
    let fractional = DateTime::from_timestamp(1_700_000_000, 250_000_000).unwrap();
    assert_eq!(format_time(fractional), "1700000000.25");
}
