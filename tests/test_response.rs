use lantern::http::response::{Response, ResponseBuilder, StatusCode};
use lantern::http::writer::{ResponseWriter, encode_response};

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::Created.as_u16(), 201);
    assert_eq!(StatusCode::NoContent.as_u16(), 204);
    assert_eq!(StatusCode::MovedPermanently.as_u16(), 301);
    assert_eq!(StatusCode::Found.as_u16(), 302);
    assert_eq!(StatusCode::NotModified.as_u16(), 304);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::MethodNotAllowed.as_u16(), 405);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    assert_eq!(StatusCode::Custom(418).as_u16(), 418);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::MovedPermanently.reason_phrase(), "Moved Permanently");
    assert_eq!(StatusCode::Found.reason_phrase(), "Found");
    assert_eq!(StatusCode::NotModified.reason_phrase(), "Not Modified");
    assert_eq!(StatusCode::BadRequest.reason_phrase(), "Bad Request");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    assert_eq!(
        StatusCode::MethodNotAllowed.reason_phrase(),
        "Method Not Allowed"
    );
    assert_eq!(
        StatusCode::InternalServerError.reason_phrase(),
        "Internal Server Error"
    );
    assert_eq!(StatusCode::Custom(599).reason_phrase(), "Unknown");
}

#[test]
fn test_unnamed_standard_codes_get_their_phrase() {
    assert_eq!(StatusCode::from_u16(403).reason_phrase(), "Forbidden");
    assert_eq!(StatusCode::from_u16(409).reason_phrase(), "Conflict");
    assert_eq!(StatusCode::from_u16(413).reason_phrase(), "Content Too Large");
    assert_eq!(StatusCode::from_u16(415).reason_phrase(), "Unsupported Media Type");
    assert_eq!(StatusCode::from_u16(503).reason_phrase(), "Service Unavailable");

    let response = ResponseBuilder::new(StatusCode::from_u16(403)).build();
    let wire = String::from_utf8(encode_response(&response)).unwrap();
    assert!(wire.starts_with("HTTP/1.1 403 Forbidden\r\n"));
}

#[test]
fn test_status_code_from_u16() {
    assert_eq!(StatusCode::from_u16(301), StatusCode::MovedPermanently);
    assert_eq!(StatusCode::from_u16(404), StatusCode::NotFound);
    assert_eq!(StatusCode::from_u16(418), StatusCode::Custom(418));
    assert!(StatusCode::from_u16(302).is_redirect());
    assert!(!StatusCode::from_u16(304).is_redirect());
}

#[test]
fn test_response_builder_basic() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(b"Hello, World!".to_vec())
        .build();

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.version, "HTTP/1.1");
    assert_eq!(response.reason, "OK");
    assert_eq!(response.body, b"Hello, World!".to_vec());
}

#[test]
fn test_response_builder_with_headers() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/plain")
        .header("X-Custom", "value")
        .body(b"test".to_vec())
        .build();

    assert_eq!(response.headers.get("Content-Type").unwrap(), "text/plain");
    assert_eq!(response.headers.get("x-custom").unwrap(), "value");
}

#[test]
fn test_response_builder_auto_content_length() {
    let body = b"This is the body".to_vec();
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(body.clone())
        .build();

    let content_length = response.headers.get("Content-Length").unwrap();
    assert_eq!(content_length, body.len().to_string());
}

#[test]
fn test_response_builder_corrects_wrong_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Length", "999")
        .body(b"test".to_vec())
        .build();

    assert_eq!(response.headers.get("Content-Length").unwrap(), "4");
}

#[test]
fn test_response_builder_keeps_header_order() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "application/json")
        .header("Cache-Control", "no-cache")
        .header("X-Frame-Options", "DENY")
        .body(b"{}".to_vec())
        .build();

    let names: Vec<_> = response.headers.iter().map(|(k, _)| k).collect();
    assert_eq!(
        names,
        vec!["Content-Type", "Cache-Control", "X-Frame-Options", "Content-Length"]
    );
}

#[test]
fn test_response_builder_empty_body() {
    let response = ResponseBuilder::new(StatusCode::NoContent).build();

    assert_eq!(response.body.len(), 0);
    assert_eq!(response.headers.get("Content-Length").unwrap(), "0");
}

#[test]
fn test_response_builder_custom_reason() {
    let response = ResponseBuilder::new(StatusCode::Custom(299))
        .reason("Fine")
        .version("HTTP/1.0")
        .build();

    let wire = String::from_utf8(encode_response(&response)).unwrap();
    assert!(wire.starts_with("HTTP/1.0 299 Fine\r\n"));
}

#[test]
fn test_response_helpers() {
    let response = Response::not_found();
    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(response.body, b"404 Not Found".to_vec());
    assert_eq!(response.header("Content-Type"), Some("text/plain"));

    let response = Response::internal_error();
    assert_eq!(response.status, StatusCode::InternalServerError);
    assert_eq!(response.body, b"500 Internal Server Error".to_vec());

    let response = Response::bad_request();
    assert_eq!(response.status, StatusCode::BadRequest);

    let response = Response::method_not_allowed();
    assert_eq!(response.status, StatusCode::MethodNotAllowed);
    assert_eq!(response.header("Allow"), Some("GET, HEAD"));
}

#[test]
fn test_response_redirect() {
    let response = Response::redirect("/new-page.html", StatusCode::MovedPermanently);

    assert_eq!(response.status, StatusCode::MovedPermanently);
    assert_eq!(response.header("Location"), Some("/new-page.html"));
    assert_eq!(response.header("Content-Type"), Some("text/html"));
    let body = String::from_utf8(response.body.clone()).unwrap();
    assert!(body.contains("<a href=\"/new-page.html\">/new-page.html</a>"));
    assert_eq!(
        response.header("Content-Length"),
        Some(response.body.len().to_string().as_str())
    );
}

#[test]
fn test_response_without_body_keeps_headers() {
    let response = Response::ok(b"hello".to_vec()).without_body();

    assert!(response.body.is_empty());
    assert_eq!(response.header("Content-Length"), Some("5"));
}

#[test]
fn test_encode_response_wire_format() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/plain")
        .body(b"hi".to_vec())
        .build();

    assert_eq!(
        encode_response(&response),
        b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 2\r\n\r\nhi".to_vec()
    );
}

#[test]
fn test_encode_head_response_has_length_but_no_body() {
    let response = Response::ok(b"hello".to_vec()).without_body();
    let wire = encode_response(&response);

    assert!(wire.ends_with(b"Content-Length: 5\r\n\r\n"));
}

#[tokio::test]
async fn test_response_writer_flushes_everything() {
    let response = Response::ok(vec![b'x'; 64 * 1024]);
    let expected = encode_response(&response);
    let mut writer = ResponseWriter::new(&response);
    assert_eq!(writer.remaining(), expected.len());

    let mut out = Vec::new();
    writer.write_to_stream(&mut out).await.unwrap();

    assert_eq!(writer.remaining(), 0);
    assert_eq!(out, expected);
}

#[tokio::test]
async fn test_response_writer_reports_unsent_bytes_on_failure() {
    let response = Response::ok(vec![b'x'; 1024]);
    let (mut near, far) = tokio::io::duplex(64);
    drop(far);

    let mut writer = ResponseWriter::new(&response);
    assert!(writer.write_to_stream(&mut near).await.is_err());
    assert_eq!(writer.remaining(), encode_response(&response).len());
}
