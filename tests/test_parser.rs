use lantern::http::parser::{
    ParseError, parse_http_request, parse_http_request_with_limit, parse_request_head,
};
use lantern::http::request::Method;

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.target, "/");
    assert_eq!(parsed.version, "HTTP/1.1");
    assert_eq!(parsed.header("Host").unwrap(), "example.com");
    assert!(parsed.body.is_empty());
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_post_request_with_body() {
    let req = b"POST /api HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.target, "/api");
    assert_eq!(parsed.body, b"hello".to_vec());
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_recovers_all_parts() {
    let req = b"POST /login?next=%2F HTTP/1.0\r\nHost: a\r\nX-One: 1\r\nContent-Type: application/json\r\nContent-Length: 13\r\n\r\n{\"user\":\"a\"}\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.target, "/login?next=%2F");
    assert_eq!(parsed.version, "HTTP/1.0");
    let names: Vec<_> = parsed.headers.iter().map(|(k, _)| k).collect();
    assert_eq!(names, vec!["Host", "X-One", "Content-Type", "Content-Length"]);
    assert_eq!(parsed.body, b"{\"user\":\"a\"}\n".to_vec());
}

#[test]
fn test_parse_leaves_following_request_unconsumed() {
    let req = b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n";
    let (first, consumed) = parse_http_request(req).unwrap();
    let (second, _) = parse_http_request(&req[consumed..]).unwrap();

    assert_eq!(first.target, "/a");
    assert_eq!(second.target, "/b");
}

#[test]
fn test_parse_request_with_path_and_query_string() {
    let req = b"GET /search?q=rust HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.target, "/search?q=rust");
    assert_eq!(parsed.path(), "/search");
}

#[test]
fn test_parse_incomplete_request_missing_blank_line() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n";
    let result = parse_http_request(req);

    assert!(matches!(result, Err(ParseError::Incomplete)));
}

#[test]
fn test_parse_incomplete_request_partial_body() {
    let req = b"POST /api HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello";
    let result = parse_http_request(req);

    assert!(matches!(result, Err(ParseError::Incomplete)));
}

#[test]
fn test_parse_request_line_needs_three_tokens() {
    for line in [
        "GET /\r\n\r\n",
        "GET / HTTP/1.1 extra\r\n\r\n",
        "GET  / HTTP/1.1\r\n\r\n",
        "\tGET / HTTP/1.1\r\n\r\n",
    ] {
        let result = parse_http_request(line.as_bytes());
        assert!(
            matches!(result, Err(ParseError::MalformedRequestLine)),
            "{line:?} should be rejected"
        );
    }
}

#[test]
fn test_parse_rejects_unknown_version() {
    let result = parse_http_request(b"GET / HTTP/2.0\r\n\r\n");
    assert!(matches!(result, Err(ParseError::MalformedRequestLine)));
}

#[test]
fn test_parse_rejects_non_utf8_head() {
    let result = parse_http_request(b"GET /\xff HTTP/1.1\r\n\r\n");
    assert!(matches!(result, Err(ParseError::MalformedRequestLine)));
}

#[test]
fn test_parse_unknown_method_is_kept() {
    let (parsed, _) = parse_http_request(b"BREW /pot HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(parsed.method, Method::Extension("BREW".to_string()));
}

#[test]
fn test_parse_malformed_header_is_skipped() {
    let req = b"GET / HTTP/1.1\r\nBrokenHeader\r\nNoSpace:value\r\nHost: ok\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.headers.len(), 1);
    assert_eq!(parsed.header("Host"), Some("ok"));
}

#[test]
fn test_parse_header_value_keeps_later_colons() {
    let req = b"GET / HTTP/1.1\r\nHost: localhost:8080\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.header("host"), Some("localhost:8080"));
}

#[test]
fn test_parse_duplicate_header_last_wins() {
    let req = b"GET / HTTP/1.1\r\nX-Tag: one\r\nx-tag: two\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.headers.len(), 1);
    assert_eq!(parsed.header("X-Tag"), Some("two"));
}

#[test]
fn test_parse_various_http_methods() {
    let methods = vec![
        ("GET", Method::GET),
        ("POST", Method::POST),
        ("PUT", Method::PUT),
        ("DELETE", Method::DELETE),
        ("HEAD", Method::HEAD),
        ("OPTIONS", Method::OPTIONS),
        ("PATCH", Method::PATCH),
    ];

    for (method_str, expected_method) in methods {
        let req = format!("{} / HTTP/1.1\r\n\r\n", method_str);
        let (parsed, _) = parse_http_request(req.as_bytes()).unwrap();
        assert_eq!(parsed.method, expected_method);
    }
}

#[test]
fn test_parse_request_with_empty_body() {
    let req = b"POST /api HTTP/1.1\r\nContent-Length: 0\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.body.len(), 0);
}

#[test]
fn test_parse_request_with_binary_body() {
    let req = b"POST /upload HTTP/1.1\r\nContent-Length: 4\r\n\r\n\x00\x01\x02\x03";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, vec![0, 1, 2, 3]);
}

#[test]
fn test_parse_get_with_content_length_reads_body() {
    let req = b"GET /x HTTP/1.1\r\nContent-Length: 2\r\n\r\nhi";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, b"hi".to_vec());
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_invalid_content_length() {
    for value in ["abc", "-1", "1.5", ""] {
        let req = format!("POST / HTTP/1.1\r\nContent-Length: {value}\r\n\r\n");
        let result = parse_http_request(req.as_bytes());
        assert!(
            matches!(result, Err(ParseError::InvalidContentLength)),
            "{value:?} should be rejected"
        );
    }
}

#[test]
fn test_parse_header_too_large_without_terminator() {
    let mut req = b"GET / HTTP/1.1\r\nX-Big: ".to_vec();
    req.extend(std::iter::repeat_n(b'a', 200));

    let result = parse_http_request_with_limit(&req, 128);
    assert!(matches!(result, Err(ParseError::HeaderTooLarge { limit: 128 })));
}

#[test]
fn test_parse_header_too_large_with_terminator() {
    let mut req = b"GET / HTTP/1.1\r\nX-Big: ".to_vec();
    req.extend(std::iter::repeat_n(b'a', 200));
    req.extend_from_slice(b"\r\n\r\n");

    let result = parse_http_request_with_limit(&req, 128);
    assert!(matches!(result, Err(ParseError::HeaderTooLarge { .. })));
}

#[test]
fn test_parse_small_incomplete_head_waits_for_more() {
    let result = parse_http_request_with_limit(b"GET / HTTP/1.1\r\nHost", 128);
    assert!(matches!(result, Err(ParseError::Incomplete)));
}

#[test]
fn test_parse_head_only_leaves_body_in_buffer() {
    let req = b"POST /api HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
    let (parsed, consumed) = parse_request_head(req, 1024).unwrap();

    assert!(parsed.body.is_empty());
    assert_eq!(&req[consumed..], b"hello");
}

#[test]
fn test_parse_leading_blank_lines_count_towards_limit() {
    let result = parse_request_head(&vec![b'\n'; 100_000], 128);
    assert!(matches!(result, Err(ParseError::HeaderTooLarge { limit: 128 })));

    let mut req = vec![b'\n'; 120];
    req.extend_from_slice(b"GET / HTTP/1.1\r\n\r\n");
    let result = parse_request_head(&req, 128);
    assert!(matches!(result, Err(ParseError::HeaderTooLarge { .. })));
}

#[test]
fn test_parse_few_leading_blank_lines_are_skipped() {
    let req = b"\r\n\r\nGET / HTTP/1.1\r\n\r\n";
    let (parsed, consumed) = parse_request_head(req, 128).unwrap();

    assert_eq!(parsed.target, "/");
    assert_eq!(consumed, req.len());
}
