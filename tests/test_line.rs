use filedrop::http::line::{MAX_LINE_LEN, read_line_crlf};

#[tokio::test]
async fn test_line_strips_trailing_cr_only() {
    let mut input: &[u8] = b"a\rb\r\n";
    let line = read_line_crlf(&mut input).await.unwrap().unwrap();

    assert_eq!(line.as_str(), "a\rb");
    assert_eq!(line.consumed(), 5);
}

#[tokio::test]
async fn test_line_bare_lf_terminator() {
    let mut input: &[u8] = b"first\nsecond\n";

    let first = read_line_crlf(&mut input).await.unwrap().unwrap();
    assert_eq!(first.as_str(), "first");
    assert_eq!(first.consumed(), 6);
    assert_eq!(input, b"second\n");
}

#[tokio::test]
async fn test_line_sequence_then_eof() {
    let mut input: &[u8] = b"one\r\ntwo\r\n\r\n";

    let mut lines = Vec::new();
    while let Some(line) = read_line_crlf(&mut input).await.unwrap() {
        lines.push(line.into_string());
    }

    assert_eq!(lines, vec!["one", "two", ""]);
}

#[tokio::test]
async fn test_line_partial_line_at_eof() {
    let mut input: &[u8] = b"no terminator";
    let line = read_line_crlf(&mut input).await.unwrap().unwrap();

    assert_eq!(line.as_str(), "no terminator");
    assert_eq!(line.consumed(), 13);
    assert!(read_line_crlf(&mut input).await.unwrap().is_none());
}

#[tokio::test]
async fn test_line_is_bounded() {
    let long = vec![b'x'; MAX_LINE_LEN + 50];
    let mut data = long.clone();
    data.extend_from_slice(b"\r\n");
    let mut input: &[u8] = &data;

    let first = read_line_crlf(&mut input).await.unwrap().unwrap();
    assert_eq!(first.as_str().len(), MAX_LINE_LEN);
    assert_eq!(first.consumed(), MAX_LINE_LEN);

    let rest = read_line_crlf(&mut input).await.unwrap().unwrap();
    assert_eq!(rest.as_str().len(), 50);
    assert!(input.is_empty());
}

#[tokio::test]
async fn test_line_terminator_right_at_the_bound() {
    let mut data = vec![b'y'; MAX_LINE_LEN];
    data.extend_from_slice(b"\nnext\n");
    let mut input: &[u8] = &data;

    let first = read_line_crlf(&mut input).await.unwrap().unwrap();
    assert_eq!(first.as_str().len(), MAX_LINE_LEN);
    assert_eq!(first.consumed(), MAX_LINE_LEN + 1);

    let next = read_line_crlf(&mut input).await.unwrap().unwrap();
    assert_eq!(next.as_str(), "next");
}

#[tokio::test]
async fn test_line_crlf_right_at_the_bound() {
    let mut data = vec![b'x'; MAX_LINE_LEN];
    data.extend_from_slice(b"\r\nnext\r\n");
    let mut input: &[u8] = &data;

    let first = read_line_crlf(&mut input).await.unwrap().unwrap();
    assert_eq!(first.as_str().len(), MAX_LINE_LEN);
    assert_eq!(first.consumed(), MAX_LINE_LEN + 2);

    let next = read_line_crlf(&mut input).await.unwrap().unwrap();
    assert_eq!(next.as_str(), "next");
    assert!(input.is_empty());
}

#[tokio::test]
async fn test_line_crlf_at_the_bound_split_across_refills() {
    let mut data = vec![b'x'; MAX_LINE_LEN];
    data.extend_from_slice(b"\r\nnext\r\n");
    // Buffer ends exactly at the bound, so the CR and LF arrive in later fills.
    let mut reader = tokio::io::BufReader::with_capacity(MAX_LINE_LEN, &data[..]);

    let first = read_line_crlf(&mut reader).await.unwrap().unwrap();
    assert_eq!(first.consumed(), MAX_LINE_LEN + 2);

    let next = read_line_crlf(&mut reader).await.unwrap().unwrap();
    assert_eq!(next.as_str(), "next");
}

#[tokio::test]
async fn test_line_across_small_buffer_refills() {
    let data = b"Content-Type: multipart/form-data; boundary=XYZ\r\ntail";
    let mut reader = tokio::io::BufReader::with_capacity(4, &data[..]);

    let line = read_line_crlf(&mut reader).await.unwrap().unwrap();

    assert_eq!(line.as_str(), "Content-Type: multipart/form-data; boundary=XYZ");
    assert_eq!(line.consumed(), data.len() - 4);
}
