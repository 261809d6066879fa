use std::io;

use thiserror::Error;
use tokio::io::AsyncBufRead;

use crate::http::line::read_line_crlf;
use crate::http::request::{Method, Request};

const DEFAULT_VERSION: &str = "HTTP/1.0";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty request")]
    EmptyRequest,
    #[error("malformed request line: {0:?}")]
    InvalidRequestLine(String),
    #[error("unknown method: {0:?}")]
    InvalidMethod(String),
    #[error("invalid Content-Length: {0:?}")]
    InvalidContentLength(String),
    #[error("connection closed inside the header block")]
    Incomplete,
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

/// The pieces of a request line, before the path is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub target: String,
    pub version: String,
}

/// Splits `<METHOD> <target> <protocol>` on single spaces.
///
/// The protocol token is optional and never interpreted.
pub fn parse_request_line(line: &str) -> Result<RequestLine, ParseError> {
    if line.is_empty() {
        return Err(ParseError::EmptyRequest);
    }

    let mut parts = line.split(' ');
    let method_str = parts.next().unwrap_or_default();
    let target = parts
        .next()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ParseError::InvalidRequestLine(line.to_string()))?;
    let version = parts.next().unwrap_or(DEFAULT_VERSION);

    let method = Method::from_str(method_str)
        .ok_or_else(|| ParseError::InvalidMethod(method_str.to_string()))?;

    Ok(RequestLine {
        method,
        target: target.to_string(),
        version: version.to_string(),
    })
}

/// Percent-decodes a request target. `+` is left alone; it only means a space
/// in form bodies. Undecodable targets are returned unchanged.
pub fn decode_path(target: &str) -> String {
    match urlencoding::decode(target) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            tracing::debug!(request_target = %target, error = %e, "Path is not valid percent-encoded UTF-8");
            target.to_string()
        }
    }
}

/// Reads a request line and its header block from the stream.
///
/// Stops right after the blank line that ends the headers; the body, if
/// any, is still unread. Headers other than Content-Length and Content-Type
/// are consumed and dropped. The decoded `path` drops any query string;
/// `target` keeps it.
pub async fn read_request<R>(reader: &mut R) -> Result<Request, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let first = read_line_crlf(reader)
        .await?
        .ok_or(ParseError::EmptyRequest)?;
    let RequestLine {
        method,
        target,
        version,
    } = parse_request_line(first.as_str())?;

    let mut content_length = None;
    let mut content_type = None;

    loop {
        let line = read_line_crlf(reader).await?.ok_or(ParseError::Incomplete)?;
        if line.is_empty() {
            break;
        }

        let Some((name, value)) = line.as_str().split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();

        if name.eq_ignore_ascii_case("Content-Length") {
            let len = value
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength(value.to_string()))?;
            content_length = Some(len);
        } else if name.eq_ignore_ascii_case("Content-Type") {
            content_type = Some(value.to_string());
        }
    }

    let raw_path = target.split_once('?').map_or(target.as_str(), |(path, _)| path);

    Ok(Request {
        method,
        path: decode_path(raw_path),
        target,
        version,
        content_length,
        content_type,
    })
}
