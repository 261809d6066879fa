use tokio::fs::File;

/// HTTP status codes the server answers with.
///
/// - `Ok` (200): Request successful
/// - `BadRequest` (400): Malformed request line, headers or form
/// - `Unauthorized` (401): Login rejected
/// - `Forbidden` (403): Upload quota reached
/// - `NotFound` (404): Missing file or route
/// - `MethodNotAllowed` (405): Recognized but unsupported method
/// - `InternalServerError` (500): Broken upload framing or I/O failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 401 Unauthorized
    Unauthorized,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use filedrop::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Response payload.
#[derive(Debug)]
pub enum Body {
    /// Bytes held in memory.
    Bytes(Vec<u8>),
    /// An open file streamed to the client; `len` is taken from its metadata.
    File { file: File, len: u64 },
}

impl Body {
    /// Exact number of bytes the body will put on the wire.
    pub fn len(&self) -> u64 {
        match self {
            Body::Bytes(bytes) => bytes.len() as u64,
            Body::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A complete response ready to be framed by the writer.
///
/// The header set is fixed: Content-Type, Content-Length and
/// `Connection: close`. Content-Length is always derived from the body.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub content_type: String,
    pub body: Body,
}

impl Response {
    pub fn new(status: StatusCode, content_type: impl Into<String>, body: Body) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            body,
        }
    }

    /// An HTML page held in memory.
    pub fn html(status: StatusCode, page: impl Into<String>) -> Self {
        Self::new(status, "text/html", Body::Bytes(page.into().into_bytes()))
    }

    /// A file streamed from disk.
    pub fn file(status: StatusCode, content_type: &str, file: File, len: u64) -> Self {
        Self::new(status, content_type, Body::File { file, len })
    }

    pub fn content_length(&self) -> u64 {
        self.body.len()
    }
}
