/// HTTP request methods.
///
/// The dispatcher serves GET and POST. The remaining verbs are recognized so
/// they can be answered with 405 instead of being treated as garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Submit a form or an upload
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// Matching is case-sensitive, as method tokens are on the wire.
    ///
    /// # Example
    ///
    /// ```
    /// # use filedrop::http::request::Method;
    /// assert_eq!(Method::from_str("POST"), Some(Method::POST));
    /// assert_eq!(Method::from_str("post"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "HEAD" => Some(Method::HEAD),
            "OPTIONS" => Some(Method::OPTIONS),
            "PATCH" => Some(Method::PATCH),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
        }
    }
}

/// A parsed request head.
///
/// Only the request line and the headers the upload and form endpoints need
/// are kept. The body is left unread in the connection stream; whoever
/// handles the request is responsible for consuming `content_length` bytes.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request target exactly as sent (e.g. "/files/my%20notes.txt")
    pub target: String,
    /// Percent-decoded target (e.g. "/files/my notes.txt")
    pub path: String,
    /// Protocol token from the request line, not interpreted
    pub version: String,
    /// Declared body length, if a Content-Length header was sent
    pub content_length: Option<usize>,
    /// Raw Content-Type header value
    pub content_type: Option<String>,
}

impl Request {
    /// Declared body length, treating an absent header as an empty body.
    pub fn body_len(&self) -> usize {
        self.content_length.unwrap_or(0)
    }

    /// Returns the `boundary` parameter of a `multipart/form-data` content type.
    ///
    /// ```
    /// # use filedrop::http::request::{Method, Request};
    /// let req = Request {
    ///     method: Method::POST,
    ///     target: "/upload".into(),
    ///     path: "/upload".into(),
    ///     version: "HTTP/1.0".into(),
    ///     content_length: Some(10),
    ///     content_type: Some("multipart/form-data; boundary=XYZ".into()),
    /// };
    /// assert_eq!(req.boundary(), Some("XYZ"));
    /// ```
    pub fn boundary(&self) -> Option<&str> {
        let content_type = self.content_type.as_deref()?;
        let mut params = content_type.split(';');

        let mime = params.next()?.trim();
        if !mime.eq_ignore_ascii_case("multipart/form-data") {
            return None;
        }

        params
            .filter_map(|p| p.trim().split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
            .map(|(_, value)| value.trim().trim_matches('"'))
            .filter(|b| !b.is_empty())
    }
}
