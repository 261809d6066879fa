//! HTTP/1.0 protocol implementation.
//!
//! The server speaks a deliberately small subset of HTTP/1.0 directly on the
//! socket: one request per connection, `Connection: close` on every response,
//! bodies sized only by `Content-Length`.
//!
//! # Architecture
//!
//! - **`line`**: bounded CRLF line reader, the primitive every parser uses
//! - **`parser`**: reads the request line and header block
//! - **`request`**: parsed request head
//! - **`body`**: exact-length copy, drain and form reads
//! - **`multipart`**: single-file upload extraction by length arithmetic
//! - **`response`**: status codes and response bodies
//! - **`writer`**: frames a response and streams it to the client
//! - **`mime`**: content type detection based on file extensions
//!
//! # Byte accounting
//!
//! Nothing here reads "until the peer stops". Request heads end at the
//! first blank line and bodies end after exactly `Content-Length` bytes:
//!
//! ```text
//!  GET /files/a.txt HTTP/1.0\r\n     ← parser::read_request
//!  Content-Length: 11\r\n
//!  \r\n
//!  hello world                        ← body::discard / multipart / form
//! ```

pub mod body;
pub mod line;
pub mod mime;
pub mod multipart;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
