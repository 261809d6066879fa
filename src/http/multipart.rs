//! Single-file `multipart/form-data` extraction.
//!
//! The extractor never scans for the boundary inside the payload. It keeps a
//! running count of the declared body bytes that are still unread, takes off
//! every line it reads of the opening delimiter and part headers, and then
//! knows the payload length by subtracting the closing delimiter size:
//!
//! ```text
//! --<boundary>\r\n                       opening delimiter   (line)
//! Content-Disposition: ...\r\n            part headers        (lines)
//! \r\n                                    end of part headers (line)
//! <payload>                               remaining - closing
//! \r\n--<boundary>--\r\n                  closing delimiter   (boundary + 8)
//! ```
//!
//! This only holds for exactly one part with CRLF line endings and no header
//! folding. Anything else makes the count disagree with the stream.

use std::io;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncReadExt, AsyncWrite};

use crate::http::body::{copy_exact, discard};
use crate::http::line::read_line_crlf;

/// Bytes around the boundary in the closing delimiter: CRLF, `--`, `--`, CRLF.
pub const CLOSING_DELIMITER_OVERHEAD: usize = 8;

#[derive(Debug, Error)]
pub enum MultipartError {
    #[error("Multipart separator expected and not found")]
    MissingSeparator,
    #[error("Content-Disposition: form-data; expected and not found (NO FILENAME)")]
    MissingFilename,
    #[error("part headers run past the declared Content-Length")]
    HeaderOverrun,
    #[error("declared Content-Length leaves no room for the closing delimiter")]
    PayloadUnderflow,
    #[error("connection closed before the multipart body was complete")]
    UnexpectedEof,
    #[error("multipart I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Headers of the single form part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartHead {
    /// `filename` parameter of Content-Disposition
    pub filename: Option<String>,
    /// Content-Type of the part, if the client sent one
    pub content_type: Option<String>,
}

/// Walks one multipart body whose size is known up front.
pub struct MultipartUpload<'r, R> {
    reader: &'r mut R,
    boundary: String,
    remaining: usize,
}

impl<'r, R> MultipartUpload<'r, R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(reader: &'r mut R, content_length: usize, boundary: impl Into<String>) -> Self {
        Self {
            reader,
            boundary: boundary.into(),
            remaining: content_length,
        }
    }

    /// Declared body bytes not yet taken off the stream.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Reads the opening delimiter and the part's header block.
    pub async fn read_part_head(&mut self) -> Result<PartHead, MultipartError> {
        let opening = read_line_crlf(&mut *self.reader)
            .await?
            .ok_or(MultipartError::UnexpectedEof)?;
        self.take(opening.consumed())?;

        if !opening.as_str().ends_with(self.boundary.as_str()) {
            return Err(MultipartError::MissingSeparator);
        }

        let mut head = PartHead::default();
        loop {
            let line = read_line_crlf(&mut *self.reader)
                .await?
                .ok_or(MultipartError::UnexpectedEof)?;
            self.take(line.consumed())?;

            if line.is_empty() {
                break;
            }

            let Some((name, value)) = line.as_str().split_once(':') else {
                continue;
            };
            let name = name.trim();
            if name.eq_ignore_ascii_case("Content-Disposition") {
                head.filename = disposition_filename(value);
            } else if name.eq_ignore_ascii_case("Content-Type") {
                head.content_type = Some(value.trim().to_string());
            }
        }

        tracing::trace!(
            filename = ?head.filename,
            remaining = self.remaining,
            "Read multipart part headers"
        );
        Ok(head)
    }

    /// Payload size left once the closing delimiter is set aside.
    ///
    /// Only meaningful after [`read_part_head`](Self::read_part_head).
    pub fn payload_len(&self) -> Result<usize, MultipartError> {
        self.remaining
            .checked_sub(self.boundary.len() + CLOSING_DELIMITER_OVERHEAD)
            .ok_or(MultipartError::PayloadUnderflow)
    }

    /// Copies the payload into `dest` and consumes the closing delimiter.
    ///
    /// Returns the payload size. Afterwards the whole declared body has been
    /// read.
    pub async fn copy_payload_to<W>(&mut self, dest: &mut W) -> Result<u64, MultipartError>
    where
        W: AsyncWrite + Unpin,
    {
        let payload_len = self.payload_len()?;

        copy_exact(&mut *self.reader, dest, payload_len as u64)
            .await
            .map_err(read_error)?;
        self.remaining -= payload_len;

        let mut trailer = vec![0; self.remaining];
        self.reader
            .read_exact(&mut trailer)
            .await
            .map_err(read_error)?;
        self.remaining = 0;

        let expected = format!("\r\n--{}--\r\n", self.boundary);
        if trailer != expected.as_bytes() {
            tracing::warn!(
                trailer = %String::from_utf8_lossy(&trailer),
                "Closing multipart delimiter did not match the boundary"
            );
        }

        Ok(payload_len as u64)
    }

    /// Drops whatever is left of the declared body.
    pub async fn discard_rest(&mut self) -> io::Result<()> {
        let left = self.remaining;
        let done = discard(&mut *self.reader, left as u64).await?;
        self.remaining = left - done as usize;

        if self.remaining > 0 {
            tracing::debug!(
                outstanding = self.remaining,
                "Peer closed before the rest of the upload arrived"
            );
        }
        Ok(())
    }

    fn take(&mut self, consumed: usize) -> Result<(), MultipartError> {
        match self.remaining.checked_sub(consumed) {
            Some(left) => {
                self.remaining = left;
                Ok(())
            }
            None => {
                self.remaining = 0;
                Err(MultipartError::HeaderOverrun)
            }
        }
    }
}

fn read_error(e: io::Error) -> MultipartError {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => MultipartError::UnexpectedEof,
        _ => MultipartError::Io(e),
    }
}

/// Extracts `filename="..."` from a Content-Disposition value.
///
/// ```
/// # use filedrop::http::multipart::disposition_filename;
/// let value = r#" form-data; name="filename"; filename="notes.txt""#;
/// assert_eq!(disposition_filename(value).as_deref(), Some("notes.txt"));
/// assert_eq!(disposition_filename(r#"form-data; name="filename""#), None);
/// ```
pub fn disposition_filename(value: &str) -> Option<String> {
    value
        .split(';')
        .filter_map(|p| p.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("filename"))
        .map(|(_, v)| v.trim().trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
