//! CRLF line reader.
//!
//! Every other parser in the crate is built on [`read_line_crlf`]. It pulls
//! bytes straight out of the reader's internal buffer, so a call costs one
//! scan of the buffered window rather than one syscall per byte.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Upper bound on the bytes kept for a single line (terminator excluded).
pub const MAX_LINE_LEN: usize = 300;

/// One line read from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    text: String,
    consumed: usize,
}

impl Line {
    /// The line content without its LF and trailing CR.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of bytes taken off the stream, terminator included.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Reads the next LF-terminated line and strips a trailing CR.
///
/// Returns `Ok(None)` when the stream is already at EOF, which is distinct
/// from `Ok(Some(line))` with an empty line. A line that hits EOF before its
/// terminator is returned as-is. Lines longer than [`MAX_LINE_LEN`] are cut at
/// the bound; the rest of the oversized line stays in the stream. A CRLF or LF
/// right after the bound still belongs to the line.
pub async fn read_line_crlf<R>(reader: &mut R) -> io::Result<Option<Line>>
where
    R: AsyncBufRead + Unpin,
{
    let mut bytes = Vec::with_capacity(64);
    let mut consumed = 0;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            break;
        }

        let room = MAX_LINE_LEN - bytes.len();
        // One extra byte so a terminator sitting right at the bound is still taken.
        let window = &available[..available.len().min(room + 1)];

        if let Some(pos) = window.iter().position(|&b| b == b'\n') {
            bytes.extend_from_slice(&window[..pos]);
            reader.consume(pos + 1);
            consumed += pos + 1;
            return Ok(Some(finish(bytes, consumed)));
        }

        let take = window.len().min(room);
        bytes.extend_from_slice(&window[..take]);
        reader.consume(take);
        consumed += take;

        if bytes.len() >= MAX_LINE_LEN {
            consumed += take_terminator(reader).await?;
            return Ok(Some(finish(bytes, consumed)));
        }
    }

    if consumed == 0 {
        Ok(None)
    } else {
        Ok(Some(finish(bytes, consumed)))
    }
}

/// Consumes a CR and/or LF waiting at the head of the stream, which may sit in
/// the next buffer fill.
async fn take_terminator<R>(reader: &mut R) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut taken = 0;
    for terminator in [b'\r', b'\n'] {
        if reader.fill_buf().await?.first() == Some(&terminator) {
            reader.consume(1);
            taken += 1;
        }
    }
    Ok(taken)
}

fn finish(mut bytes: Vec<u8>, consumed: usize) -> Line {
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }

    Line {
        text: String::from_utf8_lossy(&bytes).into_owned(),
        consumed,
    }
}
