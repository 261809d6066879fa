//! Length-bounded body primitives.
//!
//! Request bodies are never read "until EOF": every helper here moves an
//! exact, declared number of bytes through a fixed-size chunk buffer.

use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Chunk size for streaming uploads, downloads and drains
pub const CHUNK_SIZE: usize = 8192;

/// Largest urlencoded form body accepted by the login and delete endpoints.
pub const MAX_FORM_BODY: usize = 8 * 1024;

/// Copies exactly `len` bytes from `reader` to `writer`.
///
/// Fails with `UnexpectedEof` if the reader runs dry first. On success the
/// reader has been advanced by exactly `len` bytes.
pub async fn copy_exact<R, W>(reader: &mut R, writer: &mut W, len: u64) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = BytesMut::with_capacity(CHUNK_SIZE);
    let mut left = len;

    while left > 0 {
        let to_read = left.min(CHUNK_SIZE as u64) as usize;
        buffer.resize(to_read, 0);

        let n = reader.read(&mut buffer[..to_read]).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("stream ended with {left} of {len} bytes outstanding"),
            ));
        }

        writer.write_all(&buffer[..n]).await?;
        left -= n as u64;
    }

    Ok(())
}

/// Reads and throws away up to `len` bytes.
///
/// Returns how many bytes were actually discarded; that is less than `len`
/// only when the peer closed the stream early.
pub async fn discard<R>(reader: &mut R, len: u64) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::with_capacity(CHUNK_SIZE);
    let mut done = 0;

    while done < len {
        let to_read = (len - done).min(CHUNK_SIZE as u64) as usize;
        buffer.resize(to_read, 0);

        let n = reader.read(&mut buffer[..to_read]).await?;
        if n == 0 {
            break;
        }
        done += n as u64;
    }

    Ok(done)
}

/// Reads a whole form body of the declared length into memory.
///
/// Bodies above [`MAX_FORM_BODY`] are drained and rejected with
/// `InvalidData`, so the stream stays aligned either way.
pub async fn read_form_body<R>(reader: &mut R, len: usize) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    if len > MAX_FORM_BODY {
        discard(reader, len as u64).await?;
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("form body of {len} bytes exceeds {MAX_FORM_BODY}"),
        ));
    }

    let mut body = vec![0; len];
    reader.read_exact(&mut body).await?;
    Ok(body)
}

/// Looks up a field of an `application/x-www-form-urlencoded` body.
///
/// Values are percent-decoded with `+` read as a space.
///
/// ```
/// # use filedrop::http::body::form_field;
/// let body = b"username=bob&password=p%40ss+word";
/// assert_eq!(form_field(body, "password").as_deref(), Some("p@ss word"));
/// assert_eq!(form_field(body, "missing"), None);
/// ```
pub fn form_field(body: &[u8], name: &str) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
