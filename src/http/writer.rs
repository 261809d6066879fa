use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::body::copy_exact;
use crate::http::response::{Body, Response};

const HTTP_VERSION: &str = "HTTP/1.0";

/// Serializes the status line and the fixed header block.
pub fn serialize_head(resp: &Response) -> Bytes {
    let mut buf = BytesMut::with_capacity(128);

    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.put_slice(status_line.as_bytes());

    buf.put_slice(format!("Content-Type: {}\r\n", resp.content_type).as_bytes());
    buf.put_slice(format!("Content-Length: {}\r\n", resp.content_length()).as_bytes());
    buf.put_slice(b"Connection: close\r\n");

    // Header/body separator
    buf.put_slice(b"\r\n");

    buf.freeze()
}

pub struct ResponseWriter {
    head: Bytes,
    body: Body,
}

impl ResponseWriter {
    pub fn new(response: Response) -> Self {
        Self {
            head: serialize_head(&response),
            body: response.body,
        }
    }

    /// Writes the head and then the body. File bodies are streamed in
    /// fixed-size chunks, never loaded whole.
    pub async fn write_to_stream<W>(self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        stream.write_all(&self.head).await?;

        match self.body {
            Body::Bytes(bytes) => stream.write_all(&bytes).await?,
            Body::File { mut file, len } => copy_exact(&mut file, stream, len)
                .await
                .map_err(|e| anyhow::anyhow!("streaming file body failed: {}", e))?,
        }

        stream.flush().await?;
        Ok(())
    }
}
