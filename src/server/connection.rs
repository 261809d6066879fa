use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::ServerError;
use crate::http::parser::{ParseError, read_request};
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;
use crate::server::AppContext;
use crate::server::dispatch::{dispatch, error_response};

/// One accepted connection, served for exactly one request.
///
/// The stream is owned here and shut down on every exit path of [`run`],
/// including errors; dropping the connection closes the socket.
///
/// [`run`]: Connection::run
pub struct Connection<S> {
    stream: BufReader<S>,
    ctx: Arc<AppContext>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, ctx: Arc<AppContext>) -> Self {
        Self {
            stream: BufReader::new(stream),
            ctx,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        let result = self.drive().await;

        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!("Shutdown after response failed: {}", e);
        }
        self.state = ConnectionState::Closed;

        result
    }

    async fn drive(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match read_request(&mut self.stream).await {
                        Ok(req) => ConnectionState::Processing(req),
                        Err(e) => {
                            let err = match e {
                                ParseError::Io(io) => ServerError::Io(io),
                                other => ServerError::Parse(other),
                            };
                            let response = error_response(&self.ctx, &err).await;
                            ConnectionState::Writing(ResponseWriter::new(response))
                        }
                    };
                }

                ConnectionState::Processing(req) => {
                    tracing::debug!(
                        method = req.method.as_str(),
                        path = %req.path,
                        content_length = req.body_len(),
                        "Processing request"
                    );
                    let response = dispatch(&self.ctx, &req, &mut self.stream).await;
                    self.state = ConnectionState::Writing(ResponseWriter::new(response));
                }

                ConnectionState::Writing(writer) => {
                    // HTTP/1.0 without keep-alive: one response, then close.
                    writer.write_to_stream(&mut self.stream).await?;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }
}
