use std::sync::Arc;
use std::time::Duration;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::http::parser::{ParseError, declared_body_length, parse_request_head};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::server::router::Router;

const READ_CHUNK: usize = 4096;

/// Per-connection limits, taken from the `server` section of the config.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// How long a read may wait for bytes before the connection gives up.
    pub idle_timeout: Duration,
    /// Requests served on one connection before it is closed.
    pub keep_alive_max: usize,
    /// Upper bound for the request line plus headers.
    pub max_header_bytes: usize,
    /// Largest `Content-Length` accepted.
    pub max_body_bytes: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for ConnectionSettings {
    fn from(cfg: &ServerConfig) -> Self {
        Self {
            idle_timeout: cfg.idle_timeout(),
            keep_alive_max: cfg.keep_alive_max,
            max_header_bytes: cfg.max_header_bytes,
            max_body_bytes: cfg.max_body_bytes,
        }
    }
}

/// One accepted connection and its request/response loop.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    router: Arc<Router>,
    settings: ConnectionSettings,
    requests_served: usize,
}

pub enum ConnectionState {
    AwaitingRequest,
    Dispatching(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Arc<Router>, settings: ConnectionSettings) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            state: ConnectionState::AwaitingRequest,
            router,
            settings,
            requests_served: 0,
        }
    }

    pub fn requests_served(&self) -> usize {
        self.requests_served
    }

    /// Drives the connection until it closes.
    ///
    /// Requests are handled strictly one at a time: a response is fully
    /// written before the next request is read. Errors returned here are
    /// write failures; decode failures are answered with 400 and end the loop
    /// normally.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::AwaitingRequest => match self.read_request().await {
                    Ok(Some(req)) => {
                        self.state = ConnectionState::Dispatching(req);
                    }
                    Ok(None) => {
                        self.state = ConnectionState::Closed;
                    }
                    Err(e) => {
                        warn!(error = %e, "Rejecting undecodable request");
                        self.reject(Response::bad_request()).await;
                        self.state = ConnectionState::Closed;
                    }
                },

                ConnectionState::Dispatching(req) => {
                    let (response, keep_alive) = self.dispatch(req).await;

                    let writer = ResponseWriter::new(&response);
                    self.state = ConnectionState::Writing(writer, keep_alive);
                }

                ConnectionState::Writing(mut writer, keep_alive) => {
                    if let Err(e) = writer.write_to_stream(&mut self.stream).await {
                        debug!(unsent = writer.remaining(), "Response write failed");
                        return Err(e);
                    }

                    if keep_alive {
                        self.state = ConnectionState::AwaitingRequest; // go back for next request
                    } else {
                        self.state = ConnectionState::Closed;
                    }
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        if let Err(e) = self.stream.shutdown().await {
            debug!(error = %e, "Socket shutdown failed");
        }

        Ok(())
    }

    /// Reads the next request off the stream.
    ///
    /// Returns `Ok(None)` when the peer closes the connection or stays idle
    /// past the timeout before a full request head has arrived.
    pub async fn read_request(&mut self) -> Result<Option<Request>, ParseError> {
        let mut request = loop {
            // Try parsing whatever we already have
            match parse_request_head(&self.buffer, self.settings.max_header_bytes) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    break request;
                }

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(e) => return Err(e),
            }

            match self.fill_buffer().await? {
                Some(0) => {
                    if !self.buffer.is_empty() {
                        debug!(buffered = self.buffer.len(), "Peer closed mid-request");
                    }
                    return Ok(None);
                }
                Some(_) => {}
                None => {
                    debug!(
                        timeout_secs = self.settings.idle_timeout.as_secs(),
                        "Idle timeout waiting for request"
                    );
                    return Ok(None);
                }
            }
        };

        let expected = declared_body_length(&request)?;
        if expected > self.settings.max_body_bytes {
            return Err(ParseError::BodyTooLarge {
                limit: self.settings.max_body_bytes,
            });
        }

        while self.buffer.len() < expected {
            match self.fill_buffer().await? {
                Some(n) if n > 0 => {}
                _ => {
                    return Err(ParseError::IncompleteBody {
                        expected,
                        received: self.buffer.len(),
                    });
                }
            }
        }

        request.body = self.buffer.split_to(expected).to_vec();
        Ok(Some(request))
    }

    /// One read bounded by the idle timeout. `None` means the timeout fired.
    async fn fill_buffer(&mut self) -> Result<Option<usize>, ParseError> {
        if self.buffer.capacity() == self.buffer.len() {
            self.buffer.reserve(READ_CHUNK);
        }

        match timeout(
            self.settings.idle_timeout,
            self.stream.read_buf(&mut self.buffer),
        )
        .await
        {
            Ok(Ok(n)) => Ok(Some(n)),
            Ok(Err(e)) => Err(ParseError::Io(e)),
            Err(_) => Ok(None),
        }
    }

    async fn dispatch(&mut self, request: Request) -> (Response, bool) {
        self.requests_served += 1;

        let method = request.method.clone();
        let uri = request.target.clone();
        let mut keep_alive =
            request.keep_alive() && self.requests_served < self.settings.keep_alive_max;

        debug!(%method, %uri, version = %request.version, "Dispatching request");

        // Handlers are synchronous and may touch the filesystem
        let router = Arc::clone(&self.router);
        let mut response = match tokio::task::spawn_blocking(move || router.route(&request)).await
        {
            Ok(response) => response,
            Err(e) => {
                error!(%method, %uri, error = %e, "Handler fault");
                keep_alive = false;
                Response::internal_error()
            }
        };

        if response.headers.has_token("Connection", "close") {
            keep_alive = false;
        }

        self.stamp_connection_headers(&mut response, keep_alive);

        info!(
            %method,
            %uri,
            status = response.status.as_u16(),
            keep_alive,
            "Request served"
        );

        (response, keep_alive)
    }

    /// Adds `Connection` and `Keep-Alive`, leaving handler-set values alone.
    fn stamp_connection_headers(&self, response: &mut Response, keep_alive: bool) {
        if keep_alive {
            response
                .headers
                .insert_if_absent("Connection", "keep-alive");
            response.headers.insert_if_absent(
                "Keep-Alive",
                format!(
                    "timeout={}, max={}",
                    self.settings.idle_timeout.as_secs(),
                    self.settings.keep_alive_max
                ),
            );
        } else {
            response.headers.insert_if_absent("Connection", "close");
        }
    }

    /// Best-effort error response before closing.
    async fn reject(&mut self, mut response: Response) {
        self.stamp_connection_headers(&mut response, false);

        let mut writer = ResponseWriter::new(&response);
        if let Err(e) = writer.write_to_stream(&mut self.stream).await {
            debug!(error = %e, "Could not deliver error response");
        }
    }
}
