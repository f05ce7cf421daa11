//! Color polling loop against the DisplayCAL web interface.
//!
//! [`ColorStream::run`] asks for the next color, decodes it, and hands it to
//! the caller's channel, over and over until something goes wrong or the
//! caller cancels. It never retries on its own; reconnecting is the job of
//! [`crate::reconnect::supervise`].

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::codec::{self, DecodeError};
use crate::color::Color;

/// Where cancellation was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Before or during the HTTP request (connect, send, body read).
    Request,
    /// While waiting for the channel to accept a color.
    Delivery,
    /// While pausing between reconnect attempts.
    Backoff,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Request => write!(f, "request"),
            Stage::Delivery => write!(f, "send color"),
            Stage::Backoff => write!(f, "reconnect delay"),
        }
    }
}

/// Why a polling session ended. A session never ends successfully.
#[derive(Debug)]
pub enum StreamError {
    /// The HTTP client could not be built.
    Client(reqwest::Error),
    /// Connecting, sending, or reading the body failed.
    Request {
        locator: Url,
        source: reqwest::Error,
    },
    /// The server answered with something other than 200.
    Status { locator: Url, status: StatusCode },
    /// The body was not a color.
    Decode { locator: Url, source: DecodeError },
    /// The cancellation token fired.
    Cancelled(Stage),
    /// The receiving end of the color channel is gone.
    Closed,
}

impl StreamError {
    /// Stopped because the caller asked, not because of a fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamError::Cancelled(_))
    }

    /// Running the stream again cannot help.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamError::Cancelled(_) | StreamError::Closed)
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Client(e) => write!(f, "build HTTP client: {e}"),
            StreamError::Request { locator, source } => {
                write!(f, "request {:?}: {source}", locator.as_str())
            }
            StreamError::Status { locator, status } => {
                write!(f, "request {:?}: http status: {status}", locator.as_str())
            }
            StreamError::Decode { locator, source } => {
                write!(f, "request {:?}: parse color: {source}", locator.as_str())
            }
            StreamError::Cancelled(stage) => write!(f, "{stage}: cancelled"),
            StreamError::Closed => write!(f, "send color: receiver closed"),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Client(e) => Some(e),
            StreamError::Request { source, .. } => Some(source),
            StreamError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// HTTP client bound to one web interface.
///
/// The client (and its connection pool) is reused across sessions; each
/// call to [`run`](Self::run) starts again from [`Color::PLACEHOLDER`].
pub struct ColorStream {
    client: reqwest::Client,
    base: Url,
    delivered: u64,
}

impl ColorStream {
    /// Stream from the web interface at `base`.
    pub fn new(base: Url) -> Result<Self, StreamError> {
        Self::with_connect_timeout(base, None)
    }

    /// Like [`new`](Self::new), giving up on TCP connects after `timeout`.
    ///
    /// No overall request timeout is set: the server holds a request open
    /// until it has a new color to show.
    pub fn with_connect_timeout(
        base: Url,
        timeout: Option<Duration>,
    ) -> Result<Self, StreamError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder.build().map_err(StreamError::Client)?;
        Ok(Self {
            client,
            base,
            delivered: 0,
        })
    }

    /// The web interface being polled.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Colors delivered over the lifetime of this stream, across sessions.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Poll for colors and send them to `out` until an error or cancellation.
    ///
    /// Colors are sent in the order they are decoded; a full channel stalls
    /// the loop rather than dropping a color. The request (connect, send, and
    /// body read together) and the channel send are both raced against
    /// `cancel`, so a cancelled session returns promptly and drops any
    /// in-flight connection.
    pub async fn run(
        &mut self,
        cancel: &CancellationToken,
        out: &mpsc::Sender<Color>,
    ) -> StreamError {
        let mut last = Color::PLACEHOLDER;
        loop {
            if cancel.is_cancelled() {
                return StreamError::Cancelled(Stage::Request);
            }

            let locator = codec::build_locator(&self.base, last);
            log::debug!("GET {locator}");
            let color = tokio::select! {
                biased;
                () = cancel.cancelled() => return StreamError::Cancelled(Stage::Request),
                result = self.fetch(&locator) => match result {
                    Ok(color) => color,
                    Err(e) => return e,
                },
            };
            last = color;

            tokio::select! {
                biased;
                () = cancel.cancelled() => return StreamError::Cancelled(Stage::Delivery),
                sent = out.send(color) => {
                    if sent.is_err() {
                        return StreamError::Closed;
                    }
                }
            }
            self.delivered += 1;
            log::debug!("delivered {color}");
        }
    }

    /// One request: send, read the whole body, check the status, decode.
    async fn fetch(&self, locator: &Url) -> Result<Color, StreamError> {
        let request_failed = |source| StreamError::Request {
            locator: locator.clone(),
            source,
        };
        let response = self
            .client
            .get(locator.clone())
            .send()
            .await
            .map_err(request_failed)?;
        let status = response.status();
        let body = response.bytes().await.map_err(request_failed)?;

        if status != StatusCode::OK {
            return Err(StreamError::Status {
                locator: locator.clone(),
                status,
            });
        }
        codec::parse_color(&body).map_err(|source| StreamError::Decode {
            locator: locator.clone(),
            source,
        })
    }
}

/// Run a single session against `base` with a fresh client.
pub async fn run(
    cancel: &CancellationToken,
    base: &Url,
    out: &mpsc::Sender<Color>,
) -> StreamError {
    match ColorStream::new(base.clone()) {
        Ok(mut stream) => stream.run(cancel, out).await,
        Err(e) => e,
    }
}
