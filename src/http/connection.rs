use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::timeout;

use crate::app::{App, CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS};
use crate::config::ServerConfig;
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

/// Drives one client connection from the first byte to close.
///
/// Nothing escapes `run`: malformed input degrades to defaults, and timeouts,
/// limit violations and I/O errors close the connection without a response.
pub struct Connection<'a, S> {
    reader: BufReader<S>,
    app: &'a App,
    settings: &'a ServerConfig,
    /// Host clients should use to reach the messaging port
    host: String,
    state: ConnectionState,
}

pub enum ConnectionState {
    AwaitData,
    ReadRequestLine,
    ReadHeaders(Request),
    ReadBody(Request, usize),
    Preprocess(Request),
    Dispatch(Request, Response),
    Finalize(Response),
    Closed,
}

impl<'a, S> Connection<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, app: &'a App, settings: &'a ServerConfig, host: impl Into<String>) -> Self {
        Self {
            reader: BufReader::with_capacity(settings.max_line_bytes.max(64), stream),
            app,
            settings,
            host: host.into(),
            state: ConnectionState::AwaitData,
        }
    }

    pub async fn run(mut self) {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::AwaitData => match self.await_data().await {
                    Ok(true) => ConnectionState::ReadRequestLine,
                    Ok(false) => {
                        tracing::debug!("no data before timeout, closing");
                        ConnectionState::Closed
                    }
                    Err(e) => self.abort(e),
                },

                ConnectionState::ReadRequestLine => match self.read_line().await {
                    Ok(Some(line)) => ConnectionState::ReadHeaders(Request::new(&line)),
                    Ok(None) => ConnectionState::Closed,
                    Err(e) => self.abort(e),
                },

                ConnectionState::ReadHeaders(req) => match self.read_headers(req).await {
                    Ok(req) => {
                        let length = req.content_length();
                        if length > 0 {
                            ConnectionState::ReadBody(req, length)
                        } else {
                            ConnectionState::Preprocess(req)
                        }
                    }
                    Err(e) => self.abort(e),
                },

                ConnectionState::ReadBody(mut req, length) => match self.read_body(length).await {
                    Ok(body) => {
                        req.body = body;
                        ConnectionState::Preprocess(req)
                    }
                    Err(e) => self.abort(e),
                },

                ConnectionState::Preprocess(req) => self.preprocess(req),

                ConnectionState::Dispatch(mut req, mut res) => {
                    self.app.dispatch(&mut req, &mut res);
                    ConnectionState::Finalize(res)
                }

                ConnectionState::Finalize(mut res) => {
                    if let Err(e) = self.finalize(&mut res).await {
                        tracing::debug!(error = %e, "failed to flush response");
                    }
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }
    }

    /// Waits for the first byte. `Ok(false)` on timeout or an immediate EOF.
    async fn await_data(&mut self) -> anyhow::Result<bool> {
        match timeout(self.settings.first_byte_timeout(), self.reader.fill_buf()).await {
            Ok(buf) => Ok(!buf?.is_empty()),
            Err(_) => Ok(false),
        }
    }

    /// Reads one line without its `\n` or `\r\n` terminator. `None` at EOF.
    ///
    /// `max_line_bytes` bounds the line content; the terminator is not counted.
    async fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let limit = self.settings.max_line_bytes;
        let mut buf = Vec::new();

        let n = timeout(
            self.settings.read_timeout(),
            (&mut self.reader).take(limit as u64 + 2).read_until(b'\n', &mut buf),
        )
        .await
        .context("timed out reading line")??;

        if n == 0 {
            return Ok(None);
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }

        if buf.len() > limit {
            anyhow::bail!("line exceeds {} bytes", limit);
        }

        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Reads header lines up to the blank line. EOF ends the headers early.
    async fn read_headers(&mut self, mut req: Request) -> anyhow::Result<Request> {
        let mut count = 0;

        while let Some(line) = self.read_line().await? {
            if line.is_empty() {
                break;
            }

            count += 1;
            if count > self.settings.max_headers {
                anyhow::bail!("more than {} header lines", self.settings.max_headers);
            }

            req.add_header(&line);
        }

        Ok(req)
    }

    /// Reads exactly `length` bytes, or fewer if the peer hangs up first.
    async fn read_body(&mut self, length: usize) -> anyhow::Result<String> {
        if length > self.settings.max_body_bytes {
            anyhow::bail!(
                "declared body of {} bytes exceeds limit of {}",
                length,
                self.settings.max_body_bytes
            );
        }

        let mut body = Vec::with_capacity(length);
        timeout(
            self.settings.read_timeout(),
            (&mut self.reader).take(length as u64).read_to_end(&mut body),
        )
        .await
        .context("timed out reading body")??;

        if body.len() < length {
            tracing::debug!(expected = length, received = body.len(), "peer closed mid-body");
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Upgrade notice and CORS, both of which can finish the request early.
    fn preprocess(&self, req: Request) -> ConnectionState {
        let mut res = self.app.new_response();

        tracing::info!(method = %req.method, path = %req.path, "request");

        if self.app.is_upgrade_request(&req) {
            let notice = self.upgrade_notice(&req.path);
            res.status(200).send(notice);
            return ConnectionState::Finalize(res);
        }

        if let Some(origin) = self.app.cors_origin() {
            res.set_header("Access-Control-Allow-Origin", origin);
            res.set_header("Access-Control-Allow-Methods", CORS_ALLOW_METHODS);
            res.set_header("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS);

            if req.method == Method::OPTIONS {
                res.status(204).end();
                return ConnectionState::Finalize(res);
            }
        }

        ConnectionState::Dispatch(req, res)
    }

    /// The port is always spelled out, even when it is the scheme default.
    fn upgrade_notice(&self, path: &str) -> String {
        let port = self.settings.websocket_port;
        let address = match url::Url::parse(&format!("ws://{}/", self.host)) {
            Ok(mut url) => {
                url.set_path(path);
                let host = url.host_str().unwrap_or(&self.host);
                format!("ws://{}:{}{}", host, port, url.path())
            }
            Err(_) => format!("ws://{}:{}{}", self.host, port, path),
        };

        format!(
            "WebSocket service is available on port {}. Please connect to: {}",
            port, address
        )
    }

    async fn finalize(&mut self, res: &mut Response) -> anyhow::Result<()> {
        res.end();

        let mut writer = ResponseWriter::new(res);
        tracing::debug!(status = res.status_code(), buffered = writer.buffered_len(), "flushing response");

        let stream = self.reader.get_mut();
        let flushed = writer.write_to_stream(&mut *stream).await;
        let closed = stream.shutdown().await;

        tracing::debug!(bytes = writer.written(), "response written");
        flushed?;
        closed.context("shutting down connection")
    }

    fn abort(&self, err: anyhow::Error) -> ConnectionState {
        tracing::debug!(error = %err, "closing connection without response");
        ConnectionState::Closed
    }
}
