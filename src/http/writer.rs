use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{BodyPart, FILE_CHUNK_SIZE, Response};

/// Drains a finished response onto the socket.
pub struct ResponseWriter {
    parts: VecDeque<BodyPart>,
    written: usize,
}

impl ResponseWriter {
    /// Takes the response's outbound parts; the response should already be ended.
    pub fn new(response: &mut Response) -> Self {
        Self {
            parts: response.take_body(),
            written: 0,
        }
    }

    /// Bytes held in memory. Queued files are only read while writing.
    pub fn buffered_len(&self) -> usize {
        self.parts
            .iter()
            .map(|part| match part {
                BodyPart::Bytes(bytes) => bytes.len(),
                BodyPart::Reader(_) => 0,
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Total bytes handed to the stream so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub async fn write_to_stream<S>(&mut self, stream: &mut S) -> anyhow::Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        let mut chunk = [0u8; FILE_CHUNK_SIZE];

        while let Some(part) = self.parts.pop_front() {
            match part {
                BodyPart::Bytes(bytes) => self.write_all(stream, &bytes).await?,
                BodyPart::Reader(mut reader) => loop {
                    let n = match reader.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => n,
                        Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                        Err(e) => {
                            tracing::warn!(error = %e, "read failed mid-file, response truncated");
                            break;
                        }
                    };
                    self.write_all(stream, &chunk[..n]).await?;
                },
            }
        }

        stream.flush().await?;
        Ok(())
    }

    async fn write_all<S>(&mut self, stream: &mut S, buf: &[u8]) -> anyhow::Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        let mut offset = 0;

        while offset < buf.len() {
            let n = stream.write(&buf[offset..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            offset += n;
            self.written += n;
        }

        Ok(())
    }
}
