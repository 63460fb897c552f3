// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use super::messages::{ClientMessage, VerifyRequest, WorkerMessage};
use crate::config::consts::MAX_HOST_LINE_BYTES;
use crate::errors::{WorkerError, WorkerResult};
use crate::observability::messages::worker::MalformedHostMessage;
use crate::observability::messages::StructuredLog;

/// Reads verify requests from the host, one JSON object per line.
pub struct HostReader<R> {
    frames: FramedRead<R, LinesCodec>,
}

impl<R: AsyncRead + Unpin> HostReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            frames: FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_HOST_LINE_BYTES)),
        }
    }

    /// Next well-formed request, or `None` once the host closes its end.
    ///
    /// Blank and malformed lines are logged and skipped.
    pub async fn next_request(&mut self) -> WorkerResult<Option<VerifyRequest>> {
        while let Some(frame) = self.frames.next().await {
            let line = frame.map_err(WorkerError::HostFraming)?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ClientMessage>(&line) {
                Ok(ClientMessage::Verify(request)) => return Ok(Some(request)),
                Err(error) => MalformedHostMessage {
                    line: &line,
                    error: &error,
                }
                .log(),
            }
        }
        Ok(None)
    }
}

/// Writes worker messages to the host, flushing after each one.
pub struct HostWriter<W> {
    frames: FramedWrite<W, LinesCodec>,
}

impl<W: AsyncWrite + Unpin> HostWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            frames: FramedWrite::new(writer, LinesCodec::new()),
        }
    }

    pub async fn send(&mut self, message: &WorkerMessage) -> WorkerResult<()> {
        let line = serde_json::to_string(message).map_err(WorkerError::Encode)?;
        self.frames.send(line).await.map_err(WorkerError::HostFraming)
    }
}
