// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log capture pipe: duplicate the child's combined output stream.
//!
//! A single anonymous pipe is handed to the child as both stdout and
//! stderr, so the transcript preserves the byte order the child actually
//! produced. A drain task fans every chunk out to the wrapper's own
//! stdout (interactive visibility) and to the per-module transcript
//! (durable artifact), with no buffering beyond the per-read chunk.

use std::io;
use std::os::fd::OwnedFd;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::pipe;
use tokio::task::JoinHandle;

const CHUNK: usize = 8192;

/// Read half of the combined-output pipe, plus the child's stdio handles.
pub struct CapturePipe {
    reader: pipe::Receiver,
}

impl CapturePipe {
    /// Create the pipe. The returned `Stdio` pair must be installed as
    /// the child's stdout and stderr; both are write ends of the same
    /// pipe, so interleaving is exactly as the child wrote it.
    pub fn new() -> io::Result<(Self, Stdio, Stdio)> {
        let (tx, rx) = pipe::pipe()?;
        let stdout_fd: OwnedFd = tx.into_blocking_fd()?;
        let stderr_fd = stdout_fd.try_clone()?;
        Ok((Self { reader: rx }, Stdio::from(stdout_fd), Stdio::from(stderr_fd)))
    }

    /// Spawn the drain task appending to `transcript`.
    ///
    /// The task runs until the pipe reaches end-of-stream, which happens
    /// only once every write end is closed, i.e. after the whole child
    /// process tree has let go of its output descriptors. Awaiting the
    /// handle therefore guarantees no trailing output is truncated, even
    /// when the child has already exited. Returns the bytes captured.
    pub fn spawn_drain(self, transcript: PathBuf) -> JoinHandle<u64> {
        tokio::spawn(drain(self.reader, transcript))
    }
}

/// Copy pipe chunks to stdout and the transcript until end-of-stream.
///
/// The transcript is created lazily on the first chunk and opened in
/// append mode; it is never truncated. A failure on either destination
/// stops writes to that destination only; the other keeps draining, so
/// the pipe never backs up and stalls the child.
async fn drain(mut reader: pipe::Receiver, transcript: PathBuf) -> u64 {
    let mut stdout = tokio::io::stdout();
    let mut echo_open = true;
    let mut file: Option<File> = None;
    let mut file_failed = false;
    let mut buf = [0u8; CHUNK];
    let mut total: u64 = 0;

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "capture pipe read failed");
                break;
            }
        };
        let chunk = &buf[..n];
        total += n as u64;

        if !file_failed {
            if file.is_none() {
                match open_append(&transcript).await {
                    Ok(f) => file = Some(f),
                    Err(e) => {
                        tracing::warn!(path = %transcript.display(), error = %e, "cannot open transcript");
                        file_failed = true;
                    }
                }
            }
            if let Some(ref mut f) = file {
                if let Err(e) = append_chunk(f, chunk).await {
                    tracing::warn!(path = %transcript.display(), error = %e, "transcript write failed");
                    file_failed = true;
                }
            }
        }

        if echo_open {
            let echoed = async {
                stdout.write_all(chunk).await?;
                stdout.flush().await
            };
            if echoed.await.is_err() {
                // Our own stdout is gone (orchestrator detached); the
                // transcript is the artifact that matters, keep draining.
                echo_open = false;
            }
        }
    }

    if let Some(mut f) = file {
        if let Err(e) = f.flush().await {
            tracing::warn!(path = %transcript.display(), error = %e, "transcript flush failed");
        }
    }
    total
}

async fn open_append(path: &std::path::Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path).await
}

async fn append_chunk(file: &mut File, chunk: &[u8]) -> io::Result<()> {
    file.write_all(chunk).await?;
    // Flush per chunk: captured output must not lag the child.
    file.flush().await
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
