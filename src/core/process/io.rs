// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Output streaming and capture for child processes.
//!
//! ```text
//! spawn_reader(stream) --> JoinHandle<String>
//!   read chunks --> LineBuffer --> UTF-8 lines
//!   FORWARD_TO_LOG: trace! each line
//!   KEEP_IN_STRING: join lines with '\n'
//! ```
//!
//! Each reader owns its buffer and hands it back through the join handle, so
//! a chatty child can never block on a full channel.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::{trace, warn};

use super::builder::StreamFlags;
use crate::utility::lines::LineBuffer;

/// Spawns a task draining `stream`; resolves to the captured text.
pub(super) fn spawn_reader<R>(
    stream: Option<R>,
    flags: StreamFlags,
    process_name: &str,
    stream_name: &'static str,
) -> Option<JoinHandle<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    if !flags.intersects(StreamFlags::FORWARD_TO_LOG | StreamFlags::KEEP_IN_STRING) {
        return None;
    }
    let process_name = process_name.to_string();
    stream.map(|stream| {
        tokio::spawn(async move { read_stream(stream, flags, &process_name, stream_name).await })
    })
}

/// Awaits a reader task, yielding an empty string if it was never started.
pub(super) async fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    match handle {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    }
}

async fn read_stream<R>(
    mut reader: R,
    flags: StreamFlags,
    process_name: &str,
    stream_name: &str,
) -> String
where
    R: AsyncRead + Unpin,
{
    let mut buffer = LineBuffer::new();
    let mut captured = String::new();
    let mut chunk = [0u8; 4096];

    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                buffer.add(&chunk[..n]);
                for line in buffer.next_lines(false) {
                    handle_line(&mut captured, line, flags, process_name, stream_name);
                }
            }
            Err(e) => {
                warn!(
                    process = %process_name,
                    stream = %stream_name,
                    error = %e,
                    "error reading stream"
                );
                break;
            }
        }
    }

    for line in buffer.next_lines(true) {
        handle_line(&mut captured, line, flags, process_name, stream_name);
    }

    captured
}

fn handle_line(
    captured: &mut String,
    line: String,
    flags: StreamFlags,
    process_name: &str,
    stream_name: &str,
) {
    if flags.contains(StreamFlags::FORWARD_TO_LOG) {
        trace!(process = %process_name, stream = %stream_name, line = %line, "output");
    }
    if flags.contains(StreamFlags::KEEP_IN_STRING) {
        if !captured.is_empty() {
            captured.push('\n');
        }
        captured.push_str(&line);
    }
}
