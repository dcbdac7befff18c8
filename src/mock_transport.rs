// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A scripted [`Transport`] for component tests (spec §8 scenarios).

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;

use crate::transport::{Transport, TransportState};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Replays a fixed queue of replies regardless of what was written.
///
/// `writes` records every exchange's request bytes, in order, so tests can
/// assert on exactly what the engine sent (e.g. the authenticated digest
/// prefix, or a patched control command).
pub struct MockTransport {
    replies: VecDeque<Vec<u8>>,
    pub writes: Vec<Vec<u8>>,
    open: bool,
    /// If set, the next N writes fail with a transport error before the
    /// queued replies resume — exercises the retry path (spec §4.3d).
    pub fail_next_writes: usize,
}

impl MockTransport {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: replies.into_iter().map(|r| format!("{r}\r").into_bytes()).collect(),
            writes: Vec::new(),
            open: false,
            fail_next_writes: 0,
        }
    }

    pub fn push_reply(&mut self, reply: &str) {
        self.replies.push_back(format!("{reply}\r").into_bytes());
    }
}

impl Transport for MockTransport {
    fn open<'a>(&'a mut self) -> BoxFuture<'a, std::io::Result<()>> {
        Box::pin(async move {
            self.open = true;
            Ok(())
        })
    }

    fn close<'a>(&'a mut self) -> BoxFuture<'a, std::io::Result<()>> {
        Box::pin(async move {
            self.open = false;
            Ok(())
        })
    }

    fn write<'a>(&'a mut self, bytes: &'a [u8]) -> BoxFuture<'a, std::io::Result<()>> {
        Box::pin(async move {
            if self.fail_next_writes > 0 {
                self.fail_next_writes -= 1;
                return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "mock failure"));
            }
            self.writes.push(bytes.to_vec());
            Ok(())
        })
    }

    fn read_until_cr<'a>(&'a mut self) -> BoxFuture<'a, std::io::Result<Vec<u8>>> {
        Box::pin(async move {
            match self.replies.pop_front() {
                Some(reply) => Ok(reply),
                None => Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "no more replies")),
            }
        })
    }

    fn state(&self) -> TransportState {
        if self.open {
            TransportState::Connected
        } else {
            TransportState::Disconnected
        }
    }
}
