//! Single-producer / single-consumer decision hand-off.
//!
//! The producer (a reader thread or an async task) decodes decisions and sends
//! them; the game loop polls without blocking. Transport is not this crate's
//! concern: any `BufRead` source can feed [`spawn_line_reader`].

use std::io::BufRead;
use std::thread::JoinHandle;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::protocol::decode_line;
use crate::types::Decision;

/// Default number of decoded decisions buffered ahead of the game loop.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Create a bounded decision channel.
pub fn decision_channel(capacity: usize) -> (DecisionSender, DecisionReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        DecisionSender { tx },
        DecisionReceiver { rx, closed: false },
    )
}

/// Producer half.
#[derive(Debug)]
pub struct DecisionSender {
    tx: mpsc::Sender<Decision>,
}

impl DecisionSender {
    pub async fn send(&self, decision: Decision) -> anyhow::Result<()> {
        self.tx
            .send(decision)
            .await
            .context("decision receiver dropped")
    }

    /// Send from a plain thread. Must not be called from inside an async runtime.
    pub fn blocking_send(&self, decision: Decision) -> anyhow::Result<()> {
        self.tx
            .blocking_send(decision)
            .context("decision receiver dropped")
    }
}

/// Consumer half, owned by the game loop.
#[derive(Debug)]
pub struct DecisionReceiver {
    rx: mpsc::Receiver<Decision>,
    closed: bool,
}

impl DecisionReceiver {
    /// Next decision if one is ready.
    pub fn try_recv(&mut self) -> Option<Decision> {
        match self.rx.try_recv() {
            Ok(decision) => Some(decision),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    /// Wait for the next decision. `None` once the producer is gone.
    pub fn blocking_recv(&mut self) -> Option<Decision> {
        let decision = self.rx.blocking_recv();
        if decision.is_none() {
            self.closed = true;
        }
        decision
    }

    /// True once the producer has hung up and everything sent was consumed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Decode decision lines from `reader` on a dedicated thread.
///
/// Malformed lines are skipped. The thread ends at end of input or when the
/// receiver goes away; the returned count is the number of decisions sent.
pub fn spawn_line_reader<R>(reader: R, sender: DecisionSender) -> JoinHandle<anyhow::Result<u64>>
where
    R: BufRead + Send + 'static,
{
    std::thread::spawn(move || {
        let mut sent = 0u64;
        for line in reader.lines() {
            let line = line.context("read decision line")?;
            let Some(decision) = decode_line(&line) else {
                continue;
            };
            if sender.blocking_send(decision).is_err() {
                debug!("decision receiver closed, stopping reader");
                break;
            }
            sent += 1;
        }
        info!(decisions = sent, "decision input finished");
        Ok(sent)
    })
}
