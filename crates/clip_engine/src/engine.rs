use std::sync::mpsc;
use std::thread;

use clip_core::{AttemptId, Reply, Request, ScanOutcome, TabId};
use clip_logging::clip_warn;

use crate::coordinator::Coordinator;
use crate::scan::OutcomeSink;
use crate::types::ChannelClosed;

enum CoordinatorCommand {
    Dispatch {
        request: Request,
        reply_tx: Option<mpsc::Sender<Option<Reply>>>,
    },
}

/// Cloneable front door to a coordinator running on its own thread. Requests
/// are handled one at a time in arrival order.
#[derive(Clone)]
pub struct CoordinatorHandle {
    cmd_tx: mpsc::Sender<CoordinatorCommand>,
}

/// Receiving side, turned into a running coordinator by [`CoordinatorInbox::spawn`].
pub struct CoordinatorInbox {
    cmd_rx: mpsc::Receiver<CoordinatorCommand>,
}

impl CoordinatorHandle {
    /// Creates the channel first so services built before the coordinator
    /// (an in-process host, for one) can already hold a handle.
    pub fn channel() -> (Self, CoordinatorInbox) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        (Self { cmd_tx }, CoordinatorInbox { cmd_rx })
    }

    /// Fire-and-forget delivery.
    pub fn post(&self, request: Request) -> Result<(), ChannelClosed> {
        self.cmd_tx
            .send(CoordinatorCommand::Dispatch {
                request,
                reply_tx: None,
            })
            .map_err(|_| ChannelClosed)
    }

    /// Sends a request and blocks until it has been handled.
    pub fn request(&self, request: Request) -> Result<Option<Reply>, ChannelClosed> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.cmd_tx
            .send(CoordinatorCommand::Dispatch {
                request,
                reply_tx: Some(reply_tx),
            })
            .map_err(|_| ChannelClosed)?;
        reply_rx.recv().map_err(|_| ChannelClosed)
    }
}

impl OutcomeSink for CoordinatorHandle {
    fn report(
        &self,
        tab_id: TabId,
        attempt: AttemptId,
        outcome: ScanOutcome,
    ) -> Result<(), ChannelClosed> {
        self.post(Request::ScanReport {
            tab_id,
            attempt,
            outcome,
        })
    }
}

impl CoordinatorInbox {
    pub fn spawn(self, mut coordinator: Coordinator) -> std::io::Result<thread::JoinHandle<()>> {
        let runtime = tokio::runtime::Runtime::new()?;
        let cmd_rx = self.cmd_rx;
        thread::Builder::new()
            .name("clip-coordinator".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        CoordinatorCommand::Dispatch { request, reply_tx } => {
                            let reply = runtime.block_on(coordinator.handle(request));
                            if let Some(reply_tx) = reply_tx {
                                if reply_tx.send(reply).is_err() {
                                    clip_warn!("Requester went away before its reply");
                                }
                            }
                        }
                    }
                }
            })
    }
}
