//! Channel-backed status source.
//!
//! Bridges the engine's fire-and-forget [`RemoteStatusSource`] to an async
//! [`StatusClient`]: each request runs as its own task and its answer is
//! posted back to the view loop, which hands it to the engine.

use crate::rpc::StatusClient;
use tokio::sync::mpsc;
use torrentview_engine::{RemoteStatusSource, StatusRequest, StatusResponse};
use tracing::{debug, warn};

/// Sender for status answers.
pub type ResponseSender = mpsc::UnboundedSender<StatusResponse>;

/// Receiver for status answers.
pub type ResponseReceiver = mpsc::UnboundedReceiver<StatusResponse>;

/// Dispatches fetches onto the tokio runtime.
pub struct ChannelSource<C> {
    client: C,
    responses: ResponseSender,
}

impl<C: StatusClient> ChannelSource<C> {
    /// Create a source and the receiving end of its answers.
    pub fn new(client: C) -> (Self, ResponseReceiver) {
        let (responses, rx) = mpsc::unbounded_channel();
        (Self { client, responses }, rx)
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: StatusClient> RemoteStatusSource for ChannelSource<C> {
    /// Must be called from within a tokio runtime.
    fn fetch_status(&mut self, mut request: StatusRequest) {
        let fetch = self.client.fetch_status(
            std::mem::take(&mut request.ids),
            std::mem::take(&mut request.fields),
        );
        let generation = request.generation;
        let responses = self.responses.clone();

        tokio::spawn(async move {
            let statuses = match fetch.await {
                Ok(statuses) => statuses,
                Err(e) => {
                    // Answered anyway so the engine sees "no new data".
                    warn!(generation = %generation, error = %e, "Status fetch failed");
                    None
                }
            };

            if responses.send(request.respond(statuses)).is_err() {
                debug!(generation = %generation, "View closed, dropping status response");
            }
        });
    }
}
