//! The torrent view driver.
//!
//! [`TorrentView`] owns a [`SyncEngine`] and runs it on a single task: the
//! poll timer, status answers and user commands are all handled in turn, so
//! the engine is never touched concurrently.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::rpc::StatusClient;
use crate::source::{ChannelSource, ResponseReceiver};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use torrentview_engine::{
    ApplyOutcome, ColumnSchema, Filter, PollOutcome, RecordId, RenderingSurface, StatusResponse,
    SyncEngine,
};
use tracing::{debug, error, info, warn};

/// Something the user asked the view to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    AddRow(RecordId),
    RemoveRow(RecordId),
    SetFilter(Filter),
    SetColumnVisible { name: String, visible: bool },
    Stop,
}

/// Cloneable handle for sending commands to a running view.
#[derive(Debug, Clone)]
pub struct ViewHandle {
    tx: mpsc::UnboundedSender<ViewCommand>,
}

impl ViewHandle {
    /// Send a command. Fails once the view has gone away.
    pub fn send(&self, command: ViewCommand) -> Result<()> {
        self.tx.send(command).map_err(|_| AppError::ViewClosed)
    }

    pub fn add_row(&self, id: impl Into<RecordId>) -> Result<()> {
        self.send(ViewCommand::AddRow(id.into()))
    }

    pub fn remove_row(&self, id: impl Into<RecordId>) -> Result<()> {
        self.send(ViewCommand::RemoveRow(id.into()))
    }

    pub fn set_filter(&self, filter: Filter) -> Result<()> {
        self.send(ViewCommand::SetFilter(filter))
    }

    pub fn set_column_visible(&self, name: impl Into<String>, visible: bool) -> Result<()> {
        self.send(ViewCommand::SetColumnVisible {
            name: name.into(),
            visible,
        })
    }

    pub fn stop(&self) -> Result<()> {
        self.send(ViewCommand::Stop)
    }
}

/// A live torrent table fed by a [`StatusClient`].
pub struct TorrentView<C, S> {
    engine: SyncEngine<ChannelSource<C>, S>,
    responses: ResponseReceiver,
    commands: mpsc::UnboundedReceiver<ViewCommand>,
    poll_interval: Duration,
    /// Filter from the config, held back until rows carry data to match
    deferred_filter: Option<Filter>,
}

impl<C, S> TorrentView<C, S>
where
    C: StatusClient,
    S: RenderingSurface,
{
    /// Create a view and the handle used to drive it.
    pub fn new(
        client: C,
        schema: ColumnSchema,
        surface: S,
        poll_interval: Duration,
    ) -> (Self, ViewHandle) {
        let (source, responses) = ChannelSource::new(client);
        let (tx, commands) = mpsc::unbounded_channel();

        let view = Self {
            engine: SyncEngine::new(schema, source, surface),
            responses,
            commands,
            poll_interval,
            deferred_filter: None,
        };
        (view, ViewHandle { tx })
    }

    /// Create a view with the default torrent columns and the saved column
    /// layout from `config`.
    ///
    /// The configured filter is checked here but only applied once the first
    /// status answer has been merged. Before that no row has the filtered
    /// field, so every row would be hidden and never fetched.
    pub fn from_config(client: C, surface: S, config: &Config) -> Result<(Self, ViewHandle)> {
        let (mut view, handle) = Self::new(
            client,
            ColumnSchema::torrent_default(),
            surface,
            config.poll_interval,
        );

        for name in &config.hidden_columns {
            view.engine.set_column_visible(name, false)?;
        }
        if let Some(field) = &config.filter.field {
            if !view.engine.schema().knows_field(field) {
                return Err(torrentview_engine::Error::UnknownField(field.clone()).into());
            }
            view.deferred_filter = Some(config.filter.clone());
        }

        Ok((view, handle))
    }

    /// Fill the table with the session's torrents and issue the first poll.
    pub async fn start(&mut self) -> Result<PollOutcome> {
        let ids = self.engine.source().client().list_session_ids().await?;
        info!(torrents = ids.len(), "Loaded session state");
        Ok(self.engine.seed(ids))
    }

    /// One timer tick.
    pub fn tick(&mut self) -> PollOutcome {
        self.engine.poll()
    }

    /// Hand a status answer to the engine, then apply a held-back filter if
    /// the answer was merged.
    pub fn apply(&mut self, response: StatusResponse) -> ApplyOutcome {
        let outcome = self.engine.on_status(response);

        if matches!(outcome, ApplyOutcome::Applied(_)) {
            if let Some(filter) = self.deferred_filter.take() {
                info!(filter = %filter, "Applying configured filter");
                if let Err(e) = self.engine.set_filter(filter) {
                    warn!(error = %e, "Configured filter rejected");
                }
            }
        }
        outcome
    }

    /// Wait for the next status answer.
    pub async fn next_response(&mut self) -> Option<StatusResponse> {
        self.responses.recv().await
    }

    /// Carry out a command. Returns `false` when the view should stop.
    ///
    /// Failed commands are logged and leave the view as it was.
    pub fn handle(&mut self, command: ViewCommand) -> bool {
        debug!(?command, "Handling view command");

        let result = match command {
            ViewCommand::AddRow(id) => self.engine.add_row(id),
            ViewCommand::RemoveRow(id) => self.engine.remove_row(&id).map(|_| ()),
            ViewCommand::SetFilter(filter) => {
                self.deferred_filter = None;
                self.engine.set_filter(filter).map(|_| ())
            }
            ViewCommand::SetColumnVisible { name, visible } => {
                self.engine.set_column_visible(&name, visible)
            }
            ViewCommand::Stop => return false,
        };

        if let Err(e) = result {
            warn!(error = %e, "View command failed");
        }
        true
    }

    /// Run until ctrl-c or a [`ViewCommand::Stop`].
    pub async fn run(&mut self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for ctrl-c");
            }
        })
        .await
    }

    /// Poll on a timer, apply answers and commands, until `shutdown`
    /// resolves or a [`ViewCommand::Stop`] arrives.
    pub async fn run_until(&mut self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires at once; `start` has already polled.
        ticker.tick().await;

        tokio::pin!(shutdown);
        let mut commands_open = true;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick();
                }
                Some(response) = self.responses.recv() => {
                    self.apply(response);
                }
                command = self.commands.recv(), if commands_open => match command {
                    Some(command) => {
                        if !self.handle(command) {
                            info!("Stop requested");
                            break;
                        }
                    }
                    None => commands_open = false,
                },
            }
        }

        Ok(())
    }

    /// Drop all rows and any request in flight.
    pub fn stop(&mut self) {
        self.engine.stop();
        info!("Torrent view stopped");
    }

    pub fn engine(&self) -> &SyncEngine<ChannelSource<C>, S> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SyncEngine<ChannelSource<C>, S> {
        &mut self.engine
    }
}
