// Push-channel client over a pluggable transport

mod message;
mod reconnect;
mod ws;

pub use message::{Inbound, decode_message};
pub use reconnect::{
    ConnectionState, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, ReconnectPolicy, Reconnector,
};
pub use ws::WsTransport;

use std::future::Future;

use async_trait::async_trait;

use crate::error::{ChannelError, TransportError};
use crate::status::{Status, StatusSink};
use crate::store::StateStore;

/// One connection to the data source.
///
/// `recv` yields `None` once the transport is closed; a `Some(Err(_))` is a
/// transport failure and the caller is expected to `close` afterwards.
#[async_trait]
pub trait Transport: Send {
    async fn connect(&mut self) -> Result<(), TransportError>;
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;
    async fn close(&mut self);
    fn endpoint(&self) -> &str;
}

pub struct ChannelClient<T: Transport> {
    transport: T,
    reconnect: Reconnector,
    status: Box<dyn StatusSink>,
}

impl<T: Transport> ChannelClient<T> {
    pub fn new(transport: T, policy: ReconnectPolicy, status: impl StatusSink + 'static) -> Self {
        Self {
            transport,
            reconnect: Reconnector::new(policy),
            status: Box::new(status),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.reconnect.state()
    }

    pub fn retries(&self) -> u32 {
        self.reconnect.retries()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Single connection attempt. Success resets the retry counter.
    pub async fn connect(&mut self) -> Result<(), TransportError> {
        self.reconnect.begin_connect();
        let endpoint = self.transport.endpoint().to_string();
        self.status
            .report(Status::info(format!("Connecting to {endpoint}...")));
        self.transport.connect().await?;
        self.reconnect.on_connected();
        tracing::info!(endpoint = %endpoint, "Connected to data source");
        self.status.report(Status::success("Connected, waiting for data"));
        Ok(())
    }

    /// Decode one payload and apply it. The store is touched only for snapshot updates.
    pub fn handle_message(
        &mut self,
        store: &mut StateStore,
        payload: &str,
    ) -> Result<(), ChannelError> {
        match decode_message(payload) {
            Ok(Inbound::Snapshot(update)) => {
                store.update(update);
                Ok(())
            }
            Ok(Inbound::RemoteError(message)) => {
                tracing::warn!(
                    operation = "handle_message",
                    error = %message,
                    "Data source reported an error"
                );
                self.status.report(Status::error(message.clone()));
                Err(ChannelError::Remote(message))
            }
            Err(e) => {
                tracing::warn!(
                    operation = "handle_message",
                    error = %e,
                    "Discarding malformed message"
                );
                self.status
                    .report(Status::error("Received malformed data, retrying..."));
                Err(ChannelError::Parse(e))
            }
        }
    }

    /// Run until the retry budget of a disconnect episode is spent.
    /// The store keeps whatever it last held.
    pub async fn run(&mut self, store: &mut StateStore) {
        loop {
            match self.connect().await {
                Ok(()) => self.pump(store).await,
                Err(e) => {
                    tracing::warn!(
                        operation = "connect",
                        endpoint = %self.transport.endpoint(),
                        error = %e,
                        "Connection attempt failed"
                    );
                    self.status
                        .report(Status::error("Connection error, retrying..."));
                    self.transport.close().await;
                }
            }

            match self.reconnect.on_closed() {
                Some(delay) => {
                    let attempt = self.reconnect.retries();
                    let max = self.reconnect.policy().max_retries;
                    tracing::info!(
                        attempt,
                        max_retries = max,
                        delay_ms = delay.as_millis() as u64,
                        "Scheduling reconnect"
                    );
                    self.status.report(Status::info(format!(
                        "Connection lost, reconnecting (attempt {attempt}/{max})..."
                    )));
                    tokio::time::sleep(delay).await;
                }
                None => {
                    tracing::warn!(
                        retries = self.reconnect.retries(),
                        "Giving up on data source; showing last known state"
                    );
                    self.status.report(Status::error(
                        "Disconnected from server, showing last known state",
                    ));
                    return;
                }
            }
        }
    }

    /// [`run`](Self::run) until `shutdown` resolves, then close the transport.
    /// Returns `true` if shutdown won, `false` if the retry budget ran out first.
    pub async fn run_until<F>(&mut self, store: &mut StateStore, shutdown: F) -> bool
    where
        F: Future<Output = ()>,
    {
        let stopped = tokio::select! {
            _ = self.run(store) => false,
            _ = shutdown => true,
        };
        if stopped {
            tracing::debug!("Channel client shutting down");
            self.transport.close().await;
            self.reconnect.disconnect();
        }
        stopped
    }

    /// Receive until the transport closes. A transport error force-closes it,
    /// so error and close share one recovery path.
    async fn pump(&mut self, store: &mut StateStore) {
        while let Some(frame) = self.transport.recv().await {
            match frame {
                Ok(payload) => {
                    let _ = self.handle_message(store, &payload);
                }
                Err(e) => {
                    tracing::warn!(
                        operation = "recv",
                        error = %e,
                        "Transport error, closing connection"
                    );
                    self.status
                        .report(Status::error("Connection error, retrying..."));
                    self.transport.close().await;
                    return;
                }
            }
        }
        tracing::info!(endpoint = %self.transport.endpoint(), "Connection closed");
    }
}
