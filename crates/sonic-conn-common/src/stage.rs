//! Pipeline stage trait and connection events.

use async_trait::async_trait;

use crate::context::ConnectionContext;

/// Event driving a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionEvent {
    /// Connection requested (or refreshed)
    Connect,
    /// Connection closed
    Disconnect,
}

impl ConnectionEvent {
    /// Returns the event name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionEvent::Connect => "connect",
            ConnectionEvent::Disconnect => "disconnect",
        }
    }
}

/// A stage of the connection-provisioning pipeline.
///
/// The hosting pipeline calls `on_connect` on the connect path of every
/// connection and `on_disconnect` on its disconnect path. Stages may be
/// invoked concurrently for different connections, and a connect may be
/// replayed for the same connection, so both calls must be idempotent.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; any shared state is synchronized
/// internally.
#[async_trait]
pub trait ConnectionStage: Send + Sync {
    /// Error returned by this stage.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the name of this stage (for logging and debugging).
    fn name(&self) -> &str;

    /// Connect path.
    async fn on_connect(&self, ctx: &ConnectionContext) -> Result<(), Self::Error>;

    /// Disconnect path.
    async fn on_disconnect(&self, ctx: &ConnectionContext) -> Result<(), Self::Error>;

    /// Dispatches `event` to the matching path.
    async fn handle(&self, event: ConnectionEvent, ctx: &ConnectionContext) -> Result<(), Self::Error> {
        match event {
            ConnectionEvent::Connect => self.on_connect(ctx).await,
            ConnectionEvent::Disconnect => self.on_disconnect(ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("refused")]
    struct Refused;

    #[derive(Default)]
    struct CountingStage {
        connects: AtomicUsize,
        disconnects: AtomicUsize,
    }

    #[async_trait]
    impl ConnectionStage for CountingStage {
        type Error = Refused;

        fn name(&self) -> &str {
            "counting"
        }

        async fn on_connect(&self, _ctx: &ConnectionContext) -> Result<(), Refused> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn on_disconnect(&self, _ctx: &ConnectionContext) -> Result<(), Refused> {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
            Err(Refused)
        }
    }

    #[tokio::test]
    async fn test_handle_dispatches_by_event() {
        let store = MetadataStore::new();
        let ctx = ConnectionContext::from_store(&store, "conn-1");
        let stage = CountingStage::default();

        assert_eq!(stage.name(), "counting");
        assert!(stage.handle(ConnectionEvent::Connect, &ctx).await.is_ok());
        assert!(stage.handle(ConnectionEvent::Disconnect, &ctx).await.is_err());

        assert_eq!(stage.connects.load(Ordering::SeqCst), 1);
        assert_eq!(stage.disconnects.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_event_names() {
        assert_eq!(ConnectionEvent::Connect.as_str(), "connect");
        assert_eq!(ConnectionEvent::Disconnect.as_str(), "disconnect");
    }
}
