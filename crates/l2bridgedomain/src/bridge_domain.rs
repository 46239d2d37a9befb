//! Connection-pipeline stage bridging client and server interfaces.

use async_trait::async_trait;
use sonic_conn_common::{
    ConnectionContext, ConnectionEvent, ConnectionStage, InterfaceResolver, MetadataResolver,
};
use sonic_dataplane::DataplaneControlClient;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::attach::attach;
use crate::client::InstrumentedClient;
use crate::config::{ConfigError, L2BridgeConfig};
use crate::detach::detach;
use crate::diag::CallObserver;
use crate::error::L2BridgeResult;
use crate::stats::L2BridgeStatsSnapshot;
use crate::table::BridgeDomainTable;

/// Stage name reported through [`ConnectionStage::name`].
pub const STAGE_NAME: &str = "l2bridgedomain";

/// Bridge-domain lifecycle manager.
///
/// On connect, bridges the connection's server-facing interface into the
/// bridge domain anchored at its client-facing interface, creating the
/// domain on first use. On disconnect, detaches the server-facing interface
/// and destroys the domain once the client-facing interface is its only
/// member.
///
/// Every instance sharing a [`BridgeDomainTable`] sees the same domains.
///
/// # Example
///
/// ```ignore
/// let table = Arc::new(BridgeDomainTable::new());
/// let stage = L2BridgeDomain::new(vpp_client, Arc::clone(&table));
/// stage.attach(&ctx).await?;
/// ```
pub struct L2BridgeDomain<C, R = MetadataResolver> {
    table: Arc<BridgeDomainTable>,
    client: InstrumentedClient<C>,
    resolver: R,
    config: L2BridgeConfig,
}

impl<C: DataplaneControlClient> L2BridgeDomain<C> {
    /// Creates a manager resolving interfaces from connection metadata.
    pub fn new(client: C, table: Arc<BridgeDomainTable>) -> Self {
        Self {
            table,
            client: InstrumentedClient::new(client),
            resolver: MetadataResolver,
            config: L2BridgeConfig::default(),
        }
    }
}

impl<C: DataplaneControlClient, R: InterfaceResolver> L2BridgeDomain<C, R> {
    /// Replaces the interface resolver.
    pub fn with_resolver<R2: InterfaceResolver>(self, resolver: R2) -> L2BridgeDomain<C, R2> {
        L2BridgeDomain {
            table: self.table,
            client: self.client,
            resolver,
            config: self.config,
        }
    }

    /// Applies `config` after validating it.
    pub fn with_config(mut self, config: L2BridgeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Replaces the diagnostic sink for remote calls.
    pub fn with_observer(mut self, observer: Arc<dyn CallObserver>) -> Self {
        self.client = self.client.with_observer(observer);
        self
    }

    /// Returns the shared table.
    pub fn table(&self) -> &Arc<BridgeDomainTable> {
        &self.table
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &L2BridgeConfig {
        &self.config
    }

    /// Returns the remote-call counters of this instance.
    pub fn stats(&self) -> L2BridgeStatsSnapshot {
        self.client.stats().snapshot()
    }

    /// Connect path.
    ///
    /// Succeeds without side effects while either interface is still
    /// unresolved.
    #[instrument(skip_all, fields(connection_id = %ctx.connection_id()))]
    pub async fn attach(&self, ctx: &ConnectionContext) -> L2BridgeResult<()> {
        let client_if_index = self.resolver.resolve(ctx, true);
        let server_if_index = self.resolver.resolve(ctx, false);
        let (Some(client_if_index), Some(server_if_index)) = (client_if_index, server_if_index) else {
            debug!(?client_if_index, ?server_if_index, "Interfaces not resolved yet, skipping attach");
            return Ok(());
        };

        attach(
            &self.table,
            &self.client,
            &self.config,
            client_if_index,
            server_if_index,
        )
        .await
    }

    /// Disconnect path.
    ///
    /// Safe to call repeatedly. An unresolved server-facing interface still
    /// lets a domain whose only member is the client-facing interface be
    /// torn down.
    #[instrument(skip_all, fields(connection_id = %ctx.connection_id()))]
    pub async fn detach(&self, ctx: &ConnectionContext) -> L2BridgeResult<()> {
        let Some(client_if_index) = self.resolver.resolve(ctx, true) else {
            debug!("Client interface not resolved, skipping detach");
            return Ok(());
        };
        let server_if_index = self.resolver.resolve(ctx, false);

        detach(&self.table, &self.client, client_if_index, server_if_index).await
    }

    /// Runs the path matching `event`.
    pub async fn handle(&self, event: ConnectionEvent, ctx: &ConnectionContext) -> L2BridgeResult<()> {
        debug!(event = event.as_str(), connection_id = %ctx.connection_id(), "Handling connection event");
        match event {
            ConnectionEvent::Connect => self.attach(ctx).await,
            ConnectionEvent::Disconnect => self.detach(ctx).await,
        }
    }
}

#[async_trait]
impl<C, R> ConnectionStage for L2BridgeDomain<C, R>
where
    C: DataplaneControlClient,
    R: InterfaceResolver,
{
    type Error = crate::error::L2BridgeError;

    fn name(&self) -> &str {
        STAGE_NAME
    }

    async fn on_connect(&self, ctx: &ConnectionContext) -> Result<(), Self::Error> {
        self.attach(ctx).await
    }

    async fn on_disconnect(&self, ctx: &ConnectionContext) -> Result<(), Self::Error> {
        self.detach(ctx).await
    }
}
