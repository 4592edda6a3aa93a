//! Inbound invalidation task for the in-process bus.

use tokio::sync::broadcast::{error::RecvError, Receiver};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::Cache;
use crate::cluster::ClusterEnvelope;
use crate::codec::ValueCodec;

/// Spawns a task applying every envelope from `receiver` to `cache`.
///
/// If the receiver lags behind and envelopes are lost, the local cache is
/// purged without re-broadcasting. The task ends when the bus closes.
///
/// # Example
/// ```ignore
/// let bus = BroadcastBus::default();
/// let cache = Cache::with_transport(config, Arc::new(bus.clone()))?;
/// let handle = spawn_invalidation_listener(cache.clone(), bus.subscribe());
/// ```
pub fn spawn_invalidation_listener<C: ValueCodec>(
    cache: Cache<C>,
    mut receiver: Receiver<ClusterEnvelope>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            channel = %cache.config().invalidation_channel,
            "Starting cluster invalidation listener"
        );

        loop {
            match receiver.recv().await {
                Ok(envelope) => {
                    cache.handle_cluster_message(&envelope.channel, &envelope.payload);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Invalidation listener lagged, purging local cache");
                    cache.purge_local();
                }
                Err(RecvError::Closed) => {
                    info!("Invalidation bus closed, stopping listener");
                    break;
                }
            }
        }
    })
}
