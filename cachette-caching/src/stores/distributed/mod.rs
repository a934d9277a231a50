//! Distributed driver over a pool of Redis servers
//!
//! Keys are spread across the pool with a ketama-compatible hash ring. The
//! servers provide expiry and atomic insert-if-absent natively; they cannot
//! delete by pattern, so partial flushes are rejected.

pub mod codec;
pub mod ring;

use async_trait::async_trait;
use cachette_config::{CacheOptions, DistributedOptions, ServerEndpoint};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use redis::aio::MultiplexedConnection;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    cache::CacheDriver,
    connection::{ConnectionState, LazyConnection, PoolRegistry},
    pattern::PatternSpec,
    CacheError, CacheResult,
};
use ring::HashRing;

/// A set of servers, possibly shared by name across drivers
#[derive(Debug, Default)]
pub struct ServerPool {
    servers: RwLock<Vec<ServerEndpoint>>,
}

impl ServerPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn servers(&self) -> Vec<ServerEndpoint> {
        self.servers.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.read().is_empty()
    }

    /// Register `servers` unless the pool already has some
    ///
    /// Returns whether the servers were registered.
    pub fn register(&self, servers: &[ServerEndpoint]) -> bool {
        let mut registered = self.servers.write();
        if !registered.is_empty() {
            return false;
        }
        registered.extend_from_slice(servers);
        true
    }
}

static NAMED_POOLS: Lazy<PoolRegistry<ServerPool>> = Lazy::new(PoolRegistry::new);

/// Resolve the pool a driver uses: the named shared pool, or a private one
pub fn resolve_pool(name: Option<&str>) -> Arc<ServerPool> {
    match name {
        Some(name) => NAMED_POOLS.get_or_insert_with(name, ServerPool::new),
        None => Arc::new(ServerPool::new()),
    }
}

/// Live connections to every server of the pool
struct PoolConnection {
    ring: HashRing,
    servers: Vec<ServerEndpoint>,
    nodes: Vec<MultiplexedConnection>,
    compress: bool,
}

impl PoolConnection {
    fn node_for(&self, key: &str) -> Result<MultiplexedConnection, String> {
        self.ring
            .node_for(key)
            .map(|index| self.nodes[index].clone())
            .ok_or_else(|| "no servers registered in the pool".to_string())
    }
}

/// Distributed cache driver
pub struct DistributedCache {
    options: DistributedOptions,
    connection: LazyConnection<PoolConnection>,
}

impl DistributedCache {
    pub fn new(options: &CacheOptions) -> CacheResult<Self> {
        Ok(Self {
            options: options.distributed.clone(),
            connection: LazyConnection::new(),
        })
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Connect to the pool if the connection does not already exist
    async fn connect(&self) -> Result<&PoolConnection, String> {
        self.connection
            .get_or_connect(|| async {
                let pool = resolve_pool(self.options.pool.as_deref());

                if pool.register(&self.options.servers) {
                    log::debug!(
                        "Registered {} servers in distributed pool {:?}",
                        self.options.servers.len(),
                        self.options.pool
                    );
                } else {
                    log::debug!(
                        "Distributed pool {:?} already has servers, skipping registration",
                        self.options.pool
                    );
                }

                let servers = pool.servers();
                let mut nodes = Vec::with_capacity(servers.len());
                for server in &servers {
                    let client = redis::Client::open(format!("redis://{}/", server))
                        .map_err(|e| format!("invalid server {}: {}", server, e))?;
                    let node = client
                        .get_multiplexed_async_connection()
                        .await
                        .map_err(|e| format!("failed to connect to {}: {}", server, e))?;
                    nodes.push(node);
                }

                Ok::<_, String>(PoolConnection {
                    ring: HashRing::new(&servers),
                    servers,
                    nodes,
                    compress: self.options.compress,
                })
            })
            .await
    }

    async fn node_for(&self, key: &str) -> Result<(MultiplexedConnection, bool), String> {
        let connection = self.connect().await?;
        Ok((connection.node_for(key)?, connection.compress))
    }
}

/// TTL in whole milliseconds, at least 1 and saturating at `u64::MAX`
fn expiry_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

/// Append the expiry arguments for `ttl`; a zero TTL never expires
fn with_expiry(mut cmd: redis::Cmd, ttl: Duration) -> redis::Cmd {
    if !ttl.is_zero() {
        cmd.arg("PX").arg(expiry_millis(ttl));
    }
    cmd
}

#[async_trait]
impl CacheDriver for DistributedCache {
    fn name(&self) -> &'static str {
        "distributed"
    }

    async fn add(&self, key: &str, payload: &[u8], ttl: Duration) -> CacheResult<()> {
        let (mut node, compress) = self.node_for(key).await.map_err(|e| CacheError::store(key, e))?;
        let frame = codec::encode(payload, compress).map_err(|e| CacheError::store(key, e))?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(frame).arg("NX");
        let reply = with_expiry(cmd, ttl)
            .query_async::<Option<String>>(&mut node)
            .await
            .map_err(|e| CacheError::store(key, e))?;

        match reply {
            Some(_) => Ok(()),
            None => Err(CacheError::exists(key)),
        }
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let (mut node, _) = self.node_for(key).await.map_err(|e| CacheError::fetch(key, e))?;

        let count = redis::cmd("EXISTS")
            .arg(key)
            .query_async::<i64>(&mut node)
            .await
            .map_err(|e| CacheError::fetch(key, e))?;

        Ok(count > 0)
    }

    async fn fetch(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let (mut node, _) = self.node_for(key).await.map_err(|e| CacheError::fetch(key, e))?;

        let frame = redis::cmd("GET")
            .arg(key)
            .query_async::<Option<Vec<u8>>>(&mut node)
            .await
            .map_err(|e| CacheError::fetch(key, e))?;

        frame
            .map(|frame| codec::decode(&frame).map_err(|e| CacheError::fetch(key, e)))
            .transpose()
    }

    async fn flush(&self, pattern: Option<&PatternSpec>) -> CacheResult<()> {
        if pattern.is_some() {
            return Err(CacheError::unsupported(
                "The distributed backend does not support flushing partial keys",
            ));
        }

        let connection = self.connect().await.map_err(CacheError::flush)?;
        if connection.nodes.is_empty() {
            return Err(CacheError::flush("no servers registered in the pool"));
        }

        for (server, node) in connection.servers.iter().zip(&connection.nodes) {
            log::debug!("Flushing distributed cache server {}", server);
            let mut node = node.clone();
            redis::cmd("FLUSHDB")
                .query_async::<()>(&mut node)
                .await
                .map_err(|e| CacheError::flush(format!("{}: {}", server, e)))?;
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let (mut node, _) = self.node_for(key).await.map_err(|e| CacheError::delete(key, e))?;

        // A miss removes nothing and is not an error
        redis::cmd("DEL")
            .arg(key)
            .query_async::<i64>(&mut node)
            .await
            .map_err(|e| CacheError::delete(key, e))?;

        Ok(())
    }

    async fn set(&self, key: &str, payload: &[u8], ttl: Duration) -> CacheResult<()> {
        let (mut node, compress) = self.node_for(key).await.map_err(|e| CacheError::store(key, e))?;
        let frame = codec::encode(payload, compress).map_err(|e| CacheError::store(key, e))?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(frame);
        with_expiry(cmd, ttl)
            .query_async::<()>(&mut node)
            .await
            .map_err(|e| CacheError::store(key, e))?;

        Ok(())
    }
}
