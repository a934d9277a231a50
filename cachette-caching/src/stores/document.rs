//! Document driver over a MongoDB collection
//!
//! The database has no notion of expiry for these rows, so each entry stores
//! an absolute expiry timestamp next to its payload and every read compares it
//! with the current time. Expired rows stay in the collection until they are
//! overwritten, deleted or flushed.

use async_trait::async_trait;
use cachette_config::{CacheOptions, DocumentOptions};
use chrono::Utc;
use mongodb::bson::{doc, spec::BinarySubtype, Binary};
use mongodb::options::{
    Acknowledgment, ClientOptions, DeleteOptions, InsertOneOptions, ReplaceOptions, WriteConcern,
};
use mongodb::{Client, Collection};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    cache::CacheDriver,
    connection::{ConnectionState, LazyConnection, PoolRegistry},
    pattern::PatternSpec,
    CacheError, CacheResult,
};

/// One cache entry as stored in the collection
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheDocument {
    #[serde(rename = "_id")]
    key: String,

    /// Unix timestamp in milliseconds after which the entry is dead
    expires_at: i64,

    data: Binary,
}

impl CacheDocument {
    fn new(key: &str, payload: &[u8], ttl: Duration, now: i64) -> Self {
        Self {
            key: key.to_string(),
            expires_at: expires_at(now, ttl),
            data: Binary {
                subtype: BinarySubtype::Generic,
                bytes: payload.to_vec(),
            },
        }
    }

    fn is_live(&self, now: i64) -> bool {
        is_live(self.expires_at, now)
    }
}

/// Clients shared per connection string when `pool` is enabled
static CLIENTS: Lazy<PoolRegistry<Client>> = Lazy::new(PoolRegistry::new);

/// Build the connection string `mongodb://[user[:password]@]host[:port][/database]`
pub fn build_dsn(options: &DocumentOptions) -> String {
    let mut dsn = String::from("mongodb://");

    if let Some(username) = options.username.as_deref().filter(|u| !u.is_empty()) {
        dsn.push_str(username);
        if let Some(password) = options.password.as_deref().filter(|p| !p.is_empty()) {
            dsn.push(':');
            dsn.push_str(password);
        }
        dsn.push('@');
    }

    dsn.push_str(&options.host);

    if let Some(port) = options.port {
        dsn.push_str(&format!(":{}", port));
    }

    if let Some(database) = options.database.as_deref().filter(|d| !d.is_empty()) {
        dsn.push('/');
        dsn.push_str(database);
    }

    dsn
}

/// Current time as a unix timestamp in milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Absolute expiry for an entry written at `now` with `ttl`
pub fn expires_at(now: i64, ttl: Duration) -> i64 {
    now.saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX))
}

/// An entry is live strictly before its expiry instant
pub fn is_live(expires_at: i64, now: i64) -> bool {
    expires_at > now
}

fn safe_concern() -> WriteConcern {
    WriteConcern::builder()
        .w(Acknowledgment::Nodes(1))
        .journal(true)
        .build()
}

async fn open_client(dsn: &str) -> Result<Client, String> {
    let options = ClientOptions::parse(dsn)
        .await
        .map_err(|e| format!("invalid connection string: {}", e))?;
    Client::with_options(options).map_err(|e| format!("failed to create client: {}", e))
}

/// Document cache driver
///
/// `add` probes for a live entry before inserting. Two concurrent `add` calls
/// for the same key can both pass the probe; the loser then fails with
/// `StoreFailure` from the insert rather than `EntryExists`.
pub struct DocumentCache {
    options: DocumentOptions,
    connection: LazyConnection<Collection<CacheDocument>>,
}

impl DocumentCache {
    pub fn new(options: &CacheOptions) -> CacheResult<Self> {
        Ok(Self {
            options: options.document.clone(),
            connection: LazyConnection::new(),
        })
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Write concern for add, set and full flushes
    fn write_concern(&self) -> Option<WriteConcern> {
        self.options.safe.then(safe_concern)
    }

    /// Connect to the collection if the connection does not already exist
    async fn connect(&self) -> Result<&Collection<CacheDocument>, String> {
        self.connection
            .get_or_connect(|| async {
                let dsn = build_dsn(&self.options);

                let client = if self.options.pool {
                    match CLIENTS.get(&dsn) {
                        Some(client) => (*client).clone(),
                        None => {
                            let client = open_client(&dsn).await?;
                            (*CLIENTS.get_or_insert(&dsn, client)).clone()
                        }
                    }
                } else {
                    open_client(&dsn).await?
                };

                log::debug!(
                    "Connected document cache to {}/{}.{}",
                    self.options.host,
                    self.options.database_name(),
                    self.options.collection
                );

                Ok::<_, String>(
                    client
                        .database(self.options.database_name())
                        .collection::<CacheDocument>(&self.options.collection),
                )
            })
            .await
    }

    async fn find(&self, key: &str) -> Result<Option<CacheDocument>, String> {
        let collection = self.connect().await?;
        collection
            .find_one(doc! { "_id": key }, None)
            .await
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl CacheDriver for DocumentCache {
    fn name(&self) -> &'static str {
        "document"
    }

    async fn add(&self, key: &str, payload: &[u8], ttl: Duration) -> CacheResult<()> {
        let now = now_millis();
        let existing = self.find(key).await.map_err(|e| CacheError::store(key, e))?;
        let collection = self.connect().await.map_err(|e| CacheError::store(key, e))?;
        let entry = CacheDocument::new(key, payload, ttl, now);

        match existing {
            Some(current) if current.is_live(now) => Err(CacheError::exists(key)),
            Some(_) => {
                // Take over the expired row only if it is still expired
                let options = ReplaceOptions::builder()
                    .write_concern(self.write_concern())
                    .build();
                let result = collection
                    .replace_one(
                        doc! { "_id": key, "expires_at": { "$lte": now } },
                        &entry,
                        options,
                    )
                    .await
                    .map_err(|e| CacheError::store(key, e))?;

                if result.matched_count == 0 {
                    return Err(CacheError::store(key, "entry was written concurrently"));
                }
                Ok(())
            }
            None => {
                let options = InsertOneOptions::builder()
                    .write_concern(self.write_concern())
                    .build();
                collection
                    .insert_one(&entry, options)
                    .await
                    .map_err(|e| CacheError::store(key, e))?;
                Ok(())
            }
        }
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let entry = self.find(key).await.map_err(|e| CacheError::fetch(key, e))?;
        Ok(entry.is_some_and(|entry| entry.is_live(now_millis())))
    }

    async fn exists_including_expired(&self, key: &str) -> CacheResult<bool> {
        let entry = self.find(key).await.map_err(|e| CacheError::fetch(key, e))?;
        Ok(entry.is_some())
    }

    async fn fetch(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let entry = self.find(key).await.map_err(|e| CacheError::fetch(key, e))?;
        let now = now_millis();

        // Expired rows read as a miss
        Ok(entry
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.data.bytes))
    }

    async fn flush(&self, pattern: Option<&PatternSpec>) -> CacheResult<()> {
        let filter = pattern.map(|pattern| (pattern, pattern.compile()));
        let collection = self.connect().await.map_err(CacheError::flush)?;

        match filter {
            Some((pattern, compiled)) => {
                log::debug!("Flushing document cache entries matching {}", pattern);
                let options = DeleteOptions::builder()
                    .write_concern(safe_concern())
                    .build();
                collection
                    .delete_many(doc! { "_id": { "$regex": compiled.as_str() } }, options)
                    .await
                    .map_err(|e| CacheError::flush(format!("matching {}: {}", pattern, e)))?;
            }
            None => {
                log::debug!("Flushing document cache collection {}", self.options.collection);
                let options = DeleteOptions::builder()
                    .write_concern(self.write_concern())
                    .build();
                collection
                    .delete_many(doc! {}, options)
                    .await
                    .map_err(CacheError::flush)?;
            }
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let collection = self.connect().await.map_err(|e| CacheError::delete(key, e))?;
        let options = DeleteOptions::builder()
            .write_concern(safe_concern())
            .build();

        // Deleting nothing is not an error
        collection
            .delete_one(doc! { "_id": key }, options)
            .await
            .map_err(|e| CacheError::delete(key, e))?;

        Ok(())
    }

    async fn set(&self, key: &str, payload: &[u8], ttl: Duration) -> CacheResult<()> {
        let collection = self.connect().await.map_err(|e| CacheError::store(key, e))?;
        let entry = CacheDocument::new(key, payload, ttl, now_millis());
        let options = ReplaceOptions::builder()
            .upsert(true)
            .write_concern(self.write_concern())
            .build();

        collection
            .replace_one(doc! { "_id": key }, &entry, options)
            .await
            .map_err(|e| CacheError::store(key, e))?;

        Ok(())
    }
}
