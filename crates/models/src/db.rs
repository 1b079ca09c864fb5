use std::time::Duration;

use configs::DatabaseConfig;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use tracing::info;

use crate::errors::ModelError;
use crate::user::UserDocument;

/// MongoDB server code for a unique index violation.
pub const DUPLICATE_KEY_CODE: i32 = 11000;

const APP_NAME: &str = "accounts";

/// Process-wide store handle. Opened once at startup and cloned into request state;
/// clones share the driver's connection pool.
#[derive(Clone, Debug)]
pub struct Store {
    client: Client,
    database: Database,
    users_collection: String,
}

impl Store {
    /// Build the client from config. The driver connects lazily, so this only fails on
    /// a malformed URL or options; call [`Store::ping`] to check reachability.
    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self, ModelError> {
        let mut options = ClientOptions::parse(&cfg.url).await?;
        options.app_name = Some(APP_NAME.to_string());
        options.max_pool_size = Some(cfg.max_pool_size);
        options.min_pool_size = Some(cfg.min_pool_size);
        options.connect_timeout = Some(Duration::from_secs(cfg.connect_timeout_secs));
        options.server_selection_timeout = Some(Duration::from_secs(cfg.server_selection_timeout_secs));

        let client = Client::with_options(options)?;
        let database = client.database(&cfg.name);
        info!(database = %cfg.name, collection = %cfg.users_collection, "mongodb client created");
        Ok(Self { client, database, users_collection: cfg.users_collection.clone() })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn users(&self) -> Collection<UserDocument> {
        self.database.collection::<UserDocument>(&self.users_collection)
    }

    /// Round-trip a `ping` command to the server.
    pub async fn ping(&self) -> Result<(), ModelError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// Close pooled connections. Outstanding clones become unusable afterwards.
    pub async fn close(self) {
        self.client.shutdown().immediate(true).await;
        info!("mongodb client shut down");
    }
}

/// True when the error is a unique-index violation (E11000).
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(ce) => ce.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}
