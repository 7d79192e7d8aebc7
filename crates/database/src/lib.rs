use std::{env, error::Error};

use bson::doc;
use data_model::location::{LocationDocument, MongoLocations, COLLECTION};
use mongodb::{Client, Collection, Database};

pub mod data_model;
pub mod queries;
pub mod repo;

pub use repo::{DatabaseError, LocationRepo, Result};

pub const DEFAULT_DATABASE_NAME: &str = "location_tracker";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConnectionInfo {
    pub uri: String,
    pub database: String,
}

impl DatabaseConnectionInfo {
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let uri = lookup("MONGO_URI")?;
        let database = lookup("MONGO_DATABASE")
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_owned());
        Some(Self { uri, database })
    }
}

/// Process wide handle to the document database.
///
/// Cloning is cheap, all clones share the driver's connection pool.
#[derive(Debug, Clone)]
pub struct MongoDatabase {
    client: Client,
    database: Database,
}

impl MongoDatabase {
    /// Connects and pings the server, so an unreachable database is
    /// reported here rather than on the first request.
    pub async fn connect(
        database_connection_info: DatabaseConnectionInfo,
    ) -> core::result::Result<Self, Box<dyn Error>> {
        let client = Client::with_uri_str(&database_connection_info.uri).await?;
        let database = client.database(&database_connection_info.database);

        database.run_command(doc! { "ping": 1 }, None).await?;
        log::info!(
            "connected to database '{}'",
            database_connection_info.database
        );

        Ok(Self { client, database })
    }

    pub fn get_collection<T>(&self, name: &str) -> Collection<T> {
        self.database.collection(name)
    }

    pub fn locations(&self) -> MongoLocations {
        MongoLocations::new(self.get_collection::<LocationDocument>(COLLECTION))
    }

    /// Closes all connections, waiting for operations still in flight.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        log::info!("database connection closed");
    }
}
