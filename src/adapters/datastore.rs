use mongodb::{bson::doc, Client, Database};
use tracing::{info, warn};

use crate::domain::config::settings::Settings;

/// Process-wide document database handle. Opened once at startup and shut
/// down when the server stops; uploads do not touch it yet.
#[derive(Clone)]
pub struct Datastore {
    client: Client,
    database: Database,
}

impl Datastore {
    /// Opens the client and checks that the server answers.
    pub async fn connect(settings: &Settings) -> Result<Self, mongodb::error::Error> {
        let datastore = Self::open(settings).await?;
        datastore.database.run_command(doc! { "ping": 1 }).await?;
        info!("Connected to datastore '{}'", settings.mongodb_database);
        Ok(datastore)
    }

    /// Builds the client without contacting the server.
    pub async fn open(settings: &Settings) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(&settings.mongodb_url).await?;
        let database = client.database(&settings.mongodb_database);
        Ok(Self { client, database })
    }

    pub fn database(&self) -> &str {
        self.database.name()
    }

    pub async fn ping(&self) -> bool {
        match self.database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Datastore ping failed: {}", e);
                false
            }
        }
    }

    pub async fn close(self) {
        self.client.shutdown().await;
        info!("Datastore connection closed");
    }
}
