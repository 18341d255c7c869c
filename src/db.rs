use mongodb::{bson::doc, Client, Database as MongoDatabase};

/// Process-wide handle to the MongoDB deployment. Constructed once at startup
/// and passed explicitly into the components that need it; the underlying
/// `Client` is cheap to clone and manages its own connection pool.
#[derive(Clone)]
pub struct Database {
    client: Client,
    name: String,
}

impl Database {
    /// Parses the connection string and builds the client. The driver connects
    /// lazily; callers that need the deployment to actually be reachable
    /// (startup, `/pinga`) must follow up with [`Database::ping`].
    pub async fn connect(mongo_url: &str, database_name: &str) -> anyhow::Result<Self> {
        let client = Client::with_uri_str(mongo_url).await?;

        Ok(Self {
            client,
            name: database_name.to_string(),
        })
    }

    /// Round-trips a `{ping: 1}` command against the configured database.
    pub async fn ping(&self) -> Result<(), mongodb::error::Error> {
        self.database().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    pub fn database(&self) -> MongoDatabase {
        self.client.database(&self.name)
    }
}
