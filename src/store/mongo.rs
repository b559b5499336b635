//! MongoDB document store (sync driver)

use super::{Document, DocumentStore};
use crate::error::{AutoSenseError, Result};
use mongodb::bson::{doc, Bson, Document as BsonDocument};
use mongodb::sync::Client;

/// Connection to a MongoDB deployment
pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    /// Connect and ping the server so a bad URL fails fast
    pub fn connect(url: &str) -> Result<Self> {
        let client = Client::with_uri_str(url).map_err(store_err)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .run()
            .map_err(store_err)?;
        tracing::info!("Connected to MongoDB");
        Ok(Self { client })
    }
}

fn store_err(err: mongodb::error::Error) -> AutoSenseError {
    AutoSenseError::StoreError(err.to_string())
}

fn to_document(doc: BsonDocument) -> Document {
    // relaxed extended JSON keeps numbers as plain JSON numbers
    match Bson::Document(doc).into_relaxed_extjson() {
        serde_json::Value::Object(map) => map,
        _ => Document::new(),
    }
}

impl DocumentStore for MongoStore {
    fn fetch_all(&self, database: &str, collection: &str) -> Result<Vec<Document>> {
        let coll = self.client.database(database).collection::<BsonDocument>(collection);
        let cursor = coll.find(doc! {}).run().map_err(store_err)?;
        let mut docs = Vec::new();
        for item in cursor {
            docs.push(to_document(item.map_err(store_err)?));
        }
        Ok(docs)
    }

    fn count_documents(&self, database: &str, collection: &str) -> Result<u64> {
        self.client
            .database(database)
            .collection::<BsonDocument>(collection)
            .count_documents(doc! {})
            .run()
            .map_err(store_err)
    }

    fn name(&self) -> &'static str {
        "mongodb"
    }
}
