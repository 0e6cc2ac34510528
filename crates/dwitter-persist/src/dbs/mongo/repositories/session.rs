use mongodb::{
    bson::doc,
    options::{IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};

use crate::dbs::mongo::models::MongoSession;
use crate::error::Result;

/// One document per account, keyed by username
#[derive(Clone)]
pub struct MongoSessionRepository {
    collection: Collection<MongoSession>,
}

impl MongoSessionRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("sessions");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> Result<()> {
        let token = IndexModel::builder()
            .keys(doc! { "token": 1 })
            .options(
                IndexOptions::builder()
                    .name("token_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.collection.create_index(token).await?;
        Ok(())
    }

    /// Upsert the account's session, returning the document it replaced
    ///
    /// A single-document upsert, so concurrent logins for the same account
    /// resolve last-writer-wins.
    pub async fn replace_session(&self, session: MongoSession) -> Result<Option<MongoSession>> {
        let filter = doc! { "_id": session.username.as_str() };
        Ok(self
            .collection
            .find_one_and_replace(filter, &session)
            .upsert(true)
            .return_document(ReturnDocument::Before)
            .await?)
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<MongoSession>> {
        let filter = doc! { "token": token };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn delete_session(&self, username: &str) -> Result<Option<MongoSession>> {
        let filter = doc! { "_id": username };
        Ok(self.collection.find_one_and_delete(filter).await?)
    }
}
