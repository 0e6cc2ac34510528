use mongodb::{bson::doc, Client, Collection};

use super::is_duplicate_key;
use crate::dbs::mongo::models::MongoAccount;
use crate::error::{PersistError, Result};

#[derive(Clone)]
pub struct MongoAccountRepository {
    collection: Collection<MongoAccount>,
}

impl MongoAccountRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("accounts");
        Self { collection }
    }

    /// Insert a new account; `_id` uniqueness rejects taken usernames
    pub async fn insert_account(&self, account: MongoAccount) -> Result<()> {
        match self.collection.insert_one(&account).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(PersistError::Duplicate(account.username)),
            Err(e) => Err(e.into()),
        }
    }

    /// Get account by username
    pub async fn get_account(&self, username: &str) -> Result<Option<MongoAccount>> {
        let filter = doc! { "_id": username };
        Ok(self.collection.find_one(filter).await?)
    }

    /// Replace an existing account document
    pub async fn replace_account(&self, account: MongoAccount) -> Result<()> {
        let filter = doc! { "_id": account.username.as_str() };
        let result = self.collection.replace_one(filter, &account).await?;
        if result.matched_count == 0 {
            return Err(PersistError::NotFound(account.username));
        }
        Ok(())
    }

    pub async fn count_accounts(&self) -> Result<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }
}
