use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};

use crate::dbs::mongo::models::MongoPost;
use crate::error::{PersistError, Result};

#[derive(Clone)]
pub struct MongoPostRepository {
    collection: Collection<MongoPost>,
}

impl MongoPostRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("posts");
        Self { collection }
    }

    /// Indexes for the timeline and reply lookups
    pub async fn ensure_indexes(&self) -> Result<()> {
        let timeline = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(IndexOptions::builder().name("created_at_desc".to_string()).build())
            .build();
        let replies = IndexModel::builder()
            .keys(doc! { "reply_to": 1, "created_at": 1 })
            .options(IndexOptions::builder().name("reply_to_created_at".to_string()).build())
            .build();
        self.collection.create_indexes([timeline, replies]).await?;
        Ok(())
    }

    /// Insert a post, checking that its parent exists first
    ///
    /// Posts are never deleted, so a parent seen here stays valid.
    pub async fn insert_post(&self, post: MongoPost) -> Result<()> {
        if let Some(parent) = &post.reply_to {
            if self.get_post(parent).await?.is_none() {
                return Err(PersistError::NotFound(parent.clone()));
            }
        }
        self.collection.insert_one(&post).await?;
        Ok(())
    }

    /// Get post by ID
    pub async fn get_post(&self, id: &str) -> Result<Option<MongoPost>> {
        let filter = doc! { "_id": id };
        Ok(self.collection.find_one(filter).await?)
    }

    /// Set the text of a post and return the updated document
    pub async fn update_text(&self, id: &str, text: &str) -> Result<MongoPost> {
        let filter = doc! { "_id": id };
        let update = doc! { "$set": { "text": text } };
        self.collection
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| PersistError::NotFound(id.to_string()))
    }

    /// List posts, newest first
    pub async fn list_posts(&self, limit: i64, skip: u64) -> Result<Vec<MongoPost>> {
        let posts = self
            .collection
            .find(doc! {})
            .sort(doc! { "created_at": -1, "_id": -1 })
            .skip(skip)
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(posts)
    }

    /// Direct replies to a post, oldest first
    pub async fn list_replies(&self, parent: &str) -> Result<Vec<MongoPost>> {
        let filter = doc! { "reply_to": parent };
        let posts = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(posts)
    }
}
