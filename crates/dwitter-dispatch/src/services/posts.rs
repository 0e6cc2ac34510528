use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use dwitter_persist::{PersistError, PersistenceClient};
use dwitter_types::{Action, Caller, Post, PostId, PostThread, Resource, Target};

use crate::config::ServiceConfig;
use crate::dispatcher::ActionDispatcher;
use crate::error::{DispatchError, FieldErrors, Result};
use crate::services::Page;
use crate::validators::read_only_error;

const PARENT_MISSING: &str = "Invalid pk - object does not exist.";

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn PersistenceClient>,
    dispatcher: Arc<ActionDispatcher>,
    config: ServiceConfig,
}

impl PostService {
    pub(crate) fn new(
        store: Arc<dyn PersistenceClient>,
        dispatcher: Arc<ActionDispatcher>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            dispatcher,
            config,
        }
    }

    /// Publish a post owned by the caller, optionally as a reply
    pub async fn create(&self, caller: &Caller, payload: &Value) -> Result<Post> {
        self.dispatcher
            .check(Resource::Post, Action::Create, caller, &Target::None)?;

        let Some(owner) = caller.username() else {
            tracing::warn!("Anonymous caller attempted to create a post");
            return Err(DispatchError::Forbidden);
        };

        let data = self
            .dispatcher
            .clean(Resource::Post, Action::Create, payload)?
            .into_new_post()?;

        if let Some(parent) = data.reply_to {
            if self.store.get_post(parent).await?.is_none() {
                return Err(FieldErrors::single("reply_to", PARENT_MISSING).into());
            }
        }

        let post = Post::new(owner, data.text, data.reply_to);
        match self.store.insert_post(post.clone()).await {
            Ok(()) => {
                tracing::info!(
                    post_id = %post.id,
                    owner = %post.owner,
                    reply_to = ?post.reply_to,
                    "Post created"
                );
                Ok(post)
            }
            Err(PersistError::NotFound(_)) => {
                Err(FieldErrors::single("reply_to", PARENT_MISSING).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// A post with its full reply tree
    pub async fn retrieve(&self, caller: &Caller, id: PostId) -> Result<PostThread> {
        let post = self.load(id).await?;
        self.dispatcher
            .check(Resource::Post, Action::Retrieve, caller, &target_of(&post))?;

        self.load_thread(post).await
    }

    /// Edit a post's text. Owner and parent never change.
    pub async fn update(&self, caller: &Caller, id: PostId, payload: &Value) -> Result<Post> {
        let post = self.load(id).await?;
        let changes = self
            .dispatcher
            .dispatch(
                Resource::Post,
                Action::Update,
                caller,
                &target_of(&post),
                payload,
            )?
            .into_post_changes()?;

        if let Some(reply_to) = changes.reply_to {
            if reply_to != post.reply_to {
                return Err(read_only_error("reply_to").into());
            }
        }

        let Some(text) = changes.text else {
            return Ok(post);
        };

        let updated = self.store.update_post_text(id, text).await.map_err(|e| match e {
            PersistError::NotFound(_) => DispatchError::NotFound,
            other => other.into(),
        })?;

        tracing::info!(
            post_id = %id,
            by = caller.username().unwrap_or("<anonymous>"),
            "Post updated"
        );
        Ok(updated)
    }

    /// Newest first, each post with its replies
    pub async fn list(
        &self,
        caller: &Caller,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Page<PostThread>> {
        self.dispatcher
            .check(Resource::Post, Action::List, caller, &Target::None)?;

        let limit = self.config.page_size(limit);
        let mut posts = self.store.list_posts(limit + 1, offset).await?;
        let has_more = posts.len() > limit;
        posts.truncate(limit);

        let mut items = Vec::with_capacity(posts.len());
        for post in posts {
            items.push(self.load_thread(post).await?);
        }

        Ok(Page {
            items,
            offset,
            limit,
            has_more,
        })
    }

    async fn load(&self, id: PostId) -> Result<Post> {
        self.store.get_post(id).await?.ok_or(DispatchError::NotFound)
    }

    async fn load_thread(&self, root: Post) -> Result<PostThread> {
        let mut children: HashMap<PostId, Vec<Post>> = HashMap::new();
        let mut seen = HashSet::from([root.id]);
        let mut queue = VecDeque::from([root.id]);

        while let Some(parent) = queue.pop_front() {
            let replies = self.store.list_replies(parent).await?;
            let replies: Vec<Post> = replies
                .into_iter()
                .filter(|reply| seen.insert(reply.id))
                .collect();
            queue.extend(replies.iter().map(|reply| reply.id));
            if !replies.is_empty() {
                children.insert(parent, replies);
            }
        }

        Ok(assemble(root, &mut children))
    }
}

fn target_of(post: &Post) -> Target {
    Target::Post {
        id: post.id,
        owner: post.owner.clone(),
    }
}

fn assemble(post: Post, children: &mut HashMap<PostId, Vec<Post>>) -> PostThread {
    let replies = children
        .remove(&post.id)
        .unwrap_or_default()
        .into_iter()
        .map(|reply| assemble(reply, children))
        .collect();
    PostThread { post, replies }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_nests_replies_in_order() {
        let root = Post::new("alice", "root", None);
        let first = Post::new("bob", "first", Some(root.id));
        let second = Post::new("carol", "second", Some(root.id));
        let nested = Post::new("alice", "nested", Some(first.id));

        let mut children = HashMap::from([
            (root.id, vec![first.clone(), second.clone()]),
            (first.id, vec![nested.clone()]),
        ]);
        let thread = assemble(root.clone(), &mut children);

        assert_eq!(thread.post, root);
        assert_eq!(thread.replies.len(), 2);
        assert_eq!(thread.replies[0].post, first);
        assert_eq!(thread.replies[0].replies[0].post, nested);
        assert_eq!(thread.replies[1].post, second);
        assert_eq!(thread.descendant_count(), 3);
        assert!(children.is_empty());
    }
}
