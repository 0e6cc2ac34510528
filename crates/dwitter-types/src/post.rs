use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PostId = Uuid;

/// A single user-authored message, optionally a reply to another post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub owner: String,
    pub text: String,
    #[serde(default)]
    pub reply_to: Option<PostId>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(owner: impl Into<String>, text: impl Into<String>, reply_to: Option<PostId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            text: text.into(),
            reply_to,
            created_at: Utc::now(),
        }
    }
}

/// A post together with its reply tree, replies oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostThread {
    #[serde(flatten)]
    pub post: Post,
    #[serde(default)]
    pub replies: Vec<PostThread>,
}

impl PostThread {
    pub fn leaf(post: Post) -> Self {
        Self {
            post,
            replies: Vec::new(),
        }
    }

    /// Number of posts in the tree below this one
    pub fn descendant_count(&self) -> usize {
        self.replies
            .iter()
            .map(|reply| 1 + reply.descendant_count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_serializes_flat_with_replies() {
        let root = Post::new("alice", "hello", None);
        let reply = Post::new("bob", "hi", Some(root.id));
        let thread = PostThread {
            post: root.clone(),
            replies: vec![PostThread::leaf(reply)],
        };

        let json = serde_json::to_value(&thread).unwrap();
        assert_eq!(json["text"], "hello");
        assert_eq!(json["replies"][0]["owner"], "bob");
        assert_eq!(json["replies"][0]["reply_to"], root.id.to_string());
    }

    #[test]
    fn test_descendant_count() {
        let root = Post::new("alice", "a", None);
        let child = Post::new("bob", "b", Some(root.id));
        let grandchild = Post::new("carol", "c", Some(child.id));
        let thread = PostThread {
            post: root,
            replies: vec![PostThread {
                post: child,
                replies: vec![PostThread::leaf(grandchild)],
            }],
        };

        assert_eq!(thread.descendant_count(), 2);
    }
}
