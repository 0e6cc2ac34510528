use std::sync::Arc;

use dwitter_persist::{MemoryPersistenceClient, PersistError, PersistenceClient};
use dwitter_types::{Account, Post, Session, SessionToken};

fn store() -> Arc<dyn PersistenceClient> {
    Arc::new(MemoryPersistenceClient::new())
}

#[tokio::test]
async fn test_concurrent_signups_for_one_username_admit_exactly_one() {
    let store = store();

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .insert_account(Account::new("alice", format!("hash-{}", i)))
                .await
        }));
    }

    let mut inserted = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => inserted += 1,
            Err(PersistError::Duplicate(_)) => duplicates += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(inserted, 1);
    assert_eq!(duplicates, 15);
    assert_eq!(store.count_accounts().await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_logins_leave_one_active_token() {
    let store = store();

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let token = SessionToken::new(format!("token-{:02}", i));
            store.issue_session(Session::new(token, "alice")).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let mut live = 0;
    for i in 0..16 {
        if store.find_session(&format!("token-{:02}", i)).await.unwrap().is_some() {
            live += 1;
        }
    }
    assert_eq!(live, 1);

    assert!(store.revoke_session("alice").await.unwrap().is_some());
    assert!(store.revoke_session("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn test_replies_are_listed_oldest_first_and_only_direct() {
    let store = store();
    let root = Post::new("alice", "hello", None);
    let first = Post::new("bob", "first reply", Some(root.id));
    let nested = Post::new("alice", "nested", Some(first.id));
    let second = Post::new("carol", "second reply", Some(root.id));

    for post in [&root, &first, &nested, &second] {
        store.insert_post(post.clone()).await.unwrap();
    }

    let replies = store.list_replies(root.id).await.unwrap();
    assert_eq!(replies, vec![first, second]);
}

#[tokio::test]
async fn test_update_text_keeps_parent_and_owner() {
    let store = store();
    let root = Post::new("alice", "hello", None);
    let reply = Post::new("bob", "hi", Some(root.id));
    store.insert_post(root.clone()).await.unwrap();
    store.insert_post(reply.clone()).await.unwrap();

    let updated = store
        .update_post_text(reply.id, "hi there".to_string())
        .await
        .unwrap();

    assert_eq!(updated.text, "hi there");
    assert_eq!(updated.owner, "bob");
    assert_eq!(updated.reply_to, Some(root.id));
}
