// ABOUTME: Integration tests for conversation and message persistence
// ABOUTME: Covers forgiving conversation resolution, append ordering, and validation bounds

mod helpers;

use helpers::test_database;
use taskbot_server::errors::ErrorCode;
use taskbot_server::llm::MessageRole;

#[tokio::test]
async fn test_resolve_or_create_without_id_creates_fresh() {
    let db = test_database().await;
    let chat = db.database.chat();

    let conversation = chat.resolve_or_create(None, "user-a").await.unwrap();
    assert_eq!(conversation.user_id, "user-a");
    assert!(conversation.title.is_none());

    let again = chat
        .resolve_or_create(Some(&conversation.id), "user-a")
        .await
        .unwrap();
    assert_eq!(again.id, conversation.id);
}

#[tokio::test]
async fn test_resolve_or_create_unknown_id_is_not_an_error() {
    let db = test_database().await;
    let chat = db.database.chat();

    let conversation = chat
        .resolve_or_create(Some("does-not-exist"), "user-a")
        .await
        .unwrap();
    assert_ne!(conversation.id, "does-not-exist");
    assert_eq!(conversation.user_id, "user-a");
}

#[tokio::test]
async fn test_resolve_or_create_foreign_id_starts_new_conversation() {
    let db = test_database().await;
    let chat = db.database.chat();

    let owned_by_b = chat.create_conversation("user-b").await.unwrap();
    let resolved = chat
        .resolve_or_create(Some(&owned_by_b.id), "user-a")
        .await
        .unwrap();

    assert_ne!(resolved.id, owned_by_b.id);
    assert_eq!(resolved.user_id, "user-a");

    // user-b's conversation is untouched
    let messages = chat.get_messages(&owned_by_b.id).await.unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn test_append_preserves_order() {
    let db = test_database().await;
    let chat = db.database.chat();
    let conversation = chat.create_conversation("user-a").await.unwrap();

    for i in 0..5 {
        let role = if i % 2 == 0 {
            MessageRole::User
        } else {
            MessageRole::Assistant
        };
        chat.append_message(&conversation.id, role, &format!("message {i}"))
            .await
            .unwrap();
    }

    let messages = chat.get_messages(&conversation.id).await.unwrap();
    assert_eq!(messages.len(), 5);
    for (i, message) in messages.iter().enumerate() {
        assert_eq!(message.content, format!("message {i}"));
    }
    assert_eq!(messages[0].role, "user");
    assert_eq!(messages[1].role, "assistant");
}

#[tokio::test]
async fn test_concurrent_appends_serialize_without_interleaving() {
    let db = test_database().await;
    let chat = db.database.chat();
    let conversation = chat.create_conversation("user-a").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let database = db.database.clone();
        let conversation_id = conversation.id.clone();
        handles.push(tokio::spawn(async move {
            database
                .chat()
                .append_message(&conversation_id, MessageRole::User, &format!("message {i}"))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let messages = chat.get_messages(&conversation.id).await.unwrap();
    assert_eq!(messages.len(), 8);

    // Every append landed exactly once
    let mut contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
    contents.sort_unstable();
    let expected: Vec<String> = (0..8).map(|i| format!("message {i}")).collect();
    assert_eq!(contents, expected.iter().map(String::as_str).collect::<Vec<_>>());

    // Read order never inverts creation order
    for pair in messages.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
    }

    // Two reads agree on the order
    let reread = chat.get_messages(&conversation.id).await.unwrap();
    let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
    let reread_ids: Vec<&str> = reread.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, reread_ids);
}

#[tokio::test]
async fn test_append_validates_user_message_bounds() {
    let db = test_database().await;
    let chat = db.database.chat();
    let conversation = chat.create_conversation("user-a").await.unwrap();

    let err = chat
        .append_message(&conversation.id, MessageRole::User, "   ")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let at_limit = "a".repeat(2000);
    chat.append_message(&conversation.id, MessageRole::User, &at_limit)
        .await
        .unwrap();

    let over_limit = "a".repeat(2001);
    let err = chat
        .append_message(&conversation.id, MessageRole::User, &over_limit)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    // Assistant replies are not capped at the user limit
    let long_reply = "b".repeat(5000);
    chat.append_message(&conversation.id, MessageRole::Assistant, &long_reply)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_append_trims_whitespace() {
    let db = test_database().await;
    let chat = db.database.chat();
    let conversation = chat.create_conversation("user-a").await.unwrap();

    let record = chat
        .append_message(&conversation.id, MessageRole::User, "  hello there  ")
        .await
        .unwrap();
    assert_eq!(record.content, "hello there");
}

#[tokio::test]
async fn test_append_to_missing_conversation_fails() {
    let db = test_database().await;
    let chat = db.database.chat();

    let err = chat
        .append_message("no-such-conversation", MessageRole::User, "hello")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DatabaseError);
}

#[tokio::test]
async fn test_history_is_strict_about_ownership() {
    let db = test_database().await;
    let chat = db.database.chat();
    let conversation = chat.create_conversation("user-a").await.unwrap();
    chat.append_message(&conversation.id, MessageRole::User, "hi")
        .await
        .unwrap();

    let messages = chat.history(&conversation.id, "user-a").await.unwrap();
    assert_eq!(messages.len(), 1);

    let err = chat.history(&conversation.id, "user-b").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let err = chat.history("missing", "user-a").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_list_conversations_scoped_and_counted() {
    let db = test_database().await;
    let chat = db.database.chat();

    let first = chat.create_conversation("user-a").await.unwrap();
    chat.append_message(&first.id, MessageRole::User, "one")
        .await
        .unwrap();
    chat.append_message(&first.id, MessageRole::Assistant, "reply")
        .await
        .unwrap();

    let second = chat.create_conversation("user-a").await.unwrap();
    chat.append_message(&second.id, MessageRole::User, "two")
        .await
        .unwrap();

    chat.create_conversation("user-b").await.unwrap();

    let conversations = chat.list_conversations("user-a", 20, 0).await.unwrap();
    assert_eq!(conversations.len(), 2);

    // Most recently updated first
    assert_eq!(conversations[0].id, second.id);
    assert_eq!(conversations[0].message_count, 1);
    assert_eq!(conversations[1].id, first.id);
    assert_eq!(conversations[1].message_count, 2);
}

#[tokio::test]
async fn test_state_survives_reconnect() {
    let db = test_database().await;
    let url = db.url();

    let conversation_id = {
        let chat = db.database.chat();
        let conversation = chat.create_conversation("user-a").await.unwrap();
        chat.append_message(&conversation.id, MessageRole::User, "remember me")
            .await
            .unwrap();
        conversation.id
    };

    // A second connection over the same file sees everything
    let reopened = taskbot_server::database::Database::new(&url).await.unwrap();
    let messages = reopened
        .chat()
        .history(&conversation_id, "user-a")
        .await
        .unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "remember me");
}
