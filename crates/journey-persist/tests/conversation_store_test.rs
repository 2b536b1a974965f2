use std::sync::Arc;

use journey_persist::{ConversationStore, InMemoryConversationStore, DEFAULT_THREAD_NAME};
use journey_types::{ChatMessage, MessageRole};

#[tokio::test]
async fn test_threads_are_isolated() {
    let store = InMemoryConversationStore::new();
    store.append("a", ChatMessage::human("for a")).await.unwrap();
    store.append("b", ChatMessage::human("for b")).await.unwrap();

    let a = store.history("a").await.unwrap();
    assert_eq!(a.len(), 1);
    assert_eq!(a[0].text(), "for a");
}

#[tokio::test]
async fn test_concurrent_appends_are_all_kept() {
    let store: Arc<dyn ConversationStore> = Arc::new(InMemoryConversationStore::new());

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .append("shared", ChatMessage::human(format!("msg {}", i)))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let history = store.history("shared").await.unwrap();
    assert_eq!(history.len(), 20);
    assert!(history.iter().all(|m| m.role == MessageRole::Human));
}

#[tokio::test]
async fn test_session_tracks_first_human_message() {
    let store = InMemoryConversationStore::new();
    store.append("t", ChatMessage::assistant("Welcome!")).await.unwrap();
    store
        .append("t", ChatMessage::human("I need to cut my cloud spend"))
        .await
        .unwrap();

    let session = store.get_or_create_session("t").await.unwrap();
    assert!(session.has_default_name());
    assert_eq!(session.thread_name, DEFAULT_THREAD_NAME);
    assert_eq!(
        session.first_human_message().map(|m| m.text()),
        Some("I need to cut my cloud spend")
    );
}
