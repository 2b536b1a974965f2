use futures::StreamExt;
use journey_llm::{ChatClient, ChatRequest, Message, OpenAIClient, StreamEvent};

#[tokio::test]
async fn test_chat_parses_completion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "chatcmpl-1",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Cloud Cost Review"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
            }"#,
        )
        .create_async()
        .await;

    let client = OpenAIClient::new("sk-test").unwrap().with_base_url(server.url());
    let response = client
        .chat(ChatRequest::new("gpt-4o-mini", vec![Message::human("Title?")]))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.text(), Some("Cloud Cost Review"));
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(13));
}

#[tokio::test]
async fn test_chat_surfaces_http_errors() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let client = OpenAIClient::new("sk-test").unwrap().with_base_url(server.url());
    let err = client
        .chat(ChatRequest::new("gpt-4o-mini", vec![Message::human("hi")]))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn test_chat_stream_reads_sse_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"},\"finish_reason\":null}]}\n\n",
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
            "data: [DONE]\n\n",
        ))
        .create_async()
        .await;

    let client = OpenAIClient::new("sk-test").unwrap().with_base_url(server.url());
    let stream = client
        .chat_stream(ChatRequest::new("gpt-4o-mini", vec![Message::human("hi")]))
        .await
        .unwrap();
    let events: Vec<StreamEvent> = stream.map(|e| e.unwrap()).collect().await;

    assert_eq!(events[0], StreamEvent::Message { content: "Hi".into() });
    assert!(events
        .iter()
        .any(|e| matches!(e, StreamEvent::Done { finish_reason: Some(r) } if r == "stop")));
}
