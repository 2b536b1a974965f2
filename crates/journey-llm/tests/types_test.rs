use journey_llm::{ChatOptions, ChatRequest, Message, Tool, ToolCall, ToolChoice};
use serde_json::json;

#[test]
fn test_message_roles() {
    assert_eq!(Message::system("You are helpful").role(), "system");
    assert_eq!(Message::human("Hello").role(), "user");
    assert_eq!(Message::ai("Hi there!").role(), "assistant");
    assert_eq!(Message::tool_result("call_1", "42").role(), "tool");
}

#[test]
fn test_human_message_serializes_as_user_role() {
    let json = serde_json::to_value(Message::human("Hello")).unwrap();
    assert_eq!(json, json!({"role": "user", "content": "Hello"}));
}

#[test]
fn test_ai_message_with_tools_omits_empty_content() {
    let msg = Message::ai_with_tools(
        Some(String::new()),
        vec![ToolCall::new("call_1", "book_appointment", "{}")],
    );
    let json = serde_json::to_value(&msg).unwrap();

    assert!(json.get("content").is_none());
    assert_eq!(json["tool_calls"][0]["function"]["name"], "book_appointment");
    assert_eq!(msg.text(), None);
}

#[test]
fn test_assistant_message_deserialization() {
    let msg: Message = serde_json::from_str(r#"{"role":"assistant","content":"Done"}"#).unwrap();
    assert_eq!(msg, Message::ai("Done"));
}

#[test]
fn test_tool_call_empty_arguments_are_an_empty_object() {
    let call = ToolCall::new("call_1", "get_conversation_data", "  ");
    assert_eq!(call.arguments_value().unwrap(), json!({}));
}

#[test]
fn test_tool_call_invalid_arguments_error() {
    let call = ToolCall::new("call_1", "onboard_customer", "{not json");
    assert!(call.arguments_value().is_err());
}

#[test]
fn test_tool_choice_serialization() {
    assert_eq!(serde_json::to_value(ToolChoice::auto()).unwrap(), json!("auto"));
    assert_eq!(
        serde_json::to_value(ToolChoice::force("summarize_conversation")).unwrap(),
        json!({"type": "function", "function": {"name": "summarize_conversation"}})
    );
}

#[test]
fn test_chat_options_skip_empty_tool_list() {
    let options = ChatOptions::new().tools(Vec::new());
    assert!(options.tools.is_none());

    let options = ChatOptions::new().tools(vec![Tool::function("a", "b", json!({}))]);
    assert_eq!(options.tools.map(|t| t.len()), Some(1));
}

#[test]
fn test_chat_request_with_options() {
    let request = ChatRequest::new("gpt-4o-mini", vec![Message::human("Hello")])
        .with_options(ChatOptions::new().temperature(0.7).max_tokens(100));

    assert_eq!(request.model, "gpt-4o-mini");
    assert_eq!(request.options.temperature, Some(0.7));
    assert_eq!(request.options.max_tokens, Some(100));
}
