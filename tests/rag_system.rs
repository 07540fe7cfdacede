//! End-to-end queries through the RAG facade with a scripted model.

mod common;

use common::{blocks, sample_index, text_response, tool_results, tool_use_response, ScriptedModel, COMPUTER_USE, MCP, PROMPT_COMPRESSION};
use coursemate::config::Settings;
use coursemate::llm::MessageContent;
use coursemate::rag::RagSystem;
use serde_json::json;

fn search_call(query: &str) -> coursemate::llm::MessageResponse {
    tool_use_response(vec![(
        "toolu_1",
        "search_course_content",
        json!({"query": query}),
    )])
}

#[tokio::test]
async fn content_question_returns_answer_and_sources() {
    let model = ScriptedModel::new(vec![
        search_call("What is computer use?"),
        text_response("Computer use lets a model operate a computer."),
    ]);
    let system = RagSystem::new(sample_index(5).await, model.clone(), &Settings::default());

    let response = system.query("What is computer use?", None).await.unwrap();

    assert_eq!(response.answer, "Computer use lets a model operate a computer.");
    assert!(!response.sources.is_empty());
    assert!(response.sources.iter().any(|s| s.text.starts_with(COMPUTER_USE)));

    let requests = model.requests();
    match &requests[0].messages[0].content {
        MessageContent::Text(text) => assert_eq!(
            text,
            "Answer this question about course materials: What is computer use?"
        ),
        MessageContent::Blocks(_) => panic!("expected plain prompt"),
    }

    let results = tool_results(&blocks(&requests[1], 2));
    assert!(results[0]
        .1
        .contains(&format!("[{} - Lesson", COMPUTER_USE)));
}

#[tokio::test]
async fn zero_max_results_yields_no_sources() {
    let model = ScriptedModel::new(vec![
        search_call("What is computer use?"),
        text_response("I could not find anything about that."),
    ]);
    let system = RagSystem::new(sample_index(0).await, model.clone(), &Settings::default());

    let response = system.query("What is computer use?", None).await.unwrap();

    assert!(response.sources.is_empty());
    let results = tool_results(&blocks(&model.requests()[1], 2));
    assert_eq!(results[0].1, "No relevant content found.");
    assert!(!results[0].2);
}

#[tokio::test]
async fn sources_do_not_leak_between_queries() {
    let model = ScriptedModel::new(vec![
        search_call("computer use"),
        text_response("first"),
        text_response("general knowledge answer"),
    ]);
    let system = RagSystem::new(sample_index(5).await, model, &Settings::default());

    let first = system.query("What is computer use?", None).await.unwrap();
    assert!(!first.sources.is_empty());

    let second = system.query("What is 2 + 2?", None).await.unwrap();
    assert_eq!(second.answer, "general knowledge answer");
    assert!(second.sources.is_empty());
}

#[tokio::test]
async fn session_history_feeds_next_query() {
    let model = ScriptedModel::new(vec![text_response("Hello!"), text_response("You said hi.")]);
    let system = RagSystem::new(sample_index(5).await, model.clone(), &Settings::default());
    let session = system.sessions().create_session();

    system.query("hi", Some(&session)).await.unwrap();
    system.query("what did I say?", Some(&session)).await.unwrap();

    let requests = model.requests();
    assert!(!requests[0]
        .system
        .as_deref()
        .unwrap()
        .contains("Previous conversation:"));
    assert!(requests[1]
        .system
        .as_deref()
        .unwrap()
        .ends_with("Previous conversation:\nUser: hi\nAssistant: Hello!"));
}

#[tokio::test]
async fn analytics_report_catalog() {
    let model = ScriptedModel::new(vec![]);
    let system = RagSystem::new(sample_index(5).await, model, &Settings::default());

    let analytics = system.course_analytics().await.unwrap();
    assert_eq!(analytics.total_courses, 3);
    assert_eq!(analytics.course_titles, vec![COMPUTER_USE, MCP, PROMPT_COMPRESSION]);
}

#[tokio::test]
async fn transport_error_propagates_from_query() {
    let model = ScriptedModel::new(vec![]);
    let system = RagSystem::new(sample_index(5).await, model, &Settings::default());

    assert!(system.query("anything", None).await.is_err());
}
