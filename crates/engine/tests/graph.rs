//! Routing graph runs driven by a scripted model and a mock catalog.

mod common;

use common::*;
use mockito::{Matcher, Server};
use serde_json::json;
use shelfwise_engine::agent::{AfterTools, ConversationStep, Graph, Node};
use shelfwise_engine::events::{self, ChatEvent};
use shelfwise_shared::{Message, Role, ToolCall};

fn search_call(id: &str, query: &str) -> ToolCall {
    ToolCall::new(id, "catalog_search", json!({ "query": query }))
}

#[tokio::test]
async fn plain_reply_ends_without_tools() {
    let model = ScriptedModel::new(vec![Message::assistant("Hello! What book are you after?")]);
    let tools = toolbox("http://127.0.0.1:1");
    let config = graph_config(AfterTools::Both);
    let graph = Graph::new(ConversationStep::new(&model, Some("persona"), tools.tools()), &tools, &config);

    let outcome = graph.run(vec![Message::user("hi")], None).await.unwrap();

    assert_eq!(outcome.trace, vec![Node::Conversation, Node::End]);
    assert_eq!(outcome.tool_runs(), 0);
    assert_eq!(outcome.messages.len(), 2);
    assert_eq!(outcome.final_text(), Some("Hello! What book are you after?"));
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn tool_call_runs_named_tool_and_returns_to_conversation() {
    let mut server = Server::new_async().await;
    let catalog = server
        .mock("GET", "/v2/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "Dune".into()),
            Matcher::UrlEncoded("searchType".into(), "smart".into()),
        ]))
        .with_status(200)
        .with_body(results_page(&["Dune"]))
        .expect(1)
        .create_async()
        .await;

    let model = ScriptedModel::new(vec![
        Message::tool_request(vec![search_call("call_1", "Dune")]),
        Message::assistant("Dune is available now."),
    ]);
    let tools = toolbox(&server.url());
    let config = graph_config(AfterTools::Conversation);
    let graph = Graph::new(ConversationStep::new(&model, Some("persona"), tools.tools()), &tools, &config);

    let outcome = graph.run(vec![Message::user("find Dune")], None).await.unwrap();

    assert_eq!(
        outcome.trace,
        vec![Node::Conversation, Node::Tools, Node::Conversation, Node::End]
    );
    let roles: Vec<Role> = outcome.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::Tool, Role::Assistant]);

    let result = &outcome.messages[2];
    assert_eq!(result.tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(
        result.content.as_deref(),
        Some("--- Result 1 ---\nDune\nAvailable now")
    );
    assert_eq!(outcome.final_text(), Some("Dune is available now."));

    // The second model call sees the system prompt, the request and the tool result.
    let second = model.history(1);
    assert_eq!(second[0], Message::system("persona"));
    assert_eq!(second.last().unwrap().role, Role::Tool);

    catalog.assert_async().await;
}

#[tokio::test]
async fn dual_edges_give_conversation_precedence() {
    let model = ScriptedModel::new(vec![
        Message::tool_request(vec![search_call("call_1", "Dune")]),
        Message::assistant("The catalog is unreachable right now."),
    ]);
    let tools = toolbox("http://127.0.0.1:1");
    let config = graph_config(AfterTools::Both);
    let graph = Graph::new(ConversationStep::new(&model, None, tools.tools()), &tools, &config);

    let outcome = graph.run(vec![Message::user("find Dune")], None).await.unwrap();

    assert_eq!(
        outcome.trace,
        vec![Node::Conversation, Node::Tools, Node::Conversation, Node::End]
    );
    assert_eq!(model.calls(), 2);
    let failure = outcome.messages[2].content.as_deref().unwrap();
    assert!(failure.starts_with("Failed to fetch search results"));
}

#[tokio::test]
async fn end_edge_terminates_after_tools() {
    let model = ScriptedModel::new(vec![Message::tool_request(vec![search_call("call_1", "Dune")])]);
    let tools = toolbox("http://127.0.0.1:1");
    let config = graph_config(AfterTools::End);
    let graph = Graph::new(ConversationStep::new(&model, None, tools.tools()), &tools, &config);

    let outcome = graph.run(vec![Message::user("find Dune")], None).await.unwrap();

    assert_eq!(outcome.trace, vec![Node::Conversation, Node::Tools, Node::End]);
    assert_eq!(model.calls(), 1);
    assert_eq!(outcome.messages.last().unwrap().role, Role::Tool);
    assert_eq!(outcome.final_text(), None);
}

#[tokio::test]
async fn every_call_gets_one_correlated_result_in_order() {
    let model = ScriptedModel::new(vec![
        Message::tool_request(vec![
            search_call("", "Dune"),
            ToolCall::new("call_b", "multiply", json!({ "a": 2, "b": 3 })),
            ToolCall::new("call_c", "catalog_call_number", json!({ "title": "Dune" })),
        ]),
        Message::assistant("done"),
    ]);
    let tools = toolbox("http://127.0.0.1:1");
    let config = graph_config(AfterTools::Conversation);
    let graph = Graph::new(ConversationStep::new(&model, None, tools.tools()), &tools, &config);

    let outcome = graph.run(vec![Message::user("go")], None).await.unwrap();

    let request = &outcome.messages[1];
    let ids: Vec<String> = request.calls().iter().map(|c| c.id.clone()).collect();
    assert!(ids[0].starts_with("call_"));

    let results: Vec<&Message> = outcome.messages.iter().filter(|m| m.role == Role::Tool).collect();
    assert_eq!(results.len(), 3);
    for (result, id) in results.iter().zip(&ids) {
        assert_eq!(result.tool_call_id.as_ref(), Some(id));
    }
    assert!(results[1].content.as_deref().unwrap().contains("multiply is not a valid tool"));
}

#[tokio::test]
async fn undecodable_arguments_are_answered_and_the_run_continues() {
    let model = ScriptedModel::new(vec![
        Message::tool_request(vec![ToolCall::new("call_1", "catalog_search", json!("{\"query\": \"Du"))]),
        Message::assistant("Could you repeat the title?"),
    ]);
    let tools = toolbox("http://127.0.0.1:1");
    let config = graph_config(AfterTools::Both);
    let graph = Graph::new(ConversationStep::new(&model, None, tools.tools()), &tools, &config);

    let outcome = graph.run(vec![Message::user("find Dune")], None).await.unwrap();

    let result = &outcome.messages[2];
    assert_eq!(result.role, Role::Tool);
    assert_eq!(result.tool_call_id.as_deref(), Some("call_1"));
    assert!(result
        .content
        .as_deref()
        .unwrap()
        .starts_with("Error: invalid arguments for catalog_search"));
    assert_eq!(outcome.final_text(), Some("Could you repeat the title?"));
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn recursion_limit_stops_endless_tool_loops() {
    let model = ScriptedModel::repeating(Message::tool_request(vec![search_call("call_x", "Dune")]));
    let tools = toolbox("http://127.0.0.1:1");
    let mut config = graph_config(AfterTools::Both);
    config.max_steps = 3;
    let graph = Graph::new(ConversationStep::new(&model, None, tools.tools()), &tools, &config);

    let err = graph.run(vec![Message::user("loop")], None).await.unwrap_err();

    assert!(err.to_string().contains("recursion limit of 3"));
    assert_eq!(model.calls(), 3);
}

#[tokio::test]
async fn model_failure_propagates() {
    let model = ScriptedModel::with_results(vec![Err("model returned 401 Unauthorized".into())]);
    let tools = toolbox("http://127.0.0.1:1");
    let config = graph_config(AfterTools::Both);
    let graph = Graph::new(ConversationStep::new(&model, None, tools.tools()), &tools, &config);

    let err = graph.run(vec![Message::user("hi")], None).await.unwrap_err();

    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn tool_progress_is_reported_to_events() {
    let model = ScriptedModel::new(vec![
        Message::tool_request(vec![search_call("call_1", "Dune")]),
        Message::assistant("sorry"),
    ]);
    let tools = toolbox("http://127.0.0.1:1");
    let config = graph_config(AfterTools::Both);
    let graph = Graph::new(ConversationStep::new(&model, None, tools.tools()), &tools, &config);
    let (sender, mut rx) = events::channel();

    graph.run(vec![Message::user("find Dune")], Some(&sender)).await.unwrap();
    drop(sender);

    let mut seen = Vec::new();
    while let Some(event) = rx.recv().await {
        seen.push(event);
    }

    assert_eq!(seen.len(), 2);
    assert!(matches!(&seen[0], ChatEvent::ToolCall { id, tool, .. } if id == "call_1" && tool == "catalog_search"));
    assert!(matches!(&seen[1], ChatEvent::ToolResult { id, truncated: false, .. } if id == "call_1"));
}

#[tokio::test]
async fn offered_tools_match_the_toolbox() {
    let model = ScriptedModel::new(vec![Message::assistant("ok")]);
    let tools = toolbox("http://127.0.0.1:1");
    let config = graph_config(AfterTools::Both);
    let graph = Graph::new(ConversationStep::new(&model, None, tools.tools()), &tools, &config);

    graph.run(vec![Message::user("hi")], None).await.unwrap();

    assert_eq!(
        *model.offered_tools.lock().unwrap(),
        vec!["catalog_search".to_string(), "catalog_call_number".to_string()]
    );
}
