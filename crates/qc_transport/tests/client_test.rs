use std::time::Duration;

use assert_matches::assert_matches;
use futures::StreamExt as _;
use indoc::indoc;
use pretty_assertions::assert_eq;
use qc_source::{Locator, SourceRef};
use qc_test::{
    bot_slug,
    mock::{SseBody, SseServer},
};
use qc_transport::{CancellationToken, ChatRequest, Client, Session, StreamEvent, Transport as _};
use serde_json::json;

async fn collect(client: &Client, request: &ChatRequest) -> Vec<StreamEvent> {
    client
        .open(request, CancellationToken::new())
        .collect()
        .await
}

#[test_log::test(tokio::test)]
async fn test_refund_policy_answer() {
    let bot = bot_slug!();
    let server = SseServer::start().await;
    let body = SseBody::new()
        .chunk("Refunds are allowed within 30 days")
        .chunk(" [1].")
        .done_with_sources(json!([{
            "document_name": "policy.pdf",
            "location": { "page": 2 },
            "snippet": "Refunds within 30 days of purchase."
        }]));

    let mock = server
        .stream_for_request(
            &bot,
            json!({ "message": "What is the refund policy?" }),
            body,
        )
        .await;

    let client = Client::new(&server.base_url()).unwrap();
    let events = collect(&client, &ChatRequest::new(&bot, "What is the refund policy?")).await;

    mock.assert_async().await;
    assert_eq!(events, vec![
        StreamEvent::text("Refunds are allowed within 30 days"),
        StreamEvent::text(" [1]."),
        StreamEvent::sources(vec![
            SourceRef::new("policy.pdf")
                .with_location(Locator::Page(2))
                .with_excerpt("Refunds within 30 days of purchase.")
        ]),
        StreamEvent::End,
    ]);
}

#[test_log::test(tokio::test)]
async fn test_chat_id_is_sent() {
    let bot = bot_slug!();
    let server = SseServer::start().await;
    let mock = server
        .stream_for_request(
            &bot,
            json!({ "message": "Hi", "chat_id": 9 }),
            SseBody::new().done(),
        )
        .await;

    let client = Client::new(&server.base_url()).unwrap();
    let request = ChatRequest::new(&bot, "Hi").with_chat_id(Some(9));

    assert_eq!(collect(&client, &request).await, vec![StreamEvent::End]);
    mock.assert_async().await;
}

#[test_log::test(tokio::test)]
async fn test_raw_event_stream_framing() {
    let bot = bot_slug!();
    let server = SseServer::start().await;
    let body = indoc! {r#"
        : keep-alive

        event: message
        data: {"chunk": "multi"}

        data: {"chunk":
        data:  " line"}

        data: {"chat_id": 4}

        data: [DONE]

    "#};
    server.stream(&bot, body).await;

    let client = Client::new(&server.base_url()).unwrap();
    assert_eq!(collect(&client, &ChatRequest::new(&bot, "Hi")).await, vec![
        StreamEvent::text("multi"),
        StreamEvent::text(" line"),
        StreamEvent::End,
    ]);
}

#[test_log::test(tokio::test)]
async fn test_backend_error_frame() {
    let bot = bot_slug!();
    let server = SseServer::start().await;
    server
        .stream(&bot, SseBody::new().chunk("partial").error("upstream timeout"))
        .await;

    let client = Client::new(&server.base_url()).unwrap();
    assert_eq!(collect(&client, &ChatRequest::new(&bot, "X")).await, vec![
        StreamEvent::text("partial"),
        StreamEvent::error("upstream timeout"),
    ]);
}

#[test_log::test(tokio::test)]
async fn test_nothing_is_read_after_end() {
    let bot = bot_slug!();
    let server = SseServer::start().await;
    server
        .stream(
            &bot,
            SseBody::new().chunk("done").done().chunk("late").raw("data: {oops\n\n"),
        )
        .await;

    let client = Client::new(&server.base_url()).unwrap();
    assert_eq!(collect(&client, &ChatRequest::new(&bot, "Hi")).await, vec![
        StreamEvent::text("done"),
        StreamEvent::End,
    ]);
}

#[test_log::test(tokio::test)]
async fn test_malformed_frame_ends_the_stream() {
    let bot = bot_slug!();
    let server = SseServer::start().await;
    server
        .stream(
            &bot,
            SseBody::new().chunk("ok").raw("data: {oops\n\n").chunk("never").done(),
        )
        .await;

    let client = Client::new(&server.base_url()).unwrap();
    let events = collect(&client, &ChatRequest::new(&bot, "Hi")).await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0], StreamEvent::text("ok"));
    assert_matches!(&events[1], StreamEvent::Error { message } if message.starts_with("malformed frame"));
}

#[test_log::test(tokio::test)]
async fn test_truncated_stream_is_an_error() {
    let bot = bot_slug!();
    let server = SseServer::start().await;
    server.stream(&bot, SseBody::new().chunk("cut off")).await;

    let client = Client::new(&server.base_url()).unwrap();
    assert_eq!(collect(&client, &ChatRequest::new(&bot, "Hi")).await, vec![
        StreamEvent::text("cut off"),
        StreamEvent::error(Session::UNEXPECTED_END),
    ]);
}

#[test_log::test(tokio::test)]
async fn test_unterminated_final_frame_is_decoded() {
    let bot = bot_slug!();
    let server = SseServer::start().await;
    server
        .stream(&bot, r#"data: {"chunk": "a", "done": true}"#)
        .await;

    let client = Client::new(&server.base_url()).unwrap();
    assert_eq!(collect(&client, &ChatRequest::new(&bot, "Hi")).await, vec![
        StreamEvent::text("a"),
        StreamEvent::End,
    ]);
}

#[test_log::test(tokio::test)]
async fn test_complete_json_answer() {
    let bot = bot_slug!();
    let server = SseServer::start().await;
    server
        .complete(
            &bot,
            json!({
                "message": "I cannot find information about this in the provided documents.",
                "sources": [],
                "chat_id": 3
            }),
        )
        .await;

    let client = Client::new(&server.base_url()).unwrap();
    assert_eq!(collect(&client, &ChatRequest::new(&bot, "Hi")).await, vec![
        StreamEvent::text("I cannot find information about this in the provided documents."),
        StreamEvent::sources(Vec::<SourceRef>::new()),
        StreamEvent::End,
    ]);
}

#[test_log::test(tokio::test)]
async fn test_complete_json_answer_with_sources() {
    let bot = bot_slug!();
    let server = SseServer::start().await;
    server
        .complete(
            &bot,
            json!({
                "message": "See [1].",
                "sources": [{ "filename": "faq.docx", "location": { "paragraph": 4 } }],
                "chat_id": 3
            }),
        )
        .await;

    let client = Client::new(&server.base_url()).unwrap();
    assert_eq!(collect(&client, &ChatRequest::new(&bot, "Hi")).await, vec![
        StreamEvent::text("See [1]."),
        StreamEvent::sources(vec![
            SourceRef::new("faq.docx").with_location(Locator::Paragraph(4))
        ]),
        StreamEvent::End,
    ]);
}

#[test_log::test(tokio::test)]
async fn test_complete_json_answer_must_have_a_message() {
    let bot = bot_slug!();
    let server = SseServer::start().await;
    server.complete(&bot, json!({ "detail": "nope" })).await;

    let client = Client::new(&server.base_url()).unwrap();
    let events = collect(&client, &ChatRequest::new(&bot, "Hi")).await;

    assert_matches!(events.as_slice(), [StreamEvent::Error { message }] if message.starts_with("malformed frame"));
}

#[test_log::test(tokio::test)]
async fn test_http_error_status() {
    let bot = bot_slug!();
    let server = SseServer::start().await;
    server.fail(&bot, 404, "Bot not found").await;

    let client = Client::new(&server.base_url()).unwrap();
    assert_eq!(collect(&client, &ChatRequest::new(&bot, "Hi")).await, vec![
        StreamEvent::error("API error (status 404): Bot not found"),
    ]);
}

#[test_log::test(tokio::test)]
async fn test_connection_refused() {
    // Nothing listens on the discard port.
    let client = Client::new("http://127.0.0.1:9").unwrap();
    let events = collect(&client, &ChatRequest::new("bot", "Hi")).await;

    assert_eq!(events.len(), 1);
    assert_matches!(&events[0], StreamEvent::Error { message } if message.starts_with("Request error"));
}

#[test_log::test(tokio::test)]
async fn test_idle_timeout() {
    let bot = bot_slug!();
    let server = SseServer::start().await;
    server
        .stream_delayed(&bot, SseBody::new().done(), Duration::from_secs(5))
        .await;

    let client = Client::with_timeouts(
        &server.base_url(),
        Duration::from_secs(1),
        Duration::from_millis(100),
    )
    .unwrap();

    let events = collect(&client, &ChatRequest::new(&bot, "Hi")).await;
    assert_eq!(events.len(), 1);
    assert_matches!(&events[0], StreamEvent::Error { message } if message.starts_with("timed out"));
}

#[test_log::test(tokio::test)]
async fn test_cancel_before_response() {
    let bot = bot_slug!();
    let server = SseServer::start().await;
    server
        .stream_delayed(&bot, SseBody::new().done(), Duration::from_secs(5))
        .await;

    let client = Client::new(&server.base_url()).unwrap();
    let token = CancellationToken::new();
    let mut session = client.open(&ChatRequest::new(&bot, "Hi"), token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let next = tokio::time::timeout(Duration::from_secs(2), session.next()).await;
    canceller.await.unwrap();

    assert_eq!(next.unwrap(), None);
    assert!(session.is_finished());
}
