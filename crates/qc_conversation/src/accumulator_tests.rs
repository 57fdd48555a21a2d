use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use qc_source::{Locator, SourceRef};

use super::*;
use crate::Role;

fn refund_sources() -> Vec<SourceRef> {
    vec![
        SourceRef::new("policy.pdf")
            .with_location(Locator::Page(2))
            .with_headings(["Refunds"])
            .with_excerpt("Refunds are accepted within 30 days."),
        SourceRef::new("faq.docx").with_location(Locator::Paragraph(4)),
    ]
}

fn submitted(accumulator: &mut MessageAccumulator, text: &str) -> Submitted {
    let submitted = accumulator.submit(text).unwrap();
    accumulator.session_opened();
    submitted
}

#[test_log::test]
fn test_submit_appends_user_turn_and_placeholder() {
    let mut accumulator = MessageAccumulator::new();
    let submitted = accumulator.submit("  What is the refund window?\n").unwrap();

    assert_eq!(submitted.utterance, "What is the refund window?");
    assert_eq!(accumulator.state(), State::Composing);

    let turns = accumulator.conversation().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].id(), submitted.user);
    assert_eq!(turns[0].role(), Role::User);
    assert_eq!(turns[0].text(), "What is the refund window?");
    assert!(!turns[0].is_in_flight());

    assert_eq!(turns[1].id(), submitted.assistant);
    assert_eq!(turns[1].role(), Role::Assistant);
    assert_eq!(turns[1].text(), "");
    assert!(turns[1].is_in_flight());
    assert!(submitted.user < submitted.assistant);

    accumulator.session_opened();
    assert_eq!(accumulator.state(), State::AwaitingFirstByte);
}

#[test_log::test]
fn test_submit_rejects_blank_text() {
    let mut accumulator = MessageAccumulator::new();

    assert_eq!(accumulator.submit(""), Err(Rejection::Empty));
    assert_eq!(accumulator.submit(" \t\n "), Err(Rejection::Empty));
    assert!(accumulator.conversation().is_empty());
    assert_eq!(accumulator.state(), State::Idle);
}

#[test_log::test]
fn test_submit_rejects_while_in_flight() {
    let mut accumulator = MessageAccumulator::new();
    submitted(&mut accumulator, "first");
    accumulator.apply(StreamEvent::text("partial"));

    assert_eq!(accumulator.submit("second"), Err(Rejection::Busy));
    assert_eq!(accumulator.conversation().len(), 2);
    assert_eq!(accumulator.state(), State::Accumulating);
    assert_eq!(accumulator.in_flight().map(Turn::text), Some("partial"));
}

#[test_log::test]
fn test_refund_answer_with_sources() {
    let mut accumulator = MessageAccumulator::new();
    let submitted = submitted(&mut accumulator, "What is the refund window?");

    for event in [
        StreamEvent::text("Refunds are accepted within "),
        StreamEvent::text("30 days [1]."),
        StreamEvent::sources(refund_sources()),
    ] {
        assert_eq!(accumulator.apply(event), Step::Continue);
    }

    assert_eq!(
        accumulator.apply(StreamEvent::End),
        Step::Finalized(submitted.assistant)
    );
    assert_eq!(accumulator.state(), State::Idle);
    assert!(accumulator.in_flight().is_none());

    let turn = accumulator.conversation().get(submitted.assistant).unwrap();
    assert_eq!(turn.text(), "Refunds are accepted within 30 days [1].");
    assert_eq!(turn.sources().as_slice(), refund_sources().as_slice());
    assert!(!turn.is_in_flight());
}

#[test_log::test]
fn test_sources_before_text() {
    let mut accumulator = MessageAccumulator::new();
    let submitted = submitted(&mut accumulator, "Where is this defined?");

    assert_eq!(
        accumulator.apply(StreamEvent::sources(refund_sources())),
        Step::Continue
    );
    assert_eq!(accumulator.state(), State::Accumulating);

    accumulator.apply(StreamEvent::text("See [2]."));
    accumulator.apply(StreamEvent::End);

    let turn = accumulator.conversation().get(submitted.assistant).unwrap();
    assert_eq!(turn.text(), "See [2].");
    assert_eq!(turn.sources().len(), 2);
}

#[test_log::test]
fn test_later_source_list_replaces_earlier() {
    let mut accumulator = MessageAccumulator::new();
    let submitted = submitted(&mut accumulator, "question");

    accumulator.apply(StreamEvent::sources(refund_sources()));
    accumulator.apply(StreamEvent::sources(vec![SourceRef::new("only.md")]));
    accumulator.apply(StreamEvent::End);

    let turn = accumulator.conversation().get(submitted.assistant).unwrap();
    assert_eq!(turn.sources().as_slice(), &[SourceRef::new("only.md")]);
}

#[test_log::test]
fn test_error_discards_partial_answer() {
    let mut accumulator = MessageAccumulator::new();
    let submitted = submitted(&mut accumulator, "What is the refund window?");

    accumulator.apply(StreamEvent::text("Refunds are"));
    accumulator.apply(StreamEvent::sources(refund_sources()));

    assert_eq!(
        accumulator.apply(StreamEvent::error("timed out")),
        Step::Failed("timed out".to_owned())
    );
    assert_eq!(accumulator.state(), State::Idle);

    let turns = accumulator.conversation().turns();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].id(), submitted.user);
    assert!(accumulator.conversation().get(submitted.assistant).is_none());
}

#[test_log::test]
fn test_error_before_first_byte() {
    let mut accumulator = MessageAccumulator::new();
    submitted(&mut accumulator, "hello");

    assert_matches!(
        accumulator.apply(StreamEvent::error("API error (status 500): boom")),
        Step::Failed(message) if message.contains("500")
    );
    assert_eq!(accumulator.conversation().len(), 1);
}

#[test_log::test]
fn test_empty_answer_is_kept() {
    let mut accumulator = MessageAccumulator::new();
    let submitted = submitted(&mut accumulator, "say nothing");

    assert_eq!(
        accumulator.apply(StreamEvent::End),
        Step::Finalized(submitted.assistant)
    );

    let turn = accumulator.conversation().get(submitted.assistant).unwrap();
    assert_eq!(turn.text(), "");
    assert!(turn.sources().is_empty());
}

#[test_log::test]
fn test_events_without_exchange_are_ignored() {
    let mut accumulator = MessageAccumulator::new();

    assert_eq!(accumulator.apply(StreamEvent::text("stray")), Step::Ignored);
    assert_eq!(accumulator.apply(StreamEvent::End), Step::Ignored);
    assert!(accumulator.conversation().is_empty());

    submitted(&mut accumulator, "hi");
    accumulator.apply(StreamEvent::End);

    assert_eq!(accumulator.apply(StreamEvent::text("late")), Step::Ignored);
    assert_eq!(accumulator.conversation().turns()[1].text(), "");
}

#[test_log::test]
fn test_abandon_discards_placeholder() {
    let mut accumulator = MessageAccumulator::new();
    assert!(!accumulator.abandon());

    submitted(&mut accumulator, "hi");
    accumulator.apply(StreamEvent::text("half an ans"));

    assert!(accumulator.abandon());
    assert_eq!(accumulator.state(), State::Idle);
    assert_eq!(accumulator.conversation().len(), 1);

    let next = accumulator.submit("again").unwrap();
    assert_eq!(accumulator.conversation().len(), 3);
    assert!(accumulator.conversation().get(next.assistant).is_some());
}

#[test_log::test]
fn test_clear_keeps_ids_unique() {
    let mut accumulator = MessageAccumulator::new();
    let first = submitted(&mut accumulator, "one");
    accumulator.apply(StreamEvent::End);

    accumulator.clear();
    assert!(accumulator.conversation().is_empty());
    assert_eq!(accumulator.state(), State::Idle);

    let second = accumulator.submit("two").unwrap();
    assert!(second.user > first.assistant);
}

#[test_log::test]
fn test_finalized_turns_are_untouched_by_later_exchanges() {
    let mut accumulator = MessageAccumulator::new();
    let first = submitted(&mut accumulator, "one");
    accumulator.apply(StreamEvent::text("first answer [1]"));
    accumulator.apply(StreamEvent::sources(refund_sources()));
    accumulator.apply(StreamEvent::End);
    let before = accumulator.conversation().get(first.assistant).cloned();

    submitted(&mut accumulator, "two");
    accumulator.apply(StreamEvent::text("second"));
    accumulator.apply(StreamEvent::sources(vec![]));
    accumulator.apply(StreamEvent::error("boom"));

    assert_eq!(accumulator.conversation().get(first.assistant).cloned(), before);
    assert_eq!(accumulator.conversation().len(), 3);
}

proptest! {
    #[test]
    fn test_text_is_concatenated_in_order(
        chunks in proptest::collection::vec("\\PC{0,8}", 0..20),
    ) {
        let mut accumulator = MessageAccumulator::new();
        let submitted = accumulator.submit("question").unwrap();
        accumulator.session_opened();

        for chunk in &chunks {
            prop_assert_eq!(accumulator.apply(StreamEvent::text(chunk.as_str())), Step::Continue);
        }
        prop_assert_eq!(
            accumulator.apply(StreamEvent::End),
            Step::Finalized(submitted.assistant)
        );

        let turn = accumulator.conversation().get(submitted.assistant).unwrap();
        prop_assert_eq!(turn.text(), chunks.concat());
    }
}
