use crossterm::style::Stylize as _;
use pretty_assertions::assert_eq;
use qc_citation::MAX_EXCERPT_CHARS;
use qc_conversation::{MessageAccumulator, Step, TurnId};
use qc_source::{Locator, SourceRef};
use qc_transport::StreamEvent;

use super::*;

fn sources() -> Vec<SourceRef> {
    vec![
        SourceRef::new("policy.pdf")
            .with_location(Locator::Page(2))
            .with_headings(["Terms", "Refunds"])
            .with_excerpt("Refunds within 30 days of purchase."),
        SourceRef::new("faq.docx"),
    ]
}

/// Stream `events`, printing after every update, and return the output.
fn stream(events: Vec<StreamEvent>, colors: bool) -> String {
    let mut accumulator = MessageAccumulator::new();
    accumulator.submit("question").unwrap();
    accumulator.session_opened();

    let mut printer = AnswerPrinter::new(colors);
    let mut out = vec![];
    let mut finalized = None::<TurnId>;

    for event in events {
        match accumulator.apply(event) {
            Step::Continue => {
                let turn = accumulator.in_flight().unwrap();
                printer.update(turn, &mut out).unwrap();
            }
            Step::Finalized(id) => finalized = Some(id),
            step => panic!("unexpected step: {step:?}"),
        }
    }

    let turn = accumulator.conversation().get(finalized.unwrap()).unwrap();
    printer.finish(turn, &mut out).unwrap();

    String::from_utf8(out).unwrap()
}

#[test]
fn test_settled_len() {
    assert_eq!(settled_len(""), 0);
    assert_eq!(settled_len("plain"), 5);
    assert_eq!(settled_len("see ["), 4);
    assert_eq!(settled_len("see [12"), 4);
    assert_eq!(settled_len("see [12]"), 8);
    assert_eq!(settled_len("see [a"), 6);
    assert_eq!(settled_len("[1] and [2"), 8);
}

#[test]
fn test_plain_output_is_the_answer() {
    let output = stream(
        vec![
            StreamEvent::sources(sources()),
            StreamEvent::text("Refunds are allowed within 30 days ["),
            StreamEvent::text("1"),
            StreamEvent::text("]. See [2"),
            StreamEvent::text("] and [9]."),
            StreamEvent::End,
        ],
        false,
    );

    assert_eq!(output, "Refunds are allowed within 30 days [1]. See [2] and [9].\n");
}

#[test]
fn test_resolved_markers_are_highlighted() {
    let output = stream(
        vec![
            StreamEvent::sources(sources()),
            StreamEvent::text("Within 30 days [1] or [7]."),
            StreamEvent::End,
        ],
        true,
    );

    assert_eq!(strip_ansi_escapes::strip_str(&output), "Within 30 days [1] or [7].\n");
    assert!(output.contains(&format!("{}", "[1]".cyan().bold())));
    assert!(!output.contains(&format!("{}", "[7]".cyan().bold())));
}

#[test]
fn test_held_back_marker_is_written_on_finish() {
    let output = stream(
        vec![StreamEvent::text("Unfinished [4"), StreamEvent::End],
        false,
    );

    assert_eq!(output, "Unfinished [4\n");
}

#[test]
fn test_empty_answer_writes_nothing() {
    assert_eq!(stream(vec![StreamEvent::End], false), "");
}

fn finished_turn(text: &str, sources: Vec<SourceRef>) -> MessageAccumulator {
    let mut accumulator = MessageAccumulator::new();
    accumulator.submit("question").unwrap();
    accumulator.session_opened();
    accumulator.apply(StreamEvent::text(text));
    accumulator.apply(StreamEvent::sources(sources));
    accumulator.apply(StreamEvent::End);
    accumulator
}

#[test]
fn test_write_cited_sources() {
    let accumulator = finished_turn("[2] and [1], again [2], never [5].", sources());
    let turn = accumulator.conversation().last_assistant().unwrap();

    let mut out = vec![];
    write_cited_sources(turn, false, &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "\n[1] policy.pdf, page 2\n[2] faq.docx\n"
    );
}

#[test]
fn test_write_cited_sources_without_citations() {
    let accumulator = finished_turn("Nothing cited.", sources());
    let turn = accumulator.conversation().last_assistant().unwrap();

    let mut out = vec![];
    write_cited_sources(turn, false, &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_write_inspector() {
    let long = "x".repeat(MAX_EXCERPT_CHARS + 50);
    let accumulator = finished_turn("See [1].", vec![
        SourceRef::new("policy.pdf")
            .with_location(Locator::Page(2))
            .with_headings(["Terms", "Refunds"])
            .with_excerpt(long),
    ]);
    let turn = accumulator.conversation().last_assistant().unwrap();

    let mut inspector = SourceInspector::new();
    inspector.show_all(turn);

    let mut out = vec![];
    write_inspector(&inspector, false, &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!(
            "[1] policy.pdf, page 2\n    Terms > Refunds\n    \"{}...\"\n",
            "x".repeat(MAX_EXCERPT_CHARS)
        )
    );
}

#[test]
fn test_write_inspector_without_sources() {
    let accumulator = finished_turn("Nothing.", vec![]);
    let turn = accumulator.conversation().last_assistant().unwrap();

    let mut inspector = SourceInspector::new();
    inspector.show_all(turn);

    let mut out = vec![];
    write_inspector(&inspector, false, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "No sources.\n");
}
