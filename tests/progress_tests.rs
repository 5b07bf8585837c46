mod support;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use support::{Call, FakeModel, FakeTransport, harness};
use tldr_bot::core::models::{ChatId, InboundEvent, MessageHandle, SummaryLength, SummaryRequest};
use tldr_bot::dialogue::{Dispatch, messages};
use tldr_bot::errors::BotError;
use tldr_bot::telegram::ReplyMarkup;
use tldr_bot::transport::ChatTransport;
use tldr_bot::worker::{JobReport, ProgressMode, SummaryWorker};

async fn summarize(h: &support::Harness, chat: i64, body: &str) -> JobReport {
    h.controller
        .handle_event(InboundEvent::Text {
            chat_id: ChatId(chat),
            text: "Medium".into(),
        })
        .await
        .unwrap();
    let dispatch = h
        .controller
        .handle_event(InboundEvent::Text {
            chat_id: ChatId(chat),
            text: body.into(),
        })
        .await
        .unwrap();
    match dispatch {
        Dispatch::Summarizing(job) => job.await.unwrap(),
        other => panic!("expected a summarization job, got {other:?}"),
    }
}

/// Position of the first call matching `pred` in the full call log.
fn position(calls: &[Call], pred: impl Fn(&Call) -> bool) -> usize {
    calls.iter().position(pred).expect("call not found")
}

#[tokio::test(start_paused = true)]
async fn test_ticker_issues_ten_edits_before_the_summary() {
    let h = harness(
        FakeModel::new().with_delay(Duration::from_millis(3500)),
        ProgressMode::Ticker,
    );
    let chat = ChatId(1);

    let report = summarize(&h, 1, "quick brown fox").await;
    assert!(report.outcome.is_ok());

    let progress = h
        .transport
        .handle_of(chat, messages::PROGRESS_STARTED)
        .expect("progress message sent");
    let edits = h.transport.edits_to(chat);
    let expected: Vec<_> = (0..10)
        .map(|i| (progress, messages::progress_tick(i * 10)))
        .collect();
    assert_eq!(edits, expected);
    assert_eq!(edits.last().unwrap().1, "Generating summary... 90%");

    let calls = h.transport.calls();
    let last_tick = calls
        .iter()
        .rposition(|c| matches!(c, Call::Edit { .. }))
        .unwrap();
    let summary = position(&calls, |c| {
        matches!(c, Call::Send { text, .. } if text == "quick brown fox")
    });
    assert!(summary > last_tick, "summary must follow the last tick");
}

#[tokio::test(start_paused = true)]
async fn test_ticker_stops_at_ten_even_for_slow_generation() {
    let h = harness(
        FakeModel::new().with_delay(Duration::from_secs(45)),
        ProgressMode::Ticker,
    );

    let report = summarize(&h, 2, "slow model output").await;
    assert!(report.outcome.is_ok());

    let edits = h.transport.edits_to(ChatId(2));
    assert_eq!(edits.len(), 10);
    assert!(edits.iter().all(|(_, t)| !t.contains("100%")));
}

#[tokio::test(start_paused = true)]
async fn test_indeterminate_progress_is_edited_once() {
    let h = harness(
        FakeModel::new().with_delay(Duration::from_secs(20)),
        ProgressMode::Indeterminate,
    );
    let chat = ChatId(3);

    summarize(&h, 3, "some words here").await;

    let progress = h
        .transport
        .handle_of(chat, messages::PROGRESS_INDETERMINATE)
        .unwrap();
    assert_eq!(
        h.transport.edits_to(chat),
        vec![(progress, messages::PROGRESS_DONE.to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_generation_marks_progress_failed() {
    let h = harness(FakeModel::new().failing(), ProgressMode::Ticker);
    let chat = ChatId(4);

    let report = summarize(&h, 4, "doomed text").await;
    assert!(report.outcome.is_err());

    let edits = h.transport.edits_to(chat);
    assert_eq!(edits.last().unwrap().1, messages::PROGRESS_FAILED);

    // No ticks arrive after the failure mark.
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(
        h.transport.edits_to(chat).last().unwrap().1,
        messages::PROGRESS_FAILED
    );
}

/// Tick edits hold their worker thread for a while before they land, like a request
/// that is already on the wire.
struct SlowTickTransport {
    inner: Arc<FakeTransport>,
}

#[async_trait]
impl ChatTransport for SlowTickTransport {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        markup: Option<&ReplyMarkup>,
    ) -> Result<MessageHandle, BotError> {
        self.inner.send_message(chat_id, text, markup).await
    }

    async fn edit_message(
        &self,
        chat_id: ChatId,
        handle: MessageHandle,
        text: &str,
    ) -> Result<(), BotError> {
        if text.ends_with('%') {
            std::thread::sleep(Duration::from_millis(80));
        }
        self.inner.edit_message(chat_id, handle, text).await
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), BotError> {
        self.inner.answer_callback(callback_id).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_in_flight_tick_never_lands_after_failure_mark() {
    let recorder = FakeTransport::new();
    let transport = Arc::new(SlowTickTransport {
        inner: recorder.clone(),
    });
    // Fails while the first tick edit is still in progress.
    let model = Arc::new(FakeModel::new().with_delay(Duration::from_millis(40)).failing());
    let worker = SummaryWorker::new(transport, model, ProgressMode::Ticker, 2)
        .with_tick_interval(Duration::from_millis(20));
    let chat = ChatId(5);

    let job = worker
        .try_spawn(SummaryRequest::new(chat, "doomed text".into(), SummaryLength::Short))
        .unwrap();
    assert!(job.await.unwrap().outcome.is_err());

    tokio::time::sleep(Duration::from_millis(200)).await;
    let edits = recorder.edits_to(chat);
    assert_eq!(edits.last().unwrap().1, messages::PROGRESS_FAILED);
}
