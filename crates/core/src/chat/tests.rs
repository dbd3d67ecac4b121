use std::time::Duration;

use hemachat_model::{ErrorKind, ModelMessage};
use hemachat_test_model::{PresetOutcome, TestModelProvider};
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

use super::ChatStage;
use crate::ChatBuilder;
use crate::conversation::Role;

fn idle_counter() -> (impl Fn() + Send + Sync + 'static, watch::Receiver<u32>)
{
    let (idle_tx, idle_rx) = watch::channel(0u32);
    let on_idle = move || {
        idle_tx.send_modify(|count| *count += 1);
    };
    (on_idle, idle_rx)
}

async fn wait_for_idle(idle_rx: &mut watch::Receiver<u32>, count: u32) {
    timeout(
        Duration::from_millis(500),
        idle_rx.wait_for(|current| *current >= count),
    )
    .await
    .unwrap()
    .unwrap();
}

#[tokio::test]
async fn test_initial_greeting() {
    let chat = ChatBuilder::unconfigured()
        .with_greeting("Hi, I can read your lab results.")
        .build();

    let snapshot = chat.snapshot().await;
    assert_eq!(snapshot.turns.len(), 1);
    assert_eq!(snapshot.turns[0].role(), Role::Assistant);
    assert_eq!(
        snapshot.turns[0].content(),
        "Hi, I can read your lab results."
    );
    assert_eq!(snapshot.draft, "");
    assert_eq!(snapshot.stage, ChatStage::Idle);
}

#[tokio::test]
async fn test_submit_round_trip() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_outcome(PresetOutcome::Reply(
        "Your hemoglobin is below the normal range.".to_owned(),
    ));
    let observer = model_provider.clone();

    let (on_idle, mut idle_rx) = idle_counter();
    let chat = ChatBuilder::with_model_provider(model_provider)
        .with_system_prompt("You are an anemia AI assistant.")
        .on_idle(on_idle)
        .build();

    chat.submit("Hemoglobin is 9.2 g/dL");
    wait_for_idle(&mut idle_rx, 1).await;

    let snapshot = chat.snapshot().await;
    assert_eq!(snapshot.stage, ChatStage::Idle);
    assert_eq!(snapshot.turns.len(), 3);
    assert_eq!(snapshot.turns[1].role(), Role::User);
    assert_eq!(snapshot.turns[1].content(), "Hemoglobin is 9.2 g/dL");
    assert_eq!(snapshot.turns[2].role(), Role::Assistant);
    assert_eq!(
        snapshot.turns[2].content(),
        "Your hemoglobin is below the normal range."
    );

    // The payload is the fixed system prompt plus the new user text,
    // nothing else.
    assert_eq!(observer.request_count(), 1);
    assert_eq!(
        observer.last_request().unwrap().messages,
        vec![
            ModelMessage::System("You are an anemia AI assistant.".to_owned()),
            ModelMessage::User("Hemoglobin is 9.2 g/dL".to_owned()),
        ]
    );
}

#[tokio::test]
async fn test_unconfigured_submission_is_dropped() {
    let (on_idle, mut idle_rx) = idle_counter();
    let chat = ChatBuilder::unconfigured().on_idle(on_idle).build();

    chat.submit("Hemoglobin is 9.2 g/dL");
    wait_for_idle(&mut idle_rx, 1).await;

    let snapshot = chat.snapshot().await;
    assert_eq!(snapshot.turns.len(), 1);
    assert_eq!(snapshot.stage, ChatStage::Idle);
}

#[tokio::test]
async fn test_busy_submission_is_dropped() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_outcome(PresetOutcome::Reply("Done.".to_owned()));
    model_provider.set_delay(Duration::from_millis(50));
    let observer = model_provider.clone();

    let (on_idle, mut idle_rx) = idle_counter();
    let chat = ChatBuilder::with_model_provider(model_provider)
        .on_idle(on_idle)
        .build();

    chat.submit("first");
    chat.submit("second");
    wait_for_idle(&mut idle_rx, 1).await;

    // The second submission was dropped entirely: no request, no turn.
    let snapshot = chat.snapshot().await;
    assert_eq!(observer.request_count(), 1);
    assert_eq!(snapshot.turns.len(), 3);
    assert_eq!(snapshot.turns[1].content(), "first");
    assert_eq!(snapshot.turns[2].content(), "Done.");
    assert_eq!(snapshot.stage, ChatStage::Idle);
}

#[tokio::test]
async fn test_user_turn_is_appended_before_the_reply() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_outcome(PresetOutcome::Reply("Late.".to_owned()));
    model_provider.set_delay(Duration::from_millis(100));

    let (on_idle, mut idle_rx) = idle_counter();
    let chat = ChatBuilder::with_model_provider(model_provider)
        .on_idle(on_idle)
        .build();

    chat.set_draft("Ferritin is 8 ng/mL");
    chat.submit_draft();

    // Queried right behind the submission: the user turn is already there
    // and the draft is already cleared, while the reply is still pending.
    let snapshot = chat.snapshot().await;
    assert_eq!(snapshot.stage, ChatStage::AwaitingReply);
    assert_eq!(snapshot.draft, "");
    assert_eq!(snapshot.turns.len(), 2);
    assert_eq!(snapshot.turns[1].role(), Role::User);
    assert_eq!(snapshot.turns[1].content(), "Ferritin is 8 ng/mL");

    wait_for_idle(&mut idle_rx, 1).await;
    let snapshot = chat.snapshot().await;
    assert_eq!(snapshot.turns.len(), 3);
    assert_eq!(snapshot.turns[2].content(), "Late.");
}

#[tokio::test]
async fn test_draft_cleared_when_submitting_pre_supplied_text() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_outcome(PresetOutcome::Reply("Ok.".to_owned()));

    let (on_idle, mut idle_rx) = idle_counter();
    let chat = ChatBuilder::with_model_provider(model_provider)
        .on_idle(on_idle)
        .build();

    chat.set_draft("half-typed note");
    chat.submit("Hemoglobin is 9.2 g/dL");
    wait_for_idle(&mut idle_rx, 1).await;

    let snapshot = chat.snapshot().await;
    assert_eq!(snapshot.draft, "");
    assert_eq!(snapshot.turns[1].content(), "Hemoglobin is 9.2 g/dL");
}

#[tokio::test]
async fn test_empty_reply_falls_back() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_outcome(PresetOutcome::EmptyReply);

    let (on_idle, mut idle_rx) = idle_counter();
    let chat = ChatBuilder::with_model_provider(model_provider)
        .with_fallback_reply("I'm sorry, I didn't understand that.")
        .on_idle(on_idle)
        .build();

    chat.submit("???");
    wait_for_idle(&mut idle_rx, 1).await;

    let snapshot = chat.snapshot().await;
    assert_eq!(snapshot.turns.len(), 3);
    assert_eq!(snapshot.turns[2].role(), Role::Assistant);
    assert_eq!(
        snapshot.turns[2].content(),
        "I'm sorry, I didn't understand that."
    );
}

#[tokio::test]
async fn test_every_failure_kind_appends_the_same_reply() {
    let kinds = [
        ErrorKind::Unauthorized,
        ErrorKind::RateLimitExceeded,
        ErrorKind::Timeout,
        ErrorKind::MalformedResponse,
        ErrorKind::Other,
    ];

    let mut model_provider = TestModelProvider::default();
    for kind in kinds {
        model_provider.add_outcome(PresetOutcome::Failure(kind));
    }

    let (on_idle, mut idle_rx) = idle_counter();
    let chat = ChatBuilder::with_model_provider(model_provider)
        .with_failure_reply("An error occurred. Please try again.")
        .on_idle(on_idle)
        .build();

    for i in 0..kinds.len() {
        chat.submit(format!("attempt {i}"));
        wait_for_idle(&mut idle_rx, (i + 1) as u32).await;

        let snapshot = chat.snapshot().await;
        let last = snapshot.turns.last().unwrap();
        assert_eq!(last.role(), Role::Assistant);
        assert_eq!(last.content(), "An error occurred. Please try again.");
        assert_eq!(snapshot.stage, ChatStage::Idle);
    }
}

#[tokio::test]
async fn test_turn_callback_order() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_outcome(PresetOutcome::Reply("Reply.".to_owned()));

    let (turn_tx, mut turn_rx) = mpsc::unbounded_channel();
    let (on_idle, mut idle_rx) = idle_counter();
    let chat = ChatBuilder::with_model_provider(model_provider)
        .with_greeting("Greeting.")
        .on_turn(move |turn| {
            turn_tx.send((turn.role(), turn.content().to_owned())).ok();
        })
        .on_idle(on_idle)
        .build();

    chat.submit("Question.");
    wait_for_idle(&mut idle_rx, 1).await;

    let mut seen = Vec::new();
    while let Ok(turn) = turn_rx.try_recv() {
        seen.push(turn);
    }
    assert_eq!(
        seen,
        vec![
            (Role::Assistant, "Greeting.".to_owned()),
            (Role::User, "Question.".to_owned()),
            (Role::Assistant, "Reply.".to_owned()),
        ]
    );
}
