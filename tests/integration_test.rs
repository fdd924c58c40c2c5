use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use quiz_sync::config::Config;
use quiz_sync::infrastructure::{
    DocumentStore, Host, HostEvent, InMemoryStore, LocalGrader, SequentialIdGenerator,
};
use quiz_sync::models::{
    Answer, CriteriaMap, FeedbackKind, QuizMode, SavedSelection, SetupDocument,
};
use quiz_sync::sync::join_barrier;
use quiz_sync::view::ControlStyle;
use quiz_sync::workflow::{AuthorSession, DisplaySession};
use tokio_test::{assert_pending, assert_ready_ok, task};

struct Harness {
    host: Host,
    setup: Arc<InMemoryStore<SetupDocument>>,
    criteria: Arc<InMemoryStore<CriteriaMap>>,
    user: Arc<InMemoryStore<SavedSelection>>,
    grader: Arc<LocalGrader>,
}

fn harness(
    setup: InMemoryStore<SetupDocument>,
    criteria: InMemoryStore<CriteriaMap>,
    user: InMemoryStore<SavedSelection>,
    ids: SequentialIdGenerator,
) -> Harness {
    let setup = Arc::new(setup);
    let criteria = Arc::new(criteria);
    let user = Arc::new(user);
    let grader = Arc::new(LocalGrader::new(criteria.clone()));
    let host = Host::new(
        setup.clone(),
        criteria.clone(),
        user.clone(),
        grader.clone(),
        Arc::new(ids),
    );
    Harness {
        host,
        setup,
        criteria,
        user,
        grader,
    }
}

fn fresh_harness() -> Harness {
    harness(
        InMemoryStore::new("setup"),
        InMemoryStore::new("criteria"),
        InMemoryStore::new("user"),
        SequentialIdGenerator::default(),
    )
}

fn criteria_of(entries: &[(&str, bool)]) -> CriteriaMap {
    entries.iter().map(|(id, correct)| (*id, *correct)).collect()
}

/// 让已经就绪的后台任务跑完
async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_add_then_remove_keeps_criteria_in_sync() {
    let setup = SetupDocument {
        answers: Some(vec![Answer::new("1", "A")]),
        quiz_type: Some("single".to_string()),
        ..Default::default()
    };
    let h = harness(
        InMemoryStore::with_data("setup", setup),
        InMemoryStore::with_data("criteria", criteria_of(&[("1", true)])),
        InMemoryStore::new("user"),
        SequentialIdGenerator::starting_at(2),
    );
    let session = AuthorSession::load(&h.host, &Config::default()).await.unwrap();

    let (id, handle) = session.add_answer("B", false).unwrap();
    handle.wait().await.unwrap();
    assert_eq!(id, "2");
    assert_eq!(
        session.answers().to_vec(),
        vec![Answer::new("1", "A"), Answer::new("2", "B")]
    );
    assert_eq!(session.criteria(), criteria_of(&[("1", true), ("2", false)]));

    session.remove_answer("1").unwrap().wait().await.unwrap();
    assert_eq!(session.answers().to_vec(), vec![Answer::new("2", "B")]);
    assert_eq!(session.criteria(), criteria_of(&[("2", false)]));

    // 持久化的判分标准里也没有孤立条目
    assert_eq!(h.criteria.current().unwrap(), criteria_of(&[("2", false)]));
    assert_eq!(
        h.setup.current().unwrap().answers,
        Some(vec![Answer::new("2", "B")])
    );
}

#[tokio::test]
async fn test_ids_stay_unique_across_add_remove_sequences() {
    let h = fresh_harness();
    let session = AuthorSession::load(&h.host, &Config::default()).await.unwrap();

    for round in 0..10 {
        let (id, handle) = session.add_answer(format!("extra {}", round), false).unwrap();
        handle.detach();
        if round % 3 == 0 {
            session.remove_answer(&id).unwrap().detach();
        }
    }
    session.shutdown().await;

    let answers = session.answers();
    let mut ids: Vec<&str> = answers.ids().collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total);
    assert!(session.criteria().keys().all(|id| answers.contains(id)));
}

#[tokio::test]
async fn test_mode_switch_preserves_answers_and_saves_both_documents() {
    let h = fresh_harness();
    let session = AuthorSession::load(&h.host, &Config::default()).await.unwrap();
    let answers_before = session.answers();
    let criteria_before = session.criteria();

    session.change_mode(QuizMode::Multiple).wait().await.unwrap();

    assert_eq!(session.answers(), answers_before);
    assert_eq!(session.criteria(), criteria_before);
    assert_eq!(h.setup.dispatched_count(), 1);
    assert_eq!(h.criteria.dispatched_count(), 1);
    assert_eq!(
        h.setup.current().unwrap().quiz_type.as_deref(),
        Some("multiple")
    );

    let controls = session.controls();
    assert!(controls
        .controls()
        .iter()
        .all(|c| c.style == ControlStyle::Checkbox && c.group == c.value));
}

#[tokio::test]
async fn test_joint_save_completes_once_setup_first() {
    let h = harness(
        InMemoryStore::new("setup").held(),
        InMemoryStore::new("criteria").held(),
        InMemoryStore::new("user"),
        SequentialIdGenerator::default(),
    );
    let session = AuthorSession::load(&h.host, &Config::default()).await.unwrap();

    let mut joint = task::spawn(session.save_all().wait());
    settle().await;
    assert_pending!(joint.poll());
    // 两个请求都已发出
    assert_eq!(h.setup.dispatched_count(), 1);
    assert_eq!(h.criteria.dispatched_count(), 1);

    h.setup.release(1);
    settle().await;
    assert_eq!(h.setup.completed_count(), 1);
    assert_pending!(joint.poll());
    assert!(session.is_saving());

    h.criteria.release(1);
    settle().await;
    assert_ready_ok!(joint.poll());
    assert!(!session.is_saving());
}

#[tokio::test]
async fn test_joint_save_completes_once_criteria_first() {
    let h = harness(
        InMemoryStore::new("setup").held(),
        InMemoryStore::new("criteria").held(),
        InMemoryStore::new("user"),
        SequentialIdGenerator::default(),
    );
    let session = AuthorSession::load(&h.host, &Config::default()).await.unwrap();

    let mut joint = task::spawn(session.save_all().wait());
    settle().await;

    h.criteria.release(1);
    settle().await;
    assert_eq!(h.criteria.completed_count(), 1);
    assert_pending!(joint.poll());

    h.setup.release(1);
    settle().await;
    assert_ready_ok!(joint.poll());
}

#[tokio::test]
async fn test_barrier_fires_exactly_once_in_either_order() {
    for reversed in [false, true] {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let mut arrivals = join_barrier(2, move |values: Vec<String>| {
            assert_eq!(values.len(), 2);
            counter.fetch_add(1, Ordering::SeqCst);
        });
        if reversed {
            arrivals.reverse();
        }

        let mut arrivals = arrivals.into_iter();
        let first = arrivals.next().unwrap();
        let second = arrivals.next().unwrap();

        let a = tokio::spawn(async move { first.arrive("first".to_string()) });
        a.await.unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        let b = tokio::spawn(async move { second.arrive("second".to_string()) });
        b.await.unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_rapid_text_edits_collapse_into_one_save() {
    let h = fresh_harness();
    let session = AuthorSession::load(&h.host, &Config::default()).await.unwrap();

    for text in ["P", "Pa", "Par", "Pari", "Paris"] {
        assert!(session.edit_text("1", text, false).is_none());
        tokio::time::advance(Duration::from_millis(100)).await;
    }
    assert_eq!(h.setup.dispatched_count(), 0);

    tokio::time::sleep(Duration::from_millis(600)).await;
    settle().await;

    let dispatched = h.setup.dispatched();
    assert_eq!(dispatched.len(), 1);
    assert_eq!(
        dispatched[0].answers.as_ref().unwrap()[0],
        Answer::new("1", "Paris")
    );
    assert!(!session.is_saving());
}

#[tokio::test(start_paused = true)]
async fn test_commit_bypasses_debounce() {
    let h = fresh_harness();
    let session = AuthorSession::load(&h.host, &Config::default()).await.unwrap();

    assert!(session.edit_text("2", "Lyon", false).is_none());
    session
        .edit_text("2", "London", true)
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert_eq!(h.setup.dispatched_count(), 1);

    // 被提交覆盖的计时器不会再保存一次
    tokio::time::sleep(Duration::from_millis(600)).await;
    settle().await;
    assert_eq!(h.setup.dispatched_count(), 1);
    assert_eq!(
        h.setup.current().unwrap().answers.unwrap()[1].text,
        "London"
    );
}

fn slow_first() -> [Duration; 2] {
    [Duration::from_millis(200), Duration::from_millis(10)]
}

#[tokio::test(start_paused = true)]
async fn test_committed_edits_persist_newest_text_when_first_write_is_slow() {
    let h = harness(
        InMemoryStore::new("setup").with_delays(slow_first()),
        InMemoryStore::new("criteria"),
        InMemoryStore::new("user"),
        SequentialIdGenerator::default(),
    );
    let session = AuthorSession::load(&h.host, &Config::default()).await.unwrap();

    let first = session.edit_text("1", "first", true).unwrap();
    tokio::task::yield_now().await;
    let second = session.edit_text("1", "second", true).unwrap();
    first.wait().await.unwrap();
    second.wait().await.unwrap();
    session.shutdown().await;

    assert_eq!(session.answers().get("1").unwrap().text, "second");
    assert_eq!(
        h.setup.current().unwrap().answers.unwrap()[0].text,
        "second"
    );
}

#[tokio::test(start_paused = true)]
async fn test_correctness_toggles_persist_newest_criteria_when_first_write_is_slow() {
    let h = harness(
        InMemoryStore::new("setup"),
        InMemoryStore::new("criteria").with_delays(slow_first()),
        InMemoryStore::new("user"),
        SequentialIdGenerator::default(),
    );
    let session = AuthorSession::load(&h.host, &Config::default()).await.unwrap();

    let first = session.toggle_correctness("2").unwrap();
    tokio::task::yield_now().await;
    let second = session.toggle_correctness("1").unwrap();
    first.wait().await.unwrap();
    second.wait().await.unwrap();
    session.shutdown().await;

    let expected = criteria_of(&[("1", true), ("2", false)]);
    assert_eq!(session.criteria(), expected);
    assert_eq!(h.criteria.current(), Some(expected));
    assert_eq!(h.criteria.dispatched()[0], criteria_of(&[("1", false), ("2", true)]));
}

#[tokio::test(start_paused = true)]
async fn test_feedback_fields_debounce_independently() {
    let h = fresh_harness();
    let session = AuthorSession::load(&h.host, &Config::default()).await.unwrap();
    session.edit_feedback(FeedbackKind::Correct, "Well done", false);
    session.edit_feedback(FeedbackKind::Incorrect, "Try again", false);

    tokio::time::sleep(Duration::from_millis(600)).await;
    settle().await;

    // 每个字段各自到期保存一次
    assert_eq!(h.setup.dispatched_count(), 2);
    let saved = h.setup.current().unwrap();
    assert_eq!(saved.correct_message, "Well done");
    assert_eq!(saved.incorrect_message, "Try again");
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_flushes_pending_edits() {
    let h = fresh_harness();
    let session = AuthorSession::load(&h.host, &Config::default()).await.unwrap();

    session.edit_text("1", "Berlin", false);
    assert!(session.has_pending_edits());

    session.shutdown().await;

    assert!(!session.has_pending_edits());
    assert_eq!(h.setup.current().unwrap().answers.unwrap()[0].text, "Berlin");
}

#[tokio::test]
async fn test_host_save_all_event_triggers_joint_save() {
    let h = fresh_harness();
    let session = AuthorSession::load(&h.host, &Config::default()).await.unwrap();
    let listener = session.spawn_event_listener(h.host.subscribe());

    assert_eq!(h.host.emit(HostEvent::SaveAll), 1);
    settle().await;

    assert_eq!(h.setup.completed_count(), 1);
    assert_eq!(h.criteria.completed_count(), 1);
    listener.abort();
}

#[tokio::test]
async fn test_submission_flow() {
    let h = harness(
        InMemoryStore::new("setup"),
        InMemoryStore::with_data("criteria", criteria_of(&[("1", true), ("2", false)])),
        InMemoryStore::new("user"),
        SequentialIdGenerator::default(),
    );
    let session = DisplaySession::load(&h.host, &Config::default()).await.unwrap();

    assert!(session.toggle_selection("1"));
    assert!(session.submit().await.unwrap());

    let visibility = session.visibility();
    assert!(visibility.correct);
    assert!(!visibility.incorrect);
    assert_eq!(
        h.user.current().unwrap(),
        SavedSelection {
            selected: [("1", true), ("2", false)].into_iter().collect(),
            is_correct: true,
        }
    );
    assert_eq!(h.grader.interaction_count(), 1);
    assert!(session.submit_enabled());
}

#[tokio::test]
async fn test_submit_disabled_until_selection_is_saved() {
    let h = harness(
        InMemoryStore::new("setup"),
        InMemoryStore::with_data("criteria", criteria_of(&[("1", true), ("2", false)])),
        InMemoryStore::new("user").held(),
        SequentialIdGenerator::default(),
    );
    let session = DisplaySession::load(&h.host, &Config::default()).await.unwrap();
    session.toggle_selection("2");

    let mut first = task::spawn(session.submit());
    assert_pending!(first.poll());
    assert!(!session.submit_enabled());
    assert!(session.view().saving);
    // 评分结果在保存完成前就已显示
    assert!(session.visibility().incorrect);

    let second = session.submit().await.unwrap_err();
    assert!(second.is_already_submitting());

    h.user.release(1);
    let success = assert_ready_ok!(first.poll());
    assert!(!success);
    assert!(session.submit_enabled());
    assert_eq!(h.user.completed_count(), 1);
}

#[tokio::test]
async fn test_author_edits_reach_display_through_file_store() {
    let dir = std::env::temp_dir().join(format!("quiz_sync_it_{}", uuid::Uuid::new_v4()));
    let config = Config {
        data_dir: dir.to_string_lossy().into_owned(),
        ..Config::default()
    };

    let host = Host::file_backed(&config).unwrap();
    let author = AuthorSession::load(&host, &config).await.unwrap();
    author.change_mode(QuizMode::Multiple).wait().await.unwrap();
    let (id, handle) = author.add_answer("Third", true).unwrap();
    handle.wait().await.unwrap();
    author
        .edit_feedback(FeedbackKind::Correct, "Nice", true)
        .unwrap()
        .wait()
        .await
        .unwrap();
    author.shutdown().await;

    let host = Host::file_backed(&config).unwrap();
    let display = DisplaySession::load(&host, &config).await.unwrap();
    assert_eq!(display.answers().len(), 3);
    assert!(display.answers().contains(&id));

    display.toggle_selection("1");
    display.toggle_selection(&id);
    assert!(display.submit().await.unwrap());
    assert_eq!(display.view().correct_message, "Nice");

    let saved = host.user.retrieve().await.unwrap().unwrap();
    assert!(saved.is_correct);

    let _ = std::fs::remove_dir_all(&dir);
}
