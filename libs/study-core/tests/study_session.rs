//! End-to-end study session scenarios.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use study_core::{
    ChoiceAnswer, ContentFamily, Difficulty, EffectiveSettings, GlobalSettings, Grader,
    IntervalScheduler, ItemKind, ItemSet, ModuleSettings, ProgressSnapshot, SessionContext,
    StudyDeck, StudyError, StudyItem, StudyModule, UserResponse,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("study_core=debug"))
        .with_test_writer()
        .try_init();
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, 21, 0, 0).unwrap()
}

fn deck(name: &str, family: ContentFamily, grader: Grader) -> StudyDeck {
    StudyDeck::new(
        name,
        family,
        Arc::new(grader),
        Arc::new(IntervalScheduler::default()),
    )
}

#[test]
fn two_blank_question_passes_with_tolerant_input() {
    init_tracing();
    let mut deck = deck("network", ContentFamily::KeywordList, Grader::default());
    let item = StudyItem::new(
        "net-1",
        "Name both sides of the model",
        vec!["서버", "클라이언트"],
        ItemKind::FreeText,
    )
    .unwrap();

    let mut snapshot = ProgressSnapshot::default();
    snapshot.wrong.insert("net-1".into());
    deck = deck.with_session(SessionContext::from_snapshot(snapshot));
    deck.load(vec![item], now()).unwrap();

    let report = deck
        .grade(&UserResponse::Slots(vec!["서버 ".into(), "Client".into()]))
        .unwrap();

    assert!(report.passed);
    let session = deck.session();
    assert_eq!(session.stats().correct, 1);
    assert_eq!(session.stats().total, 1);
    assert!(session.contains(ItemSet::Completed, "net-1"));
    assert!(!session.contains(ItemSet::Wrong, "net-1"));
}

#[test]
fn flagged_question_grades_on_digits_only() {
    init_tracing();
    let mut module = ModuleSettings::new("exam");
    module.digit_exact_ids = Some(BTreeSet::from(["h03-17".to_string()]));
    let settings = EffectiveSettings::merge(&GlobalSettings::default(), Some(&module));
    let mut deck = deck("exam", ContentFamily::ExamArchive, Grader::new(settings).unwrap());

    let items = vec![
        StudyItem::new("h03-17", "How many?", vec!["3"], ItemKind::FreeText).unwrap(),
        StudyItem::new("h03-18", "How many?", vec!["3"], ItemKind::FreeText).unwrap(),
    ];
    deck.load(items, now()).unwrap();

    assert!(deck
        .grade(&UserResponse::Slots(vec!["정답은 3가지".into()]))
        .unwrap()
        .passed);
    deck.next();
    assert!(!deck
        .grade(&UserResponse::Slots(vec!["세 가지".into()]))
        .unwrap()
        .passed);

    assert_eq!(deck.session().stats().accuracy(), 0.5);
    assert!(deck.session().contains(ItemSet::Wrong, "h03-18"));
}

#[test]
fn wrong_slot_count_is_a_plain_failure() {
    let mut deck = deck("cert", ContentFamily::Certification, Grader::default());
    let item =
        StudyItem::new("c-1", "Two keys", vec!["기본키", "외래키"], ItemKind::FreeText).unwrap();
    deck.load(vec![item], now()).unwrap();

    let report = deck
        .grade(&UserResponse::Slots(vec!["기본키".into()]))
        .unwrap();
    assert!(!report.passed);
    assert_eq!(deck.session().stats().wrong, 1);
}

#[test]
fn choice_questions_accept_glyph_variants() {
    let mut deck = deck("pm", ContentFamily::ProjectManagement, Grader::default());
    let items = vec![
        StudyItem::new("pm-1", "Pick one", vec!["②"], ItemKind::Choice { multi: false }).unwrap(),
        StudyItem::new("pm-2", "Pick all", vec!["1", "4"], ItemKind::Choice { multi: true })
            .unwrap(),
    ];
    deck.load(items, now()).unwrap();

    let single = UserResponse::Choice(ChoiceAnswer::Single("ㄴ".into()));
    assert!(deck.grade(&single).unwrap().passed);

    deck.next();
    let multi = UserResponse::Choice(ChoiceAnswer::Multi(vec!["④".into(), "a".into()]));
    assert!(deck.grade(&multi).unwrap().passed);
    assert_eq!(deck.session().stats().best_streak, 2);
}

#[test]
fn flashcard_reviews_reschedule_and_reorder() {
    init_tracing();
    let cards: Vec<StudyItem> = ["t-1", "t-2", "t-3"]
        .iter()
        .map(|id| StudyItem::new(*id, "front", vec!["back"], ItemKind::Flashcard).unwrap())
        .collect();

    let mut deck = deck("theory", ContentFamily::TheoryReview, Grader::default());
    deck.load(cards.clone(), now()).unwrap();

    // t-1 known, t-2 forgotten, t-3 untouched
    deck.rate(Difficulty::Easy, now()).unwrap();
    deck.next();
    let forgotten = deck.rate(Difficulty::Hard, now()).unwrap();
    assert_eq!(forgotten.new_state.interval, 1);

    let saved = deck.session().snapshot();
    let json = serde_json::to_string(&saved).unwrap();
    let restored: ProgressSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, saved);

    // Two days later t-2 is due, t-1 (3-day interval) is not
    let later = now() + Duration::days(2);
    let mut resumed = StudyDeck::new(
        "theory",
        ContentFamily::TheoryReview,
        Arc::new(Grader::default()),
        Arc::new(IntervalScheduler::default()),
    )
    .with_session(SessionContext::from_snapshot(restored));
    resumed.load(cards, later).unwrap();

    let order: Vec<_> = resumed.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(order, vec!["t-2", "t-3", "t-1"]);
}

#[test]
fn invalid_difficulty_is_rejected_at_the_boundary() {
    assert_eq!(
        Difficulty::try_from(0u8),
        Err(StudyError::InvalidDifficulty(0))
    );
    assert!(serde_json::from_str::<Difficulty>("4").is_err());
    assert_eq!(serde_json::from_str::<Difficulty>("3").unwrap(), Difficulty::Hard);
}
