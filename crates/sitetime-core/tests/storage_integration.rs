//! Integration tests for SQLite-backed persistence and rule configuration.

use std::rc::Rc;

use chrono::{Local, TimeZone};
use sitetime_core::{
    Config, Database, HeadlessIndicator, LifecycleController, Origin, Position, RecordRepo,
    RuleBook, TimerState,
};

fn noon_ms() -> i64 {
    Local
        .with_ymd_and_hms(2026, 10, 14, 12, 0, 0)
        .single()
        .unwrap()
        .timestamp_millis()
}

#[test]
fn session_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sitetime.db");
    let origin = Origin::parse("https://news.example.com/today").unwrap();
    let now = noon_ms();

    {
        let db = Database::open_at(&path).unwrap();
        let mut ctl =
            LifecycleController::new(origin.clone(), &RuleBook::new(), db, HeadlessIndicator::new());
        ctl.resume(now);
        ctl.indicator_mut().drag_to(Position::new(320, 48));
        for i in 1..=90 {
            ctl.tick(now + i * 1000);
        }
        ctl.suspend(now + 90_500).unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let record = RecordRepo::new(db).load(&origin);
    assert_eq!(record.elapsed_ms, 90_000);
    assert_eq!(record.position(), Position::new(320, 48));
    assert_eq!(record.last_update_epoch_ms, now + 90_500);
}

#[test]
fn configured_rule_expires_the_session() {
    let config: Config = toml::from_str(
        r#"
[rules."bsky.app"]
threshold_ms = 3000
action = { type = "timeout" }
"#,
    )
    .unwrap();
    let rules = RuleBook::from_config(&config).unwrap();
    let db = Rc::new(Database::open_memory().unwrap());
    let now = noon_ms();

    let mut ctl = LifecycleController::new(
        Origin::parse("bsky.app").unwrap(),
        &rules,
        db.clone(),
        HeadlessIndicator::new(),
    );
    ctl.resume(now);
    for i in 1..=3 {
        ctl.tick(now + i * 1000);
    }
    assert_eq!(ctl.state(), TimerState::Expired);
    assert_eq!(ctl.indicator().text, "00:00:03");
}

#[test]
fn list_reports_every_stored_origin() {
    let db = Rc::new(Database::open_memory().unwrap());
    let now = noon_ms();
    for host in ["b.example.com", "a.example.com"] {
        let mut ctl = LifecycleController::new(
            Origin::parse(host).unwrap(),
            &RuleBook::new(),
            db.clone(),
            HeadlessIndicator::new(),
        );
        ctl.resume(now);
        ctl.tick(now + 1000);
        ctl.suspend(now + 1500).unwrap();
    }

    let repo = RecordRepo::new(db);
    let listed = repo.list().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].0.as_str(), "a.example.com");
    assert_eq!(listed[0].1.elapsed_ms, 1000);

    repo.reset_all().unwrap();
    assert!(repo.list().unwrap().is_empty());
}
