// Integration tests for the session store.
//
// These exercise the store end-to-end through the library's public API with a
// real SQLite slot: first-run seeding, restart recovery, corrupt-slot fallback,
// and a full scoring session feeding the standings table.

use picklescore_core::config::DEFAULT_SLOT_KEY;
use picklescore_core::db::{Database, SqliteSlot};
use picklescore_core::seed::{CsvSeed, DefaultRoster};
use picklescore_core::session::model::{MatchStatus, Strength};
use picklescore_core::session::snapshot::SessionState;
use picklescore_core::session::teams::RosterSelection;
use picklescore_core::session::Ignored;
use picklescore_core::store::{LoadSource, SessionStore, StoreOptions};

// ===========================================================================
// Test helpers
// ===========================================================================

fn open_slot(path: &std::path::Path) -> SqliteSlot {
    Database::open(&path.to_string_lossy())
        .expect("open db")
        .slot(DEFAULT_SLOT_KEY)
}

fn open_store(path: &std::path::Path) -> SessionStore<SqliteSlot> {
    SessionStore::new(open_slot(path), StoreOptions::default())
}

// ===========================================================================
// Startup and recovery
// ===========================================================================

#[test]
fn first_run_seeds_from_csv_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("players.csv");
    std::fs::write(&csv, "id,name,strength\n1,Meera,pro\n2,Dev,noob\n").unwrap();

    let mut store = open_store(&dir.path().join("session.db"));
    let source = store.initialize(&CsvSeed::new(csv.to_string_lossy()));
    assert_eq!(source, LoadSource::Seeded);
    assert_eq!(store.players().len(), 2);

    let raw = store
        .storage()
        .database()
        .load_slot(DEFAULT_SLOT_KEY)
        .unwrap()
        .expect("initial snapshot written");
    let saved = SessionState::from_json_lenient(&raw).unwrap();
    assert_eq!(saved, *store.state());
}

#[test]
fn missing_seed_file_uses_built_in_roster() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir.path().join("session.db"));
    let source = store.initialize(&CsvSeed::new(
        dir.path().join("absent.csv").to_string_lossy(),
    ));
    assert_eq!(source, LoadSource::DefaultRoster);
    assert_eq!(store.players().len(), 4);
}

#[test]
fn session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("session.db");

    let before = {
        let mut store = open_store(&db_path);
        store.initialize(&DefaultRoster);
        store.add_player("Neha", Strength::Pro).unwrap();
        store.generate_teams(RosterSelection::All);
        let (a, b) = (store.teams()[0].id, store.teams()[1].id);
        let m = store.start_match(a, b).unwrap();
        store.score_point(m, a).unwrap();
        store.score_point(m, b).unwrap();
        store.state().clone()
    };

    let mut store = open_store(&db_path);
    assert_eq!(store.initialize(&DefaultRoster), LoadSource::Stored);
    assert_eq!(*store.state(), before);
    assert_eq!(store.active_match().unwrap().history.len(), 2);

    // Ids issued after a restart stay above everything already stored.
    let id = store.add_player("Late", Strength::Noob).unwrap();
    assert!(id > before.max_id());
}

#[test]
fn corrupt_slot_is_replaced_by_seed() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("session.db");
    Database::open(&db_path.to_string_lossy())
        .unwrap()
        .save_slot(DEFAULT_SLOT_KEY, "[1, 2, 3]")
        .unwrap();

    let mut store = open_store(&db_path);
    assert_eq!(store.initialize(&DefaultRoster), LoadSource::Seeded);
    assert_eq!(store.players().len(), 4);
    assert!(store.teams().is_empty());
    assert!(store.matches().is_empty());
}

#[test]
fn uninitialized_store_leaves_slot_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("session.db");
    {
        let mut store = open_store(&db_path);
        store.initialize(&DefaultRoster);
    }

    let mut early = open_store(&db_path);
    early.add_player("Ghost", Strength::Pro).unwrap();
    early.set_all_players_availability(false);
    drop(early);

    let mut store = open_store(&db_path);
    store.initialize(&DefaultRoster);
    assert!(store.players().iter().all(|p| p.name != "Ghost"));
    assert!(store.players().iter().all(|p| p.playing));
}

// ===========================================================================
// A full evening
// ===========================================================================

#[test]
fn full_session_feeds_standings() {
    let mut store = SessionStore::new(
        Database::open(":memory:").unwrap().slot(DEFAULT_SLOT_KEY),
        StoreOptions::default(),
    );
    store.initialize(&DefaultRoster);
    store.add_player("Neha", Strength::Pro).unwrap();
    store.add_player("Dev", Strength::Noob).unwrap();

    let teams = store.generate_teams(RosterSelection::AvailableOnly).to_vec();
    assert_eq!(teams.len(), 3);
    let (t1, t2, t3) = (teams[0].id, teams[1].id, teams[2].id);

    // t1 beats t2 11-5.
    let m1 = store.start_match(t1, t2).unwrap();
    for _ in 0..11 {
        store.score_point(m1, t1).unwrap();
    }
    for _ in 0..5 {
        store.score_point(m1, t2).unwrap();
    }
    store.end_match(m1).unwrap();

    // t3 beats t1 11-9 after an undo and a correction.
    let m2 = store.start_match(t3, t1).unwrap();
    for _ in 0..10 {
        store.score_point(m2, t1).unwrap();
    }
    store.decrement_point(m2, t1).unwrap();
    for _ in 0..12 {
        store.score_point(m2, t3).unwrap();
    }
    store.undo_last_point(m2).unwrap();
    store.end_match(m2).unwrap();
    assert_eq!(store.get_match(m2).unwrap().status, MatchStatus::Completed);
    assert_eq!(store.score_point(m2, t3), Err(Ignored::MatchCompleted(m2)));

    // A match still in play does not count.
    let m3 = store.start_match(t2, t3).unwrap();
    store.score_point(m3, t2).unwrap();

    let table = store.standings();
    let row = |id| table.iter().find(|r| r.team.id == id).unwrap();
    assert_eq!((row(t1).played, row(t1).won, row(t1).diff), (2, 1, 4));
    assert_eq!((row(t3).played, row(t3).won, row(t3).diff), (1, 1, 2));
    assert_eq!((row(t2).played, row(t2).won, row(t2).diff), (1, 0, -6));
    let order: Vec<_> = table.iter().map(|r| r.team.id).collect();
    assert_eq!(order, vec![t1, t3, t2]);

    let history: Vec<_> = store.match_history().iter().map(|m| m.id).collect();
    assert_eq!(history.len(), 3);
    assert_eq!(store.active_match_id(), Some(m3));
}
