// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeSet;

use rusqlite::Connection;
use smartexpense::category_sync::{load_tombstones, save_tombstones};
use smartexpense::commands::{auth, session_error};
use smartexpense::db;
use smartexpense::error::ApiError;
use smartexpense::models::AuthToken;
use smartexpense::session::{Screen, SessionStore};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

#[test]
fn initial_screen_follows_token_and_onboarding() {
    let conn = setup();
    let s = SessionStore::new(&conn);
    assert_eq!(s.initial_screen().unwrap(), Screen::Login);

    s.save_login("abc123", "anna", Some(4)).unwrap();
    assert_eq!(s.initial_screen().unwrap(), Screen::Onboarding);

    s.mark_onboarded("anna").unwrap();
    assert_eq!(s.initial_screen().unwrap(), Screen::Home);
    assert_eq!(s.user_id().unwrap(), Some(4));
}

#[test]
fn logout_keeps_onboarding_flag() {
    let conn = setup();
    let s = SessionStore::new(&conn);
    s.save_login("abc123", "anna", None).unwrap();
    s.mark_onboarded("anna").unwrap();
    s.clear().unwrap();

    assert_eq!(s.token().unwrap(), None);
    assert_eq!(s.username().unwrap(), None);
    assert!(matches!(s.require_token(), Err(ApiError::MissingToken)));
    assert!(s.is_onboarded("anna").unwrap());

    s.save_login("def456", "anna", None).unwrap();
    assert_eq!(s.initial_screen().unwrap(), Screen::Home);
}

#[test]
fn onboarding_is_per_user_and_cleared_on_register() {
    let conn = setup();
    let s = SessionStore::new(&conn);
    s.mark_onboarded("anna").unwrap();
    s.mark_onboarded("ben").unwrap();
    s.save_login("tok", "ben", None).unwrap();
    assert!(!s.is_onboarded("carl").unwrap());

    assert_eq!(s.clear_onboarding_flags().unwrap(), 2);
    assert!(!s.is_onboarded("anna").unwrap());
    // token and username are untouched
    assert_eq!(s.token().unwrap().as_deref(), Some("tok"));
    assert_eq!(s.initial_screen().unwrap(), Screen::Onboarding);
}

#[test]
fn relogin_without_user_id_drops_the_old_one() {
    let conn = setup();
    let s = SessionStore::new(&conn);
    s.save_login("a", "anna", Some(1)).unwrap();
    s.save_login("b", "ben", None).unwrap();
    assert_eq!(s.user_id().unwrap(), None);
    assert_eq!(s.username().unwrap().as_deref(), Some("ben"));
}

#[test]
fn session_persists_in_a_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("smartexpense.sqlite");
    {
        let conn = Connection::open(&path).unwrap();
        db::init_schema(&conn).unwrap();
        let s = SessionStore::new(&conn);
        s.save_login("tok", "anna", Some(9)).unwrap();
        s.mark_onboarded("anna").unwrap();
    }
    let conn = Connection::open(&path).unwrap();
    // schema creation is idempotent
    db::init_schema(&conn).unwrap();
    let s = SessionStore::new(&conn);
    assert_eq!(s.initial_screen().unwrap(), Screen::Home);
    assert_eq!(s.user_id().unwrap(), Some(9));
}

#[test]
fn rejected_login_keeps_the_stored_session() {
    let conn = setup();
    let s = SessionStore::new(&conn);
    s.save_login("alice-token", "alice", Some(1)).unwrap();

    let rejected = ApiError::from_response(401, r#"{"error":"Wrong username or password"}"#);
    let err = auth::finish_login(&conn, "alice", Err(rejected)).unwrap_err();
    assert_eq!(err.to_string(), "Wrong username or password");
    assert_eq!(s.token().unwrap().as_deref(), Some("alice-token"));
    assert_eq!(s.username().unwrap().as_deref(), Some("alice"));
}

#[test]
fn accepted_login_replaces_the_session() {
    let conn = setup();
    let s = SessionStore::new(&conn);
    s.save_login("old", "alice", None).unwrap();
    let token = AuthToken {
        token: "new".into(),
        user_id: Some(2),
    };
    let next = auth::finish_login(&conn, "bob", Ok(token)).unwrap();
    assert_eq!(next, Screen::Onboarding);
    assert_eq!(s.token().unwrap().as_deref(), Some("new"));
    assert_eq!(s.user_id().unwrap(), Some(2));
}

#[test]
fn auth_failure_on_a_protected_call_ends_the_session() {
    let conn = setup();
    let s = SessionStore::new(&conn);
    s.save_login("tok", "anna", None).unwrap();

    let err = session_error(&conn, ApiError::from_response(401, r#"{"detail":"Invalid token."}"#));
    assert!(err.to_string().contains("smartexpense login"));
    assert_eq!(s.token().unwrap(), None);

    s.save_login("tok", "anna", None).unwrap();
    let err = session_error(&conn, ApiError::from_response(500, r#"{"error":"boom"}"#));
    assert_eq!(err.to_string(), "boom");
    assert_eq!(s.token().unwrap().as_deref(), Some("tok"));
}

#[test]
fn logout_forgets_unconfirmed_category_deletes() {
    let conn = setup();
    let s = SessionStore::new(&conn);
    s.save_login("tok", "anna", None).unwrap();
    save_tombstones(&conn, &BTreeSet::from([3, 5])).unwrap();
    s.clear().unwrap();
    assert!(load_tombstones(&conn).unwrap().is_empty());
}
