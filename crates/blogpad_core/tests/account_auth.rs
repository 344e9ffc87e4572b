use blogpad_core::db::open_db_in_memory;
use blogpad_core::{
    hash_password, AuthError, BlogStore, ConflictError, RecordKey, RecordRepository, SessionState,
    SqliteRecordRepository, StoreError, ValidationError,
};

#[test]
fn signup_then_login_returns_matching_account() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let mut store = BlogStore::open(repo).unwrap();

    let created = store
        .create_account("Ada Lovelace", "ada@example.com", "engine1", "engine1")
        .unwrap();
    assert_eq!(created.password_digest, hash_password("engine1"));
    assert_eq!(store.session().unwrap().name, "Ada Lovelace");

    store.logout().unwrap();
    assert_eq!(store.session_manager().state(), SessionState::Anonymous);

    let logged_in = store.authenticate("ada@example.com", "engine1").unwrap();
    assert_eq!(logged_in.name, "Ada Lovelace");
    assert_eq!(logged_in.email, "ada@example.com");
    assert_eq!(store.session().unwrap().email, "ada@example.com");
}

#[test]
fn signup_checks_run_in_form_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let mut store = BlogStore::open(repo).unwrap();

    let cases = [
        ("Al", "bad", "1", "2", ValidationError::NameTooShort),
        ("Alan", "bad", "1", "2", ValidationError::InvalidEmail),
        ("Alan", "alan@example.com", "1", "2", ValidationError::WeakPassword),
        (
            "Alan",
            "alan@example.com",
            "secret1",
            "secret2",
            ValidationError::PasswordMismatch,
        ),
    ];
    for (name, email, password, confirm, expected) in cases {
        let err = store
            .create_account(name, email, password, confirm)
            .unwrap_err();
        assert!(
            matches!(err, StoreError::Validation(found) if found == expected),
            "expected {expected:?}, got {err}"
        );
    }

    assert!(store.accounts().is_empty());
    assert!(store.session().is_none());
}

#[test]
fn duplicate_email_is_a_conflict_and_leaves_accounts_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let mut store = BlogStore::open(repo).unwrap();

    store
        .create_account("Ada", "ada@example.com", "engine1", "engine1")
        .unwrap();
    let err = store
        .create_account("Impostor", "ada@example.com", "other12", "other12")
        .unwrap_err();

    assert!(matches!(err, StoreError::Conflict(ConflictError::EmailExists)));
    assert_eq!(store.accounts().len(), 1);
    assert_eq!(store.session().unwrap().name, "Ada");
}

#[test]
fn email_uniqueness_is_case_sensitive() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let mut store = BlogStore::open(repo).unwrap();

    store
        .create_account("Ada", "ada@example.com", "engine1", "engine1")
        .unwrap();
    store
        .create_account("Ada Upper", "Ada@example.com", "engine1", "engine1")
        .unwrap();
    assert_eq!(store.accounts().len(), 2);
}

#[test]
fn wrong_password_and_unknown_email_fail_identically() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let mut store = BlogStore::open(repo).unwrap();
    store
        .create_account("Ada", "ada@example.com", "engine1", "engine1")
        .unwrap();
    store.logout().unwrap();

    let wrong_password = store
        .authenticate("ada@example.com", "engine2")
        .unwrap_err();
    let unknown_email = store
        .authenticate("nobody@example.com", "engine1")
        .unwrap_err();

    assert!(matches!(
        wrong_password,
        StoreError::Auth(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        unknown_email,
        StoreError::Auth(AuthError::InvalidCredentials)
    ));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert!(store.session().is_none());
}

#[test]
fn login_prechecks_input_before_lookup() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let mut store = BlogStore::open(repo).unwrap();

    let err = store.authenticate("not-an-email", "engine1").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::InvalidEmail)
    ));

    let err = store.authenticate("ada@example.com", "short").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::WeakPassword)
    ));
}

#[test]
fn stored_account_never_contains_plaintext() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let mut store = BlogStore::open(&repo).unwrap();
    store
        .create_account("Ada", "ada@example.com", "plaintext-secret", "plaintext-secret")
        .unwrap();

    let accounts = repo.read_record(RecordKey::Accounts).unwrap().unwrap();
    assert!(!accounts.contains("plaintext-secret"));
    assert!(accounts.contains(&hash_password("plaintext-secret")));

    let session = repo.read_record(RecordKey::Session).unwrap().unwrap();
    assert!(!session.contains("password"));
}

#[test]
fn switching_user_overwrites_session() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let mut store = BlogStore::open(repo).unwrap();

    store
        .create_account("Ada", "ada@example.com", "engine1", "engine1")
        .unwrap();
    store
        .create_account("Grace", "grace@example.com", "cobol12", "cobol12")
        .unwrap();
    assert_eq!(store.session().unwrap().name, "Grace");

    store.authenticate("ada@example.com", "engine1").unwrap();
    assert_eq!(store.session().unwrap().name, "Ada");
}
