//! Tests for the profile service.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockProfileRepository;
use crate::domain::{AccessToken, ErrorCode};
use crate::test_support::FixedClock;

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn make_service(repo: MockProfileRepository) -> ProfileService {
    ProfileService::new(Arc::new(repo), Arc::new(FixedClock::new(fixture_timestamp())))
}

fn stored_profile(id: &UserId, username: &str) -> Profile {
    Profile {
        id: id.clone(),
        username: Username::new(username).expect("valid username"),
        avatar_url: None,
        created_at: Some(fixture_timestamp()),
        updated_at: Some(fixture_timestamp()),
    }
}

#[fixture]
fn user_id() -> UserId {
    UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id")
}

#[fixture]
fn caller(user_id: UserId) -> Caller {
    Caller::user(user_id, AccessToken::new("access"))
}

#[rstest]
#[tokio::test]
async fn ensure_profile_inserts_when_missing(user_id: UserId, caller: Caller) {
    let mut repo = MockProfileRepository::new();
    let expected_id = user_id.clone();
    repo.expect_insert_if_absent()
        .withf(move |_, profile| {
            profile.id == expected_id
                && profile.username.as_ref() == "ada"
                && profile.timestamp == fixture_timestamp()
        })
        .times(1)
        .returning(|_, profile| Ok(Some(stored_profile(&profile.id, profile.username.as_ref()))));
    repo.expect_find_by_id().never();

    let service = make_service(repo);
    let provisioned = service
        .ensure_profile(&caller, &user_id, Username::new("ada").expect("valid"))
        .await
        .expect("provisioning succeeds");

    assert!(provisioned.created);
    assert_eq!(provisioned.profile.username.as_ref(), "ada");
}

#[rstest]
#[tokio::test]
async fn ensure_profile_returns_existing_row(user_id: UserId, caller: Caller) {
    let mut repo = MockProfileRepository::new();
    repo.expect_insert_if_absent()
        .times(1)
        .returning(|_, _| Ok(None));
    let existing = stored_profile(&user_id, "original");
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_, _| Ok(Some(existing)));

    let service = make_service(repo);
    let provisioned = service
        .ensure_profile(&caller, &user_id, Username::new("ignored").expect("valid"))
        .await
        .expect("provisioning succeeds");

    assert!(!provisioned.created);
    assert_eq!(provisioned.profile.username.as_ref(), "original");
}

#[rstest]
#[tokio::test]
async fn ensure_profile_reports_vanished_row(user_id: UserId, caller: Caller) {
    let mut repo = MockProfileRepository::new();
    repo.expect_insert_if_absent().returning(|_, _| Ok(None));
    repo.expect_find_by_id().returning(|_, _| Ok(None));

    let error = make_service(repo)
        .ensure_profile(&caller, &user_id, Username::generated(&user_id))
        .await
        .expect_err("missing row after skipped insert");

    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[rstest]
#[case(BackendError::missing_table("profiles"), ErrorCode::InvalidRequest, Some("missing_table"))]
#[case(
    BackendError::unique_violation("profiles_pkey"),
    ErrorCode::InvalidRequest,
    Some("duplicate_profile")
)]
#[case(
    BackendError::transport("connection refused"),
    ErrorCode::ServiceUnavailable,
    Some("backend_unavailable")
)]
#[case(BackendError::unauthorized("jwt expired"), ErrorCode::Unauthorized, Some("session_rejected"))]
#[tokio::test]
async fn ensure_profile_maps_backend_failures(
    user_id: UserId,
    caller: Caller,
    #[case] failure: BackendError,
    #[case] code: ErrorCode,
    #[case] detail_code: Option<&str>,
) {
    let mut repo = MockProfileRepository::new();
    repo.expect_insert_if_absent()
        .return_once(move |_, _| Err(failure));

    let error = make_service(repo)
        .ensure_profile(&caller, &user_id, Username::generated(&user_id))
        .await
        .expect_err("backend failure");

    assert_eq!(error.code(), code);
    assert_eq!(error.detail_code(), detail_code);
}

#[rstest]
#[tokio::test]
async fn require_profile_reports_not_found(user_id: UserId, caller: Caller) {
    let mut repo = MockProfileRepository::new();
    repo.expect_find_by_id().returning(|_, _| Ok(None));

    let error = make_service(repo)
        .require_profile(&caller, &user_id)
        .await
        .expect_err("no profile");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "Profile not found");
}

#[rstest]
#[tokio::test]
async fn upsert_keeps_stored_fields_not_supplied(user_id: UserId, caller: Caller) {
    let mut repo = MockProfileRepository::new();
    let mut existing = stored_profile(&user_id, "ada");
    existing.avatar_url = Some("https://img.example/ada.png".to_owned());
    repo.expect_find_by_id()
        .return_once(move |_, _| Ok(Some(existing)));
    repo.expect_upsert()
        .withf(|_, row| {
            row.username.as_ref() == "ada"
                && row.avatar_url.as_deref() == Some("https://img.example/new.png")
                && row.updated_at == fixture_timestamp()
        })
        .times(1)
        .returning(|_, row| {
            Ok(Profile {
                id: row.id.clone(),
                username: row.username.clone(),
                avatar_url: row.avatar_url.clone(),
                created_at: None,
                updated_at: Some(row.updated_at),
            })
        });

    let changes = ProfileChanges::try_from_parts(None, Some("https://img.example/new.png"))
        .expect("valid changes");
    let profile = make_service(repo)
        .upsert_profile(&caller, &user_id, changes)
        .await
        .expect("upsert succeeds");

    assert_eq!(profile.username.as_ref(), "ada");
    assert_eq!(profile.avatar_url.as_deref(), Some("https://img.example/new.png"));
}

#[rstest]
#[tokio::test]
async fn upsert_generates_username_for_new_profile(user_id: UserId, caller: Caller) {
    let mut repo = MockProfileRepository::new();
    repo.expect_find_by_id().returning(|_, _| Ok(None));
    repo.expect_upsert()
        .withf(|_, row| row.username.as_ref() == "user_3fa85f64" && row.avatar_url.is_none())
        .times(1)
        .returning(|_, row| Ok(stored_profile(&row.id, row.username.as_ref())));

    let profile = make_service(repo)
        .upsert_profile(&caller, &user_id, ProfileChanges::default())
        .await
        .expect("upsert succeeds");

    assert_eq!(profile.username.as_ref(), "user_3fa85f64");
}
