//! Service behaviour over the bundled sample files.

use std::path::{Path, PathBuf};

use chatapp_api::fixture::{
    FRIENDS_BAD_SAMPLE, FRIENDS_EMPTY_SAMPLE, FRIENDS_SAMPLE, MESSAGES_BAD_SAMPLE, MESSAGES_EMPTY_SAMPLE,
    MESSAGES_SAMPLE, MESSAGES_WRITE_SAMPLE, USERS_BAD_SAMPLE,
};
use chatapp_api::{
    FixtureFriendsService, FixtureMessagesFetchService, FixtureMessagesStoreService, FixtureUserService,
    FriendsFetchService, MessagesFetchService, MessagesStoreService, UserFetchService,
};
use chatapp_net::NetworkError;
use chatapp_types::{Message, codec};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
}

fn source_len(file: &str) -> usize {
    codec::decode_users(&std::fs::read(fixtures().join(format!("{file}.json"))).unwrap())
        .unwrap()
        .len()
}

#[tokio::test]
async fn login_pair_fetches_that_user() {
    let service = FixtureUserService::new(&fixtures());
    let user = service.fetch_user("Ajs", "S@thish25").await.unwrap();
    assert_eq!(user.username, "Ajs");
    assert_eq!(user.password, "S@thish25");
}

#[tokio::test]
async fn wrong_password_is_data_not_found() {
    let service = FixtureUserService::new(&fixtures());
    let err = service.fetch_user("Ajs", "S@thish").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "The response is data not found.");
}

#[tokio::test]
async fn bad_users_file_is_parse_error() {
    let service = FixtureUserService::with_content_file(&fixtures(), USERS_BAD_SAMPLE);
    let err = service.fetch_user("Ajs", "S@thish25").await.unwrap_err();
    assert!(err.is_parsing());
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn switched_off_service_reports_testing() {
    let service = FixtureUserService::new(&fixtures()).with_success(false);
    assert!(matches!(service.fetch_user("Ajs", "S@thish25").await, Err(NetworkError::Testing)));
}

#[tokio::test]
async fn friends_exclude_the_caller() {
    let service = FixtureFriendsService::new(&fixtures());
    let friends = service.fetch_friends("Ajs", "S@thish25").await.unwrap();

    assert!(!friends.is_empty());
    assert!(friends.iter().all(|u| !u.matches_credentials("Ajs", "S@thish25")));
    assert_eq!(friends.len(), source_len(FRIENDS_SAMPLE) - 1);
}

#[tokio::test]
async fn friends_for_unknown_caller_are_the_whole_list() {
    let service = FixtureFriendsService::new(&fixtures());
    let friends = service.fetch_friends("Ajs", "wrong").await.unwrap();
    assert_eq!(friends.len(), source_len(FRIENDS_SAMPLE));
}

#[tokio::test]
async fn friends_empty_and_bad_files() {
    let empty = FixtureFriendsService::with_content_file(&fixtures(), FRIENDS_EMPTY_SAMPLE);
    assert!(empty.fetch_friends("Ajs", "S@thish25").await.unwrap().is_empty());

    let bad = FixtureFriendsService::with_content_file(&fixtures(), FRIENDS_BAD_SAMPLE);
    assert!(bad.fetch_friends("Ajs", "S@thish25").await.unwrap_err().is_parsing());
}

#[tokio::test]
async fn login_against_empty_list_is_data_not_found() {
    let service = FixtureUserService::with_content_file(&fixtures(), FRIENDS_EMPTY_SAMPLE);
    assert!(service.fetch_user("Ajs", "S@thish25").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn messages_stay_within_the_pair() {
    let service = FixtureMessagesFetchService::with_content_file(&fixtures(), MESSAGES_SAMPLE);
    let messages = service.fetch_messages("Ajs", "A_JS_H").await.unwrap();

    assert!(!messages.is_empty());
    assert!(messages.iter().all(|m| m.is_between("Ajs", "A_JS_H")));

    let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted, "source order preserved");
}

#[tokio::test]
async fn messages_empty_and_bad_files() {
    let empty = FixtureMessagesFetchService::with_content_file(&fixtures(), MESSAGES_EMPTY_SAMPLE);
    assert!(empty.fetch_messages("Ajs", "A_JS_H").await.unwrap().is_empty());

    let bad = FixtureMessagesFetchService::with_content_file(&fixtures(), MESSAGES_BAD_SAMPLE);
    let err = bad.fetch_messages("Ajs", "A_JS_H").await.unwrap_err();
    assert!(err.is_parsing());
}

#[tokio::test]
async fn store_then_fetch_grows_conversation_by_one() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(
        fixtures().join(format!("{MESSAGES_WRITE_SAMPLE}.json")),
        dir.path().join(format!("{MESSAGES_WRITE_SAMPLE}.json")),
    )
    .unwrap();

    let fetch = FixtureMessagesFetchService::with_content_file(dir.path(), MESSAGES_WRITE_SAMPLE);
    let store = FixtureMessagesStoreService::new(dir.path());

    let before = fetch.fetch_messages("Ajs", "A_JS_H").await.unwrap().len();
    let message = Message::new("1", "Ajs", "A_JS_H", "Test messes wrtie", "2024-10-09 04:16:53.338");
    assert!(store.store_message("Ajs", &message).await.unwrap());

    let after = fetch.fetch_messages("Ajs", "A_JS_H").await.unwrap();
    assert_eq!(after.len(), before + 1);
    assert_eq!(after.last(), Some(&message));
}

#[tokio::test]
async fn store_into_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = FixtureMessagesStoreService::new(dir.path());
    let message = Message::new_outgoing("Ajs", "A_JS_H", "hi");
    assert!(matches!(
        store.store_message("Ajs", &message).await,
        Err(NetworkError::File(chatapp_types::FileError::NotFound))
    ));
}
