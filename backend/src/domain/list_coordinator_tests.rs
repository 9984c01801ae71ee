//! Tests for the ownership and sharing coordinator.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockall::Sequence;
use rstest::rstest;
use serde_json::json;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    AccessIndexRepositoryError, MockAccessIndexRepository, MockListIdGenerator,
    MockListRepository, UuidV7ListIdGenerator,
};
use crate::test_support::{MutableClock, RecordingConsistencyMonitor, fixture_timestamp, user};

fn build<G: ListIdGenerator>(
    lists: MockListRepository,
    index: MockAccessIndexRepository,
    ids: G,
) -> (
    ListCoordinator<MockListRepository, MockAccessIndexRepository, G>,
    Arc<RecordingConsistencyMonitor>,
) {
    let monitor = Arc::new(RecordingConsistencyMonitor::default());
    let coordinator = ListCoordinator::new(
        Arc::new(lists),
        Arc::new(index),
        Arc::new(ids),
        Arc::new(MutableClock::default()),
        monitor.clone(),
    );
    (coordinator, monitor)
}

fn groceries(guests: &[&str]) -> List {
    let mut list = List::new(
        ListId::generate(),
        user("alice"),
        ListName::new("Groceries").expect("valid name"),
        "milk",
        fixture_timestamp(),
    );
    list.guests = guests.iter().map(|guest| user(guest)).collect();
    list
}

fn record(username: &str, owned: &[&List], shared: &[&List]) -> AccessRecord {
    let mut record = AccessRecord::empty(user(username));
    record.owned = owned.iter().map(|list| ListLink::for_list(list)).collect();
    record.shared = shared.iter().map(|list| ListLink::for_list(list)).collect();
    record
}

fn expect_records(index: &mut MockAccessIndexRepository, records: Vec<AccessRecord>) {
    index.expect_find_by_username().returning(move |username| {
        Ok(records
            .iter()
            .find(|record| &record.username == username)
            .cloned())
    });
}

fn expect_list(lists: &mut MockListRepository, list: &List) {
    let stored = list.clone();
    lists
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
}

fn create_request(name: &str) -> CreateListRequest {
    CreateListRequest {
        name: name.to_owned(),
        content: "milk".to_owned(),
    }
}

#[rstest]
#[tokio::test]
async fn create_list_writes_list_before_owned_link() {
    let id = ListId::generate();
    let mut seq = Sequence::new();
    let mut ids = MockListIdGenerator::new();
    ids.expect_next_id().times(1).return_const(id);
    let mut lists = MockListRepository::new();
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![AccessRecord::empty(user("alice"))]);
    lists
        .expect_insert()
        .withf(move |list: &List| {
            list.id == id
                && list.owner.as_ref() == "alice"
                && list.guests.is_empty()
                && list.name.as_ref() == "Groceries"
                && list.last_changed == fixture_timestamp()
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    index
        .expect_push_link()
        .withf(move |username: &Username, kind: &LinkKind, link: &ListLink| {
            username.as_ref() == "alice"
                && *kind == LinkKind::Owned
                && link.id == id
                && link.display_name.as_ref() == "Groceries"
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(SetMutation::Applied));
    let (coordinator, monitor) = build(lists, index, ids);

    let created = coordinator
        .create_list(&user("alice"), create_request("  Groceries "))
        .await
        .expect("list created");

    assert_eq!(created, id);
    assert!(monitor.reports().is_empty());
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn create_list_rejects_blank_names_without_store_calls(#[case] name: &str) {
    let (coordinator, _) = build(
        MockListRepository::new(),
        MockAccessIndexRepository::new(),
        UuidV7ListIdGenerator,
    );

    let err = coordinator
        .create_list(&user("alice"), create_request(name))
        .await
        .expect_err("blank name");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn create_list_for_unregistered_owner_creates_nothing() {
    let mut lists = MockListRepository::new();
    lists.expect_insert().times(0);
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, Vec::new());
    let (coordinator, _) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .create_list(&user("alice"), create_request("Groceries"))
        .await
        .expect_err("unregistered owner");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn create_list_reports_orphan_when_owned_link_fails() {
    let mut lists = MockListRepository::new();
    lists.expect_insert().times(1).returning(|_| Ok(()));
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![AccessRecord::empty(user("alice"))]);
    index
        .expect_push_link()
        .times(1)
        .returning(|_, _, _| Err(AccessIndexRepositoryError::timeout("push_link")));
    let (coordinator, monitor) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .create_list(&user("alice"), create_request("Groceries"))
        .await
        .expect_err("link failure");

    assert_eq!(err.code(), ErrorCode::StoreUnavailable);
    let reports = monitor.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind, InconsistencyKind::OrphanedList);
    assert_eq!(reports[0].username.as_ref(), "alice");
    assert_eq!(reports[0].step, "push_owned_link");
    assert!(reports[0].cause.is_some());
}

#[rstest]
#[tokio::test]
async fn create_list_regenerates_colliding_ids() {
    let first = ListId::generate();
    let second = ListId::generate();
    let mut seq = Sequence::new();
    let mut ids = MockListIdGenerator::new();
    ids.expect_next_id()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(first);
    ids.expect_next_id()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(second);
    let mut lists = MockListRepository::new();
    lists
        .expect_insert()
        .withf(move |list: &List| list.id == first)
        .times(1)
        .returning(move |_| Err(ListRepositoryError::duplicate_key(first.to_string())));
    lists
        .expect_insert()
        .withf(move |list: &List| list.id == second)
        .times(1)
        .returning(|_| Ok(()));
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![AccessRecord::empty(user("alice"))]);
    index
        .expect_push_link()
        .withf(move |_: &Username, _: &LinkKind, link: &ListLink| link.id == second)
        .times(1)
        .returning(|_, _, _| Ok(SetMutation::Applied));
    let (coordinator, _) = build(lists, index, ids);

    let created = coordinator
        .create_list(&user("alice"), create_request("Groceries"))
        .await
        .expect("second id accepted");
    assert_eq!(created, second);
}

#[rstest]
#[tokio::test]
async fn create_list_gives_up_after_repeated_collisions() {
    let mut ids = MockListIdGenerator::new();
    ids.expect_next_id()
        .times(MAX_ID_ATTEMPTS)
        .returning(ListId::generate);
    let mut lists = MockListRepository::new();
    lists
        .expect_insert()
        .times(MAX_ID_ATTEMPTS)
        .returning(|list| Err(ListRepositoryError::duplicate_key(list.id.to_string())));
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![AccessRecord::empty(user("alice"))]);
    index.expect_push_link().times(0);
    let (coordinator, _) = build(lists, index, ids);

    let err = coordinator
        .create_list(&user("alice"), create_request("Groceries"))
        .await
        .expect_err("collisions exhausted");
    assert_eq!(err.code(), ErrorCode::AlreadyExists);
}

#[rstest]
#[tokio::test]
async fn get_list_returns_list_to_linked_owner() {
    let list = groceries(&[]);
    let mut lists = MockListRepository::new();
    expect_list(&mut lists, &list);
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("alice", &[&list], &[])]);
    let (coordinator, _) = build(lists, index, UuidV7ListIdGenerator);

    let fetched = coordinator
        .get_list(&user("alice"), &list.id)
        .await
        .expect("owner reads list");
    assert_eq!(fetched, list);
}

#[rstest]
#[tokio::test]
async fn get_list_of_missing_list_is_not_found() {
    let mut lists = MockListRepository::new();
    lists.expect_find_by_id().times(1).returning(|_| Ok(None));
    let (coordinator, _) = build(lists, MockAccessIndexRepository::new(), UuidV7ListIdGenerator);

    let err = coordinator
        .get_list(&user("alice"), &ListId::generate())
        .await
        .expect_err("missing list");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn get_list_denies_and_reports_stale_shared_link() {
    let list = groceries(&[]);
    let mut lists = MockListRepository::new();
    expect_list(&mut lists, &list);
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("bob", &[], &[&list])]);
    let (coordinator, monitor) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .get_list(&user("bob"), &list.id)
        .await
        .expect_err("stale link grants nothing");

    assert_eq!(err.code(), ErrorCode::AccessDenied);
    assert_eq!(monitor.kinds(), vec![InconsistencyKind::StaleSharedLink]);
}

#[rstest]
#[tokio::test]
async fn get_list_denies_guest_missing_shared_link() {
    let list = groceries(&["bob"]);
    let mut lists = MockListRepository::new();
    expect_list(&mut lists, &list);
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("bob", &[], &[])]);
    let (coordinator, monitor) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .get_list(&user("bob"), &list.id)
        .await
        .expect_err("fails closed");

    assert_eq!(err.code(), ErrorCode::AccessDenied);
    assert_eq!(monitor.kinds(), vec![InconsistencyKind::MissingSharedLink]);
}

#[rstest]
#[tokio::test]
async fn delete_by_guest_is_denied_without_touching_the_list() {
    let list = groceries(&["bob"]);
    let mut lists = MockListRepository::new();
    lists.expect_find_by_id().times(0);
    lists.expect_delete().times(0);
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("bob", &[], &[&list])]);
    let (coordinator, _) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .delete_list(&user("bob"), &list.id)
        .await
        .expect_err("guest cannot delete");
    assert_eq!(err.code(), ErrorCode::AccessDenied);
}

#[rstest]
#[tokio::test]
async fn delete_by_unrelated_user_is_denied() {
    let list = groceries(&[]);
    let mut lists = MockListRepository::new();
    expect_list(&mut lists, &list);
    lists.expect_delete().times(0);
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("mallory", &[], &[])]);
    let (coordinator, monitor) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .delete_list(&user("mallory"), &list.id)
        .await
        .expect_err("stranger cannot delete");

    assert_eq!(err.code(), ErrorCode::AccessDenied);
    assert!(monitor.reports().is_empty());
}

#[rstest]
#[tokio::test]
async fn delete_continues_when_guest_cleanup_fails() {
    let list = groceries(&["bob", "carol"]);
    let mut seq = Sequence::new();
    let mut lists = MockListRepository::new();
    expect_list(&mut lists, &list);
    lists
        .expect_delete()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(1));
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("alice", &[&list], &[])]);
    index
        .expect_pull_link()
        .withf(|username: &Username, kind: &LinkKind, _: &ListId| {
            username.as_ref() == "alice" && *kind == LinkKind::Owned
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(SetMutation::Applied));
    index
        .expect_pull_link()
        .withf(|username: &Username, kind: &LinkKind, _: &ListId| {
            username.as_ref() == "bob" && *kind == LinkKind::Shared
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Err(AccessIndexRepositoryError::connection("reset")));
    index
        .expect_pull_link()
        .withf(|username: &Username, kind: &LinkKind, _: &ListId| {
            username.as_ref() == "carol" && *kind == LinkKind::Shared
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(SetMutation::Applied));
    let (coordinator, monitor) = build(lists, index, UuidV7ListIdGenerator);

    coordinator
        .delete_list(&user("alice"), &list.id)
        .await
        .expect("delete succeeds despite cleanup failure");

    let reports = monitor.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind, InconsistencyKind::DanglingLink);
    assert_eq!(reports[0].username.as_ref(), "bob");
    assert_eq!(reports[0].step, "pull_guest_shared_link");
}

#[rstest]
#[tokio::test]
async fn delete_of_vanished_list_clears_dangling_owned_link() {
    let list = groceries(&[]);
    let mut lists = MockListRepository::new();
    lists.expect_find_by_id().times(1).returning(|_| Ok(None));
    lists.expect_delete().times(0);
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("alice", &[&list], &[])]);
    let list_id = list.id;
    index
        .expect_pull_link()
        .withf(move |_: &Username, kind: &LinkKind, id: &ListId| {
            *kind == LinkKind::Owned && *id == list_id
        })
        .times(1)
        .returning(|_, _, _| Ok(SetMutation::Applied));
    let (coordinator, _) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .delete_list(&user("alice"), &list.id)
        .await
        .expect_err("list already gone");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn owner_can_delete_orphaned_list() {
    let list = groceries(&[]);
    let mut lists = MockListRepository::new();
    expect_list(&mut lists, &list);
    lists.expect_delete().times(1).returning(|_| Ok(1));
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("alice", &[], &[])]);
    index
        .expect_pull_link()
        .times(1)
        .returning(|_, _, _| Ok(SetMutation::Unchanged));
    let (coordinator, _) = build(lists, index, UuidV7ListIdGenerator);

    coordinator
        .delete_list(&user("alice"), &list.id)
        .await
        .expect("orphan deleted by its owner");
}

#[rstest]
#[tokio::test]
async fn share_with_self_is_invalid() {
    let (coordinator, _) = build(
        MockListRepository::new(),
        MockAccessIndexRepository::new(),
        UuidV7ListIdGenerator,
    );

    let err = coordinator
        .share_list(&user("alice"), &user("alice"), &ListId::generate())
        .await
        .expect_err("self share");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn share_by_non_owner_is_denied() {
    let list = groceries(&["bob"]);
    let mut lists = MockListRepository::new();
    lists.expect_add_guest().times(0);
    let mut index = MockAccessIndexRepository::new();
    expect_records(
        &mut index,
        vec![record("bob", &[], &[&list]), record("carol", &[], &[])],
    );
    let (coordinator, _) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .share_list(&user("bob"), &user("carol"), &list.id)
        .await
        .expect_err("guest cannot reshare");
    assert_eq!(err.code(), ErrorCode::AccessDenied);
}

#[rstest]
#[tokio::test]
async fn share_with_unregistered_guest_is_not_found() {
    let list = groceries(&[]);
    let mut lists = MockListRepository::new();
    lists.expect_add_guest().times(0);
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("alice", &[&list], &[])]);
    let (coordinator, _) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .share_list(&user("alice"), &user("ghost"), &list.id)
        .await
        .expect_err("unknown guest");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn share_adds_guest_before_shared_link() {
    let list = groceries(&[]);
    let mut seq = Sequence::new();
    let mut lists = MockListRepository::new();
    expect_list(&mut lists, &list);
    lists
        .expect_add_guest()
        .withf(|_: &ListId, guest: &Username| guest.as_ref() == "bob")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(SetMutation::Applied));
    let mut index = MockAccessIndexRepository::new();
    expect_records(
        &mut index,
        vec![record("alice", &[&list], &[]), record("bob", &[], &[])],
    );
    index
        .expect_push_link()
        .withf(|username: &Username, kind: &LinkKind, link: &ListLink| {
            username.as_ref() == "bob"
                && *kind == LinkKind::Shared
                && link.display_name.as_ref() == "Groceries"
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(SetMutation::Applied));
    let (coordinator, _) = build(lists, index, UuidV7ListIdGenerator);

    coordinator
        .share_list(&user("alice"), &user("bob"), &list.id)
        .await
        .expect("shared");
}

#[rstest]
#[tokio::test]
async fn share_reports_missing_shared_link_when_second_step_fails() {
    let list = groceries(&[]);
    let mut lists = MockListRepository::new();
    expect_list(&mut lists, &list);
    lists
        .expect_add_guest()
        .times(1)
        .returning(|_, _| Ok(SetMutation::Applied));
    let mut index = MockAccessIndexRepository::new();
    expect_records(
        &mut index,
        vec![record("alice", &[&list], &[]), record("bob", &[], &[])],
    );
    index
        .expect_push_link()
        .times(1)
        .returning(|_, _, _| Err(AccessIndexRepositoryError::timeout("push_link")));
    let (coordinator, monitor) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .share_list(&user("alice"), &user("bob"), &list.id)
        .await
        .expect_err("second step failed");

    assert_eq!(err.code(), ErrorCode::StoreUnavailable);
    let reports = monitor.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind, InconsistencyKind::MissingSharedLink);
    assert_eq!(reports[0].username.as_ref(), "bob");
}

#[rstest]
#[tokio::test]
async fn owner_cannot_unshare() {
    let list = groceries(&[]);
    let mut lists = MockListRepository::new();
    lists.expect_remove_guest().times(0);
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("alice", &[&list], &[])]);
    let (coordinator, _) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .unshare_list(&user("alice"), &list.id)
        .await
        .expect_err("owner unshare");

    assert_eq!(err.code(), ErrorCode::AccessDenied);
    assert_eq!(err.details(), Some(&json!({ "code": "owner_cannot_unshare" })));
}

#[rstest]
#[tokio::test]
async fn unshare_without_link_is_not_found() {
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("bob", &[], &[])]);
    let (coordinator, _) = build(MockListRepository::new(), index, UuidV7ListIdGenerator);

    let err = coordinator
        .unshare_list(&user("bob"), &ListId::generate())
        .await
        .expect_err("nothing to unshare");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn unshare_removes_guest_before_shared_link() {
    let list = groceries(&["bob"]);
    let mut seq = Sequence::new();
    let mut lists = MockListRepository::new();
    lists
        .expect_remove_guest()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(SetMutation::Applied));
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("bob", &[], &[&list])]);
    index
        .expect_pull_link()
        .withf(|username: &Username, kind: &LinkKind, _: &ListId| {
            username.as_ref() == "bob" && *kind == LinkKind::Shared
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(SetMutation::Applied));
    let (coordinator, monitor) = build(lists, index, UuidV7ListIdGenerator);

    coordinator
        .unshare_list(&user("bob"), &list.id)
        .await
        .expect("unshared");
    assert!(monitor.reports().is_empty());
}

#[rstest]
#[tokio::test]
async fn unshare_of_deleted_list_still_drops_the_link() {
    let list = groceries(&["bob"]);
    let mut lists = MockListRepository::new();
    lists
        .expect_remove_guest()
        .times(1)
        .returning(|_, _| Ok(SetMutation::MissingRecord));
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("bob", &[], &[&list])]);
    index
        .expect_pull_link()
        .times(1)
        .returning(|_, _, _| Ok(SetMutation::Applied));
    let (coordinator, monitor) = build(lists, index, UuidV7ListIdGenerator);

    coordinator
        .unshare_list(&user("bob"), &list.id)
        .await
        .expect("dangling link removed");
    assert_eq!(monitor.kinds(), vec![InconsistencyKind::DanglingLink]);
}

#[rstest]
#[tokio::test]
async fn revoke_of_non_guest_is_not_found() {
    let list = groceries(&[]);
    let mut lists = MockListRepository::new();
    expect_list(&mut lists, &list);
    lists.expect_remove_guest().times(0);
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("alice", &[&list], &[])]);
    let (coordinator, _) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .revoke_guest(&user("alice"), &user("bob"), &list.id)
        .await
        .expect_err("bob is not a guest");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn update_without_access_never_writes() {
    let mut lists = MockListRepository::new();
    lists.expect_update_content().times(0);
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("mallory", &[], &[])]);
    let (coordinator, _) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .update_list(&user("mallory"), &ListId::generate(), "hijacked".to_owned())
        .await
        .expect_err("no access");
    assert_eq!(err.code(), ErrorCode::AccessDenied);
}

#[rstest]
#[tokio::test]
async fn update_through_dangling_link_is_denied_without_writing() {
    let deleted = groceries(&["bob"]);
    let mut lists = MockListRepository::new();
    lists.expect_find_by_id().returning(|_| Ok(None));
    lists.expect_update_content().times(0);
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("bob", &[], &[&deleted])]);
    let (coordinator, monitor) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .update_list(&user("bob"), &deleted.id, "milk,eggs".to_owned())
        .await
        .expect_err("dangling link grants nothing");

    assert_eq!(err.code(), ErrorCode::AccessDenied);
    assert_eq!(monitor.kinds(), vec![InconsistencyKind::DanglingLink]);
}

#[rstest]
#[tokio::test]
async fn update_through_stale_guest_link_is_denied_without_writing() {
    let list = groceries(&[]);
    let mut lists = MockListRepository::new();
    expect_list(&mut lists, &list);
    lists.expect_update_content().times(0);
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("bob", &[], &[&list])]);
    let (coordinator, monitor) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .update_list(&user("bob"), &list.id, "milk,eggs".to_owned())
        .await
        .expect_err("revoked guest");

    assert_eq!(err.code(), ErrorCode::AccessDenied);
    assert_eq!(monitor.kinds(), vec![InconsistencyKind::StaleSharedLink]);
}

#[rstest]
#[tokio::test]
async fn update_is_denied_when_the_list_store_is_unreachable() {
    let list = groceries(&["bob"]);
    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_id()
        .returning(|_| Err(ListRepositoryError::connection("refused")));
    lists.expect_update_content().times(0);
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("bob", &[], &[&list])]);
    let (coordinator, monitor) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .update_list(&user("bob"), &list.id, "milk,eggs".to_owned())
        .await
        .expect_err("lookup failed");

    assert_eq!(err.code(), ErrorCode::AccessDenied);
    assert!(monitor.reports().is_empty());
}

#[rstest]
#[case(Ok(0), ErrorCode::UpdateConflict)]
#[case(Err(ListRepositoryError::timeout("update_content")), ErrorCode::StoreUnavailable)]
#[case(Err(ListRepositoryError::connection("refused")), ErrorCode::StoreUnavailable)]
#[tokio::test]
async fn update_surfaces_unapplied_writes(
    #[case] outcome: Result<u64, ListRepositoryError>,
    #[case] expected: ErrorCode,
) {
    let list = groceries(&["bob"]);
    let mut lists = MockListRepository::new();
    expect_list(&mut lists, &list);
    lists
        .expect_update_content()
        .times(1)
        .return_once(move |_, _, _, _| outcome);
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("bob", &[], &[&list])]);
    let (coordinator, _) = build(lists, index, UuidV7ListIdGenerator);

    let err = coordinator
        .update_list(&user("bob"), &list.id, "milk,eggs".to_owned())
        .await
        .expect_err("write not applied");
    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn update_stamps_clock_time() {
    let list = groceries(&[]);
    let mut lists = MockListRepository::new();
    expect_list(&mut lists, &list);
    lists
        .expect_update_content()
        .withf(|_: &ListId, editor: &Username, content: &str, at: &DateTime<Utc>| {
            editor.as_ref() == "alice" && content == "milk,eggs" && *at == fixture_timestamp()
        })
        .times(1)
        .returning(|_, _, _, _| Ok(1));
    let mut index = MockAccessIndexRepository::new();
    expect_records(&mut index, vec![record("alice", &[&list], &[])]);
    let (coordinator, _) = build(lists, index, UuidV7ListIdGenerator);

    coordinator
        .update_list(&user("alice"), &list.id, "milk,eggs".to_owned())
        .await
        .expect("updated");
}

#[rstest]
#[tokio::test]
async fn registering_twice_is_already_exists() {
    let mut index = MockAccessIndexRepository::new();
    index
        .expect_insert()
        .times(1)
        .returning(|_| Err(AccessIndexRepositoryError::duplicate_user("alice")));
    let (coordinator, _) = build(MockListRepository::new(), index, UuidV7ListIdGenerator);

    let err = coordinator
        .register_user(&user("alice"))
        .await
        .expect_err("duplicate registration");
    assert_eq!(err.code(), ErrorCode::AlreadyExists);
}
