//! End-to-end facade behaviour over the in-process store.

mod common;

use futures_util::TryStreamExt;
use kv_gateway::domain::entities::{Expiry, ScanOptions, ScoredMember};
use kv_gateway::error::StoreError;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

#[tokio::test]
async fn test_set_get_round_trip() {
    let kv = common::create_test_service();

    kv.set("greeting", "hello").await.unwrap();
    assert_eq!(kv.get("greeting").await.unwrap(), Some("hello".to_string()));
    assert_eq!(kv.get("absent").await.unwrap(), None);
}

#[tokio::test]
async fn test_set_with_ttl_bounds_remaining_lifetime() {
    let kv = common::create_test_service();

    kv.set_with_ttl("session", "abc", 30).await.unwrap();

    let Expiry::Remaining(seconds) = kv.get_expire("session").await.unwrap() else {
        panic!("expected a TTL");
    };
    assert!(seconds > 0 && seconds <= 30);
}

#[tokio::test]
async fn test_set_with_zero_ttl_equals_plain_set() {
    let kv = common::create_test_service();

    kv.set_with_ttl("a", "1", 0).await.unwrap();
    kv.set("b", "1").await.unwrap();

    assert_eq!(kv.get_expire("a").await.unwrap(), Expiry::Persistent);
    assert_eq!(kv.get_expire("b").await.unwrap(), Expiry::Persistent);
    assert_eq!(kv.get_expire("c").await.unwrap(), Expiry::Missing);
    assert_eq!(kv.get("a").await.unwrap(), kv.get("b").await.unwrap());
}

#[tokio::test]
async fn test_out_of_range_ttl_is_an_error() {
    let kv = common::create_test_service();

    let err = kv.set_with_ttl("k", "v", i64::MAX).await.unwrap_err();
    assert!(matches!(err, StoreError::Operation(_)));
    assert_eq!(kv.get("k").await.unwrap(), None);

    kv.set("k", "v").await.unwrap();
    assert!(kv.set_expire("k", i64::MAX).await.is_err());
    assert_eq!(kv.get_expire("k").await.unwrap(), Expiry::Persistent);
}

#[tokio::test]
async fn test_negative_increment_leaves_value_untouched() {
    let kv = common::create_test_service();
    kv.set("counter", "5").await.unwrap();

    let err = kv.increment("counter", -1).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));
    assert_eq!(kv.get("counter").await.unwrap(), Some("5".to_string()));

    assert_eq!(kv.increment("counter", 3).await.unwrap(), 8);
    assert_eq!(kv.decrement("counter", 10).await.unwrap(), -2);
}

#[tokio::test]
async fn test_inverted_score_range_removes_nothing() {
    let kv = common::create_test_service();
    kv.z_add(
        "board",
        &[ScoredMember::new("a", 1.0), ScoredMember::new("b", 2.0)],
    )
    .await
    .unwrap();

    assert_eq!(kv.z_rem_range_by_score("board", 2.0, 1.0).await.unwrap(), 0);
    assert_eq!(kv.z_card("board").await.unwrap(), 2);

    assert_eq!(kv.z_rem_range_by_score("board", 1.0, 1.5).await.unwrap(), 1);
    assert_eq!(kv.z_card("board").await.unwrap(), 1);
}

#[tokio::test]
async fn test_set_if_absent() {
    let kv = common::create_test_service();

    assert!(kv.set_if_absent("lock", "owner-1").await.unwrap());
    assert!(!kv.set_if_absent("lock", "owner-2").await.unwrap());
    assert_eq!(kv.get("lock").await.unwrap(), Some("owner-1".to_string()));

    assert!(!kv.set_if_present("other", "x").await.unwrap());
    assert!(kv.set_if_present("lock", "owner-3").await.unwrap());
}

#[tokio::test]
async fn test_set_if_absent_with_ttl() {
    let kv = common::create_test_service();

    assert!(kv.set_if_absent_with_ttl("lock", "a", 60).await.unwrap());
    assert!(matches!(
        kv.get_expire("lock").await.unwrap(),
        Expiry::Remaining(_)
    ));

    // A non-positive TTL still honours the condition.
    assert!(!kv.set_if_absent_with_ttl("lock", "b", 0).await.unwrap());
}

#[tokio::test]
async fn test_sorted_set_ordering() {
    let kv = common::create_test_service();
    kv.z_add(
        "z",
        &[
            ScoredMember::new("b", 2.0),
            ScoredMember::new("a", 1.0),
            ScoredMember::new("c", 3.0),
        ],
    )
    .await
    .unwrap();

    assert_eq!(kv.z_range("z", 0, -1).await.unwrap(), vec!["a", "b", "c"]);
    assert_eq!(kv.z_reverse_range("z", 0, -1).await.unwrap(), vec!["c", "b", "a"]);
    assert_eq!(kv.z_rank("z", "a").await.unwrap(), Some(0));
    assert_eq!(kv.z_reverse_rank("z", "a").await.unwrap(), Some(2));
    assert_eq!(kv.z_rank("z", "missing").await.unwrap(), None);

    let by_score = kv.z_range_by_score("z", 1.5, 3.0).await.unwrap();
    assert_eq!(
        by_score,
        vec![ScoredMember::new("b", 2.0), ScoredMember::new("c", 3.0)]
    );
    assert_eq!(
        kv.z_range_by_score_members("z", 0.0, 1.0).await.unwrap(),
        vec!["a"]
    );

    let reversed = kv
        .z_reverse_range_by_score_with_scores("z", 1.0, 2.0)
        .await
        .unwrap();
    assert_eq!(
        reversed,
        vec![ScoredMember::new("b", 2.0), ScoredMember::new("a", 1.0)]
    );

    assert_eq!(kv.z_count("z", 1.0, 2.0).await.unwrap(), 2);
    assert_eq!(kv.z_incr_by("z", "a", 5).await.unwrap(), 6.0);
    assert_eq!(kv.z_score("z", "a").await.unwrap(), Some(6.0));
    assert_eq!(kv.z_range("z", 0, 0).await.unwrap(), vec!["b"]);
}

#[tokio::test]
async fn test_list_set_get_and_update() {
    let kv = common::create_test_service();

    kv.l_set("list", &["x", "y"]).await.unwrap();
    assert_eq!(kv.l_get("list", 0, -1).await.unwrap(), vec!["x", "y"]);

    kv.l_update_index("list", 1, "z").await.unwrap();
    assert_eq!(kv.l_get("list", 0, -1).await.unwrap(), vec!["x", "z"]);
    assert_eq!(kv.l_get_index("list", -1).await.unwrap(), Some("z".to_string()));

    let err = kv.l_update_index("list", 5, "w").await.unwrap_err();
    assert!(matches!(err, StoreError::Operation(_)));
}

#[tokio::test]
async fn test_list_push_pop_with_ttl() {
    let kv = common::create_test_service();

    let len = kv
        .l_left_push_all("jobs", &["a", "b"], Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(len, 2);
    assert_eq!(kv.l_get("jobs", 0, -1).await.unwrap(), vec!["b", "a"]);
    assert!(matches!(
        kv.get_expire("jobs").await.unwrap(),
        Expiry::Remaining(_)
    ));

    kv.l_right_push("jobs", "c", Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(kv.l_left_pop("jobs").await.unwrap(), Some("b".to_string()));
    assert_eq!(kv.l_right_pop("jobs").await.unwrap(), Some("c".to_string()));
    assert_eq!(kv.l_size("jobs").await.unwrap(), 1);
}

#[tokio::test]
async fn test_hash_operations() {
    let kv = common::create_test_service();

    kv.hset("user:1", "name", "ada").await.unwrap();
    kv.hmset(
        "user:1",
        &HashMap::from([("score".to_string(), "10".to_string())]),
    )
    .await
    .unwrap();

    assert!(kv.hhas_key("user:1", "name").await.unwrap());
    assert_eq!(kv.hincr("user:1", "score", 2.5).await.unwrap(), 12.5);
    assert_eq!(kv.hdecr("user:1", "score", 0.5).await.unwrap(), 12.0);

    let all = kv.hget_all("user:1").await.unwrap();
    assert_eq!(all.get("name"), Some(&"ada".to_string()));

    assert_eq!(kv.hdel("user:1", &["name", "missing"]).await.unwrap(), 1);
    assert_eq!(kv.hget("user:1", "name").await.unwrap(), None);
}

#[tokio::test]
async fn test_set_operations() {
    let kv = common::create_test_service();

    assert_eq!(kv.s_add("tags", &["a", "b", "a"]).await.unwrap(), 2);
    assert_eq!(kv.s_size("tags").await.unwrap(), 2);
    assert!(kv.s_is_member("tags", "a").await.unwrap());

    let random = kv.s_random_member("tags").await.unwrap().unwrap();
    assert!(random == "a" || random == "b");

    assert_eq!(
        kv.s_members("tags").await.unwrap(),
        HashSet::from(["a".to_string(), "b".to_string()])
    );
    assert_eq!(kv.s_remove("tags", &["a", "z"]).await.unwrap(), 1);
    assert_eq!(kv.s_random_member("empty").await.unwrap(), None);
}

#[tokio::test]
async fn test_wrong_type_is_an_error_not_a_miss() {
    let kv = common::create_test_service();
    kv.s_add("tags", &["a"]).await.unwrap();

    assert!(matches!(
        kv.get("tags").await,
        Err(StoreError::WrongType(_))
    ));
}

#[tokio::test]
async fn test_delete_and_exists() {
    let kv = common::create_test_service();
    kv.set("a", "1").await.unwrap();
    kv.set("b", "1").await.unwrap();
    kv.set("c", "1").await.unwrap();

    assert_eq!(kv.delete(&["a"]).await.unwrap(), 1);
    assert!(!kv.exists("a").await.unwrap());
    assert_eq!(kv.delete(&["b", "c", "d"]).await.unwrap(), 2);
    assert!(kv.keys("*").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_batch_reads_and_writes() {
    let kv = common::create_test_service();

    kv.multi_set(&HashMap::from([
        ("a".to_string(), "1".to_string()),
        ("b".to_string(), "2".to_string()),
    ]))
    .await
    .unwrap();

    assert_eq!(
        kv.multi_get(&["a", "missing", "b"]).await.unwrap(),
        vec![Some("1".to_string()), None, Some("2".to_string())]
    );
    assert_eq!(
        kv.pipelined_get(&["b", "missing"]).await.unwrap(),
        vec![Some(b"2".to_vec()), None]
    );
}

#[tokio::test]
async fn test_scans_cover_every_entry() {
    let kv = common::create_test_service();

    for i in 0..25 {
        kv.hset("h", &format!("field:{i}"), &i.to_string())
            .await
            .unwrap();
    }
    kv.hset("h", "other", "x").await.unwrap();

    let fields: Vec<(String, String)> = kv
        .h_scan("h", ScanOptions::new("field:*", 4))
        .try_collect()
        .await
        .unwrap();
    assert_eq!(fields.len(), 25);

    kv.z_add(
        "z",
        &[ScoredMember::new("a", 1.0), ScoredMember::new("b", 2.0)],
    )
    .await
    .unwrap();

    let members: Vec<ScoredMember> = kv
        .z_scan("z", ScanOptions::new("*", 1))
        .try_collect()
        .await
        .unwrap();
    assert_eq!(
        members,
        vec![ScoredMember::new("a", 1.0), ScoredMember::new("b", 2.0)]
    );
}

#[tokio::test]
async fn test_expire_overwrites_previous_ttl() {
    let kv = common::create_test_service();
    kv.set_with_ttl("k", "v", 100).await.unwrap();

    kv.set_expire("k", 5).await.unwrap();
    let Expiry::Remaining(seconds) = kv.get_expire("k").await.unwrap() else {
        panic!("expected a TTL");
    };
    assert!(seconds <= 5);

    // Non-positive values leave the TTL alone.
    kv.set_expire("k", 0).await.unwrap();
    assert!(matches!(
        kv.get_expire("k").await.unwrap(),
        Expiry::Remaining(_)
    ));
}
