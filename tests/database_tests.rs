#![allow(clippy::unwrap_used)]

mod common;

use chrono::Duration;
use common::{base_time, setup_test_db};
use weather_alert_bot::database::models::*;

#[tokio::test]
async fn test_set_and_get_location() {
    let (db, _temp_dir) = setup_test_db().await;

    assert!(User::get_location(&db.pool, 1).await.unwrap().is_none());

    let london = Location::new(51.5074, -0.1278, "London, United Kingdom");
    User::set_location(&db.pool, 1, Some("alice"), &london).await.unwrap();
    assert_eq!(User::get_location(&db.pool, 1).await.unwrap(), Some(london));

    // Overwrites the location, keeps the username when none is given
    let leeds = Location::from_coordinates(53.8, -1.55);
    User::set_location(&db.pool, 1, None, &leeds).await.unwrap();
    let user = User::find_by_id(&db.pool, 1).await.unwrap().unwrap();
    assert_eq!(user.username.as_deref(), Some("alice"));
    assert_eq!(user.location(), Some(leeds));
    assert_eq!(User::count(&db.pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_subscribe_uses_kind_defaults() {
    let (db, _temp_dir) = setup_test_db().await;

    let sunny = Subscription::subscribe(&db.pool, 5, AlertKind::Sunny).await.unwrap();
    assert_eq!(sunny.kind, "sunny");
    assert_eq!(sunny.trigger_rule, "next_sunny_hour");
    assert_eq!(sunny.conditions, "clear_sky");
    assert!(sunny.active);

    let rain = Subscription::subscribe(&db.pool, 5, AlertKind::RainOrUv).await.unwrap();
    assert_eq!(rain.alert_kind(), Some(AlertKind::RainOrUv));
    assert_eq!(rain.trigger_rule, "08:00");

    let change = Subscription::subscribe(&db.pool, 5, AlertKind::ForecastChange).await.unwrap();
    assert_eq!(change.trigger_rule, "18:00");
    assert_eq!(change.conditions, "any_change");
}

#[tokio::test]
async fn test_duplicate_subscriptions_are_kept() {
    let (db, _temp_dir) = setup_test_db().await;

    Subscription::subscribe(&db.pool, 5, AlertKind::Sunny).await.unwrap();
    Subscription::subscribe(&db.pool, 5, AlertKind::Sunny).await.unwrap();

    let active = Subscription::list_active(&db.pool, 5).await.unwrap();
    assert_eq!(active.len(), 2);
    assert!(active[0].id < active[1].id);
}

#[tokio::test]
async fn test_deactivate_all_keeps_history() {
    let (db, _temp_dir) = setup_test_db().await;

    Subscription::subscribe(&db.pool, 9, AlertKind::Sunny).await.unwrap();
    Subscription::subscribe(&db.pool, 9, AlertKind::RainOrUv).await.unwrap();
    Subscription::subscribe(&db.pool, 10, AlertKind::Sunny).await.unwrap();

    assert_eq!(Subscription::deactivate_all(&db.pool, 9).await.unwrap(), 2);
    assert!(Subscription::list_active(&db.pool, 9).await.unwrap().is_empty());

    let history = Subscription::list_all(&db.pool, 9).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|s| !s.active));

    // Other users are untouched
    assert_eq!(Subscription::list_active(&db.pool, 10).await.unwrap().len(), 1);
    assert_eq!(Subscription::deactivate_all(&db.pool, 9).await.unwrap(), 0);
}

#[tokio::test]
async fn test_candidates_exclude_users_without_location() {
    let (db, _temp_dir) = setup_test_db().await;

    User::set_location(&db.pool, 1, Some("alice"), &Location::new(51.5, -0.12, "London"))
        .await
        .unwrap();
    Subscription::subscribe(&db.pool, 1, AlertKind::Sunny).await.unwrap();
    // Subscribed but never set a location
    Subscription::subscribe(&db.pool, 2, AlertKind::Sunny).await.unwrap();

    let candidates = Subscription::users_with_active_kind(&db.pool, AlertKind::Sunny).await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].0, 1);
    assert_eq!(candidates[0].1.name, "London");
}

#[tokio::test]
async fn test_candidates_are_distinct_and_active_only() {
    let (db, _temp_dir) = setup_test_db().await;

    for user_id in [1, 2] {
        User::set_location(&db.pool, user_id, None, &Location::from_coordinates(50.0, 0.0))
            .await
            .unwrap();
    }
    Subscription::subscribe(&db.pool, 1, AlertKind::Sunny).await.unwrap();
    Subscription::subscribe(&db.pool, 1, AlertKind::Sunny).await.unwrap();
    Subscription::subscribe(&db.pool, 2, AlertKind::Sunny).await.unwrap();
    Subscription::deactivate_all(&db.pool, 2).await.unwrap();

    let candidates = Subscription::users_with_active_kind(&db.pool, AlertKind::Sunny).await.unwrap();
    assert_eq!(candidates.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![1]);
    assert!(Subscription::users_with_active_kind(&db.pool, AlertKind::RainOrUv)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_users_due_matches_trigger() {
    let (db, _temp_dir) = setup_test_db().await;

    User::set_location(&db.pool, 1, None, &Location::from_coordinates(50.0, 0.0))
        .await
        .unwrap();
    Subscription::subscribe(&db.pool, 1, AlertKind::RainOrUv).await.unwrap();

    let eight: Trigger = "08:00".parse().unwrap();
    let nine: Trigger = "09:00".parse().unwrap();
    assert_eq!(Subscription::users_due(&db.pool, AlertKind::RainOrUv, eight).await.unwrap().len(), 1);
    assert!(Subscription::users_due(&db.pool, AlertKind::RainOrUv, nine).await.unwrap().is_empty());
    assert!(Subscription::users_due(&db.pool, AlertKind::ForecastChange, eight).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ledger_cooldown_boundary() {
    let (db, _temp_dir) = setup_test_db().await;
    let sent_at = base_time();
    let cooldown = Duration::hours(2);
    let bucket = "2024-06-01 13:00";

    assert!(!SentAlert::has_sent_within_cooldown(&db.pool, 1, bucket, cooldown, sent_at).await.unwrap());
    assert!(SentAlert::mark_sent(&db.pool, 1, bucket, sent_at).await.unwrap());

    let just_before = sent_at + cooldown - Duration::seconds(1);
    assert!(SentAlert::has_sent_within_cooldown(&db.pool, 1, bucket, cooldown, just_before).await.unwrap());

    let exactly = sent_at + cooldown;
    assert!(!SentAlert::has_sent_within_cooldown(&db.pool, 1, bucket, cooldown, exactly).await.unwrap());

    // Other users and buckets are independent
    assert!(!SentAlert::has_sent_within_cooldown(&db.pool, 2, bucket, cooldown, sent_at).await.unwrap());
    assert!(!SentAlert::has_sent_within_cooldown(&db.pool, 1, "2024-06-01 14:00", cooldown, sent_at).await.unwrap());
}

#[tokio::test]
async fn test_mark_sent_is_insert_if_absent() {
    let (db, _temp_dir) = setup_test_db().await;
    let first = base_time();

    assert!(SentAlert::mark_sent(&db.pool, 1, "sunny-bucket", first).await.unwrap());
    assert!(!SentAlert::mark_sent(&db.pool, 1, "sunny-bucket", first + Duration::hours(5)).await.unwrap());

    let record = SentAlert::find(&db.pool, 1, "sunny-bucket").await.unwrap().unwrap();
    assert_eq!(record.sent_at_utc(), Some(first));
    assert_eq!(SentAlert::count(&db.pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_unparseable_timestamp_counts_as_not_sent() {
    let (db, _temp_dir) = setup_test_db().await;

    sqlx::query("INSERT INTO sent_alerts (user_id, bucket_key, sent_at) VALUES (1, 'b', 'not a time')")
        .execute(&db.pool)
        .await
        .unwrap();

    assert!(!SentAlert::has_sent_within_cooldown(&db.pool, 1, "b", Duration::hours(2), base_time())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_prune_deletes_only_expired_rows() {
    let (db, _temp_dir) = setup_test_db().await;
    let now = base_time();

    SentAlert::mark_sent(&db.pool, 1, "old", now - Duration::days(8)).await.unwrap();
    SentAlert::mark_sent(&db.pool, 1, "recent", now - Duration::days(1)).await.unwrap();

    let removed = SentAlert::prune_older_than(&db.pool, now - Duration::days(7)).await.unwrap();
    assert_eq!(removed, 1);
    assert!(SentAlert::find(&db.pool, 1, "old").await.unwrap().is_none());
    assert!(SentAlert::find(&db.pool, 1, "recent").await.unwrap().is_some());
}
