// tests/user_tests.rs

use zolory_core::{
    Error, Ledger,
    models::UserMetric,
    repositories::UserRepository,
    test_utils::helpers::{backdate, setup_test_database},
};

#[tokio::test]
async fn test_create_user_never_overwrites() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);

    let created = ledger.users.create_user(1, "alice").await?;
    assert_eq!(created.level, 1);
    assert_eq!(created.experience, 0);

    ledger.users.add_experience(1, 250).await?;
    let again = ledger.users.create_user(1, "someone_else").await?;
    assert_eq!(again.username, "alice");
    assert_eq!(again.experience, 250);
    assert_eq!(again.join_date, created.join_date);

    assert!(ledger.users.get_user(2).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_experience_drives_level() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);
    ledger.users.create_user(1, "alice").await?;

    assert_eq!(ledger.users.add_experience(1, 1500).await?, (2, 1500));
    assert_eq!(ledger.users.add_experience(1, -600).await?, (1, 900));

    // Penalties never push experience below zero.
    assert_eq!(ledger.users.add_experience(1, -5000).await?, (1, 0));

    let user = ledger.users.get_user(1).await?.expect("user row");
    assert_eq!((user.level, user.experience), (1, 0));
    Ok(())
}

#[tokio::test]
async fn test_add_experience_for_unknown_user_is_not_found() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);

    let err = ledger.users.add_experience(404, 10).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_activity_and_message_counters() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);
    let created = ledger.users.create_user(1, "alice").await?;

    backdate(&test_db, "users", "last_activity", 3600).await?;
    ledger.users.record_activity(1).await?;
    ledger.users.increment_message_count(1).await?;
    ledger.users.increment_message_count(1).await?;

    let user = ledger.users.get_user(1).await?.expect("user row");
    assert_eq!(user.total_messages, 2);
    assert!(user.last_activity >= created.last_activity);

    // Absent users are a silent no-op.
    ledger.users.record_activity(999).await?;
    ledger.users.increment_message_count(999).await?;
    ledger.users.adjust_reputation(999, 1).await?;
    assert!(ledger.users.get_user(999).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_overflowing_counters_are_invalid_argument() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);
    ledger.users.create_user(1, "alice").await?;

    let (level, experience) = ledger.users.add_experience(1, i64::MAX).await?;
    assert_eq!(experience, i64::MAX);
    assert_eq!(level, 1 + i64::MAX / 1000);

    let err = ledger.users.add_experience(1, 1).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(!err.is_storage_failure());

    // Penalties still apply at the ceiling.
    assert_eq!(ledger.users.add_experience(1, -1).await?.1, i64::MAX - 1);

    ledger.users.adjust_reputation(1, i64::MIN).await?;
    let err = ledger.users.adjust_reputation(1, -1).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    ledger.users.adjust_reputation(1, i64::MAX).await?;

    let user = ledger.users.get_user(1).await?.expect("user row");
    assert_eq!(user.reputation, -1);
    assert_eq!(user.experience, i64::MAX - 1);
    Ok(())
}

#[tokio::test]
async fn test_reputation_is_unbounded() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);
    ledger.users.create_user(1, "alice").await?;

    ledger.users.adjust_reputation(1, -3).await?;
    ledger.users.adjust_reputation(1, -4).await?;
    assert_eq!(ledger.users.get_user(1).await?.expect("user row").reputation, -7);
    Ok(())
}

#[tokio::test]
async fn test_top_users_falls_back_to_level() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);

    for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol"), (4, "dave")] {
        ledger.users.create_user(id, name).await?;
    }
    ledger.users.add_experience(2, 2500).await?;
    ledger.users.add_experience(3, 1200).await?;
    ledger.users.adjust_reputation(4, 9).await?;

    let by_coins = ledger.users.top_users(UserMetric::from_selector("coins"), 5).await?;
    assert_eq!(by_coins.len(), 4);
    // All tied at zero coins: storage order.
    let ids: Vec<_> = by_coins.iter().map(|u| u.user_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    let hostile = ledger.users.top_users(UserMetric::from_selector("DROP TABLE users"), 5).await?;
    let ids: Vec<_> = hostile.iter().map(|u| u.user_id).collect();
    assert_eq!(ids, vec![2, 3, 1, 4]);

    let by_rep = ledger.users.top_users(UserMetric::Reputation, 1).await?;
    assert_eq!(by_rep[0].username, "dave");

    // The table survived.
    assert_eq!(ledger.users.top_users(UserMetric::Experience, 10).await?.len(), 4);
    assert!(ledger.users.top_users(UserMetric::Level, -3).await?.is_empty());
    Ok(())
}
