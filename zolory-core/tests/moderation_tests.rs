// tests/moderation_tests.rs

use zolory_core::{
    Database, Error, Ledger,
    models::{ModerationType, SanctionKind},
    repositories::{ModerationRepository, UserRepository},
    tasks::sanction_sweep::{run_sanction_sweep, sweep_expired_bans, sweep_expired_mutes},
    test_utils::helpers::{backdate, setup_test_database},
};

const SERVER: i64 = 77;
const MOD: i64 = 10;
const TARGET: i64 = 20;

/// Shifts every sanction of `kind` `minutes` into the past.
async fn age_sanctions(db: &Database, kind: SanctionKind, minutes: i64) -> Result<(), Error> {
    let table = match kind {
        SanctionKind::Mute => "mutes",
        SanctionKind::Ban => "bans",
    };
    backdate(db, table, "issued_at", minutes * 60).await?;
    backdate(db, table, "expires_at", minutes * 60).await?;
    Ok(())
}

#[tokio::test]
async fn test_mute_expires_without_sweep() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);

    ledger.moderation.issue_mute(SERVER, TARGET, MOD, "spam", Some(60)).await?;
    assert!(ledger.moderation.is_muted(SERVER, TARGET).await?);

    // t+30min
    age_sanctions(&test_db, SanctionKind::Mute, 30).await?;
    assert!(ledger.moderation.is_muted(SERVER, TARGET).await?);

    // t+61min
    age_sanctions(&test_db, SanctionKind::Mute, 31).await?;
    assert!(!ledger.moderation.is_muted(SERVER, TARGET).await?);

    // The read did not write back.
    let mute = ledger.moderation.latest_sanction(SanctionKind::Mute, SERVER, TARGET).await?.expect("mute row");
    assert!(mute.active);
    assert_eq!(mute.duration_minutes, Some(60));
    assert_eq!((mute.expires_at - mute.issued_at).num_minutes(), 60);
    Ok(())
}

#[tokio::test]
async fn test_sweep_is_idempotent() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);

    ledger.moderation.issue_mute(SERVER, TARGET, MOD, "spam", Some(60)).await?;
    ledger.moderation.issue_mute(SERVER, TARGET + 1, MOD, "caps", Some(600)).await?;
    age_sanctions(&test_db, SanctionKind::Mute, 61).await?;

    assert_eq!(sweep_expired_mutes(&ledger.moderation).await?, 1);
    assert_eq!(sweep_expired_mutes(&ledger.moderation).await?, 0);

    assert!(!ledger.moderation.is_muted(SERVER, TARGET).await?);
    assert!(ledger.moderation.is_muted(SERVER, TARGET + 1).await?);

    let swept = ledger.moderation.latest_sanction(SanctionKind::Mute, SERVER, TARGET).await?.expect("mute row");
    assert!(!swept.active);

    // Bans are untouched by a mute sweep.
    assert_eq!(sweep_expired_bans(&ledger.moderation).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_permanent_ban_and_lift() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);

    let ban_id = ledger.moderation.issue_ban(SERVER, TARGET, MOD, "raid", None).await?;
    assert!(ledger.moderation.is_banned(SERVER, TARGET).await?);
    assert!(!ledger.moderation.is_banned(SERVER + 1, TARGET).await?);
    assert!(!ledger.moderation.is_muted(SERVER, TARGET).await?);

    let ban = ledger.moderation.latest_sanction(SanctionKind::Ban, SERVER, TARGET).await?.expect("ban row");
    assert_eq!(ban.sanction_id, ban_id);
    assert!(ban.is_permanent());
    assert_eq!((ban.expires_at - ban.issued_at).num_days(), 36_500);

    // A year later the ban still holds and the sweeper leaves it alone.
    age_sanctions(&test_db, SanctionKind::Ban, 365 * 24 * 60).await?;
    assert!(ledger.moderation.is_banned(SERVER, TARGET).await?);
    assert_eq!(run_sanction_sweep(&ledger.moderation).await?.total(), 0);

    assert_eq!(ledger.moderation.lift_ban(SERVER, TARGET).await?, 1);
    assert!(!ledger.moderation.is_banned(SERVER, TARGET).await?);

    // Lifting again is not an error.
    assert_eq!(ledger.moderation.lift_ban(SERVER, TARGET).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_lift_deactivates_every_active_row() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);

    ledger.moderation.issue_mute(SERVER, TARGET, MOD, "first", Some(10)).await?;
    let latest = ledger.moderation.issue_mute(SERVER, TARGET, MOD, "second", Some(20)).await?;

    assert_eq!(ledger.moderation.lift_mute(SERVER, TARGET).await?, 2);
    assert!(!ledger.moderation.is_muted(SERVER, TARGET).await?);

    let mute = ledger.moderation.latest_sanction(SanctionKind::Mute, SERVER, TARGET).await?.expect("mute row");
    assert_eq!(mute.sanction_id, latest);
    assert_eq!(mute.reason, "second");
    Ok(())
}

#[tokio::test]
async fn test_non_positive_duration_is_rejected() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);

    for minutes in [0, -15] {
        let err = ledger.moderation.issue_mute(SERVER, TARGET, MOD, "oops", Some(minutes)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
    assert!(ledger.moderation.moderation_history(SERVER, TARGET).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unrepresentable_duration_is_rejected() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);

    for minutes in [i64::MAX, 1_000_000_000_000] {
        let err = ledger.moderation.issue_mute(SERVER, TARGET, MOD, "forever-ish", Some(minutes)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        let err = ledger.moderation.issue_ban(SERVER, TARGET, MOD, "forever-ish", Some(minutes)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    assert!(!ledger.moderation.is_muted(SERVER, TARGET).await?);
    assert!(ledger.moderation.moderation_history(SERVER, TARGET).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_history_is_newest_first_with_moderator_name() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);
    ledger.users.create_user(MOD, "mod_mia").await?;

    let warning_id = ledger.moderation.issue_warning(SERVER, TARGET, MOD, "be nice").await?;
    ledger.moderation.issue_mute(SERVER, TARGET, MOD, "spam", Some(5)).await?;
    // Moderator without a users row.
    ledger.moderation.issue_ban(SERVER, TARGET, 999, "raid", Some(1440)).await?;

    let history = ledger.moderation.moderation_history(SERVER, TARGET).await?;
    let actions: Vec<_> = history.iter().map(|e| e.record.action_type).collect();
    assert_eq!(actions, vec![ModerationType::Ban, ModerationType::Mute, ModerationType::Warn]);

    assert_eq!(history[0].moderator, None);
    assert_eq!(history[0].record.duration_minutes, Some(1440));
    assert_eq!(history[1].moderator.as_deref(), Some("mod_mia"));
    assert_eq!(history[2].record.duration_minutes, None);

    let warnings = ledger.moderation.user_warnings(SERVER, TARGET).await?;
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].warning.warning_id, warning_id);
    assert_eq!(warnings[0].warning.reason, "be nice");
    assert_eq!(warnings[0].moderator.as_deref(), Some("mod_mia"));

    assert!(ledger.moderation.moderation_history(SERVER + 1, TARGET).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_sweep_report_counts_both_kinds() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);

    ledger.moderation.issue_mute(SERVER, TARGET, MOD, "spam", Some(1)).await?;
    ledger.moderation.issue_ban(SERVER, TARGET, MOD, "raid", Some(1)).await?;
    ledger.moderation.issue_ban(SERVER, TARGET + 1, MOD, "raid", Some(1)).await?;
    age_sanctions(&test_db, SanctionKind::Mute, 2).await?;
    age_sanctions(&test_db, SanctionKind::Ban, 2).await?;

    let report = run_sanction_sweep(&ledger.moderation).await?;
    assert_eq!((report.mutes, report.bans), (1, 2));
    assert_eq!(run_sanction_sweep(&ledger.moderation).await?.total(), 0);
    Ok(())
}
