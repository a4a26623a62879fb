// tests/server_settings_tests.rs

use zolory_core::{
    Error, Ledger,
    models::{ServerSettingChange, server::DEFAULT_PREFIX},
    repositories::ServerSettingsRepository,
    test_utils::helpers::setup_test_database,
};

#[tokio::test]
async fn test_create_is_insert_or_ignore() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);

    let created = ledger.servers.create_server_settings(1, "Guild", DEFAULT_PREFIX).await?;
    assert_eq!(created.command_prefix, "!");
    assert_eq!(created.currency_name, "coins");
    assert_eq!(created.max_level, 100);
    assert_eq!(created.xp_per_message, 10);
    assert_eq!(created.welcome_channel_id, None);

    let again = ledger.servers.create_server_settings(1, "Renamed", "?").await?;
    assert_eq!(again, created);

    assert!(ledger.servers.get_server_settings(2).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_whitelisted_updates_apply_together() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);
    ledger.servers.create_server_settings(1, "Guild", DEFAULT_PREFIX).await?;

    let updated = ledger
        .servers
        .update_server_settings(
            1,
            &[
                ServerSettingChange::Prefix("$".into()),
                ServerSettingChange::WelcomeChannel(Some(1234)),
                ServerSettingChange::CurrencyName("shells".into()),
                ServerSettingChange::XpPerMessage(25),
            ],
        )
        .await?;
    assert_eq!(updated.command_prefix, "$");
    assert_eq!(updated.welcome_channel_id, Some(1234));
    assert_eq!(updated.currency_name, "shells");
    assert_eq!(updated.xp_per_message, 25);
    assert_eq!(updated.server_name, "Guild");

    let cleared = ledger
        .servers
        .update_server_settings(1, &[ServerSettingChange::WelcomeChannel(None)])
        .await?;
    assert_eq!(cleared.welcome_channel_id, None);
    assert_eq!(ledger.servers.get_server_settings(1).await?, Some(cleared));
    Ok(())
}

#[tokio::test]
async fn test_update_unknown_server_is_not_found() -> Result<(), Error> {
    let test_db = setup_test_database().await?;
    let ledger = Ledger::new(&test_db);

    let err = ledger
        .servers
        .update_server_settings(404, &[ServerSettingChange::MaxLevel(50)])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    Ok(())
}
