use std::collections::BTreeMap;

use idle_defence_core::{PlayerProgress, TowerStats};
use idle_defence_system_upgrades::{UpgradeError, UpgradeKind, UpgradeSystem};

fn progress_with(coins: u64) -> PlayerProgress {
    PlayerProgress {
        coins,
        ..PlayerProgress::default()
    }
}

#[test]
fn purchase_spends_coins_and_improves_the_stat() {
    let mut shop = UpgradeSystem::new();
    let mut stats = TowerStats::default();
    let mut progress = progress_with(100);

    assert_eq!(shop.can_upgrade("damage", progress.coins), Ok(50));
    assert_eq!(shop.apply_upgrade("damage", &mut stats, &mut progress), Ok(1));

    assert_eq!(progress.coins, 50);
    assert!((stats.damage - 12.0).abs() < 1e-4);
    assert_eq!(shop.level(UpgradeKind::Damage), 1);
    assert_eq!(
        shop.upgrade_cost(UpgradeKind::Damage),
        100,
        "second level costs twice the base price"
    );
}

#[test]
fn unaffordable_purchase_changes_nothing() {
    let mut shop = UpgradeSystem::new();
    let mut stats = TowerStats::default();
    let mut progress = progress_with(149);

    let result = shop.apply_upgrade("critical_chance", &mut stats, &mut progress);

    assert_eq!(
        result,
        Err(UpgradeError::InsufficientCoins {
            kind: UpgradeKind::CriticalChance,
            cost: 150,
            coins: 149,
        })
    );
    assert_eq!(progress.coins, 149);
    assert_eq!(stats, TowerStats::default());
    assert_eq!(shop.level(UpgradeKind::CriticalChance), 0);
}

#[test]
fn additive_upgrades_stop_at_max_level() {
    let mut shop = UpgradeSystem::new();
    let mut stats = TowerStats::default();
    let mut progress = progress_with(10_000);

    for expected in 1..=3 {
        assert_eq!(
            shop.apply_upgrade("critical_multiplier", &mut stats, &mut progress),
            Ok(expected)
        );
    }
    assert!((stats.critical_multiplier - 2.9).abs() < 1e-4);
    assert_eq!(progress.coins, 10_000 - 200 - 400 - 600);

    let coins = progress.coins;
    assert_eq!(
        shop.apply_upgrade("critical_multiplier", &mut stats, &mut progress),
        Err(UpgradeError::MaxLevel {
            kind: UpgradeKind::CriticalMultiplier,
            max_level: 3,
        })
    );
    assert_eq!(progress.coins, coins);

    let info = shop
        .upgrade_info("critical_multiplier")
        .expect("known upgrade");
    assert!(!info.can_upgrade);
    assert_eq!(info.current_level, 3);
}

#[test]
fn unknown_upgrades_are_rejected() {
    let mut shop = UpgradeSystem::new();
    let mut stats = TowerStats::default();
    let mut progress = progress_with(1_000);

    assert_eq!(
        shop.apply_upgrade("shield", &mut stats, &mut progress),
        Err(UpgradeError::Unknown("shield".to_owned()))
    );
    assert_eq!(progress.coins, 1_000);
    assert!(shop.upgrade_info("shield").is_err());
}

#[test]
fn levels_snapshot_lists_every_upgrade() {
    let mut shop = UpgradeSystem::new();
    let mut stats = TowerStats::default();
    let mut progress = progress_with(1_000);
    let _ = shop.apply_upgrade("attack_speed", &mut stats, &mut progress);

    let levels = shop.levels();
    assert_eq!(levels.len(), 5);
    assert_eq!(levels.get("attack_speed"), Some(&1));
    assert_eq!(levels.get("damage"), Some(&0));

    let infos = shop.all_upgrades_info();
    assert_eq!(infos.len(), 5);
    assert_eq!(infos[1].kind, UpgradeKind::AttackSpeed);
    assert_eq!(infos[1].next_cost, 150);
}

#[test]
fn loading_levels_skips_unknown_ids_and_caps_levels() {
    let mut shop = UpgradeSystem::new();
    let saved = BTreeMap::from([
        ("damage".to_owned(), 4),
        ("critical_chance".to_owned(), 99),
        ("shield".to_owned(), 2),
    ]);

    shop.load_levels(&saved);

    assert_eq!(shop.level(UpgradeKind::Damage), 4);
    assert_eq!(shop.level(UpgradeKind::CriticalChance), 5);
    assert_eq!(shop.levels().len(), 5);
    assert!(!shop.levels().contains_key("shield"));
}

#[test]
fn restored_levels_rebuild_the_purchased_stats() {
    let mut bought = UpgradeSystem::new();
    let mut bought_stats = TowerStats::default();
    let mut progress = progress_with(10_000);
    for id in ["damage", "damage", "critical_chance", "attack_range"] {
        assert!(bought
            .apply_upgrade(id, &mut bought_stats, &mut progress)
            .is_ok());
    }

    let mut restored = UpgradeSystem::new();
    restored.load_levels(&bought.levels());
    let mut restored_stats = TowerStats::default();
    restored.apply_levels(&mut restored_stats);

    assert_eq!(restored.levels(), bought.levels());
    assert_eq!(restored_stats, bought_stats);
}
