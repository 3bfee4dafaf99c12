use idle_defence_core::{
    ArenaConfig, ArrivalPolicy, BattleConfig, DefeatLedger, EnemyKind, GameState, PlayerProgress,
    TowerConfig, TowerStats, WaveConfig,
};
use idle_defence_system_spawning::{EnemySpawner, WaveManager, WavePhase};
use idle_defence_system_wave_generation::WaveConfigManager;
use idle_defence_world::{BattleManager, Tower};

#[test]
fn full_wave_round_trip_advances_to_the_next_wave() {
    let mut manager = WaveManager::new(WaveConfigManager::new(), 0xfeed);
    let mut progress = PlayerProgress::default();
    assert_eq!(manager.phase(), WavePhase::Idle);

    let mut spawned = 0;
    while manager.enemies_spawned() < 10 {
        let kinds = manager.update(0.5, &mut progress).expect("wave draw");
        assert_eq!(manager.phase(), WavePhase::InProgress);
        assert!(kinds.len() <= 1);
        for _ in &kinds {
            manager.on_enemy_defeated();
        }
        spawned += kinds.len();
        assert!(spawned <= 10, "wave overshot its enemy count");
    }

    assert_eq!(manager.current_config().total_enemies, 10);
    assert_eq!(manager.current_config().spawn_interval, 2.0);
    assert_eq!(manager.enemies_spawned(), 10);
    assert_eq!(manager.enemies_defeated(), 10);
    assert_eq!(progress.current_wave, 1);

    let kinds = manager.update(0.5, &mut progress).expect("wave draw");
    assert!(kinds.is_empty());
    assert_eq!(manager.phase(), WavePhase::Complete);
    assert_eq!(progress.current_wave, 2);
    assert_eq!(progress.coins, 110, "wave one pays a bonus of 10 coins");

    let _ = manager.update(0.5, &mut progress).expect("wave draw");
    assert_eq!(manager.phase(), WavePhase::InProgress);
    assert_eq!(manager.current_wave(), 2);
    assert_eq!(manager.enemies_spawned(), 0);
}

#[test]
fn unresolved_wave_spawns_exactly_its_total() {
    let mut manager = WaveManager::new(WaveConfigManager::new(), 1);
    let mut progress = PlayerProgress::default();

    let spawned: usize = (0..2_000)
        .map(|_| manager.update(0.25, &mut progress).expect("wave draw").len())
        .sum();

    assert_eq!(spawned, 10);
    assert_eq!(manager.phase(), WavePhase::InProgress, "wave waits for its enemies");
    assert_eq!(progress.current_wave, 1);
}

#[test]
fn overridden_waves_drive_composition() {
    let bosses = WaveConfig {
        wave_number: 1,
        total_enemies: 4,
        enemy_type_pool: vec![EnemyKind::Boss],
        spawn_interval: 0.0,
        health_multiplier: 1.0,
        speed_multiplier: 1.0,
    };
    let configs = WaveConfigManager::new()
        .with_overrides([bosses])
        .expect("valid override");
    let mut manager = WaveManager::new(configs, 3);
    let mut progress = PlayerProgress::default();

    let mut kinds = Vec::new();
    for _ in 0..10 {
        kinds.extend(manager.update(0.01, &mut progress).expect("wave draw"));
    }
    assert_eq!(kinds, vec![EnemyKind::Boss; 4]);
}

#[test]
fn identical_seeds_schedule_identical_waves() {
    fn schedule(seed: u64) -> Vec<EnemyKind> {
        let mut manager = WaveManager::new(WaveConfigManager::new(), seed);
        let mut progress = PlayerProgress::default();
        manager.start_wave(12);
        (0..400)
            .flat_map(|_| manager.update(0.5, &mut progress).expect("wave draw"))
            .collect()
    }

    let first = schedule(77);
    assert_eq!(first.len(), 51);
    assert_eq!(first, schedule(77));
}

#[test]
fn breaching_enemies_still_complete_the_wave() {
    const TICK: f32 = 1.0 / 60.0;

    let arena = ArenaConfig::default();
    let battle_config = BattleConfig {
        arrival: ArrivalPolicy::Breach,
        ..BattleConfig::default()
    };
    let tower_config = TowerConfig {
        stats: TowerStats {
            damage: 0.0,
            ..TowerStats::default()
        },
        ..TowerConfig::default()
    };
    let mut battle = BattleManager::new(battle_config, arena.center());
    let mut tower = Tower::new(arena.center(), &tower_config, &battle_config, 5);
    let mut manager = WaveManager::new(WaveConfigManager::new(), 5);
    let mut spawner = EnemySpawner::new(arena, 5);
    let mut state = GameState::new();
    assert!(state.start_battle());

    let mut escaped = 0;
    for _ in 0..(40 * 60) {
        let kinds = manager.update(TICK, &mut state.player_progress).expect("wave draw");
        let scaling = manager.current_config().scaling();
        for kind in kinds {
            let position = spawner.get_random_spawn_position();
            let _ = battle.spawn_scaled_enemy(kind, position, scaling);
        }
        let report = battle.update(TICK, &mut tower, &mut state, &mut manager);
        escaped += report.escaped;
        assert!(report.defeated.is_empty());
    }

    assert!(escaped >= 10);
    assert_eq!(state.player_progress.current_wave, 2);
    assert_eq!(manager.current_wave(), 2);
    assert_eq!(state.player_progress.coins, 110);
    assert_eq!(state.player_progress.enemies_defeated, 0);
    assert!(tower.is_alive());
}

#[test]
fn ledger_notifications_are_counted_separately() {
    let mut manager = WaveManager::new(WaveConfigManager::new(), 2);
    let mut progress = PlayerProgress::default();
    let _ = manager.update(0.0, &mut progress).expect("wave draw");

    manager.on_enemy_defeated();
    manager.on_enemy_escaped();
    manager.on_enemy_escaped();

    assert_eq!(manager.enemies_defeated(), 1);
    assert_eq!(manager.enemies_escaped(), 2);
}
