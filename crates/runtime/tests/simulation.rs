use std::io::Write;
use std::sync::Arc;

use tokio::sync::broadcast;

use creature_core::{
    BlockType, Condition, ConditionType, CreatureId, CreatureTemplate, DamageType, Direction,
    ItemDefinition, ItemTypeId, Position, WalkPath,
};
use creature_runtime::{
    GridMap, ItemCatalog, LootEntry, OracleManager, Runtime, RuntimeConfig, RuntimeError, SimEvent,
    TableLoot,
};

const RAT_CORPSE: ItemTypeId = ItemTypeId(3058);
const GOLD: ItemTypeId = ItemTypeId(2148);
const WALL: Position = Position::new(10, 10);

fn oracles() -> OracleManager {
    let map = Arc::new(GridMap::open_field(32, 32).with_wall(WALL));
    let items = ItemCatalog::new(vec![
        ItemDefinition::new(RAT_CORPSE, "dead rat").container(4),
        ItemDefinition::new(GOLD, "gold coin"),
    ]);
    let loot = TableLoot::new(0).with_table(
        "rat",
        vec![LootEntry {
            item_type: GOLD,
            chance: 100,
        }],
    );
    OracleManager::new(map, Arc::new(items), Arc::new(loot))
}

fn rat() -> CreatureTemplate {
    CreatureTemplate::builder()
        .name("rat")
        .health(20)
        .lost_experience(50)
        .corpse(RAT_CORPSE)
        .build()
}

fn hunter() -> CreatureTemplate {
    CreatureTemplate::builder().name("hunter").health(150).build()
}

async fn runtime() -> Runtime {
    Runtime::builder()
        .oracles(oracles())
        .build()
        .await
        .expect("runtime starts")
}

fn drain(rx: &mut broadcast::Receiver<SimEvent>) -> Vec<SimEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn walk_path_is_stepped_on_the_clock() {
    let runtime = runtime().await;
    let handle = runtime.handle();
    let rat = handle.spawn(rat(), Position::new(0, 0)).await.expect("spawned");
    let mut events = handle.subscribe();

    let path = WalkPath::from([Direction::North, Direction::North]);
    assert!(handle.walk(rat, path).await.expect("walk accepted"));

    handle.advance(499).await.expect("advanced");
    assert_eq!(handle.position(rat).await.expect("placed"), Position::new(0, 0));

    handle.advance(501).await.expect("advanced");
    assert_eq!(handle.position(rat).await.expect("placed"), Position::new(0, 2));

    let moves: Vec<_> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            SimEvent::Moved { creature, to, .. } => Some((creature, to)),
            _ => None,
        })
        .collect();
    assert_eq!(moves, vec![(rat, Position::new(0, 1)), (rat, Position::new(0, 2))]);

    let snapshot = handle.query(rat).await.expect("known");
    assert!(!snapshot.walking);
    assert_eq!(snapshot.path_len, 0);
    assert_eq!(snapshot.direction, Direction::North);

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn lethal_hit_pays_experience_and_drops_corpse() {
    let runtime = runtime().await;
    let handle = runtime.handle();
    let hunter = handle.spawn(hunter(), Position::new(3, 3)).await.expect("spawned");
    let rat = handle.spawn(rat(), Position::new(4, 3)).await.expect("spawned");
    let mut events = handle.subscribe();

    let outcome = handle
        .damage(rat, Some(hunter), DamageType::Physical, 30)
        .await
        .expect("rat is live");
    assert_eq!(outcome.block, BlockType::None);
    assert_eq!(outcome.dealt, 20);

    let events = drain(&mut events);
    assert!(events.contains(&SimEvent::Died {
        victim: rat,
        last_hit: Some(hunter),
        most_damage: Some(hunter),
        experience: vec![(hunter, 50)],
    }));
    let corpse = events.iter().find_map(|event| match event {
        SimEvent::CorpsePlaced { position, corpse } => Some((*position, corpse.clone())),
        _ => None,
    });
    let (position, corpse) = corpse.expect("corpse placed");
    assert_eq!(position, Position::new(4, 3));
    assert_eq!(corpse.item_type, RAT_CORPSE);
    let contents: Vec<ItemTypeId> = corpse
        .contents
        .as_ref()
        .map(|container| container.items().iter().map(|item| item.item_type).collect())
        .unwrap_or_default();
    assert_eq!(contents, vec![GOLD]);
    assert!(events.contains(&SimEvent::Removed { creature: rat }));

    assert_eq!(handle.query(hunter).await.expect("known").experience, 50);
    assert!(matches!(
        handle.query(rat).await,
        Err(RuntimeError::UnknownCreature(id)) if id == rat
    ));
    assert!(matches!(
        handle.damage(rat, Some(hunter), DamageType::Physical, 5).await,
        Err(RuntimeError::UnknownCreature(_))
    ));

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn poison_ticks_with_think_cycle_and_expires() {
    let runtime = runtime().await;
    let handle = runtime.handle();
    let victim = handle.spawn(hunter(), Position::new(20, 20)).await.expect("spawned");

    assert!(
        handle
            .add_condition(victim, Condition::poison(3000, 10, 1000, None))
            .await
            .expect("victim is live")
    );
    let snapshot = handle.query(victim).await.expect("known");
    assert_eq!(snapshot.conditions, vec![ConditionType::Poison]);

    handle.advance(1000).await.expect("advanced");
    assert_eq!(handle.query(victim).await.expect("known").health.current, 140);

    handle.advance(2000).await.expect("advanced");
    let snapshot = handle.query(victim).await.expect("known");
    assert_eq!(snapshot.health.current, 120);
    assert!(snapshot.conditions.is_empty());

    handle.advance(5000).await.expect("advanced");
    assert_eq!(handle.query(victim).await.expect("known").health.current, 120);

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn follower_closes_in_on_its_target() {
    let runtime = runtime().await;
    let handle = runtime.handle();
    let follower = handle.spawn(hunter(), Position::new(0, 2)).await.expect("spawned");
    let target = handle.spawn(rat(), Position::new(6, 2)).await.expect("spawned");

    assert!(handle.follow(follower, Some(target)).await.expect("live"));
    assert_eq!(handle.query(follower).await.expect("known").follow, Some(target));

    handle.advance(3000).await.expect("advanced");
    assert_eq!(handle.position(follower).await.expect("placed"), Position::new(5, 2));
    assert_eq!(handle.position(target).await.expect("placed"), Position::new(6, 2));

    assert!(handle.follow(follower, None).await.expect("live"));
    assert_eq!(handle.query(follower).await.expect("known").follow, None);

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn configured_follow_distance_keeps_followers_back() {
    let config = RuntimeConfig::from_ron_str("(game_config: (default_follow_distance: 3))")
        .expect("valid config");
    let runtime = Runtime::builder()
        .config(config)
        .oracles(oracles())
        .build()
        .await
        .expect("runtime starts");
    let handle = runtime.handle();
    let follower = handle.spawn(hunter(), Position::new(0, 2)).await.expect("spawned");
    let target = handle.spawn(rat(), Position::new(6, 2)).await.expect("spawned");

    assert!(handle.follow(follower, Some(target)).await.expect("live"));
    handle.advance(3000).await.expect("advanced");
    assert_eq!(handle.position(follower).await.expect("placed"), Position::new(3, 2));

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn zero_step_duration_config_is_refused() {
    let mut config = RuntimeConfig::default();
    config.game_config.default_step_duration = 0;
    let result = Runtime::builder().config(config).oracles(oracles()).build().await;
    assert!(matches!(result, Err(RuntimeError::InvalidConfig(_))));
}

#[tokio::test]
async fn removing_master_releases_summons() {
    let runtime = runtime().await;
    let handle = runtime.handle();
    let master = handle.spawn(hunter(), Position::new(12, 12)).await.expect("spawned");
    let summon = handle
        .summon(master, rat(), Position::new(13, 12))
        .await
        .expect("summoned");

    assert_eq!(handle.query(summon).await.expect("known").master, Some(master));
    assert_eq!(handle.query(master).await.expect("known").summons, vec![summon]);

    handle.remove(master).await.expect("removed");
    assert!(matches!(
        handle.query(master).await,
        Err(RuntimeError::UnknownCreature(_))
    ));
    let snapshot = handle.query(summon).await.expect("summon stays");
    assert_eq!(snapshot.master, None);
    assert!(!snapshot.removed);

    assert!(matches!(
        handle.summon(CreatureId(999), rat(), Position::new(1, 1)).await,
        Err(RuntimeError::UnknownCreature(CreatureId(999)))
    ));

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn spawn_rejects_blocked_or_taken_tiles() {
    let runtime = runtime().await;
    let handle = runtime.handle();
    handle.spawn(rat(), Position::new(1, 1)).await.expect("spawned");

    assert!(matches!(
        handle.spawn(rat(), WALL).await,
        Err(RuntimeError::InvalidPosition(position)) if position == WALL
    ));
    assert!(matches!(
        handle.spawn(rat(), Position::new(1, 1)).await,
        Err(RuntimeError::InvalidPosition(_))
    ));
    assert!(matches!(
        handle.spawn(rat(), Position::new(40, 1)).await,
        Err(RuntimeError::InvalidPosition(_))
    ));
    assert_eq!(handle.creatures().await.expect("listed").len(), 1);

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn config_file_drives_think_interval() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "(game_seed: 9, game_config: (think_interval: 500))").expect("written");
    let config = RuntimeConfig::load(file.path()).expect("valid config");
    assert_eq!(config.game_seed, 9);

    let runtime = Runtime::builder()
        .config(config)
        .oracles(oracles())
        .build()
        .await
        .expect("runtime starts");
    let handle = runtime.handle();
    let victim = handle.spawn(hunter(), Position::new(2, 2)).await.expect("spawned");
    handle
        .add_condition(victim, Condition::poison(1000, 10, 500, None))
        .await
        .expect("victim is live");

    handle.advance(500).await.expect("advanced");
    assert_eq!(handle.query(victim).await.expect("known").health.current, 140);

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn builder_requires_oracles() {
    let result = Runtime::builder().build().await;
    assert!(matches!(result, Err(RuntimeError::MissingOracles)));
}

#[tokio::test]
async fn handle_fails_after_shutdown() {
    let runtime = runtime().await;
    let handle = runtime.handle();
    assert_eq!(handle.advance(10).await.expect("advanced").0, 10);

    runtime.shutdown().await.expect("clean shutdown");
    assert!(matches!(
        handle.advance(10).await,
        Err(RuntimeError::CommandChannelClosed)
    ));
}
