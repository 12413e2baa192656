use risky_path::{EnvConfig, RiskyPathEnv, Tile};

#[test]
fn lava_and_goal_overlap_renders_goal() {
    let env = RiskyPathEnv::new(EnvConfig {
        goal_positions: vec![(5, 5)],
        lava_positions: Some(vec![(5, 5), (6, 6)]),
        spiky_positions: Some(vec![(6, 6), (7, 7)]),
        ..EnvConfig::default()
    })
    .unwrap();
    assert_eq!(env.tile_at((5, 5)), Some(Tile::Goal));
    assert_eq!(env.tile_at((6, 6)), Some(Tile::SpikyFloor));
    assert_eq!(env.tile_at((7, 7)), Some(Tile::SpikyFloor));
}

#[test]
fn default_room_matches_reference_layout() {
    let env = RiskyPathEnv::new(EnvConfig::default()).unwrap();
    let expected = "\
###########
#L^.......#
#L^.......#
#G^.......#
#L^L......#
#L^L..L...#
#L^L..L...#
#L^L......#
#L^L......#
#LA.......#
###########";
    assert_eq!(env.room_text(), expected);
}

#[test]
fn default_goal_sits_in_the_lava_column() {
    let env = RiskyPathEnv::new(EnvConfig::default()).unwrap();
    assert_eq!(env.tile_at((1, 3)), Some(Tile::Goal));
    assert_eq!(env.tile_at((1, 2)), Some(Tile::Lava));
    assert_eq!(env.tile_at((1, 4)), Some(Tile::Lava));
    assert_eq!(env.grid().positions_of(Tile::Goal), vec![(1, 3)]);
}

#[test]
fn per_instance_position_sets_do_not_alias() {
    let mut cfg = EnvConfig::default();
    let a = RiskyPathEnv::new(cfg.clone()).unwrap();
    cfg.goal_positions.push((8, 8));
    let b = RiskyPathEnv::new(cfg).unwrap();
    assert_eq!(a.grid().positions_of(Tile::Goal), vec![(1, 3)]);
    assert_eq!(b.grid().positions_of(Tile::Goal), vec![(1, 3), (8, 8)]);
}

#[test]
fn room_size_follows_config() {
    let env = RiskyPathEnv::new(EnvConfig {
        width: 14,
        height: 8,
        agent_start_pos: (5, 6),
        ..EnvConfig::default()
    })
    .unwrap();
    assert_eq!(env.grid().width(), 14);
    assert_eq!(env.grid().height(), 8);
    assert_eq!(env.tile_at((13, 7)), Some(Tile::Wall));
    assert_eq!(env.tile_at((12, 6)), Some(Tile::Empty));
}
