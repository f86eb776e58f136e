use super::*;

#[test]
fn card_encoding_matches_rank_and_suit() {
    let ace = Card::new(0, 0).expect("ace of spades");
    assert_eq!(ace.index(), 0);
    assert_eq!(ace.rank_label(), "A");
    assert_eq!(ace.to_string(), "A♠");

    let king_of_diamonds = Card::new(12, 3).expect("king of diamonds");
    assert_eq!(king_of_diamonds.index(), 51);
    assert_eq!(king_of_diamonds.rank(), 12);
    assert_eq!(king_of_diamonds.suit(), 3);
    assert_eq!(king_of_diamonds.to_string(), "K♦");

    assert!(Card::new(13, 0).is_none());
    assert!(Card::new(0, 4).is_none());
    assert!(Card::from_index(52).is_none());
}

#[test]
fn card_serializes_as_deck_index() {
    let king_of_diamonds = Card::new(12, 3).expect("king of diamonds");
    assert_eq!(serde_json::to_string(&king_of_diamonds).expect("serialize"), "51");
    let back: Card = serde_json::from_str("51").expect("deserialize");
    assert_eq!(back, king_of_diamonds);
    assert!(serde_json::from_str::<Card>("52").is_err());
}

#[test]
fn parse_rank_accepts_labels() {
    assert_eq!(Card::parse_rank("A"), Some(0));
    assert_eq!(Card::parse_rank("10"), Some(9));
    assert_eq!(Card::parse_rank("k"), Some(12));
    assert_eq!(Card::parse_rank("1"), None);
}

#[test]
fn multiplier_conversions() {
    assert_eq!(multiplier_to_bps(2.5), Some(25_000));
    assert_eq!(multiplier_to_bps(1.1), Some(11_000));
    assert_eq!(multiplier_to_bps(0.01), Some(100));
    assert_eq!(multiplier_to_bps(-1.0), None);
    assert_eq!(multiplier_to_bps(f64::NAN), None);

    assert_eq!(format_multiplier(25_000), "2.50");
    assert_eq!(format_multiplier(10_000), "1.00");
    assert_eq!(format_multiplier(12_345), "1.23");

    assert_eq!(apply_multiplier(100, 20_000), 200);
    assert_eq!(apply_multiplier(100, 11_500), 115);
    assert_eq!(apply_multiplier(7, 15_000), 10);
}

#[test]
fn default_config_is_valid() {
    let config = ArcadeConfig::default().prepare().expect("defaults validate");
    assert_eq!(config.crash.increment_bps(), 100);
    assert_eq!(config.crash.target_bounds_bps(), (11_000, 99_000));
    assert_eq!(config.slot.symbols[0].symbol, "★");
    assert_eq!(config.slot.symbols[0].multiplier, 10);
    assert_eq!(config.hilo.cooldown_secs, 0);
}

#[test]
fn wager_bounds_are_normalized() {
    let mut config = ArcadeConfig::default();
    config.crash.bets = WagerBounds {
        min_bet: 50,
        max_bet: 10,
    };
    let config = config.prepare().expect("valid");
    assert_eq!(config.crash.bets.min_bet, 50);
    assert_eq!(config.crash.bets.max_bet, 51);
    assert!(config.crash.bets.contains(51));
    assert!(!config.crash.bets.contains(49));
}

#[test]
fn rejects_bad_tables() {
    let mut config = ArcadeConfig::default();
    config.crash.multiplier_ranges.clear();
    assert_eq!(
        config.prepare(),
        Err(ConfigError::EmptyTable {
            game: GameType::Crash
        })
    );

    let mut config = ArcadeConfig::default();
    config.crash.multiplier_ranges = vec![WeightedRange::new(3.0, 2.0, 1.0)];
    assert!(matches!(
        config.prepare(),
        Err(ConfigError::InvertedRange { index: 0, .. })
    ));

    let mut config = ArcadeConfig::default();
    for symbol in &mut config.slot.symbols {
        symbol.weight = 0.0;
    }
    assert_eq!(
        config.prepare(),
        Err(ConfigError::ZeroTotalWeight {
            game: GameType::Slot
        })
    );

    let mut config = ArcadeConfig::default();
    config.slot.symbols[1].weight = -1.0;
    assert!(matches!(
        config.prepare(),
        Err(ConfigError::InvalidWeight { index: 1, .. })
    ));

    let mut config = ArcadeConfig::default();
    config.slot.symbols.push(WeightedSymbol::new("★", 1, 1.0));
    assert_eq!(
        config.prepare(),
        Err(ConfigError::DuplicateSymbol("★".to_string()))
    );

    let mut config = ArcadeConfig::default();
    config.slot.partial_win_percent = 150;
    assert_eq!(config.prepare(), Err(ConfigError::PartialWinPercent(150)));

    let mut config = ArcadeConfig::default();
    config.slot.reel_stops.second_stop = 0.5;
    assert_eq!(config.prepare(), Err(ConfigError::ReelStopsOutOfOrder));

    let mut config = ArcadeConfig::default();
    config.crash.multiplier_increment = 0.0;
    assert_eq!(config.prepare(), Err(ConfigError::InvalidIncrement(0.0)));
}

#[test]
fn yaml_accepts_plugin_field_names() {
    let yaml = r#"
crash:
  min_bet: 20
  max_bet: 500
  multiplier_ranges:
    - { start: 1.0, end: 2.0, chance: 90 }
    - { start: 2.0, end: 4.0, chance: 10 }
slot:
  partial_win_percentage: 25
  sequential_symbols_only: true
  slot_timers:
    first_stop: 0.5
    second_stop: 1.0
    third_stop: 1.5
"#;
    let config: ArcadeConfig = serde_yaml::from_str(yaml).expect("parse");
    let config = config.prepare().expect("valid");

    assert_eq!(config.crash.bets.min_bet, 20);
    assert_eq!(config.crash.bets.max_bet, 500);
    assert_eq!(config.crash.multiplier_ranges.len(), 2);
    assert_eq!(config.crash.multiplier_ranges[1].upper, 4.0);
    assert_eq!(config.crash.cooldown_secs, DEFAULT_COOLDOWN_SECS);

    assert_eq!(config.slot.partial_win_percent, 25);
    assert!(config.slot.adjacent_pairs_only);
    assert_eq!(config.slot.reel_stops.as_array(), [0.5, 1.0, 1.5]);
    assert_eq!(config.slot.symbols.len(), 9);

    assert_eq!(config.hilo.bets, WagerBounds::default());
}

#[test]
fn player_id_serializes_as_plain_string() {
    let id = PlayerId::from("76561198000000001");
    let json = serde_json::to_string(&id).expect("serialize");
    assert_eq!(json, "\"76561198000000001\"");
    let back: PlayerId = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, id);
    assert_eq!(GameType::HiLo.to_string(), "hilo");
}
