#![cfg(target_arch = "wasm32")]

use sandpile_engine::{
    boundary_periodic, rule_btw1987, strategy_random_all, value_height, SandPile,
};
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn facade_drives_and_snapshots() {
    let mut pile = SandPile::new(8, rule_btw1987(), boundary_periodic()).unwrap();
    pile.enable_perf_metrics(true);
    for _ in 0..20 {
        pile.tick(true).unwrap();
    }
    let heights = pile.get_values(value_height()).unwrap();
    assert_eq!(heights.length(), 64);
    assert_eq!(pile.drives(), 20.0);
    assert!(pile.get_perf_stats().relax_ms() >= 0.0);
}

#[wasm_bindgen_test]
fn facade_reports_errors_as_strings() {
    assert!(SandPile::new(8, 9, 0).is_err());
    let pile = SandPile::new(8, rule_btw1987(), 0).unwrap();
    assert!(pile.coarsen(3).is_err());
}

#[wasm_bindgen_test]
fn facade_from_config_json() {
    let pile = SandPile::from_config(r#"{"system_size": 16, "toppling_rule": "rossum2011"}"#.into())
        .unwrap();
    assert_eq!(pile.size(), 16);
    assert!(pile.get_value(3).unwrap() < 0.0);
}

#[wasm_bindgen_test]
fn facade_toppling_settings() {
    let mut pile = SandPile::new(8, rule_btw1987(), boundary_periodic()).unwrap();
    assert!(pile.grains_during_avalanches_json().is_none());

    pile.set_equal_split(true).unwrap();
    pile.set_counter_during_avalanches(true).unwrap();
    pile.tick(true).unwrap();
    assert_eq!(pile.grains_during_avalanches_json().unwrap(), r#"{"1":2}"#);

    pile.set_strategy(strategy_random_all()).unwrap();
    assert!(pile.set_strategy(7).is_err());
    assert_eq!(pile.core().toppling().unwrap().active_count(), 0);
}
