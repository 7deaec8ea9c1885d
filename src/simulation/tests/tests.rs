use super::*;
use crate::domain::rules::IterationStrategy;

fn pile(size: u32, rule: TopplingRule, boundary: BoundaryType) -> SandPileCore {
    SandPileCore::new(size, rule, boundary, &Feeds::default()).unwrap()
}

#[test]
fn rule_defaults_pick_boundary_and_grids() {
    let btw = pile(8, TopplingRule::BakTangWiesenfeld1987, BoundaryType::Undefined);
    assert_eq!(btw.boundary(), BoundaryType::WallDissipating);
    assert!(btw.diss_grid().is_none());

    let manna = pile(8, TopplingRule::MannaLin2010, BoundaryType::Undefined);
    assert_eq!(manna.boundary(), BoundaryType::Circular);

    let rossum = pile(8, TopplingRule::Rossum2011, BoundaryType::Undefined);
    assert_eq!(rossum.boundary(), BoundaryType::Periodic);
    let field = rossum.diss_toppling().unwrap();
    assert_eq!(field.rule(), TopplingRule::Rossum2011Diss);
    assert_eq!(field.strategy(), IterationStrategy::RandomAll);
    assert_eq!(field.grid().boundary(), BoundaryType::Periodic);
}

#[test]
fn boundary_override_is_honoured() {
    let p = pile(8, TopplingRule::BakTangWiesenfeld1987, BoundaryType::Dissipating);
    assert_eq!(p.boundary(), BoundaryType::Dissipating);
    assert_eq!(p.grid().unwrap().boundary(), BoundaryType::Dissipating);
}

#[test]
fn undefined_rule_is_a_configuration_error() {
    let err = SandPileCore::new(8, TopplingRule::Undefined, BoundaryType::Periodic, &Feeds::default())
        .err()
        .unwrap();
    assert!(matches!(err, SandpileError::Configuration(_)));
}

#[test]
fn primary_cells_are_observed() {
    let p = pile(4, TopplingRule::LinEtal2006, BoundaryType::Undefined);
    assert!(p.grid().unwrap().cells().iter().all(|c| c.is_observed()));
    assert!(!p.grid().unwrap().reservoir().is_observed());
}

#[test]
fn drive_respects_circle() {
    let mut p = pile(8, TopplingRule::MannaLin2010, BoundaryType::Undefined);
    for _ in 0..200 {
        let idx = p.drive().unwrap();
        let (i, j) = p.grid().unwrap().coords(idx);
        assert!(p.grid().unwrap().within_circle(i, j).unwrap());
        p.relax(false).unwrap();
    }
    assert_eq!(p.drives(), 200);
}

#[test]
fn drive_hits_walls_only_for_wall_dissipating() {
    let mut p = pile(8, TopplingRule::BakTangWiesenfeld1987, BoundaryType::Undefined);
    for _ in 0..100 {
        let idx = p.drive().unwrap();
        let (i, j) = p.grid().unwrap().coords(idx);
        assert!(i == 0 || j == 0, "({i}, {j}) is off the walls");
        p.clear();
    }
}

#[test]
fn relax_records_only_measured_avalanches() {
    let mut p = pile(4, TopplingRule::BakTangWiesenfeld1987, BoundaryType::Periodic);
    p.toppling_mut().unwrap().set_equal_split(true);

    p.add_grains(1, 1, 4.0).unwrap();
    assert_eq!(p.relax(false).unwrap(), 0);
    assert!(p.avalanches().is_empty());

    p.add_grains(2, 2, 4.0).unwrap();
    assert_eq!(p.relax(true).unwrap(), 1);
    assert_eq!(p.avalanches().count(1), 1);
    assert_eq!(p.avalanches_json(), r#"{"1":1}"#);
}

#[test]
fn populate_needs_dissipation_grid() {
    let mut p = pile(8, TopplingRule::BakTangWiesenfeld1987, BoundaryType::Undefined);
    let err = p.populate(10, 5.0).unwrap_err();
    assert!(matches!(err, SandpileError::ResourceMissing(_)));
}

#[test]
fn populate_seeds_field_with_whole_particle_packets() {
    let mut p = pile(32, TopplingRule::Rossum2011, BoundaryType::Undefined);
    let total = p.populate(256, 5.0).unwrap();
    assert!(total > 10.0);
    assert_eq!(p.diss_grid().unwrap().count_grains(), total);
    assert!(p
        .diss_grid()
        .unwrap()
        .cells()
        .iter()
        .all(|c| c.height() == 0.0 || c.height() == 5.0));
}

#[test]
fn populate_rejects_too_many_cells() {
    let mut p = pile(4, TopplingRule::Rossum2011, BoundaryType::Undefined);
    assert!(p.populate(16, 5.0).is_err());
}

#[test]
fn populate_rejects_a_sparse_field() {
    let mut p = pile(8, TopplingRule::Rossum2011, BoundaryType::Undefined);
    // one grain per seeded cell, about one seeded cell: far below the minimum
    let err = p.populate(1, 1.0).unwrap_err();
    assert!(matches!(err, SandpileError::InvariantViolation(_)));
    assert!(p.diss_grid().unwrap().count_grains() <= 10.0);
}

#[test]
fn standalone_field_has_no_sand_grid() {
    let mut p = pile(16, TopplingRule::Rossum2011Diss, BoundaryType::Undefined);
    assert!(p.grid().is_none());
    assert!(matches!(p.drive(), Err(SandpileError::ResourceMissing(_))));

    p.diss_toppling_mut().unwrap().set_cell_capacity(8.0);
    let total = p.populate(40, 5.0).unwrap();
    p.relax(false).unwrap();
    assert_eq!(p.diss_grid().unwrap().count_grains(), total);
}

#[test]
fn get_values_checks_buffer_and_resources() {
    let p = pile(4, TopplingRule::BakTangWiesenfeld1987, BoundaryType::Periodic);
    let mut short = vec![0.0f32; 15];
    assert!(matches!(
        p.get_values(&mut short, GridValueType::Height),
        Err(SandpileError::InvariantViolation(_))
    ));

    let mut buf = vec![0.0f32; 16];
    assert!(matches!(
        p.get_values(&mut buf, GridValueType::Dissipation),
        Err(SandpileError::ResourceMissing(_))
    ));
    assert!(matches!(
        p.get_values(&mut buf, GridValueType::OrderParam1),
        Err(SandpileError::Configuration(_))
    ));
}

#[test]
fn height_projections() {
    let mut p = pile(4, TopplingRule::BakTangWiesenfeld1987, BoundaryType::Periodic);
    p.toppling_mut().unwrap().set_cell_capacity(8.0);
    p.add_grains(1, 0, 2.0).unwrap();
    p.add_grains(3, 3, 3.0).unwrap();

    let mut buf = vec![0.0f32; 16];
    p.get_values(&mut buf, GridValueType::Height).unwrap();
    assert_eq!(buf[1], 2.0);
    assert_eq!(buf[15], 3.0);

    p.get_values(&mut buf, GridValueType::HeightScaled).unwrap();
    assert_eq!(buf[1], 0.25);

    // critical level is 4 - 4/4 = 3
    p.get_values(&mut buf, GridValueType::CriticalCells).unwrap();
    assert_eq!(buf[15], 8.0);
    assert_eq!(buf[1], 0.0);

    p.get_values(&mut buf, GridValueType::NonCriticalNeighbourhood).unwrap();
    // (3, 2) and (0, 3) touch the critical cell (3, 3)
    assert_eq!(buf[11], 1.0);
    assert_eq!(buf[12], 1.0);
    assert_eq!(buf[5], 0.0);

    assert_eq!(p.get_value(GridValueType::HeightScaled).unwrap(), 5);
    assert_eq!(p.get_value(GridValueType::CriticalCells).unwrap(), 1);
    assert!(p.get_value(GridValueType::Height).is_err());
}

#[test]
fn field_projections_need_field() {
    let p = pile(4, TopplingRule::Rossum2011, BoundaryType::Undefined);
    let mut buf = vec![0.0f32; 16];
    p.get_values(&mut buf, GridValueType::Direction).unwrap();
    assert!(buf.iter().all(|&v| [0.0, 0.25, 0.5, 0.75].contains(&v)));
    assert_eq!(p.get_value(GridValueType::Dissipation).unwrap(), -1);

    let plain = pile(4, TopplingRule::LinEtal2006, BoundaryType::Undefined);
    assert!(plain.get_value(GridValueType::Direction).is_err());
}

#[test]
fn snapshots_do_not_advance_streams() {
    let mut a = pile(8, TopplingRule::BakTangWiesenfeld1987, BoundaryType::FullyConnected);
    let mut b = pile(8, TopplingRule::BakTangWiesenfeld1987, BoundaryType::FullyConnected);
    let mut buf = vec![0.0f32; 64];
    a.get_values(&mut buf, GridValueType::NonCriticalNeighbourhood).unwrap();

    for _ in 0..50 {
        a.drive().unwrap();
        b.drive().unwrap();
        assert_eq!(a.relax(true).unwrap(), b.relax(true).unwrap());
    }
    assert_eq!(a.avalanches(), b.avalanches());
}

#[test]
fn coarsen_sums_patches() {
    let mut p = pile(4, TopplingRule::BakTangWiesenfeld1987, BoundaryType::Periodic);
    p.add_grains(0, 0, 1.0).unwrap();
    p.add_grains(1, 1, 2.0).unwrap();
    p.add_grains(3, 2, 3.0).unwrap();

    let mut patches = vec![0.0f32; 4];
    p.coarsen(&mut patches, 2).unwrap();
    assert_eq!(patches, vec![3.0, 0.0, 0.0, 3.0]);

    let mut full = vec![0.0f32; 16];
    p.coarsen(&mut full, 1).unwrap();
    assert_eq!(full[5], 2.0);

    assert!(p.coarsen(&mut patches, 3).is_err());
    let mut wrong = vec![0.0f32; 3];
    assert!(p.coarsen(&mut wrong, 2).is_err());
}

#[test]
fn clear_leaves_field_alone() {
    let mut p = pile(16, TopplingRule::Rossum2011, BoundaryType::Undefined);
    let seeded = p.populate(40, 5.0).unwrap();
    p.add_grains(3, 3, 2.0).unwrap();
    p.clear();
    assert_eq!(p.grid().unwrap().count_grains(), 0.0);
    assert_eq!(p.diss_grid().unwrap().count_grains(), seeded);
}

#[test]
fn print_dumps_every_grid() {
    let p = pile(4, TopplingRule::Rossum2011, BoundaryType::Undefined);
    let text = p.print();
    assert!(text.contains("sand grid"));
    assert!(text.contains("dissipation grid"));
    assert_eq!(text.matches("Grid size = 0").count(), 2);
}

#[test]
fn perf_metrics_fill_on_relax() {
    let mut p = pile(8, TopplingRule::BakTangWiesenfeld1987, BoundaryType::Undefined);
    p.enable_perf_metrics(true);
    p.drive().unwrap();
    p.relax(true).unwrap();
    let stats = p.get_perf_stats();
    assert!(stats.relax_ms() >= 0.0);
    assert_eq!(stats.drives(), 1);
    assert_eq!(stats.grid_size(), 64);

    p.enable_perf_metrics(false);
    assert_eq!(p.get_perf_stats().drives(), 0);
}

#[test]
fn config_applies_settings_in_order() {
    let cfg = SandPileConfig {
        system_size: 16,
        toppling_rule: TopplingRule::Rossum2011,
        dissipation_total: 200.0,
        dissipation_cell_capacity: 8.0,
        ..SandPileConfig::default()
    };
    let p = SandPileCore::from_config(&cfg).unwrap();
    let t = p.toppling().unwrap();
    assert_eq!(t.threshold(), 4.0);
    assert_eq!(t.dissipation_threshold(), 3.0);
    assert_eq!(t.grid().cells()[0].max_capacity(), 16.0);

    let field = p.diss_grid().unwrap();
    assert_eq!(field.cells()[0].max_capacity(), 8.0);
    assert!(field.count_grains() > 10.0);
}

#[test]
fn config_with_short_feed_list_falls_back_to_defaults() {
    let short = SandPileCore::from_config_json(r#"{"system_size": 8, "feeds": [1, 2]}"#).unwrap();
    let full = SandPileCore::from_config_json(r#"{"system_size": 8}"#).unwrap();
    let dirs = |p: &SandPileCore| {
        p.grid()
            .unwrap()
            .cells()
            .iter()
            .map(|c| c.direction())
            .collect::<Vec<_>>()
    };
    assert_eq!(dirs(&short), dirs(&full));
}
