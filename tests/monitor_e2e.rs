use aermon::{
    remap_positions, AddressGroup, BoundsQuery, ChannelCapture, ImportItem, Monitor, MonitorPhase,
    MonitorRegistry, Population, RawCapture,
};

fn capture(entries: &[(u32, &[(u32, f64)])]) -> ChannelCapture {
    entries
        .iter()
        .map(|&(channel, events)| (channel, RawCapture::from_pairs(events.iter().copied())))
        .collect()
}

#[test]
fn monitor_scenario_materializes_and_remaps() {
    let mut mon = Monitor::new(AddressGroup::new("exc soma", 0, vec![5, 9, 12]));
    mon.populate(RawCapture::from_pairs([(9, 1.0), (9, 2.0), (5, 0.5)]));

    let stream = mon.stream().unwrap();
    assert_eq!(stream.id_list(), vec![5, 9, 12]);
    assert_eq!(stream.get(12), Some(&[][..]));
    assert_eq!(stream.t_start(), 0.5);
    assert_eq!(stream.t_stop(), 2.0);

    let remapped = mon.remap(0.0, 1.0).unwrap();
    assert_eq!(remapped.coordinate_of(5), Some(0.0));
    assert_eq!(remapped.coordinate_of(9), Some(0.5));
    assert_eq!(remapped.coordinate_of(12), Some(1.0));
}

#[test]
fn materialization_is_idempotent_across_readers() {
    let mut mon = Monitor::new(AddressGroup::new("m", 1, vec![3, 1, 2]));
    mon.populate(RawCapture::from_columns(vec![1, 3, 3, 8], vec![4.0, 1.0, 2.5, 0.1]));

    let first = mon.stream().unwrap().clone();
    let rate = mon.firing_rates(1.0, true, None).unwrap();
    let second = mon.stream().unwrap().clone();

    assert_eq!(first, second);
    assert_eq!(first.id_list(), vec![1, 2, 3]);
    assert_eq!(first.t_start(), 1.0);
    assert_eq!(first.t_stop(), 4.0);
    assert_eq!(rate.len(), 3);
}

#[test]
fn completion_covers_every_group_address() {
    let laddr: Vec<u32> = (100..140).collect();
    let mut mon = Monitor::new(AddressGroup::new("wide", 0, laddr.clone()));
    mon.populate(RawCapture::from_pairs([(101, 1.0), (139, 2.0), (7, 3.0)]));

    let stream = mon.stream().unwrap();
    assert_eq!(stream.len(), laddr.len());
    assert!(laddr.iter().all(|&a| stream.contains_id(a)));
    assert_eq!(stream.event_count(), 2);
}

#[test]
fn unpopulated_monitor_is_unready() {
    let mut mon = Monitor::new(AddressGroup::new("idle", 0, vec![1]));
    assert!(mon.stream().unwrap_err().is_unready());
    assert_eq!(mon.phase(), MonitorPhase::Empty);
}

#[test]
fn registry_cycle_populate_aggregate_normalize() {
    let pops = vec![
        Population::new("exc", AddressGroup::new("exc soma", 0, vec![1, 2])),
        Population::new("inh", AddressGroup::new("inh soma", 0, vec![2, 3])),
        Population::new("out", AddressGroup::new("out soma", 1, vec![10])),
    ];

    let mut registry = MonitorRegistry::new();
    let created = registry.create_from_populations(&pops, None, true).unwrap();
    assert_eq!(created.len(), 3);
    assert_eq!(registry.channels().len(), 2);

    let ch0: &[(u32, f64)] = &[(1, 1.0), (2, 3.0), (2, 1.5), (3, 6.0)];
    let ch1: &[(u32, f64)] = &[(10, 2.0)];
    let run = capture(&[(0, ch0), (1, ch1)]);
    assert_eq!(registry.populate(&run), 3);

    let agg = registry.to_channel_aggregate().unwrap();
    let ch0 = agg.get(0).unwrap();
    assert_eq!(ch0.id_list(), vec![1, 2, 3]);
    // Both monitors saw id 2, so its events appear once per monitor.
    assert_eq!(ch0.get(2), Some(&[1.5, 1.5, 3.0, 3.0][..]));
    assert!(agg.select(&[0, 1, 42]).len() == 2);

    assert_eq!(registry.get_t_start().unwrap(), 1.0);
    assert_eq!(registry.get_t_stop().unwrap(), 6.0);

    let target = registry.normalize_bounds(None).unwrap();
    assert_eq!(target, 6.0);
    for stream in registry.streams().unwrap() {
        assert!(stream.t_stop() >= target);
    }
}

#[test]
fn failed_import_keeps_previous_monitors() {
    let mut registry = MonitorRegistry::new();
    registry
        .import_monitors(Monitor::new(AddressGroup::new("keep", 0, vec![1])), true)
        .unwrap();

    let batch = vec![
        ImportItem::from(Monitor::new(AddressGroup::new("a", 0, vec![1]))),
        ImportItem::dynamic(3.5_f64),
    ];
    assert!(registry.import_monitors(batch, false).unwrap_err().is_type_mismatch());
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(0).unwrap().name(), "keep");
}

#[test]
fn empty_registry_bound_sentinels() {
    let mut registry = MonitorRegistry::new();
    assert_eq!(registry.get_t_start().unwrap(), 65535.0);
    assert_eq!(registry.get_t_stop().unwrap(), 0.0);
}

#[test]
fn rate_inversion_law_holds_per_bin() {
    let mut mon = Monitor::new(AddressGroup::new("m", 0, vec![1, 2, 3, 4, 5, 6, 7]));
    let events: Vec<(u32, f64)> = (0..200u32).map(|i| (i % 9, f64::from(i) * 0.37)).collect();
    mon.populate(RawCapture::from_pairs(events));

    let mean = mon.firing_rates(3.0, true, None).unwrap();
    let total = mon.firing_rates(3.0, false, None).unwrap();
    assert_eq!(mean.len(), total.len());
    for (m, t) in mean.values().iter().zip(total.values()) {
        assert!((m * 7.0 - t).abs() < 1e-9);
    }
}

#[test]
fn remap_positions_properties() {
    for n in 2..50usize {
        let addrs: Vec<u32> = (0..n as u32).rev().collect();
        let coords = remap_positions(&addrs, -1.0, 3.0).coordinates();
        assert_eq!(coords.len(), n);
        assert_eq!(coords[0], -1.0);
        assert_eq!(coords[n - 1], 3.0);
        assert!(coords.windows(2).all(|w| w[0] < w[1]));
    }
    assert_eq!(remap_positions(&[42], -1.0, 3.0).coordinates(), vec![-1.0]);
    assert!(remap_positions(&[], -1.0, 3.0).coordinates().is_empty());
}
