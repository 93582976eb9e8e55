//! Integration test: lookup scenarios and per-call invariants.
//!
//! Runs the canonical initialize/lookup/release scenarios and checks
//! determinism, distinctness, completeness, coverage, and boundedness
//! for every registered strategy.

use std::collections::HashSet;

use chp_integration_tests::{
    STRATEGIES, assert_valid_placement, init_tracing, object_population,
};
use chp_placement::{PlacementConfig, PlacementError, PlacementInstance, Registry};
use chp_types::{CH_MAX_REPLICATION, ObjectId, ServerIdx};

#[test]
fn test_two_replicas_of_oid_zero_are_stable() {
    init_tracing();
    let instance = PlacementInstance::initialize("baseline", 4, 16).unwrap();

    let first = instance.find_placement(ObjectId::new(0), 2).unwrap();
    assert_valid_placement(&first, 4, 2);

    let again = instance.find_placement(ObjectId::new(0), 2).unwrap();
    assert_eq!(first.as_slice(), again.as_slice(), "same indices in the same order");

    instance.release();
}

#[test]
fn test_baseline_placements_match_known_values() {
    // Fixed across builds, platforms and processes.
    let small = PlacementInstance::initialize("baseline", 4, 16).unwrap();
    assert_eq!(small.find_placement(ObjectId::new(0), 2).unwrap().as_slice(), &[0, 3]);
    assert_eq!(
        small.find_placement(ObjectId::new(0), 4).unwrap().as_slice(),
        &[0, 3, 2, 1]
    );

    let larger = PlacementInstance::initialize("baseline", 10, 32).unwrap();
    assert_eq!(
        larger.find_placement(ObjectId::new(12345), 3).unwrap().as_slice(),
        &[6, 9, 0]
    );
    assert_eq!(
        larger.find_placement(ObjectId::new(0xdead_beef), 5).unwrap().as_slice(),
        &[7, 1, 0, 5, 4]
    );
}

#[test]
fn test_hash_modulo_placements_match_known_values() {
    let instance = PlacementInstance::initialize("hash_modulo", 7, 1).unwrap();
    let primaries: Vec<ServerIdx> = [0, 1, 42]
        .into_iter()
        .map(|oid| instance.find_placement(ObjectId::new(oid), 1).unwrap()[0])
        .collect();
    assert_eq!(primaries, vec![3, 0, 1]);
}

#[test]
fn test_full_replication_on_three_servers_is_permutation() {
    let instance = PlacementInstance::initialize("baseline", 3, 4).unwrap();
    for oid in object_population(200) {
        let p = instance.find_placement(oid, 3).unwrap();
        let set: HashSet<ServerIdx> = p.iter().copied().collect();
        assert_eq!(set, HashSet::from([0, 1, 2]), "oid {oid}");
    }
}

#[test]
fn test_replication_above_server_count_fails() {
    let instance = PlacementInstance::initialize("baseline", 2, 4).unwrap();
    for oid in object_population(20) {
        assert!(matches!(
            instance.find_placement(oid, 3),
            Err(PlacementError::InvalidReplicationFactor { requested: 3, .. })
        ));
    }
}

#[test]
fn test_unknown_strategy_produces_no_instance() {
    let result = PlacementInstance::initialize("unknown-strategy", 4, 16);
    assert!(matches!(result, Err(PlacementError::UnknownStrategy(name)) if name == "unknown-strategy"));
}

#[test]
fn test_zero_servers_is_invalid_parameter() {
    assert!(matches!(
        PlacementInstance::initialize("baseline", 0, 4),
        Err(PlacementError::InvalidParameter { .. })
    ));
}

#[test]
fn test_invariants_hold_for_every_strategy() {
    init_tracing();
    let oids = object_population(2_000);
    let shapes: &[(u32, u32)] = &[(1, 1), (2, 4), (5, 1), (16, 64), (40, 8)];

    for &strategy in STRATEGIES {
        for &(servers, vfactor) in shapes {
            let instance = PlacementInstance::initialize(strategy, servers, vfactor).unwrap();
            let max_r = (servers as usize).min(CH_MAX_REPLICATION);

            for r in [1, 2, 3, max_r] {
                if r > max_r {
                    continue;
                }
                for &oid in &oids {
                    let p = instance.find_placement(oid, r).unwrap();
                    assert_valid_placement(&p, servers, r);
                    assert_eq!(
                        instance.find_placement(oid, r).unwrap(),
                        p,
                        "{strategy}: non-deterministic result for {oid}"
                    );
                }
            }
            instance.release();
        }
    }
}

#[test]
fn test_full_replication_covers_every_server() {
    for &strategy in STRATEGIES {
        let instance = PlacementInstance::initialize(strategy, 12, 8).unwrap();
        for oid in object_population(300) {
            let p = instance.find_placement(oid, 12).unwrap();
            let mut servers = p.to_vec();
            servers.sort_unstable();
            assert_eq!(servers, (0..12).collect::<Vec<_>>(), "{strategy}: oid {oid}");
        }
    }
}

#[test]
fn test_shorter_placement_is_prefix_of_longer_on_ring() {
    // A single-ring walk yields the same order no matter how far it goes.
    let instance = PlacementInstance::initialize("baseline", 10, 32).unwrap();
    for oid in object_population(500) {
        let long = instance.find_placement(oid, 5).unwrap();
        for r in 1..5 {
            let short = instance.find_placement(oid, r).unwrap();
            assert_eq!(short.as_slice(), &long[..r]);
        }
    }
}

#[test]
fn test_independent_instances_agree() {
    // Placement depends only on parameters, never on construction history.
    let oids = object_population(1_000);
    for &strategy in STRATEGIES {
        let a = PlacementInstance::initialize(strategy, 7, 50).unwrap();
        let b = Registry::builtin().initialize(strategy, 7, 50).unwrap();
        for &oid in &oids {
            assert_eq!(a.find_placement(oid, 3).unwrap(), b.find_placement(oid, 3).unwrap());
        }
    }
}

#[test]
fn test_ring_alias_matches_baseline() {
    let ring = PlacementInstance::initialize("ring", 9, 20).unwrap();
    let baseline = PlacementInstance::initialize("baseline", 9, 20).unwrap();
    assert_eq!(ring.strategy_name(), "ring");
    for oid in object_population(500) {
        assert_eq!(
            ring.find_placement(oid, 4).unwrap(),
            baseline.find_placement(oid, 4).unwrap()
        );
    }
}

#[test]
fn test_config_driven_instance() {
    let config = PlacementConfig::from_toml(
        r#"
strategy = "multiring"
num_servers = 6
virtual_factor = 32
replication = 3
"#,
    )
    .unwrap();
    let instance = config.build().unwrap();
    for oid in object_population(200) {
        let p = instance.find_placement(oid, config.replication).unwrap();
        assert_valid_placement(&p, config.num_servers, config.replication);
    }
}
