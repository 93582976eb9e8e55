//! Integration test: concurrent lookups.
//!
//! Many threads share one instance with no synchronization on the read
//! path. Every thread must see exactly the results a single thread sees.

use std::sync::{Arc, Barrier};
use std::thread;

use chp_integration_tests::{STRATEGIES, init_tracing, object_population};
use chp_placement::PlacementInstance;
use chp_types::Placement;
use rayon::prelude::*;

const THREADS: usize = 8;

/// 8 scoped threads released together, each resolving the whole population.
#[test]
fn test_scoped_threads_match_sequential() {
    init_tracing();
    let oids = object_population(20_000);

    for &strategy in STRATEGIES {
        let instance = PlacementInstance::initialize(strategy, 32, 128).unwrap();
        let expected: Vec<Placement> = oids
            .iter()
            .map(|&oid| instance.find_placement(oid, 3).unwrap())
            .collect();

        let barrier = Barrier::new(THREADS);
        thread::scope(|scope| {
            for t in 0..THREADS {
                let instance = &instance;
                let oids = &oids;
                let expected = &expected;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    // Stagger start points so threads hit different vnodes at once.
                    let offset = t * oids.len() / THREADS;
                    for i in 0..oids.len() {
                        let k = (i + offset) % oids.len();
                        let got = instance.find_placement(oids[k], 3).unwrap();
                        assert_eq!(got, expected[k], "{strategy}: thread {t} diverged");
                    }
                });
            }
        });

        instance.release();
    }
}

/// Parallel iterator over 200k lookups, the tight-loop caller pattern.
#[test]
fn test_parallel_iterator_matches_sequential() {
    let oids = object_population(200_000);
    let instance = PlacementInstance::initialize("baseline", 100, 256).unwrap();

    let sequential: Vec<Placement> = oids
        .iter()
        .map(|&oid| instance.find_placement(oid, 4).unwrap())
        .collect();
    let parallel: Vec<Placement> = oids
        .par_iter()
        .map(|&oid| instance.find_placement(oid, 4).unwrap())
        .collect();

    assert_eq!(sequential, parallel);
}

/// Invalid calls on some threads leave concurrent valid calls untouched.
#[test]
fn test_invalid_calls_isolated_from_valid_ones() {
    let oids = object_population(5_000);
    let instance = PlacementInstance::initialize("multiring", 4, 64).unwrap();

    thread::scope(|scope| {
        let bad = scope.spawn(|| {
            oids.iter()
                .filter(|&&oid| instance.find_placement(oid, 5).is_err())
                .count()
        });
        let good = scope.spawn(|| {
            oids.iter()
                .filter(|&&oid| instance.find_placement(oid, 4).is_ok())
                .count()
        });
        assert_eq!(bad.join().unwrap(), oids.len());
        assert_eq!(good.join().unwrap(), oids.len());
    });
}

/// Shared through an `Arc`; released once the last lookup thread is done.
#[test]
fn test_release_after_shared_use() {
    let oids = Arc::new(object_population(10_000));
    let instance = Arc::new(PlacementInstance::initialize("baseline", 16, 64).unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let instance = Arc::clone(&instance);
            let oids = Arc::clone(&oids);
            thread::spawn(move || {
                oids.iter()
                    .map(|&oid| instance.find_placement(oid, 2).unwrap().len())
                    .sum::<usize>()
            })
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap(), 2 * oids.len());
    }

    let instance = Arc::try_unwrap(instance).expect("all lookup threads joined");
    instance.release();
}
