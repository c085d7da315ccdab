//! # End-to-End Allocation Scenarios
//!
//! Exercises the public surface of `packs-core` the way the service and CLI
//! use it: raw input in, normalized set, solver over a pool, result out.

use std::collections::BTreeMap;
use std::sync::Arc;

use packs_core::{
    calculate_optimal_packs, solve, DpBufferPool, Limits, OrderQuantity, PackCalculator,
    PackSizeSet, PackSolver, ValidationError,
};

fn solver() -> PackSolver {
    PackSolver::with_pool(Arc::new(DpBufferPool::default()))
}

// -- Documented scenarios -----------------------------------------------------

#[test]
fn test_exact_single_pack() {
    let result = solver().calculate_optimal_packs(&[250, 500, 1000], 500);
    assert_eq!(result.allocation().to_map(), BTreeMap::from([(500, 1)]));
    assert_eq!(result.surplus(), 0);
    assert!(result.is_exact_match());
}

#[test]
fn test_minimal_surplus() {
    let result = solver().calculate_optimal_packs(&[250, 500], 251);
    assert_eq!(result.allocation().to_map(), BTreeMap::from([(500, 1)]));
    assert_eq!(result.surplus(), 249);
}

#[test]
fn test_large_order_with_coprime_sizes() {
    let result = solver().calculate_optimal_packs(&[23, 31, 53], 500_000);
    assert_eq!(result.surplus(), 0);
    assert_eq!(result.allocation().total_items(), 500_000);
    for (size, count) in result.allocation().iter() {
        assert!([23, 31, 53].contains(&size));
        assert!(count >= 1);
    }
}

#[test]
fn test_empty_sizes() {
    let result = solver().calculate_optimal_packs(&[], 100);
    assert!(result.allocation().is_empty());
    assert_eq!(result.surplus(), 100);
}

#[test]
fn test_two_packs_exact() {
    let result = solver().calculate_optimal_packs(&[10, 20], 30);
    assert_eq!(result.allocation().total_items(), 30);
    assert_eq!(result.surplus(), 0);
    assert_eq!(result.allocation().total_packs(), 2);
}

#[test]
fn test_unsorted_duplicate_input_matches_clean_input() {
    let messy = solver().calculate_optimal_packs(&[1000, 250, -4, 500, 250, 0], 1251);
    let clean = solver().calculate_optimal_packs(&[250, 500, 1000], 1251);
    assert_eq!(messy, clean);
    assert_eq!(clean.surplus(), 249);
}

#[test]
fn test_standard_configuration_orders() {
    let sizes = [250, 500, 1000, 2000, 5000];
    let cases: [(u64, u64, u64); 5] = [
        (1, 250, 1),
        (250, 250, 1),
        (251, 500, 1),
        (501, 750, 2),
        (12_001, 12_250, 4),
    ];
    for (order, shipped, packs) in cases {
        let result = solver().calculate_optimal_packs(&sizes, order);
        assert_eq!(result.allocation().total_items(), shipped, "order {order}");
        assert_eq!(result.allocation().total_packs(), packs, "order {order}");
    }
}

// -- Free functions -----------------------------------------------------------

#[test]
fn test_free_functions_agree() {
    let (from_raw, surplus_raw) = calculate_optimal_packs(&[500, 250], 751);
    let (from_solve, surplus_solve) = solve(&[250, 500], 751);
    assert_eq!(from_raw, from_solve);
    assert_eq!(surplus_raw, surplus_solve);
    assert_eq!(surplus_raw, 249);
}

// -- Boundary validation ------------------------------------------------------

#[test]
fn test_boundary_validation() {
    assert!(matches!(
        OrderQuantity::new(-1),
        Err(ValidationError::NegativeOrderQuantity(-1))
    ));
    assert!(PackSizeSet::try_from_strict(&[250, 0]).is_err());

    let limits = Limits::default();
    let sizes = PackSizeSet::normalize(&[250]);
    assert!(limits.check(&sizes, OrderQuantity::from(20_000_000)).is_err());
}

// -- Concurrency --------------------------------------------------------------

#[test]
fn test_parallel_calculations_are_deterministic() {
    let solver = Arc::new(solver());
    let expected = solver.calculate_optimal_packs(&[23, 31, 53], 10_007);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let solver = Arc::clone(&solver);
            std::thread::spawn(move || {
                (0..25)
                    .map(|_| solver.calculate_optimal_packs(&[53, 31, 23], 10_007))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        for result in handle.join().unwrap() {
            assert_eq!(result, expected);
        }
    }

    let stats = solver.pool().stats();
    assert_eq!(stats.hits + stats.misses, 201);
}
