use itertools::Itertools;

use crate::combinatorics::{binomial, complement, floor_search, BinomialTable};
use crate::errors::SubSymError;

#[test]
fn test_combinatorics_binomial() {
    assert_eq!(binomial(0, 0).unwrap(), 1);
    assert_eq!(binomial(4, 2).unwrap(), 6);
    assert_eq!(binomial(6, 3).unwrap(), 20);
    assert_eq!(binomial(10, 0).unwrap(), 1);
    assert_eq!(binomial(10, 10).unwrap(), 1);
    assert_eq!(binomial(3, 5).unwrap(), 0);
    assert_eq!(binomial(52, 26).unwrap(), 495_918_532_948_104);
    assert_eq!(binomial(60, 30).unwrap(), 118_264_581_564_861_424);

    assert!(matches!(binomial(128, 64), Err(SubSymError::Overflow(_))));
}

#[test]
fn test_combinatorics_table_matches_direct() {
    let table = BinomialTable::new(20, 8);
    for n in 0..=20 {
        for k in 0..=8 {
            assert_eq!(table.choose(n, k), binomial(n, k).unwrap(), "C({n}, {k})");
        }
    }
}

#[test]
fn test_combinatorics_table_saturates() {
    // C(128, 64) overflows u64; the table saturates instead of failing so
    // that rank comparisons against a checked total stay valid.
    let table = BinomialTable::new(128, 64);
    assert_eq!(table.choose(128, 64), u64::MAX);
    assert_eq!(table.choose(12, 6), binomial(12, 6).unwrap());
}

#[test]
fn test_combinatorics_colex_order() {
    // Colex order on 2-subsets of {0..3}: {0,1} {0,2} {1,2} {0,3} {1,3} {2,3}.
    let table = BinomialTable::new(4, 2);
    let expected: [&[usize]; 6] = [&[0, 1], &[0, 2], &[1, 2], &[0, 3], &[1, 3], &[2, 3]];
    for (rank, subset) in expected.iter().enumerate() {
        assert_eq!(table.colex_rank(subset), rank as u64);
        assert_eq!(table.colex_unrank(rank as u64, 4, 2), subset.to_vec());
    }
}

#[test]
fn test_combinatorics_colex_round_trip() {
    let n = 9;
    for k in 1..=4 {
        let table = BinomialTable::new(n, k);
        let count = table.choose(n, k);
        let mut seen = Vec::new();
        for rank in 0..count {
            let subset = table.colex_unrank(rank, n, k);
            assert_eq!(subset.len(), k);
            assert!(subset.iter().tuple_windows().all(|(a, b)| a < b));
            assert_eq!(table.colex_rank(&subset), rank);
            seen.push(subset);
        }
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len() as u64, count);
    }
}

#[test]
fn test_combinatorics_complement() {
    assert_eq!(complement(&[0, 2], 5), vec![1, 3, 4]);
    assert_eq!(complement(&[], 3), vec![0, 1, 2]);
    assert_eq!(complement(&[0, 1, 2], 3), Vec::<usize>::new());
    assert_eq!(complement(&[4], 5), vec![0, 1, 2, 3]);
}

#[test]
fn test_combinatorics_floor_search() {
    let a = [1, 3, 3, 7, 9];
    assert_eq!(floor_search(&a, 0), None);
    assert_eq!(floor_search(&a, 1), Some(0));
    assert_eq!(floor_search(&a, 4), Some(2));
    assert_eq!(floor_search(&a, 9), Some(4));
    assert_eq!(floor_search(&a, 100), Some(4));
    assert_eq!(floor_search(&[], 5), None);
}
