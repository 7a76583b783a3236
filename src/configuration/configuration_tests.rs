use itertools::Itertools;

use crate::configuration::{Composition, ConfigCodec};
use crate::errors::SubSymError;

#[test]
fn test_configuration_composition_validation() {
    assert!(Composition::new(vec![2, 2]).is_ok());
    assert!(matches!(
        Composition::new(vec![4]),
        Err(SubSymError::InputValidation(_))
    ));
    assert!(matches!(
        Composition::new(vec![2, 0, 2]),
        Err(SubSymError::InputValidation(_))
    ));

    let comp = Composition::new(vec![2, 3, 1]).unwrap();
    assert_eq!(comp.n_sites(), 6);
    assert_eq!(comp.n_species(), 3);
}

#[test]
fn test_configuration_codec_totals() {
    let codec = ConfigCodec::new(Composition::new(vec![2, 2]).unwrap()).unwrap();
    assert_eq!(codec.total(), 6);

    // 6! / (2! 2! 2!) = 90.
    let codec = ConfigCodec::new(Composition::new(vec![2, 2, 2]).unwrap()).unwrap();
    assert_eq!(codec.total(), 90);

    // 8! / (3! 2! 2! 1!) = 1680.
    let codec = ConfigCodec::new(Composition::new(vec![3, 2, 2, 1]).unwrap()).unwrap();
    assert_eq!(codec.total(), 1680);
}

#[test]
fn test_configuration_codec_bijection_binary() {
    let codec = ConfigCodec::new(Composition::new(vec![2, 2]).unwrap()).unwrap();
    let mut seen = Vec::new();
    for rank in 0..codec.total() {
        let assignment = codec.rank_to_assignment(rank).unwrap();
        assert_eq!(assignment.iter().filter(|&&a| a == 0).count(), 2);
        assert_eq!(assignment.iter().filter(|&&a| a == 1).count(), 2);
        assert_eq!(codec.assignment_to_rank(&assignment).unwrap(), rank);
        seen.push(assignment);
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 6);
}

#[test]
fn test_configuration_codec_bijection_ternary() {
    let codec = ConfigCodec::new(Composition::new(vec![2, 2, 2]).unwrap()).unwrap();
    let mut seen = Vec::new();
    for rank in 0..codec.total() {
        let assignment = codec.rank_to_assignment(rank).unwrap();
        assert_eq!(codec.assignment_to_rank(&assignment).unwrap(), rank);
        seen.push(assignment);
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 90);
}

#[test]
fn test_configuration_codec_covers_all_assignments() {
    // Every distinct multiset permutation of (1, 1, 2, 3) must be reachable.
    let codec = ConfigCodec::new(Composition::new(vec![2, 1, 1]).unwrap()).unwrap();
    assert_eq!(codec.total(), 12);
    let all = [0_u8, 0, 1, 2]
        .iter()
        .copied()
        .permutations(4)
        .unique()
        .collect_vec();
    assert_eq!(all.len(), 12);
    for assignment in all {
        let rank = codec.assignment_to_rank(&assignment).unwrap();
        assert_eq!(codec.rank_to_assignment(rank).unwrap(), assignment);
    }
}

#[test]
fn test_configuration_codec_refusals() {
    let codec = ConfigCodec::new(Composition::new(vec![2, 2]).unwrap()).unwrap();

    assert!(matches!(
        codec.rank_to_assignment(6),
        Err(SubSymError::InputValidation(_))
    ));
    assert!(matches!(
        codec.assignment_to_rank(&[0, 0, 1]),
        Err(SubSymError::InputValidation(_))
    ));
    assert!(matches!(
        codec.assignment_to_rank(&[0, 0, 0, 1]),
        Err(SubSymError::InputValidation(_))
    ));
    assert!(matches!(
        codec.assignment_to_rank(&[0, 0, 1, 5]),
        Err(SubSymError::InputValidation(_))
    ));
}

#[test]
fn test_configuration_codec_overflow() {
    // 64 sites split evenly: N = C(64, 32) * 1 fits, but a three-way split
    // of 120 sites does not.
    let comp = Composition::new(vec![40, 40, 40]).unwrap();
    assert!(matches!(
        ConfigCodec::new(comp),
        Err(SubSymError::Overflow(_))
    ));

    let comp = Composition::new(vec![32, 32]).unwrap();
    let codec = ConfigCodec::new(comp).unwrap();
    assert_eq!(codec.total(), 1_832_624_140_942_590_534);
}
