use nalgebra::{Matrix3, Vector3};

use crate::errors::SubSymError;
use crate::symmetry::{SiteAction, SymmetryOperation};

#[test]
fn test_site_action_validation() {
    let action = SiteAction::from_images(vec![vec![0, 1, 2, 3], vec![1, 0, 3, 2]]).unwrap();
    assert_eq!(action.n_sites(), 4);
    assert_eq!(action.n_operations(), 2);
    assert_eq!(action.identity_operation(), Some(0));
    assert_eq!(action.image(1, 2), 3);

    // Repeated image.
    assert!(matches!(
        SiteAction::from_images(vec![vec![0, 1, 2, 3], vec![1, 1, 3, 2]]),
        Err(SubSymError::SymmetryIntegrity { operation: 1, .. })
    ));

    // Out-of-range image.
    assert!(matches!(
        SiteAction::from_images(vec![vec![0, 1, 2, 4]]),
        Err(SubSymError::SymmetryIntegrity { .. })
    ));

    // No identity among the operations.
    assert!(matches!(
        SiteAction::from_images(vec![vec![1, 0, 3, 2], vec![2, 3, 0, 1]]),
        Err(SubSymError::SymmetryIntegrity { .. })
    ));

    assert!(SiteAction::from_images(vec![]).is_err());
}

#[test]
fn test_site_action_relabelled() {
    let action = SiteAction::from_images(vec![vec![0, 1, 2, 3], vec![2, 3, 0, 1]]).unwrap();
    // New position p holds old site order[p].
    let relabelled = action.relabelled(&[2, 0, 3, 1]);
    assert_eq!(relabelled.identity_operation(), Some(0));
    // Old action swaps {0, 2} and {1, 3}; after relabelling, old 0 sits at
    // new 1 and old 2 at new 0, so operation 1 must swap new 0 and new 1.
    assert_eq!(relabelled.image(1, 0), 1);
    assert_eq!(relabelled.image(1, 1), 0);
    assert_eq!(relabelled.image(1, 2), 3);
    assert_eq!(relabelled.image(1, 3), 2);
}

#[test]
fn test_site_action_from_operations() {
    // Four sites on a square in the a-b plane; a fourfold rotation about the
    // cell centre cycles them.
    let sites = [
        Vector3::new(0.25, 0.25, 0.0),
        Vector3::new(0.75, 0.25, 0.0),
        Vector3::new(0.75, 0.75, 0.0),
        Vector3::new(0.25, 0.75, 0.0),
    ];
    let identity = SymmetryOperation {
        rotation: Matrix3::identity(),
        translation: Vector3::zeros(),
    };
    // (x, y, z) -> (1/2 + y, 1/2 - x, z): rotation by 90 degrees about the
    // cell centre, expressed with a translation part.
    let rotation = SymmetryOperation {
        rotation: Matrix3::new(0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0),
        translation: Vector3::new(0.5, 0.5, 0.0),
    };
    let action =
        SiteAction::from_operations(&[identity.clone(), rotation], &sites, 1e-5).unwrap();
    assert_eq!(action.identity_operation(), Some(0));
    // Site 0 -> (0.75, 0.25, 0) = site 1, and so on around the square.
    assert_eq!(action.operation(1).to_vec(), vec![1, 2, 3, 0]);

    // An operation leaving the sublattice is rejected.
    let shift = SymmetryOperation {
        rotation: Matrix3::identity(),
        translation: Vector3::new(0.1, 0.0, 0.0),
    };
    assert!(matches!(
        SiteAction::from_operations(&[identity, shift], &sites, 1e-5),
        Err(SubSymError::SymmetryIntegrity { operation: 1, .. })
    ));
}

#[test]
fn test_site_action_wrapped_matching() {
    // Images outside [0, 1) must wrap back onto the sublattice.
    let sites = [Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5)];
    let identity = SymmetryOperation {
        rotation: Matrix3::identity(),
        translation: Vector3::zeros(),
    };
    let inversion = SymmetryOperation {
        rotation: -Matrix3::identity(),
        translation: Vector3::zeros(),
    };
    let action = SiteAction::from_operations(&[identity, inversion], &sites, 1e-5).unwrap();
    // Inversion sends (0.5, 0.5, 0.5) to (-0.5, -0.5, -0.5) = itself mod 1.
    assert_eq!(action.operation(1).to_vec(), vec![0, 1]);
}
