use approx::assert_relative_eq;
use nalgebra::Vector3;

use crate::auxiliary::structure::CrystalStructure;
use crate::errors::SubSymError;

const ROCKSALT: &str = "\
rocksalt supercell
1.0
  8.4 0.0 0.0
  0.0 4.2 0.0
  0.0 0.0 4.2
   Mg O
   4 4
Direct
  0.00 0.00 0.00
  0.50 0.00 0.00
  0.25 0.50 0.50
  0.75 0.50 0.50
  0.25 0.00 0.50
  0.75 0.00 0.50
  0.00 0.50 0.00
  0.50 0.50 0.00
";

#[test]
fn test_structure_parse() {
    let structure = CrystalStructure::parse(ROCKSALT).unwrap();
    assert_eq!(structure.comment, "rocksalt supercell");
    assert_relative_eq!(structure.lattice[(0, 0)], 8.4);
    assert_relative_eq!(structure.lattice[(1, 1)], 4.2);
    assert_eq!(structure.symbols, vec!["Mg", "O"]);
    assert_eq!(structure.counts, vec![4, 4]);
    assert_eq!(structure.n_atoms(), 8);
    assert_relative_eq!(structure.coordinates[2][1], 0.5);

    let sublattice = structure.type_coordinates(0).unwrap();
    assert_eq!(sublattice.len(), 4);
    assert_relative_eq!(sublattice[1][0], 0.5);

    assert!(matches!(
        structure.type_coordinates(2),
        Err(SubSymError::StructuralInconsistency(_))
    ));
}

#[test]
fn test_structure_parse_applies_scale() {
    let scaled = ROCKSALT.replacen("1.0", "2.0", 1);
    let structure = CrystalStructure::parse(&scaled).unwrap();
    assert_relative_eq!(structure.lattice[(0, 0)], 16.8);
}

#[test]
fn test_structure_parse_failures() {
    // Truncated file.
    let lines: Vec<&str> = ROCKSALT.lines().take(6).collect();
    assert!(CrystalStructure::parse(&lines.join("\n")).is_err());

    // Cartesian coordinates are not supported.
    let cartesian = ROCKSALT.replace("Direct", "Cartesian");
    assert!(matches!(
        CrystalStructure::parse(&cartesian),
        Err(SubSymError::StructuralInconsistency(_))
    ));

    // Count-only files without a symbol line are rejected.
    let no_symbols = ROCKSALT.replace("   Mg O\n", "");
    assert!(CrystalStructure::parse(&no_symbols).is_err());
}

#[test]
fn test_structure_round_trip() {
    let structure = CrystalStructure::parse(ROCKSALT).unwrap();
    let rendered = structure.to_poscar();
    let reparsed = CrystalStructure::parse(&rendered).unwrap();
    assert_eq!(reparsed.symbols, structure.symbols);
    assert_eq!(reparsed.counts, structure.counts);
    for (a, b) in reparsed.coordinates.iter().zip(&structure.coordinates) {
        assert_relative_eq!((a - b).norm(), 0.0, epsilon = 1e-12);
    }
    assert_relative_eq!(
        (reparsed.lattice - structure.lattice).norm(),
        0.0,
        epsilon = 1e-10
    );
    assert!(rendered.lines().nth(7).unwrap().starts_with("Direct"));
}

#[test]
fn test_structure_decorated() {
    let structure = CrystalStructure::parse(ROCKSALT).unwrap();
    let sublattice: Vec<Vector3<f64>> = structure.type_coordinates(0).unwrap().to_vec();
    let decorated = structure
        .decorated(
            0,
            &sublattice,
            &[0, 1, 1, 0],
            &["Mg".to_string(), "Ca".to_string()],
            "configuration 1",
        )
        .unwrap();

    assert_eq!(decorated.comment, "configuration 1");
    assert_eq!(decorated.symbols, vec!["Mg", "Ca", "O"]);
    assert_eq!(decorated.counts, vec![2, 2, 4]);
    // Mg keeps sites 0 and 3 of the sublattice, Ca takes 1 and 2.
    assert_relative_eq!((decorated.coordinates[0] - sublattice[0]).norm(), 0.0);
    assert_relative_eq!((decorated.coordinates[1] - sublattice[3]).norm(), 0.0);
    assert_relative_eq!((decorated.coordinates[2] - sublattice[1]).norm(), 0.0);
    // The oxygen block is untouched.
    assert_relative_eq!((decorated.coordinates[4] - structure.coordinates[4]).norm(), 0.0);
}
