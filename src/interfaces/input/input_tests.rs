use nalgebra::{Matrix3, Vector3};

use crate::auxiliary::structure::CrystalStructure;
use crate::errors::SubSymError;
use crate::interfaces::input::IndsodParams;

fn four_site_structure() -> CrystalStructure {
    CrystalStructure {
        comment: "test".to_string(),
        lattice: Matrix3::identity(),
        symbols: vec!["Mg".to_string(), "O".to_string()],
        counts: vec![4, 2],
        coordinates: vec![Vector3::zeros(); 6],
    }
}

#[test]
fn test_input_parse_full_record() {
    let params = IndsodParams::parse(
        "# substitution control\n\
         nsub = 3\n\
         subs = 2, 1, 1\n\
         symb = Mg Ca Sr\n\
         prec = 1e-4\n\
         site = 1\n\
         leqa = .true.\n\
         lpro = T\n",
    )
    .unwrap();
    assert_eq!(params.nsub, 3);
    assert_eq!(params.subs, vec![2, 1, 1]);
    assert_eq!(params.symb, vec!["Mg", "Ca", "Sr"]);
    assert_eq!(params.prec, 1e-4);
    assert_eq!(params.site, 1);
    assert!(params.leqa);
    assert!(!params.lspg);
    assert!(params.lcfg);
    assert!(!params.lpos);
    assert!(params.lpro);
}

#[test]
fn test_input_parse_defaults() {
    let params = IndsodParams::parse("subs = 2 2\nsymb = Mg Ca\n").unwrap();
    assert_eq!(params.nsub, 2);
    assert_eq!(params.prec, 1e-5);
    assert_eq!(params.site, 1);
    assert!(params.lcfg);
    assert!(!params.leqa && !params.lspg && !params.lpos && !params.lpro);
}

#[test]
fn test_input_parse_comments_and_failures() {
    // Trailing comments are stripped.
    let params = IndsodParams::parse("nsub = 2  ! binary\nsubs = 2 2\nsymb = Mg Ca\n").unwrap();
    assert_eq!(params.nsub, 2);

    assert!(matches!(
        IndsodParams::parse("nsub two\n"),
        Err(SubSymError::InputValidation(_))
    ));
    assert!(matches!(
        IndsodParams::parse("nsub = two\n"),
        Err(SubSymError::InputValidation(_))
    ));
    assert!(matches!(
        IndsodParams::parse("mystery = 1\n"),
        Err(SubSymError::InputValidation(_))
    ));
    assert!(matches!(
        IndsodParams::parse("leqa = maybe\n"),
        Err(SubSymError::InputValidation(_))
    ));
}

#[test]
fn test_input_validate() {
    let structure = four_site_structure();

    let good = IndsodParams::parse("subs = 3 1\nsymb = Mg Ca\n").unwrap();
    good.validate(&structure).unwrap();

    // Multiplicities must cover the substituted type exactly.
    let short = IndsodParams::parse("subs = 2 1\nsymb = Mg Ca\n").unwrap();
    assert!(matches!(
        short.validate(&structure),
        Err(SubSymError::InputValidation(_))
    ));

    // nsub out of range.
    let six = IndsodParams::parse("nsub = 6\nsubs = 1 1 1 1 1\nsymb = A B C D E\n").unwrap();
    assert!(matches!(
        six.validate(&structure),
        Err(SubSymError::InputValidation(_))
    ));

    // Symbol count must equal nsub.
    let lopsided = IndsodParams::parse("subs = 3 1\nsymb = Mg\n").unwrap();
    assert!(matches!(
        lopsided.validate(&structure),
        Err(SubSymError::InputValidation(_))
    ));

    // Symbols are one or two characters.
    let long_symbol = IndsodParams::parse("subs = 3 1\nsymb = Mag Ca\n").unwrap();
    assert!(matches!(
        long_symbol.validate(&structure),
        Err(SubSymError::InputValidation(_))
    ));

    // prec must be at most 1e-2.
    let coarse = IndsodParams::parse("subs = 3 1\nsymb = Mg Ca\nprec = 0.5\n").unwrap();
    assert!(matches!(
        coarse.validate(&structure),
        Err(SubSymError::InputValidation(_))
    ));

    // site must index an existing type.
    let off_site = IndsodParams::parse("subs = 3 1\nsymb = Mg Ca\nsite = 3\n").unwrap();
    assert!(matches!(
        off_site.validate(&structure),
        Err(SubSymError::StructuralInconsistency(_))
    ));

    // A zero multiplicity is rejected.
    let vacant = IndsodParams::parse("subs = 4 0\nsymb = Mg Ca\n").unwrap();
    assert!(matches!(
        vacant.validate(&structure),
        Err(SubSymError::InputValidation(_))
    ));
}

#[test]
fn test_input_to_enumeration_params() {
    let record = IndsodParams::parse(
        "nsub = 2\nsubs = 3 1 0 0 0\nsymb = Mg Ca\nsite = 1\nlpos = .true.\n",
    )
    .unwrap();
    let params = record
        .to_enumeration_params(std::path::Path::new("/tmp/run"))
        .unwrap();
    assert_eq!(params.composition, vec![3, 1]);
    assert_eq!(params.species_symbols, vec!["Mg", "Ca"]);
    assert_eq!(params.site_type, 0);
    assert!(params.write_structures);
    assert!(params.write_configurations);
    assert!(!params.show_progress);
    assert_eq!(params.directory, std::path::PathBuf::from("/tmp/run"));
}
