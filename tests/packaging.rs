// SPDX-License-Identifier: Apache-2.0

use chiplet_carbon::{
    CarbonError, CarbonLookup, Chiplet, CoefficientTables, DramChiplet, GhgAbatement,
    LogicChiplet, Packager, PackagingParams, PackagingTechnology, PhotonicChiplet,
    allocate_packaging_carbon,
};
use rstest::rstest;

const CI_FAB: f64 = 820.0;

/// Charges a flat rate per cm² of die, ignoring yield and scaling.
struct FlatRate(f64);

impl CarbonLookup for FlatRate {
    fn manufacturing_carbon(
        &self,
        chiplet: &Chiplet,
        _ci_fab: f64,
        _abatement: GhgAbatement,
        _fab_yield: Option<f64>,
    ) -> chiplet_carbon::Result<f64> {
        Ok(self.0 * chiplet.area().unwrap_or(0.0))
    }

    fn cpa_scaling_factor(&self, _node: u32) -> chiplet_carbon::Result<f64> {
        Ok(1.0)
    }
}

fn tables() -> CoefficientTables {
    CoefficientTables::builtin().unwrap()
}

fn two_logic_dies() -> Vec<Chiplet> {
    vec![LogicChiplet::new(7, 1.0).into(), LogicChiplet::new(7, 1.0).into()]
}

fn mixed_dies() -> Vec<Chiplet> {
    vec![
        LogicChiplet::new(7, 1.2).into(),
        LogicChiplet::new(5, 0.6).into(),
        PhotonicChiplet::new(45, 1.5, "mems").into(),
        DramChiplet::new(10, "ddr4_10nm", 8.0).into(),
    ]
}

fn packager(tag: &str, bonding_yield: f64) -> Packager {
    Packager::new(PackagingTechnology::from_tag(tag)).with_params(PackagingParams {
        bonding_yield,
        ..PackagingParams::default()
    })
}

#[rstest]
#[case(vec![])]
#[case(two_logic_dies())]
#[case(mixed_dies())]
fn monolithic_is_free(#[case] chiplets: Vec<Chiplet>) {
    let carbon =
        allocate_packaging_carbon(&chiplets, CI_FAB, &PackagingTechnology::Monolithic, &tables())
            .unwrap();
    assert_eq!(carbon, 0.0);
}

#[rstest]
#[case(vec![])]
#[case(two_logic_dies())]
#[case(mixed_dies())]
fn unknown_technology_falls_back(#[case] chiplets: Vec<Chiplet>) {
    let technology = PackagingTechnology::from_tag("unknown-tech-xyz");
    assert!(!technology.is_recognized());
    let carbon = allocate_packaging_carbon(&chiplets, CI_FAB, &technology, &tables()).unwrap();
    assert_eq!(carbon, 150.0);
}

#[rstest]
#[case("3D")]
#[case("2.5D-passive")]
#[case("2.5D-active")]
#[case("RDL")]
#[case("EMIB")]
fn assembled_packages_cost_carbon(#[case] tag: &str) {
    for chiplets in [two_logic_dies(), mixed_dies()] {
        let carbon = allocate_packaging_carbon(
            &chiplets,
            CI_FAB,
            &PackagingTechnology::from_tag(tag),
            &tables(),
        )
        .unwrap();
        assert!(carbon.is_finite() && carbon > 0.0, "{tag}: {carbon}");
    }
}

#[rstest]
#[case("3D")]
#[case("2.5D-passive")]
#[case("2.5D-active")]
#[case("RDL")]
#[case("EMIB")]
fn better_bonding_yield_lowers_carbon(#[case] tag: &str) {
    let chiplets = mixed_dies();
    let carbon = [0.9, 0.95, 0.99, 1.0]
        .map(|bonding_yield| {
            packager(tag, bonding_yield)
                .packaging_carbon(&chiplets, CI_FAB, &tables())
                .unwrap()
        });
    for pair in carbon.windows(2) {
        assert!(pair[1] < pair[0], "{tag}: {carbon:?}");
    }
}

#[rstest]
#[case("3D")]
#[case("2.5D-passive")]
#[case("EMIB")]
fn chiplets_are_not_modified(#[case] tag: &str) {
    let chiplets = mixed_dies();
    let before = chiplets.clone();
    allocate_packaging_carbon(&chiplets, CI_FAB, &PackagingTechnology::from_tag(tag), &tables())
        .unwrap();
    assert_eq!(chiplets, before);
}

#[test]
fn two_die_passive_interposer() {
    let tables = tables();
    let chiplets = two_logic_dies();
    let packager = Packager::new(PackagingTechnology::PassiveInterposer);

    let interposer = packager
        .estimate_interposer(&chiplets, CI_FAB, &tables)
        .unwrap();
    let side = 50.0_f64.sqrt();
    let expected_area = (2.0 * side + 0.5) * (2.0 * side) / 100.0;
    assert!((interposer.area - expected_area).abs() < 1e-9);
    assert_eq!(interposer.layout.interface_count(), 2.0);
    assert_eq!(interposer.num_chiplets, 2);

    // 65 nm: 0.8 kWh/cm2, 95 g/cm2 gas, 500 g/cm2 materials, scaled by 0.35,
    // at 0.05 defects/cm2
    let carbon_per_area = (CI_FAB * 0.8 + 95.0 + 500.0) * 0.35;
    let expected_carbon =
        carbon_per_area * expected_area / (-expected_area * 0.05).exp() / 0.99;

    let carbon = packager.packaging_carbon(&chiplets, CI_FAB, &tables).unwrap();
    assert!((carbon - expected_carbon).abs() < 1e-9);

    let again = packager.packaging_carbon(&chiplets, CI_FAB, &tables).unwrap();
    assert_eq!(carbon.to_bits(), again.to_bits());
}

#[test]
fn single_die_emib_needs_no_bridges() {
    let chiplets: Vec<Chiplet> = vec![LogicChiplet::new(7, 2.0).into()];
    let carbon =
        allocate_packaging_carbon(&chiplets, CI_FAB, &PackagingTechnology::Emib, &tables())
            .unwrap();
    assert_eq!(carbon, 0.0);
}

#[test]
fn memory_is_not_on_the_interposer() {
    let tables = tables();
    let packager = Packager::new(PackagingTechnology::PassiveInterposer);

    let mut chiplets = two_logic_dies();
    let without_memory = packager
        .estimate_interposer(&chiplets, CI_FAB, &tables)
        .unwrap();

    chiplets.push(DramChiplet::new(10, "hbm2_10nm", 16.0).into());
    chiplets.insert(0, DramChiplet::new(10, "ddr4_10nm", 8.0).into());
    let with_memory = packager
        .estimate_interposer(&chiplets, CI_FAB, &tables)
        .unwrap();

    assert_eq!(with_memory, without_memory);
}

#[test]
fn memory_only_assembly_is_an_error() {
    let chiplets: Vec<Chiplet> = vec![DramChiplet::new(10, "ddr4_10nm", 8.0).into()];
    let err = allocate_packaging_carbon(
        &chiplets,
        CI_FAB,
        &PackagingTechnology::PassiveInterposer,
        &tables(),
    )
    .unwrap_err();
    assert!(matches!(err, CarbonError::EmptyAssembly(ref tag) if tag == "2.5D-passive"));
}

#[rstest]
#[case("3D")]
#[case("2.5D-passive")]
#[case("2.5D-active")]
#[case("RDL")]
#[case("EMIB")]
fn missing_interposer_node_is_fatal(#[case] tag: &str) {
    let packager =
        Packager::new(PackagingTechnology::from_tag(tag)).with_params(PackagingParams {
            interposer_node: 11,
            ..PackagingParams::default()
        });
    let err = packager
        .packaging_carbon(&two_logic_dies(), CI_FAB, &tables())
        .unwrap_err();
    assert!(matches!(err, CarbonError::MissingCoefficient { ref key, .. } if key == "11nm"));
}

#[test]
fn rules_scale_the_interposer() {
    let rate = 100.0;
    let lookup = FlatRate(rate);
    let chiplets = mixed_dies();

    let interposer = Packager::new(PackagingTechnology::PassiveInterposer)
        .estimate_interposer(&chiplets, CI_FAB, &lookup)
        .unwrap();
    assert_eq!(interposer.num_chiplets, 3);
    assert!((interposer.carbon - rate * interposer.area).abs() < 1e-9);

    let passive = allocate_packaging_carbon(
        &chiplets,
        CI_FAB,
        &PackagingTechnology::PassiveInterposer,
        &lookup,
    )
    .unwrap();
    assert!((passive - interposer.carbon / 0.99).abs() < 1e-9);

    let rdl = allocate_packaging_carbon(&chiplets, CI_FAB, &PackagingTechnology::Rdl, &lookup)
        .unwrap();
    assert!((rdl - passive * 6.0 / 8.0).abs() < 1e-9);

    let active = allocate_packaging_carbon(
        &chiplets,
        CI_FAB,
        &PackagingTechnology::ActiveInterposer,
        &lookup,
    )
    .unwrap();
    let router_area = 0.0447 * 3.0;
    let expected = (interposer.carbon - interposer.carbon * router_area / interposer.area) / 0.99;
    assert!((active - expected).abs() < 1e-9);

    let emib = allocate_packaging_carbon(&chiplets, CI_FAB, &PackagingTechnology::Emib, &lookup)
        .unwrap();
    let bridge = rate * 0.25;
    assert!((emib - bridge * interposer.layout.interface_count() / 0.99).abs() < 1e-9);
}

#[test]
fn stacking_charges_tsv_area() {
    let rate = 100.0;
    let lookup = FlatRate(rate);
    let chiplets = mixed_dies();
    let packager = Packager::new(PackagingTechnology::Stacked3d);

    let overhead: f64 = [1.2, 0.6, 1.5]
        .iter()
        .map(|area| packager.tsv_overhead(*area))
        .sum();
    let expected = rate * overhead / 0.99_f64.powi(3);

    let carbon = packager
        .packaging_carbon(&chiplets, CI_FAB, &lookup)
        .unwrap();
    assert!((carbon - expected).abs() < 1e-9);
}

#[test]
fn abatement_reaches_the_interposer() {
    let chiplets = two_logic_dies();
    let at_95 = Packager::new(PackagingTechnology::PassiveInterposer)
        .packaging_carbon(&chiplets, CI_FAB, &tables())
        .unwrap();
    let at_99 = Packager::new(PackagingTechnology::PassiveInterposer)
        .with_abatement(GhgAbatement::Percent99)
        .packaging_carbon(&chiplets, CI_FAB, &tables())
        .unwrap();
    assert!(at_99 < at_95);
}
