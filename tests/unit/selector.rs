//! Routine selection per table shape

use nascan::core::blast_nalookup::{
    DiscTemplate, LookupTable, LookupTableWrap, MbLookupTable, NaLookupTable, SmallNaLookupTable,
};
use nascan::core::blast_nascan::{choose_scan_subject, ScanStrategy};
use nascan::error::LookupError;

fn small(wl: usize, step: usize) -> ScanStrategy {
    choose_scan_subject(&SmallNaLookupTable::build(b"", wl, step).unwrap().into())
}

fn standard(wl: usize, step: usize) -> ScanStrategy {
    choose_scan_subject(&NaLookupTable::build(b"", wl, step).unwrap().into())
}

fn megablast(wl: usize, step: usize) -> ScanStrategy {
    choose_scan_subject(&MbLookupTable::build_contiguous(b"", wl, step).unwrap().into())
}

fn disc(template: DiscTemplate, second: Option<DiscTemplate>, full_byte: bool) -> ScanStrategy {
    let table = MbLookupTable::build_discontiguous(b"", template, second, full_byte).unwrap();
    choose_scan_subject(&table.into())
}

#[test]
fn test_standard_selection() {
    assert_eq!(standard(8, 0), ScanStrategy::NaScan8x4);
    assert_eq!(standard(8, 4), ScanStrategy::NaScanAny);
    assert_eq!(standard(8, 1), ScanStrategy::NaScanAny);
    assert_eq!(standard(5, 3), ScanStrategy::NaScanAny);
}

#[test]
fn test_small_selection() {
    let cases = [
        (4, 1, ScanStrategy::SmallNaScan4x1),
        (4, 2, ScanStrategy::SmallNaScanAny),
        (5, 1, ScanStrategy::SmallNaScan5x1),
        (5, 3, ScanStrategy::SmallNaScanAny),
        (6, 1, ScanStrategy::SmallNaScan6x1),
        (6, 2, ScanStrategy::SmallNaScan6x2),
        (6, 3, ScanStrategy::SmallNaScanAny),
        (7, 1, ScanStrategy::SmallNaScan7x1),
        (7, 2, ScanStrategy::SmallNaScan7x2),
        (7, 3, ScanStrategy::SmallNaScan7x3),
        (7, 4, ScanStrategy::SmallNaScanAny),
        (8, 0, ScanStrategy::SmallNaScan8x4),
        (8, 4, ScanStrategy::SmallNaScan8x4),
        (8, 1, ScanStrategy::SmallNaScan8x1Mod4),
        (8, 5, ScanStrategy::SmallNaScan8x1Mod4),
        (8, 6, ScanStrategy::SmallNaScan8x2Mod4),
        (8, 7, ScanStrategy::SmallNaScan8x3Mod4),
        (8, 8, ScanStrategy::SmallNaScanAny),
    ];
    for (wl, step, expected) in cases {
        assert_eq!(small(wl, step), expected, "width {wl} stride {step}");
    }
}

#[test]
fn test_megablast_selection() {
    let cases = [
        (9, 1, ScanStrategy::MbAny),
        (9, 2, ScanStrategy::Mb9x2),
        (9, 3, ScanStrategy::MbAny),
        (10, 1, ScanStrategy::Mb10x1),
        (10, 2, ScanStrategy::Mb10x2),
        (10, 3, ScanStrategy::Mb10x3),
        (10, 4, ScanStrategy::MbAny),
        (11, 1, ScanStrategy::Mb11x1Mod4),
        (11, 6, ScanStrategy::Mb11x2Mod4),
        (11, 7, ScanStrategy::Mb11x3Mod4),
        (11, 8, ScanStrategy::MbAny),
        (12, 1, ScanStrategy::MbAny),
    ];
    for (wl, step, expected) in cases {
        assert_eq!(megablast(wl, step), expected, "width {wl} stride {step}");
    }
}

#[test]
fn test_width_9_stride_1_can_be_forced() {
    let table: LookupTable = MbLookupTable::build_contiguous(b"", 9, 1).unwrap().into();
    assert!(ScanStrategy::Mb9x1.is_applicable(&table));
    let wrap = LookupTableWrap::with_strategy(table, ScanStrategy::Mb9x1).unwrap();
    assert_eq!(wrap.strategy(), ScanStrategy::Mb9x1);
}

#[test]
fn test_discontiguous_selection() {
    use DiscTemplate::*;
    assert_eq!(disc(Template11x18Coding, None, false), ScanStrategy::MbDisc11x18x1);
    assert_eq!(disc(Template11x21Coding, None, false), ScanStrategy::MbDisc11x21x1);
    assert_eq!(disc(Template11x18Optimal, None, false), ScanStrategy::MbDisc1);
    assert_eq!(disc(Template12x16Coding, None, false), ScanStrategy::MbDisc1);
    assert_eq!(disc(Template11x18Coding, None, true), ScanStrategy::MbDiscAny);
    assert_eq!(
        disc(Template11x18Coding, Some(Template11x18Optimal), false),
        ScanStrategy::MbDiscAny
    );
}

#[test]
fn test_mismatched_template_pair_is_rejected() {
    let err = MbLookupTable::build_discontiguous(
        b"",
        DiscTemplate::Template11x18Coding,
        Some(DiscTemplate::Template12x18Coding),
        false,
    )
    .unwrap_err();
    assert!(matches!(err, LookupError::TemplateMismatch { .. }));
}

#[test]
fn test_inapplicable_strategies_are_rejected() {
    let table: LookupTable = SmallNaLookupTable::build(b"", 7, 2).unwrap().into();
    for strategy in [
        ScanStrategy::SmallNaScan7x1,
        ScanStrategy::SmallNaScan7x3,
        ScanStrategy::NaScanAny,
        ScanStrategy::MbAny,
    ] {
        assert_eq!(
            LookupTableWrap::with_strategy(table.clone(), strategy).unwrap_err(),
            LookupError::StrategyNotApplicable { strategy }
        );
    }
}

#[test]
fn test_strategy_names_are_unique() {
    for strategy in ScanStrategy::ALL {
        assert_eq!(ScanStrategy::from_name(strategy.name()), Some(strategy));
    }
    assert_eq!(ScanStrategy::from_name("mb_scan_13_1"), None);
}
