//! Built-in unit tables.
//!
//! Factors are exact where a definition exists (bar, atm, international
//! horsepower) and carry the usual published digits otherwise.

use once_cell::sync::Lazy;

use super::{UnitDefinition, UnitTable};

/// Build a static table. A malformed built-in table is a defect in this
/// file, so it panics on first access rather than returning wrong numbers.
fn build(name: &str, default_unit: &str, units: &[(&str, &str, &str, f64)]) -> UnitTable {
    let units = units
        .iter()
        .map(|&(id, label, symbol, factor)| UnitDefinition::new(id, label, symbol, factor))
        .collect();
    UnitTable::new(name, default_unit, units).unwrap_or_else(|err| panic!("{}", err))
}

/// Pressure, canonical Pa
pub static PRESSURE: Lazy<UnitTable> = Lazy::new(|| {
    build(
        "pressure",
        "bar",
        &[
            ("pa", "Pascal", "Pa", 1.0),
            ("kpa", "Kilopascal", "kPa", 1.0e3),
            ("mpa", "Megapascal", "MPa", 1.0e6),
            ("bar", "Bar", "bar", 1.0e5),
            ("mbar", "Millibar", "mbar", 100.0),
            ("atm", "Atmosfera standard", "atm", 101_325.0),
            ("psi", "Libbre per pollice quadrato", "psi", 6_894.757_293_168),
            ("mmhg", "Millimetri di mercurio", "mmHg", 133.322_387_415),
            ("mh2o", "Metri di colonna d'acqua", "mH₂O", 9_806.65),
            ("kgf_cm2", "Chilogrammo-forza per cm²", "kgf/cm²", 98_066.5),
        ],
    )
});

/// Power, canonical W
pub static POWER: Lazy<UnitTable> = Lazy::new(|| {
    build(
        "power",
        "kw",
        &[
            ("w", "Watt", "W", 1.0),
            ("kw", "Kilowatt", "kW", 1.0e3),
            ("mw", "Megawatt", "MW", 1.0e6),
            ("hp", "Cavallo vapore (US)", "HP", 745.699_871_582_270_2),
            ("cv", "Cavallo vapore metrico", "CV", 735.498_75),
            ("btu_h", "BTU all'ora", "BTU/h", 0.293_071_070_172_22),
            ("kcal_h", "Chilocalorie all'ora", "kcal/h", 1.163),
            ("tr", "Tonnellata di refrigerazione", "TR", 3_516.852_842_066_7),
        ],
    )
});

/// Length, canonical m
pub static LENGTH: Lazy<UnitTable> = Lazy::new(|| {
    build(
        "length",
        "m",
        &[
            ("m", "Metro", "m", 1.0),
            ("mm", "Millimetro", "mm", 1.0e-3),
            ("cm", "Centimetro", "cm", 1.0e-2),
            ("km", "Chilometro", "km", 1.0e3),
            ("in", "Pollice", "in", 0.0254),
            ("ft", "Piede", "ft", 0.3048),
        ],
    )
});

/// Area, canonical m²
pub static AREA: Lazy<UnitTable> = Lazy::new(|| {
    build(
        "area",
        "mm2",
        &[
            ("m2", "Metro quadrato", "m²", 1.0),
            ("cm2", "Centimetro quadrato", "cm²", 1.0e-4),
            ("mm2", "Millimetro quadrato", "mm²", 1.0e-6),
        ],
    )
});

/// Force, canonical N
pub static FORCE: Lazy<UnitTable> = Lazy::new(|| {
    build(
        "force",
        "kn",
        &[
            ("n", "Newton", "N", 1.0),
            ("kn", "Kilonewton", "kN", 1.0e3),
            ("kgf", "Chilogrammo-forza", "kgf", 9.806_65),
            ("lbf", "Libbra-forza", "lbf", 4.448_221_615_260_5),
        ],
    )
});

/// Energy, canonical J
pub static ENERGY: Lazy<UnitTable> = Lazy::new(|| {
    build(
        "energy",
        "kwh",
        &[
            ("j", "Joule", "J", 1.0),
            ("kj", "Kilojoule", "kJ", 1.0e3),
            ("kwh", "Kilowattora", "kWh", 3.6e6),
            ("kcal", "Chilocaloria", "kcal", 4_186.8),
            ("btu", "British thermal unit", "BTU", 1_055.055_852_62),
        ],
    )
});

/// All built-in tables, for iteration in tests and listings
pub fn all() -> [&'static UnitTable; 6] {
    [&*PRESSURE, &*POWER, &*LENGTH, &*AREA, &*FORCE, &*ENERGY]
}
