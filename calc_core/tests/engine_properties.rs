//! Cross-module properties of the evaluation pipeline.

use approx::assert_relative_eq;

use calcolo_core::calculations::cable_sizing::{self, CableSizingInput};
use calcolo_core::calculations::{evaluate_domain, Domain};
use calcolo_core::format::NumberLocale;
use calcolo_core::units::tables;
use calcolo_core::{CalcError, EngineSettings, RawInputs};

fn raw(fields: &[(&str, &str)]) -> RawInputs {
    fields.iter().copied().collect()
}

fn evaluate(domain: Domain, fields: &[(&str, &str)]) -> calcolo_core::CalculationResult {
    evaluate_domain(domain, &raw(fields), &EngineSettings::default())
        .unwrap()
        .unwrap_or_else(|| panic!("{} rejected {:?}", domain, fields))
}

#[test]
fn round_trip_through_canonical_is_identity() {
    for table in tables::all() {
        for unit in table.iter() {
            for value in [0.0, 1.0, -3.5, 1234.5678, 1.0e-4] {
                let there = table.to_canonical(value, &unit.id).unwrap();
                let back = table.from_canonical(there, &unit.id).unwrap();
                assert_relative_eq!(back, value, epsilon = 1e-9, max_relative = 1e-12);
            }
        }
    }
}

#[test]
fn conversion_goes_through_the_canonical_unit() {
    for table in tables::all() {
        let ids = table.ids();
        for from in &ids {
            for to in &ids {
                let direct = table.convert(42.0, from, to).unwrap();
                let via = table
                    .from_canonical(table.to_canonical(42.0, from).unwrap(), to)
                    .unwrap();
                assert_relative_eq!(direct, via, max_relative = 1e-12);
            }
        }
    }
}

#[test]
fn converting_to_the_same_unit_is_exact() {
    let table = &*tables::PRESSURE;
    assert_eq!(table.convert(0.1 + 0.2, "psi", "psi").unwrap(), 0.1 + 0.2);
}

#[test]
fn evaluation_is_deterministic() {
    let fields = [("power", "22"), ("length", "80"), ("installation", "b1"), ("system", "three")];
    let first = evaluate(Domain::CableSizing, &fields);
    for _ in 0..5 {
        assert_eq!(evaluate(Domain::CableSizing, &fields), first);
    }
}

#[test]
fn cable_utilization_grows_with_load_and_warns_past_capacity() {
    let mut previous = 0.0;
    let mut crossed = false;
    for kw in (1..=40).map(f64::from) {
        let input = CableSizingInput {
            power_w: kw * 1_000.0,
            fixed_section_m2: Some(4.0e-6),
            max_voltage_drop_percentage: 10.0,
            length_m: 5.0,
            ..CableSizingInput::default()
        };
        let result = cable_sizing::calculate(&input).unwrap();
        assert!(result.utilization_percentage > previous);
        previous = result.utilization_percentage;

        let warnings = calcolo_core::warnings::generate_warnings(cable_sizing::RULES, &result);
        let overload = warnings.iter().any(|w| w.starts_with("Corrente di impiego"));
        assert_eq!(overload, result.utilization_percentage > 100.0, "at {} kW", kw);
        crossed |= overload;
    }
    assert!(crossed);
}

#[test]
fn boundary_inputs_are_rejected_not_infinite() {
    let settings = EngineSettings::default();
    let cases: [(Domain, &[(&str, &str)]); 11] = [
        (Domain::Roi, &[("investment", "0")]),
        (Domain::Roi, &[("timeframe", "0")]),
        (Domain::CableSizing, &[("voltage", "0")]),
        (Domain::CableSizing, &[("length", "0")]),
        (Domain::ShortCircuit, &[("voltage", "0")]),
        (Domain::ShortCircuit, &[("ucc", "0")]),
        (Domain::Seismic, &[("ag", "0")]),
        (Domain::BearingCapacity, &[("phi", "45")]),
        (Domain::BearingCapacity, &[("width", "0")]),
        (Domain::BeamVerification, &[("span", "0")]),
        (Domain::PowerFactor, &[("power", "0")]),
    ];
    for (domain, fields) in cases {
        let outcome = evaluate_domain(domain, &raw(fields), &settings).unwrap();
        assert!(outcome.is_none(), "{} accepted {:?}", domain, fields);
    }
}

#[test]
fn zero_capacity_is_rejected_not_reported_as_unused() {
    let settings = EngineSettings::default();
    let cases: [(Domain, &[(&str, &str)]); 4] = [
        // Compression block deeper than the lever arm: no moment resistance
        (Domain::BeamVerification, &[("as", "12000")]),
        // No cohesion, no friction, no overburden
        (Domain::BearingCapacity, &[("cohesion", "0"), ("phi", "0"), ("depth", "0")]),
        // No tabulated ampacity above 240 mm²
        (Domain::CableSizing, &[("section", "300")]),
        // Ratio overflows to infinity
        (Domain::Roi, &[("investment", "1e-310")]),
    ];
    for (domain, fields) in cases {
        let outcome = evaluate_domain(domain, &raw(fields), &settings).unwrap();
        assert!(outcome.is_none(), "{} accepted {:?}", domain, fields);
    }
}

#[test]
fn utilization_warnings_stay_reachable_as_load_grows() {
    // (domain, load step in kN/m or kN, utilization quantity, warning prefix)
    let checks: [(Domain, u32, &str, &str); 2] = [
        (Domain::BeamVerification, 5, "bending_utilization_percentage", "Verifica a flessione"),
        (Domain::BearingCapacity, 100, "utilization_percentage", "Pressione di contatto"),
    ];
    for (domain, load_step, quantity, prefix) in checks {
        let mut previous = 0.0;
        let mut crossed = false;
        for step in 1..=30 {
            let load = (step * load_step).to_string();
            let result = evaluate(domain, &[("load", load.as_str())]);
            let utilization = result.quantity(quantity).unwrap();
            assert!(utilization > previous, "{} at {}", domain, load);
            previous = utilization;

            let fired = result.warnings().iter().any(|w| w.starts_with(prefix));
            assert_eq!(fired, utilization > 100.0, "{} at {}", domain, load);
            crossed |= fired;
        }
        assert!(crossed, "{} never exceeded capacity", domain);
    }
}

#[test]
fn same_unit_conversion_is_exact_end_to_end() {
    for text in ["0,308", "0,1", "7,77", "1234,5678"] {
        let expected = calcolo_core::parse::parse_number(text, f64::NAN);
        let pressure = evaluate(Domain::Pressure, &[("value", text), ("unit", "psi"), ("target", "psi")]);
        assert_eq!(pressure.quantity("target_value"), Some(expected));
        assert_eq!(pressure.quantity("in_psi"), Some(expected));

        let power = evaluate(Domain::Power, &[("value", text), ("unit", "hp"), ("target", "hp")]);
        assert_eq!(power.quantity("target_value"), Some(expected));
    }
}

#[test]
fn unknown_ids_fail_closed() {
    let settings = EngineSettings::default();
    let err = evaluate_domain(Domain::Pressure, &raw(&[("unit", "torr")]), &settings).unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_UNIT");

    let err = evaluate_domain(Domain::CableSizing, &raw(&[("installation", "z9")]), &settings).unwrap_err();
    assert!(matches!(err, CalcError::UnknownOption { ref field, .. } if field == "installation"));
    assert!(err.is_programming_error());
}

#[test]
fn malformed_numbers_fall_back_to_defaults() {
    let defaults = evaluate(Domain::Roi, &[]);
    let garbled = evaluate(Domain::Roi, &[("investment", "dieci"), ("revenue", ""), ("costs", "1e999")]);
    assert_eq!(garbled.derived_quantities(), defaults.derived_quantities());
}

#[test]
fn roi_scenario() {
    let result = evaluate(
        Domain::Roi,
        &[("investment", "10000"), ("revenue", "15000"), ("costs", "3000"), ("timeframe", "12")],
    );
    assert_eq!(result.quantity("net_profit"), Some(2000.0));
    assert_relative_eq!(result.quantity("roi").unwrap(), 0.2);
    assert_relative_eq!(result.quantity("roi_percentage").unwrap(), 20.0);
    assert_relative_eq!(result.quantity("payback_period_months").unwrap(), 10.0);
    assert!(!result.has_warnings());
}

#[test]
fn pressure_scenario() {
    let result = evaluate(Domain::Pressure, &[("value", "1"), ("unit", "bar"), ("target", "psi")]);
    assert_eq!(result.quantity("pressure_pa"), Some(100_000.0));
    assert_relative_eq!(result.quantity("target_value").unwrap(), 14.5038, epsilon = 1e-4);
    assert_eq!(result.summary_rows()[0].value, "14,5038 psi");
}

#[test]
fn power_scenario() {
    let result = evaluate(Domain::Power, &[("value", "15"), ("unit", "kw"), ("target", "hp")]);
    assert_eq!(result.quantity("power_w"), Some(15_000.0));
    assert_relative_eq!(result.quantity("target_value").unwrap(), 20.1153, epsilon = 1e-4);
    assert_relative_eq!(result.quantity("in_hp").unwrap(), 20.1153, epsilon = 1e-4);
}

#[test]
fn short_circuit_scenario_without_voltage() {
    let outcome = evaluate_domain(Domain::ShortCircuit, &raw(&[("voltage", "0")]), &EngineSettings::default());
    assert_eq!(outcome, Ok(None));
}

#[test]
fn settings_change_presentation_only() {
    let fields = [("value", "1234,5"), ("unit", "kpa"), ("target", "pa")];
    let italian = evaluate(Domain::Pressure, &fields);

    let english = EngineSettings::from_toml_str("[format]\nlocale = \"english\"\ndecimals = 0\n").unwrap();
    assert_eq!(english.format.locale, NumberLocale::English);
    let result = evaluate_domain(Domain::Pressure, &raw(&fields), &english).unwrap().unwrap();

    assert_eq!(result.derived_quantities(), italian.derived_quantities());
    assert_eq!(italian.summary_rows()[0].value, "1.234.500,0000 Pa");
    assert_eq!(result.summary_rows()[0].value, "1,234,500.0000 Pa");
}

#[test]
fn warnings_are_ordered_and_all_fire() {
    let result = evaluate(
        Domain::BearingCapacity,
        &[("width", "0,8"), ("depth", "1,2"), ("safety_factor", "2"), ("load", "2000")],
    );
    let warnings = result.warnings();
    assert_eq!(warnings.len(), 3);
    assert!(warnings[0].starts_with("Pressione di contatto"));
    assert!(warnings[1].starts_with("Fattore di sicurezza"));
    assert!(warnings[2].starts_with("Profondità"));
}
