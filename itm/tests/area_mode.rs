use longleyrice::{
    predict, AreaScenario, Climate, DistanceSweep, ImpedanceRule, Model, ModeOfVariability,
    Polarisation, Refresh, Regime, Settings, SitingCriteria, Variability, Warning,
};
use proptest::prelude::*;

fn reference_settings() -> Settings {
    Settings {
        permittivity: 15.0,
        conductivity: 0.001,
        climate: Climate::ContinentalTemperate,
        surface_refractivity: 301.0,
        frequency: 20.0,
        polarisation: Polarisation::Vertical,
        variability: Variability::from_code(3).unwrap(),
        impedance: ImpedanceRule::RealRoot,
    }
}

fn reference_scenario() -> AreaScenario {
    AreaScenario {
        settings: reference_settings(),
        heights: (3.3, 1.3),
        siting: (SitingCriteria::VeryCareful, SitingCriteria::VeryCareful),
        terrain_irregularity: 102.0,
        general_elevation: 0.0,
        time: 50.0,
        location: 50.0,
        confidences: vec![50.0, 90.0, 10.0],
        sweep: DistanceSweep::default(),
        input_warning: Warning::None,
    }
}

fn loss_at(rows: &[longleyrice::Prediction], km: f64, confidence: f64) -> f64 {
    rows.iter()
        .find(|r| r.distance_km == km && r.confidence == confidence)
        .map(|r| r.loss_db)
        .unwrap()
}

#[test]
fn reference_table() {
    let prediction = predict(&reference_scenario());
    let rows = &prediction.rows;
    assert_eq!(rows.len(), 66);

    let expected = [
        (10.0, 50.0, 111.69200844812511),
        (10.0, 90.0, 121.59437954264777),
        (10.0, 10.0, 101.78963735360244),
        (20.0, 50.0, 122.13566752376485),
        (20.0, 90.0, 131.7188925569606),
        (20.0, 10.0, 112.5524424905691),
        (500.0, 50.0, 215.27421197676375),
        (500.0, 90.0, 221.71014370503855),
        (500.0, 10.0, 208.83828024848896),
    ];

    for (km, confidence, loss) in expected.iter() {
        assert_eq!(loss_at(rows, *km, *confidence), *loss, "{km} km at {confidence}%");
    }

    // 20 MHz is below the recommended range
    assert!(prediction.warning >= Warning::Caution);
}

#[test]
fn rows_come_in_request_order() {
    let prediction = predict(&reference_scenario());
    let first: Vec<(f64, f64)> = prediction.rows[..4]
        .iter()
        .map(|r| (r.distance_km, r.confidence))
        .collect();
    assert_eq!(first, vec![(10.0, 50.0), (10.0, 90.0), (10.0, 10.0), (20.0, 50.0)]);
}

#[test]
fn higher_confidence_means_more_loss() {
    let prediction = predict(&reference_scenario());
    for chunk in prediction.rows.chunks(3) {
        assert!(chunk[1].loss_db > chunk[0].loss_db);
        assert!(chunk[0].loss_db > chunk[2].loss_db);
    }
}

#[test]
fn loss_grows_with_distance() {
    let scenario = reference_scenario();
    let prediction = predict(&scenario);

    for confidence in scenario.confidences.iter() {
        let losses: Vec<f64> = prediction
            .rows
            .iter()
            .filter(|r| r.confidence == *confidence)
            .map(|r| r.loss_db)
            .collect();
        assert_eq!(losses.len(), 22);

        for pair in losses.windows(2) {
            assert!(pair[1] >= pair[0], "{}% curve: {} then {}", confidence, pair[0], pair[1]);
        }
    }
}

fn model_in_mode(mode: ModeOfVariability) -> Model {
    let mut settings = reference_settings();
    settings.variability = Variability {
        mode,
        location: true,
        situation: true,
    };

    let mut model = Model::area(
        settings,
        0.0,
        (3.3, 1.3),
        (SitingCriteria::VeryCareful, SitingCriteria::VeryCareful),
        102.0,
    );
    model.attenuation_at(50e3);
    model
}

#[test]
fn single_message_only_sees_confidence() {
    let mut model = model_in_mode(ModeOfVariability::SingleMessage);
    let a = model.variability(0.0, 0.0, 1.2);

    for (zt, zl) in [(1.0, -1.0), (-2.0, 2.5), (0.3, 0.3)] {
        assert_eq!(model.variability(zt, zl, 1.2), a);
    }
    assert_ne!(model.variability(0.0, 0.0, -1.2), a);
}

#[test]
fn accidental_and_mobile_ignore_location() {
    for mode in [ModeOfVariability::Accidental, ModeOfVariability::Mobile] {
        let mut model = model_in_mode(mode);
        let a = model.variability(0.8, -1.0, 0.5);

        assert_eq!(model.variability(0.8, 2.0, 0.5), a, "{mode:?}");
        assert_ne!(model.variability(-0.8, -1.0, 0.5), a, "{mode:?}");
        assert_ne!(model.variability(0.8, -1.0, -0.5), a, "{mode:?}");
    }
}

#[test]
fn broadcast_sees_every_deviate() {
    let mut model = model_in_mode(ModeOfVariability::Broadcast);
    let a = model.variability(0.8, -1.0, 0.5);

    assert_ne!(model.variability(0.8, 2.0, 0.5), a);
    assert_ne!(model.variability(-0.8, -1.0, 0.5), a);
    assert_ne!(model.variability(0.8, -1.0, -0.5), a);
}

#[test]
fn identical_inputs_give_identical_tables() {
    let a = predict(&reference_scenario());
    let b = predict(&reference_scenario());
    assert_eq!(a, b);
}

#[test]
fn regimes_follow_the_horizons() {
    let mut model = Model::area(
        reference_settings(),
        0.0,
        (3.3, 1.3),
        (SitingCriteria::VeryCareful, SitingCriteria::VeryCareful),
        102.0,
    );

    assert_eq!(model.regime(), None);

    model.attenuation_at(10e3);
    assert!(matches!(model.regime(), Some(Regime::LineOfSight(_))));

    model.attenuation_at(100e3);
    assert!(matches!(model.regime(), Some(Regime::Diffraction(_))));

    model.attenuation_at(500e3);
    assert!(matches!(model.regime(), Some(Regime::Scatter(_))));
}

#[test]
fn reference_attenuation_is_never_negative() {
    let mut model = Model::area(
        reference_settings(),
        0.0,
        (30.0, 30.0),
        (SitingCriteria::Random, SitingCriteria::Random),
        0.0,
    );

    for km in [1.0, 2.0, 5.0, 10.0] {
        assert!(model.attenuation_at(km * 1e3) >= 0.0);
    }
}

#[test]
fn repeated_queries_agree() {
    let mut model = Model::area(
        reference_settings(),
        0.0,
        (3.3, 1.3),
        (SitingCriteria::VeryCareful, SitingCriteria::VeryCareful),
        102.0,
    );

    model.attenuation_at(50e3);
    let first = model.variability(0.0, 0.0, 1.2817);
    let second = model.variability(0.0, 0.0, 1.2817);
    model.invalidate(Refresh::Climate);
    let third = model.variability(0.0, 0.0, 1.2817);

    assert_eq!(first, second);
    assert_eq!(first, third);
}

#[test]
fn out_of_range_distances_are_flagged() {
    let mut model = Model::area(
        reference_settings(),
        0.0,
        (3.3, 1.3),
        (SitingCriteria::VeryCareful, SitingCriteria::VeryCareful),
        102.0,
    );

    model.attenuation_at(2500e3);
    assert_eq!(model.warning(), Warning::OutOfRange);
}

#[test]
fn extreme_deviates_raise_caution() {
    let mut settings = reference_settings();
    settings.frequency = 100.0;
    let mut model = Model::area(
        settings,
        0.0,
        (10.0, 10.0),
        (SitingCriteria::Random, SitingCriteria::Random),
        90.0,
    );

    model.attenuation_at(50e3);
    assert_eq!(model.warning(), Warning::None);
    model.variability(0.0, 0.0, 3.5);
    assert_eq!(model.warning(), Warning::Caution);
}

#[test]
fn substituted_inputs_carry_through() {
    let (variability, warning) = Variability::from_code_or_default(9);
    assert_eq!(variability.mode, ModeOfVariability::SingleMessage);

    let mut scenario = reference_scenario();
    scenario.settings.variability = variability;
    scenario.settings.frequency = 100.0;
    scenario.input_warning = warning;

    assert!(predict(&scenario).warning >= Warning::Substituted);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn loss_is_monotonic_in_confidence(
        dh in 0.0f64..500.0,
        km in 5.0f64..800.0,
        frequency in 30.0f64..3000.0,
    ) {
        let mut settings = reference_settings();
        settings.frequency = frequency;
        let mut model = Model::area(
            settings,
            0.0,
            (10.0, 3.0),
            (SitingCriteria::Careful, SitingCriteria::Random),
            dh,
        );

        model.attenuation_at(km * 1e3);
        let low = model.variability(0.0, 0.0, 1.2817);
        let median = model.variability(0.0, 0.0, 0.0);
        let high = model.variability(0.0, 0.0, -1.2817);

        prop_assert!(low <= median);
        prop_assert!(median <= high);
    }

    #[test]
    fn models_are_deterministic(dh in 0.0f64..500.0, km in 1.0f64..1500.0) {
        let run = || {
            let mut model = Model::area(
                reference_settings(),
                0.0,
                (3.3, 1.3),
                (SitingCriteria::VeryCareful, SitingCriteria::VeryCareful),
                dh,
            );
            let aref = model.attenuation_at(km * 1e3);
            (aref, model.variability(0.0, 0.0, 0.0), model.warning())
        };

        prop_assert_eq!(run(), run());
    }
}
