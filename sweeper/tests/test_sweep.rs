//! Tests for running a sweep against scripted instruments.

use rstest::*;

use instrumentrs::{InstrumentError, LoopbackInterfaceString};
use keithley_2602b::Keithley2602b;
use princeton_sp2150i::Sp2150i;
use thorlabs_pm100::Pm100;

use wavelength_sweeper::*;

type Lbk = LoopbackInterfaceString;
type SweeperLbk = Sweeper<Lbk, Lbk, Lbk>;

/// Fast enough that the waits between points stay in the millisecond range.
const SPEED: f64 = 60000.0;

fn crt_smu(host2inst: Vec<&str>, inst2host: Vec<&str>) -> Keithley2602b<Lbk> {
    Keithley2602b::try_new(Lbk::new(host2inst, inst2host, "\n")).unwrap()
}

fn crt_mono(host2inst: Vec<&str>, inst2host: Vec<&str>) -> Sp2150i<Lbk> {
    Sp2150i::try_new(Lbk::new(host2inst, inst2host, "\r")).unwrap()
}

fn config(samples: u32) -> SweepConfig {
    SweepConfig {
        scan_speed_nm_per_min: SPEED,
        samples,
    }
}

/// Monochromator traffic for moving from `from` to `to` and reading back the wavelength.
fn mono_point(from: &str, to: &str) -> (Vec<String>, Vec<String>) {
    let host = vec![
        "?NM".to_string(),
        "?NM".to_string(),
        "?NM/MIN".to_string(),
        format!("{to}.0 NM"),
        "?NM".to_string(),
        "?NM".to_string(),
    ];
    let inst = vec![
        format!("?NM {from}.000 nm ok"),
        format!("?NM {from}.000 nm ok"),
        format!("?NM/MIN {SPEED:.1} nm/min ok"),
        format!("{to}.0 NM ok"),
        format!("?NM {to}.000 nm ok"),
        format!("?NM {to}.000 nm ok"),
    ];
    (host, inst)
}

fn reply(current: &str) -> String {
    format!("-2.000000E+00,{current},+9.910000E+37,+5.432100E+03,+3.300000E+01")
}

#[fixture]
fn plan() -> SweepPlan {
    SweepPlan::new(WavelengthRange::new(400, 410, 10).unwrap(), None)
}

#[rstest]
fn test_run(plan: SweepPlan) {
    let (r1, r2, r3) = (reply("-1.0E-09"), reply("-3.0E-09"), reply("-4.0E-09"));
    let smu = crt_smu(
        vec![
            ":CURRent:PROTection 500e-6",
            ":SOUR:VOLT -2",
            "smua.source.output = smua.OUTPUT_ON",
            ":MEAS:CURR:DC?",
            ":MEAS:CURR:DC?",
            ":MEAS:CURR:DC?",
            ":MEAS:CURR:DC?",
            "smua.source.output = smua.OUTPUT_OFF",
            ":SOURce:VOLTage:AMPLitude?",
        ],
        vec![r1.as_str(), r2.as_str(), r3.as_str(), r3.as_str(), "-2.000000E+00"],
    );

    let mut host = vec!["60000.0 NM/MIN".to_string()];
    let mut inst = vec!["60000.0 NM/MIN ok".to_string()];
    for (from, to) in [("390", "400"), ("400", "410")] {
        let (h, i) = mono_point(from, to);
        host.extend(h);
        inst.extend(i);
    }
    let mono = Sp2150i::try_new(Lbk::new(host, inst, "\r")).unwrap();

    let mut sweeper: SweeperLbk = Sweeper::new(smu, mono, config(2));
    let record = sweeper.run(&plan).unwrap();

    assert_eq!(record.source_voltage.as_volts(), -2.0);
    assert_eq!(record.points.len(), 2);
    assert!(!record.has_power());

    let first = record.points[0];
    assert_eq!(first.target_nm, 400);
    assert_eq!(first.wavelength_nm, 400.0);
    assert!((first.current.as_amperes() + 2.0e-9).abs() < 1e-18);
    assert!(first.power.is_none());

    let second = record.points[1];
    assert_eq!(second.target_nm, 410);
    assert_eq!(second.wavelength_nm, 410.0);
    assert!((second.current.as_amperes() + 4.0e-9).abs() < 1e-18);
}

#[rstest]
fn test_run_with_power_meter() {
    let plan = SweepPlan::new(WavelengthRange::new(400, 400, 10).unwrap(), None);
    let r1 = reply("-1.0E-09");
    let smu = crt_smu(
        vec![
            ":CURRent:PROTection 500e-6",
            ":SOUR:VOLT -2",
            "smua.source.output = smua.OUTPUT_ON",
            ":MEAS:CURR:DC?",
            "smua.source.output = smua.OUTPUT_OFF",
            ":SOURce:VOLTage:AMPLitude?",
        ],
        vec![r1.as_str(), "-2.000000E+00"],
    );
    let mut host = vec!["60000.0 NM/MIN".to_string()];
    let mut inst = vec!["60000.0 NM/MIN ok".to_string()];
    let (h, i) = mono_point("400", "400");
    host.extend(h);
    inst.extend(i);
    let mono = Sp2150i::try_new(Lbk::new(host, inst, "\r")).unwrap();
    let pm = Pm100::try_new(Lbk::new(
        vec!["SENS:CORR:WAV 400", "MEAS:POW?"],
        vec!["1.000000E-03"],
        "\n",
    ))
    .unwrap();

    let mut sweeper = Sweeper::new(smu, mono, config(1)).with_power_meter(pm);
    let record = sweeper.run(&plan).unwrap();

    assert!(record.has_power());
    assert_eq!(record.points[0].power.unwrap().as_watts(), 1.0e-3);
    assert_eq!(record.points[0].current.as_amperes(), -1.0e-9);
}

/// The output is turned off and the error is returned when the monochromator fails.
#[rstest]
fn test_run_failure_turns_output_off(plan: SweepPlan) {
    let smu = crt_smu(
        vec![
            ":CURRent:PROTection 500e-6",
            ":SOUR:VOLT -2",
            "smua.source.output = smua.OUTPUT_ON",
            "smua.source.output = smua.OUTPUT_OFF",
        ],
        vec![],
    );
    let mono = crt_mono(
        vec!["60000.0 NM/MIN", "?NM"],
        vec!["60000.0 NM/MIN ok", "?NM nm ok"],
    );

    let mut sweeper: SweeperLbk = Sweeper::new(smu, mono, config(9));
    assert!(matches!(
        sweeper.run(&plan),
        Err(SweepError::Instrument(InstrumentError::ResponseParseError(_)))
    ));
}

#[rstest]
fn test_run_without_samples(plan: SweepPlan) {
    let smu = crt_smu(vec![], vec![]);
    let mono = crt_mono(vec![], vec![]);
    let mut sweeper: SweeperLbk = Sweeper::new(smu, mono, config(0));
    assert!(matches!(
        sweeper.run(&plan),
        Err(SweepError::InvalidConfig(_))
    ));
}

#[rstest]
fn test_default_config() {
    let cfg = SweepConfig::default();
    assert_eq!(cfg.scan_speed_nm_per_min, 300.0);
    assert_eq!(cfg.samples, 9);
}
