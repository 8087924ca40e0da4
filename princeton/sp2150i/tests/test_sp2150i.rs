//! Tests for the SP-2150i monochromator driver.

use rstest::*;

use instrumentrs::{InstrumentError, LoopbackInterfaceString};

use princeton_sp2150i::*;

type Sp2150iLbk = Sp2150i<LoopbackInterfaceString>;

/// Create a new Sp2150i instance with the given commands from host to instrument and from
/// instrument to host.
fn crt_inst(host2inst: Vec<&str>, inst2host: Vec<&str>) -> Sp2150iLbk {
    let interface = LoopbackInterfaceString::new(host2inst, inst2host, "\r");
    Sp2150i::try_new(interface).unwrap()
}

#[fixture]
fn emp_inst() -> Sp2150iLbk {
    crt_inst(vec![], vec![])
}

/// Empty initialization should always pass.
#[rstest]
fn test_initialization(_emp_inst: Sp2150iLbk) {}

#[rstest]
fn test_get_wavelength() {
    let mut inst = crt_inst(
        vec!["?NM", "?NM"],
        vec!["?NM 300.000 nm ok", "?NM 300.000 nm ok"],
    );
    assert_eq!(inst.get_wavelength_raw().unwrap(), "?NM 300.000 nm ok");
    assert_eq!(inst.get_wavelength_nm().unwrap(), 300.0);
}

#[rstest]
fn test_get_scan_speed() {
    let mut inst = crt_inst(
        vec!["?NM/MIN", "?NM/MIN"],
        vec!["?NM/MIN 100.0 nm/min ok", "?NM/MIN 100.0 nm/min ok"],
    );
    assert_eq!(inst.get_scan_speed_raw().unwrap(), "?NM/MIN 100.0 nm/min ok");
    assert_eq!(inst.get_scan_speed_nm_per_min().unwrap(), 100.0);
}

#[rstest]
fn test_get_wavelength_garbage() {
    let mut inst = crt_inst(vec!["?NM"], vec!["?NM nm ok"]);
    assert!(matches!(
        inst.get_wavelength_nm(),
        Err(InstrumentError::ResponseParseError(_))
    ));
}

#[rstest]
fn test_set_scan_speed() {
    let mut inst = crt_inst(vec!["300.0 NM/MIN"], vec!["300.0 NM/MIN ok"]);
    assert_eq!(
        inst.set_scan_speed_nm_per_min(300.0).unwrap(),
        "300.0 NM/MIN ok"
    );
}

#[rstest]
#[case(0.0)]
#[case(-100.0)]
#[case(f64::NAN)]
fn test_set_scan_speed_invalid(mut emp_inst: Sp2150iLbk, #[case] rate: f64) {
    assert!(matches!(
        emp_inst.set_scan_speed_nm_per_min(rate),
        Err(InstrumentError::FloatValueOutOfRange { .. })
    ));
}

#[rstest]
fn test_scan_to() {
    let mut inst = crt_inst(vec!["450.5NM"], vec!["450.5NM ok"]);
    assert_eq!(inst.scan_to(450.5).unwrap(), "450.5NM ok");
}

/// A move that completes within the timeout needs no waiting.
#[rstest]
fn test_set_wavelength() {
    let mut inst = crt_inst(
        vec!["?NM", "?NM/MIN", "500.0 NM", "?NM"],
        vec![
            "?NM 499.900 nm ok",
            "?NM/MIN 300.0 nm/min ok",
            "500.0 NM ok",
            "?NM 500.000 nm ok",
        ],
    );
    assert_eq!(inst.set_wavelength_nm(500.0).unwrap(), 500.0);
}

/// While the grating moves, the monochromator does not answer. The driver waits and then reads
/// the pending reply.
#[rstest]
fn test_set_wavelength_busy() {
    let mut inst = crt_inst(
        vec!["?NM", "?NM/MIN", "410.0 NM", "?NM"],
        vec![
            "?NM 400.000 nm ok",
            "?NM/MIN 6000.0 nm/min ok",
            LoopbackInterfaceString::TIMEOUT,
            "410.0 NM ok",
            "?NM 410.000 nm ok",
        ],
    );
    assert_eq!(inst.set_wavelength_nm(410.0).unwrap(), 410.0);
}

#[rstest]
fn test_set_wavelength_invalid(mut emp_inst: Sp2150iLbk) {
    assert!(emp_inst.set_wavelength_nm(-1.0).is_err());
    assert!(emp_inst.set_wavelength_nm(f64::INFINITY).is_err());
    assert!(emp_inst.scan_to(f64::NAN).is_err());
}

#[rstest]
fn test_initialize_defaults() {
    let mut inst = crt_inst(
        vec!["?NM", "?NM/MIN", "200.0 NM", "?NM", "120.0 NM/MIN"],
        vec![
            "?NM 200.000 nm ok",
            "?NM/MIN 100.0 nm/min ok",
            "200.0 NM ok",
            "?NM 200.000 nm ok",
            "120.0 NM/MIN ok",
        ],
    );
    inst.initialize_defaults().unwrap();
}

#[rstest]
fn test_set_grating() {
    let mut inst = crt_inst(vec!["2 GRATING"], vec!["2 GRATING ok"]);
    assert_eq!(inst.set_grating(2).unwrap(), "2 GRATING ok");
}

/// The grating command is repeated until the monochromator answers.
#[rstest]
fn test_set_grating_retry() {
    let mut inst = crt_inst(
        vec!["1 GRATING", "1 GRATING"],
        vec![LoopbackInterfaceString::TIMEOUT, "1 GRATING ok"],
    );
    assert_eq!(inst.set_grating(1).unwrap(), "1 GRATING ok");
}

#[rstest]
#[case(0)]
#[case(3)]
fn test_set_grating_invalid(mut emp_inst: Sp2150iLbk, #[case] grating: u8) {
    assert!(matches!(
        emp_inst.set_grating(grating),
        Err(InstrumentError::IntValueOutOfRange { min: 1, max: 2, .. })
    ));
}

#[rstest]
fn test_turret() {
    let mut inst = crt_inst(
        vec!["3 TURRET", "?TURRET", "?TURRETS"],
        vec!["3 TURRET ok", "?TURRET 3 ok", "?TURRETS 1200 600 300 ok"],
    );
    assert_eq!(inst.set_turret(3).unwrap(), "3 TURRET ok");
    assert_eq!(inst.get_turret().unwrap(), 3);
    assert_eq!(inst.get_turrets().unwrap(), "?TURRETS 1200 600 300 ok");
}

#[rstest]
fn test_set_turret_invalid(mut emp_inst: Sp2150iLbk) {
    assert!(emp_inst.set_turret(0).is_err());
    assert!(emp_inst.set_turret(4).is_err());
}

#[rstest]
fn test_get_grating() {
    let mut inst = crt_inst(vec!["?GRATING"], vec!["?GRATING 2 ok"]);
    assert_eq!(inst.get_grating().unwrap(), 2);
}

#[rstest]
fn test_get_gratings() {
    let lines = vec![
        "?GRATINGS",
        "1  1200 g/mm BLZ=  300NM",
        "2  600 g/mm BLZ=  500NM",
        "3  Not Installed",
        "4  Not Installed",
        "ok",
    ];
    let mut inst = crt_inst(vec!["?GRATINGS"], lines.clone());
    assert_eq!(inst.get_gratings().unwrap(), lines);
}

#[rstest]
fn test_read() {
    let mut inst = crt_inst(vec![], vec!["300.0 NM ok"]);
    assert_eq!(inst.read().unwrap(), "300.0 NM ok");
}

/// Ensure cloning an instrument works correctly.
#[rstest]
fn test_cloning(emp_inst: Sp2150iLbk) {
    let _ = emp_inst.clone();
}

/// A longer move never gets a shorter settle time.
#[rstest]
#[case(0.0, 1.0)]
#[case(0.0, 0.0)]
#[case(1.0, 10.0)]
#[case(10.0, 100.0)]
#[case(100.0, 800.0)]
fn test_settle_time_grows_with_distance(#[case] shorter: f64, #[case] longer: f64) {
    let short = settle_time(400.0, 400.0 + shorter, 300.0, MOVE_SETTLE_MARGIN).unwrap();
    let long = settle_time(400.0, 400.0 + longer, 300.0, MOVE_SETTLE_MARGIN).unwrap();
    assert!(short <= long);
}

/// A faster scan never gets a longer settle time.
#[rstest]
#[case(100.0, 300.0)]
#[case(300.0, 300.0)]
#[case(300.0, 1.0e6)]
#[case(1.0e6, 1.0e12)]
fn test_settle_time_shrinks_with_speed(#[case] slower: f64, #[case] faster: f64) {
    let slow = settle_time(400.0, 700.0, slower, MOVE_SETTLE_MARGIN).unwrap();
    let fast = settle_time(400.0, 700.0, faster, MOVE_SETTLE_MARGIN).unwrap();
    assert!(fast <= slow);
}
