//! Tests for the Keithley 2410 driver.

use measurements::{Current, Voltage};
use rstest::*;

use instrumentrs::{
    InstrumentError, LoopbackInterfaceString,
    scpi::{Bound, NumericValue},
};

use keithley_2410::*;

// Type alias for the loopback interface with the Keithley2410 driver.
type Keithley2410Lbk = Keithley2410<LoopbackInterfaceString>;

/// Create a new Keithley2410 instance with the given commands from host to instrument and from
/// instrument to host.
fn crt_inst(host2inst: Vec<&str>, inst2host: Vec<&str>) -> Keithley2410Lbk {
    let interface = LoopbackInterfaceString::new(host2inst, inst2host, "\n");
    Keithley2410::try_new(interface).unwrap()
}

#[fixture]
fn emp_inst() -> Keithley2410Lbk {
    crt_inst(vec![], vec![])
}

/// Empty initialization should always pass.
#[rstest]
fn test_initialization(_emp_inst: Keithley2410Lbk) {}

#[rstest]
fn test_get_name() {
    let mut inst = crt_inst(
        vec!["*IDN?"],
        vec!["KEITHLEY INSTRUMENTS INC.,MODEL 2410,1234567,C32"],
    );
    assert_eq!(
        inst.get_name().unwrap(),
        "KEITHLEY INSTRUMENTS INC.,MODEL 2410,1234567,C32"
    );
}

/// Initializing sets the voltage and the current compliance.
#[rstest]
fn test_initialize() {
    let mut inst = crt_inst(vec![":VOLT:PROT 25", ":CURR:PROT 2"], vec![]);
    inst.initialize().unwrap();
}

#[rstest]
#[case(None, ":SOUR:VOLT:STAR?")]
#[case(Some(Bound::Default), ":SOUR:VOLT:STAR? DEF")]
#[case(Some(Bound::Minimum), ":SOUR:VOLT:STAR? MIN")]
#[case(Some(Bound::Maximum), ":SOUR:VOLT:STAR? MAX")]
fn test_get_voltage_sweep_start(#[case] bound: Option<Bound>, #[case] cmd: &str) {
    let mut inst = crt_inst(vec![cmd], vec!["-1.000000E+00"]);
    let start = inst.get_voltage_sweep_start(bound).unwrap();
    assert_eq!(start.as_volts(), -1.0);
}

#[rstest]
fn test_get_voltage_sweep_stop_step() {
    let mut inst = crt_inst(
        vec![":SOUR:VOLT:STOP?", ":SOUR:VOLT:STEP? MAX"],
        vec!["+5.000000E+00", "+2.200000E+03"],
    );
    assert_eq!(inst.get_voltage_sweep_stop(None).unwrap().as_volts(), 5.0);
    assert_eq!(
        inst.get_voltage_sweep_step(Some(Bound::Maximum))
            .unwrap()
            .as_volts(),
        2200.0
    );
}

/// Unrecognized option strings degrade to a plain query.
#[rstest]
#[case("MAXIMUM", ":AVER:COUN? MAX")]
#[case("minimum", ":AVER:COUN? MIN")]
#[case("Def", ":AVER:COUN? DEF")]
#[case("largest", ":AVER:COUN?")]
fn test_lenient_option(#[case] option: &str, #[case] cmd: &str) {
    let mut inst = crt_inst(vec![cmd], vec!["10"]);
    let count = inst.get_measurement_count(Bound::lenient(option)).unwrap();
    assert_eq!(count, 10);
}

#[rstest]
#[case(Function::Current, ":SENS:FUNC CURR")]
#[case(Function::Voltage, ":SENS:FUNC VOLT")]
fn test_set_sense_function(#[case] function: Function, #[case] cmd: &str) {
    let mut inst = crt_inst(vec![cmd], vec![]);
    inst.set_sense_function(function).unwrap();
}

#[rstest]
fn test_display_enabled() {
    let mut inst = crt_inst(vec![":DISP:ENAB 0", ":DISP:ENAB?"], vec!["0"]);
    inst.set_display_enabled(false).unwrap();
    assert!(!inst.get_display_enabled().unwrap());
}

#[rstest]
fn test_source_function() {
    let mut inst = crt_inst(
        vec![":SOUR:FUNC CURR", ":SOUR:FUNC?", ":SOUR:FUNC VOLT", ":SOUR:FUNC?"],
        vec!["CURR", "VOLT"],
    );
    inst.set_source_function(Function::Current).unwrap();
    assert_eq!(inst.get_source_function().unwrap(), Function::Current);
    inst.set_source_function(Function::Voltage).unwrap();
    assert_eq!(inst.get_source_function().unwrap(), Function::Voltage);
}

#[rstest]
#[case("FIX", SourceMode::Fixed)]
#[case("LIST", SourceMode::List)]
#[case("SWE", SourceMode::Sweep)]
fn test_source_modes(#[case] resp: &str, #[case] mode: SourceMode) {
    let mut inst = crt_inst(vec![":SOUR:CURR:MODE?", ":SOUR:VOLT:MODE?"], vec![resp, resp]);
    assert_eq!(inst.get_current_source_mode().unwrap(), mode);
    assert_eq!(inst.get_voltage_source_mode().unwrap(), mode);
}

#[rstest]
fn test_source_mode_invalid() {
    let mut inst = crt_inst(vec![":SOUR:VOLT:MODE?"], vec!["AUTO"]);
    assert!(matches!(
        inst.get_voltage_source_mode(),
        Err(InstrumentError::ResponseParseError(_))
    ));
}

#[rstest]
fn test_trigger_count() {
    let mut inst = crt_inst(
        vec![":TRIG:SEQ:COUN 10", ":TRIG:SEQ:COUN?"],
        vec!["+1.000000E+01"],
    );
    inst.set_trigger_count(10).unwrap();
    assert_eq!(inst.get_trigger_count(None).unwrap(), 10);
}

#[rstest]
#[case(0)]
#[case(2501)]
fn test_trigger_count_out_of_range(mut emp_inst: Keithley2410Lbk, #[case] count: u32) {
    assert!(matches!(
        emp_inst.set_trigger_count(count),
        Err(InstrumentError::IntValueOutOfRange { .. })
    ));
}

#[rstest]
fn test_voltage_limit() {
    let mut inst = crt_inst(
        vec![":SOUR:VOLT:PROT 40", ":SOUR:VOLT:PROT? MAX"],
        vec!["2.100000E+02"],
    );
    inst.set_voltage_limit(Voltage::from_volts(40.0)).unwrap();
    assert_eq!(
        inst.get_voltage_limit(Some(Bound::Maximum))
            .unwrap()
            .as_volts(),
        210.0
    );
}

#[rstest]
fn test_voltage_source() {
    let mut inst = crt_inst(vec![":SOUR:VOLT -2", ":SOUR:VOLT?"], vec!["-2.000000E+00"]);
    inst.set_voltage_source(Voltage::from_volts(-2.0)).unwrap();
    assert_eq!(inst.get_voltage_source(None).unwrap().as_volts(), -2.0);
}

#[rstest]
fn test_current_source() {
    let mut inst = crt_inst(
        vec![":SOUR:CURR 0.001", ":SOUR:CURR? MIN"],
        vec!["-1.050000E+00"],
    );
    inst.set_current_source(Current::from_amperes(0.001))
        .unwrap();
    assert_eq!(
        inst.get_current_source(Some(Bound::Minimum))
            .unwrap()
            .as_amperes(),
        -1.05
    );
}

#[rstest]
fn test_compliance() {
    let mut inst = crt_inst(
        vec![":VOLT:PROT?", ":CURR:PROT 0.0005", ":CURR:PROT?"],
        vec!["2.500000E+01", "5.000000E-04"],
    );
    assert_eq!(inst.get_voltage_compliance(None).unwrap().as_volts(), 25.0);
    inst.set_current_compliance(Current::from_amperes(500e-6))
        .unwrap();
    assert_eq!(
        inst.get_current_compliance(None).unwrap().as_amperes(),
        500e-6
    );
}

/// Filter counts are clamped to the range of 1 to 100.
#[rstest]
#[case(NumericValue::Value(10.0), ":AVER:COUN 10")]
#[case(NumericValue::Value(150.0), ":AVER:COUN MAX")]
#[case(NumericValue::Value(0.0), ":AVER:COUN MIN")]
#[case(NumericValue::Bound(Bound::Default), ":AVER:COUN DEF")]
fn test_set_measurement_count(#[case] count: NumericValue, #[case] cmd: &str) {
    let mut inst = crt_inst(vec![cmd], vec![]);
    inst.set_measurement_count(count).unwrap();
}

#[rstest]
fn test_integration_times() {
    let mut inst = crt_inst(
        vec![
            ":CURR:NPLC 1",
            ":CURR:NPLC?",
            ":VOLT:NPLC 0.1",
            ":VOLT:NPLC? MAX",
            ":RES:NPLC 10",
            ":RES:NPLC?",
        ],
        vec!["1.000000E+00", "1.000000E+01", "1.000000E+01"],
    );
    inst.set_current_integration_time(1.0).unwrap();
    assert_eq!(inst.get_current_integration_time(None).unwrap(), 1.0);
    inst.set_voltage_integration_time(0.1).unwrap();
    assert_eq!(
        inst.get_voltage_integration_time(Some(Bound::Maximum))
            .unwrap(),
        10.0
    );
    inst.set_resistance_integration_time(10.0).unwrap();
    assert_eq!(inst.get_resistance_integration_time(None).unwrap(), 10.0);
}

#[rstest]
fn test_integration_time_out_of_range(mut emp_inst: Keithley2410Lbk) {
    assert!(emp_inst.set_current_integration_time(11.0).is_err());
    assert!(emp_inst.set_voltage_integration_time(0.001).is_err());
}

/// The measurement reply holds voltage, current, resistance, time, and status.
#[rstest]
fn test_measure() {
    let reply = "-2.000000E+00,-1.234000E-03,+9.910000E+37,+1.234000E+02,+3.300000E+01";
    let mut inst = crt_inst(
        vec![":MEAS:CURR:DC?", ":MEAS:CURR:DC?", ":MEAS:CURR:DC?"],
        vec![reply, reply, reply],
    );
    assert_eq!(inst.measure_raw().unwrap(), reply);
    assert_eq!(inst.measure_current().unwrap().as_amperes(), -1.234e-3);
    assert_eq!(inst.measure_voltage().unwrap().as_volts(), -2.0);
}

#[rstest]
fn test_measure_truncated_reply() {
    let mut inst = crt_inst(vec![":MEAS:CURR:DC?"], vec!["-2.000000E+00"]);
    assert!(matches!(
        inst.measure_current(),
        Err(InstrumentError::ResponseParseError(_))
    ));
}

#[rstest]
fn test_output() {
    let mut inst = crt_inst(
        vec![":OUTP:STAT ON", ":OUTP:STAT?", ":OUTP:STAT OFF"],
        vec!["1"],
    );
    inst.output_on().unwrap();
    assert!(inst.get_output_enabled().unwrap());
    inst.output_off().unwrap();
}

#[rstest]
fn test_housekeeping() {
    let mut inst = crt_inst(vec!["*RST", "*TST?", "*OPC?"], vec!["0", "1"]);
    inst.reset().unwrap();
    assert!(inst.self_test().unwrap());
    inst.operation_complete().unwrap();
}

/// Ensure cloning an instrument works correctly.
#[rstest]
fn test_cloning(emp_inst: Keithley2410Lbk) {
    let _ = emp_inst.clone();
}
