use instrumentrs::{Resource, scpi::Bound};
use keithley_2410::{DEFAULT_RESOURCE, Keithley2410};

fn main() {
    // Opening a GPIB resource requires the `visa` feature of `instrumentrs`.
    let resource: Resource = DEFAULT_RESOURCE.parse().unwrap();
    let mut inst = Keithley2410::try_new(resource.open(9600).unwrap()).unwrap();
    println!("Instrument ID: {}", inst.get_name().unwrap());

    inst.output_off().unwrap();
    inst.reset().unwrap();
    println!("Source function: {}", inst.get_source_function().unwrap());
    println!(
        "Voltage source mode: {:?}",
        inst.get_voltage_source_mode().unwrap()
    );
    println!(
        "Max. filter count: {}",
        inst.get_measurement_count(Some(Bound::Maximum)).unwrap()
    );
}
