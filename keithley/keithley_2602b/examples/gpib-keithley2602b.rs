use instrumentrs::Resource;
use keithley_2602b::{DEFAULT_RESOURCE, DisplayFunction, Keithley2602b, Quantity};

fn main() {
    // Opening a GPIB resource requires the `visa` feature of `instrumentrs`.
    let resource: Resource = DEFAULT_RESOURCE.parse().unwrap();
    let mut inst = Keithley2602b::try_new(resource.open(9600).unwrap()).unwrap();
    println!("Instrument ID: {}", inst.get_name().unwrap());

    inst.initialize().unwrap();

    // Display and measure the current on channel A
    let mut smua = inst.get_channel(0).unwrap();
    smua.set_display_function(DisplayFunction::DcAmps).unwrap();
    smua.output_on().unwrap();
    println!("smua current: {} A", smua.measure(Quantity::Current).unwrap());
    smua.output_off().unwrap();
}
