use instrumentrs::Resource;
use thorlabs_pm100::Pm100;

fn main() {
    // Opening a USBTMC resource requires the `visa` feature of `instrumentrs`.
    let resource: Resource = std::env::args()
        .nth(1)
        .expect("Usage: visa-pm100 <resource>")
        .parse()
        .unwrap();
    let mut inst = Pm100::try_new(resource.open(9600).unwrap()).unwrap();
    println!("Instrument ID: {}", inst.get_name().unwrap());

    inst.set_averaging_count(100).unwrap();
    for wl in [450.0, 532.0, 633.0] {
        inst.set_wavelength_nm(wl).unwrap();
        println!("{wl} nm: {} W", inst.measure_power().unwrap().as_watts());
    }
}
