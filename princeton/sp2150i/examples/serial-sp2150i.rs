use princeton_sp2150i::{DEFAULT_RESOURCE, SerialInterfaceSp2150i, Sp2150i};

fn main() {
    let port = std::env::args().nth(1).unwrap_or(DEFAULT_RESOURCE.to_string());
    let serial_inst = SerialInterfaceSp2150i::simple(&port).unwrap();
    let mut mono = Sp2150i::try_new(serial_inst).unwrap();

    println!("Turret: {}", mono.get_turret().unwrap());
    println!("Grating: {}", mono.get_grating().unwrap());
    for line in mono.get_gratings().unwrap() {
        println!("  {line}");
    }

    mono.set_scan_speed_nm_per_min(300.0).unwrap();
    println!("Scan speed: {} nm/min", mono.get_scan_speed_nm_per_min().unwrap());

    let wl = mono.set_wavelength_nm(500.0).unwrap();
    println!("Arrived at {wl} nm");
}
