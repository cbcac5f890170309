use std::env;

use inquire::Select;
use korad_3305p::{
    Kd3305pPsu, Model, Psu,
    model::Kd3305p,
    serial::{self, PortSettings},
};
use tracing_subscriber::EnvFilter;

// Configuration constants - adjust these for your setup
const CHANNEL: u8 = 1;
const OUTPUT_VOLTAGE_MV: u32 = 5000; // 5V
const CURRENT_LIMIT_MA: u32 = 100; // 0.1A
const STABILIZATION_DELAY_MS: u64 = 1000;

fn settle() {
    std::thread::sleep(std::time::Duration::from_millis(
        Kd3305p::SETTLE_TIME.to_millis() as u64,
    ));
}

fn main() {
    // Set RUST_LOG=korad_3305p=debug to see every command sent.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Get serial port from command line arg or interactive selection
    let port_name = env::args().nth(1).unwrap_or_else(|| {
        let port_names = serial::available_ports().expect("Failed to enumerate serial ports");

        if port_names.is_empty() {
            eprintln!("No serial ports found!");
            std::process::exit(1);
        }

        Select::new("Select a serial port:", port_names)
            .prompt()
            .expect("Failed to select port")
    });

    println!("Using port: {}", port_name);

    let port =
        serial::open(&port_name, &PortSettings::default()).expect("Failed to open serial port");

    // Create a PSU object, this reads the status to check the PSU is there.
    let mut psu: Kd3305pPsu<serial::Port> = Psu::connect(port).expect("PSU is not responding");
    println!("Status: {:#?}", psu.cached_status());

    let identity = psu.identify().unwrap();
    println!("Connected to: {}", identity);

    // Set output voltage
    psu.set_voltage_mv(CHANNEL, OUTPUT_VOLTAGE_MV).unwrap();
    settle();
    println!(
        "Set CH{} voltage to {}V",
        CHANNEL,
        OUTPUT_VOLTAGE_MV as f32 / 1000.0
    );

    // Set current limit
    psu.set_current_ma(CHANNEL, CURRENT_LIMIT_MA).unwrap();
    settle();
    println!(
        "Set CH{} current limit to {}A",
        CHANNEL,
        CURRENT_LIMIT_MA as f32 / 1000.0
    );

    // Read the settings back
    println!(
        "CH{} settings read back: {}mV, {}mA",
        CHANNEL,
        psu.get_voltage_mv(CHANNEL).unwrap(),
        psu.get_current_ma(CHANNEL).unwrap()
    );

    // Enable the output
    psu.set_channel_output(CHANNEL, true).unwrap();
    println!("Output enabled");

    // Wait for output to stabilize
    std::thread::sleep(std::time::Duration::from_millis(STABILIZATION_DELAY_MS));

    let measured_voltage = psu.read_voltage_mv(CHANNEL).unwrap();
    let measured_current = psu.read_current_ma(CHANNEL).unwrap();
    println!(
        "Measured output: {:.2}V {:.3}A",
        measured_voltage as f32 / 1000.0,
        measured_current as f32 / 1000.0
    );

    let status = psu.status().unwrap();
    println!(
        "CH{} regulation mode: {:?}",
        CHANNEL,
        status.mode(CHANNEL.try_into().unwrap())
    );

    // Switch everything off again
    psu.set_output(false).unwrap();
    println!("Output disabled");
}
