//! Read and print the identity of an SHDLC device on a serial port.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p shdlc --example device_info -- /dev/ttyUSB0 115200
//! ```
//!
//! Set `RUST_LOG=shdlc_transport=trace` to watch the raw frames.

use std::sync::Arc;

use shdlc::{Connection, Device, SerialPort};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "/dev/ttyUSB0".into());
    let bitrate: u32 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(115_200);

    println!("Connecting to SHDLC device on {path} at {bitrate} bit/s...");
    let port = Arc::new(SerialPort::open(&path, bitrate)?);
    let connection = Connection::new(port);
    let mut device = Device::new(&connection, 0);

    println!("Product type:  {}", device.get_product_type()?);
    println!("Serial number: {}", device.get_serial_number()?);
    println!("Version:       {}", device.get_version()?);
    println!("Up time:       {} s", device.get_system_up_time()?);

    let (state, last_error) = device.get_error_state(false)?;
    println!("Error state:   0x{state:08X}");
    match last_error {
        Some(error) => println!("Last error:    {error}"),
        None => println!("Last error:    none"),
    }

    Ok(())
}
