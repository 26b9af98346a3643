//! Poll the system up time of an SHDLC device behind a TCP-tunneled
//! serial link.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p shdlc --example uptime_tcp -- 192.168.1.50:10001
//! ```

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use shdlc::{Connection, Device, TcpPort};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:10001".into());

    println!("Connecting to {addr}...");
    let port = Arc::new(TcpPort::connect(&addr)?);
    let connection = Connection::new(port);
    let mut device = Device::new(&connection, 0);

    println!("Device: {}", device.get_product_type()?);
    for _ in 0..5 {
        println!("Up time: {} s", device.get_system_up_time()?);
        thread::sleep(Duration::from_secs(1));
    }

    Ok(())
}
