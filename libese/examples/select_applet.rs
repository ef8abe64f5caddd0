//! Select an applet on a secure element exposed as a character device.
//!
//! Usage:
//!   cargo run -p libese --example select_applet -- /dev/p73 A000000151000000

use std::fs::OpenOptions;
use std::time::Duration;

use anyhow::{Context, bail};
use libese::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let device = args.next().unwrap_or_else(|| "/dev/p73".to_string());
    let aid = match args.next() {
        Some(hex_aid) => hex::decode(&hex_aid).context("AID must be hex")?,
        None => vec![0xA0, 0x00, 0x00, 0x01, 0x51, 0x00, 0x00, 0x00],
    };
    if aid.is_empty() || aid.len() > 16 {
        bail!("AID must be 1..=16 bytes");
    }

    let node = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&device)
        .with_context(|| format!("opening {}", device))?;
    let transport = StreamTransport::new(node).with_poll_interval(Duration::from_millis(1));

    let session = SessionBuilder::new()
        .with_transport(Box::new(transport))
        .build()?
        .open(OpenMode::Normal)?;

    let mut select = vec![0x00, 0xA4, 0x04, 0x00, aid.len() as u8];
    select.extend_from_slice(&aid);
    let resp = session.transceive(&select)?;
    println!("response: {}", bytes_to_hex_spaced(&resp));

    session.end_of_session()?;
    session.close()?;
    Ok(())
}
