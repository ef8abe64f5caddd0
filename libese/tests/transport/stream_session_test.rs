use std::io::{self, Cursor, Read, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::common::{hex_bytes, init_logging};

use libese::session::SessionBuilder;
use libese::test_support::quiet_config;
use libese::transport::StreamTransport;
use libese::{Error, OpenMode};

/// Scripted SPI device: reads come from a fixed byte script, writes are
/// captured for inspection.
struct ScriptedDevice {
    script: Cursor<Vec<u8>>,
    written: Arc<Mutex<Vec<u8>>>,
}

impl Read for ScriptedDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.script.read(buf)
    }
}

impl Write for ScriptedDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn device(script: &str) -> (StreamTransport<ScriptedDevice>, Arc<Mutex<Vec<u8>>>) {
    let written = Arc::new(Mutex::new(Vec::new()));
    let dev = ScriptedDevice {
        script: Cursor::new(hex_bytes(script)),
        written: Arc::clone(&written),
    };
    (
        StreamTransport::new(dev).with_poll_interval(Duration::ZERO),
        written,
    )
}

#[test]
fn session_over_byte_stream() {
    init_logging();
    // Idle filler, then INTF_RESET response, then a status word response.
    let (transport, written) = device("ff ff a5 e4 00 e4 00 a5 00 02 90 00 92");
    let session = SessionBuilder::new()
        .with_transport(Box::new(transport))
        .with_config(quiet_config().with_read_timeout_ms(20))
        .build()
        .unwrap()
        .open(OpenMode::Normal)
        .unwrap();

    let resp = session.transceive(&[0x00, 0xA4, 0x04, 0x00]).unwrap();

    assert_eq!(resp, vec![0x90, 0x00]);
    assert_eq!(
        *written.lock().unwrap(),
        hex_bytes("00 c4 00 c4 00 00 04 00 a4 04 00 a4")
    );
}

#[test]
fn exhausted_script_fails_after_timeout_retries() {
    let (transport, written) = device("a5 e4 00 e4");
    let session = SessionBuilder::new()
        .with_transport(Box::new(transport))
        .with_config(quiet_config().with_read_timeout_ms(2))
        .build()
        .unwrap()
        .open(OpenMode::Normal)
        .unwrap();

    assert!(matches!(
        session.transceive(&[0x01]),
        Err(Error::RecoveryExhausted)
    ));
    // INTF_RESET, the I-frame and one retransmission.
    assert_eq!(written.lock().unwrap().len(), 4 + 5 + 5);
}
