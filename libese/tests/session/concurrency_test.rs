use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use libese::power::NoopPowerManager;
use libese::session::SessionBuilder;
use libese::test_support::{i_frame, quiet_config, s_frame};
use libese::transport::Transport;
use libese::{Error, OpenMode, Result, SFrameType, SessionState};

/// Blocks every `receive` until the test releases the next frame.
struct GatedTransport {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    entered: Sender<()>,
    gate: Receiver<Vec<u8>>,
}

impl Transport for GatedTransport {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.sent.lock().unwrap().push(frame.to_vec());
        Ok(())
    }

    fn receive(&mut self, _timeout_ms: u64) -> Result<Vec<u8>> {
        let _ = self.entered.send(());
        self.gate.recv().map_err(|_| Error::TransportTimeout)
    }
}

#[test]
fn overlapping_call_is_rejected_without_io() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let (entered_tx, entered_rx) = mpsc::channel();
    let (gate_tx, gate_rx) = mpsc::channel();
    let transport = GatedTransport {
        sent: Arc::clone(&sent),
        entered: entered_tx,
        gate: gate_rx,
    };

    let session = SessionBuilder::new()
        .with_transport(Box::new(transport))
        .with_power_manager(Box::new(NoopPowerManager))
        .with_config(quiet_config())
        .build()
        .unwrap();

    gate_tx
        .send(s_frame(SFrameType::IntfResetRes, &[]).encode().unwrap())
        .unwrap();
    let session = Arc::new(session.open(OpenMode::Normal).unwrap());
    entered_rx.recv().unwrap();

    let worker = {
        let session = Arc::clone(&session);
        thread::spawn(move || session.transceive(&[0x00, 0xA4, 0x04, 0x00]))
    };

    // Wait until the worker is blocked inside receive.
    entered_rx.recv().unwrap();
    assert_eq!(session.state(), SessionState::Transceiving);
    let frames_before = sent.lock().unwrap().len();

    let err = session.transceive(&[0x00, 0xB0, 0x00, 0x00]).unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
    assert!(matches!(session.end_of_session(), Err(Error::InvalidState(_))));
    assert!(matches!(session.reset(), Err(Error::InvalidState(_))));
    assert_eq!(sent.lock().unwrap().len(), frames_before);

    gate_tx
        .send(i_frame(0, false, &[0x90, 0x00]).encode().unwrap())
        .unwrap();
    assert_eq!(worker.join().unwrap().unwrap(), vec![0x90, 0x00]);
    assert_eq!(session.state(), SessionState::Idle);
}
