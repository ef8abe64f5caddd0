use crate::common::{hex_bytes, init_logging};

use libese::power::mock::PowerCall;
use libese::power::{MockPowerManager, PowerOp, PowerState};
use libese::test_support::{mock_session, quiet_config, s_frame};
use libese::transport::MockTransport;
use libese::{Error, OpenMode, SFrameType};

#[test]
fn full_lifecycle() {
    init_logging();
    let mock = MockTransport::new();
    let power = MockPowerManager::new();
    mock.push_frame(&s_frame(SFrameType::IntfResetRes, &[])).unwrap();
    mock.push_frame(&s_frame(SFrameType::EndOfSessionRes, &[])).unwrap();
    mock.push_frame(&s_frame(SFrameType::IntfResetRes, &[])).unwrap();

    let session = mock_session(&mock, &power, quiet_config())
        .unwrap()
        .open(OpenMode::Normal)
        .unwrap();
    session.end_of_session().unwrap();
    session.reset().unwrap();
    let closed = session.close().unwrap();

    assert_eq!(
        mock.sent(),
        vec![
            hex_bytes("00 c4 00 c4"),
            hex_bytes("00 c5 00 c5"),
            hex_bytes("00 c4 00 c4"),
        ]
    );
    assert_eq!(power.current(), PowerState::IDLE);

    // A closed session can be opened again.
    mock.push_frame(&s_frame(SFrameType::ResynchRes, &[])).unwrap();
    closed.open(OpenMode::Update).unwrap();
    assert_eq!(mock.sent().last().unwrap(), &hex_bytes("00 c0 00 c0"));
}

#[test]
fn interface_reset_on_open_can_be_disabled() {
    let mock = MockTransport::new();
    let power = MockPowerManager::new();
    mock.push_frame(&s_frame(SFrameType::ResynchRes, &[])).unwrap();
    let cfg = quiet_config().with_interface_reset_on_open(false);

    mock_session(&mock, &power, cfg)
        .unwrap()
        .open(OpenMode::Normal)
        .unwrap();

    assert_eq!(mock.sent(), vec![hex_bytes("00 c0 00 c0")]);
}

#[test]
fn open_refused_during_firmware_download() {
    let mock = MockTransport::new();
    let power = MockPowerManager::with_state(PowerState::DOWNLOAD.union(PowerState::IDLE));
    let result = mock_session(&mock, &power, quiet_config())
        .unwrap()
        .open(OpenMode::Normal);
    assert!(matches!(result, Err(Error::Busy)));
    assert_eq!(mock.sent_count(), 0);
}

#[test]
fn power_enable_failure_releases_access() {
    let mock = MockTransport::new();
    let power = MockPowerManager::new();
    power.fail_on(PowerOp::Enable);
    let result = mock_session(&mock, &power, quiet_config())
        .unwrap()
        .open(OpenMode::Normal);
    assert!(matches!(result, Err(Error::Power(_))));
    assert_eq!(
        power.calls(),
        vec![
            PowerCall::Acquire,
            PowerCall::Configure(PowerOp::Enable),
            PowerCall::Release
        ]
    );
    assert_eq!(mock.sent_count(), 0);
}

#[test]
fn resync_restarts_sequence_numbers() {
    let mock = MockTransport::new();
    let power = MockPowerManager::new();
    mock.push_frame(&s_frame(SFrameType::IntfResetRes, &[])).unwrap();
    let session = mock_session(&mock, &power, quiet_config())
        .unwrap()
        .open(OpenMode::Normal)
        .unwrap();

    mock.push_frame(&libese::test_support::i_frame(0, false, &[0x90, 0x00]))
        .unwrap();
    session.transceive(&[0x01]).unwrap();
    mock.push_frame(&s_frame(SFrameType::ResynchRes, &[])).unwrap();
    session.resync().unwrap();
    mock.push_frame(&libese::test_support::i_frame(0, false, &[0x90, 0x00]))
        .unwrap();
    session.transceive(&[0x02]).unwrap();

    let sent = mock.sent();
    // Both commands go out with N(S)=0.
    assert_eq!(sent[1][1], 0x00);
    assert_eq!(sent[3][1], 0x00);
}
