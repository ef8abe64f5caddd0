use crate::common::init_logging;

use libese::protocol::Frame;
use libese::test_support::{i_frame, opened_mock_session, quiet_config, r_frame, s_frame};
use libese::transport::{MockReply, MockTransport};
use libese::{Error, FrameKind, OpenMode, RErrorCode, SFrameType};

fn count(frames: &[Frame], wanted: &Frame) -> usize {
    frames.iter().filter(|f| *f == wanted).count()
}

#[test]
fn corrupt_line_exhausts_after_single_interface_reset() {
    init_logging();
    for limit in [1u32, 3, 10] {
        let mock = MockTransport::new();
        let cfg = quiet_config().with_frame_retry_limit(limit);
        let session = opened_mock_session(&mock, cfg, OpenMode::Normal).unwrap();
        mock.repeat(MockReply::Bytes(vec![0x00, 0x40, 0x00, 0x41]));

        let err = session.transceive(&[0x00, 0xA4, 0x04, 0x00]).unwrap_err();

        assert!(matches!(err, Error::RecoveryExhausted));
        let sent = mock.sent_frames();
        let l = limit as usize;
        assert_eq!(sent.len(), 2 * (l + 1));
        assert!(sent[..=l].iter().all(|f| f.kind() == FrameKind::Information));
        assert_eq!(
            count(&sent, &s_frame(SFrameType::IntfResetReq, &[])),
            l + 1
        );
    }
}

#[test]
fn wtx_storm_bounded_by_limit() {
    for limit in [1u32, 5, 500] {
        let mock = MockTransport::new();
        let cfg = quiet_config().with_wtx_counter_limit(limit);
        let session = opened_mock_session(&mock, cfg, OpenMode::Normal).unwrap();
        mock.repeat(MockReply::Bytes(
            s_frame(SFrameType::WtxReq, &[0x01]).encode().unwrap(),
        ));

        assert!(session.transceive(&[0x01]).is_err());

        let sent = mock.sent_frames();
        let wtx = s_frame(SFrameType::WtxRes, &[0x01]);
        let reset = s_frame(SFrameType::IntfResetReq, &[]);
        assert_eq!(count(&sent, &wtx), limit as usize);
        let first_reset = sent.iter().position(|f| *f == reset).unwrap();
        assert_eq!(first_reset, 1 + limit as usize);
        assert!(sent[1..first_reset].iter().all(|f| *f == wtx));
    }
}

#[test]
fn wtx_counter_restarts_after_other_frames() {
    let mock = MockTransport::new();
    let cfg = quiet_config().with_wtx_counter_limit(2);
    let session = opened_mock_session(&mock, cfg, OpenMode::Normal).unwrap();
    for n in 0..3u8 {
        mock.push_frame(&s_frame(SFrameType::WtxReq, &[0x01])).unwrap();
        mock.push_frame(&s_frame(SFrameType::WtxReq, &[0x01])).unwrap();
        mock.push_frame(&i_frame(n % 2, false, &[0x90, 0x00])).unwrap();
        assert_eq!(session.transceive(&[n]).unwrap(), vec![0x90, 0x00]);
    }
    assert!(
        !mock
            .sent_frames()
            .contains(&s_frame(SFrameType::IntfResetReq, &[]))
    );
}

#[test]
fn peer_parity_error_resends_verbatim() {
    let mock = MockTransport::new();
    let session = opened_mock_session(&mock, quiet_config(), OpenMode::Normal).unwrap();
    mock.push_frame(&r_frame(0, RErrorCode::Parity)).unwrap();
    mock.push_frame(&r_frame(0, RErrorCode::SofMissed)).unwrap();
    mock.push_frame(&i_frame(0, false, &[0x90, 0x00])).unwrap();

    session.transceive(&[0x00, 0xB0, 0x00, 0x00, 0x10]).unwrap();

    let sent = mock.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|f| *f == sent[0]));
}

#[test]
fn recovered_interface_reset_reports_failure_then_recovers() {
    let mock = MockTransport::new();
    let session = opened_mock_session(&mock, quiet_config(), OpenMode::Normal).unwrap();
    for _ in 0..4 {
        mock.push_frame(&r_frame(0, RErrorCode::Other)).unwrap();
    }
    mock.push_frame(&s_frame(SFrameType::IntfResetRes, &[])).unwrap();
    assert!(matches!(
        session.transceive(&[0x01]),
        Err(Error::RecoveryExhausted)
    ));

    mock.push_frame(&i_frame(0, false, &[0x90, 0x00])).unwrap();
    assert_eq!(session.transceive(&[0x02]).unwrap(), vec![0x90, 0x00]);
    assert_eq!(
        mock.sent_frames().last().unwrap(),
        &i_frame(0, false, &[0x02])
    );
}

#[test]
fn silent_card_times_out() {
    let mock = MockTransport::new();
    let cfg = quiet_config().with_timeout_retry_limit(2);
    let session = opened_mock_session(&mock, cfg, OpenMode::Normal).unwrap();

    assert!(matches!(
        session.transceive(&[0x01]),
        Err(Error::RecoveryExhausted)
    ));
    assert_eq!(mock.sent_count(), 3);
}

#[test]
fn hard_transport_fault_is_not_retried() {
    let mock = MockTransport::new();
    let session = opened_mock_session(&mock, quiet_config(), OpenMode::Normal).unwrap();
    mock.push_failure("device node vanished");

    assert!(matches!(
        session.transceive(&[0x01]),
        Err(Error::TransportFailure(_))
    ));
    assert_eq!(mock.sent_count(), 1);
}
