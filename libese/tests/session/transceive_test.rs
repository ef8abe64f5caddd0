use crate::common::{init_logging, peer_view, sent_iframes};

use libese::test_support::{i_frame, opened_mock_session, quiet_config, r_frame, s_frame};
use libese::transport::MockTransport;
use libese::{Error, OpenMode, RErrorCode, SFrameType};

#[test]
fn select_apdu_round_trip() {
    init_logging();
    let mock = MockTransport::new();
    let session = opened_mock_session(&mock, quiet_config(), OpenMode::Normal).unwrap();
    mock.push_frame(&i_frame(0, false, &[0x90, 0x00])).unwrap();

    let resp = session.transceive(&[0x00, 0xA4, 0x04, 0x00]).unwrap();

    assert_eq!(resp, vec![0x90, 0x00]);
    assert_eq!(
        mock.sent(),
        vec![vec![0x00, 0x00, 0x04, 0x00, 0xA4, 0x04, 0x00, 0xA4]]
    );
}

#[test]
fn long_command_is_chained_at_ifsc() {
    init_logging();
    let ifsc = 32usize;
    let mock = MockTransport::new();
    let session = opened_mock_session(&mock, quiet_config(), OpenMode::Normal).unwrap();
    session.set_max_frame_size(ifsc as u16).unwrap();

    // Card acknowledges three chained fragments, then answers.
    mock.push_frame(&r_frame(1, RErrorCode::None)).unwrap();
    mock.push_frame(&r_frame(0, RErrorCode::None)).unwrap();
    mock.push_frame(&r_frame(1, RErrorCode::None)).unwrap();
    mock.push_frame(&i_frame(0, false, &[0x90, 0x00])).unwrap();

    let command: Vec<u8> = (0..3 * ifsc + 7).map(|i| (i * 7) as u8).collect();
    let resp = session.transceive(&command).unwrap();

    assert_eq!(resp, vec![0x90, 0x00]);
    assert_eq!(
        sent_iframes(&mock),
        vec![(0, true, ifsc), (1, true, ifsc), (0, true, ifsc), (1, false, 7)]
    );
    assert_eq!(peer_view(&mock), command);
}

#[test]
fn chain_continues_after_wtx_between_fragments() {
    init_logging();
    let mock = MockTransport::new();
    let session = opened_mock_session(&mock, quiet_config(), OpenMode::Normal).unwrap();
    session.set_max_frame_size(4).unwrap();

    mock.push_frame(&s_frame(SFrameType::WtxReq, &[0x01])).unwrap();
    mock.push_frame(&r_frame(1, RErrorCode::None)).unwrap();
    mock.push_frame(&i_frame(0, false, &[0x90, 0x00])).unwrap();

    let command: Vec<u8> = (0u8..6).collect();
    assert_eq!(session.transceive(&command).unwrap(), vec![0x90, 0x00]);

    let sent = mock.sent_frames();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0], i_frame(0, true, &[0, 1, 2, 3]));
    assert_eq!(sent[1], s_frame(SFrameType::WtxRes, &[0x01]));
    assert_eq!(sent[2], i_frame(1, false, &[4, 5]));
    assert_eq!(peer_view(&mock), command);
}

#[test]
fn chain_continues_after_card_ifs_request() {
    init_logging();
    let mock = MockTransport::new();
    let session = opened_mock_session(&mock, quiet_config(), OpenMode::Normal).unwrap();
    session.set_max_frame_size(4).unwrap();

    mock.push_frame(&s_frame(SFrameType::IfsReq, &[0x20])).unwrap();
    mock.push_frame(&r_frame(1, RErrorCode::None)).unwrap();
    mock.push_frame(&i_frame(0, false, &[0x90, 0x00])).unwrap();

    let command: Vec<u8> = (0u8..10).collect();
    assert_eq!(session.transceive(&command).unwrap(), vec![0x90, 0x00]);

    // The rest of the command goes out in one fragment at the new IFSC.
    assert_eq!(sent_iframes(&mock), vec![(0, true, 4), (1, false, 6)]);
    assert_eq!(
        mock.sent_frames()[1],
        s_frame(SFrameType::IfsRes, &[0x20])
    );
    assert_eq!(peer_view(&mock), command);
    assert_eq!(session.max_frame_size().unwrap(), 0x20);
}

#[test]
fn chained_response_is_reassembled() {
    let mock = MockTransport::new();
    let session = opened_mock_session(&mock, quiet_config(), OpenMode::Normal).unwrap();
    let body: Vec<u8> = (0u8..=255).collect();
    mock.push_frame(&i_frame(0, true, &body[..200])).unwrap();
    mock.push_frame(&i_frame(1, false, &body[200..])).unwrap();

    let resp = session.transceive(&[0x80, 0xCA, 0x00, 0x00, 0x00]).unwrap();

    assert_eq!(resp, body);
    assert_eq!(mock.sent_frames()[1], r_frame(1, RErrorCode::None));
}

#[test]
fn duplicated_final_fragment_is_not_appended_twice() {
    let mock = MockTransport::new();
    let session = opened_mock_session(&mock, quiet_config(), OpenMode::Normal).unwrap();
    mock.push_frame(&i_frame(0, true, &[0xAA, 0xBB])).unwrap();
    mock.push_frame(&i_frame(1, false, &[0x90, 0x00])).unwrap();
    // The next exchange first sees the old final fragment again.
    mock.push_frame(&i_frame(1, false, &[0x90, 0x00])).unwrap();
    mock.push_frame(&i_frame(0, false, &[0x62, 0x83])).unwrap();

    assert_eq!(
        session.transceive(&[0x01]).unwrap(),
        vec![0xAA, 0xBB, 0x90, 0x00]
    );
    assert_eq!(session.transceive(&[0x02]).unwrap(), vec![0x62, 0x83]);
    assert_eq!(
        mock.sent_frames().last().unwrap(),
        &r_frame(0, RErrorCode::Other)
    );
}

#[test]
fn wtx_then_response() {
    let mock = MockTransport::new();
    let session = opened_mock_session(&mock, quiet_config(), OpenMode::Normal).unwrap();
    mock.push_frame(&s_frame(SFrameType::WtxReq, &[0x02])).unwrap();
    mock.push_frame(&s_frame(SFrameType::WtxReq, &[0x03])).unwrap();
    mock.push_frame(&i_frame(0, false, &[0x90, 0x00])).unwrap();

    assert_eq!(session.transceive(&[0x01]).unwrap(), vec![0x90, 0x00]);
    let sent = mock.sent_frames();
    assert_eq!(sent[1], s_frame(SFrameType::WtxRes, &[0x02]));
    assert_eq!(sent[2], s_frame(SFrameType::WtxRes, &[0x03]));
}

#[test]
fn invalid_frame_sizes_rejected() {
    let mock = MockTransport::new();
    let session = opened_mock_session(&mock, quiet_config(), OpenMode::Normal).unwrap();
    assert!(matches!(
        session.set_max_frame_size(0),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        session.set_max_frame_size(255),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(session.max_frame_size().unwrap(), 254);
    assert!(matches!(
        session.transceive(&[]),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(mock.sent_count(), 0);
}
