mod testing;

use embedded_can::Frame;

use canopen_motor::canopen::{
    sdo_index_from_payload, sdo_sub_index_from_payload, send_expedited_rpdo,
    send_expedited_sdo_read_request, send_expedited_sdo_write, split_cob_id,
};
use canopen_motor::error::ErrorCode;
use canopen_motor::value::WireValue;

use testing::util::MockBus;

#[test]
fn test_sdo_write_wire_layout_by_width() {
    let mut bus = MockBus::new();

    send_expedited_sdo_write(&mut bus, 5, 0x1017, 0x02, WireValue::U8(0x7F)).unwrap();
    send_expedited_sdo_write(&mut bus, 5, 0x1017, 0x02, WireValue::U16(0x1234)).unwrap();
    send_expedited_sdo_write(&mut bus, 5, 0x1017, 0x02, WireValue::U32(0xDEAD_BEEF)).unwrap();

    assert_eq!(bus.sent.len(), 3);
    for f in &bus.sent {
        assert_eq!(f.raw_id(), 0x605);
        assert_eq!(f.dlc(), 8);
        // index low byte first, then subindex
        assert_eq!(&f.data()[1..4], &[0x17, 0x10, 0x02]);
    }
    assert_eq!(bus.sent[0].data(), &[0x2F, 0x17, 0x10, 0x02, 0x7F, 0, 0, 0]);
    assert_eq!(bus.sent[1].data(), &[0x2B, 0x17, 0x10, 0x02, 0x34, 0x12, 0, 0]);
    assert_eq!(bus.sent[2].data(), &[0x23, 0x17, 0x10, 0x02, 0xEF, 0xBE, 0xAD, 0xDE]);
}

#[test]
fn test_sdo_read_request_wire_layout_by_width() {
    let mut bus = MockBus::new();

    send_expedited_sdo_read_request(&mut bus, 2, 0x2000, 0x01, 1).unwrap();
    send_expedited_sdo_read_request(&mut bus, 2, 0x2000, 0x01, 2).unwrap();
    send_expedited_sdo_read_request(&mut bus, 2, 0x2000, 0x01, 4).unwrap();

    assert_eq!(bus.sent[0].data(), &[0x4F, 0x00, 0x20, 0x01, 0, 0, 0, 0]);
    assert_eq!(bus.sent[1].data(), &[0x4B, 0x00, 0x20, 0x01, 0, 0, 0, 0]);
    assert_eq!(bus.sent[2].data(), &[0x43, 0x00, 0x20, 0x01, 0, 0, 0, 0]);
    assert!(bus.sent.iter().all(|f| f.raw_id() == 0x602));
}

#[test]
fn test_sdo_read_request_rejects_bad_width() {
    let mut bus = MockBus::new();

    for width in [0u8, 3, 5, 8, 255] {
        let res = send_expedited_sdo_read_request(&mut bus, 2, 0x2000, 0x01, width);
        assert_eq!(res, Err(ErrorCode::InvalidPayloadWidth { width }));
    }
    // rejected before anything reached the bus
    assert!(bus.sent.is_empty());
}

#[test]
fn test_sdo_index_subindex_roundtrip() {
    let mut bus = MockBus::new();

    for (index, sub_index) in [(0u16, 0u8), (0x1017, 0x02), (0xFFFF, 0xFF), (0x6040, 0)] {
        for data in [WireValue::U8(1), WireValue::U16(2), WireValue::U32(3)] {
            send_expedited_sdo_write(&mut bus, 9, index, sub_index, data).unwrap();
            let payload: &[u8; 8] = bus.last_sent().data().try_into().unwrap();
            assert_eq!(sdo_index_from_payload(payload), index);
            assert_eq!(sdo_sub_index_from_payload(payload), sub_index);
        }
    }
}

#[test]
fn test_rpdo_wire_layout() {
    let mut bus = MockBus::new();

    send_expedited_rpdo(&mut bus, 5, 0x200, 0x0021, 2, WireValue::U16(500)).unwrap();
    let f = bus.last_sent();
    assert_eq!(f.raw_id(), 0x205);
    // command code low byte first, data at its offset, rest zero-padded
    assert_eq!(f.data(), &[0x21, 0x00, 0xF4, 0x01, 0, 0, 0, 0]);

    send_expedited_rpdo(&mut bus, 5, 0x200, 0x0005, 4, WireValue::from(-200i16)).unwrap();
    assert_eq!(bus.last_sent().data(), &[0x05, 0x00, 0, 0, 0x38, 0xFF, 0, 0]);

    // a 4-byte value right at the end of the payload still fits
    send_expedited_rpdo(&mut bus, 5, 0x200, 0x0001, 4, WireValue::U32(0x0102_0304)).unwrap();
    assert_eq!(bus.last_sent().data(), &[0x01, 0x00, 0, 0, 0x04, 0x03, 0x02, 0x01]);
}

#[test]
fn test_rpdo_rejects_offset_overflow() {
    let mut bus = MockBus::new();

    let res = send_expedited_rpdo(&mut bus, 5, 0x200, 0x0021, 7, WireValue::U16(1));
    assert_eq!(res, Err(ErrorCode::PayloadOffsetOverflow { offset: 7, width: 2 }));

    let res = send_expedited_rpdo(&mut bus, 5, 0x200, 0x0021, 5, WireValue::U32(1));
    assert_eq!(res, Err(ErrorCode::PayloadOffsetOverflow { offset: 5, width: 4 }));

    // offset + width == 8 is the boundary and is legal
    send_expedited_rpdo(&mut bus, 5, 0x200, 0x0021, 7, WireValue::U8(1)).unwrap();
    assert_eq!(bus.sent.len(), 1);
}

#[test]
fn test_transmit_failure_is_reported() {
    let mut bus = MockBus::new();
    bus.fail_transmit = true;

    let res = send_expedited_sdo_write(&mut bus, 5, 0x1017, 0, WireValue::U16(1));
    assert_eq!(res, Err(ErrorCode::TransmitFailed { cob_id: 0x605 }));

    let res = send_expedited_rpdo(&mut bus, 5, 0x200, 0x0021, 2, WireValue::U16(1));
    assert_eq!(res, Err(ErrorCode::TransmitFailed { cob_id: 0x205 }));
}

#[test]
fn test_split_cob_id_masks() {
    for cob_id in 0..=2047u16 {
        assert_eq!(split_cob_id(cob_id), Ok((cob_id & 0x780, (cob_id & 0x7F) as u8)));
    }
    assert!(matches!(split_cob_id(2048), Err(ErrorCode::CobIdOutOfRange { .. })));
}
