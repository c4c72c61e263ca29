//! Expedited SDO / vendor PDO codec.
//!
//! The pre-defined connection set gives every node an SDO channel that works
//! right after bootup: `0x600 + node id` for requests, `0x580 + node id` for
//! responses. Expedited transfers fit the whole value into a single frame:
//!
//! ```text
//! | Byte 0 (command) | Bytes 1-2 | Byte 3   | Bytes 4-7 |
//! | ccs r n e s      | index LE  | subindex | data LE   |
//! ```
//!
//! Write command bytes are 0x23 / 0x2B / 0x2F and read-request bytes are
//! 0x43 / 0x4B / 0x4F for 4 / 2 / 1 data bytes. Vendor PDO frames instead
//! carry a 16-bit command code in bytes 0-1 and place the data value at a
//! command-specific offset.

use embedded_can::nb::Can;
use embedded_can::Frame;

use crate::cmd_header::{expedited_command_byte, CCS_DOWNLOAD, CCS_UPLOAD};
use crate::constant::{COB_FUNC_MASK, COB_FUNC_SDO_REQUEST};
use crate::error::ErrorCode;
use crate::prelude::*;
use crate::util::{create_frame_with_padding, get_high, get_low};
use crate::value::WireValue;

/// The transport the controller drives. `is_connected` reflects the
/// device-unplug detection inside the transport; a disconnected transport
/// stays disconnected until it is explicitly reinitialized.
pub trait CanBus: Can {
    fn is_connected(&self) -> bool;
}

pub(crate) fn transmit_frame<CAN>(can: &mut CAN, cob_id: u16, payload: &[u8])
    -> Result<(), ErrorCode>
where
    CAN: Can,
    CAN::Frame: Frame + Debug,
{
    let frame = create_frame_with_padding(cob_id, payload)?;
    can.transmit(&frame).map_err(|_| ErrorCode::TransmitFailed { cob_id })?;
    Ok(())
}

/// Writes a value into a device property over the SDO channel.
pub fn send_expedited_sdo_write<CAN>(
    can: &mut CAN,
    node_id: u8,
    index: u16,
    sub_index: u8,
    data: WireValue,
) -> Result<(), ErrorCode>
where
    CAN: Can,
    CAN::Frame: Frame + Debug,
{
    let mut payload = [0u8; 8];
    payload[0] = expedited_command_byte(CCS_DOWNLOAD, data.width());
    // index goes out lowest byte first
    payload[1] = get_low(index);
    payload[2] = get_high(index);
    payload[3] = sub_index;
    data.write_le(&mut payload, 4);
    transmit_frame(can, COB_FUNC_SDO_REQUEST + node_id as u16, &payload)
}

/// Requests a read of a device property over the SDO channel.
/// `expected_size` must be 1, 2 or 4 data bytes.
pub fn send_expedited_sdo_read_request<CAN>(
    can: &mut CAN,
    node_id: u8,
    index: u16,
    sub_index: u8,
    expected_size: u8,
) -> Result<(), ErrorCode>
where
    CAN: Can,
    CAN::Frame: Frame + Debug,
{
    if !matches!(expected_size, 1 | 2 | 4) {
        return Err(ErrorCode::InvalidPayloadWidth { width: expected_size });
    }
    let mut payload = [0u8; 8];
    payload[0] = expedited_command_byte(CCS_UPLOAD, expected_size);
    payload[1] = get_low(index);
    payload[2] = get_high(index);
    payload[3] = sub_index;
    transmit_frame(can, COB_FUNC_SDO_REQUEST + node_id as u16, &payload)
}

/// Sends a vendor PDO command: `command` in bytes 0-1 (low byte first) and
/// `data` at `offset` within the 8-byte payload, to `channel + node_id`.
pub fn send_expedited_rpdo<CAN>(
    can: &mut CAN,
    node_id: u8,
    channel: u16,
    command: u16,
    offset: u8,
    data: WireValue,
) -> Result<(), ErrorCode>
where
    CAN: Can,
    CAN::Frame: Frame + Debug,
{
    if offset as usize + data.width() as usize > 8 {
        return Err(ErrorCode::PayloadOffsetOverflow { offset, width: data.width() });
    }
    let mut payload = [0u8; 8];
    payload[0] = get_low(command);
    payload[1] = get_high(command);
    data.write_le(&mut payload, offset as usize);
    transmit_frame(can, channel + node_id as u16, &payload)
}

/// Splits an 11-bit COB-ID into its function code (upper 4 bits) and node id
/// (lower 7 bits).
pub fn split_cob_id(cob_id: u16) -> Result<(u16, u8), ErrorCode> {
    if cob_id > 2047 {
        return Err(ErrorCode::CobIdOutOfRange { cob_id });
    }
    let function_code = cob_id & COB_FUNC_MASK;
    let node_id = (cob_id & 0x7F) as u8;
    Ok((function_code, node_id))
}

/// Object index carried in an SDO payload, independent of the command byte.
pub fn sdo_index_from_payload(payload: &[u8; 8]) -> u16 {
    u16::from_le_bytes([payload[1], payload[2]])
}

/// Subindex carried in an SDO payload.
pub fn sdo_sub_index_from_payload(payload: &[u8; 8]) -> u8 {
    payload[3]
}
