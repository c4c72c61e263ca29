use embedded_can::{Frame, Id, StandardId};

use crate::error::ErrorCode;
use crate::prelude::*;

pub fn get_high(w: u16) -> u8 {
    (w >> 8) as u8
}

pub fn get_low(w: u16) -> u8 {
    (w & 0xFF) as u8
}

pub fn set_high(w: &mut u16, h: u8) {
    *w = (*w & 0x00FF) | ((h as u16) << 8);
}

pub fn set_low(w: &mut u16, l: u8) {
    *w = (*w & 0xFF00) | (l as u16);
}

pub fn get_cob_id<F: Frame>(frame: &F) -> Option<u16> {
    if let Id::Standard(sid) = frame.id() {
        return Some(sid.as_raw());
    }
    // No standard id. The drive protocol only uses CAN 2.0a.
    None
}

/// Builds a standard frame carrying `data` padded with zeroes to the full
/// 8 bytes the drive protocol mandates.
pub fn create_frame_with_padding<F: Frame + Debug>(cob_id: u16, data: &[u8])
    -> Result<F, ErrorCode> {
    let mut packet = [0u8; 8];
    let len = data.len().min(8);
    packet[..len].copy_from_slice(&data[..len]);

    F::new(StandardId::new(cob_id).ok_or(ErrorCode::InvalidStandardId { cob_id })?,
           &packet).ok_or(ErrorCode::FrameCreationFailed { data: data.to_vec() })
}

/// Infallible frame builder for fixtures and demos; panics on an invalid id.
pub fn genf<F: Frame + Debug>(cob_id: u16, data: &[u8]) -> F {
    create_frame_with_padding(cob_id, data).expect("valid 11-bit COB-ID")
}
