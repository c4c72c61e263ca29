use bitfield_struct::bitfield;

/// Represents the command byte of an expedited SDO (Service Data Object) transfer.
/// The bitfield representation is based on an `u8` (8-bit unsigned integer), with the most significant bit (MSB) ordering.
#[bitfield(u8, order = Msb)]
pub struct SdoCommandByte {
    /// Command Specifier.
    /// 1 initiates a download (a write into the device), 2 initiates an upload (a read request).
    #[bits(3)]
    pub ccs: u8,

    /// Reserved bit.
    /// This bit is reserved for future use and should typically be set to 0.
    #[bits(1)]
    _reserved_0: u8,

    /// Number of data bytes that do not contain data, ranging from 0 to 3.
    /// For example, if `n` is 2, then the last 2 bytes of the 4-byte data field do not contain meaningful data.
    #[bits(2)]
    pub n: u8,

    /// Expedited Transfer flag.
    /// Indicates whether the SDO transfer is expedited (`true`) or segmented (`false`).
    #[bits(1)]
    pub e: bool,

    /// Size indicator.
    /// If set (`true`), indicates that the `n` field is valid and specifies the number of bytes without data.
    /// If unset (`false`), the `n` field should be ignored.
    #[bits(1)]
    pub s: bool,
}

/// Command specifier for an expedited write (0x23 / 0x2B / 0x2F by data size).
pub(crate) const CCS_DOWNLOAD: u8 = 0x1;
/// Command specifier for an expedited read request (0x43 / 0x4B / 0x4F by data size).
pub(crate) const CCS_UPLOAD: u8 = 0x2;

/// Builds the command byte for an expedited transfer carrying `size` data
/// bytes. `size` must be 1, 2 or 4; callers validate before calling.
pub(crate) fn expedited_command_byte(ccs: u8, size: u8) -> u8 {
    SdoCommandByte::new()
        .with_ccs(ccs)
        .with_n(4 - size)
        .with_e(true)
        .with_s(true)
        .into()
}
