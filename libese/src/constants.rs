// libese/libese/src/constants.rs
//! Protocol constants and compiled-in defaults

/// Node address byte sent at offset 0 of every outbound frame
pub const NAD: u8 = 0x00;

/// Start-of-frame marker the secure element emits in place of the NAD
pub const RECEIVE_SOF: u8 = 0xA5;

/// Prologue length: NAD, PCB, LEN
pub const HEADER_LEN: usize = 3;

/// Epilogue length: LRC
pub const LRC_LEN: usize = 1;

/// Smallest well-formed frame (empty INF field)
pub const MIN_FRAME_LEN: usize = HEADER_LEN + LRC_LEN;

/// LEN value 0xFF is reserved by ISO7816-3, so the INF field tops out here
pub const MAX_INF_LEN: usize = 254;

/// Offset of the PCB byte
pub const PCB_OFFSET: usize = 1;

/// Offset of the LEN byte
pub const LEN_OFFSET: usize = 2;

/// Default information field size for frames sent to the card (IFSC)
pub const DEFAULT_IFSC: u16 = 254;

/// Default bound on frame-level recovery attempts
pub const DEFAULT_FRAME_RETRY_LIMIT: u32 = 3;

/// Largest accepted frame retry limit
pub const MAX_FRAME_RETRY_LIMIT: u32 = 10;

/// Default bound on retransmissions after a transport timeout
pub const DEFAULT_TIMEOUT_RETRY_LIMIT: u32 = 1;

/// Default number of consecutive WTX requests honoured before interface reset
pub const DEFAULT_WTX_COUNTER_LIMIT: u32 = 500;

/// Settle delay before recovering from a peer-reported or duplicate frame error
pub const DEFAULT_RECOVERY_DELAY_US: u64 = 3500;

/// Key for the WTX counter limit, read by `EngineConfig::from_source`
pub const CONFIG_WTX_COUNT_VALUE: &str = "WTX_COUNT_VALUE";
/// Key for the frame retry limit
pub const CONFIG_MAX_RNACK_RETRY: &str = "MAX_RNACK_RETRY";
/// Key for the timeout retry limit
pub const CONFIG_TIMEOUT_RETRY_COUNT: &str = "TIMEOUT_RETRY_COUNT";
/// Key for the IFSC
pub const CONFIG_IFSC_SIZE: &str = "IFSC_SIZE";
/// Key for the recovery settle delay in microseconds
pub const CONFIG_ERROR_RECOVERY_DELAY_US: &str = "ERROR_RECOVERY_DELAY_US";
/// Key for the per-frame read timeout in milliseconds
pub const CONFIG_READ_TIMEOUT_MS: &str = "READ_TIMEOUT_MS";
/// Key enabling interface reset when opening in normal mode
pub const CONFIG_SPI_INTF_RST_ENABLE: &str = "SPI_INTF_RST_ENABLE";
