pub mod autodetect;
pub mod doctor;
pub mod port;
pub mod session;

use serde::Deserialize;

pub use session::{ChannelSink, Session};

/// Arduino Uno USB ids.
pub const DEFAULT_VENDOR_ID: u16 = 0x2341;
pub const DEFAULT_PRODUCT_ID: u16 = 0x0043;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// If true, pick the first USB serial port matching vendor_id/product_id.
    pub autodetect: bool,

    /// When autodetect=false: fixed port path (e.g. /dev/ttyACM0, COM9)
    pub device: Option<String>,

    pub baud: u32,
    pub vendor_id: u16,
    pub product_id: u16,

    /// Outbound commands buffered ahead of the serial writer.
    pub command_queue: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            autodetect: true,
            device: None,
            baud: 115_200,
            vendor_id: DEFAULT_VENDOR_ID,
            product_id: DEFAULT_PRODUCT_ID,
            command_queue: 32,
        }
    }
}
