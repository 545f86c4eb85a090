//! Wire level of the turret serial link: byte framing, line classification,
//! record parsers and the outbound command encoding.

pub mod command;
pub mod framer;
pub mod message;
pub mod telemetry;

pub use command::Command;
pub use framer::LineFramer;
pub use message::{classify, Message};
pub use telemetry::{BatteryReading, DetectionPoint, RadarDetection};
