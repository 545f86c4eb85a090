use std::fmt;

/// Outbound directive to the turret controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Angle(u8),
    Auto,
    Manual,
    LaserOn,
    LaserOff,
}

impl Command {
    /// Wire form, newline terminated.
    pub fn encode(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Angle(deg) => write!(f, "{}", deg),
            Command::Auto => f.write_str("AUTO"),
            Command::Manual => f.write_str("MANUAL"),
            Command::LaserOn => f.write_str("LASER_ON"),
            Command::LaserOff => f.write_str("LASER_OFF"),
        }
    }
}
