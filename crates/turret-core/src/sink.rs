use turret_proto::Command;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("command link closed")]
    Closed,
    #[error("command link backlogged")]
    Full,
    #[error("command write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Outbound side of the serial link. A failed send is the caller's to log;
/// nothing retries.
pub trait CommandSink {
    fn send(&mut self, cmd: Command) -> Result<(), SinkError>;
}

impl CommandSink for Vec<Command> {
    fn send(&mut self, cmd: Command) -> Result<(), SinkError> {
        self.push(cmd);
        Ok(())
    }
}
