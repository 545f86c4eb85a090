use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::Instant;
use tracing::{info, warn};
use turret_core::{CommandSink, Controller, ControllerConfig, Event, Render, SinkError, UiCommand};
use turret_proto::Command;

const READ_BUF: usize = 256;

/// Hands commands to the serial writer without blocking the dispatch loop.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Command>,
}

impl CommandSink for ChannelSink {
    fn send(&mut self, cmd: Command) -> Result<(), SinkError> {
        self.tx.try_send(cmd).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::Full,
            TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

/// One panel session over a byte stream pair.
///
/// Inbound reads, operator commands and controller timers are serviced by a
/// single loop, one event at a time. Outbound commands go through a bounded
/// queue to a writer running on the same task.
pub struct Session<R> {
    controller: Controller<ChannelSink, R>,
    commands: mpsc::Receiver<Command>,
    linger: Option<Duration>,
}

impl<R: Render> Session<R> {
    pub fn new(cfg: ControllerConfig, render: R, queue: usize) -> Self {
        let (tx, commands) = mpsc::channel(queue.max(1));
        Self {
            controller: Controller::new(cfg, ChannelSink { tx }, render),
            commands,
            linger: None,
        }
    }

    /// Keep firing timers this long after the input closes.
    pub fn linger(mut self, d: Duration) -> Self {
        self.linger = Some(d);
        self
    }

    /// Runs until the input closes (plus linger). Returns the renderer.
    pub async fn run<Rd, Wr>(self, reader: Rd, writer: Wr, ui: mpsc::Receiver<UiCommand>) -> Result<R>
    where
        Rd: AsyncRead + Unpin,
        Wr: AsyncWrite + Unpin,
    {
        let Session { controller, commands, linger } = self;
        let (render, ()) = tokio::try_join!(
            dispatch(controller, reader, ui, linger),
            write_commands(commands, writer),
        )?;
        Ok(render)
    }
}

async fn dispatch<Rd, R>(
    mut controller: Controller<ChannelSink, R>,
    mut reader: Rd,
    mut ui: mpsc::Receiver<UiCommand>,
    linger: Option<Duration>,
) -> Result<R>
where
    Rd: AsyncRead + Unpin,
    R: Render,
{
    let mut buf = vec![0u8; READ_BUF];
    let mut ui_open = true;
    let mut closed_until: Option<Instant> = None;

    loop {
        let wake = controller.next_deadline().map(Instant::from_std);
        if let Some(end) = closed_until {
            match wake {
                Some(w) if w <= end => {}
                _ => break,
            }
        }

        tokio::select! {
            biased;
            _ = sleep_until(wake) => controller.poll_timers(now()),
            n = reader.read(&mut buf), if closed_until.is_none() => {
                let n = n.context("serial read")?;
                if n == 0 {
                    info!("session: input closed");
                    match linger {
                        Some(d) => closed_until = Some(Instant::now() + d),
                        None => break,
                    }
                } else {
                    controller.handle(Event::Chunk(Bytes::copy_from_slice(&buf[..n])), now());
                }
            }
            cmd = ui.recv(), if ui_open => match cmd {
                Some(cmd) => controller.handle(Event::Ui(cmd), now()),
                None => ui_open = false,
            },
        }
    }

    let (_sink, render) = controller.into_parts();
    Ok(render)
}

async fn write_commands<Wr>(mut commands: mpsc::Receiver<Command>, mut writer: Wr) -> Result<()>
where
    Wr: AsyncWrite + Unpin,
{
    while let Some(cmd) = commands.recv().await {
        let line = cmd.encode();
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            warn!("serial write failed, dropped {}: {}", cmd, e);
            continue;
        }
        if let Err(e) = writer.flush().await {
            warn!("serial flush failed after {}: {}", cmd, e);
        }
    }
    Ok(())
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending().await,
    }
}

fn now() -> std::time::Instant {
    Instant::now().into_std()
}
