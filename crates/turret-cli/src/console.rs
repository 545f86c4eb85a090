use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use turret_core::UiCommand;

/// One operator line: `preset <deg>`, `slider <deg>` or `auto`.
pub fn parse_line(line: &str) -> Result<Option<UiCommand>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let cmd = match verb.to_ascii_lowercase().as_str() {
        "preset" | "p" => UiCommand::Preset(angle_arg(words.next())?),
        "slider" | "s" => UiCommand::Slider(angle_arg(words.next())?),
        "auto" | "a" => UiCommand::ToggleAuto,
        other => anyhow::bail!("unknown command: {}", other),
    };
    anyhow::ensure!(words.next().is_none(), "trailing input after {}", verb);
    Ok(Some(cmd))
}

fn angle_arg(word: Option<&str>) -> Result<u8> {
    let word = word.context("missing angle")?;
    word.parse::<u8>().with_context(|| format!("bad angle {:?}", word))
}

/// Forwards operator lines to the session until input ends or the session
/// stops listening.
pub async fn pump<I>(input: I, tx: mpsc::Sender<UiCommand>) -> Result<()>
where
    I: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await.context("read console")? {
        match parse_line(&line) {
            Ok(Some(cmd)) => {
                debug!("console: {:?}", cmd);
                if tx.send(cmd).await.is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("console: {:#}", e),
        }
    }
    Ok(())
}
