use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use twinbot_agent::DialogTracker;
use twinbot_core::config::{AppConfig, LoadOptions};
use twinbot_core::errors::ApplicationError;
use twinbot_nlu::{NluClient, TwinNluClient};

use crate::commands::{block_on, nlu_client, prepare, CommandResult};

const USER_PROMPT: &str = "Вы:";
const BOT_PROMPT: &str = "Бот:";

pub fn run(options: &LoadOptions) -> CommandResult {
    let result = prepare(options).and_then(|config| {
        block_on(async move {
            let mut tracker = tracker(&config)?;
            let input = BufReader::new(tokio::io::stdin());
            let turns = converse(&mut tracker, input, tokio::io::stdout()).await?;
            Ok::<_, ApplicationError>(turns)
        })
    });

    match result {
        Ok(turns) => {
            CommandResult::success("chat", format!("conversation ended after {turns} turns"))
        }
        Err(error) => CommandResult::from_error("chat", &error),
    }
}

pub fn say(options: &LoadOptions, text: &str) -> CommandResult {
    let result = prepare(options).and_then(|config| {
        block_on(async move {
            let mut tracker = tracker(&config)?;
            Ok::<_, ApplicationError>(tracker.predict(text).await)
        })
    });

    match result {
        Ok(reply) => CommandResult::text(reply),
        Err(error) => CommandResult::from_error("say", &error),
    }
}

fn tracker(config: &AppConfig) -> Result<DialogTracker<TwinNluClient>, ApplicationError> {
    Ok(DialogTracker::from_config(nlu_client(config)?, config))
}

/// Console loop: prompt, read a line, reply. Blank lines are skipped and the
/// loop ends at end of input. Returns the number of answered turns.
pub async fn converse<C, R, W>(
    tracker: &mut DialogTracker<C>,
    input: R,
    mut output: W,
) -> std::io::Result<usize>
where
    C: NluClient,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut turns = 0;

    loop {
        output.write_all(format!("{USER_PROMPT}\n").as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let reply = tracker.predict(text).await;
        output.write_all(format!("{BOT_PROMPT}\n{reply}\n").as_bytes()).await?;
        turns += 1;
    }

    output.flush().await?;
    Ok(turns)
}
