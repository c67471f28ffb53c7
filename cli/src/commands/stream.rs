use crate::output;
use anyhow::Result;
use relay_link::{EventHandlers, Filter, RelayClient, RelayTimeouts};

pub async fn run(
    url: &str,
    kinds: Vec<u32>,
    max: Option<usize>,
    timeouts: RelayTimeouts,
) -> Result<()> {
    let mut filter = Filter::new();
    if !kinds.is_empty() {
        filter = filter.with_kinds(kinds);
    }

    let client = RelayClient::builder()
        .timeouts(timeouts)
        .event_handlers(
            EventHandlers::new()
                .on_disconnect(|reason| log::info!("disconnected: {}", reason))
                .on_error(|error| log::warn!("connection error: {}", error)),
        )
        .build()?;

    let mut sub = client.subscribe_stream(url, filter).await?;
    if sub.is_closed() {
        eprintln!("{} is unreachable", url);
        return Ok(());
    }
    eprintln!("streaming from {} (Ctrl-C to stop)", url);

    let mut seen = 0usize;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            received = sub.next() => {
                match received {
                    Some(received) => {
                        output::print_event_line(&received.event);
                        seen += 1;
                        if max.map_or(false, |cap| seen >= cap) {
                            break;
                        }
                    }
                    None => {
                        eprintln!("stream ended");
                        return Ok(());
                    }
                }
            }
        }
    }

    sub.close().await;
    eprintln!("{} event(s) received", seen);
    Ok(())
}
