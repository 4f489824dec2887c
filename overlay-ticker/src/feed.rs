use futures::StreamExt;
use log::*;
use thiserror::Error;
use ticker_common::feed_event::FeedEvent;
use tokio::{
    select,
    sync::mpsc,
    time::{Duration, sleep},
};
use tokio_tungstenite::{connect_async, tungstenite::Message};

const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("The event receiver was dropped")]
    ChannelClosed,
}

/// Follows the WebSocket event feed at `url` and forwards every recognized
/// event to `tx`, reconnecting whenever the connection drops. Returns once
/// the receiving side of `tx` is gone.
pub async fn feed_loop(url: String, tx: mpsc::Sender<FeedEvent>) {
    info!("Starting event feed from {url}");
    loop {
        match stream_events(&url, &tx).await {
            Ok(()) => warn!("Event feed closed. Trying again in 5 seconds."),
            Err(FeedError::ChannelClosed) => break,
            Err(e) => warn!("Event feed failed: {e}. Trying again in 5 seconds."),
        }

        select! {
            _ = sleep(RETRY_DELAY) => {}
            _ = tx.closed() => break,
        }
    }
    info!("Event receiver dropped, stopping feed");
}

async fn stream_events(url: &str, tx: &mpsc::Sender<FeedEvent>) -> Result<(), FeedError> {
    let (mut socket, _response) = connect_async(url).await?;
    info!("Connected to event feed");

    loop {
        let next = select! {
            next = socket.next() => next,
            _ = tx.closed() => return Err(FeedError::ChannelClosed),
        };
        let Some(msg) = next else {
            return Ok(());
        };

        match msg? {
            Message::Text(text) => {
                if let Some(event) = FeedEvent::parse(&text) {
                    debug!("Received {event}");
                    tx.send(event)
                        .await
                        .map_err(|_| FeedError::ChannelClosed)?;
                }
            }
            Message::Close(frame) => {
                debug!("Feed server closed the connection: {frame:?}");
                return Ok(());
            }
            _ => {}
        }
    }
}
