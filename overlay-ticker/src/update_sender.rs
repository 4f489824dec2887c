use crate::render::FrameSink;
use log::*;
use std::{collections::HashMap, fmt::Debug, future::Future, net::SocketAddr, pin::Pin};
use thiserror::Error;
use ticker_common::frame::OverlayFrame;
use tokio::{
    io::{self, AsyncWrite, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    select,
    sync::mpsc::{self, error::TrySendError},
    task::{self, JoinHandle},
    time::{Duration, timeout},
};

const TIMEOUT: Duration = Duration::from_millis(500);
const WORKER_CHANNEL_LEN: usize = 4;
const SERVER_CHANNEL_LEN: usize = 8;

/// Streams overlay frames as newline-delimited JSON to every renderer that
/// connects to `port`
#[derive(Debug)]
pub struct UpdateSender {
    tx: mpsc::Sender<ServerMessage>,
    server_join: JoinHandle<()>,
    listener_join: JoinHandle<()>,
}

impl UpdateSender {
    pub fn new(port: u16) -> Self {
        let (tx, rx) = mpsc::channel(SERVER_CHANNEL_LEN);

        let server_join = task::spawn(Server::new(rx).run_loop());

        let listener_join = task::spawn(listener_loop(tx.clone(), port));

        Self {
            tx,
            server_join,
            listener_join,
        }
    }

    pub fn send_frame(&self, frame: OverlayFrame) -> Result<(), TrySendError<Box<OverlayFrame>>> {
        self.tx
            .try_send(ServerMessage::NewFrame(Box::new(frame)))
            .map_err(|e| match e {
                TrySendError::Full(ServerMessage::NewFrame(frame)) => TrySendError::Full(frame),
                TrySendError::Closed(ServerMessage::NewFrame(frame)) => {
                    TrySendError::Closed(frame)
                }
                _ => unreachable!(),
            })
    }
}

impl FrameSink for UpdateSender {
    fn publish(&mut self, frame: &OverlayFrame) {
        if let Err(e) = self.send_frame(frame.clone()) {
            match e {
                TrySendError::Full(_) => warn!("Update sender is backed up, dropping a frame"),
                TrySendError::Closed(_) => error!("Update sender has stopped"),
            }
        }
    }
}

impl Drop for UpdateSender {
    fn drop(&mut self) {
        if self.tx.try_send(ServerMessage::Stop).is_err() {
            self.server_join.abort();
        }
        self.listener_join.abort();
    }
}

#[derive(Debug, Error)]
enum WorkerError {
    #[error("The sender closed the channel")]
    ChannelClosed,
    #[error(transparent)]
    EncodingError(#[from] serde_json::Error),
    #[error(transparent)]
    IoError(#[from] io::Error),
}

async fn worker_loop<T: AsyncWrite + Debug + Unpin + Send>(
    mut rx: mpsc::Receiver<Vec<u8>>,
    mut write: T,
) -> Result<(), WorkerError> {
    loop {
        let data = rx.recv().await.ok_or(WorkerError::ChannelClosed)?;

        match timeout(TIMEOUT, write.write_all(&data[..])).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!("Send to {:?} failed: {e:?}", write);
                Err(e)?;
            }
            Err(_) => {
                warn!("Send to {:?} timed out", write);
            }
        }
    }
}

#[derive(Debug)]
struct WorkerHandle {
    tx: mpsc::Sender<Vec<u8>>,
    join: JoinHandle<Result<(), WorkerError>>,
}

#[derive(Debug)]
enum ServerMessage {
    NewConnection(TcpStream),
    NewFrame(Box<OverlayFrame>),
    Stop,
}

#[derive(Debug)]
struct Server {
    next_id: usize,
    senders: HashMap<usize, WorkerHandle>,
    rx: mpsc::Receiver<ServerMessage>,
    json: Vec<u8>,
}

impl Server {
    fn new(rx: mpsc::Receiver<ServerMessage>) -> Self {
        Server {
            next_id: 0,
            senders: HashMap::new(),
            rx,
            json: Vec::new(),
        }
    }

    fn add_sender<T: 'static + AsyncWrite + Debug + Unpin + Send>(&mut self, sender: T) {
        let (tx, rx) = mpsc::channel(WORKER_CHANNEL_LEN);
        let join = task::spawn(async move {
            let result = worker_loop(rx, sender).await;
            if let Err(ref e) = result {
                debug!("Worker stopped: {e}");
            }
            result
        });

        // Catch the newcomer up on what is already showing
        if !self.json.is_empty() {
            if let Err(e) = tx.try_send(self.json.clone()) {
                error!("Error sending latest frame to new worker: {e:?}");
            }
        }

        self.senders.insert(self.next_id, WorkerHandle { tx, join });
        self.next_id += 1;
    }

    fn encode(&mut self, frame: &OverlayFrame) -> Result<(), WorkerError> {
        let mut json = serde_json::to_vec(frame)?;
        json.push(b'\n');
        self.json = json;
        Ok(())
    }

    fn send_to_workers(&mut self) {
        let mut to_drop = vec![];
        for (id, handle) in self.senders.iter() {
            if let Err(e) = handle.tx.try_send(self.json.clone()) {
                if matches!(e, TrySendError::Closed(_)) {
                    info!("Worker channel closed");
                    to_drop.push(*id);
                } else {
                    error!("Error sending to worker: {e:?}");
                }
            }
        }
        for id in to_drop {
            self.senders.remove(&id);
        }
    }

    async fn run_loop(mut self) {
        loop {
            match self.rx.recv().await {
                Some(ServerMessage::NewConnection(stream)) => {
                    self.add_sender(stream);
                }
                Some(ServerMessage::NewFrame(frame)) => match self.encode(&frame) {
                    Ok(()) => self.send_to_workers(),
                    Err(e) => error!("Failed to encode frame: {e}"),
                },
                Some(ServerMessage::Stop) | None => {
                    break;
                }
            }
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        for (_, handle) in self.senders.iter() {
            handle.join.abort();
        }
    }
}

async fn listener_loop(tx: mpsc::Sender<ServerMessage>, port: u16) {
    info!("Starting overlay listener on port {port}");
    let listener_v6 = match TcpListener::bind(("::", port)).await {
        Ok(listener) => Some(listener),
        Err(e) => {
            error!("Failed to bind to port {port}: {e:?}");
            None
        }
    };

    // Some OSs need a separate IPv4 listener and others refuse one, so this
    // is allowed to fail
    let listener_v4 = TcpListener::bind(("0.0.0.0", port)).await.ok();

    if listener_v6.is_none() && listener_v4.is_none() {
        error!("No overlay listener could be started, renderers won't be able to connect");
        return;
    }
    info!("Listener started");

    loop {
        type ListenResult = std::io::Result<(TcpStream, SocketAddr)>;

        fn create_future<'a>(
            listener: Option<&'a TcpListener>,
        ) -> Pin<Box<dyn Future<Output = ListenResult> + Send + 'a>> {
            if let Some(listener) = listener {
                Box::pin(listener.accept())
            } else {
                Box::pin(futures::future::pending())
            }
        }

        let conn = select! {
            conn = create_future(listener_v6.as_ref()) => conn,
            conn = create_future(listener_v4.as_ref()) => conn,
        };

        match conn {
            Ok((stream, addr)) => {
                info!("New overlay connection from {addr:?}");
                if tx.send(ServerMessage::NewConnection(stream)).await.is_err() {
                    info!("Update server stopped, closing listener");
                    break;
                }
            }
            Err(e) => error!("New overlay connection failed: {e:?}"),
        }
    }
}
