//! StreamChannel - peer exchange over any ordered byte stream

use std::net::SocketAddr;
use std::time::Duration;

use contracts::{ContractError, PeerChannel};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, info, instrument};

use crate::error::ProtocolError;
use crate::wire;

/// Default bound on values per message
pub const DEFAULT_MAX_VALUES: usize = 4096;

/// Peer channel over a bidirectional stream (TCP, in-memory duplex, ...)
///
/// Every exchange writes the local message and reads the peer's
/// concurrently, so both sides may send first without deadlocking.
pub struct StreamChannel<S> {
    name: String,
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    max_values: usize,
    timeout: Option<Duration>,
}

impl<S> StreamChannel<S>
where
    S: AsyncRead + AsyncWrite + Send,
{
    pub fn new(name: impl Into<String>, stream: S) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            name: name.into(),
            reader: BufReader::new(reader),
            writer,
            max_values: DEFAULT_MAX_VALUES,
            timeout: None,
        }
    }

    /// Bound on values accepted before a sentinel
    pub fn with_max_values(mut self, max_values: usize) -> Self {
        self.max_values = max_values.max(1);
        self
    }

    /// Fail an exchange that does not complete within `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl<S> PeerChannel for StreamChannel<S>
where
    S: AsyncRead + AsyncWrite + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "exchange_reliability",
        skip(self, local),
        fields(channel = %self.name, local_len = local.len())
    )]
    async fn exchange_reliability(&mut self, local: &[f64]) -> Result<Vec<f64>, ContractError> {
        let payload = wire::encode_reliability(local)?;
        let Self {
            reader,
            writer,
            max_values,
            timeout,
            ..
        } = self;
        let exchange = async {
            let ((), peer) = tokio::try_join!(
                send_all(writer, &payload, "send_reliability"),
                wire::read_reliability(reader, *max_values)
            )?;
            Ok::<_, ProtocolError>(peer)
        };
        let peer = deadline(*timeout, "exchange_reliability", exchange).await?;

        metrics::counter!("protocol_bytes_sent_total").increment(payload.len() as u64);
        debug!(peer_len = peer.len(), "reliability exchanged");
        Ok(peer)
    }

    #[instrument(
        name = "exchange_fingerprint",
        skip(self, local),
        fields(channel = %self.name, local_len = local.len())
    )]
    async fn exchange_fingerprint(&mut self, local: &[u8]) -> Result<Vec<u8>, ContractError> {
        let payload = wire::encode_fingerprint(local)?;
        let Self {
            reader,
            writer,
            max_values,
            timeout,
            ..
        } = self;
        let exchange = async {
            let ((), peer) = tokio::try_join!(
                send_all(writer, &payload, "send_fingerprint"),
                wire::read_fingerprint(reader, *max_values)
            )?;
            Ok::<_, ProtocolError>(peer)
        };
        let peer = deadline(*timeout, "exchange_fingerprint", exchange).await?;

        metrics::counter!("protocol_bytes_sent_total").increment(payload.len() as u64);
        debug!(peer_len = peer.len(), "fingerprint exchanged");
        Ok(peer)
    }
}

async fn send_all<W>(writer: &mut W, payload: &[u8], operation: &'static str) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(payload)
        .await
        .map_err(|e| ProtocolError::io(operation, e))?;
    writer
        .flush()
        .await
        .map_err(|e| ProtocolError::io(operation, e))
}

async fn deadline<T, F>(
    timeout: Option<Duration>,
    operation: &'static str,
    fut: F,
) -> Result<T, ProtocolError>
where
    F: std::future::Future<Output = Result<T, ProtocolError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| ProtocolError::Timeout {
                operation,
                millis: limit.as_millis(),
            })?,
        None => fut.await,
    }
}

impl StreamChannel<TcpStream> {
    /// Connect to a listening peer
    #[instrument(name = "stream_channel_connect", skip(addr))]
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, ContractError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ContractError::channel_io("connect", e))?;
        stream
            .set_nodelay(true)
            .map_err(|e| ContractError::channel_io("connect", e))?;
        let name = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "tcp".to_string());
        info!(peer = %name, "connected to peer");
        Ok(Self::new(name, stream))
    }
}

/// TCP listener handing out one channel per accepted peer
pub struct PeerListener {
    listener: TcpListener,
}

impl PeerListener {
    #[instrument(name = "peer_listener_bind", skip(addr))]
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, ContractError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ContractError::channel_io("bind", e))?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ContractError> {
        self.listener
            .local_addr()
            .map_err(|e| ContractError::channel_io("bind", e))
    }

    /// Wait for the next peer
    pub async fn accept(&self) -> Result<StreamChannel<TcpStream>, ContractError> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(|e| ContractError::channel_io("accept", e))?;
        stream
            .set_nodelay(true)
            .map_err(|e| ContractError::channel_io("accept", e))?;
        info!(peer = %addr, "peer connected");
        Ok(StreamChannel::new(addr.to_string(), stream))
    }
}
