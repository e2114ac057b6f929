//! 传输层抽象
//!
//! 提供 Transport trait 使客户端与具体套接字实现解耦，
//! 测试中可以替换为记录发送内容的内存实现。

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::{lookup_host, UdpSocket};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ProtocolError, Result};
use crate::MAX_DATAGRAM_SIZE;

/// 数据报传输抽象 trait
///
/// 每次 `send` 对应一个数据报，每次 `recv` 读取一个数据报。
/// 不提供送达保证，也不做重传。
pub trait Transport: Send {
    /// 发送一个数据报
    ///
    /// 空数据或超过 [`MAX_DATAGRAM_SIZE`] 返回 `WriteSize`。
    fn send(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// 接收一个数据报，返回写入 `buf` 的字节数
    ///
    /// 超时返回 `Timeout`，之后仍可继续使用。
    fn recv(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize>> + Send;

    /// 关闭传输，第二次调用返回 `ConnectionClosed`
    fn close(&mut self) -> Result<()>;

    /// 是否已关闭
    fn is_closed(&self) -> bool;
}

/// 校验发送缓冲区大小
pub(crate) fn check_write_size(data: &[u8]) -> Result<()> {
    if data.is_empty() || data.len() > MAX_DATAGRAM_SIZE {
        return Err(ProtocolError::WriteSize {
            size: data.len(),
            max: MAX_DATAGRAM_SIZE,
        });
    }
    Ok(())
}

// ============================================================================
// UDP 实现
// ============================================================================

/// UDP 传输实现
#[derive(Debug)]
pub struct UdpTransport {
    /// 关闭后为 None
    socket: Option<UdpSocket>,
    remote: SocketAddr,
    read_timeout: Duration,
}

impl UdpTransport {
    /// 解析主机并在 `0.0.0.0:local_port` 上绑定
    pub async fn open(config: &ClientConfig) -> Result<Self> {
        let remote = resolve(&config.host, config.remote_port).await?;

        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, config.local_port))
            .await
            .map_err(ProtocolError::Io)?;

        info!(
            "UDP transport bound on {} -> {}",
            socket.local_addr()?,
            remote
        );

        Ok(Self {
            socket: Some(socket),
            remote,
            read_timeout: config.timeout(),
        })
    }

    /// 获取本地绑定地址
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket()?.local_addr()?)
    }

    /// 插件端地址
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    fn socket(&self) -> Result<&UdpSocket> {
        self.socket.as_ref().ok_or(ProtocolError::ConnectionClosed)
    }
}

impl Transport for UdpTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let socket = self.socket()?;
        check_write_size(data)?;

        socket.send_to(data, self.remote).await?;
        debug!("Sent {} bytes to {}", data.len(), self.remote);
        Ok(())
    }

    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        let socket = self.socket()?;

        match timeout(self.read_timeout, socket.recv_from(buf)).await {
            Ok(result) => {
                let (len, peer) = result?;
                debug!("Received {} bytes from {}", len, peer);
                Ok(len)
            }
            Err(_) => {
                warn!("No datagram within {:?}", self.read_timeout);
                Err(ProtocolError::Timeout)
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        match self.socket.take() {
            Some(socket) => {
                drop(socket);
                info!("UDP transport to {} closed", self.remote);
                Ok(())
            }
            None => Err(ProtocolError::ConnectionClosed),
        }
    }

    fn is_closed(&self) -> bool {
        self.socket.is_none()
    }
}

/// 解析为 IPv4 地址（本地套接字绑定在 IPv4 上）
async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let unresolved = || ProtocolError::Resolution {
        host: host.to_string(),
    };

    lookup_host((host, port))
        .await
        .map_err(|_| unresolved())?
        .find(SocketAddr::is_ipv4)
        .ok_or_else(unresolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn peer_and_transport(timeout_ms: u64) -> (UdpSocket, UdpTransport) {
        let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = ClientConfig::new("127.0.0.1")
            .with_remote_port(peer.local_addr().unwrap().port())
            .with_timeout(Duration::from_millis(timeout_ms));
        let transport = UdpTransport::open(&config).await.unwrap();
        (peer, transport)
    }

    #[tokio::test]
    async fn test_open_assigns_local_port() {
        let (peer, transport) = peer_and_transport(100).await;
        assert!(transport.local_addr().unwrap().port() > 0);
        assert_eq!(transport.remote_addr(), peer.local_addr().unwrap());
    }

    #[tokio::test]
    async fn test_open_resolves_localhost() {
        let config = ClientConfig::new("localhost").with_remote_port(49009);
        let transport = UdpTransport::open(&config).await.unwrap();
        assert!(transport.remote_addr().ip().is_loopback());
    }

    #[tokio::test]
    async fn test_open_unresolvable_host() {
        let config = ClientConfig::new("no-such-host.invalid");
        let err = UdpTransport::open(&config).await.unwrap_err();
        assert!(matches!(err, ProtocolError::Resolution { .. }));
    }

    #[tokio::test]
    async fn test_send_and_recv() {
        let (peer, mut transport) = peer_and_transport(1000).await;

        transport.send(b"ping").await.unwrap();
        let mut buf = [0u8; 16];
        let (len, from) = peer.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"ping");

        peer.send_to(b"pong", from).await.unwrap();
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        let len = transport.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"pong");
    }

    #[tokio::test]
    async fn test_write_size_limits() {
        let (_peer, mut transport) = peer_and_transport(100).await;

        let err = transport.send(&[]).await.unwrap_err();
        assert!(matches!(err, ProtocolError::WriteSize { size: 0, .. }));

        let oversized = vec![0u8; MAX_DATAGRAM_SIZE + 1];
        let err = transport.send(&oversized).await.unwrap_err();
        assert!(matches!(err, ProtocolError::WriteSize { .. }));
    }

    #[tokio::test]
    async fn test_recv_timeout_then_recover() {
        let (peer, mut transport) = peer_and_transport(50).await;
        let mut buf = [0u8; 64];

        let err = transport.recv(&mut buf).await.unwrap_err();
        assert!(matches!(err, ProtocolError::Timeout));

        let local = transport.local_addr().unwrap();
        peer.send_to(b"late", ("127.0.0.1", local.port()))
            .await
            .unwrap();
        let len = transport.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"late");
    }

    #[tokio::test]
    async fn test_zero_timeout_polls_once() {
        let (peer, mut transport) = peer_and_transport(0).await;
        let local = transport.local_addr().unwrap();

        peer.send_to(b"queued", ("127.0.0.1", local.port()))
            .await
            .unwrap();
        // 让 IO 驱动先登记可读事件
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut buf = [0u8; 64];
        let len = transport.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"queued");

        let err = transport.recv(&mut buf).await.unwrap_err();
        assert!(matches!(err, ProtocolError::Timeout));
    }

    #[tokio::test]
    async fn test_close_twice() {
        let (_peer, mut transport) = peer_and_transport(100).await;

        assert!(transport.close().is_ok());
        assert!(transport.is_closed());
        assert!(matches!(
            transport.close(),
            Err(ProtocolError::ConnectionClosed)
        ));

        let err = transport.send(b"x").await.unwrap_err();
        assert!(matches!(err, ProtocolError::ConnectionClosed));
        let mut buf = [0u8; 8];
        let err = transport.recv(&mut buf).await.unwrap_err();
        assert!(matches!(err, ProtocolError::ConnectionClosed));
    }
}
