//! 客户端配置

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};
use crate::{DEFAULT_CLIENT_PORT, DEFAULT_HOST, DEFAULT_TIMEOUT_MS, DEFAULT_XPLANE_PORT};

/// 客户端配置
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// 运行 X-Plane 的主机名或 IP
    pub host: String,
    /// 插件监听端口
    pub remote_port: u16,
    /// 本地绑定端口，0 表示由系统分配
    pub local_port: u16,
    /// 读取超时（毫秒），0 表示只检查一次已到达的数据报
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            remote_port: DEFAULT_XPLANE_PORT,
            local_port: DEFAULT_CLIENT_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    /// 指定主机，其余使用默认值
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// 从未经校验的整数参数构造
    ///
    /// 端口须在 0..=65535 内，超时不能为负。
    pub fn checked(
        host: impl Into<String>,
        remote_port: i64,
        local_port: i64,
        timeout_ms: i64,
    ) -> Result<Self> {
        let remote_port = u16::try_from(remote_port).map_err(|_| {
            ProtocolError::Validation(format!("invalid X-Plane port: {remote_port}"))
        })?;
        let local_port = u16::try_from(local_port).map_err(|_| {
            ProtocolError::Validation(format!("invalid client port: {local_port}"))
        })?;
        let timeout_ms = u64::try_from(timeout_ms).map_err(|_| {
            ProtocolError::Validation(format!("timeout must be non-negative: {timeout_ms}"))
        })?;

        Ok(Self {
            host: host.into(),
            remote_port,
            local_port,
            timeout_ms,
        })
    }

    pub fn with_remote_port(mut self, port: u16) -> Self {
        self.remote_port = port;
        self
    }

    pub fn with_local_port(mut self, port: u16) -> Self {
        self.local_port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// 读取超时 Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.remote_port, 49009);
        assert_eq!(config.local_port, 0);
        assert_eq!(config.timeout(), Duration::from_millis(100));
    }

    #[test]
    fn test_checked_ok() {
        let config = ClientConfig::checked("127.0.0.1", 65535, 0, 0).unwrap();
        assert_eq!(config.remote_port, 65535);
        assert_eq!(config.timeout(), Duration::ZERO);
    }

    #[test]
    fn test_checked_rejects_bad_ports() {
        for (remote, local) in [(-1, 0), (65536, 0), (49009, -1), (49009, 70000)] {
            let err = ClientConfig::checked("localhost", remote, local, 100).unwrap_err();
            assert!(matches!(err, ProtocolError::Validation(_)));
        }
    }

    #[test]
    fn test_checked_rejects_negative_timeout() {
        let err = ClientConfig::checked("localhost", 49009, 0, -1).unwrap_err();
        assert!(matches!(err, ProtocolError::Validation(_)));
    }

    #[test]
    fn test_builders() {
        let config = ClientConfig::new("10.0.0.2")
            .with_remote_port(49010)
            .with_local_port(49011)
            .with_timeout(Duration::from_secs(2));
        assert_eq!(config.host, "10.0.0.2");
        assert_eq!(config.remote_port, 49010);
        assert_eq!(config.local_port, 49011);
        assert_eq!(config.timeout_ms, 2000);
    }
}
