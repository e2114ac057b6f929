//! 错误类型定义

use thiserror::Error;

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 主机名无法解析
    #[error("Unable to resolve hostname: {host}")]
    Resolution { host: String },

    /// 参数校验失败（端口、超时、空值序列等）
    #[error("Validation error: {0}")]
    Validation(String),

    /// DataRef 名称长度非法
    #[error("DataRef name length {len} out of range (1..={max})")]
    NameLength { len: usize, max: usize },

    /// 文本过长
    #[error("Message too long: {len} bytes (max: {max})")]
    MessageTooLong { len: usize, max: usize },

    /// 编码后的命令超过单个数据报容量
    #[error("Payload too large: {size} bytes (max: {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// 发送缓冲区为空或超限
    #[error("Invalid write size: {size} bytes (allowed: 1..={max})")]
    WriteSize { size: usize, max: usize },

    /// 读取超时
    #[error("Timed out waiting for a datagram")]
    Timeout,

    /// 响应长度与声明不符
    #[error("Malformed response: expected {expected} bytes, got {actual}")]
    MalformedResponse { expected: usize, actual: usize },

    /// 命令帧损坏（插件端解码使用）
    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    /// 未知命令标签
    #[error("Unknown command tag: {0:?}")]
    UnknownCommand([u8; 4]),

    /// 名称与值的个数不一致
    #[error("Arity mismatch: {names} names, {values} values")]
    ArityMismatch { names: usize, values: usize },

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
