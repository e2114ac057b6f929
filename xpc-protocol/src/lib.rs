//! X-Plane Connect 协议库
//!
//! 包含:
//! - 命令类型定义 (Command 及各命令结构)
//! - 数据报编解码 (Codec)
//! - 传输层抽象 (Transport trait, UDP 实现)
//! - 客户端封装 (XPlaneClient)

mod message;
mod constants;
mod config;
mod transport;
mod codec;
mod client;
mod error;

pub use message::{
    validate_name, Command, ControlCommand, DataRefValue, PositionCommand, SimDataRow,
    TextCommand,
};
pub use constants::*;
pub use config::ClientConfig;
pub use transport::{Transport, UdpTransport};
pub use codec::{decode_command, decode_dataref_response, encode_command, encode_dataref_response};
pub use client::XPlaneClient;
pub use error::{ProtocolError, Result};
