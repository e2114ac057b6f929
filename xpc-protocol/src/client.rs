//! 客户端封装
//!
//! 将传输层和编解码封装在一起，每个操作对应一次完整的调用。
//! 协议没有请求 ID，响应只能按调用顺序匹配，因此所有操作都需要 `&mut self`，
//! 同一客户端上不可能同时存在两个未完成的查询。

use tracing::debug;

use crate::codec::{decode_dataref_response, encode_command};
use crate::config::ClientConfig;
use crate::error::{ProtocolError, Result};
use crate::message::{
    validate_name, Command, ControlCommand, DataRefValue, PositionCommand, SimDataRow,
    TextCommand,
};
use crate::transport::{Transport, UdpTransport};
use crate::{HEADER_SIZE, MAX_DATAGRAM_SIZE, MAX_SIM_DATA_ROWS, SIM_DATA_ROW_SIZE};

/// X-Plane Connect 客户端
///
/// # Type Parameters
/// * `T` - 传输层类型，默认为 UDP
pub struct XPlaneClient<T = UdpTransport> {
    transport: T,
    /// 接收缓冲区
    buffer: Vec<u8>,
}

impl XPlaneClient<UdpTransport> {
    /// 按配置打开 UDP 传输并创建客户端
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let transport = UdpTransport::open(config).await?;
        Ok(Self::new(transport))
    }
}

impl<T: Transport> XPlaneClient<T> {
    /// 从传输层创建客户端
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            buffer: vec![0; MAX_DATAGRAM_SIZE],
        }
    }

    /// 访问底层传输
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 读取单个 DataRef
    pub async fn get_dataref(&mut self, name: &str) -> Result<Vec<f32>> {
        self.send_command(&Command::GetDataRef {
            name: name.to_string(),
        })
        .await?;

        let len = self.transport.recv(&mut self.buffer).await?;
        let values = decode_dataref_response(&self.buffer[..len])?;
        debug!("GETD {} -> {:?}", name, values);
        Ok(values)
    }

    /// 依次读取多个 DataRef，结果顺序与 `names` 一致
    ///
    /// 每个名称一次往返；所有名称先统一校验，任何一个非法都不会发送。
    pub async fn get_datarefs<S: AsRef<str>>(&mut self, names: &[S]) -> Result<Vec<Vec<f32>>> {
        self.ensure_open()?;
        for name in names {
            validate_name(name.as_ref())?;
        }

        let mut rows = Vec::with_capacity(names.len());
        for name in names {
            rows.push(self.get_dataref(name.as_ref()).await?);
        }
        Ok(rows)
    }

    /// 写入单个 DataRef（标量或数组）
    ///
    /// 成功只表示数据报已交给套接字，不代表模拟器已应用。
    pub async fn set_dataref(&mut self, name: &str, value: impl Into<DataRefValue>) -> Result<()> {
        self.send_command(&Command::SetDataRef {
            name: name.to_string(),
            value: value.into(),
        })
        .await
    }

    /// 按顺序写入多个 DataRef
    ///
    /// 名称与值个数不一致时返回 `ArityMismatch` 且不发送任何数据报。
    /// 批量写入不是原子的：中途发送失败时只有前一部分生效。
    pub async fn set_datarefs<S, V>(
        &mut self,
        names: &[S],
        values: impl IntoIterator<Item = V>,
    ) -> Result<()>
    where
        S: AsRef<str>,
        V: Into<DataRefValue>,
    {
        self.ensure_open()?;

        let values: Vec<DataRefValue> = values.into_iter().map(Into::into).collect();
        if names.len() != values.len() {
            return Err(ProtocolError::ArityMismatch {
                names: names.len(),
                values: values.len(),
            });
        }

        let commands = names
            .iter()
            .zip(values)
            .map(|(name, value)| {
                let command = Command::SetDataRef {
                    name: name.as_ref().to_string(),
                    value,
                };
                command.validate()?;
                Ok(command)
            })
            .collect::<Result<Vec<_>>>()?;

        for command in &commands {
            self.send_command(command).await?;
        }
        Ok(())
    }

    /// 设置飞机位置与姿态
    pub async fn set_position(&mut self, position: &PositionCommand) -> Result<()> {
        self.send_command(&Command::SetPosition(*position)).await
    }

    /// 设置操纵输入
    pub async fn set_control(&mut self, control: &ControlCommand) -> Result<()> {
        self.send_command(&Command::SetControl(*control)).await
    }

    /// 写入数据输出表
    ///
    /// 所有行必须能放进一个数据报，否则返回 `PayloadTooLarge`，由调用方分批。
    pub async fn set_sim_data(&mut self, rows: &[SimDataRow]) -> Result<()> {
        self.ensure_open()?;
        if rows.len() > MAX_SIM_DATA_ROWS {
            return Err(ProtocolError::PayloadTooLarge {
                size: HEADER_SIZE + rows.len() * SIM_DATA_ROW_SIZE,
                max: MAX_DATAGRAM_SIZE,
            });
        }
        self.send_command(&Command::SetSimData(rows.to_vec())).await
    }

    /// 在默认位置显示文本
    pub async fn set_text(&mut self, message: &str) -> Result<()> {
        self.send_command(&Command::DisplayText(TextCommand::new(message)))
            .await
    }

    /// 在指定屏幕坐标显示文本
    pub async fn set_text_at(&mut self, message: &str, x: i32, y: i32) -> Result<()> {
        self.send_command(&Command::DisplayText(TextCommand::new(message).at(x, y)))
            .await
    }

    /// 关闭连接，第二次调用返回 `ConnectionClosed`
    pub fn close(&mut self) -> Result<()> {
        self.transport.close()
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_closed()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.transport.is_closed() {
            return Err(ProtocolError::ConnectionClosed);
        }
        Ok(())
    }

    /// 编码并发送；编码失败时不会触及传输层
    async fn send_command(&mut self, command: &Command) -> Result<()> {
        self.ensure_open()?;
        let bytes = encode_command(command)?;
        debug!("Sending {} ({} bytes)", String::from_utf8_lossy(command.tag()), bytes.len());
        self.transport.send(&bytes).await
    }
}
