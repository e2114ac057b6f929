//! 数据报编解码
//!
//! 命令格式（所有整数与浮点数均为小端序）:
//! ```text
//! ┌──────────────┬─────────┬──────────────────────────────────────┐
//! │  Tag (4B)    │ Pad(1B) │              Payload                 │
//! │  ASCII       │   0x00  │         按命令类型各不相同           │
//! └──────────────┴─────────┴──────────────────────────────────────┘
//! DREF: u8 nameLen, name, u8 valueCount, valueCount × f32
//! GETD: u8 nameLen, name
//! POSI: u8 aircraft, 7 × f32
//! CTRL: u8 aircraft, 4 × f32
//! DATA: 重复行 { i32 index, 8 × f32 }
//! TEXT: i32 x, i32 y, u8 msgLen, msg
//! ```
//!
//! GETD 的响应没有标签: `u8 rowLength, rowLength × f32`。

use crate::error::{ProtocolError, Result};
use crate::message::{
    Command, ControlCommand, DataRefValue, PositionCommand, SimDataRow, TextCommand,
};
use crate::{HEADER_SIZE, MAX_DATAGRAM_SIZE, MAX_DREF_VALUES, SIM_DATA_ROW_SIZE};

/// 数据报写入器
///
/// 在内存中按字段顺序拼装一个数据报。
struct DatagramWriter {
    buffer: Vec<u8>,
}

impl DatagramWriter {
    fn with_tag(tag: &[u8; 4]) -> Self {
        let mut buffer = Vec::with_capacity(64);
        buffer.extend_from_slice(tag);
        buffer.push(0);
        Self { buffer }
    }

    fn u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    fn i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    fn f32s(&mut self, values: &[f32]) {
        for value in values {
            self.buffer.extend_from_slice(&value.to_le_bytes());
        }
    }

    /// 写入 u8 长度前缀及字节串（调用方保证长度 <= 255）
    fn short_bytes(&mut self, bytes: &[u8]) {
        self.u8(bytes.len() as u8);
        self.buffer.extend_from_slice(bytes);
    }

    fn finish(self) -> Result<Vec<u8>> {
        if self.buffer.len() > MAX_DATAGRAM_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: self.buffer.len(),
                max: MAX_DATAGRAM_SIZE,
            });
        }
        Ok(self.buffer)
    }
}

/// 数据报读取器
struct DatagramReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DatagramReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(ProtocolError::MalformedCommand(format!(
                "need {len} bytes at offset {}, only {} left",
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    fn i32(&mut self) -> Result<i32> {
        let b = self.bytes(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn f32(&mut self) -> Result<f32> {
        let b = self.bytes(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn f32_array<const N: usize>(&mut self) -> Result<[f32; N]> {
        let mut values = [0.0; N];
        for value in values.iter_mut() {
            *value = self.f32()?;
        }
        Ok(values)
    }

    fn short_string(&mut self) -> Result<String> {
        let len = self.u8()? as usize;
        let bytes = self.bytes(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ProtocolError::MalformedCommand(format!("invalid UTF-8: {e}")))
    }

    fn expect_end(&self) -> Result<()> {
        if self.remaining() != 0 {
            return Err(ProtocolError::MalformedCommand(format!(
                "{} trailing bytes",
                self.remaining()
            )));
        }
        Ok(())
    }
}

/// 校验并编码一条命令
///
/// 超过 [`MAX_DATAGRAM_SIZE`] 的命令返回 `PayloadTooLarge`，不会产生任何发送。
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    command.validate()?;

    let mut writer = DatagramWriter::with_tag(command.tag());
    match command {
        Command::SetDataRef { name, value } => {
            let values = value.as_slice();
            writer.short_bytes(name.as_bytes());
            writer.u8(values.len() as u8);
            writer.f32s(values);
        }
        Command::GetDataRef { name } => {
            writer.short_bytes(name.as_bytes());
        }
        Command::SetPosition(posi) => {
            writer.u8(posi.aircraft);
            writer.f32s(&posi.to_array());
        }
        Command::SetControl(ctrl) => {
            writer.u8(ctrl.aircraft);
            writer.f32s(&ctrl.to_array());
        }
        Command::SetSimData(rows) => {
            // 先按行数估算，避免为超大输入分配内存
            let size = HEADER_SIZE + rows.len() * SIM_DATA_ROW_SIZE;
            if size > MAX_DATAGRAM_SIZE {
                return Err(ProtocolError::PayloadTooLarge {
                    size,
                    max: MAX_DATAGRAM_SIZE,
                });
            }
            for row in rows {
                writer.i32(row.index);
                writer.f32s(&row.values);
            }
        }
        Command::DisplayText(text) => {
            writer.i32(text.x);
            writer.i32(text.y);
            writer.short_bytes(text.message.as_bytes());
        }
    }
    writer.finish()
}

/// 解码 GETD 响应
///
/// 只信任声明的行长度；末尾多余的字节被忽略。
pub fn decode_dataref_response(data: &[u8]) -> Result<Vec<f32>> {
    let Some((&row_length, payload)) = data.split_first() else {
        return Err(ProtocolError::MalformedResponse {
            expected: 1,
            actual: 0,
        });
    };

    let expected = row_length as usize * 4;
    if payload.len() < expected {
        return Err(ProtocolError::MalformedResponse {
            expected: 1 + expected,
            actual: data.len(),
        });
    }

    Ok(payload[..expected]
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// 编码 GETD 响应（插件端）
pub fn encode_dataref_response(values: &[f32]) -> Result<Vec<u8>> {
    if values.len() > MAX_DREF_VALUES {
        return Err(ProtocolError::Validation(format!(
            "{} values in response (max: {MAX_DREF_VALUES})",
            values.len()
        )));
    }
    let mut buffer = Vec::with_capacity(1 + values.len() * 4);
    buffer.push(values.len() as u8);
    for value in values {
        buffer.extend_from_slice(&value.to_le_bytes());
    }
    Ok(buffer)
}

/// 解码一条命令（插件端）
pub fn decode_command(data: &[u8]) -> Result<Command> {
    let mut reader = DatagramReader::new(data);
    let header = reader.bytes(HEADER_SIZE)?;
    let tag = [header[0], header[1], header[2], header[3]];

    let command = match &tag {
        b"DREF" => {
            let name = reader.short_string()?;
            let count = reader.u8()? as usize;
            let values = (0..count)
                .map(|_| reader.f32())
                .collect::<Result<Vec<_>>>()?;
            let value = match values.as_slice() {
                [single] => DataRefValue::Scalar(*single),
                _ => DataRefValue::Array(values),
            };
            Command::SetDataRef { name, value }
        }
        b"GETD" => Command::GetDataRef {
            name: reader.short_string()?,
        },
        b"POSI" => {
            let aircraft = reader.u8()?;
            Command::SetPosition(PositionCommand::from_array(aircraft, reader.f32_array()?))
        }
        b"CTRL" => {
            let aircraft = reader.u8()?;
            let [pitch, roll, yaw, throttle] = reader.f32_array()?;
            Command::SetControl(ControlCommand {
                aircraft,
                pitch,
                roll,
                yaw,
                throttle,
            })
        }
        b"DATA" => {
            if reader.remaining() == 0 {
                return Err(ProtocolError::MalformedCommand("DATA without rows".into()));
            }
            if reader.remaining() % SIM_DATA_ROW_SIZE != 0 {
                return Err(ProtocolError::MalformedCommand(format!(
                    "DATA payload of {} bytes is not a whole number of rows",
                    reader.remaining()
                )));
            }
            let mut rows = Vec::with_capacity(reader.remaining() / SIM_DATA_ROW_SIZE);
            while reader.remaining() > 0 {
                let index = reader.i32()?;
                rows.push(SimDataRow::new(index, reader.f32_array()?));
            }
            Command::SetSimData(rows)
        }
        b"TEXT" => {
            let x = reader.i32()?;
            let y = reader.i32()?;
            let message = reader.short_string()?;
            Command::DisplayText(TextCommand::new(message).at(x, y))
        }
        _ => return Err(ProtocolError::UnknownCommand(tag)),
    };

    reader.expect_end()?;
    Ok(command)
}
