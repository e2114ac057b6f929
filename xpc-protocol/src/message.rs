//! 消息类型定义

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};
use crate::{DEFAULT_TEXT_POSITION, MAX_DREF_NAME_LEN, MAX_DREF_VALUES, MAX_TEXT_LEN, UNCHANGED};

/// DataRef 写入值：单个标量或有序数组
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum DataRefValue {
    Scalar(f32),
    Array(Vec<f32>),
}

impl DataRefValue {
    /// 以切片形式访问值
    pub fn as_slice(&self) -> &[f32] {
        match self {
            DataRefValue::Scalar(v) => std::slice::from_ref(v),
            DataRefValue::Array(values) => values,
        }
    }
}

impl From<f32> for DataRefValue {
    fn from(value: f32) -> Self {
        DataRefValue::Scalar(value)
    }
}

impl From<Vec<f32>> for DataRefValue {
    fn from(values: Vec<f32>) -> Self {
        DataRefValue::Array(values)
    }
}

impl From<&[f32]> for DataRefValue {
    fn from(values: &[f32]) -> Self {
        DataRefValue::Array(values.to_vec())
    }
}

impl<const N: usize> From<[f32; N]> for DataRefValue {
    fn from(values: [f32; N]) -> Self {
        DataRefValue::Array(values.to_vec())
    }
}

/// 飞机位置与姿态（POSI）
///
/// 任意字段取 [`UNCHANGED`] 表示保持模拟器中的当前值。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PositionCommand {
    /// 飞机索引，0 为玩家飞机
    pub aircraft: u8,
    pub latitude: f32,
    pub longitude: f32,
    pub altitude: f32,
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
    pub gear: f32,
}

impl Default for PositionCommand {
    fn default() -> Self {
        Self {
            aircraft: 0,
            latitude: UNCHANGED,
            longitude: UNCHANGED,
            altitude: UNCHANGED,
            pitch: UNCHANGED,
            roll: UNCHANGED,
            yaw: UNCHANGED,
            gear: UNCHANGED,
        }
    }
}

impl PositionCommand {
    /// 从线上字段顺序的数组构造
    pub fn from_array(aircraft: u8, values: [f32; 7]) -> Self {
        let [latitude, longitude, altitude, pitch, roll, yaw, gear] = values;
        Self {
            aircraft,
            latitude,
            longitude,
            altitude,
            pitch,
            roll,
            yaw,
            gear,
        }
    }

    /// 按线上字段顺序输出
    pub fn to_array(&self) -> [f32; 7] {
        [
            self.latitude,
            self.longitude,
            self.altitude,
            self.pitch,
            self.roll,
            self.yaw,
            self.gear,
        ]
    }
}

/// 飞行操纵输入（CTRL）
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ControlCommand {
    /// 飞机索引，0 为玩家飞机
    pub aircraft: u8,
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
    pub throttle: f32,
}

impl Default for ControlCommand {
    fn default() -> Self {
        Self {
            aircraft: 0,
            pitch: UNCHANGED,
            roll: UNCHANGED,
            yaw: UNCHANGED,
            throttle: UNCHANGED,
        }
    }
}

impl ControlCommand {
    /// 玩家飞机的操纵输入
    pub fn new(pitch: f32, roll: f32, yaw: f32, throttle: f32) -> Self {
        Self {
            aircraft: 0,
            pitch,
            roll,
            yaw,
            throttle,
        }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.pitch, self.roll, self.yaw, self.throttle]
    }
}

impl From<[f32; 4]> for ControlCommand {
    fn from([pitch, roll, yaw, throttle]: [f32; 4]) -> Self {
        Self::new(pitch, roll, yaw, throttle)
    }
}

/// DATA 命令中的一行：数据组索引 + 8 个值
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SimDataRow {
    pub index: i32,
    pub values: [f32; 8],
}

impl SimDataRow {
    pub fn new(index: i32, values: [f32; 8]) -> Self {
        Self { index, values }
    }
}

/// 屏幕文本（TEXT）
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TextCommand {
    pub message: String,
    pub x: i32,
    pub y: i32,
}

impl TextCommand {
    /// 在默认位置显示文本
    pub fn new(message: impl Into<String>) -> Self {
        let (x, y) = DEFAULT_TEXT_POSITION;
        Self {
            message: message.into(),
            x,
            y,
        }
    }

    /// 指定屏幕坐标
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

/// 客户端发送给插件的命令
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Command {
    /// 写入 DataRef
    SetDataRef { name: String, value: DataRefValue },
    /// 读取 DataRef
    GetDataRef { name: String },
    /// 设置位置
    SetPosition(PositionCommand),
    /// 设置操纵输入
    SetControl(ControlCommand),
    /// 写入数据输出表
    SetSimData(Vec<SimDataRow>),
    /// 显示屏幕文本
    DisplayText(TextCommand),
}

impl Command {
    /// 校验消息内容是否符合约束
    pub fn validate(&self) -> Result<()> {
        match self {
            Command::SetDataRef { name, value } => {
                validate_name(name)?;
                let count = value.as_slice().len();
                if count == 0 {
                    return Err(ProtocolError::Validation(format!(
                        "no values given for dataref {name}"
                    )));
                }
                if count > MAX_DREF_VALUES {
                    return Err(ProtocolError::Validation(format!(
                        "{count} values for dataref {name} (max: {MAX_DREF_VALUES})"
                    )));
                }
            }
            Command::GetDataRef { name } => validate_name(name)?,
            Command::SetSimData(rows) => {
                if rows.is_empty() {
                    return Err(ProtocolError::Validation("no sim data rows given".into()));
                }
            }
            Command::DisplayText(text) => {
                if text.message.len() > MAX_TEXT_LEN {
                    return Err(ProtocolError::MessageTooLong {
                        len: text.message.len(),
                        max: MAX_TEXT_LEN,
                    });
                }
            }
            Command::SetPosition(_) | Command::SetControl(_) => {}
        }
        Ok(())
    }

    /// 命令标签
    pub fn tag(&self) -> &'static [u8; 4] {
        match self {
            Command::SetDataRef { .. } => b"DREF",
            Command::GetDataRef { .. } => b"GETD",
            Command::SetPosition(_) => b"POSI",
            Command::SetControl(_) => b"CTRL",
            Command::SetSimData(_) => b"DATA",
            Command::DisplayText(_) => b"TEXT",
        }
    }
}

/// 校验 DataRef 名称长度（按 UTF-8 字节计）
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_DREF_NAME_LEN {
        return Err(ProtocolError::NameLength {
            len: name.len(),
            max: MAX_DREF_NAME_LEN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_empty() {
        let cmd = Command::GetDataRef {
            name: String::new(),
        };
        assert!(matches!(
            cmd.validate(),
            Err(ProtocolError::NameLength { len: 0, .. })
        ));
    }

    #[test]
    fn test_validate_name_too_long() {
        let cmd = Command::SetDataRef {
            name: "a".repeat(MAX_DREF_NAME_LEN + 1),
            value: 1.0f32.into(),
        };
        assert!(matches!(
            cmd.validate(),
            Err(ProtocolError::NameLength { len: 256, .. })
        ));
    }

    #[test]
    fn test_validate_name_max_ok() {
        let cmd = Command::GetDataRef {
            name: "a".repeat(MAX_DREF_NAME_LEN),
        };
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_values() {
        let cmd = Command::SetDataRef {
            name: "sim/x".to_string(),
            value: Vec::<f32>::new().into(),
        };
        assert!(matches!(cmd.validate(), Err(ProtocolError::Validation(_))));
    }

    #[test]
    fn test_validate_too_many_values() {
        let cmd = Command::SetDataRef {
            name: "sim/x".to_string(),
            value: vec![0.0f32; MAX_DREF_VALUES + 1].into(),
        };
        assert!(matches!(cmd.validate(), Err(ProtocolError::Validation(_))));
    }

    #[test]
    fn test_validate_empty_sim_data() {
        let cmd = Command::SetSimData(Vec::new());
        assert!(matches!(cmd.validate(), Err(ProtocolError::Validation(_))));
    }

    #[test]
    fn test_validate_text_too_long() {
        let cmd = Command::DisplayText(TextCommand::new("x".repeat(MAX_TEXT_LEN + 1)));
        assert!(matches!(
            cmd.validate(),
            Err(ProtocolError::MessageTooLong { .. })
        ));
    }

    #[test]
    fn test_position_default_is_unchanged() {
        let posi = PositionCommand::default();
        assert_eq!(posi.aircraft, 0);
        assert!(posi.to_array().iter().all(|v| *v == UNCHANGED));
    }

    #[test]
    fn test_position_array_order() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let posi = PositionCommand::from_array(2, values);
        assert_eq!(posi.altitude, 3.0);
        assert_eq!(posi.gear, 7.0);
        assert_eq!(posi.to_array(), values);
    }

    #[test]
    fn test_text_default_position() {
        let text = TextCommand::new("hello");
        assert_eq!((text.x, text.y), (-1, -1));
        let text = text.at(200, 400);
        assert_eq!((text.x, text.y), (200, 400));
    }

    #[test]
    fn test_scalar_as_slice() {
        assert_eq!(DataRefValue::from(2.5f32).as_slice(), &[2.5]);
        assert_eq!(DataRefValue::from([1.0f32, 2.0]).as_slice(), &[1.0, 2.0]);
    }
}
