//! 协议常量定义

/// 插件端默认监听端口
pub const DEFAULT_XPLANE_PORT: u16 = 49009;

/// 默认主机名
pub const DEFAULT_HOST: &str = "localhost";

/// 默认本地端口（0 表示由系统分配）
pub const DEFAULT_CLIENT_PORT: u16 = 0;

/// 默认读取超时（毫秒）
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

/// 单个数据报最大大小（收发两个方向）
pub const MAX_DATAGRAM_SIZE: usize = 16384;

/// DataRef 名称最大长度（字节）
pub const MAX_DREF_NAME_LEN: usize = 255;

/// 单次 DREF 写入的最大值个数
pub const MAX_DREF_VALUES: usize = 255;

/// 屏幕文本最大长度（字节）
pub const MAX_TEXT_LEN: usize = 255;

/// 表示"保持不变"的哨兵值
pub const UNCHANGED: f32 = -998.0;

/// 文本默认屏幕坐标
pub const DEFAULT_TEXT_POSITION: (i32, i32) = (-1, -1);

/// 命令头大小: 4 字节标签 + 1 字节填充
pub const HEADER_SIZE: usize = 5;

/// DATA 每行大小: 4 字节索引 + 8 个 f32
pub const SIM_DATA_ROW_SIZE: usize = 4 + 8 * 4;

/// 单个数据报最多能容纳的 DATA 行数
pub const MAX_SIM_DATA_ROWS: usize = (MAX_DATAGRAM_SIZE - HEADER_SIZE) / SIM_DATA_ROW_SIZE;
