//! 逻辑列类型与运行时值表示

use std::fmt;

// ── 逻辑类型 ──────────────────────────────────────────────────────────────────

/// 连接器支持的逻辑列类型（封闭枚举，编码按类型穷举分派）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalType {
    Int32,
    Int64,
    Double,
    /// 写入存储时占 4 字节（0/1），与已有数据的磁盘宽度保持一致
    Boolean,
    /// 自 Unix epoch 起的毫秒数，8 字节
    Timestamp,
    /// 任意精度十进制：unscaled × 10^(-scale)
    Decimal,
    Varchar,
    /// 仅支持元素类型为字符串的数组
    VarcharArray,
}

impl LogicalType {
    /// 固定编码宽度；变长类型返回 None
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Int32 | Self::Boolean               => Some(4),
            Self::Int64 | Self::Double
                        | Self::Timestamp             => Some(8),
            Self::Decimal | Self::Varchar
                          | Self::VarcharArray        => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Int32        => "int32",
            Self::Int64        => "int64",
            Self::Double       => "double",
            Self::Boolean      => "boolean",
            Self::Timestamp    => "timestamp",
            Self::Decimal      => "decimal",
            Self::Varchar      => "varchar",
            Self::VarcharArray => "array<varchar>",
        }
    }
}

// ── 十进制值 ──────────────────────────────────────────────────────────────────

/// 十进制运行时表示：`unscaled × 10^(-scale)`，编码/解码双向无精度损失
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalValue {
    pub unscaled: i128,
    pub scale:    i32,
}

impl DecimalValue {
    pub fn new(unscaled: i128, scale: i32) -> Self {
        Self { unscaled, scale }
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale <= 0 {
            // 负 scale：unscaled × 10^(-scale)，补零即可
            return write!(f, "{}{}", self.unscaled, "0".repeat(-self.scale as usize));
        }
        let sign = if self.unscaled < 0 { "-" } else { "" };
        let digits = self.unscaled.unsigned_abs().to_string();
        let scale  = self.scale as usize;
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{sign}{int}.{frac}")
        } else {
            write!(f, "{sign}0.{:0>width$}", digits, width = scale)
        }
    }
}

// ── 运行时值 ──────────────────────────────────────────────────────────────────

/// 页内单元格的运行时值
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int32(i32),
    Int64(i64),
    Double(f64),
    Boolean(bool),
    /// 毫秒时间戳
    Timestamp(i64),
    Decimal(DecimalValue),
    Varchar(String),
    Array(Vec<String>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null         => write!(f, "NULL"),
            Self::Int32(v)     => write!(f, "{v}"),
            Self::Int64(v)     => write!(f, "{v}"),
            Self::Double(v)    => write!(f, "{v}"),
            Self::Boolean(v)   => write!(f, "{v}"),
            Self::Timestamp(v) => write!(f, "{v}"),
            Self::Decimal(v)   => write!(f, "{v}"),
            Self::Varchar(s)   => write!(f, "{s}"),
            Self::Array(xs)    => write!(f, "[{}]", xs.join(",")),
        }
    }
}
