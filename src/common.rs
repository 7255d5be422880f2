//! 全局基础类型与错误定义

use thiserror::Error;

// ── 类型别名 ──────────────────────────────────────────────────────────────────

/// 行键在存储边界上始终是原始字节
pub type RowKey = Vec<u8>;
/// 页内行号（position）与列号（channel）
pub type Position = usize;

// ── 错误 ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SinkError {
    /// 编码期：逻辑类型无编码或值与类型不符——仅该行致命
    #[error("type is not supported: {0}")]
    UnsupportedType(String),
    /// 列名不在表描述中——描述与页不一致，整个操作致命
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    /// 表未指定行键列——配置错误，整个操作致命
    #[error("row key column is not specified for table {0}")]
    MissingRowKey(String),
    /// 行键值为 null——跳过该行，累计上报
    #[error("null row key at position {0}")]
    NullRowKey(Position),
    #[error("decode error: {0}")]
    Decode(String),
    /// 底层存储 I/O 失败
    #[error("store error: {0}")]
    Store(String),
    #[error("invalid flush threshold: {0}")]
    InvalidThreshold(usize),
    #[error("invalid table descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("page mismatch: {0}")]
    PageMismatch(String),
}

pub type Result<T> = std::result::Result<T, SinkError>;
