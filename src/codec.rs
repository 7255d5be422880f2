//! 类型编解码
//!
//! 把逻辑值编/解码为存储的字节列模型（对齐存储端 `Bytes` 工具的在盘格式）：
//!
//! | 逻辑类型       | 在盘格式                                        |
//! |----------------|-------------------------------------------------|
//! | Int32          | 4 字节大端补码                                  |
//! | Int64          | 8 字节大端补码                                  |
//! | Double         | 8 字节大端 IEEE-754 位型                        |
//! | Boolean        | 4 字节大端整数 0/1（兼容已有数据，不压成 1 bit）|
//! | Timestamp      | 毫秒数，等同 Int64                              |
//! | Decimal        | 4 字节大端 scale + 最短补码大端 unscaled        |
//! | Varchar        | 原始 UTF-8，无长度前缀、无转义                  |
//! | Array<Varchar> | 元素净化后以 `\u{0002}` 连接成单个 UTF-8 串     |
//!
//! 数组编码是**有损的尽力而为**：净化器会剥掉会破坏连接符的字符（`,` 与
//! 连接符本身），解码按连接符切分、不做任何反转义。

use byteorder::{BigEndian, ByteOrder};

use crate::common::{Result, SinkError};
use crate::logical_type::{DecimalValue, LogicalType, Value};

/// 数组元素连接符：`\u{0002}`，真实数据中几乎不可能出现
pub const ARRAY_STRING_SPLITTER: char = '\u{0002}';

// ── 统一编/解码入口 ───────────────────────────────────────────────────────────

/// 按逻辑类型编码一个非空值；类型无编码或值与类型不符时返回
/// [`SinkError::UnsupportedType`]（仅该行致命，不可重试）
pub fn encode(ty: LogicalType, value: &Value) -> Result<Vec<u8>> {
    match (ty, value) {
        (LogicalType::Int32, Value::Int32(v))         => Ok(be_i32(*v)),
        (LogicalType::Int64, Value::Int64(v))         => Ok(be_i64(*v)),
        (LogicalType::Double, Value::Double(v))       => Ok(be_i64(v.to_bits() as i64)),
        (LogicalType::Boolean, Value::Boolean(v))     => Ok(be_i32(*v as i32)),
        (LogicalType::Timestamp, Value::Timestamp(v)) => Ok(be_i64(*v)),
        (LogicalType::Decimal, Value::Decimal(d))     => Ok(encode_decimal(d)),
        (LogicalType::Varchar, Value::Varchar(s))     => Ok(s.as_bytes().to_vec()),
        (LogicalType::VarcharArray, Value::Array(xs)) => Ok(encode_array(xs)),
        _ => Err(SinkError::UnsupportedType(ty.name().into())),
    }
}

/// `encode` 的逆操作；输入长度/内容非法时返回 [`SinkError::Decode`]
pub fn decode(ty: LogicalType, data: &[u8]) -> Result<Value> {
    match ty {
        LogicalType::Int32     => Ok(Value::Int32(read_i32(ty, data)?)),
        LogicalType::Int64     => Ok(Value::Int64(read_i64(ty, data)?)),
        LogicalType::Double    => Ok(Value::Double(f64::from_bits(read_i64(ty, data)? as u64))),
        LogicalType::Timestamp => Ok(Value::Timestamp(read_i64(ty, data)?)),
        LogicalType::Boolean   => match read_i32(ty, data)? {
            0 => Ok(Value::Boolean(false)),
            1 => Ok(Value::Boolean(true)),
            n => Err(SinkError::Decode(format!("boolean byte value {n}"))),
        },
        LogicalType::Decimal   => decode_decimal(data).map(Value::Decimal),
        LogicalType::Varchar   => Ok(Value::Varchar(read_utf8(ty, data)?)),
        LogicalType::VarcharArray => {
            let joined = read_utf8(ty, data)?;
            let items = if joined.is_empty() {
                Vec::new()
            } else {
                joined.split(ARRAY_STRING_SPLITTER).map(str::to_owned).collect()
            };
            Ok(Value::Array(items))
        }
    }
}

// ── 定宽整数 ──────────────────────────────────────────────────────────────────

fn be_i32(v: i32) -> Vec<u8> {
    let mut buf = [0u8; 4];
    BigEndian::write_i32(&mut buf, v);
    buf.to_vec()
}

fn be_i64(v: i64) -> Vec<u8> {
    let mut buf = [0u8; 8];
    BigEndian::write_i64(&mut buf, v);
    buf.to_vec()
}

fn read_i32(ty: LogicalType, data: &[u8]) -> Result<i32> {
    check_width(ty, data, 4)?;
    Ok(BigEndian::read_i32(data))
}

fn read_i64(ty: LogicalType, data: &[u8]) -> Result<i64> {
    check_width(ty, data, 8)?;
    Ok(BigEndian::read_i64(data))
}

fn check_width(ty: LogicalType, data: &[u8], want: usize) -> Result<()> {
    if data.len() != want {
        return Err(SinkError::Decode(format!(
            "{} expects {want} bytes, got {}", ty.name(), data.len()
        )));
    }
    Ok(())
}

fn read_utf8(ty: LogicalType, data: &[u8]) -> Result<String> {
    String::from_utf8(data.to_vec())
        .map_err(|e| SinkError::Decode(format!("{}: {e}", ty.name())))
}

// ── Decimal ───────────────────────────────────────────────────────────────────
//
// 在盘格式：[scale: i32 大端][unscaled: 最短补码大端字节]，等价于存储端
// `Bytes.toBytes(BigDecimal)` 的布局，值与 scale 双向精确往返。

fn encode_decimal(d: &DecimalValue) -> Vec<u8> {
    let mut out = be_i32(d.scale);
    out.extend_from_slice(&shrink_twos_complement(d.unscaled));
    out
}

fn decode_decimal(data: &[u8]) -> Result<DecimalValue> {
    if data.len() < 5 {
        return Err(SinkError::Decode(format!(
            "decimal expects at least 5 bytes, got {}", data.len()
        )));
    }
    let scale    = BigEndian::read_i32(&data[..4]);
    let unscaled = grow_twos_complement(&data[4..])?;
    Ok(DecimalValue::new(unscaled, scale))
}

/// 去掉冗余的符号扩展字节，至少保留 1 字节
fn shrink_twos_complement(v: i128) -> Vec<u8> {
    let full = v.to_be_bytes();
    let mut start = 0;
    while start < full.len() - 1 {
        let redundant = (full[start] == 0x00 && full[start + 1] & 0x80 == 0)
            || (full[start] == 0xFF && full[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    full[start..].to_vec()
}

/// 符号扩展回 i128
fn grow_twos_complement(data: &[u8]) -> Result<i128> {
    if data.is_empty() || data.len() > 16 {
        return Err(SinkError::Decode(format!(
            "decimal unscaled width {} out of range", data.len()
        )));
    }
    let fill = if data[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut full = [fill; 16];
    full[16 - data.len()..].copy_from_slice(data);
    Ok(i128::from_be_bytes(full))
}

// ── Array<Varchar> ────────────────────────────────────────────────────────────

fn encode_array(items: &[String]) -> Vec<u8> {
    let joined: Vec<String> = items.iter().map(|s| sanitize_element(s)).collect();
    joined.join(&ARRAY_STRING_SPLITTER.to_string()).into_bytes()
}

/// 剥掉会破坏连接符语义的字符；有损，解码端不做恢复
fn sanitize_element(s: &str) -> String {
    s.chars()
        .filter(|&c| c != ARRAY_STRING_SPLITTER && c != ',')
        .collect()
}
