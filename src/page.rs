//! 列式页（写入边界传入的一批行）
//!
//! 页按列存放：channel 对应列描述的 ordinal，position 对应行号。

use crate::common::{Result, SinkError};
use crate::logical_type::Value;

// ── Page ──────────────────────────────────────────────────────────────────────

/// 不可变列式批；由 [`PageBuilder`] 构建，所有列长度一致
#[derive(Debug, Clone)]
pub struct Page {
    columns:   Vec<Vec<Value>>,
    positions: usize,
}

impl Page {
    pub fn position_count(&self) -> usize {
        self.positions
    }

    pub fn channel_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_null(&self, channel: usize, position: usize) -> bool {
        self.columns[channel][position].is_null()
    }

    pub fn value(&self, channel: usize, position: usize) -> &Value {
        &self.columns[channel][position]
    }
}

// ── PageBuilder ───────────────────────────────────────────────────────────────

pub struct PageBuilder {
    columns: Vec<Vec<Value>>,
}

impl PageBuilder {
    pub fn new(channel_count: usize) -> Self {
        Self { columns: vec![Vec::new(); channel_count] }
    }

    /// 追加一行；`row` 的长度必须等于 channel 数
    pub fn append_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(SinkError::PageMismatch(format!(
                "row has {} cells, page has {} channels", row.len(), self.columns.len()
            )));
        }
        for (column, cell) in self.columns.iter_mut().zip(row) {
            column.push(cell);
        }
        Ok(())
    }

    pub fn build(self) -> Page {
        let positions = self.columns.first().map_or(0, Vec::len);
        Page { columns: self.columns, positions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_major_layout() {
        let mut b = PageBuilder::new(2);
        b.append_row(vec![Value::Int64(1), Value::Varchar("a".into())]).unwrap();
        b.append_row(vec![Value::Int64(2), Value::Null]).unwrap();
        let page = b.build();

        assert_eq!(page.position_count(), 2);
        assert_eq!(page.channel_count(), 2);
        assert_eq!(page.value(0, 1), &Value::Int64(2));
        assert!(page.is_null(1, 1));
        assert!(!page.is_null(1, 0));
    }

    #[test]
    fn ragged_row_rejected() {
        let mut b = PageBuilder::new(2);
        let err = b.append_row(vec![Value::Int64(1)]).unwrap_err();
        assert!(matches!(err, SinkError::PageMismatch(_)));
    }
}
