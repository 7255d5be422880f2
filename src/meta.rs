//! 表与列描述元数据
//!
//! 描述由外部的元数据发现层构建，对一次写入/删除操作的生命周期内不可变。

use std::collections::HashMap;

use crate::common::{Result, SinkError};
use crate::logical_type::LogicalType;

// ── 列描述 ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    /// 表内唯一的逻辑列名
    pub name:         String,
    /// 所属列族；行键列的列族不参与落位
    pub family:       String,
    pub logical_type: LogicalType,
    /// 列在表中的序号，0..n-1 连续且唯一
    pub ordinal:      usize,
    pub row_key:      bool,
}

impl ColumnDescriptor {
    /// 构建普通列
    pub fn new(ordinal: usize, name: &str, family: &str, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(), family: family.into(),
            logical_type, ordinal, row_key: false,
        }
    }
    /// 构建行键列（family 仅占位，不用于落位）
    pub fn row_key(ordinal: usize, name: &str, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(), family: String::new(),
            logical_type, ordinal, row_key: true,
        }
    }
}

// ── 表描述 ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TableDescriptor {
    pub schema:  String,
    pub table:   String,
    /// 按 ordinal 排序存放
    columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    /// 构建并校验：ordinal 必须为 0..n-1 且唯一，行键列至多一个。
    /// 行键列缺失不在此处报错——由写入管道在首次 `write` 时报
    /// [`SinkError::MissingRowKey`]。
    pub fn new(schema: &str, table: &str, mut columns: Vec<ColumnDescriptor>) -> Result<Self> {
        columns.sort_by_key(|c| c.ordinal);
        for (i, col) in columns.iter().enumerate() {
            if col.ordinal != i {
                return Err(SinkError::InvalidDescriptor(format!(
                    "column {} has ordinal {}, expected {}", col.name, col.ordinal, i
                )));
            }
        }
        if columns.iter().filter(|c| c.row_key).count() > 1 {
            return Err(SinkError::InvalidDescriptor(format!(
                "table {schema}:{table} has more than one row key column"
            )));
        }
        let mut names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        if let Some(dup) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(SinkError::InvalidDescriptor(format!(
                "duplicate column name {}", dup[0]
            )));
        }
        Ok(Self { schema: schema.into(), table: table.into(), columns })
    }

    /// 物理表寻址名：`schema:table`
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.schema, self.table)
    }

    /// 行键列的 ordinal；表未指定行键列时为 None
    pub fn row_key_ordinal(&self) -> Option<usize> {
        self.columns.iter().position(|c| c.row_key)
    }

    pub fn column(&self, ordinal: usize) -> &ColumnDescriptor {
        &self.columns[ordinal]
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

// ── 列族落位 ──────────────────────────────────────────────────────────────────

/// 逻辑列名 → 列族。构建后只读；查不到即为调用方契约违例，立即失败，
/// 绝不静默兜底。
#[derive(Debug)]
pub struct FamilyResolver {
    families: HashMap<String, String>,
}

impl FamilyResolver {
    pub fn new(descriptor: &TableDescriptor) -> Self {
        let families = descriptor
            .columns()
            .iter()
            .filter(|c| !c.row_key)
            .map(|c| (c.name.clone(), c.family.clone()))
            .collect();
        Self { families }
    }

    pub fn family_of(&self, column_name: &str) -> Result<&str> {
        self.families
            .get(column_name)
            .map(String::as_str)
            .ok_or_else(|| SinkError::UnknownColumn(column_name.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders() -> TableDescriptor {
        TableDescriptor::new(
            "shop",
            "orders",
            vec![
                ColumnDescriptor::row_key(0, "order_id", LogicalType::Varchar),
                ColumnDescriptor::new(1, "amount", "f", LogicalType::Double),
                ColumnDescriptor::new(2, "note", "g", LogicalType::Varchar),
            ],
        )
        .unwrap()
    }

    #[test]
    fn qualified_name_and_row_key() {
        let t = orders();
        assert_eq!(t.qualified_name(), "shop:orders");
        assert_eq!(t.row_key_ordinal(), Some(0));
    }

    #[test]
    fn ordinal_gap_rejected() {
        let err = TableDescriptor::new(
            "s",
            "t",
            vec![
                ColumnDescriptor::row_key(0, "k", LogicalType::Varchar),
                ColumnDescriptor::new(2, "v", "f", LogicalType::Int64),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SinkError::InvalidDescriptor(_)));
    }

    #[test]
    fn duplicate_row_key_rejected() {
        let err = TableDescriptor::new(
            "s",
            "t",
            vec![
                ColumnDescriptor::row_key(0, "k1", LogicalType::Varchar),
                ColumnDescriptor::row_key(1, "k2", LogicalType::Varchar),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SinkError::InvalidDescriptor(_)));
    }

    #[test]
    fn duplicate_name_rejected() {
        let err = TableDescriptor::new(
            "s",
            "t",
            vec![
                ColumnDescriptor::row_key(0, "k", LogicalType::Varchar),
                ColumnDescriptor::new(1, "v", "f", LogicalType::Int64),
                ColumnDescriptor::new(2, "v", "g", LogicalType::Int64),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SinkError::InvalidDescriptor(_)));
    }

    #[test]
    fn resolver_hits_and_fails_fast() {
        let t = orders();
        let resolver = FamilyResolver::new(&t);
        assert_eq!(resolver.family_of("amount").unwrap(), "f");
        assert!(matches!(
            resolver.family_of("missing").unwrap_err(),
            SinkError::UnknownColumn(_)
        ));
    }
}
