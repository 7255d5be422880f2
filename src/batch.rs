//! 变更构造与批量下刷
//!
//! 单行变更（Put / Delete）构造为不可变对象后进入有界缓冲；缓冲达到阈值
//! 自动下刷为一次批量写调用。阈值的意义：在任意大的页上压住峰值内存，
//! 同时摊薄每次 RPC 的开销。

use crate::common::{Result, RowKey, SinkError};
use crate::store::StoreTable;

/// 缺省下刷阈值（每批最多缓冲的变更条数）
pub const DEFAULT_FLUSH_THRESHOLD: usize = 10_000;

// ── 变更对象 ──────────────────────────────────────────────────────────────────

/// 单元格落位：(列族, 列名) → 值字节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub family:    Vec<u8>,
    pub qualifier: Vec<u8>,
    pub value:     Vec<u8>,
}

/// 一行的 Put 变更；追加进批后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub row_key: RowKey,
    pub cells:   Vec<Cell>,
}

impl Mutation {
    pub fn new(row_key: RowKey) -> Self {
        Self { row_key, cells: Vec::new() }
    }

    pub fn add_column(&mut self, family: Vec<u8>, qualifier: Vec<u8>, value: Vec<u8>) {
        self.cells.push(Cell { family, qualifier, value });
    }
}

/// 整行删除请求；行键是不作类型解释的原始字节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRequest {
    pub row_key: RowKey,
}

// ── 批量器配置 ────────────────────────────────────────────────────────────────

/// 下刷阈值是显式校验过的配置项，不是散落的魔法常量
#[derive(Debug, Clone, Copy)]
pub struct BatcherConfig {
    flush_threshold: usize,
}

impl BatcherConfig {
    pub fn new(flush_threshold: usize) -> Result<Self> {
        if flush_threshold == 0 {
            return Err(SinkError::InvalidThreshold(flush_threshold));
        }
        Ok(Self { flush_threshold })
    }

    pub fn flush_threshold(&self) -> usize {
        self.flush_threshold
    }
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self { flush_threshold: DEFAULT_FLUSH_THRESHOLD }
    }
}

// ── MutationBatcher ───────────────────────────────────────────────────────────

/// 有界有序缓冲。非线程安全：一个实例只属于一次写入调用。
pub struct MutationBatcher {
    buffer:      Vec<Mutation>,
    threshold:   usize,
    flush_count: u64,
}

impl MutationBatcher {
    pub fn new(config: BatcherConfig) -> Self {
        Self {
            buffer:      Vec::with_capacity(config.flush_threshold.min(DEFAULT_FLUSH_THRESHOLD)),
            threshold:   config.flush_threshold,
            flush_count: 0,
        }
    }

    /// 追加一条变更；缓冲到达阈值时立即下刷
    pub fn append(&mut self, mutation: Mutation, table: &dyn StoreTable) -> Result<()> {
        self.buffer.push(mutation);
        if self.buffer.len() >= self.threshold {
            self.flush(table)?;
        }
        Ok(())
    }

    /// 把整个缓冲作为一次批量写发给存储；无论成败缓冲都被清空
    /// （部分失败不保留半批——至多一次重放由上层决定）
    pub fn flush(&mut self, table: &dyn StoreTable) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.buffer);
        self.flush_count += 1;
        table.put(&batch)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// 已发出的批量写调用次数（含失败的调用）
    pub fn flush_count(&self) -> u64 {
        self.flush_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ConnectionFactory, MemoryStore};

    /// 任意调用都报 I/O 失败的桩表
    struct FailingTable;

    impl StoreTable for FailingTable {
        fn put(&self, _batch: &[Mutation]) -> Result<()> {
            Err(SinkError::Store("injected put failure".into()))
        }
        fn delete(&self, _batch: &[DeletionRequest]) -> Result<()> {
            Err(SinkError::Store("injected delete failure".into()))
        }
    }

    fn mutation(key: &[u8]) -> Mutation {
        let mut m = Mutation::new(key.to_vec());
        m.add_column(b"f".to_vec(), b"c".to_vec(), b"v".to_vec());
        m
    }

    #[test]
    fn zero_threshold_rejected() {
        assert!(matches!(
            BatcherConfig::new(0).unwrap_err(),
            SinkError::InvalidThreshold(0)
        ));
    }

    #[test]
    fn flushes_ceil_n_over_k_batches() {
        let store = MemoryStore::new();
        let conn = store.create_connection().unwrap();
        let table = conn.table("s:t").unwrap();

        let mut batcher = MutationBatcher::new(BatcherConfig::new(4).unwrap());
        for i in 0..10u8 {
            batcher.append(mutation(&[i]), table.as_ref()).unwrap();
        }
        batcher.flush(table.as_ref()).unwrap();

        // N=10, K=4 → ceil = 3 次调用，批大小 4/4/2
        assert_eq!(batcher.flush_count(), 3);
        assert_eq!(store.put_call_sizes("s:t"), vec![4, 4, 2]);
        assert!(batcher.is_empty());
    }

    #[test]
    fn exact_multiple_has_no_empty_trailing_flush() {
        let store = MemoryStore::new();
        let conn = store.create_connection().unwrap();
        let table = conn.table("s:t").unwrap();

        let mut batcher = MutationBatcher::new(BatcherConfig::new(5).unwrap());
        for i in 0..5u8 {
            batcher.append(mutation(&[i]), table.as_ref()).unwrap();
        }
        batcher.flush(table.as_ref()).unwrap();
        assert_eq!(batcher.flush_count(), 1);
        assert_eq!(store.put_call_sizes("s:t"), vec![5]);
    }

    #[test]
    fn buffer_cleared_even_when_put_fails() {
        let table = FailingTable;
        let mut batcher = MutationBatcher::new(BatcherConfig::default());
        batcher.append(mutation(b"k"), &table).unwrap();
        assert!(batcher.flush(&table).is_err());
        assert!(batcher.is_empty());
        assert_eq!(batcher.flush_count(), 1);
    }
}
