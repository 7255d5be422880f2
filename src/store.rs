//! 存储连接抽象与内存实现
//!
//! 连接按能力句柄建模：工厂 → 连接 → 表，全部是值，随作用域结束释放，
//! 没有进程级单例。真实部署由外部协作方实现这三个 trait；本 crate 自带的
//! [`MemoryStore`] 是排序内存实现，供测试与演示使用。

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::batch::{DeletionRequest, Mutation};
use crate::common::{Result, RowKey};

// ── 连接能力 ──────────────────────────────────────────────────────────────────

pub trait ConnectionFactory {
    /// 打开一个作用域连接；每次 write/delete 调用各取一个，不做池化
    fn create_connection(&self) -> Result<Box<dyn Connection + '_>>;
}

pub trait Connection {
    /// 以 `schema:table` 寻址物理表
    fn table<'a>(&'a self, name: &str) -> Result<Box<dyn StoreTable + 'a>>;
}

pub trait StoreTable {
    /// 一次批量 Put；批内按序应用
    fn put(&self, batch: &[Mutation]) -> Result<()>;
    /// 一次批量整行删除
    fn delete(&self, batch: &[DeletionRequest]) -> Result<()>;
}

impl<T: ConnectionFactory + ?Sized> ConnectionFactory for &T {
    fn create_connection(&self) -> Result<Box<dyn Connection + '_>> {
        (**self).create_connection()
    }
}

// ── 内存存储 ──────────────────────────────────────────────────────────────────

/// (列族, 列名) → 值
type StoredRow   = BTreeMap<(Vec<u8>, Vec<u8>), Vec<u8>>;
/// 行键字典序排序的表
type StoredTable = BTreeMap<RowKey, StoredRow>;

#[derive(Default)]
struct StoreInner {
    tables:       HashMap<String, StoredTable>,
    /// 每张表收到的 put 调用的批大小序列
    put_calls:    HashMap<String, Vec<usize>>,
    delete_calls: HashMap<String, Vec<usize>>,
}

/// 行键排序的内存 KV 存储
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(&self, table: &str, row_key: &[u8]) -> Option<StoredRow> {
        self.inner.read().unwrap().tables.get(table)?.get(row_key).cloned()
    }

    pub fn cell(&self, table: &str, row_key: &[u8], family: &[u8], qualifier: &[u8]) -> Option<Vec<u8>> {
        self.row(table, row_key)?
            .get(&(family.to_vec(), qualifier.to_vec()))
            .cloned()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.inner.read().unwrap().tables.get(table).map_or(0, BTreeMap::len)
    }

    /// 表内行键，按字典序
    pub fn row_keys(&self, table: &str) -> Vec<RowKey> {
        self.inner.read().unwrap().tables.get(table)
            .map_or_else(Vec::new, |t| t.keys().cloned().collect())
    }

    pub fn put_call_sizes(&self, table: &str) -> Vec<usize> {
        self.inner.read().unwrap().put_calls.get(table).cloned().unwrap_or_default()
    }

    pub fn delete_call_sizes(&self, table: &str) -> Vec<usize> {
        self.inner.read().unwrap().delete_calls.get(table).cloned().unwrap_or_default()
    }
}

impl ConnectionFactory for MemoryStore {
    fn create_connection(&self) -> Result<Box<dyn Connection + '_>> {
        Ok(Box::new(MemoryConnection { store: self }))
    }
}

struct MemoryConnection<'a> {
    store: &'a MemoryStore,
}

impl Connection for MemoryConnection<'_> {
    fn table<'a>(&'a self, name: &str) -> Result<Box<dyn StoreTable + 'a>> {
        Ok(Box::new(MemoryTable { store: self.store, name: name.to_owned() }))
    }
}

struct MemoryTable<'a> {
    store: &'a MemoryStore,
    name:  String,
}

impl StoreTable for MemoryTable<'_> {
    fn put(&self, batch: &[Mutation]) -> Result<()> {
        let mut inner = self.store.inner.write().unwrap();
        inner.put_calls.entry(self.name.clone()).or_default().push(batch.len());
        let table = inner.tables.entry(self.name.clone()).or_default();
        for mutation in batch {
            let row = table.entry(mutation.row_key.clone()).or_default();
            for cell in &mutation.cells {
                row.insert((cell.family.clone(), cell.qualifier.clone()), cell.value.clone());
            }
        }
        Ok(())
    }

    fn delete(&self, batch: &[DeletionRequest]) -> Result<()> {
        let mut inner = self.store.inner.write().unwrap();
        inner.delete_calls.entry(self.name.clone()).or_default().push(batch.len());
        let table = inner.tables.entry(self.name.clone()).or_default();
        for req in batch {
            table.remove(&req.row_key);
        }
        Ok(())
    }
}
