//! 删除管道与扫描透传
//!
//! 删除入口收到的行标识是**原始行键字节**，不做任何类型解释——行键在
//! 存储边界上永远是不透明字节。扫描本身由内层读管道负责，这里只做
//! 读路径方法的透传，外加 `delete_rows` 一个写能力。

use tracing::debug;

use crate::batch::DeletionRequest;
use crate::common::Result;
use crate::meta::TableDescriptor;
use crate::page::Page;
use crate::store::ConnectionFactory;

// ── 读管道抽象 ────────────────────────────────────────────────────────────────

/// 内层扫描源；由外部的 split/scan 层实现
pub trait PageSource {
    fn next_page(&mut self) -> Result<Option<Page>>;
    /// 已读取的行数
    fn completed_positions(&self) -> u64;
    /// 已读取的字节数
    fn completed_bytes(&self) -> u64;
    fn is_finished(&self) -> bool;
    fn close(&mut self);
}

// ── 删除管道 ──────────────────────────────────────────────────────────────────

/// 包装一个内层扫描源、附加整行删除能力的页源
pub struct DeletingPageSource<S: PageSource, F: ConnectionFactory> {
    inner:      S,
    factory:    F,
    table_name: String,
}

impl<S: PageSource, F: ConnectionFactory> DeletingPageSource<S, F> {
    pub fn new(inner: S, factory: F, descriptor: &TableDescriptor) -> Self {
        Self { inner, factory, table_name: descriptor.qualified_name() }
    }

    /// 按行键批量删除。空输入是 no-op（不发起任何调用，不算错误）；
    /// 非空时恰好发起一次批量 delete 调用。与写路径不同，这里的存储
    /// 错误原样上抛，调用方能区分"删除失败"。
    pub fn delete_rows(&self, row_ids: &[Vec<u8>]) -> Result<()> {
        if row_ids.is_empty() {
            return Ok(());
        }
        let conn = self.factory.create_connection()?;
        let table = conn.table(&self.table_name)?;
        let deletes: Vec<DeletionRequest> = row_ids
            .iter()
            .map(|id| DeletionRequest { row_key: id.clone() })
            .collect();
        table.delete(&deletes)?;
        debug!(table = %self.table_name, rows = deletes.len(), "rows deleted");
        Ok(())
    }

    /// 提交令牌恒为空：删除已即时生效，提交方不需要附加信息
    pub fn finish(self) -> Vec<Vec<u8>> {
        Vec::new()
    }
}

impl<S: PageSource, F: ConnectionFactory> PageSource for DeletingPageSource<S, F> {
    fn next_page(&mut self) -> Result<Option<Page>> {
        self.inner.next_page()
    }

    fn completed_positions(&self) -> u64 {
        self.inner.completed_positions()
    }

    fn completed_bytes(&self) -> u64 {
        self.inner.completed_bytes()
    }

    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    fn close(&mut self) {
        self.inner.close()
    }
}
