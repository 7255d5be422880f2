//! 写入管道：Page → 批量 Put
//!
//! 每次 `write` 的控制流：先校验行键列与页形状，再按行号顺序逐行——
//! 取行键 → 对每个非行键列（null 单元格整体省略，存储端绝不会收到
//! null 标记）解析列族、编码值 → 变更入批，达到阈值自动下刷；尾批在
//! 全部行处理完后下刷。
//!
//! 错误策略是内紧外松：配置校验（行键缺失、列名未知、页形状不符）
//! 立即失败；行级错误（行键为 null、类型不支持）跳过该行并累计进
//! [`WriteOutcome`]；存储 I/O 错误在管道边界捕获——记日志、计数、
//! 继续——调用方拿到尽力而为的结果而不是一次异常（单行坏数据或一次
//! 瞬时存储抖动不应打翻整条查询）。这是刻意的取舍，不是静默丢数据：
//! 错误计数随结果返回并写入日志。

use std::time::Instant;

use tracing::{debug, error, warn};

use crate::batch::{BatcherConfig, Mutation, MutationBatcher};
use crate::codec;
use crate::common::{Position, Result, SinkError};
use crate::meta::{FamilyResolver, TableDescriptor};
use crate::page::Page;
use crate::store::ConnectionFactory;

// ── 写入结果 ──────────────────────────────────────────────────────────────────

/// 一次 `write` 的显式累计结果：跳过与继续由调用方裁决，而不是只埋在
/// 日志里
#[derive(Debug, Default)]
pub struct WriteOutcome {
    /// 成功构造并入批的行数（非持久化承诺；见 crate 级并发语义）
    pub rows_written: usize,
    /// 被跳过行的 (行号, 原因)
    pub row_errors:   Vec<(Position, SinkError)>,
    /// 边界上捕获的存储 I/O 错误次数
    pub store_errors: usize,
}

impl WriteOutcome {
    pub fn error_count(&self) -> usize {
        self.row_errors.len() + self.store_errors
    }
}

// ── PageSink ──────────────────────────────────────────────────────────────────

/// 单个 split 的写入管道。内部状态（缓冲、计数）非线程安全；每个并行
/// worker 各持一个实例，互不共享。
pub struct PageSink<F: ConnectionFactory> {
    factory:    F,
    descriptor: TableDescriptor,
    resolver:   FamilyResolver,
    config:     BatcherConfig,
}

impl<F: ConnectionFactory> PageSink<F> {
    pub fn new(factory: F, descriptor: TableDescriptor, config: BatcherConfig) -> Self {
        let resolver = FamilyResolver::new(&descriptor);
        Self { factory, descriptor, resolver, config }
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    /// 写入一页。连接按本次调用作用域获取，任何退出路径上都随作用域
    /// 释放。调用返回即本页处理完成，无流式背压。
    pub fn write(&mut self, page: &Page) -> Result<WriteOutcome> {
        // 配置校验先于任何行处理
        let key_ordinal = self.descriptor.row_key_ordinal().ok_or_else(|| {
            SinkError::MissingRowKey(self.descriptor.qualified_name())
        })?;
        if page.channel_count() != self.descriptor.num_columns() {
            return Err(SinkError::PageMismatch(format!(
                "page has {} channels, table {} has {} columns",
                page.channel_count(),
                self.descriptor.qualified_name(),
                self.descriptor.num_columns()
            )));
        }

        let started = Instant::now();
        let table_name = self.descriptor.qualified_name();
        let mut outcome = WriteOutcome::default();

        let conn = match self.factory.create_connection() {
            Ok(conn) => conn,
            Err(e) => {
                error!(table = %table_name, error = %e, "create connection failed");
                outcome.store_errors += 1;
                return Ok(outcome);
            }
        };
        let table = match conn.table(&table_name) {
            Ok(table) => table,
            Err(e) => {
                error!(table = %table_name, error = %e, "open table failed");
                outcome.store_errors += 1;
                return Ok(outcome);
            }
        };

        let mut batcher = MutationBatcher::new(self.config);
        for position in 0..page.position_count() {
            let mutation = match self.build_mutation(page, key_ordinal, position) {
                Ok(m) => m,
                Err(e) if is_row_scoped(&e) => {
                    warn!(table = %table_name, position, error = %e, "row skipped");
                    outcome.row_errors.push((position, e));
                    continue;
                }
                Err(e) => return Err(e),
            };
            match batcher.append(mutation, table.as_ref()) {
                Ok(()) => outcome.rows_written += 1,
                Err(e) => {
                    error!(table = %table_name, error = %e, "batched put failed");
                    outcome.store_errors += 1;
                    outcome.rows_written += 1;
                }
            }
        }
        if let Err(e) = batcher.flush(table.as_ref()) {
            error!(table = %table_name, error = %e, "trailing flush failed");
            outcome.store_errors += 1;
        }

        debug!(
            table = %table_name,
            rows = page.position_count(),
            batches = batcher.flush_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "page written"
        );
        if !outcome.row_errors.is_empty() {
            warn!(
                table = %table_name,
                skipped = outcome.row_errors.len(),
                "rows skipped during page write"
            );
        }
        Ok(outcome)
    }

    /// 构造一行的 Put。行键值已进入 `Mutation` 本体，列循环跳过行键列。
    fn build_mutation(&self, page: &Page, key_ordinal: usize, position: usize) -> Result<Mutation> {
        if page.is_null(key_ordinal, position) {
            return Err(SinkError::NullRowKey(position));
        }
        let key_column = self.descriptor.column(key_ordinal);
        let row_key = codec::encode(key_column.logical_type, page.value(key_ordinal, position))?;

        let mut mutation = Mutation::new(row_key);
        for channel in 0..page.channel_count() {
            if channel == key_ordinal || page.is_null(channel, position) {
                continue;
            }
            let column = self.descriptor.column(channel);
            let family = self.resolver.family_of(&column.name)?;
            let value  = codec::encode(column.logical_type, page.value(channel, position))?;
            mutation.add_column(
                family.as_bytes().to_vec(),
                column.name.as_bytes().to_vec(),
                value,
            );
        }
        Ok(mutation)
    }

    /// 正常完成。返回提交令牌——提交方不需要任何附加信息，恒为空。
    pub fn finish(mut self) -> Vec<Vec<u8>> {
        self.close_session();
        Vec::new()
    }

    /// 放弃本管道。已下发的 Put 不回滚：at-least-once、无事务语义。
    pub fn abort(mut self) {
        self.close_session();
    }

    fn close_session(&mut self) {
        // 连接按 write 调用作用域获取并随作用域释放，这里无驻留资源
    }
}

/// 行级错误跳过该行继续；其余错误整个操作致命
fn is_row_scoped(e: &SinkError) -> bool {
    matches!(
        e,
        SinkError::NullRowKey(_) | SinkError::UnsupportedType(_) | SinkError::Decode(_)
    )
}
