//! # kv-page-sink
//!
//! 查询引擎连接器的写路径核心：把类型化的列式页（Page）整形为按
//! (列族, 列名) 落位、带行键的批量变更，发往排序 KV 存储；以及把
//! 不透明行标识整形为批量删除的逆路径。
//!
//! ## 整体架构
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      PageSink.write(page)                 │
//! │                                                           │
//! │   行循环（按 position 顺序）                               │
//! │     ├─ 行键提取     （descriptor.row_key_ordinal）        │
//! │     ├─ FamilyResolver（列名 → 列族，查不到立即失败）      │
//! │     ├─ codec::encode （逻辑类型 → 存储字节，穷举分派）    │
//! │     └─ MutationBatcher（有界缓冲，阈值自动下刷）          │
//! │                         │                                 │
//! │                 ConnectionFactory → Connection → Table    │
//! │                 （作用域能力句柄，按 write 调用获取/释放）│
//! │                                                           │
//! │   DeletingPageSource.delete_rows(row_ids)                 │
//! │     └─ 原始行键字节 → DeletionRequest → 一次批量 delete   │
//! │        （读路径方法透传给内层 PageSource）                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! 表/元数据发现、split 规划、谓词下推与连接池均为外部协作方，只以
//! trait / 描述对象出现。一个管道实例服务一个 split，内部状态不跨线程
//! 共享；同一 `write` 调用内的变更按行号顺序成批下发，跨实例无顺序与
//! 原子性保证——页写到一半崩溃会留下已持久化的前缀。

pub mod common;
pub mod logical_type;
pub mod codec;
pub mod meta;
pub mod page;
pub mod batch;
pub mod store;
pub mod sink;
pub mod source;
