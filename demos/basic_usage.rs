//! # kv-page-sink 使用案例
//!
//! 演示写路径与删除路径的完整流程：
//!
//! 1. 构建表描述（行键列 + 两个列族）
//! 2. 构建列式页（含 null 单元格与 null 行键）
//! 3. PageSink 写入内存存储，观察批次与跳行
//! 4. 校验在盘字节并解码
//! 5. DeletingPageSource 批量删除

use kv_page_sink::{
    batch::BatcherConfig,
    codec,
    common::Result,
    logical_type::{DecimalValue, LogicalType, Value},
    meta::{ColumnDescriptor, TableDescriptor},
    page::{Page, PageBuilder},
    sink::PageSink,
    source::{DeletingPageSource, PageSource},
    store::MemoryStore,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("═══════════════════════════════════════════════════════════");
    println!("   kv-page-sink 演示                                       ");
    println!("═══════════════════════════════════════════════════════════\n");

    // =========================================================================
    // 1. 表描述
    // =========================================================================
    println!("【1】构建表描述 shop:orders ...");
    let descriptor = TableDescriptor::new(
        "shop",
        "orders",
        vec![
            ColumnDescriptor::row_key(0, "order_id", LogicalType::Varchar),
            ColumnDescriptor::new(1, "amount", "f", LogicalType::Decimal),
            ColumnDescriptor::new(2, "paid", "f", LogicalType::Boolean),
            ColumnDescriptor::new(3, "tags", "g", LogicalType::VarcharArray),
        ],
    )?;
    println!("    table = {}, columns = {}\n", descriptor.qualified_name(), descriptor.num_columns());

    // =========================================================================
    // 2. 列式页：第 3 行行键为 null，会被跳过
    // =========================================================================
    println!("【2】构建列式页（4 行，其中 1 行行键为 null）...");
    let mut builder = PageBuilder::new(descriptor.num_columns());
    builder.append_row(vec![
        Value::Varchar("o-1001".into()),
        Value::Decimal(DecimalValue::new(19_999, 2)),
        Value::Boolean(true),
        Value::Array(vec!["vip".into(), "priority,rush".into()]),
    ])?;
    builder.append_row(vec![
        Value::Varchar("o-1002".into()),
        Value::Decimal(DecimalValue::new(500, 2)),
        Value::Boolean(false),
        Value::Null, // null 单元格：整体缺席，不写 null 标记
    ])?;
    builder.append_row(vec![
        Value::Null, // null 行键：跳行并计入结果
        Value::Decimal(DecimalValue::new(1, 0)),
        Value::Boolean(true),
        Value::Null,
    ])?;
    builder.append_row(vec![
        Value::Varchar("o-1004".into()),
        Value::Null,
        Value::Boolean(true),
        Value::Array(vec!["bulk".into()]),
    ])?;
    let page = builder.build();
    println!("    positions = {}, channels = {}\n", page.position_count(), page.channel_count());

    // =========================================================================
    // 3. 写入
    // =========================================================================
    println!("【3】PageSink 写入（flush 阈值 = 2）...");
    let store = MemoryStore::new();
    let mut sink = PageSink::new(&store, descriptor.clone(), BatcherConfig::new(2)?);
    let outcome = sink.write(&page)?;
    println!(
        "    rows_written = {}, skipped = {}, store_errors = {}",
        outcome.rows_written,
        outcome.row_errors.len(),
        outcome.store_errors
    );
    for (position, err) in &outcome.row_errors {
        println!("      skipped position {position}: {err}");
    }
    println!("    put batches = {:?}", store.put_call_sizes("shop:orders"));
    let _token = sink.finish();
    println!("    ✓ OK\n");

    // =========================================================================
    // 4. 在盘字节
    // =========================================================================
    println!("【4】在盘字节与解码 ...");
    let amount = store.cell("shop:orders", b"o-1001", b"f", b"amount").unwrap();
    println!(
        "    o-1001.amount = {:?} → {}",
        amount,
        codec::decode(LogicalType::Decimal, &amount)?
    );
    let tags = store.cell("shop:orders", b"o-1001", b"g", b"tags").unwrap();
    println!(
        "    o-1001.tags   = {:?} → {}（净化有损：逗号被剥掉）",
        String::from_utf8_lossy(&tags),
        codec::decode(LogicalType::VarcharArray, &tags)?
    );
    println!(
        "    o-1002 的 tags 单元格缺席：{}\n",
        store.cell("shop:orders", b"o-1002", b"g", b"tags").is_none()
    );

    // =========================================================================
    // 5. 删除
    // =========================================================================
    println!("【5】批量删除 o-1001 / o-1004 ...");
    struct NoScan;
    impl PageSource for NoScan {
        fn next_page(&mut self) -> Result<Option<Page>> {
            Ok(None)
        }
        fn completed_positions(&self) -> u64 {
            0
        }
        fn completed_bytes(&self) -> u64 {
            0
        }
        fn is_finished(&self) -> bool {
            true
        }
        fn close(&mut self) {}
    }
    let deleter = DeletingPageSource::new(NoScan, &store, &descriptor);
    deleter.delete_rows(&[b"o-1001".to_vec(), b"o-1004".to_vec()])?;
    println!(
        "    remaining rows = {:?}",
        store
            .row_keys("shop:orders")
            .iter()
            .map(|k| String::from_utf8_lossy(k).into_owned())
            .collect::<Vec<_>>()
    );
    println!("    ✓ OK");

    Ok(())
}
