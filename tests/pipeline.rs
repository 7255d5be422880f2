//! 端到端：描述构建 → 页写入 → 存储校验 → 批量删除

use kv_page_sink::batch::BatcherConfig;
use kv_page_sink::codec;
use kv_page_sink::logical_type::{DecimalValue, LogicalType, Value};
use kv_page_sink::meta::{ColumnDescriptor, TableDescriptor};
use kv_page_sink::page::PageBuilder;
use kv_page_sink::sink::PageSink;
use kv_page_sink::source::{DeletingPageSource, PageSource};
use kv_page_sink::store::MemoryStore;

fn events_table() -> TableDescriptor {
    TableDescriptor::new(
        "analytics",
        "events",
        vec![
            ColumnDescriptor::row_key(0, "event_id", LogicalType::Varchar),
            ColumnDescriptor::new(1, "user_id", "base", LogicalType::Int64),
            ColumnDescriptor::new(2, "retries", "base", LogicalType::Int32),
            ColumnDescriptor::new(3, "score", "base", LogicalType::Double),
            ColumnDescriptor::new(4, "active", "base", LogicalType::Boolean),
            ColumnDescriptor::new(5, "ts", "base", LogicalType::Timestamp),
            ColumnDescriptor::new(6, "amount", "ext", LogicalType::Decimal),
            ColumnDescriptor::new(7, "tags", "ext", LogicalType::VarcharArray),
        ],
    )
    .unwrap()
}

fn full_row(id: &str) -> Vec<Value> {
    vec![
        Value::Varchar(id.into()),
        Value::Int64(42),
        Value::Int32(3),
        Value::Double(0.5),
        Value::Boolean(true),
        Value::Timestamp(1_724_544_000_000),
        Value::Decimal(DecimalValue::new(-123_456, 2)),
        Value::Array(vec!["a".into(), "b,c".into()]),
    ]
}

#[test]
fn ingest_then_delete_end_to_end() {
    let store = MemoryStore::new();
    let descriptor = events_table();

    let mut builder = PageBuilder::new(descriptor.num_columns());
    builder.append_row(full_row("e1")).unwrap();
    builder.append_row(full_row("e2")).unwrap();
    let mut nullish = full_row("e3");
    nullish[6] = Value::Null; // amount 缺席
    builder.append_row(nullish).unwrap();

    let mut sink = PageSink::new(&store, descriptor.clone(), BatcherConfig::default());
    let outcome = sink.write(&builder.build()).unwrap();
    assert_eq!(outcome.rows_written, 3);
    assert_eq!(outcome.error_count(), 0);
    assert!(sink.finish().is_empty());

    // 每种类型的在盘字节都能按 codec 解码回原值
    let table = "analytics:events";
    assert_eq!(
        codec::decode(
            LogicalType::Int64,
            &store.cell(table, b"e1", b"base", b"user_id").unwrap()
        )
        .unwrap(),
        Value::Int64(42)
    );
    assert_eq!(
        codec::decode(
            LogicalType::Boolean,
            &store.cell(table, b"e1", b"base", b"active").unwrap()
        )
        .unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(
        codec::decode(
            LogicalType::Decimal,
            &store.cell(table, b"e2", b"ext", b"amount").unwrap()
        )
        .unwrap(),
        Value::Decimal(DecimalValue::new(-123_456, 2))
    );
    // 数组有损：逗号被净化器剥掉
    assert_eq!(
        codec::decode(
            LogicalType::VarcharArray,
            &store.cell(table, b"e1", b"ext", b"tags").unwrap()
        )
        .unwrap(),
        Value::Array(vec!["a".into(), "bc".into()])
    );
    // null 单元格在存储里整体缺席
    assert!(store.cell(table, b"e3", b"ext", b"amount").is_none());
    assert_eq!(store.row_count(table), 3);

    // 删除管道：空输入 no-op，随后一次批量删除两行
    struct EmptySource;
    impl PageSource for EmptySource {
        fn next_page(&mut self) -> kv_page_sink::common::Result<Option<kv_page_sink::page::Page>> {
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

    let source = DeletingPageSource::new(EmptySource, &store, &descriptor);
    source.delete_rows(&[]).unwrap();
    assert!(store.delete_call_sizes(table).is_empty());

    source.delete_rows(&[b"e1".to_vec(), b"e3".to_vec()]).unwrap();
    assert_eq!(store.delete_call_sizes(table), vec![2]);
    assert_eq!(store.row_keys(table), vec![b"e2".to_vec()]);
}

#[test]
fn large_page_respects_flush_threshold() {
    let store = MemoryStore::new();
    let descriptor = events_table();

    let mut builder = PageBuilder::new(descriptor.num_columns());
    for i in 0..2_500 {
        builder.append_row(full_row(&format!("e{i:05}"))).unwrap();
    }

    let mut sink = PageSink::new(&store, descriptor, BatcherConfig::new(1_000).unwrap());
    let outcome = sink.write(&builder.build()).unwrap();

    assert_eq!(outcome.rows_written, 2_500);
    // ceil(2500/1000) = 3 次批量写：1000/1000/500
    assert_eq!(
        store.put_call_sizes("analytics:events"),
        vec![1_000, 1_000, 500]
    );
    assert_eq!(store.row_count("analytics:events"), 2_500);
    // 行键在存储中按字典序排列
    let keys = store.row_keys("analytics:events");
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
}
