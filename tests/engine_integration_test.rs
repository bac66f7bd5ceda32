//! End-to-end engine scenarios against a scripted in-memory transport

mod common;

use common::{settings, write_file, Reply, ScriptedTransport};
use sheetsync::collector::FailureCategory;
use sheetsync::engine::{EngineOptions, Reconciler};
use sheetsync::mapping::MappingTable;
use sheetsync::source::{CsvRecordSource, Record, RecordSource, RowIndex, VecRecordSource};
use sheetsync::variant::Variant;
use sheetsync::writer::{CsvResultWriter, MemoryResultWriter};
use sheetsync::Error;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const PRICE_SHEET_HEADERS: &[&str] = &["pri_ref", "OTM_COST", "pricesheet_is", "transport_id"];

/// Counts how many times the engine pulled a record
struct CountingSource {
    inner: VecRecordSource,
    reads: usize,
}

impl RecordSource for CountingSource {
    fn next_record(&mut self) -> sheetsync::Result<Option<Record>> {
        self.reads += 1;
        self.inner.next_record()
    }
}

fn price_sheet_settings() -> sheetsync::config::Settings {
    settings(&[("TRANSPORT_ORDER_SUFFIX", ",3300,0")])
}

fn status_message_settings() -> sheetsync::config::Settings {
    settings(&[
        ("ENTERPRISE_OID", "5000"),
        ("EVENT_SUFFIX", "3850,0"),
        ("STATUS_MESSAGE", "X3"),
        ("TRANSPORT_ORDER_SUFFIX", ",3300,0"),
        ("SCAC", "ABCD"),
    ])
}

#[tokio::test]
async fn test_unmapped_record_fails_alone_and_rows_keep_their_order() {
    let reconciler = Reconciler::new(
        Variant::PriceSheet,
        &price_sheet_settings(),
        EngineOptions::default(),
    )
    .unwrap()
    .with_mapping(MappingTable::from_pairs([("T1", "900"), ("T3", "901")]));

    let mut source = VecRecordSource::from_rows(
        PRICE_SHEET_HEADERS,
        &[
            &["SO1", "100", "7", "T1"],
            &["SO2", "200", "7", "T2"],
            &["SO3", "300", "7", "T3"],
        ],
    );
    let transport = Arc::new(ScriptedTransport::keyed_by("oidPriceSheet"));
    let mut writer = MemoryResultWriter::default();

    let report = reconciler
        .run(&mut source, transport.clone(), &mut writer)
        .await
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.rows[1].outcome.category(), Some(FailureCategory::MappingNotFound));
    assert_eq!(transport.calls(), 2);
    assert_eq!(
        writer.lines,
        vec![
            (RowIndex(0), "SO SO1 OK".to_string()),
            (
                RowIndex(1),
                "SO SO2 Error: Mapping not found for transport_id T2".to_string()
            ),
            (RowIndex(2), "SO SO3 OK".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_missing_config_key_aborts_before_reading() {
    let mut source = CountingSource {
        inner: VecRecordSource::from_rows(PRICE_SHEET_HEADERS, &[&["SO1", "100", "7", "T1"]]),
        reads: 0,
    };
    let transport = Arc::new(ScriptedTransport::keyed_by("oidPriceSheet"));

    let result = match Reconciler::new(
        Variant::StatusMessage,
        &price_sheet_settings(),
        EngineOptions::default(),
    ) {
        Ok(reconciler) => reconciler
            .run(&mut source, transport.clone(), &mut MemoryResultWriter::default())
            .await
            .map(|_| ()),
        Err(e) => Err(e),
    };

    let err = result.unwrap_err();
    assert!(matches!(err, Error::MissingConfigKey { ref key } if key == "ENTERPRISE_OID"));
    assert_eq!(source.reads, 0);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_blank_primary_field_ends_input() {
    let reconciler = Reconciler::new(
        Variant::PriceSheet,
        &price_sheet_settings(),
        EngineOptions::default(),
    )
    .unwrap()
    .with_mapping(MappingTable::from_pairs([("T1", "900")]));

    let mut source = CountingSource {
        inner: VecRecordSource::from_rows(
            PRICE_SHEET_HEADERS,
            &[
                &["SO1", "1", "7", "T1"],
                &["SO2", "2", "7", "T1"],
                &["SO3", "3", "7", "T1"],
                &["", "4", "7", "T1"],
                &["SO5", "5", "7", "T1"],
            ],
        ),
        reads: 0,
    };
    let transport = Arc::new(ScriptedTransport::keyed_by("oidPriceSheet"));
    let mut writer = MemoryResultWriter::default();

    let report = reconciler
        .run(&mut source, transport.clone(), &mut writer)
        .await
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(source.reads, 4);
    assert_eq!(transport.calls(), 3);
    assert!(writer.lines.iter().all(|(row, _)| row.0 < 3));
}

#[tokio::test]
async fn test_reverse_completion_order_is_written_in_row_order() {
    let count = 8;
    let mut transport = ScriptedTransport::keyed_by("PRO");
    let mut rows = Vec::new();
    for i in 0..count {
        let key = format!("SO{i}");
        // Earlier rows answer later.
        let delay = Duration::from_millis(((count - i) * 15) as u64);
        transport = transport.reply(&key, delay, Reply::Status(200, "OK".to_string()));
        rows.push(vec![key, format!("{}", 700 + i), "42".to_string(), "9/3/2024 14:05".to_string()]);
    }
    let row_refs: Vec<Vec<&str>> = rows
        .iter()
        .map(|r| r.iter().map(String::as_str).collect())
        .collect();
    let row_slices: Vec<&[&str]> = row_refs.iter().map(Vec::as_slice).collect();

    let mut source = VecRecordSource::from_rows(
        &["Shipping Order", "transport_order_id", "Event Oid", "Pickup Date"],
        &row_slices,
    );
    let options = EngineOptions::for_variant(Variant::StatusMessage).with_max_in_flight(count);
    let reconciler =
        Reconciler::new(Variant::StatusMessage, &status_message_settings(), options).unwrap();
    let transport = Arc::new(transport);
    let mut writer = MemoryResultWriter::default();

    let report = reconciler
        .run(&mut source, transport.clone(), &mut writer)
        .await
        .unwrap();

    assert_eq!(report.succeeded, count);
    assert_eq!(transport.calls(), count);
    let written: Vec<usize> = writer.lines.iter().map(|(row, _)| row.0).collect();
    assert_eq!(written, (0..count).collect::<Vec<_>>());
    assert!(writer.lines.iter().all(|(_, line)| line == "200 OK"));
}

#[tokio::test]
async fn test_failing_jobs_do_not_disturb_the_rest() {
    let transport = ScriptedTransport::keyed_by("oidPriceSheet")
        .reply("13", Duration::from_millis(1), Reply::Hang)
        .reply("14", Duration::from_millis(1), Reply::Refused)
        .reply("15", Duration::from_millis(1), Reply::Status(500, "E".repeat(400)));
    let transport = Arc::new(transport);

    let rows: Vec<Vec<String>> = (10..18)
        .map(|i| vec![format!("SO{i}"), "10".to_string(), i.to_string(), "T1".to_string()])
        .collect();
    let row_refs: Vec<Vec<&str>> = rows
        .iter()
        .map(|r| r.iter().map(String::as_str).collect())
        .collect();
    let row_slices: Vec<&[&str]> = row_refs.iter().map(Vec::as_slice).collect();
    let mut source = VecRecordSource::from_rows(PRICE_SHEET_HEADERS, &row_slices);

    let options = EngineOptions::for_variant(Variant::PriceSheet)
        .with_max_in_flight(3)
        .with_call_timeout(Duration::from_millis(150));
    let reconciler = Reconciler::new(Variant::PriceSheet, &price_sheet_settings(), options)
        .unwrap()
        .with_mapping(MappingTable::from_pairs([("T1", "900")]));
    let mut writer = MemoryResultWriter::default();

    let report = reconciler
        .run(&mut source, transport, &mut writer)
        .await
        .unwrap();

    assert_eq!(report.total, 8);
    assert_eq!(report.succeeded, 5);
    let categories: Vec<_> = report.rows.iter().map(|r| r.outcome.category()).collect();
    assert_eq!(categories[3], Some(FailureCategory::Network));
    assert_eq!(categories[4], Some(FailureCategory::Network));
    assert_eq!(categories[5], Some(FailureCategory::RemoteStatus));
    assert!(writer.lines[3].1.contains("timed out"));
    assert_eq!(writer.lines[5].1, format!("SO SO15 Error: 500: {}", "E".repeat(100)));
    assert_eq!(writer.lines[7].1, "SO SO17 OK");
}

#[tokio::test]
async fn test_csv_input_is_written_back_with_status_column() {
    let dir = TempDir::new().unwrap();
    let input = write_file(
        dir.path(),
        "orders.csv",
        "pri_ref,OTM_COST,pricesheet_is,transport_order_id\n\
         SO1,100,7,555\n\
         SO2,,7,556\n\
         SO3,300,8,557\n\
         ,,,\n\
         SO9,900,9,999\n",
    );
    let output = dir.path().join("orders_updated.csv");

    let reconciler = Reconciler::new(
        Variant::PriceSheet,
        &price_sheet_settings(),
        EngineOptions::default(),
    )
    .unwrap();
    let mut source = CsvRecordSource::open(&input).unwrap();
    let transport = Arc::new(ScriptedTransport::keyed_by("oidPriceSheet"));
    let mut writer = CsvResultWriter::new(&input, &output, Variant::PriceSheet.status_column());

    reconciler
        .run(&mut source, transport.clone(), &mut writer)
        .await
        .unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        written,
        "pri_ref,OTM_COST,pricesheet_is,transport_order_id,Status\n\
         SO1,100,7,555,SO SO1 OK\n\
         SO2,,7,556,SO SO2 Error: Missing OTM_COST\n\
         SO3,300,8,557,SO SO3 OK\n\
         ,,,\n\
         SO9,900,9,999\n"
    );

    let submitted = transport.submitted();
    assert_eq!(submitted.len(), 2);
    assert!(submitted
        .iter()
        .any(|(_, body)| body.contains("sidTransport%3D%28555%2C3300%2C0%29")));
}

#[tokio::test]
async fn test_results_can_be_written_over_the_input() {
    let dir = TempDir::new().unwrap();
    let input = write_file(
        dir.path(),
        "commands.csv",
        "command,Result\nlist users,\nreindex,\n",
    );

    let reconciler = Reconciler::new(
        Variant::AdminCommand,
        &settings(&[("ENTERPRISE", "42")]),
        EngineOptions::default(),
    )
    .unwrap();
    let mut source = CsvRecordSource::open(&input).unwrap();
    let transport = Arc::new(ScriptedTransport::keyed_by("sCommandList"));
    let mut writer = CsvResultWriter::new(&input, &input, Variant::AdminCommand.status_column());

    let report = reconciler
        .run(&mut source, transport, &mut writer)
        .await
        .unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(
        std::fs::read_to_string(&input).unwrap(),
        "command,Result\n\
         list users,No message found\n\
         reindex,No message found\n"
    );
}

#[tokio::test]
async fn test_undecodable_row_fails_alone() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("commands.csv");
    std::fs::write(&input, b"command,Result\nlist users,\nbad\xff\xfe,\nreindex,\n").unwrap();
    let output = dir.path().join("commands_updated.csv");

    let reconciler = Reconciler::new(
        Variant::AdminCommand,
        &settings(&[("ENTERPRISE", "42")]),
        EngineOptions::default(),
    )
    .unwrap();
    let mut source = CsvRecordSource::open(&input).unwrap();
    let transport = Arc::new(ScriptedTransport::keyed_by("sCommandList"));
    let mut writer = CsvResultWriter::new(&input, &output, Variant::AdminCommand.status_column());

    let report = reconciler
        .run(&mut source, transport.clone(), &mut writer)
        .await
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.rows[1].outcome.category(), Some(FailureCategory::Validation));
    assert_eq!(transport.calls(), 2);

    let written = std::fs::read(&output).unwrap();
    let lines: Vec<&[u8]> = written.split(|b| *b == b'\n').collect();
    assert_eq!(lines[2], b"bad\xff\xfe,Error: Invalid UTF-8 in command".as_slice());
}

#[test]
fn test_dry_run_plan_does_not_need_a_transport() {
    let reconciler = Reconciler::new(
        Variant::SysConfig,
        &settings(&[("ENTERPRISE", "42")]),
        EngineOptions::default(),
    )
    .unwrap();
    let mut source = VecRecordSource::from_rows(
        &["page", "setting", "value"],
        &[
            &["editEnterpriseSysConMisc_process.jsp", "bAllowX", "true"],
            &["editEnterpriseSysConMisc_process.jsp", "bAllowY", ""],
        ],
    );

    let plan = reconciler.plan(&mut source).unwrap();

    assert_eq!(plan.jobs.len(), 1);
    assert_eq!(plan.jobs[0].key, "editEnterpriseSysConMisc_process.jsp:bAllowX");
    assert_eq!(plan.rejected.len(), 1);
    assert_eq!(plan.rejected[0].1.to_string(), "Error: Missing value");
}
