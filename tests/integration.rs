// End-to-end: CSV on disk → validate → write valid records → reconcile against a second export

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::TempDir;
use txn_integrity::{
    load_csv, order_level_defaults, screen_table, CollapseMode, ErrorKind, Reconciler, ReconConfig, Settings,
    SourceSpec, Validator,
};

const LEDGER: &str = "\
Order ID,transactionDate,transactionTotal,transactionSubtotal,transactionTax,transactionShippingHandling,transactionDiscount,currency,shipToCountry,shipToState,shipToZip,lineItemId,lineItemAmount,lineItemQuantity,lineItemDiscount,lineItemShippingHandling
1001,2025-01-15,118.00,100.00,8.00,15.00,5.00,usd,us,ca,94105,1001-1,100.00,1,0,0
1002,2025-01-16,200.00,100.00,8.00,15.00,5.00,USD,US,CA,94105,1002-1,100.00,1,0,0
1003,2025-01-17,54.00,50.00,4.00,0,0,JPY,US,NY,10001,1003-1,50.00,1,0,0
1004,01/18/2025,54.00,50.00,4.00,0,0,USD,US,NY,10001,1004-1,50.00,2,0,0
";

const STOREFRONT: &str = "\
Name,Shipping Province,Taxes
1001,CA,8.00
1004,NY,3.00
1005,TX,2.00
";

fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn settings() -> Settings {
    Settings::from_json(
        r#"{
            "validation": {"column_aliases": {"Order ID": "transactionId"}},
            "reconciliation": {
                "left": {"name": "ledger", "key_column": "transactionId", "metric_column": "transactionTax", "group_column": "shipToState"},
                "right": {"name": "storefront", "key_column": "Name", "metric_column": "Taxes", "group_column": "Shipping Province"}
            }
        }"#,
    )
    .unwrap()
}

#[test]
fn test_validate_file_with_aliases() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "ledger.csv", LEDGER);
    let settings = settings();

    let mut table = load_csv(&path).unwrap();
    table.rename_columns(&settings.validation.column_aliases);
    assert!(table.has_column("transactionId"));

    let outcome = Validator::with_tolerance(settings.validation.tolerance).validate_table(&table);

    assert_eq!(outcome.total(), 4);
    assert_eq!(outcome.valid.len(), 2);
    assert_eq!(outcome.invalid.len(), 2);

    let kinds: Vec<ErrorKind> = outcome.invalid.iter().map(|i| i.kind).collect();
    assert_eq!(kinds, vec![ErrorKind::TotalMismatch, ErrorKind::InvalidEnumValue]);
    assert_eq!(outcome.invalid[0].transaction_id.as_deref(), Some("1002"));

    let first = &outcome.valid[0].record;
    assert_eq!(first.ship_to_country, "US");
    assert_eq!(first.ship_to_state.as_deref(), Some("CA"));
}

const ORDERS: &str = "\
transactionId,transactionDate,transactionTotal,transactionSubtotal,transactionTax,transactionShippingHandling,transactionDiscount,currency,shipToCountry,shipToState,shipToZip
2001,2025-02-01,118.00,100.00,8.00,15.00,5.00,USD,US,CA,94105
2002,2025-02-02,54.00,50.00,4.00,0,0,USD,US,NY,10001
";

#[test]
fn test_order_level_export_validates_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "orders.csv", ORDERS);

    // Without defaults every row lacks its line-item columns
    let bare = load_csv(&path).unwrap();
    let outcome = Validator::new().validate_table(&bare);
    assert_eq!(outcome.valid.len(), 0);
    assert_eq!(outcome.invalid[0].error, "Missing required field: lineItemId");

    let mut settings = Settings::default();
    settings.validation.column_defaults = order_level_defaults();

    let mut table = load_csv(&path).unwrap();
    settings.validation.prepare(&mut table);
    let outcome = Validator::new().validate_table(&table);

    assert_eq!(outcome.valid.len(), 2);
    let record = &outcome.valid[0].record;
    assert_eq!(record.line_item_id, "2001");
    assert_eq!(record.line_item_amount, 100.0);
    assert_eq!(record.line_item_quantity, 1);
    assert_eq!(record.ship_from_country, None);
}

#[test]
fn test_screen_then_validate() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "ledger.csv", LEDGER);

    let mut table = load_csv(&path).unwrap();
    table.rename_columns(&settings().validation.column_aliases);

    let screened = screen_table(&table, 0.01);
    assert_eq!(screened.excluded.len(), 1);
    assert_eq!(screened.excluded[0].transaction_id.as_deref(), Some("1002"));

    let outcome = Validator::new().validate_table(&screened.kept);
    assert_eq!(outcome.valid.len(), 2);
    assert_eq!(outcome.invalid.len(), 1);
}

#[test]
fn test_valid_records_reconcile_against_storefront() {
    let dir = TempDir::new().unwrap();
    let ledger_path = write_file(dir.path(), "ledger.csv", LEDGER);
    let storefront_path = write_file(dir.path(), "storefront.csv", STOREFRONT);
    let settings = settings();

    // Validate and write the valid records back out as CSV
    let mut table = load_csv(&ledger_path).unwrap();
    table.rename_columns(&settings.validation.column_aliases);
    let outcome = Validator::new().validate_table(&table);

    let valid_path = dir.path().join("valid.csv");
    let mut writer = csv::Writer::from_path(&valid_path).unwrap();
    for record in outcome.records() {
        writer.serialize(record).unwrap();
    }
    writer.flush().unwrap();

    // Reconcile the written file against the storefront export
    let left = load_csv(&valid_path).unwrap();
    let right = load_csv(&storefront_path).unwrap();
    assert_eq!(left.len(), 2);

    let reconciler = Reconciler::new(settings.reconciliation().unwrap().clone()).unwrap();
    let report = reconciler.reconcile(&left, &right).unwrap();
    let d = &report.file_details;

    assert_eq!(d.matching_orders, 2);
    assert_eq!(d.missing_from_right, 0);
    assert_eq!(d.missing_from_left_keys, vec!["1005"]);
    assert_eq!(d.left_metric_total, 12.0);
    assert_eq!(d.right_metric_total, 13.0);
    assert_eq!(d.matching_metric_difference, 1.0);

    let groups: Vec<&str> = report.group_differences.iter().map(|g| g.group.as_str()).collect();
    assert_eq!(groups, vec!["TX", "NY", "CA"]);
    assert_eq!(report.group_differences[2].percentage_difference, Some(0.0));
}

#[test]
fn test_reconcile_is_deterministic() {
    let left = txn_integrity::Table::from_csv_reader(STOREFRONT.as_bytes()).unwrap();
    let right = txn_integrity::Table::from_csv_reader(STOREFRONT.as_bytes()).unwrap();

    let spec = |name: &str| SourceSpec {
        name: name.to_string(),
        key_column: "Name".to_string(),
        metric_column: "Taxes".to_string(),
        group_column: "Shipping Province".to_string(),
    };
    let config = ReconConfig {
        left: spec("a"),
        right: spec("b"),
        extra_metrics: Vec::new(),
        segments: Vec::new(),
        collapse: CollapseMode::Sum,
    };

    let reconciler = Reconciler::new(config).unwrap();
    let first = reconciler.reconcile(&left, &right).unwrap();
    let second = reconciler.reconcile(&left, &right).unwrap();

    assert_eq!(first, second);
    assert!(first.is_balanced());
    assert_eq!(left.fingerprint(), right.fingerprint());
}
