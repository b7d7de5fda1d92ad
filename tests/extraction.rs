use csv_anomaly::PipelineError;
use csv_anomaly::extract::{extract_column, extract_column_pipelined};
use csv_anomaly::reader::{BatchReader, CancelToken, ReadOptions};
use csv_anomaly::types::{DataType, Field, Schema};

fn sensor_schema() -> Schema {
    Schema::new(vec![
        Field::new("sensor", DataType::Utf8),
        Field::new("reading", DataType::Float64),
        Field::new("count", DataType::Int64),
    ])
}

const SENSOR_DATA: &str = "\
sensor,reading,count
a,1.5,10
b,NULL,20
a,2.5,NULL
b,3.5,40
a,4.5,50
";

fn reader_with_capacity(input: &str, capacity: usize) -> BatchReader<&[u8]> {
    BatchReader::new(
        input.as_bytes(),
        sensor_schema(),
        ReadOptions::default().with_batch_capacity(capacity),
    )
}

#[test]
fn concatenates_batches_in_order_with_nulls() {
    // Capacity 2 forces three batches; order and validity must survive.
    let mut rdr = reader_with_capacity(SENSOR_DATA, 2);
    let col = extract_column(&mut rdr, "reading").unwrap();

    assert_eq!(col.len(), 5);
    assert_eq!(col.non_null_count(), 4);
    assert_eq!(
        col.iter().collect::<Vec<_>>(),
        vec![Some(1.5), None, Some(2.5), Some(3.5), Some(4.5)]
    );
}

#[test]
fn integer_columns_widen_to_f64() {
    let mut rdr = reader_with_capacity(SENSOR_DATA, 1024);
    let col = extract_column(&mut rdr, "count").unwrap();

    assert_eq!(
        col.iter().collect::<Vec<_>>(),
        vec![Some(10.0), Some(20.0), None, Some(40.0), Some(50.0)]
    );
}

#[test]
fn narrow_numeric_schema_types_widen_too() {
    let input = "small,precise\n1,0.5\n2,1.5\n";
    let schema = Schema::new(vec![
        Field::new("small", DataType::Int32),
        Field::new("precise", DataType::Float32),
    ]);
    let mut rdr = BatchReader::new(input.as_bytes(), schema, ReadOptions::default());

    let col = extract_column(&mut rdr, "precise").unwrap();
    assert_eq!(col.iter().collect::<Vec<_>>(), vec![Some(0.5), Some(1.5)]);
}

#[test]
fn text_column_is_a_type_mismatch() {
    let mut rdr = reader_with_capacity(SENSOR_DATA, 1024);
    let err = extract_column(&mut rdr, "sensor").unwrap_err();
    match err {
        PipelineError::TypeMismatch { column, .. } => assert_eq!(column, "sensor"),
        other => panic!("expected TypeMismatch, got {other}"),
    }
}

#[test]
fn unknown_column_is_not_found() {
    let mut rdr = reader_with_capacity(SENSOR_DATA, 1024);
    let err = extract_column(&mut rdr, "missing").unwrap_err();
    assert!(matches!(err, PipelineError::ColumnNotFound { .. }), "{err}");
}

#[test]
fn header_only_input_is_empty() {
    let mut rdr = reader_with_capacity("sensor,reading,count\n", 1024);
    let err = extract_column(&mut rdr, "reading").unwrap_err();
    assert!(matches!(err, PipelineError::EmptyInput { .. }), "{err}");
}

#[test]
fn pipelined_extraction_matches_sequential() {
    let mut seq = reader_with_capacity(SENSOR_DATA, 2);
    let sequential = extract_column(&mut seq, "reading").unwrap();

    let mut pipe = reader_with_capacity(SENSOR_DATA, 2);
    let pipelined = extract_column_pipelined(&mut pipe, "reading").unwrap();

    assert_eq!(sequential, pipelined);
}

#[test]
fn pipelined_extraction_propagates_read_errors() {
    let input = "sensor,reading,count\na,oops,1\n";
    let mut rdr = BatchReader::new(input.as_bytes(), sensor_schema(), ReadOptions::default());

    let err = extract_column_pipelined(&mut rdr, "reading").unwrap_err();
    assert!(matches!(err, PipelineError::MalformedRow { .. }), "{err}");
}

#[test]
fn pipelined_extraction_honors_cancellation() {
    let token = CancelToken::new();
    token.cancel();
    let mut rdr = BatchReader::new(
        SENSOR_DATA.as_bytes(),
        sensor_schema(),
        ReadOptions::default().with_cancel(token),
    );

    let err = extract_column_pipelined(&mut rdr, "reading").unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled), "{err}");
}
