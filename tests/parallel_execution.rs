use std::sync::{Arc, Mutex};

use rust_data_frame::execution::{
    ExecutionEngine, ExecutionEvent, ExecutionObserver, ExecutionOptions, TracingExecutionObserver,
};
use rust_data_frame::processing::{reduce, ReduceOp};
use rust_data_frame::{Frame, FrameError};
use rust_decimal::Decimal;

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl ExecutionObserver for RecordingObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        let name = match event {
            ExecutionEvent::RunStarted { operation, .. } => format!("start:{operation}"),
            ExecutionEvent::RunFinished { operation, .. } => format!("finish:{operation}"),
            ExecutionEvent::ChunkFailed { start_row } => format!("failed:{start_row}"),
            _ => return,
        };
        self.events.lock().unwrap().push(name);
    }
}

fn prices() -> Frame<String> {
    (1..=500).map(|i| format!("{}.{:02}", i, i % 100)).collect()
}

fn engine(chunk_size: usize) -> ExecutionEngine {
    ExecutionEngine::new(ExecutionOptions {
        num_threads: Some(4),
        chunk_size,
        max_in_flight_chunks: 2,
    })
    .unwrap()
}

#[test]
fn parallel_aggregates_equal_sequential_ones() {
    let frame = prices().default_scale(4);
    for chunk_size in [1, 7, 64, 1_000] {
        let engine = engine(chunk_size);
        for op in [ReduceOp::Sum, ReduceOp::Avg, ReduceOp::Count] {
            assert_eq!(
                engine.reduce(&frame, |p| p.clone(), op).unwrap(),
                reduce(&frame, |p| p.clone(), op).unwrap(),
                "chunk_size={chunk_size} op={op:?}"
            );
        }
    }
}

#[test]
fn parallel_map_keeps_input_order_and_format() {
    let frame = prices().default_scale(4);
    let lengths = engine(16).map_parallel(&frame, |p| p.len());
    assert_eq!(lengths.rows(), frame.map(|p| p.len()).rows());
    assert_eq!(lengths.number_format(), frame.number_format());
    assert_eq!(frame.map_parallel(|p| p.len()).into_vec(), lengths.into_vec());
}

#[test]
fn conversion_errors_surface_from_the_lowest_row() {
    let mut rows: Vec<String> = prices().into_vec();
    rows[120] = "n/a".into();
    rows[480] = "also bad".into();
    let frame = Frame::new(rows);

    let observer = Arc::new(RecordingObserver::default());
    let engine = engine(50).with_observer(observer.clone());
    let err = engine.sum(&frame, |p| p.clone()).unwrap_err();
    match err {
        FrameError::TypeConversion { message } => assert!(message.contains("n/a"), "{message}"),
        other => panic!("unexpected error: {other}"),
    }

    let events = observer.events.lock().unwrap().clone();
    assert_eq!(events.first().map(String::as_str), Some("start:sum"));
    assert_eq!(events.last().map(String::as_str), Some("finish:sum"));
    let mut failed: Vec<_> = events.iter().filter(|e| e.starts_with("failed:")).cloned().collect();
    failed.sort();
    assert_eq!(failed, vec!["failed:100", "failed:450"]);
}

#[test]
fn try_map_returns_first_error_by_position() {
    let frame: Frame<u32> = (0..1_000).collect();
    let engine = engine(13).with_observer(Arc::new(TracingExecutionObserver));
    let result = engine.try_map_parallel(&frame, |v| match *v {
        700 | 250 | 900 => Err(*v),
        v => Ok(v * 2),
    });
    assert_eq!(result.unwrap_err(), 250);

    let ok = engine.try_map_parallel(&frame, |v| Ok::<_, String>(v + 1)).unwrap();
    assert_eq!(ok.head().unwrap(), 1);
    assert_eq!(ok.tail().unwrap(), 1_000);
}

#[test]
fn sums_of_decimals_are_exact() {
    let frame: Frame<f64> = Frame::new(vec![0.1; 1_000]);
    let engine = engine(9);
    assert_eq!(engine.sum(&frame, |v| *v).unwrap(), Decimal::from(100));
    assert_eq!(engine.avg(&frame, |v| *v).unwrap(), Decimal::new(10, 2));
}
