use criterion::{Criterion, criterion_group, criterion_main};
use std::sync::Arc;
use suite_runner::core::models::{Parameters, TestConfig, TestResult};
use suite_runner::core::strategy::{
    ExecutionStrategy, ParallelStrategy, RetryStrategy, SequentialStrategy, run_one_fn,
};
use tokio::runtime::Runtime;

fn bench_strategies(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let tests: Vec<Arc<TestConfig>> = (0..64)
        .map(|i| Arc::new(TestConfig::new(format!("bench_{i}"), "noop", Parameters::new())))
        .collect();
    let run_one = run_one_fn(|_test| async { Ok(TestResult::passed()) });

    let strategies: Vec<Box<dyn ExecutionStrategy>> = vec![
        Box::new(SequentialStrategy),
        Box::new(ParallelStrategy::new(Some(8)).unwrap()),
        Box::new(RetryStrategy::new(Box::new(SequentialStrategy), 2)),
    ];

    for strategy in &strategies {
        c.bench_function(&format!("execute_64_noop/{}", strategy.name()), |b| {
            b.to_async(&rt).iter(|| async {
                let _ = strategy.execute(&tests, Arc::clone(&run_one)).await;
            });
        });
    }
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);
