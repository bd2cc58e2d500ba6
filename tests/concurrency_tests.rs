//! # Concurrency Tests using Loom
//!
//! loom cannot instrument tokio tasks or `CancellationToken`, so these models
//! restate the two disciplines the parallel strategy and the orchestrator rely
//! on with loom primitives:
//!
//! - workers report `(index, result)` over a completion channel and a single
//!   collector writes `slots[index]`, so results line up with the input in
//!   every completion order;
//! - a test checks the cancellation flag before it starts and again when it
//!   finishes (the biased `select!`), so it ends with exactly one outcome.
//!
//! loom 无法检测 tokio 任务或 `CancellationToken`，因此这些模型使用 loom 原语
//! 重述并行策略与编排器所依赖的两条并发约束。

#[cfg(test)]
mod tests {
    use loom::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use loom::sync::{Arc, mpsc};
    use loom::thread;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Outcome {
        Passed(usize),
        Skipped,
    }

    /// Runs `model` on a thread with a larger stack, as loom's exploration
    /// can overflow the default one.
    fn run_model<F>(model: F)
    where
        F: Fn() + Sync + Send + 'static,
    {
        const STACK_SIZE: usize = 8 * 1024 * 1024; // 8 MB

        let handle = std::thread::Builder::new()
            .name("loom-test-thread".into())
            .stack_size(STACK_SIZE)
            .spawn(move || loom::model(model))
            .unwrap();

        handle.join().unwrap();
    }

    /// One test attempt as the orchestrator runs it: skip when already
    /// cancelled, otherwise run and let a cancellation observed at the end win.
    fn attempt(index: usize, cancelled: &AtomicBool, runs: &AtomicUsize) -> Outcome {
        if cancelled.load(Ordering::Acquire) {
            return Outcome::Skipped;
        }
        runs.fetch_add(1, Ordering::Relaxed);
        if cancelled.load(Ordering::Acquire) {
            Outcome::Skipped
        } else {
            Outcome::Passed(index)
        }
    }

    /// Completions arrive in any order, but the collector's indexed writes
    /// always reproduce the input order with every slot filled once.
    ///
    /// 完成顺序任意，但收集器按索引写入总能还原输入顺序，且每个槽只写一次。
    #[test]
    fn test_indexed_completions_keep_input_order() {
        run_model(|| {
            const NUM_TESTS: usize = 3;
            let (tx, rx) = mpsc::channel();

            let handles: Vec<_> = (0..NUM_TESTS)
                .map(|index| {
                    let tx = tx.clone();
                    thread::spawn(move || tx.send((index, Outcome::Passed(index))).unwrap())
                })
                .collect();
            drop(tx);

            let mut slots: Vec<Option<Outcome>> = vec![None; NUM_TESTS];
            for _ in 0..NUM_TESTS {
                let (index, outcome) = rx.recv().unwrap();
                assert!(slots[index].is_none(), "slot {index} written twice");
                slots[index] = Some(outcome);
            }
            for handle in handles {
                handle.join().unwrap();
            }

            for (index, slot) in slots.iter().enumerate() {
                assert_eq!(*slot, Some(Outcome::Passed(index)));
            }
        });
    }

    /// A cancellation racing two workers leaves each test with exactly one
    /// outcome, and a skipped test never reports success.
    ///
    /// 与两个工作者竞争的取消操作使每个测试恰好有一个结果，且被跳过的测试不会报告成功。
    #[test]
    fn test_cancellation_race_gives_each_test_one_outcome() {
        run_model(|| {
            let cancelled = Arc::new(AtomicBool::new(false));
            let runs = Arc::new(AtomicUsize::new(0));
            let (tx, rx) = mpsc::channel();

            let canceller = {
                let cancelled = cancelled.clone();
                thread::spawn(move || cancelled.store(true, Ordering::Release))
            };
            let workers: Vec<_> = (0..2)
                .map(|index| {
                    let (cancelled, runs, tx) = (cancelled.clone(), runs.clone(), tx.clone());
                    thread::spawn(move || {
                        tx.send((index, attempt(index, &cancelled, &runs))).unwrap()
                    })
                })
                .collect();
            drop(tx);

            let mut slots = [None, None];
            for _ in 0..2 {
                let (index, outcome) = rx.recv().unwrap();
                assert!(slots[index].is_none());
                slots[index] = Some(outcome);
            }
            canceller.join().unwrap();
            for worker in workers {
                worker.join().unwrap();
            }

            let passed = slots
                .iter()
                .filter(|slot| matches!(slot, Some(Outcome::Passed(_))))
                .count();
            assert!(slots.iter().all(Option::is_some));
            assert!(passed <= runs.load(Ordering::Relaxed));
        });
    }

    /// A cancellation published before the workers start skips every test
    /// without running any of them.
    ///
    /// 在工作者启动前发布的取消会跳过所有测试，且不运行任何测试。
    #[test]
    fn test_cancellation_before_start_skips_everything() {
        run_model(|| {
            let cancelled = Arc::new(AtomicBool::new(false));
            let runs = Arc::new(AtomicUsize::new(0));

            let canceller = {
                let cancelled = cancelled.clone();
                thread::spawn(move || cancelled.store(true, Ordering::Release))
            };
            canceller.join().unwrap();

            let workers: Vec<_> = (0..2)
                .map(|index| {
                    let (cancelled, runs) = (cancelled.clone(), runs.clone());
                    thread::spawn(move || attempt(index, &cancelled, &runs))
                })
                .collect();

            for worker in workers {
                assert_eq!(worker.join().unwrap(), Outcome::Skipped);
            }
            assert_eq!(runs.load(Ordering::Relaxed), 0);
        });
    }
}
