//! 批量调度器 - 编排层
//!
//! ## 职责
//!
//! 把有序的姓名列表按固定大小分批，批内并发查询，批与批之间同步：
//! 一批的结果全部收齐之后才开始派发下一批。
//!
//! ## 核心机制
//!
//! 1. **共享通道**：整个运行期间只创建一个容量为批大小的 `mpsc` 通道，各批复用
//! 2. **一项一任务**：每个姓名一个 tokio 任务，任务在任何退出路径上都恰好写入一个信号
//! 3. **按到达顺序收取**：收取顺序即完成顺序，与派发顺序无关
//! 4. **计时**：每次收取单独计时并输出
//!
//! ## 收尾策略
//!
//! - `Exact`：最后不足一批的也完整收取，批结束后 join 本批任务组
//! - `Legacy`：保留旧行为，进入最后一批后每轮把有效批大小减一，
//!   少收的任务在结束时直接放弃

use crate::config::{Config, DrainPolicy};
use crate::error::{AppError, AppResult};
use crate::models::{ResultSignal, WorkItem};
use crate::utils::logging::{log_batch_elapsed, log_batch_waiting, log_response};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// 批量调度器
#[derive(Debug, Clone, Copy)]
pub struct BatchDispatcher {
    batch_size: usize,
    policy: DrainPolicy,
}

/// 单批收取结果
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// 批次编号（从 1 开始）
    pub number: usize,
    /// 按到达顺序排列的信号
    pub signals: Vec<ResultSignal>,
    /// 本次收取耗时
    pub elapsed: Duration,
}

/// 结果分类统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SignalTally {
    pub found: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl SignalTally {
    pub fn total(&self) -> usize {
        self.found + self.not_found + self.failed
    }
}

/// 整次运行的结果
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub batches: Vec<BatchReport>,
    /// 已派发的任务数
    pub dispatched: usize,
    /// 信号从未被收取的任务数（仅 `Legacy` 下可能非零）
    pub abandoned: usize,
}

impl DispatchReport {
    /// 实际收取到的信号总数
    pub fn observed(&self) -> usize {
        self.batches.iter().map(|b| b.signals.len()).sum()
    }

    pub fn signals(&self) -> impl Iterator<Item = &ResultSignal> {
        self.batches.iter().flat_map(|b| b.signals.iter())
    }

    pub fn tally(&self) -> SignalTally {
        let mut tally = SignalTally::default();
        for signal in self.signals() {
            match signal {
                ResultSignal::Found { .. } => tally.found += 1,
                ResultSignal::NotFound { .. } => tally.not_found += 1,
                ResultSignal::Failed { .. } => tally.failed += 1,
            }
        }
        tally
    }
}

impl BatchDispatcher {
    /// 创建调度器，批大小必须大于 0
    pub fn new(batch_size: usize, policy: DrainPolicy) -> AppResult<Self> {
        if batch_size == 0 {
            return Err(AppError::invalid_config("batch_size", "必须大于 0"));
        }
        Ok(Self { batch_size, policy })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(config.batch_size, config.drain_policy)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn policy(&self) -> DrainPolicy {
        self.policy
    }

    /// 依次派发所有姓名并按批收取结果
    ///
    /// `lookup` 对每个姓名调用一次；即使它 panic，该姓名也会得到一个失败信号
    pub async fn run<F, Fut>(&self, items: Vec<WorkItem>, lookup: F) -> AppResult<DispatchReport>
    where
        F: Fn(WorkItem) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResultSignal> + Send + 'static,
    {
        let lookup = Arc::new(lookup);
        let (tx, mut rx) = mpsc::channel(self.batch_size);

        match self.policy {
            DrainPolicy::Exact => self.run_exact(items, &lookup, &tx, &mut rx).await,
            DrainPolicy::Legacy => self.run_legacy(items, &lookup, &tx, &mut rx).await,
        }
    }

    async fn run_exact<F, Fut>(
        &self,
        items: Vec<WorkItem>,
        lookup: &Arc<F>,
        tx: &mpsc::Sender<ResultSignal>,
        rx: &mut mpsc::Receiver<ResultSignal>,
    ) -> AppResult<DispatchReport>
    where
        F: Fn(WorkItem) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResultSignal> + Send + 'static,
    {
        let total = items.len();
        let mut report = DispatchReport::default();
        let mut tasks = JoinSet::new();
        let mut batch_start = 0;

        for (i, item) in items.into_iter().enumerate() {
            spawn_lookup(&mut tasks, lookup, tx, item);
            report.dispatched += 1;

            let at_boundary = (i + 1) % self.batch_size == 0 || i + 1 == total;
            if !at_boundary {
                continue;
            }

            let number = report.batches.len() + 1;
            let batch = drain(rx, number, i + 1 - batch_start).await?;
            report.batches.push(batch);

            // 本批信号已收齐，任务只剩收尾
            join_batch(&mut tasks, number).await;
            batch_start = i + 1;
        }

        Ok(report)
    }

    async fn run_legacy<F, Fut>(
        &self,
        items: Vec<WorkItem>,
        lookup: &Arc<F>,
        tx: &mpsc::Sender<ResultSignal>,
        rx: &mut mpsc::Receiver<ResultSignal>,
    ) -> AppResult<DispatchReport>
    where
        F: Fn(WorkItem) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResultSignal> + Send + 'static,
    {
        let total = items.len();
        let mut report = DispatchReport::default();
        let mut tasks = JoinSet::new();
        let mut effective = self.batch_size;
        let mut drained = 0;

        for (i, item) in items.into_iter().enumerate() {
            spawn_lookup(&mut tasks, lookup, tx, item);
            report.dispatched += 1;

            if (i + 1) % effective == 0 {
                let outstanding = report.dispatched - drained;
                if outstanding < effective {
                    warn!(
                        "有效批大小 {} 超过未收取的任务数 {}，只收取 {} 个",
                        effective, outstanding, outstanding
                    );
                }
                let count = effective.min(outstanding);
                let number = report.batches.len() + 1;
                report.batches.push(drain(rx, number, count).await?);
                drained += count;
            } else if total - i < effective {
                let started = Instant::now();
                effective = (effective - 1).max(1);
                debug!("进入最后一批，有效批大小降为 {}", effective);
                log_batch_elapsed(report.batches.len() + 1, started.elapsed());
            }
        }

        report.abandoned = report.dispatched - drained;
        if report.abandoned > 0 {
            warn!("⚠️ 有 {} 个查询结果未被收取", report.abandoned);
        }
        tasks.detach_all();

        Ok(report)
    }
}

/// 派发一个查询任务，任务结束前必定写入一个信号
fn spawn_lookup<F, Fut>(
    tasks: &mut JoinSet<()>,
    lookup: &Arc<F>,
    tx: &mpsc::Sender<ResultSignal>,
    item: WorkItem,
) where
    F: Fn(WorkItem) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ResultSignal> + Send + 'static,
{
    let lookup = Arc::clone(lookup);
    let tx = tx.clone();

    tasks.spawn(async move {
        let name = item.clone();
        let outcome = AssertUnwindSafe(async move { lookup(item).await })
            .catch_unwind()
            .await;

        let signal = match outcome {
            Ok(signal) => signal,
            Err(_) => {
                error!("[{}] ❌ 查询任务崩溃", name);
                ResultSignal::failed(name, "查询任务崩溃")
            }
        };

        if tx.send(signal).await.is_err() {
            debug!("结果通道已关闭，信号被丢弃");
        }
    });
}

/// 按到达顺序收取 `count` 个信号
async fn drain(
    rx: &mut mpsc::Receiver<ResultSignal>,
    number: usize,
    count: usize,
) -> AppResult<BatchReport> {
    log_batch_waiting(number);
    let started = Instant::now();

    let mut signals = Vec::with_capacity(count);
    for position in 1..=count {
        let signal = rx
            .recv()
            .await
            .ok_or_else(|| AppError::Other("结果通道意外关闭".to_string()))?;
        log_response(position, &signal);
        signals.push(signal);
    }

    let elapsed = started.elapsed();
    log_batch_elapsed(number, elapsed);

    Ok(BatchReport {
        number,
        signals,
        elapsed,
    })
}

async fn join_batch(tasks: &mut JoinSet<()>, number: usize) {
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!("[批次 {}] 任务执行失败: {}", number, e);
        }
    }
}
