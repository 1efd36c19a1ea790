use anyhow::{Context, Result};
use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder};
use sysinfo::System;

/// 依 CPU 核心數決定預設平行數量（擷取是 CPU 密集工作）
#[must_use]
pub fn default_worker_count() -> usize {
    let mut system = System::new();
    system.refresh_cpu_all();
    let cores = system.cpus().len();

    if cores > 0 {
        cores
    } else {
        std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
    }
}

/// 建立固定大小的執行緒池
///
/// 檔案層級與片段層級的平行處理共用同一個池，總並行數不會超過 `workers`
pub fn build_worker_pool(workers: Option<usize>) -> Result<ThreadPool> {
    let workers = workers.filter(|&n| n > 0).unwrap_or_else(default_worker_count);
    debug!("建立執行緒池: {workers} workers");

    ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("scene-worker-{i}"))
        .build()
        .context("無法建立執行緒池")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_worker_count_positive() {
        assert!(default_worker_count() >= 1);
    }

    #[test]
    fn test_explicit_worker_count() {
        let pool = build_worker_pool(Some(2)).unwrap();
        assert_eq!(pool.current_num_threads(), 2);
    }

    #[test]
    fn test_zero_workers_falls_back_to_default() {
        let pool = build_worker_pool(Some(0)).unwrap();
        assert!(pool.current_num_threads() >= 1);
    }
}
