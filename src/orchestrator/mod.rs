//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量派发和批次同步，不关心单个查询如何完成。
//!
//! ## 层次关系
//!
//! ```text
//! app (读取名单、汇总统计)
//!     ↓
//! orchestrator::batch_dispatcher (分批并发、收取结果)
//!     ↓
//! services (能力层：表单查询 / 地址解析)
//!     ↓
//! clients (DirectoryClient)
//! ```

pub mod batch_dispatcher;

pub use batch_dispatcher::{BatchDispatcher, BatchReport, DispatchReport, SignalTally};
