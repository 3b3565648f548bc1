//! # Address Batch Lookup
//!
//! 从名单文件读取姓名，向目录网站逐个提交查询表单，解析结果页中的地址。
//! 请求按固定大小分批并发：一批的结果全部收齐后才开始下一批。
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - `DirectoryClient`，构造 multipart 表单并发送请求
//!
//! ### ② 业务能力层（Services）
//! - `AddressParser` - 从 HTML 中取出地址
//! - `LookupService` - 单个姓名的完整查询，产出一个 `ResultSignal`
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_dispatcher` - 分批并发调度，批间同步
//!
//! ### ④ 应用层
//! - `App` - 读取名单、驱动调度器、输出统计

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use app::App;
pub use config::{Config, DrainPolicy};
pub use error::{AppError, AppResult};
pub use models::{ResultSignal, WorkItem};
pub use orchestrator::{BatchDispatcher, DispatchReport};
pub use services::LookupService;
