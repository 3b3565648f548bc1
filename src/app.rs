//! 应用入口 - 持有配置和查询服务，串起 读取名单 → 分批查询 → 统计

use crate::config::Config;
use crate::models::load_names;
use crate::orchestrator::{BatchDispatcher, DispatchReport};
use crate::services::LookupService;
use crate::utils::logging::{log_names_loaded, log_startup, print_final_stats};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    dispatcher: BatchDispatcher,
    service: Arc<LookupService>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        config.validate().context("配置校验失败")?;

        log_startup(&config);

        let dispatcher = BatchDispatcher::from_config(&config)?;
        let service = Arc::new(LookupService::new(&config).context("无法创建查询服务")?);

        Ok(Self {
            config,
            dispatcher,
            service,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<DispatchReport> {
        let names = load_names(Path::new(&self.config.source_path))
            .await
            .with_context(|| format!("无法加载名单: {}", self.config.source_path))?;

        if names.is_empty() {
            warn!("⚠️ 名单中没有可查询的姓名，程序结束");
            return Ok(DispatchReport::default());
        }

        log_names_loaded(
            names.len(),
            self.dispatcher.batch_size(),
            self.dispatcher.policy(),
        );

        let service = Arc::clone(&self.service);
        let report = self
            .dispatcher
            .run(names, move |name| {
                let service = Arc::clone(&service);
                async move { service.lookup(&name).await }
            })
            .await?;

        info!("共 {} 批", report.batches.len());
        print_final_stats(&report.tally(), report.dispatched, report.abandoned);

        Ok(report)
    }
}
