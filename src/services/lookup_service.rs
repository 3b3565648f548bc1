//! 地址查询服务 - 业务能力层
//!
//! 只处理单个姓名：提交表单 → 解析页面 → 给出结果信号

use crate::clients::DirectoryClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::ResultSignal;
use crate::services::address_parser::AddressParser;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 地址查询服务
///
/// 职责：
/// - 对单个姓名发起查询
/// - 网络错误降级为失败信号，不影响同批的其他查询
/// - 按需保存原始响应页面
pub struct LookupService {
    client: DirectoryClient,
    parser: AddressParser,
    html_dump_dir: Option<PathBuf>,
}

impl LookupService {
    /// 创建新的查询服务
    pub fn new(config: &Config) -> AppResult<Self> {
        Ok(Self {
            client: DirectoryClient::new(config)?,
            parser: AddressParser::new()?,
            html_dump_dir: config.html_dump_dir.as_ref().map(PathBuf::from),
        })
    }

    /// 查询一个姓名的地址
    ///
    /// 任何情况下都只返回一个信号，不会返回错误
    pub async fn lookup(&self, name: &str) -> ResultSignal {
        let html = match self.client.search(name).await {
            Ok(html) => html,
            Err(e) => {
                warn!("[{}] ❌ 查询失败: {}", name, e);
                return ResultSignal::failed(name, e.to_string());
            }
        };

        if let Some(dir) = &self.html_dump_dir {
            if let Err(e) = dump_html(dir, name, &html).await {
                warn!("[{}] ⚠️ 保存响应页面失败: {}", name, e);
            }
        }

        self.classify(name, &html)
    }

    /// 根据页面内容生成结果信号
    pub fn classify(&self, name: &str, html: &str) -> ResultSignal {
        match self.parser.extract_address(html) {
            Some(address) => {
                info!("[{}] 📍 {}", name, address);
                ResultSignal::found(name, address)
            }
            None => {
                debug!("[{}] 页面中没有地址元素", name);
                ResultSignal::not_found(name)
            }
        }
    }
}

/// 保存文件名：姓名中的第一个空格替换为 `-`
pub fn dump_file_name(name: &str) -> String {
    format!("{}.html", name.replacen(' ', "-", 1))
}

async fn dump_html(dir: &Path, name: &str, html: &str) -> AppResult<()> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(dump_file_name(name));
    tokio::fs::write(&path, html).await?;
    debug!("[{}] 响应页面已保存: {}", name, path.display());
    Ok(())
}
