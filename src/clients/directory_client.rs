/// 目录网站客户端
///
/// 封装表单提交：以固定分隔符构造 multipart 请求体并 POST 到查询页面
use crate::config::Config;
use crate::error::{AppError, AppResult, LookupError};
use tracing::debug;

/// 目录网站客户端
#[derive(Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    endpoint_url: String,
    boundary: String,
    search_field: String,
}

impl DirectoryClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(LookupError::ClientBuild)?;

        Ok(Self {
            http,
            endpoint_url: config.endpoint_url.clone(),
            boundary: config.form_boundary.clone(),
            search_field: config.search_field.clone(),
        })
    }

    /// 按姓名提交查询表单
    ///
    /// # 返回
    /// 返回响应页面的 HTML；网络错误或读取响应失败时返回 `LookupError`
    pub async fn search(&self, name: &str) -> AppResult<String> {
        let body = build_form_body(&self.boundary, &self.search_field, name);

        debug!("提交查询表单: {} ({} 字节)", name, body.len());

        let response = self
            .http
            .post(&self.endpoint_url)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", self.boundary),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::transport(&self.endpoint_url, e))?;

        debug!("查询响应状态: {} -> {}", name, response.status());

        let html = response.text().await.map_err(|e| {
            AppError::Lookup(LookupError::BodyRead {
                endpoint: self.endpoint_url.clone(),
                source: e,
            })
        })?;

        Ok(html)
    }
}

/// 构造只含一个文本字段的 multipart 请求体
pub fn build_form_body(boundary: &str, field: &str, value: &str) -> String {
    format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n--{boundary}--\r\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_body_layout() {
        let body = build_form_body("XYZ", "search_name", "Jane Doe");
        assert_eq!(
            body,
            "--XYZ\r\nContent-Disposition: form-data; name=\"search_name\"\r\n\r\nJane Doe\r\n--XYZ--\r\n"
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let config = Config {
            endpoint_url: "http://127.0.0.1:9/zoek".to_string(),
            ..Config::default()
        };
        let client = DirectoryClient::new(&config).unwrap();
        let err = client.search("Jane Doe").await.unwrap_err();
        match err {
            AppError::Lookup(LookupError::Transport { endpoint, .. }) => {
                assert_eq!(endpoint, "http://127.0.0.1:9/zoek");
            }
            other => panic!("应为网络错误: {}", other),
        }
    }
}
