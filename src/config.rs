use crate::error::{AppError, AppResult, ConfigError};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// 批次收尾策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrainPolicy {
    /// 每批精确收取 min(批大小, 剩余数量) 个结果，最后不足一批的也完整收取
    #[default]
    Exact,
    /// 沿用旧行为：进入最后一批后每轮把有效批大小减一，最后一批会少收结果
    Legacy,
}

impl FromStr for DrainPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(DrainPolicy::Exact),
            "legacy" => Ok(DrainPolicy::Legacy),
            other => Err(ConfigError::EnvVarParseFailed {
                var_name: "DRAIN_POLICY".to_string(),
                value: other.to_string(),
                expected_type: "exact | legacy".to_string(),
            }),
        }
    }
}

impl fmt::Display for DrainPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrainPolicy::Exact => write!(f, "exact"),
            DrainPolicy::Legacy => write!(f, "legacy"),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 名单文件路径（制表符分隔，首行为表头）
    pub source_path: String,
    /// 每批并发请求数量
    pub batch_size: usize,
    /// 查询页面地址
    pub endpoint_url: String,
    /// multipart 表单分隔符
    pub form_boundary: String,
    /// 表单中姓名字段的名称
    pub search_field: String,
    /// 批次收尾策略
    pub drain_policy: DrainPolicy,
    /// 若设置，则把每个响应的 HTML 保存到该目录
    pub html_dump_dir: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_path: "docnames.txt".to_string(),
            batch_size: 15,
            endpoint_url: "https://www.ordomedic.be/nl/zoek-een-arts/".to_string(),
            form_boundary: "----WebKitFormBoundary7MA4YWxkTrZu0gW".to_string(),
            search_field: "search_name".to_string(),
            drain_policy: DrainPolicy::Exact,
            html_dump_dir: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 若设置了 `LOOKUP_CONFIG`，先读取该 TOML 文件，再由环境变量覆盖
    pub fn from_env() -> AppResult<Self> {
        let base = match std::env::var("LOOKUP_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_toml_file(&path)?,
            _ => Self::default(),
        };
        Self::with_overrides(base, |key| std::env::var(key).ok())
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_toml_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileLoadFailed {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            AppError::Config(ConfigError::FileLoadFailed { reason, .. }) => {
                AppError::Config(ConfigError::FileLoadFailed {
                    path: path.to_string(),
                    reason,
                })
            }
            other => other,
        })
    }

    /// 解析 TOML 文本
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e: toml::de::Error| {
            AppError::Config(ConfigError::FileLoadFailed {
                path: String::new(),
                reason: e.to_string(),
            })
        })
    }

    /// 用 `lookup` 提供的键值覆盖 `base` 中的对应字段
    pub fn with_overrides<F>(base: Self, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = base;

        if let Some(v) = lookup("SOURCE_PATH") {
            config.source_path = v;
        }
        if let Some(v) = lookup("BATCH_SIZE") {
            config.batch_size = v.trim().parse().map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: "BATCH_SIZE".to_string(),
                value: v.clone(),
                expected_type: "usize".to_string(),
            })?;
        }
        if let Some(v) = lookup("ENDPOINT_URL") {
            config.endpoint_url = v;
        }
        if let Some(v) = lookup("FORM_BOUNDARY") {
            config.form_boundary = v;
        }
        if let Some(v) = lookup("SEARCH_FIELD") {
            config.search_field = v;
        }
        if let Some(v) = lookup("DRAIN_POLICY") {
            config.drain_policy = v.parse()?;
        }
        if let Some(v) = lookup("HTML_DUMP_DIR") {
            config.html_dump_dir = if v.trim().is_empty() { None } else { Some(v) };
        }
        if let Some(v) = lookup("VERBOSE_LOGGING") {
            config.verbose_logging = v.trim().parse().map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: "VERBOSE_LOGGING".to_string(),
                value: v.clone(),
                expected_type: "bool".to_string(),
            })?;
        }

        Ok(config)
    }

    /// 校验配置，任何一项非法都会在派发前终止程序
    pub fn validate(&self) -> AppResult<()> {
        if self.batch_size == 0 {
            return Err(AppError::invalid_config("batch_size", "必须大于 0"));
        }
        if self.endpoint_url.trim().is_empty() {
            return Err(AppError::invalid_config("endpoint_url", "不能为空"));
        }
        if self.form_boundary.trim().is_empty() {
            return Err(AppError::invalid_config("form_boundary", "不能为空"));
        }
        if self.search_field.trim().is_empty() {
            return Err(AppError::invalid_config("search_field", "不能为空"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides(pairs: &[(&str, &str)]) -> AppResult<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::with_overrides(Config::default(), |key| map.get(key).cloned())
    }

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch_size, 15);
        assert_eq!(config.drain_policy, DrainPolicy::Exact);
    }

    #[test]
    fn test_overrides_apply() {
        let config = overrides(&[
            ("BATCH_SIZE", "4"),
            ("SOURCE_PATH", "names.tsv"),
            ("DRAIN_POLICY", "Legacy"),
            ("HTML_DUMP_DIR", "output"),
        ])
        .unwrap();

        assert_eq!(config.batch_size, 4);
        assert_eq!(config.source_path, "names.tsv");
        assert_eq!(config.drain_policy, DrainPolicy::Legacy);
        assert_eq!(config.html_dump_dir.as_deref(), Some("output"));
    }

    #[test]
    fn test_bad_batch_size_is_rejected() {
        let err = overrides(&[("BATCH_SIZE", "many")]).unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::EnvVarParseFailed { .. })
        ));

        let zero = overrides(&[("BATCH_SIZE", "0")]).unwrap();
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_unknown_drain_policy() {
        assert!(overrides(&[("DRAIN_POLICY", "sometimes")]).is_err());
    }

    #[test]
    fn test_toml_partial_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            batch_size = 3
            drain_policy = "legacy"
            "#,
        )
        .unwrap();

        assert_eq!(config.batch_size, 3);
        assert_eq!(config.drain_policy, DrainPolicy::Legacy);
        assert_eq!(config.search_field, "search_name");
    }
}
