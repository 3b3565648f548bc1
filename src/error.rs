use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 名单源文件错误
    #[error("名单源错误: {0}")]
    Source(#[from] SourceError),
    /// 查询过程错误
    #[error("查询错误: {0}")]
    Lookup(#[from] LookupError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件读写错误
    #[error("文件操作失败: {0}")]
    Io(#[from] std::io::Error),
    /// 其他错误
    #[error("错误: {0}")]
    Other(String),
}

/// 名单源文件错误
#[derive(Debug, Error)]
pub enum SourceError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 文件为空（连表头都没有）
    #[error("文件为空: {path}")]
    Empty { path: String },
}

/// 查询过程错误
#[derive(Debug, Error)]
pub enum LookupError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 读取响应体失败
    #[error("读取响应失败 ({endpoint}): {source}")]
    BodyRead {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 创建 HTTP 客户端失败
    #[error("创建 HTTP 客户端失败: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置项取值非法
    #[error("配置项 {field} 非法: {reason}")]
    InvalidValue { field: String, reason: String },
    /// 配置文件读取或解析失败
    #[error("配置文件 {path} 无法加载: {reason}")]
    FileLoadFailed { path: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn source_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Source(SourceError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建请求失败错误
    pub fn transport(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Lookup(LookupError::Transport {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建配置项非法错误
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Config(ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display_keeps_path() {
        let err = AppError::source_read_failed(
            "docnames.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let msg = err.to_string();
        assert!(msg.contains("docnames.txt"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_invalid_config_display() {
        let err = AppError::invalid_config("batch_size", "必须大于 0");
        assert_eq!(err.to_string(), "配置错误: 配置项 batch_size 非法: 必须大于 0");
    }
}
