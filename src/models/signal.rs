//! 单个查询的结果信号
//!
//! 每个派发出去的姓名恰好产生一个信号，经由共享通道送回调度器

use std::fmt;

/// 派发单元：一个人的显示姓名
pub type WorkItem = String;

/// 成功信号的字符串形式
pub const SUCCESS_SENTINEL: &str = "true";

/// 通用失败信号的字符串形式
pub const FAILURE_SENTINEL: &str = "System failed";

/// 查询结果信号
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultSignal {
    /// 找到地址
    Found { name: String, address: String },
    /// 页面中没有地址元素
    NotFound { name: String },
    /// 请求或处理失败（网络错误、任务崩溃等）
    Failed { name: String, reason: String },
}

impl ResultSignal {
    pub fn found(name: impl Into<String>, address: impl Into<String>) -> Self {
        ResultSignal::Found {
            name: name.into(),
            address: address.into(),
        }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        ResultSignal::NotFound { name: name.into() }
    }

    pub fn failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ResultSignal::Failed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// 对应的姓名
    pub fn name(&self) -> &str {
        match self {
            ResultSignal::Found { name, .. }
            | ResultSignal::NotFound { name }
            | ResultSignal::Failed { name, .. } => name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResultSignal::Found { .. })
    }
}

/// 输出与旧版控制台一致的哨兵字符串
impl fmt::Display for ResultSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultSignal::Found { .. } => write!(f, "{}", SUCCESS_SENTINEL),
            ResultSignal::NotFound { name } => write!(f, "No address found for {}", name),
            ResultSignal::Failed { .. } => write!(f, "{}", FAILURE_SENTINEL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert_eq!(ResultSignal::found("Jane Doe", "Kerkstraat 1").to_string(), "true");
        assert_eq!(
            ResultSignal::not_found("Jane Doe").to_string(),
            "No address found for Jane Doe"
        );
        assert_eq!(
            ResultSignal::failed("Jane Doe", "connection refused").to_string(),
            "System failed"
        );
    }

    #[test]
    fn test_name_and_success() {
        let signal = ResultSignal::failed("Jan Peeters", "timeout");
        assert_eq!(signal.name(), "Jan Peeters");
        assert!(!signal.is_success());
        assert!(ResultSignal::found("a", "b").is_success());
    }
}
