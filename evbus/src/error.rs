//! 事件总线统一错误定义
//!
//! 覆盖构造期配置、发布期主题查找、处理器注册期的模式编译，
//! 以及隔离模式下处理器 panic 的汇总。
//!
use std::fmt;
use thiserror::Error;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BusError {
    // --- 构造期 ---
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    // --- 发布期 ---
    #[error("topic not found: {topic}")]
    TopicNotFound { topic: String },
    #[error(
        "handler panicked: topic={topic}, event={event_id}, failed=[{}]",
        join_failures(.failures)
    )]
    HandlerPanicked {
        topic: String,
        event_id: String,
        failures: Vec<HandlerFailure>,
    },

    // --- 注册期 ---
    /// 独立调用 `matches` 时没有处理器，`key` 为空
    #[error("invalid pattern: handler={key}, pattern={pattern}, reason={source}")]
    InvalidPattern {
        key: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl BusError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn topic_not_found(topic: impl Into<String>) -> Self {
        Self::TopicNotFound {
            topic: topic.into(),
        }
    }

    pub fn invalid_pattern(
        key: impl Into<String>,
        pattern: impl Into<String>,
        source: regex::Error,
    ) -> Self {
        Self::InvalidPattern {
            key: key.into(),
            pattern: pattern.into(),
            source,
        }
    }
}

fn join_failures(failures: &[HandlerFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// 单个处理器在一次投递中的失败记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    /// 处理器注册键
    pub key: String,
    /// panic 载荷中提取的信息（非字符串载荷时为占位文本）
    pub message: String,
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

/// 统一 Result 类型别名
pub type BusResult<T> = Result<T, BusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_not_found_names_the_topic() {
        let err = BusError::topic_not_found("comment.updated");
        assert_eq!(err.to_string(), "topic not found: comment.updated");
    }

    #[test]
    fn invalid_pattern_keeps_regex_source() {
        let source = regex::Regex::new("order.(").unwrap_err();
        let err = BusError::invalid_pattern("audit", "order.(", source);

        let message = err.to_string();
        assert!(message.starts_with("invalid pattern: handler=audit"));
        assert!(message.contains("pattern=order.("));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn handler_panicked_lists_every_failed_handler() {
        let err = BusError::HandlerPanicked {
            topic: "order.created".into(),
            event_id: "e-1".into(),
            failures: vec![
                HandlerFailure {
                    key: "a".into(),
                    message: "boom".into(),
                },
                HandlerFailure {
                    key: "b".into(),
                    message: "bang".into(),
                },
            ],
        };

        assert_eq!(
            err.to_string(),
            "handler panicked: topic=order.created, event=e-1, failed=[a: boom, b: bang]"
        );
    }
}
