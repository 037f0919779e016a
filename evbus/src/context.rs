use bon::Builder;
use serde::{Deserialize, Serialize};

/// 发布上下文（Emit Context）
///
/// 承载一次发布调用的横切信息，并原样交给每个处理器作为投递上下文：
/// - 事务 ID（`tx_id`）：调用链上已有的关联标识，未显式指定选项时沿用；
/// - 来源（`source`）：事件的发起方；
/// - 扩展（`extensions`）：任意 JSON，总线不解读。
///
/// 典型用法：
/// ```rust
/// use evbus::EmitContext;
///
/// let ctx = EmitContext::builder()
///     .maybe_tx_id(Some("tx-123".into()))
///     .maybe_source(Some("checkout".into()))
///     .build();
/// assert_eq!(ctx.tx_id(), Some("tx-123"));
/// ```
#[derive(Builder, Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitContext {
    /// 事务 ID，空串视为未设置
    tx_id: Option<String>,
    /// 事件来源
    source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    extensions: Option<serde_json::Value>,
}

impl EmitContext {
    /// 仅携带事务 ID 的上下文
    pub fn with_tx_id(tx_id: impl Into<String>) -> Self {
        Self {
            tx_id: Some(tx_id.into()),
            ..Self::default()
        }
    }

    pub fn tx_id(&self) -> Option<&str> {
        self.tx_id.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn extensions(&self) -> Option<&serde_json::Value> {
        self.extensions.as_ref()
    }
}
