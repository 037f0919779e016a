use chrono::{DateTime, Utc};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 事件负载：任意调用方类型，总线不做校验
pub type Payload = Arc<dyn Any + Send + Sync>;

/// 一次发布产生的事件
///
/// 构造后即不可变；克隆只增加负载的引用计数。
#[derive(Clone)]
pub struct Event {
    /// 事件唯一标识
    id: String,
    /// 事务标识，用于关联同一业务操作下的多个事件
    tx_id: String,
    /// 主题名称
    topic: String,
    /// 发起方（可选）
    source: Option<String>,
    /// 发生时间
    occurred_at: DateTime<Utc>,
    data: Payload,
    data_type: &'static str,
}

impl Event {
    pub(crate) fn new(
        id: String,
        tx_id: String,
        topic: String,
        source: Option<String>,
        occurred_at: DateTime<Utc>,
        data: Payload,
        data_type: &'static str,
    ) -> Self {
        Self {
            id,
            tx_id,
            topic,
            source,
            occurred_at,
            data,
            data_type,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn occurred_at(&self) -> &DateTime<Utc> {
        &self.occurred_at
    }

    /// 按具体类型读取负载，类型不符时返回 `None`
    pub fn data<T: Any>(&self) -> Option<&T> {
        (*self.data).downcast_ref::<T>()
    }

    /// 共享负载本身，便于处理器在投递结束后继续持有
    pub fn payload(&self) -> Payload {
        Arc::clone(&self.data)
    }

    /// 负载的类型名（仅用于诊断）
    pub fn data_type(&self) -> &'static str {
        self.data_type
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id)
            .field("tx_id", &self.tx_id)
            .field("topic", &self.topic)
            .field("source", &self.source)
            .field("occurred_at", &self.occurred_at)
            .field("data_type", &self.data_type)
            .finish_non_exhaustive()
    }
}
