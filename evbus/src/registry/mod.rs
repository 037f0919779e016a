//! 注册表：处理器与主题的双向关系
//!
//! - `handlers`：键 -> 处理器及其已链接的主题；
//! - `topics`：主题名 -> 已链接的处理器（投递顺序）；
//! - `resolver`：模式匹配与链接推导。
//!
//! 每个变更方法完成后都满足：处理器 H 出现在主题 T 的列表中，
//! 当且仅当二者均已注册且 H 的模式命中 T 的名称。

pub(crate) mod handlers;
pub(crate) mod resolver;
pub(crate) mod topics;

use handlers::{HandlerEntry, HandlerRegistry, Subscriber};
use std::sync::Arc;
use topics::TopicRegistry;

#[derive(Debug, Default)]
pub(crate) struct Registry {
    handlers: HandlerRegistry,
    topics: TopicRegistry,
}

impl Registry {
    /// 同键旧处理器先完整注销，再插入并对全部主题重新链接
    pub(crate) fn register_handler(&mut self, subscriber: Subscriber) -> Option<HandlerEntry> {
        let replaced = self.deregister_handler(subscriber.key());
        let subscriber = Arc::new(subscriber);

        self.handlers.insert(Arc::clone(&subscriber));
        resolver::link_handler(&mut self.handlers, &mut self.topics, &subscriber);

        replaced
    }

    pub(crate) fn deregister_handler(&mut self, key: &str) -> Option<HandlerEntry> {
        let entry = self.handlers.remove(key)?;
        resolver::unlink_handler(&mut self.topics, &entry);
        Some(entry)
    }

    /// 已存在的主题保持原样，不重新推导
    pub(crate) fn register_topic(&mut self, name: &str) -> bool {
        if !self.topics.insert(name) {
            return false;
        }
        resolver::link_topic(&mut self.handlers, &mut self.topics, name);
        true
    }

    pub(crate) fn deregister_topic(&mut self, name: &str) -> bool {
        let Some(entry) = self.topics.remove(name) else {
            return false;
        };
        resolver::unlink_topic(&mut self.handlers, name, &entry);
        true
    }

    pub(crate) fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub(crate) fn topics(&self) -> &TopicRegistry {
        &self.topics
    }
}
