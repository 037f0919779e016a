//! 订阅解析：判断模式是否命中主题，并在任一侧变化时重新推导链接
//!
//! 本身不持有状态，只在两张注册表之间维护互相引用。
//!
use super::handlers::{HandlerEntry, HandlerRegistry, Subscriber};
use super::topics::{TopicEntry, TopicRegistry};
use crate::error::{BusError, BusResult};
use regex::Regex;
use std::sync::Arc;

/// 模式在主题名任意位置命中即为匹配（子串搜索语义）
///
/// 每次调用都会重新编译模式；模式无法编译时返回 `InvalidPattern`。
pub fn matches(pattern: &str, topic: &str) -> BusResult<bool> {
    let compiled = compile(String::new(), pattern)?;
    Ok(is_match(&compiled, topic))
}

pub(crate) fn compile(key: String, pattern: &str) -> BusResult<Regex> {
    Regex::new(pattern).map_err(|source| BusError::invalid_pattern(key, pattern, source))
}

pub(crate) fn is_match(pattern: &Regex, topic: &str) -> bool {
    pattern.is_match(topic)
}

/// 新处理器：扫描全部主题，O(topics)
pub(crate) fn link_handler(
    handlers: &mut HandlerRegistry,
    topics: &mut TopicRegistry,
    subscriber: &Arc<Subscriber>,
) {
    let matched: Vec<String> = topics
        .names_iter()
        .filter(|name| is_match(subscriber.pattern(), name))
        .cloned()
        .collect();

    for name in matched {
        topics.link(&name, Arc::clone(subscriber));
        handlers.link(subscriber.key(), &name);
    }
}

/// 新主题：扫描全部处理器，O(handlers)
pub(crate) fn link_topic(handlers: &mut HandlerRegistry, topics: &mut TopicRegistry, name: &str) {
    let matched: Vec<Arc<Subscriber>> = handlers
        .subscribers()
        .filter(|s| is_match(s.pattern(), name))
        .cloned()
        .collect();

    for subscriber in matched {
        handlers.link(subscriber.key(), name);
        topics.link(name, subscriber);
    }
}

/// 只遍历该处理器自己的链接列表，O(links)
pub(crate) fn unlink_handler(topics: &mut TopicRegistry, entry: &HandlerEntry) {
    for name in &entry.links {
        topics.unlink(name, &entry.subscriber);
    }
}

pub(crate) fn unlink_topic(handlers: &mut HandlerRegistry, name: &str, entry: &TopicEntry) {
    for subscriber in &entry.handlers {
        handlers.unlink(subscriber.key(), name);
    }
}
