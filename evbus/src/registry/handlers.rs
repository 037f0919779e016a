use super::resolver;
use crate::{
    context::EmitContext,
    error::BusResult,
    event::Event,
    handler::{EventHandler, Handler},
};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 已编译的处理器：模式在注册时编译一次并缓存
pub(crate) struct Subscriber {
    key: String,
    matcher: String,
    pattern: Regex,
    callback: Arc<dyn EventHandler>,
}

impl Subscriber {
    pub(crate) fn compile(key: String, handler: &Handler) -> BusResult<Self> {
        let pattern = resolver::compile(key.clone(), handler.matcher())?;

        Ok(Self {
            key,
            matcher: handler.matcher().to_string(),
            pattern,
            callback: Arc::clone(handler.callback()),
        })
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn matcher(&self) -> &str {
        &self.matcher
    }

    pub(crate) fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub(crate) fn deliver(&self, ctx: &EmitContext, event: &Event) {
        self.callback.handle(ctx, event)
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("key", &self.key)
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}

/// 处理器条目：记录已解析出的主题链接，注销时只需遍历这份列表
#[derive(Debug)]
pub(crate) struct HandlerEntry {
    pub(crate) subscriber: Arc<Subscriber>,
    pub(crate) links: Vec<String>,
}

/// 处理器注册表：键 -> 处理器条目
#[derive(Debug, Default)]
pub(crate) struct HandlerRegistry {
    entries: HashMap<String, HandlerEntry>,
}

impl HandlerRegistry {
    /// 插入新条目（调用方需先移除同键旧条目）
    pub(crate) fn insert(&mut self, subscriber: Arc<Subscriber>) {
        let key = subscriber.key().to_string();
        self.entries.insert(
            key,
            HandlerEntry {
                subscriber,
                links: Vec::new(),
            },
        );
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<HandlerEntry> {
        self.entries.remove(key)
    }

    pub(crate) fn get(&self, key: &str) -> Option<&HandlerEntry> {
        self.entries.get(key)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn subscribers(&self) -> impl Iterator<Item = &Arc<Subscriber>> {
        self.entries.values().map(|e| &e.subscriber)
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn link(&mut self, key: &str, topic: &str) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.links.push(topic.to_string());
        }
    }

    /// 交换末尾后截断，O(1) 移除，不保留顺序
    pub(crate) fn unlink(&mut self, key: &str, topic: &str) {
        if let Some(entry) = self.entries.get_mut(key) {
            if let Some(pos) = entry.links.iter().position(|t| t == topic) {
                entry.links.swap_remove(pos);
            }
        }
    }

    pub(crate) fn subscriptions(&self, key: &str) -> Vec<String> {
        self.entries
            .get(key)
            .map(|e| e.links.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BusError;

    fn subscriber(key: &str, matcher: &str) -> Arc<Subscriber> {
        let handler = Handler::from_fn(matcher, |_ctx: &EmitContext, _e: &Event| {});
        Arc::new(Subscriber::compile(key.into(), &handler).unwrap())
    }

    #[test]
    fn compile_rejects_invalid_pattern() {
        let handler = Handler::from_fn("order.(", |_ctx: &EmitContext, _e: &Event| {});
        let err = Subscriber::compile("audit".into(), &handler).unwrap_err();

        match err {
            BusError::InvalidPattern { key, pattern, .. } => {
                assert_eq!(key, "audit");
                assert_eq!(pattern, "order.(");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unlink_swaps_last_into_place() {
        let mut reg = HandlerRegistry::default();
        reg.insert(subscriber("audit", ".*"));
        for t in ["a", "b", "c", "d"] {
            reg.link("audit", t);
        }

        reg.unlink("audit", "b");
        assert_eq!(reg.subscriptions("audit"), vec!["a", "d", "c"]);

        reg.unlink("audit", "missing");
        assert_eq!(reg.subscriptions("audit").len(), 3);
    }

    #[test]
    fn unknown_key_has_no_subscriptions() {
        let reg = HandlerRegistry::default();
        assert!(reg.subscriptions("nobody").is_empty());
        assert!(!reg.contains("nobody"));
    }
}
