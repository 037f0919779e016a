use super::handlers::Subscriber;
use std::collections::HashMap;
use std::sync::Arc;

/// 主题条目：按投递顺序排列的已链接处理器
#[derive(Debug, Default)]
pub(crate) struct TopicEntry {
    pub(crate) handlers: Vec<Arc<Subscriber>>,
}

/// 主题注册表：主题名 -> 主题条目
#[derive(Debug, Default)]
pub(crate) struct TopicRegistry {
    entries: HashMap<String, TopicEntry>,
}

impl TopicRegistry {
    /// 主题不存在时创建空条目，返回是否为新建
    pub(crate) fn insert(&mut self, name: &str) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        self.entries.insert(name.to_string(), TopicEntry::default());
        true
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<TopicEntry> {
        self.entries.remove(name)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub(crate) fn names_iter(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn link(&mut self, name: &str, subscriber: Arc<Subscriber>) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.handlers.push(subscriber);
        }
    }

    /// 交换末尾后截断，O(1) 移除，不保留顺序
    pub(crate) fn unlink(&mut self, name: &str, subscriber: &Arc<Subscriber>) {
        if let Some(entry) = self.entries.get_mut(name) {
            if let Some(pos) = entry
                .handlers
                .iter()
                .position(|h| Arc::ptr_eq(h, subscriber))
            {
                entry.handlers.swap_remove(pos);
            }
        }
    }

    pub(crate) fn handler_keys(&self, name: &str) -> Vec<String> {
        self.entries
            .get(name)
            .map(|e| e.handlers.iter().map(|h| h.key().to_string()).collect())
            .unwrap_or_default()
    }

    /// 拷贝当前处理器列表，供发布在锁外投递
    pub(crate) fn snapshot(&self, name: &str) -> Option<Vec<Arc<Subscriber>>> {
        self.entries.get(name).map(|e| e.handlers.clone())
    }
}
