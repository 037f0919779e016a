//! 事件处理器（EventHandler）
//!
//! 处理器由“匹配模式 + 回调”组成，以调用方选定的键注册到总线。
//! 回调没有返回值，可能阻塞也可能 panic，总线不解读其副作用。
//!
use crate::{context::EmitContext, event::Event};
use std::fmt;
use std::sync::Arc;

/// 事件处理器：接收一个事件
pub trait EventHandler: Send + Sync {
    fn handle(&self, ctx: &EmitContext, event: &Event);
}

impl<F> EventHandler for F
where
    F: Fn(&EmitContext, &Event) + Send + Sync,
{
    fn handle(&self, ctx: &EmitContext, event: &Event) {
        self(ctx, event)
    }
}

/// 处理器记录
///
/// `matcher` 是针对主题名求值的正则表达式，采用子串搜索语义：
/// 只要在主题名任意位置匹配即视为命中，除非模式自身以 `^`/`$` 锚定。
#[derive(Clone)]
pub struct Handler {
    matcher: String,
    callback: Arc<dyn EventHandler>,
}

impl Handler {
    pub fn new(matcher: impl Into<String>, callback: Arc<dyn EventHandler>) -> Self {
        Self {
            matcher: matcher.into(),
            callback,
        }
    }

    pub fn from_fn<F>(matcher: impl Into<String>, f: F) -> Self
    where
        F: Fn(&EmitContext, &Event) + Send + Sync + 'static,
    {
        Self::new(matcher, Arc::new(f))
    }

    pub fn matcher(&self) -> &str {
        &self.matcher
    }

    pub(crate) fn callback(&self) -> &Arc<dyn EventHandler> {
        &self.callback
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}
