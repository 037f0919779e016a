use serde::{Deserialize, Serialize};

/// 总线配置
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// 逐个隔离处理器的 panic：某个处理器 panic 后其余处理器仍会收到事件，
    /// 发布结束后汇总为 `BusError::HandlerPanicked`。
    /// 关闭时 panic 直接传播给 `emit` 的调用方，并中止剩余投递。
    pub isolate_handler_panics: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            isolate_handler_panics: true,
        }
    }
}
