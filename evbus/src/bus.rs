//! 事件总线门面（Bus）
//!
//! 组合注册表、订阅解析与分发器，对外提供发布、主题/处理器注册与只读查询。
//!
//! 并发约定：
//! - 变更操作持有写锁直至链接推导完成，对外表现为原子操作；
//! - 发布只在读锁下拷贝主题的处理器列表，随后释放锁再依次调用回调；
//! - 与进行中的发布并发注册的处理器，可能收到也可能收不到那一次事件。
//!
use crate::{
    config::BusConfig,
    context::EmitContext,
    dispatcher::Dispatcher,
    error::{BusError, BusResult},
    event::{EmitOption, Event, EventDraft},
    handler::Handler,
    id::IdGenerator,
    registry::{Registry, handlers::Subscriber},
};
use parking_lot::RwLock;
use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// 进程内发布/订阅总线
///
/// 显式持有的实例，通过引用或 `Arc` 在调用点之间共享；同一进程可存在任意多个互不相干的总线。
pub struct Bus {
    registry: RwLock<Registry>,
    dispatcher: Dispatcher,
}

/// `Bus` 构造器：缺少 ID 生成器时 `build` 返回配置错误
#[derive(Default)]
pub struct BusBuilder {
    id_generator: Option<Arc<dyn IdGenerator>>,
    config: BusConfig,
}

impl BusBuilder {
    pub fn id_generator<G>(self, generator: G) -> Self
    where
        G: IdGenerator + 'static,
    {
        self.maybe_id_generator(Some(Arc::new(generator)))
    }

    pub fn maybe_id_generator(mut self, generator: Option<Arc<dyn IdGenerator>>) -> Self {
        self.id_generator = generator;
        self
    }

    pub fn config(mut self, config: BusConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> BusResult<Bus> {
        let Some(id_generator) = self.id_generator else {
            return Err(BusError::configuration("id generator is required"));
        };

        Ok(Bus {
            registry: RwLock::new(Registry::default()),
            dispatcher: Dispatcher::new(id_generator, self.config),
        })
    }
}

impl fmt::Debug for BusBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusBuilder")
            .field("id_generator", &self.id_generator.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl Bus {
    pub fn builder() -> BusBuilder {
        BusBuilder::default()
    }

    /// 以默认配置创建总线
    pub fn new<G>(generator: G) -> Self
    where
        G: IdGenerator + 'static,
    {
        Self {
            registry: RwLock::new(Registry::default()),
            dispatcher: Dispatcher::new(Arc::new(generator), BusConfig::default()),
        }
    }

    pub fn config(&self) -> &BusConfig {
        self.dispatcher.config()
    }

    // --- 发布 ---

    /// 构造事件并同步投递给主题当前的全部处理器，全部返回后才返回
    ///
    /// 主题未注册时返回 `TopicNotFound`，且不调用任何处理器。
    pub fn emit<T>(&self, ctx: &EmitContext, topic: &str, data: T) -> BusResult<Event>
    where
        T: Any + Send + Sync,
    {
        self.emit_with(ctx, topic, data, std::iter::empty())
    }

    /// 同 [`Bus::emit`]，并按 `options` 覆盖事件字段
    pub fn emit_with<T, I>(
        &self,
        ctx: &EmitContext,
        topic: &str,
        data: T,
        options: I,
    ) -> BusResult<Event>
    where
        T: Any + Send + Sync,
        I: IntoIterator<Item = EmitOption>,
    {
        let subscribers = {
            let registry = self.registry.read();
            registry
                .topics()
                .snapshot(topic)
                .ok_or_else(|| BusError::topic_not_found(topic))?
        };

        let event = self.dispatcher.build_event(
            ctx,
            topic,
            Arc::new(data),
            type_name::<T>(),
            EventDraft::from_options(options),
        );
        self.dispatcher.deliver(ctx, &event, &subscribers)?;

        Ok(event)
    }

    // --- 主题 ---

    /// 注册主题；已存在的主题保持原样。整批在一次写锁内完成
    pub fn register_topics<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = self.registry.write();
        for name in names {
            let name = name.as_ref();
            if registry.register_topic(name) {
                debug!(
                    topic = name,
                    handlers = registry.topics().handler_keys(name).len(),
                    "topic registered"
                );
            }
        }
    }

    /// 注销主题及其全部链接；处理器本身保留
    pub fn deregister_topics<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = self.registry.write();
        for name in names {
            let name = name.as_ref();
            if registry.deregister_topic(name) {
                debug!(topic = name, "topic deregistered");
            }
        }
    }

    /// 全部主题名，顺序不定
    pub fn topics(&self) -> Vec<String> {
        self.registry.read().topics().names()
    }

    pub fn has_topic(&self, name: &str) -> bool {
        self.registry.read().topics().contains(name)
    }

    /// 主题当前的处理器键（投递顺序）；主题不存在时为空，需配合 [`Bus::has_topic`] 区分
    pub fn topic_handlers(&self, name: &str) -> Vec<String> {
        self.registry.read().topics().handler_keys(name)
    }

    // --- 处理器 ---

    /// 注册或替换处理器
    ///
    /// 模式无法编译时返回 `InvalidPattern`，同键的旧处理器保持不变。
    pub fn register_handler(&self, key: impl Into<String>, handler: Handler) -> BusResult<()> {
        let subscriber = Subscriber::compile(key.into(), &handler).inspect_err(|err| {
            warn!(error = %err, "handler rejected");
        })?;

        let mut registry = self.registry.write();
        let key = subscriber.key().to_string();
        let replaced = registry.register_handler(subscriber);
        debug!(
            handler = %key,
            matcher = handler.matcher(),
            topics = registry.handlers().subscriptions(&key).len(),
            replaced = replaced.is_some(),
            "handler registered"
        );

        Ok(())
    }

    /// 注销处理器；未知键时不做任何事
    pub fn deregister_handler(&self, key: &str) {
        let mut registry = self.registry.write();
        if let Some(entry) = registry.deregister_handler(key) {
            debug!(
                handler = key,
                topics = entry.links.len(),
                "handler deregistered"
            );
        }
    }

    /// 全部处理器键，顺序不定
    pub fn handler_keys(&self) -> Vec<String> {
        self.registry.read().handlers().keys()
    }

    pub fn has_handler(&self, key: &str) -> bool {
        self.registry.read().handlers().contains(key)
    }

    pub fn handler_matcher(&self, key: &str) -> Option<String> {
        self.registry
            .read()
            .handlers()
            .get(key)
            .map(|e| e.subscriber.matcher().to_string())
    }

    /// 处理器当前链接的主题名；未知键时为空
    pub fn handler_subscriptions(&self, key: &str) -> Vec<String> {
        self.registry.read().handlers().subscriptions(key)
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.read();
        f.debug_struct("Bus")
            .field("topics", &registry.topics().len())
            .field("handlers", &registry.handlers().len())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}
