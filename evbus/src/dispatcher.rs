//! 分发器（Dispatcher）
//!
//! 负责两件事：
//! - 按“显式选项 > 上下文 > 生成默认值”的优先级构造事件；
//! - 在调用方线程上按列表顺序同步投递给快照中的每个处理器。
//!
//! 投递期间不持有任何锁，处理器可以重入总线。
//!
use crate::{
    config::BusConfig,
    context::EmitContext,
    error::{BusError, BusResult, HandlerFailure},
    event::{Event, EventDraft, Payload},
    id::IdGenerator,
    registry::handlers::Subscriber,
};
use chrono::Utc;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{trace, warn};

pub(crate) struct Dispatcher {
    id_generator: Arc<dyn IdGenerator>,
    config: BusConfig,
}

impl Dispatcher {
    pub(crate) fn new(id_generator: Arc<dyn IdGenerator>, config: BusConfig) -> Self {
        Self {
            id_generator,
            config,
        }
    }

    pub(crate) fn config(&self) -> &BusConfig {
        &self.config
    }

    pub(crate) fn build_event(
        &self,
        ctx: &EmitContext,
        topic: &str,
        data: Payload,
        data_type: &'static str,
        draft: EventDraft,
    ) -> Event {
        let id = draft.id.unwrap_or_else(|| self.id_generator.generate());
        let tx_id = draft
            .tx_id
            .or_else(|| non_empty(ctx.tx_id()))
            .unwrap_or_else(|| self.id_generator.generate());
        let source = draft.source.or_else(|| non_empty(ctx.source()));
        let occurred_at = draft.occurred_at.unwrap_or_else(Utc::now);

        Event::new(
            id,
            tx_id,
            topic.to_string(),
            source,
            occurred_at,
            data,
            data_type,
        )
    }

    pub(crate) fn deliver(
        &self,
        ctx: &EmitContext,
        event: &Event,
        subscribers: &[Arc<Subscriber>],
    ) -> BusResult<()> {
        let mut failures = Vec::new();

        for subscriber in subscribers {
            trace!(
                handler = subscriber.key(),
                topic = event.topic(),
                event_id = event.id(),
                "delivering event"
            );

            if !self.config.isolate_handler_panics {
                subscriber.deliver(ctx, event);
                continue;
            }

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| subscriber.deliver(ctx, event)));
            if let Err(payload) = outcome {
                let message = panic_message(payload.as_ref());
                warn!(
                    handler = subscriber.key(),
                    topic = event.topic(),
                    event_id = event.id(),
                    %message,
                    "event handler panicked"
                );
                failures.push(HandlerFailure {
                    key: subscriber.key().to_string(),
                    message,
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(BusError::HandlerPanicked {
                topic: event.topic().to_string(),
                event_id: event.id().to_string(),
                failures,
            })
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn non_empty(v: Option<&str>) -> Option<String> {
    v.filter(|s| !s.is_empty()).map(str::to_owned)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
