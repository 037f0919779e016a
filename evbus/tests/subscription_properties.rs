//! 订阅关系的性质测试
//!
//! 随机生成注册/注销序列，检查每一步之后：
//! - 主题名与处理器键不重复；
//! - H 出现在 T 的处理器列表中，当且仅当二者均已注册且 H 的模式命中 T；
//! - 重复注册已有主题不改变其处理器列表（含顺序）。

use evbus::{Bus, EmitContext, Event, Handler, matches};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

const TOPICS: &[&str] = &[
    "order.created",
    "order.shipped",
    "order.updated.v2",
    "user.created",
    "user.deleted",
    "backorder.created",
];

const PATTERNS: &[&str] = &[
    ".*",
    r"^order\.",
    "created$",
    "order.updated",
    "user",
    "^nothing$",
];

const KEYS: &[&str] = &["audit", "mailer", "metrics", "search"];

#[derive(Debug, Clone)]
enum Op {
    RegisterTopic(usize),
    DeregisterTopic(usize),
    RegisterHandler(usize, usize),
    DeregisterHandler(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..TOPICS.len()).prop_map(Op::RegisterTopic),
        (0..TOPICS.len()).prop_map(Op::DeregisterTopic),
        (0..KEYS.len(), 0..PATTERNS.len()).prop_map(|(k, p)| Op::RegisterHandler(k, p)),
        (0..KEYS.len()).prop_map(Op::DeregisterHandler),
    ]
}

fn noop(matcher: &str) -> Handler {
    Handler::from_fn(matcher, |_ctx: &EmitContext, _e: &Event| {})
}

fn unique(v: &[String]) -> bool {
    v.iter().collect::<HashSet<_>>().len() == v.len()
}

/// 外部模型：只记录“谁注册了什么”，链接由定义直接推出
#[derive(Default)]
struct Model {
    topics: HashSet<&'static str>,
    handlers: HashMap<&'static str, &'static str>,
}

fn check(bus: &Bus, model: &Model) -> Result<(), TestCaseError> {
    let topics = bus.topics();
    let keys = bus.handler_keys();
    prop_assert!(unique(&topics));
    prop_assert!(unique(&keys));
    let registered: HashSet<&str> = topics.iter().map(String::as_str).collect();
    prop_assert_eq!(registered, model.topics.clone());
    prop_assert_eq!(
        keys.iter().map(String::as_str).collect::<HashSet<_>>(),
        model.handlers.keys().copied().collect::<HashSet<_>>()
    );

    for topic in TOPICS {
        let linked = bus.topic_handlers(topic);
        prop_assert!(unique(&linked));
        for key in KEYS {
            let pattern = model.handlers.get(key);
            let hit = pattern.is_some_and(|p| matches(p, topic).unwrap());
            let expected = model.topics.contains(topic) && hit;
            prop_assert_eq!(
                linked.iter().any(|k| k == key),
                expected,
                "topic={} key={}",
                topic,
                key
            );
            prop_assert_eq!(
                bus.handler_subscriptions(key).iter().any(|t| t == topic),
                expected,
                "topic={} key={}",
                topic,
                key
            );
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn links_stay_consistent(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let bus = Bus::new(|| "fakeid".to_string());
        let mut model = Model::default();

        for op in ops {
            match op {
                Op::RegisterTopic(t) => {
                    let before = bus.topic_handlers(TOPICS[t]);
                    let existed = bus.has_topic(TOPICS[t]);
                    bus.register_topics([TOPICS[t]]);
                    if existed {
                        prop_assert_eq!(bus.topic_handlers(TOPICS[t]), before);
                    }
                    model.topics.insert(TOPICS[t]);
                }
                Op::DeregisterTopic(t) => {
                    bus.deregister_topics([TOPICS[t]]);
                    model.topics.remove(TOPICS[t]);
                }
                Op::RegisterHandler(k, p) => {
                    bus.register_handler(KEYS[k], noop(PATTERNS[p])).unwrap();
                    model.handlers.insert(KEYS[k], PATTERNS[p]);
                }
                Op::DeregisterHandler(k) => {
                    bus.deregister_handler(KEYS[k]);
                    model.handlers.remove(KEYS[k]);
                }
            }
            check(&bus, &model)?;
        }
    }

    #[test]
    fn emit_reaches_exactly_the_linked_handlers(
        registered in prop::collection::vec((0..KEYS.len(), 0..PATTERNS.len()), 0..8),
        topic in 0..TOPICS.len(),
    ) {
        use std::sync::{Arc, Mutex};

        let bus = Bus::new(|| "fakeid".to_string());
        bus.register_topics(TOPICS);
        let seen = Arc::new(Mutex::new(Vec::new()));
        for (k, p) in registered {
            let seen = seen.clone();
            let key = KEYS[k];
            bus.register_handler(
                key,
                Handler::from_fn(PATTERNS[p], move |_: &EmitContext, _: &Event| {
                    seen.lock().unwrap().push(key.to_string());
                }),
            )
            .unwrap();
        }

        let ctx = EmitContext::default();
        bus.emit(&ctx, TOPICS[topic], ()).unwrap();

        let delivered = seen.lock().unwrap().clone();
        prop_assert_eq!(delivered, bus.topic_handlers(TOPICS[topic]));
    }
}
