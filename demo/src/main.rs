use anyhow::Context;
use evbus::{Bus, BusConfig, BusError, EmitContext, EmitOption, Event, Handler, UlidGenerator};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
enum AccountEvent {
    Opened { initial_balance: i64 },
    Deposited { amount: i64 },
    Withdrawn { amount: i64 },
}

impl AccountEvent {
    fn topic(&self) -> &'static str {
        match self {
            AccountEvent::Opened { .. } => "account.opened",
            AccountEvent::Deposited { .. } => "account.deposited",
            AccountEvent::Withdrawn { .. } => "account.withdrawn",
        }
    }
}

/// 按事件累加余额的读模型
#[derive(Default)]
struct Balances {
    inner: Mutex<HashMap<String, i64>>,
}

impl Balances {
    fn apply(&self, ctx: &EmitContext, event: &Event) {
        let Some(account) = ctx.extensions().and_then(|v| v["account"].as_str()) else {
            return;
        };
        let Some(change) = event.data::<AccountEvent>() else {
            return;
        };
        let mut store = self.inner.lock().unwrap();
        let balance = store.entry(account.to_string()).or_default();
        match change {
            AccountEvent::Opened { initial_balance } => *balance = *initial_balance,
            AccountEvent::Deposited { amount } => *balance += amount,
            AccountEvent::Withdrawn { amount } => *balance -= amount,
        }
    }

    fn get(&self, account: &str) -> Option<i64> {
        self.inner.lock().unwrap().get(account).copied()
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bus = Bus::builder()
        .id_generator(UlidGenerator::new())
        .config(BusConfig::default())
        .build()?;
    bus.register_topics(["account.opened", "account.deposited", "account.withdrawn"]);

    let balances = Arc::new(Balances::default());
    let model = balances.clone();
    bus.register_handler(
        "balances",
        Handler::from_fn(r"^account\.", move |ctx: &EmitContext, e: &Event| {
            model.apply(ctx, e);
        }),
    )?;
    bus.register_handler(
        "withdraw-alert",
        Handler::from_fn("withdrawn$", |_: &EmitContext, e: &Event| {
            let change = e.data::<AccountEvent>();
            println!("alert: withdrawal {change:?} (tx={})", e.tx_id());
        }),
    )?;

    let id = "acc-1";
    let ctx = EmitContext::builder()
        .tx_id("session-42".to_string())
        .source("teller".to_string())
        .extensions(json!({ "account": id }))
        .build();

    // 开户 / 存款 / 取款
    for change in [
        AccountEvent::Opened {
            initial_balance: 1000,
        },
        AccountEvent::Deposited { amount: 500 },
        AccountEvent::Withdrawn { amount: 200 },
    ] {
        let topic = change.topic();
        let event = bus.emit(&ctx, topic, change)?;
        println!("emitted: {:?}", event);
    }
    let balance = balances.get(id).context("balance projection missing")?;
    println!("balance: id={}, balance={}", id, balance);

    // 关闭告警处理器后，取款只更新余额
    bus.deregister_handler("withdraw-alert");
    bus.emit_with(
        &ctx,
        "account.withdrawn",
        AccountEvent::Withdrawn { amount: 300 },
        [EmitOption::source("atm")],
    )?;
    info!(balance = balances.get(id), "after atm withdrawal");

    // 故障处理器不会影响其他订阅者
    let flaky = Handler::from_fn("deposited$", |_: &EmitContext, _: &Event| {
        panic!("flaky subscriber");
    });
    bus.register_handler("flaky", flaky)?;
    let deposit = AccountEvent::Deposited { amount: 50 };
    match bus.emit(&ctx, "account.deposited", deposit) {
        Err(BusError::HandlerPanicked { failures, .. }) => {
            println!("isolated failures: {:?}", failures);
        }
        other => {
            other?;
        }
    }

    for topic in ["account.opened", "account.deposited", "account.withdrawn"] {
        println!("{} -> {:?}", topic, bus.topic_handlers(topic));
    }
    println!(
        "final: id={}, balance={}",
        id,
        balances.get(id).context("balance projection missing")?
    );
    Ok(())
}
