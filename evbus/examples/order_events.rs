use evbus::{Bus, BusError, EmitContext, EmitOption, Event, EventHandler, Handler, UlidGenerator};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
struct OrderPlaced {
    order_id: u32,
    amount_cents: u64,
}

#[derive(Default)]
struct Revenue {
    total_cents: AtomicU64,
}

impl EventHandler for Revenue {
    fn handle(&self, _ctx: &EmitContext, event: &Event) {
        if let Some(order) = event.data::<OrderPlaced>() {
            let (id, cents) = (order.order_id, order.amount_cents);
            println!("revenue: order={id}, +{cents} cents");
            self.total_cents.fetch_add(cents, Ordering::Relaxed);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bus = Bus::builder().id_generator(UlidGenerator::new()).build()?;
    bus.register_topics(["order.created", "order.shipped"]);

    let revenue = Arc::new(Revenue::default());
    let created = Handler::new(r"^order\.created$", revenue.clone());
    bus.register_handler("revenue", created)?;
    bus.register_handler(
        "audit",
        Handler::from_fn(r"^order\.", |ctx: &EmitContext, e: &Event| {
            println!(
                "audit: topic={}, id={}, tx={}, source={:?}, type={}",
                e.topic(),
                e.id(),
                e.tx_id(),
                ctx.source(),
                e.data_type()
            );
        }),
    )?;

    let ctx = EmitContext::builder()
        .maybe_tx_id(Some("checkout-1".into()))
        .maybe_source(Some("checkout".into()))
        .build();
    bus.emit(
        &ctx,
        "order.created",
        OrderPlaced {
            order_id: 7,
            amount_cents: 1250,
        },
    )?;
    bus.emit_with(
        &ctx,
        "order.shipped",
        7u32,
        [EmitOption::source("warehouse")],
    )?;
    let total = revenue.total_cents.load(Ordering::Relaxed);
    println!("revenue: {total} cents");

    // 未注册的主题 -> 返回 TopicNotFound 错误
    let refund = OrderPlaced {
        order_id: 7,
        amount_cents: 0,
    };
    if let Err(BusError::TopicNotFound { topic }) = bus.emit(&ctx, "order.refunded", refund) {
        eprintln!("TopicNotFound as expected for topic: {}", topic);
    }
    Ok(())
}
