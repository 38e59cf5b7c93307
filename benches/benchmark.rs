use criterion::{Criterion, criterion_group, criterion_main};
use order_book_engine::orderbook::{OrderBook, new_order_ref};
use order_book_engine::orders::Order;
use order_book_engine::matcher::match_order;
use order_book_engine::types::{OrderType, Side};

fn setup_order_book(depth: u64, orders_per_level: u64) -> OrderBook {
    let mut book = OrderBook::new();
    for level in 1..=depth {
        let price = level as f64;
        for i in 0..orders_per_level {
            book.add_order(new_order_ref(
                Order::new(
                    1,
                    level * 1_000 + i,
                    "AAPL",
                    Side::Sell,
                    OrderType::Limit,
                    1,
                    price,
                )
                .unwrap(),
            ));
            book.add_order(new_order_ref(
                Order::new(
                    1,
                    (depth + level) * 1_000 + i,
                    "AAPL",
                    Side::Buy,
                    OrderType::Limit,
                    1,
                    price,
                )
                .unwrap(),
            ));
        }
    }
    book
}

fn bench_match_order(c: &mut Criterion) {
    let depth = 100;
    let orders_per_level = 10;

    c.bench_function("market order walks half the book", |b| {
        b.iter_batched(
            || setup_order_book(depth, orders_per_level),
            |mut book| {
                let incoming = new_order_ref(
                    Order::new(
                        1,
                        u64::MAX,
                        "AAPL",
                        Side::Buy,
                        OrderType::Market,
                        depth * orders_per_level / 2,
                        0.0,
                    )
                    .unwrap(),
                );
                match_order(incoming, &mut book)
            },
            criterion::BatchSize::SmallInput,
        )
    });

    c.bench_function("crossing limit order sweeps the book", |b| {
        b.iter_batched(
            || setup_order_book(depth, orders_per_level),
            |mut book| {
                let incoming = new_order_ref(
                    Order::new(
                        1,
                        u64::MAX,
                        "AAPL",
                        Side::Sell,
                        OrderType::Limit,
                        depth * orders_per_level,
                        (depth / 2) as f64,
                    )
                    .unwrap(),
                );
                match_order(incoming, &mut book)
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_match_order);
criterion_main!(benches);
