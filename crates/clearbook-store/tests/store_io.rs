//! Integration tests: order store I/O, iteration and filtered listing.

use std::cell::Cell;

use clearbook_store::{KvIter, KvStore, MemStore, OrderStore, OrdersFilter, Traversal};
use clearbook_types::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;

const BTC_OWNER: &str = "wallet1p8ztgxrvd2e9w";
const ETH_OWNER: &str = "wallet13jyjuz3kkdvqx";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn btc_xfi_order(id: u64, direction: Direction, price: i64, qty: i64) -> Order {
    Order::dummy_for_owner(
        id,
        0,
        Owner::new(BTC_OWNER),
        direction,
        Decimal::new(price, 0),
        Decimal::new(qty, 0),
    )
}

fn eth_xfi_order(id: u64, direction: Direction, price: i64, qty: i64) -> Order {
    Order::dummy_for_owner(
        id,
        1,
        Owner::new(ETH_OWNER),
        direction,
        Decimal::new(price, 0),
        Decimal::new(qty, 0),
    )
}

/// Four orders across two markets and two owners, IDs 0..=3.
fn seeded_store() -> (OrderStore<MemStore>, Vec<Order>) {
    let orders = vec![
        btc_xfi_order(0, Direction::Ask, 11_000, 1_500),
        eth_xfi_order(1, Direction::Bid, 1_500, 1_500),
        btc_xfi_order(2, Direction::Bid, 9_000, 500),
        eth_xfi_order(3, Direction::Ask, 500, 500),
    ];
    let mut store = OrderStore::new(MemStore::new());
    for order in &orders {
        store.set(order).unwrap();
    }
    (store, orders)
}

fn ids(orders: &[Order]) -> Vec<u64> {
    orders.iter().map(|o| o.id.0).collect()
}

#[test]
fn store_io() {
    init_tracing();
    let mut store = OrderStore::new(MemStore::new());

    // non-existing
    assert!(!store.has(OrderId(0)).unwrap());
    assert!(matches!(
        store.get(OrderId(0)),
        Err(ClearbookError::OrderNotFound(_))
    ));

    // add
    let order = btc_xfi_order(0, Direction::Bid, 10_000, 100);
    store.set(&order).unwrap();
    assert_eq!(store.get(order.id).unwrap(), order);

    // delete
    store.delete(order.id).unwrap();
    assert!(!store.has(order.id).unwrap());

    // delete deleted
    store.delete(order.id).unwrap();
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn delete_absent_never_changes_contents() {
    let (mut store, _) = seeded_store();
    let before = store.backend().clone();
    store.delete(OrderId(42)).unwrap();
    store.delete(OrderId(u64::MAX)).unwrap();
    assert_eq!(store.backend(), &before);
}

#[test]
fn empty_list() {
    let store = OrderStore::new(MemStore::new());
    assert!(store.list().unwrap().is_empty());
    assert!(store.iter(Traversal::Reverse).unwrap().next().is_none());
    assert!(store.list_filtered(&OrdersFilter::default()).unwrap().is_empty());
}

#[test]
fn list_and_iterators() {
    let (store, orders) = seeded_store();

    assert_eq!(store.list().unwrap(), orders);

    let forward: Vec<u64> = store
        .iter(Traversal::Forward)
        .unwrap()
        .map(|o| o.unwrap().id.0)
        .collect();
    assert_eq!(forward, vec![0, 1, 2, 3]);

    let reverse: Vec<u64> = store
        .iter(Traversal::Reverse)
        .unwrap()
        .map(|o| o.unwrap().id.0)
        .collect();
    assert_eq!(reverse, vec![3, 2, 1, 0]);
}

#[test]
fn filtered_list() {
    let (store, _) = seeded_store();

    // limit
    let out = store.list_filtered(&OrdersFilter::new(1, 1)).unwrap();
    assert_eq!(ids(&out), vec![0]);

    // owner
    let out = store
        .list_filtered(&OrdersFilter::new(1, 100).with_owner(Owner::new(ETH_OWNER)))
        .unwrap();
    assert_eq!(ids(&out), vec![1, 3]);

    // direction
    let out = store
        .list_filtered(&OrdersFilter::new(1, 100).with_direction(Direction::Bid))
        .unwrap();
    assert_eq!(ids(&out), vec![1, 2]);

    // market
    let out = store
        .list_filtered(&OrdersFilter::new(1, 100).with_market(MarketId(0)))
        .unwrap();
    assert_eq!(ids(&out), vec![0, 2]);

    // no match
    let out = store
        .list_filtered(&OrdersFilter::new(1, 100).with_market(MarketId(2)))
        .unwrap();
    assert!(out.is_empty());
}

#[test]
fn invalid_pagination_rejected() {
    let (store, _) = seeded_store();
    for filter in [OrdersFilter::new(0, 1), OrdersFilter::new(1, 0)] {
        assert!(matches!(
            store.list_filtered(&filter),
            Err(ClearbookError::InvalidArgument { .. })
        ));
    }
}

#[test]
fn page_past_the_end_is_empty() {
    let (store, _) = seeded_store();
    assert!(store.list_filtered(&OrdersFilter::new(3, 2)).unwrap().is_empty());
    assert!(store
        .list_filtered(&OrdersFilter::new(u64::MAX, 2))
        .unwrap()
        .is_empty());
    assert!(store
        .list_filtered(&OrdersFilter::new(u64::MAX, u64::MAX))
        .unwrap()
        .is_empty());
    assert_eq!(ids(&store.list_filtered(&OrdersFilter::new(2, 2)).unwrap()), vec![2, 3]);
}

#[test]
fn random_inserts_list_in_ascending_order() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut orders = Order::random_batch(&mut rng, 0, 0, 200);
    // Shuffle insertion order by reversing odd/even halves.
    let (evens, odds): (Vec<Order>, Vec<Order>) =
        orders.drain(..).partition(|o| o.id.0 % 2 == 0);

    let mut store = OrderStore::new(MemStore::new());
    for order in odds.iter().rev().chain(evens.iter()) {
        store.set(order).unwrap();
    }

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 200);
    assert!(listed.windows(2).all(|w| w[0].id < w[1].id));

    let mut reversed: Vec<Order> = store
        .iter(Traversal::Reverse)
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();
    reversed.reverse();
    assert_eq!(reversed, listed);
}

#[test]
fn two_filters_return_intersection() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut store = OrderStore::new(MemStore::new());
    for order in Order::random_batch(&mut rng, 0, 0, 60)
        .into_iter()
        .chain(Order::random_batch(&mut rng, 1, 60, 60))
    {
        store.set(&order).unwrap();
    }

    let owner = Owner::new("wallet3");
    let big = u64::MAX;
    let by_owner = store
        .list_filtered(&OrdersFilter::new(1, big).with_owner(owner.clone()))
        .unwrap();
    let by_direction = store
        .list_filtered(&OrdersFilter::new(1, big).with_direction(Direction::Ask))
        .unwrap();
    let both = store
        .list_filtered(
            &OrdersFilter::new(1, big)
                .with_owner(owner)
                .with_direction(Direction::Ask),
        )
        .unwrap();

    let expected: Vec<u64> = ids(&by_owner)
        .into_iter()
        .filter(|id| ids(&by_direction).contains(id))
        .collect();
    assert_eq!(ids(&both), expected);
}

#[test]
fn first_page_of_one_is_first_match() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut store = OrderStore::new(MemStore::new());
    for order in Order::random_batch(&mut rng, 0, 10, 40) {
        store.set(&order).unwrap();
    }

    for direction in [Direction::Bid, Direction::Ask] {
        let all = store
            .list_filtered(&OrdersFilter::new(1, u64::MAX).with_direction(direction))
            .unwrap();
        let first = store
            .list_filtered(&OrdersFilter::new(1, 1).with_direction(direction))
            .unwrap();
        assert_eq!(first.first(), all.first());
        assert!(first.len() <= 1);
    }
}

/// Backend whose reads fail after a number of successful calls.
struct FailingStore {
    inner: MemStore,
    reads_left: Cell<usize>,
}

impl KvStore for FailingStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if self.reads_left.get() == 0 {
            return Err(ClearbookError::Storage("backend unavailable".into()));
        }
        self.reads_left.set(self.reads_left.get() - 1);
        self.inner.get(key)
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.inner.set(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.inner.delete(key)
    }

    fn iter_prefix<'a>(&'a self, prefix: &[u8], traversal: Traversal) -> Result<KvIter<'a>> {
        if self.reads_left.get() == 0 {
            return Err(ClearbookError::Storage("backend unavailable".into()));
        }
        self.inner.iter_prefix(prefix, traversal)
    }
}

#[test]
fn storage_faults_propagate() {
    let mut store = OrderStore::new(FailingStore {
        inner: MemStore::new(),
        reads_left: Cell::new(1),
    });
    store.set(&btc_xfi_order(0, Direction::Bid, 1, 1)).unwrap();

    assert!(store.get(OrderId(0)).is_ok());
    assert!(matches!(
        store.get(OrderId(0)),
        Err(ClearbookError::Storage(_))
    ));
    assert!(matches!(store.list(), Err(ClearbookError::Storage(_))));
}

#[test]
fn invalid_pagination_checked_before_store_access() {
    let store = OrderStore::new(FailingStore {
        inner: MemStore::new(),
        reads_left: Cell::new(0),
    });
    // A store read would yield Storage; the argument check wins.
    assert!(matches!(
        store.list_filtered(&OrdersFilter::new(0, 10)),
        Err(ClearbookError::InvalidArgument { .. })
    ));
}
