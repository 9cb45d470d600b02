//! Cart store behavior against in-process stock and catalog fakes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cart_core::{Cart, CatalogRecord, Price, ProductId, StockRecord};
use cart_data::{CatalogService, FetchError, StockService};
use cart_storage::{KvStore, MemoryStore, SnapshotStorage, StorageError, DEFAULT_CART_KEY};
use cart_store::{
    CartError, CartOperation, CartStore, CorruptSnapshotPolicy, Failure, Notice, Notifier,
};

#[derive(Default)]
struct FakeShop {
    stock: Mutex<HashMap<ProductId, i64>>,
    catalog: Mutex<HashMap<ProductId, CatalogRecord>>,
    offline: Mutex<bool>,
    delay: Option<Duration>,
    stock_calls: AtomicUsize,
    catalog_calls: AtomicUsize,
}

impl FakeShop {
    fn new() -> Self {
        Self::default()
    }

    fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    fn product(self, id: i64, name: &str, price: f64, stock: i64) -> Self {
        let id = ProductId::new(id);
        self.catalog.lock().unwrap().insert(
            id,
            CatalogRecord::new(id, name, Price::from_decimal(price)).with_image("shoe.jpg"),
        );
        self.stock.lock().unwrap().insert(id, stock);
        self
    }

    /// Serve `record` for `id`, whatever id the record itself carries.
    fn record(self, id: i64, record: CatalogRecord, stock: i64) -> Self {
        let id = ProductId::new(id);
        self.catalog.lock().unwrap().insert(id, record);
        self.stock.lock().unwrap().insert(id, stock);
        self
    }

    fn stock_only(self, id: i64, stock: i64) -> Self {
        self.stock.lock().unwrap().insert(ProductId::new(id), stock);
        self
    }

    fn set_stock(&self, id: i64, stock: i64) {
        self.stock.lock().unwrap().insert(ProductId::new(id), stock);
    }

    fn go_offline(&self) {
        *self.offline.lock().unwrap() = true;
    }

    fn check_online(&self) -> Result<(), FetchError> {
        if *self.offline.lock().unwrap() {
            return Err(FetchError::Request("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl StockService for FakeShop {
    async fn stock(&self, product_id: ProductId) -> Result<StockRecord, FetchError> {
        self.stock_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.check_online()?;
        let amount = self.stock.lock().unwrap().get(&product_id).copied();
        amount
            .map(|amount| StockRecord::new(product_id, amount))
            .ok_or(FetchError::Http {
                status: 404,
                url: format!("/stock/{}", product_id),
            })
    }
}

#[async_trait::async_trait]
impl CatalogService for FakeShop {
    async fn product(&self, product_id: ProductId) -> Result<Option<CatalogRecord>, FetchError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.check_online()?;
        Ok(self.catalog.lock().unwrap().get(&product_id).cloned())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<(CartOperation, ProductId, Notice)>>,
}

impl RecordingNotifier {
    fn notices(&self) -> Vec<Notice> {
        self.seen.lock().unwrap().iter().map(|(_, _, n)| *n).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, failure: &Failure<'_>) {
        self.seen
            .lock()
            .unwrap()
            .push((failure.operation, failure.product_id, failure.notice));
    }
}

/// A store whose writes always fail.
struct ReadOnlyStore(MemoryStore);

impl KvStore for ReadOnlyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.0.get(key)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Io {
            path: "readonly".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

struct Harness {
    store: CartStore,
    shop: Arc<FakeShop>,
    kv: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn open(shop: FakeShop, kv: MemoryStore) -> Self {
        let shop = Arc::new(shop);
        let kv = Arc::new(kv);
        let notifier = Arc::new(RecordingNotifier::default());
        let store = CartStore::builder(
            SnapshotStorage::new(kv.clone()),
            shop.clone(),
            shop.clone(),
        )
        .notifier(notifier.clone())
        .open()
        .unwrap();

        Self {
            store,
            shop,
            kv,
            notifier,
        }
    }

    fn with_cart(shop: FakeShop, raw: &str) -> Self {
        Self::open(shop, MemoryStore::with_value(DEFAULT_CART_KEY, raw))
    }

    fn persisted(&self) -> Option<Cart> {
        SnapshotStorage::new(self.kv.clone()).load().unwrap()
    }

    fn raw(&self) -> Option<String> {
        self.kv.get(DEFAULT_CART_KEY).unwrap()
    }
}

fn id(n: i64) -> ProductId {
    ProductId::new(n)
}

#[tokio::test]
async fn test_add_new_product() {
    let h = Harness::open(FakeShop::new().product(1, "Shoe", 100.0, 10), MemoryStore::new());

    let cart = h.store.add_product(id(1)).await.unwrap();

    let entry = cart.get(id(1)).unwrap();
    assert_eq!(cart.item_count(), 1);
    assert_eq!(entry.amount, 1);
    assert_eq!(entry.name, "Shoe");
    assert_eq!(entry.price, Price::from_decimal(100.0));
    assert_eq!(entry.image, "shoe.jpg");
    assert_eq!(h.persisted().as_ref(), Some(&*cart));
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn test_add_existing_product_over_stock() {
    let h = Harness::with_cart(
        FakeShop::new().product(1, "Shoe", 100.0, 1),
        r#"[{"id":1,"name":"Shoe","price":100,"image":"","amount":1}]"#,
    );
    let before = h.raw();

    let err = h.store.add_product(id(1)).await.unwrap_err();

    assert!(matches!(
        err,
        CartError::OutOfStock { requested: 2, available: 1, .. }
    ));
    assert_eq!(h.store.snapshot().amount_of(id(1)), Some(1));
    assert_eq!(h.raw(), before);
    assert_eq!(h.notifier.notices(), vec![Notice::OutOfStock]);
}

#[tokio::test]
async fn test_add_existing_product_increments() {
    let h = Harness::open(FakeShop::new().product(1, "Shoe", 100.0, 3), MemoryStore::new());

    h.store.add_product(id(1)).await.unwrap();
    h.store.add_product(id(1)).await.unwrap();
    let cart = h.store.add_product(id(1)).await.unwrap();

    assert_eq!(cart.item_count(), 1);
    assert_eq!(cart.amount_of(id(1)), Some(3));
    assert_eq!(cart.total().cents(), 30000);

    let err = h.store.add_product(id(1)).await.unwrap_err();
    assert!(matches!(err, CartError::OutOfStock { .. }));
    assert_eq!(h.persisted().unwrap().amount_of(id(1)), Some(3));
}

#[tokio::test]
async fn test_add_without_stock() {
    let h = Harness::open(FakeShop::new().product(1, "Shoe", 100.0, 0), MemoryStore::new());

    let err = h.store.add_product(id(1)).await.unwrap_err();

    assert!(matches!(err, CartError::OutOfStock { available: 0, .. }));
    assert!(h.store.snapshot().is_empty());
    assert_eq!(h.raw(), None);
    assert_eq!(h.notifier.notices(), vec![Notice::OutOfStock]);
}

#[tokio::test]
async fn test_add_unknown_product() {
    let h = Harness::open(FakeShop::new().stock_only(7, 5), MemoryStore::new());

    let err = h.store.add_product(id(7)).await.unwrap_err();

    assert!(matches!(err, CartError::CatalogNotFound(p) if p == id(7)));
    assert!(err.is_validation());
    assert!(h.store.snapshot().is_empty());
    assert_eq!(h.notifier.notices(), vec![Notice::AddFailed]);
}

#[tokio::test]
async fn test_add_rejects_record_for_another_product() {
    let other = CatalogRecord::new(id(8), "Boot", Price::from_decimal(50.0));
    let h = Harness::open(FakeShop::new().record(7, other, 5), MemoryStore::new());

    let err = h.store.add_product(id(7)).await.unwrap_err();

    assert!(matches!(err, CartError::CatalogNotFound(p) if p == id(7)));
    assert!(h.store.snapshot().is_empty());
    assert_eq!(h.raw(), None);
    assert_eq!(h.notifier.notices(), vec![Notice::AddFailed]);
}

#[tokio::test]
async fn test_catalog_fields_named_like_entry_fields_survive_reopen() {
    let record: CatalogRecord = serde_json::from_value(serde_json::json!({
        "id": 1,
        "name": "Shoe",
        "price": 19.99,
        "image": "a.jpg",
        "amount": 5,
        "brand": "Acme"
    }))
    .unwrap();
    let h = Harness::open(FakeShop::new().record(1, record, 5), MemoryStore::new());

    let cart = h.store.add_product(id(1)).await.unwrap();
    assert_eq!(h.persisted().as_ref(), Some(&*cart));

    let reopened = CartStore::builder(
        SnapshotStorage::new(h.kv.clone()),
        h.shop.clone(),
        h.shop.clone(),
    )
    .on_corrupt(CorruptSnapshotPolicy::Fail)
    .open()
    .unwrap();

    let entry = reopened.snapshot().get(id(1)).cloned().unwrap();
    assert_eq!(entry.amount, 1);
    assert_eq!(entry.price.cents(), 1999);
    assert_eq!(entry.extra.get("brand"), Some(&serde_json::json!("Acme")));
}

#[tokio::test]
async fn test_add_when_offline() {
    let h = Harness::open(FakeShop::new().product(1, "Shoe", 100.0, 5), MemoryStore::new());
    h.shop.go_offline();

    let err = h.store.add_product(id(1)).await.unwrap_err();

    assert!(matches!(err, CartError::Fetch(_)));
    assert!(!err.is_validation());
    assert!(h.store.snapshot().is_empty());
    assert_eq!(h.notifier.notices(), vec![Notice::AddFailed]);
}

#[tokio::test]
async fn test_add_looks_up_stock_and_catalog_once() {
    let h = Harness::open(FakeShop::new().product(1, "Shoe", 100.0, 5), MemoryStore::new());

    h.store.add_product(id(1)).await.unwrap();
    h.store.add_product(id(1)).await.unwrap();

    assert_eq!(h.shop.stock_calls.load(Ordering::SeqCst), 2);
    assert_eq!(h.shop.catalog_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_remove_product() {
    let h = Harness::with_cart(
        FakeShop::new(),
        r#"[{"id":5,"name":"Boot","price":59.9,"image":"","amount":2}]"#,
    );

    let cart = h.store.remove_product(id(5)).unwrap();

    assert!(cart.is_empty());
    assert_eq!(h.raw().as_deref(), Some("[]"));
    assert_eq!(h.shop.stock_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_remove_missing_product() {
    let h = Harness::open(FakeShop::new(), MemoryStore::new());

    let err = h.store.remove_product(id(99)).unwrap_err();

    assert!(matches!(err, CartError::NotInCart(p) if p == id(99)));
    assert!(h.store.snapshot().is_empty());
    assert_eq!(h.raw(), None);
    assert_eq!(h.notifier.notices(), vec![Notice::RemoveFailed]);
}

#[tokio::test]
async fn test_update_below_one_is_ignored() {
    let h = Harness::with_cart(
        FakeShop::new().product(1, "Shoe", 100.0, 10),
        r#"[{"id":1,"name":"Shoe","price":100,"image":"","amount":3}]"#,
    );
    let before = h.store.snapshot();

    let zero = h.store.update_product_amount(id(1), 0).await.unwrap();
    let negative = h.store.update_product_amount(id(1), -4).await.unwrap();

    assert_eq!(*zero, *before);
    assert_eq!(*negative, *before);
    assert_eq!(h.store.snapshot().amount_of(id(1)), Some(3));
    assert_eq!(h.shop.stock_calls.load(Ordering::SeqCst), 0);
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn test_update_amount() {
    let h = Harness::with_cart(
        FakeShop::new().product(1, "Shoe", 100.0, 10).product(2, "Boot", 50.0, 10),
        r#"[{"id":1,"name":"Shoe","price":100,"image":"","amount":1},{"id":2,"name":"Boot","price":50,"image":"","amount":1}]"#,
    );

    let cart = h.store.update_product_amount(id(2), 4).await.unwrap();

    assert_eq!(cart.amount_of(id(1)), Some(1));
    assert_eq!(cart.amount_of(id(2)), Some(4));
    assert_eq!(cart.entries()[1].id, id(2));
    assert_eq!(h.persisted().as_ref(), Some(&*cart));
}

#[tokio::test]
async fn test_update_over_stock() {
    let h = Harness::with_cart(
        FakeShop::new().product(1, "Shoe", 100.0, 2),
        r#"[{"id":1,"name":"Shoe","price":100,"image":"","amount":1}]"#,
    );

    let err = h.store.update_product_amount(id(1), 3).await.unwrap_err();

    assert!(matches!(
        err,
        CartError::OutOfStock { requested: 3, available: 2, .. }
    ));
    assert_eq!(h.store.snapshot().amount_of(id(1)), Some(1));
    assert_eq!(h.notifier.notices(), vec![Notice::OutOfStock]);
}

#[tokio::test]
async fn test_update_product_not_in_cart_rewrites_unchanged_cart() {
    let h = Harness::open(FakeShop::new().product(3, "Sandal", 30.0, 5), MemoryStore::new());

    let cart = h.store.update_product_amount(id(3), 2).await.unwrap();

    assert!(cart.is_empty());
    assert_eq!(h.raw().as_deref(), Some("[]"));
}

#[tokio::test]
async fn test_update_when_offline() {
    let h = Harness::with_cart(
        FakeShop::new().product(1, "Shoe", 100.0, 5),
        r#"[{"id":1,"name":"Shoe","price":100,"image":"","amount":1}]"#,
    );
    h.shop.go_offline();

    let err = h.store.update_product_amount(id(1), 2).await.unwrap_err();

    assert!(matches!(err, CartError::Fetch(_)));
    assert_eq!(h.store.snapshot().amount_of(id(1)), Some(1));
    assert_eq!(h.notifier.notices(), vec![Notice::UpdateFailed]);
}

#[tokio::test]
async fn test_stock_drop_is_seen_by_next_update() {
    let h = Harness::open(FakeShop::new().product(1, "Shoe", 100.0, 5), MemoryStore::new());
    h.store.add_product(id(1)).await.unwrap();
    h.shop.set_stock(1, 1);

    let err = h.store.update_product_amount(id(1), 2).await.unwrap_err();
    assert!(matches!(err, CartError::OutOfStock { available: 1, .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_keep_one_entry() {
    let shop = FakeShop::with_delay(Duration::from_millis(20)).product(1, "Shoe", 100.0, 10);
    let h = Harness::open(shop, MemoryStore::new());

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let store = h.store.clone();
            tokio::spawn(async move { store.add_product(id(1)).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let cart = h.store.snapshot();
    assert_eq!(cart.item_count(), 1);
    assert_eq!(cart.amount_of(id(1)), Some(5));
    assert_eq!(h.persisted().as_ref(), Some(&*cart));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_respect_stock() {
    let shop = FakeShop::with_delay(Duration::from_millis(20)).product(1, "Shoe", 100.0, 1);
    let h = Harness::open(shop, MemoryStore::new());

    let a = tokio::spawn({
        let store = h.store.clone();
        async move { store.add_product(id(1)).await }
    });
    let b = tokio::spawn({
        let store = h.store.clone();
        async move { store.add_product(id(1)).await }
    });
    let results = [a.await.unwrap(), b.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(h.store.snapshot().amount_of(id(1)), Some(1));
    assert_eq!(h.notifier.notices(), vec![Notice::OutOfStock]);
}

#[tokio::test]
async fn test_remove_during_pending_add() {
    let shop = FakeShop::with_delay(Duration::from_millis(50))
        .product(1, "Shoe", 100.0, 5)
        .product(2, "Boot", 50.0, 5);
    let h = Harness::with_cart(
        shop,
        r#"[{"id":2,"name":"Boot","price":50,"image":"","amount":1}]"#,
    );

    let pending = tokio::spawn({
        let store = h.store.clone();
        async move { store.add_product(id(1)).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    h.store.remove_product(id(2)).unwrap();

    let cart = pending.await.unwrap().unwrap();
    assert!(!cart.contains(id(2)));
    assert_eq!(cart.amount_of(id(1)), Some(1));
    assert_eq!(h.persisted().as_ref(), Some(&*cart));
}

#[tokio::test]
async fn test_persisted_matches_memory_after_mixed_operations() {
    let h = Harness::open(
        FakeShop::new().product(1, "Shoe", 100.0, 4).product(2, "Boot", 50.0, 1),
        MemoryStore::new(),
    );

    h.store.add_product(id(1)).await.unwrap();
    h.store.add_product(id(2)).await.unwrap();
    let _ = h.store.add_product(id(2)).await;
    h.store.update_product_amount(id(1), 4).await.unwrap();
    let _ = h.store.update_product_amount(id(1), 9).await;
    let _ = h.store.remove_product(id(3));
    h.store.remove_product(id(2)).unwrap();

    let cart = h.store.snapshot();
    assert_eq!(cart.amount_of(id(1)), Some(4));
    assert_eq!(h.persisted().as_ref(), Some(&*cart));
    assert_eq!(
        h.notifier.notices(),
        vec![Notice::OutOfStock, Notice::OutOfStock, Notice::RemoveFailed]
    );
}

#[tokio::test]
async fn test_write_failure_leaves_cart_unchanged() {
    let shop = Arc::new(FakeShop::new().product(1, "Shoe", 100.0, 5));
    let notifier = Arc::new(RecordingNotifier::default());
    let store = CartStore::builder(
        SnapshotStorage::new(Arc::new(ReadOnlyStore(MemoryStore::new()))),
        shop.clone(),
        shop,
    )
    .notifier(notifier.clone())
    .open()
    .unwrap();

    let err = store.add_product(id(1)).await.unwrap_err();

    assert!(matches!(err, CartError::Storage(_)));
    assert!(store.snapshot().is_empty());
    assert_eq!(notifier.notices(), vec![Notice::AddFailed]);
}

#[tokio::test]
async fn test_subscribers_see_new_snapshots() {
    let h = Harness::open(FakeShop::new().product(1, "Shoe", 100.0, 5), MemoryStore::new());
    let mut rx = h.store.subscribe();
    assert!(rx.borrow_and_update().is_empty());

    h.store.add_product(id(1)).await.unwrap();

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow().amount_of(id(1)), Some(1));
}

#[tokio::test]
async fn test_clones_share_the_cart() {
    let h = Harness::open(FakeShop::new().product(1, "Shoe", 100.0, 5), MemoryStore::new());
    let other = h.store.clone();

    other.add_product(id(1)).await.unwrap();

    assert_eq!(h.store.snapshot().amount_of(id(1)), Some(1));
}

#[test]
fn test_open_restores_persisted_cart() {
    let h = Harness::with_cart(
        FakeShop::new(),
        r#"[{"id":1,"title":"Tênis","price":179.9,"image":"a.jpg","amount":2}]"#,
    );

    let cart = h.store.snapshot();
    assert_eq!(cart.amount_of(id(1)), Some(2));
    assert_eq!(cart.get(id(1)).unwrap().name, "Tênis");
}

#[test]
fn test_open_merges_duplicate_entries() {
    let h = Harness::with_cart(
        FakeShop::new(),
        r#"[{"id":1,"name":"Shoe","price":100,"amount":1},{"id":1,"name":"Shoe","price":100,"amount":1}]"#,
    );

    let cart = h.store.snapshot();
    assert_eq!(cart.item_count(), 1);
    assert_eq!(cart.amount_of(id(1)), Some(2));
}

#[test]
fn test_open_with_corrupt_data_resets() {
    let h = Harness::with_cart(FakeShop::new(), "{not json");

    assert!(h.store.snapshot().is_empty());
    assert_eq!(h.raw().as_deref(), Some("{not json"));
}

#[test]
fn test_open_with_corrupt_data_can_fail() {
    let shop = Arc::new(FakeShop::new());
    let kv = Arc::new(MemoryStore::with_value(DEFAULT_CART_KEY, "{not json"));

    let result = CartStore::builder(SnapshotStorage::new(kv), shop.clone(), shop)
        .on_corrupt(CorruptSnapshotPolicy::Fail)
        .open();

    match result {
        Err(CartError::Storage(e)) => assert!(e.is_corrupt()),
        other => panic!("expected corrupt storage error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_corrupt_data_is_replaced_by_next_mutation() {
    let h = Harness::with_cart(FakeShop::new().product(1, "Shoe", 100.0, 5), "{not json");

    h.store.add_product(id(1)).await.unwrap();

    assert_eq!(h.persisted().unwrap().amount_of(id(1)), Some(1));
}
