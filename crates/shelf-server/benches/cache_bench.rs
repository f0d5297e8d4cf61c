use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::sync::Arc;
use tokio::runtime::Runtime;

use shelf_core::{EntityId, Product, RequestContext};
use shelf_server::cache::{CacheStore, EntityCache};
use shelf_source::MemoryTable;

/// Producto de prueba con custom fields completos
fn create_test_product(id: u64) -> Product {
    let mut product = Product::new(id, format!("Benchmark product {}", id));
    product.description = "Lorem ipsum dolor sit amet ".repeat(8);
    product.custom_fields.brand_name = Some("Finca La Esperanza".to_string());
    product.custom_fields.origin_country = Some("Colombia".to_string());
    product.custom_fields.ean = Some(format!("{:013}", id));
    product.variant_ids = (1..=6).map(|v| EntityId::new(id * 10 + v)).collect();
    product
}

fn product_cache(count: u64) -> (Arc<MemoryTable<Product>>, EntityCache<Product>) {
    let table = Arc::new(MemoryTable::new("products"));
    table.upsert((1..=count).map(create_test_product));
    let cache = EntityCache::<Product>::new(CacheStore::in_memory(), table.clone(), "vendure");
    (table, cache)
}

/// Benchmark: lookup servido desde cache
fn bench_lookup_hit(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (_table, cache) = product_cache(1);
    let ctx = RequestContext::default();

    rt.block_on(async {
        cache.lookup(&ctx, EntityId::new(1)).await.unwrap();
    });

    c.bench_function("lookup_hit", |b| {
        b.to_async(&rt).iter(|| async {
            let result = cache.lookup(&ctx, EntityId::new(1)).await;
            std::hint::black_box(result)
        });
    });
}

/// Benchmark: lookup que va al source (miss + invalidate)
fn bench_lookup_miss(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (_table, cache) = product_cache(1);
    let ctx = RequestContext::default();

    c.bench_function("lookup_miss", |b| {
        b.to_async(&rt).iter(|| async {
            cache.invalidate(EntityId::new(1)).await;
            let result = cache.lookup(&ctx, EntityId::new(1)).await;
            std::hint::black_box(result)
        });
    });
}

/// Benchmark: warmup con distintos tamaños de catalogo
fn bench_warmup(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("warmup");
    group.sample_size(10);

    for size in [100u64, 1_000, 5_000] {
        let (_table, cache) = product_cache(size);
        let ctx = RequestContext::system();

        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.to_async(&rt).iter(|| async {
                let report = cache.warm(&ctx, 1000).await;
                std::hint::black_box(report)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lookup_hit, bench_lookup_miss, bench_warmup);
criterion_main!(benches);
