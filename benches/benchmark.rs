use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use grove::{AvlTree, PriorityQueue};

const N: usize = 100_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();

    c.bench_function("tree_insert", |b| {
        let mut tree = AvlTree::new();
        b.iter(|| {
            for value in &values {
                tree.insert(*value);
            }
        })
    });

    let mut tree = AvlTree::new();
    for value in &values {
        tree.insert(*value);
    }

    c.bench_function("tree_contains", |b| {
        b.iter(|| {
            for value in &values {
                black_box(tree.contains(value));
            }
        })
    });

    c.bench_function("tree_iter", |b| {
        b.iter(|| {
            for value in &tree {
                black_box(value);
            }
        })
    });

    c.bench_function("tree_remove", |b| {
        let mut tree = tree.clone();
        b.iter(|| {
            for value in &values {
                tree.remove(value);
            }
        })
    });

    let keys: Vec<i64> = (1..=N).map(|_| rng.gen()).collect();

    c.bench_function("queue_push", |b| {
        let mut queue = PriorityQueue::new();
        b.iter(|| {
            for key in &keys {
                queue.push(*key, *key);
            }
        })
    });

    c.bench_function("queue_push_pop", |b| {
        let mut queue = PriorityQueue::new();
        b.iter(|| {
            for key in &keys {
                queue.push(*key, *key);
            }
            while queue.pop().is_ok() {}
        })
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
