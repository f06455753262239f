use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;
use rb_concat_tree::red_black_tree::RedBlackTree;

const NUM_OF_OPERATIONS: usize = 100;

fn bench_insert(c: &mut Criterion) {
    c.bench_function("bench red_black_tree insert", |b| {
        b.iter(|| {
            let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
            let mut tree = RedBlackTree::new();
            for _ in 0..NUM_OF_OPERATIONS {
                let key = u64::from(rng.next_u32());
                let val = rng.next_u32();

                tree.insert(key, val).unwrap();
            }
        })
    });
}

fn bench_get(c: &mut Criterion) {
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    let mut tree = RedBlackTree::new();
    let mut values = Vec::new();
    for _ in 0..NUM_OF_OPERATIONS {
        let key = u64::from(rng.next_u32());
        let val = rng.next_u32();

        tree.insert(key, val).unwrap();
        values.push(key);
    }

    c.bench_function("bench red_black_tree get", move |b| {
        b.iter(|| {
            for key in &values {
                black_box(tree.get(*key));
            }
        })
    });
}

fn bench_remove(c: &mut Criterion) {
    c.bench_function("bench red_black_tree remove", |b| {
        b.iter(|| {
            let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
            let mut tree = RedBlackTree::new();
            let mut values = Vec::new();
            for _ in 0..NUM_OF_OPERATIONS {
                let key = u64::from(rng.next_u32());
                let val = rng.next_u32();

                tree.insert(key, val).unwrap();
                values.push(key);
            }
            for key in &values {
                black_box(tree.remove(*key).ok());
            }
        })
    });
}

fn bench_split_concat(c: &mut Criterion) {
    c.bench_function("bench red_black_tree split concat", |b| {
        b.iter(|| {
            let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
            let mut tree = RedBlackTree::new();
            let mut values = Vec::new();
            for _ in 0..NUM_OF_OPERATIONS {
                let key = u64::from(rng.next_u32());
                let val = rng.next_u32();

                tree.insert(key, val).unwrap();
                values.push(key);
            }
            for key in values {
                let (mut lower, upper) = tree.split(key);
                let val = lower.remove(key).unwrap();
                tree = RedBlackTree::concat(lower, upper, key, val).unwrap();
            }
            black_box(tree);
        })
    });
}

criterion_group!(
    benches,
    bench_insert,
    bench_get,
    bench_remove,
    bench_split_concat,
);
criterion_main!(benches);
