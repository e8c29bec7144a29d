use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::{DVec3, dvec3};
use hullmesh::{DecimateParams, HullParams, Mesh};
use std::hint::black_box;

fn random_points(seed: u64, count: usize) -> Vec<DVec3> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..count)
        .map(|_| dvec3(rng.f64(), rng.f64(), rng.f64()) * 2.0 - DVec3::ONE)
        .collect()
}

fn sphere_points(count: usize) -> Vec<DVec3> {
    let golden = std::f64::consts::PI * (3.0 - 5.0f64.sqrt());
    (0..count)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / count as f64;
            let r = (1.0 - y * y).sqrt();
            let theta = golden * i as f64;
            dvec3(r * theta.cos(), y, r * theta.sin())
        })
        .collect()
}

fn bench_convex_hull(c: &mut Criterion) {
    let mut group = c.benchmark_group("convex_hull");
    for count in [100usize, 1000] {
        let cloud = random_points(1, count);
        group.bench_with_input(BenchmarkId::new("cube_cloud", count), &cloud, |b, points| {
            b.iter(|| Mesh::convex_hull(black_box(points), &HullParams::default()).unwrap())
        });
        let sphere = sphere_points(count);
        group.bench_with_input(BenchmarkId::new("sphere", count), &sphere, |b, points| {
            b.iter(|| Mesh::convex_hull(black_box(points), &HullParams::default()).unwrap())
        });
    }
    group.finish();
}

fn bench_decimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("decimate");
    let (sphere, _) = Mesh::convex_hull(&sphere_points(2000), &HullParams::default()).unwrap();
    let faces = sphere.num_faces();
    for fraction in [2usize, 10] {
        let params = DecimateParams::default().with_max_contractions(faces / (2 * fraction));
        group.bench_with_input(
            BenchmarkId::new("sphere_2000", fraction),
            &params,
            |b, params| {
                b.iter_batched(
                    || Mesh::convex_hull(&sphere_points(2000), &HullParams::default()).unwrap().0,
                    |mut mesh| mesh.decimate(black_box(params)).unwrap(),
                    criterion::BatchSize::LargeInput,
                )
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_convex_hull, bench_decimate);
criterion_main!(benches);
