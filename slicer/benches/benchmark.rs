use common::config::{Axis, SectionConfig};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use slicer::{
    builder::MeshBuilder,
    contour,
    diagnostics::Diagnostic,
    intersection::{intersect_plane, Plane, Segments1D},
    pipeline::SectionPipeline,
    resample::resample,
    Pos,
};

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("Mesh Intersections");

    for (rings, segments) in [(32, 48), (128, 192), (512, 768)] {
        let mut builder = MeshBuilder::new();
        builder.add_sphere(Axis::X, Pos::zeros(), 10.0, rings, segments);
        let mesh = builder.build();
        let index = Segments1D::from_mesh(&mesh, Axis::X, 100);
        let name = format!("sphere {rings}x{segments}");

        group.bench_with_input(BenchmarkId::new("Linear", &name), &mesh, |b, i| {
            b.iter(|| intersect_plane(i, &Plane::axis_aligned(Axis::X, 1.5)))
        });

        group.bench_with_input(
            BenchmarkId::new("Segments", &name),
            &(index, mesh),
            |b, (index, mesh)| b.iter(|| index.intersect_plane(mesh, 1.5)),
        );
    }
    group.finish();

    let mut builder = MeshBuilder::new();
    builder.add_sphere(Axis::X, Pos::zeros(), 10.0, 256, 384);
    let mesh = builder.build();
    let mut section = Segments1D::from_mesh(&mesh, Axis::X, 100).intersect_plane(&mesh, 0.5);
    contour::sort_by_angle(&mut section);
    c.bench_function("Resample 384 to 30", |b| b.iter(|| resample(&section, 30)));

    let mut group = c.benchmark_group("Pipeline");
    for parallel in [false, true] {
        let pipeline = SectionPipeline::new(SectionConfig {
            sections: 50,
            parallel,
            ..Default::default()
        });
        group.bench_with_input(BenchmarkId::new("Sections", parallel), &mesh, |b, mesh| {
            b.iter(|| pipeline.run(mesh, &mut Vec::<Diagnostic>::new()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench);
criterion_main!(benches);
