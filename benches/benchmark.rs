use criterion::{
    criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion, PlotConfiguration,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

use particle_life::{particle_store::Particles, prelude::*};

struct Population {
    positions: Vec<Vec2>,
    kinds: Vec<u8>,
    active: Vec<bool>,
}

impl Population {
    fn random(len: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(len as u64);
        // Constant density, so that grid cells hold the same number of particles at every size.
        let extent = (len as f32).sqrt() * 20.0;
        let mut gen = |range| rng.gen_range(range);

        Self {
            positions: (0..len)
                .map(|_| Vec2::new(gen(0.0..extent), gen(0.0..extent)))
                .collect(),
            kinds: (0..len).map(|i| (i % 6) as u8).collect(),
            active: vec![true; len],
        }
    }

    fn view(&self) -> Particles<'_> {
        Particles {
            positions: &self.positions,
            kinds: &self.kinds,
            active: &self.active,
        }
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut matrix = InteractionMatrix::new(6).unwrap();
    matrix.randomize(0);
    let law = ParticleLife::new(&matrix, 60.0);
    let gravity = Gravity::default();

    let mut group = c.benchmark_group("ParticleLife");
    group
        .plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic))
        .warm_up_time(std::time::Duration::from_secs(1))
        .sample_size(50);

    for i in (8..=16).step_by(2).map(|i| 2_usize.pow(i)) {
        let population = Population::random(i);
        let mut accelerations = vec![Vec2::ZERO; i];

        #[cfg(feature = "parallel")]
        {
            let mut cm = parallel::Grid::default();
            group.bench_with_input(
                BenchmarkId::new("parallel::Grid", i),
                &population,
                |b, input| b.iter(|| cm.compute(input.view(), &law, &mut accelerations)),
            );

            let mut cm = parallel::BarnesHut::new(0.5);
            group.bench_with_input(
                BenchmarkId::new("parallel::BarnesHut", i),
                &population,
                |b, input| b.iter(|| cm.compute(input.view(), &gravity, &mut accelerations)),
            );

            if i <= 4096 {
                let mut cm = parallel::BruteForce;
                group.bench_with_input(
                    BenchmarkId::new("parallel::BruteForce", i),
                    &population,
                    |b, input| b.iter(|| cm.compute(input.view(), &law, &mut accelerations)),
                );
            }
        }

        {
            let mut cm = sequential::Grid::default();
            group.bench_with_input(
                BenchmarkId::new("sequential::Grid", i),
                &population,
                |b, input| b.iter(|| cm.compute(input.view(), &law, &mut accelerations)),
            );

            let mut cm = sequential::BarnesHut::new(0.5);
            group.bench_with_input(
                BenchmarkId::new("sequential::BarnesHut", i),
                &population,
                |b, input| b.iter(|| cm.compute(input.view(), &gravity, &mut accelerations)),
            );
        }
    }

    group.finish();

    let mut group = c.benchmark_group("World");
    group.sample_size(20);

    for i in [10_000, 100_000] {
        let mut world = World::new(SimulationConfig {
            seed: Some(0),
            ..SimulationConfig::default()
        })
        .unwrap();
        world.emit(&Emission {
            count: i,
            spread: (i as f32).sqrt() * 10.0,
            ..Emission::default()
        });

        group.bench_function(BenchmarkId::new("step", i), |b| {
            b.iter(|| world.step(1.0 / 60.0))
        });
    }

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
