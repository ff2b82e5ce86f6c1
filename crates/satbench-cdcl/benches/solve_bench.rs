//! Benchmarks for the CDCL solver.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use satbench_base::{Budget, CnfFormula};
use satbench_cdcl::CdclSolver;

/// Uniform random 3-SAT at clause/variable ratio 4.26.
fn random_3sat(num_vars: usize, seed: u64) -> CnfFormula {
    let mut rng = SmallRng::seed_from_u64(seed);
    let num_clauses = (num_vars as f64 * 4.26) as usize;
    let clauses: Vec<Vec<i64>> = (0..num_clauses)
        .map(|_| {
            (0..3)
                .map(|_| {
                    let var = rng.random_range(1..=num_vars as i64);
                    if rng.random_bool(0.5) {
                        var
                    } else {
                        -var
                    }
                })
                .collect()
        })
        .collect();
    CnfFormula::from_dimacs(num_vars, &clauses).unwrap()
}

fn pigeonhole(holes: usize) -> CnfFormula {
    let pigeons = holes + 1;
    let var = |p: usize, h: usize| (p * holes + h + 1) as i64;
    let mut clauses: Vec<Vec<i64>> = (0..pigeons)
        .map(|p| (0..holes).map(|h| var(p, h)).collect())
        .collect();
    for h in 0..holes {
        for p in 0..pigeons {
            for q in p + 1..pigeons {
                clauses.push(vec![-var(p, h), -var(q, h)]);
            }
        }
    }
    CnfFormula::from_dimacs(pigeons * holes, &clauses).unwrap()
}

fn bench_random_3sat(c: &mut Criterion) {
    let mut group = c.benchmark_group("cdcl_random_3sat");
    for num_vars in [50, 100, 150] {
        let formula = random_3sat(num_vars, 42);
        group.bench_with_input(BenchmarkId::from_parameter(num_vars), &formula, |b, f| {
            b.iter(|| CdclSolver::new(black_box(f)).run(&Budget::unlimited()));
        });
    }
    group.finish();
}

fn bench_pigeonhole(c: &mut Criterion) {
    let formula = pigeonhole(6);
    c.bench_function("cdcl_pigeonhole_7_6", |b| {
        b.iter(|| CdclSolver::new(black_box(&formula)).run(&Budget::unlimited()));
    });
}

criterion_group!(benches, bench_random_3sat, bench_pigeonhole);
criterion_main!(benches);
