use backbone_sat::sat::backbone::{intersection, kaiser_kuechlin};
use backbone_sat::sat::cdcl::Cdcl;
use backbone_sat::sat::clause::Clause;
use backbone_sat::sat::clause_set::{ClauseSet, PlainClauseSet, WatchedClauseSet};
use backbone_sat::sat::dpll::Dpll;
use backbone_sat::sat::formula::RawClause;
use backbone_sat::sat::generator::random_k_sat;
use backbone_sat::sat::implicant::{find_prime_implicant, prime_implicant};
use backbone_sat::sat::phase_saving::Phase;
use backbone_sat::sat::solver::Solver;
use backbone_sat::sat::watch::{WatchScheme, WatchedClause};
use backbone_sat::sudoku::solver::{Board, EXAMPLE_NINE, EXAMPLE_SIXTEEN, Sudoku};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

/// Random 3-SAT near the satisfiability threshold, fixed seeds.
fn random_formulas(num_vars: usize, count: u64) -> Vec<Vec<RawClause>> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let num_clauses = (num_vars as f64 * 4.2) as usize;
    (0..count)
        .map(|seed| {
            random_k_sat(
                &mut fastrand::Rng::with_seed(seed),
                num_vars,
                num_clauses,
                3,
            )
        })
        .collect()
}

fn watched(formulas: &[Vec<RawClause>], scheme: WatchScheme) -> Vec<WatchedClauseSet> {
    formulas
        .iter()
        .map(|raw| ClauseSet::with_scheme(raw.clone(), scheme).unwrap())
        .collect()
}

fn plain(formulas: &[Vec<RawClause>]) -> Vec<PlainClauseSet> {
    formulas
        .iter()
        .map(|raw| ClauseSet::from_clauses(raw.clone()).unwrap())
        .collect()
}

fn bench_random_3sat(c: &mut Criterion) {
    let formulas = random_formulas(40, 20);
    let to_middle = watched(&formulas, WatchScheme::ToMiddle);
    let side_by_side = watched(&formulas, WatchScheme::SideBySide);
    let plain_sets = plain(&formulas);

    let mut group = c.benchmark_group("random 3-SAT - Clause type");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("Watched, to middle", |b| {
        b.iter(|| {
            for cs in &to_middle {
                let mut state: Cdcl<WatchedClause> = Solver::new(cs.clone());
                black_box(state.solve());
            }
        });
    });

    group.bench_function("Watched, side by side", |b| {
        b.iter(|| {
            for cs in &side_by_side {
                let mut state: Cdcl<WatchedClause> = Solver::new(cs.clone());
                black_box(state.solve());
            }
        });
    });

    group.bench_function("Plain", |b| {
        b.iter(|| {
            for cs in &plain_sets {
                let mut state: Cdcl<Clause> = Solver::new(cs.clone());
                black_box(state.solve());
            }
        });
    });

    group.finish();

    let mut group = c.benchmark_group("random 3-SAT - Phase");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    for (name, phase) in [
        ("Saved", Phase::Saved),
        ("Negative", Phase::Negative),
        ("Positive", Phase::Positive),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                for cs in &to_middle {
                    let mut state = Cdcl::with_phase(cs.clone(), phase);
                    black_box(state.solve());
                }
            });
        });
    }

    group.finish();

    let small = plain(&random_formulas(20, 10));
    let small_watched = watched(&random_formulas(20, 10), WatchScheme::ToMiddle);

    let mut group = c.benchmark_group("random 3-SAT - Solver");
    group.sample_size(20);

    group.bench_function("CDCL", |b| {
        b.iter(|| {
            for cs in &small_watched {
                let mut state: Cdcl<WatchedClause> = Solver::new(cs.clone());
                black_box(state.solve());
            }
        });
    });

    group.bench_function("DPLL", |b| {
        b.iter(|| {
            for cs in &small {
                let mut state: Dpll<Clause> = Solver::new(cs.clone());
                black_box(state.solve());
            }
        });
    });

    group.finish();
}

fn bench_sudoku(c: &mut Criterion) {
    let nine = Sudoku::new(Board::from(EXAMPLE_NINE)).unwrap();
    let sixteen = Sudoku::new(Board::from(EXAMPLE_SIXTEEN)).unwrap();
    let nine_cs: WatchedClauseSet = nine.to_clause_set().unwrap();
    let sixteen_cs: WatchedClauseSet = sixteen.to_clause_set().unwrap();

    let mut group = c.benchmark_group("sudoku");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    group.bench_function("encode 9x9", |b| {
        b.iter(|| black_box(nine.to_clause_set::<WatchedClause>()));
    });

    group.bench_function("solve 9x9", |b| {
        b.iter(|| {
            let mut state: Cdcl<WatchedClause> = Solver::new(nine_cs.clone());
            black_box(state.solve());
        });
    });

    group.bench_function("solve 16x16", |b| {
        b.iter(|| {
            let mut state: Cdcl<WatchedClause> = Solver::new(sixteen_cs.clone());
            black_box(state.solve());
        });
    });

    group.finish();
}

fn bench_backbone(c: &mut Criterion) {
    let sets = watched(&random_formulas(30, 10), WatchScheme::ToMiddle);

    let mut group = c.benchmark_group("backbone");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    group.bench_function("Kaiser-Kuechlin, optimised", |b| {
        b.iter(|| {
            for cs in &sets {
                black_box(kaiser_kuechlin(&mut cs.clone(), true));
            }
        });
    });

    group.bench_function("Kaiser-Kuechlin, plain", |b| {
        b.iter(|| {
            for cs in &sets {
                black_box(kaiser_kuechlin(&mut cs.clone(), false));
            }
        });
    });

    group.bench_function("Intersection", |b| {
        b.iter(|| {
            for cs in &sets {
                black_box(intersection(&mut cs.clone()));
            }
        });
    });

    group.finish();

    let mut group = c.benchmark_group("prime implicant");
    group.sample_size(10);

    group.bench_function("Watched", |b| {
        b.iter(|| {
            for cs in &sets {
                black_box(find_prime_implicant(&mut cs.clone()));
            }
        });
    });

    group.bench_function("Reference", |b| {
        b.iter(|| {
            for cs in &sets {
                black_box(prime_implicant(&mut cs.clone()));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_random_3sat, bench_sudoku, bench_backbone);

criterion_main!(benches);
