use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::io::Cursor;
use tree_census::Config;
use tree_census::reader::read_trees_from;
use tree_census::repair::RepairEngine;

const SPECIES: [(&str, &str, &str, &str, &str); 3] = [
    ("Rotbuche", "Buche", "Fagus", "Rot-Buche", "Fagus sylvatica"),
    ("Bergkiefer", "Kiefer", "Pinus", "Berg-Kiefer", "Pinus mugo"),
    ("Spitzahorn", "Ahorn", "Acer", "Spitz-Ahorn", "Acer platanoides"),
];

const DISTRICTS: [&str; 4] = ["Pankow", "Mitte", "Spandau", "Neukoelln"];

/// Register where every seventh tree lost its girth and every eleventh its height
fn synthetic_register(rows: usize) -> String {
    let mut register = String::with_capacity(rows * 96);
    for id in 0..rows {
        let (name, type_common, type_scientific, species_common, species_scientific) =
            SPECIES[id % SPECIES.len()];
        let age = 10 + (id % 80) as i32;
        let girth = if id % 7 == 0 {
            "-1".to_string()
        } else {
            (age * 2).to_string()
        };
        let height = if id % 11 == 0 {
            "-1".to_string()
        } else {
            format!("{:.1}", 6.0 + (id % 30) as f64)
        };
        register.push_str(&format!(
            "{};{};{};{};{};{};{};{};1.5;{};{};{}\n",
            id + 1,
            name,
            type_common,
            type_scientific,
            species_common,
            species_scientific,
            2023 - age,
            age,
            girth,
            height,
            DISTRICTS[id % DISTRICTS.len()]
        ));
    }
    register
}

fn bench_repair_pass(c: &mut Criterion) {
    let config = Config::default();
    let mut group = c.benchmark_group("repair_pass");

    for rows in [1_000_usize, 10_000_usize] {
        let register = synthetic_register(rows);
        let loaded = read_trees_from(
            Cursor::new(register.clone()),
            &config.parser,
            &config.bounds,
            &config.repair,
        )
        .expect("synthetic register loads");

        group.throughput(Throughput::Elements(rows as u64));

        group.bench_with_input(BenchmarkId::new("read", rows), &rows, |b, _| {
            b.iter(|| {
                let loaded = read_trees_from(
                    Cursor::new(black_box(register.as_str())),
                    &config.parser,
                    &config.bounds,
                    &config.repair,
                )
                .expect("read");
                black_box(loaded.trees.len());
            });
        });

        group.bench_with_input(BenchmarkId::new("repair", rows), &rows, |b, _| {
            b.iter(|| {
                let engine = RepairEngine::new(black_box(&loaded.trees), &config).expect("engine");
                let result = engine.repair_all(&loaded.trees, false);
                black_box(result.session.repaired);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_repair_pass);
criterion_main!(benches);
