//! Pipeline Performance Benchmarks
//!
//! Measures the mapping step alone and the full run (mapping, rendering and
//! encryption) for a few hundred descriptors, the upper end of expected input.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dbeaver_provision::{map_descriptors, provision, ConnectionDescriptor, SshTunnel};

fn descriptors(count: usize) -> Vec<ConnectionDescriptor> {
    (0..count)
        .map(|i| {
            let driver = match i % 3 {
                0 => "mysql8",
                1 => "postgres-jdbc",
                _ => "mariaDB",
            };
            let descriptor =
                ConnectionDescriptor::new(format!("Database {i}"), driver, "db.internal", "5432")
                    .with_database(format!("app_{i}"))
                    .with_credentials("app", "secret");

            if i % 2 == 0 {
                descriptor.with_ssh(SshTunnel {
                    host: "bastion.internal".to_string(),
                    user: "deploy".to_string(),
                    key_path: Some("~/.ssh/id_ed25519".to_string()),
                    ..SshTunnel::default()
                })
            } else {
                descriptor
            }
        })
        .collect()
}

fn bench_map_descriptors(c: &mut Criterion) {
    let input = descriptors(300);

    c.bench_function("map_300_descriptors", |b| {
        b.iter(|| map_descriptors(black_box(&input)));
    });
}

fn bench_provision(c: &mut Criterion) {
    let input = descriptors(300);

    c.bench_function("provision_300_descriptors", |b| {
        b.iter(|| {
            let result = provision(black_box(&input));
            assert!(result.is_ok());
            result
        });
    });
}

criterion_group!(benches, bench_map_descriptors, bench_provision);
criterion_main!(benches);
