//! Microbenchmarks for the fixed-point kernels on the audio-rate path.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rotorgan_core::modtable::{fill_sinemod, MOD_TABLE_LEN};
use rotorgan_core::trig::{isin_s3, isin_s4, PHASE_CYCLE};

fn bench_trig(c: &mut Criterion) {
    c.bench_function("isin_s3 full cycle", |b| {
        b.iter(|| {
            let mut acc = 0i32;
            for x in 0..PHASE_CYCLE {
                acc = acc.wrapping_add(isin_s3(black_box(x)));
            }
            acc
        })
    });

    c.bench_function("isin_s4 full cycle", |b| {
        b.iter(|| {
            let mut acc = 0i32;
            for x in 0..PHASE_CYCLE {
                acc = acc.wrapping_add(isin_s4(black_box(x)));
            }
            acc
        })
    });
}

fn bench_modtable(c: &mut Criterion) {
    c.bench_function("fill_sinemod 256", |b| {
        let mut table = [0i16; MOD_TABLE_LEN];
        b.iter(|| {
            fill_sinemod(&mut table, black_box(0), black_box(32767), black_box(0));
            table[0]
        })
    });
}

criterion_group!(benches, bench_trig, bench_modtable);
criterion_main!(benches);
