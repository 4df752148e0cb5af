//! Benchmarks of the per-day update pipeline.
//!
//! Run with: `cargo bench --package rosabar-bench`

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use rosabar_lib::{
    DayBarBuffer, DecodeContext, Fxt, FxtDay, PriceType, RawBar, Timeframe, align_bars,
    decode_bars_checked, encode_bars, merge_day,
};

/// Mon, 08-Jan-2024 (GMT)
const MONDAY: i64 = 1_704_672_000;

/// A vendor candle file of 1440 bars around 0.66120.
fn vendor_file(spread: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(1440 * RawBar::SIZE);
    for i in 0..1440u32 {
        let open = 66_120 + (i % 37) + spread;
        let close = 66_120 + (i % 23) + spread;
        let fields = [i * 60, open, close, open.min(close) - 3, open.max(close) + 4];
        for field in fields {
            data.extend_from_slice(&field.to_be_bytes());
        }
        data.extend_from_slice(&1.5f32.to_be_bytes());
    }
    data
}

fn pipeline_benchmark(c: &mut Criterion) {
    let monday = FxtDay::of(MONDAY);
    let bid = vendor_file(0);
    let ask = vendor_file(12);

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(1440));

    group.bench_function("decode", |b| {
        let ctx = DecodeContext::new("AUDUSD", PriceType::Bid, monday, 5);
        b.iter(|| decode_bars_checked(black_box(&bid), &ctx).map(|d| d.bars.len()));
    });

    group.bench_function("align", |b| {
        let ctx = DecodeContext::new("AUDUSD", PriceType::Bid, monday, 5);
        let bars = decode_bars_checked(&bid, &ctx).map(|d| d.bars).unwrap_or_default();
        b.iter(|| align_bars(monday.start(), black_box(bars.clone()), &Fxt).map(|day| day.len()));
    });

    group.bench_function("merge_and_encode", |b| {
        let mut buffer = DayBarBuffer::new(Timeframe::Minute1).unwrap();
        for day in [monday, monday.next()] {
            for (price_type, data) in [(PriceType::Bid, &bid), (PriceType::Ask, &ask)] {
                let ctx = DecodeContext::new("AUDUSD", price_type, day, 5);
                let bars = decode_bars_checked(data, &ctx).unwrap().bars;
                let aligned = align_bars(day.start(), bars, &Fxt).unwrap();
                buffer.append(price_type, aligned).unwrap();
            }
        }
        let tuesday = monday.next();

        b.iter(|| {
            merge_day(black_box(&buffer), tuesday)
                .and_then(|bars| encode_bars(&bars))
                .map(|data| data.len())
        });
    });

    group.finish();
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
