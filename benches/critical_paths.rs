//! Criterion benchmarks for pxed critical paths
//!
//! Benchmarks the core performance-critical operations:
//! - Raster: flood fill and line drawing
//! - Composition: flattening layered frames with blend modes
//! - Quantize: median-cut palette extraction
//! - Color: hex and CSS color parsing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::Rgba;
use pxed::buffer::PixelBuffer;
use pxed::color::parse_color;
use pxed::composition::{flatten_frame, BlendMode};
use pxed::document::Document;
use pxed::quantize::extract_palette;
use pxed::raster::{draw_line, flood_fill, Stroke, Symmetry};

// =============================================================================
// Test Data Generators
// =============================================================================

/// Generate a buffer with a smooth color gradient (many distinct colors)
fn make_gradient(size: u32) -> PixelBuffer {
    let mut buffer = PixelBuffer::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let r = (x * 255 / size.max(1)) as u8;
            let g = (y * 255 / size.max(1)) as u8;
            let b = ((x + y) * 127 / size.max(1)) as u8;
            buffer.set(x as i32, y as i32, Rgba([r, g, b, 255]));
        }
    }
    buffer
}

/// Generate a buffer with a diagonal maze of walls for flood fill
fn make_walls(size: u32) -> PixelBuffer {
    let mut buffer = PixelBuffer::new(size, size);
    let wall = Stroke::new(Rgba([0, 0, 0, 255]));
    let mut offset = 4;
    while offset < size as i32 {
        draw_line(&mut buffer, offset, 0, 0, offset, &wall);
        offset += 8;
    }
    buffer
}

/// Generate a document with `layers` full-canvas layers using mixed blend modes
fn make_document(size: u32, layers: usize) -> Document {
    let modes = [BlendMode::Normal, BlendMode::Multiply, BlendMode::Screen, BlendMode::Overlay];
    let mut doc = Document::from_buffer(make_gradient(size));
    for i in 1..layers {
        let id = doc.add_layer();
        let shade = (i * 40 % 256) as u8;
        doc.current_layer_mut().buffer_mut().fill(Rgba([shade, 255 - shade, 128, 200]));
        doc.set_layer_blend_mode(id, modes[i % modes.len()]);
        doc.set_layer_opacity(id, 0.75);
    }
    doc
}

// =============================================================================
// Raster Benchmarks
// =============================================================================

fn bench_raster(c: &mut Criterion) {
    let mut group = c.benchmark_group("raster");

    for size in [32u32, 128, 256].iter() {
        let empty = PixelBuffer::new(*size, *size);
        group.throughput(Throughput::Elements((*size * *size) as u64));
        group.bench_with_input(BenchmarkId::new("flood_fill_open", size), &empty, |b, buf| {
            b.iter(|| {
                let mut buffer = buf.clone();
                flood_fill(&mut buffer, 0, 0, Rgba([255, 0, 0, 255]), Symmetry::None)
            })
        });

        let walls = make_walls(*size);
        group.bench_with_input(BenchmarkId::new("flood_fill_walls", size), &walls, |b, buf| {
            b.iter(|| {
                let mut buffer = buf.clone();
                flood_fill(&mut buffer, 1, 1, Rgba([0, 0, 255, 255]), Symmetry::Horizontal)
            })
        });
    }

    let stroke =
        Stroke { size: 3, symmetry: Symmetry::Vertical, ..Stroke::new(Rgba([9, 9, 9, 255])) };
    group.bench_function("draw_line_128_brush3", |b| {
        let mut buffer = PixelBuffer::new(128, 128);
        b.iter(|| draw_line(&mut buffer, black_box(0), 0, 127, 90, &stroke))
    });

    group.finish();
}

// =============================================================================
// Composition Benchmarks
// =============================================================================

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");

    for (size, layers) in [(32u32, 4usize), (128, 4), (128, 16)].iter() {
        let doc = make_document(*size, *layers);
        let name = format!("flatten_{}x{}x{}", size, size, layers);

        group.throughput(Throughput::Elements((*size * *size) as u64 * *layers as u64));
        group.bench_function(&name, |b| {
            b.iter(|| flatten_frame(black_box(doc.current_frame()), doc.width(), doc.height()))
        });
    }

    group.finish();
}

// =============================================================================
// Quantize Benchmarks
// =============================================================================

fn bench_quantize(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantize");

    for size in [16u32, 64, 128].iter() {
        let buffer = make_gradient(*size);
        group.throughput(Throughput::Elements((*size * *size) as u64));
        group.bench_with_input(BenchmarkId::new("median_cut_k8", size), &buffer, |b, buf| {
            b.iter(|| extract_palette(black_box(buf), 8))
        });
    }

    let buffer = make_gradient(64);
    for k in [2usize, 16, 64].iter() {
        group.bench_with_input(BenchmarkId::new("median_cut_64px", k), k, |b, k| {
            b.iter(|| extract_palette(&buffer, black_box(*k)))
        });
    }

    group.finish();
}

// =============================================================================
// Color Benchmarks
// =============================================================================

fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("color");

    group.bench_function("parse_hex_6", |b| b.iter(|| parse_color(black_box("#FF0000"))));
    group.bench_function("parse_hex_8", |b| b.iter(|| parse_color(black_box("#FF000080"))));
    group.bench_function("parse_rgb", |b| b.iter(|| parse_color(black_box("rgb(255, 0, 0)"))));
    group.bench_function("parse_named", |b| b.iter(|| parse_color(black_box("red"))));

    group.finish();
}

criterion_group!(benches, bench_raster, bench_flatten, bench_quantize, bench_color);
criterion_main!(benches);
