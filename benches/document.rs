//! Benchmarks for HTML parsing and serialization.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use inkdesk::document::Document;

fn sample_page() -> String {
    let mut html = String::from("<span><h1>Spring Gala</h1></span>");
    for i in 0..40 {
        html.push_str(&format!(
            "Paragraph {i} with <strong>bold</strong>, <em>italic</em> and \
             <a href=\"https://example.test/{i}\">a link</a>.<br>"
        ));
    }
    html.push_str("<ul><li>Doors at 7pm</li><li>Dress code: formal</li></ul>");
    html.push_str("<div style=\"text-align: center\">See you there</div>");
    html
}

fn bench_parse_simple(c: &mut Criterion) {
    let html = "<strong>Hello</strong> world";
    c.bench_function("parse_simple", |b| b.iter(|| Document::parse(black_box(html))));
}

fn bench_parse_page(c: &mut Criterion) {
    let html = sample_page();
    c.bench_function("parse_page", |b| b.iter(|| Document::parse(black_box(&html))));
}

fn bench_serialize_page(c: &mut Criterion) {
    let doc = Document::parse(&sample_page());
    c.bench_function("serialize_page", |b| b.iter(|| black_box(&doc).to_html()));
}

fn bench_layout_page(c: &mut Criterion) {
    let doc = Document::parse(&sample_page());
    c.bench_function("layout_page", |b| b.iter(|| black_box(&doc).layout()));
}

criterion_group!(
    benches,
    bench_parse_simple,
    bench_parse_page,
    bench_serialize_page,
    bench_layout_page
);
criterion_main!(benches);
