//! Benchmarks for editing operations.

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use inkdesk::document::FormatTag;
use inkdesk::editor::RichTextEditor;
use inkdesk::ui::rows::wrap_lines;

fn long_text() -> String {
    "The quick brown fox jumps over the lazy dog. ".repeat(50)
}

fn bench_bold_selection(c: &mut Criterion) {
    let text = long_text();
    c.bench_function("bold_selection", |b| {
        b.iter_batched(
            || {
                let mut editor = RichTextEditor::new();
                editor.insert_text(&text);
                editor.select(100, 400);
                editor
            },
            |mut editor| editor.apply_format(black_box(FormatTag::Bold)),
            BatchSize::SmallInput,
        );
    });
}

fn bench_typing(c: &mut Criterion) {
    c.bench_function("type_100_chars", |b| {
        b.iter(|| {
            let mut editor = RichTextEditor::new();
            for ch in "abcdefghij".repeat(10).chars() {
                editor.insert_text(black_box(&ch.to_string()));
            }
            editor
        });
    });
}

fn bench_wrap(c: &mut Criterion) {
    let mut editor = RichTextEditor::new();
    editor.insert_text(&long_text());
    let lines = editor.document().layout();
    c.bench_function("wrap_80_cols", |b| {
        b.iter(|| wrap_lines(black_box(&lines), 78));
    });
}

criterion_group!(benches, bench_bold_selection, bench_typing, bench_wrap);
criterion_main!(benches);
