use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::sync::Arc;
use wordbook_rs::{Definition, Entry, Favorites, MemoryStore, Meaning, PersistenceAdapter};

fn sample_entry(word: &str) -> Entry {
    let mut entry = Entry::new(word);
    entry.meanings.push(Meaning {
        part_of_speech: "noun".to_string(),
        definitions: vec![Definition {
            definition: format!("The meaning of {word}."),
            example: Some(format!("Use {word} in a sentence.")),
            synonyms: Vec::new(),
            antonyms: Vec::new(),
        }],
        synonyms: Vec::new(),
        antonyms: Vec::new(),
    });
    entry
}

fn populated_store(count: usize) -> Arc<MemoryStore> {
    let store = MemoryStore::with_values((0..count).map(|i| {
        let word = format!("word{i}");
        let value = serde_json::to_string(&sample_entry(&word)).expect("encode entry");
        (word, value)
    }));
    Arc::new(store)
}

fn bench_hydrate(c: &mut Criterion) {
    for &count in &[100usize, 1_000] {
        let store = populated_store(count);
        c.bench_with_input(BenchmarkId::new("hydrate", count), &count, |b, _| {
            b.iter(|| {
                let favorites = Favorites::hydrated(PersistenceAdapter::from_shared(store.clone()));
                black_box(favorites.len());
            });
        });
    }
}

fn bench_membership(c: &mut Criterion) {
    let favorites = Favorites::hydrated(PersistenceAdapter::from_shared(populated_store(1_000)));
    c.bench_function("is_favorite::hit", |b| {
        b.iter(|| black_box(favorites.is_favorite(black_box("word500"))));
    });
    c.bench_function("is_favorite::miss", |b| {
        b.iter(|| black_box(favorites.is_favorite(black_box("Word500"))));
    });
}

fn bench_add_remove(c: &mut Criterion) {
    let favorites = Favorites::hydrated(PersistenceAdapter::new(MemoryStore::new()));
    let entry = sample_entry("pumpkin");
    c.bench_function("add_remove::memory_store", |b| {
        b.iter(|| {
            favorites.add(entry.clone()).expect("memory store accepts writes");
            black_box(favorites.remove("pumpkin").was_favorite);
        });
    });
}

criterion_group!(benches, bench_hydrate, bench_membership, bench_add_remove);
criterion_main!(benches);
