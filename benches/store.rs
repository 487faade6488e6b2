// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Keepsake-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Keepsake and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use keepsake::cache::{CacheBackend, CacheRecord, MemoryCache};
use keepsake::config::PersistConfig;
use keepsake::identity::CookieJar;
use keepsake::model::VisitorId;
use keepsake::store::SessionStore;
use serde_json::{json, Map, Value};

const NAMESPACE: &str = "light_persist";
const VISITOR: &str = "65f0c1a2b3c4d9e8f7a6b";

fn seeded_cache(entries: usize) -> Arc<MemoryCache> {
    let cache = MemoryCache::new().with_namespace(NAMESPACE);
    let mut value = Map::new();
    for n in 0..entries {
        value.insert(format!("k{n}"), json!({"count": n, "tags": ["a", "b"]}));
    }
    cache
        .add(
            NAMESPACE,
            CacheRecord {
                value: Value::Object(value),
                filename: VisitorId::new(VISITOR).expect("visitor id"),
            },
        )
        .expect("seed");
    Arc::new(cache)
}

fn scoped_merges(config: &Arc<PersistConfig>, cache: &Arc<MemoryCache>, writes: usize) -> usize {
    let session = SessionStore::builder(config.clone())
        .cookies(CookieJar::new().with_cookie("psd_", VISITOR))
        .cache(cache.clone())
        .open()
        .expect("open");
    let (len, _jar) = session
        .run(|store| {
            for n in 0..writes {
                store.set(format!("k{}", n % 16), json!({ "seen": n }), false);
            }
            store.content().len()
        })
        .expect("finish");
    len
}

// Benchmark identity (keep stable):
// - Group name in this file: `store.scoped_session`
// - Case IDs must remain stable across refactors so results stay comparable over time.
fn benches_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store.scoped_session");
    let config = Arc::new(PersistConfig::default());

    for (case, entries, writes) in [("small", 8, 4), ("medium", 256, 64)] {
        let config = config.clone();
        group.bench_function(format!("merge_flush_{case}"), move |b| {
            b.iter_batched_ref(
                || seeded_cache(entries),
                |cache| black_box(scoped_merges(&config, cache, black_box(writes))),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, benches_store);
criterion_main!(benches);
