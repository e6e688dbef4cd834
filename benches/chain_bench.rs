//! Criterion benchmarks for the fallback hot path.
//!
//! Run with:
//!   cargo bench
//!
//! Covers:
//!   - Dry-run chain invocation (priority sort + attempt walk)
//!   - Status report assembly

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use switchboard::adapters;
use switchboard::providers::chain::ProviderChain;
use switchboard::providers::wrapper::{ProviderWrapper, WrapperOptions};

fn dry_run_chain(providers: &[&str]) -> ProviderChain {
    let wrappers = providers
        .iter()
        .map(|name| {
            let adapter = adapters::build(name, Some("gpt-5.3"), true).unwrap();
            Arc::new(ProviderWrapper::with_options(
                adapter,
                WrapperOptions {
                    dry_run: true,
                    ..WrapperOptions::default()
                },
            ))
        })
        .collect();
    ProviderChain::new("llm", wrappers)
}

fn bench_chain_invoke(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let chain = dry_run_chain(&["openai", "anthropic", "google"]);

    c.bench_function("chain_invoke_dry_run", |b| {
        b.iter(|| {
            let out = rt.block_on(chain.invoke(black_box("generate"), json!({ "prompt": "hi" })));
            black_box(out);
        });
    });
}

fn bench_status_report(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let chain = dry_run_chain(&["openai", "anthropic", "google"]);
    // Seed the op log.
    for _ in 0..50 {
        rt.block_on(chain.invoke("generate", json!({})));
    }

    c.bench_function("chain_status_report", |b| {
        b.iter(|| {
            let report = rt.block_on(chain.status_report());
            black_box(report);
        });
    });
}

criterion_group!(benches, bench_chain_invoke, bench_status_report);
criterion_main!(benches);
