// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic search-compiler usage example.
//!
//! Demonstrates:
//! 1. Declaring a schema (documents, fields, an index)
//! 2. Indexing a handful of JSON records in the in-memory backend
//! 3. Compiling a wire-format request and running it
//! 4. Rendering the same request for RediSearch and MySQL
//! 5. A rejected request and its error kind
//! 6. Displaying the recorded metrics
//!
//! # Run
//!
//! ```bash
//! RUST_LOG=search_compiler=debug cargo run --example basic_usage
//! ```

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use search_compiler::backend::{InMemoryBackend, SearchBackend};
use search_compiler::schema::{Document, Index};
use search_compiler::search::{IndexMapping, RediSearchTranslator, SearchRequest, SqlTranslator};
use search_compiler::CompilerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("failed to install metrics recorder");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║           search-compiler: Basic Usage Example                ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Schema
    // ─────────────────────────────────────────────────────────────────────────
    println!("📐 Declaring schema...");
    let item = Document::builder("item")
        .keyword("userId")
        .keyword_list("tags")
        .text("description")
        .number("createdTimestamp")
        .date("publishedAt")
        .build()?;
    let index = Index::build("items", vec![item]);
    for (name, field_type) in index.documents()[0].fields() {
        println!("   └─ item.{}: {}", name, field_type);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Index records
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📝 Indexing records...");
    let backend = InMemoryBackend::for_index(&index);
    let records = vec![
        ("1", json!({"type": "item", "userId": "Rob", "tags": "unix plan9", "description": "Early Unix tools", "createdTimestamp": 0, "publishedAt": "1979-01-01T00:00:00.000Z"})),
        ("2", json!({"type": "item", "userId": "Rob", "tags": "go", "description": "A new language", "createdTimestamp": 7, "publishedAt": "2009-11-10T23:00:00.000Z"})),
        ("3", json!({"type": "item", "userId": "Ken", "tags": "unix", "description": "Regular expressions", "createdTimestamp": 3})),
        ("4", json!({"type": "item", "userId": "Rob", "tags": "utf8", "description": "Hello, world", "createdTimestamp": 5})),
    ];
    for (id, record) in records {
        println!("   └─ {} → {}", id, record);
        backend.index(id, record).await?;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Compile and run
    // ─────────────────────────────────────────────────────────────────────────
    let config = CompilerConfig {
        redis_prefix: Some("app:".into()),
        ..Default::default()
    };
    let request: SearchRequest = serde_json::from_value(json!({
        "filter": {"and": [
            {"base": "userId:Rob"},
            {"or": [
                {"base": "createdTimestamp:<1"},
                {"base": "createdTimestamp:>=5"}
            ]}
        ]},
        "sort": {"fields": ["createdTimestamp:>"]},
        "page": {"count": 10}
    }))?;

    println!("\n🔍 Searching...");
    let directive = request.compile(&index, &config)?;
    let ids = backend.search(&directive).await?;
    println!("   └─ Matching ids: {:?}", ids);

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Backend renderings
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🧭 Backend renderings:");
    let mapping = IndexMapping::from_index(&index);
    println!(
        "   ├─ FT.CREATE {}",
        mapping
            .to_ft_create_args_with_prefix("item:", config.redis_prefix.as_deref())
            .join(" ")
    );
    println!(
        "   ├─ FT.SEARCH {}",
        RediSearchTranslator::search_args(index.name(), &directive, config.redis_prefix.as_deref())
            .join(" ")
    );
    let (sql, params) =
        SqlTranslator::translate_directive(&directive, &config.json_column).to_select("items", "id");
    println!("   └─ {} -- {:?}", sql, params);

    // ─────────────────────────────────────────────────────────────────────────
    // 5. A rejected request
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🚫 Rejected request:");
    let bad: SearchRequest = serde_json::from_value(json!({"filter": {"base": "createdTimestamp:~~3"}}))?;
    if let Err(e) = bad.compile(&index, &config) {
        println!("   └─ {} ({})", e, e.kind().as_str());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 6. Metrics
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📈 Raw Metrics:");
    dump_metrics(&snapshotter);

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║                    Example complete!                          ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    Ok(())
}

/// Print every captured metric, one line each
fn dump_metrics(snapshotter: &Snapshotter) {
    let mut lines: Vec<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, value)| {
            let (_, key) = composite_key.into_parts();
            let labels: Vec<_> = key
                .labels()
                .map(|l| format!("{}={}", l.key(), l.value()))
                .collect();
            let rendered = match value {
                DebugValue::Counter(v) => v.to_string(),
                DebugValue::Gauge(v) => format!("{:.2}", v.into_inner()),
                DebugValue::Histogram(samples) => {
                    let sum: f64 = samples.iter().map(|v| v.into_inner()).sum();
                    format!("count={} sum={:.6}", samples.len(), sum)
                }
            };
            format!("{}{{{}}} = {}", key.name(), labels.join(","), rendered)
        })
        .collect();
    lines.sort();

    if lines.is_empty() {
        println!("   └─ (no metrics recorded)");
    }
    for line in &lines {
        println!("   └─ {}", line);
    }
}
