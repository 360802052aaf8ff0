//! pgvector store against a live PostgreSQL: re-ingestion, registry checks
//! and table-name rules.
//!
//! Run with:
//! `DATABASE_URL=... cargo test -p pdfqa-rag --features pgvector -- --ignored`

#![cfg(feature = "pgvector")]

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::HashEmbedder;
use pdfqa_rag::pgvector::PgVectorStore;
use pdfqa_rag::{Document, IngestionPipeline, RagConfig, RagError, VectorStore};

const DIMS: usize = 16;

fn database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| panic!("DATABASE_URL must be set"))
}

async fn store() -> Arc<PgVectorStore> {
    Arc::new(PgVectorStore::connect(&database_url(), Duration::from_secs(30)).await.unwrap())
}

fn pages() -> Vec<Document> {
    ["O faturamento de 2023 foi de 10 milhões de reais.", "A sede da empresa fica em Curitiba."]
        .iter()
        .enumerate()
        .map(|(i, text)| Document {
            id: format!("relatorio-p{}", i + 1),
            text: text.to_string(),
            source: "relatorio.pdf".into(),
            page: Some(i as u32 + 1),
            metadata: HashMap::new(),
        })
        .collect()
}

fn pipeline(store: Arc<PgVectorStore>, dims: usize, pre_delete: bool) -> IngestionPipeline {
    IngestionPipeline::builder()
        .config(RagConfig::builder().chunk_size(40).chunk_overlap(5).build().unwrap())
        .embedding_provider(Arc::new(HashEmbedder::new(dims)))
        .vector_store(store)
        .pre_delete(pre_delete)
        .build()
        .unwrap()
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn reingesting_with_pre_delete_replaces_rows() {
    const COLLECTION: &str = "pdfqa_reingest_test";
    let store = store().await;
    store.delete_collection(COLLECTION).await.unwrap();

    let first =
        pipeline(store.clone(), DIMS, true).ingest_documents(COLLECTION, &pages()).await.unwrap();
    let query = vec![1.0 / (DIMS as f32).sqrt(); DIMS];
    let stored = store.nearest(COLLECTION, &query, 100).await.unwrap();
    assert_eq!(stored.len(), first.chunks);

    let second =
        pipeline(store.clone(), DIMS, true).ingest_documents(COLLECTION, &pages()).await.unwrap();
    assert_eq!(second.chunks, first.chunks);
    let stored = store.nearest(COLLECTION, &query, 100).await.unwrap();
    assert_eq!(stored.len(), first.chunks);

    let spec = store.collection_info(COLLECTION).await.unwrap().unwrap();
    assert_eq!(spec.dimensions, DIMS);
    assert_eq!(spec.provider.provider, "test");

    store.delete_collection(COLLECTION).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn appending_with_other_dimensions_is_rejected() {
    const COLLECTION: &str = "pdfqa_dimension_test";
    let store = store().await;
    store.delete_collection(COLLECTION).await.unwrap();

    pipeline(store.clone(), DIMS, true).ingest_documents(COLLECTION, &pages()).await.unwrap();

    let err = pipeline(store.clone(), DIMS * 2, false)
        .ingest_documents(COLLECTION, &pages())
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 16, actual: 32, .. }));

    // The rejected run left the registry untouched.
    let spec = store.collection_info(COLLECTION).await.unwrap().unwrap();
    assert_eq!(spec.dimensions, DIMS);

    store.delete_collection(COLLECTION).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn names_that_would_share_a_table_are_rejected() {
    let store = store().await;
    for name in ["Pdfqa_case_test", "pdfqa-case-test"] {
        let err = store.nearest(name, &[1.0, 0.0], 10).await.unwrap_err();
        assert!(matches!(err, RagError::ConfigError(_)), "{name}: {err}");
    }
}
