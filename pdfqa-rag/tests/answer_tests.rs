//! Retrieval and grounded answering against the in-memory store.

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::{FailingEmbedder, HashEmbedder};
use pdfqa_model::{MockLlm, ModelError};
use pdfqa_rag::{
    Document, EmbeddingProvider, GroundedAnswerer, InMemoryVectorStore, IngestionPipeline,
    NO_CONTEXT, ProviderIdentity, QuestionAnswerer, REFUSAL, RagConfig, RagError, Retrieval,
    Retriever, VectorStore,
};

const COLLECTION: &str = "pdf_documents_test";
const DIMS: usize = 64;

fn report_pages() -> Vec<Document> {
    let pages = [
        "O faturamento da empresa em 2023 foi de 10 milhões de reais.",
        "A sede da empresa fica em Curitiba e possui 120 funcionários.",
        "O lucro líquido cresceu 15% em relação ao ano anterior.",
    ];
    pages
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

async fn ingested_store(embedder: Arc<dyn EmbeddingProvider>) -> Arc<InMemoryVectorStore> {
    let store = Arc::new(InMemoryVectorStore::new());
    IngestionPipeline::builder()
        .embedding_provider(embedder)
        .vector_store(store.clone())
        .build()
        .unwrap()
        .ingest_documents(COLLECTION, &report_pages())
        .await
        .unwrap();
    store
}

fn config(top_k: usize) -> RagConfig {
    RagConfig::builder().top_k(top_k).build().unwrap()
}

#[tokio::test]
async fn retrieval_returns_relevant_page_first() {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder::new(DIMS));
    let store = ingested_store(embedder.clone()).await;
    let retriever = Retriever::new(embedder, store, COLLECTION, &config(10));

    let retrieval = retriever.retrieve("Qual foi o faturamento da empresa em 2023?").await;
    let results = retrieval.results();
    assert_eq!(results.len(), 3);
    assert!(results[0].chunk.text.contains("faturamento"));
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn answer_is_generated_from_formatted_context() {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder::new(DIMS));
    let store = ingested_store(embedder.clone()).await;
    let llm = Arc::new(MockLlm::always("O faturamento foi de 10 milhões de reais."));
    let retriever = Retriever::new(embedder, store, COLLECTION, &config(2));
    let answerer = GroundedAnswerer::new(retriever, llm.clone(), &config(2));

    let answer = answerer.answer("Qual foi o faturamento da empresa em 2023?").await.unwrap();
    assert_eq!(answer, "O faturamento foi de 10 milhões de reais.");

    let requests = llm.requests().await;
    assert_eq!(requests.len(), 1);
    let prompt = &requests[0].prompt;
    assert!(prompt.contains("Documento 1 (relevância: "));
    assert!(prompt.contains("O faturamento da empresa em 2023 foi de 10 milhões de reais."));
    assert!(!prompt.contains("Documento 3"));
    assert!(prompt.contains("Qual foi o faturamento da empresa em 2023?"));
    assert!(prompt.contains(REFUSAL));
    assert_eq!(requests[0].temperature, 0.0);
}

#[tokio::test]
async fn model_output_is_returned_unparsed() {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder::new(DIMS));
    let store = ingested_store(embedder.clone()).await;
    let raw = "  Resposta: 10 milhões.\n\n";
    let answerer = GroundedAnswerer::new(
        Retriever::new(embedder, store, COLLECTION, &config(3)),
        Arc::new(MockLlm::always(raw)),
        &config(3),
    );

    assert_eq!(answerer.answer("faturamento?").await.unwrap(), raw);
}

#[tokio::test]
async fn empty_collection_refuses_without_calling_model() {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder::new(DIMS));
    let store = Arc::new(InMemoryVectorStore::new());
    let llm = Arc::new(MockLlm::always("should not be used"));
    let retriever = Retriever::new(embedder, store, "missing_collection", &config(10));

    assert!(matches!(retriever.retrieve("Qual é a capital da França?").await, Retrieval::Empty));

    let answerer = GroundedAnswerer::new(retriever, llm.clone(), &config(10));
    let answer = answerer.answer("Qual é a capital da França?").await.unwrap();
    assert_eq!(answer, REFUSAL);
    assert_eq!(llm.call_count().await, 0);
}

#[tokio::test]
async fn empty_context_reaches_model_as_sentinel_when_short_circuit_disabled() {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder::new(DIMS));
    let store = Arc::new(InMemoryVectorStore::new());
    let llm = Arc::new(MockLlm::always(REFUSAL));
    let answerer = GroundedAnswerer::new(
        Retriever::new(embedder, store, COLLECTION, &config(10)),
        llm.clone(),
        &config(10),
    )
    .with_refuse_without_context(false);

    assert_eq!(answerer.answer("Qual é a capital da França?").await.unwrap(), REFUSAL);
    let requests = llm.requests().await;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains(NO_CONTEXT));
}

#[tokio::test]
async fn embedding_outage_degrades_to_refusal() {
    let store = ingested_store(Arc::new(HashEmbedder::new(DIMS))).await;
    let llm = Arc::new(MockLlm::always("unused"));
    let embedder = Arc::new(FailingEmbedder { dims: DIMS });
    let retriever = Retriever::new(embedder, store, COLLECTION, &config(10));

    let retrieval = retriever.retrieve("faturamento").await;
    assert!(retrieval.is_degraded());

    let answerer = GroundedAnswerer::new(retriever, llm.clone(), &config(10));
    assert_eq!(answerer.answer("faturamento").await.unwrap(), REFUSAL);
    assert_eq!(llm.call_count().await, 0);
}

#[tokio::test]
async fn model_failure_is_a_distinct_error() {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder::new(DIMS));
    let store = ingested_store(embedder.clone()).await;
    let llm = Arc::new(MockLlm::new().with_error(ModelError::Timeout { provider: "mock".into() }));
    let retriever = Retriever::new(embedder, store, COLLECTION, &config(3));
    let answerer = GroundedAnswerer::new(retriever, llm, &config(3));

    let err = answerer.answer("Qual foi o faturamento?").await.unwrap_err();
    assert!(matches!(err, RagError::Model(ModelError::Timeout { .. })));
    assert!(err.is_transient());
}

#[tokio::test]
async fn blank_question_is_rejected() {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder::new(DIMS));
    let llm = Arc::new(MockLlm::always("unused"));
    let answerer = GroundedAnswerer::new(
        Retriever::new(embedder, Arc::new(InMemoryVectorStore::new()), COLLECTION, &config(3)),
        llm.clone(),
        &config(3),
    );

    assert!(answerer.answer("   ").await.is_err());
    assert_eq!(llm.call_count().await, 0);
}

#[tokio::test]
async fn other_provider_is_detected_as_mismatch() {
    let store = ingested_store(Arc::new(HashEmbedder::new(DIMS))).await;
    let other: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder::with_identity(
        DIMS,
        ProviderIdentity::new("gemini", "gemini-embedding-001"),
    ));
    let retriever = Retriever::new(other, store, COLLECTION, &config(10));

    let err = retriever.verify_collection().await.unwrap_err();
    assert!(matches!(err, RagError::ProviderMismatch { .. }));
    assert!(retriever.retrieve("faturamento").await.is_degraded());
}

#[tokio::test]
async fn other_dimensionality_is_detected_as_mismatch() {
    let store = ingested_store(Arc::new(HashEmbedder::new(DIMS))).await;
    let embedder = Arc::new(HashEmbedder::new(DIMS * 2));
    let retriever = Retriever::new(embedder, store, COLLECTION, &config(10));

    let err = retriever.verify_collection().await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 64, actual: 128, .. }));
}

#[tokio::test]
async fn verify_reports_missing_collection_as_none() {
    let retriever = Retriever::new(
        Arc::new(HashEmbedder::new(DIMS)),
        Arc::new(InMemoryVectorStore::new()),
        COLLECTION,
        &config(10),
    );
    assert!(retriever.verify_collection().await.unwrap().is_none());
}

#[tokio::test]
async fn similarity_threshold_filters_weak_matches() {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder::new(DIMS));
    let store = ingested_store(embedder.clone()).await;
    let strict = RagConfig::builder().similarity_threshold(0.99).build().unwrap();
    let retriever = Retriever::new(embedder, store.clone(), COLLECTION, &strict);

    assert!(matches!(retriever.retrieve("xyzzy plugh").await, Retrieval::Empty));
    assert!(store.collection_info(COLLECTION).await.unwrap().is_some());
}

#[tokio::test]
async fn parallel_answers_share_one_answerer() {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder::new(DIMS));
    let store = ingested_store(embedder.clone()).await;
    let llm = Arc::new(MockLlm::always("ok"));
    let retriever = Retriever::new(embedder, store, COLLECTION, &config(3));
    let answerer =
        Arc::new(GroundedAnswerer::new(retriever, llm.clone(), &config(3)).with_temperature(0.0));

    let handles: Vec<_> = ["faturamento", "sede", "lucro"]
        .into_iter()
        .map(|q| {
            let answerer = answerer.clone();
            tokio::spawn(async move { answerer.answer(q).await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "ok");
    }
    assert_eq!(llm.call_count().await, 3);
}

#[tokio::test]
async fn retriever_timeout_degrades() {
    struct SlowEmbedder;

    #[async_trait::async_trait]
    impl EmbeddingProvider for SlowEmbedder {
        async fn embed(&self, _text: &str) -> pdfqa_rag::Result<Vec<f32>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec![0.0; DIMS])
        }

        fn dimensions(&self) -> usize {
            DIMS
        }

        fn identity(&self) -> ProviderIdentity {
            ProviderIdentity::new("test", "hash-embedder")
        }
    }

    let store = ingested_store(Arc::new(HashEmbedder::new(DIMS))).await;
    let retriever = Retriever::new(Arc::new(SlowEmbedder), store, COLLECTION, &config(3))
        .with_timeout(Duration::from_millis(50));

    match retriever.retrieve("faturamento").await {
        Retrieval::Degraded { reason } => assert!(reason.contains("query embedding")),
        other => panic!("expected degraded retrieval, got {other:?}"),
    }
}
