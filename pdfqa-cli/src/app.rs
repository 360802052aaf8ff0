//! Builds the pipeline and answerer from [`Settings`].

use std::sync::Arc;

use anyhow::Context;
use pdfqa_model::build_llm;
use pdfqa_rag::pgvector::PgVectorStore;
use pdfqa_rag::{
    EmbeddingProvider, GroundedAnswerer, IngestReport, IngestionPipeline, Retriever,
    build_embedding_provider,
};
use tracing::info;

use crate::settings::Settings;

fn embedder(settings: &Settings) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let config = settings.embedder_config()?;
    Ok(build_embedding_provider(&config)?)
}

async fn store(settings: &Settings) -> anyhow::Result<Arc<PgVectorStore>> {
    let store = PgVectorStore::connect(&settings.database_url, settings.request_timeout)
        .await
        .context("connecting to PostgreSQL")?;
    Ok(Arc::new(store))
}

/// Load, split, embed and persist the configured PDF.
pub async fn ingest(settings: &Settings) -> anyhow::Result<IngestReport> {
    let collection = settings.collection();
    info!(
        path = %settings.pdf_path.display(),
        collection = %collection,
        provider = %settings.embeddings_provider,
        "starting ingestion"
    );

    let pipeline = IngestionPipeline::builder()
        .config(settings.rag.clone())
        .embedding_provider(embedder(settings)?)
        .vector_store(store(settings).await?)
        .pre_delete(settings.pre_delete)
        .build()?;

    let report = pipeline
        .ingest_path(&settings.pdf_path, &collection)
        .await
        .with_context(|| format!("ingesting {}", settings.pdf_path.display()))?;
    Ok(report)
}

/// Connect everything the chat needs and check the stored collection.
///
/// A missing collection only warns; a collection written by another
/// embedder is an error.
pub async fn build_answerer(settings: &Settings) -> anyhow::Result<GroundedAnswerer> {
    let embedder = embedder(settings)?;
    let llm = build_llm(&settings.llm_config()?)?;
    let store = store(settings).await?;

    let retriever = Retriever::new(embedder, store, settings.collection(), &settings.rag)
        .with_timeout(settings.request_timeout);
    retriever.verify_collection().await.context("checking the stored collection")?;

    info!(
        collection = %retriever.collection(),
        llm = %settings.llm_provider,
        "answerer ready"
    );
    Ok(GroundedAnswerer::new(retriever, llm, &settings.rag).with_temperature(settings.temperature))
}
