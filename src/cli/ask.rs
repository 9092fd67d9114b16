//! Ask command - one-shot question answering from the terminal

use std::sync::Arc;

use clap::Args;

use crate::config::AppConfig;
use crate::domain::query::{CollectionId, Query};
use crate::infrastructure::evidence::InMemoryEvidenceStore;
use crate::infrastructure::logging;

#[derive(Args)]
pub struct AskArgs {
    /// The question to answer
    pub question: String,

    /// Target collection (the configured default when omitted)
    #[arg(long)]
    pub collection: Option<String>,
}

pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let evidence = Arc::new(InMemoryEvidenceStore::new());
    let workflow = crate::build_workflow(&config, evidence)?;

    let collection_id = args
        .collection
        .unwrap_or_else(|| config.evidence.default_collection.clone());
    let collection = CollectionId::new(collection_id)?;

    let query = Query::new(args.question, collection)?;
    let envelope = workflow.answer(query).await?;

    println!("{}", serde_json::to_string_pretty(&envelope)?);

    Ok(())
}
