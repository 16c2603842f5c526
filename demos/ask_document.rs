use futures::StreamExt;
use std::sync::Arc;
use sutra::chat::AnswerGenerator;
use sutra::{document, Config, OpenAiProvider, RagEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sutra_core=info".parse()?),
        )
        .init();

    let config = Config::load_or_default();
    let question = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What is my duty?".to_string());

    let engine = RagEngine::new(document::load(&config.document.path)?)?;
    let context = engine.retrieve_context(&question, config.retrieval.top_n);

    let provider = Arc::new(OpenAiProvider::new(&config));
    let generator = AnswerGenerator::from_config(provider, &config);

    let mut answer = generator.generate(&question, &context).await?;
    let mut printed = 0;
    while let Some(partial) = answer.next().await {
        let partial = partial?;
        print!("{}", &partial[printed..]);
        printed = partial.len();
    }
    println!();

    Ok(())
}
