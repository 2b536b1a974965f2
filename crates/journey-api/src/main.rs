use std::sync::Arc;

use journey_agent::{
    tools::Scratchpad, AgentRunner, ConversationSummarizer, LeadRecorder, LlmConversationSummarizer,
    LlmTitleGenerator, PlannerAgent, TitleGenerator, ToolRegistry,
};
use journey_api::{
    build_router,
    config::{Config, StorageBackend},
    init_logging, AppState,
};
use journey_llm::{ChatClient, OpenAIClient};
use journey_persist::{ConversationStore, HashStore, InMemoryConversationStore, InMemoryHashStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting {} for {}", config.chat.chatbot_name, config.chat.company_name);
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let mut openai = OpenAIClient::new(config.openai_api_key.clone())?;
    if let Some(base_url) = &config.llm.base_url {
        openai = openai.with_base_url(base_url.clone());
    }
    let llm_client: Arc<dyn ChatClient> = Arc::new(openai);

    let (conversations, hashes) = open_stores(&config).await?;
    tracing::info!("Storage backend: {}", conversations.backend_name());

    let summarizer: Arc<dyn ConversationSummarizer> =
        Arc::new(LlmConversationSummarizer::new(llm_client.clone(), config.llm.aux_model()));
    let titles: Arc<dyn TitleGenerator> = Arc::new(LlmTitleGenerator::new(llm_client.clone(), config.llm.aux_model()));
    let leads = Arc::new(LeadRecorder::new(conversations.clone(), summarizer, hashes));

    let tools = Arc::new(ToolRegistry::standard(
        &config.paths.data_dir,
        Arc::new(Scratchpad::new()),
        leads.clone(),
    ));
    tracing::info!("Registered {} tools", tools.len());

    let agent: Arc<dyn AgentRunner> = Arc::new(PlannerAgent::new(
        llm_client,
        tools,
        (&config.llm).into(),
        config.chat.prompt_context(),
    ));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, conversations, agent, titles, leads));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Chat: http://{}/", addr);
    tracing::info!("WebSocket: ws://{}/ws/chat/{{user_id}}/{{thread_id}}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn open_stores(config: &Config) -> anyhow::Result<(Arc<dyn ConversationStore>, Arc<dyn HashStore>)> {
    match config.storage.backend {
        StorageBackend::Memory => Ok((
            Arc::new(InMemoryConversationStore::new()),
            Arc::new(InMemoryHashStore::new()),
        )),
        #[cfg(feature = "mongodb")]
        StorageBackend::Mongodb => {
            use journey_persist::{dbs::mongo, MongoConversationStore, MongoHashStore};

            tracing::info!("Connecting to MongoDB");
            let client = mongo::connect(&config.mongodb_uri).await?;
            let database = &config.storage.database;
            Ok((
                Arc::new(MongoConversationStore::new(&client, database)),
                Arc::new(MongoHashStore::new(&client, database)),
            ))
        }
        #[cfg(not(feature = "mongodb"))]
        StorageBackend::Mongodb => {
            anyhow::bail!("storage backend 'mongodb' requires building with the `mongodb` feature")
        }
    }
}
