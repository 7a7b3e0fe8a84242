use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use scriptfreq_morphy::{Lemmatize, Morphy};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use scriptfreq::{
    Analyzer, AppState, CorpusAnalysis, NameRegistry, Normalizer, SeasonSource, router,
    write_reports,
};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_NAME_FILES: [&str; 2] = ["name/male.txt", "name/female.txt"];
const MAX_PAGE_SIZE: usize = 500;

#[derive(Parser)]
#[command(name = "scriptfreq")]
#[command(about = "Word and phrase frequencies with example sentences for season transcripts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the seasons and write the JSON artifacts.
    Analyze {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, env = "OUTPUT_DIR", default_value = ".")]
        out: PathBuf,
    },
    /// Analyze the seasons and serve the results over HTTP.
    Serve {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
        host: String,
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long, default_value_t = false)]
        no_cache: bool,
        #[arg(long, default_value_t = MAX_PAGE_SIZE)]
        max_page_size: usize,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Season text files, in season order.
    #[arg(required = true)]
    seasons: Vec<PathBuf>,
    /// Extra one-name-per-line lists merged into the name registry.
    #[arg(
        long = "name-file",
        env = "NAME_FILES",
        value_delimiter = ',',
        default_values = DEFAULT_NAME_FILES
    )]
    name_files: Vec<PathBuf>,
    /// WordNet dict directory with index.* and *.exc files.
    #[arg(long, env = "WORDNET_DIR")]
    wordnet_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze { input, out } => {
            let analysis = analyze(&input).await?;
            let written = write_reports(&analysis, &out)?;
            for path in written {
                info!("wrote {}", path.display());
            }
        }
        Commands::Serve {
            input,
            host,
            port,
            no_cache,
            max_page_size,
        } => {
            info!("binding to {host}:{port}");
            if no_cache {
                info!("cache headers disabled");
            }
            let analysis = analyze(&input).await?;
            let state = AppState {
                analysis: Arc::new(analysis),
                max_page_size: max_page_size.max(1),
                disable_cache: no_cache,
            };

            let app = router(state).layer(TraceLayer::new_for_http());
            let addr: SocketAddr = format!("{host}:{port}")
                .parse()
                .with_context(|| format!("invalid listen address {host}:{port}"))?;
            let listener = TcpListener::bind(addr).await?;

            axum::serve(listener, app).await?;
        }
    }
    Ok(())
}

async fn analyze(input: &InputArgs) -> anyhow::Result<CorpusAnalysis> {
    let names = NameRegistry::load(&input.name_files);
    info!("name registry holds {} names", names.len());

    let start = Instant::now();
    let lemmatizer: Arc<dyn Lemmatize> = match &input.wordnet_dir {
        Some(dir) => {
            let morphy = Morphy::load(dir)
                .with_context(|| format!("load wordnet from {}", dir.display()))?;
            info!(
                "wordnet lexicon of {} lemmas loaded in {} ms",
                morphy.lexicon().len(),
                start.elapsed().as_millis()
            );
            Arc::new(morphy)
        }
        None => {
            warn!("no wordnet directory configured, only irregular verbs are lemmatized");
            Arc::new(Morphy::builtin())
        }
    };

    let normalizer = Normalizer::new(Arc::new(names), lemmatizer);
    let sources = input
        .seasons
        .iter()
        .map(|path| SeasonSource::from_path(path.clone()))
        .collect();

    let start = Instant::now();
    let analysis = Analyzer::plain_text(normalizer).run(sources).await;
    info!("analysis finished in {} ms", start.elapsed().as_millis());
    Ok(analysis)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
