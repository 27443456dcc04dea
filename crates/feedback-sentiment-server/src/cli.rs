use clap::Parser;
use feedback_sentiment_classifiers::{parse_backend, ClassifierBackend};

#[derive(Parser, Debug, Clone)]
#[command(name = "feedback-sentiment-server")]
#[command(author, version, about = "Sentiment analysis server for feedback text", long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults are used when it does not exist)
    #[arg(short, long, env = "FEEDBACK_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Listen address [default: 0.0.0.0]
    #[arg(short = 'l', long, env = "FEEDBACK_HOST")]
    pub host: Option<String>,

    /// Listen port [default: 8000]
    #[arg(short = 'P', long, env = "FEEDBACK_PORT")]
    pub port: Option<u16>,

    /// Classifier backend: distilbert or lexicon [default: distilbert]
    #[arg(short, long, env = "FEEDBACK_BACKEND", value_parser = parse_backend)]
    pub backend: Option<ClassifierBackend>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
