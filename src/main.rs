mod catalog_loader;
mod chatbot;
mod embedding;
mod encoder;
mod index;
mod normalizer;
mod stopwords;

use chatbot::{Chatbot, ChatbotConfig};
use embedding::EmbeddingMode;
use log::info;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

const DEFAULT_CATALOG: &str = "resources/faq_data.json";

fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();

    let mut catalog_path = PathBuf::from(DEFAULT_CATALOG);
    let mut config = ChatbotConfig::default();

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--subword" => config.embedding.mode = EmbeddingMode::SubwordAware,
            "--help" | "-h" => {
                println!("Usage: faq_chatbot [--subword] [catalog.json|catalog.csv]");
                return;
            }
            path => catalog_path = PathBuf::from(path),
        }
    }

    let entries = match catalog_loader::load_catalog(&catalog_path) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Failed to load FAQ catalog: {}", e);
            process::exit(1);
        }
    };
    info!(
        "Loaded {} FAQ entries from {}",
        entries.len(),
        catalog_path.display()
    );

    let bot = match Chatbot::new(entries, config) {
        Ok(bot) => bot,
        Err(e) => {
            eprintln!("Failed to initialize chatbot: {}", e);
            process::exit(1);
        }
    };
    info!(
        "Chatbot ready: {} catalog entries, similarity threshold {:.2}",
        bot.catalog_len(),
        bot.threshold()
    );

    println!("Sveiki! Užduokite klausimą (tuščia eilutė baigia darbą).");
    let stdin = io::stdin();
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let query = line.trim();
                if query.is_empty() {
                    break;
                }
                println!("{}", bot.get_response(query));
            }
            Err(e) => {
                eprintln!("Failed to read input: {}", e);
                break;
            }
        }
    }
}
