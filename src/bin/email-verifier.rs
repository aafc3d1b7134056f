#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI for collecting verification codes from an IMAP mailbox

use clap::Parser;
use email_verifier::{
    Contains, Credentials, Filters, Folder, ImapConfig, MailboxClient, Prefix, RegexExtractor,
    ResultMap,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "email-verifier")]
#[command(about = "Collect verification codes sent by one sender and flag them deleted")]
struct Args {
    /// Sender address to search for
    #[arg(long)]
    from: String,

    /// Only keep emails whose subject starts with this text
    #[arg(long)]
    subject_prefix: Option<String>,

    /// Only keep emails whose subject contains this text (case-insensitive)
    #[arg(long, conflicts_with = "subject_prefix")]
    subject_contains: Option<String>,

    /// Only keep emails whose body contains this text (case-insensitive)
    #[arg(long)]
    body_contains: Option<String>,

    /// Regex for the code; capture group 1 is used when present
    #[arg(long)]
    code_regex: Option<String>,

    /// Folder to search (overrides IMAP_FOLDER)
    #[arg(long)]
    folder: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = ImapConfig::from_env()?;
    if let Some(folder) = &args.folder {
        config.folder = Folder::from(folder.as_str());
    }
    let credentials = Credentials::from_env()?;

    let subject_prefix = args.subject_prefix.as_deref().map(Prefix::new);
    let subject_contains = args
        .subject_contains
        .as_deref()
        .map(|s| Contains::new(s).ignore_case());
    let body_contains = args
        .body_contains
        .as_deref()
        .map(|s| Contains::new(s).ignore_case());
    let code = args
        .code_regex
        .as_deref()
        .map(RegexExtractor::new)
        .transpose()?;

    let mut filters = Filters::new();
    if let Some(prefix) = &subject_prefix {
        filters = filters.subject(prefix);
    }
    if let Some(contains) = &subject_contains {
        filters = filters.subject(contains);
    }
    if let Some(contains) = &body_contains {
        filters = filters.body(contains);
    }
    if let Some(code) = &code {
        filters = filters.extractor(code);
    }

    let mut client = MailboxClient::new(config);
    client
        .connect(&credentials.address, &credentials.password)
        .await?;
    let results = client.fetch_filtered(&args.from, &filters).await;
    client.close().await?;
    let results = results?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(&results);
    }

    Ok(())
}

fn print_results(results: &ResultMap) {
    if results.is_empty() {
        println!("No codes found.");
        return;
    }

    for (recipient, value) in results {
        println!("{recipient}: {value}");
    }

    println!("\n{} code(s)", results.len());
}
