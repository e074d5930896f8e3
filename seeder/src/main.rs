use catalog::{CATALOG_PATH, REMOTE_CATALOG_PATH};
use clap::Parser;

use seeder::{Source, seed_catalog};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Catalog file to seed from.
    #[arg(default_value = CATALOG_PATH)]
    path: String,

    /// Fetch the published catalog instead of reading a local file.
    #[arg(long)]
    remote: bool,

    /// Override the remote catalog URL.
    #[arg(long)]
    url: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let source = if args.remote {
        Source::Remote(args.url.unwrap_or_else(|| REMOTE_CATALOG_PATH.to_string()))
    } else {
        Source::File(args.path)
    };

    seed_catalog(source).await;
}
