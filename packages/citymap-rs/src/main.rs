mod cli;
mod commands;

use clap::Parser;
use cli::Args;

#[tokio::main]
async fn main() {
  let args = Args::parse();

  match commands::run(args).await {
    Ok(code) => std::process::exit(code),
    Err(e) => {
      eprintln!("Error: {:#}", e);
      std::process::exit(1);
    }
  }
}
