use clap::Parser;
use std::process;
use tree_census::cli::{self, Args};

fn main() {
    let args = Args::parse();

    if let Err(error) = cli::run(args) {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}
