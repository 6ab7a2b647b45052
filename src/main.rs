use anyhow::Context;
use clap::Parser;
use colored::*;
use dpv_cqw::cli::{self, Args};
use std::process;

fn main() {
    let args = Args::parse();

    if let Err(error) = run(&args) {
        eprintln!("{} {:#}", "Error:".bright_red().bold(), error);
        process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    cli::run(args).with_context(|| format!("{:?} stage failed", args.command()))
}
