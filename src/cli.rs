use clap::Parser;
use std::path::PathBuf;

/// Serve a built WebAssembly game for local testing.
///
/// With no arguments the serve root is detected next to the executable
/// (`test-deploy/`, then `dist/`) and the first free port from 8080 is used.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file, extension optional (defaults to `preview` if present)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory searched for test-deploy/ and dist/
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Serve this directory instead of detecting one
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// First port to try
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Number of consecutive ports to try
    #[arg(short = 'n', long)]
    pub attempts: Option<u16>,

    /// Address to listen on
    #[arg(long)]
    pub host: Option<String>,
}
