use clap::Parser;
use recallscope_cli::{Cli, init_tracing};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.run()
}
