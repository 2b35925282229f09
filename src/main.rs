use wikihouse::{cli, init_logging};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so preview output on stdout stays clean
    init_logging()?;

    let argv: Vec<String> = std::env::args().collect();
    cli::run(&argv, &mut std::io::stdout().lock())
}
