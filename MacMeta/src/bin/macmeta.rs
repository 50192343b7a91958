fn main() -> anyhow::Result<()> {
    macmeta::cli::run_cli()
}
