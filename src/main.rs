fn main() -> anyhow::Result<()> {
    persephone::cli::run()
}
