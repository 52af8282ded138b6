fn main() {
    #[cfg(feature = "cli")]
    wavelzw::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("wavelzw: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
