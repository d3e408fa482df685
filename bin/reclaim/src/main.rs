fn main() {
    if let Err(err) = reclaim::cli::run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
