fn main() {
    pretty_env_logger::init();
    if let Err(err) = goatmap::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
