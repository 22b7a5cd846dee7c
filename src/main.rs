fn main() {
    if let Err(err) = docmap::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
