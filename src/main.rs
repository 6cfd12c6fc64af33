fn main() {
    if let Err(err) = flowmap_layout::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
