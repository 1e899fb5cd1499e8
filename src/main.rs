fn main() {
    if let Err(err) = vehicle_listings::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
