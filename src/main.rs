fn main() {
    if let Err(e) = juju_charm_examples::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
