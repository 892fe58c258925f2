fn main() {
    let args: Vec<String> = std::env::args().collect();
    if let Err(err) = inventory::run(&args) {
        eprintln!("inventory: {}", err);
        std::process::exit(1);
    }
}
