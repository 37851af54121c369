//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = chargeline_cli::run() {
        eprintln!("chargeline: {err}");
        std::process::exit(1);
    }
}
