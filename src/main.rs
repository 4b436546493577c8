use colored::Colorize;

fn main() {
    esf_bootstrap::init_tracing();
    if let Err(e) = esf_bootstrap::run() {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
