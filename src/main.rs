use std::process::exit;

use colored::Colorize;

fn main() {
    if let Err(e) = matrixview::app::run_cli() {
        eprintln!("{}{}{} {}", "[".bold().white(), "ERR".bold().red(), "]".bold().white(), e);
        exit(1);
    }
}
