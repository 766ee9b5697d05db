// Startup banner.

use colored::Colorize;

const BANNER: &str = r#"
  ___  __ _ _ __| | __
 / __|/ _` | '__| |/ /
 \__ \ (_| | |  |   <
 |___/\__,_|_|  |_|\_\
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_red().bold());
    println!(
        "  {} {}",
        "sark".bright_white().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    println!("  {}", "recon crawler and enumeration toolkit".bright_black());
    println!(
        "  {}\n",
        "For authorized security testing only".yellow()
    );
}
