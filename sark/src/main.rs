use sark::commands::command_argument_builder;
use sark::handlers;
use sark_core::print_banner;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let chosen_command = command_argument_builder().get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet is set or the subcommand runs in plain mode
    let plain = matches!(
        chosen_command.subcommand(),
        Some((_, sub_matches)) if sub_matches.get_flag("plain")
    );
    if !quiet && !plain {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    match chosen_command.subcommand() {
        Some(("dir", sub_matches)) => handlers::handle_dir(sub_matches).await,
        Some(("subdomain", sub_matches)) => handlers::handle_subdomain(sub_matches).await,
        Some(("port", sub_matches)) => handlers::handle_port(sub_matches).await,
        Some(("dns", sub_matches)) => handlers::handle_dns(sub_matches).await,
        Some(("report", sub_matches)) => handlers::handle_report(sub_matches).await,
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
