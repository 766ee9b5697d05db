use crate::CLAP_STYLING;
use clap::{arg, command};

fn target_arg() -> clap::Arg {
    arg!(-t --"target" <HOST>)
        .required(true)
        .help("The host to scan, without scheme")
}

fn scheme_arg() -> clap::Arg {
    arg!(-s --"scheme" <SCHEME>)
        .required(false)
        .help("Protocol used to reach the target")
        .value_parser(["http", "https"])
        .default_value("http")
}

fn threads_arg(default: &'static str) -> clap::Arg {
    arg!(--"threads" <NUM_WORKERS>)
        .required(false)
        .help("The number of async worker 'threads' in the worker pool.")
        .value_parser(clap::value_parser!(usize))
        .default_value(default)
}

fn output_args() -> Vec<clap::Arg> {
    vec![
        arg!(--"output-json" <PATH>)
            .required(false)
            .help("Append findings to a JSON report file")
            .value_parser(clap::value_parser!(std::path::PathBuf)),
        arg!(--"output-html" <PATH>)
            .required(false)
            .help("Append findings to an HTML report file")
            .value_parser(clap::value_parser!(std::path::PathBuf)),
        arg!(--"output-txt" <PATH>)
            .required(false)
            .help("Append findings to a plain text report file")
            .value_parser(clap::value_parser!(std::path::PathBuf)),
        arg!(--"plain")
            .required(false)
            .help("Print bare findings only, no banner or status decoration")
            .action(clap::ArgAction::SetTrue),
    ]
}

fn agent_args() -> Vec<clap::Arg> {
    vec![
        arg!(-u --"user-agent" <AGENT>)
            .required(false)
            .help("Fixed user agent for every request")
            .conflicts_with("random-agent"),
        arg!(--"random-agent")
            .required(false)
            .help("Pick a fresh random user agent for every request")
            .action(clap::ArgAction::SetTrue),
    ]
}

fn port_selection_args() -> Vec<clap::Arg> {
    vec![
        arg!(-p --"ports" <SPEC>)
            .required(false)
            .help("A port (80), an inclusive range (1-1000) or a comma list (80,443)")
            .conflicts_with("common"),
        arg!(--"common")
            .required(false)
            .help("Scan the common ports preset instead of a range")
            .action(clap::ArgAction::SetTrue),
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Connect timeout per port, 1 to 100 seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("2"),
    ]
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("sark")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sark")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("dir")
                .about("Crawl a host for reachable directories and files")
                .arg(target_arg())
                .arg(scheme_arg())
                .arg(
                    arg!(-i --"ignore" <CODES>)
                        .required(false)
                        .help("Comma-separated status codes to leave out of the report; classes like 4** are allowed"),
                )
                .arg(
                    arg!(-w --"wordlist" <PATH>)
                        .required(false)
                        .help("Also force-browse paths from this wordlist")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(threads_arg("10"))
                .args(agent_args())
                .args(output_args()),
        )
        .subcommand(
            command!("subdomain")
                .about("Enumerate subdomains through probing, public databases and crawling")
                .arg(target_arg())
                .arg(scheme_arg())
                .arg(
                    arg!(-i --"ignore" <CODES>)
                        .required(false)
                        .help("Comma-separated status codes to leave out of the report; classes like 4** are allowed"),
                )
                .arg(
                    arg!(-w --"wordlist" <PATH>)
                        .required(false)
                        .help("Candidate labels to probe, one per line (default: bundled list)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"db")
                        .required(false)
                        .help("Also pull known subdomains from public databases")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"no-check")
                        .required(false)
                        .help("Report database results without probing them (requires --db)")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-c --"crawl")
                        .required(false)
                        .help("Also crawl the target and collect linked sibling hosts")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(threads_arg("10"))
                .args(agent_args())
                .args(output_args()),
        )
        .subcommand(
            command!("port")
                .about("Scan the target for open TCP ports")
                .arg(target_arg())
                .args(port_selection_args())
                .arg(threads_arg("200"))
                .args(output_args()),
        )
        .subcommand(
            command!("dns")
                .about("Enumerate DNS records of the target")
                .arg(target_arg())
                .args(output_args()),
        )
        .subcommand(
            command!("report")
                .about("Full pipeline: ports, DNS records, subdomains and directories")
                .arg(target_arg())
                .arg(scheme_arg())
                .args(port_selection_args())
                .arg(
                    arg!(--"db")
                        .required(false)
                        .help("Also pull known subdomains from public databases")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"ignore-dir" <CODES>)
                        .required(false)
                        .help("Status codes to leave out of the directory report"),
                )
                .arg(
                    arg!(--"ignore-sub" <CODES>)
                        .required(false)
                        .help("Status codes to leave out of the subdomain report"),
                )
                .arg(threads_arg("10"))
                .args(agent_args())
                .args(output_args()),
        )
}
