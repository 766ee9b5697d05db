use clap::ArgMatches;
use colored::Colorize;
use sark_core::crawl::{CrawlOptions, execute_crawl};
use sark_core::dns::execute_dns_enum;
use sark_core::ignore::parse_ignore_list;
use sark_core::opendb::{register_unchecked, retrieve_subdomains};
use sark_core::portscan::{PortScanOptions, execute_port_scan, parse_port_selection};
use sark_core::report::{OutputTargets, RecordKind, Reporter};
use sark_core::wordlist::{
    ProbeOptions, build_probe_url, host_probe_urls, load_wordlist, probe_candidates,
};
use sark_scanner::crawler::{REQUEST_TIMEOUT_SECS, build_probe_client, normalize_url};
use sark_scanner::{AssetRegistry, CrawlMode, KeyStyle, ScopeSpec, UserAgentPolicy};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

const DEFAULT_SUBDOMAIN_WORDLIST: &str = include_str!("../wordlists/subdomains.txt");

// Helper functions shared by the subcommand handlers

/// Validates the target flag. A leading scheme is stripped rather than
/// rejected; what remains must parse as a host, optionally with a port
/// or path.
pub fn parse_target(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.trim_end_matches('/');

    if trimmed.is_empty() {
        return Err("Target must not be empty".to_string());
    }
    let probe = format!("http://{}", trimmed);
    let parsed = Url::parse(&probe).map_err(|e| format!("Invalid target '{}': {}", raw, e))?;
    if parsed.host_str().is_none() {
        return Err(format!("Invalid target '{}'", raw));
    }
    Ok(trimmed.to_string())
}

/// All configured output paths must be distinct files.
pub fn validate_output_paths(
    json: Option<&PathBuf>,
    html: Option<&PathBuf>,
    txt: Option<&PathBuf>,
) -> Result<(), String> {
    let paths: Vec<&PathBuf> = [json, html, txt].into_iter().flatten().collect();
    for (index, first) in paths.iter().enumerate() {
        for second in &paths[index + 1..] {
            if first == second {
                return Err("The output paths must all be different".to_string());
            }
        }
    }
    Ok(())
}

pub fn validate_port_timeout(timeout_secs: u64) -> Result<(), String> {
    if !(1..=100).contains(&timeout_secs) {
        return Err("Port scan timeout must be between 1 and 100 seconds".to_string());
    }
    Ok(())
}

/// The no-check option only makes sense for unprobed database results,
/// so it requires --db and excludes everything that needs a probe.
pub fn validate_subdomain_flags(
    db: bool,
    no_check: bool,
    wordlist: Option<&PathBuf>,
    ignore: Option<&String>,
    crawl: bool,
) -> Result<(), String> {
    if no_check {
        if !db {
            return Err("The no-check option requires the db option".to_string());
        }
        if wordlist.is_some() || ignore.is_some() || crawl {
            return Err(
                "The no-check option cannot be combined with wordlist, ignore or crawl"
                    .to_string(),
            );
        }
    }
    Ok(())
}

/// Builds the sink set from the shared output flags, expanding `~` in
/// each path.
pub fn output_targets_from(args: &ArgMatches) -> Result<OutputTargets, String> {
    let json = expand_output_path(args.get_one::<PathBuf>("output-json"));
    let html = expand_output_path(args.get_one::<PathBuf>("output-html"));
    let txt = expand_output_path(args.get_one::<PathBuf>("output-txt"));
    validate_output_paths(json.as_ref(), html.as_ref(), txt.as_ref())?;
    Ok(OutputTargets {
        json,
        html,
        txt,
        plain: args.get_flag("plain"),
    })
}

fn expand_output_path(path: Option<&PathBuf>) -> Option<PathBuf> {
    path.map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref()))
}

fn agent_policy_from(args: &ArgMatches) -> UserAgentPolicy {
    UserAgentPolicy::from_flags(
        args.get_one::<String>("user-agent").map(String::as_str),
        args.get_flag("random-agent"),
    )
}

fn ignore_from(args: &ArgMatches, id: &str) -> Result<HashSet<u16>, String> {
    match args.get_one::<String>(id) {
        Some(raw) => parse_ignore_list(raw),
        None => Ok(HashSet::new()),
    }
}

fn bundled_subdomain_words() -> Vec<String> {
    DEFAULT_SUBDOMAIN_WORDLIST
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.trim().starts_with('#'))
        .map(|line| line.trim().to_string())
        .collect()
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_scan_header(title: &str, rows: &[(&str, String)], plain: bool) {
    if plain {
        return;
    }
    print_divider();
    println!("{}", format!("  {}", title).bright_white().bold());
    print_divider();
    for (label, value) in rows {
        println!("{} {}: {}", "→".blue(), label, value.bright_white());
    }
    println!();
}

fn print_section(title: &str, plain: bool) {
    if !plain {
        println!("\n{}", format!("━━ {}", title).bright_blue().bold());
    }
}

// Subcommand handlers

pub async fn handle_dir(sub_matches: &ArgMatches) {
    if let Err(err) = run_dir(sub_matches).await {
        eprintln!("{} {}", "✗".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run_dir(args: &ArgMatches) -> Result<(), String> {
    let target = parse_target(args.get_one::<String>("target").unwrap())?;
    let scheme = args.get_one::<String>("scheme").unwrap().clone();
    let workers = *args.get_one::<usize>("threads").unwrap();
    let ignore = ignore_from(args, "ignore")?;
    let wordlist_path = args.get_one::<PathBuf>("wordlist").cloned();
    let targets = output_targets_from(args)?;
    let agent = agent_policy_from(args);
    let plain = targets.plain;

    print_scan_header(
        "DIRECTORY HUNT",
        &[
            ("Target", target.clone()),
            ("Scheme", scheme.clone()),
            ("Workers", workers.to_string()),
        ],
        plain,
    );

    let reporter = Arc::new(Reporter::new(targets));
    reporter
        .init_files(&target)
        .map_err(|e| format!("Failed to initialize output files: {}", e))?;
    let registry = Arc::new(AssetRegistry::new(KeyStyle::Url));

    let options = CrawlOptions {
        target: target.clone(),
        scheme: scheme.clone(),
        mode: CrawlMode::Directory,
        ignore: ignore.clone(),
        agent: agent.clone(),
        workers,
    };
    execute_crawl(options, Arc::clone(&registry), Arc::clone(&reporter)).await?;

    if let Some(path) = wordlist_path {
        let words = load_wordlist(&path)?;
        let scope = Arc::new(
            ScopeSpec::new(&target, &scheme, CrawlMode::Directory)
                .map_err(|e| format!("Invalid scope for {}: {}", target, e))?,
        );
        let base = scope.seed_url();
        let mut candidates = Vec::with_capacity(words.len());
        for word in &words {
            let url = build_probe_url(&base, word)?;
            let url = normalize_url(&url).map_err(|e| format!("Invalid probe URL: {}", e))?;
            candidates.push(url);
        }
        probe_candidates(
            candidates,
            ProbeOptions {
                ignore,
                agent,
                workers,
                show_progress: !plain,
            },
            scope,
            Arc::clone(&registry),
            Arc::clone(&reporter),
            RecordKind::Dir,
        )
        .await?;
    }

    reporter
        .finish_files()
        .map_err(|e| format!("Failed to finalize output files: {}", e))?;

    if !plain {
        println!("\n{} {} directories found", "✓".green().bold(), registry.len());
    }
    Ok(())
}

pub async fn handle_subdomain(sub_matches: &ArgMatches) {
    if let Err(err) = run_subdomain(sub_matches).await {
        eprintln!("{} {}", "✗".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run_subdomain(args: &ArgMatches) -> Result<(), String> {
    let target = parse_target(args.get_one::<String>("target").unwrap())?;
    let scheme = args.get_one::<String>("scheme").unwrap().clone();
    let workers = *args.get_one::<usize>("threads").unwrap();
    let db = args.get_flag("db");
    let no_check = args.get_flag("no-check");
    let crawl = args.get_flag("crawl");
    validate_subdomain_flags(
        db,
        no_check,
        args.get_one::<PathBuf>("wordlist"),
        args.get_one::<String>("ignore"),
        crawl,
    )?;
    let ignore = ignore_from(args, "ignore")?;
    let wordlist_path = args.get_one::<PathBuf>("wordlist").cloned();
    let targets = output_targets_from(args)?;
    let agent = agent_policy_from(args);
    let plain = targets.plain;

    print_scan_header(
        "SUBDOMAIN HUNT",
        &[
            ("Target", target.clone()),
            ("Scheme", scheme.clone()),
            ("Workers", workers.to_string()),
        ],
        plain,
    );

    let reporter = Arc::new(Reporter::new(targets));
    reporter
        .init_files(&target)
        .map_err(|e| format!("Failed to initialize output files: {}", e))?;
    let registry = Arc::new(AssetRegistry::new(KeyStyle::Host));
    let scope = Arc::new(
        ScopeSpec::new(&target, &scheme, CrawlMode::Subdomain)
            .map_err(|e| format!("Invalid scope for {}: {}", target, e))?,
    );

    if db {
        let client = build_probe_client(&agent, REQUEST_TIMEOUT_SECS)
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;
        let hosts = retrieve_subdomains(&client, &target).await;
        if !plain {
            println!(
                "{} {} candidates from public databases",
                "→".blue(),
                hosts.len()
            );
        }
        if no_check {
            register_unchecked(&hosts, &registry, &reporter, &RecordKind::Subdomain)?;
        } else {
            probe_candidates(
                host_probe_urls(&hosts, &scheme),
                ProbeOptions {
                    ignore: ignore.clone(),
                    agent: agent.clone(),
                    workers,
                    show_progress: !plain,
                },
                Arc::clone(&scope),
                Arc::clone(&registry),
                Arc::clone(&reporter),
                RecordKind::Subdomain,
            )
            .await?;
        }
    }

    if !no_check {
        let words = match &wordlist_path {
            Some(path) => load_wordlist(path)?,
            None => bundled_subdomain_words(),
        };
        let hosts: Vec<String> = words
            .iter()
            .map(|word| format!("{}.{}", word, target))
            .collect();
        probe_candidates(
            host_probe_urls(&hosts, &scheme),
            ProbeOptions {
                ignore: ignore.clone(),
                agent: agent.clone(),
                workers,
                show_progress: !plain,
            },
            Arc::clone(&scope),
            Arc::clone(&registry),
            Arc::clone(&reporter),
            RecordKind::Subdomain,
        )
        .await?;
    }

    if crawl {
        let options = CrawlOptions {
            target: target.clone(),
            scheme: scheme.clone(),
            mode: CrawlMode::Subdomain,
            ignore,
            agent,
            workers,
        };
        execute_crawl(options, Arc::clone(&registry), Arc::clone(&reporter)).await?;
    }

    reporter
        .finish_files()
        .map_err(|e| format!("Failed to finalize output files: {}", e))?;

    if !plain {
        println!("\n{} {} subdomains found", "✓".green().bold(), registry.len());
    }
    Ok(())
}

pub async fn handle_port(sub_matches: &ArgMatches) {
    if let Err(err) = run_port(sub_matches).await {
        eprintln!("{} {}", "✗".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run_port(args: &ArgMatches) -> Result<(), String> {
    let target = parse_target(args.get_one::<String>("target").unwrap())?;
    let ports = parse_port_selection(
        args.get_one::<String>("ports").map(String::as_str),
        args.get_flag("common"),
    )?;
    let timeout_secs = *args.get_one::<u64>("timeout").unwrap();
    validate_port_timeout(timeout_secs)?;
    let workers = *args.get_one::<usize>("threads").unwrap();
    let targets = output_targets_from(args)?;
    let plain = targets.plain;

    print_scan_header(
        "PORT SCAN",
        &[
            ("Target", target.clone()),
            ("Ports", ports.len().to_string()),
            ("Timeout", format!("{}s", timeout_secs)),
        ],
        plain,
    );

    let reporter = Arc::new(Reporter::new(targets));
    reporter
        .init_files(&target)
        .map_err(|e| format!("Failed to initialize output files: {}", e))?;

    let open = execute_port_scan(
        PortScanOptions {
            host: target.clone(),
            ports,
            timeout_secs,
            workers,
            show_progress: !plain,
        },
        Arc::clone(&reporter),
    )
    .await?;

    reporter
        .finish_files()
        .map_err(|e| format!("Failed to finalize output files: {}", e))?;

    if !plain {
        println!(
            "\n{} {} open ports on {}",
            "✓".green().bold(),
            open.len(),
            target
        );
    }
    Ok(())
}

pub async fn handle_dns(sub_matches: &ArgMatches) {
    if let Err(err) = run_dns(sub_matches).await {
        eprintln!("{} {}", "✗".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run_dns(args: &ArgMatches) -> Result<(), String> {
    let target = parse_target(args.get_one::<String>("target").unwrap())?;
    let targets = output_targets_from(args)?;
    let plain = targets.plain;

    print_scan_header("DNS ENUMERATION", &[("Target", target.clone())], plain);

    let reporter = Arc::new(Reporter::new(targets));
    reporter
        .init_files(&target)
        .map_err(|e| format!("Failed to initialize output files: {}", e))?;

    execute_dns_enum(&target, Arc::clone(&reporter)).await?;

    reporter
        .finish_files()
        .map_err(|e| format!("Failed to finalize output files: {}", e))?;

    if !plain {
        let total = reporter
            .collected()
            .dns
            .values()
            .map(Vec::len)
            .sum::<usize>();
        println!("\n{} {} DNS records found", "✓".green().bold(), total);
    }
    Ok(())
}

pub async fn handle_report(sub_matches: &ArgMatches) {
    if let Err(err) = run_report(sub_matches).await {
        eprintln!("{} {}", "✗".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run_report(args: &ArgMatches) -> Result<(), String> {
    let target = parse_target(args.get_one::<String>("target").unwrap())?;
    let scheme = args.get_one::<String>("scheme").unwrap().clone();
    let workers = *args.get_one::<usize>("threads").unwrap();
    let db = args.get_flag("db");
    let ports = parse_port_selection(
        args.get_one::<String>("ports").map(String::as_str),
        args.get_flag("common"),
    )?;
    let timeout_secs = *args.get_one::<u64>("timeout").unwrap();
    validate_port_timeout(timeout_secs)?;
    let ignore_dir = ignore_from(args, "ignore-dir")?;
    let ignore_sub = ignore_from(args, "ignore-sub")?;
    let targets = output_targets_from(args)?;
    let agent = agent_policy_from(args);
    let plain = targets.plain;

    print_scan_header(
        "FULL RECON",
        &[
            ("Target", target.clone()),
            ("Scheme", scheme.clone()),
            ("Workers", workers.to_string()),
        ],
        plain,
    );

    let reporter = Arc::new(Reporter::new(targets));
    reporter
        .init_files(&target)
        .map_err(|e| format!("Failed to initialize output files: {}", e))?;

    print_section("Port scan", plain);
    execute_port_scan(
        PortScanOptions {
            host: target.clone(),
            ports,
            timeout_secs,
            workers,
            show_progress: !plain,
        },
        Arc::clone(&reporter),
    )
    .await?;

    print_section("DNS records", plain);
    execute_dns_enum(&target, Arc::clone(&reporter)).await?;

    print_section("Subdomains", plain);
    let sub_registry = Arc::new(AssetRegistry::new(KeyStyle::Host));
    let sub_scope = Arc::new(
        ScopeSpec::new(&target, &scheme, CrawlMode::Subdomain)
            .map_err(|e| format!("Invalid scope for {}: {}", target, e))?,
    );
    if db {
        let client = build_probe_client(&agent, REQUEST_TIMEOUT_SECS)
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;
        let hosts = retrieve_subdomains(&client, &target).await;
        probe_candidates(
            host_probe_urls(&hosts, &scheme),
            ProbeOptions {
                ignore: ignore_sub.clone(),
                agent: agent.clone(),
                workers,
                show_progress: !plain,
            },
            Arc::clone(&sub_scope),
            Arc::clone(&sub_registry),
            Arc::clone(&reporter),
            RecordKind::Subdomain,
        )
        .await?;
    }
    execute_crawl(
        CrawlOptions {
            target: target.clone(),
            scheme: scheme.clone(),
            mode: CrawlMode::Subdomain,
            ignore: ignore_sub,
            agent: agent.clone(),
            workers,
        },
        Arc::clone(&sub_registry),
        Arc::clone(&reporter),
    )
    .await?;

    print_section("Directories", plain);
    let dir_registry = Arc::new(AssetRegistry::new(KeyStyle::Url));
    execute_crawl(
        CrawlOptions {
            target: target.clone(),
            scheme,
            mode: CrawlMode::Directory,
            ignore: ignore_dir,
            agent,
            workers,
        },
        Arc::clone(&dir_registry),
        Arc::clone(&reporter),
    )
    .await?;

    reporter
        .finish_files()
        .map_err(|e| format!("Failed to finalize output files: {}", e))?;

    if !plain {
        let collected = reporter.collected();
        let dns_total = collected.dns.values().map(Vec::len).sum::<usize>();
        println!();
        print_divider();
        println!("{} {} open ports", "✓".green().bold(), collected.port.len());
        println!("{} {} DNS records", "✓".green().bold(), dns_total);
        println!(
            "{} {} subdomains",
            "✓".green().bold(),
            collected.subdomain.len()
        );
        println!("{} {} directories", "✓".green().bold(), collected.dir.len());
    }
    Ok(())
}
