use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("octopus-gh")
        .about("Translation PR helpers for the docs/docs-cn mirror pair")
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .num_args(1)
                .global(true)
                .help("Override RUST_LOG level (e.g., info, debug)"),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .help("Print version and exit")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("mirror")
                .about("Mirror a pull request into the sibling translation repository")
                .arg(
                    Arg::new("pr")
                        .required(true)
                        .help("Source pull request URL, e.g. https://github.com/pingcap/docs/pull/500"),
                )
                .arg(
                    Arg::new("mirror-only")
                        .long("mirror-only")
                        .action(ArgAction::SetTrue)
                        .help("Create the mirrored PR but do not trigger the translation workflow"),
                ),
        )
        .subcommand(
            Command::new("comment")
                .about("Leave the same comment on one or more pull requests")
                .arg(
                    Arg::new("body")
                        .long("body")
                        .num_args(1)
                        .required(true)
                        .help("Comment body (markdown)"),
                )
                .arg(
                    Arg::new("pr")
                        .num_args(1..)
                        .required(true)
                        .help("Pull request URLs"),
                ),
        )
}

pub fn init_logging(level: Option<&str>) {
    // Respect explicit level, else default to info, allow env override via RUST_LOG
    if let Some(lvl) = level {
        std::env::set_var("RUST_LOG", lvl);
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
