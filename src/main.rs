use clap::ArgMatches;
use log::debug;
use octopus_gh::cli;
use octopus_gh::config::Config;
use octopus_gh::credentials;
use octopus_gh::github::GithubClient;
use octopus_gh::locator::PrLocator;
use octopus_gh::mirror::{self, MirrorOutcome, MirrorRequest};
use octopus_gh::report::{ConsoleReporter, Reporter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches();
    cli::init_logging(matches.get_one::<String>("log-level").map(|s| s.as_str()));

    if matches.get_flag("version") {
        println!("octopus-gh {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    match matches.subcommand() {
        Some(("mirror", sub)) => run_mirror(sub).await,
        Some(("comment", sub)) => run_comment(sub).await,
        _ => {
            cli::build_cli().print_long_help()?;
            Ok(())
        }
    }
}

async fn run_mirror(args: &ArgMatches) -> anyhow::Result<()> {
    let input = args.get_one::<String>("pr").expect("required by clap");
    let source = PrLocator::parse(input)?;
    let request = MirrorRequest {
        source,
        trigger_workflow: !args.get_flag("mirror-only"),
    };

    let cfg = Config::from_env();
    let tokens = credentials::default_provider();
    let reporter = ConsoleReporter;
    match mirror::run(&cfg, tokens.as_ref(), &reporter, &request).await {
        Ok(MirrorOutcome::AlreadyMirrored) => Ok(()),
        Ok(MirrorOutcome::Completed { pr_url, .. }) => {
            println!("{}", pr_url);
            Ok(())
        }
        Err(err) => {
            // Already reported to the user; keep the exit code honest.
            debug!("mirror run aborted: {}", err);
            std::process::exit(1);
        }
    }
}

async fn run_comment(args: &ArgMatches) -> anyhow::Result<()> {
    let body = args.get_one::<String>("body").expect("required by clap");
    let inputs: Vec<&String> = args
        .get_many::<String>("pr")
        .expect("required by clap")
        .collect();

    let cfg = Config::from_env();
    let token = credentials::default_provider().token()?;
    let client = GithubClient::new(cfg, token)?;
    let reporter = ConsoleReporter;

    let mut failed = false;
    for input in inputs {
        let locator = match PrLocator::parse(input) {
            Ok(locator) => locator,
            Err(err) => {
                reporter.error(&format!("{}: {}", input, err));
                failed = true;
                continue;
            }
        };
        match client
            .create_issue_comment(
                &locator.repo.owner,
                &locator.repo.name,
                locator.number,
                body,
            )
            .await
        {
            Ok(comment) => reporter.log(&format!("Commented on {}: {}", locator, comment.html_url)),
            Err(err) => {
                reporter.error(&format!("Could not comment on {}: {}", locator, err));
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
    Ok(())
}
