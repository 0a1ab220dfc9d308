use anyhow::anyhow;
use clap::{value_parser, Arg, ArgMatches, Command};
use docnav::{
    build::Site,
    error::Result,
    model::Sidebars,
    outline,
    validate::Severity,
};
use std::{path::PathBuf, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("docnav")
        .about("Check and render the sidebars of a documentation site")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("root")
                .long("root")
                .short('r')
                .value_name("DIR")
                .help("Root directory of the site")
                .value_parser(value_parser!(PathBuf))
                .default_value(".")
                .global(true),
        )
        .subcommand(Command::new("check").about("Check sidebars against the docs directory"))
        .subcommand(
            Command::new("build")
                .about("Check the site and run the configured renderers")
                .arg(
                    Arg::new("dest")
                        .long("dest")
                        .short('d')
                        .value_name("DIR")
                        .help("Output directory, overriding site.build-dir")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(Command::new("outline").about("Print the sidebars as a Markdown outline"))
        .subcommand(
            Command::new("docs")
                .about("List document references in display order")
                .arg(Arg::new("sidebar").help("Only list this sidebar")),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert sidebars between JSON, YAML and Markdown outline")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli().get_matches()) {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(matches: ArgMatches) -> Result<ExitCode> {
    let root = matches
        .get_one::<PathBuf>("root")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));

    match matches.subcommand() {
        Some(("check", _)) => check(root),
        Some(("build", args)) => {
            let mut site = Site::load(root)?;
            if let Some(dest) = args.get_one::<PathBuf>("dest") {
                site.with_destination(dest);
            }
            site.build()?;
            info!("Build finished");

            Ok(ExitCode::SUCCESS)
        }
        Some(("outline", _)) => {
            let site = Site::load(root)?;
            print!("{}", outline::render(site.sidebars(), Some(site.documents()))?);

            Ok(ExitCode::SUCCESS)
        }
        Some(("docs", args)) => {
            let site = Site::load(root)?;
            list_docs(site.sidebars(), args.get_one::<String>("sidebar"))?;

            Ok(ExitCode::SUCCESS)
        }
        Some(("convert", args)) => {
            let (Some(input), Some(output)) = (
                args.get_one::<PathBuf>("input"),
                args.get_one::<PathBuf>("output"),
            ) else {
                return Err(anyhow!("convert needs an input and an output path"));
            };
            Sidebars::load(input)?.save(output)?;
            info!("Wrote {}", output.display());

            Ok(ExitCode::SUCCESS)
        }
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn check(root: PathBuf) -> Result<ExitCode> {
    let site = Site::load(root)?;
    let report = site.check();

    for problem in report.problems() {
        match problem.severity() {
            Severity::Error => println!("error: {problem}"),
            Severity::Warning => println!("warning: {problem}"),
        }
    }

    if report.is_ok() {
        info!(
            "{} sidebar(s) and {} document(s) checked",
            site.sidebars().len(),
            site.documents().len()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}

fn list_docs(sidebars: &Sidebars, only: Option<&String>) -> Result<()> {
    if let Some(name) = only {
        let sidebar = sidebars
            .get(name)
            .ok_or_else(|| anyhow!("No sidebar named `{name}`"))?;
        for id in sidebar.doc_ids() {
            println!("{id}");
        }

        return Ok(());
    }

    for (_, sidebar) in sidebars.iter() {
        for id in sidebar.doc_ids() {
            println!("{id}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn parses_global_root_after_subcommand() {
        let matches = cli()
            .try_get_matches_from(["docnav", "build", "--root", "site", "--dest", "out"])
            .expect("arguments should parse");

        assert_eq!(
            matches.get_one::<PathBuf>("root"),
            Some(&PathBuf::from("site"))
        );
        let (name, args) = matches.subcommand().expect("subcommand was missing");
        assert_eq!(name, "build");
        assert_eq!(args.get_one::<PathBuf>("dest"), Some(&PathBuf::from("out")));
    }
}
