use crate::demo::{run_class_profile, run_classify, run_demo, ClassProfileArgs, ClassifyArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use meta_profile::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "META Profile",
    about = "Classify META results into latent profiles and rank coaching interventions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Classify one student's T-score vector and rank the matching interventions
    Classify(ClassifyArgs),
    /// Aggregate a roster CSV export into class strengths and weaknesses
    ClassProfile(ClassProfileArgs),
    /// Run an end-to-end demo over a synthetic class
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Classify(args) => run_classify(args),
        Command::ClassProfile(args) => run_class_profile(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use meta_profile::assessment::SchoolLevel;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn classify_parses_level_and_scores() {
        let scores = vec!["55"; 38].join(",");
        let cli = Cli::try_parse_from([
            "meta-profile-api",
            "classify",
            "--level",
            "중학교",
            "--scores",
            scores.as_str(),
            "--top-n",
            "5",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Classify(args)) => {
                assert_eq!(args.level, SchoolLevel::Middle);
                assert_eq!(args.scores.0.len(), 38);
                assert_eq!(args.top_n, Some(5));
            }
            other => panic!("expected classify command, got {other:?}"),
        }
    }

    #[test]
    fn missing_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["meta-profile-api"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
