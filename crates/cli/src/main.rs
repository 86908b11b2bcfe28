use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use insureconsult_core::domain::financial::{FinancialInput, Industry};
use insureconsult_core::export::{deck, pptx};
use insureconsult_core::form::demo_input;
use insureconsult_core::llm::error::AnalysisError;
use insureconsult_core::llm::gemini::GeminiClient;
use insureconsult_core::llm::{prompt, AnalysisClient};
use insureconsult_core::ratios;

#[derive(Debug, Parser)]
#[command(name = "insureconsult")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reference scores computed locally from the figures. No AI call.
    Score(InputArgs),
    /// Print the prompt that would be sent for these figures.
    Prompt(InputArgs),
    /// Run one AI analysis and print it as JSON.
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Also write the proposal deck. A directory gets the default file name.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Proposal date (YYYY-MM-DD). Defaults to today's JST date.
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Use the built-in sample company; other input flags are ignored.
    #[arg(long)]
    demo: bool,

    #[arg(long)]
    company: Option<String>,

    /// Industry label, e.g. 製造業.
    #[arg(long)]
    industry: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    revenue: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    prev_revenue: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    operating_profit: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    net_income: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    current_assets: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    current_liabilities: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    total_assets: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    total_equity: Option<f64>,
}

impl InputArgs {
    fn into_input(self) -> anyhow::Result<FinancialInput> {
        if self.demo {
            return Ok(demo_input());
        }

        let company_name = self
            .company
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .context("--company is required (or pass --demo)")?;
        let industry = self
            .industry
            .as_deref()
            .context("--industry is required (or pass --demo)")?
            .parse::<Industry>()?;

        let figures = [
            self.revenue,
            self.prev_revenue,
            self.operating_profit,
            self.net_income,
            self.current_assets,
            self.current_liabilities,
            self.total_assets,
            self.total_equity,
        ];
        anyhow::ensure!(
            figures.iter().flatten().all(|v| v.is_finite()),
            "figures must be finite numbers"
        );

        Ok(FinancialInput {
            company_name,
            industry,
            revenue: self.revenue,
            prev_revenue: self.prev_revenue,
            operating_profit: self.operating_profit,
            net_income: self.net_income,
            current_assets: self.current_assets,
            current_liabilities: self.current_liabilities,
            total_assets: self.total_assets,
            total_equity: self.total_equity,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = insureconsult_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    match Cli::parse().command {
        Command::Score(args) => {
            let input = args.into_input()?;
            let scores = ratios::calculate(&input);
            println!("{}", serde_json::to_string_pretty(&scores)?);
        }
        Command::Prompt(args) => {
            let input = args.into_input()?;
            println!("{}", prompt::build_prompt(&input));
        }
        Command::Analyze { input, out, date } => {
            let input = input.into_input()?;
            let proposal_date = resolve_proposal_date(date.as_deref())?;

            let client = GeminiClient::from_settings(&settings)?;
            let analysis = match client.analyze(&input).await {
                Ok(analysis) => analysis,
                Err(e) => {
                    let err = anyhow::Error::new(e);
                    sentry_anyhow::capture_anyhow(&err);
                    if let Some(diag) = err.downcast_ref::<AnalysisError>() {
                        if let Some(raw) = diag.raw_output.as_deref() {
                            tracing::error!(stage = diag.stage, raw_output = raw, "raw model output");
                        }
                        eprintln!("{}", diag.user_message());
                    }
                    return Err(err);
                }
            };

            println!("{}", serde_json::to_string_pretty(&analysis)?);

            if let Some(out) = out {
                let path = deck_path(&out, &input.company_name);
                let bytes = pptx::write_pptx(&deck::build_deck(&analysis, &input, proposal_date))?;
                std::fs::write(&path, &bytes)
                    .with_context(|| format!("write deck to {} failed", path.display()))?;
                tracing::info!(path = %path.display(), size = bytes.len(), "deck written");
            }
        }
    }

    Ok(())
}

fn deck_path(out: &Path, company_name: &str) -> PathBuf {
    if out.is_dir() {
        out.join(deck::file_name(company_name))
    } else {
        out.to_path_buf()
    }
}

fn init_sentry(settings: &insureconsult_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

fn resolve_proposal_date(date_arg: Option<&str>) -> anyhow::Result<chrono::NaiveDate> {
    if let Some(s) = date_arg {
        return chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid --date: {s}"));
    }

    let jst = chrono::FixedOffset::east_opt(9 * 3600).context("invalid JST offset")?;
    Ok(chrono::Utc::now().with_timezone(&jst).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("insureconsult").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn score_args_build_input() {
        let Command::Score(args) = parse(&[
            "score",
            "--company",
            " 株式会社テスト ",
            "--industry",
            "建設業",
            "--revenue",
            "52000",
            "--operating-profit",
            "-3500",
        ]) else {
            panic!("expected score");
        };
        let input = args.into_input().unwrap();
        assert_eq!(input.company_name, "株式会社テスト");
        assert_eq!(input.industry.label(), "建設業");
        assert_eq!(input.revenue, Some(52000.0));
        assert_eq!(input.operating_profit, Some(-3500.0));
        assert_eq!(input.total_assets, None);
    }

    #[test]
    fn demo_ignores_other_flags() {
        let Command::Prompt(args) = parse(&["prompt", "--demo", "--company", "x"]) else {
            panic!("expected prompt");
        };
        assert_eq!(args.into_input().unwrap(), demo_input());
    }

    #[test]
    fn company_is_required_without_demo() {
        let Command::Score(args) = parse(&["score", "--revenue", "1"]) else {
            panic!("expected score");
        };
        assert!(args.into_input().is_err());
    }

    #[test]
    fn industry_is_required_without_demo() {
        let Command::Score(args) = parse(&["score", "--company", "x"]) else {
            panic!("expected score");
        };
        let err = args.into_input().unwrap_err();
        assert!(err.to_string().contains("--industry"));
    }

    #[test]
    fn unknown_industry_is_rejected() {
        let Command::Score(args) = parse(&["score", "--company", "x", "--industry", "宇宙"]) else {
            panic!("expected score");
        };
        assert!(args.into_input().is_err());
    }

    #[test]
    fn analyze_accepts_out_and_date() {
        let Command::Analyze { out, date, .. } = parse(&[
            "analyze",
            "--demo",
            "--out",
            "deck.pptx",
            "--date",
            "2026-10-17",
        ]) else {
            panic!("expected analyze");
        };
        assert_eq!(out, Some(PathBuf::from("deck.pptx")));
        assert_eq!(
            resolve_proposal_date(date.as_deref()).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
        );
        assert!(resolve_proposal_date(Some("17/10/2026")).is_err());
    }

    #[test]
    fn deck_path_uses_file_name_for_directories() {
        let dir = std::env::temp_dir();
        assert_eq!(
            deck_path(&dir, "株式会社テスト"),
            dir.join("株式会社テスト_保険提案書.pptx")
        );
        assert_eq!(
            deck_path(Path::new("custom.pptx"), "x"),
            PathBuf::from("custom.pptx")
        );
    }
}
