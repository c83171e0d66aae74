use clap::Parser;
use colored::Colorize;
use imageflow::logging::init_tracing;
use imageflow::{DockerEngine, PipelineOptions, ReleaseContext, run_pipeline};
use imageflow_core::ImageVersion;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "imageflow")]
#[command(version)]
#[command(about = "イメージをビルド・公開し、コンテナを起動し直す", long_about = None)]
struct Cli {
    /// 新しいイメージのバージョン (vMAJOR.MINOR)
    #[arg(long)]
    tag: ImageVersion,

    /// 設定ファイルのパス
    #[arg(short, long, env = imageflow_config::CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// 同名のコンテナが存在する場合は置き換えずにエラーにする
    #[arg(long)]
    no_restart: bool,

    /// イメージの公開に失敗した場合はエラーにする
    #[arg(long)]
    require_push: bool,

    /// バージョンの検証のみ行い、何も変更しない
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = imageflow_config::find_config_file(cli.config.as_deref())?;
    let config = imageflow_config::load_config(&config_path)?;

    init_tracing(&config.logging);
    tracing::debug!("Loaded config: {}", config_path.display());

    let home_dir = imageflow_config::home_dir()?;
    let engine = DockerEngine::connect().await?;
    let ctx = ReleaseContext::new(engine, config, home_dir);

    let options = PipelineOptions {
        candidate: cli.tag,
        restart: !cli.no_restart,
        require_push: cli.require_push,
        dry_run: cli.dry_run,
    };

    match run_pipeline(&ctx, options).await {
        Ok(report) => {
            if report.container.is_some() {
                println!();
                println!("{}", "✓ リリースが完了しました".green().bold());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ リリースに失敗しました".red().bold());
            eprintln!();
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}
