//! ログ出力の初期化とステージ見出し

use colored::Colorize;
use imageflow_config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// tracing を初期化する
///
/// `RUST_LOG` が設定されていればそれを優先し、なければ設定ファイルの
/// `LOGGING.LEVEL` を使います。ログは stderr に出力します。
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    // テストなどで二重に初期化された場合は無視
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// ステージの見出しを出力
pub fn stage_banner(config: &LoggingConfig, title: &str) {
    let separator = config.separator();
    println!();
    println!("{}", separator.dimmed());
    println!("{}", title.bold());
    println!("{}", separator.dimmed());
}
