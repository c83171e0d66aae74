use indicatif::{ProgressBar, ProgressStyle};

/// ビルドストリームの進捗スピナー
pub struct BuildProgress {
    progress_bar: ProgressBar,
}

impl BuildProgress {
    pub fn new(reference: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Building {}...", reference));

        Self { progress_bar: pb }
    }

    /// 非表示（テスト・非TTY向け）
    pub fn hidden() -> Self {
        Self {
            progress_bar: ProgressBar::hidden(),
        }
    }

    /// ビルド出力の1行を表示（空行は無視）
    pub fn step(&self, line: &str) {
        let line = line.trim_end();
        if !line.is_empty() {
            self.progress_bar.set_message(line.to_string());
        }
    }

    pub fn finish_success(&self) {
        self.progress_bar.finish_with_message("Build completed ✓");
    }

    pub fn finish_error(&self, error: &str) {
        self.progress_bar
            .finish_with_message(format!("Build failed: {}", error));
    }

    pub fn message(&self) -> String {
        self.progress_bar.message()
    }
}
