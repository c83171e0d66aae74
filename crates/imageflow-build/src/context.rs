use flate2::Compression;
use flate2::write::GzEncoder;
use imageflow_core::{EngineError, EngineResult};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::Builder;

pub struct ContextBuilder;

impl ContextBuilder {
    /// Dockerfileの場所からビルドコンテキストとDockerfileのパスを解決
    ///
    /// - ディレクトリ: そのディレクトリがコンテキスト、`Dockerfile` を使用
    /// - ファイル: 親ディレクトリがコンテキスト、そのファイルを使用
    pub fn resolve_paths(location: &Path) -> EngineResult<(PathBuf, PathBuf)> {
        if location.is_dir() {
            let dockerfile = location.join("Dockerfile");
            if !dockerfile.is_file() {
                return Err(EngineError::DockerfileNotFound(dockerfile));
            }
            return Ok((location.to_path_buf(), dockerfile));
        }

        if location.is_file() {
            let context = location
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            return Ok((context, location.to_path_buf()));
        }

        Err(EngineError::DockerfileNotFound(location.to_path_buf()))
    }

    /// ビルドコンテキストをtar.gzアーカイブとして作成
    pub fn create_context(context_path: &Path, dockerfile_path: &Path) -> EngineResult<Vec<u8>> {
        tracing::debug!("Creating build context from: {}", context_path.display());

        let mut archive_data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut archive_data, Compression::default());
            let mut tar = Builder::new(encoder);

            // コンテキストディレクトリを再帰的に追加
            tar.append_dir_all(".", context_path)?;

            // Dockerfileを "Dockerfile" として追加
            let mut dockerfile_file = File::open(dockerfile_path)?;
            let mut dockerfile_content = Vec::new();
            dockerfile_file.read_to_end(&mut dockerfile_content)?;

            let mut header = tar::Header::new_gnu();
            header.set_path("Dockerfile")?;
            header.set_size(dockerfile_content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();

            tar.append(&header, &dockerfile_content[..])?;

            tar.into_inner()?.finish()?;
        }

        tracing::debug!("Build context created: {} bytes", archive_data.len());

        Self::check_context_size(archive_data.len());

        Ok(archive_data)
    }

    /// コンテキストサイズのチェックと警告
    fn check_context_size(size: usize) {
        const MAX_CONTEXT_SIZE: usize = 500 * 1024 * 1024; // 500MB

        if size > MAX_CONTEXT_SIZE {
            tracing::warn!(
                "警告: ビルドコンテキストが大きすぎます（{}MB）\n\
                 .dockerignoreファイルで不要なファイルを除外することを推奨します。",
                size / 1024 / 1024
            );
        }
    }
}
