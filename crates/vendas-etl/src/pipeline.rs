//! Pipeline orchestration.
//!
//! One run syncs the remote folder, classifies the mirror, then walks
//! the files in name order: recorded names are skipped, everything else
//! is read, transformed, appended to the destination table and only
//! then recorded in the ledger. Strictly sequential; the first error
//! aborts the rest of the run.

use tracing::info;
use vendas_common::Result;

use crate::config::PipelineConfig;
use crate::ledger::ProcessedFileLedger;
use crate::sink::DatabaseSink;
use crate::source::{scan_directory, SourceFile};
use crate::sync::FolderSync;
use crate::transform::transform;

/// Per-file outcomes of one run, in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLog {
    lines: Vec<String>,
}

impl RunLog {
    fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// One batch pass over the remote folder.
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    sync: &'a dyn FolderSync,
    ledger: &'a ProcessedFileLedger,
    sink: &'a DatabaseSink,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        sync: &'a dyn FolderSync,
        ledger: &'a ProcessedFileLedger,
        sink: &'a DatabaseSink,
    ) -> Self {
        Self {
            config,
            sync,
            ledger,
            sink,
        }
    }

    /// Run one full pass and report the per-file outcomes.
    ///
    /// The ledger snapshot is taken once, before the loop; a file is
    /// recorded only after its rows reach the destination table, so an
    /// aborted run retries the failing file next time.
    pub async fn run(&self) -> Result<RunLog> {
        info!(url = %self.config.folder_url, "syncing remote folder");
        self.sync.sync(&self.config.local_dir).await?;

        let candidates = scan_directory(&self.config.local_dir)?;
        info!(count = candidates.len(), "classified source files");

        self.ledger.ensure_schema().await?;
        let already_processed = self.ledger.processed_names().await?;

        let mut log = RunLog::default();
        let mut processed = 0usize;
        let mut skipped = 0usize;

        for file in &candidates {
            let name = file.name();
            if already_processed.contains(&name) {
                info!(file = %name, "already processed, skipping");
                log.push(format!("{} already processed", name));
                skipped += 1;
                continue;
            }

            self.process_file(file, &name).await?;
            log.push(format!("{} processed and saved", name));
            processed += 1;
        }

        info!(processed, skipped, "pipeline run completed");
        Ok(log)
    }

    async fn process_file(&self, file: &SourceFile, name: &str) -> Result<()> {
        info!(file = %name, file_type = %file.file_type, "processing");

        let dataset = file.file_type.reader().read(&file.path)?;
        let transformed = transform(&dataset)?;
        self.sink
            .append(&transformed, &self.config.destination_table)
            .await?;
        self.ledger.record(name).await?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use vendas_common::PipelineError;

    /// The mirror directory is prepared by the test itself.
    struct PreparedFolder;

    #[async_trait]
    impl FolderSync for PreparedFolder {
        async fn sync(&self, dest: &Path) -> Result<()> {
            fs::create_dir_all(dest)?;
            Ok(())
        }
    }

    struct Fixture {
        config: PipelineConfig,
        ledger: ProcessedFileLedger,
        sink: DatabaseSink,
        _temp: TempDir,
    }

    impl Fixture {
        fn local_dir(&self) -> &PathBuf {
            &self.config.local_dir
        }
    }

    async fn create_fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let destination_url = format!(
            "sqlite://{}?mode=rwc",
            temp.path().join("destino.db").display()
        );

        let mut config = PipelineConfig::new("http://unused.invalid", &destination_url);
        config.local_dir = temp.path().join("pasta");
        config.ledger_path = temp.path().join("historico.db");

        let ledger = ProcessedFileLedger::open(&config.ledger_path).await.unwrap();
        let sink = DatabaseSink::connect(&destination_url).await.unwrap();

        fs::create_dir_all(&config.local_dir).unwrap();

        Fixture {
            config,
            ledger,
            sink,
            _temp: temp,
        }
    }

    #[tokio::test]
    async fn test_run_processes_new_and_skips_recorded() {
        let fixture = create_fixture().await;
        fs::write(
            fixture.local_dir().join("vendas1.csv"),
            "quantidade,valor\n2,1.5\n",
        )
        .unwrap();
        fs::write(
            fixture.local_dir().join("vendas2.csv"),
            "quantidade,valor\n4,2.0\n",
        )
        .unwrap();

        fixture.ledger.ensure_schema().await.unwrap();
        fixture.ledger.record("vendas1.csv").await.unwrap();

        let pipeline = Pipeline::new(
            &fixture.config,
            &PreparedFolder,
            &fixture.ledger,
            &fixture.sink,
        );
        let log = pipeline.run().await.unwrap();

        assert_eq!(
            log.lines(),
            vec![
                "vendas1.csv already processed",
                "vendas2.csv processed and saved",
            ]
        );
        assert!(fixture
            .ledger
            .processed_names()
            .await
            .unwrap()
            .contains("vendas2.csv"));
    }

    #[tokio::test]
    async fn test_empty_mirror_yields_empty_log() {
        let fixture = create_fixture().await;

        let pipeline = Pipeline::new(
            &fixture.config,
            &PreparedFolder,
            &fixture.ledger,
            &fixture.sink,
        );
        let log = pipeline.run().await.unwrap();

        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_failing_file_aborts_run_and_stays_unrecorded() {
        let fixture = create_fixture().await;
        fs::write(
            fixture.local_dir().join("vendas1.csv"),
            "quantidade,preco\n2,1.5\n",
        )
        .unwrap();

        let pipeline = Pipeline::new(
            &fixture.config,
            &PreparedFolder,
            &fixture.ledger,
            &fixture.sink,
        );
        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(err, PipelineError::Schema(_)));
        assert!(fixture.ledger.processed_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sync_failure_is_fatal_before_processing() {
        struct BrokenSync;

        #[async_trait]
        impl FolderSync for BrokenSync {
            async fn sync(&self, _dest: &Path) -> Result<()> {
                Err(PipelineError::sync("remote folder unreachable"))
            }
        }

        let fixture = create_fixture().await;
        let pipeline = Pipeline::new(
            &fixture.config,
            &BrokenSync,
            &fixture.ledger,
            &fixture.sink,
        );

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, PipelineError::Sync(_)));
    }
}
