use oxibarrel_core::ModulePath;

/// Result of the idempotent write of one generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Content differed and was written
    Written,
    /// Content matched at the compared granularity; nothing written
    Unchanged,
    /// Content differed but the run was a check; nothing written
    Stale,
}

#[derive(Debug, Clone)]
pub struct FileChange {
    pub path: ModulePath,
    pub outcome: WriteOutcome,
}

#[derive(Debug, Clone)]
pub struct SyncResult {
    pub aggregator: FileChange,
    pub consumers: Vec<FileChange>,
    /// Files routed into the aggregator
    pub files_scanned: usize,
    pub exported_names: usize,
    pub parse_failures: usize,
}

impl SyncResult {
    pub fn written(&self) -> impl Iterator<Item = &FileChange> {
        std::iter::once(&self.aggregator)
            .chain(self.consumers.iter())
            .filter(|c| c.outcome == WriteOutcome::Written)
    }

    pub fn stale(&self) -> impl Iterator<Item = &FileChange> {
        std::iter::once(&self.aggregator)
            .chain(self.consumers.iter())
            .filter(|c| c.outcome == WriteOutcome::Stale)
    }

    pub fn has_stale(&self) -> bool {
        self.stale().next().is_some()
    }
}
