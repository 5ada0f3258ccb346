use tally_domain::repositories::signals::SignalRepository;
use tally_domain::value_objects::action::Action;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SignalRecord {
    action: String,
}

/// Reads a CSV with an `action` column holding BUY/SELL/HOLD or 1/-1/0.
/// Extra columns (for example a timestamp) are ignored.
pub fn load_signals_csv(path: &Path) -> Result<Vec<Action>, String> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|err| format!("failed to open signals csv {}: {}", path.display(), err))?;
    let mut actions = Vec::new();
    for (row, result) in reader.deserialize::<SignalRecord>().enumerate() {
        let record = result.map_err(|err| {
            format!(
                "failed to parse signals csv {} at line {}: {err}",
                path.display(),
                row + 2
            )
        })?;
        let action = record
            .action
            .parse::<Action>()
            .map_err(|err| format!("{} line {}: {err}", path.display(), row + 2))?;
        actions.push(action);
    }
    Ok(actions)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvSignalRepository;

impl CsvSignalRepository {
    pub fn new() -> Self {
        Self
    }
}

impl SignalRepository for CsvSignalRepository {
    fn load_signals(&self, path: &Path) -> Result<Vec<Action>, String> {
        let actions = load_signals_csv(path)?;
        tracing::debug!(path = %path.display(), signals = actions.len(), "signals loaded");
        Ok(actions)
    }
}
