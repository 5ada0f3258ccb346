use crate::value_objects::action::Action;
use std::path::Path;

pub trait SignalRepository {
    fn load_signals(&self, path: &Path) -> Result<Vec<Action>, String>;
}
