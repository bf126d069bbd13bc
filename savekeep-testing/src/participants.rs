use parking_lot::Mutex;
use std::sync::Arc;

use savekeep_core::{GameData, GameDataParticipant, PlayerData, PlayerDataParticipant, Result};

/// Shared, ordered record of calls made during a test.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|e| e.as_str() == entry).count()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e.as_str() == entry)
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// A participant on both channels that owns one string section.
///
/// On save it writes `value` under `section`; on load it reads the section
/// back into `value`. Every call is logged as `<kind>:<name>`, e.g.
/// `save_data:inventory`.
#[derive(Debug)]
pub struct RecordingParticipant {
    pub name: String,
    pub section: String,
    pub value: Option<String>,
    log: CallLog,
}

impl RecordingParticipant {
    pub fn new(name: impl Into<String>, log: CallLog) -> Self {
        let name = name.into();
        Self {
            section: name.clone(),
            name,
            value: None,
            log,
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn shared(self) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(self))
    }

    fn record(&self, kind: &str) {
        self.log.push(format!("{}:{}", kind, self.name));
    }
}

impl GameDataParticipant for RecordingParticipant {
    fn load_data(&mut self, data: &GameData) -> Result<()> {
        self.record("load_data");
        self.value = data.sections.get(&self.section)?;
        Ok(())
    }

    fn save_data(&mut self, data: &mut GameData) -> Result<()> {
        self.record("save_data");
        if let Some(value) = &self.value {
            data.sections.set(self.section.clone(), value)?;
        }
        Ok(())
    }

    fn participant_name(&self) -> &str {
        &self.name
    }
}

impl PlayerDataParticipant for RecordingParticipant {
    fn load_player_data(&mut self, data: &PlayerData) -> Result<()> {
        self.record("load_player_data");
        self.value = data.sections.get(&self.section)?;
        Ok(())
    }

    fn save_player_data(&mut self, data: &mut PlayerData) -> Result<()> {
        self.record("save_player_data");
        if let Some(value) = &self.value {
            data.sections.set(self.section.clone(), value)?;
        }
        Ok(())
    }

    fn participant_name(&self) -> &str {
        &self.name
    }
}
