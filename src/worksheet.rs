//! Worksheet session: in-memory answers plus the UI-side bookkeeping
//!
//! The session owns the authoritative answers. Every change is written
//! through to the [`PersistenceStore`]; mounting loads once, reset clears
//! the slot and goes back to defaults.
//!
//! Timers (toast fade, cheer overlay) are plain deadlines advanced by
//! [`Worksheet::tick`], so the host only has to call it from whatever
//! clock it has.

use std::collections::HashSet;

use crate::consts::{CHEER_DURATION_MS, TOAST_CLEAR_MS, TOAST_HIDE_MS};
use crate::error::FieldError;
use crate::form::{FormRecord, MAX_SCORE, ScoreField, Step, TextField, WorksheetData};
use crate::persistence::{LoadSource, PersistenceStore};
use crate::platform::storage::StorageProvider;
use crate::validation::{self, FieldIssue};

/// Notification shown at the bottom of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Toast {
    #[default]
    None,
    Saved,
    Reset,
}

impl Toast {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Toast::None => None,
            Toast::Saved => Some("このまま閉じても、記録は保持されます"),
            Toast::Reset => Some("記録はリセットされました"),
        }
    }
}

/// One user's worksheet session
pub struct Worksheet<S> {
    store: PersistenceStore<S>,
    data: WorksheetData,
    restored_from: LoadSource,
    /// Whether the most recent save reached storage
    last_save_ok: bool,

    // === Toast ===
    toast: Toast,
    toast_visible: bool,
    toast_hide_at: Option<f64>,
    toast_clear_at: Option<f64>,

    // === Celebration ===
    has_celebrated: bool,
    cheer_until: Option<f64>,

    // === Focus / validation ===
    active_step: Option<Step>,
    touched: HashSet<&'static str>,
}

impl<S: StorageProvider> Worksheet<S> {
    /// Load saved answers (or defaults) and start a session
    pub fn mount(store: PersistenceStore<S>) -> Self {
        let loaded = store.load_with_source(&WorksheetData::default_record());
        let data = WorksheetData::from_record(&loaded.record);
        if loaded.source.restored() {
            log::info!("Worksheet restored from saved answers ({:?})", loaded.source);
        } else {
            log::info!("Worksheet mounted empty ({:?})", loaded.source);
        }

        Self {
            store,
            data,
            restored_from: loaded.source,
            last_save_ok: true,
            toast: Toast::None,
            toast_visible: false,
            toast_hide_at: None,
            toast_clear_at: None,
            has_celebrated: false,
            cheer_until: None,
            active_step: None,
            touched: HashSet::new(),
        }
    }

    pub fn data(&self) -> &WorksheetData {
        &self.data
    }

    pub fn record(&self) -> FormRecord {
        self.data.to_record()
    }

    pub fn store(&self) -> &PersistenceStore<S> {
        &self.store
    }

    /// Where the answers came from at mount time
    pub fn restored_from(&self) -> LoadSource {
        self.restored_from
    }

    pub fn last_save_ok(&self) -> bool {
        self.last_save_ok
    }

    /// Apply an arbitrary change. Saves only if something changed.
    pub fn update(&mut self, now_ms: f64, f: impl FnOnce(&mut WorksheetData)) {
        let before = self.data.clone();
        f(&mut self.data);
        if self.data != before {
            self.on_change(now_ms);
        }
    }

    pub fn set_text(&mut self, field: TextField, value: impl Into<String>, now_ms: f64) {
        let value = value.into();
        self.touched.insert(field.key());
        self.update(now_ms, |data| *data.text_mut(field) = value);
    }

    pub fn set_score(
        &mut self,
        field: ScoreField,
        value: Option<u8>,
        now_ms: f64,
    ) -> Result<(), FieldError> {
        if let Some(v) = value.filter(|v| *v > MAX_SCORE) {
            return Err(FieldError::ScoreOutOfRange {
                field: field.key(),
                value: v,
            });
        }
        self.touched.insert(field.key());
        self.update(now_ms, |data| *data.score_mut(field) = value);
        Ok(())
    }

    /// Set a field from a raw form control value, looked up by record key.
    /// An empty value clears a score.
    pub fn set_field(&mut self, key: &str, raw: &str, now_ms: f64) -> Result<(), FieldError> {
        if let Some(field) = TextField::from_key(key) {
            self.set_text(field, raw, now_ms);
            return Ok(());
        }
        let field =
            ScoreField::from_key(key).ok_or_else(|| FieldError::UnknownField(key.to_string()))?;
        let value = match raw.trim() {
            "" => None,
            s => Some(s.parse::<u8>().map_err(|_| FieldError::NotScore(field.key()))?),
        };
        self.set_score(field, value, now_ms)
    }

    fn on_change(&mut self, now_ms: f64) {
        self.last_save_ok = self.store.save(&self.data.to_record()).is_ok();
        if self.toast == Toast::None {
            self.show_toast(Toast::Saved, now_ms);
        }
    }

    fn show_toast(&mut self, toast: Toast, now_ms: f64) {
        self.toast = toast;
        self.toast_visible = true;
        self.toast_hide_at = Some(now_ms + TOAST_HIDE_MS);
        self.toast_clear_at = Some(now_ms + TOAST_CLEAR_MS);
    }

    /// Clear saved answers and return to an empty worksheet.
    ///
    /// The in-memory reset happens even if storage refuses the delete.
    pub fn reset(&mut self, now_ms: f64) {
        let _ = self.store.clear();
        self.data = WorksheetData::default();
        self.has_celebrated = false;
        self.cheer_until = None;
        self.active_step = None;
        self.touched.clear();
        self.show_toast(Toast::Reset, now_ms);
    }

    /// Advance toast and overlay deadlines
    pub fn tick(&mut self, now_ms: f64) {
        if self.toast_hide_at.is_some_and(|t| now_ms >= t) {
            self.toast_visible = false;
            self.toast_hide_at = None;
        }
        if self.toast_clear_at.is_some_and(|t| now_ms >= t) {
            self.toast = Toast::None;
            self.toast_clear_at = None;
        }
        if self.cheer_until.is_some_and(|t| now_ms >= t) {
            self.cheer_until = None;
        }
    }

    pub fn toast(&self) -> Toast {
        self.toast
    }

    /// Whether the toast is faded in (it stays mounted briefly to fade out)
    pub fn toast_visible(&self) -> bool {
        self.toast_visible
    }

    pub fn is_complete(&self) -> bool {
        validation::is_complete(&self.data)
    }

    /// Whether the "done" button is enabled
    pub fn can_celebrate(&self) -> bool {
        self.is_complete() && !self.has_celebrated
    }

    /// Show the cheer overlay once per completed worksheet
    pub fn celebrate(&mut self, now_ms: f64) -> bool {
        if !self.can_celebrate() {
            return false;
        }
        self.has_celebrated = true;
        self.cheer_until = Some(now_ms + CHEER_DURATION_MS);
        log::info!("Worksheet completed");
        true
    }

    pub fn cheer_visible(&self) -> bool {
        self.cheer_until.is_some()
    }

    pub fn focus_step(&mut self, step: Step) {
        self.active_step = Some(step);
    }

    pub fn active_step(&self) -> Option<Step> {
        self.active_step
    }

    /// Mark a field as visited so its error shows (on blur)
    pub fn touch(&mut self, key: &str) {
        if let Some(field) = TextField::from_key(key) {
            self.touched.insert(field.key());
        } else if let Some(field) = ScoreField::from_key(key) {
            self.touched.insert(field.key());
        }
    }

    /// Validation issue for a touched text field
    pub fn text_issue(&self, field: TextField) -> Option<FieldIssue> {
        if !self.touched.contains(field.key()) {
            return None;
        }
        validation::check_text(field, self.data.text(field))
    }

    /// Validation issue for a touched score field
    pub fn score_issue(&self, field: ScoreField) -> Option<FieldIssue> {
        if !self.touched.contains(field.key()) {
            return None;
        }
        validation::check_score(field, self.data.score(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::STORAGE_KEY;
    use crate::platform::MemoryStorage;
    use serde_json::Value;

    fn fresh() -> Worksheet<MemoryStorage> {
        Worksheet::mount(PersistenceStore::new(MemoryStorage::new()))
    }

    fn fill_all(ws: &mut Worksheet<MemoryStorage>) {
        ws.update(0.0, |d| {
            d.step1_scene = "夜眠れなかった日".into();
            d.step1_body = "胸が苦しくなる感じ".into();
            d.step1_feelings = "焦り".into();
            d.step2_external = "他人の言葉や意見の影響".into();
            d.step2_internal = "自分の価値観・信念".into();
            d.step2_physical = "睡眠不足や疲労".into();
            d.step2_social = "集団圧力や周囲の空気".into();
            d.step3_reliefs = "散歩をすると落ち着く".into();
            d.step3_awareness = "その他".into();
            d.step4_name = "あおい".into();
            d.step4_guide = "深呼吸してこのワークを思い出そう".into();
        });
    }

    #[test]
    fn test_mount_fresh() {
        let ws = fresh();
        assert_eq!(ws.data(), &WorksheetData::default());
        assert_eq!(ws.restored_from(), LoadSource::Empty);
        assert_eq!(ws.toast(), Toast::None);
        // Mounting does not write
        assert!(ws.store().provider().is_empty());
    }

    #[test]
    fn test_change_saves_and_remounts() {
        let mut ws = fresh();
        ws.set_text(TextField::Step1Scene, "夜眠れなかった", 0.0);
        ws.set_score(ScoreField::Step1Intensity, Some(9), 10.0).unwrap();
        assert!(ws.last_save_ok());

        let raw = ws.store().provider().raw(STORAGE_KEY).unwrap();
        let storage = MemoryStorage::with_item(STORAGE_KEY, &raw);
        let again = Worksheet::mount(PersistenceStore::new(storage));
        assert_eq!(again.data(), ws.data());
        assert_eq!(again.restored_from(), LoadSource::Versioned(Some(1)));
    }

    #[test]
    fn test_mount_stale_values_fall_back() {
        let raw = r#"{"v":1,"data":{"step1Intensity":"high","step4Name":"あおい"}}"#;
        let ws = Worksheet::mount(PersistenceStore::new(MemoryStorage::with_item(
            STORAGE_KEY,
            raw,
        )));
        assert_eq!(ws.data().step1_intensity, None);
        assert_eq!(ws.data().step4_name, "あおい");
    }

    #[test]
    fn test_set_field_from_controls() {
        let mut ws = fresh();
        ws.set_field("step4Name", "あおい", 0.0).unwrap();
        ws.set_field("step2Fatigue", "3", 0.0).unwrap();
        assert_eq!(ws.data().step2_fatigue, Some(3));
        ws.set_field("step2Fatigue", "", 0.0).unwrap();
        assert_eq!(ws.data().step2_fatigue, None);

        assert_eq!(
            ws.set_field("step2Fatigue", "11", 0.0),
            Err(FieldError::ScoreOutOfRange {
                field: "step2Fatigue",
                value: 11
            })
        );
        assert_eq!(
            ws.set_field("step2Fatigue", "x", 0.0),
            Err(FieldError::NotScore("step2Fatigue"))
        );
        assert_eq!(
            ws.set_field("nope", "x", 0.0),
            Err(FieldError::UnknownField("nope".into()))
        );
    }

    #[test]
    fn test_saved_toast_lifecycle() {
        let mut ws = fresh();
        ws.set_text(TextField::Step4Name, "あお", 1000.0);
        assert_eq!(ws.toast(), Toast::Saved);
        assert!(ws.toast_visible());

        // Further edits don't restart the toast
        ws.set_text(TextField::Step4Name, "あおい", 3000.0);
        ws.tick(1000.0 + TOAST_HIDE_MS);
        assert!(!ws.toast_visible());
        assert_eq!(ws.toast(), Toast::Saved);

        ws.tick(1000.0 + TOAST_CLEAR_MS);
        assert_eq!(ws.toast(), Toast::None);
    }

    #[test]
    fn test_noop_update_does_not_save() {
        let mut ws = fresh();
        ws.set_text(TextField::Step1Body, "", 0.0);
        assert!(ws.store().provider().is_empty());
        assert_eq!(ws.toast(), Toast::None);
    }

    #[test]
    fn test_save_failure_is_not_fatal() {
        let mut ws = fresh();
        ws.store().provider().set_fail_writes(true);
        ws.set_text(TextField::Step1Scene, "場面", 0.0);
        assert!(!ws.last_save_ok());
        assert_eq!(ws.data().step1_scene, "場面");
    }

    #[test]
    fn test_storage_lost_mid_session() {
        let mut ws = fresh();
        ws.set_text(TextField::Step1Scene, "夜眠れなかった", 0.0);
        let saved = ws.store().provider().raw(STORAGE_KEY);

        ws.store().provider().set_unavailable(true);
        ws.set_text(TextField::Step1Scene, "夜眠れなかった日", 1.0);
        assert!(!ws.last_save_ok());
        assert_eq!(ws.data().step1_scene, "夜眠れなかった日");

        ws.reset(2.0);
        assert_eq!(ws.data(), &WorksheetData::default());

        ws.store().provider().set_unavailable(false);
        assert_eq!(ws.store().provider().raw(STORAGE_KEY), saved);
        ws.set_text(TextField::Step4Name, "あおい", 3.0);
        assert!(ws.last_save_ok());
    }

    #[test]
    fn test_reset() {
        let mut ws = fresh();
        fill_all(&mut ws);
        ws.focus_step(Step::Seeds);
        assert!(ws.celebrate(0.0));

        ws.reset(100.0);
        assert_eq!(ws.data(), &WorksheetData::default());
        assert_eq!(ws.toast(), Toast::Reset);
        assert_eq!(ws.toast().message(), Some("記録はリセットされました"));
        assert_eq!(ws.active_step(), None);
        assert!(!ws.cheer_visible());
        assert!(ws.store().provider().raw(STORAGE_KEY).is_none());

        // Reset twice is fine
        ws.reset(200.0);
        let defaults = WorksheetData::default_record();
        assert_eq!(ws.store().load(&defaults), defaults);
    }

    #[test]
    fn test_reset_when_clear_fails() {
        let mut ws = fresh();
        fill_all(&mut ws);
        ws.store().provider().set_fail_writes(true);
        ws.reset(0.0);
        assert_eq!(ws.data(), &WorksheetData::default());
        assert!(ws.store().provider().raw(STORAGE_KEY).is_some());
    }

    #[test]
    fn test_celebrate_once() {
        let mut ws = fresh();
        assert!(!ws.celebrate(0.0));

        fill_all(&mut ws);
        assert!(ws.is_complete());
        assert!(ws.celebrate(0.0));
        assert!(ws.cheer_visible());
        assert!(!ws.celebrate(1.0));

        ws.tick(CHEER_DURATION_MS);
        assert!(!ws.cheer_visible());
        assert!(!ws.can_celebrate());
    }

    #[test]
    fn test_issues_only_after_touch() {
        let mut ws = fresh();
        assert_eq!(ws.text_issue(TextField::Step1Scene), None);
        assert_eq!(ws.score_issue(ScoreField::Step1Intensity), None);

        ws.touch("step1Scene");
        ws.touch("step1Intensity");
        assert_eq!(
            ws.text_issue(TextField::Step1Scene),
            Some(FieldIssue::TooShort { min: 2 })
        );
        assert_eq!(
            ws.score_issue(ScoreField::Step1Intensity),
            Some(FieldIssue::ScoreMissing)
        );

        ws.set_text(TextField::Step1Scene, "夜の場面", 0.0);
        assert_eq!(ws.text_issue(TextField::Step1Scene), None);
    }

    #[test]
    fn test_record_is_complete() {
        let ws = fresh();
        let record = ws.record();
        assert_eq!(record["step2Fatigue"], Value::Null);
        assert_eq!(record.len(), 13);
    }
}
