//! Export answers as downloadable documents
//!
//! Two formats: the exact record as JSON, and a readable text summary.
//! Exports are one-shot and never read back.

use crate::form::WorksheetData;

/// Export document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Json,
    Text,
}

impl ExportKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Json => "json",
            ExportKind::Text => "txt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportKind::Json => "application/json",
            ExportKind::Text => "text/plain;charset=utf-8",
        }
    }
}

/// Filename qualified by calendar date, e.g. `self-awareness-2026-10-19.json`
pub fn export_filename(kind: ExportKind, date: &str) -> String {
    format!("self-awareness-{}.{}", date, kind.extension())
}

/// Pretty-printed JSON of the full record
pub fn export_json(data: &WorksheetData) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(data)
}

fn score_text(score: Option<u8>) -> String {
    score.map(|s| s.to_string()).unwrap_or_default()
}

/// Human-readable summary; unanswered scores render empty
pub fn export_text(data: &WorksheetData) -> String {
    format!(
        "わたしだけのセルフアウェアネス設計図\n\
         \n\
         ■ Step 1: いまの”思考の暴走”を観察する\n\
         思考が止まらなくなった場面: {scene}\n\
         そのときの感情: {feelings}\n\
         暴走の強さ（0〜10）: {intensity}\n\
         身体に出た反応: {body}\n\
         \n\
         ■ Step 2: 見えない要因を探る\n\
         外部要因: {external}\n\
         内部要因: {internal}\n\
         生理的要因: {physical}\n\
         社会的要因: {social}\n\
         疲労度（0〜10）: {fatigue}\n\
         \n\
         ■ Step 3: セルフアウェアネスの”芽”を見つける\n\
         気持ちが軽くなったこと: {reliefs}\n\
         自分に気づく方法: {awareness}\n\
         \n\
         ■ Step 4: わたしだけのセルフアウェアネス設計図を描く\n\
         名前: {name}\n\
         ガイドメッセージ: {guide}\n",
        scene = data.step1_scene,
        feelings = data.step1_feelings,
        intensity = score_text(data.step1_intensity),
        body = data.step1_body,
        external = data.step2_external,
        internal = data.step2_internal,
        physical = data.step2_physical,
        social = data.step2_social,
        fatigue = score_text(data.step2_fatigue),
        reliefs = data.step3_reliefs,
        awareness = data.step3_awareness,
        name = data.step4_name,
        guide = data.step4_guide,
    )
}

/// Offer `contents` as a file download (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn download(kind: ExportKind, filename: &str, contents: &str) -> Result<(), wasm_bindgen::JsValue> {
    use wasm_bindgen::JsCast;

    let parts = js_sys::Array::of1(&wasm_bindgen::JsValue::from_str(contents));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(kind.mime_type());
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let window = web_sys::window().ok_or_else(|| wasm_bindgen::JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| wasm_bindgen::JsValue::from_str("no document"))?;
    let anchor: web_sys::HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    // Revoking in the same task can cancel the download in some browsers
    let revoke = wasm_bindgen::closure::Closure::once_into_js(move || {
        let _ = web_sys::Url::revoke_object_url(&url);
    });
    window.set_timeout_with_callback_and_timeout_and_arguments_0(revoke.unchecked_ref(), 0)?;
    log::info!("Exported {}", filename);
    Ok(())
}
