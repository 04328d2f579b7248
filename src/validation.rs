//! Field validation and answer choices for the four steps
//!
//! Errors are only shown once a field has been touched (blurred or changed).

use crate::form::{ScoreField, TextField, WorksheetData};

/// Feelings offered in step 1 (pick one)
pub const FEELINGS: [&str; 6] = ["不安", "怒り", "悲しみ", "焦り", "孤独", "その他"];

/// Step 2 factor categories and their choices
pub const FACTORS: [(TextField, &str, &[&str]); 4] = [
    (
        TextField::Step2External,
        "外部要因",
        &["環境や視覚・聴覚などの刺激", "他人の言葉や意見の影響"],
    ),
    (
        TextField::Step2Internal,
        "内部要因",
        &[
            "感情の揺れ（怒り・不安など）",
            "過去の記憶・体験の再生",
            "自分の価値観・信念",
        ],
    ),
    (
        TextField::Step2Physical,
        "生理的要因",
        &["睡眠不足や疲労", "ホルモンバランスや空腹など"],
    ),
    (
        TextField::Step2Social,
        "社会的要因",
        &["常識や文化・社会通念", "集団圧力や周囲の空気", "SNSやメディアの影響"],
    ),
];

/// Step 3 ways to notice yourself
pub const AWARENESS_METHODS: [&str; 5] = [
    "書く（メモ・日記など）",
    "話す（信頼できる人との対話）",
    "感じる（呼吸・身体の感覚）",
    "観察する（自然や風景を眺める）",
    "その他",
];

/// Gentle feedback shown under a chosen feeling or factor
pub fn feedback(choice: &str) -> Option<&'static str> {
    let text = match choice {
        "不安" => "不安があるのは、何かを大切にしたい気持ちがあるからかもしれません。まずは、その気持ちに静かに寄り添ってみても大丈夫です。",
        "怒り" => "怒りは、あなたにとって譲れない大切な価値がある証かもしれません。少し立ち止まって、その奥にある気持ちを感じてみましょう。",
        "悲しみ" => "悲しみは、失ったものや心が触れた証。その感情があることは、あなたが豊かに感じているということかもしれません。",
        "焦り" => "焦りを感じるのは、前に進みたい気持ちがあるから。今できることを、小さく一つだけ選んでみるのも良いかもしれません。",
        "孤独" => "孤独を感じたときは、自分との静かな時間がはじまるサインかもしれません。今ここにいる自分と、そっとつながってみましょう。",
        "その他" => "うまく言葉にできない感情も、確かに存在しています。どんな感情も、大切に扱ってみてくださいね。",
        "環境や視覚・聴覚などの刺激" => "まわりの風景や音が、思考のきっかけになることがあります。気づかないうちに影響を受けているかもしれません。",
        "他人の言葉や意見の影響" => "言葉は強い力を持ちます。誰の声に耳を傾けたか、改めて見直すこともヒントになります。",
        "感情の揺れ（怒り・不安など）" => "強く揺れた感情は、あなたにとって大切な何かを守ろうとしているサインかもしれません。",
        "過去の記憶・体験の再生" => "過去の体験が、今の考え方に影響していることはよくあります。その記憶に優しく気づいてみましょう。",
        "自分の価値観・信念" => "自分の信じていることが、思考の軸になっていることがあります。それに気づくことは、とても大きな一歩です。",
        "睡眠不足や疲労" => "身体が疲れていると、思考も悲観的になりやすいもの。まずは休息を。",
        "ホルモンバランスや空腹など" => "体の状態は、思考にも影響します。整えることが第一歩になることもあります。",
        "常識や文化・社会通念" => "『当たり前』と思っていたことが、実は選択を縛っているかもしれません。",
        "集団圧力や周囲の空気" => "“空気”に合わせることが続くと、自分の声が聞こえにくくなることも。少し距離をとっても大丈夫です。",
        "SNSやメディアの影響" => "情報の多さが、思考を刺激しすぎているかもしれません。一度手放す時間を作ってみましょう。",
        _ => return None,
    };
    Some(text)
}

/// Length of trimmed text in UTF-16 code units, as the browser counts it
pub fn trimmed_len(s: &str) -> usize {
    s.trim().encode_utf16().count()
}

/// Why a touched field is not acceptable yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIssue {
    /// Fewer than `min` characters after trimming
    TooShort { min: usize },
    /// No choice made
    Unselected,
    /// Score not picked
    ScoreMissing,
}

impl FieldIssue {
    pub fn message(&self) -> String {
        match self {
            FieldIssue::TooShort { min } => format!("{}文字以上で入力してください", min),
            FieldIssue::Unselected => "選択してください".to_string(),
            FieldIssue::ScoreMissing => "0〜10で選択してください".to_string(),
        }
    }
}

/// Validate a text field. Fields without a rule always pass.
pub fn check_text(field: TextField, value: &str) -> Option<FieldIssue> {
    let min = match field {
        TextField::Step1Scene | TextField::Step1Body | TextField::Step4Name => 2,
        TextField::Step3Reliefs | TextField::Step4Guide => 5,
        TextField::Step3Awareness => {
            return value.is_empty().then_some(FieldIssue::Unselected);
        }
        _ => return None,
    };
    (trimmed_len(value) < min).then_some(FieldIssue::TooShort { min })
}

/// Validate a score field. Only the step 1 intensity is required.
pub fn check_score(field: ScoreField, value: Option<u8>) -> Option<FieldIssue> {
    match (field, value) {
        (ScoreField::Step1Intensity, None) => Some(FieldIssue::ScoreMissing),
        _ => None,
    }
}

/// Whether every answer is filled in well enough to celebrate
pub fn is_complete(data: &WorksheetData) -> bool {
    trimmed_len(&data.step1_scene) > 5
        && trimmed_len(&data.step1_body) > 5
        && !data.step1_feelings.is_empty()
        && !data.step2_external.is_empty()
        && !data.step2_internal.is_empty()
        && !data.step2_physical.is_empty()
        && !data.step2_social.is_empty()
        && trimmed_len(&data.step3_reliefs) > 5
        && !data.step3_awareness.is_empty()
        && trimmed_len(&data.step4_name) > 1
        && trimmed_len(&data.step4_guide) > 5
}
