use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// 問卷第一題：申請者類型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicantType {
    Personal,
    Business,
    Corp,
}

impl ApplicantType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "personal" => Some(ApplicantType::Personal),
            "business" => Some(ApplicantType::Business),
            "corp" => Some(ApplicantType::Corp),
            _ => None,
        }
    }
}

/// `intro` 欄位的解讀結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intro {
    /// 未填或空字串，視同 personal
    Missing,
    Known(ApplicantType),
    Unknown(String),
}

impl Intro {
    pub fn applicant_type(&self) -> Option<ApplicantType> {
        match self {
            Intro::Missing => Some(ApplicantType::Personal),
            Intro::Known(kind) => Some(*kind),
            Intro::Unknown(_) => None,
        }
    }
}

/// 出生年份，可能是字串或數字
#[derive(Debug, Clone, PartialEq)]
pub enum BirthYear {
    Year(i64),
    NotANumber,
}

impl BirthYear {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(
                parse_leading_int(s)
                    .map(BirthYear::Year)
                    .unwrap_or(BirthYear::NotANumber),
            ),
            Value::Number(n) => match n.as_f64() {
                Some(f) if f == 0.0 => None,
                Some(f) if f.is_finite() => Some(BirthYear::Year(f.trunc() as i64)),
                _ => Some(BirthYear::NotANumber),
            },
            Value::Null | Value::Bool(false) => None,
            _ => Some(BirthYear::NotANumber),
        }
    }
}

/// 取字串開頭的整數部分，例如 "1990년" -> 1990、"  -12abc" -> -12
fn parse_leading_int(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// 瀏覽器端送來的問卷答案。欄位型別不符時一律視為未填。
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionnaireAnswers {
    pub intro: Intro,
    pub region_sido: Option<String>,
    pub biz_region_sido: Option<String>,
    pub corp_region_sido: Option<String>,
    pub birth_year: Option<BirthYear>,
    pub personal_char: Option<Vec<String>>,
    pub family_char: Option<Vec<String>>,
}

impl QuestionnaireAnswers {
    pub fn from_json(value: &Value) -> Self {
        let intro = match value.get("intro") {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Intro::Missing,
            // 0 也是 falsy，同樣退回 personal
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Intro::Missing,
            Some(Value::String(s)) if s.is_empty() => Intro::Missing,
            Some(Value::String(s)) => match ApplicantType::parse(s) {
                Some(kind) => Intro::Known(kind),
                None => Intro::Unknown(s.clone()),
            },
            Some(other) => Intro::Unknown(other.to_string()),
        };

        Self {
            intro,
            region_sido: nested_str(value, "region", "sido"),
            biz_region_sido: nested_str(value, "bizRegion", "sido"),
            corp_region_sido: nested_str(value, "corpRegion", "sido"),
            birth_year: value
                .get("birthGender")
                .and_then(|v| v.get("year"))
                .and_then(BirthYear::from_value),
            personal_char: code_list(value, "personalChar"),
            family_char: code_list(value, "familyChar"),
        }
    }
}

fn nested_str(value: &Value, outer: &str, inner: &str) -> Option<String> {
    value
        .get(outer)
        .and_then(|v| v.get(inner))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn code_list(value: &Value, key: &str) -> Option<Vec<String>> {
    let items = value.get(key)?.as_array()?;
    Some(
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect(),
    )
}

/// 送往上游的年齡參數
#[derive(Debug, Clone, PartialEq)]
pub enum Age {
    Years(i64),
    NotANumber,
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Age::Years(years) => write!(f, "{}", years),
            Age::NotANumber => write!(f, "NaN"),
        }
    }
}

/// 由問卷答案產生的上游查詢參數（不含 serviceKey/page/perPage）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamParams {
    pub life_array: Option<String>,
    pub age: Option<Age>,
    pub target_individuals: Option<String>,
}

impl UpstreamParams {
    pub fn is_empty(&self) -> bool {
        self.life_array.is_none() && self.age.is_none() && self.target_individuals.is_none()
    }

    /// 轉成查詢字串的鍵值對。空字串與 0 不送出；NaN 照樣送出。
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(life_array) = self.life_array.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("lifeArray", life_array.clone()));
        }

        match &self.age {
            Some(Age::Years(0)) | None => {}
            Some(age) => pairs.push(("age", age.to_string())),
        }

        if let Some(targets) = self.target_individuals.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("trgterIndvdlArray", targets.clone()));
        }

        pairs
    }
}

/// 回傳給前端的結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayResult {
    pub services: Vec<Value>,
    #[serde(rename = "totalCount")]
    pub total_count: i64,
}

/// 失敗時的固定回應，不透露任何內部細節
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayFailure {
    pub error: bool,
    pub message: &'static str,
}

impl Default for RelayFailure {
    fn default() -> Self {
        Self {
            error: true,
            message: "Internal server error",
        }
    }
}
