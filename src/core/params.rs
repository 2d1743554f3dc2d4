use crate::domain::model::{Age, ApplicantType, BirthYear, QuestionnaireAnswers, UpstreamParams};
use chrono::Datelike;

/// 「해당 없음」代碼，不能送到上游
pub const NO_SELECTION_CODE: &str = "JA9999";

pub fn build_params(answers: &QuestionnaireAnswers) -> UpstreamParams {
    build_params_for_year(answers, i64::from(chrono::Local::now().year()))
}

pub fn build_params_for_year(answers: &QuestionnaireAnswers, current_year: i64) -> UpstreamParams {
    let mut params = UpstreamParams::default();

    let Some(kind) = answers.intro.applicant_type() else {
        tracing::debug!("Unknown applicant type {:?}, no parameters built", answers.intro);
        return params;
    };

    match kind {
        ApplicantType::Personal => {
            params.life_array = answers.region_sido.clone();

            params.age = answers.birth_year.as_ref().map(|year| match year {
                // 極端年份會溢位，當成無法計算
                BirthYear::Year(year) => current_year
                    .checked_sub(*year)
                    .map_or(Age::NotANumber, Age::Years),
                BirthYear::NotANumber => Age::NotANumber,
            });

            let groups: Vec<String> = [&answers.personal_char, &answers.family_char]
                .into_iter()
                .flatten()
                .filter_map(|codes| join_selected(codes))
                .collect();
            if !groups.is_empty() {
                params.target_individuals = Some(groups.join(","));
            }
        }
        ApplicantType::Business => {
            params.life_array = answers.biz_region_sido.clone();
        }
        ApplicantType::Corp => {
            params.life_array = answers.corp_region_sido.clone();
        }
    }

    params
}

/// 去掉哨兵代碼後以逗號串接；整組都被濾掉時回傳 None
fn join_selected(codes: &[String]) -> Option<String> {
    let selected: Vec<&str> = codes
        .iter()
        .map(String::as_str)
        .filter(|code| *code != NO_SELECTION_CODE)
        .collect();

    if selected.is_empty() {
        return None;
    }

    let joined = selected.join(",");
    // 只剩空字串時視同沒有選擇
    (!joined.is_empty()).then_some(joined)
}
