//! Title and abstract screening of retrieved records against eligibility
//! criteria.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::anthropic_client::TextCompleter;
use crate::errors::AssistantError;
use crate::prompts;
use crate::pubmed::ArticleRecord;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Yes,
    No,
    #[default]
    Unsure,
}

impl Decision {
    fn parse(value: &str) -> Decision {
        let word = value
            .trim_matches(|c: char| !c.is_ascii_alphabetic())
            .split(|c: char| !c.is_ascii_alphabetic())
            .next()
            .unwrap_or_default();
        match word.to_ascii_uppercase().as_str() {
            "YES" | "INCLUDE" => Decision::Yes,
            "NO" | "EXCLUDE" => Decision::No,
            _ => Decision::Unsure,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Yes => "YES",
            Decision::No => "NO",
            Decision::Unsure => "UNSURE",
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct ScreeningDecision {
    pub decision: Decision,
    pub rationale: String,
    pub key_flags: String,
}

#[derive(Clone, Copy)]
enum Field {
    Decision,
    Rationale,
    KeyFlags,
}

const LABELS: [(&str, Field); 3] = [
    ("decision", Field::Decision),
    ("rationale", Field::Rationale),
    ("key flags", Field::KeyFlags),
];

/// Splits `Label: value` when the label is one of the three answer fields.
fn labelled(line: &str) -> Option<(Field, &str)> {
    let line = line.trim_start_matches(|c: char| c == '*' || c == '#' || c.is_whitespace());
    let (label, value) = line.split_once(':')?;
    let label = label.trim_matches(|c: char| c == '*' || c.is_whitespace());
    LABELS
        .iter()
        .find(|(name, _)| label.eq_ignore_ascii_case(name))
        .map(|(_, field)| (*field, value.trim_start_matches('*').trim()))
}

/// Reads the model's `Decision` / `Rationale` / `Key Flags` answer. Text
/// after a label runs on until the next label. A missing decision is
/// `Unsure`.
pub fn parse_decision(text: &str) -> ScreeningDecision {
    let mut result = ScreeningDecision::default();
    let mut current = None;

    for line in text.lines() {
        if let Some((field, value)) = labelled(line) {
            match field {
                Field::Decision => result.decision = Decision::parse(value),
                Field::Rationale => result.rationale = value.to_string(),
                Field::KeyFlags => result.key_flags = value.to_string(),
            }
            current = Some(field);
            continue;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let target = match current {
            Some(Field::Rationale) => &mut result.rationale,
            Some(Field::KeyFlags) => &mut result.key_flags,
            _ => continue,
        };
        if !target.is_empty() {
            target.push(' ');
        }
        target.push_str(line);
    }

    result
}

#[derive(Debug, Serialize, Clone)]
pub struct ScreenedRecord {
    pub pmid: String,
    pub title: String,
    #[serde(flatten)]
    pub result: ScreeningDecision,
}

pub async fn screen_record(
    completer: &dyn TextCompleter,
    record: &ArticleRecord,
    criteria: &str,
) -> ScreenedRecord {
    let title = record.title.clone().unwrap_or_default();
    let prompt = prompts::screening_user_prompt(criteria, &title, &record.abstract_text);

    let result = match completer
        .complete_text(prompts::SCREENING_SYSTEM, &prompt)
        .await
    {
        Ok(answer) => parse_decision(&answer),
        Err(e) => {
            log::error!("Screening failed for PMID {}: {}", record.pmid, e);
            ScreeningDecision {
                decision: Decision::Unsure,
                rationale: e.to_string(),
                key_flags: String::new(),
            }
        }
    };

    ScreenedRecord {
        pmid: record.pmid.clone(),
        title,
        result,
    }
}

/// Screens the records one after another.
pub async fn screen_records(
    completer: &dyn TextCompleter,
    records: &[ArticleRecord],
    criteria: &str,
) -> Result<Vec<ScreenedRecord>, AssistantError> {
    if criteria.trim().is_empty() {
        return Err(AssistantError::ValidationError(
            "error: empty eligibility criteria".to_string(),
        ));
    }

    let mut screened = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        log::info!(
            "Screening record {}/{} (PMID {})",
            index + 1,
            records.len(),
            record.pmid
        );
        screened.push(screen_record(completer, record, criteria).await);
    }
    Ok(screened)
}

pub const SCREENING_FIELDNAMES: [&str; 5] = ["PMID", "Title", "Decision", "Rationale", "Key_Flags"];

pub fn write_screened<W: Write>(writer: W, screened: &[ScreenedRecord]) -> Result<(), AssistantError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(SCREENING_FIELDNAMES)?;
    for row in screened {
        writer.write_record([
            row.pmid.as_str(),
            row.title.as_str(),
            row.result.decision.as_str(),
            row.result.rationale.as_str(),
            row.result.key_flags.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_screened(path: &Path, screened: &[ScreenedRecord]) -> Result<(), AssistantError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_screened(File::create(path)?, screened)?;
    log::info!("Screening results saved to {}", path.display());
    Ok(())
}
