//! @acp:module "QTI Packager"
//! @acp:summary "Package a quiz bank text file as a QTI 1.2 question bank ZIP"
//! @acp:domain cli
//! @acp:layer io
//!
//! The archive contains an `imsmanifest.xml` and one object bank document
//! holding a `fill_in_multiple_blanks_question` item per quiz record.
//! Identifiers are md5 digests of the content, so packaging the same bank
//! twice yields the same archive contents.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{archive_path_for, Packager};
use crate::error::{QuizError, Result};
use crate::render::{QUESTION_PREFIX, RECORD_TYPE};

/// One question parsed back from the bank text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankQuestion {
    /// Question HTML
    pub prompt: String,
    /// Answer fields in record order
    pub answers: Vec<(String, String)>,
}

/// Default [`Packager`]: writes `<bank stem>.zip` next to the bank file
#[derive(Debug, Clone, Copy, Default)]
pub struct QtiPackager;

impl QtiPackager {
    pub fn new() -> Self {
        Self
    }
}

impl Packager for QtiPackager {
    fn package(&self, bank_file: &Path, work_dir: &Path) -> Result<PathBuf> {
        let failed = |reason: String| QuizError::PackagingFailed {
            bank: bank_file.to_path_buf(),
            reason,
        };

        let text = fs::read_to_string(bank_file).map_err(|e| QuizError::read(bank_file, e))?;
        let questions = parse_bank(&text).map_err(failed)?;
        let title = bank_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| failed("bank file has no name".to_string()))?;
        let bank_ident = ident(&["bank", &title]);
        debug!("Packaging {} questions as '{}'", questions.len(), bank_ident);

        let archive = archive_path_for(bank_file);
        let mut staging = tempfile::Builder::new()
            .prefix(".package-")
            .suffix(".zip")
            .tempfile_in(work_dir)?;
        {
            let mut zip = ZipWriter::new(staging.as_file_mut());
            let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

            zip.start_file("imsmanifest.xml", options)
                .map_err(|e| failed(e.to_string()))?;
            zip.write_all(manifest_xml(&bank_ident, &title).as_bytes())?;

            zip.start_file(format!("{0}/{0}.xml", bank_ident), options)
                .map_err(|e| failed(e.to_string()))?;
            zip.write_all(object_bank_xml(&bank_ident, &title, &questions).as_bytes())?;

            zip.finish().map_err(|e| failed(e.to_string()))?;
        }
        staging.persist(&archive).map_err(|e| e.error)?;

        Ok(archive)
    }
}

/// @acp:summary "Parse bank text back into questions"
///
/// Accepts `\n` and `\r\n` line endings. Records are separated by blank
/// lines; the error names the first offending line.
pub fn parse_bank(text: &str) -> std::result::Result<Vec<BankQuestion>, String> {
    let mut questions = Vec::new();
    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .peekable();

    while let Some((number, line)) = lines.next() {
        if line.is_empty() {
            continue;
        }
        if line != RECORD_TYPE {
            return Err(format!(
                "line {}: expected record type '{}', found '{}'",
                number, RECORD_TYPE, line
            ));
        }

        let prompt = match lines.next() {
            Some((_, question)) if question.starts_with(QUESTION_PREFIX) => {
                question[QUESTION_PREFIX.len()..].to_string()
            }
            Some((number, other)) => {
                return Err(format!(
                    "line {}: expected question starting with '{}', found '{}'",
                    number, QUESTION_PREFIX, other
                ))
            }
            None => return Err(format!("line {}: record ends before its question", number)),
        };

        let mut answers = Vec::new();
        while let Some((number, line)) = lines.next_if(|(_, line)| !line.is_empty()) {
            let (field, answer) = line
                .split_once(':')
                .ok_or_else(|| format!("line {}: expected '<field>: <answer>', found '{}'", number, line))?;
            let answer = answer.strip_prefix(' ').unwrap_or(answer);
            answers.push((field.to_string(), answer.to_string()));
        }

        questions.push(BankQuestion { prompt, answers });
    }

    Ok(questions)
}

/// Deterministic QTI identifier derived from `parts`
fn ident(parts: &[&str]) -> String {
    format!("g{:x}", md5::compute(parts.join("\u{1f}")))
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn manifest_xml(bank_ident: &str, title: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest identifier="{manifest}" xmlns="http://www.imsglobal.org/xsd/imsccv1p1/imscp_v1p1" xmlns:lom="http://ltsc.ieee.org/xsd/imsccv1p1/LOM/resource" xmlns:imsmd="http://www.imsglobal.org/xsd/imsmd_v1p2" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://www.imsglobal.org/xsd/imsccv1p1/imscp_v1p1 http://www.imsglobal.org/xsd/imscp_v1p1.xsd">
  <metadata>
    <schema>IMS Content</schema>
    <schemaversion>1.1.3</schemaversion>
    <imsmd:lom>
      <imsmd:general>
        <imsmd:title>
          <imsmd:string>{title}</imsmd:string>
        </imsmd:title>
      </imsmd:general>
    </imsmd:lom>
  </metadata>
  <organizations/>
  <resources>
    <resource identifier="{bank}" type="imsqti_xmlv1p2">
      <file href="{bank}/{bank}.xml"/>
    </resource>
  </resources>
</manifest>
"#,
        manifest = ident(&["manifest", bank_ident]),
        title = escape_xml(title),
        bank = bank_ident,
    )
}

fn object_bank_xml(bank_ident: &str, title: &str, questions: &[BankQuestion]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<questestinterop xmlns="http://www.imsglobal.org/xsd/ims_qtiasiv1p2" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://www.imsglobal.org/xsd/ims_qtiasiv1p2 http://www.imsglobal.org/xsd/ims_qtiasiv1p2p1.xsd">
  <objectbank ident="{bank}">
    <qtimetadata>
      <qtimetadatafield>
        <fieldlabel>bank_title</fieldlabel>
        <fieldentry>{title}</fieldentry>
      </qtimetadatafield>
    </qtimetadata>
"#,
        bank = bank_ident,
        title = escape_xml(title),
    );

    for (index, question) in questions.iter().enumerate() {
        xml.push_str(&item_xml(bank_ident, index + 1, question));
    }

    xml.push_str("  </objectbank>\n</questestinterop>\n");
    xml
}

fn item_xml(bank_ident: &str, number: usize, question: &BankQuestion) -> String {
    let item_ident = ident(&[bank_ident, &number.to_string(), &question.prompt]);
    let score = if question.answers.is_empty() {
        0.0
    } else {
        100.0 / question.answers.len() as f64
    };

    let mut responses = String::new();
    let mut conditions = String::new();
    for (field, answer) in &question.answers {
        let answer_ident = ident(&[&item_ident, field, answer]);
        responses.push_str(&format!(
            r#"          <response_lid ident="response_{field}">
            <material>
              <mattext>{field}</mattext>
            </material>
            <render_choice>
              <response_label ident="{answer_ident}">
                <material>
                  <mattext texttype="text/plain">{answer}</mattext>
                </material>
              </response_label>
            </render_choice>
          </response_lid>
"#,
            field = escape_xml(field),
            answer_ident = answer_ident,
            answer = escape_xml(answer),
        ));
        conditions.push_str(&format!(
            r#"          <respcondition>
            <conditionvar>
              <varequal respident="response_{field}">{answer_ident}</varequal>
            </conditionvar>
            <setvar varname="SCORE" action="Add">{score:.2}</setvar>
          </respcondition>
"#,
            field = escape_xml(field),
            answer_ident = answer_ident,
            score = score,
        ));
    }

    format!(
        r#"    <item ident="{item}" title="Question {number}">
      <itemmetadata>
        <qtimetadata>
          <qtimetadatafield>
            <fieldlabel>question_type</fieldlabel>
            <fieldentry>fill_in_multiple_blanks_question</fieldentry>
          </qtimetadatafield>
          <qtimetadatafield>
            <fieldlabel>points_possible</fieldlabel>
            <fieldentry>1.0</fieldentry>
          </qtimetadatafield>
        </qtimetadata>
      </itemmetadata>
      <presentation>
        <material>
          <mattext texttype="text/html">{prompt}</mattext>
        </material>
{responses}      </presentation>
      <resprocessing>
        <outcomes>
          <decvar maxvalue="100" minvalue="0" varname="SCORE" vartype="Decimal"/>
        </outcomes>
{conditions}      </resprocessing>
    </item>
"#,
        item = item_ident,
        number = number,
        prompt = escape_xml(&question.prompt),
        responses = responses,
        conditions = conditions,
    )
}
