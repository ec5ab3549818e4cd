use csv::ReaderBuilder;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// Load and validate a FAQ catalog. The format is chosen by extension:
/// `.csv` expects `question`/`answer` columns, anything else is read as a
/// JSON array of `{"question": …, "answer": …}` records.
pub fn load_catalog(path: &Path) -> Result<Vec<FaqEntry>, String> {
    let entries = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => load_from_csv(path)?,
        _ => load_from_json(path)?,
    };
    validate_catalog(&entries)?;
    Ok(entries)
}

pub fn load_from_json(path: &Path) -> Result<Vec<FaqEntry>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read FAQ catalog {}: {}", path.display(), e))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("Failed to parse FAQ catalog {}: {}", path.display(), e))
}

pub fn load_from_csv(path: &Path) -> Result<Vec<FaqEntry>, String> {
    let file = File::open(path)
        .map_err(|e| format!("Failed to open FAQ catalog {}: {}", path.display(), e))?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| format!("Failed to read CSV headers: {}", e))?;

    let question_index = column_index(headers, "question")?;
    let answer_index = column_index(headers, "answer")?;

    let mut entries = Vec::new();
    let mut record = csv::StringRecord::new();
    let mut line = 1usize;

    loop {
        line += 1;
        match reader.read_record(&mut record) {
            Ok(true) => {
                let question = record.get(question_index).unwrap_or("").to_string();
                let answer = record.get(answer_index).unwrap_or("").to_string();
                entries.push(FaqEntry { question, answer });
            }
            Ok(false) => break,
            Err(e) => return Err(format!("Line {}: {}", line, e)),
        }
    }

    Ok(entries)
}

/// Every record must carry a non-empty question and answer, and the catalog
/// itself must not be empty. Question uniqueness is not enforced.
pub fn validate_catalog(entries: &[FaqEntry]) -> Result<(), String> {
    if entries.is_empty() {
        return Err("FAQ catalog contains no entries".to_string());
    }
    for (i, entry) in entries.iter().enumerate() {
        if entry.question.trim().is_empty() {
            return Err(format!("FAQ entry {} has an empty question", i + 1));
        }
        if entry.answer.trim().is_empty() {
            return Err(format!("FAQ entry {} has an empty answer", i + 1));
        }
    }
    Ok(())
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, String> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| format!("CSV catalog must contain a '{}' column", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        (dir, path)
    }

    #[test]
    fn loads_a_json_catalog() {
        let (_dir, path) = write_temp(
            "faq.json",
            r#"[
                {"question": "Kaip atidaryti sąskaitą?", "answer": "Eikite į filialą."},
                {"question": "Kiek kainuoja pavedimas?", "answer": "0,40 Eur."}
            ]"#,
        );
        let entries = load_catalog(&path).expect("valid catalog");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].question, "Kaip atidaryti sąskaitą?");
        assert_eq!(entries[1].answer, "0,40 Eur.");
    }

    #[test]
    fn loads_a_csv_catalog_by_header_name() {
        let (_dir, path) = write_temp(
            "faq.csv",
            "answer,question\nEikite į filialą.,Kaip atidaryti sąskaitą?\n",
        );
        let entries = load_catalog(&path).expect("valid catalog");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].question, "Kaip atidaryti sąskaitą?");
        assert_eq!(entries[0].answer, "Eikite į filialą.");
    }

    #[test]
    fn rejects_a_csv_catalog_without_the_required_columns() {
        let (_dir, path) = write_temp("faq.csv", "klausimas,atsakymas\na,b\n");
        let err = load_catalog(&path).expect_err("missing columns");
        assert!(err.contains("question"));
    }

    #[test]
    fn rejects_an_empty_catalog() {
        let (_dir, path) = write_temp("faq.json", "[]");
        let err = load_catalog(&path).expect_err("empty catalog");
        assert!(err.contains("no entries"));
    }

    #[test]
    fn rejects_records_with_empty_fields() {
        let (_dir, path) = write_temp(
            "faq.json",
            r#"[{"question": "Kaip atidaryti sąskaitą?", "answer": "  "}]"#,
        );
        let err = load_catalog(&path).expect_err("blank answer");
        assert!(err.contains("empty answer"));

        let (_dir2, path2) = write_temp(
            "faq.json",
            r#"[{"question": "", "answer": "Eikite į filialą."}]"#,
        );
        let err = load_catalog(&path2).expect_err("blank question");
        assert!(err.contains("empty question"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_catalog(Path::new("/nonexistent/faq.json")).is_err());
    }
}
