mod common;

use common::{docx, table, text_para};
use docfid::config::DeltaConfig;
use docfid::delta::{DeltaRecord, DeltaRow, build_delta, delta_from_files, diff_rows, flatten_rows};
use docfid::document::{BlockKind, extract_structure, write_json};
use docfid::Error;
use tempfile::TempDir;

fn rows(texts: &[&str]) -> Vec<DeltaRow> {
    texts.iter().map(|text| DeltaRow::paragraph(*text)).collect()
}

#[cfg(test)]
mod delta_tests {
    use super::*;

    #[test]
    fn test_identical_versions_have_no_changes() {
        let v = rows(&["a", "b", "c"]);
        assert!(diff_rows(&v, &v).is_empty());

        let pack = build_delta("same", &v, &v, &DeltaConfig::default());
        assert_eq!(pack.stats.added_count + pack.stats.removed_count + pack.stats.modified_count, 0);
        assert!(pack.summary_by_section.is_empty());
    }

    #[test]
    fn test_pure_insertions_and_deletions() {
        let records = diff_rows(&rows(&["a", "c"]), &rows(&["a", "b", "c", "d"]));
        let added: Vec<(usize, &str)> = records
            .iter()
            .filter_map(|r| match r {
                DeltaRecord::Added(item) => Some((item.index, item.text.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(added, [(2, "b"), (4, "d")]);

        let records = diff_rows(&rows(&["x", "a", "y"]), &rows(&["a"]));
        let removed: Vec<usize> = records
            .iter()
            .filter_map(|r| match r {
                DeltaRecord::Removed(item) => Some(item.index),
                _ => None,
            })
            .collect();
        assert_eq!(removed, [1, 3]);
    }

    #[test]
    fn test_summary_orders_added_before_modified() {
        let config = DeltaConfig::default();
        let pack = build_delta(
            "job-7",
            &rows(&["Section A: Scope", "Old rule", "Shared"]),
            &rows(&["Section A: Scope", "New rule", "Shared", "Section B: Added part"]),
            &config,
        );

        assert_eq!(pack.stats.added_count, 1);
        assert_eq!(pack.stats.modified_count, 1);
        assert_eq!(pack.modified[0].v1_range, [1, 2]);
        assert_eq!(pack.modified[0].v2_range, [1, 2]);
        assert_eq!(pack.modified[0].before, ["Old rule"]);

        let sections: Vec<&str> = pack.summary_by_section.iter().map(|s| s.section.as_str()).collect();
        assert_eq!(sections, ["Section B: Added part", "General"]);
        assert_eq!(pack.summary_by_section[0].changes, ["Added: Section B: Added part"]);
        assert_eq!(pack.summary_by_section[1].changes, ["Modified block V1[1:2] -> V2[1:2]"]);
    }

    #[test]
    fn test_summary_limit_and_truncation() {
        let config = DeltaConfig {
            summary_limit: 2,
            change_chars: 5,
            ..DeltaConfig::default()
        };
        let pack = build_delta("limit", &rows(&[]), &rows(&["alpha beta", "b", "c"]), &config);
        assert_eq!(pack.added.len(), 3);
        assert_eq!(pack.summary_by_section.len(), 2);
        assert_eq!(pack.summary_by_section[0].changes, ["Added: alpha"]);
    }

    #[test]
    fn test_documents_flatten_tables_by_row() {
        let dir = TempDir::new().unwrap();
        let path = docx(dir.path(), "v1.docx", &format!("{}{}", text_para("Intro"), table(2, 2)));
        let flat = flatten_rows(&extract_structure(&path).unwrap());

        assert_eq!(flat.len(), 3);
        assert_eq!(flat[1].kind, BlockKind::TableRow);
        assert_eq!(flat[1].text, "r1c1 | r1c2");
        assert_eq!(flat[2].row, Some(2));
    }

    #[test]
    fn test_delta_from_documents_and_snapshots() {
        let dir = TempDir::new().unwrap();
        let v1 = docx(
            dir.path(),
            "v1.docx",
            &format!("{}{}{}", text_para("Heading: Rules"), text_para("Old"), text_para("Kept")),
        );
        let v2 = docx(
            dir.path(),
            "v2.docx",
            &format!("{}{}", text_para("Heading: Rules"), text_para("Kept")),
        );

        let pack = delta_from_files("docs", &v1, &v2, &DeltaConfig::default()).unwrap();
        assert_eq!(pack.stats.removed_count, 1);
        assert_eq!(pack.removed[0].text, "Old");
        assert_eq!(pack.removed[0].index, 2);

        // A wrapped snapshot of v2 gives the same result
        let snapshot = dir.path().join("v2.json");
        write_json(&snapshot, &serde_json::json!({"ok": true, "data": extract_structure(&v2).unwrap()})).unwrap();
        let from_json = delta_from_files("docs", &v1, &snapshot, &DeltaConfig::default()).unwrap();
        assert_eq!(from_json, pack);
    }

    #[test]
    fn test_spreadsheets_are_rejected() {
        let dir = TempDir::new().unwrap();
        let v1 = dir.path().join("a.xlsx");
        let result = delta_from_files("x", &v1, &v1, &DeltaConfig::default());
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }
}
