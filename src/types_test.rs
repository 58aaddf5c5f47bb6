/// Tests for test-case input parsing
#[cfg(test)]
mod tests {
    use crate::types::*;
    use std::path::PathBuf;

    const CASES: &str = r#"[
        {
            "title": "CCRs_AEB_test_case_1",
            "result": "PASSED",
            "settings": {"vut": "20km/h", "gvt": "30km/h", "ol": "-50%", "runs": 3},
            "condition_result": {
                "file2": [[["external_relative_longitudinal_distance > 0", "all"], true]],
                "file1": [[["speed < 5"], true], [["brake"], false]]
            },
            "image_path": "tests/data/image_index.json"
        },
        {"title": "CCRs_AEB_test_case_2", "result": "FAILED"},
        {"title": "skipped", "result": "BLOCKED"},
        {}
    ]"#;

    #[test]
    fn test_cases_keep_input_order() {
        let cases: Vec<TestCase> = serde_json::from_str(CASES).unwrap();
        assert_eq!(cases.len(), 4);

        let first = &cases[0];
        assert_eq!(first.result, CaseResult::Passed);
        assert_eq!(first.settings_line(), "vut: 20km/h, gvt: 30km/h, ol: -50%, runs: 3");

        let files: Vec<&str> = first.condition_result.keys().map(|k| k.as_str()).collect();
        assert_eq!(files, vec!["file2", "file1"]);
        let checks = &first.condition_result["file1"];
        assert_eq!(checks[1], (vec!["brake".to_string()], false));
        assert_eq!(first.image_path, PathBuf::from("tests/data/image_index.json"));
    }

    #[test]
    fn test_missing_fields_default() {
        let cases: Vec<TestCase> = serde_json::from_str(CASES).unwrap();
        let empty = &cases[3];
        assert_eq!(empty.title, "");
        assert_eq!(empty.result, CaseResult::Other(String::new()));
        assert!(empty.settings.is_empty());
        assert_eq!(empty.settings_line(), "");
        assert_eq!(empty.image_path, PathBuf::new());
    }

    #[test]
    fn test_case_result_round_trips_verbatim() {
        assert_eq!(CaseResult::from("BLOCKED".to_string()), CaseResult::Other("BLOCKED".to_string()));
        assert_eq!(CaseResult::from("passed".to_string()), CaseResult::Other("passed".to_string()));
        assert_eq!(serde_json::to_string(&CaseResult::Failed).unwrap(), "\"FAILED\"");
        assert_eq!(CaseResult::Passed.to_string(), "PASSED");
    }

    #[test]
    fn test_summary_counts() {
        let cases: Vec<TestCase> = serde_json::from_str(CASES).unwrap();
        let summary = ReportSummary::from_cases(&cases);
        assert_eq!(summary, ReportSummary { total: 4, passed: 1, failed: 1, other: 2 });
        assert!(!summary.all_passed());
        assert!(ReportSummary::from_cases(&cases[..1]).all_passed());
    }

    #[test]
    fn test_load_cases_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.json");
        std::fs::write(&path, r#"{"title": "not an array"}"#).unwrap();
        let err = load_cases(&path).unwrap_err();
        assert!(err.contains("cases.json"), "{}", err);

        std::fs::write(&path, CASES).unwrap();
        assert_eq!(load_cases(&path).unwrap().len(), 4);
    }
}
