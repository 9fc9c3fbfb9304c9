#[cfg(test)]
mod samples {
    use std::fs;
    use std::path::{Path, PathBuf};

    use prereqs::dispatch::Registry;
    use prereqs::{plugins, scanning, Outcome};

    fn sample_files() -> Vec<PathBuf> {
        let dir = Path::new("tests/samples/");

        assert!(dir.exists(), "samples directory missing");

        let entries = fs::read_dir(dir).expect("Failed to read samples directory");

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.expect("Failed to read directory entry");
            let path = entry.path();

            if path
                .extension()
                .and_then(|s| s.to_str())
                == Some("pl")
            {
                files.push(path);
            }
        }

        files.sort();
        files
    }

    fn scan_sample(name: &str) -> Outcome {
        let path = Path::new("tests/samples/").join(name);
        let content = scanning::load(&path)
            .unwrap_or_else(|e| panic!("Failed to load file {:?}: {}", path, e));
        let registry = Registry::with_plugins(&plugins::default_set());
        scanning::scan(&registry, &content)
    }

    #[test]
    fn ensure_samples_scan() {
        let files = sample_files();

        assert!(!files.is_empty(), "No .pl files found in samples directory");

        let registry = Registry::with_plugins(&plugins::default_set());
        let mut failures = Vec::new();

        for file in &files {
            let content = scanning::load(file)
                .unwrap_or_else(|e| panic!("Failed to load file {:?}: {}", file, e));

            let outcome = scanning::scan(&registry, &content);
            if let Some(error) = outcome.error {
                println!("File {:?} failed to scan: {}", file, error);
                failures.push(file.clone());
            }
        }

        if !failures.is_empty() {
            panic!(
                "Sample files should scan without error, but {} files failed",
                failures.len()
            );
        }
    }

    #[test]
    fn moose_class() {
        let outcome = scan_sample("moose_class.pl");
        let requires = outcome
            .prerequisites
            .requires;

        assert_eq!(
            requires.names(),
            vec![
                "Carp",
                "JSON::PP",
                "Moose",
                "My::App::Base",
                "My::App::Role::Logging",
                "namespace::autoclean",
                "perl",
            ]
        );
        assert!(outcome
            .prerequisites
            .suggests
            .contains("Cpanel::JSON::XS"));
    }

    #[test]
    fn script_with_heredocs() {
        let outcome = scan_sample("report_script.pl");
        let prerequisites = outcome.prerequisites;

        assert!(prerequisites
            .requires
            .contains("Getopt::Long"));
        assert!(prerequisites
            .requires
            .contains("File::Spec"));
        assert!(!prerequisites
            .requires
            .contains("Not::Really"));
        assert!(prerequisites
            .recommends
            .contains("Text::CSV_XS"));
        assert!(!prerequisites
            .requires
            .contains("After::End"));
    }

    #[test]
    fn test_script() {
        let outcome = scan_sample("basic_test.pl");
        let requires = outcome
            .prerequisites
            .requires;

        assert_eq!(
            requires
                .get("Test::More")
                .map(|v| v.as_str()),
            Some("0.94")
        );
        assert!(requires.contains("lib"));
        assert!(requires.contains("My::App"));
    }
}
