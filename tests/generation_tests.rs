// Integration tests for storygen
//
// End-to-end generation runs against real files:
// - CSV table + template on disk -> zip archive (story preset layout)
// - Last-row placeholders -> one file per row in a directory (master preset layout)
// - Job files driving a run through JobConfig
// - The binary's gate notice and line editing subcommands

use std::fs;
use std::io::Read;
use std::path::Path;
use std::process::Command;

use storygen::config_file::{JobConfig, STORY_ARCHIVE_NAME};
use storygen::sink::{ArchiveSink, DirectorySink, OutputSink};
use storygen::{
    Generator, NameSource, OutputMode, PlaceholderRow, Preset, RowErrorPolicy, StorygenError, Table,
    Template,
};

const STORY_CSV: &str = "\
{{slug}},{{title}},{{image}}
night-sky,Night Sky,stars.jpg
ocean,The Ocean,waves.jpg
";

const STORY_TEMPLATE: &str = "<amp-story>\n<h1>{{title}}</h1>\n<amp-img src=\"{{image}}\">\n</amp-story>\n";

fn write_inputs(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let table = dir.join("rows.csv");
    let template = dir.join("story.html");
    fs::write(&table, STORY_CSV).unwrap();
    fs::write(&template, STORY_TEMPLATE).unwrap();
    (table, template)
}

fn read_entry(archive: &Path, name: &str) -> String {
    let file = fs::File::open(archive).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    let mut entry = zip.by_name(name).unwrap();
    let mut content = String::new();
    entry.read_to_string(&mut content).unwrap();
    content
}

// ============================================================================
// Library runs
// ============================================================================

#[test]
fn test_csv_to_archive() {
    let dir = tempfile::tempdir().unwrap();
    let (table_path, template_path) = write_inputs(dir.path());
    let archive = dir.path().join("out").join(STORY_ARCHIVE_NAME);

    let job = JobConfig {
        preset: Some(Preset::Story),
        table: Some(table_path.clone()),
        template: Some(template_path.clone()),
        output: Some(archive.clone()),
        ..JobConfig::default()
    }
    .with_preset_applied();
    let (generation, plan) = job.to_generation().unwrap();
    assert_eq!(plan.mode, OutputMode::Archive);

    let table = Table::load(&table_path).unwrap();
    let template = Template::load(&template_path).unwrap();
    let mut sink = ArchiveSink::new(&plan.path);
    let report = Generator::new(generation).run(&table, &template, &mut sink).unwrap();

    assert_eq!(report.generated, vec!["night-sky.html", "ocean.html"]);
    assert_eq!(report.location.as_deref(), Some(archive.as_path()));
    assert!(archive.exists());

    let night = read_entry(&archive, "night-sky.html");
    assert_eq!(
        night,
        "<amp-story>\n<h1>Night Sky</h1>\n<amp-img src=\"stars.jpg\">\n</amp-story>\n"
    );
    assert!(read_entry(&archive, "ocean.html").contains("<h1>The Ocean</h1>"));
}

#[test]
fn test_last_row_placeholders_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let table_path = dir.path().join("master.csv");
    fs::write(&table_path, "home,Welcome\nabout,About us\n{{page}},{{heading}}\n").unwrap();
    let out = dir.path().join("master_templates");

    let job = JobConfig {
        preset: Some(Preset::Master),
        output: Some(out.clone()),
        ..JobConfig::default()
    }
    .with_preset_applied();
    let (generation, plan) = job.to_generation().unwrap();

    let table = Table::load(&table_path).unwrap();
    let mut sink = DirectorySink::new(&plan.path).unwrap();
    let report = Generator::new(generation)
        .run(&table, &Template::new("<h2>{{heading}}</h2>"), &mut sink)
        .unwrap();

    assert_eq!(report.generated, vec!["home_template.html", "about_template.html"]);
    assert_eq!(
        fs::read_to_string(out.join("home_template.html")).unwrap(),
        "<h2>Welcome</h2>"
    );
    assert_eq!(
        fs::read_to_string(out.join("about_template.html")).unwrap(),
        "<h2>About us</h2>"
    );
}

#[test]
fn test_short_row_is_skipped_and_reported() {
    let dir = tempfile::tempdir().unwrap();
    let table_path = dir.path().join("rows.csv");
    fs::write(&table_path, "{{slug}},{{title}}\ngood,Good\nshort\n").unwrap();
    let archive = dir.path().join("stories.zip");

    let job = JobConfig {
        preset: Some(Preset::Story),
        output: Some(archive.clone()),
        ..JobConfig::default()
    }
    .with_preset_applied();
    let (generation, _) = job.to_generation().unwrap();

    let table = Table::load(&table_path).unwrap();
    let mut sink = ArchiveSink::new(&archive);
    let report = Generator::new(generation)
        .run(&table, &Template::new("{{title}}"), &mut sink)
        .unwrap();

    assert_eq!(report.generated, vec!["good.html"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].row, 2);
    assert!(!report.is_complete());
}

#[test]
fn test_abort_policy_leaves_no_archive() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("stories.zip");

    let job = JobConfig {
        preset: Some(Preset::Story),
        output: Some(archive.clone()),
        on_row_error: RowErrorPolicy::Abort,
        ..JobConfig::default()
    }
    .with_preset_applied();
    let (generation, _) = job.to_generation().unwrap();

    let table = Table::from_csv_str("{{slug}},{{title}}\ngood,Good\nshort\n").unwrap();
    let mut sink = ArchiveSink::new(&archive);
    let err = Generator::new(generation)
        .run(&table, &Template::new("{{title}}"), &mut sink)
        .unwrap_err();

    assert!(matches!(err, StorygenError::ShapeMismatch { row: 2, .. }));
    assert!(!archive.exists());
}

#[test]
fn test_placeholder_row_only_produces_empty_archive() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("empty.zip");

    let job = JobConfig {
        preset: Some(Preset::Story),
        output: Some(archive.clone()),
        ..JobConfig::default()
    }
    .with_preset_applied();
    let (generation, _) = job.to_generation().unwrap();

    let table = Table::from_csv_str("{{slug}},{{title}}\n").unwrap();
    let mut sink = ArchiveSink::new(&archive);
    let report = Generator::new(generation)
        .run(&table, &Template::new("{{title}}"), &mut sink)
        .unwrap();

    assert!(report.generated.is_empty());
    let zip = zip::ZipArchive::new(fs::File::open(&archive).unwrap()).unwrap();
    assert_eq!(zip.len(), 0);
}

#[test]
fn test_rules_file_rewrites_template_before_substitution() {
    let dir = tempfile::tempdir().unwrap();
    let (table_path, _) = write_inputs(dir.path());
    let rules_path = dir.path().join("rules.json");
    fs::write(
        &rules_path,
        r#"{
            "rewrites": [{"pattern": "<h1>[^<]*</h1>", "replacement": "<h1>{{title}}</h1>"}],
            "deletions": ["<script>.*?</script>"]
        }"#,
    )
    .unwrap();

    let job = JobConfig {
        preset: Some(Preset::Story),
        rules: Some(rules_path),
        output: Some(dir.path().join("out.zip")),
        ..JobConfig::default()
    }
    .with_preset_applied();
    let (generation, _) = job.to_generation().unwrap();

    let page = Template::new("<script>\ntrack();\n</script><h1>Exported Title</h1>");
    let mut sink = storygen::MemorySink::new();
    Generator::new(generation)
        .run(&Table::load(&table_path).unwrap(), &page, &mut sink)
        .unwrap();

    assert_eq!(sink.records[0].content, "<h1>Night Sky</h1>");
    assert_eq!(sink.records[1].content, "<h1>The Ocean</h1>");
}

#[test]
fn test_job_file_drives_header_naming() {
    let dir = tempfile::tempdir().unwrap();
    let job_path = dir.path().join("job.json");
    fs::write(
        &job_path,
        r#"{
            "placeholder_row": "first",
            "name": {"header": "slug"},
            "name_prefix": "story-",
            "mode": "archive",
            "output": "stories.zip"
        }"#,
    )
    .unwrap();

    let job = JobConfig::load_from_file(&job_path).unwrap();
    assert_eq!(job.name, Some(NameSource::Header("slug".into())));

    let (generation, plan) = job.to_generation().unwrap();
    assert_eq!(generation.placeholder_row, PlaceholderRow::First);

    let table = Table::from_csv_str("{{title}},{{slug}}\nNight,night\n").unwrap();
    let mut sink = ArchiveSink::new(dir.path().join(&plan.path));
    let report = Generator::new(generation)
        .run(&table, &Template::new("{{title}}"), &mut sink)
        .unwrap();
    assert_eq!(report.generated, vec!["story-night.html"]);

    let names: Vec<&str> = sink.entry_names().collect();
    assert_eq!(names, vec!["story-night.html"]);
    sink.finish().unwrap();
}

#[test]
fn test_unsupported_table_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rows.txt");
    fs::write(&path, "a,b\n").unwrap();

    assert!(matches!(Table::load(&path), Err(StorygenError::Table(_))));
}

// ============================================================================
// Binary
// ============================================================================

fn storygen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_storygen"))
}

#[test]
fn test_binary_missing_template_is_a_notice() {
    let dir = tempfile::tempdir().unwrap();
    let (table_path, _) = write_inputs(dir.path());

    let output = storygen()
        .args(["generate", "--preset", "story", "--table"])
        .arg(&table_path)
        .arg("--output")
        .arg(dir.path().join("out.zip"))
        .output()
        .expect("Should be able to run storygen");

    assert!(output.status.success(), "Missing input should not be a failure");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Please provide an HTML template file."));
    assert!(!dir.path().join("out.zip").exists());
}

#[test]
fn test_binary_generate_archive() {
    let dir = tempfile::tempdir().unwrap();
    let (table_path, template_path) = write_inputs(dir.path());
    let archive = dir.path().join("stories.zip");

    let output = storygen()
        .args(["generate", "--preset", "story", "--table"])
        .arg(&table_path)
        .arg("--template")
        .arg(&template_path)
        .arg("--output")
        .arg(&archive)
        .output()
        .expect("Should be able to run storygen");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Generated 2 files"));
    assert!(read_entry(&archive, "ocean.html").contains("waves.jpg"));
}

#[test]
fn test_binary_lines_remove_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("page.html");
    fs::write(&file, "1\n2\n3\n4\n5\n6\n").unwrap();

    let output = storygen()
        .args(["lines", "remove", "--file"])
        .arg(&file)
        .args(["--lines", "2,5,3"])
        .output()
        .expect("Should be able to run storygen");

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&file).unwrap(), "1\n4\n6\n");
}

#[test]
fn test_binary_lines_insert_out_of_range_fails() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("page.html");
    fs::write(&file, "a\nb\n").unwrap();

    let output = storygen()
        .args(["lines", "insert", "--file"])
        .arg(&file)
        .args(["--line", "9", "--content", "x"])
        .output()
        .expect("Should be able to run storygen");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("out of range"));
    assert_eq!(fs::read_to_string(&file).unwrap(), "a\nb\n");
}

#[test]
fn test_binary_directory_mode_reports_repeated_names() {
    let dir = tempfile::tempdir().unwrap();
    let table_path = dir.path().join("rows.csv");
    let template_path = dir.path().join("page.html");
    fs::write(&table_path, "{{slug}},{{title}}\nx,First\ny,Other\nx,Second\n").unwrap();
    fs::write(&template_path, "{{title}}").unwrap();
    let out = dir.path().join("pages");

    let output = storygen()
        .args(["generate", "--placeholder-row", "first", "--name-column", "0", "--mode", "single"])
        .arg("--table")
        .arg(&table_path)
        .arg("--template")
        .arg(&template_path)
        .arg("--output")
        .arg(&out)
        .output()
        .expect("Should be able to run storygen");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Generated 2 files"), "stdout: {}", stdout);
    assert!(stdout.contains("x.html was produced by more than one row"));
    assert_eq!(fs::read_to_string(out.join("x.html")).unwrap(), "Second");
    assert_eq!(fs::read_dir(&out).unwrap().count(), 2);
}
