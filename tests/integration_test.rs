// Integration tests for Codexplain

use codexplain::{
    document, Category, Config, Documenter, Entry, Error, MarkdownRenderer, Session, Upload,
};
use std::path::PathBuf;

fn fixtures_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixtures_path(name)).expect("Failed to read fixture")
}

fn create_documenter() -> Documenter {
    Documenter::new(&Config::default()).expect("Failed to create documenter")
}

fn of(entries: &[Entry], category: Category) -> Vec<&Entry> {
    entries.iter().filter(|e| e.category == category).collect()
}

fn names(entries: &[&Entry]) -> Vec<String> {
    entries.iter().map(|e| e.name.clone()).collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_single_import() {
    let md = document("import os\n").unwrap();

    assert!(md.contains("## Imports\n\n- `os` (line 1)\n"));
    for heading in ["Classes", "Functions", "Assignments", "Loops", "Function Calls", "Return Statements"] {
        assert!(!md.contains(&format!("## {}", heading)), "Unexpected section {}", heading);
    }
}

#[test]
fn test_function_with_docstring_and_return() {
    let source = "def f():\n    \"\"\"doc\"\"\"\n    return 1\n";
    let entries = create_documenter().extract(source).unwrap();

    let functions = of(&entries, Category::FunctionDef);
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].name, "f");
    assert_eq!(functions[0].detail.as_deref(), Some("doc"));

    let returns = of(&entries, Category::Return);
    assert_eq!(returns.len(), 1);
    assert_eq!(returns[0].detail.as_deref(), Some("1"));

    let md = document(source).unwrap();
    assert!(md.contains("- def `f` (line 1)\n  > doc\n"));
    assert!(md.contains("- `return 1` (line 3)"));
}

#[test]
fn test_class_with_method() {
    let source = "class A:\n    def m(self):\n        pass\n";
    let entries = create_documenter().extract(source).unwrap();

    let classes = of(&entries, Category::ClassDef);
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].name, "A");
    assert_eq!(classes[0].children.len(), 1);
    assert_eq!(classes[0].children[0].name, "m");
    assert!(of(&entries, Category::FunctionDef).is_empty());

    let md = document(source).unwrap();
    assert!(md.contains("- class `A` (line 1)\n  - def `m` (line 2)\n"));
}

#[test]
fn test_assignment_loop_call_order() {
    let source = "x = 1\nfor i in range(x):\n    print(i)\n";
    let entries = create_documenter().extract(source).unwrap();

    let categories: Vec<Category> = entries.iter().map(|e| e.category).collect();
    assert_eq!(categories, vec![Category::Assignment, Category::Loop, Category::Call]);
    assert_eq!(entries[0].name, "x");
    assert_eq!(entries[0].detail.as_deref(), Some("1"));
    assert!(entries[1].detail.as_deref().unwrap_or("").contains("range(x)"));
    assert_eq!(entries[2].name, "print");

    let md = document(source).unwrap();
    let assignments = md.find("## Assignments").unwrap();
    let loops = md.find("## Loops").unwrap();
    let calls = md.find("## Function Calls").unwrap();
    assert!(assignments < loops && loops < calls);
}

#[test]
fn test_empty_source() {
    let md = document("").unwrap();
    assert!(md.contains("No constructs found"));
    assert!(!md.contains("## "));
}

#[test]
fn test_syntax_error() {
    match document("def f(:\n") {
        Err(Error::Parse { line, .. }) => assert_eq!(line, 1),
        other => panic!("Expected parse error, got {:?}", other),
    }
}

#[test]
fn test_deep_nesting_exceeds_limit() {
    let mut config = Config::default();
    config.extract.max_depth = 10;
    let mut documenter = Documenter::new(&config).unwrap();

    let source = format!("x = {}1{}\n", "(".repeat(20), ")".repeat(20));
    assert!(matches!(
        documenter.extract(&source),
        Err(Error::DepthExceeded { limit: 10, .. })
    ));
}

// ============================================================================
// Fixture Tests
// ============================================================================

#[test]
fn test_fixture_categories() {
    let entries = create_documenter().extract(&fixture("inventory.py")).unwrap();

    let imports = of(&entries, Category::Import);
    assert_eq!(names(&imports), vec!["os", "sys as system", "collections", "typing"]);
    assert_eq!(imports[2].detail.as_deref(), Some("defaultdict, OrderedDict"));
    assert_eq!(imports[3].detail.as_deref(), Some("*"));

    let classes = of(&entries, Category::ClassDef);
    assert_eq!(names(&classes), vec!["Item"]);
    let methods: Vec<&str> = classes[0].children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(methods, vec!["__init__", "restock"]);

    let functions = of(&entries, Category::FunctionDef);
    assert_eq!(names(&functions), vec!["load", "report"]);
    assert!(functions[1].detail.is_none());

    let loops = of(&entries, Category::Loop);
    assert_eq!(loops.len(), 2);
    assert_eq!(loops[0].detail.as_deref(), Some("for line in handle"));
    assert_eq!(loops[1].detail.as_deref(), Some("while items"));

    let returns = of(&entries, Category::Return);
    assert_eq!(returns.len(), 3);
    assert!(returns[2].detail.is_none());

    let calls = names(&of(&entries, Category::Call));
    for expected in ["open", "items.append", "Item", "line.strip", "defaultdict", "items.pop", "print", "load", "os.path.join", "report"] {
        assert!(calls.iter().any(|c| c == expected), "Missing call {}", expected);
    }
}

#[test]
fn test_fixture_assignments() {
    let entries = create_documenter().extract(&fixture("inventory.py")).unwrap();
    let assignments = of(&entries, Category::Assignment);

    let targets = names(&assignments);
    assert_eq!(targets[0], "DEFAULT_STOCK");
    assert_eq!(targets[1], "LOW, HIGH");
    assert!(targets.contains(&"self.name".to_string()));
    assert!(targets.contains(&"inventory".to_string()));
    // augmented assignments are not assignments
    assert!(!targets.iter().any(|t| t.starts_with("counts[")));
}

#[test]
fn test_fixture_docstrings_are_cleaned() {
    let entries = create_documenter().extract(&fixture("inventory.py")).unwrap();
    let item = of(&entries, Category::ClassDef)[0];

    assert_eq!(
        item.detail.as_deref(),
        Some("An item kept in stock.\n\nTracks a name and a quantity.")
    );
    assert_eq!(item.children[1].detail.as_deref(), Some("Add `amount` units."));

    let md = create_documenter().document(&fixture("inventory.py")).unwrap();
    assert!(md.contains("  > An item kept in stock.\n  >\n  > Tracks a name and a quantity.\n"));
}

#[test]
fn test_fixture_lines_follow_source_order() {
    let entries = create_documenter().extract(&fixture("inventory.py")).unwrap();
    for category in Category::ORDER {
        let lines: Vec<usize> = of(&entries, category).iter().map(|e| e.line).collect();
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted, "{:?} entries out of order", category);
    }
}

#[test]
fn test_fixture_section_order() {
    let md = create_documenter().document(&fixture("inventory.py")).unwrap();
    let positions: Vec<usize> = [
        "## Imports",
        "## Classes",
        "## Functions",
        "## Assignments",
        "## Loops",
        "## Function Calls",
        "## Return Statements",
    ]
    .iter()
    .map(|h| md.find(h).unwrap_or_else(|| panic!("Missing {}", h)))
    .collect();

    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_broken_fixture_has_no_partial_output() {
    let result = create_documenter().document(&fixture("broken.py"));
    match result {
        Err(Error::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("Expected parse error, got {:?}", other),
    }
}

#[test]
fn test_empty_fixture() {
    let md = create_documenter().document(&fixture("empty.py")).unwrap();
    assert_eq!(md, "# Code Documentation\n\n_No constructs found._\n");
}

// ============================================================================
// Pipeline Properties
// ============================================================================

#[test]
fn test_output_is_deterministic() {
    let source = fixture("inventory.py");
    let first = document(&source).unwrap();
    for _ in 0..3 {
        assert_eq!(document(&source).unwrap(), first);
    }
}

#[test]
fn test_json_entries_render_the_same() {
    let mut documenter = create_documenter();
    let entries = documenter.extract(&fixture("inventory.py")).unwrap();
    let json = serde_json::to_string(&entries).unwrap();
    let restored: Vec<Entry> = serde_json::from_str(&json).unwrap();

    let renderer = MarkdownRenderer::default();
    assert_eq!(renderer.render(&restored), documenter.render(&entries));
}

#[test]
fn test_session_lifecycle() {
    let mut documenter = create_documenter();

    let missing = Session::from_upload(None, &mut documenter);
    assert!(matches!(missing, Session::Failed { ref message } if message.starts_with("No file uploaded")));

    let upload = Upload::new(Some("inventory.py".into()), fixture("inventory.py").into_bytes());
    let documented = Session::from_upload(Some(upload), &mut documenter);
    assert!(documented.markdown().unwrap().contains("## Classes"));

    let broken = Upload::new(Some("broken.py".into()), fixture("broken.py").into_bytes());
    let failed = Session::from_upload(Some(broken), &mut documenter);
    assert!(failed.markdown().is_none());

    assert!(Session::reset().is_empty());
}

#[test]
fn test_config_file_drives_pipeline() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[output]\ntitle = \"Inventory\"\nline_numbers = false").unwrap();

    let config = Config::load(file.path()).unwrap();
    let md = Documenter::new(&config).unwrap().document("import os\n").unwrap();
    assert!(md.starts_with("# Inventory\n"));
    assert!(md.contains("- `os`\n"));
}
