use ino2cpp::{ConvertError, Converter, CppParser, ParseError, ParserConfig, Settings};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/sketches")
        .join(name)
}

fn converter(out: &Path) -> Converter {
    Converter::new(CppParser::new().expect("Failed to create C++ parser"), out)
        .expect("Failed to create converter")
}

/// Split the generated source into its two include lines and the rest
fn split_prelude(generated: &[u8]) -> (&str, &str, &[u8]) {
    let text = std::str::from_utf8(generated).unwrap();
    let mut lines = text.splitn(3, '\n');
    let first = lines.next().unwrap();
    let second = lines.next().unwrap();
    let body_start = first.len() + second.len() + 2;
    (first, second, &generated[body_start..])
}

#[test]
fn test_blink_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let mut converter = converter(temp_dir.path());

    let conversion = converter.convert(fixture("blink.ino")).unwrap();

    assert_eq!(conversion.header, temp_dir.path().join("blink.h"));
    assert_eq!(conversion.source, temp_dir.path().join("blink.cpp"));
    assert_eq!(
        fs::read_to_string(&conversion.header).unwrap(),
        "void setup();\nvoid loop();\n"
    );
    assert_eq!(
        fs::read_to_string(&conversion.source).unwrap(),
        "#include <Arduino.h>\n#include \"blink.h\"\nvoid setup() { }\nvoid loop() { }\n"
    );
}

#[test]
fn test_header_has_one_line_per_function() {
    let temp_dir = TempDir::new().unwrap();
    let mut converter = converter(temp_dir.path());

    let conversion = converter.convert(fixture("weather_station.ino")).unwrap();
    let header = fs::read_to_string(&conversion.header).unwrap();
    let lines: Vec<&str> = header.lines().collect();

    assert_eq!(
        lines,
        vec![
            "void setup();",
            "void loop();",
            "bool due(unsigned long, unsigned long);",
            "Reading sample();",
            "void report(const Reading &, const char *);",
        ]
    );
    assert!(lines.iter().all(|line| line.ends_with(';')));
    assert_eq!(conversion.signatures.len(), lines.len());
}

#[test]
fn test_source_body_is_byte_identical() {
    let temp_dir = TempDir::new().unwrap();
    let mut converter = converter(temp_dir.path());
    let input = fixture("weather_station.ino");

    let conversion = converter.convert(&input).unwrap();
    let generated = fs::read(&conversion.source).unwrap();
    let (first, second, body) = split_prelude(&generated);

    assert_eq!(first, "#include <Arduino.h>");
    assert_eq!(second, "#include \"weather_station.h\"");
    assert_eq!(body, fs::read(&input).unwrap().as_slice());
}

#[test]
fn test_crlf_and_missing_trailing_newline_are_preserved() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("crlf.ino");
    let original = b"void setup() { }\r\nvoid loop() { }";
    fs::write(&input, original).unwrap();

    let mut converter = converter(&temp_dir.path().join("out"));
    let conversion = converter.convert(&input).unwrap();

    let generated = fs::read(&conversion.source).unwrap();
    let (_, _, body) = split_prelude(&generated);
    assert_eq!(body, original);
}

#[test]
fn test_conversion_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let mut converter = converter(temp_dir.path());
    let input = fixture("weather_station.ino");

    let first = converter.convert(&input).unwrap();
    let header_once = fs::read(&first.header).unwrap();
    let source_once = fs::read(&first.source).unwrap();

    let second = converter.convert(&input).unwrap();
    assert_eq!(fs::read(&second.header).unwrap(), header_once);
    assert_eq!(fs::read(&second.source).unwrap(), source_once);
}

#[test]
fn test_existing_header_is_overwritten() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("blink.h"), "stale contents\n").unwrap();

    let mut converter = converter(temp_dir.path());
    converter.convert(fixture("blink.ino")).unwrap();

    assert_eq!(
        fs::read_to_string(temp_dir.path().join("blink.h")).unwrap(),
        "void setup();\nvoid loop();\n"
    );
}

#[test]
fn test_missing_output_dir_is_created() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("build/generated");

    let settings = Settings {
        output_dir: out.clone(),
        ..Settings::default()
    };
    let mut converter = Converter::from_settings(&settings).unwrap();
    assert!(out.is_dir());

    converter.convert(fixture("blink.ino")).unwrap();
    assert!(out.join("blink.h").is_file());
    assert!(out.join("blink.cpp").is_file());
}

#[test]
fn test_malformed_source_aborts_that_file_only() {
    let temp_dir = TempDir::new().unwrap();
    let mut converter = converter(temp_dir.path());

    let results = converter.convert_all([
        fixture("blink.ino"),
        fixture("broken.ino"),
        fixture("weather_station.ino"),
    ]);

    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(ConvertError::Parse {
            source: ParseError::SyntaxError { .. },
            ..
        })
    ));
    assert!(results[2].is_ok());

    // Earlier output stays, the failed file produced nothing
    assert!(temp_dir.path().join("blink.h").exists());
    assert!(!temp_dir.path().join("broken.h").exists());
    assert!(!temp_dir.path().join("broken.cpp").exists());
    assert!(temp_dir.path().join("weather_station.cpp").exists());
}

#[test]
fn test_lenient_parser_converts_malformed_source() {
    let temp_dir = TempDir::new().unwrap();
    let parser = CppParser::with_config(&ParserConfig {
        reject_syntax_errors: false,
    })
    .unwrap();
    let mut converter = Converter::new(parser, temp_dir.path()).unwrap();

    let conversion = converter.convert(fixture("broken.ino")).unwrap();
    assert!(conversion.source.exists());
    assert!(conversion.header.exists());
}

#[test]
fn test_unreadable_input_is_a_read_error() {
    let temp_dir = TempDir::new().unwrap();
    let mut converter = converter(temp_dir.path());

    let err = converter
        .convert(temp_dir.path().join("does_not_exist.ino"))
        .unwrap_err();
    assert!(matches!(err, ConvertError::FileRead { .. }));
}

#[test]
fn test_output_name_uses_text_before_first_dot() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("motor.v2.ino");
    fs::write(&input, "int speed() { return 1; }\n").unwrap();

    let out = temp_dir.path().join("out");
    let mut converter = converter(&out);
    converter.convert(&input).unwrap();

    assert_eq!(
        fs::read_to_string(out.join("motor.h")).unwrap(),
        "int speed();\n"
    );
    let source = fs::read_to_string(out.join("motor.cpp")).unwrap();
    assert!(source.starts_with("#include <Arduino.h>\n#include \"motor.h\"\n"));
}
