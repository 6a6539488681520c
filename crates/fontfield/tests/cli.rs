use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use fontfield_core::fixture::{FontBuilder, SAMPLE_A, SAMPLE_SPACE};
use fontfield_core::reader::Tag;
use fontfield_core::tables::TableDirectory;
use predicates::prelude::*;

fn fontfield(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fontfield").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

fn write_sample(dir: &TempDir, name: &str) {
    dir.child(name).write_binary(&FontBuilder::sample().build()).unwrap();
}

#[test]
fn atlas_writes_png_and_json() {
    let dir = TempDir::new().unwrap();
    write_sample(&dir, "sample.ttf");

    fontfield(&dir)
        .args(["atlas", "sample.ttf", "out/sample.png", "--charset", "A "])
        .assert()
        .success()
        .stdout(predicate::str::contains("[atlas] ✅ Wrote"));

    dir.child("out/sample.png").assert(predicate::path::is_file());
    dir.child("out/sample.luau").assert(predicate::path::missing());

    let json = std::fs::read_to_string(dir.child("out/sample.json").path()).unwrap();
    let meta: serde_json::Value = serde_json::from_str(&json).unwrap();
    let glyphs = meta["glyphs"].as_array().unwrap();
    assert_eq!(glyphs.len(), 2);
    assert_eq!(glyphs[0]["character"], "A");
    assert!(glyphs[0]["atlas_rect"].is_object());
    assert!(glyphs[1]["atlas_rect"].is_null());
    assert_eq!(meta["px_range"], 4);
    assert!(meta.get("pixels").is_none());

    let image = image::open(dir.child("out/sample.png").path()).unwrap();
    assert_eq!(image.width(), meta["size"].as_u64().unwrap() as u32);
    assert_eq!(image.width(), image.height());
}

#[test]
fn luau_module_on_request() {
    let dir = TempDir::new().unwrap();
    dir.child("sample.ttf")
        .write_binary(
            &FontBuilder::sample()
                .with_kerning(&[(SAMPLE_A, SAMPLE_SPACE, -25)])
                .build(),
        )
        .unwrap();

    fontfield(&dir)
        .args(["atlas", "sample.ttf", "sample.png", "--luau", "--no-json"])
        .assert()
        .success();

    dir.child("sample.json").assert(predicate::path::missing());
    dir.child("sample.luau")
        .assert(predicate::str::starts_with(
            "-- This file is automatically @generated by fontfield.",
        ))
        .assert(predicate::str::contains("kern = -25"));
}

#[test]
fn config_file_sets_defaults() {
    let dir = TempDir::new().unwrap();
    write_sample(&dir, "sample.ttf");
    dir.child("fontfield.toml")
        .write_str("[atlas]\npx_range = 2\ncharset = \"A\"\n\n[output]\njson = false\nluau = true\n")
        .unwrap();

    fontfield(&dir)
        .args(["atlas", "sample.ttf", "sample.png"])
        .assert()
        .success()
        .stdout(predicate::str::contains("range 2, glyphs 1"));

    dir.child("sample.json").assert(predicate::path::missing());
    dir.child("sample.luau").assert(predicate::path::is_file());
}

#[test]
fn explicit_config_path_must_exist() {
    let dir = TempDir::new().unwrap();
    write_sample(&dir, "sample.ttf");

    fontfield(&dir)
        .args(["atlas", "sample.ttf", "sample.png", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[atlas] ERROR: Failed to read nope.toml"));
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();

    fontfield(&dir)
        .args(["atlas", "missing.ttf", "out.png"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Input path does not exist"));
}

#[test]
fn corrupt_font_names_the_table() {
    let dir = TempDir::new().unwrap();
    let mut data = FontBuilder::sample().build();
    let directory = TableDirectory::parse(&data).unwrap();
    let maxp = directory.find(Tag::MAXP).unwrap();
    data[maxp.offset as usize + 4] ^= 0xFF;
    dir.child("broken.ttf").write_binary(&data).unwrap();

    fontfield(&dir)
        .args(["atlas", "broken.ttf", "broken.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("checksum mismatch in 'maxp'"));
    dir.child("broken.png").assert(predicate::path::missing());
}

#[test]
fn oversized_glyphs_fail_without_output() {
    let dir = TempDir::new().unwrap();
    write_sample(&dir, "sample.ttf");

    fontfield(&dir)
        .args(["atlas", "sample.ttf", "huge.png", "--charset", "A", "--px-per-em", "1e12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("larger than the 8192px atlas limit"));
    dir.child("huge.png").assert(predicate::path::missing());

    fontfield(&dir)
        .args(["atlas", "sample.ttf", "flat.png", "--px-range", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid atlas option 'px_range'"));
    dir.child("flat.png").assert(predicate::path::missing());
}

#[test]
fn directory_input_respects_recursive() {
    let dir = TempDir::new().unwrap();
    write_sample(&dir, "fonts/top.ttf");
    write_sample(&dir, "fonts/nested/deep.ttf");
    dir.child("fonts/readme.txt").write_str("not a font").unwrap();

    fontfield(&dir)
        .args(["atlas", "fonts", "flat", "--charset", "A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 1 font(s), 0 failed"));
    dir.child("flat/top.png").assert(predicate::path::is_file());
    dir.child("flat/deep.png").assert(predicate::path::missing());

    fontfield(&dir)
        .args(["atlas", "fonts", "all", "--charset", "A", "--recursive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 font(s), 0 failed"));
    dir.child("all/top.png").assert(predicate::path::is_file());
    dir.child("all/deep.png").assert(predicate::path::is_file());
    dir.child("all/deep.json").assert(predicate::path::is_file());
}

#[test]
fn inspect_prints_tables_and_metrics() {
    let dir = TempDir::new().unwrap();
    write_sample(&dir, "sample.ttf");

    fontfield(&dir)
        .args(["inspect", "sample.ttf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("family:      Fixture Sans"))
        .stdout(predicate::str::contains("'head'"))
        .stdout(predicate::str::contains("unitsPerEm 1000"))
        .stdout(predicate::str::contains("post:  v3.0"));
}
