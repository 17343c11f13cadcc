//! Unit tests for the script writer.

use systab_bench::script::RenderedScript;
use systab_bench::writer::{ScriptWriter, WriterPool};
use tempfile::TempDir;

fn script(name: &str, text: &str) -> RenderedScript {
    RenderedScript {
        name: name.to_string(),
        text: text.to_string(),
        fixtures: None,
    }
}

#[test]
fn test_script_writer() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("test.lua");

    let mut writer = ScriptWriter::new(&file_path).unwrap();
    writer
        .write_script(&script("test", "function event()\nend\n\n"))
        .unwrap();
    writer.flush().unwrap();

    assert_eq!(writer.bytes_written(), 22);
    let content = std::fs::read_to_string(&file_path).unwrap();
    assert_eq!(content, "function event()\nend\n\n");
}

#[test]
fn test_writer_pool() {
    let temp_dir = TempDir::new().unwrap();
    let mut pool = WriterPool::new(temp_dir.path().to_path_buf());
    pool.ensure_output_dir().unwrap();

    let a = pool.write_script(&script("history", "-- history\n")).unwrap();
    let b = pool.write_script(&script("diff", "-- diff\n")).unwrap();
    pool.close_all().unwrap();

    assert_eq!(a, temp_dir.path().join("history.lua"));
    assert_eq!(b, temp_dir.path().join("diff.lua"));
    assert_eq!(std::fs::read_to_string(a).unwrap(), "-- history\n");
    assert_eq!(std::fs::read_to_string(b).unwrap(), "-- diff\n");
}

#[test]
fn test_writer_pool_creates_output_dir() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("gen").join("systab");
    let mut pool = WriterPool::new(nested.clone());
    pool.ensure_output_dir().unwrap();
    pool.write_script(&script("s", "x")).unwrap();
    pool.close_all().unwrap();
    assert!(nested.join("s.lua").exists());
}

#[test]
fn test_writer_pool_reuses_writer() {
    let temp_dir = TempDir::new().unwrap();
    let mut pool = WriterPool::new(temp_dir.path().to_path_buf());
    pool.write_script(&script("s", "a\n")).unwrap();
    pool.write_script(&script("s", "b\n")).unwrap();
    pool.close_all().unwrap();
    let content = std::fs::read_to_string(temp_dir.path().join("s.lua")).unwrap();
    assert_eq!(content, "a\nb\n");
}

#[test]
fn test_get_writer_targets_script_path() {
    let temp_dir = TempDir::new().unwrap();
    let mut pool = WriterPool::new(temp_dir.path().to_path_buf());
    let expected = pool.script_path("refs");
    pool.get_writer("refs").unwrap();
    pool.close_all().unwrap();
    assert_eq!(expected, temp_dir.path().join("refs.lua"));
    assert!(expected.exists());
}
