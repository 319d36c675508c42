//! Integration tests for on-disk generations.

use std::fs;

use loupe::prelude::*;
use loupe::storage::file::{CURRENT_FILE, generation_file_name};
use tempfile::TempDir;

fn titles() -> VecSource {
    VecSource::new(vec![
        SourceRecord::new("https://example.com/a", "hello world", 1000),
        SourceRecord::new("https://example.com/b", "hello there", 2000),
        SourceRecord::new("https://example.com/c", "東京の天気予報", 3000),
    ])
}

#[test]
fn test_reopen_serves_same_results() -> Result<()> {
    let dir = TempDir::new().unwrap();

    let before = {
        let engine = SearchEngine::open(dir.path(), LoupeConfig::default())?;
        engine.rebuild(&titles())?;
        (engine.query("hello", 1)?.page, engine.query("天気", 1)?.page)
    };

    let engine = SearchEngine::open(dir.path(), LoupeConfig::default())?;
    assert_eq!(engine.info().doc_count, 3);
    assert_eq!(engine.query("hello", 1)?.page, before.0);
    assert_eq!(engine.query("天気", 1)?.page, before.1);
    Ok(())
}

#[test]
fn test_fresh_directory_is_empty() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let engine = SearchEngine::open(dir.path().join("new"), LoupeConfig::default())?;

    let info = engine.info();
    assert_eq!(info.doc_count, 0);
    assert_eq!(info.generation_id, 0);
    assert!(info.index_dir.is_some());
    assert!(engine.query("hello", 1)?.page.items.is_empty());
    Ok(())
}

#[test]
fn test_old_generations_are_pruned() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let engine = SearchEngine::open(dir.path(), LoupeConfig::default().keep_generations(2))?;

    for _ in 0..4 {
        engine.rebuild(&titles())?;
    }

    let store = IndexStore::open(dir.path())?;
    let ids = store.list_generations()?;
    assert_eq!(ids.len(), 2);
    assert_eq!(store.current_id()?, ids.last().copied());
    assert_eq!(Some(engine.current().id()), store.current_id()?);
    Ok(())
}

#[test]
fn test_generation_ids_continue_after_reopen() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let first = {
        let engine = SearchEngine::open(dir.path(), LoupeConfig::default())?;
        engine.rebuild(&titles())?.generation_id
    };

    let engine = SearchEngine::open(dir.path(), LoupeConfig::default())?;
    let second = engine.rebuild(&titles())?.generation_id;
    assert!(second > first);
    Ok(())
}

#[test]
fn test_corruption_is_detected() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let id = {
        let engine = SearchEngine::open(dir.path(), LoupeConfig::default())?;
        engine.rebuild(&titles())?.generation_id
    };

    let path = dir.path().join(generation_file_name(id));
    let mut bytes = fs::read(&path)?;
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0xFF;
    fs::write(&path, &bytes)?;

    let store = IndexStore::open(dir.path())?;
    assert!(matches!(store.load(id), Err(LoupeError::Corrupted(_))));
    Ok(())
}

#[test]
fn test_rebuild_recovers_corrupted_index() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let id = {
        let engine = SearchEngine::open(dir.path(), LoupeConfig::default())?;
        engine.rebuild(&titles())?.generation_id
    };

    let path = dir.path().join(generation_file_name(id));
    let mut bytes = fs::read(&path)?;
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0xFF;
    fs::write(&path, &bytes)?;

    let engine = SearchEngine::open(dir.path(), LoupeConfig::default())?;
    assert_eq!(engine.info().doc_count, 0);
    assert!(engine.query("hello", 1)?.page.items.is_empty());

    let stats = engine.rebuild(&titles())?;
    assert!(stats.generation_id > id);
    assert_eq!(engine.query("hello", 1)?.page.total_items, 2);

    let reopened = SearchEngine::open(dir.path(), LoupeConfig::default())?;
    assert_eq!(reopened.info().generation_id, stats.generation_id);
    assert_eq!(reopened.query("hello", 1)?.page.total_items, 2);
    Ok(())
}

#[test]
fn test_truncated_file_is_detected() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let id = {
        let engine = SearchEngine::open(dir.path(), LoupeConfig::default())?;
        engine.rebuild(&titles())?.generation_id
    };

    let path = dir.path().join(generation_file_name(id));
    let bytes = fs::read(&path)?;
    fs::write(&path, &bytes[..bytes.len() - 10])?;

    let store = IndexStore::open(dir.path())?;
    assert!(matches!(store.load(id), Err(LoupeError::Corrupted(_))));
    Ok(())
}

#[test]
fn test_bad_current_pointer() -> Result<()> {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CURRENT_FILE), "not-a-generation\n")?;

    let store = IndexStore::open(dir.path())?;
    assert!(matches!(store.current_id(), Err(LoupeError::Corrupted(_))));

    let engine = SearchEngine::open(dir.path(), LoupeConfig::default())?;
    assert_eq!(engine.info().generation_id, 0);
    engine.rebuild(&titles())?;
    assert_eq!(engine.query("hello", 1)?.page.total_items, 2);
    Ok(())
}
