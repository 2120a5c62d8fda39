mod support;

use support::task;
use trackwise::state::TrackerState;
use trackwise::storage::{Storage, STATE_FILE};
use trackwise::writer::PersistenceWriter;

fn state_with(count: usize) -> TrackerState {
    TrackerState {
        tasks: (0..count).map(|index| task(&index.to_string())).collect(),
        ..TrackerState::default()
    }
}

#[test]
fn flush_leaves_the_latest_state_on_disk() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(STATE_FILE);
    let writer = PersistenceWriter::spawn(Storage::new(&path));

    for count in 1..=20 {
        writer.submit(state_with(count));
    }
    writer.flush();

    assert_eq!(Storage::new(&path).load()?, Some(state_with(20)));
    assert!(writer.writes() >= 1);
    assert!(writer.writes() <= 20);
    assert_eq!(writer.failures(), 0);
    Ok(())
}

#[test]
fn dropping_the_writer_drains_the_queue() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(STATE_FILE);
    {
        let writer = PersistenceWriter::spawn(Storage::new(&path));
        writer.submit(state_with(3));
    }
    assert_eq!(Storage::new(&path).load()?, Some(state_with(3)));
    Ok(())
}

#[test]
fn failed_writes_are_counted_not_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    // A directory cannot be replaced by the state document.
    let path = dir.path().join("occupied");
    std::fs::create_dir(&path)?;
    std::fs::write(path.join("keep"), "x")?;

    let writer = PersistenceWriter::spawn(Storage::new(&path));
    writer.submit(state_with(1));
    writer.flush();
    assert_eq!(writer.failures(), 1);

    writer.submit(state_with(2));
    writer.flush();
    assert_eq!(writer.failures(), 2);
    assert_eq!(writer.writes(), 0);
    Ok(())
}
