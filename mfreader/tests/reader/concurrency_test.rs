use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use mfreader::reader::ReaderConfig;
use mfreader::test_support::started_mock_reader;
use mfreader::{CommandFailure, ms};
use serial_test::serial;

use crate::common::fixtures::sample_block;

fn config(timeout: Duration) -> ReaderConfig {
    ReaderConfig {
        timeout,
        ..Default::default()
    }
}

#[test]
#[serial]
fn concurrent_writes_never_share_the_slot() -> Result<()> {
    let (reader, mock) = started_mock_reader(config(ms(2_000)))?;
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));

    let (f, m) = (in_flight.clone(), max_seen.clone());
    mock.set_responder(Box::new(move |_tag: u16, _: &[u8]| {
        let now = f.fetch_add(1, Ordering::SeqCst) + 1;
        m.fetch_max(now, Ordering::SeqCst);
        thread::sleep(ms(30));
        f.fetch_sub(1, Ordering::SeqCst);
        Some(vec![0x01])
    }));

    let handles: Vec<_> = (0..2u32)
        .map(|i| {
            let reader = reader.clone();
            thread::spawn(move || reader.write_block(4 + i, &sample_block(i as u8)))
        })
        .collect();
    for h in handles {
        h.join().expect("writer thread panicked")?;
    }

    assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    let sent = mock.sent();
    assert_eq!(sent.len(), 2);
    assert_ne!(sent[0].0, sent[1].0);
    Ok(())
}

#[test]
#[serial]
fn waiter_gives_up_when_slot_stays_busy() -> Result<()> {
    let (reader, _mock) = started_mock_reader(config(ms(300)))?;

    // First caller occupies the slot until its own timeout
    let holder = {
        let reader = reader.clone();
        thread::spawn(move || reader.read_block(1))
    };
    thread::sleep(ms(50));

    reader.set_timeout(ms(100));
    let start = Instant::now();
    let err = reader.read_block(2).unwrap_err();
    assert_eq!(err.command_failure(), Some(CommandFailure::Busy));
    assert!(start.elapsed() >= ms(100));
    assert!(start.elapsed() < ms(280));

    let held = holder.join().expect("holder thread panicked");
    assert_eq!(
        held.unwrap_err().command_failure(),
        Some(CommandFailure::Timeout)
    );
    Ok(())
}

#[test]
#[serial]
fn stop_interrupts_a_waiting_command() -> Result<()> {
    let (reader, _mock) = started_mock_reader(config(ms(2_000)))?;
    let waiter = {
        let reader = reader.clone();
        thread::spawn(move || {
            let start = Instant::now();
            (reader.read_block(1), start.elapsed())
        })
    };
    thread::sleep(ms(50));
    reader.stop()?;

    let (result, elapsed) = waiter.join().expect("waiter thread panicked");
    assert_eq!(
        result.unwrap_err().command_failure(),
        Some(CommandFailure::Interrupted)
    );
    assert!(elapsed < ms(1_500));
    Ok(())
}

#[test]
#[serial]
fn many_callers_all_return() -> Result<()> {
    let (reader, mock) = started_mock_reader(config(ms(1_000)))?;
    mock.set_responder(Box::new(|tag: u16, _: &[u8]| {
        // Every third command is left unanswered
        if tag % 3 == 0 { None } else { Some(vec![0x01]) }
    }));
    reader.set_timeout(ms(60));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let reader = reader.clone();
            thread::spawn(move || reader.reset_card())
        })
        .collect();
    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("caller panicked"))
        .collect();

    // Callers that never got the slot sent nothing
    let busy = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.command_failure() == Some(CommandFailure::Busy)))
        .count();
    assert_eq!(results.len(), 6);
    assert_eq!(mock.sent().len(), 6 - busy);
    Ok(())
}
