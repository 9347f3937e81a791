//! Log serializer
//!
//! Writes the buffered records into the EEPROM log region as one session
//! (see `interposer_log` for the byte layout). Runs inside the
//! terminal-reset handler, so every write blocks until the EEPROM has
//! committed it and the total is bounded by [`crate::timing`].

use interposer_hal::storage::StorageError;
use interposer_hal::NvStorage;
use interposer_log::{
    Marker, EMPTY_SESSION_LEN, MARKER_LEN, SESSION_HEADER_LEN, SESSION_TRAILER_LEN,
};

use super::buffer::{Drain, LogBuffer};
use crate::store::PersistentStore;

/// Outcome of a flush
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlushResult {
    /// Nothing buffered; the store was not touched
    Empty,
    /// No room left for even an empty session; records discarded
    Exhausted { dropped: usize },
    /// Session written
    Written {
        /// Records persisted
        records: usize,
        /// Records left out for lack of room
        dropped: usize,
        /// Address of the APP marker
        start: u16,
        /// Cursor persisted after the session
        cursor: u16,
    },
    /// Storage fault part way through the session
    Failed {
        error: StorageError,
        /// Records not completely persisted
        dropped: usize,
    },
}

/// Drain `log` into the store as one session tagged with `app_id`
///
/// Records are written in append order. Before each record, the remaining
/// room is checked for the whole record plus the END marker; the first one
/// that does not fit ends the session, and it and all later records are
/// dropped. The session is always terminated inside the region, and the
/// persisted cursor is rounded up to the next page boundary.
///
/// The buffer is empty afterwards whatever the outcome.
pub fn flush<S: NvStorage, const N: usize>(
    store: &mut PersistentStore<S>,
    log: &mut LogBuffer<N>,
    app_id: u8,
) -> FlushResult {
    let total = log.len();
    if total == 0 {
        return FlushResult::Empty;
    }
    let mut records = log.drain();

    let start = match store.log_cursor() {
        Ok(cursor) => cursor,
        Err(error) => {
            return FlushResult::Failed {
                error,
                dropped: total,
            }
        }
    };

    let end = store.layout().log_end;
    if start >= end || ((end - start) as usize) < EMPTY_SESSION_LEN {
        return FlushResult::Exhausted { dropped: total };
    }

    let mut written = 0;
    match write_session(store, &mut records, app_id, start, &mut written) {
        Ok(cursor) => FlushResult::Written {
            records: written,
            dropped: total - written,
            start,
            cursor,
        },
        Err(error) => FlushResult::Failed {
            error,
            dropped: total - written,
        },
    }
}

/// Sequential writer over the log region
struct Appender<'a, S> {
    store: &'a mut PersistentStore<S>,
    cursor: u16,
}

impl<S: NvStorage> Appender<'_, S> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        self.store.write_log(self.cursor, bytes)?;
        self.cursor += bytes.len() as u16;
        Ok(())
    }

    fn room(&self) -> usize {
        (self.store.layout().log_end - self.cursor) as usize
    }
}

fn write_session<S: NvStorage, const N: usize>(
    store: &mut PersistentStore<S>,
    records: &mut Drain<'_, N>,
    app_id: u8,
    start: u16,
    written: &mut usize,
) -> Result<u16, StorageError> {
    let mut out = Appender {
        store,
        cursor: start,
    };

    let mut header = [0u8; SESSION_HEADER_LEN];
    header[..MARKER_LEN].copy_from_slice(&Marker::App.pattern());
    header[MARKER_LEN] = app_id;
    out.put(&header)?;

    for crp in records.by_ref() {
        if out.room() < crp.encoded_len() + SESSION_TRAILER_LEN {
            break;
        }
        out.put(&Marker::Command.pattern())?;
        out.put(crp.command())?;
        out.put(&Marker::Response.pattern())?;
        out.put(crp.response())?;
        *written += 1;
    }

    out.put(&Marker::End.pattern())?;

    let cursor = out.store.layout().align_up(out.cursor);
    out.store.write_cursor(cursor)?;
    Ok(cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreLayout;
    use interposer_hal::storage::ERASED_BYTE;
    use interposer_hal::RamStorage;
    use interposer_log::{record_len, SessionReader};
    use proptest::prelude::*;

    const SELECT: [u8; 5] = [0x00, 0xA4, 0x04, 0x00, 0x0E];
    const GET_RESPONSE: [u8; 5] = [0x00, 0xC0, 0x00, 0x00, 0x0E];

    fn store() -> PersistentStore<RamStorage<4096>> {
        PersistentStore::new(RamStorage::new(), StoreLayout::DEFAULT)
    }

    fn small_store(end: u16) -> PersistentStore<RamStorage<4096>> {
        PersistentStore::new(RamStorage::new(), StoreLayout::with_log_region(0x80, end))
    }

    fn region(store: &PersistentStore<RamStorage<4096>>) -> &[u8] {
        let layout = store.layout();
        &store.storage().as_bytes()[layout.log_start as usize..layout.log_end as usize]
    }

    #[test]
    fn test_two_record_session() {
        let mut store = store();
        let mut log = LogBuffer::<32>::new();
        log.append(&SELECT, &[0x90, 0x00]).unwrap();
        log.append(&GET_RESPONSE, &[0xDE, 0xAD, 0xBE, 0xEF, 0x90, 0x00])
            .unwrap();

        let result = flush(&mut store, &mut log, 0x02);
        assert_eq!(
            result,
            FlushResult::Written {
                records: 2,
                dropped: 0,
                start: 0x80,
                cursor: 0xB8,
            }
        );
        assert!(log.is_empty());
        assert_eq!(store.read_cursor(), Ok(0xB8));

        let mut expected = std::vec::Vec::new();
        expected.extend_from_slice(&[0xDD; 5]);
        expected.push(0x02);
        expected.extend_from_slice(&[0xCC; 5]);
        expected.extend_from_slice(&SELECT);
        expected.extend_from_slice(&[0xAA; 5]);
        expected.extend_from_slice(&[0x90, 0x00]);
        expected.extend_from_slice(&[0xCC; 5]);
        expected.extend_from_slice(&GET_RESPONSE);
        expected.extend_from_slice(&[0xAA; 5]);
        expected.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF, 0x90, 0x00]);
        expected.extend_from_slice(&[0xBB; 5]);
        assert_eq!(expected.len(), 49);

        let bytes = store.storage().as_bytes();
        assert_eq!(&bytes[0x80..0xB1], expected.as_slice());
        // Padding up to the page boundary stays erased
        assert!(bytes[0xB1..0xB8].iter().all(|&b| b == ERASED_BYTE));
    }

    #[test]
    fn test_empty_log_is_noop() {
        let mut store = store();
        let mut log = LogBuffer::<4>::new();
        assert_eq!(flush(&mut store, &mut log, 1), FlushResult::Empty);
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn test_sessions_append() {
        let mut store = store();
        let mut log = LogBuffer::<4>::new();

        log.append(&SELECT, &[0x90, 0x00]).unwrap();
        flush(&mut store, &mut log, 1);
        log.append(&GET_RESPONSE, &[0x61, 0x10]).unwrap();
        let second = flush(&mut store, &mut log, 2);

        // 6 + 17 + 5 = 28 bytes rounds to 32
        assert!(matches!(second, FlushResult::Written { start: 0xA0, cursor: 0xC0, .. }));

        let sessions: std::vec::Vec<_> = SessionReader::new(region(&store))
            .map(Result::unwrap)
            .collect();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].app_id, 1);
        assert_eq!(sessions[1].app_id, 2);
        let record = sessions[1].records().next().unwrap().unwrap();
        assert_eq!(record.command, &GET_RESPONSE);
        assert_eq!(record.response, &[0x61, 0x10]);
    }

    #[test]
    fn test_truncated_session() {
        // Header (6) + two records of 17 = 40; the third record needs 17
        // more plus END and the region holds 56 bytes
        let mut store = small_store(0xB8);
        let mut log = LogBuffer::<4>::new();
        for _ in 0..3 {
            log.append(&SELECT, &[0x90, 0x00]).unwrap();
        }

        let result = flush(&mut store, &mut log, 2);
        assert_eq!(
            result,
            FlushResult::Written {
                records: 2,
                dropped: 1,
                start: 0x80,
                cursor: 0xB0,
            }
        );
        assert!(log.is_empty());

        let session = SessionReader::new(region(&store)).next().unwrap().unwrap();
        assert_eq!(session.records().count(), 2);
    }

    #[test]
    fn test_region_exhausted() {
        let mut store = small_store(0xC0);
        store.write_cursor(0xC0).unwrap();
        let mut log = LogBuffer::<4>::new();
        log.append(&SELECT, &[0x90, 0x00]).unwrap();

        let writes = store.storage().write_count();
        assert_eq!(
            flush(&mut store, &mut log, 2),
            FlushResult::Exhausted { dropped: 1 }
        );
        assert_eq!(store.storage().write_count(), writes);
        assert!(log.is_empty());
    }

    #[test]
    fn test_no_room_for_empty_session() {
        let mut store = small_store(0xC0);
        // 8 bytes left, an empty session takes 11
        store.write_cursor(0xB8).unwrap();
        let mut log = LogBuffer::<4>::new();
        log.append(&[], &[]).unwrap();

        assert_eq!(
            flush(&mut store, &mut log, 2),
            FlushResult::Exhausted { dropped: 1 }
        );
        assert_eq!(store.read_cursor(), Ok(0xB8));
    }

    #[test]
    fn test_header_only_when_first_record_too_big() {
        let mut store = small_store(0xA0);
        let mut log = LogBuffer::<4>::new();
        log.append(&[0u8; 40], &[0x90, 0x00]).unwrap();

        let result = flush(&mut store, &mut log, 7);
        assert_eq!(
            result,
            FlushResult::Written {
                records: 0,
                dropped: 1,
                start: 0x80,
                cursor: 0x90,
            }
        );
        let session = SessionReader::new(region(&store)).next().unwrap().unwrap();
        assert_eq!(session.app_id, 7);
        assert_eq!(session.records().count(), 0);
    }

    #[test]
    fn test_storage_fault_mid_flush() {
        let mut store = store();
        let mut log = LogBuffer::<4>::new();
        log.append(&SELECT, &[0x90, 0x00]).unwrap();
        log.append(&SELECT, &[0x90, 0x00]).unwrap();

        // Header and the whole first record land, then the bus fails
        store.storage_mut().fail_after(5);
        let result = flush(&mut store, &mut log, 2);
        assert_eq!(
            result,
            FlushResult::Failed {
                error: StorageError::Bus,
                dropped: 1,
            }
        );
        assert!(log.is_empty());
        assert_eq!(store.read_cursor(), Ok(0xFFFF));
    }

    #[test]
    fn test_cursor_already_aligned_stays() {
        let mut store = store();
        let mut log = LogBuffer::<4>::new();
        // 6 + (10 + 3 + 0) + 5 = 24, already on a page boundary
        log.append(&[1, 2, 3], &[]).unwrap();
        assert!(matches!(
            flush(&mut store, &mut log, 1),
            FlushResult::Written { cursor: 0x98, .. }
        ));
    }

    fn payload(max: usize) -> impl Strategy<Value = std::vec::Vec<u8>> {
        prop::collection::vec(0u8..0x80, 0..max)
    }

    proptest! {
        #[test]
        fn prop_cursor_monotonic_aligned_bounded(
            cursor in 0x80u16..0x100,
            records in prop::collection::vec((payload(24), payload(24)), 1..8),
        ) {
            let layout = StoreLayout::with_log_region(0x80, 0x100);
            let mut store = PersistentStore::new(RamStorage::<4096>::new(), layout);
            store.write_cursor(cursor).unwrap();
            let mut log = LogBuffer::<8>::new();
            for (command, response) in &records {
                log.append(command, response).unwrap();
            }

            flush(&mut store, &mut log, 1);

            let after = store.read_cursor().unwrap();
            prop_assert!(after >= cursor);
            prop_assert!(after <= layout.log_end);
            if after != cursor {
                prop_assert_eq!(after % layout.page_size, 0);
            }
            prop_assert!(log.is_empty());
        }

        #[test]
        fn prop_truncation_keeps_whole_prefix(
            end in (0x90u16..0x140).prop_map(|end| end & !7),
            records in prop::collection::vec((payload(32), payload(32)), 1..8),
        ) {
            let mut store = small_store(end);
            let mut log = LogBuffer::<8>::new();
            for (command, response) in &records {
                log.append(command, response).unwrap();
            }

            let result = flush(&mut store, &mut log, 9);
            let FlushResult::Written { records: written, dropped, start, cursor } = result else {
                panic!("expected a written session, got {:?}", result);
            };
            prop_assert_eq!(written + dropped, records.len());
            prop_assert_eq!(start, 0x80);
            prop_assert!(cursor <= end);

            // Everything written stays inside the region
            let used: usize = 6
                + records[..written].iter().map(|(c, r)| record_len(c.len(), r.len())).sum::<usize>()
                + 5;
            prop_assert!(0x80 + used <= end as usize);

            let session = SessionReader::new(region(&store)).next().unwrap().unwrap();
            prop_assert_eq!(session.app_id, 9);
            let decoded: std::vec::Vec<_> = session.records().map(Result::unwrap).collect();
            prop_assert_eq!(decoded.len(), written);
            for (record, (command, response)) in decoded.iter().zip(&records) {
                prop_assert_eq!(record.command, command.as_slice());
                prop_assert_eq!(record.response, response.as_slice());
            }
            let bytes = store.storage().as_bytes();
            prop_assert!(bytes[end as usize..].iter().all(|&b| b == ERASED_BYTE));
        }
    }
}
