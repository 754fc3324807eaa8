//! Sync protocol handler
//!
//! Each operation takes the current store plus one event and returns the
//! messages to deliver. Nothing here knows about sockets, which keeps every
//! protocol rule testable without a transport.

use crate::protocol::{
    ClientMessage, Outbound, RecordDeleted, RecordInserted, RecordsAdded, ServerMessage,
    SyncCount,
};
use crate::record::RecordGenerator;
use crate::session::SessionId;
use crate::store::{total_pages, EmployeeStore, StoreError};

use super::config::SyncConfig;

/// Message sent when `addRecords` finds no free slot
pub const LIMIT_REACHED_MESSAGE: &str = "Maximum employee limit reached";

/// Message sent when the store had room but no generated record was accepted
pub const NONE_ADDED_MESSAGE: &str = "No new employees added";

/// Message attached to `recordDeleted`
pub const DELETED_MESSAGE: &str = "Employee deleted";

/// Applies viewer requests and timer ticks to the store
pub struct SyncHandler<G> {
    store: EmployeeStore,
    generator: G,
    page_size: usize,
}

impl<G: RecordGenerator> SyncHandler<G> {
    /// Create a handler with a freshly seeded store
    pub fn new(config: &SyncConfig, mut generator: G) -> Self {
        let mut store = EmployeeStore::with_capacity(config.max_records);

        for _ in 0..config.initial_records.min(config.max_records) {
            if let Err(e) = store.insert_front(generator.generate()) {
                tracing::warn!(error = %e, "Skipping initial record");
            }
        }

        Self::with_store(store, generator, config.page_size)
    }

    /// Create a handler around an existing store
    pub fn with_store(store: EmployeeStore, generator: G, page_size: usize) -> Self {
        Self {
            store,
            generator,
            page_size: page_size.max(1),
        }
    }

    /// Read-only access to the store
    pub fn store(&self) -> &EmployeeStore {
        &self.store
    }

    /// Records per page
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Route a viewer message to its handler
    pub fn handle(&mut self, session: SessionId, message: ClientMessage) -> Vec<Outbound> {
        match message {
            ClientMessage::RequestPage(page) => self.request_page(session, page),
            ClientMessage::AddRecords(count) => self.add_records(session, count),
            ClientMessage::DeleteRecord(id) => self.delete_record(&id),
        }
    }

    /// Snapshot for a newly connected viewer
    ///
    /// The count is sent again on its own so a viewer that drops the snapshot
    /// still learns the totals.
    pub fn on_connect(&self, session: SessionId) -> Vec<Outbound> {
        let snapshot = self.store.page(1, self.page_size);

        vec![
            Outbound::unicast(session, ServerMessage::InitialSnapshot(snapshot)),
            Outbound::unicast(
                session,
                ServerMessage::SyncCount(SyncCount {
                    total: self.store.len(),
                    total_pages: self.total_pages(),
                }),
            ),
        ]
    }

    /// Reply with one page of the current store
    ///
    /// Always answered; out-of-range pages come back empty.
    pub fn request_page(&self, session: SessionId, page: i64) -> Vec<Outbound> {
        let data = self.store.page(page, self.page_size);
        vec![Outbound::unicast(session, ServerMessage::PageData(data))]
    }

    /// Insert up to `count` generated records
    ///
    /// Successful inserts are broadcast. When nothing was inserted only the
    /// requester hears about it.
    pub fn add_records(&mut self, session: SessionId, count: i64) -> Vec<Outbound> {
        let available = i64::try_from(self.store.remaining()).unwrap_or(i64::MAX);
        let to_add = count.min(available);

        tracing::debug!(
            session_id = %session,
            requested = count,
            available = available,
            to_add = to_add,
            "addRecords"
        );

        let mut added = 0usize;
        for _ in 0..to_add.max(0) {
            match self.store.insert_front(self.generator.generate()) {
                Ok(()) => added += 1,
                Err(StoreError::CapacityExceeded { .. }) => break,
                Err(e) => tracing::warn!(error = %e, "Generated record rejected"),
            }
        }

        if to_add <= 0 {
            tracing::info!(
                session_id = %session,
                total = self.store.len(),
                "Maximum employee limit reached"
            );
            return vec![self.nothing_added(session, LIMIT_REACHED_MESSAGE)];
        }

        if added == 0 {
            return vec![self.nothing_added(session, NONE_ADDED_MESSAGE)];
        }

        tracing::info!(
            added = added,
            total = self.store.len(),
            capacity = self.store.capacity(),
            "Added new employees"
        );

        vec![Outbound::broadcast(ServerMessage::RecordsAdded(
            RecordsAdded {
                added,
                total: self.store.len(),
                total_pages: self.total_pages(),
                message: format!("Added {} new employees", added),
            },
        ))]
    }

    /// Remove a record and tell every viewer
    ///
    /// Unknown ids produce no message at all.
    pub fn delete_record(&mut self, id: &str) -> Vec<Outbound> {
        match self.store.remove_by_id(id) {
            Some(removed) => {
                tracing::info!(
                    id = %removed.id,
                    name = %removed.name,
                    total = self.store.len(),
                    "Employee deleted"
                );

                vec![Outbound::broadcast(ServerMessage::RecordDeleted(
                    RecordDeleted {
                        id: removed.id,
                        total: self.store.len(),
                        total_pages: self.total_pages(),
                        message: DELETED_MESSAGE.to_string(),
                    },
                ))]
            }
            None => {
                tracing::debug!(id = id, "Delete for unknown id ignored");
                Vec::new()
            }
        }
    }

    /// Insert one generated record and broadcast it
    pub fn insert_generated(&mut self) -> Vec<Outbound> {
        let record = self.generator.generate();

        if let Err(e) = self.store.insert_front(record.clone()) {
            tracing::debug!(error = %e, "Timer insert skipped");
            return Vec::new();
        }

        tracing::info!(
            name = %record.name,
            total = self.store.len(),
            capacity = self.store.capacity(),
            "Broadcasting new employee"
        );
        if self.store.is_full() {
            tracing::info!(capacity = self.store.capacity(), "Reached maximum employee limit");
        }

        vec![Outbound::broadcast(ServerMessage::RecordInserted(
            RecordInserted {
                record,
                total: self.store.len(),
                total_pages: self.total_pages(),
            },
        ))]
    }

    fn nothing_added(&self, session: SessionId, message: &str) -> Outbound {
        Outbound::unicast(
            session,
            ServerMessage::RecordsAdded(RecordsAdded {
                added: 0,
                total: self.store.len(),
                total_pages: self.total_pages(),
                message: message.to_string(),
            }),
        )
    }

    fn total_pages(&self) -> usize {
        total_pages(self.store.len(), self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::protocol::Recipient;
    use crate::record::{Employee, FakeGenerator};

    const VIEWER: SessionId = SessionId(1);

    fn generator() -> impl RecordGenerator {
        let mut fake = FakeGenerator::seeded(99);
        move || -> Employee { fake.generate_on(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()) }
    }

    fn handler_with(records: usize) -> SyncHandler<impl RecordGenerator> {
        let config = SyncConfig::default().initial_records(records);
        SyncHandler::new(&config, generator())
    }

    #[test]
    fn test_initial_batch() {
        let handler = handler_with(10);
        assert_eq!(handler.store().len(), 10);

        let capped = SyncHandler::new(
            &SyncConfig::default().max_records(4).initial_records(10),
            generator(),
        );
        assert_eq!(capped.store().len(), 4);
    }

    #[test]
    fn test_on_connect_sends_snapshot_then_count() {
        let handler = handler_with(15);
        let out = handler.on_connect(VIEWER);

        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|o| o.to == Recipient::Session(VIEWER)));

        match &out[0].message {
            ServerMessage::InitialSnapshot(page) => {
                assert_eq!(page.page, 1);
                assert_eq!(page.records.len(), 10);
                assert_eq!(page.total, 15);
                assert_eq!(page.total_pages, 2);
                assert!(page.has_more);
            }
            other => panic!("expected snapshot, got {:?}", other),
        }
        assert_eq!(
            out[1].message,
            ServerMessage::SyncCount(SyncCount {
                total: 15,
                total_pages: 2
            })
        );
    }

    #[test]
    fn test_request_page_out_of_range() {
        let handler = handler_with(15);
        let out = handler.request_page(VIEWER, 99);

        assert_eq!(out.len(), 1);
        match &out[0].message {
            ServerMessage::PageData(page) => {
                assert!(page.records.is_empty());
                assert!(!page.has_more);
                assert_eq!(page.page, 99);
                assert_eq!(page.total_pages, 2);
            }
            other => panic!("expected pageData, got {:?}", other),
        }
    }

    #[test]
    fn test_add_records_clamped_to_capacity() {
        let mut handler = handler_with(10);
        let out = handler.add_records(VIEWER, 15);

        assert_eq!(out.len(), 1);
        assert!(out[0].is_broadcast());
        assert_eq!(
            out[0].message,
            ServerMessage::RecordsAdded(RecordsAdded {
                added: 10,
                total: 20,
                total_pages: 2,
                message: "Added 10 new employees".to_string(),
            })
        );
        assert_eq!(handler.store().len(), 20);
    }

    #[test]
    fn test_add_records_at_capacity_is_unicast() {
        let mut handler = handler_with(20);
        let out = handler.add_records(VIEWER, 5);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].to, Recipient::Session(VIEWER));
        match &out[0].message {
            ServerMessage::RecordsAdded(added) => {
                assert_eq!(added.added, 0);
                assert_eq!(added.total, 20);
                assert_eq!(added.message, LIMIT_REACHED_MESSAGE);
            }
            other => panic!("expected recordsAdded, got {:?}", other),
        }
        assert_eq!(handler.store().len(), 20);
    }

    #[test]
    fn test_add_records_non_positive_count() {
        let mut handler = handler_with(3);

        for count in [0, -5] {
            let out = handler.add_records(VIEWER, count);
            assert_eq!(out[0].to, Recipient::Session(VIEWER));
            assert_eq!(handler.store().len(), 3);
        }
    }

    #[test]
    fn test_added_records_are_newest() {
        let mut handler = handler_with(2);
        let before = handler.store().all();

        handler.add_records(VIEWER, 3);

        let after = handler.store().all();
        assert_eq!(&after[3..], &before[..]);
    }

    #[test]
    fn test_delete_record_broadcasts_once() {
        let mut handler = handler_with(11);
        let id = handler.store().all()[4].id.clone();

        let out = handler.delete_record(&id);
        assert_eq!(out.len(), 1);
        assert!(out[0].is_broadcast());
        assert_eq!(
            out[0].message,
            ServerMessage::RecordDeleted(RecordDeleted {
                id: id.clone(),
                total: 10,
                total_pages: 1,
                message: DELETED_MESSAGE.to_string(),
            })
        );

        let state = handler.store().all();
        assert!(handler.delete_record(&id).is_empty());
        assert_eq!(handler.store().all(), state);
    }

    #[test]
    fn test_insert_generated_then_page_one() {
        let mut handler = handler_with(5);
        let out = handler.insert_generated();

        let inserted = match &out[0].message {
            ServerMessage::RecordInserted(inserted) => {
                assert_eq!(inserted.total, 6);
                assert_eq!(inserted.total_pages, 1);
                inserted.record.clone()
            }
            other => panic!("expected recordInserted, got {:?}", other),
        };

        match &handler.request_page(VIEWER, 1)[0].message {
            ServerMessage::PageData(page) => assert_eq!(page.records[0], inserted),
            other => panic!("expected pageData, got {:?}", other),
        }
    }

    #[test]
    fn test_insert_generated_when_full_is_silent() {
        let mut handler = handler_with(20);
        assert!(handler.insert_generated().is_empty());
        assert_eq!(handler.store().len(), 20);
    }

    #[test]
    fn test_dispatch_routes_every_message() {
        let mut handler = handler_with(10);
        let id = handler.store().all()[0].id.clone();

        let page = handler.handle(VIEWER, ClientMessage::RequestPage(1));
        assert_eq!(page[0].message.event(), "pageData");

        let added = handler.handle(VIEWER, ClientMessage::AddRecords(1));
        assert_eq!(added[0].message.event(), "recordsAdded");

        let deleted = handler.handle(VIEWER, ClientMessage::DeleteRecord(id));
        assert_eq!(deleted[0].message.event(), "recordDeleted");
    }

    #[test]
    fn test_duplicate_ids_from_generator_not_counted() {
        let template =
            FakeGenerator::seeded(5).generate_on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let mut handler =
            SyncHandler::with_store(EmployeeStore::new(), move || template.clone(), 10);

        let out = handler.add_records(VIEWER, 3);
        match &out[0].message {
            ServerMessage::RecordsAdded(added) => assert_eq!(added.added, 1),
            other => panic!("expected recordsAdded, got {:?}", other),
        }
        assert_eq!(handler.store().len(), 1);
    }

    #[test]
    fn test_rejected_records_with_room_left_are_not_a_limit() {
        let template =
            FakeGenerator::seeded(6).generate_on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let mut store = EmployeeStore::new();
        store.insert_front(template.clone()).unwrap();
        let mut handler = SyncHandler::with_store(store, move || template.clone(), 10);

        let out = handler.add_records(VIEWER, 3);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].to, Recipient::Session(VIEWER));
        match &out[0].message {
            ServerMessage::RecordsAdded(added) => {
                assert_eq!(added.added, 0);
                assert_eq!(added.total, 1);
                assert_eq!(added.message, NONE_ADDED_MESSAGE);
            }
            other => panic!("expected recordsAdded, got {:?}", other),
        }
    }
}
