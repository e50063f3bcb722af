//! End-to-end runtime flow: background producers publish section
//! snapshots, the owner thread pumps them, and the bind queue works
//! through the resulting bind traffic in budgeted slices.

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use rowcat_core::{seekables, ItemModel, Result, SectionedListAdapter, ViewTypeTable};
use rowcat_runtime::{
    AsyncBindQueue, BindHost, FeedSet, FlushOutcome, HolderId, ManualClock, Reveal,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Kind {
    Row,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Row(u64);

impl ItemModel for Row {
    type Kind = Kind;

    fn stable_id(&self) -> u64 {
        self.0
    }

    fn kind(&self) -> Kind {
        Kind::Row
    }
}

struct RecordingHost {
    clock: ManualClock,
    cost: Duration,
    recycled: HashSet<HolderId>,
    bound: Vec<(usize, u64)>,
}

impl BindHost<Row> for RecordingHost {
    fn is_recycled(&self, holder: HolderId) -> bool {
        self.recycled.contains(&holder)
    }

    // Holders sit at the position matching their id for the whole test.
    fn current_position(&self, holder: HolderId) -> Option<usize> {
        Some(holder.0 as usize)
    }

    fn bind(&mut self, _holder: HolderId, item: &Row, position: usize) -> Result<()> {
        self.clock.advance(self.cost);
        self.bound.push((position, item.0));
        Ok(())
    }

    fn reveal(&mut self, _holder: HolderId, _reveal: Reveal) {}
}

#[test]
fn producer_to_screen_pipeline() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let mut adapter = SectionedListAdapter::new(ViewTypeTable::new(vec![Kind::Row]));
    adapter.set_async_binding(true);
    let mut feeds = FeedSet::new();
    let key = adapter.create_section_key();
    let feed = feeds.register(key);

    // Producer races ahead of the owner; only its final snapshot matters.
    thread::scope(|scope| {
        let producer = feed.clone();
        scope.spawn(move || {
            for generation in [10u64, 25, 40] {
                producer.publish(seekables::copy_of(
                    (0..generation).map(Row).collect::<Vec<_>>(),
                ));
            }
        });
    });

    feeds.pump(&mut adapter).unwrap();
    assert_eq!(adapter.len(), 40);

    // The renderer queues a bind for everything that just appeared.
    let clock = ManualClock::new();
    let mut queue = AsyncBindQueue::with_clock(clock.clone());
    let mut host = RecordingHost {
        clock,
        cost: Duration::from_millis(2),
        recycled: HashSet::new(),
        bound: Vec::new(),
    };
    for position in 0..40 {
        queue.enqueue(HolderId(position as u64), position, true);
    }

    let mut slices = 0;
    loop {
        slices += 1;
        if let FlushOutcome::Drained { .. } = queue.flush(&mut adapter, &mut host) {
            break;
        }
    }

    assert!(slices > 1, "forty 2ms binds cannot fit one 12ms slice");
    assert_eq!(host.bound.len(), 40);
    // Binds arrive in enqueue order with the right items.
    assert!(host
        .bound
        .iter()
        .enumerate()
        .all(|(i, (position, id))| *position == i && *id == i as u64));

    feeds.dispose();
    assert!(!feed.publish(seekables::copy_of(vec![Row(99)])));
}
